//! Endpoint operations on top of the paginator
//!
//! [`YoutubeClient`] owns the retry policy and exposes one method per
//! listing the harvester needs. Executors are injected, so tests can drive
//! the client with scripted responses.

use crate::api::{ApiError, Endpoint, RequestDescriptor, RequestExecutor, PART_PARAM};
use crate::harvest::{
    IdentifierBatch, Paginator, ResultLimit, RetryingExecutor, SearchCriteria, SearchSource,
    MAX_PAGE_SIZE,
};
use crate::records::{extract_video_id, ChannelRecord, CommentRecord, VideoRecord};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Client for the listings used by a harvest
pub struct YoutubeClient<E> {
    paginator: Paginator<RetryingExecutor<E>>,
    page_size: u32,
}

impl<E: RequestExecutor> YoutubeClient<E> {
    /// Creates a client
    ///
    /// # Arguments
    ///
    /// * `executor` - Issues single API calls
    /// * `quota_wait` - Sleep between retries after quota exhaustion
    /// * `page_size` - Results per page, clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(executor: E, quota_wait: Duration, page_size: u32) -> Self {
        Self {
            paginator: Paginator::new(RetryingExecutor::new(executor, quota_wait)),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Aborts quota waits when `cancel` fires
    pub fn with_cancellation(self, cancel: CancellationToken) -> Self {
        let Self {
            paginator,
            page_size,
        } = self;
        let executor = paginator.into_executor().with_cancellation(cancel);
        Self {
            paginator: Paginator::new(executor),
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The executor without the retry layer
    pub fn executor(&self) -> &E {
        self.paginator.executor().inner()
    }

    /// Resolves a search into video IDs
    ///
    /// Explicit ID lists are returned as given without calling the API.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<String>, ApiError> {
        let request = match (&criteria.source, criteria.to_request()) {
            (SearchSource::VideoIds(ids), _) => return Ok(ids.clone()),
            (_, Some(request)) => request,
            (_, None) => return Ok(Vec::new()),
        };

        let ids = self
            .paginator
            .paginate(request, search_hit_id, criteria.limit)
            .await?;

        tracing::info!("Found {} videos for {}", ids.len(), criteria.label());
        Ok(ids)
    }

    /// Fetches snippets (and optionally statistics) for one batch of IDs
    ///
    /// An empty batch returns no videos without calling the API.
    pub async fn get_videos(
        &self,
        batch: &IdentifierBatch,
        with_statistics: bool,
    ) -> Result<Vec<VideoRecord>, ApiError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let part = if with_statistics {
            "snippet,statistics"
        } else {
            "snippet"
        };
        let request = RequestDescriptor::new(Endpoint::Videos)
            .param(PART_PARAM, part)
            .param("id", batch.query())
            .param("maxResults", batch.len().to_string());

        self.paginator
            .paginate(request, VideoRecord::from_item, ResultLimit::FIRST_PAGE)
            .await
    }

    /// Fetches top-level comments on one video, newest first
    pub async fn get_comments(
        &self,
        video_id: &str,
        limit: ResultLimit,
    ) -> Result<Vec<CommentRecord>, ApiError> {
        let request = RequestDescriptor::new(Endpoint::CommentThreads)
            .param(PART_PARAM, "snippet")
            .param("maxResults", self.page_size.to_string())
            .param("order", "time")
            .param("videoId", video_id);

        let comments = self
            .paginator
            .paginate(request, CommentRecord::from_thread, limit)
            .await?;

        tracing::debug!("Found {} comments for video {}", comments.len(), video_id);
        Ok(comments)
    }

    /// Fetches the channels owned by a legacy username
    pub async fn get_user_channels(
        &self,
        username: &str,
        limit: ResultLimit,
    ) -> Result<Vec<ChannelRecord>, ApiError> {
        let request = RequestDescriptor::new(Endpoint::Channels)
            .param(PART_PARAM, "id,statistics")
            .param("forUsername", username)
            .param("maxResults", self.page_size.to_string());

        let channels = self
            .paginator
            .paginate(request, ChannelRecord::from_item, limit)
            .await?;

        tracing::info!("Found {} channels for user {}", channels.len(), username);
        Ok(channels)
    }
}

/// Extracts the video ID of a search hit; non-video hits are skipped
fn search_hit_id(item: &crate::api::RawItem) -> Option<String> {
    item.get("id").filter(|id| id.is_object())?;
    extract_video_id(item)
}
