//! Harvest coordinator - main harvest orchestration logic
//!
//! This module sequences a harvest run:
//! - Resolving seed video IDs from explicit lists, channel searches and a
//!   keyword search
//! - Fetching comments per seed video, skipping videos with comments disabled
//! - Batching seeds not yet in the video table into detail lookups
//! - Looking up channels by username
//! - Appending every stage's records to its output table as it goes
//!
//! Failures inside a per-video, per-batch or per-username loop are logged,
//! recorded in the [`HarvestSummary`] and skipped. Failures while resolving
//! seeds abort the run, as does cancellation.

use crate::api::{ApiError, RequestExecutor};
use crate::config::OutputConfig;
use crate::harvest::{BatchAssembler, HarvestPlan, SearchCriteria, YoutubeClient};
use crate::output::{ExtraColumns, HarvestStage, HarvestSummary, TableWriter};
use crate::records::CommentRecord;
use crate::HarvestError;
use std::collections::HashSet;
use std::path::PathBuf;

/// Where each record type is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTargets {
    pub video_path: PathBuf,
    pub comment_path: PathBuf,
    pub channel_path: PathBuf,
    pub extra_columns: Option<ExtraColumns>,
}

impl OutputTargets {
    pub fn from_config(output: &OutputConfig) -> Self {
        Self {
            video_path: PathBuf::from(&output.video_path),
            comment_path: PathBuf::from(&output.comment_path),
            channel_path: PathBuf::from(&output.channel_path),
            extra_columns: Some(output.extra_columns.clone()).filter(|extra| !extra.is_empty()),
        }
    }
}

/// Main harvest coordinator
pub struct Harvester<E, W> {
    client: YoutubeClient<E>,
    writer: W,
    targets: OutputTargets,
}

impl<E: RequestExecutor, W: TableWriter> Harvester<E, W> {
    pub fn new(client: YoutubeClient<E>, writer: W, targets: OutputTargets) -> Self {
        Self {
            client,
            writer,
            targets,
        }
    }

    pub fn client(&self) -> &YoutubeClient<E> {
        &self.client
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn targets(&self) -> &OutputTargets {
        &self.targets
    }

    /// Runs every stage of `plan`
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestSummary)` - The run finished; skipped failures are listed in the summary
    /// * `Err(HarvestError)` - Seed resolution failed, an output table could not
    ///   be written, or the run was cancelled
    pub async fn run(&self, plan: &HarvestPlan) -> Result<HarvestSummary, HarvestError> {
        let mut summary = HarvestSummary::new();

        tracing::info!("Resolving seed videos");
        let seeds = self.resolve_seeds(plan).await?;
        summary.seed_count = seeds.len();
        tracing::info!("Number of seed videos: {}", seeds.len());

        if !seeds.is_empty() {
            tracing::info!("Retrieving comments");
            self.harvest_comments(&seeds, plan, &mut summary).await?;

            tracing::info!("Retrieving video metadata");
            self.harvest_videos(&seeds, plan, &mut summary).await?;
        }

        if !plan.usernames.is_empty() {
            tracing::info!("Retrieving user channels");
            self.harvest_channels(plan, &mut summary).await?;
        }

        tracing::info!("Harvest complete");
        Ok(summary)
    }

    /// Unions the seed sources, keeping the first occurrence of each ID
    async fn resolve_seeds(&self, plan: &HarvestPlan) -> Result<Vec<String>, HarvestError> {
        let mut searches = Vec::new();
        if !plan.video_ids.is_empty() {
            searches.push(SearchCriteria::video_ids(plan.video_ids.clone()));
        }
        for channel in &plan.channel_ids {
            searches.push(SearchCriteria::channel(channel.as_str()));
        }
        if let Some(keywords) = &plan.keywords {
            searches.push(SearchCriteria::keyword(keywords.as_str()));
        }

        let mut seen = HashSet::new();
        let mut seeds = Vec::new();
        for criteria in searches {
            let criteria = criteria
                .since(plan.since)
                .limit(plan.search_limit)
                .page_size(self.client.page_size())
                .order(plan.order);

            for id in self.client.search(&criteria).await? {
                if seen.insert(id.clone()) {
                    seeds.push(id);
                }
            }
        }

        Ok(seeds)
    }

    /// Fetches and appends comments one video at a time
    ///
    /// Comments whose ID is already in the comment table are not appended again.
    async fn harvest_comments(
        &self,
        seeds: &[String],
        plan: &HarvestPlan,
        summary: &mut HarvestSummary,
    ) -> Result<(), HarvestError> {
        let path = &self.targets.comment_path;
        let mut written = self.writer.existing_ids(path);

        for (index, video_id) in seeds.iter().enumerate() {
            let comments = match self.client.get_comments(video_id, plan.comment_limit).await {
                Ok(comments) => comments,
                Err(ApiError::CommentsDisabled) => {
                    tracing::info!("Skipping comments for video {}", video_id);
                    summary.comments_disabled.push(video_id.clone());
                    continue;
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Failed to fetch comments for video {}: {}", video_id, e);
                    summary.record_failure(HarvestStage::Comments, video_id.as_str(), &e);
                    continue;
                }
            };

            let fresh: Vec<CommentRecord> = comments
                .into_iter()
                .filter(|comment| written.insert(comment.id.clone()))
                .collect();

            let count = self
                .writer
                .append(&fresh, path, self.targets.extra_columns.as_ref())?;
            summary.comments_written += count;

            tracing::debug!(
                "Wrote {} comments for video {} ({}/{})",
                count,
                video_id,
                index + 1,
                seeds.len()
            );
        }

        Ok(())
    }

    /// Fetches and appends video details batch by batch
    async fn harvest_videos(
        &self,
        seeds: &[String],
        plan: &HarvestPlan,
        summary: &mut HarvestSummary,
    ) -> Result<(), HarvestError> {
        let path = &self.targets.video_path;
        let existing = self.writer.existing_ids(path);
        summary.skipped_existing = seeds.iter().filter(|id| existing.contains(*id)).count();

        let assembler = BatchAssembler::new(self.client.page_size() as usize);
        let batches = assembler.assemble(seeds, Some(&existing));
        tracing::info!(
            "Fetching {} videos in {} batches ({} already harvested)",
            seeds.len() - summary.skipped_existing,
            batches.len(),
            summary.skipped_existing
        );

        for (index, batch) in batches.iter().enumerate() {
            let videos = match self.client.get_videos(batch, plan.fetch_statistics).await {
                Ok(videos) => videos,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Failed to fetch video batch {}: {}", index + 1, e);
                    summary.record_failure(HarvestStage::Videos, batch.query(), &e);
                    continue;
                }
            };

            let count = self
                .writer
                .append(&videos, path, self.targets.extra_columns.as_ref())?;
            summary.videos_written += count;

            tracing::info!(
                "Wrote batch {}/{} ({} videos)",
                index + 1,
                batches.len(),
                count
            );
        }

        Ok(())
    }

    /// Looks up and appends the channels of each username
    async fn harvest_channels(
        &self,
        plan: &HarvestPlan,
        summary: &mut HarvestSummary,
    ) -> Result<(), HarvestError> {
        let path = &self.targets.channel_path;

        for username in &plan.usernames {
            let channels = match self
                .client
                .get_user_channels(username, plan.search_limit)
                .await
            {
                Ok(channels) => channels,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("Failed to fetch channels for user {}: {}", username, e);
                    summary.record_failure(HarvestStage::Channels, username.as_str(), &e);
                    continue;
                }
            };

            summary.channels_written += self
                .writer
                .append(&channels, path, self.targets.extra_columns.as_ref())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{RawPage, RequestDescriptor};
    use crate::harvest::ResultLimit;
    use crate::output::OutputResult;
    use crate::records::Tabular;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// Serves canned results keyed by the request's filter parameter
    #[derive(Default)]
    struct FakeApi {
        searches: HashMap<String, Vec<&'static str>>,
        comments: HashMap<String, Result<Vec<&'static str>, fn() -> ApiError>>,
        failing_video_ids: HashSet<String>,
        calls: Mutex<Vec<RequestDescriptor>>,
    }

    impl FakeApi {
        fn calls_to(&self, endpoint: &str) -> Vec<RequestDescriptor> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.endpoint().path() == endpoint)
                .cloned()
                .collect()
        }
    }

    fn page(items: Vec<Value>) -> RawPage {
        RawPage {
            items,
            next_page_token: None,
        }
    }

    fn unknown() -> ApiError {
        ApiError::Unknown {
            endpoint: "test".to_string(),
            message: "HTTP 500".to_string(),
        }
    }

    #[async_trait]
    impl RequestExecutor for FakeApi {
        async fn execute(&self, request: &RequestDescriptor) -> Result<RawPage, ApiError> {
            self.calls.lock().unwrap().push(request.clone());

            match request.endpoint().path() {
                "search" => {
                    let key = request
                        .get("q")
                        .or_else(|| request.get("channelId"))
                        .unwrap_or_default();
                    let ids = self.searches.get(key).cloned().unwrap_or_default();
                    Ok(page(
                        ids.into_iter()
                            .map(|id| json!({ "id": { "kind": "youtube#video", "videoId": id } }))
                            .collect(),
                    ))
                }
                "commentThreads" => {
                    let video = request.get("videoId").unwrap_or_default();
                    match self.comments.get(video) {
                        Some(Ok(ids)) => Ok(page(
                            ids.iter()
                                .map(|id| json!({ "snippet": { "videoId": video, "topLevelComment": { "id": id } } }))
                                .collect(),
                        )),
                        Some(Err(error)) => Err(error()),
                        None => Ok(page(Vec::new())),
                    }
                }
                "videos" => {
                    let ids: Vec<&str> = request.get("id").unwrap_or_default().split(',').collect();
                    if ids.iter().any(|id| self.failing_video_ids.contains(*id)) {
                        return Err(unknown());
                    }
                    Ok(page(
                        ids.into_iter()
                            .map(|id| json!({ "id": id, "snippet": { "title": id } }))
                            .collect(),
                    ))
                }
                "channels" => {
                    let user = request.get("forUsername").unwrap_or_default();
                    if user == "broken" {
                        return Err(unknown());
                    }
                    Ok(page(vec![json!({ "id": format!("UC-{}", user) })]))
                }
                other => panic!("unexpected endpoint {}", other),
            }
        }
    }

    /// Keeps written rows in memory, keyed by path
    #[derive(Default)]
    struct MemoryWriter {
        tables: Mutex<HashMap<PathBuf, Vec<Vec<Option<String>>>>>,
        preexisting: HashMap<PathBuf, HashSet<String>>,
    }

    impl MemoryWriter {
        fn ids(&self, path: &str) -> Vec<String> {
            self.tables
                .lock()
                .unwrap()
                .get(Path::new(path))
                .map(|rows| rows.iter().filter_map(|row| row[0].clone()).collect())
                .unwrap_or_default()
        }
    }

    impl TableWriter for MemoryWriter {
        fn append<R: Tabular>(
            &self,
            records: &[R],
            path: &Path,
            _extra_columns: Option<&ExtraColumns>,
        ) -> OutputResult<usize> {
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(path.to_path_buf()).or_default();
            rows.extend(records.iter().map(Tabular::row));
            Ok(records.len())
        }

        fn existing_ids(&self, path: &Path) -> HashSet<String> {
            let mut ids = self.preexisting.get(path).cloned().unwrap_or_default();
            ids.extend(self.ids(&path.display().to_string()));
            ids
        }
    }

    fn targets() -> OutputTargets {
        OutputTargets {
            video_path: PathBuf::from("videos.csv"),
            comment_path: PathBuf::from("comments.csv"),
            channel_path: PathBuf::from("channels.csv"),
            extra_columns: None,
        }
    }

    fn harvester(api: FakeApi, writer: MemoryWriter, batch: u32) -> Harvester<FakeApi, MemoryWriter> {
        let client = YoutubeClient::new(api, Duration::from_millis(1), batch);
        Harvester::new(client, writer, targets())
    }

    fn plan() -> HarvestPlan {
        HarvestPlan {
            fetch_statistics: true,
            ..HarvestPlan::default()
        }
    }

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_seed_sources_are_unioned_in_order() {
        let mut api = FakeApi::default();
        api.searches.insert("UC1".to_string(), vec!["b", "c"]);
        api.searches.insert("owls".to_string(), vec!["c", "d"]);
        let harvester = harvester(api, MemoryWriter::default(), 50);

        let plan = HarvestPlan {
            video_ids: strings(&["a", "b"]),
            channel_ids: strings(&["UC1"]),
            keywords: Some("owls".to_string()),
            ..plan()
        };
        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.seed_count, 4);
        assert_eq!(harvester.writer().ids("videos.csv"), strings(&["a", "b", "c", "d"]));
        assert_eq!(harvester.client().executor().calls_to("search").len(), 2);
    }

    #[tokio::test]
    async fn test_comments_disabled_does_not_stop_harvest() {
        let mut api = FakeApi::default();
        api.comments.insert("a".to_string(), Ok(vec!["c1", "c2"]));
        api.comments.insert("b".to_string(), Err(|| ApiError::CommentsDisabled));
        api.comments.insert("c".to_string(), Ok(vec!["c3"]));
        let harvester = harvester(api, MemoryWriter::default(), 50);

        let plan = HarvestPlan {
            video_ids: strings(&["a", "b", "c"]),
            comment_limit: ResultLimit::UNBOUNDED,
            ..plan()
        };
        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.comments_written, 3);
        assert_eq!(summary.comments_disabled, strings(&["b"]));
        assert!(summary.failures.is_empty());
        assert_eq!(harvester.writer().ids("comments.csv"), strings(&["c1", "c2", "c3"]));
        assert_eq!(summary.videos_written, 3);
    }

    #[tokio::test]
    async fn test_failed_comment_listing_is_recorded() {
        let mut api = FakeApi::default();
        api.comments.insert("a".to_string(), Err(unknown));
        let harvester = harvester(api, MemoryWriter::default(), 50);

        let plan = HarvestPlan {
            video_ids: strings(&["a", "b"]),
            ..plan()
        };
        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.failures_in(HarvestStage::Comments), 1);
        assert_eq!(summary.failures[0].target, "a");
        assert_eq!(summary.videos_written, 2);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_abort_remaining_batches() {
        let mut api = FakeApi::default();
        api.failing_video_ids.insert("c".to_string());
        let harvester = harvester(api, MemoryWriter::default(), 2);

        let plan = HarvestPlan {
            video_ids: strings(&["a", "b", "c", "d", "e"]),
            ..plan()
        };
        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.failures_in(HarvestStage::Videos), 1);
        assert_eq!(summary.failures[0].target, "c,d");
        assert_eq!(harvester.writer().ids("videos.csv"), strings(&["a", "b", "e"]));
        assert_eq!(harvester.client().executor().calls_to("videos").len(), 3);
    }

    #[tokio::test]
    async fn test_existing_videos_are_not_fetched_again() {
        let mut writer = MemoryWriter::default();
        writer
            .preexisting
            .insert(PathBuf::from("videos.csv"), strings(&["a", "c"]).into_iter().collect());
        let harvester = harvester(FakeApi::default(), writer, 50);

        let plan = HarvestPlan {
            video_ids: strings(&["a", "b", "c"]),
            ..plan()
        };
        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.skipped_existing, 2);
        assert_eq!(summary.videos_written, 1);
        let calls = harvester.client().executor().calls_to("videos");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get("id"), Some("b"));
    }

    #[tokio::test]
    async fn test_existing_comments_are_not_written_again() {
        let mut api = FakeApi::default();
        api.comments.insert("a".to_string(), Ok(vec!["c1", "c2"]));
        let mut writer = MemoryWriter::default();
        writer
            .preexisting
            .insert(PathBuf::from("comments.csv"), strings(&["c1"]).into_iter().collect());
        let harvester = harvester(api, writer, 50);

        let plan = HarvestPlan {
            video_ids: strings(&["a"]),
            ..plan()
        };
        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.comments_written, 1);
        assert_eq!(harvester.writer().ids("comments.csv"), strings(&["c2"]));
    }

    #[tokio::test]
    async fn test_failed_seed_search_aborts() {
        struct Down;

        #[async_trait]
        impl RequestExecutor for Down {
            async fn execute(&self, _: &RequestDescriptor) -> Result<RawPage, ApiError> {
                Err(unknown())
            }
        }

        let client = YoutubeClient::new(Down, Duration::from_millis(1), 50);
        let harvester = Harvester::new(client, MemoryWriter::default(), targets());
        let plan = HarvestPlan {
            keywords: Some("owls".to_string()),
            ..plan()
        };

        let result = harvester.run(&plan).await;
        assert!(matches!(result, Err(HarvestError::Api(ApiError::Unknown { .. }))));
        assert!(harvester.writer().tables.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_quota_wait_aborts() {
        struct Exhausted;

        #[async_trait]
        impl RequestExecutor for Exhausted {
            async fn execute(&self, _: &RequestDescriptor) -> Result<RawPage, ApiError> {
                Err(ApiError::RateLimited {
                    reason: "quotaExceeded".to_string(),
                })
            }
        }

        let cancel = CancellationToken::new();
        cancel.cancel();
        let client =
            YoutubeClient::new(Exhausted, Duration::from_secs(3600), 50).with_cancellation(cancel);
        let harvester = Harvester::new(client, MemoryWriter::default(), targets());
        let plan = HarvestPlan {
            video_ids: strings(&["a"]),
            ..plan()
        };

        let result = harvester.run(&plan).await;
        assert!(matches!(result, Err(HarvestError::Api(ApiError::Cancelled))));
    }

    #[tokio::test]
    async fn test_user_channels_with_failure() {
        let harvester = harvester(FakeApi::default(), MemoryWriter::default(), 50);
        let plan = HarvestPlan {
            usernames: strings(&["owlfan", "broken", "hootie"]),
            ..plan()
        };

        let summary = harvester.run(&plan).await.unwrap();

        assert_eq!(summary.seed_count, 0);
        assert_eq!(summary.channels_written, 2);
        assert_eq!(summary.failures_in(HarvestStage::Channels), 1);
        assert_eq!(
            harvester.writer().ids("channels.csv"),
            strings(&["UC-owlfan", "UC-hootie"])
        );
    }
}
