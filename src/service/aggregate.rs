use derive_new::new;
use serde::{Deserialize, Serialize};
use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};
use tracing::instrument;

use crate::database::{Database, DatabaseError, Record, Sql as _};
use crate::model::{CommentView, Like, Subscription, User, Video, VideoWithOwner};

pub type Result<T, E = AggregateError> = std::result::Result<T, E>;

/// 1-based offset pagination. Values below the floor are clamped back to the
/// defaults instead of producing negative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: i64,
    limit: i64,
}

impl Page {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(Self::DEFAULT_PAGE);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        // page and limit come straight from query params, so huge values
        // must saturate instead of overflowing
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Dashboard rollup for a channel, always recomputed from the live video,
/// like and subscription tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}

/// Sort order for the general video feed. Unknown sort fields fall back to
/// creation time, unknown directions to descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl SortField {
    pub fn parse(param: Option<&str>) -> Self {
        match param {
            Some("views") => SortField::Views,
            Some("duration") => SortField::Duration,
            Some("title") => SortField::Title,
            _ => SortField::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Views => "views",
            SortField::Duration => "duration",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(param: Option<&str>) -> Self {
        match param {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// Restrict the feed to one uploader.
    pub owner: Option<Record<User>>,
    /// Case-insensitive substring match over title or description.
    pub query: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

#[derive(Debug, Default, Deserialize)]
struct VideoRollup {
    total_videos: i64,
    total_views: i64,
}

#[derive(Debug, Default, Deserialize)]
struct EdgeRollup {
    total: i64,
}

/// The aggregation engine. Every operation is a read-only pipeline over the
/// entity store; nothing in here mutates state.
#[derive(Debug, Clone, new)]
pub struct Aggregator {
    database: Database,
}

impl Aggregator {
    #[instrument(skip(self))]
    pub async fn channel_stats(&self, channel: &Record<User>) -> Result<ChannelStats> {
        self.require_user(channel).await?;

        let videos: Option<VideoRollup> = self
            .database
            .sql("SELECT count() AS total_videos, math::sum(views) AS total_views FROM videos WHERE owner = $channel GROUP ALL")
            .bind(("channel", channel))
            .fetch()
            .await
            .context(DatabaseSnafu)?;

        let likes: Option<EdgeRollup> = self
            .database
            .sql("SELECT count() AS total FROM likes WHERE target INSIDE (SELECT VALUE id FROM videos WHERE owner = $channel) GROUP ALL")
            .bind(("channel", channel))
            .fetch()
            .await
            .context(DatabaseSnafu)?;

        let subscribers: Option<EdgeRollup> = self
            .database
            .sql("SELECT count() AS total FROM subscriptions WHERE channel = $channel GROUP ALL")
            .bind(("channel", channel))
            .fetch()
            .await
            .context(DatabaseSnafu)?;

        let videos = videos.unwrap_or_default();
        Ok(ChannelStats {
            total_videos: videos.total_videos,
            total_views: videos.total_views,
            total_likes: likes.unwrap_or_default().total,
            total_subscribers: subscribers.unwrap_or_default().total,
        })
    }

    #[instrument(skip(self))]
    pub async fn channel_videos(&self, channel: &Record<User>, page: Page) -> Result<Vec<Video>> {
        self.require_user(channel).await?;

        let query = format!(
            "SELECT * FROM videos WHERE owner = $channel ORDER BY created_at DESC, id ASC LIMIT {} START {}",
            page.limit(),
            page.offset(),
        );
        self.database
            .sql(&query)
            .bind(("channel", channel))
            .fetch()
            .await
            .context(DatabaseSnafu)
    }

    /// Comments on a video, newest first, each joined with the author's
    /// reduced profile. Comments whose author no longer exists are dropped
    /// before pagination.
    #[instrument(skip(self))]
    pub async fn video_comments(
        &self,
        video: &Record<Video>,
        page: Page,
    ) -> Result<Vec<CommentView>> {
        self.require_video(video).await?;

        // `id` must be projected for the ORDER BY tie-break to be accepted
        let query = format!(
            "SELECT id, content, created_at, updated_at, owner FROM comments \
             WHERE video = $video AND owner.username != NONE \
             ORDER BY created_at DESC, id ASC LIMIT {} START {} FETCH owner",
            page.limit(),
            page.offset(),
        );
        self.database
            .sql(&query)
            .bind(("video", video))
            .fetch()
            .await
            .context(DatabaseSnafu)
    }

    /// Every video the user has liked, joined with the uploader's reduced
    /// profile. Likes whose video has been deleted are filtered out, never
    /// returned as placeholders.
    #[instrument(skip(self))]
    pub async fn liked_videos(&self, user: &Record<User>) -> Result<Vec<VideoWithOwner>> {
        self.require_user(user).await?;

        let targets = Like::video_targets(user, &self.database)
            .await
            .context(DatabaseSnafu)?;
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        self.database
            .sql("SELECT * FROM videos WHERE id INSIDE $targets ORDER BY created_at DESC, id ASC FETCH owner")
            .bind(("targets", &targets))
            .fetch()
            .await
            .context(DatabaseSnafu)
    }

    #[instrument(skip(self))]
    pub async fn channel_subscribers(&self, channel: &Record<User>) -> Result<Vec<Subscription>> {
        self.require_user(channel).await?;
        Subscription::by_channel(channel, &self.database)
            .await
            .context(DatabaseSnafu)
    }

    #[instrument(skip(self))]
    pub async fn subscribed_channels(
        &self,
        subscriber: &Record<User>,
    ) -> Result<Vec<Subscription>> {
        self.require_user(subscriber).await?;
        Subscription::by_subscriber(subscriber, &self.database)
            .await
            .context(DatabaseSnafu)
    }

    /// General video listing with optional owner and substring filters. The
    /// sort column comes from the [SortField] whitelist, never from user
    /// input directly.
    #[instrument(skip(self))]
    pub async fn video_feed(&self, filter: &FeedFilter, page: Page) -> Result<Vec<Video>> {
        let mut conditions = Vec::new();
        if filter.owner.is_some() {
            conditions.push("owner = $owner");
        }
        if filter.query.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(title), $needle) \
                 OR string::contains(string::lowercase(description), $needle))",
            );
        }

        let filters = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM videos{} ORDER BY {} {}, id ASC LIMIT {} START {}",
            filters,
            filter.sort_by.column(),
            filter.sort_order.keyword(),
            page.limit(),
            page.offset(),
        );

        let mut bindings = self.database.sql(&query);
        if let Some(owner) = &filter.owner {
            bindings = bindings.bind(("owner", owner));
        }
        if let Some(needle) = &filter.query {
            bindings = bindings.bind(("needle", needle.to_lowercase()));
        }

        bindings.fetch().await.context(DatabaseSnafu)
    }

    async fn require_user(&self, user: &Record<User>) -> Result<User> {
        User::find(user, &self.database)
            .await
            .context(DatabaseSnafu)?
            .context(UserNotFoundSnafu { user: user.clone() })
    }

    async fn require_video(&self, video: &Record<Video>) -> Result<Video> {
        Video::find(video, &self.database)
            .await
            .context(DatabaseSnafu)?
            .context(VideoNotFoundSnafu {
                video: video.clone(),
            })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AggregateError {
    #[snafu(display("user `{user}` was not found"))]
    UserNotFound {
        user: Record<User>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("video `{video}` was not found"))]
    VideoNotFound {
        video: Record<Video>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("database failure: {source}"))]
    Database {
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },
}

#[cfg(test)]
mod tests {
    use crate::model::LikeTarget;

    use super::super::fixtures;
    use super::*;

    #[tokio::test]
    async fn channel_stats_recomputes_from_live_tables() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let other = fixtures::user(&db, "other").await;

        let videos = [
            fixtures::video(&db, &channel, "one", 100, 0).await,
            fixtures::video(&db, &channel, "two", 30, 1).await,
            fixtures::video(&db, &channel, "three", 20, 2).await,
        ];
        // a video on another channel must not count
        let unrelated = fixtures::video(&db, &other, "noise", 999, 3).await;

        for (i, video) in videos.iter().cycle().take(5).enumerate() {
            let fan = fixtures::user(&db, &format!("fan{i}")).await;
            fixtures::like(&db, &fan, LikeTarget::Video(video.id.clone())).await;
        }
        let stray = fixtures::user(&db, "stray").await;
        fixtures::like(&db, &stray, LikeTarget::Video(unrelated.id.clone())).await;

        for name in ["sub1", "sub2"] {
            let subscriber = fixtures::user(&db, name).await;
            fixtures::subscribe(&db, &subscriber, &channel).await;
        }

        let aggregator = Aggregator::new(db.clone());
        let stats = aggregator.channel_stats(&channel.id).await.unwrap();

        assert_eq!(
            stats,
            ChannelStats {
                total_videos: 3,
                total_views: 150,
                total_likes: 5,
                total_subscribers: 2,
            }
        );
    }

    #[tokio::test]
    async fn channel_stats_for_missing_user_is_not_found() {
        let db = fixtures::database().await;
        let aggregator = Aggregator::new(db.clone());

        let error = aggregator
            .channel_stats(&Record::random())
            .await
            .unwrap_err();
        assert!(matches!(error, AggregateError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn comment_pages_partition_the_feed() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let author = fixtures::user(&db, "author").await;
        let video = fixtures::video(&db, &channel, "clip", 0, 0).await;

        for i in 0..25 {
            fixtures::comment(&db, &video, &author, &format!("comment {i:02}"), i).await;
        }

        let aggregator = Aggregator::new(db.clone());

        // newest first: page 2 of 10 holds comments 14..=5
        let page2 = aggregator
            .video_comments(&video.id, Page::new(Some(2), Some(10)))
            .await
            .unwrap();
        let expected: Vec<String> = (5..=14).rev().map(|i| format!("comment {i:02}")).collect();
        let contents: Vec<String> = page2.iter().map(|c| c.content.clone()).collect();
        assert_eq!(contents, expected);

        let mut seen = Vec::new();
        for page in 1..=3 {
            let comments = aggregator
                .video_comments(&video.id, Page::new(Some(page), Some(10)))
                .await
                .unwrap();
            seen.extend(comments.into_iter().map(|c| c.content));
        }
        assert_eq!(seen.len(), 25);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 25, "pages must not overlap or drop comments");
    }

    #[tokio::test]
    async fn same_timestamp_comments_page_without_overlap() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let author = fixtures::user(&db, "author").await;
        let video = fixtures::video(&db, &channel, "clip", 0, 0).await;

        // identical created_at, so ordering falls back to the id tie-break
        for name in ["first", "second", "third"] {
            fixtures::comment(&db, &video, &author, name, 0).await;
        }

        let aggregator = Aggregator::new(db.clone());

        let mut seen = Vec::new();
        for page in 1..=3 {
            let comments = aggregator
                .video_comments(&video.id, Page::new(Some(page), Some(1)))
                .await
                .unwrap();
            assert_eq!(comments.len(), 1, "page {page}");
            seen.push(comments[0].id.to_string());
        }

        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 3, "pages must not repeat a comment");
    }

    #[tokio::test]
    async fn comments_by_deleted_authors_are_filtered_before_paging() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let kept = fixtures::user(&db, "kept").await;
        let doomed = fixtures::user(&db, "doomed").await;
        let video = fixtures::video(&db, &channel, "clip", 0, 0).await;

        for i in 0..5 {
            fixtures::comment(&db, &video, &kept, &format!("kept {i}"), i * 2).await;
            fixtures::comment(&db, &video, &doomed, &format!("doomed {i}"), i * 2 + 1).await;
        }

        // delete the author but leave their comments behind
        doomed.delete(&db).await.unwrap();

        let aggregator = Aggregator::new(db.clone());

        // authorless comments vanish before LIMIT/START, so the first page
        // stays full and the survivors partition cleanly
        let page1 = aggregator
            .video_comments(&video.id, Page::new(Some(1), Some(3)))
            .await
            .unwrap();
        let contents: Vec<&str> = page1.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["kept 4", "kept 3", "kept 2"]);
        assert!(page1.iter().all(|c| c.owner.username == "kept"));

        let page2 = aggregator
            .video_comments(&video.id, Page::new(Some(2), Some(3)))
            .await
            .unwrap();
        let contents: Vec<&str> = page2.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["kept 1", "kept 0"]);
    }

    #[tokio::test]
    async fn comments_for_missing_video_are_not_found() {
        let db = fixtures::database().await;
        let aggregator = Aggregator::new(db.clone());

        let error = aggregator
            .video_comments(&Record::random(), Page::default())
            .await
            .unwrap_err();
        assert!(matches!(error, AggregateError::VideoNotFound { .. }));
    }

    #[tokio::test]
    async fn liked_videos_drop_deleted_targets() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let fan = fixtures::user(&db, "fan").await;

        let kept = fixtures::video(&db, &channel, "kept", 0, 0).await;
        let doomed = fixtures::video(&db, &channel, "doomed", 0, 1).await;

        fixtures::like(&db, &fan, LikeTarget::Video(kept.id.clone())).await;
        fixtures::like(&db, &fan, LikeTarget::Video(doomed.id.clone())).await;

        // delete the video but leave its like edge behind
        doomed.delete(&db).await.unwrap();

        let aggregator = Aggregator::new(db.clone());
        let liked = aggregator.liked_videos(&fan.id).await.unwrap();

        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].id, kept.id);
        assert_eq!(liked[0].owner.id, channel.id);
        assert_eq!(liked[0].owner.username, "channel");
    }

    #[tokio::test]
    async fn channel_videos_are_newest_first() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        for i in 0..3 {
            fixtures::video(&db, &channel, &format!("video {i}"), 0, i).await;
        }

        let aggregator = Aggregator::new(db.clone());
        let videos = aggregator
            .channel_videos(&channel.id, Page::default())
            .await
            .unwrap();

        let titles: Vec<&str> = videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["video 2", "video 1", "video 0"]);
    }

    #[tokio::test]
    async fn subscriptions_one_hop_joins() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let alice = fixtures::user(&db, "alice").await;
        let bob = fixtures::user(&db, "bob").await;

        fixtures::subscribe(&db, &alice, &channel).await;
        fixtures::subscribe(&db, &bob, &channel).await;

        let aggregator = Aggregator::new(db.clone());

        let subscribers = aggregator.channel_subscribers(&channel.id).await.unwrap();
        assert_eq!(subscribers.len(), 2);

        let channels = aggregator.subscribed_channels(&alice.id).await.unwrap();
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].channel, channel.id);

        let error = aggregator
            .channel_subscribers(&Record::random())
            .await
            .unwrap_err();
        assert!(matches!(error, AggregateError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn feed_filters_and_sorts() {
        let db = fixtures::database().await;
        let channel = fixtures::user(&db, "channel").await;
        let other = fixtures::user(&db, "other").await;

        let mut rust_video = fixtures::video(&db, &channel, "Rust for beginners", 50, 0).await;
        fixtures::video(&db, &channel, "Cooking stream", 10, 1).await;
        fixtures::video(&db, &other, "Advanced RUST tricks", 90, 2).await;

        let aggregator = Aggregator::new(db.clone());

        // case-insensitive substring over title or description
        let filter = FeedFilter {
            query: Some("rust".to_string()),
            ..FeedFilter::default()
        };
        let matches = aggregator
            .video_feed(&filter, Page::default())
            .await
            .unwrap();
        assert_eq!(matches.len(), 2);

        // owner filter
        let filter = FeedFilter {
            owner: Some(channel.id.clone()),
            ..FeedFilter::default()
        };
        let owned = aggregator
            .video_feed(&filter, Page::default())
            .await
            .unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|v| v.owner == channel.id));

        // explicit sort by views ascending
        let filter = FeedFilter {
            sort_by: SortField::Views,
            sort_order: SortOrder::Asc,
            ..FeedFilter::default()
        };
        let by_views = aggregator
            .video_feed(&filter, Page::default())
            .await
            .unwrap();
        let views: Vec<i64> = by_views.iter().map(|v| v.views).collect();
        assert_eq!(views, [10, 50, 90]);

        // an unknown sort field falls back to newest first
        assert_eq!(SortField::parse(Some("bogus")), SortField::CreatedAt);
        rust_video.views += 1;
        rust_video.update(&db).await.unwrap();
        let default_order = aggregator
            .video_feed(&FeedFilter::default(), Page::default())
            .await
            .unwrap();
        let titles: Vec<&str> = default_order.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Advanced RUST tricks", "Cooking stream", "Rust for beginners"]
        );
    }

    #[test]
    fn pages_below_the_floor_are_clamped() {
        assert_eq!(Page::new(None, None), Page::default());
        assert_eq!(Page::new(Some(0), Some(0)), Page::default());
        assert_eq!(Page::new(Some(-3), Some(-1)), Page::default());

        let page = Page::new(Some(3), Some(7));
        assert_eq!(page.limit(), 7);
        assert_eq!(page.offset(), 14);
    }

    #[test]
    fn oversized_pages_saturate_instead_of_overflowing() {
        let page = Page::new(Some(i64::MAX), Some(10));
        assert_eq!(page.offset(), i64::MAX);

        let page = Page::new(Some(2), Some(i64::MAX));
        assert_eq!(page.offset(), i64::MAX);
    }
}
