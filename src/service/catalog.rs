use derive_new::new;
use serde::Deserialize;
use snafu::{ensure, Location, OptionExt as _, ResultExt as _, Snafu};
use tracing::instrument;

use crate::database::{Database, DatabaseError, Record, Sql as _};
use crate::model::{now, Comment, MediaAsset, User, Video};

use super::policy::{self, Forbidden};

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// Payload for publishing a video: metadata plus the blob-store collaborator's
/// upload results.
#[derive(Debug, Clone, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video_file: MediaAsset,
    pub thumbnail: MediaAsset,
    pub duration: f64,
}

/// Owner-gated single-document plumbing for videos and comments. Every
/// mutation passes [policy::ensure_owner] before the write.
#[derive(Debug, Clone, new)]
pub struct Catalog {
    database: Database,
}

impl Catalog {
    #[instrument(skip(self))]
    pub async fn publish_video(&self, actor: &Record<User>, new: NewVideo) -> Result<Video> {
        ensure!(
            !new.title.trim().is_empty(),
            MissingFieldSnafu { field: "title" }
        );

        let video = Video::new(
            actor.clone(),
            new.title,
            new.description,
            new.video_file,
            new.thumbnail,
            new.duration,
        );
        video.create(&self.database).await.context(DatabaseSnafu)?;

        Ok(video)
    }

    /// Swaps the media reference after a re-upload.
    #[instrument(skip(self))]
    pub async fn update_video_media(
        &self,
        actor: &Record<User>,
        video: &Record<Video>,
        asset: MediaAsset,
    ) -> Result<Video> {
        let mut video = self.require_video(video).await?;
        policy::ensure_owner(actor, &video)?;

        video.video_file = asset;
        video.updated_at = now();
        video.update(&self.database).await.context(DatabaseSnafu)?;

        Ok(video)
    }

    #[instrument(skip(self))]
    pub async fn toggle_publish(&self, actor: &Record<User>, video: &Record<Video>) -> Result<Video> {
        let mut video = self.require_video(video).await?;
        policy::ensure_owner(actor, &video)?;

        video.is_published = !video.is_published;
        video.updated_at = now();
        video.update(&self.database).await.context(DatabaseSnafu)?;

        Ok(video)
    }

    /// Deletes a video together with its comments and every like edge
    /// pointing at the video or its comments, in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_video(&self, actor: &Record<User>, video: &Record<Video>) -> Result<()> {
        let video = self.require_video(video).await?;
        policy::ensure_owner(actor, &video)?;

        self.database
            .sql(
                "BEGIN TRANSACTION; \
                 DELETE likes WHERE target = $video; \
                 DELETE likes WHERE target INSIDE (SELECT VALUE id FROM comments WHERE video = $video); \
                 DELETE comments WHERE video = $video; \
                 DELETE $video; \
                 COMMIT TRANSACTION;",
            )
            .bind(("video", &video.id))
            .execute()
            .await
            .context(DatabaseSnafu)?;

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn add_comment(
        &self,
        actor: &Record<User>,
        video: &Record<Video>,
        content: String,
    ) -> Result<Comment> {
        ensure!(
            !content.trim().is_empty(),
            MissingFieldSnafu { field: "content" }
        );
        let video = self.require_video(video).await?;

        let comment = Comment::new(content, video.id, actor.clone());
        comment.create(&self.database).await.context(DatabaseSnafu)?;

        Ok(comment)
    }

    #[instrument(skip(self))]
    pub async fn update_comment(
        &self,
        actor: &Record<User>,
        comment: &Record<Comment>,
        content: String,
    ) -> Result<Comment> {
        ensure!(
            !content.trim().is_empty(),
            MissingFieldSnafu { field: "content" }
        );

        let mut comment = self.require_comment(comment).await?;
        policy::ensure_owner(actor, &comment)?;

        comment.content = content;
        comment.updated_at = now();
        comment.update(&self.database).await.context(DatabaseSnafu)?;

        Ok(comment)
    }

    /// Deletes a comment and its like edges in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        actor: &Record<User>,
        comment: &Record<Comment>,
    ) -> Result<()> {
        let comment = self.require_comment(comment).await?;
        policy::ensure_owner(actor, &comment)?;

        self.database
            .sql(
                "BEGIN TRANSACTION; \
                 DELETE likes WHERE target = $comment; \
                 DELETE $comment; \
                 COMMIT TRANSACTION;",
            )
            .bind(("comment", &comment.id))
            .execute()
            .await
            .context(DatabaseSnafu)?;

        Ok(())
    }

    async fn require_video(&self, video: &Record<Video>) -> Result<Video> {
        Video::find(video, &self.database)
            .await
            .context(DatabaseSnafu)?
            .context(VideoNotFoundSnafu {
                video: video.clone(),
            })
    }

    async fn require_comment(&self, comment: &Record<Comment>) -> Result<Comment> {
        Comment::find(comment, &self.database)
            .await
            .context(DatabaseSnafu)?
            .context(CommentNotFoundSnafu {
                comment: comment.clone(),
            })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CatalogError {
    #[snafu(display("{field} is required"))]
    MissingField {
        field: &'static str,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("video `{video}` was not found"))]
    VideoNotFound {
        video: Record<Video>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("comment `{comment}` was not found"))]
    CommentNotFound {
        comment: Record<Comment>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(transparent)]
    NotOwner { source: Forbidden },

    #[snafu(display("database failure: {source}"))]
    Database {
        source: DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },
}
