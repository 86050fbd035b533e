use derive_new::new;
use serde::Serialize;
use snafu::{ensure, Location, OptionExt as _, ResultExt as _, Snafu};
use tracing::instrument;

use crate::database::{Database, DatabaseError, Record};
use crate::model::{Comment, Like, LikeTarget, Subscription, Tweet, User, Video};

pub type Result<T, E = EngagementError> = std::result::Result<T, E>;

/// The resulting state of a toggle: the edge was either just created or just
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleState {
    Added,
    Removed,
}

/// The relationship toggle engine. Like and subscription edges are created
/// when absent and removed when present, keyed by (actor, target); the UNIQUE
/// indexes on both edge tables serialize concurrent toggles for the same key.
#[derive(Debug, Clone, new)]
pub struct Engagement {
    database: Database,
}

impl Engagement {
    #[instrument(skip(self))]
    pub async fn toggle_like(
        &self,
        user: &Record<User>,
        target: LikeTarget,
    ) -> Result<ToggleState> {
        let owner = self.target_owner(&target).await?;
        ensure!(
            owner != *user,
            SelfLikeSnafu {
                target: target.clone()
            }
        );

        let removed = Like::remove_edge(user, &target, &self.database)
            .await
            .context(DatabaseSnafu)?;
        if !removed.is_empty() {
            return Ok(ToggleState::Removed);
        }

        let like = Like::new(user.clone(), target);
        match like.create(&self.database).await {
            Ok(_) => Ok(ToggleState::Added),
            // A concurrent toggle inserted the same edge between our delete
            // and create; the edge exists, so the resulting state is Added.
            Err(error) if error.is_unique_index_violation() => Ok(ToggleState::Added),
            Err(error) => Err(error).context(DatabaseSnafu),
        }
    }

    #[instrument(skip(self))]
    pub async fn toggle_subscription(
        &self,
        subscriber: &Record<User>,
        channel: &Record<User>,
    ) -> Result<ToggleState> {
        ensure!(
            subscriber != channel,
            SelfSubscriptionSnafu {
                channel: channel.clone()
            }
        );

        User::find(channel, &self.database)
            .await
            .context(DatabaseSnafu)?
            .context(ChannelNotFoundSnafu {
                channel: channel.clone(),
            })?;

        let removed = Subscription::remove_edge(subscriber, channel, &self.database)
            .await
            .context(DatabaseSnafu)?;
        if !removed.is_empty() {
            return Ok(ToggleState::Removed);
        }

        let subscription = Subscription::new(subscriber.clone(), channel.clone());
        match subscription.create(&self.database).await {
            Ok(_) => Ok(ToggleState::Added),
            Err(error) if error.is_unique_index_violation() => Ok(ToggleState::Added),
            Err(error) => Err(error).context(DatabaseSnafu),
        }
    }

    /// Resolves the owner of a like target, failing when the target no longer
    /// exists.
    async fn target_owner(&self, target: &LikeTarget) -> Result<Record<User>> {
        let db = &self.database;
        let missing = || TargetNotFoundSnafu {
            target: target.clone(),
        };

        let owner = match target {
            LikeTarget::Video(id) => {
                Video::find(id, db)
                    .await
                    .context(DatabaseSnafu)?
                    .with_context(missing)?
                    .owner
            }
            LikeTarget::Comment(id) => {
                Comment::find(id, db)
                    .await
                    .context(DatabaseSnafu)?
                    .with_context(missing)?
                    .owner
            }
            LikeTarget::Tweet(id) => {
                Tweet::find(id, db)
                    .await
                    .context(DatabaseSnafu)?
                    .with_context(missing)?
                    .owner
            }
        };

        Ok(owner)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngagementError {
    #[snafu(display("like target `{target}` was not found"))]
    TargetNotFound {
        target: LikeTarget,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("channel `{channel}` was not found"))]
    ChannelNotFound {
        channel: Record<User>,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("you cannot like your own content `{target}`"))]
    SelfLike {
        target: LikeTarget,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("you cannot subscribe to your own channel"))]
    SelfSubscription {
        channel: Record<User>,
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
