use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::database::{Record, Thing};
use crate::{define_model, define_relation, define_table};

use super::{Comment, Timestamp, Tweet, User, Video};

/// The one entity a like points at. Stored as a single record pointer whose
/// table encodes the kind, so a like can never reference two targets at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Video(Record<Video>),
    Comment(Record<Comment>),
    Tweet(Record<Tweet>),
}

impl LikeTarget {
    pub fn thing(&self) -> &Thing {
        match self {
            LikeTarget::Video(id) => id.as_ref(),
            LikeTarget::Comment(id) => id.as_ref(),
            LikeTarget::Tweet(id) => id.as_ref(),
        }
    }
}

impl std::fmt::Display for LikeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.thing().fmt(f)
    }
}

impl Serialize for LikeTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.thing().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LikeTarget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use crate::database::Table as _;

        let thing = Thing::deserialize(deserializer)?;
        let target = match thing.tb.as_str() {
            t if t == Video::table() => LikeTarget::Video(Record::new(thing.id)),
            t if t == Comment::table() => LikeTarget::Comment(Record::new(thing.id)),
            t if t == Tweet::table() => LikeTarget::Tweet(Record::new(thing.id)),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "`{other}` is not a likeable table"
                )))
            }
        };

        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct Like {
    #[new(default)]
    pub id: Record<Like>,
    pub user: Record<User>,
    pub target: LikeTarget,

    #[new(value = "super::now()")]
    pub created_at: Timestamp,
}

define_table!("likes": Like = id);
define_model!(Like);

define_relation! {
    Like > remove_edge(user: &Record<User>, target: &LikeTarget) > Vec<Like>
        where "DELETE likes WHERE user = $user AND target = $target RETURN BEFORE"
}

define_relation! {
    Like > video_targets(user: &Record<User>) > Vec<Thing>
        where "SELECT VALUE target FROM likes WHERE user = $user AND meta::tb(target) = 'videos'"
}
