use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::database::Record;
use crate::{define_model, define_table};

use super::{OwnerSummary, Timestamp, User, Video};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct Comment {
    #[new(default)]
    pub id: Record<Comment>,
    pub content: String,
    pub video: Record<Video>,
    pub owner: Record<User>,

    #[new(value = "super::now()")]
    pub created_at: Timestamp,
    #[new(value = "super::now()")]
    pub updated_at: Timestamp,
}

define_table!("comments": Comment = id);
define_model!(Comment);

/// A comment joined with its author's reduced profile, the shape returned by
/// the paginated comment feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Record<Comment>,
    pub content: String,
    pub owner: OwnerSummary,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
