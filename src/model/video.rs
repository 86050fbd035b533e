use derive_new::new;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::database::Record;
use crate::{define_model, define_table};

use super::{OwnerSummary, Timestamp, User};

/// The result of an upload performed by the external blob-store collaborator.
/// The backend only ever consumes this pair, it never uploads anything itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub url: Url,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct Video {
    #[new(default)]
    pub id: Record<Video>,
    pub owner: Record<User>,

    pub title: String,
    pub description: String,
    pub video_file: MediaAsset,
    pub thumbnail: MediaAsset,
    /// Duration in seconds, reported by the blob store.
    pub duration: f64,

    #[new(default)]
    pub views: i64,
    #[new(value = "false")]
    pub is_published: bool,

    #[new(value = "super::now()")]
    pub created_at: Timestamp,
    #[new(value = "super::now()")]
    pub updated_at: Timestamp,
}

define_table!("videos": Video = id);
define_model!(Video);

/// A video joined with its owner's reduced profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoWithOwner {
    pub id: Record<Video>,
    pub owner: OwnerSummary,

    pub title: String,
    pub description: String,
    pub video_file: MediaAsset,
    pub thumbnail: MediaAsset,
    pub duration: f64,

    pub views: i64,
    pub is_published: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
