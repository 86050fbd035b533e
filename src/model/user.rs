use derive_new::new;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::database::Record;
use crate::{define_model, define_table};

use super::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct User {
    #[new(default)]
    pub id: Record<User>,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<Url>,
    #[new(value = "super::now()")]
    pub created_at: Timestamp,
}

define_table!("users": User = id);
define_model!(User);

/// The reduced owner profile that joined reads embed instead of the full
/// [User] record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: Record<User>,
    pub username: String,
    pub avatar: Option<Url>,
}
