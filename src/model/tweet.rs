use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::database::Record;
use crate::{define_model, define_table};

use super::{Timestamp, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct Tweet {
    #[new(default)]
    pub id: Record<Tweet>,
    pub content: String,
    pub owner: Record<User>,

    #[new(value = "super::now()")]
    pub created_at: Timestamp,
    #[new(value = "super::now()")]
    pub updated_at: Timestamp,
}

define_table!("tweets": Tweet = id);
define_model!(Tweet);
