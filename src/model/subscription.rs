use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::database::Record;
use crate::{define_model, define_relation, define_table};

use super::{Timestamp, User};

/// A subscription edge from a user to a channel. A channel is just another
/// user acting as the subject of subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct Subscription {
    #[new(default)]
    pub id: Record<Subscription>,
    pub subscriber: Record<User>,
    pub channel: Record<User>,

    #[new(value = "super::now()")]
    pub created_at: Timestamp,
}

define_table!("subscriptions": Subscription = id);
define_model!(Subscription);

define_relation! {
    Subscription > by_channel(channel: &Record<User>) > Vec<Subscription>
        where "SELECT * FROM subscriptions WHERE channel = $channel ORDER BY created_at DESC, id ASC"
}

define_relation! {
    Subscription > by_subscriber(subscriber: &Record<User>) > Vec<Subscription>
        where "SELECT * FROM subscriptions WHERE subscriber = $subscriber ORDER BY created_at DESC, id ASC"
}

define_relation! {
    Subscription > remove_edge(subscriber: &Record<User>, channel: &Record<User>) > Vec<Subscription>
        where "DELETE subscriptions WHERE subscriber = $subscriber AND channel = $channel RETURN BEFORE"
}
