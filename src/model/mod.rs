pub use comment::*;
pub use like::*;
pub use subscription::*;
pub use tweet::*;
pub use user::*;
pub use video::*;

mod comment;
mod like;
mod subscription;
mod tweet;
mod user;
mod video;

pub type Timestamp = chrono::DateTime<chrono::Utc>;

pub fn now() -> Timestamp {
    chrono::Utc::now()
}
