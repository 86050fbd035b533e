use axum::routing::{get, patch, post};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::service::aggregate::Page;

pub use error::ApiError;
pub use response::ApiResponse;
pub use state::{create_app, App};

pub mod actor;

mod comments;
mod dashboard;
mod error;
mod likes;
mod response;
mod state;
mod subscriptions;
mod videos;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Pagination query parameters shared by every paginated endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    page: Option<i64>,
    limit: Option<i64>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        page(params.page, params.limit)
    }
}

fn page(page: Option<i64>, limit: Option<i64>) -> Page {
    Page::new(page, limit)
}

pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/likes/videos", get(likes::liked_videos))
        .route("/likes/videos/:video_id", post(likes::toggle_video))
        .route("/likes/comments/:comment_id", post(likes::toggle_comment))
        .route("/likes/tweets/:tweet_id", post(likes::toggle_tweet))
        .route("/subscriptions/:channel_id", post(subscriptions::toggle))
        .route(
            "/channels/:channel_id/subscribers",
            get(subscriptions::channel_subscribers),
        )
        .route(
            "/users/:subscriber_id/subscriptions",
            get(subscriptions::subscribed_channels),
        )
        .route("/channels/:channel_id/stats", get(dashboard::channel_stats))
        .route(
            "/channels/:channel_id/videos",
            get(dashboard::channel_videos),
        )
        .route("/videos", get(videos::feed).post(videos::publish))
        .route(
            "/videos/:video_id",
            patch(videos::update).delete(videos::delete),
        )
        .route("/videos/:video_id/publish", patch(videos::toggle_publish))
        .route(
            "/videos/:video_id/comments",
            get(comments::list).post(comments::add),
        )
        .route(
            "/comments/:comment_id",
            patch(comments::update).delete(comments::delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}
