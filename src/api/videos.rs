use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use crate::database::Record;
use crate::model::{MediaAsset, Video};
use crate::service::aggregate::{FeedFilter, SortField, SortOrder};
use crate::service::catalog::NewVideo;

use super::actor::Actor;
use super::{ApiResponse, App, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    page: Option<i64>,
    limit: Option<i64>,
    query: Option<String>,
    sort_by: Option<String>,
    sort_type: Option<String>,
    user_id: Option<String>,
}

#[instrument(skip(app))]
pub async fn feed(
    State(app): State<App>,
    Query(params): Query<FeedParams>,
) -> Result<ApiResponse<Vec<Video>>> {
    let owner = params
        .user_id
        .as_deref()
        .map(Record::parse)
        .transpose()?;

    let filter = FeedFilter {
        owner,
        query: params.query,
        sort_by: SortField::parse(params.sort_by.as_deref()),
        sort_order: SortOrder::parse(params.sort_type.as_deref()),
    };
    let page = super::page(params.page, params.limit);

    let videos = app.aggregator.video_feed(&filter, page).await?;
    Ok(ApiResponse::ok(videos, "Videos fetched"))
}

#[instrument(skip(app))]
pub async fn publish(
    State(app): State<App>,
    actor: Actor,
    Json(payload): Json<NewVideo>,
) -> Result<ApiResponse<Video>> {
    let video = app.catalog.publish_video(&actor.0, payload).await?;
    Ok(ApiResponse::ok(video, "Video published"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideo {
    pub video_file: MediaAsset,
}

#[instrument(skip(app))]
pub async fn update(
    State(app): State<App>,
    actor: Actor,
    Path(video_id): Path<String>,
    Json(payload): Json<UpdateVideo>,
) -> Result<ApiResponse<Video>> {
    let video = Record::parse(&video_id)?;
    let video = app
        .catalog
        .update_video_media(&actor.0, &video, payload.video_file)
        .await?;
    Ok(ApiResponse::ok(video, "Video updated"))
}

#[instrument(skip(app))]
pub async fn toggle_publish(
    State(app): State<App>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<Video>> {
    let video = Record::parse(&video_id)?;
    let video = app.catalog.toggle_publish(&actor.0, &video).await?;
    Ok(ApiResponse::ok(
        video,
        "Video publish status toggled successfully",
    ))
}

#[instrument(skip(app))]
pub async fn delete(
    State(app): State<App>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<()>> {
    let video = Record::parse(&video_id)?;
    app.catalog.delete_video(&actor.0, &video).await?;
    Ok(ApiResponse::ok((), "Video deleted"))
}
