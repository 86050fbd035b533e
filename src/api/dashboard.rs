use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::database::Record;
use crate::model::Video;
use crate::service::aggregate::ChannelStats;

use super::{ApiResponse, App, PageParams, Result};

#[instrument(skip(app))]
pub async fn channel_stats(
    State(app): State<App>,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<ChannelStats>> {
    let channel = Record::parse(&channel_id)?;
    let stats = app.aggregator.channel_stats(&channel).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched"))
}

#[instrument(skip(app))]
pub async fn channel_videos(
    State(app): State<App>,
    Path(channel_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<ApiResponse<Vec<Video>>> {
    let channel = Record::parse(&channel_id)?;
    let videos = app
        .aggregator
        .channel_videos(&channel, page.into())
        .await?;
    Ok(ApiResponse::ok(videos, "Channel videos fetched"))
}
