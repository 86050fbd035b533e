use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::instrument;

use crate::database::Record;
use crate::model::{Comment, CommentView};

use super::actor::Actor;
use super::{ApiResponse, App, PageParams, Result};

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

#[instrument(skip(app))]
pub async fn list(
    State(app): State<App>,
    Path(video_id): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<ApiResponse<Vec<CommentView>>> {
    let video = Record::parse(&video_id)?;
    let comments = app.aggregator.video_comments(&video, page.into()).await?;
    Ok(ApiResponse::ok(comments, "Comments fetched successfully"))
}

#[instrument(skip(app))]
pub async fn add(
    State(app): State<App>,
    actor: Actor,
    Path(video_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<ApiResponse<Comment>> {
    let video = Record::parse(&video_id)?;
    let comment = app
        .catalog
        .add_comment(&actor.0, &video, body.content)
        .await?;
    Ok(ApiResponse::ok(comment, "Comment added successfully"))
}

#[instrument(skip(app))]
pub async fn update(
    State(app): State<App>,
    actor: Actor,
    Path(comment_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<ApiResponse<Comment>> {
    let comment = Record::parse(&comment_id)?;
    let comment = app
        .catalog
        .update_comment(&actor.0, &comment, body.content)
        .await?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

#[instrument(skip(app))]
pub async fn delete(
    State(app): State<App>,
    actor: Actor,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<()>> {
    let comment = Record::parse(&comment_id)?;
    app.catalog.delete_comment(&actor.0, &comment).await?;
    Ok(ApiResponse::ok((), "Comment deleted successfully"))
}
