use axum::extract::{Path, State};
use serde::Serialize;
use tracing::instrument;

use crate::database::Record;
use crate::model::{LikeTarget, VideoWithOwner};
use crate::service::engagement::ToggleState;

use super::actor::Actor;
use super::{ApiResponse, App, Result};

/// The toggle contract's response body: which state the edge ended up in.
#[derive(Debug, Serialize)]
pub struct ToggleOutcome {
    pub state: ToggleState,
}

fn outcome(state: ToggleState, target: &str) -> ApiResponse<ToggleOutcome> {
    let message = match state {
        ToggleState::Added => format!("{target} liked"),
        ToggleState::Removed => format!("{target} unliked"),
    };
    ApiResponse::ok(ToggleOutcome { state }, message)
}

#[instrument(skip(app))]
pub async fn toggle_video(
    State(app): State<App>,
    actor: Actor,
    Path(video_id): Path<String>,
) -> Result<ApiResponse<ToggleOutcome>> {
    let video = Record::parse(&video_id)?;
    let state = app
        .engagement
        .toggle_like(&actor.0, LikeTarget::Video(video))
        .await?;
    Ok(outcome(state, "Video"))
}

#[instrument(skip(app))]
pub async fn toggle_comment(
    State(app): State<App>,
    actor: Actor,
    Path(comment_id): Path<String>,
) -> Result<ApiResponse<ToggleOutcome>> {
    let comment = Record::parse(&comment_id)?;
    let state = app
        .engagement
        .toggle_like(&actor.0, LikeTarget::Comment(comment))
        .await?;
    Ok(outcome(state, "Comment"))
}

#[instrument(skip(app))]
pub async fn toggle_tweet(
    State(app): State<App>,
    actor: Actor,
    Path(tweet_id): Path<String>,
) -> Result<ApiResponse<ToggleOutcome>> {
    let tweet = Record::parse(&tweet_id)?;
    let state = app
        .engagement
        .toggle_like(&actor.0, LikeTarget::Tweet(tweet))
        .await?;
    Ok(outcome(state, "Tweet"))
}

#[instrument(skip(app))]
pub async fn liked_videos(
    State(app): State<App>,
    actor: Actor,
) -> Result<ApiResponse<Vec<VideoWithOwner>>> {
    let videos = app.aggregator.liked_videos(&actor.0).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched"))
}
