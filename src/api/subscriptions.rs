use axum::extract::{Path, State};
use tracing::instrument;

use crate::database::Record;
use crate::model::Subscription;
use crate::service::engagement::ToggleState;

use super::actor::Actor;
use super::likes::ToggleOutcome;
use super::{ApiResponse, App, Result};

#[instrument(skip(app))]
pub async fn toggle(
    State(app): State<App>,
    actor: Actor,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<ToggleOutcome>> {
    let channel = Record::parse(&channel_id)?;
    let state = app
        .engagement
        .toggle_subscription(&actor.0, &channel)
        .await?;

    let message = match state {
        ToggleState::Added => "Subscribed",
        ToggleState::Removed => "Unsubscribed",
    };
    Ok(ApiResponse::ok(ToggleOutcome { state }, message))
}

#[instrument(skip(app))]
pub async fn channel_subscribers(
    State(app): State<App>,
    Path(channel_id): Path<String>,
) -> Result<ApiResponse<Vec<Subscription>>> {
    let channel = Record::parse(&channel_id)?;
    let subscribers = app.aggregator.channel_subscribers(&channel).await?;
    Ok(ApiResponse::ok(
        subscribers,
        "Channel subscribers fetched successfully",
    ))
}

#[instrument(skip(app))]
pub async fn subscribed_channels(
    State(app): State<App>,
    Path(subscriber_id): Path<String>,
) -> Result<ApiResponse<Vec<Subscription>>> {
    let subscriber = Record::parse(&subscriber_id)?;
    let channels = app.aggregator.subscribed_channels(&subscriber).await?;
    Ok(ApiResponse::ok(channels, "Subscribed channel list fetched"))
}
