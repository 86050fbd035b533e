use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::database::Record;
use crate::model::User;

use super::ApiError;

/// The header the upstream auth collaborator writes the verified caller
/// identity into.
pub const ACTOR_HEADER: &str = "x-user-id";

/// The verified caller identity. Authentication itself happens upstream; this
/// extractor only reads the identity the auth layer already established.
#[derive(Debug, Clone)]
pub struct Actor(pub Record<User>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::validation("missing authenticated actor"))?;

        let user = Record::parse(header)?;
        Ok(Actor(user))
    }
}
