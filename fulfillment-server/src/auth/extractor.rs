//! Actor Extractor
//!
//! Pulls the authenticated principal out of the gateway-injected
//! `X-Actor-Id` / `X-Actor-Role` headers. Use this extractor in handlers
//! that need to know who is calling.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared::error::{AppError, ErrorCode};
use shared::models::{Actor, ActorRole};

/// Header carrying the principal id
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the principal role
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// The authenticated actor for this request
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl CurrentActor {
    pub fn actor(&self) -> &Actor {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted (from middleware)
        if let Some(actor) = parts.extensions.get::<CurrentActor>() {
            return Ok(actor.clone());
        }

        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                tracing::warn!(uri = %parts.uri, "Request without actor identity");
                AppError::unauthorized()
            })?;

        let role_raw = parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let role: ActorRole = role_raw.parse().map_err(|_| {
            AppError::with_message(
                ErrorCode::InvalidRequest,
                format!("unknown actor role: {}", role_raw),
            )
        })?;

        let actor = CurrentActor(Actor::new(id, role));
        parts.extensions.insert(actor.clone());
        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<CurrentActor, AppError> {
        let (mut parts, _) = req.into_parts();
        CurrentActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_actor_from_headers() {
        let req = Request::builder()
            .uri("/orders")
            .header(ACTOR_ID_HEADER, "c-1")
            .header(ACTOR_ROLE_HEADER, "customer")
            .body(())
            .unwrap();
        let actor = extract(req).await.unwrap();
        assert_eq!(actor.0.id, "c-1");
        assert_eq!(actor.0.role, ActorRole::Customer);
    }

    #[tokio::test]
    async fn test_missing_identity_rejected() {
        let req = Request::builder().uri("/orders").body(()).unwrap();
        let err = extract(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let req = Request::builder()
            .uri("/orders")
            .header(ACTOR_ID_HEADER, "x-1")
            .header(ACTOR_ROLE_HEADER, "superuser")
            .body(())
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }
}
