//! REST routes.
//!
//! Every route answers with a [`ResponseEnvelope`]. Domain failures
//! (unknown id, full town, wrong password, empty field) are `200 OK` with
//! `isOK: false` and a fixed message. Only unexpected failures become a
//! `500`, and their detail stays in the log. A body that does not parse
//! gets a fixed `isOK: false` message as well.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use covey_protocol::{
    Empty, InvitationId, InvitationLinkResponse, InviteUserRequest,
    JoinLinkResponse, ResponseEnvelope, TownCreateRequest, TownCreateResponse,
    TownDeleteRequest, TownId, TownJoinRequest, TownJoinResponse,
    TownListResponse, TownUpdateRequest, UserCreateRequest, UserCreateResponse,
    UserListResponse,
};
use covey_town::TownError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::SharedState;

const NO_SUCH_TOWN: &str = "Error: No such town";
const MAX_CAPACITY: &str = "Error: Max capacity at town";
const DELETE_FAILED: &str =
    "Invalid password. Please double check your town update password.";
const UPDATE_FAILED: &str = "Invalid password or update values specified. \
     Please double check your town update password.";
const INVITE_FAILED: &str =
    "Unable to invite user: no such user or town, or user is not connected";
const BAD_REQUEST: &str =
    "Invalid request: required fields are missing or malformed";
const INTERNAL_ERROR: &str =
    "Internal server error, please see log in server for more details";

type Envelope<T> = Json<ResponseEnvelope<T>>;

/// Create all REST routes.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/user", post(create_user).get(list_users))
        .route("/invitation", post(invite_user))
        .route("/invitation/{town_id}", get(invitation_link))
        .route("/joinInvitation/{invitation_id}", get(join_link))
        .route(
            "/town",
            post(create_town)
                .get(list_towns)
                .delete(delete_town)
                .patch(update_town),
        )
        .route("/town/join", post(join_town))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds a CORS layer from a comma-separated origin list, or `*`.
///
/// Returns `None` when no usable origin is given.
pub fn cors_layer(allowed_origins: &str) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins.trim();
    if allowed_origins.is_empty() {
        return None;
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(cors.allow_origin(origins))
}

// =============================================================================
// Users and invitations
// =============================================================================

async fn create_user(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<UserCreateRequest>,
) -> Envelope<UserCreateResponse> {
    let created = state.users.lock().await.create_user(&req.username);
    Json(match created {
        Ok(user) => ResponseEnvelope::ok(UserCreateResponse {
            username: user.username,
            user_id: user.id,
            user_token: user.token,
        }),
        Err(e) => ResponseEnvelope::err(e.to_string()),
    })
}

async fn list_users(State(state): State<SharedState>) -> Envelope<UserListResponse> {
    let users = state.users.lock().await.users();
    Json(ResponseEnvelope::ok(UserListResponse { users }))
}

async fn invitation_link(
    State(state): State<SharedState>,
    Path(town_id): Path<TownId>,
) -> Envelope<InvitationLinkResponse> {
    let handle = state.towns.lock().await.town(&town_id);
    Json(match handle {
        Some(handle) => ResponseEnvelope::ok(InvitationLinkResponse {
            invitation_id: handle.invitation_id().clone(),
        }),
        None => ResponseEnvelope::err(NO_SUCH_TOWN),
    })
}

async fn join_link(
    State(state): State<SharedState>,
    Path(invitation_id): Path<InvitationId>,
) -> Result<Envelope<JoinLinkResponse>, ApiError> {
    let Some(handle) = state.towns.lock().await.town_by_invitation(&invitation_id)
    else {
        return Ok(Json(ResponseEnvelope::err(NO_SUCH_TOWN)));
    };

    match handle.info().await {
        Ok(info) => Ok(Json(ResponseEnvelope::ok(JoinLinkResponse {
            covey_town_id: info.town_id,
            friendly_name: info.friendly_name,
        }))),
        // Deleted between lookup and query.
        Err(TownError::Unavailable(_)) => Ok(Json(ResponseEnvelope::err(NO_SUCH_TOWN))),
        Err(e) => Err(e.into()),
    }
}

async fn invite_user(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<InviteUserRequest>,
) -> Envelope<Empty> {
    let towns = state.towns.lock().await;
    let users = state.users.lock().await;
    let invited = users
        .invite_user(&req.invited_user_id, &req.covey_town_id, &towns)
        .await;

    Json(if invited {
        ResponseEnvelope::ok(Empty {})
    } else {
        ResponseEnvelope::err(INVITE_FAILED)
    })
}

// =============================================================================
// Towns
// =============================================================================

async fn create_town(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<TownCreateRequest>,
) -> Envelope<TownCreateResponse> {
    let created = state
        .towns
        .lock()
        .await
        .create_town(&req.friendly_name, req.is_publicly_listed);
    Json(match created {
        Ok(town) => ResponseEnvelope::ok(TownCreateResponse {
            covey_town_id: town.town_id,
            covey_town_password: town.update_password,
        }),
        Err(e) => ResponseEnvelope::err(e.to_string()),
    })
}

async fn list_towns(State(state): State<SharedState>) -> Envelope<TownListResponse> {
    let towns = state.towns.lock().await.list_towns().await;
    Json(ResponseEnvelope::ok(TownListResponse { towns }))
}

async fn join_town(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<TownJoinRequest>,
) -> Result<Envelope<TownJoinResponse>, ApiError> {
    let Some(handle) = state.towns.lock().await.town(&req.covey_town_id) else {
        return Ok(Json(ResponseEnvelope::err(NO_SUCH_TOWN)));
    };

    match handle.add_player(&req.user_name).await {
        Ok(joined) => Ok(Json(ResponseEnvelope::ok(TownJoinResponse {
            covey_user_id: joined.player.id,
            covey_session_token: joined.session_token,
            current_players: joined.current_players,
            friendly_name: joined.friendly_name,
            is_publicly_listed: joined.is_publicly_listed,
        }))),
        Err(TownError::Full(_)) => Ok(Json(ResponseEnvelope::err(MAX_CAPACITY))),
        Err(TownError::Unavailable(_)) => Ok(Json(ResponseEnvelope::err(NO_SUCH_TOWN))),
        Err(e) => Err(e.into()),
    }
}

async fn delete_town(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<TownDeleteRequest>,
) -> Envelope<Empty> {
    let deleted = state
        .towns
        .lock()
        .await
        .delete_town(&req.covey_town_id, &req.covey_town_password)
        .await;
    Json(if deleted {
        ResponseEnvelope::ok(Empty {})
    } else {
        ResponseEnvelope::err(DELETE_FAILED)
    })
}

async fn update_town(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<TownUpdateRequest>,
) -> Envelope<Empty> {
    let updated = state
        .towns
        .lock()
        .await
        .update_town(
            &req.covey_town_id,
            &req.covey_town_password,
            req.friendly_name,
            req.is_publicly_listed,
        )
        .await;
    Json(if updated {
        ResponseEnvelope::ok(Empty {})
    } else {
        ResponseEnvelope::err(UPDATE_FAILED)
    })
}

// =============================================================================
// Request bodies and errors
// =============================================================================

/// A JSON request body.
///
/// Unlike bare [`Json`], a body that fails to parse is answered with the
/// usual envelope (`isOK: false`) instead of axum's plain-text rejection.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = BadRequest;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(BadRequest(rejection)),
        }
    }
}

/// A request body that could not be read. The parser's detail is logged,
/// never returned.
#[derive(Debug)]
pub struct BadRequest(JsonRejection);

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self.0.body_text(), "rejected request body");
        Json(ResponseEnvelope::<Empty>::err(BAD_REQUEST)).into_response()
    }
}

/// An unexpected failure. Rendered as a `500` with a generic message.
#[derive(Debug)]
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ResponseEnvelope::<Empty>::err(INTERNAL_ERROR)),
        )
            .into_response()
    }
}

impl From<TownError> for ApiError {
    fn from(e: TownError) -> Self {
        ApiError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_blank_is_none() {
        assert!(cors_layer("").is_none());
        assert!(cors_layer(" , ").is_none());
    }

    #[test]
    fn test_cors_layer_wildcard_and_list_are_some() {
        assert!(cors_layer("*").is_some());
        assert!(cors_layer("http://localhost:3000, https://covey.town").is_some());
    }

    #[test]
    fn test_api_error_renders_generic_500() {
        let response = ApiError("actor crashed".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
