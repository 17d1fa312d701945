use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    middleware,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::require_basic_auth,
    error::{ApiError, ErrorBody},
    state::AppState,
    users::{
        dto::{CreatedUserResponse, OkResponse, UserPayload},
        permissions::Capability,
        repo_types::User,
        validate::validate,
    },
};

/// All `/users` routes, behind basic auth.
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/", post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_basic_auth))
}

/// Fetch a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = u64, Path, description = "The ID of the user to fetch")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 404, description = "No live user with this id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    security(("basic_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(id)?;
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users/",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 200, description = "The created user", body = CreatedUserResponse),
        (status = 400, description = "Validation failed or malformed body", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    security(("basic_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<CreatedUserResponse>, ApiError> {
    let payload = body(payload)?;

    if let Err(e) = validate(&payload) {
        warn!(error = %e, "invalid user payload");
        return Err(e.into());
    }

    let user = state.users.create(&payload.into_new_user()).await?;

    info!(user_id = user.id, username = %user.username, "user created");
    Ok(Json(CreatedUserResponse { ok: true, user }))
}

/// Update a user by ID
///
/// The body is not run through the validator; empty fields leave the stored
/// value untouched.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = u64, Path, description = "The ID of the user to update")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated", body = OkResponse),
        (status = 400, description = "Malformed id or body", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 403, description = "User lacks the PUT capability", body = ErrorBody),
        (status = 404, description = "No live user with this id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    security(("basic_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = user_id(id)?;
    let payload = body(payload)?;

    let existing = state.users.get_by_id(id).await?;
    ensure_allowed(&existing, Capability::Put, "You cannot update this user")?;

    state.users.update_by_id(id, &payload.into_changes()).await?;

    info!(user_id = id, "user updated");
    Ok(Json(OkResponse::ok()))
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = u64, Path, description = "The ID of the user to delete")),
    responses(
        (status = 200, description = "Soft-deleted", body = OkResponse),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 403, description = "User lacks the DELETE capability", body = ErrorBody),
        (status = 404, description = "No live user with this id", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ),
    security(("basic_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let id = user_id(id)?;

    let existing = state.users.get_by_id(id).await?;
    ensure_allowed(&existing, Capability::Delete, "You cannot delete this user")?;

    state.users.delete_by_id(id).await?;

    info!(user_id = id, "user deleted");
    Ok(Json(OkResponse::ok()))
}

fn user_id(path: Result<Path<u64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    i64::try_from(id).map_err(|_| ApiError::BadRequest(format!("User id {id} is out of range")))
}

fn body(payload: Result<Json<UserPayload>, JsonRejection>) -> Result<UserPayload, ApiError> {
    payload
        .map(|Json(p)| p)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn ensure_allowed(user: &User, capability: Capability, message: &str) -> Result<(), ApiError> {
    if user.capabilities().allows(capability) {
        return Ok(());
    }
    warn!(user_id = user.id, %capability, permissions = %user.permissions, "capability missing");
    Err(ApiError::Forbidden(message.to_string()))
}
