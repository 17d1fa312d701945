use axum::{routing::get, Json, Router};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::error::ErrorBody;
use crate::state::AppState;
use crate::users::{
    dto::{CreatedUserResponse, OkResponse, UserPayload},
    handlers,
    repo_types::User,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "Sample API for managing users",
        version = "0.0.1"
    ),
    paths(
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user
    ),
    components(schemas(User, UserPayload, CreatedUserResponse, OkResponse, ErrorBody)),
    modifiers(&BasicAuth),
    tags((name = "users", description = "User management"))
)]
pub struct ApiDoc;

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// `GET /openapi.json`, served without auth like `/health`.
pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
