use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{JsonOrForm, ResourceRoutes};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{User, UserInput};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Bytes a path segment cannot carry literally. Sub-delims, `:` and `@`
/// stay as they are.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// OpenAPI documentation for the admin users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, patch_user, delete_user),
    components(schemas(User, UserInput)),
    tags(
        (name = "Users", description = "User administration endpoints")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{username}",
            get(get_user).patch(patch_user).delete(delete_user),
        )
        .with_state(shared_service)
}

/// Users expose no public routes; everything sits in the admin group.
pub fn routes<R: UserRepository + 'static>(service: UserService<R>) -> ResourceRoutes {
    ResourceRoutes::new("users").with_admin(router(service))
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<Vec<User>>> {
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// Create a user
///
/// Accepts JSON or URL-encoded form bodies.
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body(
        content((UserInput = "application/json"), (UserInput = "application/x-www-form-urlencoded"))
    ),
    responses(
        (status = 201, description = "User created", body = User,
            headers(("Location" = String, description = "Path of the new user"))),
        (status = 400, description = "Validation failed, keyed by field", body = Object),
        (status = 409, description = "Duplicate username detected", body = String, content_type = "text/plain"),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    JsonOrForm(input): JsonOrForm<UserInput>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    let location = format!(
        "/users/{}",
        utf8_percent_encode(&user.username, PATH_SEGMENT)
    );

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

/// Get a user by username
#[utoipa::path(
    get,
    path = "/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Username, matched exactly")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found"),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
) -> UserResult<Json<User>> {
    let user = service.get_user(&username).await?;
    Ok(Json(user))
}

/// Merge fields into a user
#[utoipa::path(
    patch,
    path = "/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Username, matched exactly")),
    request_body(
        content((UserInput = "application/json"), (UserInput = "application/x-www-form-urlencoded"))
    ),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 500, description = "Validation or store failure", body = String, content_type = "text/plain")
    )
)]
async fn patch_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
    JsonOrForm(input): JsonOrForm<UserInput>,
) -> UserResult<Json<User>> {
    let user = service.patch_user(&username, input).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{username}",
    tag = "Users",
    params(("username" = String, Path, description = "Username, matched exactly")),
    responses(
        (status = 200, description = "Removed user", body = User),
        (status = 404, description = "User not found"),
        (status = 500, description = "Store failure", body = String, content_type = "text/plain")
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
) -> UserResult<Json<User>> {
    let user = service.delete_user(&username).await?;
    Ok(Json(user))
}
