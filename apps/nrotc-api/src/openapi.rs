//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "NROTC API",
        version = "0.1.0",
        description = "User administration API backed by MongoDB"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/admin/users", api = domain_users::ApiDoc)
    ),
    tags(
        (name = "Users", description = "User administration endpoints")
    )
)]
pub struct ApiDoc;
