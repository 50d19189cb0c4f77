//! Mounting of resource routers under public and admin prefixes.
//!
//! Each resource contributes up to two routers. The public router is nested at
//! `/{name}` and the admin router at `/admin/{name}`. The combined router is
//! usually handed to [`create_router`](crate::server::create_router), which
//! nests it under `/api`.

use axum::Router;
use tracing::debug;

/// Routers contributed by one resource.
#[derive(Default)]
pub struct ResourceRoutes {
    /// Path segment, e.g. `users`
    pub name: &'static str,
    pub public: Option<Router>,
    pub admin: Option<Router>,
}

impl ResourceRoutes {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn with_public(mut self, router: Router) -> Self {
        self.public = Some(router);
        self
    }

    pub fn with_admin(mut self, router: Router) -> Self {
        self.admin = Some(router);
        self
    }
}

/// Combines resource routers into one router.
///
/// Groups that are `None` are skipped and logged at debug level.
pub fn mount_resources(resources: impl IntoIterator<Item = ResourceRoutes>) -> Router {
    let mut router = Router::new();

    for resource in resources {
        let name = resource.name;

        match resource.public {
            Some(public) => {
                debug!(resource = name, "mounting public routes at /{}", name);
                router = router.nest(&format!("/{}", name), public);
            }
            None => debug!(resource = name, "no public routes"),
        }

        match resource.admin {
            Some(admin) => {
                debug!(resource = name, "mounting admin routes at /admin/{}", name);
                router = router.nest(&format!("/admin/{}", name), admin);
            }
            None => debug!(resource = name, "no admin routes"),
        }
    }

    router
}
