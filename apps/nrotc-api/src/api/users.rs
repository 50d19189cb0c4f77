//! Users resource wiring

use axum_helpers::ResourceRoutes;
use domain_users::{MongoUserRepository, UserService, handlers};
use mongodb::Database;

use crate::state::AppState;

pub fn routes(state: &AppState) -> ResourceRoutes {
    let repository = MongoUserRepository::new(state.db.clone());
    handlers::routes(UserService::new(repository))
}

/// Create the unique username index before serving writes
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoUserRepository::new(db.clone()).init_indexes().await?;
    Ok(())
}
