use axum::{
    http::{Method, Uri},
    routing, Router,
};

use crate::{
    app::AppState,
    error::Error,
    model::{Bid, Client, Job, Payment, Point, QuestionAnswer, Review, ServiceProvider, User},
};

pub mod crud;
pub mod profile;
pub mod upload;
pub mod user;

/// Every entity route of the API listener.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(crud::routes::<User>(
            routing::post(user::create),
            crud::update_methods(crud::update::<User>),
        ))
        .merge(crud::routes::<Client>(
            routing::post(profile::create::<Client>),
            crud::update_methods(profile::update::<Client>),
        ))
        .merge(crud::routes::<ServiceProvider>(
            routing::post(profile::create::<ServiceProvider>),
            crud::update_methods(profile::update::<ServiceProvider>),
        ))
        .merge(crud::generic_routes::<Job>())
        .merge(crud::generic_routes::<Bid>())
        .merge(crud::generic_routes::<Review>())
        .merge(crud::generic_routes::<Payment>())
        .merge(crud::generic_routes::<Point>())
        .merge(crud::generic_routes::<QuestionAnswer>())
}

pub async fn fallback(method: Method, uri: Uri) -> Error {
    tracing::debug!("no route for {} {}", method, uri);
    Error::RouteNotFound(uri)
}

#[cfg(test)]
pub mod tests {
    use bson::oid::ObjectId;

    use crate::{app::AppState, database::Database};

    pub struct Bootstrap {
        pub app_state: AppState,
    }

    impl Bootstrap {
        pub fn database(&self) -> &Database {
            &self.app_state.database
        }
    }

    /// Connects to a fresh database named after a new ObjectId. Tests using
    /// it are `#[ignore]`d; run them with `cargo test -- --ignored` against
    /// the server in `MONGODB_URI`.
    pub async fn bootstrap() -> Bootstrap {
        dotenvy::dotenv().ok();
        let mongodb_url = std::env::var("MONGODB_URI")
            .expect("database tests need MONGODB_URI in the environment or .env");

        let database_name = format!("sumon-test-{}", ObjectId::new());
        let app_state = AppState::new(&mongodb_url, &database_name).await.unwrap();
        app_state.run_migration().await.unwrap();

        Bootstrap { app_state }
    }
}
