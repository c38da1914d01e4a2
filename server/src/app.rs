use axum::{
    extract::FromRef,
    http::{header, HeaderName, Method},
    routing, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    api::{self, upload::UploadState},
    config::Settings,
    database::Database,
    migrate::{MigrateModel, MigrationCollection},
};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub database: Database,
    pub migrate_collection: MigrationCollection,
}

impl AppState {
    pub async fn new(
        mongo_url: &str,
        database_name: &str,
    ) -> Result<Self, mongodb::error::Error> {
        let mongo_client_opt = mongodb::options::ClientOptions::parse(mongo_url).await?;
        let mongo_client = mongodb::Client::with_options(mongo_client_opt)?;

        let db = mongo_client.database(database_name);
        Ok(Self {
            migrate_collection: MigrationCollection(db.collection::<MigrateModel>("migrations").into()),
            database: db.into(),
        })
    }

    pub async fn from_settings(settings: &Settings) -> Result<Self, mongodb::error::Error> {
        Self::new(&settings.mongodb_uri, &settings.database_name).await
    }

    pub fn router(self) -> Router {
        api::routes()
            .fallback(api::fallback)
            .with_state(self)
            .layer(cors())
            .layer(TraceLayer::new_for_http())
    }
}

pub fn upload_router(state: UploadState) -> Router {
    Router::new()
        .route("/upload", routing::post(api::upload::upload_file))
        .layer(api::upload::body_limit())
        .fallback(api::fallback)
        .with_state(state)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
        ])
}
