use anyhow::Context;
use sumon::{
    api::upload::UploadState,
    app::{upload_router, AppState},
    config::Settings,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sumon=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let app_state = AppState::from_settings(&settings)
        .await
        .context("invalid MongoDB connection string")?;

    app_state
        .database
        .ping()
        .await
        .context("cannot reach MongoDB")?;
    tracing::info!("connected to MongoDB database {}", settings.database_name);

    app_state.run_migration().await?;

    let api = app_state.router();
    let upload = upload_router(UploadState {
        dir: settings.upload_dir.clone(),
    });

    tracing::debug!("API listening on {}", settings.api_addr);
    tracing::debug!("uploader listening on {}", settings.upload_addr);

    tokio::try_join!(
        axum::Server::bind(&settings.api_addr).serve(api.into_make_service()),
        axum::Server::bind(&settings.upload_addr).serve(upload.into_make_service()),
    )?;

    Ok(())
}
