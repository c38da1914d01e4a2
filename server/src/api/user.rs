use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tap::TapFallible;

use crate::{database::Database, error::Error, model::User};

/// Creates a user with the next `userId`; the phone number must be unused.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(database): State<Database>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), Error> {
    let Json(mut user) = payload?;

    database
        .user_create(&mut user)
        .await
        .tap_err(|err| tracing::debug!("user was not created: {}", err))?;

    tracing::debug!("created user {} with userId {}", user.name, user.user_id);
    Ok((StatusCode::CREATED, Json(user)))
}
