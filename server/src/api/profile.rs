//! Handlers of the profile collections, whose writes also touch the user
//! collection.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

use super::crud::update_fields;
use crate::{database::Database, error::Error, model::RoleProfile, util::IdParam};

#[tracing::instrument(skip_all, fields(collection = %P::COLLECTION))]
pub async fn create<P: RoleProfile>(
    State(database): State<Database>,
    payload: Result<Json<P>, JsonRejection>,
) -> Result<(StatusCode, Json<P>), Error> {
    let Json(mut profile) = payload?;

    database.profile_create(&mut profile).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

#[tracing::instrument(skip(database, payload), fields(collection = %P::COLLECTION))]
pub async fn update<P: RoleProfile>(
    State(database): State<Database>,
    IdParam(id): IdParam,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<P>, Error> {
    let fields = update_fields(payload)?;

    database.profile_update::<P>(&id, fields).await?;

    Ok(Json(database.collection_of::<P>().get(&id).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::State,
        http::{header, Method, Request, StatusCode},
        Json,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::{
        api::tests::bootstrap,
        database::extended::tests::user,
        model::{Client, Identifiable, ServiceProvider, User, UserType},
        util::IdParam,
    };

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_client_create_and_update_handlers() {
        let bootstrap = bootstrap().await;
        let database = bootstrap.database().clone();

        let client = Client {
            user: user("Client", "01712345678", UserType::Client),
            location: "Khulna".to_string(),
            ..Default::default()
        };

        let (status, Json(created)) = super::create(State(database.clone()), Ok(Json(client)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id(), created.user.id());

        let id = created.id().unwrap().to_hex();
        let body = json!({ "location": "Sylhet", "fatherName": "New Father" });
        let Json(updated) = super::update::<Client>(
            State(database.clone()),
            IdParam(id.clone()),
            Ok(Json(body.as_object().unwrap().clone())),
        )
        .await
        .unwrap();

        assert_eq!(updated.location, "Sylhet");
        assert_eq!(updated.user.father_name, "New Father");

        let stored_user = database.collection_of::<User>().get(&id).await.unwrap();
        assert_eq!(stored_user.father_name, "New Father");
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_service_provider_role_mismatch_over_http() {
        let bootstrap = bootstrap().await;

        let body = json!({
            "user": {
                "name": "Not A Provider",
                "phoneNumber": "01712345678",
                "userType": "client",
            },
            "skill": "carpentry",
        });

        let response = bootstrap
            .app_state
            .clone()
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/serviceProvider/create")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(bootstrap
            .database()
            .collection_of::<ServiceProvider>()
            .get_all()
            .await
            .unwrap()
            .is_empty());
    }
}
