//! Handlers shared by every collection.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    handler::Handler,
    http::StatusCode,
    routing::{self, MethodRouter},
    Json, Router,
};
use bson::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tap::TapFallible;

use crate::{
    app::AppState,
    database::Database,
    error::Error,
    model::{CollectionName, Resource},
    util::IdParam,
};

/// Routes of one collection under `/{collection}` with the given create and
/// update handlers.
pub fn routes<T: Resource>(
    create: MethodRouter<AppState>,
    update: MethodRouter<AppState>,
) -> Router<AppState> {
    let base = format!("/{}", T::COLLECTION);

    Router::new()
        .route(&base, routing::get(get_all::<T>))
        .route(&format!("{base}/create"), create)
        .route(&format!("{base}/find"), routing::get(find::<T>))
        .route(&format!("{base}/:id"), routing::get(show::<T>))
        .route(&format!("{base}/:id/update"), update)
        .route(&format!("{base}/:id/delete"), routing::delete(delete::<T>))
        .route(&format!("{base}/:id/find"), routing::get(find::<T>))
}

pub fn generic_routes<T: Resource>() -> Router<AppState> {
    routes::<T>(routing::post(create::<T>), update_methods(update::<T>))
}

/// Accepts an update through PUT, PATCH and POST.
pub fn update_methods<H, P>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<P, AppState>,
    P: 'static,
{
    routing::put(handler.clone())
        .patch(handler.clone())
        .post(handler)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct FindQuery {
    pub collection: Option<String>,
    pub filter: Option<String>,
}

/// Converts a decoded JSON object into a BSON document. Extended JSON such
/// as `{"$oid": "..."}` is understood.
pub fn json_to_document(object: Map<String, Value>) -> Result<Document, String> {
    Document::try_from(object).map_err(|err| err.to_string())
}

pub async fn get_all<T: Resource>(State(database): State<Database>) -> Result<Json<Vec<T>>, Error> {
    let documents = database.collection_of::<T>().get_all().await?;

    Ok(Json(documents))
}

#[tracing::instrument(skip_all, fields(collection = %T::COLLECTION))]
pub async fn create<T: Resource>(
    State(database): State<Database>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), Error> {
    let Json(mut document) = payload?;

    database.collection_of::<T>().create(&mut document).await?;

    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn show<T: Resource>(
    State(database): State<Database>,
    IdParam(id): IdParam,
) -> Result<Json<T>, Error> {
    let document = database
        .collection_of::<T>()
        .get(&id)
        .await
        .tap_err(|err| tracing::debug!("lookup of {} failed: {}", id, err))?;

    Ok(Json(document))
}

/// Partial update of the named fields; answers with the stored document.
#[tracing::instrument(skip(database, payload), fields(collection = %T::COLLECTION))]
pub async fn update<T: Resource>(
    State(database): State<Database>,
    IdParam(id): IdParam,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<T>, Error> {
    let fields = update_fields(payload)?;
    let documents = database.collection_of::<T>();

    documents.update(&id, fields).await?;

    Ok(Json(documents.get(&id).await?))
}

pub(crate) fn update_fields(
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Document, Error> {
    let Json(object) = payload?;

    json_to_document(object).map_err(Error::InvalidBody)
}

#[tracing::instrument(skip(database), fields(collection = %T::COLLECTION))]
pub async fn delete<T: Resource>(
    State(database): State<Database>,
    IdParam(id): IdParam,
) -> Result<Json<MessageResponse>, Error> {
    database.collection_of::<T>().delete(&id).await?;

    Ok(Json(MessageResponse {
        message: "Document deleted successfully".to_string(),
    }))
}

/// Documents matching the JSON `filter` query parameter.
#[tracing::instrument(skip_all, fields(collection = %T::COLLECTION))]
pub async fn find<T: Resource>(
    State(database): State<Database>,
    query: Option<Query<FindQuery>>,
) -> Result<Json<Vec<T>>, Error> {
    let query = query.map(|Query(it)| it).unwrap_or_default();

    if let Some(name) = query.collection.as_deref() {
        let requested: CollectionName = name.parse()?;
        if requested != T::COLLECTION {
            return Err(Error::InvalidFilter(format!(
                "collection {requested} cannot be searched from {}",
                T::COLLECTION
            )));
        }
    }

    let filter = query
        .filter
        .filter(|it| !it.is_empty())
        .ok_or(Error::MissingParameter("filter"))?;

    let filter = serde_json::from_str::<Map<String, Value>>(&filter)
        .map_err(|err| err.to_string())
        .and_then(json_to_document)
        .map_err(Error::InvalidFilter)?;

    tracing::debug!("finding with filter {}", filter);
    let documents = database.collection_of::<T>().find_all(filter).await?;

    Ok(Json(documents))
}
