use std::{
    ops::{Deref, DerefMut},
    time::Duration,
};

use bson::{doc, Bson, Document};

use crate::{error::Error, model::Resource, util::parse_object_id};

/// Upper bound of a single document lookup.
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

const IMMUTABLE_FIELDS: [&str; 2] = ["_id", "id"];

pub struct Collection<T>(pub mongodb::Collection<T>);

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Collection<T> {
    type Target = mongodb::Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Collection<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<mongodb::Collection<T>> for Collection<T> {
    fn from(value: mongodb::Collection<T>) -> Self {
        Self(value)
    }
}

impl<T> Collection<T>
where
    T: Resource,
{
    fn not_found(id: &str) -> Error {
        Error::NotFound {
            id: id.to_string(),
            collection: T::COLLECTION,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<T>, Error> {
        self.find_all(Document::new()).await
    }

    /// Inserts `document` and writes the assigned identifier back into it.
    #[tracing::instrument(skip_all, fields(collection = %T::COLLECTION))]
    pub async fn create(&self, document: &mut T) -> Result<(), Error> {
        let result = self
            .insert_one(&*document, None)
            .await
            .map_err(unique_violation)?;

        match result.inserted_id.as_object_id() {
            Some(id) => document.assign_id(id),
            None => tracing::warn!("inserted id is not an object id: {}", result.inserted_id),
        }

        tracing::debug!("created document {:?}", document.id());
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<T, Error> {
        let object_id = parse_object_id(id)?;

        let lookup = self.find_one(doc! { "_id": object_id }, None);

        tokio::time::timeout(LOOKUP_TIMEOUT, lookup)
            .await
            .map_err(|_| Error::Timeout(T::COLLECTION))??
            .ok_or_else(|| Self::not_found(id))
    }

    /// `$set` of `fields` on the document. A document that matched but was
    /// left unchanged counts as updated. Nothing is written unless the
    /// document with `fields` applied still decodes as `T`.
    #[tracing::instrument(skip(self, fields), fields(collection = %T::COLLECTION))]
    pub async fn update(&self, id: &str, fields: Document) -> Result<(), Error> {
        let object_id = parse_object_id(id)?;
        check_update(&fields)?;

        let current = self
            .clone_with_type::<Document>()
            .find_one(doc! { "_id": object_id }, None)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        check_schema::<T>(current, &fields)?;

        let result = self
            .update_one(doc! { "_id": object_id }, doc! { "$set": fields }, None)
            .await
            .map_err(unique_violation)?;

        if result.matched_count == 0 {
            return Err(Self::not_found(id));
        }

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(collection = %T::COLLECTION))]
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        let object_id = parse_object_id(id)?;

        let result = self.delete_one(doc! { "_id": object_id }, None).await?;

        if result.deleted_count == 0 {
            return Err(Self::not_found(id));
        }

        Ok(())
    }

    pub async fn find_all(&self, filter: Document) -> Result<Vec<T>, Error> {
        let mut cursor = self.find(filter, None).await?;

        let mut vec = vec![];

        while cursor.advance().await? {
            vec.push(cursor.deserialize_current()?);
        }

        Ok(vec)
    }
}

pub fn check_update(fields: &Document) -> Result<(), Error> {
    if fields.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    if let Some(field) = IMMUTABLE_FIELDS.iter().find(|it| fields.contains_key(**it)) {
        return Err(Error::ImmutableField(field.to_string()));
    }

    Ok(())
}

/// Applies `fields` the way `$set` would and checks the outcome still
/// decodes as `T`. Dotted keys address embedded documents.
pub fn check_schema<T: Resource>(mut current: Document, fields: &Document) -> Result<(), Error> {
    for (key, value) in fields {
        set_path(&mut current, key, value.clone())?;
    }

    let bytes = bson::to_vec(&current)?;

    bson::from_slice::<T>(&bytes)
        .map(|_| ())
        .map_err(|err| Error::InvalidBody(err.to_string()))
}

fn set_path(document: &mut Document, key: &str, value: Bson) -> Result<(), Error> {
    let Some((head, rest)) = key.split_once('.') else {
        document.insert(key, value);
        return Ok(());
    };

    if !document.contains_key(head) {
        document.insert(head, Document::new());
    }

    match document.get_mut(head) {
        Some(Bson::Document(child)) => set_path(child, rest, value),
        _ => Err(Error::InvalidBody(format!("field {head} is not a document"))),
    }
}

/// Turns a unique index violation into `MustUniqueError` naming the field
/// behind the index. Other errors pass through.
pub fn unique_violation(err: mongodb::error::Error) -> Error {
    use mongodb::error::{ErrorKind, WriteFailure};

    let message = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == 11000 => {
            Some(write.message.clone())
        }
        ErrorKind::Command(command) if command.code == 11000 => Some(command.message.clone()),
        _ => None,
    };

    let Some(message) = message else {
        return err.into();
    };

    tracing::debug!("unique index violated: {}", message);
    Error::MustUniqueError(unique_field(&message))
}

/// Field named by the `index: <name>` part of a duplicate key message.
fn unique_field(message: &str) -> String {
    let index = message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or_default();

    match index {
        "phoneNumber_1" => "phone number".to_string(),
        "userId_1" => "user id".to_string(),
        "_id_" => "id".to_string(),
        "" => "value".to_string(),
        other => other.trim_end_matches("_1").to_string(),
    }
}
