use bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions};
use tap::TapFallible;
use validator::Validate;

use super::{Database, COUNTERS, USER_SEQUENCE};
use crate::{
    error::Error,
    model::{Client, CollectionName, Identifiable, RoleProfile, ServiceProvider, User},
    mongo_ext::check_update,
    util::parse_object_id,
};

impl Database {
    /// Creates a user with a unique phone number and the next `userId`.
    #[tracing::instrument(skip_all, fields(phone_number = %user.phone_number))]
    pub async fn user_create(&self, user: &mut User) -> Result<(), Error> {
        user.validate()?;

        let users = self.collection_of::<User>();

        let count = users
            .count_documents(doc! { "phoneNumber": user.phone_number.as_str() }, None)
            .await?;

        if count > 0 {
            return Err(Error::MustUniqueError("phone number".to_string()))
                .tap_err(|_| tracing::debug!("tried creating user with existing phone number"));
        }

        user.user_id = self.next_user_id().await?;

        users.create(user).await
    }

    /// Bumps the user sequence, never handing out a number at or below the
    /// current user count.
    async fn next_user_id(&self) -> Result<i64, Error> {
        let count = self
            .collection_of::<User>()
            .count_documents(None, None)
            .await?;
        let count = i64::try_from(count).unwrap_or(i64::MAX);

        let counters = self.documents(COUNTERS);

        counters
            .update_one(
                doc! { "_id": USER_SEQUENCE },
                doc! { "$max": { "seq": count } },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;

        let counter = counters
            .find_one_and_update(
                doc! { "_id": USER_SEQUENCE },
                doc! { "$inc": { "seq": 1_i64 } },
                FindOneAndUpdateOptions::builder()
                    .upsert(true)
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await?;

        Ok(counter
            .and_then(|it| it.get_i64("seq").ok())
            .unwrap_or(count + 1))
    }

    /// Creates the client's user, then the client profile. A user whose
    /// `userType` is not `client` is refused with `RoleMismatch` before
    /// anything is written, where a plain two step insert would have kept
    /// the user and dropped the profile.
    pub async fn client_create(&self, client: &mut Client) -> Result<(), Error> {
        self.profile_create(client).await
    }

    /// Service provider counterpart of [`Database::client_create`]; the user
    /// must be a `serviceProvider`, otherwise `RoleMismatch` and no write.
    pub async fn sp_create(&self, service_provider: &mut ServiceProvider) -> Result<(), Error> {
        self.profile_create(service_provider).await
    }

    pub async fn client_update(&self, id: &str, fields: Document) -> Result<(), Error> {
        self.profile_update::<Client>(id, fields).await
    }

    pub async fn sp_update(&self, id: &str, fields: Document) -> Result<(), Error> {
        self.profile_update::<ServiceProvider>(id, fields).await
    }

    /// Creates the user of `profile`, then the profile under the same `_id`.
    /// The user is removed again when the profile cannot be written.
    #[tracing::instrument(skip_all, fields(collection = %P::COLLECTION))]
    pub async fn profile_create<P: RoleProfile>(&self, profile: &mut P) -> Result<(), Error> {
        let found = profile.user().user_type;
        if found != P::ROLE {
            return Err(Error::RoleMismatch {
                expected: P::ROLE,
                found,
            });
        }

        let user_id = match profile.user().id() {
            Some(id) => id,
            None => {
                let id = ObjectId::new();
                profile.user_mut().assign_id(id);
                id
            }
        };

        self.user_create(profile.user_mut()).await?;
        profile.assign_id(user_id);

        if let Err(err) = self.collection_of::<P>().create(profile).await {
            if let Err(compensation) = self
                .collection_of::<User>()
                .delete(&user_id.to_hex())
                .await
            {
                tracing::error!(
                    "could not remove user {} after failed profile insert: {}",
                    user_id,
                    compensation
                );
            }

            return Err(err);
        }

        Ok(())
    }

    /// Applies `fields` to a profile and, for user fields, to its user.
    /// When the profile write fails the user is restored to its previous
    /// values.
    #[tracing::instrument(skip(self, fields), fields(collection = %P::COLLECTION))]
    pub async fn profile_update<P: RoleProfile>(
        &self,
        id: &str,
        fields: Document,
    ) -> Result<(), Error> {
        let object_id = parse_object_id(id)?;
        check_update(&fields)?;

        let (user_fields, profile_fields) = split_user_fields(fields)?;

        let profiles = self.collection_of::<P>();

        if user_fields.is_empty() {
            return profiles.update(id, profile_fields).await;
        }

        let users = self.documents(CollectionName::User.as_str());

        let snapshot = users
            .find_one(doc! { "_id": object_id }, None)
            .await?
            .ok_or_else(|| Error::NotFound {
                id: id.to_string(),
                collection: CollectionName::User,
            })?;

        self.collection_of::<User>()
            .update(id, user_fields.clone())
            .await?;

        if let Err(err) = profiles.update(id, profile_fields).await {
            let restore = restore_update(&snapshot, &user_fields);

            if let Err(compensation) = users
                .update_one(doc! { "_id": object_id }, restore, None)
                .await
            {
                tracing::error!(
                    "could not restore user {} after failed profile update: {}",
                    id,
                    compensation
                );
            }

            return Err(err);
        }

        Ok(())
    }
}

/// Splits an update into the part stored on the user document and the part
/// stored on the profile, where the user is embedded under `user`. The role
/// and the embedded copy itself cannot be written directly.
fn split_user_fields(fields: Document) -> Result<(Document, Document), Error> {
    let mut user_fields = Document::new();
    let mut profile_fields = Document::new();

    for (key, value) in fields {
        if key == "userType" || key == "user" || key.starts_with("user.") {
            return Err(Error::ImmutableField(key));
        }

        if User::FIELDS.contains(&key.as_str()) {
            profile_fields.insert(format!("user.{key}"), value.clone());
            user_fields.insert(key, value);
        } else {
            profile_fields.insert(key, value);
        }
    }

    Ok((user_fields, profile_fields))
}

/// Update putting the keys of `applied` back to how they were in `snapshot`.
fn restore_update(snapshot: &Document, applied: &Document) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();

    for key in applied.keys() {
        match snapshot.get(key) {
            Some(value) => set.insert(key.clone(), value.clone()),
            None => unset.insert(key.clone(), ""),
        };
    }

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}
