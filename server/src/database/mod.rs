//! Data access over the marketplace database.
//!
//! The generic operations live on [`Collection`]; this module hands out typed
//! collections and owns the collection level maintenance. Composite writes
//! spanning the user and profile collections are in [`extended`].

use bson::{doc, Document};

use crate::{
    error::Error,
    model::{CollectionName, Resource},
    mongo_ext::Collection,
};

pub mod extended;

pub(crate) const COUNTERS: &str = "counters";
pub(crate) const USER_SEQUENCE: &str = "userId";

#[derive(Clone)]
pub struct Database(pub mongodb::Database);

impl std::ops::Deref for Database {
    type Target = mongodb::Database;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<mongodb::Database> for Database {
    fn from(value: mongodb::Database) -> Self {
        Self(value)
    }
}

impl Database {
    pub fn collection_of<T: Resource>(&self) -> Collection<T> {
        self.0.collection(T::COLLECTION.as_str()).into()
    }

    pub(crate) fn documents(&self, name: &str) -> mongodb::Collection<Document> {
        self.0.collection(name)
    }

    pub async fn ping(&self) -> Result<(), Error> {
        self.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Removes every document of an allowlisted collection. Clearing the
    /// users also restarts their `userId` sequence.
    #[tracing::instrument(skip(self))]
    pub async fn clear_collection(&self, name: &str) -> Result<(), Error> {
        let collection: CollectionName = name.parse()?;

        self.documents(collection.as_str())
            .delete_many(Document::new(), None)
            .await?;

        if collection == CollectionName::User {
            self.documents(COUNTERS)
                .delete_one(doc! { "_id": USER_SEQUENCE }, None)
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use assert_matches::assert_matches;
    use bson::oid::ObjectId;
    use rust_decimal::Decimal;

    use crate::{
        api::tests::bootstrap,
        error::Error,
        model::{Bid, CollectionName, Identifiable, Review},
    };

    pub fn bid(description: &str, amount: i64) -> Bid {
        Bid {
            description: description.to_string(),
            time: "2 days".to_string(),
            bid_amount: Decimal::from(amount),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_create_then_get() {
        let bootstrap = bootstrap().await;
        let bids = bootstrap.database().collection_of::<Bid>();

        let mut created = bid("Bid 1 description", 100);
        bids.create(&mut created).await.unwrap();

        let id = created.id().expect("id should be assigned after create");
        let fetched = bids.get(&id.to_hex()).await.unwrap();

        assert_eq!(fetched, created);
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_create_keeps_given_id() {
        let bootstrap = bootstrap().await;
        let bids = bootstrap.database().collection_of::<Bid>();

        let id = ObjectId::new();
        let mut created = bid("preset id", 10);
        created.assign_id(id);
        bids.create(&mut created).await.unwrap();

        assert_eq!(created.id(), Some(id));
        assert_eq!(bids.get(&id.to_hex()).await.unwrap().description, "preset id");
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_delete_then_get() {
        let bootstrap = bootstrap().await;
        let bids = bootstrap.database().collection_of::<Bid>();

        let mut created = bid("to be deleted", 5);
        bids.create(&mut created).await.unwrap();
        let id = created.id().unwrap().to_hex();

        bids.delete(&id).await.unwrap();

        let err = bids.get(&id).await.expect_err("bid should be deleted");
        assert_matches!(
            err,
            Error::NotFound { id: missing, collection: CollectionName::Bid } if missing == id
        );

        let err = bids.delete(&id).await.expect_err("bid is already deleted");
        assert_matches!(err, Error::NotFound { .. });
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_update_changes_only_named_fields() {
        let bootstrap = bootstrap().await;
        let reviews = bootstrap.database().collection_of::<Review>();

        let mut created = Review {
            review: "good".to_string(),
            timelines: 4.0,
            quality: 5.0,
            communication: 3.0,
            behavior: 5.0,
            ..Default::default()
        };
        reviews.create(&mut created).await.unwrap();
        let id = created.id().unwrap().to_hex();

        reviews
            .update(&id, bson::doc! { "review": "great", "quality": 4.5 })
            .await
            .unwrap();

        let updated = reviews.get(&id).await.unwrap();
        assert_eq!(updated.review, "great");
        assert_eq!(updated.quality, 4.5);
        assert_eq!(updated.timelines, 4.0);
        assert_eq!(updated.communication, 3.0);

        // same values again is still a match
        reviews
            .update(&id, bson::doc! { "review": "great" })
            .await
            .unwrap();

        let err = reviews
            .update(&ObjectId::new().to_hex(), bson::doc! { "review": "x" })
            .await
            .unwrap_err();
        assert_matches!(err, Error::NotFound { collection: CollectionName::Review, .. });
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_get_all_and_find() {
        let bootstrap = bootstrap().await;
        let bids = bootstrap.database().collection_of::<Bid>();

        for amount in 1..=5 {
            bids.create(&mut bid(&format!("bid {amount}"), amount))
                .await
                .unwrap();
        }

        assert_eq!(bids.get_all().await.unwrap().len(), 5);

        let found = bids
            .find_all(bson::doc! { "description": "bid 3" })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].bid_amount, Decimal::from(3));
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_invalid_id() {
        let bootstrap = bootstrap().await;
        let bids = bootstrap.database().collection_of::<Bid>();

        assert_matches!(bids.get("nope").await, Err(Error::InvalidId(..)));
        assert_matches!(bids.delete("nope").await, Err(Error::InvalidId(..)));
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server in MONGODB_URI"]
    async fn test_clear_collection() {
        let bootstrap = bootstrap().await;
        let database = bootstrap.database();
        let bids = database.collection_of::<Bid>();

        bids.create(&mut bid("one", 1)).await.unwrap();
        bids.create(&mut bid("two", 2)).await.unwrap();

        database.clear_collection("bid").await.unwrap();
        assert!(bids.get_all().await.unwrap().is_empty());

        assert_matches!(
            database.clear_collection("bids").await,
            Err(Error::UnknownCollection(..))
        );
    }
}
