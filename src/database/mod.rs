pub mod mock;

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use crate::utils::ident::bson_id_string;
use crate::utils::AppError;
use mock::MockStore;

#[derive(Debug, Default)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        // Fail fast so the mock fallback kicks in quickly during development
        client_options.connect_timeout = Some(std::time::Duration::from_secs(3));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(3));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        log::info!("🔧 Creating database indexes...");

        let indexes = [
            ("users", doc! { "email": 1 }),
            ("budget_requests", doc! { "club_id": 1 }),
            ("reports", doc! { "club_id": 1 }),
        ];

        for (collection, keys) in indexes {
            let model = IndexModel::builder().keys(keys.clone()).build();
            match self
                .collection::<Document>(collection)
                .create_index(model)
                .await
            {
                Ok(_) => log::info!("   ✅ Index created: {}{}", collection, keys),
                Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Dual-mode persistence: the real document store when reachable, an
/// in-process mock otherwise. Services only see this surface.
pub enum DataStore {
    Mongo(MongoDB),
    Mock(MockStore),
}

impl DataStore {
    /// Connect to MongoDB; on any connection error substitute the mock.
    pub async fn connect(uri: &str, db_name: &str) -> Self {
        match MongoDB::new(uri, db_name).await {
            Ok(db) => {
                log::info!("✅ MongoDB connected: {}", db_name);
                DataStore::Mongo(db)
            }
            Err(e) => {
                log::warn!("⚠️  MongoDB unavailable ({}) - using mock database for development", e);
                DataStore::Mock(MockStore::new())
            }
        }
    }

    pub fn mock() -> Self {
        DataStore::Mock(MockStore::new())
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, DataStore::Mock(_))
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            DataStore::Mongo(db) => {
                db.database()
                    .run_command(doc! { "ping": 1 })
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            DataStore::Mock(_) => Ok(()),
        }
    }

    /// Reset the mock store to its seed state. No-op on a real database.
    pub fn reset_mock(&self) -> bool {
        match self {
            DataStore::Mock(store) => {
                store.reset();
                true
            }
            DataStore::Mongo(_) => false,
        }
    }

    pub async fn find_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Option<Document>, AppError> {
        match self {
            DataStore::Mongo(db) => db
                .collection::<Document>(collection)
                .find_one(filter)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            DataStore::Mock(store) => Ok(store.find_one(collection, &filter)),
        }
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<Vec<Document>, AppError> {
        match self {
            DataStore::Mongo(db) => {
                let cursor = db
                    .collection::<Document>(collection)
                    .find(filter)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                cursor
                    .try_collect()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            DataStore::Mock(store) => Ok(store.find(collection, &filter)),
        }
    }

    pub async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, AppError> {
        match self {
            DataStore::Mongo(db) => db
                .collection::<Document>(collection)
                .count_documents(filter)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            DataStore::Mock(store) => Ok(store.count_documents(collection, &filter)),
        }
    }

    /// Insert a document and return its id in canonical string form.
    pub async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<String, AppError> {
        match self {
            DataStore::Mongo(db) => {
                let result = db
                    .collection::<Document>(collection)
                    .insert_one(document)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(bson_id_string(&result.inserted_id))
            }
            DataStore::Mock(store) => Ok(store.insert_one(collection, document)),
        }
    }

    pub async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, AppError> {
        match self {
            DataStore::Mongo(db) => {
                let result = db
                    .collection::<Document>(collection)
                    .update_one(filter, update)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(UpdateOutcome {
                    matched_count: result.matched_count,
                    modified_count: result.modified_count,
                })
            }
            DataStore::Mock(store) => Ok(store.update_one(collection, &filter, &update)),
        }
    }

    pub async fn delete_one(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, AppError> {
        match self {
            DataStore::Mongo(db) => db
                .collection::<Document>(collection)
                .delete_one(filter)
                .await
                .map(|r| r.deleted_count)
                .map_err(|e| AppError::Database(e.to_string())),
            DataStore::Mock(store) => Ok(store.delete_one(collection, &filter)),
        }
    }

    pub async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, AppError> {
        match self {
            DataStore::Mongo(db) => db
                .collection::<Document>(collection)
                .delete_many(filter)
                .await
                .map(|r| r.deleted_count)
                .map_err(|e| AppError::Database(e.to_string())),
            DataStore::Mock(store) => Ok(store.delete_many(collection, &filter)),
        }
    }

    // ── identifier reconciliation ────────────────────────────────────────
    // The same entity may be keyed by ObjectId, opaque string or email.
    // These try each candidate filter in order until one hits.

    pub async fn find_one_any(
        &self,
        collection: &str,
        filters: &[Document],
    ) -> Result<Option<Document>, AppError> {
        for filter in filters {
            if let Some(found) = self.find_one(collection, filter.clone()).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub async fn update_one_any(
        &self,
        collection: &str,
        filters: &[Document],
        update: Document,
    ) -> Result<UpdateOutcome, AppError> {
        for filter in filters {
            let outcome = self
                .update_one(collection, filter.clone(), update.clone())
                .await?;
            if outcome.matched_count > 0 {
                return Ok(outcome);
            }
        }
        Ok(UpdateOutcome::default())
    }

    pub async fn delete_one_any(
        &self,
        collection: &str,
        filters: &[Document],
    ) -> Result<u64, AppError> {
        for filter in filters {
            let deleted = self.delete_one(collection, filter.clone()).await?;
            if deleted > 0 {
                return Ok(deleted);
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ident::id_filter_candidates;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "clubsync_test").await;
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn connect_falls_back_to_mock_when_unreachable() {
        // Nothing listens on this port; the 3s server-selection timeout
        // expires and the store degrades to the mock.
        let store = DataStore::connect("mongodb://127.0.0.1:1/?directConnection=true", "clubsync").await;
        assert!(store.is_mock());
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn candidate_filters_resolve_mock_ids() {
        let store = DataStore::mock();

        let club = store
            .find_one_any("clubs", &id_filter_candidates("pending-1"))
            .await
            .unwrap();
        assert!(club.is_some());

        let outcome = store
            .update_one_any(
                "clubs",
                &id_filter_candidates("pending-1"),
                doc! { "$set": { "approved": true } },
            )
            .await
            .unwrap();
        assert_eq!(outcome.matched_count, 1);

        let deleted = store
            .delete_one_any("clubs", &id_filter_candidates("pending-1"))
            .await
            .unwrap();
        assert_eq!(deleted, 1);
    }
}
