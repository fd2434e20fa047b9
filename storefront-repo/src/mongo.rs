//! MongoDB document store adapter.

use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document as BsonDocument, doc, oid::ObjectId};
use mongodb::options::FindOptions;
use mongodb::{Client, Database};

use storefront_types::{
    Collection, DeleteResult, Document, DocumentStore, Filter, ID_FIELD, InsertResult, RecordId,
    RepoError, UpdateResult,
};

/// MongoDB repository implementation.
pub struct MongoRepo {
    database: Database,
}

impl MongoRepo {
    /// Connects to the cluster and verifies the connection with a ping.
    pub async fn new(uri: &str, database_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database_name);

        database.run_command(doc! { "ping": 1 }).await?;
        tracing::info!(database = %database_name, "Connected to MongoDB");

        Ok(Self { database })
    }

    /// Returns the database handle.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<BsonDocument> {
        self.database.collection(collection.name())
    }
}

fn db_err(e: mongodb::error::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Parses a client-supplied identifier into an ObjectId.
fn object_id(id: &RecordId) -> Result<ObjectId, RepoError> {
    ObjectId::parse_str(id.as_str()).map_err(|_| RepoError::InvalidId(id.to_string()))
}

fn to_bson_filter(filter: &Filter) -> Result<BsonDocument, RepoError> {
    match filter {
        Filter::Id(id) => Ok(doc! { "_id": object_id(id)? }),
        Filter::Eq { field, value } => {
            let mut query = BsonDocument::new();
            query.insert(field.clone(), value.clone());
            Ok(query)
        }
    }
}

fn to_bson(mut doc: Document) -> Result<BsonDocument, RepoError> {
    doc.remove(ID_FIELD);
    bson::to_document(&doc).map_err(|e| RepoError::Serialization(e.to_string()))
}

/// Renders an `_id` value as the opaque string used by the API.
fn id_string(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.to_string(),
    }
}

/// Converts a stored BSON document into its JSON form with a string `_id`.
fn from_bson(mut stored: BsonDocument) -> Result<Document, RepoError> {
    let id = stored
        .remove(ID_FIELD)
        .map(id_string)
        .ok_or_else(|| RepoError::Serialization("document without _id".into()))?;

    match Bson::Document(stored).into_relaxed_extjson() {
        serde_json::Value::Object(mut doc) => {
            doc.insert(ID_FIELD.to_string(), serde_json::Value::String(id));
            Ok(doc)
        }
        other => Err(RepoError::Serialization(format!(
            "expected a document, got {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for MongoRepo {
    #[tracing::instrument(skip(self, doc))]
    async fn insert_one(
        &self,
        collection: Collection,
        doc: Document,
    ) -> Result<InsertResult, RepoError> {
        let stored = to_bson(doc)?;
        let result = self
            .collection(collection)
            .insert_one(stored)
            .await
            .map_err(db_err)?;

        Ok(InsertResult {
            inserted_id: RecordId::new(id_string(result.inserted_id)),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn find_one(
        &self,
        collection: Collection,
        filter: Filter,
    ) -> Result<Option<Document>, RepoError> {
        let query = to_bson_filter(&filter)?;
        let found = self
            .collection(collection)
            .find_one(query)
            .await
            .map_err(db_err)?;

        found.map(from_bson).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find(
        &self,
        collection: Collection,
        filter: Option<Filter>,
    ) -> Result<Vec<Document>, RepoError> {
        let query = match &filter {
            Some(filter) => to_bson_filter(filter)?,
            None => BsonDocument::new(),
        };
        // ObjectIds grow monotonically, so this is insertion order
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        let mut cursor = self
            .collection(collection)
            .find(query)
            .with_options(options)
            .await
            .map_err(db_err)?;

        let mut docs = Vec::new();
        while cursor.advance().await.map_err(db_err)? {
            let stored = cursor.deserialize_current().map_err(db_err)?;
            docs.push(from_bson(stored)?);
        }

        tracing::debug!(count = docs.len(), "MongoDB find completed");
        Ok(docs)
    }

    #[tracing::instrument(skip(self, set))]
    async fn update_one(
        &self,
        collection: Collection,
        filter: Filter,
        set: Document,
    ) -> Result<UpdateResult, RepoError> {
        let query = to_bson_filter(&filter)?;
        let update = doc! { "$set": to_bson(set)? };

        let result = self
            .collection(collection)
            .update_one(query, update)
            .await
            .map_err(db_err)?;

        Ok(UpdateResult {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_one(
        &self,
        collection: Collection,
        id: RecordId,
    ) -> Result<DeleteResult, RepoError> {
        let query = doc! { "_id": object_id(&id)? };
        let result = self
            .collection(collection)
            .delete_one(query)
            .await
            .map_err(db_err)?;

        Ok(DeleteResult {
            deleted_count: result.deleted_count,
        })
    }
}
