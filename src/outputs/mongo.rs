//! MongoDB output: the batch becomes a single document.

use mongodb::Client;
use mongodb::bson::{self, Document};
use tracing::{info, instrument};

use crate::error::SinkError;
use crate::models::Batch;
use crate::outputs::BatchSink;

#[derive(Debug, Clone)]
pub struct MongoSink {
    uri: String,
    database: String,
    collection: String,
}

impl MongoSink {
    pub fn new(uri: &str, database: &str, collection: &str) -> Self {
        Self {
            uri: uri.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
        }
    }

    /// `database.collection`
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }
}

/// Nested BSON form of a batch; absent fields become BSON null.
pub fn to_document(batch: &Batch) -> Result<Document, SinkError> {
    Ok(bson::to_document(batch)?)
}

impl BatchSink for MongoSink {
    #[instrument(level = "info", skip_all, fields(namespace = %self.namespace()))]
    async fn store(&self, batch: &Batch) -> Result<(), SinkError> {
        let document = to_document(batch)?;
        let client = Client::with_uri_str(&self.uri).await?;
        let collection = client
            .database(&self.database)
            .collection::<Document>(&self.collection);

        let result = collection.insert_one(document).await?;
        info!(id = %result.inserted_id, posts = batch.len(), "Inserted batch document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Claps, PostRecord};
    use mongodb::bson::Bson;

    #[test]
    fn test_to_document_keeps_dual_typed_claps() {
        let mut batch = Batch::new();
        for (url, claps) in [
            ("https://m.test/1", Claps::Count(1200)),
            ("https://m.test/2", Claps::Raw("847".to_string())),
        ] {
            batch.push(PostRecord {
                url: url.to_string(),
                title: None,
                text: None,
                datetime: None,
                author: None,
                claps: Some(claps),
            });
        }
        let doc = to_document(&batch.finalize("medium-scraper")).unwrap();

        let posts = doc.get_array("posts").unwrap();
        let first = posts[0].as_document().unwrap();
        let second = posts[1].as_document().unwrap();
        assert_eq!(first.get("claps"), Some(&Bson::Int64(1200)));
        assert_eq!(second.get_str("claps").unwrap(), "847");
        assert_eq!(first.get("title"), Some(&Bson::Null));
        assert_eq!(
            doc.get_document("scraper_metadata")
                .unwrap()
                .get_str("scraper")
                .unwrap(),
            "medium-scraper"
        );
    }
}
