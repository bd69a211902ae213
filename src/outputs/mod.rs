//! Batch persistence.
//!
//! A finished [`Batch`] is handed to exactly one sink, once, at the end of a
//! run. Nothing is written mid-run.
//!
//! # Submodules
//!
//! - [`json`]: pretty JSON file, overwritten on every run
//! - [`mongo`]: one `insert_one` into a MongoDB collection (feature `mongo`)

pub mod json;
#[cfg(feature = "mongo")]
pub mod mongo;

use crate::config::{SinkConfig, SinkKind};
use crate::error::SinkError;
use crate::models::Batch;

/// Destination for a finished batch.
pub trait BatchSink {
    async fn store(&self, batch: &Batch) -> Result<(), SinkError>;
}

/// The sink selected by configuration.
#[derive(Debug)]
pub enum Sink {
    File(json::JsonFileSink),
    #[cfg(feature = "mongo")]
    Mongo(mongo::MongoSink),
}

impl Sink {
    pub fn from_config(config: &SinkConfig) -> Result<Self, SinkError> {
        match config.kind {
            SinkKind::File => Ok(Sink::File(json::JsonFileSink::new(&config.path))),
            #[cfg(feature = "mongo")]
            SinkKind::Mongo => Ok(Sink::Mongo(mongo::MongoSink::new(
                &config.mongo_uri,
                &config.database,
                &config.collection,
            ))),
            #[cfg(not(feature = "mongo"))]
            SinkKind::Mongo => Err(SinkError::Unavailable("mongo")),
        }
    }
}

impl BatchSink for Sink {
    async fn store(&self, batch: &Batch) -> Result<(), SinkError> {
        match self {
            Sink::File(sink) => sink.store(batch).await,
            #[cfg(feature = "mongo")]
            Sink::Mongo(sink) => sink.store(batch).await,
        }
    }
}
