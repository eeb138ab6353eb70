//! Arangolite Client Library
//!
//! Typed operations for an ArangoDB-style REST API: databases, collections,
//! documents, graphs, vertices and edges, all carried by the core
//! [`Transport`](arangolite_core::Transport).

mod client;
mod collection;
mod database;
mod document;
mod edge;
mod graph;
mod vertex;

pub use arangolite_core::{Conditional, Config, Error, HttpClient, ReqwestClient};
pub use client::{Client, VersionInfo};
pub use collection::{Collection, CollectionType, CreateCollectionOptions};
pub use database::{CreateDatabaseOptions, DatabaseUser};
pub use document::{
    CreateDocumentOptions, DeleteDocumentOptions, DocumentMeta, GetDocumentOptions,
    ReplaceDocumentOptions, UpdateDocumentOptions,
};
pub use edge::{CreateEdgeOptions, GetEdgeOptions, ModifyEdgeOptions, RemoveEdgeOptions};
pub use graph::{CreateGraphOptions, EdgeDefinition, GraphInfo};
pub use vertex::{CreateVertexOptions, GetVertexOptions, RemoveVertexOptions, ReplaceVertexOptions};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A named operation failed; `source` keeps the core classification.
    #[error("failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Error,
    },

    #[error(transparent)]
    Core(#[from] Error),
}

impl ClientError {
    /// The underlying pipeline error.
    pub fn core(&self) -> &Error {
        match self {
            ClientError::Operation { source, .. } => source,
            ClientError::Core(e) => e,
        }
    }

    pub fn status(&self) -> u16 {
        self.core().status()
    }

    pub fn error_num(&self) -> Option<i64> {
        self.core().error_num()
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

pub(crate) fn context(operation: &'static str) -> impl FnOnce(Error) -> ClientError {
    move |source| ClientError::Operation { operation, source }
}
