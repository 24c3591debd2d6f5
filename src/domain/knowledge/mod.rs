//! Knowledge base retrieval and indexing.

mod indexer;
mod retriever;

pub use indexer::{ArticleRecord, CourseRecord, IndexError, KnowledgeIndexer};
pub use retriever::{KnowledgeRetriever, SearchOptions};
