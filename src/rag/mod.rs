// RAG pipeline
// Ingestion, retrieval and prompt context built on the embedding and store seams

pub mod context;
pub mod ingest;
pub mod retrieval;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{
    Citation, ContextOrigin, ContextSource, NotebookContext, assemble_context, extract_citations,
};
pub use ingest::{delete_source, ingest_source, replace_source};
pub use retrieval::{SearchQuery, search, try_search};
