// Prompt context assembly
// Numbered chunk context from vector search, whole-source fallback, and citation extraction


use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Result;
use crate::database::{ChunkMatch, ChunkStore, NotebookStore, Source};
use crate::embeddings::EmbeddingProvider;
use crate::rag::retrieval::{SearchQuery, try_search};

pub const UNKNOWN_SOURCE_NAME: &str = "Unknown";
pub const CITATION_EXCERPT_CHARS: usize = 200;
pub const CITATION_CONFIDENCE: f32 = 0.9;

/// Where the assembled context came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextOrigin {
    /// Chunks returned by the vector search
    Retrieval,
    /// Whole ready sources, used when the search found nothing
    Fallback,
    /// Nothing available
    Empty,
}

/// A source referenced by the context, numbered by its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSource {
    pub id: Uuid,
    pub name: String,
    pub summary: Option<String>,
}

impl From<&Source> for ContextSource {
    #[inline]
    fn from(source: &Source) -> Self {
        Self {
            id: source.id,
            name: source.name.clone(),
            summary: source.summary().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotebookContext {
    pub text: String,
    pub origin: ContextOrigin,
    pub sources: Vec<ContextSource>,
    /// Distinct source names in first-seen order
    pub source_names: Vec<String>,
}

impl NotebookContext {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Citation {
    pub number: usize,
    pub source_id: Uuid,
    pub source_name: String,
    pub text: String,
    pub confidence: f32,
}

/// Build the prompt context for a question.
///
/// Uses the vector search when it returns matches; otherwise falls back to
/// the notebook's ready sources in full.
pub async fn assemble_context<S>(
    embedder: &dyn EmbeddingProvider,
    store: &S,
    query: &SearchQuery,
) -> Result<NotebookContext>
where
    S: ChunkStore + NotebookStore,
{
    match try_search(embedder, store, query).await {
        Ok(matches) if !matches.is_empty() => {
            let ids = distinct_source_ids(&matches);
            let sources = store.sources_by_id(&ids).await?;
            Ok(context_from_matches(&matches, &sources))
        }
        Ok(_) => {
            debug!("No chunks matched, using whole sources");
            fallback_context(store, query).await
        }
        Err(e) => {
            warn!("Vector search failed, using whole sources: {}", e);
            fallback_context(store, query).await
        }
    }
}

async fn fallback_context<S>(store: &S, query: &SearchQuery) -> Result<NotebookContext>
where
    S: NotebookStore + ?Sized,
{
    let sources = store
        .ready_sources(query.notebook_id, query.source_ids.as_deref())
        .await?;
    Ok(context_from_sources(&sources))
}

fn distinct_source_ids(matches: &[ChunkMatch]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::new();
    for m in matches {
        if !ids.contains(&m.source_id) {
            ids.push(m.source_id);
        }
    }
    ids
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

/// Numbered context blocks from search matches.
///
/// Each block reads `[n] Source: <name> (relevance: 0.87)` followed by the
/// chunk text. Sources missing from `sources` are named "Unknown".
#[inline]
pub fn context_from_matches(matches: &[ChunkMatch], sources: &[Source]) -> NotebookContext {
    let lookup = |id: Uuid| sources.iter().find(|s| s.id == id);

    let mut blocks = Vec::with_capacity(matches.len());
    let mut source_names = Vec::new();

    for (i, m) in matches.iter().enumerate() {
        let name = lookup(m.source_id).map_or(UNKNOWN_SOURCE_NAME, |s| s.name.as_str());
        push_unique(&mut source_names, name);
        blocks.push(format!(
            "[{}] Source: {} (relevance: {:.2})\n{}\n",
            i + 1,
            name,
            m.similarity,
            m.content
        ));
    }

    let context_sources = distinct_source_ids(matches)
        .into_iter()
        .map(|id| match lookup(id) {
            Some(source) => ContextSource::from(source),
            None => ContextSource {
                id,
                name: UNKNOWN_SOURCE_NAME.to_string(),
                summary: None,
            },
        })
        .collect();

    info!(
        "Built context from {} chunks across {} sources",
        matches.len(),
        source_names.len()
    );

    NotebookContext {
        text: blocks.join("\n\n"),
        origin: ContextOrigin::Retrieval,
        sources: context_sources,
        source_names,
    }
}

/// Whole-source context: text content for text sources, else the guide
/// summary, else a placeholder naming the source.
#[inline]
pub fn context_from_sources(sources: &[Source]) -> NotebookContext {
    if sources.is_empty() {
        return NotebookContext {
            text: String::new(),
            origin: ContextOrigin::Empty,
            sources: Vec::new(),
            source_names: Vec::new(),
        };
    }

    let mut blocks = Vec::with_capacity(sources.len());
    let mut source_names = Vec::new();

    for source in sources {
        push_unique(&mut source_names, &source.name);
        let content = source
            .text_content()
            .or_else(|| source.summary())
            .map_or_else(|| format!("[Source: {}]", source.name), str::to_string);
        blocks.push(format!("--- Source: {} ---\n{}\n", source.name, content));
    }

    NotebookContext {
        text: blocks.join("\n"),
        origin: ContextOrigin::Fallback,
        sources: sources.iter().map(ContextSource::from).collect(),
        source_names,
    }
}

/// Citations for every numbered source marker (`[n]`) present in an answer
#[inline]
pub fn extract_citations(answer: &str, sources: &[ContextSource]) -> Vec<Citation> {
    sources
        .iter()
        .enumerate()
        .filter_map(|(i, source)| {
            let number = i + 1;
            if !answer.contains(&format!("[{}]", number)) {
                return None;
            }
            let text = source
                .summary
                .as_deref()
                .map_or_else(String::new, |s| s.chars().take(CITATION_EXCERPT_CHARS).collect());
            Some(Citation {
                number,
                source_id: source.id,
                source_name: source.name.clone(),
                text,
                confidence: CITATION_CONFIDENCE,
            })
        })
        .collect()
}
