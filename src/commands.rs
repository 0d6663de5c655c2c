use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::database::postgres::apply_migrations;
use crate::database::{NotebookStore, SupabaseClient};
use crate::embeddings::{GeminiClient, chunk_text};
use crate::persona::{
    CitationStyle, NotebookSettings, PersonaPreset, ResponseLength, Tone, compile_instructions,
};
use crate::rag::{
    SearchQuery, assemble_context, delete_source, extract_citations, ingest_source,
    replace_source, search, try_search,
};

const PREVIEW_CHARS: usize = 80;

fn spinner(message: &str) -> ProgressBar {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}

fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read text from stdin");
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source text: {}", path.display()))
}

fn clients(config: &Config) -> Result<(GeminiClient, SupabaseClient)> {
    let embedder = GeminiClient::new(&config.embedding)?;
    let store =
        SupabaseClient::new(&config.store).context("Failed to create store client")?;
    Ok((embedder, store))
}

/// Chunk, embed and store a source's text
#[inline]
pub async fn ingest(config_dir: &Path, source_id: Uuid, path: &Path, replace: bool) -> Result<()> {
    let config = Config::load(config_dir)?;
    let text = read_text(path)?;
    let (embedder, store) = clients(&config)?;

    info!(
        "Ingesting source {} ({} characters)",
        source_id,
        text.chars().count()
    );

    let bar = spinner(&format!("Embedding source {}", source_id));
    let result = if replace {
        replace_source(&embedder, &store, &config.chunking, source_id, &text).await
    } else {
        ingest_source(&embedder, &store, &config.chunking, source_id, &text).await
    };
    bar.finish_and_clear();

    let stored = result.context("Failed to ingest source")?;
    if stored == 0 {
        println!("No chunks stored for source {}.", source_id);
    } else {
        println!("Stored {} chunks for source {}.", stored, source_id);
    }
    Ok(())
}

/// Remove all stored chunks of a source
#[inline]
pub async fn delete(config_dir: &Path, source_id: Uuid) -> Result<()> {
    let config = Config::load(config_dir)?;
    let store = SupabaseClient::new(&config.store).context("Failed to create store client")?;

    delete_source(&store, source_id)
        .await
        .context("Failed to delete source chunks")?;

    println!("Deleted chunks of source {}.", source_id);
    Ok(())
}

/// Vector search within a notebook
#[inline]
pub async fn search_notebook(
    config_dir: &Path,
    notebook_id: Uuid,
    query: &str,
    source_ids: Vec<Uuid>,
    limit: Option<usize>,
    strict: bool,
) -> Result<()> {
    let config = Config::load(config_dir)?;
    let (embedder, store) = clients(&config)?;

    let query = SearchQuery::new(query, notebook_id)
        .with_sources(source_ids)
        .with_limit(limit.unwrap_or(config.retrieval.match_count));

    let bar = spinner("Searching");
    let matches = if strict {
        try_search(&embedder, &store, &query).await
    } else {
        Ok(search(&embedder, &store, &query).await)
    };
    bar.finish_and_clear();

    let matches = matches.context("Search failed")?;
    if matches.is_empty() {
        println!("No matching chunks.");
        return Ok(());
    }

    for (i, m) in matches.iter().enumerate() {
        println!(
            "{}. {:.3}  source {}  chunk {}",
            i + 1,
            m.similarity,
            m.source_id,
            m.id
        );
        println!("   {}", preview(&m.content));
    }
    Ok(())
}

/// Print the prompt context for a question, and the citations of an answer if given
#[inline]
pub async fn context(
    config_dir: &Path,
    notebook_id: Uuid,
    query: &str,
    source_ids: Vec<Uuid>,
    answer: Option<&str>,
) -> Result<()> {
    let config = Config::load(config_dir)?;
    let (embedder, store) = clients(&config)?;

    let query = SearchQuery::new(query, notebook_id)
        .with_sources(source_ids)
        .with_limit(config.retrieval.context_match_count);

    let bar = spinner("Building context");
    let result = assemble_context(&embedder, &store, &query).await;
    bar.finish_and_clear();
    let notebook_context = result.context("Failed to build context")?;

    let settings = store
        .load_settings(notebook_id)
        .await
        .context("Failed to load notebook settings")?;
    let instructions = compile_instructions(&settings);
    if !instructions.is_empty() {
        println!("{}\n", instructions);
    }

    if notebook_context.is_empty() {
        println!("No sources available for this notebook.");
        return Ok(());
    }

    println!("{}", notebook_context.text);
    println!(
        "Sources: {}",
        notebook_context.source_names.join(", ")
    );

    if let Some(answer) = answer {
        let citations = extract_citations(answer, &notebook_context.sources);
        println!("\nCitations ({}):", citations.len());
        for citation in &citations {
            println!(
                "  [{}] {} ({})",
                citation.number, citation.source_name, citation.source_id
            );
            if !citation.text.is_empty() {
                println!("      {}", preview(&citation.text));
            }
        }
    }
    Ok(())
}

/// Changes to a notebook's persona and response preferences
#[derive(Debug, Clone, Default)]
pub struct PersonaUpdate {
    pub reset: bool,
    pub enabled: Option<bool>,
    pub preset: Option<PersonaPreset>,
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub response_length: Option<ResponseLength>,
    pub tone: Option<Tone>,
    pub include_examples: Option<bool>,
    pub citation_style: Option<CitationStyle>,
}

impl PersonaUpdate {
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.reset
            && self.enabled.is_none()
            && self.preset.is_none()
            && self.name.is_none()
            && self.instructions.is_none()
            && self.response_length.is_none()
            && self.tone.is_none()
            && self.include_examples.is_none()
            && self.citation_style.is_none()
    }

    /// Apply the changes: reset first, then the preset, then explicit fields
    #[inline]
    pub fn apply(&self, settings: &mut NotebookSettings) {
        if self.reset {
            *settings = NotebookSettings::default();
        }
        if let Some(preset) = self.preset {
            settings.persona.apply_preset(preset);
        }
        if let Some(name) = &self.name {
            settings.persona.name.clone_from(name);
        }
        if let Some(instructions) = &self.instructions {
            settings.persona.instructions.clone_from(instructions);
        }
        if let Some(enabled) = self.enabled {
            settings.persona.enabled = enabled;
        }

        let preferences = &mut settings.preferences;
        if let Some(length) = self.response_length {
            preferences.response_length = length;
        }
        if let Some(tone) = self.tone {
            preferences.tone = tone;
        }
        if let Some(include) = self.include_examples {
            preferences.include_examples = include;
        }
        if let Some(style) = self.citation_style {
            preferences.citation_style = style;
        }
    }
}

/// Show, and optionally update, a notebook's persona settings
#[inline]
pub async fn persona(config_dir: &Path, notebook_id: Uuid, update: &PersonaUpdate) -> Result<()> {
    let config = Config::load(config_dir)?;
    let store = SupabaseClient::new(&config.store).context("Failed to create store client")?;

    let mut settings = store
        .load_settings(notebook_id)
        .await
        .context("Failed to load notebook settings")?;

    if !update.is_empty() {
        update.apply(&mut settings);
        store
            .save_settings(notebook_id, &settings)
            .await
            .context("Failed to save notebook settings")?;
        println!("Saved settings for notebook {}.", notebook_id);
    }

    let persona = &settings.persona;
    println!("Persona: {}", if persona.enabled { "enabled" } else { "disabled" });
    println!("  Preset: {}", persona.preset);
    println!("  Name: {}", persona.effective_name());

    let preferences = &settings.preferences;
    println!("Preferences:");
    println!("  Response length: {:?}", preferences.response_length);
    println!("  Tone: {:?}", preferences.tone);
    println!("  Include examples: {}", preferences.include_examples);
    println!("  Citation style: {:?}", preferences.citation_style);

    let instructions = compile_instructions(&settings);
    if instructions.is_empty() {
        println!("\nNo system instructions (all defaults).");
    } else {
        println!("\nSystem instructions:\n{}", instructions);
    }
    Ok(())
}

/// Show how a text would be chunked, without contacting any service
#[inline]
pub fn chunk(config_dir: &Path, path: &Path) -> Result<()> {
    let config = Config::load(config_dir)?;
    let text = read_text(path)?;

    let chunks = chunk_text(&text, &config.chunking);
    println!(
        "{} chunks (size {}, overlap {})",
        chunks.len(),
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    for chunk in &chunks {
        println!(
            "#{:<4} offset {:<7} {:>5} chars {:>4} tokens  {}",
            chunk.chunk_index,
            chunk.start_offset,
            chunk.content.chars().count(),
            chunk.token_count,
            preview(&chunk.content)
        );
    }
    Ok(())
}

/// Apply the schema migrations to the configured database
#[inline]
pub async fn migrate(config_dir: &Path) -> Result<()> {
    let config = Config::load(config_dir)?;
    let database_url = config.store.require_database_url()?;

    apply_migrations(database_url).await?;
    println!("Database schema is up to date.");
    Ok(())
}
