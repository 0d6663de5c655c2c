use clap::{Parser, Subcommand};
use notebook_rag::commands::{self, PersonaUpdate};
use notebook_rag::config::{Config, resolve_config_dir, run_interactive_config, show_config};
use notebook_rag::persona::{CitationStyle, PersonaPreset, ResponseLength, Tone};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "notebook-rag")]
#[command(about = "Chunk, embed and search notebook sources for retrieval-augmented chat")]
#[command(version)]
struct Cli {
    /// Configuration directory (defaults to ~/.notebook-rag)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding provider and the store
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Chunk, embed and store the text of a source
    Ingest {
        /// ID of the source the text belongs to
        source_id: Uuid,
        /// File holding the source text, or "-" for stdin
        path: PathBuf,
        /// Delete the source's existing chunks first
        #[arg(long)]
        replace: bool,
    },
    /// Delete every stored chunk of a source
    Delete {
        source_id: Uuid,
    },
    /// Search a notebook's chunks
    Search {
        notebook_id: Uuid,
        query: String,
        /// Restrict the search to these sources
        #[arg(long = "source", value_name = "SOURCE_ID")]
        sources: Vec<Uuid>,
        /// Maximum number of matches
        #[arg(long)]
        limit: Option<usize>,
        /// Fail on backend errors instead of reporting no matches
        #[arg(long)]
        strict: bool,
    },
    /// Print the prompt context for a question
    Context {
        notebook_id: Uuid,
        query: String,
        #[arg(long = "source", value_name = "SOURCE_ID")]
        sources: Vec<Uuid>,
        /// Model answer to extract [n] citations from
        #[arg(long)]
        answer: Option<String>,
    },
    /// Show or change a notebook's persona and response preferences
    Persona {
        notebook_id: Uuid,
        /// Restore default settings before applying other changes
        #[arg(long)]
        reset: bool,
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
        #[arg(long, value_enum)]
        preset: Option<PersonaPreset>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        instructions: Option<String>,
        #[arg(long, value_enum)]
        length: Option<ResponseLength>,
        #[arg(long, value_enum)]
        tone: Option<Tone>,
        /// Whether responses should include examples
        #[arg(long)]
        examples: Option<bool>,
        #[arg(long, value_enum)]
        citations: Option<CitationStyle>,
    },
    /// Show how a text file would be chunked
    Chunk {
        /// File to chunk, or "-" for stdin
        path: PathBuf,
    },
    /// Apply the database schema migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = resolve_config_dir(cli.config_dir)?;

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&Config::load(&config_dir)?);
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Ingest {
            source_id,
            path,
            replace,
        } => {
            commands::ingest(&config_dir, source_id, &path, replace).await?;
        }
        Commands::Delete { source_id } => {
            commands::delete(&config_dir, source_id).await?;
        }
        Commands::Search {
            notebook_id,
            query,
            sources,
            limit,
            strict,
        } => {
            commands::search_notebook(&config_dir, notebook_id, &query, sources, limit, strict)
                .await?;
        }
        Commands::Context {
            notebook_id,
            query,
            sources,
            answer,
        } => {
            commands::context(&config_dir, notebook_id, &query, sources, answer.as_deref())
                .await?;
        }
        Commands::Persona {
            notebook_id,
            reset,
            enable,
            disable,
            preset,
            name,
            instructions,
            length,
            tone,
            examples,
            citations,
        } => {
            let update = PersonaUpdate {
                reset,
                enabled: toggle(enable, disable),
                preset,
                name,
                instructions,
                response_length: length,
                tone,
                include_examples: examples,
                citation_style: citations,
            };
            commands::persona(&config_dir, notebook_id, &update).await?;
        }
        Commands::Chunk { path } => {
            commands::chunk(&config_dir, &path)?;
        }
        Commands::Migrate => {
            commands::migrate(&config_dir).await?;
        }
    }

    Ok(())
}

fn toggle(enable: bool, disable: bool) -> Option<bool> {
    match (enable, disable) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
