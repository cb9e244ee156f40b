//! # r2agi CLI
//!
//! The `r2agi` binary runs the intake server and the offline tooling around
//! it: local store inspection, prompt generation, and site data dumps.
//!
//! ## Usage
//!
//! ```bash
//! r2agi --config ./config/r2agi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `r2agi init` | Create the SQLite store and its schema |
//! | `r2agi serve` | Start the HTTP intake API |
//! | `r2agi list` | List stored artifacts |
//! | `r2agi get <id>` | Print one stored artifact |
//! | `r2agi digest [id]` | Render claim-extraction prompts from the API |
//! | `r2agi gates <claim>` | Render the gate-design prompt for a claim |
//! | `r2agi site <collection>` | Print site YAML records as JSON |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use r2agi::site::Collection;
use r2agi::{artifacts, config, digest, logging, migrate, server, site};

/// r2agi: content-addressed intake for raw material, plus the tooling that
/// turns it into claims.
#[derive(Parser)]
#[command(
    name = "r2agi",
    about = "Content-addressed artifact intake and claim tooling",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/r2agi.toml`. See `config/r2agi.example.toml`.
    #[arg(long, global = true, default_value = "./config/r2agi.toml")]
    config: PathBuf,

    /// Debug-level logging for r2agi and the HTTP layer.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the SQLite store.
    ///
    /// Creates the database file and the `kv` table. Safe to run repeatedly.
    Init,

    /// Start the HTTP intake server.
    Serve,

    /// List stored artifacts in id order.
    List {
        /// Maximum number of artifacts (capped by `store.list_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a stored artifact by id.
    Get {
        /// Artifact id (hex prefix of the content's SHA-256).
        id: String,
    },

    /// Render claim-extraction prompts for pending artifacts.
    ///
    /// Reads from a running intake server. With an id, renders only that
    /// artifact.
    Digest {
        /// Artifact id.
        id: Option<String>,

        /// API base URL (overrides `digest.api_base`).
        #[arg(long)]
        api: Option<String>,

        /// Print the whole prompt instead of a preview.
        #[arg(long)]
        full: bool,
    },

    /// Render the gate-design prompt for a recorded claim.
    Gates {
        /// Claim id, e.g. `C-0001`.
        claim_id: String,
    },

    /// Print a site data collection as JSON.
    Site {
        #[arg(value_enum)]
        collection: Collection,

        /// Print only the record with this id.
        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging, cli.verbose);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Store initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List { limit } => {
            artifacts::run_list(&cfg, limit).await?;
        }
        Commands::Get { id } => {
            artifacts::run_get(&cfg, &id).await?;
        }
        Commands::Digest { id, api, full } => {
            digest::run_digest(&cfg, id.as_deref(), api.as_deref(), full).await?;
        }
        Commands::Gates { claim_id } => {
            digest::run_gates(&cfg, &claim_id)?;
        }
        Commands::Site { collection, id } => {
            site::run_site(&cfg, collection, id.as_deref())?;
        }
    }

    Ok(())
}
