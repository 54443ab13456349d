//! `corpusctl` — CLI surface over the core (SPEC_FULL.md §6). Grounded in
//! the teacher's `cli/commands/mod.rs`: a `clap` derive `Cli` with global
//! args plus a `Commands` subcommand enum, each variant delegating to a
//! `cmd_*` handler in `commands`.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, Settings};

#[derive(Debug, Parser)]
#[command(name = "corpusctl", about = "Dual-tree content-addressed document versioning engine")]
pub struct Cli {
    /// Override the data directory (defaults per-platform, see `config::Settings`).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override the database URL entirely.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Principal id recorded as `creator`/`user` on writes.
    #[arg(long, global = true, default_value = "cli")]
    pub user: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new corpus.
    Init { title: String },
    /// Import a file at a path within a corpus.
    Import {
        corpus: String,
        path: String,
        file: PathBuf,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Move an active path to a new path.
    Mv {
        corpus: String,
        old_path: String,
        new_path: String,
        #[arg(long, conflicts_with = "root")]
        folder: Option<String>,
        #[arg(long)]
        root: bool,
    },
    /// Soft-delete an active path.
    Rm { corpus: String, path: String },
    /// Restore a soft-deleted path.
    Restore { corpus: String, path: String },
    /// List the filesystem (or trash, or a past snapshot) of a corpus.
    Ls {
        corpus: String,
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        trash: bool,
    },
    /// Show the lifecycle history of a path.
    Log { corpus: String, path: String },
    /// List annotations for a document or corpus.
    Annotations {
        corpus: String,
        #[arg(long)]
        document: Option<String>,
        #[arg(long)]
        corpus_wide: bool,
    },
}

pub fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    if let Ok(config) = Config::load("corpus-engine") {
        settings = config.resolve(settings);
    }
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(url) = &cli.database_url {
        settings.database_url = Some(url.clone());
    }
    settings.ensure_directories()?;
    Ok(settings)
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = resolve_settings(&cli)?;
    let pool = crate::repository::build_pool(&settings.database_url())?;
    {
        let mut conn = pool.get()?;
        crate::repository::run_migrations(&mut conn)?;
    }

    match &cli.command {
        Commands::Init { title } => commands::init::run(&pool, title, &cli.user),
        Commands::Import { corpus, path, file, folder } => {
            commands::import::run(&pool, corpus, path, file, folder.clone(), &cli.user)
        }
        Commands::Mv { corpus, old_path, new_path, folder, root } => {
            commands::mv::run(&pool, corpus, old_path, new_path, folder.clone(), *root, &cli.user)
        }
        Commands::Rm { corpus, path } => commands::rm::run(&pool, corpus, path, &cli.user),
        Commands::Restore { corpus, path } => commands::restore::run(&pool, corpus, path, &cli.user),
        Commands::Ls { corpus, at, trash } => commands::ls::run(&pool, corpus, at.clone(), *trash, &cli.user),
        Commands::Log { corpus, path } => commands::log::run(&pool, corpus, path),
        Commands::Annotations { corpus, document, corpus_wide } => {
            commands::annotations::run(&pool, corpus, document.clone(), *corpus_wide, &cli.user)
        }
    }
}
