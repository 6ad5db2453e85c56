use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "docsync",
    about = "Keep a vector index in sync with a watched document directory"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to the application configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all output except warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one reconciliation cycle against the watched directory
    Sync(SyncArgs),
    /// Show pending changes without touching the index or manifest
    Status(StatusArgs),
    /// Copy a document into the watched directory and re-sync
    Add(AddArgs),
    /// Delete a document from the watched directory and re-sync
    Remove(RemoveArgs),
    /// Delete the manifest so the next sync re-indexes everything
    Reset,
    /// Show or edit the persisted application configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct SyncArgs {
    /// Rebuild the index from scratch even if nothing changed
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct AddArgs {
    /// Path of the document to copy into the watched directory
    pub path: PathBuf,
}

#[derive(Debug, Parser)]
pub struct RemoveArgs {
    /// Filename of the document to delete from the watched directory
    pub name: String,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration as JSON
    Show,
    /// Update one configuration field and write the file back
    Set(ConfigSetArgs),
}

#[derive(Debug, Parser)]
pub struct ConfigSetArgs {
    /// Field to update: documents-dir, manifest-file, extensions,
    /// chunk-size, or chunk-overlap
    pub key: String,
    /// New value; extensions accept a comma-separated list
    pub value: String,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
