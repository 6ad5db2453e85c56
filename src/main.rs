use std::path::Path;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{
    AddArgs, Cli, Command, ConfigCommand, RemoveArgs, StatusArgs, SyncArgs,
};
use docsync::{
    config::AppConfig,
    data_dir::DataDir,
    error::{self, Error},
    index_store::{NodeIndex, RedbVectorStore},
    loader::FsLoader,
    reconcile::{SyncEngine, SyncOutcome, SyncReport},
    transform::WindowChunker,
};

type Engine = SyncEngine<FsLoader, WindowChunker, RedbVectorStore>;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DOCSYNC_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.config_file());
    let config = AppConfig::load(&config_path);

    match cli.command {
        Command::Sync(args) => {
            cmd_sync(&config, &data_dir, &args)?;
        }
        Command::Status(args) => {
            cmd_status(&config, &data_dir, &args)?;
        }
        Command::Add(args) => {
            cmd_add(&config, &data_dir, &args)?;
        }
        Command::Remove(args) => {
            cmd_remove(&config, &data_dir, &args)?;
        }
        Command::Reset => {
            cmd_reset(&config)?;
        }
        Command::Config(cmd) => {
            cmd_config(&config, &config_path, &cmd)?;
        }
        Command::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "docsync",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

fn build_engine(config: &AppConfig, data_dir: &DataDir) -> Engine {
    SyncEngine::new(
        FsLoader::new(config.document_filter()),
        WindowChunker::new(config.chunk_size, config.chunk_overlap),
        RedbVectorStore::new(data_dir.index_db()),
        config.documents_dir.clone(),
        config.manifest_file.clone(),
        config.document_filter(),
    )
}

fn run_cycle(engine: &mut Engine) -> SyncReport<NodeIndex> {
    let existing = engine.load_existing();
    engine.sync_cycle(existing)
}

fn print_report(report: &SyncReport<NodeIndex>) {
    match &report.outcome {
        SyncOutcome::Clean => println!("Index already in sync."),
        SyncOutcome::Inserted { added } => {
            println!("Inserted {added} new document(s) into the index.");
        }
        SyncOutcome::Rebuilt { documents } => {
            println!("Rebuilt index from {documents} document(s).");
        }
        SyncOutcome::Failed { reason } => {
            println!(
                "Sync attempted but failed: {reason}\n\
                 The manifest has advanced; run 'docsync sync --full' to retry."
            );
        }
        SyncOutcome::Skipped { reason } => {
            println!("Sync skipped: {reason}");
        }
    }
}

fn cmd_sync(
    config: &AppConfig,
    data_dir: &DataDir,
    args: &SyncArgs,
) -> error::Result<()> {
    let mut engine = build_engine(config, data_dir);
    let report = if args.full {
        engine.full_rebuild()
    } else {
        run_cycle(&mut engine)
    };
    print_report(&report);
    Ok(())
}

fn cmd_status(
    config: &AppConfig,
    data_dir: &DataDir,
    args: &StatusArgs,
) -> error::Result<()> {
    let engine = build_engine(config, data_dir);
    let changes = engine.pending_changes()?;

    if args.json {
        print!("{{\"added\":[");
        for (i, name) in changes.added.iter().enumerate() {
            if i > 0 {
                print!(",");
            }
            print!("{}", serde_json::to_string(name)?);
        }
        print!("],\"updated\":[");
        for (i, name) in changes.updated.iter().enumerate() {
            if i > 0 {
                print!(",");
            }
            print!("{}", serde_json::to_string(name)?);
        }
        print!("],\"deleted\":[");
        for (i, name) in changes.deleted.iter().enumerate() {
            if i > 0 {
                print!(",");
            }
            print!("{}", serde_json::to_string(name)?);
        }
        println!("]}}");
    } else if changes.is_empty() {
        println!("Index is in sync with {}.", config.documents_dir.display());
    } else {
        for name in &changes.added {
            println!("added\t{name}");
        }
        for name in &changes.updated {
            println!("updated\t{name}");
        }
        for name in &changes.deleted {
            println!("deleted\t{name}");
        }
    }
    Ok(())
}

fn cmd_add(
    config: &AppConfig,
    data_dir: &DataDir,
    args: &AddArgs,
) -> error::Result<()> {
    if !args.path.is_file() {
        return Err(Error::Config(format!(
            "not a readable file: {}",
            args.path.display()
        )));
    }
    let Some(name) = args.path.file_name().and_then(|n| n.to_str()) else {
        return Err(Error::Config(format!(
            "invalid file name: {}",
            args.path.display()
        )));
    };
    if !config.document_filter().matches(name) {
        return Err(Error::Config(format!(
            "unsupported document type: {name} (allowed: {})",
            config.extensions.join(", ")
        )));
    }

    std::fs::create_dir_all(&config.documents_dir)?;
    std::fs::copy(&args.path, config.documents_dir.join(name))?;
    println!("Copied '{name}' into {}.", config.documents_dir.display());

    let mut engine = build_engine(config, data_dir);
    print_report(&run_cycle(&mut engine));
    Ok(())
}

fn cmd_remove(
    config: &AppConfig,
    data_dir: &DataDir,
    args: &RemoveArgs,
) -> error::Result<()> {
    let path = config.documents_dir.join(&args.name);
    if !path.is_file() {
        return Err(Error::NotFound {
            kind: "document",
            name: args.name.clone(),
        });
    }
    std::fs::remove_file(&path)?;
    println!("Deleted '{}'.", args.name);

    let mut engine = build_engine(config, data_dir);
    print_report(&run_cycle(&mut engine));
    Ok(())
}

fn cmd_config(
    config: &AppConfig,
    path: &Path,
    cmd: &ConfigCommand,
) -> error::Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommand::Set(args) => {
            let mut updated = config.clone();
            updated.set(&args.key, &args.value)?;
            updated.save(path)?;
            println!("Set '{}' in {}.", args.key, path.display());
        }
    }
    Ok(())
}

fn cmd_reset(config: &AppConfig) -> error::Result<()> {
    match std::fs::remove_file(&config.manifest_file) {
        Ok(()) => {
            println!(
                "Deleted manifest {}; the next sync will re-index everything.",
                config.manifest_file.display()
            );
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No manifest to delete.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
