//! # arca CLI entry point
//!
//! Parses command-line arguments, loads the configuration and index
//! snapshot, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arca_cli::checksum::{run_checksum, ChecksumArgs};
use arca_cli::trash::{run_delete, run_empty_trash, run_undelete, DeleteArgs, EmptyTrashArgs, UndeleteArgs};
use arca_cli::Session;

/// Arca storage administration.
///
/// Maintains checksum sidecars and drives the delete, undelete and
/// empty-trash lifecycle of configured repositories.
#[derive(Parser, Debug)]
#[command(name = "arca", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the storage configuration (YAML).
    #[arg(long, global = true, default_value = "arca.yaml")]
    config: PathBuf,

    /// Path to the artifact index snapshot (JSON). Loaded before and saved
    /// after each command; a missing file starts an empty index.
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Regenerate checksum sidecars under a repository path.
    Checksum(ChecksumArgs),

    /// Delete a repository path, to trash unless --force is given.
    Delete(DeleteArgs),

    /// Restore a path (or the whole trash) of a repository.
    Undelete(UndeleteArgs),

    /// Permanently empty a repository's trash.
    EmptyTrash(EmptyTrashArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!(config = %cli.config.display(), "arca CLI starting");

    let result = Session::open(&cli.config, cli.index.as_deref()).and_then(|session| match &cli.command {
        Commands::Checksum(args) => run_checksum(args, &session),
        Commands::Delete(args) => run_delete(args, &session),
        Commands::Undelete(args) => run_undelete(args, &session),
        Commands::EmptyTrash(args) => run_empty_trash(args, &session),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_checksum_defaults() {
        let cli = Cli::try_parse_from(["arca", "checksum", "storage0", "releases"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("arca.yaml"));
        assert!(cli.index.is_none());
        if let Commands::Checksum(args) = cli.command {
            assert_eq!(args.storage, "storage0");
            assert_eq!(args.repository, "releases");
            assert!(args.path.is_none());
            assert!(!args.force);
        } else {
            panic!("expected checksum command");
        }
    }

    #[test]
    fn cli_parse_checksum_with_path_and_force() {
        let cli = Cli::try_parse_from([
            "arca", "--config", "/etc/arca.yaml", "checksum", "s", "r", "org/example", "--force",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/arca.yaml"));
        if let Commands::Checksum(args) = cli.command {
            assert_eq!(args.path.as_deref(), Some("org/example"));
            assert!(args.force);
        } else {
            panic!("expected checksum command");
        }
    }

    #[test]
    fn cli_parse_delete_requires_path() {
        assert!(Cli::try_parse_from(["arca", "delete", "s", "r"]).is_err());
        let cli = Cli::try_parse_from(["arca", "delete", "s", "r", "a.txt", "--index", "idx.json"]).unwrap();
        assert_eq!(cli.index, Some(PathBuf::from("idx.json")));
        assert!(matches!(cli.command, Commands::Delete(ref args) if args.path == "a.txt" && !args.force));
    }

    #[test]
    fn cli_parse_undelete_and_empty_trash() {
        let cli = Cli::try_parse_from(["arca", "-vv", "undelete", "s", "r"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Undelete(ref args) if args.path.is_none()));

        let cli = Cli::try_parse_from(["arca", "empty-trash", "s", "r"]).unwrap();
        assert!(matches!(cli.command, Commands::EmptyTrash(_)));
    }

    #[test]
    fn cli_parse_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["arca", "purge"]).is_err());
    }
}
