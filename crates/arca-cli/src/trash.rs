//! # Delete and Trash CLI
//!
//! ```bash
//! arca --config arca.yaml --index index.json delete storage0 releases org/example/lib/1.0
//! arca --config arca.yaml undelete storage0 releases org/example/lib/1.0
//! arca --config arca.yaml empty-trash storage0 releases
//! ```
//!
//! Deletes go to the repository trash unless `--force` is given or the
//! repository has trash disabled.

use anyhow::{Context, Result};
use clap::Args;

use crate::Session;

/// Arguments for `arca delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Storage id.
    pub storage: String,

    /// Repository id.
    pub repository: String,

    /// Path inside the repository.
    pub path: String,

    /// Delete permanently, bypassing the trash.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `arca undelete`.
#[derive(Args, Debug)]
pub struct UndeleteArgs {
    /// Storage id.
    pub storage: String,

    /// Repository id.
    pub repository: String,

    /// Path to restore. Defaults to everything in the trash.
    pub path: Option<String>,
}

/// Arguments for `arca empty-trash`.
#[derive(Args, Debug)]
pub struct EmptyTrashArgs {
    /// Storage id.
    pub storage: String,

    /// Repository id.
    pub repository: String,
}

pub fn run_delete(args: &DeleteArgs, session: &Session) -> Result<u8> {
    let (storage, path) = session.resolve(&args.storage, &args.repository, Some(args.path.as_str()))?;
    if path.is_root() {
        anyhow::bail!("refusing to delete the root of {}:{}", args.storage, args.repository);
    }
    storage
        .delete(&path, args.force)
        .with_context(|| format!("failed to delete {path}"))?;
    session.save_index()?;
    println!("Deleted {}", args.path);
    Ok(0)
}

pub fn run_undelete(args: &UndeleteArgs, session: &Session) -> Result<u8> {
    let (storage, path) = session.resolve(&args.storage, &args.repository, args.path.as_deref())?;
    storage
        .undelete(&path)
        .with_context(|| format!("failed to restore {path}"))?;
    session.save_index()?;
    println!("Restored {}", args.path.as_deref().unwrap_or("trash"));
    Ok(0)
}

pub fn run_empty_trash(args: &EmptyTrashArgs, session: &Session) -> Result<u8> {
    let (storage, root) = session.resolve(&args.storage, &args.repository, None)?;
    storage
        .delete_trash(&root)
        .with_context(|| format!("failed to empty trash of {}:{}", args.storage, args.repository))?;
    session.save_index()?;
    println!("Emptied trash of {}:{}", args.storage, args.repository);
    Ok(0)
}
