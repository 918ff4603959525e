//! # Checksum CLI: Regenerate checksum sidecars.
//!
//! ```bash
//! # Fill in missing sidecars for a whole repository:
//! arca --config arca.yaml checksum storage0 releases
//!
//! # Rewrite every sidecar under one artifact directory:
//! arca --config arca.yaml checksum storage0 releases org/example/lib --force
//! ```

use anyhow::{Context, Result};
use clap::Args;

use crate::Session;

/// Arguments for `arca checksum`.
#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Storage id.
    pub storage: String,

    /// Repository id.
    pub repository: String,

    /// Path inside the repository. Defaults to the repository root.
    pub path: Option<String>,

    /// Overwrite existing sidecars.
    #[arg(long)]
    pub force: bool,
}

/// Execute the checksum subcommand.
pub fn run_checksum(args: &ChecksumArgs, session: &Session) -> Result<u8> {
    let (storage, base) = session.resolve(&args.storage, &args.repository, args.path.as_deref())?;
    let report = storage
        .store_checksum(&base, args.force)
        .with_context(|| format!("checksum regeneration failed for {base}"))?;

    println!(
        "Checked {} file(s), wrote {} checksum(s)",
        report.visited, report.written
    );
    for failure in &report.failures {
        println!("  FAILED {}: {}", failure.path.display(), failure.reason);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_config;
    use std::fs;

    #[test]
    fn regenerates_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(&write_config(dir.path()), None).unwrap();
        let repo = dir.path().join("storage0/files");
        fs::create_dir_all(repo.join("dist")).unwrap();
        fs::write(repo.join("dist/abc.txt"), "abc").unwrap();

        let args = ChecksumArgs {
            storage: "storage0".into(),
            repository: "files".into(),
            path: None,
            force: false,
        };
        assert_eq!(run_checksum(&args, &session).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(repo.join("dist/abc.txt.md5")).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert!(repo.join("dist/abc.txt.sha1").exists());
    }

    #[test]
    fn missing_base_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(&write_config(dir.path()), None).unwrap();
        let args = ChecksumArgs {
            storage: "storage0".into(),
            repository: "files".into(),
            path: Some("missing".into()),
            force: false,
        };
        assert!(run_checksum(&args, &session).is_err());
    }
}
