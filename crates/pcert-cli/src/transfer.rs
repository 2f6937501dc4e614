//! # Snapshot Transfer
//!
//! `export` writes the versioned snapshot blob; `import` rebuilds a
//! registry from one, replaying the transition log to reconstruct every
//! derived store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use pcert_core::{ProviderId, Timestamp};
use pcert_state::snapshot;

use crate::registry::Runtime;

/// Arguments for `pcert export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Restrict the export to one provider.
    #[arg(long)]
    pub provider: Option<Uuid>,
    /// Where to write the snapshot.
    #[arg(long)]
    pub output: PathBuf,
}

pub fn export(registry: &Path, args: ExportArgs) -> anyhow::Result<()> {
    let runtime = Runtime::open(registry)?;
    let bytes = snapshot::export(
        &runtime.engine,
        args.provider.map(ProviderId),
        Timestamp::now(),
    )?;
    fs::write(&args.output, bytes)
        .with_context(|| format!("writing snapshot {}", args.output.display()))?;

    tracing::info!(output = %args.output.display(), "snapshot exported");
    Ok(())
}

/// Arguments for `pcert import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// The snapshot blob to import.
    #[arg(long)]
    pub input: PathBuf,
}

pub fn import(registry: &Path, args: ImportArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading snapshot {}", args.input.display()))?;
    let snapshot = snapshot::import(&bytes)?;

    let runtime =
        Runtime::from_snapshot(registry.to_path_buf(), snapshot.records, snapshot.events)?;
    runtime.save()?;

    tracing::info!(
        records = runtime.engine.records().count(),
        events = runtime.engine.outbox().len(),
        "snapshot imported"
    );
    Ok(())
}
