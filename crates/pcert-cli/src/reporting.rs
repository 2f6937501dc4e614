//! # Reminder Delivery and Metrics Reporting
//!
//! `remind` fires every due reminder through the notification inboxes;
//! `stats` prints the per-provider profile or the global roll-up, with an
//! optional per-day trend over the transition log.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use pcert_core::{ProviderId, Timestamp};
use pcert_metrics::{global_stats, trend};
use pcert_reminders::deliver_due;

use crate::registry::Runtime;

// ─── remind ──────────────────────────────────────────────────────────

/// Arguments for `pcert remind`.
#[derive(Args, Debug)]
pub struct RemindArgs {
    /// Deliver reminders due as of this instant instead of now
    /// (RFC 3339 UTC).
    #[arg(long)]
    pub at: Option<String>,
}

pub fn remind(registry: &Path, args: RemindArgs) -> anyhow::Result<()> {
    let runtime = Runtime::open(registry)?;
    let now = match args.at.as_deref() {
        Some(at) => Timestamp::parse(at).with_context(|| format!("invalid timestamp '{at}'"))?,
        None => Timestamp::now(),
    };

    let sent = deliver_due(&runtime.schedule, runtime.inbox.as_ref(), now)
        .context("reminder delivery failed")?;
    runtime.save()?;

    println!("{{\"reminders_sent\": {sent}}}");
    Ok(())
}

// ─── stats ───────────────────────────────────────────────────────────

/// Arguments for `pcert stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Report one provider's profile instead of the global roll-up.
    #[arg(long)]
    pub provider: Option<Uuid>,
    /// Also print per-day activity over the last N days.
    #[arg(long)]
    pub trend_days: Option<i64>,
}

pub fn stats(registry: &Path, args: StatsArgs) -> anyhow::Result<()> {
    let runtime = Runtime::open(registry)?;

    match args.provider {
        Some(provider) => {
            let provider = ProviderId(provider);
            match runtime.metrics.profile(provider) {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => anyhow::bail!("no activity recorded for {provider}"),
            }
        }
        None => {
            let stats = global_stats(&runtime.metrics);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    if let Some(days) = args.trend_days {
        let to = Timestamp::now();
        let from = to.add_days(-days.abs());
        let buckets = trend(runtime.engine.outbox().events(), from, to);
        println!("{}", serde_json::to_string_pretty(&buckets)?);
    }
    Ok(())
}
