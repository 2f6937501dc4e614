//! # Lifecycle Subcommands
//!
//! One handler per lifecycle operation. Each opens the registry, applies
//! the operation through the engine, pumps the reactors, saves, and
//! prints the resulting record as JSON.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use uuid::Uuid;

use pcert_core::{ActorId, CertificationId, ProviderId, Timestamp};
use pcert_state::{CertificationUpdate, NewCertification, OpContext};

use crate::registry::Runtime;

// ─── Shared Helpers ──────────────────────────────────────────────────

fn context(actor: Option<Uuid>) -> OpContext {
    let now = Timestamp::now();
    match actor {
        Some(actor) => OpContext::user(ActorId(actor), now),
        None => OpContext::system(now),
    }
}

fn parse_ts(value: &str) -> anyhow::Result<Timestamp> {
    Timestamp::parse(value).with_context(|| format!("invalid timestamp '{value}'"))
}

fn print_record(runtime: &Runtime, id: CertificationId) -> anyhow::Result<()> {
    let record = runtime
        .engine
        .get(id)
        .with_context(|| format!("record {id} vanished after operation"))?;
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

fn finish(runtime: &mut Runtime, id: CertificationId) -> anyhow::Result<()> {
    runtime.sync()?;
    runtime.save()?;
    print_record(runtime, id)
}

// ─── create ──────────────────────────────────────────────────────────

/// Arguments for `pcert create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Provider the certification belongs to.
    #[arg(long)]
    pub provider: Uuid,
    /// Certification name.
    #[arg(long)]
    pub name: String,
    /// Issuing organization.
    #[arg(long)]
    pub organization: String,
    /// Certification category.
    #[arg(long)]
    pub category: String,
    /// Externally issued certification number.
    #[arg(long)]
    pub number: String,
    /// Issue date (RFC 3339 UTC, e.g. 2026-01-01T00:00:00Z).
    #[arg(long)]
    pub issue_date: String,
    /// Expiry date (RFC 3339 UTC).
    #[arg(long)]
    pub expiry_date: String,
    /// Whether the certification recurs (renewals expected).
    #[arg(long)]
    pub recurring: bool,
    /// Acting user id; omitted means the system acts.
    #[arg(long)]
    pub actor: Option<Uuid>,
}

pub fn create(registry: &Path, args: CreateArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let provider = ProviderId(args.provider);
    runtime.inbox.register(provider);

    let input = NewCertification {
        provider,
        name: args.name,
        issuing_organization: args.organization,
        category: args.category,
        certification_number: args.number,
        issue_date: parse_ts(&args.issue_date)?,
        expiry_date: parse_ts(&args.expiry_date)?,
        recurring: args.recurring,
        initial_status: None,
    };
    let id = runtime.engine.create(input, &context(args.actor))?.id;
    finish(&mut runtime, id)
}

// ─── verify / reject ─────────────────────────────────────────────────

/// Arguments for `pcert verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Certification to verify.
    #[arg(long)]
    pub id: Uuid,
    /// The user confirming authenticity.
    #[arg(long)]
    pub verifier: Uuid,
}

pub fn verify(registry: &Path, args: VerifyArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let id = CertificationId(args.id);
    let verifier = ActorId(args.verifier);
    runtime.engine.verify(id, verifier, &context(Some(args.verifier)))?;
    finish(&mut runtime, id)
}

/// Arguments for `pcert reject`.
#[derive(Args, Debug)]
pub struct RejectArgs {
    /// Certification to reject.
    #[arg(long)]
    pub id: Uuid,
    /// Why it is rejected.
    #[arg(long)]
    pub reason: String,
    /// Acting user id; omitted means the system acts.
    #[arg(long)]
    pub actor: Option<Uuid>,
}

pub fn reject(registry: &Path, args: RejectArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let id = CertificationId(args.id);
    runtime.engine.reject(id, &args.reason, &context(args.actor))?;
    finish(&mut runtime, id)
}

// ─── renew / suspend / revoke ────────────────────────────────────────

/// Arguments for `pcert renew`.
#[derive(Args, Debug)]
pub struct RenewArgs {
    /// Certification to renew.
    #[arg(long)]
    pub id: Uuid,
    /// The new expiry date (RFC 3339 UTC, must be in the future).
    #[arg(long)]
    pub expiry_date: String,
    /// Acting user id; omitted means the system acts.
    #[arg(long)]
    pub actor: Option<Uuid>,
}

pub fn renew(registry: &Path, args: RenewArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let id = CertificationId(args.id);
    let new_expiry = parse_ts(&args.expiry_date)?;
    runtime.engine.renew(id, new_expiry, &context(args.actor))?;
    finish(&mut runtime, id)
}

/// Arguments for `pcert suspend`.
#[derive(Args, Debug)]
pub struct SuspendArgs {
    /// Certification to suspend.
    #[arg(long)]
    pub id: Uuid,
    /// Why it is suspended.
    #[arg(long)]
    pub reason: String,
    /// Acting user id; omitted means the system acts.
    #[arg(long)]
    pub actor: Option<Uuid>,
}

pub fn suspend(registry: &Path, args: SuspendArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let id = CertificationId(args.id);
    runtime.engine.suspend(id, &args.reason, &context(args.actor))?;
    finish(&mut runtime, id)
}

/// Arguments for `pcert revoke`.
#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Certification to revoke (terminal).
    #[arg(long)]
    pub id: Uuid,
    /// Why it is revoked.
    #[arg(long)]
    pub reason: String,
    /// Acting user id; omitted means the system acts.
    #[arg(long)]
    pub actor: Option<Uuid>,
}

pub fn revoke(registry: &Path, args: RevokeArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let id = CertificationId(args.id);
    runtime.engine.revoke(id, &args.reason, &context(args.actor))?;
    finish(&mut runtime, id)
}

// ─── update ──────────────────────────────────────────────────────────

/// Arguments for `pcert update`. Only the provided fields change.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Certification to update.
    #[arg(long)]
    pub id: Uuid,
    /// New certification name.
    #[arg(long)]
    pub name: Option<String>,
    /// New issuing organization.
    #[arg(long)]
    pub organization: Option<String>,
    /// New category.
    #[arg(long)]
    pub category: Option<String>,
    /// New certification number.
    #[arg(long)]
    pub number: Option<String>,
    /// New issue date (RFC 3339 UTC).
    #[arg(long)]
    pub issue_date: Option<String>,
    /// New expiry date (RFC 3339 UTC); triggers reminder rescheduling.
    #[arg(long)]
    pub expiry_date: Option<String>,
    /// New recurrence flag.
    #[arg(long)]
    pub recurring: Option<bool>,
    /// Acting user id; omitted means the system acts.
    #[arg(long)]
    pub actor: Option<Uuid>,
}

pub fn update(registry: &Path, args: UpdateArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let id = CertificationId(args.id);
    let update = CertificationUpdate {
        name: args.name,
        issuing_organization: args.organization,
        category: args.category,
        certification_number: args.number,
        issue_date: args.issue_date.as_deref().map(parse_ts).transpose()?,
        expiry_date: args.expiry_date.as_deref().map(parse_ts).transpose()?,
        recurring: args.recurring,
    };
    runtime.engine.update(id, &update, &context(args.actor))?;
    finish(&mut runtime, id)
}

// ─── sweep ───────────────────────────────────────────────────────────

/// Arguments for `pcert sweep`.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Evaluate past-due as of this instant instead of now (RFC 3339 UTC).
    #[arg(long)]
    pub at: Option<String>,
}

pub fn sweep(registry: &Path, args: SweepArgs) -> anyhow::Result<()> {
    let mut runtime = Runtime::open(registry)?;
    let now = match args.at.as_deref() {
        Some(at) => parse_ts(at)?,
        None => Timestamp::now(),
    };
    let expired = runtime.engine.sweep_expired(&OpContext::system(now));
    runtime.sync()?;
    runtime.save()?;

    println!("{}", serde_json::to_string_pretty(&expired)?);
    tracing::info!(count = expired.len(), "expiry sweep complete");
    Ok(())
}
