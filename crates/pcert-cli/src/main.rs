//! # pcert CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::path::PathBuf;

use clap::Parser;

/// Provider Certification CLI — certification lifecycle toolchain.
///
/// Records, verifies, renews, and retires provider certifications,
/// delivers expiry reminders, and reports per-provider metrics over a
/// JSON registry file.
#[derive(Parser, Debug)]
#[command(name = "pcert", version, about)]
struct Cli {
    /// Path to the registry file.
    #[arg(long, global = true, default_value = "registry.json")]
    registry: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Record a new certification.
    Create(pcert_cli::lifecycle::CreateArgs),
    /// Confirm a certification authentic.
    Verify(pcert_cli::lifecycle::VerifyArgs),
    /// Reject a certification as inauthentic.
    Reject(pcert_cli::lifecycle::RejectArgs),
    /// Renew a certification with a new expiry date.
    Renew(pcert_cli::lifecycle::RenewArgs),
    /// Suspend a certification.
    Suspend(pcert_cli::lifecycle::SuspendArgs),
    /// Permanently revoke a certification.
    Revoke(pcert_cli::lifecycle::RevokeArgs),
    /// Edit a certification's descriptive fields.
    Update(pcert_cli::lifecycle::UpdateArgs),
    /// Expire every past-due certification.
    Sweep(pcert_cli::lifecycle::SweepArgs),
    /// Deliver due expiry reminders.
    Remind(pcert_cli::reporting::RemindArgs),
    /// Per-provider profile or global roll-up.
    Stats(pcert_cli::reporting::StatsArgs),
    /// Export a snapshot blob.
    Export(pcert_cli::transfer::ExportArgs),
    /// Import a snapshot blob into a fresh registry.
    Import(pcert_cli::transfer::ImportArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create(args) => pcert_cli::lifecycle::create(&cli.registry, args),
        Commands::Verify(args) => pcert_cli::lifecycle::verify(&cli.registry, args),
        Commands::Reject(args) => pcert_cli::lifecycle::reject(&cli.registry, args),
        Commands::Renew(args) => pcert_cli::lifecycle::renew(&cli.registry, args),
        Commands::Suspend(args) => pcert_cli::lifecycle::suspend(&cli.registry, args),
        Commands::Revoke(args) => pcert_cli::lifecycle::revoke(&cli.registry, args),
        Commands::Update(args) => pcert_cli::lifecycle::update(&cli.registry, args),
        Commands::Sweep(args) => pcert_cli::lifecycle::sweep(&cli.registry, args),
        Commands::Remind(args) => pcert_cli::reporting::remind(&cli.registry, args),
        Commands::Stats(args) => pcert_cli::reporting::stats(&cli.registry, args),
        Commands::Export(args) => pcert_cli::transfer::export(&cli.registry, args),
        Commands::Import(args) => pcert_cli::transfer::import(&cli.registry, args),
    }
}
