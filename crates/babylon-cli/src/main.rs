//! Babylon - Cosmo Tech platform deployment tool
//!
//! Usage:
//!   babylon apply <DIR>               # Deploy every manifest in DIR
//!   babylon apply <DIR> --dry-run     # Show what would be deployed
//!   babylon apply <DIR> --keep-going  # Continue after a failed deploy

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use babylon_core::commands::{ApplyCommand, ApplyOptions, ApplyPlan};
use babylon_core::deploy::{ApplyReport, OutcomeStatus};
use babylon_core::manifest::SkippedManifest;

#[derive(Parser)]
#[command(name = "babylon")]
#[command(about = "Cosmo Tech platform deployment tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the manifests of a directory
    ///
    /// Every .yaml/.yml file directly inside DIR is classified by the `kind`
    /// key in its first lines, then deployed in this order:
    /// Organization, Solution, Workspace, WebApp, Dataset.
    ///
    /// Requires BABYLON_SERVICE, BABYLON_TOKEN and BABYLON_ORG_NAME.
    /// WebApp manifests also need BABYLON_AZURE_TOKEN.
    Apply {
        /// Deployment directory
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        /// Keep deploying remaining manifests after a failure
        #[arg(long, short = 'k')]
        keep_going: bool,

        /// Classify manifests and print the deployment order without deploying
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output; exit status only
    Quiet,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "babylon=info,babylon_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            directory,
            keep_going,
            dry_run,
            format,
        } => run_apply(directory, keep_going, dry_run, format),
    }
}

fn run_apply(
    directory: PathBuf,
    keep_going: bool,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    // Prerequisites are checked here, before the directory is touched
    let cmd = ApplyCommand::with_defaults()?;
    let options = ApplyOptions::new(directory).with_keep_going(keep_going);

    if dry_run {
        let plan = cmd.plan(&options)?;
        match format {
            OutputFormat::Table => print_plan_table(&plan),
            OutputFormat::Json => print_plan_json(&plan)?,
            OutputFormat::Quiet => {}
        }
        return Ok(());
    }

    let deployer = cmd.context().api_deployer()?;
    let report = cmd.execute(&options, deployer)?;

    match format {
        OutputFormat::Table => print_report_table(&report),
        OutputFormat::Json => print_report_json(&report)?,
        OutputFormat::Quiet => {}
    }

    if !report.is_success() {
        let failed = report.failed().count();
        anyhow::bail!(
            "{} manifest{} failed to deploy",
            failed,
            if failed == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

fn print_plan_table(plan: &ApplyPlan) {
    println!("Directory: {}", plan.directory.display());
    println!();

    if plan.batch.is_empty() {
        println!("No manifests to deploy.");
    } else {
        println!("{:<4} {:<14} Manifest", "#", "Kind");
        println!("{}", "-".repeat(60));
        for (idx, manifest) in plan.batch.manifests().enumerate() {
            println!(
                "{:<4} {:<14} {}",
                idx + 1,
                manifest.kind().as_str(),
                file_name(manifest.path())
            );
        }
    }

    print_skipped(&plan.skipped);
}

fn print_plan_json(plan: &ApplyPlan) -> Result<()> {
    let manifests: Vec<_> = plan
        .batch
        .manifests()
        .map(|m| {
            serde_json::json!({
                "path": m.path(),
                "kind": m.kind(),
            })
        })
        .collect();
    let output = serde_json::json!({
        "directory": plan.directory,
        "manifests": manifests,
        "skipped": plan.skipped,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_report_table(report: &ApplyReport) {
    println!("Directory: {}", report.directory.display());
    println!();

    if report.outcomes.is_empty() {
        println!("No manifests to deploy.");
    } else {
        println!("  {:<14} {:<30} Result", "Kind", "Manifest");
        println!("  {}", "-".repeat(70));
        for outcome in &report.outcomes {
            let name = truncate(&file_name(&outcome.path), 30);
            let result = match &outcome.status {
                OutcomeStatus::Deployed { id, action } => format!(
                    "{} {:?} {}",
                    style("✓").green(),
                    action,
                    id.as_deref().unwrap_or("")
                ),
                OutcomeStatus::Failed { error } => {
                    format!("{} {}", style("✗").red(), error)
                }
                OutcomeStatus::NotAttempted => format!("{} not attempted", style("•").dim()),
            };
            println!("  {:<14} {:<30} {}", outcome.kind.as_str(), name, result);
        }
    }

    print_skipped(&report.skipped);

    println!();
    let deployed = report.deployed().count();
    let failed = report.failed().count();
    let not_attempted = report.not_attempted().count();
    if failed == 0 {
        println!("Summary: {} deployed, {} skipped", deployed, report.skipped.len());
    } else {
        println!(
            "Summary: {} deployed, {} failed, {} not attempted, {} skipped",
            deployed,
            failed,
            not_attempted,
            report.skipped.len()
        );
    }
}

fn print_report_json(report: &ApplyReport) -> Result<()> {
    // Wrap in versioned output
    let output = serde_json::json!({
        "schema_version": 1,
        "success": report.is_success(),
        "report": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_skipped(skipped: &[SkippedManifest]) {
    if skipped.is_empty() {
        return;
    }
    println!();
    println!("Skipped ({}):", skipped.len());
    for entry in skipped {
        println!(
            "  {} {}: {}",
            style("⚠").yellow(),
            file_name(&entry.path),
            entry.reason
        );
    }
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("org.yaml", 30), "org.yaml");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
    }

    #[test]
    fn cli_parses_apply() {
        let cli =
            Cli::try_parse_from(["babylon", "apply", "deploy", "--keep-going", "-f", "json"])
                .unwrap();
        match cli.command {
            Commands::Apply {
                directory,
                keep_going,
                dry_run,
                format,
            } => {
                assert_eq!(directory, PathBuf::from("deploy"));
                assert!(keep_going);
                assert!(!dry_run);
                assert!(matches!(format, OutputFormat::Json));
            }
        }
    }

    #[test]
    fn cli_requires_directory() {
        assert!(Cli::try_parse_from(["babylon", "apply"]).is_err());
    }
}
