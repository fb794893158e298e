use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pulse_conformance::suite::case;
use pulse_conformance::{modules, CaseFilter};
use pulse_kernel::settings::Settings;
use pulse_kernel::ResourceRegistry;

/// Conformance checker for the books/roles REST service
#[derive(Debug, Parser)]
#[command(name = "pulse", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the names of the available cases
    List {
        /// Only cases of this resource (books, roles)
        #[arg(long)]
        resource: Option<String>,
    },
    /// Run cases against the configured service
    Run {
        /// Only cases of this resource (books, roles)
        #[arg(long)]
        resource: Option<String>,
        /// Only cases whose name contains this text
        #[arg(long = "case")]
        case: Option<String>,
        /// Override `target.base_url`
        #[arg(long)]
        base_url: Option<String>,
        /// Leave fixture records on the server
        #[arg(long)]
        keep_records: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load pulse settings")?;
    pulse_telemetry::init(&settings.telemetry)?;

    let registry = modules::default_registry();

    match cli.command {
        Command::List { resource } => {
            let filter = CaseFilter {
                resource: checked_resource(&registry, resource)?,
                name_contains: None,
            };
            for case in case::select(&registry, &filter) {
                println!("{}", case.name());
            }
        }
        Command::Run {
            resource,
            case,
            base_url,
            keep_records,
        } => {
            if let Some(base_url) = base_url {
                settings.target.base_url = base_url;
            }
            if keep_records {
                settings.suite.cleanup = false;
            }
            let filter = CaseFilter {
                resource: checked_resource(&registry, resource)?,
                name_contains: case,
            };

            tracing::info!(
                env = ?settings.environment,
                target = %settings.target.base_url,
                "pulse run starting"
            );

            let report = pulse_conformance::run_suite(&settings, &filter).await?;
            println!("{report}");

            if report.total() == 0 {
                bail!("no cases matched the given filters");
            }
            if !report.is_success() {
                bail!(
                    "{} of {} conformance cases failed",
                    report.total() - report.passed(),
                    report.total()
                );
            }
        }
    }

    Ok(())
}

fn checked_resource(
    registry: &ResourceRegistry,
    resource: Option<String>,
) -> anyhow::Result<Option<String>> {
    match resource {
        Some(name) if registry.get(&name).is_none() => bail!(
            "unknown resource '{}'; expected one of {}",
            name,
            registry.names().join(", ")
        ),
        other => Ok(other),
    }
}
