use anyhow::{bail, Context};
use pulse_conformance::CaseFilter;
use pulse_kernel::settings::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load pulse settings")?;
    pulse_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        target = %settings.target.base_url,
        "pulse-conformance starting"
    );

    let report = pulse_conformance::run_suite(&settings, &CaseFilter::default()).await?;
    println!("{report}");

    if !report.is_success() {
        bail!(
            "{} of {} conformance cases failed",
            report.total() - report.passed(),
            report.total()
        );
    }
    Ok(())
}
