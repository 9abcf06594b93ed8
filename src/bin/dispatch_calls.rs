use std::sync::Arc;

use clap::Parser;

use reminder_caller::config::{check_max_concurrent, AppConfig};
use reminder_caller::dispatch::{run_dispatch, DispatchSettings};
use reminder_caller::livekit::LiveKitClient;
use reminder_caller::sheets::google::GoogleSheets;
use reminder_caller::sheets::StatusLedger;

#[derive(Parser)]
#[command(
    name = "dispatch_calls",
    about = "Dispatch reminder calls for every pending row in the sheet"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured number of calls in flight
    #[arg(long)]
    max_concurrent: Option<usize>,
}

fn apply_overrides(cli: &Cli, settings: &mut DispatchSettings) -> anyhow::Result<()> {
    if let Some(n) = cli.max_concurrent {
        settings.max_concurrent_calls =
            check_max_concurrent(n).map_err(|e| anyhow::anyhow!("--max-concurrent {e}"))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    reminder_caller::logging::init(&config.logging);

    let mut settings = DispatchSettings::from_config(&config);
    apply_overrides(&cli, &mut settings)?;

    tracing::info!(
        spreadsheet = %config.sheets.spreadsheet_id,
        operation_type = %settings.target_operation_type,
        max_concurrent = settings.max_concurrent_calls,
        gap_secs = settings.call_gap.as_secs(),
        "Starting dispatch run"
    );

    let sheet = Arc::new(GoogleSheets::new(&config.sheets)?);
    let ledger = StatusLedger::new(sheet, &config.sheets);
    let platform = Arc::new(LiveKitClient::new(&config.livekit));

    let report = run_dispatch(&ledger, platform, &settings).await?;

    tracing::info!(
        fetched = report.fetched,
        selected = report.selected,
        dispatched = report.dispatched,
        failed = report.failed,
        "Dispatch run complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> DispatchSettings {
        DispatchSettings {
            max_concurrent_calls: 2,
            call_gap: Duration::from_secs(10),
            target_operation_type: "Cataract".to_string(),
            agent_name: "reminder-caller".to_string(),
        }
    }

    fn overridden(args: &[&str]) -> anyhow::Result<usize> {
        let cli = Cli::try_parse_from(std::iter::once("dispatch_calls").chain(args.iter().copied()))?;
        let mut settings = settings();
        apply_overrides(&cli, &mut settings)?;
        Ok(settings.max_concurrent_calls)
    }

    #[test]
    fn test_max_concurrent_override() {
        assert_eq!(overridden(&[]).unwrap(), 2);
        assert_eq!(overridden(&["--max-concurrent", "5"]).unwrap(), 5);
    }

    #[test]
    fn test_max_concurrent_out_of_range() {
        assert!(overridden(&["--max-concurrent", "0"]).is_err());
        let too_many = (tokio::sync::Semaphore::MAX_PERMITS + 1).to_string();
        assert!(overridden(&["--max-concurrent", &too_many]).is_err());
    }
}
