pub mod selection;
pub mod task;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::livekit::VoicePlatform;
use crate::sheets::types::CallStatus;
use crate::sheets::StatusLedger;

use selection::{select_jobs, DispatchJob};

/// Knobs for one dispatch run.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub max_concurrent_calls: usize,
    /// Pause held inside the admission slot after each dispatch.
    pub call_gap: Duration,
    pub target_operation_type: String,
    pub agent_name: String,
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_calls: config.dispatch.max_concurrent_calls,
            call_gap: Duration::from_secs(config.dispatch.call_gap_seconds),
            target_operation_type: config.dispatch.target_operation_type.clone(),
            agent_name: config.livekit.agent_name.clone(),
        }
    }
}

/// Counts for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub fetched: usize,
    pub selected: usize,
    pub dispatched: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum RowOutcome {
    Dispatched,
    Failed,
}

/// Scan the sheet once and dispatch every eligible row, at most
/// `max_concurrent_calls` at a time.
///
/// Returns once every admitted row has finished. A row whose FAILED status
/// cannot be written ends with that error; the run reports the first such
/// error after all other rows are done.
pub async fn run_dispatch(
    ledger: &StatusLedger,
    platform: Arc<dyn VoicePlatform>,
    settings: &DispatchSettings,
) -> Result<DispatchReport> {
    let items = ledger.sheet().fetch_work_items().await?;
    tracing::info!(rows = items.len(), "Fetched sheet rows");

    let jobs = select_jobs(&items, &settings.target_operation_type);
    let mut report = DispatchReport {
        fetched: items.len(),
        selected: jobs.len(),
        ..Default::default()
    };

    tracing::info!(
        calls = jobs.len(),
        max_concurrent = settings.max_concurrent_calls,
        "Dispatching calls"
    );

    let admission = Arc::new(Semaphore::new(settings.max_concurrent_calls));
    let mut tasks = JoinSet::new();

    // Permits are taken in selection order so admission is FIFO
    for job in jobs {
        let permit = Arc::clone(&admission)
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("Admission gate closed: {e}")))?;

        let ledger = ledger.clone();
        let platform = Arc::clone(&platform);
        let agent_name = settings.agent_name.clone();
        let gap = settings.call_gap;

        tasks.spawn(async move {
            let outcome = dispatch_row(&ledger, platform.as_ref(), &job, &agent_name, gap).await;
            drop(permit);
            outcome
        });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(RowOutcome::Dispatched)) => report.dispatched += 1,
            Ok(Ok(RowOutcome::Failed)) => report.failed += 1,
            Ok(Err(e)) => {
                report.failed += 1;
                tracing::error!(error = %e, "Could not record call failure in sheet");
                first_error.get_or_insert(e);
            }
            Err(e) => {
                report.failed += 1;
                first_error.get_or_insert(AppError::Internal(format!("Dispatch task panicked: {e}")));
            }
        }
    }

    tracing::info!(
        dispatched = report.dispatched,
        failed = report.failed,
        "All selected calls processed"
    );

    match first_error {
        Some(e) => Err(e),
        None => Ok(report),
    }
}

/// Critical section for one row: mark IN_PROGRESS, dispatch, then hold the
/// slot for the call gap. Any failure before the gap marks the row FAILED.
async fn dispatch_row(
    ledger: &StatusLedger,
    platform: &dyn VoicePlatform,
    job: &DispatchJob,
    agent_name: &str,
    gap: Duration,
) -> Result<RowOutcome> {
    let attempt = async {
        ledger.set_status(job.row, &CallStatus::InProgress).await?;
        task::place_call(platform, job, agent_name).await
    }
    .await;

    match attempt {
        Ok(dispatch) => {
            tokio::time::sleep(gap).await;
            tracing::info!(row = job.row, room = %dispatch.room, "Call dispatched");
            Ok(RowOutcome::Dispatched)
        }
        Err(e) => {
            tracing::error!(row = job.row, error = %e, "Call failed");
            ledger.set_status(job.row, &CallStatus::Failed).await?;
            Ok(RowOutcome::Failed)
        }
    }
}
