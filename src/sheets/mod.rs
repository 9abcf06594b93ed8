pub mod google;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SheetsConfig;
use crate::error::Result;
use types::*;

/// Remote spreadsheet used as work queue and status ledger.
///
/// Every call goes straight to the remote service; implementations keep no
/// row cache.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    /// Fetch all data rows in sheet order.
    async fn fetch_work_items(&self) -> Result<Vec<WorkItem>>;

    /// Overwrite a single cell (1-based row and column).
    async fn update_cell(&self, row: u32, column: u32, value: &str) -> Result<()>;
}

/// Writes call status and recording links into their configured columns.
#[derive(Clone)]
pub struct StatusLedger {
    sheet: Arc<dyn Spreadsheet>,
    status_column: u32,
    recording_column: u32,
}

impl StatusLedger {
    pub fn new(sheet: Arc<dyn Spreadsheet>, config: &SheetsConfig) -> Self {
        Self::with_columns(sheet, config.status_column, config.recording_column)
    }

    pub fn with_columns(sheet: Arc<dyn Spreadsheet>, status_column: u32, recording_column: u32) -> Self {
        Self {
            sheet,
            status_column,
            recording_column,
        }
    }

    pub fn sheet(&self) -> &Arc<dyn Spreadsheet> {
        &self.sheet
    }

    pub async fn set_status(&self, row: u32, status: &CallStatus) -> Result<()> {
        tracing::debug!(row, status = %status, "Updating call status");
        self.sheet
            .update_cell(row, self.status_column, status.as_str())
            .await
    }

    pub async fn set_recording_link(&self, row: u32, url: &str) -> Result<()> {
        tracing::debug!(row, url, "Writing recording link");
        self.sheet.update_cell(row, self.recording_column, url).await
    }
}
