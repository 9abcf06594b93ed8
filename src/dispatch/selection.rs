use crate::sheets::types::WorkItem;
use crate::transliterate::itrans_to_devanagari;

/// A row picked for this run, ready to be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchJob {
    pub row: u32,
    /// Patient name in Devanagari.
    pub patient_name: String,
    /// Phone cell as read from the sheet.
    pub phone_number: String,
}

/// Rows that are PENDING or FAILED and belong to the target operation type,
/// in sheet order.
pub fn select_jobs(items: &[WorkItem], target_operation_type: &str) -> Vec<DispatchJob> {
    items
        .iter()
        .filter(|item| item.status.is_dispatchable())
        .filter(|item| item.operation_type == target_operation_type)
        .map(|item| DispatchJob {
            row: item.row,
            patient_name: itrans_to_devanagari(&item.patient_name),
            phone_number: item.phone_number.clone(),
        })
        .collect()
}
