use serde::{Deserialize, Serialize};

/// Payload attached to a dispatch and handed to the call session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    /// Number to dial, `+` followed by digits. Absent for inbound calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Name used in the greeting, already in the target script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    /// Sheet row to write results to. No writes happen without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_row: Option<u32>,
}

impl CallMetadata {
    pub fn outbound(phone_number: String, patient_name: String, sheet_row: u32) -> Self {
        Self {
            phone_number: Some(phone_number),
            patient_name: Some(patient_name),
            sheet_row: Some(sheet_row),
        }
    }

    /// Parse job metadata.
    ///
    /// Anything that is not a metadata object is taken to be a bare phone
    /// number; blank metadata means an inbound call.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<CallMetadata>(raw) {
            Ok(mut metadata) => {
                metadata.phone_number = metadata
                    .phone_number
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty());
                metadata
            }
            Err(_) => {
                let trimmed = raw.trim();
                Self {
                    phone_number: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    patient_name: None,
                    sheet_row: None,
                }
            }
        }
    }

    pub fn is_outbound(&self) -> bool {
        self.phone_number.is_some()
    }

    pub fn patient_name_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.patient_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(default)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Dialable form of a sheet phone cell: `+` and the digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("+{digits}"))
    }
}
