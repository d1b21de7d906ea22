use crate::models::{EntryCorrection, NewEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const EXECUTION_DAY: &str = "Execution day";
pub const EXECUTION_DATE: &str = "Execution date";
pub const WEATHER: &str = "Weather conditions";
pub const CUMULATIVE_PHYSICAL: &str = "Cumulative physical progress (%)";
pub const CUMULATIVE_FINANCIAL: &str = "Cumulative financial progress ($)";
pub const ACTIVITIES: &str = "Activities performed";
pub const EVIDENCE: &str = "Photographic evidence";
pub const SUPERVISOR_SIGNATURE: &str = "Supervisor signature";

/// One failed precondition, named by the label the form shows for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Checks every precondition of a new entry except the duplicate-date rule,
/// which needs the ledger and is applied by the caller.
pub fn validate_new_entry(entry: &NewEntry, contract_start: NaiveDate) -> Vec<FieldViolation> {
    let mut checks = Checks::default();
    checks.required_text(EXECUTION_DAY, &entry.sequence_label);
    match entry.entry_date {
        None => checks.push(EXECUTION_DATE, "is required"),
        Some(date) if date <= contract_start => checks.push(
            EXECUTION_DATE,
            format!("must fall after the contract start ({contract_start})"),
        ),
        Some(_) => {}
    }
    checks.required_text(WEATHER, &entry.weather);
    checks.physical(entry.cumulative_physical_pct);
    checks.financial(entry.cumulative_financial_amount);
    checks.required_text(ACTIVITIES, &entry.narrative);
    checks.evidence(entry.evidence_count);
    checks.required_text(SUPERVISOR_SIGNATURE, &entry.supervisor_signature);
    checks.into_inner()
}

/// Same rules as a new entry, except that an omitted evidence count is
/// accepted and keeps whatever the entry already had.
pub fn validate_correction(correction: &EntryCorrection) -> Vec<FieldViolation> {
    let mut checks = Checks::default();
    checks.required_text(EXECUTION_DAY, &correction.sequence_label);
    checks.required_text(WEATHER, &correction.weather);
    checks.physical(correction.cumulative_physical_pct);
    checks.financial(correction.cumulative_financial_amount);
    checks.required_text(ACTIVITIES, &correction.narrative);
    if let Some(count) = correction.evidence_count {
        checks.evidence(count);
    }
    checks.required_text(SUPERVISOR_SIGNATURE, &correction.supervisor_signature);
    checks.into_inner()
}

#[derive(Default)]
struct Checks(Vec<FieldViolation>);

impl Checks {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    fn required_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    fn physical(&mut self, value: Option<f64>) {
        match value {
            None => self.push(CUMULATIVE_PHYSICAL, "is required"),
            Some(pct) if !pct.is_finite() || !(0.0..=100.0).contains(&pct) => {
                self.push(CUMULATIVE_PHYSICAL, "must be between 0 and 100")
            }
            Some(_) => {}
        }
    }

    fn financial(&mut self, value: Option<f64>) {
        match value {
            None => self.push(CUMULATIVE_FINANCIAL, "is required"),
            Some(amount) if !amount.is_finite() || amount < 0.0 => {
                self.push(CUMULATIVE_FINANCIAL, "must be zero or greater")
            }
            Some(_) => {}
        }
    }

    fn evidence(&mut self, count: u32) {
        if count == 0 {
            self.push(EVIDENCE, "attach at least one photo");
        }
    }

    fn into_inner(self) -> Vec<FieldViolation> {
        self.0
    }
}
