//! Per-project log of dated progress readings.
//!
//! Every entry stores cumulative physical (%) and financial ($) readings as
//! reported on its date. Daily figures are the difference against the
//! chronologically previous entry, floored at zero, and are fixed when the
//! entry is written. A synthetic seed entry at contract start anchors the
//! first delta and never shows up in projections.

use crate::errors::LedgerError;
use crate::models::{
    ContractControl, EntryCorrection, NewEntry, ProgressEntry, ProjectInfo, SeriesPoint,
    DEFAULT_INCIDENTS,
};
use crate::validation::{validate_correction, validate_new_entry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

/// What a correction does to the entries dated after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionPolicy {
    /// Later entries keep the deltas computed when they were written.
    #[default]
    Isolated,
    /// Later entries get their deltas recomputed against their predecessors.
    Cascade,
}

/// Cumulative readings of the seed entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedReading {
    #[serde(default)]
    pub cumulative_physical_pct: f64,
    #[serde(default)]
    pub cumulative_financial_amount: f64,
}

/// Which figure of an entry a chart series plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CumulativePhysicalPct,
    CumulativeFinancialAmount,
    DailyPhysicalPct,
    DailyFinancialAmount,
    RemainingBalance,
}

impl Metric {
    fn read(self, entry: &ProgressEntry) -> f64 {
        match self {
            Self::CumulativePhysicalPct => entry.cumulative_physical_pct,
            Self::CumulativeFinancialAmount => entry.cumulative_financial_amount,
            Self::DailyPhysicalPct => entry.daily_physical_pct,
            Self::DailyFinancialAmount => entry.daily_financial_amount,
            Self::RemainingBalance => entry.remaining_balance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    contract_total_amount: f64,
    seed: ProgressEntry,
    entries: BTreeMap<NaiveDate, ProgressEntry>,
    policy: CorrectionPolicy,
}

impl Ledger {
    pub fn new(
        contract_total_amount: f64,
        contract_start: NaiveDate,
        seed: SeedReading,
        policy: CorrectionPolicy,
    ) -> Self {
        let seed = ProgressEntry {
            sequence_label: "Contract start".to_string(),
            entry_date: contract_start,
            weather: String::new(),
            incidents: String::new(),
            cumulative_physical_pct: seed.cumulative_physical_pct,
            cumulative_financial_amount: seed.cumulative_financial_amount,
            daily_physical_pct: 0.0,
            daily_financial_amount: 0.0,
            remaining_balance: contract_total_amount - seed.cumulative_financial_amount,
            narrative: String::new(),
            observations: String::new(),
            personnel_equipment: String::new(),
            evidence_count: 0,
            supervisor_signature: String::new(),
            contractor_signature: String::new(),
            control: ContractControl::default(),
        };

        Self {
            contract_total_amount,
            seed,
            entries: BTreeMap::new(),
            policy,
        }
    }

    pub fn contract_total_amount(&self) -> f64 {
        self.contract_total_amount
    }

    pub fn contract_start(&self) -> NaiveDate {
        self.seed.entry_date
    }

    pub fn seed(&self) -> &ProgressEntry {
        &self.seed
    }

    pub fn policy(&self) -> CorrectionPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ProgressEntry> {
        self.entries.get(&date)
    }

    /// Latest real entry, if any.
    pub fn latest(&self) -> Option<&ProgressEntry> {
        self.entries.values().next_back()
    }

    /// Validates and inserts a new dated entry.
    ///
    /// All field checks run before the ledger is touched. A date that is
    /// already taken always yields [`LedgerError::DuplicateDate`], carrying
    /// whatever other violations the same submission had.
    pub fn append_entry(&mut self, candidate: NewEntry) -> Result<ProgressEntry, LedgerError> {
        let violations = validate_new_entry(&candidate, self.contract_start());
        if let Some(date) = candidate
            .entry_date
            .filter(|date| self.entries.contains_key(date))
        {
            return Err(LedgerError::DuplicateDate { date, violations });
        }

        let (date, physical, financial) = match (
            candidate.entry_date,
            candidate.cumulative_physical_pct,
            candidate.cumulative_financial_amount,
        ) {
            (Some(date), Some(physical), Some(financial)) if violations.is_empty() => {
                (date, physical, financial)
            }
            _ => return Err(LedgerError::Validation(violations)),
        };

        let previous = self.previous(date);
        let (daily_physical_pct, daily_financial_amount) = deltas(previous, physical, financial);
        let entry = ProgressEntry {
            sequence_label: candidate.sequence_label.trim().to_string(),
            entry_date: date,
            weather: candidate.weather.trim().to_string(),
            incidents: incidents_or_default(&candidate.incidents),
            cumulative_physical_pct: physical,
            cumulative_financial_amount: financial,
            daily_physical_pct,
            daily_financial_amount,
            remaining_balance: self.contract_total_amount - financial,
            narrative: candidate.narrative.trim().to_string(),
            observations: candidate.observations.trim().to_string(),
            personnel_equipment: candidate.personnel_equipment.trim().to_string(),
            evidence_count: candidate.evidence_count,
            supervisor_signature: candidate.supervisor_signature.trim().to_string(),
            contractor_signature: candidate.contractor_signature.trim().to_string(),
            control: candidate.control.trimmed(),
        };

        debug!(date = %entry.entry_date, previous = %previous.entry_date, "entry appended");
        self.entries.insert(entry.entry_date, entry.clone());
        Ok(entry)
    }

    /// Overwrites the entry dated `date`, recomputing its derived figures
    /// against the entry before it. Later entries are only touched under
    /// [`CorrectionPolicy::Cascade`].
    pub fn correct_entry(
        &mut self,
        date: NaiveDate,
        correction: EntryCorrection,
    ) -> Result<ProgressEntry, LedgerError> {
        if !self.entries.contains_key(&date) {
            return Err(LedgerError::NotFound(date));
        }
        let violations = validate_correction(&correction);
        let (physical, financial) = match correction
            .cumulative_physical_pct
            .zip(correction.cumulative_financial_amount)
        {
            Some(readings) if violations.is_empty() => readings,
            _ => return Err(LedgerError::Validation(violations)),
        };

        let (daily_physical_pct, daily_financial_amount) =
            deltas(self.previous(date), physical, financial);
        let remaining_balance = self.contract_total_amount - financial;

        let corrected = match self.entries.get_mut(&date) {
            Some(entry) => {
                entry.sequence_label = correction.sequence_label.trim().to_string();
                entry.weather = correction.weather.trim().to_string();
                entry.incidents = incidents_or_default(&correction.incidents);
                entry.cumulative_physical_pct = physical;
                entry.cumulative_financial_amount = financial;
                entry.daily_physical_pct = daily_physical_pct;
                entry.daily_financial_amount = daily_financial_amount;
                entry.remaining_balance = remaining_balance;
                entry.narrative = correction.narrative.trim().to_string();
                entry.observations = correction.observations.trim().to_string();
                entry.personnel_equipment = correction.personnel_equipment.trim().to_string();
                if let Some(count) = correction.evidence_count {
                    entry.evidence_count = count;
                }
                entry.supervisor_signature = correction.supervisor_signature.trim().to_string();
                entry.contractor_signature = correction.contractor_signature.trim().to_string();
                entry.control = correction.control.trimmed();
                entry.clone()
            }
            None => return Err(LedgerError::NotFound(date)),
        };

        if self.policy == CorrectionPolicy::Cascade {
            self.recompute_after(date);
        }

        debug!(%date, policy = ?self.policy, "entry corrected");
        Ok(corrected)
    }

    /// Real entries in date order with their stored figures.
    pub fn dashboard_projection(&self) -> Vec<ProgressEntry> {
        self.entries.values().cloned().collect()
    }

    pub fn series(&self, metric: Metric) -> Vec<SeriesPoint> {
        self.entries
            .values()
            .map(|entry| SeriesPoint {
                date: entry.entry_date,
                value: metric.read(entry),
            })
            .collect()
    }

    fn previous(&self, date: NaiveDate) -> &ProgressEntry {
        self.entries
            .range(..date)
            .next_back()
            .map(|(_, entry)| entry)
            .unwrap_or(&self.seed)
    }

    fn recompute_after(&mut self, date: NaiveDate) {
        let later: Vec<NaiveDate> = self
            .entries
            .range((Bound::Excluded(date), Bound::Unbounded))
            .map(|(date, _)| *date)
            .collect();

        for later in later {
            let previous = self.previous(later);
            let baseline = (
                previous.cumulative_physical_pct,
                previous.cumulative_financial_amount,
            );
            if let Some(entry) = self.entries.get_mut(&later) {
                entry.daily_physical_pct = (entry.cumulative_physical_pct - baseline.0).max(0.0);
                entry.daily_financial_amount =
                    (entry.cumulative_financial_amount - baseline.1).max(0.0);
            }
        }
    }
}

fn deltas(previous: &ProgressEntry, physical: f64, financial: f64) -> (f64, f64) {
    (
        (physical - previous.cumulative_physical_pct).max(0.0),
        (financial - previous.cumulative_financial_amount).max(0.0),
    )
}

fn incidents_or_default(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        DEFAULT_INCIDENTS.to_string()
    } else {
        value.to_string()
    }
}

/// A configured contract together with its ledger.
#[derive(Debug, Clone)]
pub struct Project {
    pub info: ProjectInfo,
    pub ledger: Ledger,
}

impl Project {
    pub fn new(info: ProjectInfo, seed: SeedReading, policy: CorrectionPolicy) -> Self {
        let ledger = Ledger::new(info.contract_total_amount, info.contract_start, seed, policy);
        Self { info, ledger }
    }
}
