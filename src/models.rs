use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INCIDENTS: &str = "No incidents";

/// Contract-control registers kept alongside each daily log. All optional
/// free text, flattened into the entry's JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractControl {
    /// Prorated progress per milestone, e.g. "Milestone 1: 100% | Milestone 2: 45%".
    #[serde(default)]
    pub milestone_progress: String,
    /// CPI, SPI and estimate at completion.
    #[serde(default)]
    pub performance_indicators: String,
    /// Whether the quantity table and daily progress report were checked on site.
    #[serde(default)]
    pub quantity_control: String,
    #[serde(default)]
    pub complementary_contracts: String,
    #[serde(default)]
    pub work_orders: String,
    #[serde(default)]
    pub quantity_increase: String,
}

impl ContractControl {
    pub fn trimmed(&self) -> Self {
        Self {
            milestone_progress: self.milestone_progress.trim().to_string(),
            performance_indicators: self.performance_indicators.trim().to_string(),
            quantity_control: self.quantity_control.trim().to_string(),
            complementary_contracts: self.complementary_contracts.trim().to_string(),
            work_orders: self.work_orders.trim().to_string(),
            quantity_increase: self.quantity_increase.trim().to_string(),
        }
    }
}

/// One row of a project's ledger, with the derived figures filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub sequence_label: String,
    pub entry_date: NaiveDate,
    pub weather: String,
    pub incidents: String,
    pub cumulative_physical_pct: f64,
    pub cumulative_financial_amount: f64,
    pub daily_physical_pct: f64,
    pub daily_financial_amount: f64,
    pub remaining_balance: f64,
    pub narrative: String,
    pub observations: String,
    pub personnel_equipment: String,
    pub evidence_count: u32,
    pub supervisor_signature: String,
    pub contractor_signature: String,
    #[serde(flatten)]
    pub control: ContractControl,
}

/// A daily log submission as produced by the RDO form.
///
/// Text fields default to empty so that a sparse submission reaches
/// validation and gets every missing field reported at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub sequence_label: String,
    #[serde(default)]
    pub entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub incidents: String,
    #[serde(default)]
    pub cumulative_physical_pct: Option<f64>,
    #[serde(default)]
    pub cumulative_financial_amount: Option<f64>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub personnel_equipment: String,
    #[serde(default)]
    pub evidence_count: u32,
    #[serde(default)]
    pub supervisor_signature: String,
    #[serde(default)]
    pub contractor_signature: String,
    #[serde(flatten)]
    pub control: ContractControl,
}

/// Replacement values for an existing entry. The target date comes from the
/// caller; `evidence_count: None` keeps the stored count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryCorrection {
    #[serde(default)]
    pub sequence_label: String,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub incidents: String,
    #[serde(default)]
    pub cumulative_physical_pct: Option<f64>,
    #[serde(default)]
    pub cumulative_financial_amount: Option<f64>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub observations: String,
    #[serde(default)]
    pub personnel_equipment: String,
    #[serde(default)]
    pub evidence_count: Option<u32>,
    #[serde(default)]
    pub supervisor_signature: String,
    #[serde(default)]
    pub contractor_signature: String,
    #[serde(flatten)]
    pub control: ContractControl,
}

/// Static description of one contract/zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
    pub contractor: String,
    pub supervision_contract_amount: Option<f64>,
    pub contract_total_amount: f64,
    pub contract_start: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppendResponse {
    pub entry: ProgressEntry,
    pub entries: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardSeries {
    pub cumulative_physical_pct: Vec<SeriesPoint>,
    pub cumulative_financial_amount: Vec<SeriesPoint>,
    pub daily_physical_pct: Vec<SeriesPoint>,
    pub daily_financial_amount: Vec<SeriesPoint>,
    pub remaining_balance: Vec<SeriesPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub entry_count: usize,
    pub latest_entry_date: Option<NaiveDate>,
    pub cumulative_physical_pct: f64,
    pub cumulative_financial_amount: f64,
    pub financial_progress_pct: f64,
    pub remaining_balance: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub issued_at: NaiveDateTime,
    pub project: ProjectInfo,
    pub summary: DashboardSummary,
    pub series: DashboardSeries,
    pub entries: Vec<ProgressEntry>,
}
