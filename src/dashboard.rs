use crate::ledger::{Metric, Project};
use crate::models::{DashboardResponse, DashboardSeries, DashboardSummary};
use chrono::{Local, NaiveDateTime, Timelike};

pub fn build_dashboard(project: &Project) -> DashboardResponse {
    let now = Local::now().naive_local();
    build_dashboard_at(now.with_nanosecond(0).unwrap_or(now), project)
}

/// Read-only view over a project's ledger. Nothing stored is recomputed;
/// the summary repeats the latest entry, or the seed when there is none.
pub fn build_dashboard_at(issued_at: NaiveDateTime, project: &Project) -> DashboardResponse {
    let ledger = &project.ledger;
    let latest = ledger.latest();
    let reference = latest.unwrap_or_else(|| ledger.seed());
    let total = ledger.contract_total_amount();

    let summary = DashboardSummary {
        entry_count: ledger.len(),
        latest_entry_date: latest.map(|entry| entry.entry_date),
        cumulative_physical_pct: reference.cumulative_physical_pct,
        cumulative_financial_amount: reference.cumulative_financial_amount,
        financial_progress_pct: reference.cumulative_financial_amount / total * 100.0,
        remaining_balance: reference.remaining_balance,
    };

    let series = DashboardSeries {
        cumulative_physical_pct: ledger.series(Metric::CumulativePhysicalPct),
        cumulative_financial_amount: ledger.series(Metric::CumulativeFinancialAmount),
        daily_physical_pct: ledger.series(Metric::DailyPhysicalPct),
        daily_financial_amount: ledger.series(Metric::DailyFinancialAmount),
        remaining_balance: ledger.series(Metric::RemainingBalance),
    };

    DashboardResponse {
        issued_at,
        project: project.info.clone(),
        summary,
        series,
        entries: ledger.dashboard_projection(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::NewEntry;
    use chrono::NaiveDate;

    fn issued_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn zone_one() -> Project {
        AppConfig::default()
            .into_projects()
            .remove("zona-1")
            .expect("missing zone")
    }

    fn entry(day: u32, physical: f64, financial: f64) -> NewEntry {
        NewEntry {
            sequence_label: format!("Day {day}"),
            entry_date: NaiveDate::from_ymd_opt(2025, 1, day),
            weather: "Sunny".into(),
            cumulative_physical_pct: Some(physical),
            cumulative_financial_amount: Some(financial),
            narrative: "Poles raised".into(),
            evidence_count: 3,
            supervisor_signature: "SUPERVISOR".into(),
            ..NewEntry::default()
        }
    }

    #[test]
    fn empty_ledger_reports_seed() {
        let project = zone_one();
        let dashboard = build_dashboard_at(issued_at(), &project);

        assert_eq!(dashboard.issued_at, issued_at());
        assert_eq!(dashboard.summary.entry_count, 0);
        assert_eq!(dashboard.summary.latest_entry_date, None);
        assert_eq!(dashboard.summary.cumulative_physical_pct, 0.0);
        assert_eq!(dashboard.summary.remaining_balance, 1_500_000.00);
        assert!(dashboard.entries.is_empty());
        assert!(dashboard.series.daily_financial_amount.is_empty());
    }

    #[test]
    fn summary_and_series_follow_latest_entry() {
        let mut project = zone_one();
        project.ledger.append_entry(entry(5, 10.0, 150_000.0)).unwrap();
        project.ledger.append_entry(entry(10, 25.0, 300_000.0)).unwrap();

        let dashboard = build_dashboard_at(issued_at(), &project);
        assert_eq!(dashboard.summary.entry_count, 2);
        assert_eq!(
            dashboard.summary.latest_entry_date,
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert_eq!(dashboard.summary.cumulative_physical_pct, 25.0);
        assert_eq!(dashboard.summary.financial_progress_pct, 20.0);
        assert_eq!(dashboard.summary.remaining_balance, 1_200_000.0);

        let bars: Vec<f64> = dashboard
            .series
            .daily_financial_amount
            .iter()
            .map(|point| point.value)
            .collect();
        assert_eq!(bars, vec![150_000.0, 150_000.0]);
        assert_eq!(dashboard.series.remaining_balance.len(), 2);
        assert_eq!(dashboard.entries.len(), 2);
    }
}
