use crate::dashboard::build_dashboard;
use crate::errors::AppError;
use crate::ledger::Project;
use crate::models::{
    AppendResponse, DashboardResponse, EntryCorrection, NewEntry, ProgressEntry, ProjectInfo,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let projects = state.projects.lock().await;
    let infos: Vec<ProjectInfo> = projects.values().map(|project| project.info.clone()).collect();
    Html(render_index(&infos))
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectInfo>> {
    let projects = state.projects.lock().await;
    Json(projects.values().map(|project| project.info.clone()).collect())
}

pub async fn list_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProgressEntry>>, AppError> {
    let mut projects = state.projects.lock().await;
    let project = find_project(&mut projects, &id)?;
    Ok(Json(project.ledger.dashboard_projection()))
}

pub async fn append_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(candidate): Json<NewEntry>,
) -> Result<(StatusCode, Json<AppendResponse>), AppError> {
    let mut projects = state.projects.lock().await;
    let project = find_project(&mut projects, &id)?;
    let date = candidate.entry_date;

    let entry = project.ledger.append_entry(candidate).map_err(|err| {
        warn!(project = %id, date = ?date, "rdo entry rejected: {err}");
        AppError::from(err)
    })?;
    info!(
        project = %id,
        date = %entry.entry_date,
        daily_physical_pct = entry.daily_physical_pct,
        daily_financial_amount = entry.daily_financial_amount,
        "rdo entry appended"
    );

    let response = AppendResponse {
        entry,
        entries: project.ledger.dashboard_projection(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn correct_entry(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, NaiveDate)>,
    Json(correction): Json<EntryCorrection>,
) -> Result<Json<ProgressEntry>, AppError> {
    let mut projects = state.projects.lock().await;
    let project = find_project(&mut projects, &id)?;

    let entry = project.ledger.correct_entry(date, correction).map_err(|err| {
        warn!(project = %id, %date, "rdo correction rejected: {err}");
        AppError::from(err)
    })?;
    info!(project = %id, %date, policy = ?project.ledger.policy(), "rdo entry corrected");

    Ok(Json(entry))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    let mut projects = state.projects.lock().await;
    let project = find_project(&mut projects, &id)?;
    Ok(Json(build_dashboard(project)))
}

fn find_project<'a>(
    projects: &'a mut BTreeMap<String, Project>,
    id: &str,
) -> Result<&'a mut Project, AppError> {
    projects
        .get_mut(id)
        .ok_or_else(|| AppError::not_found(format!("unknown project '{id}'")))
}
