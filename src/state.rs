use crate::ledger::Project;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;

/// Project ledgers for the lifetime of the server process, keyed by id.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<Mutex<BTreeMap<String, Project>>>,
}

impl AppState {
    pub fn new(projects: BTreeMap<String, Project>) -> Self {
        Self {
            projects: Arc::new(Mutex::new(projects)),
        }
    }
}
