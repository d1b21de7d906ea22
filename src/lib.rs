pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod state;
pub mod ui;
pub mod validation;

pub use app::router;
pub use config::{load_config, resolve_config_path, AppConfig};
pub use errors::LedgerError;
pub use ledger::{CorrectionPolicy, Ledger, Project};
pub use state::AppState;
