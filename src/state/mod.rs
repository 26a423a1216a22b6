mod app_state;
mod config;
mod types;

pub use app_state::AppState;
pub use config::{AppConfig, DEFAULT_PANEL_MARGIN, MAX_UI_SCALE, MIN_UI_SCALE};
pub use types::{ExportStatus, InspectorTab, PendingAction, Popup, PopupKind, ZOOM_LEVELS};
