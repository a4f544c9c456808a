//! Static configuration values shared across the core.
//!
//! Runtime settings (log level, log directory, database path) are passed in
//! explicitly by callers; only fixed product constants live here.

/// Key under which the whole planner session is stored.
pub const STATE_STORAGE_KEY: &str = "planvas_state_v3";

/// Name of the project created on first run or after the last delete.
pub const DEFAULT_PROJECT_NAME: &str = "My First Project";

/// Longest accepted task duration (about a century).
pub const MAX_DURATION_DAYS: f64 = 36_500.0;

pub const DEFAULT_CAMERA_X: f64 = 50.0;
pub const DEFAULT_CAMERA_Y: f64 = 50.0;
pub const DEFAULT_ZOOM: f64 = 1.0;
pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 3.0;

/// Horizontal distance between rank columns after auto-layout.
pub const COLUMN_SPACING: f64 = 250.0;
/// Vertical distance between tasks sharing a column.
pub const ROW_SPACING: f64 = 120.0;
pub const CANVAS_PADDING_X: f64 = 50.0;
/// Leaves room for the toolbar above the first row.
pub const CANVAS_PADDING_Y: f64 = 100.0;
/// Screen margin kept around content when the camera jumps to it.
pub const CONTENT_FOCUS_PADDING: f64 = 50.0;
