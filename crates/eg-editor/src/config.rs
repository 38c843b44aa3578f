//! Engine configuration.

use eg_core::{AxisLabels, CurveSpec, Margin};
use eg_render::Theme;
use serde::{Deserialize, Serialize};

/// Construction options, merged over defaults. Unknown fields in host
/// snapshots are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Curves seeded into a fresh state (ignored when prior state is
    /// supplied).
    pub initial_curves: Vec<CurveSpec>,
    pub theme: Theme,
    /// Disables all pointer mutation and renders a faint overlay.
    pub read_only: bool,
    pub axis_labels: AxisLabels,
    pub margin: Margin,
}

/// Runtime-updatable subset for `update_config`; `None` leaves a field
/// untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    pub theme: Option<Theme>,
    pub read_only: Option<bool>,
    pub axis_labels: Option<AxisLabels>,
}

impl EngineConfig {
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(read_only) = patch.read_only {
            self.read_only = read_only;
        }
        if let Some(axis_labels) = &patch.axis_labels {
            self.axis_labels = axis_labels.clone();
        }
    }
}
