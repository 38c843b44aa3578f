//! Theme selection and resolved render palettes.

use serde::{Deserialize, Serialize};

/// Requested theme. `Auto` defers to the host (a `dark` class on the
/// document root in the browser bridge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    /// Resolve to a concrete palette. `host_dark` is the host's answer for
    /// `Auto` (ignored otherwise).
    pub fn resolve(self, host_dark: bool) -> Palette {
        match self {
            Theme::Light => Palette::light(),
            Theme::Dark => Palette::dark(),
            Theme::Auto => {
                if host_dark {
                    Palette::dark()
                } else {
                    Palette::light()
                }
            }
        }
    }
}

/// Theme-dependent colors for one render pass. Entity colors (curves,
/// shading, labels with explicit colors) come from the state itself; the
/// palette covers everything structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: &'static str,
    pub grid: &'static str,
    pub axis: &'static str,
    pub axis_text: &'static str,
    pub line: &'static str,
    pub ref_guide: &'static str,
    pub quota: &'static str,
    pub preview: &'static str,
    pub free_label: &'static str,
    pub endpoint_fill: &'static str,
    pub readonly_wash: &'static str,
}

impl Palette {
    pub fn light() -> Self {
        Self {
            bg: "#FFFFFF",
            grid: "#f0f0f0",
            axis: "#5C5650",
            axis_text: "#5C5650",
            line: "#666666",
            ref_guide: "#666666",
            quota: "#6f42c1",
            preview: "#000000",
            free_label: "#1A1816",
            endpoint_fill: "#FFFFFF",
            readonly_wash: "rgba(255,255,255,0.03)",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1e293b",
            grid: "#334155",
            axis: "#94a3b8",
            axis_text: "#cbd5e1",
            line: "#94a3b8",
            ref_guide: "#64748b",
            quota: "#6f42c1",
            preview: "#e2e8f0",
            free_label: "#f1f5f9",
            endpoint_fill: "#0f172a",
            readonly_wash: "rgba(15,23,42,0.03)",
        }
    }
}
