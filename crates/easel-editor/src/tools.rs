//! Sidebar tools.
//!
//! The host UI shows one tool panel at a time. Some panels only make sense
//! with a selection; the host closes them when the selection is cleared.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    Select,
    Shapes,
    Text,
    Images,
    Draw,
    Fill,
    StrokeColor,
    StrokeWidth,
    Font,
    Opacity,
    Filter,
    Settings,
    Ai,
    RemoveBg,
    Templates,
}

/// Tools whose panels edit the active selection.
pub const SELECTION_DEPENDENT_TOOLS: [Tool; 7] = [
    Tool::Fill,
    Tool::Font,
    Tool::Filter,
    Tool::Opacity,
    Tool::RemoveBg,
    Tool::StrokeColor,
    Tool::StrokeWidth,
];

impl Tool {
    pub fn needs_selection(self) -> bool {
        SELECTION_DEPENDENT_TOOLS.contains(&self)
    }
}
