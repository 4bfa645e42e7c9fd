//! Common types used across the dashboard

use serde::{Deserialize, Serialize};

use crate::detection_log::DetectionFilter;
use crate::registry::PlantFilter;

/// Key under which the chosen theme is persisted in browser storage
pub const THEME_STORAGE_KEY: &str = "madurex-theme";

/// The four navigable screens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Dashboard,
    Plants,
    Detections,
    Map,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Plants, View::Detections, View::Map];

    /// Value of the navigation button's `data-view` attribute
    pub fn slug(&self) -> &'static str {
        match self {
            View::Dashboard => "dashboard",
            View::Plants => "plants",
            View::Detections => "detections",
            View::Map => "map",
        }
    }

    /// DOM id of the view's container
    pub fn element_id(&self) -> String {
        format!("view-{}", self.slug())
    }

    pub fn index(&self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Plants => 1,
            View::Detections => 2,
            View::Map => 3,
        }
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .iter()
            .copied()
            .find(|v| v.slug() == s)
            .ok_or_else(|| format!("unknown view: {}", s))
    }
}

/// Visual theme, persisted across sessions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Restore from the stored value; anything but `dark` is light
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn stored_value(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Body class applied for this theme
    pub fn body_class(&self) -> Option<&'static str> {
        match self {
            Theme::Light => None,
            Theme::Dark => Some("dark-mode"),
        }
    }

    /// Icon shown on the toggle button (it offers the other theme)
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }

    pub fn toggle_title(&self) -> &'static str {
        match self {
            Theme::Light => "Cambiar a modo oscuro",
            Theme::Dark => "Cambiar a modo claro",
        }
    }
}

/// Client-side view state: which view is visible and the filter values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewState {
    pub active: View,
    pub theme: Theme,
    pub dashboard_field: Option<i32>,
    pub plant_filter: PlantFilter,
    pub detection_filter: DetectionFilter,
    pub map_field: Option<i32>,
}

impl ViewState {
    pub fn navigate(&mut self, view: View) {
        self.active = view;
    }

    pub fn is_active(&self, view: View) -> bool {
        self.active == view
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Reset every detection log filter
    pub fn clear_detection_filters(&mut self) {
        self.detection_filter = DetectionFilter::default();
    }
}
