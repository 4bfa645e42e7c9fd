//! WebAssembly module for the MADUREX dashboard
//!
//! Provides client-side computation for:
//! - Ripeness classification and display formatting
//! - Plant registry and detection log filtering over cached rows
//! - Dashboard and greenhouse map view models
//! - View switching, filter state, theme persistence and stale-load detection

use chrono::{DateTime, Utc};
use shared::render;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    build_dashboard, build_detection_log, build_greenhouse, build_plant_registry,
    classify_ripeness, field_options, format_date_only_str, format_date_time_str,
    format_percent, next_plant_code, qr_download_filename, qr_image_url, render_qr_png,
    DashboardInput, Detection, DetectionFilter, LoadTicket, LoadTracker, Plant, PlantFilter,
    Theme, View, ViewState, DEFAULT_QR_ENDPOINT, DEFAULT_QR_SIZE, DEFAULT_RECENT_LIMIT,
    THEME_STORAGE_KEY,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse_rows<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<Vec<T>, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

fn parse_field(field: &str) -> Result<Option<i32>, JsValue> {
    parse_field_filter(field).map_err(JsValue::from_str)
}

fn parse_view(view: &str) -> Result<View, JsValue> {
    view.parse().map_err(|e: String| JsValue::from_str(&e))
}

/// Ripeness status of a ripe percentage: ready, partial, unripe or no-data
#[wasm_bindgen]
pub fn ripeness_status(ripe_percentage: Option<f64>) -> String {
    classify_ripeness(ripe_percentage).to_string()
}

/// CSS class for a ripe percentage
#[wasm_bindgen]
pub fn ripeness_css_class(ripe_percentage: Option<f64>) -> String {
    classify_ripeness(ripe_percentage).css_class().to_string()
}

#[wasm_bindgen]
pub fn format_ripe_percent(value: Option<f64>) -> String {
    format_percent(value)
}

#[wasm_bindgen]
pub fn format_timestamp(raw: Option<String>) -> String {
    format_date_time_str(raw.as_deref())
}

#[wasm_bindgen]
pub fn format_timestamp_date(raw: Option<String>) -> String {
    format_date_only_str(raw.as_deref())
}

/// Code to propose for a new plant given the current plant count
#[wasm_bindgen]
pub fn propose_plant_code(current_count: u32) -> String {
    next_plant_code(u64::from(current_count), 0)
}

/// Filter cached plants and return the registry view model as JSON
#[wasm_bindgen]
pub fn plant_registry_view(plants_json: &str, field: &str, search: &str) -> Result<String, JsValue> {
    let plants: Vec<Plant> = parse_rows(plants_json, "plants")?;
    let filter = PlantFilter {
        field: parse_field(field)?,
        search: Some(search.to_string()),
    };
    to_json(&build_plant_registry(&plants, filter))
}

/// Filter cached plants and return the `<tbody>` markup
#[wasm_bindgen]
pub fn plant_registry_rows_html(plants_json: &str, field: &str, search: &str) -> Result<String, JsValue> {
    let plants: Vec<Plant> = parse_rows(plants_json, "plants")?;
    let filter = PlantFilter {
        field: parse_field(field)?,
        search: Some(search.to_string()),
    };
    Ok(render::render_plant_rows(&build_plant_registry(&plants, filter)))
}

fn detection_filter(field: &str, plant: &str, from: &str, to: &str) -> Result<DetectionFilter, JsValue> {
    Ok(DetectionFilter {
        field: parse_field(field)?,
        plant: Some(plant.to_string()),
        from: parse_date_filter(from).map_err(JsValue::from_str)?,
        to: parse_date_filter(to).map_err(JsValue::from_str)?,
    })
}

/// Filter cached detections and return the log view model as JSON
#[wasm_bindgen]
pub fn detection_log_view(
    detections_json: &str,
    field: &str,
    plant: &str,
    from: &str,
    to: &str,
) -> Result<String, JsValue> {
    let detections: Vec<Detection> = parse_rows(detections_json, "detections")?;
    let options = detection_field_options(&detections);
    let view = build_detection_log(&detections, detection_filter(field, plant, from, to)?, options);
    to_json(&view)
}

/// Filter cached detections and return the `<tbody>` markup
#[wasm_bindgen]
pub fn detection_log_rows_html(
    detections_json: &str,
    field: &str,
    plant: &str,
    from: &str,
    to: &str,
) -> Result<String, JsValue> {
    let detections: Vec<Detection> = parse_rows(detections_json, "detections")?;
    let options = detection_field_options(&detections);
    let view = build_detection_log(&detections, detection_filter(field, plant, from, to)?, options);
    Ok(render::render_detection_rows(&view))
}

fn detection_field_options(detections: &[Detection]) -> Vec<i32> {
    let mut fields: Vec<i32> = detections.iter().filter_map(Detection::field_number).collect();
    fields.sort_unstable();
    fields.dedup();
    fields
}

/// Build the dashboard view model from rows already restricted to `field`.
/// `field_options` lists every field, since the rows may cover only one.
/// `now_ms` defaults to the browser clock.
#[wasm_bindgen]
pub fn dashboard_view(
    plants_json: &str,
    detections_json: &str,
    field: &str,
    field_options: Vec<i32>,
    now_ms: Option<f64>,
) -> Result<String, JsValue> {
    let plants: Vec<Plant> = parse_rows(plants_json, "plants")?;
    let detections: Vec<Detection> = parse_rows(detections_json, "detections")?;
    let now = chrono_from_millis(now_ms.unwrap_or_else(js_sys::Date::now))?;

    let view = build_dashboard(DashboardInput {
        plants: &plants,
        detections,
        field_filter: parse_field(field)?,
        field_options,
        now,
        recent_limit: DEFAULT_RECENT_LIMIT,
    });
    to_json(&view)
}

fn chrono_from_millis(ms: f64) -> Result<DateTime<Utc>, JsValue> {
    DateTime::from_timestamp_millis(ms as i64)
        .ok_or_else(|| JsValue::from_str("Invalid timestamp"))
}

/// Build the greenhouse map markup for every plant and detection
#[wasm_bindgen]
pub fn greenhouse_html(plants_json: &str, detections_json: &str, field: &str) -> Result<String, JsValue> {
    let plants: Vec<Plant> = parse_rows(plants_json, "plants")?;
    let detections: Vec<Detection> = parse_rows(detections_json, "detections")?;
    let view = build_greenhouse(&plants, &detections, parse_field(field)?, field_options(&plants));
    Ok(render::render_greenhouse(&view))
}

/// `<option>` markup for a field selector
#[wasm_bindgen]
pub fn field_options_html(plants_json: &str, selected: &str) -> Result<String, JsValue> {
    let plants: Vec<Plant> = parse_rows(plants_json, "plants")?;
    Ok(render::render_field_options(&field_options(&plants), parse_field(selected)?))
}

#[wasm_bindgen]
pub fn qr_filename(code: &str) -> String {
    qr_download_filename(code)
}

/// PNG bytes of the plant's QR code, rendered in the browser
#[wasm_bindgen]
pub fn qr_png(code: &str) -> Result<Vec<u8>, JsValue> {
    render_qr_png(code, DEFAULT_QR_SIZE).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// External image URL, for when `qr_png` fails
#[wasm_bindgen]
pub fn qr_fallback_url(code: &str) -> String {
    qr_image_url(DEFAULT_QR_ENDPOINT, code, DEFAULT_QR_SIZE)
}

/// Browser-side view state: the visible view, per-view filters, the theme and
/// the load generations used to discard stale responses
#[wasm_bindgen]
pub struct DashboardSession {
    state: ViewState,
    loads: LoadTracker,
}

#[wasm_bindgen]
impl DashboardSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            loads: LoadTracker::new(),
        }
    }

    /// Show `view`, hide the others and start its load; returns the load generation
    pub fn navigate(&mut self, view: &str) -> Result<f64, JsValue> {
        let ticket = self.select(parse_view(view)?);
        show_view(ticket.view)?;
        Ok(ticket.generation as f64)
    }

    /// Start another load of `view` without switching to it
    pub fn begin(&self, view: &str) -> Result<f64, JsValue> {
        Ok(self.loads.begin(parse_view(view)?).generation as f64)
    }

    /// Whether a load started with `generation` is still the newest for `view`
    pub fn is_current(&self, view: &str, generation: f64) -> Result<bool, JsValue> {
        Ok(self.loads.is_current(LoadTicket {
            view: parse_view(view)?,
            generation: generation as u64,
        }))
    }

    pub fn is_active(&self, view: &str) -> Result<bool, JsValue> {
        Ok(self.state.is_active(parse_view(view)?))
    }

    #[wasm_bindgen(getter)]
    pub fn active_view(&self) -> String {
        self.state.active.slug().to_string()
    }

    pub fn set_dashboard_field(&mut self, field: &str) -> Result<(), JsValue> {
        self.state.dashboard_field = parse_field(field)?;
        Ok(())
    }

    pub fn set_map_field(&mut self, field: &str) -> Result<(), JsValue> {
        self.state.map_field = parse_field(field)?;
        Ok(())
    }

    pub fn set_plant_filter(&mut self, field: &str, search: &str) -> Result<(), JsValue> {
        self.state.plant_filter = PlantFilter {
            field: parse_field(field)?,
            search: Some(search.to_string()),
        };
        Ok(())
    }

    pub fn set_detection_filter(
        &mut self,
        field: &str,
        plant: &str,
        from: &str,
        to: &str,
    ) -> Result<(), JsValue> {
        self.state.detection_filter = detection_filter(field, plant, from, to)?;
        Ok(())
    }

    pub fn clear_detection_filters(&mut self) {
        self.state.clear_detection_filters();
    }

    /// Current state as JSON, for restoring the filter controls
    pub fn state_json(&self) -> Result<String, JsValue> {
        to_json(&self.state)
    }

    /// Apply the persisted theme; returns `light` or `dark`
    pub fn restore_theme(&mut self) -> Result<String, JsValue> {
        self.state.theme = Theme::from_stored(storage()?.get_item(THEME_STORAGE_KEY)?.as_deref());
        apply_theme(self.state.theme)?;
        Ok(self.state.theme.stored_value().to_string())
    }

    /// Flip the theme, persist it and apply it; returns the new theme
    pub fn toggle_theme(&mut self) -> Result<String, JsValue> {
        let next = self.state.toggle_theme();
        storage()?.set_item(THEME_STORAGE_KEY, next.stored_value())?;
        apply_theme(next)?;
        web_sys::console::log_1(&format!("theme: {}", next.stored_value()).into());
        Ok(next.stored_value().to_string())
    }
}

impl DashboardSession {
    fn select(&mut self, view: View) -> LoadTicket {
        self.state.navigate(view);
        self.loads.begin(view)
    }
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new()
    }
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))
}

fn show_view(active: View) -> Result<(), JsValue> {
    let document = document()?;
    for view in View::ALL {
        let shown = view == active;
        if let Some(section) = document.get_element_by_id(&view.element_id()) {
            section.class_list().toggle_with_force("active", shown)?;
        }
        let button = format!("[data-view=\"{}\"]", view.slug());
        if let Some(button) = document.query_selector(&button)? {
            button.class_list().toggle_with_force("active", shown)?;
        }
    }
    Ok(())
}

fn apply_theme(theme: Theme) -> Result<(), JsValue> {
    let document = document()?;

    if let Some(body) = document.body() {
        body.class_list()
            .toggle_with_force("dark-mode", theme.body_class().is_some())?;
    }
    if let Some(icon) = document.query_selector(".theme-icon")? {
        icon.set_text_content(Some(theme.toggle_icon()));
    }
    if let Some(button) = document.get_element_by_id("theme-toggle") {
        button.set_attribute("title", theme.toggle_title())?;
    }
    Ok(())
}

fn storage() -> Result<web_sys::Storage, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window available"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}
