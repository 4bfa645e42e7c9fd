//! HTML rendering of the view models
//!
//! Thin adapter between the pure view models and the page: every function
//! returns a markup fragment for one container. All data is escaped.

use std::fmt::Write;

use crate::aggregation::{DailyVolume, FieldSummary, RipenessComposition};
use crate::dashboard::DashboardView;
use crate::detection_log::{DetectionLogView, DetectionRow};
use crate::format::format_percent;
use crate::greenhouse::{FieldGrid, GreenhouseView, MapCell};
use crate::registry::PlantRegistryView;

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn empty_row(colspan: usize, message: &str) -> String {
    format!(
        r#"<tr><td colspan="{}" style="text-align:center;">{}</td></tr>"#,
        colspan,
        escape_html(message)
    )
}

fn muted_note(message: &str) -> String {
    format!(
        r#"<p style="text-align:center;color:var(--muted);padding:2rem">{}</p>"#,
        escape_html(message)
    )
}

fn image_link(url: Option<&str>) -> String {
    match url {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" class="link-img">Ver imagen</a>"#,
            escape_html(url)
        ),
        None => "-".to_string(),
    }
}

/// `<option>` list for a field selector, keeping `selected` when still present
pub fn render_field_options(options: &[i32], selected: Option<i32>) -> String {
    let mut html = String::from(r#"<option value="">Todos</option>"#);
    for field in options {
        let marker = if Some(*field) == selected { " selected" } else { "" };
        let _ = write!(html, r#"<option value="{0}"{1}>Campo {0}</option>"#, field, marker);
    }
    html
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let kpis = &view.kpis;
    let mut html = String::new();

    let _ = write!(
        html,
        r#"<section class="kpis"><div class="kpi"><span id="kpi-total-plantas">{}</span></div><div class="kpi"><span id="kpi-detecciones-hoy">{}</span></div><div class="kpi"><span id="kpi-prom-maduras">{}</span></div><div class="kpi"><span id="kpi-listas-cosecha">{}</span></div></section>"#,
        kpis.total_plants,
        kpis.detections_today,
        escape_html(&kpis.average_label),
        kpis.ready_for_harvest
    );

    html.push_str(r#"<section id="resumen-campos">"#);
    for summary in &view.field_summaries {
        html.push_str(&render_field_summary(summary));
    }
    html.push_str("</section>");

    let _ = write!(
        html,
        r#"<section id="chart-detecciones">{}</section><section id="chart-madurez">{}</section>"#,
        render_daily_volume(&view.daily_volume),
        render_composition(&view.composition)
    );

    html.push_str(r#"<table><tbody id="dashboard-last-detections">"#);
    if view.recent_detections.is_empty() {
        html.push_str(&empty_row(9, "No hay detecciones registradas"));
    }
    for row in &view.recent_detections {
        let _ = write!(
            html,
            "<tr><td>{}</td><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><strong>{}</strong></td><td>{}</td><td>{}</td></tr>",
            escape_html(&row.timestamp_label),
            escape_html(&row.plant_label),
            escape_html(&row.field_label),
            row.ripe_count,
            row.semi_ripe_count,
            row.unripe_count,
            escape_html(&row.percentage_label),
            escape_html(&row.recommendation),
            image_link(row.image_url.as_deref())
        );
    }
    html.push_str("</tbody></table>");
    html
}

pub fn render_field_summary(summary: &FieldSummary) -> String {
    format!(
        r#"<div class="campo-resumen-card"><h3>🌱 Campo {}</h3><div class="campo-stats"><div class="campo-stat"><span class="campo-stat-label">Total Plantas</span><span class="campo-stat-value">{}</span></div><div class="campo-stat"><span class="campo-stat-label">Detecciones (Total)</span><span class="campo-stat-value">{}</span></div><div class="campo-stat"><span class="campo-stat-label">% Madurez Prom.</span><span class="campo-stat-value">{}</span></div><div class="campo-stat"><span class="campo-stat-label">Listas Cosecha</span><span class="campo-stat-value">{}</span></div></div></div>"#,
        summary.field_number,
        summary.plant_count,
        summary.detection_count,
        format_percent(Some(summary.average_ripe_percentage)),
        summary.ready_for_harvest
    )
}

fn chart_bar(label: &str, value: &str, width: f64, style: &str, inner: &str) -> String {
    format!(
        r#"<div class="chart-bar"><div class="chart-bar-header"><span class="chart-bar-label">{}</span><span class="chart-bar-value">{}</span></div><div class="chart-bar-fill"><div class="chart-bar-progress" style="width: {}%{}">{}</div></div></div>"#,
        escape_html(label),
        escape_html(value),
        width,
        style,
        escape_html(inner)
    )
}

pub fn render_daily_volume(volume: &DailyVolume) -> String {
    if volume.is_empty() {
        return muted_note("No hay detecciones en los últimos 7 días");
    }

    let mut html = format!(
        r#"<p class="chart-desc">Mostrando las detecciones de los últimos {} días</p>"#,
        volume.buckets.len()
    );
    for bucket in &volume.buckets {
        html.push_str(&chart_bar(
            &bucket.label,
            &format!("{} detecciones", bucket.count),
            bucket.proportion,
            "",
            &bucket.count.to_string(),
        ));
    }
    html
}

pub fn render_composition(composition: &RipenessComposition) -> String {
    match composition {
        RipenessComposition::NoData => muted_note("No hay datos para mostrar"),
        RipenessComposition::Totals {
            ripe,
            semi_ripe,
            unripe,
            total,
            ripe_share,
            semi_ripe_share,
            unripe_share,
        } => {
            let bars = [
                ("🍓 Maduras", *ripe, *ripe_share, "; background: linear-gradient(90deg, #15803d, #16a34a)"),
                ("🟡 Intermedias", *semi_ripe, *semi_ripe_share, "; background: linear-gradient(90deg, #c2410c, #f59e0b)"),
                ("🔵 Inmaduras", *unripe, *unripe_share, "; background: linear-gradient(90deg, #1e40af, #3b82f6)"),
            ];
            let mut html = format!(
                r#"<p class="chart-desc">Total de {} fresas detectadas en todas las detecciones realizadas</p>"#,
                total
            );
            for (label, count, share, style) in bars {
                html.push_str(&chart_bar(
                    label,
                    &format!("{} ({:.1}%)", count, share),
                    share,
                    style,
                    &count.to_string(),
                ));
            }
            html
        }
    }
}

/// `<tbody>` content of the plant registry
pub fn render_plant_rows(view: &PlantRegistryView) -> String {
    if view.no_matches {
        return empty_row(8, "No hay plantas que coincidan con los filtros");
    }

    let mut html = String::new();
    for row in &view.rows {
        let code = escape_html(&row.code);
        let _ = write!(
            html,
            r#"<tr><td><strong>{code}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><span class="badge ready">Activa</span></td><td><button class="btn small" data-action="qr" data-code="{code}">📥 QR</button><button class="btn small" data-action="edit" data-id="{id}">✏️</button><button class="btn small danger" data-action="delete" data-id="{id}" data-code="{code}">🗑️</button></td></tr>"#,
            escape_html(&row.field_label),
            escape_html(&row.row_label),
            escape_html(&row.position_label),
            escape_html(&row.variety),
            escape_html(&row.description),
            code = code,
            id = row.id
        );
    }
    html
}

/// `<tbody>` content of the detection log
pub fn render_detection_rows(view: &DetectionLogView) -> String {
    if view.no_matches {
        return empty_row(11, "No hay detecciones que coincidan con los filtros");
    }
    view.rows.iter().map(render_detection_row).collect()
}

fn render_detection_row(row: &DetectionRow) -> String {
    format!(
        r#"<tr><td>{}</td><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td><strong style="color: var(--accent)">{}</strong></td><td><strong style="color: var(--warning)">{}</strong></td><td><strong style="color: var(--info)">{}</strong></td><td><strong>{}</strong></td><td>{}</td><td>{}</td></tr>"#,
        escape_html(&row.timestamp_label),
        escape_html(&row.plant_label),
        escape_html(&row.field_label),
        escape_html(&row.row_label),
        escape_html(&row.position_label),
        row.ripe_count,
        row.semi_ripe_count,
        row.unripe_count,
        escape_html(&row.percentage_label),
        escape_html(&row.recommendation),
        image_link(row.image_url.as_deref())
    )
}

pub fn render_greenhouse(view: &GreenhouseView) -> String {
    if view.is_empty() {
        return muted_note("No hay plantas registradas para construir el mapa");
    }
    view.fields.iter().map(render_field_grid).collect()
}

fn render_field_grid(grid: &FieldGrid) -> String {
    let mut html = format!(
        r#"<div class="campo-block"><div class="campo-header"><div class="campo-title">🌱 Campo {}</div><div class="campo-title" style="font-weight: 400; font-size: 0.95rem;">{} plantas</div></div><div class="campo-grid" style="grid-template-columns: repeat({}, minmax(90px, 1fr))">"#,
        grid.field_number,
        grid.plant_count,
        grid.max_position.max(1)
    );
    for cell in grid.rows.iter().flatten() {
        match cell {
            MapCell::Empty { .. } => {
                html.push_str(r#"<div class="celda-planta nodata" style="opacity: 0.3"></div>"#)
            }
            MapCell::Plant(plant) => {
                let _ = write!(
                    html,
                    r#"<div class="celda-planta {}" title="{}"><span class="codigo">{}</span><span>F{} P{}</span><span><strong>{}</strong></span></div>"#,
                    plant.status.css_class(),
                    escape_html(&plant.tooltip),
                    escape_html(&plant.code),
                    plant.row_number,
                    plant.position_number,
                    escape_html(&plant.percentage_label)
                );
            }
        }
    }
    html.push_str("</div></div>");
    html
}
