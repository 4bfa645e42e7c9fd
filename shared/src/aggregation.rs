//! Derived statistics over detection rows

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::format::format_day;
use crate::models::{Detection, Plant};
use crate::ripeness::is_ready_for_harvest;

/// Number of day buckets kept in the detection volume chart
pub const MAX_VOLUME_DAYS: usize = 7;

/// Per-field rollup shown as a summary card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSummary {
    pub field_number: i32,
    pub plant_count: usize,
    pub detection_count: usize,
    pub average_ripe_percentage: f64,
    pub ready_for_harvest: usize,
}

/// One bar of the detection volume chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayBucket {
    pub day: NaiveDate,
    pub label: String,
    pub count: usize,
    /// Share of the busiest kept day, 0-100
    pub proportion: f64,
}

/// Detection counts for the most recent days present in the data
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyVolume {
    pub buckets: Vec<DayBucket>,
}

impl DailyVolume {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Totals and shares of ripe, semi-ripe and unripe units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RipenessComposition {
    /// Combined total was zero; no ratio is computed
    NoData,
    Totals {
        ripe: i64,
        semi_ripe: i64,
        unripe: i64,
        total: i64,
        ripe_share: f64,
        semi_ripe_share: f64,
        unripe_share: f64,
    },
}

/// Mean ripe percentage; absent values count as 0 and an empty set yields 0
pub fn average_ripe_percentage(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let sum: f64 = detections.iter().map(Detection::ripe_value).sum();
    sum / detections.len() as f64
}

/// Number of detections at or above the ready threshold
pub fn ready_for_harvest_count(detections: &[Detection]) -> usize {
    detections
        .iter()
        .filter(|d| is_ready_for_harvest(d.ripe_percentage))
        .count()
}

/// Number of detections observed at or after `since`
pub fn detections_since(detections: &[Detection], since: DateTime<Utc>) -> usize {
    detections
        .iter()
        .filter(|d| d.timestamp.instant().map_or(false, |at| at >= since))
        .count()
}

/// Distinct field numbers, ascending
pub fn field_options(plants: &[Plant]) -> Vec<i32> {
    let mut fields: Vec<i32> = plants.iter().map(|p| p.field_number).collect();
    fields.sort_unstable();
    fields.dedup();
    fields
}

/// Roll plants and detections up per field.
///
/// Detections are attributed through their embedded plant relation, or through
/// `plants` when the relation was not joined. Only fields that have plants
/// produce a summary.
pub fn field_summaries(plants: &[Plant], detections: &[Detection]) -> Vec<FieldSummary> {
    let plant_fields: HashMap<i64, i32> = plants.iter().map(|p| (p.id, p.field_number)).collect();

    let mut plants_by_field: BTreeMap<i32, usize> = BTreeMap::new();
    for plant in plants {
        *plants_by_field.entry(plant.field_number).or_default() += 1;
    }

    let mut detections_by_field: HashMap<i32, Vec<Detection>> = HashMap::new();
    for detection in detections {
        let field = detection
            .field_number()
            .or_else(|| plant_fields.get(&detection.plant_id).copied());
        if let Some(field) = field {
            detections_by_field
                .entry(field)
                .or_default()
                .push(detection.clone());
        }
    }

    plants_by_field
        .into_iter()
        .map(|(field_number, plant_count)| {
            let field_detections = detections_by_field
                .get(&field_number)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            FieldSummary {
                field_number,
                plant_count,
                detection_count: field_detections.len(),
                average_ripe_percentage: average_ripe_percentage(field_detections),
                ready_for_harvest: ready_for_harvest_count(field_detections),
            }
        })
        .collect()
}

/// Bucket detections by local day in discovery order and keep the last
/// [`MAX_VOLUME_DAYS`] distinct days. Each bar is scaled against the busiest
/// kept day, which renders as exactly 100.
pub fn daily_volume(detections: &[Detection]) -> DailyVolume {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for day in detections.iter().filter_map(Detection::local_date) {
        let count = counts.entry(day).or_insert_with(|| {
            order.push(day);
            0
        });
        *count += 1;
    }

    let kept = &order[order.len().saturating_sub(MAX_VOLUME_DAYS)..];
    let busiest = kept
        .iter()
        .filter_map(|day| counts.get(day))
        .copied()
        .max()
        .unwrap_or(0);

    let buckets = kept
        .iter()
        .map(|&day| {
            let count = counts.get(&day).copied().unwrap_or(0);
            let proportion = if busiest == 0 {
                0.0
            } else if count == busiest {
                100.0
            } else {
                count as f64 / busiest as f64 * 100.0
            };
            DayBucket {
                day,
                label: format_day(day),
                count,
                proportion,
            }
        })
        .collect();

    DailyVolume { buckets }
}

/// Sum unit counts across detections and compute each category's share
pub fn ripeness_composition(detections: &[Detection]) -> RipenessComposition {
    let (ripe, semi_ripe, unripe) = detections.iter().fold((0i64, 0i64, 0i64), |acc, d| {
        (
            acc.0 + i64::from(d.ripe_count),
            acc.1 + i64::from(d.semi_ripe_count),
            acc.2 + i64::from(d.unripe_count),
        )
    });
    let total = ripe + semi_ripe + unripe;
    if total == 0 {
        return RipenessComposition::NoData;
    }

    let share = |part: i64| part as f64 / total as f64 * 100.0;
    RipenessComposition::Totals {
        ripe,
        semi_ripe,
        unripe,
        total,
        ripe_share: share(ripe),
        semi_ripe_share: share(semi_ripe),
        unripe_share: share(unripe),
    }
}

/// Most recent detection per plant, keyed by plant id.
///
/// The latest is the maximum `(timestamp, id)` pair, so identical timestamps
/// resolve to the higher detection id regardless of input order.
pub fn latest_detection_per_plant(detections: &[Detection]) -> HashMap<i64, &Detection> {
    let mut latest: HashMap<i64, &Detection> = HashMap::new();
    for detection in detections {
        latest
            .entry(detection.plant_id)
            .and_modify(|current| {
                if (&detection.timestamp, detection.id) > (&current.timestamp, current.id) {
                    *current = detection;
                }
            })
            .or_insert(detection);
    }
    latest
}

/// Sort detections newest first, ties broken by descending id
pub fn sort_newest_first(detections: &mut [Detection]) {
    detections.sort_by(|a, b| (&b.timestamp, b.id).cmp(&(&a.timestamp, a.id)));
}

/// Sort detections oldest first, ties broken by ascending id
pub fn sort_oldest_first(detections: &mut [Detection]) {
    detections.sort_by(|a, b| (&a.timestamp, a.id).cmp(&(&b.timestamp, b.id)));
}
