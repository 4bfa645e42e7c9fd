//! Detection models

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::format::{format_date_time, format_date_time_str, local_date, parse_timestamp};
use crate::ripeness::{classify_ripeness, RipenessStatus};

/// When a detection was observed, as the store reported it.
///
/// A value that does not parse is kept verbatim so the row still renders; it
/// orders before every parsed instant and takes no part in date arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObservedAt {
    Unparsed(String),
    At(DateTime<Utc>),
}

impl ObservedAt {
    pub fn parse(raw: &str) -> Self {
        match parse_timestamp(raw) {
            Some(at) => ObservedAt::At(at),
            None => ObservedAt::Unparsed(raw.to_string()),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            ObservedAt::At(at) => Some(*at),
            ObservedAt::Unparsed(_) => None,
        }
    }

    /// `15/03/2025, 09:30`, or the raw value when it did not parse
    pub fn label(&self) -> String {
        match self {
            ObservedAt::At(at) => format_date_time(at),
            ObservedAt::Unparsed(raw) => format_date_time_str(Some(raw)),
        }
    }
}

impl From<DateTime<Utc>> for ObservedAt {
    fn from(at: DateTime<Utc>) -> Self {
        ObservedAt::At(at)
    }
}

impl Serialize for ObservedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ObservedAt::At(at) => {
                serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            ObservedAt::Unparsed(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for ObservedAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(ObservedAt::parse(&raw))
    }
}

/// One ripeness observation for a plant, produced upstream by the classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub id: i64,
    pub plant_id: i64,
    pub timestamp: ObservedAt,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub ripe_count: i32,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub semi_ripe_count: i32,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub unripe_count: i32,
    #[serde(default)]
    pub total_count: Option<i32>,
    #[serde(default)]
    pub ripe_percentage: Option<f64>,
    #[serde(default)]
    pub harvest_recommendation: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Related plant, embedded by the store when the query joins it
    #[serde(default, alias = "plants", skip_serializing_if = "Option::is_none")]
    pub plant: Option<PlantRef>,
}

/// The subset of plant columns joined onto a detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantRef {
    pub code: String,
    pub field_number: i32,
    #[serde(default)]
    pub row_number: Option<i32>,
    #[serde(default)]
    pub position_number: Option<i32>,
}

impl Detection {
    /// Ripe percentage with absence counted as zero, as used by the aggregates
    pub fn ripe_value(&self) -> f64 {
        self.ripe_percentage.unwrap_or(0.0)
    }

    pub fn status(&self) -> RipenessStatus {
        classify_ripeness(self.ripe_percentage)
    }

    /// Stored total, or the sum of the three categories when the store left it empty
    pub fn total(&self) -> i32 {
        self.total_count
            .unwrap_or(self.ripe_count + self.semi_ripe_count + self.unripe_count)
    }

    /// Calendar day of the observation in the display timezone
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.timestamp.instant().map(|at| local_date(&at))
    }

    pub fn field_number(&self) -> Option<i32> {
        self.plant.as_ref().map(|p| p.field_number)
    }

    /// Plant code, falling back to `ID {plant_id}` when the relation is missing
    pub fn plant_label(&self) -> String {
        match &self.plant {
            Some(plant) => plant.code.clone(),
            None => format!("ID {}", self.plant_id),
        }
    }
}

fn zero_if_null<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or_default())
}
