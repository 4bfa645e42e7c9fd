//! PostgREST client for the hosted store
//!
//! Speaks the store's own schema (`plantas`, `detecciones`) and maps rows onto
//! the domain models.

use std::time::Duration;

use chrono::SecondsFormat;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{DetectionQuery, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::models::{Detection, NewPlant, ObservedAt, Plant, PlantInput, PlantRef};

const PLANTS_TABLE: &str = "plantas";
const DETECTIONS_TABLE: &str = "detecciones";
const PLANT_ORDER: &str = "campo.asc,fila.asc,posicion.asc";
const DETECTION_COLUMNS: &str = "id,planta_id,fecha,maduras,intermedias,inmaduras,total,\
porcentaje_maduras,recomendacion_cosecha,imagen_url";

/// PostgREST client
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    anon_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PlantRow {
    id: i64,
    codigo_qr: String,
    campo: i32,
    fila: i32,
    posicion: i32,
    #[serde(default)]
    variedad: Option<String>,
    #[serde(default)]
    descripcion: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlantWrite<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    codigo_qr: Option<&'a str>,
    campo: i32,
    fila: i32,
    posicion: i32,
    variedad: Option<&'a str>,
    descripcion: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DetectionRow {
    id: i64,
    planta_id: i64,
    fecha: String,
    #[serde(default)]
    maduras: Option<i32>,
    #[serde(default)]
    intermedias: Option<i32>,
    #[serde(default)]
    inmaduras: Option<i32>,
    #[serde(default)]
    total: Option<i32>,
    #[serde(default)]
    porcentaje_maduras: Option<f64>,
    #[serde(default)]
    recomendacion_cosecha: Option<String>,
    #[serde(default)]
    imagen_url: Option<String>,
    #[serde(default)]
    plantas: Option<EmbeddedPlantRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddedPlantRow {
    codigo_qr: String,
    campo: i32,
    #[serde(default)]
    fila: Option<i32>,
    #[serde(default)]
    posicion: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct FieldRow {
    campo: i32,
}

impl From<PlantRow> for Plant {
    fn from(row: PlantRow) -> Self {
        Plant {
            id: row.id,
            code: row.codigo_qr,
            field_number: row.campo,
            row_number: row.fila,
            position_number: row.posicion,
            variety: row.variedad,
            description: row.descripcion,
        }
    }
}

impl From<DetectionRow> for Detection {
    fn from(row: DetectionRow) -> Self {
        Detection {
            id: row.id,
            plant_id: row.planta_id,
            timestamp: ObservedAt::parse(&row.fecha),
            ripe_count: row.maduras.unwrap_or_default(),
            semi_ripe_count: row.intermedias.unwrap_or_default(),
            unripe_count: row.inmaduras.unwrap_or_default(),
            total_count: row.total,
            ripe_percentage: row.porcentaje_maduras,
            harvest_recommendation: row.recomendacion_cosecha,
            image_url: row.imagen_url,
            plant: row.plantas.map(|p| PlantRef {
                code: p.codigo_qr,
                field_number: p.campo,
                row_number: p.fila,
                position_number: p.posicion,
            }),
        }
    }
}

/// Total from a `Content-Range` header such as `0-24/96` or `*/0`
pub fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

/// `select` parameter for detection reads: the inner embed lets a plant filter
/// restrict detections through the join
fn detection_select(query: &DetectionQuery) -> String {
    let embed = if query.field.is_some() {
        "plantas!inner"
    } else {
        "plantas"
    };
    format!("{},{}(codigo_qr,campo,fila,posicion)", DETECTION_COLUMNS, embed)
}

/// Filter parameters shared by detection reads and counts
fn detection_filters(query: &DetectionQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(field) = query.field {
        params.push(("plantas.campo", format!("eq.{}", field)));
    }
    if let Some(since) = query.since {
        params.push((
            "fecha",
            format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ));
    }
    params
}

fn detection_params(query: &DetectionQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", detection_select(query))];
    params.extend(detection_filters(query));
    let direction = if query.order.is_ascending() { "asc" } else { "desc" };
    params.push(("order", format!("fecha.{0},id.{0}", direction)));
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

impl<'a> PlantWrite<'a> {
    fn from_input(input: &'a PlantInput) -> Self {
        Self {
            codigo_qr: None,
            campo: input.field_number,
            fila: input.row_number,
            posicion: input.position_number,
            variedad: input.variety.as_deref(),
            descripcion: input.description.as_deref(),
        }
    }

    fn from_new(plant: &'a NewPlant) -> Self {
        Self {
            codigo_qr: Some(&plant.code),
            campo: plant.field_number,
            fila: plant.row_number,
            posicion: plant.position_number,
            variedad: plant.variety.as_deref(),
            descripcion: plant.description.as_deref(),
        }
    }
}

impl RestStore {
    /// Create a client for `{url}/rest/v1`
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            anon_key: config.anon_key.clone(),
            base_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<Vec<T>> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        Ok(response.json().await?)
    }

    async fn count(&self, request: RequestBuilder) -> StoreResult<u64> {
        let response = request.header("Prefer", "count=exact").send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }
        response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| StoreError::Decode("missing Content-Range total".to_string()))
    }

    pub async fn list_plants(&self, field: Option<i32>) -> StoreResult<Vec<Plant>> {
        let mut params = vec![("select", "*".to_string()), ("order", PLANT_ORDER.to_string())];
        if let Some(field) = field {
            params.push(("campo", format!("eq.{}", field)));
        }
        let rows: Vec<PlantRow> = self
            .fetch(self.request(Method::GET, PLANTS_TABLE).query(&params))
            .await?;
        Ok(rows.into_iter().map(Plant::from).collect())
    }

    pub async fn count_plants(&self, field: Option<i32>) -> StoreResult<u64> {
        let mut params = vec![("select", "id".to_string())];
        if let Some(field) = field {
            params.push(("campo", format!("eq.{}", field)));
        }
        self.count(self.request(Method::HEAD, PLANTS_TABLE).query(&params))
            .await
    }

    pub async fn get_plant(&self, id: i64) -> StoreResult<Option<Plant>> {
        let params = [("select", "*".to_string()), ("id", format!("eq.{}", id))];
        let rows: Vec<PlantRow> = self
            .fetch(self.request(Method::GET, PLANTS_TABLE).query(&params))
            .await?;
        Ok(rows.into_iter().next().map(Plant::from))
    }

    pub async fn insert_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        let request = self
            .request(Method::POST, PLANTS_TABLE)
            .header("Prefer", "return=representation")
            .json(&[PlantWrite::from_new(&plant)]);
        let rows: Vec<PlantRow> = match self.fetch(request).await {
            Err(StoreError::Status { status: 409, .. }) => {
                return Err(StoreError::DuplicateCode(plant.code))
            }
            other => other?,
        };
        rows.into_iter()
            .next()
            .map(Plant::from)
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    pub async fn update_plant(&self, id: i64, input: PlantInput) -> StoreResult<Plant> {
        let request = self
            .request(Method::PATCH, PLANTS_TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&PlantWrite::from_input(&input));
        let rows: Vec<PlantRow> = self.fetch(request).await?;
        rows.into_iter()
            .next()
            .map(Plant::from)
            .ok_or(StoreError::PlantNotFound(id))
    }

    pub async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        let request = self
            .request(Method::DELETE, PLANTS_TABLE)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");
        let rows: Vec<PlantRow> = self.fetch(request).await?;
        if rows.is_empty() {
            return Err(StoreError::PlantNotFound(id));
        }
        Ok(())
    }

    pub async fn list_detections(&self, query: &DetectionQuery) -> StoreResult<Vec<Detection>> {
        let rows: Vec<DetectionRow> = self
            .fetch(
                self.request(Method::GET, DETECTIONS_TABLE)
                    .query(&detection_params(query)),
            )
            .await?;
        Ok(rows.into_iter().map(Detection::from).collect())
    }

    pub async fn count_detections(&self, query: &DetectionQuery) -> StoreResult<u64> {
        let select = if query.field.is_some() {
            "id,plantas!inner(campo)"
        } else {
            "id"
        };
        let mut params = vec![("select", select.to_string())];
        params.extend(detection_filters(query));
        self.count(self.request(Method::HEAD, DETECTIONS_TABLE).query(&params))
            .await
    }

    pub async fn list_fields(&self) -> StoreResult<Vec<i32>> {
        let rows: Vec<FieldRow> = self
            .fetch(
                self.request(Method::GET, PLANTS_TABLE)
                    .query(&[("select", "campo")]),
            )
            .await?;
        let mut fields: Vec<i32> = rows.into_iter().map(|r| r.campo).collect();
        fields.sort_unstable();
        fields.dedup();
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortOrder;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-24/96"), Some(96));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-24/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_detection_params_with_field_use_inner_embed() {
        let query = DetectionQuery {
            field: Some(3),
            since: Some(Utc.with_ymd_and_hms(2025, 3, 15, 5, 0, 0).unwrap()),
            order: SortOrder::Descending,
            limit: Some(15),
        };
        let params = detection_params(&query);

        assert!(params[0].1.ends_with("plantas!inner(codigo_qr,campo,fila,posicion)"));
        assert!(params.contains(&("plantas.campo", "eq.3".to_string())));
        assert!(params.contains(&("fecha", "gte.2025-03-15T05:00:00.000Z".to_string())));
        assert!(params.contains(&("order", "fecha.desc,id.desc".to_string())));
        assert!(params.contains(&("limit", "15".to_string())));
    }

    #[test]
    fn test_detection_params_without_field_use_left_embed() {
        let params = detection_params(&DetectionQuery::default());
        assert!(params[0].1.ends_with(",plantas(codigo_qr,campo,fila,posicion)"));
        assert!(params.iter().all(|(k, _)| *k != "plantas.campo" && *k != "limit"));
        assert!(params.contains(&("order", "fecha.asc,id.asc".to_string())));
    }

    #[test]
    fn test_detection_row_maps_store_columns() {
        let json = r#"{
            "id": 11, "planta_id": 4, "fecha": "2025-03-15T14:30:00+00:00",
            "maduras": 5, "intermedias": null, "inmaduras": 3, "total": 8,
            "porcentaje_maduras": 62.5, "recomendacion_cosecha": "Cosechar",
            "imagen_url": "https://img.example/11.jpg",
            "plantas": {"codigo_qr": "PLT-000004", "campo": 2, "fila": 1, "posicion": 3}
        }"#;
        let row: DetectionRow = serde_json::from_str(json).unwrap();
        let detection = Detection::from(row);

        assert_eq!(detection.semi_ripe_count, 0);
        assert_eq!(detection.total(), 8);
        assert_eq!(detection.field_number(), Some(2));
        assert_eq!(detection.plant_label(), "PLT-000004");
    }

    #[test]
    fn test_detection_row_with_bad_timestamp_keeps_raw_value() {
        let json = r#"{ "id": 1, "planta_id": 1, "fecha": "yesterday", "maduras": 4 }"#;
        let row: DetectionRow = serde_json::from_str(json).unwrap();
        let detection = Detection::from(row);

        assert_eq!(detection.timestamp, ObservedAt::Unparsed("yesterday".to_string()));
        assert_eq!(detection.timestamp.instant(), None);
        assert_eq!(detection.ripe_count, 4);
    }

    #[test]
    fn test_plant_write_omits_code_on_update() {
        let input = PlantInput {
            field_number: 1,
            row_number: 2,
            position_number: 3,
            variety: Some("Albion".to_string()),
            description: None,
        };
        let body = serde_json::to_value(PlantWrite::from_input(&input)).unwrap();
        assert!(body.get("codigo_qr").is_none());
        assert_eq!(body["campo"], 1);
        assert_eq!(body["variedad"], "Albion");
        assert!(body["descripcion"].is_null());
    }
}
