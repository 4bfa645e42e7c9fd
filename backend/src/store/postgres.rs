//! Direct PostgreSQL access to the store schema

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{DetectionQuery, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::models::{Detection, NewPlant, Plant, PlantInput, PlantRef};

const PLANT_COLUMNS: &str = r#"
    id::int8 AS id, codigo_qr, campo::int4 AS campo, fila::int4 AS fila,
    posicion::int4 AS posicion, variedad, descripcion
"#;

/// Detection columns with the plant joined in. The field filter turns the left
/// join into an inner one.
const DETECTION_SELECT: &str = r#"
    SELECT d.id::int8 AS id, d.planta_id::int8 AS planta_id, d.fecha::timestamptz AS fecha,
           d.maduras::int4 AS maduras, d.intermedias::int4 AS intermedias,
           d.inmaduras::int4 AS inmaduras, d.total::int4 AS total,
           d.porcentaje_maduras::float8 AS porcentaje_maduras,
           d.recomendacion_cosecha, d.imagen_url,
           p.codigo_qr AS planta_codigo, p.campo::int4 AS planta_campo,
           p.fila::int4 AS planta_fila, p.posicion::int4 AS planta_posicion
    FROM detecciones d
    LEFT JOIN plantas p ON p.id = d.planta_id
    WHERE ($1::int4 IS NULL OR p.campo = $1)
      AND ($2::timestamptz IS NULL OR d.fecha >= $2)
"#;

/// PostgreSQL store
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PlantRecord {
    id: i64,
    codigo_qr: String,
    campo: i32,
    fila: i32,
    posicion: i32,
    variedad: Option<String>,
    descripcion: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct DetectionRecord {
    id: i64,
    planta_id: i64,
    fecha: DateTime<Utc>,
    maduras: Option<i32>,
    intermedias: Option<i32>,
    inmaduras: Option<i32>,
    total: Option<i32>,
    porcentaje_maduras: Option<f64>,
    recomendacion_cosecha: Option<String>,
    imagen_url: Option<String>,
    planta_codigo: Option<String>,
    planta_campo: Option<i32>,
    planta_fila: Option<i32>,
    planta_posicion: Option<i32>,
}

impl From<PlantRecord> for Plant {
    fn from(row: PlantRecord) -> Self {
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

impl From<DetectionRecord> for Detection {
    fn from(row: DetectionRecord) -> Self {
        let plant = match (row.planta_codigo, row.planta_campo) {
            (Some(code), Some(field_number)) => Some(PlantRef {
                code,
                field_number,
                row_number: row.planta_fila,
                position_number: row.planta_posicion,
            }),
            _ => None,
        };
        Detection {
            id: row.id,
            plant_id: row.planta_id,
            timestamp: row.fecha.into(),
            ripe_count: row.maduras.unwrap_or_default(),
            semi_ripe_count: row.intermedias.unwrap_or_default(),
            unripe_count: row.inmaduras.unwrap_or_default(),
            total_count: row.total,
            ripe_percentage: row.porcentaje_maduras,
            harvest_recommendation: row.recomendacion_cosecha,
            image_url: row.imagen_url,
            plant,
        }
    }
}

impl PgStore {
    /// Open the connection pool
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.timeout_secs))
            .connect(&config.database_url)
            .await?;
        tracing::info!("Database connection established");
        Ok(Self { db })
    }

    pub async fn list_plants(&self, field: Option<i32>) -> StoreResult<Vec<Plant>> {
        let sql = format!(
            "SELECT {} FROM plantas WHERE ($1::int4 IS NULL OR campo = $1) \
             ORDER BY campo ASC, fila ASC, posicion ASC, id ASC",
            PLANT_COLUMNS
        );
        let rows = sqlx::query_as::<_, PlantRecord>(&sql)
            .bind(field)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Plant::from).collect())
    }

    pub async fn count_plants(&self, field: Option<i32>) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM plantas WHERE ($1::int4 IS NULL OR campo = $1)",
        )
        .bind(field)
        .fetch_one(&self.db)
        .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn get_plant(&self, id: i64) -> StoreResult<Option<Plant>> {
        let sql = format!("SELECT {} FROM plantas WHERE id = $1", PLANT_COLUMNS);
        let row = sqlx::query_as::<_, PlantRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Plant::from))
    }

    pub async fn insert_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        let sql = format!(
            "INSERT INTO plantas (codigo_qr, campo, fila, posicion, variedad, descripcion) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            PLANT_COLUMNS
        );
        let result = sqlx::query_as::<_, PlantRecord>(&sql)
            .bind(&plant.code)
            .bind(plant.field_number)
            .bind(plant.row_number)
            .bind(plant.position_number)
            .bind(&plant.variety)
            .bind(&plant.description)
            .fetch_one(&self.db)
            .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateCode(plant.code))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_plant(&self, id: i64, input: PlantInput) -> StoreResult<Plant> {
        let sql = format!(
            "UPDATE plantas SET campo = $2, fila = $3, posicion = $4, variedad = $5, \
             descripcion = $6 WHERE id = $1 RETURNING {}",
            PLANT_COLUMNS
        );
        sqlx::query_as::<_, PlantRecord>(&sql)
            .bind(id)
            .bind(input.field_number)
            .bind(input.row_number)
            .bind(input.position_number)
            .bind(&input.variety)
            .bind(&input.description)
            .fetch_optional(&self.db)
            .await?
            .map(Plant::from)
            .ok_or(StoreError::PlantNotFound(id))
    }

    pub async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM plantas WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::PlantNotFound(id));
        }
        Ok(())
    }

    pub async fn list_detections(&self, query: &DetectionQuery) -> StoreResult<Vec<Detection>> {
        let direction = if query.order.is_ascending() { "ASC" } else { "DESC" };
        let sql = format!(
            "{} ORDER BY d.fecha {dir}, d.id {dir} LIMIT $3",
            DETECTION_SELECT,
            dir = direction
        );
        let rows = sqlx::query_as::<_, DetectionRecord>(&sql)
            .bind(query.field)
            .bind(query.since)
            .bind(query.limit.map(|l| l as i64))
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Detection::from).collect())
    }

    pub async fn count_detections(&self, query: &DetectionQuery) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM detecciones d LEFT JOIN plantas p ON p.id = d.planta_id \
             WHERE ($1::int4 IS NULL OR p.campo = $1) AND ($2::timestamptz IS NULL OR d.fecha >= $2)",
        )
        .bind(query.field)
        .bind(query.since)
        .fetch_one(&self.db)
        .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn list_fields(&self) -> StoreResult<Vec<i32>> {
        let fields: Vec<i32> =
            sqlx::query_scalar("SELECT DISTINCT campo::int4 FROM plantas ORDER BY 1")
                .fetch_all(&self.db)
                .await?;
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_record_without_plant() {
        let record = DetectionRecord {
            id: 5,
            planta_id: 9,
            fecha: Utc::now(),
            maduras: Some(2),
            intermedias: None,
            inmaduras: Some(1),
            total: None,
            porcentaje_maduras: Some(66.7),
            recomendacion_cosecha: None,
            imagen_url: None,
            planta_codigo: None,
            planta_campo: None,
            planta_fila: None,
            planta_posicion: None,
        };
        let detection = Detection::from(record);
        assert_eq!(detection.plant, None);
        assert_eq!(detection.plant_label(), "ID 9");
        assert_eq!(detection.total(), 3);
    }

    #[test]
    fn test_plant_record_maps_columns() {
        let plant = Plant::from(PlantRecord {
            id: 3,
            codigo_qr: "PLT-000003".to_string(),
            campo: 2,
            fila: 4,
            posicion: 1,
            variedad: None,
            descripcion: Some("Borde norte".to_string()),
        });
        assert_eq!(plant.placement(), (4, 1));
        assert_eq!(plant.field_number, 2);
    }
}
