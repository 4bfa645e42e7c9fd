//! Plant and detection store
//!
//! Three interchangeable backends behind one `Store` handle:
//! - `rest`: the hosted PostgREST endpoint
//! - `postgres`: direct SQL against the same schema
//! - `memory`: in-process rows for tests and local demos

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::models::{Detection, NewPlant, Plant, PlantInput};

pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::{MemoryStore, SeedData};
pub use postgres::PgStore;
pub use rest::RestStore;

/// Store-level failures, mapped to `AppError` by the services
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed row: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("plant {0} not found")]
    PlantNotFound(i64),

    #[error("plant code {0} already exists")]
    DuplicateCode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Timestamp ordering of detection reads. Ties break on id in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn is_ascending(self) -> bool {
        self == SortOrder::Ascending
    }
}

/// Detection read parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionQuery {
    /// Only detections whose plant is in this field
    pub field: Option<i32>,
    /// Inclusive lower time bound
    pub since: Option<DateTime<Utc>>,
    pub order: SortOrder,
    pub limit: Option<usize>,
}

impl DetectionQuery {
    pub fn newest_first() -> Self {
        Self {
            order: SortOrder::Descending,
            ..Self::default()
        }
    }

    pub fn in_field(mut self, field: Option<i32>) -> Self {
        self.field = field;
        self
    }
}

/// Handle to the configured store backend
#[derive(Clone)]
pub enum Store {
    Rest(RestStore),
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    /// Connect the backend selected in configuration
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend {
            StoreBackend::Rest => Ok(Store::Rest(RestStore::new(config)?)),
            StoreBackend::Postgres => Ok(Store::Postgres(PgStore::connect(config).await?)),
            StoreBackend::Memory => Ok(Store::Memory(MemoryStore::new())),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Rest(_) => "rest",
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    /// Plants ordered by field, row and position
    pub async fn list_plants(&self, field: Option<i32>) -> StoreResult<Vec<Plant>> {
        match self {
            Store::Rest(s) => s.list_plants(field).await,
            Store::Postgres(s) => s.list_plants(field).await,
            Store::Memory(s) => Ok(s.list_plants(field).await),
        }
    }

    pub async fn count_plants(&self, field: Option<i32>) -> StoreResult<u64> {
        match self {
            Store::Rest(s) => s.count_plants(field).await,
            Store::Postgres(s) => s.count_plants(field).await,
            Store::Memory(s) => Ok(s.count_plants(field).await),
        }
    }

    pub async fn get_plant(&self, id: i64) -> StoreResult<Option<Plant>> {
        match self {
            Store::Rest(s) => s.get_plant(id).await,
            Store::Postgres(s) => s.get_plant(id).await,
            Store::Memory(s) => Ok(s.get_plant(id).await),
        }
    }

    pub async fn insert_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        match self {
            Store::Rest(s) => s.insert_plant(plant).await,
            Store::Postgres(s) => s.insert_plant(plant).await,
            Store::Memory(s) => s.insert_plant(plant).await,
        }
    }

    pub async fn update_plant(&self, id: i64, input: PlantInput) -> StoreResult<Plant> {
        let input = input.normalized();
        match self {
            Store::Rest(s) => s.update_plant(id, input).await,
            Store::Postgres(s) => s.update_plant(id, input).await,
            Store::Memory(s) => s.update_plant(id, input).await,
        }
    }

    pub async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        match self {
            Store::Rest(s) => s.delete_plant(id).await,
            Store::Postgres(s) => s.delete_plant(id).await,
            Store::Memory(s) => s.delete_plant(id).await,
        }
    }

    pub async fn list_detections(&self, query: &DetectionQuery) -> StoreResult<Vec<Detection>> {
        match self {
            Store::Rest(s) => s.list_detections(query).await,
            Store::Postgres(s) => s.list_detections(query).await,
            Store::Memory(s) => Ok(s.list_detections(query).await),
        }
    }

    /// Count of detections matching `query`; order and limit are ignored
    pub async fn count_detections(&self, query: &DetectionQuery) -> StoreResult<u64> {
        match self {
            Store::Rest(s) => s.count_detections(query).await,
            Store::Postgres(s) => s.count_detections(query).await,
            Store::Memory(s) => Ok(s.count_detections(query).await),
        }
    }

    /// Distinct field numbers, ascending
    pub async fn list_fields(&self) -> StoreResult<Vec<i32>> {
        match self {
            Store::Rest(s) => s.list_fields().await,
            Store::Postgres(s) => s.list_fields().await,
            Store::Memory(s) => Ok(s.list_fields().await),
        }
    }
}

impl From<MemoryStore> for Store {
    fn from(store: MemoryStore) -> Self {
        Store::Memory(store)
    }
}
