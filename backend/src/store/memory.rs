//! In-process store
//!
//! Keeps plants and detections in memory, assigns ids and enforces code
//! uniqueness. Detections embed their plant at read time, so a detection whose
//! plant was deleted is returned without one.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use super::{DetectionQuery, StoreError, StoreResult};
use crate::models::{Detection, NewPlant, Plant, PlantInput, PlantRef};

#[derive(Default)]
struct MemoryData {
    plants: Vec<Plant>,
    detections: Vec<Detection>,
    next_plant_id: i64,
}

/// Demo rows loaded into the memory backend at startup
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub plants: Vec<Plant>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryData {
    fn plant(&self, id: i64) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == id)
    }

    fn embed(&self, detection: &Detection) -> Detection {
        let mut detection = detection.clone();
        detection.plant = self.plant(detection.plant_id).map(|p| PlantRef {
            code: p.code.clone(),
            field_number: p.field_number,
            row_number: Some(p.row_number),
            position_number: Some(p.position_number),
        });
        detection
    }

    fn matching(&self, query: &DetectionQuery) -> Vec<Detection> {
        self.detections
            .iter()
            .map(|d| self.embed(d))
            .filter(|d| match query.field {
                Some(field) => d.field_number() == Some(field),
                None => true,
            })
            .filter(|d| match query.since {
                Some(since) => d.timestamp.instant().map_or(false, |at| at >= since),
                None => true,
            })
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built plants and detections, keeping their ids
    pub async fn seed(&self, seed: SeedData) {
        let SeedData { plants, detections } = seed;
        let mut data = self.data.write().await;
        data.next_plant_id = data
            .next_plant_id
            .max(plants.iter().map(|p| p.id).max().unwrap_or(0));
        data.plants.extend(plants);
        data.detections
            .extend(detections.into_iter().map(|d| Detection { plant: None, ..d }));
    }

    pub async fn list_plants(&self, field: Option<i32>) -> Vec<Plant> {
        let data = self.data.read().await;
        let mut plants: Vec<Plant> = data
            .plants
            .iter()
            .filter(|p| field.map_or(true, |f| p.field_number == f))
            .cloned()
            .collect();
        plants.sort_by_key(|p| (p.field_number, p.row_number, p.position_number, p.id));
        plants
    }

    pub async fn count_plants(&self, field: Option<i32>) -> u64 {
        let data = self.data.read().await;
        data.plants
            .iter()
            .filter(|p| field.map_or(true, |f| p.field_number == f))
            .count() as u64
    }

    pub async fn get_plant(&self, id: i64) -> Option<Plant> {
        self.data.read().await.plant(id).cloned()
    }

    pub async fn insert_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        let mut data = self.data.write().await;
        if data.plants.iter().any(|p| p.code == plant.code) {
            return Err(StoreError::DuplicateCode(plant.code));
        }
        data.next_plant_id += 1;
        let plant = plant.into_plant(data.next_plant_id);
        data.plants.push(plant.clone());
        Ok(plant)
    }

    pub async fn update_plant(&self, id: i64, input: PlantInput) -> StoreResult<Plant> {
        let mut data = self.data.write().await;
        let plant = data
            .plants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::PlantNotFound(id))?;
        plant.apply(input);
        Ok(plant.clone())
    }

    pub async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        let mut data = self.data.write().await;
        let before = data.plants.len();
        data.plants.retain(|p| p.id != id);
        if data.plants.len() == before {
            return Err(StoreError::PlantNotFound(id));
        }
        Ok(())
    }

    pub async fn list_detections(&self, query: &DetectionQuery) -> Vec<Detection> {
        let mut detections = self.data.read().await.matching(query);
        detections.sort_by(|a, b| (&a.timestamp, a.id).cmp(&(&b.timestamp, b.id)));
        if !query.order.is_ascending() {
            detections.reverse();
        }
        if let Some(limit) = query.limit {
            detections.truncate(limit);
        }
        detections
    }

    pub async fn count_detections(&self, query: &DetectionQuery) -> u64 {
        self.data.read().await.matching(query).len() as u64
    }

    pub async fn list_fields(&self) -> Vec<i32> {
        let data = self.data.read().await;
        let mut fields: Vec<i32> = data.plants.iter().map(|p| p.field_number).collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }
}
