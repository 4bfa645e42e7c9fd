//! Plant registry service

use super::{read_error, write_error};
use crate::error::{AppError, AppResult};
use crate::store::{Store, StoreError};
use shared::models::{next_plant_code, NewPlant, Plant, PlantInput};
use shared::registry::{build_plant_registry, PlantFilter, PlantRegistryView};
use shared::validation::validate_plant_input;

const VIEW: &str = "plants";

/// Candidate codes tried before giving up on a create
pub const MAX_CODE_ATTEMPTS: u32 = 5;

/// Plant service for the registry view and plant CRUD
#[derive(Clone)]
pub struct PlantService {
    store: Store,
}

fn validate(input: &PlantInput) -> AppResult<()> {
    validate_plant_input(input).map_err(|errors| {
        errors
            .into_iter()
            .next()
            .map(AppError::from)
            .unwrap_or_else(|| AppError::invalid_param("plant", "Invalid plant input"))
    })
}

impl PlantService {
    /// Create a new PlantService instance
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Registry rows matching `filter`, filtered over the full plant list
    pub async fn registry(&self, filter: PlantFilter) -> AppResult<PlantRegistryView> {
        let plants = self.store.list_plants(None).await.map_err(read_error(VIEW))?;
        Ok(build_plant_registry(&plants, filter))
    }

    pub async fn get_plant(&self, id: i64) -> AppResult<Plant> {
        self.store
            .get_plant(id)
            .await
            .map_err(read_error(VIEW))?
            .ok_or_else(|| AppError::NotFound(format!("Plant {}", id)))
    }

    /// Distinct field numbers for the filter controls
    pub async fn fields(&self) -> AppResult<Vec<i32>> {
        self.store.list_fields().await.map_err(read_error("fields"))
    }

    /// Create a plant with the next free sequential code.
    ///
    /// The candidate is `count + 1`. The store enforces code uniqueness, so a
    /// taken candidate is rejected on insert and the next number is tried, up
    /// to [`MAX_CODE_ATTEMPTS`] candidates.
    pub async fn create_plant(&self, input: PlantInput) -> AppResult<Plant> {
        validate(&input)?;

        let count = self
            .store
            .count_plants(None)
            .await
            .map_err(read_error(VIEW))?;

        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code = next_plant_code(count, attempt);

            match self.store.insert_plant(NewPlant::new(code, input.clone())).await {
                Ok(plant) => {
                    tracing::info!(id = plant.id, code = %plant.code, "Plant created");
                    return Ok(plant);
                }
                Err(StoreError::DuplicateCode(code)) => {
                    tracing::debug!(%code, attempt, "Plant code taken, trying next");
                }
                Err(e) => return Err(write_error(e)),
            }
        }

        Err(AppError::Conflict {
            resource: "code".to_string(),
            message: "Could not allocate a unique plant code".to_string(),
            message_es: "No se pudo asignar un código único".to_string(),
        })
    }

    /// Update placement and descriptive fields; the code never changes
    pub async fn update_plant(&self, id: i64, input: PlantInput) -> AppResult<Plant> {
        validate(&input)?;
        let plant = self.store.update_plant(id, input).await.map_err(write_error)?;
        tracing::info!(id, code = %plant.code, "Plant updated");
        Ok(plant)
    }

    /// Delete a plant. `confirmed` must be set by the caller's explicit confirmation step.
    pub async fn delete_plant(&self, id: i64, confirmed: bool) -> AppResult<()> {
        if !confirmed {
            return Err(AppError::ConfirmationRequired("delete the plant".to_string()));
        }
        self.store.delete_plant(id).await.map_err(write_error)?;
        tracing::info!(id, "Plant deleted");
        Ok(())
    }
}
