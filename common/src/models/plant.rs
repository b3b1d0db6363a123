// common/src/models/plant.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Growth stage of a plant. Stored lowercase in the backend's entry fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    Harvest,
}

impl GrowthStage {
    /// Case-insensitive parse; unknown values fall back to vegetative,
    /// matching the projection default.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "seedling" => GrowthStage::Seedling,
            "flowering" => GrowthStage::Flowering,
            "harvest" => GrowthStage::Harvest,
            _ => GrowthStage::Vegetative,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthStage::Seedling => "seedling",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::Harvest => "harvest",
        }
    }
}

/// A plant as shown on the dashboard. The backend has no first-class plant
/// entity; this is a read-time projection over the journal entries that
/// share a plant id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    pub strain: String,
    pub stage: GrowthStage,
    pub day_number: u32,
    pub week_number: u32,
    pub image_url: Option<String>,
    pub last_updated: Option<String>,
}

/// The plant-relevant slice of one backend journal entry, already pulled out
/// of the backend's wire format.
#[derive(Debug, Clone, Default)]
pub struct PlantObservation {
    pub plant_id: Option<String>,
    pub plant_name: Option<String>,
    pub stage: Option<String>,
    pub day_number: Option<u32>,
    pub week_number: Option<u32>,
    pub image_url: Option<String>,
    pub modified: Option<String>,
}

/// Group observations by plant id, keeping the first entry seen per plant.
/// The backend is queried in descending date order, so first-wins means the
/// most recent entry is the representative snapshot. Entries without a plant
/// id are skipped.
pub fn project_plants<I>(observations: I) -> Vec<Plant>
where
    I: IntoIterator<Item = PlantObservation>,
{
    let mut plants: Vec<Plant> = Vec::new();

    for obs in observations {
        let plant_id = match obs.plant_id {
            Some(ref id) if !id.is_empty() => id.clone(),
            _ => continue,
        };

        if plants.iter().any(|p| p.id == plant_id) {
            continue;
        }

        plants.push(Plant {
            id: plant_id,
            name: obs
                .plant_name
                .unwrap_or_else(|| "Unknown Plant".to_string()),
            strain: String::new(),
            stage: obs
                .stage
                .as_deref()
                .map(GrowthStage::parse)
                .unwrap_or(GrowthStage::Vegetative),
            day_number: obs.day_number.unwrap_or(1),
            week_number: obs.week_number.unwrap_or(1),
            image_url: obs.image_url,
            last_updated: obs.modified,
        });
    }

    plants
}

/// Day counter for a grow: day 1 is the start date itself. A start date in
/// the future clamps to 1.
pub fn day_number(start: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - start).num_days() + 1;
    days.max(1) as u32
}

/// Week counter derived from the day counter: ceil(day / 7), never below 1.
pub fn week_number(day: u32) -> u32 {
    day.div_ceil(7).max(1)
}
