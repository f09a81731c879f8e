use crate::config::InventoryConfig;
use crate::error::{AppError, AppResult};
use serde::Deserialize;

/// Client for the station/device inventory collaborator. The inventory owns
/// equipment assignments; this service only reads them to scope per-device
/// collection reports.
#[derive(Clone)]
pub struct InventoryClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationEquipment {
    pub station_name: String,
    #[serde(default)]
    pub equipments: Vec<Equipment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Equipment {
    pub device_id: String,
    pub device_name: String,
}

#[derive(Debug, Deserialize)]
struct StationDevicesEnvelope {
    #[serde(default)]
    data: Vec<StationEquipment>,
}

impl InventoryClient {
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url,
        }
    }

    /// Equipment lists for all stations. Access-gate devices ("AG" in the
    /// device name) are filtered out; they never collect fares.
    pub async fn station_devices(&self) -> AppResult<Vec<StationEquipment>> {
        let url = format!("{}/inventory/station-devices", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "inventory returned {} for {url}",
                response.status()
            )));
        }

        let envelope: StationDevicesEnvelope = response.json().await?;
        Ok(envelope
            .data
            .into_iter()
            .map(|mut station| {
                station
                    .equipments
                    .retain(|e| !e.device_name.contains("AG"));
                station
            })
            .collect())
    }
}
