mod client;

pub use client::ApsystemsClient;

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::core::{DeviceEndpoint, ManagedSwitch, SwitchEntity};

#[derive(Debug, Deserialize, Clone)]
pub struct ApsystemsDevice {
    pub ip_address: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_name() -> String {
    "solar".to_string()
}

fn default_port() -> u16 {
    8050
}

impl ApsystemsDevice {
    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.ip_address.clone(), self.port)
    }

    pub fn new_switch(&self, http_client: ClientWithMiddleware) -> ManagedSwitch<ApsystemsClient> {
        let client = ApsystemsClient::new(http_client, &self.endpoint());
        ManagedSwitch::new(SwitchEntity::new(self.name.clone()), client)
    }
}
