use anyhow::Context;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;

use crate::core::{DeviceEndpoint, DeviceError, DevicePowerApi, PowerCode, Status};

/// Client for the local HTTP API of an APsystems EZ1-M inverter.
#[derive(Debug, Clone)]
pub struct ApsystemsClient {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct OnOffData {
    status: String,
}

impl ApsystemsClient {
    pub fn new(client: ClientWithMiddleware, endpoint: &DeviceEndpoint) -> Self {
        Self {
            client,
            base_url: endpoint.base_url(),
        }
    }

    async fn request(&self, path: &str) -> Result<reqwest::Response, DeviceError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self.client.get(&url).send().await.map_err(classify)?;

        response
            .error_for_status()
            .with_context(|| format!("Error response from {}", url))
            .map_err(DeviceError::Unclassified)
    }
}

impl DevicePowerApi for ApsystemsClient {
    #[tracing::instrument(skip(self), fields(device = %self.base_url))]
    async fn get_device_power_status(&self) -> Result<Status, DeviceError> {
        let response = self.request("getOnOff").await?;

        let body = response
            .json::<ApiResponse<OnOffData>>()
            .await
            .context("Error decoding power status")?;

        let code = body
            .data
            .status
            .trim()
            .parse::<u8>()
            .with_context(|| format!("Invalid power status {:?}", body.data.status))?;

        Status::from_code(code)
            .with_context(|| format!("Unknown power status code {}", code))
            .map_err(DeviceError::Unclassified)
    }

    #[tracing::instrument(skip(self), fields(device = %self.base_url))]
    async fn set_device_power_status(&self, code: PowerCode) -> Result<(), DeviceError> {
        self.request(&format!("setOnOff?status={}", code.code())).await?;
        Ok(())
    }
}

// Timeouts are never connectivity failures, even when they hit while connecting.
fn classify(error: reqwest_middleware::Error) -> DeviceError {
    match error {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
            DeviceError::Unclassified(e.into())
        }
        reqwest_middleware::Error::Reqwest(e) if e.is_connect() || e.is_request() => {
            DeviceError::Connectivity(e.into())
        }
        e => DeviceError::Unclassified(e.into()),
    }
}
