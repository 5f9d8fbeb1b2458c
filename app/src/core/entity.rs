use serde::Serialize;

const ID_NAMESPACE: &str = "apsystemsapi";
const DEVICE_ID_NAMESPACE: &str = "apsystemsapi_local";
const NAME_PREFIX: &str = "APsystems";
const MANUFACTURER: &str = "APsystems";
const MODEL: &str = "EZ1-M";

const SENSOR_ID: &str = "power_status";
const SENSOR_NAME: &str = "Power Status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Switch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<(String, String)>,
    pub name: String,
    pub manufacturer: String,
    pub model: String,
}

/// Static description of the power switch entity of one configured inverter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchEntity {
    device_name: String,
}

impl SwitchEntity {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
        }
    }

    pub fn unique_id(&self) -> String {
        format!("{}_{}_{}", ID_NAMESPACE, self.device_name, SENSOR_ID)
    }

    pub fn name(&self) -> String {
        format!("{} {} {}", NAME_PREFIX, self.device_name, SENSOR_NAME)
    }

    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::Switch
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifiers: vec![(DEVICE_ID_NAMESPACE.to_string(), self.device_name.clone())],
            name: self.device_name.clone(),
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
        }
    }
}
