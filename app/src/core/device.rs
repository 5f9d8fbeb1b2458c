use derive_more::derive::{Display, From};

/// Network location of one inverter's local API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    address: String,
    port: u16,
}

impl DeviceEndpoint {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

/// Operating status reported by the inverter's power-status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Status {
    #[display("normal")]
    Normal,
    #[display("alarm")]
    Alarm,
}

impl Status {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Normal),
            1 => Some(Status::Alarm),
            _ => None,
        }
    }
}

/// Control code accepted by the inverter's power-control endpoint.
///
/// The device uses `0` for on and `1` for off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PowerCode {
    #[display("on")]
    On,
    #[display("off")]
    Off,
}

impl PowerCode {
    pub fn code(self) -> u8 {
        match self {
            PowerCode::On => 0,
            PowerCode::Off => 1,
        }
    }
}

#[derive(Debug, Display, From)]
pub enum DeviceError {
    #[display("Device not reachable: {_0}")]
    #[from(ignore)]
    Connectivity(anyhow::Error),

    #[display("{_0:#}")]
    Unclassified(anyhow::Error),
}

pub trait DevicePowerApi {
    async fn get_device_power_status(&self) -> Result<Status, DeviceError>;

    async fn set_device_power_status(&self, code: PowerCode) -> Result<(), DeviceError>;
}
