pub mod device;
pub mod entity;
pub mod polling;
pub mod switch;

use tokio::sync::Mutex;

pub use device::{DeviceEndpoint, DeviceError, DevicePowerApi, PowerCode, Status};
pub use entity::SwitchEntity;
pub use polling::SwitchPoller;
pub use switch::{DeviceSwitchController, PowerState};

/// A configured switch entity together with the controller driving it.
///
/// The controller sits behind a mutex so polling and commands are applied one at a time.
#[derive(Debug)]
pub struct ManagedSwitch<C> {
    pub entity: SwitchEntity,
    pub controller: Mutex<DeviceSwitchController<C>>,
}

impl<C: DevicePowerApi> ManagedSwitch<C> {
    pub fn new(entity: SwitchEntity, client: C) -> Self {
        Self {
            entity,
            controller: Mutex::new(DeviceSwitchController::new(client)),
        }
    }
}
