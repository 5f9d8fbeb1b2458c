use std::sync::Arc;
use std::time::Duration;

use super::{DevicePowerApi, ManagedSwitch};

pub struct SwitchPoller<C> {
    switches: Arc<Vec<ManagedSwitch<C>>>,
    interval: Duration,
}

impl<C: DevicePowerApi> SwitchPoller<C> {
    pub fn new(switches: Arc<Vec<ManagedSwitch<C>>>, interval: Duration) -> Self {
        Self { switches, interval }
    }

    pub async fn run(self) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.poll_once().await;
        }
    }

    pub async fn poll_once(&self) {
        for switch in self.switches.iter() {
            let unique_id = switch.entity.unique_id();
            let mut controller = switch.controller.lock().await;

            if let Err(e) = controller.refresh().await {
                tracing::error!("Error refreshing switch {}: {:?}", unique_id, e);
                continue;
            }

            tracing::debug!("Refreshed switch {}: {:?}", unique_id, controller.view());
        }
    }
}
