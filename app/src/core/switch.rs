use serde::Serialize;

use super::device::{DeviceError, DevicePowerApi, PowerCode, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    #[display("on")]
    On,
    #[display("off")]
    Off,
}

impl From<Status> for PowerState {
    fn from(status: Status) -> Self {
        match status {
            Status::Normal => PowerState::On,
            _ => PowerState::Off,
        }
    }
}

/// Externally observed state of a switch. `state` is `None` until the first successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchView {
    pub state: Option<PowerState>,
    pub available: bool,
}

/// Reflects the power status of a single device as an on/off switch.
///
/// Connectivity failures only clear the availability flag; the last known power
/// state is kept. The cached power state is only ever written by `refresh`.
#[derive(Debug)]
pub struct DeviceSwitchController<C> {
    client: C,
    cached_state: Option<PowerState>,
    available: bool,
}

impl<C: DevicePowerApi> DeviceSwitchController<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            cached_state: None,
            available: false,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn refresh(&mut self) -> anyhow::Result<()> {
        match self.client.get_device_power_status().await {
            Ok(status) => {
                let state = PowerState::from(status);
                tracing::debug!("Device reported status {}, switch is {}", status, state);

                self.cached_state = Some(state);
                self.mark_available(true);
                Ok(())
            }
            Err(e) => self.absorb_connectivity_failure(e),
        }
    }

    pub async fn turn_on(&mut self) -> anyhow::Result<()> {
        self.send(PowerCode::On).await
    }

    pub async fn turn_off(&mut self) -> anyhow::Result<()> {
        self.send(PowerCode::Off).await
    }

    pub fn is_on(&self) -> bool {
        self.cached_state == Some(PowerState::On)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn view(&self) -> SwitchView {
        SwitchView {
            state: self.cached_state,
            available: self.available,
        }
    }

    #[tracing::instrument(skip(self))]
    async fn send(&mut self, code: PowerCode) -> anyhow::Result<()> {
        tracing::info!("Setting device power to {} (code {})", code, code.code());

        match self.client.set_device_power_status(code).await {
            Ok(()) => {
                self.mark_available(true);
                Ok(())
            }
            Err(e) => self.absorb_connectivity_failure(e),
        }
    }

    fn absorb_connectivity_failure(&mut self, error: DeviceError) -> anyhow::Result<()> {
        match error {
            DeviceError::Connectivity(e) => {
                tracing::debug!("Connectivity failure: {:?}", e);
                self.mark_available(false);
                Ok(())
            }
            DeviceError::Unclassified(e) => Err(e),
        }
    }

    fn mark_available(&mut self, available: bool) {
        if self.available != available {
            if available {
                tracing::info!("Device became available");
            } else {
                tracing::warn!("Device became unavailable");
            }
        }

        self.available = available;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug)]
    enum Reply {
        Status(Status),
        Done,
        ConnectionRefused,
        Broken,
    }

    #[derive(Debug, Default)]
    struct ScriptedDevice {
        replies: RefCell<VecDeque<Reply>>,
        sent: RefCell<Vec<u8>>,
    }

    impl ScriptedDevice {
        fn with(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: RefCell::new(replies.into_iter().collect()),
                sent: RefCell::new(vec![]),
            }
        }

        fn next(&self) -> Reply {
            self.replies.borrow_mut().pop_front().expect("no scripted reply left")
        }
    }

    fn failure(reply: Reply) -> DeviceError {
        match reply {
            Reply::ConnectionRefused => {
                DeviceError::Connectivity(anyhow::anyhow!("connection refused"))
            }
            Reply::Broken => DeviceError::Unclassified(anyhow::anyhow!("malformed response")),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    impl DevicePowerApi for ScriptedDevice {
        async fn get_device_power_status(&self) -> Result<Status, DeviceError> {
            match self.next() {
                Reply::Status(status) => Ok(status),
                other => Err(failure(other)),
            }
        }

        async fn set_device_power_status(&self, code: PowerCode) -> Result<(), DeviceError> {
            self.sent.borrow_mut().push(code.code());
            match self.next() {
                Reply::Done => Ok(()),
                other => Err(failure(other)),
            }
        }
    }

    fn controller(
        replies: impl IntoIterator<Item = Reply>,
    ) -> DeviceSwitchController<ScriptedDevice> {
        DeviceSwitchController::new(ScriptedDevice::with(replies))
    }

    #[test]
    fn starts_unknown_and_unavailable() {
        let switch = controller([]);

        assert!(!switch.is_on());
        assert!(!switch.is_available());
        assert_eq!(
            switch.view(),
            SwitchView {
                state: None,
                available: false
            }
        );
    }

    #[tokio::test]
    async fn normal_status_is_on() {
        let mut switch = controller([Reply::Status(Status::Normal)]);

        switch.refresh().await.unwrap();

        assert!(switch.is_on());
        assert!(switch.is_available());
        assert_eq!(switch.view().state, Some(PowerState::On));
    }

    #[tokio::test]
    async fn alarm_status_is_off() {
        let mut switch = controller([Reply::Status(Status::Alarm)]);

        switch.refresh().await.unwrap();

        assert!(!switch.is_on());
        assert!(switch.is_available());
        assert_eq!(switch.view().state, Some(PowerState::Off));
    }

    #[tokio::test]
    async fn connectivity_failure_keeps_last_known_state() {
        let mut switch = controller([Reply::Status(Status::Normal), Reply::ConnectionRefused]);

        switch.refresh().await.unwrap();
        switch.refresh().await.unwrap();

        assert!(switch.is_on());
        assert!(!switch.is_available());
        assert_eq!(switch.view().state, Some(PowerState::On));
    }

    #[tokio::test]
    async fn connectivity_failure_before_first_refresh_stays_unknown() {
        let mut switch = controller([Reply::ConnectionRefused]);

        switch.refresh().await.unwrap();

        assert_eq!(
            switch.view(),
            SwitchView {
                state: None,
                available: false
            }
        );
    }

    #[tokio::test]
    async fn availability_recovers_on_next_successful_refresh() {
        let mut switch = controller([
            Reply::Status(Status::Alarm),
            Reply::ConnectionRefused,
            Reply::Status(Status::Normal),
        ]);

        switch.refresh().await.unwrap();
        switch.refresh().await.unwrap();
        assert!(!switch.is_available());
        assert!(!switch.is_on());

        switch.refresh().await.unwrap();
        assert!(switch.is_available());
        assert!(switch.is_on());
    }

    #[tokio::test]
    async fn repeated_refresh_yields_identical_views() {
        let mut switch = controller([Reply::Status(Status::Normal), Reply::Status(Status::Normal)]);

        switch.refresh().await.unwrap();
        let first = switch.view();
        switch.refresh().await.unwrap();

        assert_eq!(first, switch.view());
    }

    #[tokio::test]
    async fn turn_on_sends_code_zero_without_touching_state() {
        let mut switch = controller([
            Reply::Status(Status::Alarm),
            Reply::ConnectionRefused,
            Reply::Done,
        ]);

        switch.refresh().await.unwrap();
        switch.refresh().await.unwrap();
        assert!(!switch.is_available());

        switch.turn_on().await.unwrap();

        assert_eq!(*switch.client.sent.borrow(), vec![0]);
        assert!(switch.is_available());
        assert!(!switch.is_on());
        assert_eq!(switch.view().state, Some(PowerState::Off));
    }

    #[tokio::test]
    async fn turn_off_sends_code_one_without_touching_state() {
        let mut switch = controller([Reply::Status(Status::Normal), Reply::Done]);

        switch.refresh().await.unwrap();
        switch.turn_off().await.unwrap();

        assert_eq!(*switch.client.sent.borrow(), vec![1]);
        assert!(switch.is_available());
        assert!(switch.is_on());
    }

    #[tokio::test]
    async fn turn_on_before_first_refresh_keeps_state_unknown() {
        let mut switch = controller([Reply::Done]);

        switch.turn_on().await.unwrap();

        assert_eq!(
            switch.view(),
            SwitchView {
                state: None,
                available: true
            }
        );
    }

    #[tokio::test]
    async fn turn_on_twice_is_idempotent() {
        let mut switch = controller([Reply::Done, Reply::Done]);

        switch.turn_on().await.unwrap();
        let first = switch.view();
        switch.turn_on().await.unwrap();

        assert_eq!(first, switch.view());
        assert_eq!(*switch.client.sent.borrow(), vec![0, 0]);
    }

    #[tokio::test]
    async fn turn_off_connectivity_failure_is_absorbed() {
        let mut switch = controller([Reply::Status(Status::Normal), Reply::ConnectionRefused]);

        switch.refresh().await.unwrap();
        let result = switch.turn_off().await;

        assert!(result.is_ok());
        assert!(!switch.is_available());
        assert!(switch.is_on());
    }

    #[tokio::test]
    async fn turn_on_connectivity_failure_is_absorbed() {
        let mut switch = controller([Reply::Status(Status::Alarm), Reply::ConnectionRefused]);

        switch.refresh().await.unwrap();
        let result = switch.turn_on().await;

        assert!(result.is_ok());
        assert!(!switch.is_available());
        assert_eq!(switch.view().state, Some(PowerState::Off));
    }

    #[tokio::test]
    async fn unclassified_refresh_error_propagates_without_changing_view() {
        let mut switch = controller([Reply::Status(Status::Normal), Reply::Broken]);

        switch.refresh().await.unwrap();
        let before = switch.view();
        let result = switch.refresh().await;

        assert!(result.is_err());
        assert_eq!(before, switch.view());
    }

    #[tokio::test]
    async fn unclassified_command_error_propagates_without_changing_view() {
        let mut switch = controller([Reply::Status(Status::Normal), Reply::Broken]);

        switch.refresh().await.unwrap();
        let result = switch.turn_off().await;

        assert!(result.is_err());
        assert_eq!(
            switch.view(),
            SwitchView {
                state: Some(PowerState::On),
                available: true
            }
        );
    }

    #[test]
    fn only_normal_status_maps_to_on() {
        assert_eq!(PowerState::from(Status::Normal), PowerState::On);
        assert_eq!(PowerState::from(Status::Alarm), PowerState::Off);
    }
}
