use std::sync::Arc;

use settings::Settings;

use crate::core::SwitchPoller;

mod adapter;
mod core;
mod settings;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings.monitoring.init().expect("Error initializing monitoring");

    let http_client = settings
        .http_client
        .new_tracing_client()
        .expect("Error initializing device HTTP client");

    let switches = Arc::new(
        settings
            .devices
            .iter()
            .map(|device| {
                tracing::info!(
                    "Configuring switch for device {} at {}",
                    device.name,
                    device.endpoint().base_url()
                );
                device.new_switch(http_client.clone())
            })
            .collect::<Vec<_>>(),
    );

    if switches.is_empty() {
        tracing::warn!("No devices configured");
    }

    let poller = SwitchPoller::new(switches.clone(), settings.polling.interval());

    let http_server_exec = {
        let switches = switches.clone();

        async move {
            settings
                .http_server
                .run_server(move || vec![adapter::http::new_routes(switches.clone())])
                .await
                .expect("HTTP server execution failed");
        }
    };

    tracing::info!("Starting main loop");

    tokio::select!(
        _ = poller.run() => {},
        _ = http_server_exec => {},
    );
}
