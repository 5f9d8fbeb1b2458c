use std::sync::Arc;

use actix_web::{
    HttpResponse, ResponseError,
    web::{self, Json},
};
use derive_more::derive::Display;
use serde::Serialize;

use crate::core::entity::{DeviceClass, DeviceInfo};
use crate::core::{DevicePowerApi, DeviceSwitchController, ManagedSwitch, PowerState};

pub fn new_routes<C: DevicePowerApi + 'static>(
    switches: Arc<Vec<ManagedSwitch<C>>>,
) -> actix_web::Scope {
    web::scope("/api/switches")
        .route("", web::get().to(list_switches::<C>))
        .route("/{unique_id}", web::get().to(get_switch::<C>))
        .route("/{unique_id}/turn_on", web::post().to(turn_on::<C>))
        .route("/{unique_id}/turn_off", web::post().to(turn_off::<C>))
        .app_data(web::Data::from(switches))
}

type SwitchApiResponse = Result<Json<SwitchEntityDTO>, SwitchApiError>;

#[derive(Debug, Display)]
enum SwitchApiError {
    #[display("Switch not found")]
    NotFound,

    #[display("Error communicating with device")]
    DeviceError(anyhow::Error),
}

impl ResponseError for SwitchApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        tracing::warn!("SwitchApiError: {:?}", self);

        match self {
            SwitchApiError::NotFound => StatusCode::NOT_FOUND,
            SwitchApiError::DeviceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct SwitchEntityDTO {
    unique_id: String,
    name: String,
    device_class: DeviceClass,
    device_info: DeviceInfo,
    state: Option<PowerState>,
    is_on: bool,
    available: bool,
}

impl SwitchEntityDTO {
    fn new<C: DevicePowerApi>(
        switch: &ManagedSwitch<C>,
        controller: &DeviceSwitchController<C>,
    ) -> Self {
        let view = controller.view();

        Self {
            unique_id: switch.entity.unique_id(),
            name: switch.entity.name(),
            device_class: switch.entity.device_class(),
            device_info: switch.entity.device_info(),
            state: view.state,
            is_on: controller.is_on(),
            available: view.available,
        }
    }
}

fn find_switch<'a, C>(
    switches: &'a [ManagedSwitch<C>],
    unique_id: &str,
) -> Result<&'a ManagedSwitch<C>, SwitchApiError> {
    switches
        .iter()
        .find(|switch| switch.entity.unique_id() == unique_id)
        .ok_or(SwitchApiError::NotFound)
}

async fn list_switches<C: DevicePowerApi + 'static>(
    switches: web::Data<Vec<ManagedSwitch<C>>>,
) -> HttpResponse {
    let mut dtos = Vec::with_capacity(switches.len());

    for switch in switches.iter() {
        let controller = switch.controller.lock().await;
        dtos.push(SwitchEntityDTO::new(switch, &controller));
    }

    HttpResponse::Ok().json(dtos)
}

async fn get_switch<C: DevicePowerApi + 'static>(
    switches: web::Data<Vec<ManagedSwitch<C>>>,
    unique_id: web::Path<String>,
) -> SwitchApiResponse {
    let switch = find_switch(&switches, &unique_id)?;
    let controller = switch.controller.lock().await;

    Ok(Json(SwitchEntityDTO::new(switch, &controller)))
}

async fn turn_on<C: DevicePowerApi + 'static>(
    switches: web::Data<Vec<ManagedSwitch<C>>>,
    unique_id: web::Path<String>,
) -> SwitchApiResponse {
    let switch = find_switch(&switches, &unique_id)?;
    let mut controller = switch.controller.lock().await;

    tracing::info!("Turning on switch {}", unique_id);
    controller.turn_on().await.map_err(SwitchApiError::DeviceError)?;

    Ok(Json(SwitchEntityDTO::new(switch, &controller)))
}

async fn turn_off<C: DevicePowerApi + 'static>(
    switches: web::Data<Vec<ManagedSwitch<C>>>,
    unique_id: web::Path<String>,
) -> SwitchApiResponse {
    let switch = find_switch(&switches, &unique_id)?;
    let mut controller = switch.controller.lock().await;

    tracing::info!("Turning off switch {}", unique_id);
    controller.turn_off().await.map_err(SwitchApiError::DeviceError)?;

    Ok(Json(SwitchEntityDTO::new(switch, &controller)))
}
