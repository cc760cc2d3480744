//! Device registry endpoint handlers.
//!
//! Registration is called by the mobile client once after generating its
//! identity token; the existence check is called by beacon firmware to decide
//! whether a sighted identity is worth reporting.

use axum::{extract::State, http::StatusCode, Json};
use persistence::repositories::DeviceRepository;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_device_registered;
use domain::models::device::{
    CheckDeviceRequest, CheckDeviceResponse, RegisterDeviceRequest, RegisterDeviceResponse,
};
use domain::models::Device;

/// Register a device identity.
///
/// POST /api/register_device
///
/// Idempotent: 201 on first registration, 200 when already registered.
pub async fn register_device(
    State(state): State<AppState>,
    Json(request): Json<RegisterDeviceRequest>,
) -> Result<(StatusCode, Json<RegisterDeviceResponse>), ApiError> {
    request.validate()?;
    let uuid = request
        .uuid
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Missing uuid field".to_string()))?;

    let repo = DeviceRepository::new(state.pool.clone());
    let created = repo
        .insert_if_absent(uuid, request.short_id.as_deref(), request.metadata.as_ref())
        .await?;

    match created {
        Some(_) => {
            record_device_registered();
            info!(uuid = %uuid, "Device registered");
            Ok((
                StatusCode::CREATED,
                Json(RegisterDeviceResponse {
                    success: true,
                    message: "Device registered successfully".to_string(),
                }),
            ))
        }
        None => Ok((
            StatusCode::OK,
            Json(RegisterDeviceResponse {
                success: true,
                message: "Device already registered".to_string(),
            }),
        )),
    }
}

/// Check whether a device identity is registered.
///
/// POST /api/check_device
pub async fn check_device(
    State(state): State<AppState>,
    Json(request): Json<CheckDeviceRequest>,
) -> Result<Json<CheckDeviceResponse>, ApiError> {
    request.validate()?;
    let uuid = request
        .uuid
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Missing uuid field".to_string()))?;

    let repo = DeviceRepository::new(state.pool.clone());
    let exists = repo.exists(uuid).await?;

    Ok(Json(CheckDeviceResponse { exists }))
}

/// List all registered devices.
///
/// GET /api/devices
pub async fn list_devices(
    State(state): State<AppState>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let repo = DeviceRepository::new(state.pool.clone());
    let devices = repo
        .list_all()
        .await?
        .into_iter()
        .map(Device::from)
        .collect();

    Ok(Json(devices))
}
