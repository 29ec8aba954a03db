//! JSON REST handlers for accessories and their characteristics.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use habridge_app::ports::{AccessoryHost, RemoteStateService};
use habridge_domain::accessory::AccessorySummary;
use habridge_domain::characteristic::{CharacteristicKind, CharacteristicValue};

use crate::error::ApiError;
use crate::state::AppState;

/// One value of a write batch.
#[derive(Debug, Deserialize)]
pub struct CharacteristicWrite {
    /// HAP name (`Brightness`) or snake-case form (`brightness`).
    pub characteristic: String,
    pub value: CharacteristicValue,
}

/// Request body of `PUT /api/accessories/{name}/characteristics`.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub values: Vec<CharacteristicWrite>,
}

/// Response body of a characteristic read.
#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub characteristic: CharacteristicKind,
    pub value: CharacteristicValue,
}

/// `GET /api/accessories`
pub async fn list<R, H>(State(state): State<AppState<R, H>>) -> Json<Vec<AccessorySummary>>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    Json(state.registry.list())
}

/// `GET /api/accessories/{name}`
pub async fn get<R, H>(
    State(state): State<AppState<R, H>>,
    Path(name): Path<String>,
) -> Result<Json<AccessorySummary>, ApiError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    Ok(Json(state.registry.get(&name)?))
}

/// `GET /api/accessories/{name}/characteristics/{kind}`
pub async fn read<R, H>(
    State(state): State<AppState<R, H>>,
    Path((name, kind)): Path<(String, String)>,
) -> Result<Json<ReadResponse>, ApiError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let characteristic: CharacteristicKind = kind.parse()?;
    let value = state.registry.read(&name, characteristic).await?;
    Ok(Json(ReadResponse {
        characteristic,
        value,
    }))
}

/// `PUT /api/accessories/{name}/characteristics`
///
/// The values are applied as one batch: a light sends a single command for
/// the whole request.
pub async fn write<R, H>(
    State(state): State<AppState<R, H>>,
    Path(name): Path<String>,
    Json(req): Json<WriteRequest>,
) -> Result<StatusCode, ApiError>
where
    R: RemoteStateService + Clone + 'static,
    H: AccessoryHost + Clone + 'static,
{
    let batch = req
        .values
        .into_iter()
        .map(|write| Ok((write.characteristic.parse::<CharacteristicKind>()?, write.value)))
        .collect::<Result<Vec<_>, ApiError>>()?;
    state.registry.write(&name, &batch).await?;
    Ok(StatusCode::NO_CONTENT)
}
