//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{
        CreateRoomRequest, CreateRoomResponse, ErrorResponse, HealthResponse, ShapeListResponse,
        ShapeRecordDto,
    },
    ui::state::AppState,
    usecase::{CreateRoomError, ListShapesError},
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.registry.connection_count().await,
    })
}

/// `Authorization: Bearer <token>` からトークンを取り出す
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Create a room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), ApiError> {
    match state
        .create_room_usecase
        .execute(bearer_token(&headers), &body.name)
        .await
    {
        Ok(room_id) => Ok((
            StatusCode::CREATED,
            Json(CreateRoomResponse {
                message: "Room created successfully".to_string(),
                room_id: room_id.into_string(),
            }),
        )),
        Err(e) => {
            let status = match e {
                CreateRoomError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                CreateRoomError::InvalidName => StatusCode::BAD_REQUEST,
                CreateRoomError::AlreadyExists => StatusCode::CONFLICT,
                CreateRoomError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            tracing::warn!("Create room rejected: {:?}", e);
            Err(api_error(status, e.to_string()))
        }
    }
}

/// Get persisted shapes of a room (initial load)
pub async fn list_room_shapes(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<ShapeListResponse>, ApiError> {
    let room_id = RoomId::try_from(room_id)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    match state.list_shapes_usecase.execute(&room_id).await {
        Ok(records) => Ok(Json(ShapeListResponse {
            room_id: room_id.into_string(),
            shapes: records.iter().map(ShapeRecordDto::from).collect(),
        })),
        Err(ListShapesError::RoomNotFound) => Err(api_error(
            StatusCode::NOT_FOUND,
            ListShapesError::RoomNotFound.to_string(),
        )),
        Err(e) => {
            tracing::error!("Failed to list shapes of room '{}': {:?}", room_id, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
