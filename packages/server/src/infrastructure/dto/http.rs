//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::ShapeKind;

/// Response for GET /api/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
}

/// Request body for POST /api/rooms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// Response for POST /api/rooms
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub message: String,
    pub room_id: String,
}

/// 永続化済みの図形（初期ロード用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecordDto {
    pub id: String,
    pub user_id: String,
    pub shape_type: ShapeKind,
    pub shape_data: serde_json::Value,
    pub created_at: String,
}

/// Response for GET /api/rooms/{room_id}/shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeListResponse {
    pub room_id: String,
    pub shapes: Vec<ShapeRecordDto>,
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
