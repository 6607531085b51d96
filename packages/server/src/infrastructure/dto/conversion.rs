//! Conversion logic between DTOs and domain types.

use crate::{
    domain::{RoomId, ServerEvent, Shape, ShapeAction, ShapeRecord},
    infrastructure::dto::{
        http::ShapeRecordDto,
        websocket::{ClientRequest, InboundMessage, InboundMessageType, OutboundMessage},
    },
    usecase::ProtocolError,
};

// ========================================
// DTO → Domain
// ========================================

impl ClientRequest {
    /// テキストフレームを ClientRequest に変換する
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let inbound: InboundMessage =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        Self::try_from(inbound)
    }
}

impl TryFrom<InboundMessage> for ClientRequest {
    type Error = ProtocolError;

    fn try_from(dto: InboundMessage) -> Result<Self, Self::Error> {
        let room_id = dto
            .room_id
            .ok_or(ProtocolError::MissingField("roomId"))
            .and_then(|raw| {
                RoomId::new(raw).map_err(|e| ProtocolError::InvalidField(e.to_string()))
            })?;

        match dto.r#type {
            InboundMessageType::Join => Ok(ClientRequest::Join { room_id }),
            InboundMessageType::Leave => Ok(ClientRequest::Leave { room_id }),
            InboundMessageType::Draw | InboundMessageType::Delete => {
                let kind = dto.shape_type.ok_or(ProtocolError::MissingField("shapeType"))?;
                let shape_data = dto
                    .shape_data
                    .ok_or(ProtocolError::MissingField("shapeData"))?;
                let shape = Shape::from_payload(kind, &shape_data)
                    .map_err(|e| ProtocolError::InvalidField(format!("shapeData: {}", e)))?;

                if dto.r#type == InboundMessageType::Draw {
                    Ok(ClientRequest::Draw {
                        room_id,
                        shape,
                        shape_data,
                    })
                } else {
                    Ok(ClientRequest::Delete {
                        room_id,
                        shape,
                        shape_data,
                    })
                }
            }
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&ServerEvent> for OutboundMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::Success { message, timestamp } => OutboundMessage::Success {
                message: message.clone(),
                timestamp: timestamp.to_rfc3339(),
            },
            ServerEvent::Error { message, timestamp } => OutboundMessage::Error {
                message: message.clone(),
                timestamp: timestamp.to_rfc3339(),
            },
            ServerEvent::Notification {
                message,
                user,
                room_id,
                timestamp,
            } => OutboundMessage::Notification {
                message: message.clone(),
                user: user.to_string(),
                room_id: room_id.to_string(),
                timestamp: timestamp.to_rfc3339(),
            },
            ServerEvent::Shape(shape_event) => {
                let user = shape_event.user_id.to_string();
                let room_id = shape_event.room_id.to_string();
                let shape_type = shape_event.kind();
                let shape_data = shape_event.shape_data.clone();
                let timestamp = shape_event.timestamp.to_rfc3339();
                match shape_event.action {
                    ShapeAction::Draw => OutboundMessage::Draw {
                        user,
                        room_id,
                        shape_type,
                        shape_data,
                        timestamp,
                    },
                    ShapeAction::Delete => OutboundMessage::Delete {
                        user,
                        room_id,
                        shape_type,
                        shape_data,
                        timestamp,
                    },
                }
            }
        }
    }
}

impl From<&ShapeRecord> for ShapeRecordDto {
    fn from(record: &ShapeRecord) -> Self {
        Self {
            id: record.id.to_string(),
            user_id: record.user_id.to_string(),
            shape_type: record.shape.kind(),
            shape_data: record.shape.to_payload(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DisplayName, Identity, RectangleData, ShapeEvent, ShapeKind, StrokeStyle, Timestamp,
        UserId,
    };
    use serde_json::json;

    fn rectangle_payload() -> serde_json::Value {
        json!({
            "x": 10, "y": 10, "width": 50, "height": 30,
            "color": "#fff", "strokeWidth": 2, "strokeStyle": "SOLID"
        })
    }

    #[test]
    fn test_parse_draw_request() {
        // テスト項目: draw メッセージが図形付きの ClientRequest に変換される
        // given (前提条件):
        let text = json!({
            "type": "draw",
            "roomId": "abc",
            "shapeType": "RECTANGLE",
            "shapeData": rectangle_payload()
        })
        .to_string();

        // when (操作):
        let request = ClientRequest::parse(&text).unwrap();

        // then (期待する結果):
        let ClientRequest::Draw {
            room_id,
            shape,
            shape_data,
        } = request
        else {
            panic!("expected draw request");
        };
        assert_eq!(room_id.as_str(), "abc");
        assert_eq!(shape_data, rectangle_payload());
        assert_eq!(
            shape,
            Shape::Rectangle(RectangleData {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 30.0,
                color: "#fff".to_string(),
                stroke_width: 2.0,
                stroke_style: StrokeStyle::Solid,
            })
        );
    }

    #[test]
    fn test_parse_rejects_malformed_requests() {
        // テスト項目: 壊れた JSON・必須フィールド欠落・型不一致はプロトコルエラーになる
        // given (前提条件):
        let not_json = "hello";
        let missing_room = r#"{"type":"join"}"#;
        let missing_shape = r#"{"type":"draw","roomId":"abc"}"#;
        let wrong_payload = json!({
            "type": "draw",
            "roomId": "abc",
            "shapeType": "TEXT",
            "shapeData": rectangle_payload()
        })
        .to_string();

        // when (操作):
        let results = [
            ClientRequest::parse(not_json),
            ClientRequest::parse(missing_room),
            ClientRequest::parse(missing_shape),
            ClientRequest::parse(&wrong_payload),
        ];

        // then (期待する結果):
        assert!(matches!(results[0], Err(ProtocolError::Malformed(_))));
        assert_eq!(results[1], Err(ProtocolError::MissingField("roomId")));
        assert_eq!(results[2], Err(ProtocolError::MissingField("shapeType")));
        assert!(matches!(results[3], Err(ProtocolError::InvalidField(_))));
        for result in results {
            assert_eq!(result.unwrap_err().to_string(), "Invalid message format");
        }
    }

    #[test]
    fn test_shape_event_to_outbound_keeps_payload() {
        // テスト項目: 図形イベントは受信した shapeData をそのまま持って変換される
        // given (前提条件):
        let payload = rectangle_payload();
        let shape = Shape::from_payload(ShapeKind::Rectangle, &payload).unwrap();
        let event = ServerEvent::Shape(ShapeEvent {
            action: ShapeAction::Delete,
            user_id: UserId::new("u1".to_string()).unwrap(),
            room_id: RoomId::new("abc".to_string()).unwrap(),
            shape,
            shape_data: payload.clone(),
            timestamp: Timestamp::new(1672531200123),
        });

        // when (操作):
        let dto = OutboundMessage::from(&event);

        // then (期待する結果):
        assert_eq!(
            dto,
            OutboundMessage::Delete {
                user: "u1".to_string(),
                room_id: "abc".to_string(),
                shape_type: ShapeKind::Rectangle,
                shape_data: payload,
                timestamp: "2023-01-01T00:00:00.123Z".to_string(),
            }
        );
    }

    #[test]
    fn test_notification_to_outbound() {
        // テスト項目: 通知の user には表示名が入る
        // given (前提条件):
        let identity = Identity::new(
            UserId::new("u1".to_string()).unwrap(),
            DisplayName::new("Alice".to_string()).unwrap(),
        );
        let room_id = RoomId::new("abc".to_string()).unwrap();
        let event = ServerEvent::joined(&identity, &room_id, Timestamp::new(0));

        // when (操作):
        let dto = OutboundMessage::from(&event);

        // then (期待する結果):
        assert_eq!(
            dto,
            OutboundMessage::Notification {
                message: "Alice has joined the room".to_string(),
                user: "Alice".to_string(),
                room_id: "abc".to_string(),
                timestamp: "1970-01-01T00:00:00.000Z".to_string(),
            }
        );
    }
}
