/// WebSocket Message Protocol
///
/// Module này định nghĩa các message types được trao đổi giữa client và server
/// thông qua WebSocket connection. Tên event (field "type") là contract với
/// frontend - đổi tên là breaking change.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::message::model::MessageResponse;

/// Messages được gửi từ client đến server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Gửi tin nhắn riêng cho một user
    #[serde(rename_all = "camelCase")]
    PrivateMessage { receiver_id: Uuid, content: String },

    /// Báo cho recipient biết mình đang gõ
    #[serde(rename_all = "camelCase")]
    Typing { receiver_id: Uuid },

    /// Cập nhật bài đang phát, fan-out cho friends
    #[serde(rename_all = "camelCase")]
    UpdateCurrentlyPlaying { song_id: Uuid },

    /// Heartbeat giữ presence TTL
    Ping,
}

/// Messages được gửi từ server đến client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Một friend vừa online
    #[serde(rename_all = "camelCase")]
    FriendOnline { user_id: Uuid },

    /// Một friend vừa offline
    #[serde(rename_all = "camelCase")]
    FriendOffline { user_id: Uuid, last_seen: chrono::DateTime<chrono::Utc> },

    /// Một friend đổi bài đang phát
    #[serde(rename_all = "camelCase")]
    FriendCurrentlyPlaying {
        user_id: Uuid,
        song_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Tin nhắn mới (gửi cho recipient)
    #[serde(rename_all = "camelCase")]
    NewMessage { message: MessageResponse },

    /// Xác nhận tin nhắn đã persist (gửi lại cho sender)
    #[serde(rename_all = "camelCase")]
    MessageSent { message: MessageResponse },

    /// Gửi tin nhắn thất bại
    #[serde(rename_all = "camelCase")]
    MessageError { error: String },

    /// Một user đang gõ tin nhắn cho mình
    #[serde(rename_all = "camelCase")]
    UserTyping { user_id: Uuid },

    /// Pong response cho Ping
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::message::model::SenderInfo;
    use uuid::Uuid;

    fn test_message_response(sender_id: Uuid, receiver_id: Uuid) -> MessageResponse {
        MessageResponse {
            id: Uuid::now_v7(),
            sender_id,
            receiver_id,
            content: "Xin chào!".to_string(),
            created_at: chrono::Utc::now(),
            sender: SenderInfo {
                id: sender_id,
                display_name: "Mai Anh".to_string(),
                avatar_url: None,
            },
        }
    }

    // === ClientMessage deserialization ===

    #[test]
    fn test_client_private_message_deserialize() {
        let id = Uuid::now_v7();
        let json =
            format!(r#"{{"type":"privateMessage","receiverId":"{}","content":"Xin chào!"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::PrivateMessage { receiver_id, content } => {
                assert_eq!(receiver_id, id);
                assert_eq!(content, "Xin chào!");
            }
            _ => panic!("Expected PrivateMessage variant"),
        }
    }

    #[test]
    fn test_client_typing_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"typing","receiverId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::Typing { receiver_id } if receiver_id == id));
    }

    #[test]
    fn test_client_update_currently_playing_deserialize() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"updateCurrentlyPlaying","songId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(
            matches!(msg, ClientMessage::UpdateCurrentlyPlaying { song_id } if song_id == id)
        );
    }

    #[test]
    fn test_client_ping_deserialize() {
        let json = r#"{"type":"ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_invalid_type_returns_error() {
        let json = r#"{"type":"unknownType"}"#;
        let result = serde_json::from_str::<ClientMessage>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_required_field_returns_error() {
        // privateMessage thiếu content
        let json =
            r#"{"type":"privateMessage","receiverId":"550e8400-e29b-41d4-a716-446655440000"}"#;
        let result = serde_json::from_str::<ClientMessage>(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_content_allowed() {
        let id = Uuid::now_v7();
        let json = format!(r#"{{"type":"privateMessage","receiverId":"{}","content":""}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(msg, ClientMessage::PrivateMessage { content, .. } if content.is_empty()));
    }

    // === ServerMessage serialization ===

    #[test]
    fn test_server_friend_online_serialize() {
        let uid = Uuid::now_v7();
        let msg = ServerMessage::FriendOnline { user_id: uid };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"friendOnline\""));
        assert!(json.contains(&uid.to_string()));
    }

    #[test]
    fn test_server_friend_offline_serialize() {
        let uid = Uuid::now_v7();
        let msg = ServerMessage::FriendOffline { user_id: uid, last_seen: chrono::Utc::now() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"friendOffline\""));
        assert!(json.contains("\"lastSeen\""));
    }

    #[test]
    fn test_server_friend_currently_playing_serialize() {
        let uid = Uuid::now_v7();
        let song = Uuid::now_v7();
        let msg = ServerMessage::FriendCurrentlyPlaying {
            user_id: uid,
            song_id: song,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"friendCurrentlyPlaying\""));
        assert!(json.contains(&song.to_string()));
    }

    #[test]
    fn test_server_new_message_serialize() {
        let msg = ServerMessage::NewMessage {
            message: test_message_response(Uuid::now_v7(), Uuid::now_v7()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"newMessage\""));
        assert!(json.contains("\"content\":\"Xin chào!\""));
        assert!(json.contains("\"displayName\":\"Mai Anh\""));
    }

    #[test]
    fn test_server_message_sent_serialize() {
        let msg = ServerMessage::MessageSent {
            message: test_message_response(Uuid::now_v7(), Uuid::now_v7()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"messageSent\""));
    }

    #[test]
    fn test_server_message_error_serialize() {
        let msg = ServerMessage::MessageError { error: "Lỗi hệ thống".to_string() };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"messageError\""));
        assert!(json.contains("Lỗi hệ thống"));
    }

    #[test]
    fn test_server_user_typing_serialize() {
        let uid = Uuid::now_v7();
        let msg = ServerMessage::UserTyping { user_id: uid };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"userTyping\""));
        assert!(json.contains(&uid.to_string()));
    }

    #[test]
    fn test_server_pong_serialize() {
        let msg = ServerMessage::Pong;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"pong"}"#);
    }

    // === Roundtrip tests ===

    #[test]
    fn test_client_message_roundtrip() {
        let id = Uuid::now_v7();
        let original = ClientMessage::PrivateMessage {
            receiver_id: id,
            content: "Test message 🇻🇳".to_string(),
        };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ClientMessage = serde_json::from_str(&json).unwrap();

        match deserialized {
            ClientMessage::PrivateMessage { receiver_id, content } => {
                assert_eq!(receiver_id, id);
                assert_eq!(content, "Test message 🇻🇳");
            }
            _ => panic!("Roundtrip failed"),
        }
    }

    #[test]
    fn test_server_message_roundtrip() {
        let uid = Uuid::now_v7();
        let original = ServerMessage::FriendOnline { user_id: uid };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ServerMessage = serde_json::from_str(&json).unwrap();

        match deserialized {
            ServerMessage::FriendOnline { user_id } => assert_eq!(user_id, uid),
            _ => panic!("Roundtrip failed"),
        }
    }

    #[test]
    fn test_ack_and_delivery_share_payload() {
        // newMessage cho recipient và messageSent cho sender phải mang
        // cùng một record
        let record = test_message_response(Uuid::now_v7(), Uuid::now_v7());
        let delivery = serde_json::to_value(ServerMessage::NewMessage {
            message: record.clone(),
        })
        .unwrap();
        let ack =
            serde_json::to_value(ServerMessage::MessageSent { message: record }).unwrap();

        assert_eq!(delivery["message"], ack["message"]);
    }
}
