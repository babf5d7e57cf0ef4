use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::MessageEntity;
use crate::modules::user::schema::UserEntity;

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderInfo {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<UserEntity> for SenderInfo {
    fn from(user: UserEntity) -> Self {
        SenderInfo { id: user.id, display_name: user.display_name, avatar_url: user.avatar_url }
    }
}

/// Message record cùng sender display fields, dùng cho delivery qua WebSocket.
/// Enrichment chỉ là read-through - record đã persist không bị thay đổi.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub sender: SenderInfo,
}

impl MessageResponse {
    pub fn from_entity(message: MessageEntity, sender: SenderInfo) -> Self {
        MessageResponse {
            id: message.id,
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            content: message.content,
            created_at: message.created_at,
            sender,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HistoryQuery {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}
