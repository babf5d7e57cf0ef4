/// WebSocket Actor Events
///
/// Module này định nghĩa các messages được trao đổi giữa Session actors
/// và Server actor.
use actix::prelude::*;
use uuid::Uuid;

use super::message::ServerMessage;
use super::session::WebSocketSession;

/// Event: User connected, đăng ký vào registry (last-write-wins)
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    /// User sở hữu connection
    pub user_id: Uuid,
    /// Address của session actor để gửi messages
    pub addr: Addr<WebSocketSession>,
}

/// Event: User disconnected, xóa khỏi registry
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub user_id: Uuid,
}

/// Event: Gửi message cho một user nếu đang có live connection.
/// Recipient không online thì bỏ qua, không phải lỗi.
#[derive(Message)]
#[rtype(result = "()")]
pub struct DeliverToUser {
    pub user_id: Uuid,
    pub message: ServerMessage,
}

/// Event: User online/offline, fan-out cho friends đang connected
#[derive(Message)]
#[rtype(result = "()")]
pub struct PresenceChanged {
    pub user_id: Uuid,
    pub is_online: bool,
    pub last_seen: chrono::DateTime<chrono::Utc>,
    /// Friend list đã load sẵn bởi session actor (session có friend_repo)
    pub friend_ids: Vec<Uuid>,
}

/// Event: User đổi bài đang phát, fan-out cho friends đang connected
#[derive(Message)]
#[rtype(result = "()")]
pub struct NowPlayingChanged {
    pub user_id: Uuid,
    pub song_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub friend_ids: Vec<Uuid>,
}

/// Event: Dừng session actor (gửi từ message loop khi WebSocket đóng)
#[derive(Message)]
#[rtype(result = "()")]
pub struct CloseSession;
