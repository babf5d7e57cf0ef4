/// Connection Registry
///
/// Mapping in-memory từ user_id sang session actor đang active. Đây là
/// shared mutable state duy nhất của relay, chỉ được truy cập từ bên
/// trong WebSocketServer actor - không expose raw map ra ngoài.
///
/// Policy: mỗi user chỉ track MỘT connection (last-write-wins). User
/// connect từ device thứ hai sẽ thay thế connection cũ, không có
/// multi-device fan-out.
use actix::Addr;
use std::collections::HashMap;
use uuid::Uuid;

use super::session::WebSocketSession;

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<Uuid, Addr<WebSocketSession>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self { connections: HashMap::new() }
    }

    /// Ghi đè connection cũ nếu có (last-write-wins).
    /// Trả về handle bị thay thế để caller log.
    pub fn register(
        &mut self,
        user_id: Uuid,
        addr: Addr<WebSocketSession>,
    ) -> Option<Addr<WebSocketSession>> {
        self.connections.insert(user_id, addr)
    }

    /// Xóa entry vô điều kiện. Gọi trên key không tồn tại là no-op.
    pub fn unregister(&mut self, user_id: &Uuid) -> bool {
        self.connections.remove(user_id).is_some()
    }

    pub fn lookup(&self, user_id: &Uuid) -> Option<&Addr<WebSocketSession>> {
        self.connections.get(user_id)
    }

    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}
