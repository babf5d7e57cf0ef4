/// WebSocket Server Actor
///
/// Server actor sở hữu Connection Registry và thực hiện mọi fan-out:
/// presence, now-playing, direct message delivery. Session actors load
/// dữ liệu (friend list, persist) rồi gửi event tới đây; server chỉ
/// lookup registry và deliver - không chạm database nên không bao giờ
/// block trên I/O.
use actix::prelude::*;

use super::events::*;
use super::message::ServerMessage;
use super::registry::ConnectionRegistry;

pub struct WebSocketServer {
    registry: ConnectionRegistry,
}

impl WebSocketServer {
    /// Tạo WebSocket server mới với registry rỗng
    pub fn new() -> Self {
        Self { registry: ConnectionRegistry::new() }
    }
}

impl Actor for WebSocketServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("WebSocket server stopped");
    }
}

impl Default for WebSocketServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Implement Message trait cho ServerMessage để có thể send tới sessions
impl Message for ServerMessage {
    type Result = ();
}

/// Handler: User mới connected
impl Handler<Connect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        if self.registry.register(msg.user_id, msg.addr).is_some() {
            // user connect lần nữa: connection cũ bị thay thế, không lỗi
            tracing::info!("User {} reconnected, previous connection superseded", msg.user_id);
        } else {
            tracing::debug!("User {} connected", msg.user_id);
        }

        tracing::debug!("{} user(s) online", self.registry.online_count());
    }
}

/// Handler: User disconnected
impl Handler<Disconnect> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        // unregister vô điều kiện, an toàn trên key không tồn tại
        if self.registry.unregister(&msg.user_id) {
            tracing::debug!("User {} disconnected", msg.user_id);
        }
    }
}

/// Handler: Gửi message cho một user cụ thể nếu đang online
impl Handler<DeliverToUser> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: DeliverToUser, _: &mut Context<Self>) {
        if let Some(addr) = self.registry.lookup(&msg.user_id) {
            addr.do_send(msg.message);
        } else {
            // expected common case, không queue lại
            tracing::debug!("User {} not online, delivery skipped", msg.user_id);
        }
    }
}

/// Handler: User thay đổi trạng thái presence.
/// Chỉ gửi notification đến friends đang online (friend-scoped fan-out),
/// giống cách Messenger/IG chỉ notify cho contacts.
impl Handler<PresenceChanged> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: PresenceChanged, _: &mut Context<Self>) {
        let event = if msg.is_online {
            ServerMessage::FriendOnline { user_id: msg.user_id }
        } else {
            ServerMessage::FriendOffline { user_id: msg.user_id, last_seen: msg.last_seen }
        };

        let mut notified_count = 0;
        for friend_id in &msg.friend_ids {
            if let Some(addr) = self.registry.lookup(friend_id) {
                addr.do_send(event.clone());
                notified_count += 1;
            }
        }

        tracing::info!(
            "Presence change: user {} {} → notified {}/{} friends",
            msg.user_id,
            if msg.is_online { "online" } else { "offline" },
            notified_count,
            msg.friend_ids.len()
        );
    }
}

/// Handler: User đổi bài đang phát, fan-out cho friends đang online
impl Handler<NowPlayingChanged> for WebSocketServer {
    type Result = ();

    fn handle(&mut self, msg: NowPlayingChanged, _: &mut Context<Self>) {
        let event = ServerMessage::FriendCurrentlyPlaying {
            user_id: msg.user_id,
            song_id: msg.song_id,
            timestamp: msg.timestamp,
        };

        let mut notified_count = 0;
        for friend_id in &msg.friend_ids {
            if let Some(addr) = self.registry.lookup(friend_id) {
                addr.do_send(event.clone());
                notified_count += 1;
            }
        }

        tracing::debug!(
            "Now playing: user {} → song {} → notified {}/{} friends",
            msg.user_id,
            msg.song_id,
            notified_count,
            msg.friend_ids.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::websocket::session::WebSocketSession;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn spawn_session(
        server: &Addr<WebSocketServer>,
        user_id: Uuid,
    ) -> (Addr<WebSocketSession>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = WebSocketSession::for_test(user_id, server.clone(), tx).start();
        (addr, rx)
    }

    /// Chờ actor mailboxes xử lý xong các do_send phía trước
    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(raw) = rx.try_recv() {
            events.push(serde_json::from_str(&raw).unwrap());
        }
        events
    }

    #[actix::test]
    async fn test_connect_notifies_online_friends_only() {
        let server = WebSocketServer::new().start();
        let user_a = Uuid::now_v7();
        let friend_b = Uuid::now_v7();
        let offline_friend = Uuid::now_v7();
        let stranger = Uuid::now_v7();

        let (_addr_b, mut rx_b) = spawn_session(&server, friend_b);
        let (_addr_s, mut rx_s) = spawn_session(&server, stranger);
        settle().await;

        server.do_send(PresenceChanged {
            user_id: user_a,
            is_online: true,
            last_seen: chrono::Utc::now(),
            friend_ids: vec![friend_b, offline_friend],
        });
        settle().await;

        let events_b = drain(&mut rx_b);
        assert_eq!(events_b.len(), 1);
        assert_eq!(events_b[0]["type"], "friendOnline");
        assert_eq!(events_b[0]["userId"], user_a.to_string());

        // stranger không nằm trong friend set → không nhận gì
        assert!(drain(&mut rx_s).is_empty());
    }

    #[actix::test]
    async fn test_disconnect_notifies_friend_offline_with_last_seen() {
        let server = WebSocketServer::new().start();
        let user_a = Uuid::now_v7();
        let friend_b = Uuid::now_v7();
        let last_seen = chrono::Utc::now();

        let (_addr_b, mut rx_b) = spawn_session(&server, friend_b);
        settle().await;

        server.do_send(PresenceChanged {
            user_id: user_a,
            is_online: false,
            last_seen,
            friend_ids: vec![friend_b],
        });
        settle().await;

        let events = drain(&mut rx_b);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "friendOffline");
        assert_eq!(events[0]["userId"], user_a.to_string());
        assert_eq!(events[0]["lastSeen"], last_seen.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true));
    }

    #[actix::test]
    async fn test_now_playing_fanout_reaches_connected_friends() {
        let server = WebSocketServer::new().start();
        let user_a = Uuid::now_v7();
        let friend_b = Uuid::now_v7();
        let song_id = Uuid::now_v7();

        let (_addr_b, mut rx_b) = spawn_session(&server, friend_b);
        settle().await;

        server.do_send(NowPlayingChanged {
            user_id: user_a,
            song_id,
            timestamp: chrono::Utc::now(),
            friend_ids: vec![friend_b],
        });
        settle().await;

        let events = drain(&mut rx_b);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "friendCurrentlyPlaying");
        assert_eq!(events[0]["songId"], song_id.to_string());
    }

    #[actix::test]
    async fn test_last_connection_wins() {
        let server = WebSocketServer::new().start();
        let user_b = Uuid::now_v7();

        let (_first, mut rx_first) = spawn_session(&server, user_b);
        settle().await;
        let (_second, mut rx_second) = spawn_session(&server, user_b);
        settle().await;

        server.do_send(DeliverToUser {
            user_id: user_b,
            message: ServerMessage::UserTyping { user_id: Uuid::now_v7() },
        });
        settle().await;

        // chỉ connection sau cùng nhận được delivery
        assert!(drain(&mut rx_first).is_empty());
        assert_eq!(drain(&mut rx_second).len(), 1);
    }

    #[actix::test]
    async fn test_delivery_skipped_when_recipient_offline() {
        let server = WebSocketServer::new().start();

        // không có session nào → chỉ cần không panic, không lỗi
        server.do_send(DeliverToUser {
            user_id: Uuid::now_v7(),
            message: ServerMessage::UserTyping { user_id: Uuid::now_v7() },
        });
        settle().await;
    }

    #[actix::test]
    async fn test_unregister_absent_user_is_noop() {
        let server = WebSocketServer::new().start();
        let user_b = Uuid::now_v7();

        let (_addr_b, mut rx_b) = spawn_session(&server, user_b);
        settle().await;

        // disconnect một user chưa từng connect
        server.do_send(Disconnect { user_id: Uuid::now_v7() });
        settle().await;

        // user khác không bị ảnh hưởng
        server.do_send(DeliverToUser {
            user_id: user_b,
            message: ServerMessage::UserTyping { user_id: Uuid::now_v7() },
        });
        settle().await;

        assert_eq!(drain(&mut rx_b).len(), 1);
    }

    #[actix::test]
    async fn test_disconnected_user_no_longer_reachable() {
        let server = WebSocketServer::new().start();
        let user_b = Uuid::now_v7();

        let (_addr_b, mut rx_b) = spawn_session(&server, user_b);
        settle().await;

        server.do_send(Disconnect { user_id: user_b });
        settle().await;

        server.do_send(DeliverToUser {
            user_id: user_b,
            message: ServerMessage::UserTyping { user_id: Uuid::now_v7() },
        });
        settle().await;

        assert!(drain(&mut rx_b).is_empty());
    }
}
