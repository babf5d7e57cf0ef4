/// WebSocket Session Actor
///
/// Mỗi WebSocket connection có một Session actor riêng, gắn với đúng một
/// user đã authenticate từ lúc handshake. Session actor xử lý events từ
/// client và gửi messages về client thông qua mpsc channel được bridge
/// từ handler.rs.
///
/// Async operations (DB/Redis calls) chạy qua `into_actor()`:
/// - `ctx.wait()` cho private message: events trên cùng connection được
///   xử lý đúng thứ tự đến, connection khác không bị chặn
/// - `ctx.spawn()` cho presence/now-playing: best-effort, không cần ordering
use actix::prelude::*;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::modules::friend::repository::FriendRepository;
use crate::modules::friend::repository_pg::FriendRepositoryPg;
use crate::modules::message::handle::DirectMessageSvc;

use super::events::*;
use super::message::{ClientMessage, ServerMessage};
use super::presence::PresenceService;
use super::server::WebSocketServer;

/// WebSocket session cho một client
pub struct WebSocketSession {
    /// Unique session ID (chỉ dùng cho logging)
    pub id: Uuid,

    /// User sở hữu connection (đã authenticate từ handshake)
    pub user_id: Uuid,

    /// Address của WebSocket server actor
    pub server: Addr<WebSocketServer>,

    /// Channel gửi JSON messages tới client (bridge → handler.rs → WebSocket)
    pub tx: mpsc::UnboundedSender<String>,

    /// Message service để persist messages vào DB (None trong test environment)
    pub message_service: Option<actix_web::web::Data<DirectMessageSvc>>,

    /// Presence service ghi online/offline/now-playing vào Redis
    /// (None trong test environment)
    pub presence_service: Option<actix_web::web::Data<PresenceService>>,

    /// Friend repository để load fan-out targets (None trong test environment)
    pub friend_repo: Option<actix_web::web::Data<FriendRepositoryPg>>,
}

impl WebSocketSession {
    /// Tạo session mới với outbound channel và dependencies
    pub fn new(
        user_id: Uuid,
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
        message_service: actix_web::web::Data<DirectMessageSvc>,
        presence_service: actix_web::web::Data<PresenceService>,
        friend_repo: actix_web::web::Data<FriendRepositoryPg>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            server,
            tx,
            message_service: Some(message_service),
            presence_service: Some(presence_service),
            friend_repo: Some(friend_repo),
        }
    }

    #[cfg(test)]
    pub fn for_test(
        user_id: Uuid,
        server: Addr<WebSocketServer>,
        tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            server,
            tx,
            message_service: None,
            presence_service: None,
            friend_repo: None,
        }
    }

    /// Gửi ServerMessage tới client thông qua channel
    fn send_to_client(&self, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = self.tx.send(json) {
                    tracing::error!(
                        "Không thể gửi message tới client (session {}): {}",
                        self.id,
                        e
                    );
                }
            }
            Err(e) => {
                tracing::error!("Không thể serialize ServerMessage (session {}): {}", self.id, e);
            }
        }
    }

    /// Gửi error event tới client
    fn send_error(&self, message: &str) {
        self.send_to_client(&ServerMessage::MessageError { error: message.to_string() });
    }

    /// Xử lý message từ client - dispatch tới handler tương ứng
    fn handle_client_message(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        match msg {
            ClientMessage::PrivateMessage { receiver_id, content } => {
                self.handle_private_message(receiver_id, content, ctx);
            }

            ClientMessage::Typing { receiver_id } => {
                self.handle_typing(receiver_id);
            }

            ClientMessage::UpdateCurrentlyPlaying { song_id } => {
                self.handle_update_currently_playing(song_id, ctx);
            }

            ClientMessage::Ping => {
                self.handle_ping(ctx);
            }
        }
    }

    /// Xử lý gửi tin nhắn riêng.
    ///
    /// Persist là durability point: thất bại → chỉ sender nhận messageError,
    /// không có delivery. Thành công → deliver newMessage cho recipient
    /// (nếu online) và luôn ack messageSent cho sender.
    ///
    /// Dùng ctx.wait để messages trên cùng connection giữ đúng thứ tự gửi.
    fn handle_private_message(
        &self,
        receiver_id: Uuid,
        content: String,
        ctx: &mut Context<Self>,
    ) {
        let Some(service) = self.message_service.clone() else {
            self.send_error("Message service không khả dụng");
            return;
        };

        let server = self.server.clone();
        let tx = self.tx.clone();
        let sender_id = self.user_id;
        let session_id = self.id;

        ctx.wait(
            async move {
                match service.send_direct_message(sender_id, receiver_id, content).await {
                    Ok(message) => {
                        // Deliver cho recipient nếu đang online (server tự skip)
                        server.do_send(DeliverToUser {
                            user_id: receiver_id,
                            message: ServerMessage::NewMessage { message: message.clone() },
                        });

                        // Luôn ack lại cho sender, bất kể recipient có online không
                        let ack = ServerMessage::MessageSent { message };
                        if let Ok(json) = serde_json::to_string(&ack) {
                            let _ = tx.send(json);
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            "Lỗi lưu message (session {}, receiver {}): {}",
                            session_id,
                            receiver_id,
                            e
                        );

                        let err_msg = ServerMessage::MessageError {
                            error: "Không thể gửi tin nhắn. Vui lòng thử lại.".to_string(),
                        };
                        if let Ok(json) = serde_json::to_string(&err_msg) {
                            let _ = tx.send(json);
                        }
                    }
                }
            }
            .into_actor(self),
        );
    }

    /// Typing indicator: forward cho đúng một recipient, không persist,
    /// không ack, recipient offline thì bỏ qua
    fn handle_typing(&self, receiver_id: Uuid) {
        self.server.do_send(DeliverToUser {
            user_id: receiver_id,
            message: ServerMessage::UserTyping { user_id: self.user_id },
        });
    }

    /// Xử lý đổi bài đang phát: persist (best-effort) rồi fan-out.
    /// Không validate song_id có tồn tại hay không.
    fn handle_update_currently_playing(&self, song_id: Uuid, ctx: &mut Context<Self>) {
        let (Some(presence), Some(friend_repo)) =
            (self.presence_service.clone(), self.friend_repo.clone())
        else {
            return;
        };

        let server = self.server.clone();
        let user_id = self.user_id;
        let timestamp = chrono::Utc::now();

        ctx.spawn(
            async move {
                // Persist thất bại không chặn fan-out với giá trị in-memory
                if let Err(e) = presence.set_currently_playing(user_id, song_id, timestamp).await {
                    tracing::warn!("Không thể lưu now-playing cho user {}: {}", user_id, e);
                }

                match friend_repo.find_friend_ids(&user_id).await {
                    Ok(friend_ids) => {
                        server.do_send(NowPlayingChanged {
                            user_id,
                            song_id,
                            timestamp,
                            friend_ids,
                        });
                    }
                    Err(e) => {
                        tracing::error!(
                            "Không thể load friend list cho now-playing fan-out (user {}): {}",
                            user_id,
                            e
                        );
                    }
                }
            }
            .into_actor(self),
        );
    }

    /// Heartbeat: trả Pong và refresh presence TTL
    fn handle_ping(&self, ctx: &mut Context<Self>) {
        self.send_to_client(&ServerMessage::Pong);

        if let Some(presence) = self.presence_service.clone() {
            let user_id = self.user_id;
            ctx.spawn(
                async move {
                    if let Err(e) = presence.refresh_presence(user_id).await {
                        tracing::warn!("Không thể refresh presence cho user {}: {}", user_id, e);
                    }
                }
                .into_actor(self),
            );
        }
    }
}

impl Actor for WebSocketSession {
    type Context = Context<Self>;

    /// Connect flow: đăng ký registry trước, sau đó persist online status
    /// và fan-out friendOnline cho friends đang connected
    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session started: {} (user {})", self.id, self.user_id);

        self.server.do_send(Connect { user_id: self.user_id, addr: ctx.address() });

        let (Some(presence), Some(friend_repo)) =
            (self.presence_service.clone(), self.friend_repo.clone())
        else {
            return;
        };

        let server = self.server.clone();
        let user_id = self.user_id;
        let now = chrono::Utc::now();

        ctx.spawn(
            async move {
                // Persist thất bại được log, fan-out vẫn tiếp tục -
                // presence tự sửa ở chu kỳ connect/disconnect tiếp theo
                if let Err(e) = presence.set_online(user_id, now).await {
                    tracing::warn!("Không thể set online cho user {}: {}", user_id, e);
                }

                match friend_repo.find_friend_ids(&user_id).await {
                    Ok(friend_ids) => {
                        server.do_send(PresenceChanged {
                            user_id,
                            is_online: true,
                            last_seen: now,
                            friend_ids,
                        });
                    }
                    Err(e) => {
                        tracing::error!(
                            "Không thể load friend list cho presence fan-out (user {}): {}",
                            user_id,
                            e
                        );
                    }
                }
            }
            .into_actor(self),
        );
    }

    /// Disconnect flow: xóa khỏi registry, persist offline + last_seen,
    /// fan-out friendOffline. Actor đang dừng nên phần async chạy trên
    /// task tách rời.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("WebSocket session stopped: {} (user {})", self.id, self.user_id);

        self.server.do_send(Disconnect { user_id: self.user_id });

        let (Some(presence), Some(friend_repo)) =
            (self.presence_service.clone(), self.friend_repo.clone())
        else {
            return;
        };

        let server = self.server.clone();
        let user_id = self.user_id;
        let now = chrono::Utc::now();

        actix_web::rt::spawn(async move {
            if let Err(e) = presence.set_offline(user_id, now).await {
                tracing::warn!("Không thể set offline cho user {}: {}", user_id, e);
            }

            match friend_repo.find_friend_ids(&user_id).await {
                Ok(friend_ids) => {
                    server.do_send(PresenceChanged {
                        user_id,
                        is_online: false,
                        last_seen: now,
                        friend_ids,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        "Không thể load friend list cho offline fan-out (user {}): {}",
                        user_id,
                        e
                    );
                }
            }
        });
    }
}

/// Implement Message trait cho ClientMessage để có thể send qua actors
impl Message for ClientMessage {
    type Result = ();
}

/// Handler: Nhận ClientMessage từ handler.rs
impl Handler<ClientMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Context<Self>) {
        self.handle_client_message(msg, ctx);
    }
}

/// Handler: Nhận ServerMessage từ server actor → serialize → gửi tới client
impl Handler<ServerMessage> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, _ctx: &mut Context<Self>) {
        self.send_to_client(&msg);
    }
}

/// Handler: Message loop báo WebSocket đã đóng → dừng actor,
/// disconnect flow chạy trong stopped()
impl Handler<CloseSession> for WebSocketSession {
    type Result = ();

    fn handle(&mut self, _msg: CloseSession, ctx: &mut Context<Self>) {
        ctx.stop();
    }
}
