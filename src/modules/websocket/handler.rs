/// WebSocket HTTP Handler
///
/// Module này xử lý HTTP upgrade request và quản lý bidirectional message flow:
/// - Inbound:  Client → WebSocket → parse ClientMessage → Session Actor
/// - Outbound: Server Actor → Session Actor → mpsc channel → WebSocket → Client
///
/// Connection được authenticate NGAY TẠI handshake qua query param `token`
/// (browser không set được Authorization header cho WebSocket). Upgrade
/// chỉ diễn ra khi token hợp lệ → session actor luôn có user_id xác định.
use actix::{Actor, Addr};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use serde::Deserialize;
use tokio::sync::mpsc;

use super::events::CloseSession;
use super::message::{ClientMessage, ServerMessage};
use super::presence::PresenceService;
use super::server::WebSocketServer;
use super::session::WebSocketSession;
use crate::api::error;
use crate::modules::friend::repository_pg::FriendRepositoryPg;
use crate::modules::message::handle::DirectMessageSvc;
use crate::utils::{Claims, TypeClaims};
use crate::ENV;

#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// HTTP handler để upgrade connection thành WebSocket
///
/// Endpoint: GET /ws?token=...
///
/// Flow:
/// 1. Verify access token → user_id
/// 2. HTTP handshake → WebSocket connection
/// 3. Tạo mpsc channel (session actor → client)
/// 4. Start WebSocketSession actor (connect flow chạy trong started())
/// 5. Spawn async task xử lý bidirectional messages
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<WsAuthQuery>,
    server: web::Data<Addr<WebSocketServer>>,
    message_service: web::Data<DirectMessageSvc>,
    presence_service: web::Data<PresenceService>,
    friend_repo: web::Data<FriendRepositoryPg>,
) -> Result<HttpResponse, actix_web::Error> {
    tracing::debug!("WebSocket upgrade request từ {:?}", req.peer_addr());

    let claims = Claims::decode(&query.token, ENV.jwt_secret.as_ref())
        .map_err(|_| error::Error::unauthorized("Token Invalid or Expired"))?;

    if claims._type.as_ref() != Some(&TypeClaims::AccessToken) {
        return Err(error::Error::unauthorized("Token Invalid or Expired").into());
    }

    let user_id = claims.sub;

    // Thực hiện WebSocket handshake
    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, stream)?;

    // Tạo mpsc channel: session actor gửi JSON → spawned task → WebSocket → client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Tạo session actor với outbound channel và dependencies
    let ws_actor = WebSocketSession::new(
        user_id,
        server.get_ref().clone(),
        tx,
        message_service,
        presence_service,
        friend_repo,
    );

    let addr = ws_actor.start();

    // Spawn async task xử lý bidirectional message flow
    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                // === INBOUND: Client → Server ===
                msg = msg_stream.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let text_str = text.to_string();

                            // Parse và forward tới session actor
                            match serde_json::from_str::<ClientMessage>(&text_str) {
                                Ok(client_msg) => {
                                    addr.do_send(client_msg);
                                }
                                Err(e) => {
                                    let preview: String = text_str.chars().take(100).collect();
                                    tracing::warn!(
                                        "Không thể parse client message: {} - raw: {}",
                                        e,
                                        preview
                                    );

                                    // Báo lỗi cho đúng connection gửi payload hỏng
                                    let err = ServerMessage::MessageError {
                                        error: "Định dạng message không hợp lệ".to_string(),
                                    };
                                    if let Ok(json) = serde_json::to_string(&err) {
                                        if ws_session.text(json).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                        }

                        Some(Ok(Message::Ping(data))) => {
                            // Tự động trả lời pong cho WebSocket-level ping
                            if let Err(e) = ws_session.pong(&data).await {
                                tracing::error!("Không thể gửi pong: {}", e);
                                break;
                            }
                        }

                        Some(Ok(Message::Pong(_))) => {
                            // Heartbeat response - bỏ qua
                        }

                        Some(Ok(Message::Close(reason))) => {
                            tracing::info!("WebSocket close frame: {:?}", reason);
                            break;
                        }

                        Some(Ok(Message::Binary(_))) => {
                            tracing::warn!("Binary messages không được hỗ trợ");
                        }

                        Some(Ok(Message::Continuation(_) | Message::Nop)) => {}

                        Some(Err(e)) => {
                            tracing::error!("WebSocket protocol error: {}", e);
                            break;
                        }

                        // Stream kết thúc (client disconnect)
                        None => break,
                    }
                }

                // === OUTBOUND: Server → Client ===
                Some(json) = rx.recv() => {
                    if ws_session.text(json).await.is_err() {
                        tracing::error!("Không thể gửi message tới WebSocket client");
                        break;
                    }
                }
            }
        }

        // Cleanup: đóng WebSocket + dừng session actor (disconnect flow
        // chạy trong stopped())
        let _ = ws_session.close(None).await;
        addr.do_send(CloseSession);
        tracing::debug!("WebSocket message loop kết thúc (user {})", user_id);
    });

    tracing::info!("WebSocket connection established (user {})", user_id);
    Ok(response)
}
