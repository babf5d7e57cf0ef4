/// WebSocket Module
///
/// Module này cung cấp real-time layer cho ứng dụng: presence
/// online/offline, "đang phát" fan-out cho friends, private messaging
/// và typing indicator. Nó bao gồm:
///
/// - Message protocol (ClientMessage & ServerMessage)
/// - Connection Registry (map user_id → session, last-write-wins)
/// - WebSocket Server actor (sở hữu registry, thực hiện fan-out)
/// - WebSocket Session actor (xử lý từng connection)
/// - Presence service (online status trong Redis)
/// - HTTP handler (authenticate + upgrade HTTP thành WebSocket)
pub mod events;
pub mod handler;
pub mod message;
pub mod presence;
pub mod registry;
pub mod server;
pub mod session;
