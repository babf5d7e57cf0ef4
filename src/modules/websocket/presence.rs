/// Presence Service
///
/// Module quản lý trạng thái online/offline và "đang phát" của users
/// sử dụng Redis:
///
/// - Redis SET với TTL cho trạng thái online (ephemeral, không ghi DB)
/// - Heartbeat (ping) refresh TTL, TTL = 60s → tự động offline nếu mất kết nối
/// - `last_seen` timestamp được ghi ở cả connect và disconnect (persistent,
///   không có TTL)
/// - `now_playing` lưu bài đang phát, xóa khi user offline
/// - Pipeline batch queries cho hiệu năng khi query nhiều users
///
/// Redis key schema:
/// - `presence:{user_id}` → "1" (TTL 60s) - user đang online
/// - `last_seen:{user_id}` → ISO 8601 timestamp
/// - `now_playing:{user_id}` → JSON {songId, timestamp}
use deadpool_redis::redis::{self, AsyncCommands};
use uuid::Uuid;

use crate::api::error;

/// TTL cho presence key (giây). Được refresh qua heartbeat ping.
/// Nếu client mất kết nối mà server không nhận được disconnect,
/// key sẽ tự expire sau 60s.
const PRESENCE_TTL: u64 = 60;

const PRESENCE_PREFIX: &str = "presence:";
const LAST_SEEN_PREFIX: &str = "last_seen:";
const NOW_PLAYING_PREFIX: &str = "now_playing:";

/// Service quản lý presence state trong Redis
#[derive(Clone)]
pub struct PresenceService {
    pool: deadpool_redis::Pool,
}

impl PresenceService {
    /// Tạo PresenceService mới với Redis pool
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        Self { pool }
    }

    /// Đánh dấu user online: SET presence:{user_id} với TTL + cập nhật last_seen
    pub async fn set_online(
        &self,
        user_id: Uuid,
        last_seen: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        let presence_key = format!("{PRESENCE_PREFIX}{user_id}");
        let last_seen_key = format!("{LAST_SEEN_PREFIX}{user_id}");

        redis::pipe()
            .set_ex(&presence_key, "1", PRESENCE_TTL)
            .set(&last_seen_key, last_seen.to_rfc3339())
            .query_async::<()>(&mut *conn)
            .await?;

        Ok(())
    }

    /// Đánh dấu user offline: xóa presence + now_playing, lưu last_seen
    pub async fn set_offline(
        &self,
        user_id: Uuid,
        last_seen: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        let presence_key = format!("{PRESENCE_PREFIX}{user_id}");
        let last_seen_key = format!("{LAST_SEEN_PREFIX}{user_id}");
        let now_playing_key = format!("{NOW_PLAYING_PREFIX}{user_id}");

        // Pipeline: 1 round-trip
        redis::pipe()
            .del(&presence_key)
            .del(&now_playing_key)
            .set(&last_seen_key, last_seen.to_rfc3339())
            .query_async::<()>(&mut *conn)
            .await?;

        Ok(())
    }

    /// Lưu bài đang phát của user
    pub async fn set_currently_playing(
        &self,
        user_id: Uuid,
        song_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        let key = format!("{NOW_PLAYING_PREFIX}{user_id}");
        let value = serde_json::to_string(&NowPlayingInfo { song_id, timestamp })?;
        conn.set::<_, _, ()>(&key, value).await?;
        Ok(())
    }

    /// Refresh TTL cho presence key (gọi mỗi heartbeat)
    pub async fn refresh_presence(&self, user_id: Uuid) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        let key = format!("{PRESENCE_PREFIX}{user_id}");
        conn.expire::<_, bool>(&key, PRESENCE_TTL as i64).await?;
        Ok(())
    }

    /// Batch query trạng thái online/offline + last_seen + now_playing
    /// cho nhiều users. Sử dụng Redis pipeline để giảm round-trips.
    pub async fn get_status_batch(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PresenceInfo>, error::SystemError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.pool.get().await?;

        // Step 1: Pipeline EXISTS cho tất cả users
        let mut pipe = redis::pipe();
        for user_id in user_ids {
            pipe.exists(format!("{PRESENCE_PREFIX}{user_id}"));
        }
        let online_flags: Vec<bool> = pipe.query_async(&mut *conn).await?;

        // Step 2: Pipeline GET last_seen cho offline users,
        //         GET now_playing cho online users
        let mut detail_pipe = redis::pipe();
        for (i, user_id) in user_ids.iter().enumerate() {
            if online_flags[i] {
                detail_pipe.get(format!("{NOW_PLAYING_PREFIX}{user_id}"));
            } else {
                detail_pipe.get(format!("{LAST_SEEN_PREFIX}{user_id}"));
            }
        }
        let details: Vec<Option<String>> = detail_pipe.query_async(&mut *conn).await?;

        // Step 3: Combine results
        let mut results = Vec::with_capacity(user_ids.len());

        for (i, user_id) in user_ids.iter().enumerate() {
            let is_online = online_flags[i];
            let detail = details.get(i).cloned().flatten();

            let (last_seen, now_playing) = if is_online {
                let now_playing =
                    detail.and_then(|raw| serde_json::from_str::<NowPlayingInfo>(&raw).ok());
                (None, now_playing)
            } else {
                (detail, None)
            };

            results.push(PresenceInfo { user_id: *user_id, is_online, last_seen, now_playing });
        }

        Ok(results)
    }
}

/// Bài đang phát của 1 user
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingInfo {
    pub song_id: Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Thông tin presence của 1 user
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceInfo {
    pub user_id: Uuid,
    pub is_online: bool,
    pub last_seen: Option<String>,
    pub now_playing: Option<NowPlayingInfo>,
}
