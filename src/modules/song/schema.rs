use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Type, Serialize, Deserialize)]
#[sqlx(type_name = "media_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    #[sqlx(rename = "SONG")]
    Song,
    #[sqlx(rename = "AUDIOBOOK")]
    Audiobook,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SongEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub kind: MediaKind,
    pub duration_secs: i32,
    pub file_url: String,
    pub cover_url: Option<String>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
