use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::song::schema::MediaKind;
use crate::utils::double_option;

#[derive(Debug, Clone)]
pub struct InsertSong {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub kind: MediaKind,
    pub duration_secs: i32,
    pub file_url: String,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSong {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<Option<String>>,
    pub genre: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadSongModel {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub artist: String,
    #[validate(length(max = 200))]
    pub album: Option<String>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    pub kind: MediaKind,
    #[validate(range(min = 1, max = 172800))]
    pub duration_secs: i32,
    #[validate(url)]
    pub file_url: String,
    #[validate(url)]
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSongModel {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub album: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub genre: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub cover_url: Option<Option<String>>,
}
