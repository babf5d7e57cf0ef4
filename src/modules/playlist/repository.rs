use uuid::Uuid;

use crate::api::error;
use crate::modules::playlist::schema::PlaylistEntity;
use crate::modules::song::schema::SongEntity;

#[async_trait::async_trait]
pub trait PlaylistRepository {
    async fn create(
        &self,
        owner_id: &Uuid,
        name: &str,
        description: &Option<String>,
        is_public: bool,
    ) -> Result<PlaylistEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid)
    -> Result<Option<PlaylistEntity>, error::SystemError>;

    async fn find_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<PlaylistEntity>, error::SystemError>;

    async fn find_songs(&self, playlist_id: &Uuid)
    -> Result<Vec<SongEntity>, error::SystemError>;

    async fn add_song(
        &self,
        playlist_id: &Uuid,
        song_id: &Uuid,
    ) -> Result<(), error::SystemError>;

    async fn remove_song(
        &self,
        playlist_id: &Uuid,
        song_id: &Uuid,
    ) -> Result<bool, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
