use uuid::Uuid;

use crate::api::error;
use crate::modules::song::model::{InsertSong, UpdateSong};
use crate::modules::song::schema::SongEntity;

#[async_trait::async_trait]
pub trait SongRepository {
    async fn create(
        &self,
        owner_id: &Uuid,
        song: &InsertSong,
    ) -> Result<SongEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SongEntity>, error::SystemError>;

    async fn find_by_owner(&self, owner_id: &Uuid)
    -> Result<Vec<SongEntity>, error::SystemError>;

    async fn update(&self, id: &Uuid, song: &UpdateSong)
    -> Result<SongEntity, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
