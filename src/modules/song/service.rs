use std::sync::Arc;

use uuid::Uuid;

use crate::api::error;
use crate::modules::song::model::{InsertSong, UpdateSong, UpdateSongModel, UploadSongModel};
use crate::modules::song::repository::SongRepository;
use crate::modules::song::schema::SongEntity;

#[derive(Clone)]
pub struct SongService<S>
where
    S: SongRepository + Send + Sync,
{
    song_repo: Arc<S>,
}

impl<S> SongService<S>
where
    S: SongRepository + Send + Sync,
{
    pub fn with_dependencies(song_repo: Arc<S>) -> Self {
        SongService { song_repo }
    }

    pub async fn register_upload(
        &self,
        owner_id: Uuid,
        song: UploadSongModel,
    ) -> Result<SongEntity, error::SystemError> {
        let insert = InsertSong {
            title: song.title,
            artist: song.artist,
            album: song.album,
            genre: song.genre,
            kind: song.kind,
            duration_secs: song.duration_secs,
            file_url: song.file_url,
            cover_url: song.cover_url,
        };

        self.song_repo.create(&owner_id, &insert).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<SongEntity, error::SystemError> {
        self.song_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Song not found"))
    }

    pub async fn get_uploads(&self, owner_id: Uuid) -> Result<Vec<SongEntity>, error::SystemError> {
        self.song_repo.find_by_owner(&owner_id).await
    }

    pub async fn update_metadata(
        &self,
        user_id: Uuid,
        song_id: Uuid,
        song: UpdateSongModel,
    ) -> Result<SongEntity, error::SystemError> {
        if song.title.is_none()
            && song.artist.is_none()
            && song.album.is_none()
            && song.genre.is_none()
            && song.cover_url.is_none()
        {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        self.require_owner(&user_id, &song_id).await?;

        let update = UpdateSong {
            title: song.title,
            artist: song.artist,
            album: song.album,
            genre: song.genre,
            cover_url: song.cover_url,
        };

        self.song_repo.update(&song_id, &update).await
    }

    pub async fn delete(&self, user_id: Uuid, song_id: Uuid) -> Result<(), error::SystemError> {
        self.require_owner(&user_id, &song_id).await?;

        let deleted = self.song_repo.delete(&song_id).await?;
        if !deleted {
            return Err(error::SystemError::not_found("Song not found"));
        }
        Ok(())
    }

    async fn require_owner(
        &self,
        user_id: &Uuid,
        song_id: &Uuid,
    ) -> Result<SongEntity, error::SystemError> {
        let song = self
            .song_repo
            .find_by_id(song_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Song not found"))?;

        if song.owner_id != *user_id {
            return Err(error::SystemError::forbidden("You can only modify your own uploads"));
        }

        Ok(song)
    }
}
