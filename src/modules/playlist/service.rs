use std::sync::Arc;

use uuid::Uuid;

use crate::api::error;
use crate::modules::playlist::model::{CreatePlaylistModel, PlaylistDetailResponse};
use crate::modules::playlist::repository::PlaylistRepository;
use crate::modules::playlist::schema::PlaylistEntity;
use crate::modules::song::repository::SongRepository;

#[derive(Clone)]
pub struct PlaylistService<P, S>
where
    P: PlaylistRepository + Send + Sync,
    S: SongRepository + Send + Sync,
{
    playlist_repo: Arc<P>,
    song_repo: Arc<S>,
}

impl<P, S> PlaylistService<P, S>
where
    P: PlaylistRepository + Send + Sync,
    S: SongRepository + Send + Sync,
{
    pub fn with_dependencies(playlist_repo: Arc<P>, song_repo: Arc<S>) -> Self {
        PlaylistService { playlist_repo, song_repo }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        playlist: CreatePlaylistModel,
    ) -> Result<PlaylistEntity, error::SystemError> {
        self.playlist_repo
            .create(&owner_id, &playlist.name, &playlist.description, playlist.is_public)
            .await
    }

    pub async fn get_detail(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
    ) -> Result<PlaylistDetailResponse, error::SystemError> {
        let playlist = self
            .playlist_repo
            .find_by_id(&playlist_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Playlist not found"))?;

        if !playlist.is_public && playlist.owner_id != user_id {
            return Err(error::SystemError::forbidden("This playlist is private"));
        }

        let songs = self.playlist_repo.find_songs(&playlist_id).await?;

        Ok(PlaylistDetailResponse { playlist, songs })
    }

    pub async fn get_own(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<PlaylistEntity>, error::SystemError> {
        self.playlist_repo.find_by_owner(&owner_id).await
    }

    pub async fn add_song(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
        song_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.require_owner(&user_id, &playlist_id).await?;

        if self.song_repo.find_by_id(&song_id).await?.is_none() {
            return Err(error::SystemError::not_found("Song not found"));
        }

        self.playlist_repo.add_song(&playlist_id, &song_id).await
    }

    pub async fn remove_song(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
        song_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.require_owner(&user_id, &playlist_id).await?;

        let removed = self.playlist_repo.remove_song(&playlist_id, &song_id).await?;
        if !removed {
            return Err(error::SystemError::not_found("Song is not in this playlist"));
        }
        Ok(())
    }

    pub async fn delete(
        &self,
        user_id: Uuid,
        playlist_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.require_owner(&user_id, &playlist_id).await?;

        let deleted = self.playlist_repo.delete(&playlist_id).await?;
        if !deleted {
            return Err(error::SystemError::not_found("Playlist not found"));
        }
        Ok(())
    }

    async fn require_owner(
        &self,
        user_id: &Uuid,
        playlist_id: &Uuid,
    ) -> Result<PlaylistEntity, error::SystemError> {
        let playlist = self
            .playlist_repo
            .find_by_id(playlist_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Playlist not found"))?;

        if playlist.owner_id != *user_id {
            return Err(error::SystemError::forbidden("You can only modify your own playlists"));
        }

        Ok(playlist)
    }
}
