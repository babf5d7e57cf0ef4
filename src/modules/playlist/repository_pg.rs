use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        playlist::{repository::PlaylistRepository, schema::PlaylistEntity},
        song::schema::SongEntity,
    },
};

#[derive(Clone)]
pub struct PlaylistRepositoryPg {
    pool: sqlx::PgPool,
}

impl PlaylistRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PlaylistRepository for PlaylistRepositoryPg {
    async fn create(
        &self,
        owner_id: &Uuid,
        name: &str,
        description: &Option<String>,
        is_public: bool,
    ) -> Result<PlaylistEntity, error::SystemError> {
        let playlist = sqlx::query_as::<_, PlaylistEntity>(
            r#"
            INSERT INTO playlists (id, owner_id, name, description, is_public)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<PlaylistEntity>, error::SystemError> {
        let playlist =
            sqlx::query_as::<_, PlaylistEntity>("SELECT * FROM playlists WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(playlist)
    }

    async fn find_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<PlaylistEntity>, error::SystemError> {
        let playlists = sqlx::query_as::<_, PlaylistEntity>(
            "SELECT * FROM playlists WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(playlists)
    }

    async fn find_songs(
        &self,
        playlist_id: &Uuid,
    ) -> Result<Vec<SongEntity>, error::SystemError> {
        let songs = sqlx::query_as::<_, SongEntity>(
            r#"
            SELECT s.*
            FROM playlist_songs ps
            JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = $1 AND s.deleted_at IS NULL
            ORDER BY ps.position
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(songs)
    }

    async fn add_song(
        &self,
        playlist_id: &Uuid,
        song_id: &Uuid,
    ) -> Result<(), error::SystemError> {
        // position = next free slot, duplicates rejected by the primary key
        sqlx::query(
            r#"
            INSERT INTO playlist_songs (playlist_id, song_id, position)
            SELECT $1, $2, COALESCE(MAX(position), 0) + 1
            FROM playlist_songs
            WHERE playlist_id = $1
            "#,
        )
        .bind(playlist_id)
        .bind(song_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_song(
        &self,
        playlist_id: &Uuid,
        song_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let rows =
            sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = $1 AND song_id = $2")
                .bind(playlist_id)
                .bind(song_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows > 0)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}
