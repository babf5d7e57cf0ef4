use uuid::Uuid;

use crate::{
    api::error,
    modules::song::{
        model::{InsertSong, UpdateSong},
        repository::SongRepository,
        schema::SongEntity,
    },
};

#[derive(Clone)]
pub struct SongRepositoryPg {
    pool: sqlx::PgPool,
}

impl SongRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SongRepository for SongRepositoryPg {
    async fn create(
        &self,
        owner_id: &Uuid,
        song: &InsertSong,
    ) -> Result<SongEntity, error::SystemError> {
        let song = sqlx::query_as::<_, SongEntity>(
            r#"
            INSERT INTO songs (id, owner_id, title, artist, album, genre, kind, duration_secs, file_url, cover_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(owner_id)
        .bind(&song.title)
        .bind(&song.artist)
        .bind(&song.album)
        .bind(&song.genre)
        .bind(&song.kind)
        .bind(song.duration_secs)
        .bind(&song.file_url)
        .bind(&song.cover_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(song)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<SongEntity>, error::SystemError> {
        let song = sqlx::query_as::<_, SongEntity>(
            "SELECT * FROM songs WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(song)
    }

    async fn find_by_owner(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<SongEntity>, error::SystemError> {
        let songs = sqlx::query_as::<_, SongEntity>(
            "SELECT * FROM songs WHERE owner_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(songs)
    }

    async fn update(
        &self,
        id: &Uuid,
        song: &UpdateSong,
    ) -> Result<SongEntity, error::SystemError> {
        let song = sqlx::query_as::<_, SongEntity>(
            r#"
        UPDATE songs
        SET
            title      = COALESCE($2, title),
            artist     = COALESCE($3, artist),
            album      = CASE WHEN $4::boolean THEN $5 ELSE album END,
            genre      = CASE WHEN $6::boolean THEN $7 ELSE genre END,
            cover_url  = CASE WHEN $8::boolean THEN $9 ELSE cover_url END,
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&song.title) // $2: Option<String>
        .bind(&song.artist) // $3: Option<String>
        .bind(song.album.is_some()) // $4: bool - was album provided?
        .bind(song.album.as_ref().and_then(|v| v.as_ref())) // $5: Option<&String>
        .bind(song.genre.is_some()) // $6: bool - was genre provided?
        .bind(song.genre.as_ref().and_then(|v| v.as_ref())) // $7: Option<&String>
        .bind(song.cover_url.is_some()) // $8: bool - was cover_url provided?
        .bind(song.cover_url.as_ref().and_then(|v| v.as_ref())) // $9: Option<&String>
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Song not found"))?;

        Ok(song)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows =
            sqlx::query("UPDATE songs SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows > 0)
    }
}
