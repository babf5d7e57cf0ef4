use actix_web::{delete, get, patch, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_extensions,
    modules::song::{
        model::{UpdateSongModel, UploadSongModel},
        repository_pg::SongRepositoryPg,
        schema::SongEntity,
        service::SongService,
    },
    utils::{Claims, ValidatedJson},
};

pub type SongSvc = SongService<SongRepositoryPg>;

#[post("/")]
pub async fn register_upload(
    song_service: web::Data<SongSvc>,
    body: ValidatedJson<UploadSongModel>,
    req: HttpRequest,
) -> Result<success::Success<SongEntity>, error::Error> {
    let owner_id = get_extensions::<Claims>(&req)?.sub;
    let song = song_service.register_upload(owner_id, body.0).await?;

    Ok(success::Success::created(Some(song)).message("Song registered successfully"))
}

#[get("/mine")]
pub async fn list_uploads(
    song_service: web::Data<SongSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SongEntity>>, error::Error> {
    let owner_id = get_extensions::<Claims>(&req)?.sub;
    let songs = song_service.get_uploads(owner_id).await?;

    Ok(success::Success::ok(Some(songs)).message("Uploads retrieved successfully"))
}

#[get("/{song_id}")]
pub async fn get_song(
    song_service: web::Data<SongSvc>,
    song_id: web::Path<Uuid>,
) -> Result<success::Success<SongEntity>, error::Error> {
    let song = song_service.get_by_id(*song_id).await?;

    Ok(success::Success::ok(Some(song)).message("Song retrieved successfully"))
}

#[patch("/{song_id}")]
pub async fn update_song(
    song_service: web::Data<SongSvc>,
    song_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateSongModel>,
    req: HttpRequest,
) -> Result<success::Success<SongEntity>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    let song = song_service.update_metadata(user_id, *song_id, body.0).await?;

    Ok(success::Success::ok(Some(song)).message("Song updated successfully"))
}

#[delete("/{song_id}")]
pub async fn delete_song(
    song_service: web::Data<SongSvc>,
    song_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    song_service.delete(user_id, *song_id).await?;
    Ok(success::Success::no_content())
}
