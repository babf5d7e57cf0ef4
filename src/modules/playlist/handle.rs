use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_extensions,
    modules::{
        playlist::{
            model::{AddSongBody, CreatePlaylistModel, PlaylistDetailResponse},
            repository_pg::PlaylistRepositoryPg,
            schema::PlaylistEntity,
            service::PlaylistService,
        },
        song::repository_pg::SongRepositoryPg,
    },
    utils::{Claims, ValidatedJson},
};

pub type PlaylistSvc = PlaylistService<PlaylistRepositoryPg, SongRepositoryPg>;

#[post("/")]
pub async fn create_playlist(
    playlist_service: web::Data<PlaylistSvc>,
    body: ValidatedJson<CreatePlaylistModel>,
    req: HttpRequest,
) -> Result<success::Success<PlaylistEntity>, error::Error> {
    let owner_id = get_extensions::<Claims>(&req)?.sub;
    let playlist = playlist_service.create(owner_id, body.0).await?;

    Ok(success::Success::created(Some(playlist)).message("Playlist created successfully"))
}

#[get("/")]
pub async fn list_playlists(
    playlist_service: web::Data<PlaylistSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<PlaylistEntity>>, error::Error> {
    let owner_id = get_extensions::<Claims>(&req)?.sub;
    let playlists = playlist_service.get_own(owner_id).await?;

    Ok(success::Success::ok(Some(playlists)).message("Playlists retrieved successfully"))
}

#[get("/{playlist_id}")]
pub async fn get_playlist(
    playlist_service: web::Data<PlaylistSvc>,
    playlist_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<PlaylistDetailResponse>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    let playlist = playlist_service.get_detail(user_id, *playlist_id).await?;

    Ok(success::Success::ok(Some(playlist)).message("Playlist retrieved successfully"))
}

#[post("/{playlist_id}/songs")]
pub async fn add_song(
    playlist_service: web::Data<PlaylistSvc>,
    playlist_id: web::Path<Uuid>,
    body: ValidatedJson<AddSongBody>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    playlist_service.add_song(user_id, *playlist_id, body.0.song_id).await?;

    Ok(success::Success::ok(None).message("Song added to playlist"))
}

#[delete("/{playlist_id}/songs/{song_id}")]
pub async fn remove_song(
    playlist_service: web::Data<PlaylistSvc>,
    path: web::Path<(Uuid, Uuid)>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    let (playlist_id, song_id) = path.into_inner();
    playlist_service.remove_song(user_id, playlist_id, song_id).await?;
    Ok(success::Success::no_content())
}

#[delete("/{playlist_id}")]
pub async fn delete_playlist(
    playlist_service: web::Data<PlaylistSvc>,
    playlist_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    playlist_service.delete(user_id, *playlist_id).await?;
    Ok(success::Success::no_content())
}
