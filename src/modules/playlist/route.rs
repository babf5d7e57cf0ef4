use crate::modules::playlist::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/playlists")
            .service(create_playlist)
            .service(list_playlists)
            .service(get_playlist)
            .service(add_song)
            .service(remove_song)
            .service(delete_playlist),
    );
}
