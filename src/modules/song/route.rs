use crate::modules::song::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/songs")
            .service(register_upload)
            .service(list_uploads)
            .service(get_song)
            .service(update_song)
            .service(delete_song),
    );
}
