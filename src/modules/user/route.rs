use crate::modules::user::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn public_api_configure(cfg: &mut ServiceConfig) {
    cfg.service(sign_up).service(sign_in).service(refresh);
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .service(get_profile)
            .service(update_user)
            .service(delete_user)
            .service(sign_out)
            .service(get_user),
    );
}
