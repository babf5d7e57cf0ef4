use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{from_fn, Logger},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, connect_redis, RedisCache},
    middlewares::{authentication, authorization},
    modules::{
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        message::{repository_pg::MessageRepositoryPg, service::DirectMessageService},
        playlist::{repository_pg::PlaylistRepositoryPg, service::PlaylistService},
        song::{repository_pg::SongRepositoryPg, service::SongService},
        user::{repository_pg::UserRepositoryPg, schema::UserRole, service::UserService},
        websocket::{handler::websocket_handler, presence::PresenceService, server::WebSocketServer},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        connect_redis().map_err(|_| std::io::Error::other("Redis connection error"))?;

    let cache = Arc::new(RedisCache::new(redis_pool.clone()));
    let presence_service = PresenceService::new(redis_pool);

    let user_repo = UserRepositoryPg::new(db_pool.clone());
    let friend_repo = FriendRepositoryPg::new(db_pool.clone());
    let song_repo = SongRepositoryPg::new(db_pool.clone());
    let playlist_repo = PlaylistRepositoryPg::new(db_pool.clone());
    let message_repo = MessageRepositoryPg::new(db_pool.clone());

    let user_service = UserService::with_dependencies(Arc::new(user_repo.clone()), cache);
    let friend_service = FriendService::with_dependencies(
        Arc::new(friend_repo.clone()),
        Arc::new(user_repo.clone()),
        Arc::new(presence_service.clone()),
    );
    let song_service = SongService::with_dependencies(Arc::new(song_repo.clone()));
    let playlist_service =
        PlaylistService::with_dependencies(Arc::new(playlist_repo), Arc::new(song_repo));
    let message_service =
        DirectMessageService::with_dependencies(Arc::new(message_repo), Arc::new(user_repo));

    // Một server actor duy nhất cho cả process: registry là process-wide state
    let ws_server = WebSocketServer::new().start();

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(song_service.clone()))
            .app_data(web::Data::new(playlist_service.clone()))
            .app_data(web::Data::new(message_service.clone()))
            .app_data(web::Data::new(presence_service.clone()))
            .app_data(web::Data::new(friend_repo.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api").configure(modules::user::route::public_api_configure).service(
                    web::scope("")
                        .wrap(from_fn(authorization(vec![UserRole::User])))
                        .wrap(from_fn(authentication))
                        .configure(modules::user::route::configure)
                        .configure(modules::friend::route::configure)
                        .configure(modules::song::route::configure)
                        .configure(modules::playlist::route::configure)
                        .configure(modules::message::route::configure),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
