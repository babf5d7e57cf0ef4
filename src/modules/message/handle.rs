use actix_web::{get, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_extensions,
    modules::{
        message::{
            model::HistoryQuery, repository_pg::MessageRepositoryPg, schema::MessageEntity,
            service::DirectMessageService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::{Claims, ValidatedQuery},
};

pub type DirectMessageSvc = DirectMessageService<MessageRepositoryPg, UserRepositoryPg>;

#[get("/{friend_id}")]
pub async fn get_conversation(
    message_service: web::Data<DirectMessageSvc>,
    friend_id: web::Path<Uuid>,
    query: ValidatedQuery<HistoryQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let user_id = get_extensions::<Claims>(&req)?.sub;
    let messages = message_service.get_conversation(user_id, *friend_id, query.0.limit).await?;

    Ok(success::Success::ok(Some(messages)).message("Messages retrieved successfully"))
}
