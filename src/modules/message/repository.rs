use uuid::Uuid;

use crate::api::error;
use crate::modules::message::model::InsertMessage;
use crate::modules::message::schema::MessageEntity;

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(&self, message: &InsertMessage)
    -> Result<MessageEntity, error::SystemError>;

    async fn find_conversation(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        limit: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;
}
