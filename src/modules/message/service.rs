/// Direct Message Service
///
/// Service layer cho tin nhắn 1-1. Đây là durability point của relay:
/// message phải được persist thành công trước khi bất kỳ delivery nào
/// diễn ra. Sau khi persist, record được enrich thêm sender display
/// fields (read-through, không mutate record đã lưu).
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::message::model::{InsertMessage, MessageResponse, SenderInfo};
use crate::modules::message::repository::MessageRepository;
use crate::modules::user::repository::UserRepository;

const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct DirectMessageService<M, U>
where
    M: MessageRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    message_repo: Arc<M>,
    user_repo: Arc<U>,
}

impl<M, U> DirectMessageService<M, U>
where
    M: MessageRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(message_repo: Arc<M>, user_repo: Arc<U>) -> Self {
        DirectMessageService { message_repo, user_repo }
    }

    /// Persist message rồi enrich với sender display fields.
    ///
    /// Persist thất bại → trả lỗi ngay, caller không được deliver.
    pub async fn send_direct_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Result<MessageResponse, error::SystemError> {
        let message = self
            .message_repo
            .create(&InsertMessage { sender_id, receiver_id, content })
            .await?;

        let sender = self.enrich_sender(&sender_id).await;

        Ok(MessageResponse::from_entity(message, sender))
    }

    pub async fn get_conversation(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<crate::modules::message::schema::MessageEntity>, error::SystemError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        self.message_repo.find_conversation(&user_id, &friend_id, limit).await
    }

    /// Read-through enrichment. Lỗi đọc sender không làm fail message
    /// đã persist - fallback về display fields rỗng.
    async fn enrich_sender(&self, sender_id: &Uuid) -> SenderInfo {
        match self.user_repo.find_by_id(sender_id).await {
            Ok(Some(user)) => SenderInfo::from(user),
            Ok(None) => {
                SenderInfo { id: *sender_id, display_name: String::new(), avatar_url: None }
            }
            Err(e) => {
                tracing::warn!("Không thể enrich sender {}: {}", sender_id, e);
                SenderInfo { id: *sender_id, display_name: String::new(), avatar_url: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::message::schema::MessageEntity;
    use crate::modules::user::model::{InsertUser, UpdateUser};
    use crate::modules::user::schema::{UserEntity, UserRole};
    use std::sync::Mutex;

    struct MockMessageRepo {
        fail: bool,
        store: Mutex<Vec<MessageEntity>>,
    }

    impl MockMessageRepo {
        fn new(fail: bool) -> Self {
            Self { fail, store: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl MessageRepository for MockMessageRepo {
        async fn create(
            &self,
            message: &InsertMessage,
        ) -> Result<MessageEntity, error::SystemError> {
            if self.fail {
                return Err(error::SystemError::DatabaseError("connection refused".into()));
            }
            let entity = MessageEntity {
                id: Uuid::now_v7(),
                sender_id: message.sender_id,
                receiver_id: message.receiver_id,
                content: message.content.clone(),
                created_at: chrono::Utc::now(),
            };
            self.store.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn find_conversation(
            &self,
            user_id_a: &Uuid,
            user_id_b: &Uuid,
            limit: i64,
        ) -> Result<Vec<MessageEntity>, error::SystemError> {
            let store = self.store.lock().unwrap();
            Ok(store
                .iter()
                .filter(|m| {
                    (m.sender_id == *user_id_a && m.receiver_id == *user_id_b)
                        || (m.sender_id == *user_id_b && m.receiver_id == *user_id_a)
                })
                .rev()
                .take(limit as usize)
                .cloned()
                .collect())
        }
    }

    struct MockUserRepo {
        user: Option<UserEntity>,
    }

    fn test_user(id: Uuid, display_name: &str) -> UserEntity {
        UserEntity {
            id,
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            hash_password: String::new(),
            role: UserRole::User,
            display_name: display_name.to_string(),
            avatar_url: None,
            bio: None,
            deleted_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[async_trait::async_trait]
    impl UserRepository for MockUserRepo {
        async fn find_by_id(
            &self,
            id: &Uuid,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            Ok(self.user.clone().filter(|u| u.id == *id))
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserEntity>, error::SystemError> {
            unimplemented!()
        }

        async fn create(&self, _user: &InsertUser) -> Result<Uuid, error::SystemError> {
            unimplemented!()
        }

        async fn update(
            &self,
            _id: &Uuid,
            _user: &UpdateUser,
        ) -> Result<UserEntity, error::SystemError> {
            unimplemented!()
        }

        async fn delete(&self, _id: &Uuid) -> Result<bool, error::SystemError> {
            unimplemented!()
        }
    }

    fn service(
        fail: bool,
        sender: Option<UserEntity>,
    ) -> DirectMessageService<MockMessageRepo, MockUserRepo> {
        DirectMessageService::with_dependencies(
            Arc::new(MockMessageRepo::new(fail)),
            Arc::new(MockUserRepo { user: sender }),
        )
    }

    #[tokio::test]
    async fn test_send_persists_then_enriches() {
        let sender_id = Uuid::now_v7();
        let receiver_id = Uuid::now_v7();
        let svc = service(false, Some(test_user(sender_id, "Mai Anh")));

        let response =
            svc.send_direct_message(sender_id, receiver_id, "hello".to_string()).await.unwrap();

        assert_eq!(response.sender_id, sender_id);
        assert_eq!(response.receiver_id, receiver_id);
        assert_eq!(response.content, "hello");
        assert_eq!(response.sender.display_name, "Mai Anh");

        let stored = svc.message_repo.store.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, response.id);
    }

    #[tokio::test]
    async fn test_send_fails_when_persistence_fails() {
        let sender_id = Uuid::now_v7();
        let svc = service(true, Some(test_user(sender_id, "Mai Anh")));

        let result = svc.send_direct_message(sender_id, Uuid::now_v7(), "hello".to_string()).await;

        assert!(result.is_err());
        assert!(svc.message_repo.store.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enrich_falls_back_when_sender_missing() {
        let sender_id = Uuid::now_v7();
        let svc = service(false, None);

        let response =
            svc.send_direct_message(sender_id, Uuid::now_v7(), "hi".to_string()).await.unwrap();

        // record vẫn được persist, sender fields rỗng
        assert_eq!(response.sender.id, sender_id);
        assert!(response.sender.display_name.is_empty());
    }

    #[tokio::test]
    async fn test_messages_keep_send_order() {
        let sender_id = Uuid::now_v7();
        let receiver_id = Uuid::now_v7();
        let svc = service(false, Some(test_user(sender_id, "Mai Anh")));

        for content in ["one", "two", "three"] {
            svc.send_direct_message(sender_id, receiver_id, content.to_string()).await.unwrap();
        }

        let stored = svc.message_repo.store.lock().unwrap();
        let contents: Vec<&str> = stored.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }
}
