use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            model::{FriendActivity, FriendRequestResponse, FriendResponse},
            repository::FriendRepo,
            schema::FriendRequestEntity,
        },
        user::repository::UserRepository,
        websocket::presence::PresenceService,
    },
};

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
    presence: Arc<PresenceService>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        friend_repo: Arc<R>,
        user_repo: Arc<U>,
        presence: Arc<PresenceService>,
    ) -> Self {
        FriendService { friend_repo, user_repo, presence }
    }

    #[allow(dead_code)]
    pub async fn is_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<bool, error::SystemError> {
        let friendship = self.friend_repo.find_friendship(&user_id, &friend_id).await?;
        Ok(friendship.is_some())
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = self.friend_repo.find_friends(&user_id).await?;
        Ok(friends)
    }

    pub async fn remove_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.friend_repo.delete_friendship(&user_id, &friend_id).await
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        message: Option<String>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        if receiver_id == sender_id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        if self.user_repo.find_by_id(&receiver_id).await?.is_none() {
            return Err(error::SystemError::not_found("Receiver user not found"));
        }

        let (friends, requests) = tokio::try_join!(
            self.friend_repo.find_friendship(&sender_id, &receiver_id),
            self.friend_repo.find_friend_request(&sender_id, &receiver_id),
        )?;

        if friends.is_some() {
            return Err(error::SystemError::bad_request("Users are already friends"));
        }

        if requests.is_some() {
            return Err(error::SystemError::bad_request("Friend request already exists"));
        }

        let friend_request =
            self.friend_repo.create_friend_request(&sender_id, &receiver_id, &message).await?;

        Ok(friend_request)
    }

    pub async fn accept_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<FriendResponse, error::SystemError> {
        let from_user_id =
            self.friend_repo.accept_friend_request_atomic(&request_id, &user_id).await?;

        let from_user = self
            .user_repo
            .find_by_id(&from_user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(FriendResponse::from(from_user))
    }

    pub async fn decline_friend_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.to_user_id != user_id {
            return Err(error::SystemError::forbidden(
                "You are not allowed to decline this friend request",
            ));
        }

        self.friend_repo.delete_friend_request(&request_id).await?;

        Ok(())
    }

    pub async fn get_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let (requests_to, requests_from) = tokio::try_join!(
            self.friend_repo.find_friend_request_to_user(&user_id),
            self.friend_repo.find_friend_request_from_user(&user_id),
        )?;

        let mut all = Vec::with_capacity(requests_to.len() + requests_from.len());
        all.extend(requests_to);
        all.extend(requests_from);
        Ok(all)
    }

    pub async fn get_friends_activity(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendActivity>, error::SystemError> {
        let friends = self.friend_repo.find_friends(&user_id).await?;
        if friends.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = friends.iter().map(|f| f.id).collect();
        let statuses = self.presence.get_status_batch(&ids).await?;

        let mut by_id: HashMap<Uuid, _> =
            statuses.into_iter().map(|s| (s.user_id, s)).collect();

        Ok(friends
            .into_iter()
            .map(|friend| {
                let status = by_id.remove(&friend.id);
                let (is_online, last_seen, now_playing) = match status {
                    Some(s) => (s.is_online, s.last_seen, s.now_playing),
                    None => (false, None, None),
                };
                FriendActivity { friend, is_online, last_seen, now_playing }
            })
            .collect())
    }
}
