use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::{
    auth::UserProfile,
    db::dao::{DaoBase, DaoLayerError, UserDao, user_dao::NewUser},
    db::entities::user,
    error::AppError,
};

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(*id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(email).await?)
    }

    pub async fn profile(&self, id: &Uuid) -> Result<UserProfile, AppError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        Ok(UserProfile::from(&user))
    }

    pub async fn create_user(&self, new_user: NewUser<'_>) -> Result<user::Model, AppError> {
        Ok(self.user_dao.create_user(new_user).await?)
    }

    pub async fn set_last_login(
        &self,
        user_id: &Uuid,
        last_login: &DateTime<FixedOffset>,
    ) -> Result<(), AppError> {
        Ok(self.user_dao.set_last_login(user_id, last_login).await?)
    }

    pub async fn set_sms_mfa(
        &self,
        user_id: &Uuid,
        phone_number: Option<String>,
    ) -> Result<user::Model, AppError> {
        Ok(self.user_dao.set_sms_mfa(user_id, phone_number).await?)
    }
}
