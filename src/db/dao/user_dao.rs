use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::{prelude::User, user};

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;
    const ENTITY_NAME: &'static str = "user";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Fields for a freshly registered account. `email` must already be normalized.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone_number: Option<&'a str>,
    pub mfa_enabled: bool,
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find_first(move |query| query.filter(user::Column::Email.eq(email)))
            .await
    }

    pub async fn create_user(&self, new_user: NewUser<'_>) -> DaoResult<user::Model> {
        let model = user::ActiveModel {
            email: Set(new_user.email.to_string()),
            password_hash: Set(new_user.password_hash.to_string()),
            phone_number: Set(new_user.phone_number.map(str::to_string)),
            mfa_enabled: Set(new_user.mfa_enabled),
            last_login_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn set_last_login(&self, id: &Uuid, at: &DateTime<FixedOffset>) -> DaoResult<()> {
        let at = *at;
        self.update(*id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    /// Switches SMS MFA on with the given number, or off when `phone_number` is `None`.
    /// Turning it off keeps the stored number.
    pub async fn set_sms_mfa(
        &self,
        id: &Uuid,
        phone_number: Option<String>,
    ) -> DaoResult<user::Model> {
        self.update(*id, move |active| match phone_number {
            Some(phone) => {
                active.phone_number = Set(Some(phone));
                active.mfa_enabled = Set(true);
            }
            None => active.mfa_enabled = Set(false),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::entities::user;

    use super::{NewUser, UserDao};
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn user_model(id: Uuid, email: &str) -> user::Model {
        let now = ts();
        user::Model {
            id,
            created_at: now,
            updated_at: now,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            phone_number: None,
            mfa_enabled: false,
            last_login_at: None,
        }
    }

    #[tokio::test]
    async fn find_by_email_returns_first_match() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "alice@example.com")]])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("alice@example.com")
            .await
            .expect("query should succeed");
        assert_eq!(result.map(|u| u.id), Some(id));
    }

    #[tokio::test]
    async fn find_by_email_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let result = dao
            .find_by_email("missing@example.com")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn create_user_returns_inserted_row() {
        let id = Uuid::new_v4();
        let mut inserted = user_model(id, "bob@example.com");
        inserted.phone_number = Some("+15550100".to_string());
        inserted.mfa_enabled = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[inserted.clone()]])
            .into_connection();
        let dao = UserDao::new(&db);

        let created = dao
            .create_user(NewUser {
                email: "bob@example.com",
                password_hash: "hash",
                phone_number: Some("+15550100"),
                mfa_enabled: true,
            })
            .await
            .expect("insert should succeed");
        assert_eq!(created, inserted);
    }

    #[tokio::test]
    async fn set_sms_mfa_returns_updated_row() {
        let id = Uuid::new_v4();
        let before = user_model(id, "carol@example.com");
        let mut after = before.clone();
        after.phone_number = Some("+15550101".to_string());
        after.mfa_enabled = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[before], [after.clone()]])
            .into_connection();
        let dao = UserDao::new(&db);

        let updated = dao
            .set_sms_mfa(&id, Some("+15550101".to_string()))
            .await
            .expect("update should succeed");
        assert!(updated.mfa_enabled);
        assert_eq!(updated.phone_number.as_deref(), Some("+15550101"));
    }

    #[tokio::test]
    async fn set_last_login_propagates_not_found() {
        let missing_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let dao = UserDao::new(&db);

        let err = dao
            .set_last_login(&missing_id, &ts())
            .await
            .expect_err("update should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { entity: "user", id } if id == missing_id
        ));
    }
}
