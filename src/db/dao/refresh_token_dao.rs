use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::Expr};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::refresh_token::{self, Entity as RefreshToken};

#[derive(Clone)]
pub struct RefreshTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for RefreshTokenDao {
    type Entity = RefreshToken;
    const ENTITY_NAME: &'static str = "refresh token";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RefreshTokenDao {
    pub async fn create_refresh_token(
        &self,
        user_id: &Uuid,
        ttl_days: i64,
    ) -> DaoResult<refresh_token::Model> {
        let expires_at = Utc::now().fixed_offset() + Duration::days(ttl_days);
        let model = refresh_token::ActiveModel {
            token: Set(Uuid::new_v4().to_string()),
            user_id: Set(*user_id),
            expires_at: Set(expires_at),
            revoked: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Unrevoked row for `token`. Expiry is left to the caller.
    pub async fn find_active_by_token(
        &self,
        token: &str,
    ) -> DaoResult<Option<refresh_token::Model>> {
        let token = token.to_string();
        self.find_first(move |query| {
            query
                .filter(refresh_token::Column::Token.eq(token))
                .filter(refresh_token::Column::Revoked.eq(false))
        })
        .await
    }

    /// Revokes `token` if it is still live. `false` means it was already revoked or unknown,
    /// so concurrent callers can tell which of them actually rotated it.
    pub async fn revoke_token(&self, token: &str) -> DaoResult<bool> {
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .col_expr(
                refresh_token::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(refresh_token::Column::Token.eq(token))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Revokes every live token of the user and returns how many were revoked.
    pub async fn revoke_all_for_user(&self, user_id: &Uuid) -> DaoResult<u64> {
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, Expr::value(true))
            .col_expr(
                refresh_token::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(refresh_token::Column::UserId.eq(*user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
