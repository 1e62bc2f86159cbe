use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::Expr};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::mfa_challenge::{self, Entity as MfaChallenge};

#[derive(Clone)]
pub struct MfaChallengeDao {
    db: DatabaseConnection,
}

impl DaoBase for MfaChallengeDao {
    type Entity = MfaChallenge;
    const ENTITY_NAME: &'static str = "mfa challenge";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl MfaChallengeDao {
    /// Opens a new challenge and closes any the user still had pending.
    pub async fn create_challenge(
        &self,
        user_id: &Uuid,
        code_hash: &str,
        ttl_secs: i64,
    ) -> DaoResult<mfa_challenge::Model> {
        self.consume_pending_for_user(user_id).await?;

        let expires_at = Utc::now().fixed_offset() + Duration::seconds(ttl_secs);
        let model = mfa_challenge::ActiveModel {
            user_id: Set(*user_id),
            code_hash: Set(code_hash.to_string()),
            expires_at: Set(expires_at),
            attempts: Set(0),
            consumed: Set(false),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Unconsumed challenge by id. Expiry and attempt limits are checked by the caller.
    pub async fn find_pending(&self, id: &Uuid) -> DaoResult<Option<mfa_challenge::Model>> {
        let id = *id;
        self.find_first(move |query| {
            query
                .filter(mfa_challenge::Column::Id.eq(id))
                .filter(mfa_challenge::Column::Consumed.eq(false))
        })
        .await
    }

    /// Counts a wrong code in a single statement. The challenge is consumed once
    /// `max_attempts` is reached. Returns the attempt count after the increment.
    pub async fn record_failed_attempt(&self, id: &Uuid, max_attempts: i32) -> DaoResult<i32> {
        let now = Utc::now().fixed_offset();
        let bumped = MfaChallenge::update_many()
            .col_expr(
                mfa_challenge::Column::Attempts,
                sea_orm::sea_query::ExprTrait::add(
                    Expr::col(mfa_challenge::Column::Attempts),
                    1,
                ),
            )
            .col_expr(mfa_challenge::Column::UpdatedAt, Expr::value(now))
            .filter(mfa_challenge::Column::Id.eq(*id))
            .filter(mfa_challenge::Column::Consumed.eq(false))
            .exec(&self.db)
            .await?;
        if bumped.rows_affected == 0 {
            return Err(Self::not_found(*id));
        }

        MfaChallenge::update_many()
            .col_expr(mfa_challenge::Column::Consumed, Expr::value(true))
            .filter(mfa_challenge::Column::Id.eq(*id))
            .filter(mfa_challenge::Column::Attempts.gte(max_attempts))
            .exec(&self.db)
            .await?;

        Ok(self.find_by_id(*id).await?.attempts)
    }

    /// Marks the challenge consumed. `false` means another caller got there first
    /// or it was never pending.
    pub async fn consume(&self, id: &Uuid) -> DaoResult<bool> {
        let result = MfaChallenge::update_many()
            .col_expr(mfa_challenge::Column::Consumed, Expr::value(true))
            .col_expr(
                mfa_challenge::Column::UpdatedAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(mfa_challenge::Column::Id.eq(*id))
            .filter(mfa_challenge::Column::Consumed.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn consume_pending_for_user(&self, user_id: &Uuid) -> DaoResult<u64> {
        let result = MfaChallenge::update_many()
            .col_expr(mfa_challenge::Column::Consumed, Expr::value(true))
            .filter(mfa_challenge::Column::UserId.eq(*user_id))
            .filter(mfa_challenge::Column::Consumed.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
