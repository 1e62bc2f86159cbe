use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::todo::{self, Entity as Todo};

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
}

impl DaoBase for TodoDao {
    type Entity = Todo;
    const ENTITY_NAME: &'static str = "todo";

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct TodoChanges {
    pub content: Option<String>,
    pub is_done: Option<bool>,
}

impl TodoDao {
    /// Every todo the owner has, oldest first.
    pub async fn list_for_owner(&self, owner: &Uuid) -> DaoResult<Vec<todo::Model>> {
        let owner = *owner;
        self.find_all(Some((todo::Column::CreatedAt, Order::Asc)), move |query| {
            query.filter(todo::Column::Owner.eq(owner))
        })
        .await
    }

    /// `None` both when the row is missing and when it belongs to someone else.
    pub async fn find_for_owner(&self, owner: &Uuid, id: &Uuid) -> DaoResult<Option<todo::Model>> {
        let (owner, id) = (*owner, *id);
        self.find_first(move |query| {
            query
                .filter(todo::Column::Id.eq(id))
                .filter(todo::Column::Owner.eq(owner))
        })
        .await
    }

    pub async fn create_todo(
        &self,
        owner: &Uuid,
        content: &str,
        is_done: bool,
    ) -> DaoResult<todo::Model> {
        let model = todo::ActiveModel {
            content: Set(content.to_string()),
            is_done: Set(is_done),
            owner: Set(*owner),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn update_todo(&self, id: &Uuid, changes: TodoChanges) -> DaoResult<todo::Model> {
        self.update(*id, move |active| {
            if let Some(content) = changes.content {
                active.content = Set(content);
            }
            if let Some(is_done) = changes.is_done {
                active.is_done = Set(is_done);
            }
        })
        .await
    }

    pub async fn delete_todo(&self, id: &Uuid) -> DaoResult<Uuid> {
        self.delete(*id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::entities::todo;

    use super::{TodoChanges, TodoDao};
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn todo_model(owner: Uuid, content: &str, offset_secs: i64) -> todo::Model {
        let at = ts() + Duration::seconds(offset_secs);
        todo::Model {
            id: Uuid::new_v4(),
            created_at: at,
            updated_at: at,
            content: content.to_string(),
            is_done: false,
            owner,
        }
    }

    #[tokio::test]
    async fn list_for_owner_returns_rows_in_query_order() {
        let owner = Uuid::new_v4();
        let rows = vec![
            todo_model(owner, "buy milk", 0),
            todo_model(owner, "walk dog", 5),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows.clone()])
            .into_connection();
        let dao = TodoDao::new(&db);

        let listed = dao
            .list_for_owner(&owner)
            .await
            .expect("query should succeed");
        assert_eq!(listed, rows);
    }

    #[tokio::test]
    async fn find_for_owner_returns_none_for_foreign_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<todo::Model>::new()])
            .into_connection();
        let dao = TodoDao::new(&db);

        let found = dao
            .find_for_owner(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .expect("query should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_todo_applies_changes() {
        let owner = Uuid::new_v4();
        let before = todo_model(owner, "buy milk", 0);
        let mut after = before.clone();
        after.is_done = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[before.clone()], [after.clone()]])
            .into_connection();
        let dao = TodoDao::new(&db);

        let updated = dao
            .update_todo(
                &before.id,
                TodoChanges {
                    is_done: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("update should succeed");
        assert!(updated.is_done);
        assert_eq!(updated.content, "buy milk");
    }

    #[tokio::test]
    async fn delete_todo_reports_missing_rows() {
        let missing = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao.delete_todo(&missing).await.expect_err("should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { entity: "todo", id } if id == missing
        ));
    }

    #[tokio::test]
    async fn create_todo_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();
        let dao = TodoDao::new(&db);

        let err = dao
            .create_todo(&Uuid::new_v4(), "buy milk", false)
            .await
            .expect_err("insert should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
