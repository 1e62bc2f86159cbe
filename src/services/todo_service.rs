use uuid::Uuid;

use crate::{
    db::dao::TodoDao,
    db::entities::todo,
    error::AppError,
    schema::{CreateTodo, TodoItem, UpdateTodo},
    services::crud_service::{CrudErrors, CrudOp, map_dao_error},
};

const TODO_ERRORS: CrudErrors = CrudErrors {
    create_failed: "Failed to create todo",
    find_failed: "Failed to load todos",
    not_found: "Todo not found",
    update_failed: "Failed to update todo",
    delete_failed: "Failed to delete todo",
};

/// Todo operations on behalf of one account. Rows owned by anyone else behave as missing.
#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn list(&self, owner: &Uuid) -> Result<Vec<TodoItem>, AppError> {
        let rows = self
            .todo_dao
            .list_for_owner(owner)
            .await
            .map_err(|err| map_dao_error(&TODO_ERRORS, CrudOp::List, err))?;
        Ok(rows.into_iter().map(TodoItem::from).collect())
    }

    pub async fn get(&self, owner: &Uuid, id: &Uuid) -> Result<TodoItem, AppError> {
        self.require_owned(owner, id).await.map(TodoItem::from)
    }

    pub async fn create(&self, owner: &Uuid, input: CreateTodo) -> Result<TodoItem, AppError> {
        let (content, is_done) = input.normalize()?;
        let row = self
            .todo_dao
            .create_todo(owner, &content, is_done)
            .await
            .map_err(|err| map_dao_error(&TODO_ERRORS, CrudOp::Create, err))?;
        tracing::debug!(todo_id = %row.id, %owner, "todo created");
        Ok(row.into())
    }

    pub async fn update(
        &self,
        owner: &Uuid,
        id: &Uuid,
        input: UpdateTodo,
    ) -> Result<TodoItem, AppError> {
        let changes = input.normalize()?;
        self.require_owned(owner, id).await?;
        let row = self
            .todo_dao
            .update_todo(id, changes)
            .await
            .map_err(|err| map_dao_error(&TODO_ERRORS, CrudOp::Update, err))?;
        Ok(row.into())
    }

    /// Removes the row and hands back what was deleted.
    pub async fn delete(&self, owner: &Uuid, id: &Uuid) -> Result<TodoItem, AppError> {
        let row = self.require_owned(owner, id).await?;
        self.todo_dao
            .delete_todo(id)
            .await
            .map_err(|err| map_dao_error(&TODO_ERRORS, CrudOp::Delete, err))?;
        tracing::debug!(todo_id = %row.id, %owner, "todo deleted");
        Ok(row.into())
    }

    async fn require_owned(&self, owner: &Uuid, id: &Uuid) -> Result<todo::Model, AppError> {
        self.todo_dao
            .find_for_owner(owner, id)
            .await
            .map_err(|err| map_dao_error(&TODO_ERRORS, CrudOp::Find, err))?
            .ok_or_else(|| AppError::not_found(TODO_ERRORS.not_found))
    }
}
