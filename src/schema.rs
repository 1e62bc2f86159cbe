//! Declarative description of the `Todo` record type: its fields, who may touch a
//! row, and how API input is normalized before it reaches the database.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{db::dao::todo_dao::TodoChanges, db::entities::todo, error::AppError};

pub const TODO_MODEL: &str = "Todo";

/// How a data request proves who it is acting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationMode {
    /// Signed-in account; the bearer access token carries the identity.
    UserPool,
}

impl AuthorizationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationMode::UserPool => "user_pool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Id,
    String,
    Boolean,
    DateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Assigned by the server; clients never send it.
    #[serde(default)]
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "allow", rename_all = "snake_case")]
pub enum AuthRule {
    /// Only the account stored in `field` may read or write the row.
    Owner { field: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub authorization: Vec<AuthRule>,
}

fn field(name: &str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec {
        name: name.to_string(),
        kind,
        required,
        default: None,
        read_only: false,
    }
}

fn system_field(name: &str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        read_only: true,
        ..field(name, kind, true)
    }
}

pub fn todo_model() -> ModelSpec {
    ModelSpec {
        name: TODO_MODEL.to_string(),
        fields: vec![
            system_field("id", FieldKind::Id),
            field("content", FieldKind::String, true),
            FieldSpec {
                default: Some(Value::Bool(false)),
                ..field("is_done", FieldKind::Boolean, false)
            },
            system_field("owner", FieldKind::Id),
            system_field("created_at", FieldKind::DateTime),
            system_field("updated_at", FieldKind::DateTime),
        ],
        authorization: vec![AuthRule::Owner {
            field: "owner".to_string(),
        }],
    }
}

/// Every record type the data service exposes.
pub fn models() -> Vec<ModelSpec> {
    vec![todo_model()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub content: String,
    pub is_done: bool,
    pub owner: Uuid,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<todo::Model> for TodoItem {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            is_done: model.is_done,
            owner: model.owner,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodo {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

impl CreateTodo {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_done: Some(false),
        }
    }

    /// Trimmed content and the `is_done` default applied.
    pub fn normalize(self) -> Result<(String, bool), AppError> {
        let content = required_content(&self.content)?;
        Ok((content, self.is_done.unwrap_or(false)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

impl UpdateTodo {
    pub fn normalize(self) -> Result<TodoChanges, AppError> {
        if self.content.is_none() && self.is_done.is_none() {
            return Err(AppError::bad_request("Nothing to update"));
        }
        let content = self
            .content
            .as_deref()
            .map(required_content)
            .transpose()?;
        Ok(TodoChanges {
            content,
            is_done: self.is_done,
        })
    }
}

fn required_content(raw: &str) -> Result<String, AppError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("content is required"));
    }
    Ok(content.to_string())
}
