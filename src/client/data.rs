use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    outputs::ClientOutputs,
    schema::{CreateTodo, TodoItem, UpdateTodo},
};

use super::{AuthClient, ClientError, read_envelope};

/// Data operations on the signed-in account's `Todo` records.
#[async_trait]
pub trait TodoClient: Send + Sync {
    async fn list(&self) -> Result<Vec<TodoItem>, ClientError>;
    async fn create(&self, input: &CreateTodo) -> Result<TodoItem, ClientError>;
    async fn update(&self, id: &Uuid, input: &UpdateTodo) -> Result<TodoItem, ClientError>;
    async fn delete(&self, id: &Uuid) -> Result<TodoItem, ClientError>;
}

/// `TodoClient` over the HTTP API, authenticated with the shared session.
#[derive(Clone)]
pub struct HttpTodoClient {
    auth: AuthClient,
    todos_url: String,
}

impl HttpTodoClient {
    pub fn new(outputs: &ClientOutputs, auth: AuthClient) -> Self {
        Self {
            todos_url: format!("{}/todos", outputs.api_url()),
            auth,
        }
    }

    fn item_url(&self, id: &Uuid) -> String {
        format!("{}/{id}", self.todos_url)
    }
}

#[async_trait]
impl TodoClient for HttpTodoClient {
    async fn list(&self) -> Result<Vec<TodoItem>, ClientError> {
        let token = self.auth.access_token().await?;
        let response = self
            .auth
            .http()
            .get(&self.todos_url)
            .bearer_auth(token)
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn create(&self, input: &CreateTodo) -> Result<TodoItem, ClientError> {
        let token = self.auth.access_token().await?;
        let response = self
            .auth
            .http()
            .post(&self.todos_url)
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn update(&self, id: &Uuid, input: &UpdateTodo) -> Result<TodoItem, ClientError> {
        let token = self.auth.access_token().await?;
        let response = self
            .auth
            .http()
            .patch(self.item_url(id))
            .bearer_auth(token)
            .json(input)
            .send()
            .await?;
        read_envelope(response).await
    }

    async fn delete(&self, id: &Uuid) -> Result<TodoItem, ClientError> {
        let token = self.auth.access_token().await?;
        let response = self
            .auth
            .http()
            .delete(self.item_url(id))
            .bearer_auth(token)
            .send()
            .await?;
        read_envelope(response).await
    }
}
