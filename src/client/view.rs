use uuid::Uuid;

use crate::schema::{CreateTodo, TodoItem};

use super::{AuthSession, ClientError, TodoClient};

pub fn heading(login_id: &str) -> String {
    format!("{login_id}'s Todos")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootScreen {
    SignIn,
    Todos { heading: String },
}

/// Shows the to-do screen only while the session has a signed-in user.
pub struct RootView<S> {
    session: S,
}

impl<S: AuthSession> RootView<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub async fn render(&self) -> RootScreen {
        match self.session.current_user().await {
            Ok(user) => RootScreen::Todos {
                heading: heading(&user.email),
            },
            Err(ClientError::NotSignedIn) => RootScreen::SignIn,
            Err(err) => {
                tracing::warn!(error = %err, "could not load the current user");
                RootScreen::SignIn
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        self.session.sign_out(false).await
    }
}

/// Local copy of the account's items plus the pending input text.
///
/// Remote failures are logged and leave the view exactly as it was; nothing is retried.
pub struct TodoListView<C> {
    client: C,
    items: Vec<TodoItem>,
    input: String,
}

impl<C: TodoClient> TodoListView<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            items: Vec::new(),
            input: String::new(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<TodoItem> {
        self.items
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Replaces the list with the server's, in the order returned.
    pub async fn fetch(&mut self) {
        match self.client.list().await {
            Ok(items) => self.items = items,
            Err(err) => tracing::error!(error = %err, "error fetching todos"),
        }
    }

    pub async fn create(&mut self) {
        let content = self.input.trim();
        if content.is_empty() {
            return;
        }

        match self.client.create(&CreateTodo::new(content)).await {
            Ok(item) => {
                self.items.push(item);
                self.input.clear();
            }
            Err(err) => tracing::error!(error = %err, "error creating todo"),
        }
    }

    pub async fn delete(&mut self, id: &Uuid) {
        match self.client.delete(id).await {
            Ok(_) => self.items.retain(|item| item.id != *id),
            Err(err) => tracing::error!(error = %err, %id, "error deleting todo"),
        }
    }
}
