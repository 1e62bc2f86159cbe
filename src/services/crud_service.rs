use crate::{db::dao::DaoLayerError, error::AppError};

/// Client-facing messages for each kind of CRUD failure on one resource.
#[derive(Clone, Copy)]
pub struct CrudErrors {
    pub create_failed: &'static str,
    pub find_failed: &'static str,
    pub not_found: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
}

impl Default for CrudErrors {
    fn default() -> Self {
        Self {
            create_failed: "Create failed",
            find_failed: "Find failed",
            not_found: "Resource not found",
            update_failed: "Update failed",
            delete_failed: "Delete failed",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum CrudOp {
    Create,
    Find,
    List,
    Update,
    Delete,
}

impl CrudOp {
    fn as_str(self) -> &'static str {
        match self {
            CrudOp::Create => "create",
            CrudOp::Find => "find",
            CrudOp::List => "list",
            CrudOp::Update => "update",
            CrudOp::Delete => "delete",
        }
    }
}

/// Database details go to the log; the caller only sees the per-operation message.
pub fn map_dao_error(errors: &CrudErrors, op: CrudOp, err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::Db(db_err) => {
            let context = match op {
                CrudOp::Create => errors.create_failed,
                CrudOp::Find | CrudOp::List => errors.find_failed,
                CrudOp::Update => errors.update_failed,
                CrudOp::Delete => errors.delete_failed,
            };
            tracing::error!(op = op.as_str(), error = %db_err, "{context}");
            AppError::internal(format!("{context}. Please check the logs for more details"))
        }
        DaoLayerError::NotFound { .. } => AppError::not_found(errors.not_found),
        DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use sea_orm::DbErr;
    use uuid::Uuid;

    use super::{CrudErrors, CrudOp, map_dao_error};
    use crate::db::dao::DaoLayerError;

    #[test]
    fn database_errors_hide_details() {
        let err = map_dao_error(
            &CrudErrors::default(),
            CrudOp::Update,
            DaoLayerError::Db(DbErr::Custom("connection reset".to_string())),
        );

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.message(),
            "Update failed. Please check the logs for more details"
        );
    }

    #[test]
    fn not_found_uses_resource_message() {
        let errors = CrudErrors {
            not_found: "Todo not found",
            ..CrudErrors::default()
        };
        let err = map_dao_error(
            &errors,
            CrudOp::Find,
            DaoLayerError::NotFound {
                entity: "todo",
                id: Uuid::new_v4(),
            },
        );

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Todo not found");
    }
}
