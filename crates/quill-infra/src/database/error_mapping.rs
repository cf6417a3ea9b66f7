//! Translation of SeaORM errors into repository errors.

use sea_orm::{DbErr, SqlErr};

use quill_core::error::RepoError;

pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepoError::UniqueViolation(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            RepoError::ForeignKeyViolation(detail)
        }
        _ => match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
            other => RepoError::Query(other.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rows_map_to_not_found() {
        assert!(matches!(
            map_db_err(DbErr::RecordNotUpdated),
            RepoError::NotFound
        ));
        assert!(matches!(
            map_db_err(DbErr::RecordNotFound("users".into())),
            RepoError::NotFound
        ));
    }

    #[test]
    fn test_other_errors_map_to_query() {
        assert!(matches!(
            map_db_err(DbErr::Custom("boom".into())),
            RepoError::Query(_)
        ));
    }
}
