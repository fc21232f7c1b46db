use thiserror::Error;

/// Single data-access error class for the store. Failures from the relational
/// engine propagate unchanged, annotated with the repository operation that
/// issued the statement.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{op}: {source}")]
    Query {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{op}: malformed {column} value {value:?}")]
    Decode {
        op: &'static str,
        column: &'static str,
        value: String,
    },
}

impl StoreError {
    pub(crate) fn query(op: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError::Query { op, source }
    }

    pub(crate) fn decode(op: &'static str, column: &'static str, value: &str) -> StoreError {
        StoreError::Decode {
            op,
            column,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
