use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseErrorKind {
    /// Pool could not connect or acquire a connection
    Connection { message: String },
    /// Statement failed at the database
    Query { message: String },
    /// REST endpoint answered with a non-success status
    Rest { status: u16, message: String },
    /// Row or payload could not be decoded
    Decode { message: String },
    Unknown { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    pub kind: DatabaseErrorKind,
}

impl DatabaseError {
    pub fn new(kind: DatabaseErrorKind) -> Self {
        Self { kind }
    }

    pub fn from_sqlx(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseErrorKind::Connection {
                    message: err.to_string(),
                }
            }
            sqlx::Error::Database(db) => DatabaseErrorKind::Query {
                message: db.message().to_string(),
            },
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseErrorKind::Decode {
                    message: err.to_string(),
                }
            }
            _ => DatabaseErrorKind::Unknown {
                message: err.to_string(),
            },
        };
        Self { kind }
    }

    /// The store's own message, without kind prefix
    pub fn message(&self) -> &str {
        match &self.kind {
            DatabaseErrorKind::Connection { message }
            | DatabaseErrorKind::Query { message }
            | DatabaseErrorKind::Rest { message, .. }
            | DatabaseErrorKind::Decode { message }
            | DatabaseErrorKind::Unknown { message } => message,
        }
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DatabaseErrorKind::Connection { message } => {
                write!(f, "database connection error: {}", message)
            }
            DatabaseErrorKind::Query { message } => write!(f, "database query error: {}", message),
            DatabaseErrorKind::Rest { status, message } => {
                write!(f, "store returned HTTP {}: {}", status, message)
            }
            DatabaseErrorKind::Decode { message } => write!(f, "row decode error: {}", message),
            DatabaseErrorKind::Unknown { message } => write!(f, "database error: {}", message),
        }
    }
}

impl std::error::Error for DatabaseError {}
