use std::{error::Error, fmt, sync::Arc};

use crate::driver::DriverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    UnknownSerializer,
    UnknownKeyspace,
    UnknownColumnFamily,
    InvalidComposite,
    StorageUnavailable,
    NotFound,
    InvalidArgument,
    Corruption,
}

/// Error returned by every persistence operation.
///
/// Programmer errors (unknown serializer, keyspace or column family) and
/// malformed input are reported before the driver is contacted. Failures
/// coming back from the driver keep the original error as `source()`.
#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: Option<String>,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl Status {
    fn with_code(code: Code, msg: impl Into<String>) -> Self {
        Status {
            code,
            message: Some(msg.into()),
            source: None,
        }
    }

    pub fn unknown_serializer(msg: impl Into<String>) -> Self {
        Self::with_code(Code::UnknownSerializer, msg)
    }

    pub fn unknown_keyspace(msg: impl Into<String>) -> Self {
        Self::with_code(Code::UnknownKeyspace, msg)
    }

    pub fn unknown_column_family(msg: impl Into<String>) -> Self {
        Self::with_code(Code::UnknownColumnFamily, msg)
    }

    pub fn invalid_composite(msg: impl Into<String>) -> Self {
        Self::with_code(Code::InvalidComposite, msg)
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Self::with_code(Code::StorageUnavailable, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::with_code(Code::NotFound, msg)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::with_code(Code::InvalidArgument, msg)
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::with_code(Code::Corruption, msg)
    }

    /// Attach the underlying cause.
    pub fn caused_by(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(cause));
        self
    }

    pub fn is_unknown_serializer(&self) -> bool {
        self.code == Code::UnknownSerializer
    }

    pub fn is_unknown_keyspace(&self) -> bool {
        self.code == Code::UnknownKeyspace
    }

    pub fn is_unknown_column_family(&self) -> bool {
        self.code == Code::UnknownColumnFamily
    }

    pub fn is_invalid_composite(&self) -> bool {
        self.code == Code::InvalidComposite
    }

    pub fn is_storage_unavailable(&self) -> bool {
        self.code == Code::StorageUnavailable
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg)?,
            None => write!(f, "{:?}", self.code)?,
        }
        if let Some(cause) = &self.source {
            write!(f, " (caused by: {cause})")?;
        }
        Ok(())
    }
}

impl Error for Status {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|cause| cause.as_ref() as &(dyn Error + 'static))
    }
}

impl From<DriverError> for Status {
    fn from(err: DriverError) -> Self {
        let status = match &err {
            DriverError::Transport(_) | DriverError::Timeout(_) => {
                Status::storage_unavailable("store driver call failed")
            },
            DriverError::NotFound(_) => Status::not_found("store driver found no value"),
            DriverError::InvalidRequest(_) => {
                Status::invalid_argument("store driver rejected the request")
            },
        };
        status.caused_by(err)
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::invalid_argument("malformed configuration").caused_by(err)
    }
}

pub type Result<T> = std::result::Result<T, Status>;
