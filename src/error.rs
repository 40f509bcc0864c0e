use std::fmt;
use std::io;
use std::str::Utf8Error;

/// Status codes reported across the boundary.
///
/// The numbering follows the engine's own taxonomy (absl style), so a code
/// produced by the engine reaches the caller unchanged. `Ok` is always 0.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl StatusCode {
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn from_raw(raw: i32) -> Option<Self> {
        let code = match raw {
            0 => StatusCode::Ok,
            1 => StatusCode::Cancelled,
            2 => StatusCode::Unknown,
            3 => StatusCode::InvalidArgument,
            4 => StatusCode::DeadlineExceeded,
            5 => StatusCode::NotFound,
            6 => StatusCode::AlreadyExists,
            7 => StatusCode::PermissionDenied,
            8 => StatusCode::ResourceExhausted,
            9 => StatusCode::FailedPrecondition,
            10 => StatusCode::Aborted,
            11 => StatusCode::OutOfRange,
            12 => StatusCode::Unimplemented,
            13 => StatusCode::Internal,
            14 => StatusCode::Unavailable,
            15 => StatusCode::DataLoss,
            16 => StatusCode::Unauthenticated,
            _ => return None,
        };
        Some(code)
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

/// A failure reported by the tokenizer engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    code: StatusCode,
    message: String,
}

impl EngineError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StatusCode::InvalidArgument, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FailedPrecondition, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OutOfRange, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Internal, message)
    }

    pub fn data_loss(message: impl Into<String>) -> Self {
        Self::new(StatusCode::DataLoss, message)
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Errors surfaced by the safe Rust API of [`crate::processor::Processor`].
#[derive(Debug)]
pub enum ProcessorError {
    Io(io::Error),
    Engine(EngineError),
    Config(String),
    Utf8(Utf8Error),
}

impl ProcessorError {
    /// The status code this error maps to at the C boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            ProcessorError::Io(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NotFound,
            ProcessorError::Io(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                StatusCode::PermissionDenied
            }
            ProcessorError::Io(_) => StatusCode::Internal,
            ProcessorError::Engine(e) => e.code(),
            ProcessorError::Config(_) => StatusCode::InvalidArgument,
            ProcessorError::Utf8(_) => StatusCode::DataLoss,
        }
    }
}

impl fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessorError::Io(e) => write!(f, "IO error: {}", e),
            ProcessorError::Engine(e) => write!(f, "Engine error: {}", e),
            ProcessorError::Config(msg) => write!(f, "Config error: {}", msg),
            ProcessorError::Utf8(e) => write!(f, "UTF-8 error: {}", e),
        }
    }
}

impl std::error::Error for ProcessorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessorError::Io(e) => Some(e),
            ProcessorError::Engine(e) => Some(e),
            ProcessorError::Config(_) => None,
            ProcessorError::Utf8(e) => Some(e),
        }
    }
}

impl From<io::Error> for ProcessorError {
    fn from(err: io::Error) -> Self {
        ProcessorError::Io(err)
    }
}

impl From<EngineError> for ProcessorError {
    fn from(err: EngineError) -> Self {
        ProcessorError::Engine(err)
    }
}

impl From<Utf8Error> for ProcessorError {
    fn from(err: Utf8Error) -> Self {
        ProcessorError::Utf8(err)
    }
}
