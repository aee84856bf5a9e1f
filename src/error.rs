//! `cassette` error types.

/// A specialized [`Result`] type for `cassette` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All possible errors from the `cassette` driver core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DNS failure, socket create/connect failure, read/write failure, or a
    /// truncated frame.
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected opcode, unknown RESULT kind, unknown column type, or a
    /// malformed length prefix.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An ERROR opcode frame sent by the server.
    #[error("server error {code}: {message}")]
    ServerError {
        /// Server-defined error code.
        code: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Authentication was requested but no usable credentials were
    /// configured, or the server rejected them.
    #[error("authentication error: {0}")]
    Auth(String),

    /// `execute` was called without a value for one of the prepared
    /// statement's bind columns.
    #[error("missing bind value for column {0:?}")]
    MissingBindValue(String),

    /// A value could not be encoded for its declared column type: the
    /// `Value` variant does not match the `ColumnType`, or a string literal
    /// (hex blob, UUID) failed to parse.
    #[error("bind error: {0}")]
    Bind(String),

    /// A `ColumnType` tag has no known encode/decode handler.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The session was already closed (by `close()` or by a previous
    /// unrecoverable error) and cannot be used for further requests.
    #[error("session is closed")]
    Closed,
}
