//! `cassette`: a blocking, single-connection client for the CQL binary
//! protocol (the wire protocol Cassandra and its descendants speak).
//!
//! This crate covers the protocol core only: binary primitive framing, the
//! typed value codec, frame assembly, the connect/auth/query state machine,
//! and the result parser. It deliberately does not attempt connection
//! pooling, cluster topology awareness, token-aware routing, compression,
//! TLS, or multiplexed/asynchronous requests.
//!
//! ```no_run
//! use cassette::{Config, Consistency, Session};
//!
//! # fn main() -> cassette::Result<()> {
//! let config = Config::new("127.0.0.1").port(9042).keyspace("demo");
//! let mut session = Session::connect(&config)?;
//! let result = session.query("SELECT * FROM users", Consistency::One)?;
//! println!("{result:?}");
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod opcode;
pub mod primitive;
pub mod result;
pub mod session;
pub mod statement;
pub mod value;

pub use config::Config;
pub use error::{Error, Result};
pub use frame::Frame;
pub use opcode::Consistency;
pub use result::{ColumnSpec, ResultPayload, Row, RowsMetadata};
pub use session::Session;
pub use statement::PreparedStatement;
pub use value::{ColumnType, Value};
