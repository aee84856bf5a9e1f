//! Session state machine: connect → STARTUP → (AUTHENTICATE →
//! CREDENTIALS)? → READY → optional USE keyspace, then QUERY / PREPARE /
//! EXECUTE, interpreting RESULT frames.
//!
//! Blocking, single-threaded, single outstanding request: there is no
//! internal thread or event loop, and a `Session` is not safe for
//! concurrent use without external synchronization.
use bytes::BytesMut;
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, TcpStream, ToSocketAddrs};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::frame::{self, Frame};
use crate::opcode::{self, Consistency};
use crate::primitive;
use crate::result::{self, ResultPayload};
use crate::statement::PreparedStatement;
use crate::value::Value;

const CQL_VERSION: &str = "3.0.0";

/// A single connection to a CQL-speaking server.
///
/// Exclusively owns its socket; `close()` is idempotent and tolerates being
/// called after a prior failure.
pub struct Session {
    stream: Option<TcpStream>,
}

impl Session {
    /// Resolve `host` (IP literal used directly, otherwise DNS lookup),
    /// open a TCP stream, and drive the session through STARTUP,
    /// (AUTHENTICATE →) READY, and an optional `USE <keyspace>`.
    ///
    /// Any failure closes the socket and returns a connect failure; the
    /// connect-retry count in `config` wraps the whole handshake with
    /// at-least-one-attempt semantics.
    pub fn connect(config: &Config) -> Result<Session> {
        let mut last_err = None;
        for attempt in 0..config.connect_retries.max(1) {
            match Self::connect_once(config) {
                Ok(session) => return Ok(session),
                Err(err) => {
                    log_warn(&format!("connect attempt {attempt} failed: {err}"));
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.expect("connect_retries is always >= 1"))
    }

    fn connect_once(config: &Config) -> Result<Session> {
        let addr = resolve(&config.host, config.port)?;
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let mut session = Session { stream: Some(stream) };
        if let Err(err) = session.handshake(config) {
            session.close();
            return Err(err);
        }
        Ok(session)
    }

    fn handshake(&mut self, config: &Config) -> Result<()> {
        let mut body = BytesMut::new();
        primitive::put_string_map(&mut body, [("CQL_VERSION", CQL_VERSION)]);
        self.write_frame(opcode::STARTUP, &body)?;

        match self.read_frame()?.opcode {
            opcode::READY => {}
            opcode::AUTHENTICATE => self.authenticate(config)?,
            other => return Err(unexpected_opcode(other, "startup phase")),
        }

        if !config.keyspace.is_empty() {
            let result = self.query_inner(&format!("USE {}", config.keyspace), Consistency::All)?;
            match result {
                ResultPayload::SetKeyspace(name) if name.eq_ignore_ascii_case(&config.keyspace) => {}
                ResultPayload::SetKeyspace(name) => {
                    return Err(Error::Protocol(format!(
                        "USE {} returned mismatched keyspace {name:?}",
                        config.keyspace
                    )));
                }
                other => return Err(Error::Protocol(format!("expected SetKeyspace, got {other:?}"))),
            }
        }

        Ok(())
    }

    fn authenticate(&mut self, config: &Config) -> Result<()> {
        if config.user.is_empty() && config.password.is_empty() {
            return Err(Error::Auth(
                "server requested authentication but no credentials were configured".into(),
            ));
        }

        let mut body = BytesMut::new();
        primitive::put_string_map(&mut body, [
            ("username", config.user.as_str()),
            ("password", config.password.as_str()),
        ]);
        self.write_frame(opcode::CREDENTIALS, &body)?;

        match self.read_frame()?.opcode {
            opcode::READY => Ok(()),
            other => Err(unexpected_opcode(other, "authentication phase")),
        }
    }

    /// `OPTIONS` → `SUPPORTED`: probe server capabilities. SUPPORTED's body
    /// is a `[string multimap]` (each option name maps to a list of
    /// values, e.g. `COMPRESSION` → `["snappy", "lz4"]`), not a
    /// `[string map]`. The returned option table is handed back inert; no
    /// capability is acted on, since that would start edging into the
    /// compression/negotiation Non-goals.
    pub fn options(&mut self) -> Result<Vec<(String, Vec<String>)>> {
        self.write_frame(opcode::OPTIONS, &[])?;
        let frame = self.read_frame()?;
        if frame.opcode != opcode::SUPPORTED {
            return Err(unexpected_opcode(frame.opcode, "options"));
        }
        let mut body = frame.body;
        primitive::get_string_multimap(&mut body)
    }

    /// `QUERY`: body = `[long string] cql` + `[short] consistency`.
    pub fn query(&mut self, cql: &str, consistency: Consistency) -> Result<ResultPayload> {
        self.ensure_open()?;
        self.query_inner(cql, consistency)
    }

    fn query_inner(&mut self, cql: &str, consistency: Consistency) -> Result<ResultPayload> {
        let mut body = BytesMut::new();
        primitive::put_long_string(&mut body, cql.as_bytes());
        primitive::put_short(&mut body, consistency.as_u16());

        self.write_frame(opcode::QUERY, &body)?;
        self.expect_result()
    }

    /// `PREPARE`: body = `[long string] cql`.
    pub fn prepare(&mut self, cql: &str) -> Result<PreparedStatement> {
        self.ensure_open()?;

        let mut body = BytesMut::new();
        primitive::put_long_string(&mut body, cql.as_bytes());
        self.write_frame(opcode::PREPARE, &body)?;

        match self.expect_result()? {
            ResultPayload::Prepared(stmt) => Ok(stmt),
            other => Err(self.fail(Error::Protocol(format!("expected Prepared, got {other:?}")))),
        }
    }

    /// `EXECUTE`: body = `[string] stmt.id` + `[short] count` + for each
    /// expected column (in the order declared by the prepared statement)
    /// `[long string] pack_value(values[name], column.type)`, where a null
    /// bound value writes length `-1` (the same null sentinel `[bytes]`
    /// uses, since `[long string]` shares its four-byte length field and
    /// bind values must be able to encode null), then `[short] consistency`.
    ///
    /// `values` is keyed by column name; a missing key fails with
    /// [`Error::MissingBindValue`].
    pub fn execute(
        &mut self,
        stmt: &PreparedStatement,
        values: &HashMap<String, Value>,
        consistency: Consistency,
    ) -> Result<ResultPayload> {
        self.ensure_open()?;

        let packed = stmt.pack_bind_values(values).map_err(|e| self.fail(e))?;

        let mut body = BytesMut::new();
        primitive::put_string(&mut body, stmt.id());
        primitive::put_short(&mut body, packed.len() as u16);
        for payload in &packed {
            primitive::put_long_string_opt(&mut body, payload.as_deref());
        }
        primitive::put_short(&mut body, consistency.as_u16());

        self.write_frame(opcode::EXECUTE, &body)?;
        self.expect_result()
    }

    /// Idempotent; releases the socket. Safe to call after a prior
    /// failure or a previous `close()`.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn expect_result(&mut self) -> Result<ResultPayload> {
        let frame = self.read_frame()?;
        if frame.opcode != opcode::RESULT {
            return Err(self.fail(unexpected_opcode(frame.opcode, "result")));
        }
        result::parse(frame.body).map_err(|e| self.fail(e))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.stream.is_none() {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn write_frame(&mut self, opcode: u8, body: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::Closed)?;
        match frame::write_frame(stream, opcode, body) {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(err)),
        }
    }

    fn read_frame(&mut self) -> Result<Frame> {
        let stream = self.stream.as_mut().ok_or(Error::Closed)?;
        match frame::read_frame(stream) {
            Ok(frame) => Ok(frame),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// A mid-frame I/O or protocol error closes the socket; subsequent
    /// calls fail fast with [`Error::Closed`].
    fn fail(&mut self, err: Error) -> Error {
        self.close();
        err
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn unexpected_opcode(opcode: u8, phase: &str) -> Error {
    Error::Protocol(format!("unexpected opcode 0x{opcode:02x} in {phase}"))
}

fn resolve(host: &str, port: u16) -> Result<std::net::SocketAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(std::net::SocketAddr::new(ip, port));
    }
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::NotFound, format!("could not resolve {host}"))))
}

fn log_warn(_message: &str) {
    #[cfg(feature = "log")]
    log::warn!("{_message}");
}
