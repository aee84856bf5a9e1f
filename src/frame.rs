//! Frame layer: assembles and parses the fixed 8-byte header followed by
//! body, exchanging exactly one frame in, one frame out per call.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::opcode;
use crate::primitive;

const HEADER_LEN: usize = 8;

/// A single protocol message: opcode plus body bytes.
#[derive(Debug)]
pub struct Frame {
    pub opcode: u8,
    pub body: Bytes,
}

/// Serialize `opcode`/`body` as `version(1)=0x01, flags(1)=0x00,
/// stream(1)=0x00, opcode(1), length(4 BE), body` and write the whole
/// buffer to `io`. A short write surfaces as [`Error::Io`].
pub fn write_frame(io: &mut impl Write, opcode: u8, body: &[u8]) -> Result<()> {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
    buf.put_u8(opcode::VERSION_REQUEST);
    buf.put_u8(0x00); // flags
    buf.put_u8(0x00); // stream
    buf.put_u8(opcode);
    buf.put_i32(body.len() as i32);
    buf.put_slice(body);

    io.write_all(&buf)?;
    Ok(())
}

/// Read exactly one frame: the 8-byte header (looping until complete) then
/// exactly `length` body bytes.
///
/// If the opcode is `ERROR`, the body is parsed as `int code` followed by
/// `[string] message` and surfaced as [`Error::ServerError`] instead of a
/// frame.
pub fn read_frame(io: &mut impl Read) -> Result<Frame> {
    let mut header = [0u8; HEADER_LEN];
    io.read_exact(&mut header)?;

    let opcode = header[3];
    let length = i32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    if length < 0 {
        return Err(Error::Protocol(format!("negative frame length {length}")));
    }

    let mut body = vec![0u8; length as usize];
    io.read_exact(&mut body)?;
    let mut body = Bytes::from(body);

    if opcode == opcode::ERROR {
        let code = primitive::get_int(&mut body)?;
        let message = primitive::get_utf8_string(&mut body)?;
        return Err(Error::ServerError { code, message });
    }

    Ok(Frame { opcode, body })
}
