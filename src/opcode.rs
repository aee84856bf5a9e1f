//! Opcode and consistency level constants.
//!
//! Numeric identities are fixed by the wire protocol; see
//! <https://github.com/apache/cassandra/blob/trunk/doc/native_protocol_v1.spec>.

/// CQL frame opcode.
pub type Opcode = u8;

pub const ERROR: Opcode = 0x00;
pub const STARTUP: Opcode = 0x01;
pub const READY: Opcode = 0x02;
pub const AUTHENTICATE: Opcode = 0x03;
pub const CREDENTIALS: Opcode = 0x04;
pub const OPTIONS: Opcode = 0x05;
pub const SUPPORTED: Opcode = 0x06;
pub const QUERY: Opcode = 0x07;
pub const RESULT: Opcode = 0x08;
pub const PREPARE: Opcode = 0x09;
pub const EXECUTE: Opcode = 0x0A;
pub const REGISTER: Opcode = 0x0B;
pub const EVENT: Opcode = 0x0C;
pub const BATCH: Opcode = 0x0D;
pub const AUTH_CHALLENGE: Opcode = 0x0E;
pub const AUTH_RESPONSE: Opcode = 0x0F;
pub const AUTH_SUCCESS: Opcode = 0x10;

/// Request/response direction bit of the frame version byte.
pub const VERSION_REQUEST: u8 = 0x01;
pub const VERSION_RESPONSE_MASK: u8 = 0x80;

/// RESULT body kind discriminants.
pub mod result_kind {
    pub const VOID: i32 = 0x01;
    pub const ROWS: i32 = 0x02;
    pub const SET_KEYSPACE: i32 = 0x03;
    pub const PREPARED: i32 = 0x04;
    pub const SCHEMA_CHANGE: i32 = 0x05;
}

/// Replica-count consistency level for a read/write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Consistency {
    Any = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Quorum = 4,
    All = 5,
    LocalQuorum = 6,
    EachQuorum = 7,
    LocalOne = 10,
}

impl Consistency {
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        Some(match value {
            0 => Self::Any,
            1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            4 => Self::Quorum,
            5 => Self::All,
            6 => Self::LocalQuorum,
            7 => Self::EachQuorum,
            10 => Self::LocalOne,
            _ => return None,
        })
    }
}
