//! Result parser: decodes the RESULT body kinds (Void, Rows, SetKeyspace,
//! Prepared, SchemaChange) using the typed value codec and row metadata.
use bytes::{Buf, Bytes};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::opcode::result_kind;
use crate::primitive;
use crate::statement::PreparedStatement;
use crate::value::{self, ColumnType, Value};

const GLOBAL_TABLE_SPEC: i32 = 0x0001;

/// One column's identity and type, as carried in [`RowsMetadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub keyspace: String,
    pub table: String,
    pub name: String,
    pub column_type: ColumnType,
}

/// Row metadata shared by every row (or bind parameter) in a Rows/Prepared
/// result.
#[derive(Debug, Clone)]
pub struct RowsMetadata {
    pub flags: i32,
    pub global_keyspace: Option<String>,
    pub global_table: Option<String>,
    pub columns: Vec<ColumnSpec>,
}

/// One decoded row: a mapping from column name (in metadata order) to its
/// decoded value.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.values
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.values.into_iter().collect()
    }
}

/// The decoded payload of a RESULT frame, one variant per RESULT kind.
#[derive(Debug)]
pub enum ResultPayload {
    Void,
    Rows { metadata: RowsMetadata, rows: Vec<Row> },
    SetKeyspace(String),
    Prepared(PreparedStatement),
    SchemaChange { change: String, keyspace: String, table: String },
}

/// Parse a RESULT frame body: a 4-byte `kind`, then a kind-specific payload.
pub fn parse(mut body: Bytes) -> Result<ResultPayload> {
    let kind = primitive::get_int(&mut body)?;
    Ok(match kind {
        result_kind::VOID => ResultPayload::Void,
        result_kind::ROWS => {
            let metadata = parse_rows_metadata(&mut body)?;
            let row_count = primitive::get_int(&mut body)?;
            let mut rows = Vec::with_capacity(row_count.max(0) as usize);
            for _ in 0..row_count {
                let mut values = Vec::with_capacity(metadata.columns.len());
                for column in &metadata.columns {
                    let content = primitive::get_bytes(&mut body)?;
                    let decoded = value::decode(content.as_deref(), &column.column_type)?;
                    values.push((column.name.clone(), decoded));
                }
                rows.push(Row { values });
            }
            ResultPayload::Rows { metadata, rows }
        }
        result_kind::SET_KEYSPACE => ResultPayload::SetKeyspace(primitive::get_utf8_string(&mut body)?),
        result_kind::PREPARED => {
            let id = primitive::get_string(&mut body)?
                .ok_or_else(|| Error::Protocol("Prepared result missing statement id".into()))?;
            let metadata = parse_rows_metadata(&mut body)?;
            ResultPayload::Prepared(PreparedStatement::new(id.to_vec(), metadata.columns))
        }
        result_kind::SCHEMA_CHANGE => ResultPayload::SchemaChange {
            change: primitive::get_utf8_string(&mut body)?,
            keyspace: primitive::get_utf8_string(&mut body)?,
            table: primitive::get_utf8_string(&mut body)?,
        },
        other => return Err(Error::Protocol(format!("unknown RESULT kind 0x{other:08x}"))),
    })
}

/// `int flags`, `int columns_count`, optional global keyspace/table when the
/// `GlobalTableSpec` bit is set, then per-column specs.
fn parse_rows_metadata(body: &mut Bytes) -> Result<RowsMetadata> {
    let flags = primitive::get_int(body)?;
    let columns_count = primitive::get_int(body)?;

    let is_global = flags & GLOBAL_TABLE_SPEC != 0;
    let (global_keyspace, global_table) = if is_global {
        (Some(primitive::get_utf8_string(body)?), Some(primitive::get_utf8_string(body)?))
    } else {
        (None, None)
    };

    let mut columns = Vec::with_capacity(columns_count.max(0) as usize);
    for _ in 0..columns_count {
        let (keyspace, table) = if is_global {
            (global_keyspace.clone().unwrap_or_default(), global_table.clone().unwrap_or_default())
        } else {
            (primitive::get_utf8_string(body)?, primitive::get_utf8_string(body)?)
        };
        let name = primitive::get_utf8_string(body)?;
        let column_type = value::parse_type(body)?;
        columns.push(ColumnSpec { keyspace, table, name, column_type });
    }

    Ok(RowsMetadata { flags, global_keyspace, global_table, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn void_body() -> Bytes {
        let mut buf = BytesMut::new();
        primitive::put_int(&mut buf, result_kind::VOID);
        buf.freeze()
    }

    #[test]
    fn void_result() {
        match parse(void_body()).unwrap() {
            ResultPayload::Void => {}
            other => panic!("expected Void, got {other:?}"),
        }
    }

    #[test]
    fn set_keyspace_result() {
        let mut buf = BytesMut::new();
        primitive::put_int(&mut buf, result_kind::SET_KEYSPACE);
        primitive::put_string(&mut buf, b"demo");

        match parse(buf.freeze()).unwrap() {
            ResultPayload::SetKeyspace(name) => assert_eq!(name, "demo"),
            other => panic!("expected SetKeyspace, got {other:?}"),
        }
    }

    #[test]
    fn rows_result_with_global_table_spec() {
        let mut buf = BytesMut::new();
        primitive::put_int(&mut buf, result_kind::ROWS);
        primitive::put_int(&mut buf, 0x0001); // flags: global table spec
        primitive::put_int(&mut buf, 1); // columns_count
        primitive::put_string(&mut buf, b"ks");
        primitive::put_string(&mut buf, b"tbl");
        primitive::put_string(&mut buf, b"id");
        primitive::put_short(&mut buf, 0x0009); // Int
        primitive::put_int(&mut buf, 1); // row_count
        primitive::put_bytes(&mut buf, Some(&42i32.to_be_bytes()));

        match parse(buf.freeze()).unwrap() {
            ResultPayload::Rows { metadata, rows } => {
                assert_eq!(metadata.columns.len(), 1);
                assert_eq!(metadata.global_keyspace.as_deref(), Some("ks"));
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].get("id"), Some(&Value::Int(42)));
            }
            other => panic!("expected Rows, got {other:?}"),
        }
    }

    #[test]
    fn schema_change_result() {
        let mut buf = BytesMut::new();
        primitive::put_int(&mut buf, result_kind::SCHEMA_CHANGE);
        primitive::put_string(&mut buf, b"CREATED");
        primitive::put_string(&mut buf, b"demo");
        primitive::put_string(&mut buf, b"users");

        match parse(buf.freeze()).unwrap() {
            ResultPayload::SchemaChange { change, keyspace, table } => {
                assert_eq!(change, "CREATED");
                assert_eq!(keyspace, "demo");
                assert_eq!(table, "users");
            }
            other => panic!("expected SchemaChange, got {other:?}"),
        }
    }
}
