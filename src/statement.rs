//! Prepared statements: an opaque server-assigned id plus the ordered
//! column specs carried forward from PREPARE into EXECUTE.
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::result::ColumnSpec;
use crate::value::{self, Value};

/// A server-held parse of a CQL query, referenced by opaque id, with a
/// fixed bind schema.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    id: Vec<u8>,
    columns: Vec<ColumnSpec>,
}

impl PreparedStatement {
    pub(crate) fn new(id: Vec<u8>, columns: Vec<ColumnSpec>) -> Self {
        Self { id, columns }
    }

    /// The opaque server-assigned statement id.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// The ordered bind-parameter column specs.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Pack `values` (keyed by column name) into the wire-order sequence of
    /// `[long string] pack_value(...)` payloads EXECUTE needs, iterating
    /// this statement's column order and looking up each name.
    ///
    /// Duplicate names in `values` collapse to the last-inserted entry
    /// before this lookup ever runs, since the input is a
    /// `HashMap<String, Value>` (see DESIGN.md for the rationale).
    pub(crate) fn pack_bind_values(&self, values: &HashMap<String, Value>) -> Result<Vec<Option<Vec<u8>>>> {
        self.columns
            .iter()
            .map(|column| {
                let value = values
                    .get(&column.name)
                    .ok_or_else(|| Error::MissingBindValue(column.name.clone()))?;
                value::encode(value, &column.column_type)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ColumnType;

    fn statement() -> PreparedStatement {
        PreparedStatement::new(
            vec![0xAB, 0xCD],
            vec![
                ColumnSpec { keyspace: "ks".into(), table: "t".into(), name: "id".into(), column_type: ColumnType::Int },
                ColumnSpec { keyspace: "ks".into(), table: "t".into(), name: "name".into(), column_type: ColumnType::Text },
            ],
        )
    }

    #[test]
    fn missing_bind_value_fails() {
        let stmt = statement();
        let values = HashMap::from([("id".to_string(), Value::Int(1))]);
        let err = stmt.pack_bind_values(&values).unwrap_err();
        assert!(matches!(err, Error::MissingBindValue(name) if name == "name"));
    }

    #[test]
    fn pack_follows_declared_column_order() {
        let stmt = statement();
        let values = HashMap::from([
            ("name".to_string(), Value::Text("alice".into())),
            ("id".to_string(), Value::Int(7)),
        ]);
        let packed = stmt.pack_bind_values(&values).unwrap();
        assert_eq!(packed[0], Some(7i32.to_be_bytes().to_vec()));
        assert_eq!(packed[1], Some(b"alice".to_vec()));
    }
}
