//! Tagged value model shared with the simulation engine.
//!
//! Grids (`Table`, `Matrix`) are stored row-major and addressed
//! `(column, row)`, the same order the engine uses for its accessors.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValueError, ValueResult};

/// Tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Double,
    Integer,
    Boolean,
    String,
    Xml,
    Map,
    Set,
    Tuple,
    Table,
    Matrix,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Double => "double",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::String => "string",
            ValueType::Xml => "xml",
            ValueType::Map => "map",
            ValueType::Set => "set",
            ValueType::Tuple => "tuple",
            ValueType::Table => "table",
            ValueType::Matrix => "matrix",
        }
    }

    /// Name reported for an optional value; absent values are `none`.
    pub fn name_of(value: Option<&Value>) -> &'static str {
        value.map_or("none", |v| v.value_type().name())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single engine value. The tag is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Double(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
    Xml(String),
    Map(BTreeMap<String, Value>),
    Set(Vec<Value>),
    Tuple(Vec<f64>),
    Table(Table),
    Matrix(Matrix),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Double(_) => ValueType::Double,
            Value::Integer(_) => ValueType::Integer,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Xml(_) => ValueType::Xml,
            Value::Map(_) => ValueType::Map,
            Value::Set(_) => ValueType::Set,
            Value::Tuple(_) => ValueType::Tuple,
            Value::Table(_) => ValueType::Table,
            Value::Matrix(_) => ValueType::Matrix,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Text of a `String` or `Xml` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Xml(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&[Value]> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }

    /// Build a `Map` from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// Fixed `width x height` grid of reals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTable {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl TryFrom<RawTable> for Table {
    type Error = ValueError;

    fn try_from(raw: RawTable) -> ValueResult<Self> {
        Table::from_rows(raw.width, raw.height, raw.data)
    }
}

/// Cell count of a `columns x rows` grid.
///
/// Fails with [`ValueError::Oversized`] when the product does not fit in
/// `usize`; declared shapes come from untrusted input.
pub fn grid_len(what: &'static str, columns: usize, rows: usize) -> ValueResult<usize> {
    columns
        .checked_mul(rows)
        .ok_or(ValueError::Oversized {
            what,
            columns,
            rows,
        })
}

impl Table {
    /// Zero-filled table.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        let len = width
            .checked_mul(height)
            .expect("table cell count overflows usize");
        Self {
            width,
            height,
            data: vec![0.0; len],
        }
    }

    /// Table from row-major data; `data.len()` must equal `width * height`.
    pub fn from_rows(width: usize, height: usize, data: Vec<f64>) -> ValueResult<Self> {
        let expected = grid_len("table", width, height)?;
        if data.len() != expected {
            return Err(ValueError::Dimension {
                what: "table",
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, column: usize, row: usize) -> Option<f64> {
        if column >= self.width || row >= self.height {
            return None;
        }
        Some(self.data[row * self.width + column])
    }

    pub fn set(&mut self, column: usize, row: usize, value: f64) -> ValueResult<()> {
        if column >= self.width || row >= self.height {
            return Err(ValueError::IndexOob {
                what: "table",
                column,
                row,
            });
        }
        self.data[row * self.width + column] = value;
        Ok(())
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Fixed `columns x rows` grid of optional values. An empty cell
/// means nothing was recorded there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    columns: usize,
    rows: usize,
    cells: Vec<Option<Value>>,
}

#[derive(Deserialize)]
struct RawMatrix {
    columns: usize,
    rows: usize,
    cells: Vec<Option<Value>>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = ValueError;

    fn try_from(raw: RawMatrix) -> ValueResult<Self> {
        Matrix::from_cells(raw.columns, raw.rows, raw.cells)
    }
}

impl Matrix {
    /// Matrix with every cell empty.
    ///
    /// # Panics
    ///
    /// Panics if `columns * rows` overflows `usize`.
    pub fn new(columns: usize, rows: usize) -> Self {
        let len = columns
            .checked_mul(rows)
            .expect("matrix cell count overflows usize");
        Self {
            columns,
            rows,
            cells: vec![None; len],
        }
    }

    /// Matrix from row-major cells; `cells.len()` must equal `columns * rows`.
    pub fn from_cells(columns: usize, rows: usize, cells: Vec<Option<Value>>) -> ValueResult<Self> {
        let expected = grid_len("matrix", columns, rows)?;
        if cells.len() != expected {
            return Err(ValueError::Dimension {
                what: "matrix",
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Matrix from whole rows. Every row must hold `columns` cells.
    pub fn from_row_vecs(columns: usize, rows: Vec<Vec<Option<Value>>>) -> ValueResult<Self> {
        let row_count = rows.len();
        let mut cells = Vec::new();
        for row in rows {
            if row.len() != columns {
                return Err(ValueError::Dimension {
                    what: "matrix row",
                    expected: columns,
                    actual: row.len(),
                });
            }
            cells.extend(row);
        }
        Self::from_cells(columns, row_count, cells)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, column: usize, row: usize) -> Option<&Value> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells[row * self.columns + column].as_ref()
    }

    /// Text held at `(column, row)`, if that cell is a string.
    pub fn get_string(&self, column: usize, row: usize) -> Option<&str> {
        self.get(column, row).and_then(Value::as_str)
    }

    pub fn set(&mut self, column: usize, row: usize, value: Option<Value>) -> ValueResult<()> {
        if column >= self.columns || row >= self.rows {
            return Err(ValueError::IndexOob {
                what: "matrix",
                column,
                row,
            });
        }
        self.cells[row * self.columns + column] = value;
        Ok(())
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, column: usize) -> impl Iterator<Item = Option<&Value>> {
        (0..self.rows).map(move |row| self.get(column, row))
    }

    /// Row-major backing cells.
    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rejects_wrong_cell_count() {
        let err = Table::from_rows(3, 2, vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            ValueError::Dimension {
                what: "table",
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn table_addressing_is_column_row() {
        let table = Table::from_rows(3, 2, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]).unwrap();
        assert_eq!(table.get(0, 0), Some(0.0));
        assert_eq!(table.get(2, 0), Some(2.0));
        assert_eq!(table.get(1, 1), Some(11.0));
        assert_eq!(table.get(3, 0), None);
        assert_eq!(table.get(0, 2), None);
    }

    #[test]
    fn table_set_out_of_bounds() {
        let mut table = Table::new(2, 2);
        assert!(table.set(1, 1, 4.0).is_ok());
        assert!(table.set(2, 0, 4.0).is_err());
        assert_eq!(table.get(1, 1), Some(4.0));
    }

    #[test]
    fn matrix_from_rows_checks_width() {
        let rows = vec![
            vec![Some(Value::from("time")), Some(Value::from("x"))],
            vec![Some(Value::from(0.0))],
        ];
        assert!(Matrix::from_row_vecs(2, rows).is_err());
    }

    #[test]
    fn matrix_column_iterates_rows() {
        let matrix = Matrix::from_row_vecs(
            2,
            vec![
                vec![Some(Value::from("time")), Some(Value::from(",a:b.c"))],
                vec![Some(Value::from(0.0)), None],
                vec![Some(Value::from(1.0)), Some(Value::from(4_i64))],
            ],
        )
        .unwrap();

        let column: Vec<_> = matrix.column(1).collect();
        assert_eq!(column.len(), 3);
        assert_eq!(column[0].and_then(Value::as_str), Some(",a:b.c"));
        assert!(column[1].is_none());
        assert_eq!(column[2].and_then(Value::as_integer), Some(4));
        assert_eq!(matrix.get_string(0, 0), Some("time"));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Tuple(vec![]).value_type().name(), "tuple");
        assert_eq!(Value::Xml("<a/>".into()).value_type().to_string(), "xml");
        assert_eq!(ValueType::name_of(None), "none");
    }

    #[test]
    fn serde_rejects_inconsistent_matrix() {
        let json = r#"{"type":"matrix","value":{"columns":2,"rows":2,"cells":[null]}}"#;
        assert!(serde_json::from_str::<Value>(json).is_err());
    }

    #[test]
    fn serde_rejects_overflowing_shapes() {
        let table = r#"{"type":"table","value":{"width":4294967296,"height":4294967296,"data":[]}}"#;
        let matrix = r#"{"type":"matrix","value":{"columns":4294967296,"rows":4294967296,"cells":[]}}"#;
        assert!(serde_json::from_str::<Value>(table).is_err());
        assert!(serde_json::from_str::<Value>(matrix).is_err());
    }

    #[test]
    fn oversized_shape_is_a_typed_error() {
        assert_eq!(
            Table::from_rows(usize::MAX, 2, vec![]).unwrap_err(),
            ValueError::Oversized {
                what: "table",
                columns: usize::MAX,
                rows: 2
            }
        );
        assert!(matches!(
            Matrix::from_cells(2, usize::MAX, vec![]),
            Err(ValueError::Oversized { what: "matrix", .. })
        ));
        assert_eq!(grid_len("matrix", 0, usize::MAX), Ok(0));
    }

    #[test]
    fn serde_roundtrip_nested() {
        let value = Value::map([
            ("n", Value::Integer(3)),
            ("t", Value::Table(Table::from_rows(1, 2, vec![1.5, 2.5]).unwrap())),
        ]);
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
