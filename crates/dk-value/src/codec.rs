//! Conversion between engine values and the generic tree.

use std::collections::{BTreeMap, HashSet};

use crate::error::{ValueError, ValueResult};
use crate::node::{GenericNode, Mapping, Scalar};
use crate::source::{ValueSource, ValueView};
use crate::value::{Value, grid_len};

/// Encode a value into a freshly allocated generic tree.
///
/// Fails with [`ValueError::Cyclic`] when a container is reached again
/// while it is still being walked, and with [`ValueError::Dimension`]
/// when a table or matrix reports a cell count that does not match its
/// declared shape. Grids are split into rows from their actual cells, so
/// a zero-width grid encodes as an empty sequence whatever its height.
pub fn encode(value: &dyn ValueSource) -> ValueResult<GenericNode> {
    let mut walking = HashSet::new();
    encode_node(value, &mut walking)
}

fn encode_node(value: &dyn ValueSource, walking: &mut HashSet<usize>) -> ValueResult<GenericNode> {
    let node = match value.view() {
        ValueView::Double(v) => GenericNode::Leaf(Scalar::Float(v)),
        ValueView::Integer(v) => GenericNode::Leaf(Scalar::Integer(v)),
        ValueView::Boolean(v) => GenericNode::Leaf(Scalar::Bool(v)),
        ValueView::String(s) | ValueView::Xml(s) => GenericNode::Leaf(Scalar::Text(s.into_owned())),
        ValueView::Map(entries) => {
            let identity = enter(value, walking)?;
            let mut mapping = Mapping::new();
            for (key, child) in entries {
                let encoded = encode_node(child.as_ref(), walking)?;
                mapping.insert(key.into_owned(), encoded);
            }
            walking.remove(&identity);
            GenericNode::Mapping(mapping)
        }
        ValueView::Set(items) => {
            let identity = enter(value, walking)?;
            let mut seq = Vec::with_capacity(items.len());
            for child in items {
                seq.push(encode_node(child.as_ref(), walking)?);
            }
            walking.remove(&identity);
            GenericNode::Sequence(seq)
        }
        ValueView::Tuple(items) => GenericNode::Sequence(
            items
                .iter()
                .map(|v| GenericNode::Leaf(Scalar::Float(*v)))
                .collect(),
        ),
        ValueView::Table {
            width,
            height,
            cells,
        } => {
            check_cells("table", width, height, cells.len())?;
            let leaves = cells
                .iter()
                .map(|v| GenericNode::Leaf(Scalar::Float(*v)))
                .collect();
            GenericNode::Sequence(into_rows(leaves, width))
        }
        ValueView::Matrix {
            columns,
            rows,
            cells,
        } => {
            check_cells("matrix", columns, rows, cells.len())?;
            let identity = enter(value, walking)?;
            let mut encoded = Vec::with_capacity(cells.len());
            for cell in cells {
                encoded.push(match cell {
                    Some(child) => encode_node(child.as_ref(), walking)?,
                    None => GenericNode::null(),
                });
            }
            walking.remove(&identity);
            GenericNode::Sequence(into_rows(encoded, columns))
        }
        ValueView::Unknown => GenericNode::null(),
    };
    Ok(node)
}

fn enter(value: &dyn ValueSource, walking: &mut HashSet<usize>) -> ValueResult<usize> {
    let identity = value.identity();
    if !walking.insert(identity) {
        return Err(ValueError::Cyclic { identity });
    }
    Ok(identity)
}

fn check_cells(what: &'static str, width: usize, height: usize, actual: usize) -> ValueResult<()> {
    let expected = grid_len(what, width, height)?;
    if actual != expected {
        return Err(ValueError::Dimension {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

// Row-major cells into row sequences; a zero-width grid has no rows.
fn into_rows(cells: Vec<GenericNode>, width: usize) -> Vec<GenericNode> {
    if width == 0 {
        return Vec::new();
    }
    let mut rows = Vec::with_capacity(cells.len() / width);
    let mut cells = cells.into_iter();
    loop {
        let row: Vec<GenericNode> = cells.by_ref().take(width).collect();
        if row.is_empty() {
            return rows;
        }
        rows.push(GenericNode::Sequence(row));
    }
}

/// Decode a generic tree into a value.
///
/// Numbers without a fractional part become `Integer`, everything else
/// numeric becomes `Double`. Null leaves decode to nothing, and null
/// members of sequences and mappings are dropped. Positions are not kept:
/// `[1, null, 3]` decodes to a two-element set.
pub fn decode(node: &GenericNode) -> Option<Value> {
    match node {
        GenericNode::Leaf(Scalar::Null) => None,
        GenericNode::Leaf(Scalar::Bool(v)) => Some(Value::Boolean(*v)),
        GenericNode::Leaf(Scalar::Integer(v)) => Some(Value::Integer(*v)),
        GenericNode::Leaf(Scalar::Float(v)) => Some(decode_number(*v)),
        GenericNode::Leaf(Scalar::Text(s)) => Some(Value::String(s.clone())),
        GenericNode::Sequence(items) => Some(Value::Set(items.iter().filter_map(decode).collect())),
        GenericNode::Mapping(mapping) => {
            let entries: BTreeMap<String, Value> = mapping
                .iter()
                .filter_map(|(key, child)| decode(child).map(|v| (key.to_string(), v)))
                .collect();
            Some(Value::Map(entries))
        }
    }
}

// i64::MIN as f64 is exactly -2^63; i64::MAX as f64 rounds up to 2^63.
fn decode_number(v: f64) -> Value {
    if v.trunc() == v && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Value::Integer(v as i64)
    } else {
        Value::Double(v)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::{Matrix, Table};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn table_cells_land_at_row_col(rows in 0_usize..6, cols in 0_usize..6) {
            let data: Vec<f64> = (0..rows * cols).map(|i| i as f64 + 0.5).collect();
            let table = Table::from_rows(cols, rows, data).unwrap();
            let node = encode(&Value::Table(table.clone())).unwrap();
            let lines = node.as_sequence().unwrap();

            prop_assert_eq!(lines.len(), if cols == 0 { 0 } else { rows });
            for r in 0..lines.len() {
                let line = lines[r].as_sequence().unwrap();
                prop_assert_eq!(line.len(), cols);
                for c in 0..cols {
                    prop_assert_eq!(line[c].as_scalar().and_then(Scalar::as_f64), table.get(c, r));
                }
            }
        }

        #[test]
        fn matrix_cells_decode_to_their_value(rows in 1_usize..5, cols in 1_usize..5) {
            let mut matrix = Matrix::new(cols, rows);
            for r in 0..rows {
                for c in 0..cols {
                    matrix.set(c, r, Some(Value::Integer((r * 100 + c) as i64))).unwrap();
                }
            }
            let node = encode(&Value::Matrix(matrix)).unwrap();
            let lines = node.as_sequence().unwrap();

            for r in 0..rows {
                let line = lines[r].as_sequence().unwrap();
                for c in 0..cols {
                    prop_assert_eq!(decode(&line[c]), Some(Value::Integer((r * 100 + c) as i64)));
                }
            }
        }

        #[test]
        fn whole_numbers_decode_as_integers(v in -1_000_000_i64..1_000_000) {
            prop_assert_eq!(decode(&GenericNode::Leaf(Scalar::Float(v as f64))), Some(Value::Integer(v)));
            let fractional = v as f64 + 0.25;
            prop_assert_eq!(decode(&GenericNode::Leaf(Scalar::Float(fractional))), Some(Value::Double(fractional)));
        }
    }
}
