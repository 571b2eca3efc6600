//! Read-only seam over engine value graphs.
//!
//! The codec and the result reconstruction walk values through
//! [`ValueSource`] so that graphs owned by the engine (handles, arenas,
//! shared nodes) can be consumed without first copying them into
//! [`Value`]. Such graphs may alias containers, which is why every source
//! reports an identity.

use std::borrow::Cow;

use crate::value::{Value, ValueType};

/// Boxed child handed out by a container view.
pub type Child<'a> = Box<dyn ValueSource + 'a>;

/// One level of a value: scalars by value, containers as child handles.
pub enum ValueView<'a> {
    Double(f64),
    Integer(i64),
    Boolean(bool),
    String(Cow<'a, str>),
    Xml(Cow<'a, str>),
    Map(Vec<(Cow<'a, str>, Child<'a>)>),
    Set(Vec<Child<'a>>),
    Tuple(Cow<'a, [f64]>),
    /// Row-major `width x height` reals.
    Table {
        width: usize,
        height: usize,
        cells: Cow<'a, [f64]>,
    },
    /// Row-major `columns x rows` optional cells.
    Matrix {
        columns: usize,
        rows: usize,
        cells: Vec<Option<Child<'a>>>,
    },
    /// Tag not known to this crate.
    Unknown,
}

impl ValueView<'_> {
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            ValueView::Double(_) => Some(ValueType::Double),
            ValueView::Integer(_) => Some(ValueType::Integer),
            ValueView::Boolean(_) => Some(ValueType::Boolean),
            ValueView::String(_) => Some(ValueType::String),
            ValueView::Xml(_) => Some(ValueType::Xml),
            ValueView::Map(_) => Some(ValueType::Map),
            ValueView::Set(_) => Some(ValueType::Set),
            ValueView::Tuple(_) => Some(ValueType::Tuple),
            ValueView::Table { .. } => Some(ValueType::Table),
            ValueView::Matrix { .. } => Some(ValueType::Matrix),
            ValueView::Unknown => None,
        }
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.value_type().map_or("unknown", ValueType::name)
    }
}

pub trait ValueSource {
    /// Stable identity of the underlying node; two handles to the same
    /// container must report the same identity.
    fn identity(&self) -> usize;

    fn view(&self) -> ValueView<'_>;
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn identity(&self) -> usize {
        (**self).identity()
    }

    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }
}

impl ValueSource for Value {
    fn identity(&self) -> usize {
        self as *const Value as usize
    }

    fn view(&self) -> ValueView<'_> {
        match self {
            Value::Double(v) => ValueView::Double(*v),
            Value::Integer(v) => ValueView::Integer(*v),
            Value::Boolean(v) => ValueView::Boolean(*v),
            Value::String(s) => ValueView::String(Cow::Borrowed(s)),
            Value::Xml(s) => ValueView::Xml(Cow::Borrowed(s)),
            Value::Map(entries) => ValueView::Map(
                entries
                    .iter()
                    .map(|(k, v)| (Cow::Borrowed(k.as_str()), Box::new(v) as Child<'_>))
                    .collect(),
            ),
            Value::Set(items) => {
                ValueView::Set(items.iter().map(|v| Box::new(v) as Child<'_>).collect())
            }
            Value::Tuple(items) => ValueView::Tuple(Cow::Borrowed(items)),
            Value::Table(table) => ValueView::Table {
                width: table.width(),
                height: table.height(),
                cells: Cow::Borrowed(table.as_slice()),
            },
            Value::Matrix(matrix) => ValueView::Matrix {
                columns: matrix.columns(),
                rows: matrix.rows(),
                cells: matrix
                    .cells()
                    .iter()
                    .map(|cell| cell.as_ref().map(|v| Box::new(v) as Child<'_>))
                    .collect(),
            },
        }
    }
}
