//! dk-value: scientific value model and its generic tree codec.
//!
//! Contains:
//! - value (tagged `Value` variant + fixed tables and matrices)
//! - node (external-facing `GenericNode` tree)
//! - source (`ValueSource` seam for engine-owned value graphs)
//! - codec (encode/decode between the two)
//! - error (shared error types)

pub mod codec;
pub mod error;
pub mod node;
pub mod source;
pub mod value;

pub use codec::{decode, encode};
pub use error::{ValueError, ValueResult};
pub use node::{GenericNode, Mapping, Scalar};
pub use source::{Child, ValueSource, ValueView};
pub use value::{Matrix, Table, Value, ValueType, grid_len};
