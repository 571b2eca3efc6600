//! Column header grammar.
//!
//! A header names the port that produced a column:
//!
//! ```text
//! header := ["," ] chain ":" atomic "." port
//!         | ":" atomic "." port
//!         | label
//! chain  := name ("," name)*
//! ```
//!
//! `",top,sub:pump.out"` becomes `[top, sub, pump, out]` and
//! `":pump.out"` (an atomic model at the root) becomes `[pump, out]`.
//! A label containing neither `,` nor `:` is kept as one opaque segment.
//! Model names never contain `,` or `:`; the port name may contain `.`.

use std::fmt;

use crate::{ResultsError, ResultsResult};

/// Header of the column holding simulation time.
pub const TIME_COLUMN: &str = "time";

/// Non-empty model path; the last segment is the port name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegments(Vec<String>);

impl PathSegments {
    /// `None` when `segments` is empty or holds an empty name.
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self(segments))
    }

    pub fn single(name: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty());
        Self(vec![name])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Port name and the container names leading to it.
    pub fn split_leaf(&self) -> (&str, &[String]) {
        let (leaf, containers) = self
            .0
            .split_last()
            .expect("path segments are never empty");
        (leaf, containers)
    }

    /// Header string for this path. It parses back to the same path when
    /// no segment other than the port contains `,`, `:` or `.`.
    pub fn to_header(&self) -> String {
        match self.0.as_slice() {
            [label] => label.clone(),
            [atomic, port] => format!(":{atomic}.{port}"),
            [chain @ .., coupled, atomic, port] => {
                let mut header = String::new();
                for name in chain {
                    header.push(',');
                    header.push_str(name);
                }
                format!("{header},{coupled}:{atomic}.{port}")
            }
            [] => String::new(),
        }
    }
}

impl fmt::Display for PathSegments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

fn malformed(header: &str, reason: &'static str) -> ResultsError {
    ResultsError::MalformedHeader {
        header: header.to_string(),
        reason,
    }
}

/// Parse a column header into its model path.
pub fn parse_header(header: &str) -> ResultsResult<PathSegments> {
    if header.is_empty() {
        return Err(malformed(header, "empty header"));
    }

    let body = header.strip_prefix(',').unwrap_or(header);
    let mut chain: Vec<&str> = body.split(',').collect();
    let last = chain.pop().unwrap_or_default();

    let Some((coupled, leaf)) = last.split_once(':') else {
        if header.contains(',') {
            return Err(malformed(header, "missing ':' before atomic model name"));
        }
        return Ok(PathSegments::single(header));
    };

    let (atomic, port) = leaf
        .split_once('.')
        .ok_or_else(|| malformed(header, "missing '.' before port name"))?;
    if atomic.is_empty() {
        return Err(malformed(header, "empty atomic model name"));
    }
    if atomic.contains(':') || chain.iter().any(|name| name.contains(':')) {
        return Err(malformed(header, "':' inside a model name"));
    }
    if port.is_empty() {
        return Err(malformed(header, "empty port name"));
    }
    if chain.iter().any(|name| name.is_empty()) || (coupled.is_empty() && !chain.is_empty()) {
        return Err(malformed(header, "empty coupled model name"));
    }

    let mut segments: Vec<String> = chain.into_iter().map(str::to_string).collect();
    if !coupled.is_empty() {
        segments.push(coupled.to_string());
    }
    segments.push(atomic.to_string());
    segments.push(port.to_string());
    Ok(PathSegments(segments))
}
