//! Insertion of column series into a view tree.

use dk_value::{GenericNode, Mapping};

use crate::path::PathSegments;
use crate::{ResultsError, ResultsResult};

/// Place `series` at `path` under `root`, creating missing containers.
///
/// Existing containers along the path are reused, so columns sharing a
/// prefix end up under the same node. A second series at the same full
/// path replaces the first. A path that runs through an existing leaf, or
/// ends on an existing container, fails with `NodeKindConflict` and leaves
/// `root` unchanged.
pub fn insert(root: &mut Mapping, path: &PathSegments, series: GenericNode) -> ResultsResult<()> {
    let (leaf, containers) = path.split_leaf();

    // Containers are only created below the last existing node, so every
    // conflict is detected before anything is added.
    let mut node = root;
    for (depth, name) in containers.iter().enumerate() {
        node = match node.get_or_insert_with(name, || GenericNode::Mapping(Mapping::new())) {
            GenericNode::Mapping(child) => child,
            _ => {
                return Err(conflict(
                    &containers[..=depth],
                    "path runs through an existing leaf",
                ));
            }
        };
    }

    if let Some(GenericNode::Mapping(_)) = node.get(leaf) {
        return Err(conflict(
            path.segments(),
            "series would replace an existing container",
        ));
    }
    node.insert(leaf, series);
    Ok(())
}

fn conflict(segments: &[String], reason: &'static str) -> ResultsError {
    ResultsError::NodeKindConflict {
        path: segments.join("/"),
        reason,
    }
}
