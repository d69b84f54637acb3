//! Boundary normalization of backend membership data.
//!
//! The backend reports membership either as a flat `assignments` array or as
//! grouped `clusters`. Both are turned into [`Assignments`] here so nothing
//! downstream depends on which shape arrived.

use crate::domain::{Assignments, Point};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Normalize whichever membership shape the backend sent.
///
/// A flat array wins when it is well formed. Returns `None` when neither
/// shape is usable, in which case renderers fall back to the default bucket.
pub fn normalize_assignments(
    flat: Option<&[i64]>,
    grouped: Option<&BTreeMap<String, Vec<Point>>>,
    dataset: &[Point],
) -> Option<Assignments> {
    if let Some(flat) = flat {
        match from_flat(flat, dataset.len()) {
            Some(assignments) => return Some(assignments),
            None => warn!(
                received = flat.len(),
                expected = dataset.len(),
                "ignoring malformed assignment array"
            ),
        }
    }

    if let Some(grouped) = grouped {
        return Some(from_grouped(grouped, dataset));
    }

    None
}

fn from_flat(flat: &[i64], dataset_len: usize) -> Option<Assignments> {
    if flat.len() != dataset_len {
        return None;
    }
    flat.iter()
        .map(|&index| usize::try_from(index).ok())
        .collect::<Option<Vec<_>>>()
        .map(Assignments::new)
}

/// Map grouped member points back onto dataset indices by exact coordinates.
///
/// Points the backend reports that are not in the dataset are skipped, and
/// dataset points no group mentions stay in cluster 0.
fn from_grouped(grouped: &BTreeMap<String, Vec<Point>>, dataset: &[Point]) -> Assignments {
    let mut positions: HashMap<(u64, u64), Vec<usize>> = HashMap::with_capacity(dataset.len());
    for (index, point) in dataset.iter().enumerate() {
        positions.entry(point.position_key()).or_default().push(index);
    }

    let mut indices = vec![0; dataset.len()];
    let mut unmatched = 0usize;

    for (cluster_id, members) in grouped {
        let Ok(cluster) = cluster_id.trim().parse::<usize>() else {
            warn!(cluster_id = %cluster_id, "skipping cluster with non-numeric id");
            continue;
        };
        for member in members {
            match positions.get(&member.position_key()) {
                Some(dataset_indices) => {
                    for &index in dataset_indices {
                        indices[index] = cluster;
                    }
                }
                None => unmatched += 1,
            }
        }
    }

    if unmatched > 0 {
        warn!(unmatched, "cluster members not found in dataset");
    }

    Assignments::new(indices)
}
