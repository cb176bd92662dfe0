use std::collections::{BTreeMap, BTreeSet};

use super::PathSegment;

/// A vertex shared by two or more segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    /// Index of the shared vertex.
    pub vertex: usize,
    /// Indices of the segments passing through `vertex`.
    pub segments: BTreeSet<usize>,
}

/// Collects every vertex referenced by at least two distinct segments,
/// ordered by vertex index.
pub(crate) fn find_intersections(segments: &[PathSegment]) -> Vec<Intersection> {
    let mut by_vertex: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    for (segment_index, segment) in segments.iter().enumerate() {
        for vertex in segment.vertex_indices() {
            by_vertex.entry(vertex).or_default().insert(segment_index);
        }
    }
    by_vertex
        .into_iter()
        .filter(|(_, segments)| segments.len() > 1)
        .map(|(vertex, segments)| Intersection { vertex, segments })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::path::SegmentVertexEntry;

    fn segment(vertices: &[usize]) -> PathSegment {
        PathSegment::new(
            vertices
                .iter()
                .map(|&v| SegmentVertexEntry::new(v, Vector3::x()))
                .collect(),
        )
    }

    #[test]
    fn shared_vertices_become_intersections() {
        let segments = [segment(&[0, 1, 2]), segment(&[2, 3]), segment(&[5, 2, 1])];
        let found = find_intersections(&segments);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].vertex, 1);
        assert_eq!(found[0].segments, BTreeSet::from([0, 2]));
        assert_eq!(found[1].vertex, 2);
        assert_eq!(found[1].segments, BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn loop_within_one_segment_is_not_an_intersection() {
        let segments = [segment(&[0, 1, 2, 0])];
        assert!(find_intersections(&segments).is_empty());
    }
}
