use crate::obstacle::ObstacleId;
use crate::vertex::VertexId;

/// A directed route segment between two visibility-graph vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Segment {
    pub(crate) start: VertexId,
    pub(crate) end: VertexId,
}

impl Segment {
    pub(crate) const fn new(start: VertexId, end: VertexId) -> Self {
        Self { start, end }
    }
}

/// A visibility-graph work item: a segment to test, minus up to two obstacles it is
/// allowed to touch because it was generated from their corners.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub(crate) segment: Segment,
    pub(crate) exclude_a: Option<ObstacleId>,
    pub(crate) exclude_b: Option<ObstacleId>,
}

impl Candidate {
    pub(crate) const fn new(
        segment: Segment,
        exclude_a: Option<ObstacleId>,
        exclude_b: Option<ObstacleId>,
    ) -> Self {
        Self {
            segment,
            exclude_a,
            exclude_b,
        }
    }

    pub(crate) fn skips(&self, obstacle: ObstacleId) -> bool {
        self.exclude_a == Some(obstacle) || self.exclude_b == Some(obstacle)
    }
}

/// The interior vertices of a segment chain: every segment end except the last.
pub(crate) fn interior_vertices(segments: &[Segment]) -> impl Iterator<Item = VertexId> + '_ {
    let interior = segments.len().saturating_sub(1);
    segments[..interior].iter().map(|s| s.end)
}
