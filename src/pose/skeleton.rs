//! Skeleton topology between keypoints.

use super::{Keypoint, part_index};
use once_cell::sync::Lazy;

/// Part pairs joined by a skeleton edge.
pub const CONNECTED_PART_NAMES: [(&str, &str); 12] = [
    ("leftHip", "leftShoulder"),
    ("leftElbow", "leftShoulder"),
    ("leftElbow", "leftWrist"),
    ("leftHip", "leftKnee"),
    ("leftKnee", "leftAnkle"),
    ("rightHip", "rightShoulder"),
    ("rightElbow", "rightShoulder"),
    ("rightElbow", "rightWrist"),
    ("rightHip", "rightKnee"),
    ("rightKnee", "rightAnkle"),
    ("leftShoulder", "rightShoulder"),
    ("leftHip", "rightHip"),
];

/// [`CONNECTED_PART_NAMES`] as keypoint indices.
static CONNECTED_PART_INDICES: Lazy<Vec<(usize, usize)>> = Lazy::new(|| {
    CONNECTED_PART_NAMES
        .iter()
        .filter_map(|(a, b)| Some((part_index(a)?, part_index(b)?)))
        .collect()
});

/// Returns the skeleton edges whose endpoints both exceed `min_confidence`.
///
/// `keypoints` must be in part order; edges referring to missing indices are skipped.
pub fn adjacent_keypoints(
    keypoints: &[Keypoint],
    min_confidence: f32,
) -> Vec<(&Keypoint, &Keypoint)> {
    CONNECTED_PART_INDICES
        .iter()
        .filter_map(|&(a, b)| {
            let (a, b) = (keypoints.get(a)?, keypoints.get(b)?);
            (a.exceeds(min_confidence) && b.exceeds(min_confidence)).then_some((a, b))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::PART_NAMES;

    fn keypoints_with(scores: impl Fn(&str) -> f32) -> Vec<Keypoint> {
        PART_NAMES
            .iter()
            .map(|&part| Keypoint::new(part, 0.0, 0.0, scores(part)))
            .collect()
    }

    #[test]
    fn every_edge_resolves_to_indices() {
        assert_eq!(CONNECTED_PART_INDICES.len(), CONNECTED_PART_NAMES.len());
    }

    #[test]
    fn all_confident_yields_all_edges() {
        let keypoints = keypoints_with(|_| 0.9);
        assert_eq!(adjacent_keypoints(&keypoints, 0.5).len(), 12);
    }

    #[test]
    fn edge_needs_both_endpoints() {
        let keypoints = keypoints_with(|part| match part {
            "leftShoulder" | "rightShoulder" | "leftElbow" => 0.8,
            "leftWrist" => 0.5,
            _ => 0.1,
        });
        let pairs: Vec<_> = adjacent_keypoints(&keypoints, 0.5)
            .into_iter()
            .map(|(a, b)| (a.part, b.part))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("leftElbow", "leftShoulder"),
                ("leftShoulder", "rightShoulder"),
            ]
        );
    }

    #[test]
    fn truncated_keypoints_skip_missing_edges() {
        let keypoints = keypoints_with(|_| 0.9);
        assert!(adjacent_keypoints(&keypoints[..5], 0.5).is_empty());
    }
}
