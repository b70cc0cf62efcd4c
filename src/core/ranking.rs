use serde::{Deserialize, Serialize};

use crate::core::distance::distance_km;
use crate::models::{Coordinate, DistanceUnit, Florist};

/// Ranking state of a florist list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RankState {
    /// No search location known, dataset order
    Unranked,
    /// Distances computed from `origin`, nearest first
    Ranked { origin: Coordinate },
}

impl RankState {
    pub fn is_ranked(&self) -> bool {
        matches!(self, RankState::Ranked { .. })
    }

    pub fn origin(&self) -> Option<Coordinate> {
        match self {
            RankState::Ranked { origin } => Some(*origin),
            RankState::Unranked => None,
        }
    }
}

/// Copy `florists` with each one's distance from `origin` attached
pub fn annotate_distances(florists: &[Florist], origin: &Coordinate, unit: DistanceUnit) -> Vec<Florist> {
    florists
        .iter()
        .map(|florist| Florist {
            distance: Some(unit.from_km(distance_km(origin, &florist.location))),
            ..florist.clone()
        })
        .collect()
}

/// Sort by distance ascending
///
/// `sort_by` is stable, so equal distances keep their dataset order.
/// Florists without a distance sort last.
pub fn sort_by_distance(florists: &mut [Florist]) {
    florists.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Annotate and sort in one step
pub fn rank_by_distance(florists: &[Florist], origin: &Coordinate, unit: DistanceUnit) -> Vec<Florist> {
    let mut ranked = annotate_distances(florists, origin, unit);
    sort_by_distance(&mut ranked);

    tracing::debug!(
        "Ranked {} florists from ({}, {})",
        ranked.len(),
        origin.lat,
        origin.lng
    );

    ranked
}
