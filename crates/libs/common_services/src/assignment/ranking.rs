use crate::database::crew::CrewCandidate;
use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: CrewCandidate,
    pub distance_km: f64,
}

/// Orders candidates by distance to `origin`, nearest first.
///
/// Equal distances keep their input order. With `max_distance_km` set, farther candidates are dropped.
#[must_use]
pub fn rank_candidates(
    origin: GeoPoint,
    candidates: Vec<CrewCandidate>,
    max_distance_km: Option<f64>,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|candidate| RankedCandidate {
            distance_km: origin.distance_km(&candidate.location()),
            candidate,
        })
        .filter(|ranked| max_distance_km.is_none_or(|max| ranked.distance_km <= max))
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
