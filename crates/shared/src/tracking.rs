//! Distance accumulation over a GPS track.
//!
//! The same rules apply whether distance is added batch by batch while a run is in progress or
//! recomputed from the whole stored track when it finishes, so both paths go through
//! [`DistanceAccumulator`].

use crate::geo::Coordinate;

/// Points reporting a worse accuracy than this are ignored entirely
pub const MAX_ACCURACY_METERS: f64 = 50.0;
/// Longer hops between consecutive usable points are treated as GPS jumps
pub const MAX_SEGMENT_KM: f64 = 1.0;

pub trait TrackPoint {
    fn coordinate(&self) -> Coordinate;
    fn accuracy(&self) -> f64;
}

pub fn is_usable_accuracy(accuracy: f64) -> bool {
    accuracy <= MAX_ACCURACY_METERS
}

#[derive(Debug, Clone, Default)]
pub struct DistanceAccumulator {
    previous: Option<Coordinate>,
    total_km: f64,
}

impl DistanceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues a track whose last usable point was `previous`
    pub fn resume_from(previous: Option<Coordinate>) -> Self {
        Self {
            previous,
            total_km: 0.0,
        }
    }

    /// Feeds the next point in track order and returns the distance it added
    pub fn push(&mut self, coordinate: Coordinate, accuracy: f64) -> f64 {
        if !is_usable_accuracy(accuracy) {
            return 0.0;
        }

        let added = match self.previous {
            Some(previous) => {
                let segment = previous.distance_km(&coordinate);
                if segment > MAX_SEGMENT_KM {
                    0.0
                } else {
                    segment
                }
            }
            None => 0.0,
        };

        // A discarded jump still moves the reference point
        self.previous = Some(coordinate);
        self.total_km += added;
        added
    }

    pub fn total_km(&self) -> f64 {
        self.total_km
    }
}

/// Distance of a full track given in order
pub fn track_distance_km<'a, P, I>(points: I) -> f64
where
    P: TrackPoint + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let mut accumulator = DistanceAccumulator::new();
    for point in points {
        accumulator.push(point.coordinate(), point.accuracy());
    }
    accumulator.total_km()
}
