use serde::{Deserialize, Serialize};

use crate::{
    geo::Coordinate,
    model::{Activity, GpsPoint},
    types::Id,
};

/// Body of start running, finish running and gym checkout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRequest {
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionRequest {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsPointRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, alias = "accuracy_meters")]
    pub accuracy: f64,
    /// RFC 3339. Points with an unparsable timestamp are skipped.
    pub timestamp: String,
    #[serde(default)]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendGpsPointsRequest {
    pub points: Vec<GpsPointRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendGpsPointsResponse {
    pub saved_count: usize,
    pub current_distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GymCheckinRequest {
    pub gym_location_id: Id,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub auto_detected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    #[serde(flatten)]
    pub activity: Activity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gps_points: Vec<GpsPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym_location_name: Option<String>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            activity,
            gps_points: Vec::new(),
            gym_location_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityListQuery {
    #[serde(default)]
    pub limit: Option<u64>,
}
