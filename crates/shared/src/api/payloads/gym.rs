use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

pub const DEFAULT_GYM_RADIUS_M: i64 = 100;

fn default_radius_m() -> i64 {
    DEFAULT_GYM_RADIUS_M
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGymLocationRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_m")]
    pub radius_m: i64,
}

impl CreateGymLocationRequest {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
