use serde::{Deserialize, Serialize};

/// A fixed place the appliance reports on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }
}

/// Current conditions decoded from one API response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    /// Relative humidity, always within 0..=100.
    pub humidity_pct: u8,
    /// WMO weather interpretation code.
    pub weather_code: i32,
}
