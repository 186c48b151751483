//! WMO condition labels and Open-Meteo payload decoding.

use serde::Deserialize;
use thiserror::Error;

use crate::model::CurrentConditions;

/// Label shown for codes missing from [`WMO_LABELS`].
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Longest label in the table; the renderer relies on this fitting the display.
pub const MAX_LABEL_LEN: usize = 7;

const WMO_LABELS: &[(i32, &str)] = &[
    (0, "Clear"),
    (1, "MClear"),
    (2, "PCloud"),
    (3, "Cloudy"),
    (45, "Fog"),
    (48, "DepFog"),
    (51, "LDrizl"),
    (53, "MDrizl"),
    (55, "HDrizl"),
    (61, "LRain"),
    (63, "MRain"),
    (65, "HRain"),
    (66, "FzRain"),
    (67, "HFzRain"),
    (71, "LSnow"),
    (73, "MSnow"),
    (75, "HSnow"),
    (77, "Grains"),
    (80, "LShwr"),
    (81, "MShwr"),
    (82, "HShwr"),
    (85, "LSnwSh"),
    (86, "HSnwSh"),
    (95, "Storm"),
    (96, "StHail"),
    (99, "StHHail"),
];

/// Short mnemonic for a WMO weather code. Never fails.
pub fn label_for(code: i32) -> &'static str {
    WMO_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_LABEL)
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed current-conditions payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("relative humidity {0} is outside 0..=100")]
    HumidityOutOfRange(f64),
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

/// Decode an Open-Meteo `current=` response body.
pub fn decode(payload: &str) -> Result<CurrentConditions, DecodeError> {
    let parsed: OmResponse = serde_json::from_str(payload)?;
    let current = parsed.current;

    let humidity = current.relative_humidity_2m.round_ties_even();
    if !(0.0..=100.0).contains(&humidity) {
        return Err(DecodeError::HumidityOutOfRange(current.relative_humidity_2m));
    }

    Ok(CurrentConditions {
        temperature_c: current.temperature_2m,
        humidity_pct: humidity as u8,
        weather_code: current.weather_code,
    })
}
