use serde::{Deserialize, Serialize};

/// Condition groups the dashboard distinguishes.
///
/// Built from the upstream `weather[0].main` label; anything that is not one
/// of the four named groups (Mist, Fog, Thunderstorm, Drizzle, …) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Clear,
    Clouds,
    Rain,
    Snow,
    Other,
}

/// How a condition is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionDisplay {
    pub glyph: &'static str,
    pub color_hex: &'static str,
    pub label: &'static str,
}

const DISPLAY_TABLE: [(ConditionKind, ConditionDisplay); 5] = [
    (ConditionKind::Clear, ConditionDisplay { glyph: "☀", color_hex: "#f9d71c", label: "Clear" }),
    (ConditionKind::Clouds, ConditionDisplay { glyph: "☁", color_hex: "#a4b0be", label: "Clouds" }),
    (ConditionKind::Rain, ConditionDisplay { glyph: "☂", color_hex: "#3742fa", label: "Rain" }),
    (ConditionKind::Snow, ConditionDisplay { glyph: "❄", color_hex: "#dfe4ea", label: "Snow" }),
    (ConditionKind::Other, ConditionDisplay { glyph: "≋", color_hex: "#57606f", label: "Fog" }),
];

impl ConditionKind {
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("Clear") => ConditionKind::Clear,
            Some("Clouds") => ConditionKind::Clouds,
            Some("Rain") => ConditionKind::Rain,
            Some("Snow") => ConditionKind::Snow,
            _ => ConditionKind::Other,
        }
    }

    pub fn display(self) -> ConditionDisplay {
        let row = match self {
            ConditionKind::Clear => 0,
            ConditionKind::Clouds => 1,
            ConditionKind::Rain => 2,
            ConditionKind::Snow => 3,
            ConditionKind::Other => 4,
        };
        DISPLAY_TABLE[row].1
    }
}
