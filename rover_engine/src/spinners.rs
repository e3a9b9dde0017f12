//! Randomized flavor text used by the view.

use std::collections::HashMap;

use gametools::spinners::{Spinner, Wedge};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpinnerType {
    /// Descriptions of plain and explored ground for `obs`.
    Terrain,
    /// Operator remarks after a solar flare recharge.
    SolarFlare,
    /// Operator remarks after magnetic interference.
    Interference,
    /// Sign-off lines when the session ends.
    Farewell,
}

pub trait SpinnerExt {
    fn from_strs(words: &[&'static str]) -> Self;
}
impl SpinnerExt for Spinner<&'static str> {
    fn from_strs(words: &[&'static str]) -> Self {
        let wedges = words.iter().map(|w| Wedge::new(*w)).collect::<Vec<_>>();
        Spinner::new(wedges)
    }
}

const TERRAIN: &[&str] = &[
    "Dusty gravel field",
    "Rocky outcrop showing iron deposits",
    "Fine sand dunes shifting in the wind",
    "Cracked clay surface with mineral veins",
    "Basalt formations from ancient lava flows",
    "Impact crater debris field",
    "Crystalline formations glittering in starlight",
];

const SOLAR_FLARE: &[&str] = &[
    "Good stuff! Uncharted territory can be a pleasant surprise.",
    "Free power. I'll take it.",
    "Lucky break. Don't get used to it.",
];

const INTERFERENCE: &[&str] = &[
    "Yep, sometimes the unknown kicks back.",
    "That field chewed right through the cells.",
    "Noted. Let's not make a habit of wandering blind.",
];

const FAREWELL: &[&str] = &[
    "Link closed. Good work out there.",
    "Telemetry archived. Get some rest.",
    "Signing off. The rover will wait for you.",
];

/// Built-in spinner table.
pub fn default_spinners() -> HashMap<SpinnerType, Spinner<&'static str>> {
    HashMap::from([
        (SpinnerType::Terrain, Spinner::from_strs(TERRAIN)),
        (SpinnerType::SolarFlare, Spinner::from_strs(SOLAR_FLARE)),
        (SpinnerType::Interference, Spinner::from_strs(INTERFERENCE)),
        (SpinnerType::Farewell, Spinner::from_strs(FAREWELL)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spinner_yields_text() {
        let spinners = default_spinners();
        for kind in [
            SpinnerType::Terrain,
            SpinnerType::SolarFlare,
            SpinnerType::Interference,
            SpinnerType::Farewell,
        ] {
            let text = spinners.get(&kind).and_then(Spinner::spin);
            assert!(text.is_some_and(|t| !t.is_empty()), "{kind:?} spun nothing");
        }
    }

    #[test]
    fn terrain_comes_from_catalog() {
        let spinners = default_spinners();
        let text = spinners.get(&SpinnerType::Terrain).and_then(Spinner::spin).unwrap();
        assert!(TERRAIN.contains(&text));
    }
}
