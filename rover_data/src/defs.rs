use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default battery cost of every transmitted primitive.
pub const DEFAULT_ENERGY_PER_MOVE: u32 = 2;
/// Default number of bytes a single script character occupies in rover memory.
pub const DEFAULT_BYTES_PER_CHAR: u64 = 8;
/// Default credit value of one byte of unused memory.
pub const DEFAULT_COST_PER_BYTE: f64 = 1.25;
/// Upper bound of the battery gauge, in percent.
pub const MAX_BATTERY: u32 = 100;

/// Type of a single grid tile, encoded on the wire as a bracketed 3-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CellMarker {
    /// `[X]` traversable ground.
    Path,
    /// `[R]` the rover icon.
    Rover,
    /// `[S]` sample site.
    Sample,
    /// `[B]` base station.
    Base,
    /// `[#]` hazard; entering it loses the rover.
    Hazard,
    /// `[?]` uncharted ground with a random outcome.
    Unknown,
    /// `[@]` charging station.
    Charger,
    /// `[*]` uncharted ground that has already been resolved.
    Explored,
}

impl CellMarker {
    pub const ALL: [CellMarker; 8] = [
        CellMarker::Path,
        CellMarker::Rover,
        CellMarker::Sample,
        CellMarker::Base,
        CellMarker::Hazard,
        CellMarker::Unknown,
        CellMarker::Charger,
        CellMarker::Explored,
    ];

    /// The middle character of the bracketed code.
    pub fn payload(self) -> char {
        match self {
            CellMarker::Path => 'X',
            CellMarker::Rover => 'R',
            CellMarker::Sample => 'S',
            CellMarker::Base => 'B',
            CellMarker::Hazard => '#',
            CellMarker::Unknown => '?',
            CellMarker::Charger => '@',
            CellMarker::Explored => '*',
        }
    }

    /// Full wire code, e.g. `[X]`.
    pub fn code(self) -> &'static str {
        match self {
            CellMarker::Path => "[X]",
            CellMarker::Rover => "[R]",
            CellMarker::Sample => "[S]",
            CellMarker::Base => "[B]",
            CellMarker::Hazard => "[#]",
            CellMarker::Unknown => "[?]",
            CellMarker::Charger => "[@]",
            CellMarker::Explored => "[*]",
        }
    }

    pub fn from_payload(payload: char) -> Option<CellMarker> {
        CellMarker::ALL.into_iter().find(|marker| marker.payload() == payload)
    }
}

impl fmt::Display for CellMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CellMarker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some('['), Some(payload), Some(']'), None) => {
                CellMarker::from_payload(payload).ok_or_else(|| format!("unknown cell marker '{s}'"))
            },
            _ => Err(format!("malformed cell marker '{s}'")),
        }
    }
}

impl TryFrom<String> for CellMarker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellMarker> for String {
    fn from(marker: CellMarker) -> Self {
        marker.code().to_string()
    }
}

/// Cardinal directions the rover can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Row and column offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Mission-wide tuning shared by every level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSettings {
    #[serde(default = "default_energy_per_move")]
    pub energy_per_move: u32,
    #[serde(default = "default_bytes_per_char")]
    pub bytes_per_char: u64,
    #[serde(default = "default_cost_per_byte")]
    pub cost_per_byte: f64,
    /// File that receives one JSON line per finished session. Disabled when absent or empty.
    #[serde(default)]
    pub mission_log: Option<String>,
    /// Fixed seed for the exploration dice; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_energy_per_move() -> u32 {
    DEFAULT_ENERGY_PER_MOVE
}

fn default_bytes_per_char() -> u64 {
    DEFAULT_BYTES_PER_CHAR
}

fn default_cost_per_byte() -> f64 {
    DEFAULT_COST_PER_BYTE
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            energy_per_move: DEFAULT_ENERGY_PER_MOVE,
            bytes_per_char: DEFAULT_BYTES_PER_CHAR,
            cost_per_byte: DEFAULT_COST_PER_BYTE,
            mission_log: None,
            seed: None,
        }
    }
}

/// One level: its map and the resource budgets it starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    #[serde(default)]
    pub name: String,
    /// Script memory budget in bytes, granted in full every round.
    pub memory: u64,
    /// Starting battery, in percent.
    pub battery: u32,
    /// Number of script submission rounds.
    pub executions: u32,
    /// Map rows; each row is a run of bracketed markers, optionally separated by whitespace.
    pub map: Vec<String>,
}

impl LevelDef {
    /// Decode the map rows into markers.
    ///
    /// # Errors
    /// Returns the first row that contains an unknown or malformed marker.
    pub fn grid(&self) -> Result<Vec<Vec<CellMarker>>, MapDecodeError> {
        self.map
            .iter()
            .enumerate()
            .map(|(row, text)| decode_row(text).map_err(|code| MapDecodeError { row, code }))
            .collect()
    }
}

/// A map row contained a code that is not a cell marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDecodeError {
    pub row: usize,
    pub code: String,
}

impl fmt::Display for MapDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} contains invalid marker '{}'", self.row, self.code)
    }
}

impl std::error::Error for MapDecodeError {}

/// Split a row such as `[R] [X][S]` into markers.
fn decode_row(text: &str) -> Result<Vec<CellMarker>, String> {
    let compact: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .chunks(3)
        .map(|chunk| {
            let code: String = chunk.iter().collect();
            code.parse::<CellMarker>().map_err(|_| code)
        })
        .collect()
}

/// Render a grid back into wire rows, markers separated by single spaces.
pub fn encode_grid(grid: &[Vec<CellMarker>]) -> Vec<String> {
    grid.iter()
        .map(|row| row.iter().map(|marker| marker.code()).collect::<Vec<_>>().join(" "))
        .collect()
}

/// Everything a mission needs from configuration: settings plus the ordered level list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    pub settings: MissionSettings,
    #[serde(default)]
    pub levels: Vec<LevelDef>,
}

impl LevelCatalog {
    /// Look up a level by its 1-based index.
    pub fn level(&self, index: u32) -> Option<&LevelDef> {
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        self.levels.get(slot)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_codes_round_trip() {
        for marker in CellMarker::ALL {
            assert_eq!(marker.code().parse::<CellMarker>(), Ok(marker));
            assert_eq!(CellMarker::from_payload(marker.payload()), Some(marker));
        }
    }

    #[test]
    fn malformed_markers_are_rejected() {
        assert!("X".parse::<CellMarker>().is_err());
        assert!("[Z]".parse::<CellMarker>().is_err());
        assert!("[XX]".parse::<CellMarker>().is_err());
    }

    #[test]
    fn rows_decode_with_or_without_spaces() {
        let level = LevelDef {
            name: "t".into(),
            memory: 100,
            battery: 100,
            executions: 1,
            map: vec!["[R] [X] [S]".into(), "[#][?][@]".into()],
        };
        let grid = level.grid().expect("grid decodes");
        assert_eq!(grid[0], vec![CellMarker::Rover, CellMarker::Path, CellMarker::Sample]);
        assert_eq!(grid[1], vec![CellMarker::Hazard, CellMarker::Unknown, CellMarker::Charger]);
        assert_eq!(encode_grid(&grid)[1], "[#] [?] [@]");
    }

    #[test]
    fn bad_marker_reports_row() {
        let level = LevelDef {
            name: String::new(),
            memory: 1,
            battery: 1,
            executions: 1,
            map: vec!["[R]".into(), "[X] [Q]".into()],
        };
        let err = level.grid().unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.code, "[Q]");
    }

    #[test]
    fn levels_are_one_based() {
        let level = LevelDef {
            name: "first".into(),
            memory: 1,
            battery: 1,
            executions: 1,
            map: vec!["[R]".into()],
        };
        let catalog = LevelCatalog {
            settings: MissionSettings::default(),
            levels: vec![level],
        };
        assert!(catalog.level(0).is_none());
        assert_eq!(catalog.level(1).map(|l| l.name.as_str()), Some("first"));
        assert!(catalog.level(2).is_none());
    }

    #[test]
    fn catalog_parses_from_toml_with_default_settings() {
        let source = r#"
            [[levels]]
            memory = 1000
            battery = 100
            executions = 5
            map = ["[B] [X] [S]"]
        "#;
        let catalog: LevelCatalog = toml::from_str(source).expect("catalog parses");
        assert_eq!(catalog.settings, MissionSettings::default());
        assert_eq!(catalog.levels[0].executions, 5);
    }
}
