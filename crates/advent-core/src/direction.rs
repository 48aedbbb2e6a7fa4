use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eight compass directions a room exit can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// North.
    North,
    /// Northeast.
    Northeast,
    /// East.
    East,
    /// Southeast.
    Southeast,
    /// South.
    South,
    /// Southwest.
    Southwest,
    /// West.
    West,
    /// Northwest.
    Northwest,
}

impl Direction {
    /// Every direction, clockwise from north.
    pub const ALL: [Direction; 8] = [
        Self::North,
        Self::Northeast,
        Self::East,
        Self::Southeast,
        Self::South,
        Self::Southwest,
        Self::West,
        Self::Northwest,
    ];

    /// Parse a direction name, abbreviation or screen-relative alias.
    ///
    /// `up`, `down`, `left` and `right` map onto north, south, west and east.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "n" | "north" | "up" => Some(Self::North),
            "ne" | "northeast" => Some(Self::Northeast),
            "e" | "east" | "right" => Some(Self::East),
            "se" | "southeast" => Some(Self::Southeast),
            "s" | "south" | "down" => Some(Self::South),
            "sw" | "southwest" => Some(Self::Southwest),
            "w" | "west" | "left" => Some(Self::West),
            "nw" | "northwest" => Some(Self::Northwest),
            _ => None,
        }
    }

    /// Lowercase name of this direction.
    pub fn name(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::Northeast => "northeast",
            Self::East => "east",
            Self::Southeast => "southeast",
            Self::South => "south",
            Self::Southwest => "southwest",
            Self::West => "west",
            Self::Northwest => "northwest",
        }
    }
}

/// Directions display in capitals, the way room descriptions print them.
impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_names_case_insensitively() {
        assert_eq!(Direction::parse("NORTH"), Some(Direction::North));
        assert_eq!(Direction::parse("SouthWest"), Some(Direction::Southwest));
    }

    #[test]
    fn parse_aliases_and_abbreviations() {
        assert_eq!(Direction::parse("up"), Some(Direction::North));
        assert_eq!(Direction::parse("down"), Some(Direction::South));
        assert_eq!(Direction::parse("left"), Some(Direction::West));
        assert_eq!(Direction::parse("right"), Some(Direction::East));
        assert_eq!(Direction::parse("ne"), Some(Direction::Northeast));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(Direction::parse("sideways"), None);
        assert_eq!(Direction::parse(""), None);
    }

    #[test]
    fn every_name_round_trips() {
        for dir in Direction::ALL {
            assert_eq!(Direction::parse(dir.name()), Some(dir));
        }
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(Direction::Southeast.to_string(), "SOUTHEAST");
    }
}
