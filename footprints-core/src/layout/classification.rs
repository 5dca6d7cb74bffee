use std::{collections::BTreeSet, fmt::Display, str::FromStr};

use crate::error::ConfigError;

// Standard point classes as defined by the ASPRS LAS 1.4 specification
pub const CLASS_NEVER_CLASSIFIED: u8 = 0;
pub const CLASS_UNCLASSIFIED: u8 = 1;
pub const CLASS_GROUND: u8 = 2;
pub const CLASS_LOW_VEGETATION: u8 = 3;
pub const CLASS_MEDIUM_VEGETATION: u8 = 4;
pub const CLASS_HIGH_VEGETATION: u8 = 5;
pub const CLASS_BUILDING: u8 = 6;
pub const CLASS_LOW_POINT: u8 = 7;
pub const CLASS_MODEL_KEY_POINT: u8 = 8;
pub const CLASS_WATER: u8 = 9;
pub const CLASS_RAIL: u8 = 10;
pub const CLASS_ROAD_SURFACE: u8 = 11;
pub const CLASS_OVERLAP: u8 = 12;
pub const CLASS_WIRE_GUARD: u8 = 13;
pub const CLASS_WIRE_CONDUCTOR: u8 = 14;
pub const CLASS_TRANSMISSION_TOWER: u8 = 15;
pub const CLASS_WIRE_CONNECTOR: u8 = 16;
pub const CLASS_BRIDGE_DECK: u8 = 17;
pub const CLASS_HIGH_NOISE: u8 = 18;

/// Returns a human-readable name for the given classification code
/// ```
/// # use footprints_core::layout::*;
/// assert_eq!(class_name(CLASS_BUILDING), "building");
/// assert_eq!(class_name(42), "reserved");
/// assert_eq!(class_name(200), "user defined");
/// ```
pub fn class_name(code: u8) -> &'static str {
    match code {
        CLASS_NEVER_CLASSIFIED => "never classified",
        CLASS_UNCLASSIFIED => "unclassified",
        CLASS_GROUND => "ground",
        CLASS_LOW_VEGETATION => "low vegetation",
        CLASS_MEDIUM_VEGETATION => "medium vegetation",
        CLASS_HIGH_VEGETATION => "high vegetation",
        CLASS_BUILDING => "building",
        CLASS_LOW_POINT => "low point (noise)",
        CLASS_MODEL_KEY_POINT => "model key point",
        CLASS_WATER => "water",
        CLASS_RAIL => "rail",
        CLASS_ROAD_SURFACE => "road surface",
        CLASS_OVERLAP => "overlap",
        CLASS_WIRE_GUARD => "wire guard (shield)",
        CLASS_WIRE_CONDUCTOR => "wire conductor (phase)",
        CLASS_TRANSMISSION_TOWER => "transmission tower",
        CLASS_WIRE_CONNECTOR => "wire-structure connector",
        CLASS_BRIDGE_DECK => "bridge deck",
        CLASS_HIGH_NOISE => "high noise",
        19..=63 => "reserved",
        _ => "user defined",
    }
}

/// A non-empty set of classification codes that selects points for further processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSet {
    codes: BTreeSet<u8>,
}

impl ClassSet {
    /// Creates a new `ClassSet` from the given codes. Duplicates are ignored. Returns an error if `codes` is empty
    pub fn new<I: IntoIterator<Item = u8>>(codes: I) -> Result<Self, ConfigError> {
        let codes: BTreeSet<u8> = codes.into_iter().collect();
        if codes.is_empty() {
            return Err(ConfigError::EmptyClassSet);
        }
        Ok(Self { codes })
    }

    /// The building class (6)
    pub fn buildings() -> Self {
        Self {
            codes: BTreeSet::from([CLASS_BUILDING]),
        }
    }

    /// Low, medium and high vegetation (3, 4, 5)
    pub fn vegetation() -> Self {
        Self {
            codes: BTreeSet::from([
                CLASS_LOW_VEGETATION,
                CLASS_MEDIUM_VEGETATION,
                CLASS_HIGH_VEGETATION,
            ]),
        }
    }

    /// The ground class (2)
    pub fn ground() -> Self {
        Self {
            codes: BTreeSet::from([CLASS_GROUND]),
        }
    }

    pub fn contains(&self, code: u8) -> bool {
        self.codes.contains(&code)
    }

    /// Iterates over all codes in ascending order
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        self.codes.iter().copied()
    }
}

impl Display for ClassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes = self
            .codes
            .iter()
            .map(|code| code.to_string())
            .collect::<Vec<_>>();
        write!(f, "{}", codes.join(","))
    }
}

/// Parses a comma-separated list of codes, e.g. `"3,4,5"`
impl FromStr for ClassSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codes = s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<u8>()
                    .map_err(|_| ConfigError::UnknownClassCode(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(codes)
    }
}
