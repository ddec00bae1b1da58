use std::fmt;

use strum::{Display, EnumIter, FromRepr};

/// Radio generation a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum CellRadio {
    #[strum(to_string = "2G")]
    Gsm,
    #[strum(to_string = "3G")]
    Wcdma,
    #[strum(to_string = "4G")]
    Lte,
    #[strum(to_string = "5G")]
    Nr,
}

/// Normalized technology label. Labels that don't name a known generation are
/// kept as their uppercased literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Technology {
    Radio(CellRadio),
    Unknown(String),
}

impl Technology {
    pub fn radio(&self) -> Option<CellRadio> {
        match self {
            Technology::Radio(radio) => Some(*radio),
            Technology::Unknown(_) => None,
        }
    }

    /// Unit the traffic column is expressed in for this technology.
    pub fn traffic_unit(&self) -> &'static str {
        match self {
            Technology::Radio(CellRadio::Gsm | CellRadio::Wcdma) => "Erl",
            _ => "GB",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Technology::Radio(radio) => write!(f, "{radio}"),
            Technology::Unknown(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u8)]
pub enum CellType {
    /// Outdoor sector antenna, drawn as a wedge.
    Directional = 0,
    /// In-building micro cell.
    Micro = 1,
    /// In-building macro/omni cell, drawn as a circle with a beam pointer.
    Omni = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub province: String,
    pub vendor: String,
    /// Site classification, clamped to 1..=6.
    pub tier: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub site_id: String,
    /// Position of the owning site in the registry.
    pub site: usize,
    pub name: String,
    pub id: String,
    pub technology: String,
    pub frequency: String,
    /// Degrees in `[0, 360)`.
    pub azimuth: f64,
    pub height: f64,
    pub tilt: f64,
    pub horizontal_beamwidth: f64,
    pub vertical_beamwidth: f64,
    pub traffic: f64,
    pub vendor: String,
    pub cell_type: CellType,
}
