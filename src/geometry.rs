//! Radius and beamwidth of the shape drawn for each cell.
//!
//! Radii are in degrees since the shapes are drawn directly in lon/lat space.

use std::collections::HashMap;

use anyhow::{bail, Result};
use log::debug;
use serde::Deserialize;

use crate::{
    model::{CellRadio, CellType, Technology},
    normalize::{normalize_frequency, normalize_technology},
    registry::SiteDensity,
};

// sites with many cells get smaller shapes so sectors don't hide each other
const DENSE_SITE_CELLS: usize = 3;
const DENSE_SITE_FACTOR: f64 = 0.7;
const SHARED_SITE_FACTOR: f64 = 0.85;

const MICRO_FACTOR: f64 = 0.1;
const OMNI_FACTOR: f64 = 0.3;
// micro cells next to an omni cell on the same site
const COLOCATED_MICRO_FACTOR: f64 = 0.5;

/// Fallback when a technology/frequency pair isn't in the table.
const DEFAULT_SECTOR: Resolved = Resolved {
    radius: 0.01,
    beamwidth: 65.0,
};
const DEFAULT_OMNI: Resolved = Resolved {
    radius: 0.003,
    beamwidth: 360.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandGeometry {
    pub radius: f64,
    pub beamwidth: f64,
    /// Used instead of the sector pair for in-building omni cells.
    pub ibc_radius: f64,
    pub ibc_beamwidth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub radius: f64,
    pub beamwidth: f64,
}

/// Entry of the `[[geometry]]` list in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct BandConfig {
    pub technology: String,
    pub frequency: String,
    pub radius: f64,
    pub beamwidth: f64,
    pub ibc_radius: f64,
    pub ibc_beamwidth: f64,
}

const fn band(
    radio: CellRadio,
    frequency: &'static str,
    radius: f64,
    beamwidth: f64,
    ibc_radius: f64,
) -> (CellRadio, &'static str, BandGeometry) {
    (
        radio,
        frequency,
        BandGeometry {
            radius,
            beamwidth,
            ibc_radius,
            ibc_beamwidth: 360.0,
        },
    )
}

#[rustfmt::skip]
const BANDS: &[(CellRadio, &str, BandGeometry)] = &[
    band(CellRadio::Gsm, "900", 0.025, 65.0, 0.004),
    band(CellRadio::Gsm, "1800", 0.018, 60.0, 0.003),
    // UARFCN, band 8 then band 1
    band(CellRadio::Wcdma, "2937", 0.02, 65.0, 0.0035),
    band(CellRadio::Wcdma, "3011", 0.02, 65.0, 0.0035),
    band(CellRadio::Wcdma, "10562", 0.015, 60.0, 0.003),
    band(CellRadio::Wcdma, "10587", 0.015, 60.0, 0.003),
    band(CellRadio::Wcdma, "10612", 0.015, 60.0, 0.003),
    band(CellRadio::Wcdma, "10637", 0.015, 60.0, 0.003),
    // EARFCN, bands 1, 3, 7, 8, 40
    band(CellRadio::Lte, "100", 0.012, 55.0, 0.0025),
    band(CellRadio::Lte, "275", 0.012, 55.0, 0.0025),
    band(CellRadio::Lte, "1300", 0.013, 55.0, 0.0025),
    band(CellRadio::Lte, "1450", 0.013, 55.0, 0.0025),
    band(CellRadio::Lte, "1850", 0.013, 55.0, 0.0025),
    band(CellRadio::Lte, "3100", 0.009, 50.0, 0.002),
    band(CellRadio::Lte, "3350", 0.009, 50.0, 0.002),
    band(CellRadio::Lte, "3500", 0.017, 60.0, 0.003),
    band(CellRadio::Lte, "3625", 0.017, 60.0, 0.003),
    band(CellRadio::Lte, "38950", 0.008, 45.0, 0.0018),
    // NR-ARFCN or plain MHz, depending on the vendor export
    band(CellRadio::Nr, "3800", 0.006, 40.0, 0.0015),
    band(CellRadio::Nr, "3500", 0.007, 40.0, 0.0015),
    band(CellRadio::Nr, "630000", 0.007, 40.0, 0.0015),
    band(CellRadio::Nr, "643334", 0.006, 40.0, 0.0015),
    band(CellRadio::Nr, "152690", 0.02, 65.0, 0.003),
];

/// Immutable lookup from (generation, canonical frequency) to band geometry.
#[derive(Debug, Clone)]
pub struct GeometryTable {
    bands: HashMap<CellRadio, HashMap<String, BandGeometry>>,
}

impl Default for GeometryTable {
    fn default() -> Self {
        let mut bands: HashMap<CellRadio, HashMap<String, BandGeometry>> = HashMap::new();
        for (radio, frequency, geometry) in BANDS {
            bands
                .entry(*radio)
                .or_default()
                .insert(frequency.to_string(), *geometry);
        }
        Self { bands }
    }
}

impl GeometryTable {
    /// Built-in bands with the configured entries added on top.
    pub fn with_overrides(overrides: &[BandConfig]) -> Result<Self> {
        let mut table = Self::default();
        for entry in overrides {
            let technology = normalize_technology(&entry.technology);
            let Some(radio) = technology.radio() else {
                bail!("unknown technology in geometry config: {}", entry.technology);
            };
            if !(entry.radius > 0.0 && entry.ibc_radius > 0.0) {
                bail!("geometry radius must be positive for {} {}", radio, entry.frequency);
            }
            if !(0.0..=360.0).contains(&entry.beamwidth)
                || !(0.0..=360.0).contains(&entry.ibc_beamwidth)
            {
                bail!("beamwidth must be within 0..=360 for {} {}", radio, entry.frequency);
            }

            let frequency = normalize_frequency(&entry.frequency, &technology);
            table.bands.entry(radio).or_default().insert(
                frequency,
                BandGeometry {
                    radius: entry.radius,
                    beamwidth: entry.beamwidth,
                    ibc_radius: entry.ibc_radius,
                    ibc_beamwidth: entry.ibc_beamwidth,
                },
            );
        }
        Ok(table)
    }

    pub fn lookup(&self, technology: &Technology, frequency: &str) -> Option<&BandGeometry> {
        self.bands.get(&technology.radio()?)?.get(frequency)
    }

    pub fn resolve(
        &self,
        technology: &Technology,
        frequency: &str,
        cell_type: CellType,
        density: SiteDensity,
    ) -> Resolved {
        let Some(band) = self.lookup(technology, frequency) else {
            debug!("no geometry for {technology} {frequency:?}, using defaults");
            return match cell_type {
                CellType::Directional => DEFAULT_SECTOR,
                CellType::Micro => Resolved {
                    radius: DEFAULT_SECTOR.radius * MICRO_FACTOR,
                    ..DEFAULT_SECTOR
                },
                CellType::Omni => DEFAULT_OMNI,
            };
        };

        let (mut radius, beamwidth) = match cell_type {
            CellType::Omni => (band.ibc_radius, band.ibc_beamwidth),
            _ => (band.radius, band.beamwidth),
        };

        if density.cells > DENSE_SITE_CELLS {
            radius *= DENSE_SITE_FACTOR;
        } else if density.cells > 1 {
            radius *= SHARED_SITE_FACTOR;
        }

        match cell_type {
            CellType::Directional => {}
            CellType::Micro => {
                radius *= MICRO_FACTOR;
                if density.has_omni {
                    radius *= COLOCATED_MICRO_FACTOR;
                }
            }
            CellType::Omni => radius *= OMNI_FACTOR,
        }

        Resolved { radius, beamwidth }
    }
}
