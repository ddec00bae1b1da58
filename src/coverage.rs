//! Coverage map generation: cell dump in, KML/KMZ out.

use anyhow::Context;
use chrono::{DateTime, Local};
use log::info;
use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator},
    ThreadPool, ThreadPoolBuilder,
};

use crate::{
    archive,
    error::Result,
    geometry::GeometryTable,
    ingest::{self, BatchSummary},
    kml::{self, CellFeature},
    layer::classify_layer,
    model::{Cell, Site},
    normalize::{normalize_frequency, normalize_technology},
    registry::SiteDensity,
    sector,
    style::Palette,
};

pub fn coverage_name(now: DateTime<Local>) -> String {
    format!("Network_Coverage_{}", now.format("%Y%m%d_%H%M"))
}

/// Classifies and shapes a single cell. Pure, so cells can be handled in any order.
pub fn cell_feature(
    cell: &Cell,
    site: &Site,
    density: SiteDensity,
    table: &GeometryTable,
) -> CellFeature {
    let technology = normalize_technology(&cell.technology);
    let frequency = normalize_frequency(&cell.frequency, &technology);
    let layer = classify_layer(cell.traffic, &technology);
    let resolved = table.resolve(&technology, &frequency, cell.cell_type, density);
    let shape = sector::shape(
        site.longitude,
        site.latitude,
        cell.azimuth,
        cell.cell_type,
        resolved,
    );

    let description = format!(
        "Technology: {technology}\nFrequency: {frequency}\nVendor: {}\nAzimuth: {}\nTraffic: {} {}",
        cell.vendor,
        cell.azimuth,
        cell.traffic,
        technology.traffic_unit(),
    );

    CellFeature {
        name: cell.name.clone(),
        description,
        layer,
        shape,
    }
}

#[derive(Debug)]
pub struct CoverageMap {
    pub kml: Vec<u8>,
    pub summary: BatchSummary,
}

/// Owns everything a conversion reads but never changes, so one value can
/// serve every request.
pub struct Converter {
    table: GeometryTable,
    palette: Palette,
    pool: ThreadPool,
}

impl Converter {
    /// `workers == 0` sizes the pool to the number of CPUs.
    pub fn new(table: GeometryTable, palette: Palette, workers: usize) -> anyhow::Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("cellmap-worker-{i}"))
            .build()
            .context("Failed to start worker pool")?;
        Ok(Self {
            table,
            palette,
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn coverage_kml(&self, input: &[u8], name: &str) -> Result<CoverageMap> {
        let batch = ingest::ingest(input)?;
        let registry = &batch.registry;
        let cells = &batch.cells;

        // one slot per cell so output order is input order whatever the scheduling
        let mut features: Vec<Option<CellFeature>> = Vec::with_capacity(cells.len());
        features.resize_with(cells.len(), || None);
        self.pool.install(|| {
            features.par_iter_mut().enumerate().for_each(|(i, slot)| {
                let cell = &cells[i];
                let site = &registry.sites()[cell.site];
                *slot = Some(cell_feature(
                    cell,
                    site,
                    registry.density(cell.site),
                    &self.table,
                ));
            })
        });
        let features: Vec<CellFeature> = features.into_iter().flatten().collect();

        let kml = kml::coverage(name, &self.palette, registry, &features)?;
        info!(
            "{name}: {} sites, {} cells, {} bytes of kml",
            registry.len(),
            features.len(),
            kml.len()
        );

        Ok(CoverageMap {
            kml,
            summary: batch.summary,
        })
    }

    pub fn coverage_kmz(&self, input: &[u8], name: &str) -> Result<Vec<u8>> {
        let map = self.coverage_kml(input, name)?;
        archive::kmz(archive::KML_ENTRY, &map.kml)
    }
}
