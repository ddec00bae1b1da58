use std::collections::{HashMap, HashSet};

use crate::model::{Cell, CellType, Site};

/// What the geometry resolver needs to know about the site a cell sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SiteDensity {
    pub cells: usize,
    /// The site hosts at least one in-building omni cell.
    pub has_omni: bool,
}

/// Sites in first-seen order, plus counters derived from the full set of cells.
#[derive(Debug, Default)]
pub struct SiteRegistry {
    sites: Vec<Site>,
    index: HashMap<String, usize>,
    cell_counts: Vec<usize>,
    omni_sites: HashSet<usize>,
}

impl SiteRegistry {
    /// Returns the position of the site, inserting it if this id hasn't been seen.
    /// Attributes of a site that already exists are left untouched.
    pub fn insert(&mut self, site: Site) -> usize {
        if let Some(&i) = self.index.get(&site.id) {
            return i;
        }
        let i = self.sites.len();
        self.index.insert(site.id.clone(), i);
        self.sites.push(site);
        i
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Computes the per-site counters. Must run once all cells are known.
    pub fn count(&mut self, cells: &[Cell]) {
        self.cell_counts = vec![0; self.sites.len()];
        self.omni_sites.clear();
        for cell in cells {
            self.cell_counts[cell.site] += 1;
            if cell.cell_type == CellType::Omni {
                self.omni_sites.insert(cell.site);
            }
        }
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn cell_count(&self, site: usize) -> usize {
        self.cell_counts.get(site).copied().unwrap_or(0)
    }

    pub fn density(&self, site: usize) -> SiteDensity {
        SiteDensity {
            cells: self.cell_count(site),
            has_omni: self.omni_sites.contains(&site),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(id: &str, lat: f64) -> Site {
        Site {
            id: id.to_owned(),
            latitude: lat,
            longitude: 105.0,
            description: String::new(),
            province: String::new(),
            vendor: String::new(),
            tier: 1,
        }
    }

    fn cell(site: usize, cell_type: CellType) -> Cell {
        Cell {
            site_id: String::new(),
            site,
            name: String::new(),
            id: String::new(),
            technology: "LTE".to_owned(),
            frequency: "1300".to_owned(),
            azimuth: 0.0,
            height: 30.0,
            tilt: 2.0,
            horizontal_beamwidth: 65.0,
            vertical_beamwidth: 7.0,
            traffic: 1.0,
            vendor: String::new(),
            cell_type,
        }
    }

    #[test]
    fn first_seen_wins() {
        let mut registry = SiteRegistry::default();
        assert_eq!(registry.insert(site("A", 21.0)), 0);
        assert_eq!(registry.insert(site("B", 10.0)), 1);
        assert_eq!(registry.insert(site("A", 99.0)), 0);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sites()[0].latitude, 21.0);
        assert_eq!(registry.position("B"), Some(1));
        assert_eq!(registry.position("C"), None);
    }

    #[test]
    fn counters() {
        let mut registry = SiteRegistry::default();
        registry.insert(site("A", 21.0));
        registry.insert(site("B", 10.0));
        let cells = [
            cell(0, CellType::Directional),
            cell(0, CellType::Directional),
            cell(0, CellType::Omni),
            cell(1, CellType::Micro),
        ];
        registry.count(&cells);

        assert_eq!(
            registry.density(0),
            SiteDensity {
                cells: 3,
                has_omni: true
            }
        );
        assert_eq!(
            registry.density(1),
            SiteDensity {
                cells: 1,
                has_omni: false
            }
        );
    }
}
