//! Shapes drawn for each cell.
//!
//! Distances are applied in plain lon/lat degrees. That's a small-angle
//! approximation, good enough at the scale of a single antenna sector.

use geo_types::{coord, Coord, Line, LineString, Polygon};

use crate::{geometry::Resolved, model::CellType};

/// Number of intervals along the arc of a directional wedge.
pub const ARC_STEPS: usize = 12;
/// Number of intervals around an omni circle.
pub const CIRCLE_STEPS: usize = 24;
/// Length of the beam pointer relative to the radius.
pub const POINTER_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct SectorShape {
    pub polygon: Polygon<f64>,
    /// Azimuth indicator for in-building omni cells.
    pub pointer: Option<Line<f64>>,
}

/// Position reached from `anchor` going `distance` along a compass `bearing` in degrees.
fn along_bearing(anchor: Coord<f64>, bearing: f64, distance: f64) -> Coord<f64> {
    let rad = bearing.to_radians();
    coord! {
        x: anchor.x + distance * rad.sin(),
        y: anchor.y + distance * rad.cos(),
    }
}

pub fn wedge(anchor: Coord<f64>, azimuth: f64, beamwidth: f64, radius: f64) -> LineString<f64> {
    let start = azimuth - beamwidth / 2.0;
    let step = beamwidth / ARC_STEPS as f64;

    let mut ring = Vec::with_capacity(ARC_STEPS + 3);
    ring.push(anchor);
    for i in 0..=ARC_STEPS {
        ring.push(along_bearing(anchor, start + step * i as f64, radius));
    }
    ring.push(anchor);
    LineString::new(ring)
}

pub fn circle(anchor: Coord<f64>, radius: f64) -> LineString<f64> {
    let mut ring = Vec::with_capacity(CIRCLE_STEPS + 1);
    for i in 0..CIRCLE_STEPS {
        let angle = std::f64::consts::TAU * i as f64 / CIRCLE_STEPS as f64;
        ring.push(coord! {
            x: anchor.x + radius * angle.cos(),
            y: anchor.y + radius * angle.sin(),
        });
    }
    ring.push(ring[0]);
    LineString::new(ring)
}

pub fn pointer(anchor: Coord<f64>, azimuth: f64, radius: f64) -> Line<f64> {
    Line::new(anchor, along_bearing(anchor, azimuth, radius * POINTER_FACTOR))
}

/// Builds the shape of a cell on a site at (`longitude`, `latitude`).
pub fn shape(
    longitude: f64,
    latitude: f64,
    azimuth: f64,
    cell_type: CellType,
    resolved: Resolved,
) -> SectorShape {
    let anchor = coord! { x: longitude, y: latitude };
    match cell_type {
        CellType::Directional => SectorShape {
            polygon: Polygon::new(
                wedge(anchor, azimuth, resolved.beamwidth, resolved.radius),
                vec![],
            ),
            pointer: None,
        },
        CellType::Micro => SectorShape {
            polygon: Polygon::new(circle(anchor, resolved.radius), vec![]),
            pointer: None,
        },
        CellType::Omni => SectorShape {
            polygon: Polygon::new(circle(anchor, resolved.radius), vec![]),
            pointer: Some(pointer(anchor, azimuth, resolved.radius)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
        (a.x - b.x).hypot(a.y - b.y)
    }

    fn bearing(anchor: Coord<f64>, p: Coord<f64>) -> f64 {
        (p.x - anchor.x).atan2(p.y - anchor.y).to_degrees()
    }

    #[test]
    fn wedge_north() {
        let anchor = coord! { x: 105.8, y: 21.0 };
        let r = 0.01;
        let ring = wedge(anchor, 0.0, 90.0, r);
        let points: Vec<_> = ring.coords().copied().collect();

        assert_eq!(points.len(), ARC_STEPS + 3);
        assert!(ring.is_closed());
        assert_eq!(points[0], anchor);
        for p in &points {
            assert!(distance(anchor, *p) <= r + 1e-12);
        }
        assert!((bearing(anchor, points[1]) + 45.0).abs() < 1e-9);
        assert!((bearing(anchor, points[ARC_STEPS + 1]) - 45.0).abs() < 1e-9);
        assert!(bearing(anchor, points[7]).abs() < 1e-9);
    }

    #[test]
    fn wedge_east() {
        let anchor = coord! { x: 0.0, y: 0.0 };
        let ring = wedge(anchor, 90.0, 60.0, 1.0);
        let middle = ring.0[7];
        assert!((middle.x - 1.0).abs() < 1e-12);
        assert!(middle.y.abs() < 1e-12);
    }

    #[test]
    fn circle_has_25_points() {
        let anchor = coord! { x: 106.7, y: 10.8 };
        for r in [0.0, 0.0003, 0.01, 5.0] {
            let ring = circle(anchor, r);
            assert_eq!(ring.0.len(), CIRCLE_STEPS + 1);
            assert!(ring.is_closed());
            assert_eq!(ring.0[0], coord! { x: 106.7 + r, y: 10.8 });
        }
    }

    #[test]
    fn omni_has_pointer() {
        let resolved = Resolved {
            radius: 0.002,
            beamwidth: 360.0,
        };
        let omni = shape(105.0, 21.0, 180.0, CellType::Omni, resolved);
        let pointer = omni.pointer.unwrap();
        assert_eq!(pointer.start, coord! { x: 105.0, y: 21.0 });
        assert!((pointer.end.y - (21.0 - 0.0024)).abs() < 1e-12);
        assert!((pointer.end.x - 105.0).abs() < 1e-12);
        assert_eq!(omni.polygon.exterior().0.len(), 25);

        let micro = shape(105.0, 21.0, 180.0, CellType::Micro, resolved);
        assert!(micro.pointer.is_none());
        assert_eq!(micro.polygon.exterior().0.len(), 25);

        let directional = Resolved {
            radius: 0.01,
            beamwidth: 65.0,
        };
        let sector = shape(105.0, 21.0, 180.0, CellType::Directional, directional);
        assert!(sector.pointer.is_none());
        assert_eq!(sector.polygon.exterior().0.len(), 15);
    }
}
