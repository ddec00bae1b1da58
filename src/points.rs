//! Plain site markers, one placemark per row, in a single caller-chosen style.

use chrono::{DateTime, Local};
use csv::Trim;
use geo_types::Point;
use log::{info, warn};
use serde::Deserialize;

use crate::{
    error::{ConvertError, Result},
    ingest::{self, line_of, line_of_error},
    kml::KmlWriter,
};

pub const REQUIRED_COLUMNS: [&str; 3] = ["SITEID", "LAT", "LONG"];
const STYLE_ID: &str = "customStyle";

pub fn points_name(now: DateTime<Local>) -> String {
    format!("Network_Sites_{}", now.format("%Y%m%d_%H%M"))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// KML `aabbggrr` color.
    pub color: String,
    #[serde(alias = "scale")]
    pub size: f64,
    /// Name of a shape from the Google Earth icon set.
    pub icon: String,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            color: "ff00ff00".to_owned(),
            size: 1.0,
            icon: "placemark_circle".to_owned(),
        }
    }
}

impl PointStyle {
    pub fn validate(&self) -> Result<()> {
        if self.color.len() != 8 || !self.color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConvertError::InvalidOption(format!(
                "color must be 8 hex digits (aabbggrr), got {:?}",
                self.color
            )));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(ConvertError::InvalidOption(format!(
                "size must be a positive number, got {}",
                self.size
            )));
        }
        if self.icon.is_empty()
            || !self
                .icon
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConvertError::InvalidOption(format!(
                "icon must be a shape name, got {:?}",
                self.icon
            )));
        }
        Ok(())
    }

    fn href(&self) -> String {
        format!(
            "http://maps.google.com/mapfiles/kml/shapes/{}.png",
            self.icon
        )
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(rename = "SITEID")]
    site_id: String,
    #[serde(rename = "LAT")]
    latitude: f64,
    #[serde(rename = "LONG")]
    longitude: f64,
}

pub fn render(input: &[u8], style: &PointStyle, name: &str) -> Result<Vec<u8>> {
    style.validate()?;
    let (mut reader, headers) = ingest::open(input, &REQUIRED_COLUMNS, Trim::All)?;

    let mut points = Vec::new();
    for result in reader.records() {
        let row = match result {
            Ok(x) => x,
            Err(e) => {
                warn!("skipping line {}: {e}", line_of_error(&e));
                continue;
            }
        };
        let record: Record = match row.deserialize(Some(&headers)) {
            Ok(x) => x,
            Err(e) => {
                warn!("skipping line {}: {e}", line_of(&row));
                continue;
            }
        };
        if !(-90.0..=90.0).contains(&record.latitude)
            || !(-180.0..=180.0).contains(&record.longitude)
        {
            warn!("skipping line {}: coordinates out of range", line_of(&row));
            continue;
        }
        points.push(record);
    }

    if points.is_empty() {
        return Err(ConvertError::NoValidData);
    }
    info!("{name}: {} points", points.len());

    let mut kml = KmlWriter::new(Vec::new(), name)?;
    kml.icon_style(STYLE_ID, &style.color, style.size, &style.href())?;
    for record in &points {
        kml.point(
            &record.site_id,
            "",
            STYLE_ID,
            Point::new(record.longitude, record.latitude),
        )?;
    }
    kml.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kml::tests::parse;

    #[test]
    fn one_placemark_per_row() {
        let csv = "SITEID,LAT,LONG,OTHER\n\
                   A,21.0,105.8,x\n\
                   A,21.0,105.8,y\n\
                   B,oops,105.8,z\n\
                   C,10.5,106.6,w\n";
        let bytes = render(csv.as_bytes(), &PointStyle::default(), "Network_Sites_test").unwrap();
        let parsed = parse(&bytes);
        assert_eq!(parsed.placemarks, 3);
        assert_eq!(parsed.style_ids.len(), 1);
        assert!(parsed.style_urls.iter().all(|url| url == "#customStyle"));

        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("shapes/placemark_circle.png"));
        assert!(text.contains("<color>ff00ff00</color>"));
    }

    #[test]
    fn options_are_checked() {
        let csv = b"SITEID,LAT,LONG\nA,21.0,105.8\n";
        for style in [
            PointStyle {
                color: "red".to_owned(),
                ..Default::default()
            },
            PointStyle {
                size: -1.0,
                ..Default::default()
            },
            PointStyle {
                icon: "../../evil".to_owned(),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                render(csv, &style, "x"),
                Err(ConvertError::InvalidOption(_))
            ));
        }
    }

    #[test]
    fn batch_errors() {
        assert!(matches!(
            render(b"SITEID,LONG\nA,1\n", &PointStyle::default(), "x"),
            Err(ConvertError::MissingColumns(columns)) if columns == vec!["LAT"]
        ));
        assert!(matches!(
            render(b"SITEID,LAT,LONG\nA,x,1\n", &PointStyle::default(), "x"),
            Err(ConvertError::NoValidData)
        ));
    }
}
