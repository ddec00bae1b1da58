//! KML output.

use std::io::Write;

use geo::BoundingRect;
use geo_types::{Coord, Line, MultiPoint, Point, Polygon};
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    error::Result,
    layer::MAX_LAYER,
    registry::SiteRegistry,
    sector::SectorShape,
    style::{Palette, SITE_ICON},
};

const KML_NS: &str = "http://www.opengis.net/kml/2.2";
// rough meters per degree, only used to frame the initial view
const METERS_PER_DEGREE: f64 = 111_000.0;
const MIN_VIEW_RANGE: f64 = 2_000.0;

/// Everything needed to draw one cell, computed ahead of writing.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFeature {
    pub name: String,
    pub description: String,
    pub layer: u8,
    pub shape: SectorShape,
}

fn coordinates<'a>(coords: impl IntoIterator<Item = &'a Coord<f64>>) -> String {
    coords
        .into_iter()
        .map(|c| format!("{:.6},{:.6},0", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct KmlWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> KmlWriter<W> {
    /// Writes the xml declaration and opens the document.
    pub fn new(inner: W, name: &str) -> Result<Self> {
        let mut kml = Self {
            writer: Writer::new_with_indent(inner, b' ', 1),
        };
        kml.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("kml");
        root.push_attribute(("xmlns", KML_NS));
        kml.writer.write_event(Event::Start(root))?;
        kml.start("Document")?;
        kml.element("name", name)?;
        Ok(kml)
    }

    /// Closes the document and returns the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.end("Document")?;
        self.end("kml")?;
        Ok(self.writer.into_inner())
    }

    fn start(&mut self, tag: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        Ok(())
    }

    fn start_with_id(&mut self, tag: &str, id: &str) -> Result<()> {
        let mut start = BytesStart::new(tag);
        start.push_attribute(("id", id));
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn end(&mut self, tag: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.start(tag)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(tag)
    }

    pub fn start_folder(&mut self, name: &str) -> Result<()> {
        self.start("Folder")?;
        self.element("name", name)
    }

    pub fn end_folder(&mut self) -> Result<()> {
        self.end("Folder")
    }

    pub fn look_at(&mut self, longitude: f64, latitude: f64, range: f64) -> Result<()> {
        self.start("LookAt")?;
        self.element("longitude", &format!("{longitude:.6}"))?;
        self.element("latitude", &format!("{latitude:.6}"))?;
        self.element("altitude", "0")?;
        self.element("heading", "0")?;
        self.element("tilt", "0")?;
        self.element("range", &format!("{range:.0}"))?;
        self.end("LookAt")
    }

    pub fn area_style(&mut self, id: &str, line: &str, width: f64, fill: &str) -> Result<()> {
        self.start_with_id("Style", id)?;
        self.start("LineStyle")?;
        self.element("color", line)?;
        self.element("width", &width.to_string())?;
        self.end("LineStyle")?;
        self.start("PolyStyle")?;
        self.element("color", fill)?;
        self.end("PolyStyle")?;
        self.end("Style")
    }

    pub fn icon_style(&mut self, id: &str, color: &str, scale: f64, href: &str) -> Result<()> {
        self.start_with_id("Style", id)?;
        self.start("IconStyle")?;
        self.element("color", color)?;
        self.element("scale", &scale.to_string())?;
        self.start("Icon")?;
        self.element("href", href)?;
        self.end("Icon")?;
        self.end("IconStyle")?;
        self.end("Style")
    }

    fn start_placemark(&mut self, name: &str, description: &str, style_id: &str) -> Result<()> {
        self.start("Placemark")?;
        self.element("name", name)?;
        if !description.is_empty() {
            self.element("description", description)?;
        }
        self.element("styleUrl", &format!("#{style_id}"))
    }

    pub fn point(
        &mut self,
        name: &str,
        description: &str,
        style_id: &str,
        point: Point<f64>,
    ) -> Result<()> {
        self.start_placemark(name, description, style_id)?;
        self.start("Point")?;
        self.element("coordinates", &coordinates([&point.0]))?;
        self.end("Point")?;
        self.end("Placemark")
    }

    pub fn polygon(
        &mut self,
        name: &str,
        description: &str,
        style_id: &str,
        polygon: &Polygon<f64>,
    ) -> Result<()> {
        self.start_placemark(name, description, style_id)?;
        self.start("Polygon")?;
        self.start("outerBoundaryIs")?;
        self.start("LinearRing")?;
        self.element("coordinates", &coordinates(polygon.exterior().coords()))?;
        self.end("LinearRing")?;
        self.end("outerBoundaryIs")?;
        self.end("Polygon")?;
        self.end("Placemark")
    }

    pub fn line(&mut self, name: &str, style_id: &str, line: &Line<f64>) -> Result<()> {
        self.start_placemark(name, "", style_id)?;
        self.start("LineString")?;
        self.element("coordinates", &coordinates([&line.start, &line.end]))?;
        self.end("LineString")?;
        self.end("Placemark")
    }
}

fn site_description(province: &str, kind: &str, tier: u8, vendor: &str, cells: usize) -> String {
    format!("Province: {province}\nType: {kind}\nTier: {tier}\nVendor: {vendor}\nCells: {cells}")
}

/// Writes the coverage map: layer and tier styles, then a `Sites` folder and a
/// `Cells` folder. `features` must be in input order.
pub fn coverage(
    name: &str,
    palette: &Palette,
    registry: &SiteRegistry,
    features: &[CellFeature],
) -> Result<Vec<u8>> {
    let mut kml = KmlWriter::new(Vec::new(), name)?;

    let sites: MultiPoint<f64> = registry
        .sites()
        .iter()
        .map(|site| Point::new(site.longitude, site.latitude))
        .collect();
    if let Some(rect) = sites.bounding_rect() {
        let center = rect.center();
        let span = rect.width().max(rect.height());
        kml.look_at(
            center.x,
            center.y,
            (span * METERS_PER_DEGREE * 1.5).max(MIN_VIEW_RANGE),
        )?;
    }

    for layer in 1..=MAX_LAYER {
        kml.area_style(
            &Palette::layer_style_id(layer),
            palette.layer_color(layer),
            palette.line_width,
            &palette.layer_fill(layer),
        )?;
    }
    for tier in 1..=6 {
        kml.icon_style(
            &Palette::tier_style_id(tier),
            palette.tier_color(tier),
            palette.site_scale,
            SITE_ICON,
        )?;
    }

    kml.start_folder("Sites")?;
    for (i, site) in registry.sites().iter().enumerate() {
        let description = site_description(
            &site.province,
            &site.description,
            site.tier,
            &site.vendor,
            registry.cell_count(i),
        );
        kml.point(
            &site.id,
            &description,
            &Palette::tier_style_id(site.tier),
            Point::new(site.longitude, site.latitude),
        )?;
    }
    kml.end_folder()?;

    kml.start_folder("Cells")?;
    for feature in features {
        let style_id = Palette::layer_style_id(feature.layer);
        kml.polygon(
            &feature.name,
            &feature.description,
            &style_id,
            &feature.shape.polygon,
        )?;
        if let Some(pointer) = &feature.shape.pointer {
            kml.line(&format!("{} beam", feature.name), &style_id, pointer)?;
        }
    }
    kml.end_folder()?;

    kml.finish()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use geo_types::{coord, LineString};
    use quick_xml::Reader;

    use super::*;

    /// Parsed view of a written document.
    #[derive(Debug, Default)]
    pub struct Parsed {
        pub placemarks: usize,
        pub style_ids: BTreeSet<String>,
        pub style_urls: Vec<String>,
        pub names: Vec<String>,
    }

    /// Reads the document back, failing on malformed xml.
    pub fn parse(bytes: &[u8]) -> Parsed {
        let text = std::str::from_utf8(bytes).unwrap();
        let mut reader = Reader::from_str(text);
        let mut parsed = Parsed::default();
        let mut current = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Eof => break,
                Event::Start(e) => {
                    current = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    if current == "Placemark" {
                        parsed.placemarks += 1;
                    }
                    if current == "Style" {
                        let id = e.try_get_attribute("id").unwrap().unwrap();
                        parsed
                            .style_ids
                            .insert(String::from_utf8(id.value.to_vec()).unwrap());
                    }
                }
                Event::Text(t) => {
                    let value = t.unescape().unwrap().trim().to_owned();
                    if value.is_empty() {
                        continue;
                    }
                    match current.as_str() {
                        "styleUrl" => parsed.style_urls.push(value),
                        "name" => parsed.names.push(value),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        parsed
    }

    #[test]
    fn escapes_text() {
        let mut kml = KmlWriter::new(Vec::new(), "a & b <c>").unwrap();
        kml.point("x\"y", "1 < 2", "site1", Point::new(1.0, 2.0)).unwrap();
        let bytes = kml.finish().unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("a &amp; b &lt;c&gt;"));
        assert!(text.contains("1.000000,2.000000,0"));

        let parsed = parse(&bytes);
        assert_eq!(parsed.placemarks, 1);
        assert_eq!(parsed.names, vec!["a & b <c>", "x\"y"]);
    }

    #[test]
    fn polygon_and_pointer() {
        let ring = LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        let feature = CellFeature {
            name: "CELL1".to_owned(),
            description: "Technology: 4G".to_owned(),
            layer: 3,
            shape: SectorShape {
                polygon: Polygon::new(ring, vec![]),
                pointer: Some(Line::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.0, y: 1.2 })),
            },
        };
        let mut registry = SiteRegistry::default();
        registry.insert(crate::model::Site {
            id: "S1".to_owned(),
            latitude: 0.0,
            longitude: 0.0,
            description: "Macro".to_owned(),
            province: "Hue".to_owned(),
            vendor: "Nokia".to_owned(),
            tier: 4,
        });
        registry.count(&[]);

        let bytes = coverage("test", &Palette::default(), &registry, &[feature]).unwrap();
        let parsed = parse(&bytes);
        assert_eq!(parsed.placemarks, 3);
        assert_eq!(parsed.style_ids.len(), 12);
        assert_eq!(parsed.style_urls, vec!["#site4", "#layer3", "#layer3"]);
        assert!(parsed.names.contains(&"CELL1 beam".to_owned()));

        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<LookAt>"));
        assert!(text.contains(
            "0.000000,0.000000,0 1.000000,0.000000,0 0.000000,1.000000,0 0.000000,0.000000,0"
        ));
    }
}
