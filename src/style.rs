//! Colors used by the coverage map. KML colors are `aabbggrr`.

use crate::layer::MAX_LAYER;

pub const SITE_ICON: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";

#[derive(Debug, Clone)]
pub struct Palette {
    /// Line color per traffic layer, lowest traffic first.
    pub layers: [&'static str; MAX_LAYER as usize],
    /// Fill alpha applied on top of the layer color.
    pub fill_alpha: &'static str,
    pub line_width: f64,
    /// Icon color per site tier.
    pub tiers: [&'static str; 6],
    pub site_scale: f64,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            // green, yellow-green, yellow, orange, red, purple
            layers: [
                "ff00c800", "ff00ffb4", "ff00ffff", "ff0096ff", "ff0000ff", "ffb4008c",
            ],
            fill_alpha: "80",
            line_width: 1.0,
            // grey, blue, cyan, green, orange, red
            tiers: [
                "ffa0a0a0", "ffff6400", "ffffff00", "ff00ff00", "ff00a5ff", "ff0000ff",
            ],
            site_scale: 0.8,
        }
    }
}

impl Palette {
    pub fn layer_style_id(layer: u8) -> String {
        format!("layer{}", layer.clamp(1, MAX_LAYER))
    }

    pub fn tier_style_id(tier: u8) -> String {
        format!("site{}", tier.clamp(1, 6))
    }

    pub fn layer_color(&self, layer: u8) -> &'static str {
        self.layers[usize::from(layer.clamp(1, MAX_LAYER)) - 1]
    }

    /// Layer color with the fill alpha swapped in.
    pub fn layer_fill(&self, layer: u8) -> String {
        format!("{}{}", self.fill_alpha, &self.layer_color(layer)[2..])
    }

    pub fn tier_color(&self, tier: u8) -> &'static str {
        self.tiers[usize::from(tier.clamp(1, 6)) - 1]
    }
}
