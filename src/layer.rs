use crate::model::{CellRadio, Technology};

/// Highest layer any technology can be classified into.
pub const MAX_LAYER: u8 = 6;

/// Maps the traffic of a cell onto one of the visual layers.
///
/// 2G/3G traffic is voice in Erlang, 4G/5G is data volume in GB, so every
/// generation has its own ladder. Unknown technologies use the 5G one.
pub fn classify_layer(traffic: f64, technology: &Technology) -> u8 {
    match technology.radio() {
        Some(CellRadio::Gsm) => {
            if traffic > 30.0 {
                5
            } else if traffic > 20.0 {
                4
            } else if traffic > 5.0 {
                3
            } else if traffic > 1.0 {
                2
            } else {
                1
            }
        }
        Some(CellRadio::Wcdma) => {
            if traffic > 5.0 {
                5
            } else if traffic > 3.0 {
                4
            } else if traffic > 1.0 {
                3
            } else if traffic > 0.3 {
                2
            } else {
                1
            }
        }
        Some(CellRadio::Lte) => {
            if traffic > 500.0 {
                5
            } else if traffic > 200.0 {
                4
            } else if traffic > 50.0 {
                3
            } else if traffic > 10.0 {
                2
            } else {
                1
            }
        }
        // NOTE: the > 5000 rung can never match since > 1000 is checked first.
        // Kept until product confirms which threshold layer 4 should use.
        Some(CellRadio::Nr) | None => {
            if traffic > 10_000.0 {
                6
            } else if traffic > 1_000.0 {
                5
            } else if traffic > 5_000.0 {
                4
            } else if traffic > 200.0 {
                3
            } else if traffic > 50.0 {
                2
            } else {
                1
            }
        }
    }
}
