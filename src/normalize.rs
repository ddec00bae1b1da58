//! Cleanup of the free-text technology and frequency columns.
//!
//! Exports from different vendors label the same band in many ways ("LTE1800",
//! "4G", "L1800", "n77", ...). Everything downstream keys on the canonical
//! tokens produced here.

use crate::model::{CellRadio, Technology};

// checked in order, the first marker found wins
const MARKERS: [(&str, &str, CellRadio); 4] = [
    ("2G", "GSM", CellRadio::Gsm),
    ("3G", "UMTS", CellRadio::Wcdma),
    ("4G", "LTE", CellRadio::Lte),
    ("5G", "NR", CellRadio::Nr),
];

pub fn normalize_technology(raw: &str) -> Technology {
    let label = raw.trim().to_uppercase();
    for (generation, marker, radio) in MARKERS {
        if label.contains(generation) || label.contains(marker) {
            return Technology::Radio(radio);
        }
    }
    Technology::Unknown(label)
}

pub fn normalize_frequency(raw: &str, technology: &Technology) -> String {
    let raw = raw.trim();

    // 5G band alias
    if raw.eq_ignore_ascii_case("n77") {
        return "3800".to_owned();
    }
    // known mislabel in 3G exports
    if raw == "1874" && technology.radio() == Some(CellRadio::Wcdma) {
        return "10587".to_owned();
    }

    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if technology.radio() != Some(CellRadio::Gsm) {
        return cleaned;
    }

    // 2G is only deployed on 900 and 1800
    match cleaned.as_str() {
        "900" | "1800" => cleaned,
        _ => {
            let value: f64 = cleaned.parse().unwrap_or(0.0);
            if value < 1000.0 {
                "900".to_owned()
            } else {
                "1800".to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn technology_markers() {
        assert_eq!(normalize_technology("gsm900"), Technology::Radio(CellRadio::Gsm));
        assert_eq!(normalize_technology(" UMTS "), Technology::Radio(CellRadio::Wcdma));
        assert_eq!(normalize_technology("Lte1800"), Technology::Radio(CellRadio::Lte));
        assert_eq!(normalize_technology("nr3500"), Technology::Radio(CellRadio::Nr));
        assert_eq!(normalize_technology("4G"), Technology::Radio(CellRadio::Lte));
        assert_eq!(
            normalize_technology("wimax"),
            Technology::Unknown("WIMAX".to_owned())
        );
    }

    #[test]
    fn technology_is_idempotent() {
        for raw in ["GSM", "umts2100", "LTE", "NR", "5g sa", "cdma", "", "TD-SCDMA"] {
            let once = normalize_technology(raw);
            let twice = normalize_technology(&once.to_string());
            assert_eq!(once, twice, "{raw}");
        }
    }

    #[test]
    fn frequency_aliases() {
        let nr = Technology::Radio(CellRadio::Nr);
        let umts = Technology::Radio(CellRadio::Wcdma);
        let lte = Technology::Radio(CellRadio::Lte);

        assert_eq!(normalize_frequency("n77", &nr), "3800");
        assert_eq!(normalize_frequency("N77", &lte), "3800");
        assert_eq!(normalize_frequency("1874", &umts), "10587");
        assert_eq!(normalize_frequency("1874", &lte), "1874");
        assert_eq!(normalize_frequency("EARFCN 1300", &lte), "1300");
        assert_eq!(normalize_frequency("n/a", &lte), "");
    }

    #[test]
    fn gsm_frequency_is_900_or_1800() {
        let gsm = Technology::Radio(CellRadio::Gsm);
        for raw in [
            "900",
            "1800",
            "GSM900",
            "850",
            "1900",
            "62",
            "",
            "abc",
            "99999999999999999999999",
        ] {
            let freq = normalize_frequency(raw, &gsm);
            assert!(freq == "900" || freq == "1800", "{raw} -> {freq}");
        }
        assert_eq!(normalize_frequency("850", &gsm), "900");
        assert_eq!(normalize_frequency("1900", &gsm), "1800");
        assert_eq!(normalize_frequency("G1800", &gsm), "1800");
    }
}
