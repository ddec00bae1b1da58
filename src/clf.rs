//! CLF export: selected columns reordered into `;` separated lines.

use chrono::{DateTime, Local};
use csv::{QuoteStyle, StringRecord, Terminator, Trim, WriterBuilder};
use log::{info, warn};

use crate::{
    error::{ConvertError, Result},
    ingest::{self, line_of, line_of_error},
};

/// Output fields, in output order.
pub const COLUMNS: [&str; 16] = [
    "MCCMNC",
    "CELLID",
    "LAC",
    "TYPE",
    "LAT",
    "LONG",
    "POS-RAT",
    "DESC",
    "SYSCLF",
    "CELLNAME",
    "AZIMUTH",
    "ANT_HEIGHT",
    "HBW",
    "VBW",
    "TILT",
    "SITEID",
];

pub fn clf_name(now: DateTime<Local>) -> String {
    format!("Network_Data_{}", now.format("%Y%m%d_%H%M"))
}

/// Fields pass through untouched: no trimming, no quoting.
pub fn convert(input: &[u8]) -> Result<String> {
    let (mut reader, headers) = ingest::open(input, &COLUMNS, Trim::None)?;
    // open() guarantees every column is present
    let positions: Vec<usize> = COLUMNS
        .iter()
        .filter_map(|column| headers.iter().position(|h| h == *column))
        .collect();

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut lines = 0;
    for result in reader.records() {
        let row = match result {
            Ok(x) => x,
            Err(e) => {
                warn!("skipping line {}: {e}", line_of_error(&e));
                continue;
            }
        };
        let fields: StringRecord = positions.iter().map(|&i| &row[i]).collect();
        if let Err(e) = writer.write_record(&fields) {
            warn!("skipping line {}: {e}", line_of(&row));
            continue;
        }
        lines += 1;
    }

    if lines == 0 {
        return Err(ConvertError::NoValidData);
    }
    info!("converted {lines} rows to clf");

    let data = writer
        .into_inner()
        .map_err(|e| ConvertError::Io(e.into_error()))?;
    let mut text = String::from_utf8(data)
        .map_err(|e| ConvertError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    // lines are separated, not terminated
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "SITEID,CELLNAME,MCCMNC,CELLID,LAC,TYPE,LAT,LONG,POS-RAT,DESC,SYSCLF,AZIMUTH,ANT_HEIGHT,HBW,VBW,TILT,EXTRA";

    #[test]
    fn reorders_columns() {
        let csv = format!(
            "{HEADER}\nS1,C1,45204,123,4001,0,21.0,105.8,4G,Macro,3,120,30,65,7,3,ignored\n\
             S2,C2,45204,124,4001,2,10.5,106.6,5G,Indoor,4,0,12,360,30,0,ignored\n"
        );
        let clf = convert(csv.as_bytes()).unwrap();
        let lines: Vec<_> = clf.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "45204;123;4001;0;21.0;105.8;4G;Macro;3;C1;120;30;65;7;3;S1"
        );
        assert!(!clf.ends_with('\n'));
    }

    #[test]
    fn short_rows_are_dropped() {
        let csv = format!(
            "{HEADER}\nS1,C1,45204\nS2,C2,45204,124,4001,2,10.5,106.6,5G,Indoor,4,0,12,360,30,0,x\n"
        );
        let clf = convert(csv.as_bytes()).unwrap();
        assert_eq!(clf.lines().count(), 1);
        assert!(clf.ends_with(";S2"));
    }

    #[test]
    fn fields_are_copied_verbatim() {
        let csv = format!(
            "{HEADER}\nS1,C1,45204,123,4001,0,21.0,105.8,4G,\" Macro; roof \",3,120,30,65,7,3,x\n"
        );
        let clf = convert(csv.as_bytes()).unwrap();
        assert_eq!(
            clf,
            "45204;123;4001;0;21.0;105.8;4G; Macro; roof ;3;C1;120;30;65;7;3;S1"
        );
    }

    #[test]
    fn batch_errors() {
        match convert(b"SITEID,CELLNAME\n") {
            Err(ConvertError::MissingColumns(columns)) => assert_eq!(columns.len(), 14),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            convert(format!("{HEADER}\n").as_bytes()),
            Err(ConvertError::NoValidData)
        ));
    }
}
