use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::model::{
    CellValue, PlayerRecord, PlayerTable, AGE, COMPETITION, HEIGHT, LEAGUE, NAME, POSITION,
    TEAM, USAGE,
};
use super::source::SourceFormat;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse raw sheet bytes and normalise them into a [`PlayerTable`] with no
/// missing cells.
///
/// Missing cells become zero (`0` / `0.0`, or the text `"0"` in text
/// columns), so "no data" and "zero" are indistinguishable afterwards.
pub fn clean(bytes: &[u8], format: SourceFormat) -> Result<PlayerTable, LoadError> {
    let (columns, rows) = match format {
        SourceFormat::Csv => parse_csv(bytes)?,
        SourceFormat::Excel => parse_excel(bytes)?,
    };
    check_headers(&columns, format)?;

    let mut rows = rows;
    for (idx, column) in columns.iter().enumerate() {
        coerce_key_column(column, idx, &mut rows);
        let fill = key_column_zero(column).unwrap_or_else(|| inferred_zero(idx, &rows));
        fill_missing(idx, &mut rows, &fill);
    }

    let records = rows
        .into_iter()
        .map(|row| PlayerRecord::new(columns.iter().cloned().zip(row).collect::<BTreeMap<_, _>>()))
        .collect();

    Ok(PlayerTable::new(columns, records))
}

fn check_headers(columns: &[String], format: SourceFormat) -> Result<(), LoadError> {
    if columns.is_empty() {
        return Err(LoadError::parse(format, "no header row"));
    }
    let mut seen = HashSet::new();
    for (idx, name) in columns.iter().enumerate() {
        if name.is_empty() {
            return Err(LoadError::parse(format, format!("column {} has no header", idx + 1)));
        }
        if !seen.insert(name.as_str()) {
            return Err(LoadError::parse(format, format!("duplicate column '{name}'")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one player per row.
fn parse_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<CellValue>>), LoadError> {
    let fmt = SourceFormat::Csv;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::parse(fmt, e))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::parse(fmt, format!("row {}: {e}", row_no + 1)))?;
        // Short rows are padded with missing cells, long rows truncated.
        let row = (0..columns.len())
            .map(|i| guess_cell_type(record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok((columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
        return CellValue::Null;
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

/// First worksheet, first row as header. The workbook flavour (xlsx, xlsm,
/// xls, xlsb, ods) is detected from the bytes.
fn parse_excel(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<CellValue>>), LoadError> {
    let fmt = SourceFormat::Excel;
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| LoadError::parse(fmt, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::parse(fmt, "workbook has no worksheet"))?
        .map_err(|e| LoadError::parse(fmt, e))?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = match rows_iter.next() {
        Some(header) => header
            .iter()
            .map(|cell| excel_cell(cell).to_string().trim().to_string())
            .collect(),
        None => return Ok((Vec::new(), Vec::new())),
    };

    // Trailing header cells with no name are formatting leftovers, not columns.
    let width = columns
        .iter()
        .rposition(|c| !c.is_empty())
        .map_or(0, |last| last + 1);
    let columns: Vec<String> = columns.into_iter().take(width).collect();

    let rows = rows_iter
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            (0..width)
                .map(|i| row.get(i).map(excel_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok((columns, rows))
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.is_finite() => CellValue::Float(*f),
        Data::Float(_) => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.trim().to_string()),
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

fn coerce_key_column(column: &str, idx: usize, rows: &mut [Vec<CellValue>]) {
    let coerce: fn(&CellValue) -> CellValue = match column {
        AGE => to_integer,
        USAGE | HEIGHT => to_float,
        NAME | TEAM | POSITION | COMPETITION | LEAGUE => to_text,
        _ => return,
    };
    for row in rows.iter_mut() {
        row[idx] = coerce(&row[idx]);
    }
}

fn to_integer(v: &CellValue) -> CellValue {
    match v {
        CellValue::Integer(_) | CellValue::Null => v.clone(),
        CellValue::Float(f) if f.fract() == 0.0 => CellValue::Integer(*f as i64),
        CellValue::Text(s) => match guess_cell_type(s) {
            CellValue::Text(_) => CellValue::Null,
            parsed => to_integer(&parsed),
        },
        _ => CellValue::Null,
    }
}

fn to_float(v: &CellValue) -> CellValue {
    match v {
        CellValue::Text(s) => match guess_cell_type(s.trim_end_matches('%')) {
            CellValue::Text(_) => CellValue::Null,
            parsed => to_float(&parsed),
        },
        other => other.as_f64().map_or(CellValue::Null, CellValue::Float),
    }
}

fn to_text(v: &CellValue) -> CellValue {
    match v {
        CellValue::Null | CellValue::Text(_) => v.clone(),
        other => CellValue::Text(other.to_string()),
    }
}

/// Zero of a key column's declared type, even when the column is all blank.
fn key_column_zero(column: &str) -> Option<CellValue> {
    match column {
        AGE => Some(CellValue::Integer(0)),
        USAGE | HEIGHT => Some(CellValue::Float(0.0)),
        NAME | TEAM | POSITION | COMPETITION | LEAGUE => Some(CellValue::Text("0".to_string())),
        _ => None,
    }
}

/// Numeric zero when every present cell is numeric (or nothing is present),
/// the text "0" otherwise.
fn inferred_zero(idx: usize, rows: &[Vec<CellValue>]) -> CellValue {
    let present = || rows.iter().map(|r| &r[idx]).filter(|v| !v.is_null());
    if present().all(CellValue::is_numeric) {
        if present().all(|v| matches!(v, CellValue::Integer(_))) {
            CellValue::Integer(0)
        } else {
            CellValue::Float(0.0)
        }
    } else {
        CellValue::Text("0".to_string())
    }
}

fn fill_missing(idx: usize, rows: &mut [Vec<CellValue>], fill: &CellValue) {
    for row in rows.iter_mut() {
        if row[idx].is_null() {
            row[idx] = fill.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SHEET: &str = "\
Name,Team,Age,Usage,Height,Position,Competition,Dominant Defender Percentile,Notes
Ada Silva,Celtic,21,55.5,,Defender,Premiership,80,
Ben Okafor,Ajax,27.0,,1.85,Striker,Eredivisie,,loan
";

    fn cleaned() -> PlayerTable {
        clean(SHEET.as_bytes(), SourceFormat::Csv).unwrap()
    }

    #[test]
    fn no_missing_cells_after_cleaning() {
        let table = cleaned();
        assert_eq!(table.len(), 2);
        for record in &table.records {
            assert_eq!(record.cells.len(), table.columns.len());
            assert!(record.cells.values().all(|v| !v.is_null()));
        }
    }

    #[test]
    fn keeps_source_column_order() {
        let table = cleaned();
        assert_eq!(table.columns.first().map(String::as_str), Some("Name"));
        assert_eq!(table.columns.last().map(String::as_str), Some("Notes"));
    }

    #[test]
    fn missing_numbers_become_zero_and_missing_text_becomes_text_zero() {
        let table = cleaned();
        let ada = &table.records[0];
        let ben = &table.records[1];
        assert_eq!(ada.get(HEIGHT), Some(&CellValue::Float(0.0)));
        assert_eq!(ben.get(USAGE), Some(&CellValue::Float(0.0)));
        assert_eq!(ben.get("Dominant Defender Percentile"), Some(&CellValue::Integer(0)));
        assert_eq!(ada.get("Notes"), Some(&CellValue::Text("0".into())));
    }

    #[test]
    fn key_columns_are_coerced() {
        let table = cleaned();
        let ben = &table.records[1];
        assert_eq!(ben.get(AGE), Some(&CellValue::Integer(27)));
        assert_eq!(table.records[0].get(USAGE), Some(&CellValue::Float(55.5)));
        assert_eq!(ben.get(HEIGHT), Some(&CellValue::Float(1.85)));
    }

    #[test]
    fn numeric_team_names_stay_text() {
        let table = clean(b"Name,Team\nAda,1860\n", SourceFormat::Csv).unwrap();
        assert_eq!(table.records[0].get(TEAM), Some(&CellValue::Text("1860".into())));
    }

    #[test]
    fn header_only_sheet_is_an_empty_table() {
        let table = clean(b"Name,Team,Age\n", SourceFormat::Csv).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        assert_matches!(
            clean(b"", SourceFormat::Csv),
            Err(LoadError::Parse { format: SourceFormat::Csv, .. })
        );
    }

    #[test]
    fn duplicate_headers_are_a_parse_error() {
        let err = clean(b"Name,Name\nA,B\n", SourceFormat::Csv).unwrap_err();
        assert_matches!(err, LoadError::Parse { reason, .. } if reason.contains("duplicate"));
    }

    #[test]
    fn all_blank_key_columns_fill_with_their_declared_type() {
        let table = clean(b"Name,Age,Usage,Height,Team\nAda,,,,\n", SourceFormat::Csv).unwrap();
        let ada = &table.records[0];
        assert_eq!(ada.get(AGE), Some(&CellValue::Integer(0)));
        assert_eq!(ada.get(USAGE), Some(&CellValue::Float(0.0)));
        assert_eq!(ada.get(HEIGHT), Some(&CellValue::Float(0.0)));
        assert_eq!(ada.get(TEAM), Some(&CellValue::Text("0".into())));
    }

    const WORKBOOK: &[u8] = include_bytes!("../../testdata/players.xlsx");

    #[test]
    fn reads_first_worksheet_of_a_workbook() {
        let table = clean(WORKBOOK, SourceFormat::Excel).unwrap();
        // The unnamed ninth header cell is dropped and the blank third row skipped.
        assert_eq!(
            table.columns,
            vec![
                "Name",
                "Team",
                "Age",
                "Usage",
                "Height",
                "Position",
                "Competition",
                "Dominant Defender Percentile",
            ]
        );
        assert_eq!(table.len(), 2);

        let ada = &table.records[0];
        assert_eq!(ada.get(NAME), Some(&CellValue::Text("Ada Silva".into())));
        assert_eq!(ada.get(TEAM), Some(&CellValue::Text("1860".into())));
        assert_eq!(ada.get(AGE), Some(&CellValue::Integer(21)));
        assert_eq!(ada.get(USAGE), Some(&CellValue::Float(55.5)));
        assert_eq!(ada.get(HEIGHT), Some(&CellValue::Float(0.0)));
        assert_eq!(ada.get(POSITION), Some(&CellValue::Text("Defender".into())));

        let ben = &table.records[1];
        assert_eq!(ben.get(NAME), Some(&CellValue::Text("Ben Okafor".into())));
        assert_eq!(ben.get(AGE), Some(&CellValue::Integer(27)));
        assert_eq!(ben.get(USAGE), Some(&CellValue::Float(0.0)));
        assert_eq!(ben.get(HEIGHT), Some(&CellValue::Float(1.85)));
        assert_eq!(ben.number("Dominant Defender Percentile"), 0.0);
        assert!(ben.cells.values().all(|v| !v.is_null()));
    }

    #[test]
    fn non_workbook_bytes_are_a_parse_error() {
        assert_matches!(
            clean(SHEET.as_bytes(), SourceFormat::Excel),
            Err(LoadError::Parse { format: SourceFormat::Excel, .. })
        );
    }
}
