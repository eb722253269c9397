use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use models::TransactionRecord;

// Fixed layout of the transaction report: a metadata block on top, the
// column header at row 16 (0-based), data from the row after it. The
// sheet ends with summary rows whose Type cell holds a formula.
const HEADER_ROW: usize = 16;
const DATA_START_ROW: usize = HEADER_ROW + 1;

const COL_LEGAL_NAME: usize = 0;
const COL_BRAND_NAME: usize = 1;
const COL_ACQUIRER: usize = 2;
const COL_CURRENCY: usize = 5;
const COL_AMOUNT: usize = 6;
const COL_FEE: usize = 8;
const COL_PSP_BUY_FEE: usize = 11;
const COL_TYPE: usize = 14;
const COL_STATUS: usize = 15;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("workbook contains no sheets")]
    NoWorksheet,
}

/// Parse a transaction report from a file on disk.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<TransactionRecord>, ParseError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    parse_workbook(&mut workbook)
}

/// Parse a transaction report from an in-memory buffer (uploaded body).
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<TransactionRecord>, ParseError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    parse_workbook(&mut workbook)
}

fn parse_workbook<RS: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<RS>,
) -> Result<Vec<TransactionRecord>, ParseError> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoWorksheet)?;
    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(parse_range(&range))
}

fn parse_range(range: &Range<Data>) -> Vec<TransactionRecord> {
    let mut records = Vec::new();

    for row in range.rows().skip(DATA_START_ROW) {
        // Only rows whose Type cell is a plain string are transactions;
        // a leading '=' marks the summary formulas at the bottom.
        let kind = match row.get(COL_TYPE) {
            Some(Data::String(s)) if !s.trim_start().starts_with('=') => {
                s.trim().to_lowercase()
            }
            _ => continue,
        };
        let Some(status) = status_text(row.get(COL_STATUS)) else {
            continue;
        };

        records.push(TransactionRecord {
            legal_name: text_cell(row.get(COL_LEGAL_NAME)),
            brand_name: text_cell(row.get(COL_BRAND_NAME)),
            acquirer: text_cell(row.get(COL_ACQUIRER)),
            currency: text_cell(row.get(COL_CURRENCY)),
            amount: money_cell(row.get(COL_AMOUNT)),
            fee: money_cell(row.get(COL_FEE)),
            psp_buy_fee: money_cell(row.get(COL_PSP_BUY_FEE)),
            kind,
            status,
        });
    }

    records
}

/// Status cells are normally strings but occasionally numeric; an empty
/// cell disqualifies the row.
fn status_text(cell: Option<&Data>) -> Option<String> {
    match cell? {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_lowercase()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text cell, empty string when missing so the row still aggregates.
fn text_cell(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.trim().to_owned(),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        _ => String::new(),
    }
}

/// Monetary cell. String cells use the report's European notation
/// (comma as decimal separator); formula strings and anything
/// unparseable count as zero.
fn money_cell(cell: Option<&Data>) -> Decimal {
    match cell {
        Some(Data::Float(f)) => Decimal::from_f64(*f).unwrap_or(Decimal::ZERO),
        Some(Data::Int(i)) => Decimal::from(*i),
        Some(Data::String(s)) => {
            let s = s.trim();
            if s.starts_with('=') {
                return Decimal::ZERO;
            }
            s.replace(',', ".").parse().unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}
