//! Spreadsheet export
//!
//! A single named worksheet: bold header row, one row per record. Amount
//! cells that hold a finite number are written as numbers so they sum in a
//! spreadsheet; every other cell is text. Empty cells are left blank.

use rust_xlsxwriter::{Format, Workbook};

use super::document::{ExportDocument, AMOUNT_COLUMN};
use crate::error::{ReportError, ReportResult};

/// Render the document as an XLSX workbook
pub fn render_xlsx(doc: &ExportDocument) -> ReportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet().set_name(&doc.sheet_name)?;

    for (col, heading) in doc.keys().into_iter().enumerate() {
        worksheet.write_string_with_format(0, col_index(col)?, heading, &header_format)?;
    }

    for (i, row) in doc.rows.iter().enumerate() {
        let row_num = u32::try_from(i + 1)
            .map_err(|_| ReportError::render("spreadsheet", "too many rows for one sheet"))?;

        for (col, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let col_num = col_index(col)?;
            match numeric_amount(col, cell) {
                Some(value) => worksheet.write_number(row_num, col_num, value)?,
                None => worksheet.write_string(row_num, col_num, cell)?,
            };
        }
    }

    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

fn col_index(col: usize) -> ReportResult<u16> {
    u16::try_from(col).map_err(|_| ReportError::render("spreadsheet", "too many columns"))
}

fn numeric_amount(col: usize, cell: &str) -> Option<f64> {
    if col != AMOUNT_COLUMN {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{totals_from_rows, ExportOptions};
    use crate::models::RawTransaction;
    use crate::services::{normalize, summarize};
    use calamine::{Data, Reader, Xlsx};
    use serde_json::json;
    use std::io::Cursor;

    fn doc_with_sheet(sheet_name: &str) -> ExportDocument {
        let raw: Vec<RawTransaction> = serde_json::from_value(json!([
            {"id": "1", "amount": "100", "kind": "income", "category": "Salary", "occurredAt": "2024-01-05"},
            {"id": "2", "amount": 0.1, "kind": "expense", "category": "Food", "occurredAt": "2024-01-20"},
            {"id": "3", "amount": 0.2, "kind": "expense", "category": "Food", "occurredAt": "2024-01-21"},
            {"id": "4", "amount": "bad", "kind": "expense", "category": "Food", "occurredAt": "2024-02-01"}
        ]))
        .unwrap();
        let txns = normalize(&raw);
        let options = ExportOptions {
            sheet_name: sheet_name.into(),
            ..ExportOptions::default()
        };
        ExportDocument::build(&txns, &summarize(&txns), &options)
    }

    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Float(f) => f.to_string(),
            Data::Int(i) => i.to_string(),
            other => other.to_string(),
        }
    }

    #[test]
    fn test_read_back_matches_document() {
        let doc = doc_with_sheet("Transactions");
        let bytes = render_xlsx(&doc).unwrap();

        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Transactions".to_string()]);

        let range = workbook.worksheet_range("Transactions").unwrap();
        let mut rows = range.rows();
        let header: Vec<String> = rows.next().unwrap().iter().map(cell_text).collect();
        assert_eq!(header, doc.keys());

        let body: Vec<Vec<String>> = rows.map(|r| r.iter().map(cell_text).collect()).collect();
        assert_eq!(body.len(), doc.row_count());

        let (income, expense) = totals_from_rows(&body);
        assert_eq!(income, doc.summary.income);
        assert_eq!(expense, doc.summary.expense);
    }

    #[test]
    fn test_amounts_are_numeric_cells() {
        let doc = doc_with_sheet("Transactions");
        let bytes = render_xlsx(&doc).unwrap();

        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Transactions").unwrap();

        assert_eq!(range.get((1, AMOUNT_COLUMN)), Some(&Data::Float(100.0)));
        assert_eq!(
            range.get((4, AMOUNT_COLUMN)),
            Some(&Data::String("bad".to_string()))
        );
    }

    #[test]
    fn test_invalid_sheet_name_is_render_error() {
        let doc = doc_with_sheet("bad/name");
        let err = render_xlsx(&doc).unwrap_err();
        assert!(err.is_export_failure());
        assert!(err.to_string().contains("spreadsheet"));
    }
}
