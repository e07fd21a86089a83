//! CSV export
//!
//! Writes the export table as RFC 4180 text: one header row of column keys,
//! then one row per record. Summary totals are not repeated in the CSV; they
//! are recomputed from the rows when the file is read back.

use std::io::Write;

use csv::{QuoteStyle, WriterBuilder};

use super::document::ExportDocument;
use crate::error::{ReportError, ReportResult};

/// Write the document as CSV to any writer
pub fn write_csv<W: Write>(doc: &ExportDocument, writer: W) -> ReportResult<()> {
    let mut out = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    out.write_record(doc.keys())?;
    for row in &doc.rows {
        out.write_record(row)?;
    }

    out.flush()
        .map_err(|e| ReportError::render("csv", e.to_string()))?;
    Ok(())
}

/// Render the document to CSV bytes
pub fn render_csv(doc: &ExportDocument) -> ReportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(doc, &mut buffer)?;
    Ok(buffer)
}
