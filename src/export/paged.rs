//! Paginated text document
//!
//! The first page opens with the title and summary block. Rows are split
//! into pages of `rows_per_page`, each ending with a `Page N of M` footer.
//! Pages are separated by a form feed so printers and pagers break on them.

use tabled::builder::Builder;
use tabled::settings::Style;

use super::document::ExportDocument;

/// Page separator
pub const PAGE_BREAK: char = '\x0c';

/// Render the document as paged plain text
pub fn render_paged(doc: &ExportDocument) -> String {
    let pages = paginate(&doc.rows, doc.rows_per_page);
    let page_count = pages.len();

    let mut rendered = Vec::with_capacity(page_count);
    for (index, rows) in pages.into_iter().enumerate() {
        let mut page = String::new();

        if index == 0 {
            page.push_str(&doc.summary.title);
            page.push('\n');
            for line in doc.header_lines() {
                page.push_str(&line);
                page.push('\n');
            }
            page.push('\n');
        }

        page.push_str(&table(doc, rows));
        page.push_str(&format!("\n\nPage {} of {}\n", index + 1, page_count));
        rendered.push(page);
    }

    rendered.join(&PAGE_BREAK.to_string())
}

/// Split rows into pages; an empty document still has one page
fn paginate(rows: &[Vec<String>], rows_per_page: usize) -> Vec<&[Vec<String>]> {
    if rows.is_empty() {
        return vec![rows];
    }
    rows.chunks(rows_per_page.max(1)).collect()
}

fn table(doc: &ExportDocument, rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(doc.headings().into_iter().map(String::from));
    for row in rows {
        builder.push_record(row.iter().map(|cell| single_line(cell)));
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}

/// Table cells are kept to one line so each record is one table row and
/// only the renderer emits page breaks
fn single_line(cell: &str) -> String {
    cell.replace(['\r', '\n', PAGE_BREAK], " ")
}
