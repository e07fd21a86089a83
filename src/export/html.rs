//! Printable HTML
//!
//! Same content as the paged document: title, summary block, then the full
//! table. Page breaks are left to the browser's print dialog.

use super::document::ExportDocument;

const PRINT_STYLE: &str = "body { font-family: sans-serif; margin: 24px; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th, td { border: 1px solid #999; padding: 4px 8px; text-align: left; }\n\
thead { display: table-header-group; }\n\
tr { page-break-inside: avoid; }\n";

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the document as a standalone HTML page
pub fn render_html(doc: &ExportDocument) -> String {
    let title = escape_html(&doc.summary.title);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", title));
    html.push_str(&format!("<style>\n{}</style>\n", PRINT_STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", title));

    html.push_str("<div class=\"summary\">\n");
    for line in doc.header_lines() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(&line)));
    }
    html.push_str("</div>\n");

    html.push_str("<table>\n<thead>\n<tr>");
    for heading in doc.headings() {
        html.push_str(&format!("<th>{}</th>", escape_html(heading)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in &doc.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");

    html
}
