// ABOUTME: Renders documents to standalone HTML
// ABOUTME: Template placeholder substitution, letterhead wrapping, and the QR payload block

use chrono::NaiveDate;

use crate::types::{DocumentTemplate, Letterhead, QrCode, Signatory};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The per-document text that fills a template
#[derive(Debug, Clone)]
pub struct LetterContent<'a> {
    pub title: &'a str,
    pub date: NaiveDate,
    pub addressee_name: &'a str,
    pub addressee_address: &'a str,
    pub body: &'a str,
    pub salutation: &'a str,
}

/// Catalog records resolved for one document
#[derive(Debug, Clone)]
pub struct LetterParts {
    pub template: Option<DocumentTemplate>,
    pub letterhead: Letterhead,
    pub signatory: Option<Signatory>,
    pub qr_code: Option<QrCode>,
}

pub fn format_letter_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped multi-line text with line breaks preserved
fn escape_multiline(text: &str) -> String {
    escape_html(text.trim_end()).replace("\r\n", "\n").replace('\n', "<br>\n")
}

/// Replace every `{{name}}` placeholder in one pass; unknown placeholders are left alone.
///
/// Inserted values are never scanned again, so a value containing `{{...}}` stays literal.
pub fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            rest = &rest[open..];
            break;
        };

        let name = &after[..close];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn placeholder_values(content: &LetterContent<'_>, parts: &LetterParts) -> Vec<(&'static str, String)> {
    let (signatory_name, signatory_title) = match &parts.signatory {
        Some(s) => (escape_html(&s.name), escape_html(&s.title)),
        None => (String::new(), String::new()),
    };

    vec![
        ("title", escape_html(content.title)),
        ("date", format_letter_date(content.date)),
        ("addressee_name", escape_html(content.addressee_name)),
        ("addressee_address", escape_multiline(content.addressee_address)),
        ("body", escape_multiline(content.body)),
        ("salutation", escape_html(content.salutation)),
        ("signatory_name", signatory_name),
        ("signatory_title", signatory_title),
        ("company_name", escape_html(&parts.letterhead.company_name)),
    ]
}

fn plain_layout(content: &LetterContent<'_>, parts: &LetterParts) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"letter\">\n");
    html.push_str(&format!(
        "<p class=\"letter-date\">{}</p>\n",
        format_letter_date(content.date)
    ));
    html.push_str(&format!(
        "<p class=\"letter-addressee\"><strong>{}</strong><br>\n{}</p>\n",
        escape_html(content.addressee_name),
        escape_multiline(content.addressee_address)
    ));
    html.push_str(&format!(
        "<h2 class=\"letter-title\">{}</h2>\n",
        escape_html(content.title)
    ));
    html.push_str(&format!(
        "<div class=\"letter-body\">{}</div>\n",
        escape_multiline(content.body)
    ));
    html.push_str(&format!(
        "<p class=\"letter-closing\">{},</p>\n",
        escape_html(content.salutation)
    ));
    if let Some(signatory) = &parts.signatory {
        html.push_str(&format!(
            "<p class=\"letter-signatory\"><strong>{}</strong><br>\n{}</p>\n",
            escape_html(&signatory.name),
            escape_html(&signatory.title)
        ));
    }
    html.push_str("</div>");
    html
}

fn qr_block(qr: &QrCode) -> String {
    format!(
        "<div class=\"qr-code\" data-qr-type=\"{}\" data-size=\"{}\">\n<p class=\"qr-label\">{}</p>\n<p class=\"qr-payload\">{}</p>\n</div>\n",
        qr.qr_type.as_str(),
        qr.size,
        escape_html(qr.qr_type.label()),
        escape_html(&qr.content)
    )
}

/// Render a complete HTML page for one document
pub fn compose_document(content: &LetterContent<'_>, parts: &LetterParts) -> String {
    let inner = match &parts.template {
        Some(template) => fill_placeholders(
            &template.template_content,
            &placeholder_values(content, parts),
        ),
        None => plain_layout(content, parts),
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(content.title)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!(
        "<header class=\"letterhead\">\n{}\n</header>\n",
        parts.letterhead.header_html
    ));
    html.push_str(&format!("<main>\n{}\n</main>\n", inner));
    if let Some(qr) = &parts.qr_code {
        html.push_str(&qr_block(qr));
    }
    if !parts.letterhead.footer_html.is_empty() {
        html.push_str(&format!(
            "<footer class=\"letterhead-footer\">\n{}\n</footer>\n",
            parts.letterhead.footer_html
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Download name for an exported document
pub fn export_filename(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        "document.html".to_string()
    } else {
        format!("{}.html", cleaned)
    }
}
