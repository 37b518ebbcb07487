use passrate_core::report::ReportHeading;

use super::Notice;

const STYLE: &str = "\
body{font-family:sans-serif;margin:2rem auto;max-width:60rem;color:#222}\
header{text-align:center;margin-bottom:2rem}\
form.panel,section.panel{background:#fff;padding:1.5rem;border-radius:6px;box-shadow:0 1px 4px #0002}\
label{display:block;margin-top:.75rem}\
input,select,textarea{width:100%;padding:.4rem;box-sizing:border-box}\
textarea{font-family:monospace;min-height:16rem}\
button,a.button{display:inline-block;margin-top:1rem;padding:.5rem 1rem;border:0;border-radius:4px;color:#fff;background:#2563eb;text-decoration:none;cursor:pointer}\
a.button.add{background:#16a34a}\
button.danger{background:#dc2626}\
table{width:100%;border-collapse:collapse;margin-top:1rem}\
th,td{border:1px solid #ccc;padding:.4rem .8rem;text-align:left}\
.notice{padding:.6rem 1rem;border-radius:4px;margin-bottom:1rem}\
.success{background:#dcfce7}\
.warning{background:#fef9c3}\
.error{background:#fee2e2}\
.centered{text-align:center}\
.actions{display:flex;justify-content:flex-end;gap:.5rem}";

/// Escapes text for element content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Wraps page content with the document shell, institution header and notices.
#[must_use]
pub fn document(heading: &ReportHeading, title: &str, notices: &[Notice], body: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{} - {}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n",
        escape_html(title),
        escape_html(&heading.institution)
    ));
    html.push_str(&format!(
        "<header><h1>{}</h1></header>\n",
        escape_html(&heading.institution)
    ));
    for notice in notices {
        html.push_str(&format!(
            "<div class=\"{}\" role=\"status\">{}</div>\n",
            notice.level.css_class(),
            escape_html(&notice.message)
        ));
    }
    html.push_str(body);
    html.push_str("\n</body>\n</html>\n");
    html
}
