//! HTML pages
//!
//! Pages are small enough to build with `format!`. Anything that came from a
//! visitor or the environment goes through [`escape`].

use crate::{config::Diagnostics, entry::Entry};
use http::StatusCode;
use std::path::Path;

const STYLE: &str = "body{font-family:sans-serif;max-width:40em;margin:2em auto}\
.meta{color:#555;font-size:.9em}\
.entry{border-bottom:1px solid #ddd;padding:.5em 0}";

/// Escapes text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{style}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        title = escape(title),
        style = STYLE,
        body = body,
    )
}

fn diagnostics_block(diagnostics: &Diagnostics) -> String {
    format!(
        "<p class=\"meta\">Running on node: {}<br/>Pod: {}<br/>Region: {}</p>\n",
        escape(&diagnostics.node_name),
        escape(&diagnostics.pod_name),
        escape(&diagnostics.region),
    )
}

/// The guestbook: diagnostics, the signing form and `entries` in the order given
pub fn index_page(diagnostics: &Diagnostics, entries: &[Entry]) -> String {
    let mut body = String::from("<h1>Guestbook</h1>\n");
    body.push_str(&diagnostics_block(diagnostics));
    body.push_str(
        "<form method=\"post\" action=\"submit\">\n\
         <p><label>Name <input name=\"name\" maxlength=\"100\" required></label></p>\n\
         <p><label>Message <textarea name=\"message\" maxlength=\"1000\" required></textarea></label></p>\n\
         <p><button type=\"submit\">Sign</button></p>\n\
         </form>\n",
    );
    if entries.is_empty() {
        body.push_str("<p>No entries yet.</p>\n");
    } else {
        body.push_str(&format!("<h2>{} entries</h2>\n", entries.len()));
        for entry in entries {
            body.push_str(&format!(
                "<div class=\"entry\"><strong>{}</strong> <span class=\"meta\">{}</span><p>{}</p></div>\n",
                escape(&entry.name),
                entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                escape(&entry.message),
            ));
        }
    }
    page("Guestbook", &body)
}

/// Contents of the volume marker file
pub fn volume_page(diagnostics: &Diagnostics, path: &Path, ids: &[u64]) -> String {
    let mut body = String::from("<h1>Volume marker</h1>\n");
    body.push_str(&diagnostics_block(diagnostics));
    body.push_str(&format!(
        "<p>File: <code>{}</code></p>\n",
        escape(&path.display().to_string())
    ));
    body.push_str("<form method=\"post\" action=\"volume\"><button type=\"submit\">Append next id</button></form>\n");
    if ids.is_empty() {
        body.push_str("<p>No ids written yet.</p>\n");
    } else {
        body.push_str("<ol>\n");
        for id in ids {
            body.push_str(&format!("<li>{}</li>\n", id));
        }
        body.push_str("</ol>\n");
    }
    page("Volume marker", &body)
}

/// Error page for `status`, with a visitor-facing `detail`
pub fn error_page(status: StatusCode, detail: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<p><a href=\"/\">Back to the guestbook</a></p>\n",
        escape(&title),
        escape(detail)
    );
    page(&title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn diagnostics() -> Diagnostics {
        Diagnostics {
            node_name: "node-a".into(),
            pod_name: "pod-<1>".into(),
            region: "us-east-1".into(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn index_lists_entries_escaped() {
        let entries = vec![Entry {
            id: Uuid::nil(),
            name: "<script>".into(),
            message: "hi & bye".into(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }];
        let html = index_page(&diagnostics(), &entries);
        assert!(html.contains("Running on node: node-a"));
        assert!(html.contains("Pod: pod-&lt;1&gt;"));
        assert!(html.contains("<strong>&lt;script&gt;</strong>"));
        assert!(html.contains("<p>hi &amp; bye</p>"));
        assert!(html.contains("2024-05-01 12:30:00 UTC"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_index_says_so() {
        assert!(index_page(&diagnostics(), &[]).contains("No entries yet."));
    }

    #[test]
    fn volume_page_lists_ids() {
        let html = volume_page(&diagnostics(), Path::new("/data/ids.txt"), &[1, 2]);
        assert!(html.contains("<code>/data/ids.txt</code>"));
        assert!(html.contains("<li>1</li>\n<li>2</li>"));
    }

    #[test]
    fn error_page_names_status() {
        let html = error_page(StatusCode::NOT_FOUND, "no route for /nope");
        assert!(html.contains("<h1>404 Not Found</h1>"));
        assert!(html.contains("no route for /nope"));
    }
}
