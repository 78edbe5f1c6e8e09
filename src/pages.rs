//! Fixed HTML pages and the index page.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::discovery::MavenArtifact;

pub const GETTING_STARTED: &[u8] = include_bytes!("../resources/html/docs.html");
pub const BAD_REQUEST: &[u8] = include_bytes!("../resources/html/400.html");
pub const NOT_FOUND: &[u8] = include_bytes!("../resources/html/404.html");
pub const METHOD_NOT_ALLOWED: &[u8] = include_bytes!("../resources/html/405.html");
pub const INTERNAL_ERROR: &[u8] = include_bytes!("../resources/html/500.html");

const INDEX_HEAD: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
<title>Available Local Javadoc</title>\
<style>body{font-family:sans-serif;margin:2em auto;max-width:50em}li{margin:.2em 0}</style>\
</head><body><h1>Available Local Javadoc</h1>";

/// Render the list of JDK docs and discovered Maven artifacts.
pub fn render_index(jdk_keys: &[String], artifacts: &[MavenArtifact]) -> String {
    let mut html = String::from(INDEX_HEAD);

    html.push_str("<h2>JDK API</h2><ul>");
    for key in jdk_keys {
        let href = format!("/jdk/{}/docs/api/index.html", urlencoding::encode(key));
        let _ = write!(
            html,
            "<li><a href=\"{}\">Java {}</a></li>",
            encode_double_quoted_attribute(&href),
            encode_text(key)
        );
    }
    html.push_str("</ul>");

    html.push_str("<h2>Maven Repository</h2><ul>");
    for artifact in artifacts {
        let href = format!(
            "/m2/{}/{}/{}/index.html",
            urlencoding::encode(&artifact.group_id),
            urlencoding::encode(&artifact.artifact_id),
            urlencoding::encode(&artifact.version)
        );
        let _ = write!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            encode_double_quoted_attribute(&href),
            encode_text(&artifact.to_string())
        );
    }
    html.push_str("</ul></body></html>");

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_jdk_keys_and_artifacts() {
        let artifacts = vec![MavenArtifact {
            group_id: "com.google.guava".to_string(),
            artifact_id: "guava".to_string(),
            version: "33.0.0-jre".to_string(),
        }];
        let html = render_index(&["11".to_string(), "17".to_string()], &artifacts);

        assert!(html.contains("<a href=\"/jdk/11/docs/api/index.html\">Java 11</a>"));
        assert!(html.contains("<a href=\"/jdk/17/docs/api/index.html\">Java 17</a>"));
        assert!(html.contains(
            "<a href=\"/m2/com.google.guava/guava/33.0.0-jre/index.html\">com.google.guava:guava:33.0.0-jre</a>"
        ));
    }

    #[test]
    fn escapes_markup() {
        let html = render_index(&["<b>".to_string()], &[]);
        assert!(html.contains("Java &lt;b&gt;"));
        assert!(html.contains("/jdk/%3Cb%3E/"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn fixed_pages_are_html() {
        for page in [
            GETTING_STARTED,
            BAD_REQUEST,
            NOT_FOUND,
            METHOD_NOT_ALLOWED,
            INTERNAL_ERROR,
        ] {
            assert!(page.starts_with(b"<!DOCTYPE html>"));
        }
    }
}
