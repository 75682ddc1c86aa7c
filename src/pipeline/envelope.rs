//! Envelope extraction: isolate the HTML document from the MIME wrapper.
//!
//! A Confluence "Word" export is a MIME multipart message saved with a `.doc`
//! extension. The headers and part boundaries are of no interest; everything
//! we need sits between the first `<html ...>` and the following `</html>`.

use crate::error::PipelineError;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_HTML_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<html[^>]*>.*?</html>").unwrap());

/// Return the first `<html>…</html>` span of `raw`, verbatim.
///
/// Matching is case-insensitive and spans newlines. The closing tag is the
/// first one after the opening tag.
pub fn extract_html(raw: &str) -> Result<&str, PipelineError> {
    let m = RE_HTML_DOCUMENT
        .find(raw)
        .ok_or(PipelineError::NoHtmlEnvelope)?;
    debug!("HTML envelope at bytes {}..{}", m.start(), m.end());
    Ok(m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIME: &str = "Date: Mon, 1 Jan 2024 00:00:00 +0000\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/related; boundary=\"----=_Part_0\"\r\n\r\n\
------=_Part_0\r\n\
Content-Type: text/html; charset=UTF-8\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\r\n\
<html xmlns:o=3D\"urn:schemas-microsoft-com:office:office\">\r\n\
<body><p>Hi</p></body>\r\n\
</html>\r\n\
------=_Part_0--\r\n";

    #[test]
    fn extracts_span_with_attributes_across_lines() {
        let html = extract_html(MIME).unwrap();
        assert!(html.starts_with("<html xmlns:o=3D"));
        assert!(html.ends_with("</html>"));
        assert!(html.contains("<p>Hi</p>"));
        assert!(!html.contains("------=_Part_0"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let html = extract_html("junk <HTML><BODY>x</BODY></HTML> tail").unwrap();
        assert_eq!(html, "<HTML><BODY>x</BODY></HTML>");
    }

    #[test]
    fn first_closing_tag_ends_the_span() {
        let html = extract_html("<html>a</html><html>b</html>").unwrap();
        assert_eq!(html, "<html>a</html>");
    }

    #[test]
    fn missing_envelope_is_an_error() {
        assert_eq!(
            extract_html("MIME-Version: 1.0\r\n\r\njust text"),
            Err(PipelineError::NoHtmlEnvelope)
        );
    }

    #[test]
    fn unterminated_envelope_is_an_error() {
        assert_eq!(
            extract_html("<html><body>never closed"),
            Err(PipelineError::NoHtmlEnvelope)
        );
    }
}
