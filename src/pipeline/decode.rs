//! Character decoding: undo the transport and markup encodings of the HTML.
//!
//! Four passes, in this order:
//!
//! 1. quoted-printable (`=XX` escapes and `=` soft line breaks),
//! 2. HTML entities (`&ldquo;`, `&#8230;`, …),
//! 3. the residual-artifact table ([`RESIDUALS`]),
//! 4. C0 control characters other than tab, LF and CR.
//!
//! Entities must be resolved before the residual table runs: double-encoded
//! exports only reveal some `=XX` sequences after the first decoding layer.
//! None of the passes can fail. Malformed escapes are kept as literal text.

use crate::output::CharacterHit;
use tracing::debug;

/// Residual sequences that survive the first two passes, with the character
/// the sequence encodes and its replacement.
///
/// Exports that were quoted-printable encoded twice still contain these
/// literally after one decoding round. Typographic quotes are flattened to
/// ASCII and zero-width marks are removed, both in their encoded form and as
/// already-decoded characters.
pub const RESIDUALS: &[(&str, char, &str)] = &[
    ("=E2=80=A6", '\u{2026}', "\u{2026}"),
    ("=E2=80=9D", '\u{201D}', "\""),
    ("=E2=80=9C", '\u{201C}', "\""),
    ("=E2=80=99", '\u{2019}', "'"),
    ("=E2=80=98", '\u{2018}', "'"),
    ("=E2=80=93", '\u{2013}', "\u{2013}"),
    ("=E2=80=94", '\u{2014}', "\u{2014}"),
    ("=C2=A0", '\u{00A0}', " "),
    ("=E2=80=8B", '\u{200B}', ""),
    ("=E2=80=8C", '\u{200C}', ""),
    ("=E2=80=8D", '\u{200D}', ""),
    ("=E2=80=8E", '\u{200E}', ""),
    ("=E2=80=8F", '\u{200F}', ""),
    ("=E2=80=9A", '\u{201A}', ","),
    ("=E2=80=9E", '\u{201E}', "\""),
    // Primes map to superscript digits, not to themselves
    ("=E2=80=B2", '\u{2032}', "\u{00B2}"),
    ("=E2=80=B3", '\u{2033}', "\u{00B3}"),
    ("=E2=80=B9", '\u{2039}', "\u{2039}"),
    ("=E2=80=BA", '\u{203A}', "\u{203A}"),
    ("=E2=81=84", '\u{2044}', "\u{2044}"),
    ("=E2=81=85", '\u{2045}', "\u{2045}"),
    ("=E2=81=86", '\u{2046}', "\u{2046}"),
    ("=E2=81=87", '\u{2047}', "\u{2047}"),
    ("=E2=81=88", '\u{2048}', "\u{2048}"),
    ("=E2=81=89", '\u{2049}', "\u{2049}"),
    ("=E2=81=8A", '\u{204A}', "\u{204A}"),
    ("=E2=81=8B", '\u{204B}', "\u{204B}"),
    ("=E2=81=8C", '\u{204C}', "\u{204C}"),
    ("=E2=81=8D", '\u{204D}', "\u{204D}"),
    ("=E2=81=8E", '\u{204E}', "\u{204E}"),
    ("=E2=81=8F", '\u{204F}', "\u{204F}"),
    ("=E2=81=90", '\u{2050}', "\u{2050}"),
    ("=E2=81=91", '\u{2051}', "\u{2051}"),
    ("=E2=81=92", '\u{2052}', "\u{2052}"),
    ("=E2=81=93", '\u{2053}', "\u{2053}"),
    ("=E2=81=94", '\u{2054}', "\u{2054}"),
    ("=E2=81=95", '\u{2055}', "\u{2055}"),
    ("=E2=81=96", '\u{2056}', "\u{2056}"),
    ("=E2=81=97", '\u{2057}', "\u{2057}"),
    ("=E2=81=98", '\u{2058}', "\u{2058}"),
    ("=E2=81=99", '\u{2059}', "\u{2059}"),
    ("=E2=81=9A", '\u{205A}', "\u{205A}"),
    ("=E2=81=9B", '\u{205B}', "\u{205B}"),
    ("=E2=81=9C", '\u{205C}', "\u{205C}"),
    ("=E2=81=9D", '\u{205D}', "\u{205D}"),
    ("=E2=81=9E", '\u{205E}', "\u{205E}"),
];

/// Switches for [`decode_characters`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Run the quoted-printable pass.
    pub quoted_printable: bool,
    /// Count residual-table hits.
    pub collect_hits: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            quoted_printable: true,
            collect_hits: false,
        }
    }
}

/// Output of [`decode_characters`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    /// Residual-table entries that matched, in table order. Always empty
    /// unless `collect_hits` was set.
    pub hits: Vec<CharacterHit>,
}

/// Run all four decoding passes over an extracted HTML fragment.
pub fn decode_characters(html: &str, opts: DecodeOptions) -> DecodedHtml {
    let text = if opts.quoted_printable {
        decode_quoted_printable(html)
    } else {
        html.to_string()
    };
    let text = html_escape::decode_html_entities(&text).into_owned();
    let (text, hits) = replace_residuals(text, opts.collect_hits);
    let html = strip_control_chars(&text);

    debug!(
        "Decoded HTML: {} → {} bytes, {} residual kinds",
        text.len(),
        html.len(),
        hits.len()
    );

    DecodedHtml { html, hits }
}

// ── Pass 1: quoted-printable ─────────────────────────────────────────────

/// Decode quoted-printable text, keeping anything that is not a valid escape.
///
/// Bytes outside ASCII are passed through, so HTML that is only partly
/// encoded survives. The decoded bytes are read as UTF-8 with invalid
/// sequences dropped.
pub fn decode_quoted_printable(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        match bytes.get(i + 1) {
            // Soft break at end of input
            None => i += 1,
            Some(b'\n') => i += 2,
            Some(b'\r') => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != b'\n' {
                    j += 1;
                }
                i = (j + 1).min(bytes.len());
            }
            Some(b'=') => {
                out.push(b'=');
                i += 2;
            }
            Some(&hi) => match (hex_value(hi), bytes.get(i + 2).copied().and_then(hex_value)) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    out.push(b'=');
                    i += 1;
                }
            },
        }
    }

    utf8_ignore_invalid(&out)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Read bytes as UTF-8, silently dropping invalid sequences.
pub fn utf8_ignore_invalid(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        s.push_str(chunk.valid());
    }
    s
}

// ── Pass 3: residual table ───────────────────────────────────────────────

fn replace_residuals(mut text: String, collect: bool) -> (String, Vec<CharacterHit>) {
    let mut hits = Vec::new();

    for &(encoded, decoded, replacement) in RESIDUALS {
        let mut count = replace_counting(&mut text, encoded, replacement, collect);

        let mut buf = [0u8; 4];
        let decoded = decoded.encode_utf8(&mut buf);
        if decoded != replacement {
            count += replace_counting(&mut text, decoded, replacement, collect);
        }

        if collect && count > 0 {
            hits.push(CharacterHit {
                sequence: encoded.to_string(),
                replacement: replacement.to_string(),
                count,
            });
        }
    }

    (text, hits)
}

/// Replace every `pattern` in `text`, returning how many were replaced
/// (always 0 when `count` is false).
fn replace_counting(text: &mut String, pattern: &str, replacement: &str, count: bool) -> usize {
    if !text.contains(pattern) {
        return 0;
    }
    let n = if count { text.matches(pattern).count() } else { 0 };
    *text = text.replace(pattern, replacement);
    n
}

// ── Pass 4: control characters ───────────────────────────────────────────

fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}'))
        .collect()
}
