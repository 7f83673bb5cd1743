// Normalisation of escaped text ahead of hostname matching

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static UNICODE_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("unicode escape pattern"));

static CHARACTER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[^\t\n\x0C <&#;]{1,32};?)")
        .expect("character reference pattern")
});

/// Named references that HTML5 also accepts without the closing `;`.
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Undo the encodings hostnames commonly hide behind in source files.
///
/// Stages run in a fixed order: HTML character references, then
/// percent-encoding, then `\uXXXX` escapes. A stage that cannot make sense of
/// its input leaves that part of the text untouched.
pub fn decode(text: &str) -> String {
    let text = decode_html_entities(text);
    let text = decode_percent(&text);
    decode_unicode_escapes(&text).into_owned()
}

/// Decode character references the way an HTML5 parser does in text:
/// numeric references with or without `;`, named references ending in `;`,
/// and the legacy names that may omit it (`&amp` followed by anything).
/// Unknown references stay as written.
pub fn decode_html_entities(text: &str) -> Cow<'_, str> {
    CHARACTER_REFERENCE.replace_all(text, |caps: &Captures| {
        let reference = &caps[1];
        match reference.strip_prefix('#') {
            Some(number) => decode_numeric_reference(number),
            None => decode_named_reference(reference),
        }
    })
}

fn decode_numeric_reference(number: &str) -> String {
    let number = number.trim_end_matches(';');
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => number.parse(),
    };
    code.ok()
        .filter(|&code| code != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
        .to_string()
}

fn decode_named_reference(reference: &str) -> String {
    if reference.ends_with(';') {
        let full = format!("&{}", reference);
        let decoded = html_escape::decode_html_entities(&full);
        if decoded != full.as_str() {
            return decoded.into_owned();
        }
    }

    // Longest legacy name that prefixes the reference wins
    for end in (2..=reference.len()).rev() {
        if !reference.is_char_boundary(end) {
            continue;
        }
        let name = &reference[..end];
        if LEGACY_ENTITIES.contains(&name) {
            let decoded = html_escape::decode_html_entities(&format!("&{};", name)).into_owned();
            return format!("{}{}", decoded, &reference[end..]);
        }
    }

    format!("&{}", reference)
}

/// Percent-decode; malformed `%` sequences stay verbatim and invalid UTF-8
/// becomes U+FFFD.
pub fn decode_percent(text: &str) -> Cow<'_, str> {
    if !text.contains('%') {
        return Cow::Borrowed(text);
    }
    let bytes = urlencoding::decode_binary(text.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Replace `\uXXXX` with its code point. Surrogate halves are not scalar
/// values and are kept as written.
pub fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    UNICODE_ESCAPE.replace_all(text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}
