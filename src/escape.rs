//! Character escaping conventions used by the search data files.
//!
//! Three layers are involved:
//! - **Search keys** (`operator_3d`): symbol names reduced to lowercase
//!   alphanumerics, with every other ASCII byte written as `_` plus two hex digits.
//! - **HTML entities** (`&lt;`, `&amp;`): labels and titles are stored ready to
//!   be inserted into the result page.
//! - **JavaScript string literals**: handled by the codec, see [`crate::codec`].

use std::borrow::Cow;
use std::fmt::Write as _;

/// Error returned when a search key contains a malformed escape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// `_` at `offset` is not followed by two characters.
    #[error("truncated escape at byte {offset}")]
    Truncated { offset: usize },
    /// `_` at `offset` is followed by something other than two hex digits.
    #[error("invalid escape '_{found}' at byte {offset}")]
    InvalidHex { offset: usize, found: String },
    /// Escaped bytes do not form valid UTF-8.
    #[error("escaped bytes are not valid UTF-8")]
    Utf8,
}

/// Converts a symbol name into its search key.
///
/// ```
/// use doxy_search::escape::search_key;
/// assert_eq!(search_key("operator="), "operator_3d");
/// assert_eq!(search_key("basic_string< CharT >"), "basic_5fstring_3c_20chart_20_3e");
/// ```
pub fn search_key(symbol: &str) -> String {
    let mut key = String::with_capacity(symbol.len());
    for c in symbol.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else if c.is_ascii() {
            // Infallible: writing to a String
            let _ = write!(key, "_{:02x}", c as u32);
        } else {
            key.extend(c.to_lowercase());
        }
    }
    key
}

/// Reverses [`search_key`]. Case information lost by the forward mapping is
/// not recovered.
pub fn decode_key(key: &str) -> Result<String, KeyError> {
    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            let Some(hex) = bytes.get(i + 1..i + 3) else {
                return Err(KeyError::Truncated { offset: i });
            };
            // from_str_radix alone would accept a sign
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return Err(KeyError::InvalidHex {
                    offset: i,
                    found: String::from_utf8_lossy(hex).into_owned(),
                });
            }
            out.push((hex_value(hex[0]) << 4) | hex_value(hex[1]));
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| KeyError::Utf8)
}

/// Returns true if `key` could have been produced by [`search_key`].
pub fn is_search_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    let mut chars = key.chars();
    while let Some(c) = chars.next() {
        match c {
            '_' => {
                let escaped: String = chars.by_ref().take(2).collect();
                let well_formed = escaped.len() == 2
                    && escaped
                        .chars()
                        .all(|h| h.is_ascii_digit() || ('a'..='f').contains(&h))
                    && u8::from_str_radix(&escaped, 16)
                        .is_ok_and(|b| b.is_ascii() && !b.is_ascii_alphanumeric());
                if !well_formed {
                    return false;
                }
            }
            c if c.is_ascii_digit() || c.is_ascii_lowercase() => {}
            c if !c.is_ascii() => {
                if c.to_lowercase().ne(std::iter::once(c)) {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

/// Escapes `<`, `>`, `&`, `"` and `'` as HTML entities.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decodes the named entities the generator emits and numeric character
/// references. Unknown or malformed entities are kept verbatim.
pub fn unescape_html(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match rest.find(';').and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let (digits, radix) = match code.strip_prefix(['x', 'X']) {
                Some(hex) => (hex, 16),
                None => (code, 10),
            };
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            let value = u32::from_str_radix(digits, radix).ok()?;
            char::from_u32(value)
        }
    }
}
