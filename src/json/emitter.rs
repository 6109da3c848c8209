//! Streaming JSON emitter for cookie records.
//!
//! Writes the document incrementally with no full-document buffering.
//! Escaping follows RFC 8259 section 7: quotation mark, reverse solidus,
//! and the control characters U+0000 through U+001F must be escaped, and
//! nothing else is. Solidus is left alone. Bytes at or above 0x20 pass
//! through untouched, relying on the cookie data being UTF-8.

use std::io::{self, Write};

use crate::binarycookies::record::CookieRecord;

/// Streaming serializer for the cookie document.
///
/// Call [`begin_document`](Self::begin_document), then
/// [`emit_cookie`](Self::emit_cookie) once per record, then
/// [`end_document`](Self::end_document). Nothing is buffered beyond what
/// the sink itself buffers, so on a failed parse the sink holds whatever
/// was emitted up to the failure.
pub struct JsonEmitter<W: Write> {
    out: W,
    first: bool,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(out: W) -> Self {
        JsonEmitter { out, first: true }
    }

    /// Hand back the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn begin_document(&mut self) -> io::Result<()> {
        self.out.write_all(b"{\"cookies\":[")
    }

    pub fn end_document(&mut self) -> io::Result<()> {
        self.out.write_all(b"]}")
    }

    /// Write one cookie object, preceded by a comma for every record
    /// except the first.
    ///
    /// Key order is fixed: `version`, `flags`, then whichever of
    /// `domain`, `name`, `path`, `value`, `comment`, `commentUrl` are
    /// present, then `expiry`, `creation`. Absent string fields are
    /// omitted entirely, never written as null.
    pub fn emit_cookie(&mut self, cookie: &CookieRecord<'_>) -> io::Result<()> {
        if self.first {
            self.first = false;
        } else {
            self.out.write_all(b",")?;
        }
        write!(
            self.out,
            "{{\"version\":{},\"flags\":{}",
            cookie.version, cookie.flags
        )?;
        self.string_member("domain", cookie.domain)?;
        self.string_member("name", cookie.name)?;
        self.string_member("path", cookie.path)?;
        self.string_member("value", cookie.value)?;
        self.string_member("comment", cookie.comment)?;
        self.string_member("commentUrl", cookie.comment_url)?;
        self.out.write_all(b",\"expiry\":")?;
        self.write_double(cookie.expiry)?;
        self.out.write_all(b",\"creation\":")?;
        self.write_double(cookie.creation)?;
        self.out.write_all(b"}")
    }

    fn string_member(&mut self, key: &str, value: Option<&[u8]>) -> io::Result<()> {
        if let Some(bytes) = value {
            write!(self.out, ",\"{key}\":")?;
            self.write_string(bytes)?;
        }
        Ok(())
    }

    fn write_string(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(b"\"")?;
        let mut plain = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            let escape: Option<&[u8]> = match byte {
                b'"' => Some(b"\\\""),
                b'\\' => Some(b"\\\\"),
                0x08 => Some(b"\\b"),
                0x0C => Some(b"\\f"),
                0x0A => Some(b"\\n"),
                0x0D => Some(b"\\r"),
                0x09 => Some(b"\\t"),
                _ => None,
            };
            if let Some(escape) = escape {
                self.out.write_all(&bytes[plain..i])?;
                self.out.write_all(escape)?;
                plain = i + 1;
            } else if byte < 0x20 {
                self.out.write_all(&bytes[plain..i])?;
                write!(self.out, "\\u{byte:04X}")?;
                plain = i + 1;
            }
        }
        self.out.write_all(&bytes[plain..])?;
        self.out.write_all(b"\"")
    }

    fn write_double(&mut self, value: f64) -> io::Result<()> {
        self.out.write_all(format_double(value).as_bytes())
    }
}

/// Format a double the way printf's `%.17g` does: 17 significant digits,
/// trailing fractional zeros stripped, fixed notation while the decimal
/// exponent is in `-4..17` and exponent notation with a signed
/// two-or-more-digit exponent outside it. 17 digits are enough for any
/// f64 to round-trip exactly.
fn format_double(value: f64) -> String {
    if !value.is_finite() {
        // NaN and infinities have no JSON rendering; they surface as-is
        // rather than being rewritten into something the file never held.
        return value.to_string();
    }
    let sci = format!("{value:.16e}");
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..17).contains(&exponent) {
        let precision = (16 - exponent).max(0) as usize;
        trim_fraction(format!("{value:.precision$}"))
    } else {
        let mantissa = trim_fraction(mantissa.to_string());
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Drop trailing fractional zeros, and the point itself if nothing is
/// left behind it.
fn trim_fraction(mut s: String) -> String {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie<'a>() -> CookieRecord<'a> {
        CookieRecord {
            version: 1,
            flags: 0,
            has_port: 0,
            domain: None,
            name: None,
            path: None,
            value: None,
            comment: None,
            comment_url: None,
            expiry: 0.0,
            creation: 0.0,
        }
    }

    fn render(cookie: &CookieRecord<'_>) -> String {
        let mut emitter = JsonEmitter::new(Vec::new());
        emitter.emit_cookie(cookie).unwrap();
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    fn render_string(bytes: &[u8]) -> Vec<u8> {
        let mut emitter = JsonEmitter::new(Vec::new());
        emitter.write_string(bytes).unwrap();
        emitter.into_inner()
    }

    #[test]
    fn test_empty_document() {
        let mut emitter = JsonEmitter::new(Vec::new());
        emitter.begin_document().unwrap();
        emitter.end_document().unwrap();
        assert_eq!(emitter.into_inner(), b"{\"cookies\":[]}");
    }

    #[test]
    fn test_cookie_without_strings() {
        assert_eq!(
            render(&cookie()),
            "{\"version\":1,\"flags\":0,\"expiry\":0,\"creation\":0}"
        );
    }

    #[test]
    fn test_key_order_and_omission() {
        let mut c = cookie();
        c.name = Some(b"sid");
        c.value = Some(b"42");
        assert_eq!(
            render(&c),
            "{\"version\":1,\"flags\":0,\"name\":\"sid\",\"value\":\"42\",\"expiry\":0,\"creation\":0}"
        );
    }

    #[test]
    fn test_comma_fencepost_between_cookies() {
        let mut emitter = JsonEmitter::new(Vec::new());
        emitter.begin_document().unwrap();
        emitter.emit_cookie(&cookie()).unwrap();
        emitter.emit_cookie(&cookie()).unwrap();
        emitter.end_document().unwrap();
        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert!(out.contains("},{"));
        assert!(!out.contains(",]"));
    }

    #[test]
    fn test_has_port_is_not_emitted() {
        let mut c = cookie();
        c.has_port = 1;
        assert!(!render(&c).contains("hasPort"));
    }

    #[test]
    fn test_escape_quote_and_backslash() {
        assert_eq!(render_string(b"a\"b\\c"), b"\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_escape_short_forms() {
        assert_eq!(
            render_string(b"\x08\x0C\x0A\x0D\x09"),
            b"\"\\b\\f\\n\\r\\t\""
        );
    }

    #[test]
    fn test_escape_other_control_bytes_uppercase_hex() {
        assert_eq!(render_string(b"\x01"), b"\"\\u0001\"");
        assert_eq!(render_string(b"\x1F"), b"\"\\u001F\"");
    }

    #[test]
    fn test_solidus_not_escaped() {
        assert_eq!(render_string(b"/path/"), b"\"/path/\"");
    }

    #[test]
    fn test_high_bytes_pass_through() {
        assert_eq!(render_string(&[0xE9]), b"\"\xE9\"");
        // A complete UTF-8 sequence is untouched too.
        assert_eq!(render_string("caf\u{e9}".as_bytes()), "\"caf\u{e9}\"".as_bytes());
    }

    #[test]
    fn test_format_double_integral_values() {
        assert_eq!(format_double(0.0), "0");
        assert_eq!(format_double(-0.0), "-0");
        assert_eq!(format_double(1.0), "1");
        assert_eq!(format_double(-3.0), "-3");
        assert_eq!(format_double(776970000.0), "776970000");
    }

    #[test]
    fn test_format_double_fractional_values() {
        assert_eq!(format_double(1.5), "1.5");
        assert_eq!(format_double(0.1), "0.10000000000000001");
        assert_eq!(format_double(776970000.5), "776970000.5");
    }

    #[test]
    fn test_format_double_exponent_form() {
        assert_eq!(format_double(1e17), "1e+17");
        assert_eq!(format_double(1e-5), "1.0000000000000001e-05");
        assert_eq!(format_double(1e300), "1e+300");
        // Exactly -2^-20, so the mantissa digits are not in doubt.
        assert_eq!(format_double(-9.5367431640625e-7), "-9.5367431640625e-07");
    }

    #[test]
    fn test_format_double_fixed_boundaries() {
        // Exponent -4 and 16 are the last values rendered fixed.
        assert_eq!(format_double(1e-4), "0.0001");
        assert_eq!(format_double(1e16), "10000000000000000");
    }

    #[test]
    fn test_format_double_round_trips() {
        for value in [0.1, 1.0 / 3.0, 123456789.123456, 2.2250738585072014e-308] {
            let text = format_double(value);
            let parsed: f64 = text.parse().unwrap();
            assert_eq!(parsed, value, "{text}");
        }
    }
}
