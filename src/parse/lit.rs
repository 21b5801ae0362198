use crate::num::JsNumber;

/// Decoded string literal. `has_octal_escape` also covers `\8`/`\9`; both are
/// illegal under strict mode, which is only known after the directive prologue
/// has been parsed.
pub struct NormalisedString {
  pub value: String,
  pub has_octal_escape: bool,
}

/// Whether a number literal uses the legacy octal form (`0777`). The lexer
/// only produces this form when every digit past the leading zero is octal.
pub fn is_legacy_octal_number(raw: &str) -> bool {
  raw.len() > 1
    && raw.as_bytes()[0] == b'0'
    && raw.as_bytes()[1..].iter().all(|b| (b'0'..=b'7').contains(b))
}

pub fn normalise_literal_number(raw: &str) -> Option<JsNumber> {
  if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
    // Accumulate as f64: hex literals may exceed u64.
    let mut value = 0.0f64;
    for b in hex.bytes() {
      value = value * 16.0 + (b as char).to_digit(16)? as f64;
    }
    return Some(JsNumber(value));
  };
  if is_legacy_octal_number(raw) {
    let mut value = 0.0f64;
    for b in raw.bytes() {
      value = value * 8.0 + (b - b'0') as f64;
    }
    return Some(JsNumber(value));
  };
  // Integer fast path: small all-digit literals convert exactly.
  if raw.len() <= 15 && raw.bytes().all(|b| b.is_ascii_digit()) {
    return Some(JsNumber(raw.parse::<u64>().ok()? as f64));
  };
  // The remaining decimal forms (`1.5`, `.5`, `1.`, `1e3`) are also valid
  // Rust float syntax.
  raw.parse::<f64>().ok().map(JsNumber)
}

fn decode_escape(rest: &str, out: &mut String, has_octal_escape: &mut bool) -> Option<usize> {
  let mut chars = rest.chars();
  let first = chars.next()?;
  match first {
    '\r' => {
      // Line continuation; CRLF counts as one terminator.
      Some(if rest[1..].starts_with('\n') { 2 } else { 1 })
    }
    '\n' | '\u{2028}' | '\u{2029}' => Some(first.len_utf8()),
    'b' => {
      out.push('\x08');
      Some(1)
    }
    'f' => {
      out.push('\x0c');
      Some(1)
    }
    'n' => {
      out.push('\n');
      Some(1)
    }
    'r' => {
      out.push('\r');
      Some(1)
    }
    't' => {
      out.push('\t');
      Some(1)
    }
    'v' => {
      out.push('\x0b');
      Some(1)
    }
    '0'..='7' => {
      let mut consumed = 1;
      let mut value = first.to_digit(8).unwrap();
      // `\0` through `\3` take up to two more octal digits, `\4` through `\7`
      // up to one more, keeping the value within a byte.
      let max_extra = if first <= '3' { 2 } else { 1 };
      for c in rest[1..].chars().take(max_extra) {
        if !('0'..='7').contains(&c) {
          break;
        };
        consumed += 1;
        value = (value << 3) + c.to_digit(8).unwrap();
      }
      // `\0` not followed by a decimal digit is NUL, allowed even in strict
      // mode; everything else is a legacy octal escape.
      if !(first == '0' && consumed == 1 && !rest[1..].starts_with(|c: char| c.is_ascii_digit())) {
        *has_octal_escape = true;
      };
      out.push(char::from_u32(value)?);
      Some(consumed)
    }
    '8' | '9' => {
      // Legacy non-octal decimal escape: `"\8"` is `"8"`.
      *has_octal_escape = true;
      out.push(first);
      Some(1)
    }
    'x' => {
      let hex = rest.get(1..3)?;
      let value = u32::from_str_radix(hex, 16).ok()?;
      out.push(char::from_u32(value)?);
      Some(3)
    }
    'u' => {
      let hex = rest.get(1..5)?;
      if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
      };
      let value = u32::from_str_radix(hex, 16).ok()?;
      if (0xD800..=0xDBFF).contains(&value) {
        // Combine a surrogate pair into one scalar where possible.
        if let Some(low_hex) = rest.get(7..11) {
          if rest[5..].starts_with("\\u") && low_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            let low = u32::from_str_radix(low_hex, 16).unwrap();
            if (0xDC00..=0xDFFF).contains(&low) {
              let combined = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
              out.push(char::from_u32(combined)?);
              return Some(11);
            };
          };
        };
      };
      // JavaScript strings are UTF-16; a lone surrogate cannot live in a Rust
      // String, so map it to U+FFFD.
      out.push(char::from_u32(value).unwrap_or('\u{FFFD}'));
      Some(5)
    }
    c => {
      out.push(c);
      Some(c.len_utf8())
    }
  }
}

/// Decodes a string literal, quotes included in `raw`. Returns None on a
/// malformed escape; the lexer has already rejected unterminated literals and
/// bare line terminators.
pub fn normalise_literal_string(raw: &str) -> Option<NormalisedString> {
  debug_assert!(raw.len() >= 2);
  let body = &raw[1..raw.len() - 1];
  let mut value = String::with_capacity(body.len());
  let mut has_octal_escape = false;
  let mut rest = body;
  while let Some(i) = rest.find('\\') {
    value.push_str(&rest[..i]);
    let consumed = decode_escape(&rest[i + 1..], &mut value, &mut has_octal_escape)?;
    rest = &rest[i + 1 + consumed..];
  }
  value.push_str(rest);
  Some(NormalisedString {
    value,
    has_octal_escape,
  })
}

/// Splits a regex literal into pattern and flags, without the delimiting
/// slashes. The lexer guarantees the closing slash exists.
pub fn normalise_literal_regex(raw: &str) -> (&str, &str) {
  let close = raw.rfind('/').unwrap();
  (&raw[1..close], &raw[close + 1..])
}
