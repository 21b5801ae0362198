use crate::char::CharFilter;
use crate::char::DIGIT;
use crate::char::DIGIT_HEX;
use crate::char::DIGIT_OCT;
use crate::char::ID_CONTINUE;
use crate::char::ID_CONTINUE_CHARSTR;
use crate::char::ID_START;
use crate::char::ID_START_CHARSTR;
use crate::error::ErrorKind;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use crate::loc::Pos;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr2;
use memchr::memchr3;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Eq, PartialEq)]
pub enum LexMode {
  /// `/` begins a regular expression literal (grammar position expects a
  /// primary expression).
  SlashIsRegex,
  Standard,
}

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
  line: u32,
  line_start: usize,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
  anchored: bool,
}

impl PatternMatcher {
  pub fn new<D: AsRef<str>>(anchored: bool, patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let byte_syns: Vec<Vec<u8>> = syns.iter().map(|s| s.as_ref().as_bytes().to_vec()).collect();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(if anchored {
        StartKind::Anchored
      } else {
        StartKind::Unanchored
      })
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(byte_syns)
      .unwrap();
    PatternMatcher {
      patterns: tts,
      matcher,
      anchored,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> Option<(TT, Match)> {
    self
      .matcher
      .find(
        Input::new(&lexer.source[lexer.next..]).anchored(if self.anchored {
          Anchored::Yes
        } else {
          Anchored::No
        }),
      )
      .map(|m| (self.patterns[m.pattern().as_usize()], Match(m.end())))
  }
}

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
  // Absolute offset of `source[0]`; non-zero for source embedded in a larger
  // document. All emitted offsets include it.
  base: usize,
  line: u32,
  // Absolute offset of the start of the current line.
  line_start: usize,
  // First lexical error seen. Sticky: the lexer never throws, it emits an
  // `Invalid` token and records the specific error here for the caller to
  // observe before continuing.
  error: Option<SyntaxError>,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str, start: Pos) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
      base: start.offset,
      line: start.line,
      line_start: start.line_start,
      error: None,
    }
  }

  pub fn pos(&self) -> Pos {
    Pos::new(self.line, self.base + self.next, self.line_start)
  }

  pub fn error(&self) -> Option<&SyntaxError> {
    self.error.as_ref()
  }

  fn set_error(&mut self, typ: SyntaxErrorType, loc: Loc) {
    if self.error.is_none() {
      self.error = Some(SyntaxError::new(
        ErrorKind::Syntax,
        typ,
        loc,
        self.line,
        Some(TT::Invalid),
      ));
    };
  }

  fn error_here(&mut self, typ: SyntaxErrorType, start: usize) {
    let loc = Loc(self.base + start, self.base + self.next);
    self.set_error(typ, loc);
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek_or_eof(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint {
      next: self.next,
      line: self.line,
      line_start: self.line_start,
    }
  }

  pub fn apply_checkpoint(&mut self, checkpoint: LexerCheckpoint) {
    self.next = checkpoint.next;
    self.line = checkpoint.line;
    self.line_start = checkpoint.line_start;
  }

  /// Repositions the lexer at a previously emitted position. Used when the
  /// parser rewinds its token buffer or fast-skips a cached function body.
  pub fn set_position(&mut self, pos: Pos) {
    debug_assert!(pos.offset >= self.base);
    self.next = pos.offset - self.base;
    self.line = pos.line;
    self.line_start = pos.line_start;
  }

  /// Records that a line terminator ending at (relative) offset `end_rel` was
  /// crossed. CRLF/LFCR pairs must be recorded once.
  fn mark_line(&mut self, end_rel: usize) {
    self.line += 1;
    self.line_start = self.base + end_rel;
  }

  fn if_char(&self, c: char) -> Match {
    let remaining = &self.source[self.next..];
    match remaining.chars().next() {
      Some(first) if first == c => Match(c.len_utf8()),
      _ => Match(0),
    }
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if chars.has(ch) {
        len += ch.len_utf8();
      } else {
        break;
      }
    }
    Match(len)
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn consume_next(&mut self) -> Option<char> {
    let c = self.peek_or_eof(0)?;
    self.next += c.len_utf8();
    Some(c)
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  /// Consumes a line terminator at the cursor, counting CRLF/LFCR as one.
  /// Returns false if the cursor is not at a line terminator.
  fn consume_line_terminator(&mut self) -> bool {
    let Some(c) = self.peek_or_eof(0) else {
      return false;
    };
    match c {
      '\r' | '\n' => {
        self.skip_expect(1);
        let pair = if c == '\r' { '\n' } else { '\r' };
        if self.peek_or_eof(0) == Some(pair) {
          self.skip_expect(1);
        };
        self.mark_line(self.next);
        true
      }
      '\u{2028}' | '\u{2029}' => {
        self.skip_expect(c.len_utf8());
        self.mark_line(self.next);
        true
      }
      _ => false,
    }
  }

  fn drive(&mut self, preceded_by_line_terminator: bool, f: impl FnOnce(&mut Self) -> TT) -> Token {
    let start = self.pos();
    let typ = f(self);
    Token {
      typ,
      start,
      end: self.pos(),
      preceded_by_line_terminator,
    }
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0 - self.base..index.1 - self.base]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Ampersand, "&");
  map.insert(TT::AmpersandAmpersand, "&&");
  map.insert(TT::AmpersandEquals, "&=");
  map.insert(TT::Asterisk, "*");
  map.insert(TT::AsteriskEquals, "*=");
  map.insert(TT::Bar, "|");
  map.insert(TT::BarBar, "||");
  map.insert(TT::BarEquals, "|=");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::BracketClose, "]");
  map.insert(TT::BracketOpen, "[");
  map.insert(TT::Caret, "^");
  map.insert(TT::CaretEquals, "^=");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftChevronLeft, "<<");
  map.insert(TT::ChevronLeftChevronLeftEquals, "<<=");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightChevronRight, ">>");
  map.insert(TT::ChevronRightChevronRightChevronRight, ">>>");
  map.insert(TT::ChevronRightChevronRightChevronRightEquals, ">>>=");
  map.insert(TT::ChevronRightChevronRightEquals, ">>=");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::Equals, "=");
  map.insert(TT::EqualsEquals, "==");
  map.insert(TT::EqualsEqualsEquals, "===");
  map.insert(TT::Exclamation, "!");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::ExclamationEqualsEquals, "!==");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::HyphenEquals, "-=");
  map.insert(TT::HyphenHyphen, "--");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Percent, "%");
  map.insert(TT::PercentEquals, "%=");
  map.insert(TT::Plus, "+");
  map.insert(TT::PlusEquals, "+=");
  map.insert(TT::PlusPlus, "++");
  map.insert(TT::Question, "?");
  map.insert(TT::Semicolon, ";");
  map.insert(TT::Slash, "/");
  map.insert(TT::SlashEquals, "/=");
  map.insert(TT::Tilde, "~");
  map
});

pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordBreak, "break");
  map.insert(TT::KeywordCase, "case");
  map.insert(TT::KeywordCatch, "catch");
  map.insert(TT::KeywordContinue, "continue");
  map.insert(TT::KeywordDebugger, "debugger");
  map.insert(TT::KeywordDefault, "default");
  map.insert(TT::KeywordDelete, "delete");
  map.insert(TT::KeywordDo, "do");
  map.insert(TT::KeywordElse, "else");
  map.insert(TT::KeywordFinally, "finally");
  map.insert(TT::KeywordFor, "for");
  map.insert(TT::KeywordFunction, "function");
  map.insert(TT::KeywordIf, "if");
  map.insert(TT::KeywordIn, "in");
  map.insert(TT::KeywordInstanceof, "instanceof");
  map.insert(TT::KeywordNew, "new");
  map.insert(TT::KeywordReturn, "return");
  map.insert(TT::KeywordSwitch, "switch");
  map.insert(TT::KeywordThis, "this");
  map.insert(TT::KeywordThrow, "throw");
  map.insert(TT::KeywordTry, "try");
  map.insert(TT::KeywordTypeof, "typeof");
  map.insert(TT::KeywordVar, "var");
  map.insert(TT::KeywordVoid, "void");
  map.insert(TT::KeywordWhile, "while");
  map.insert(TT::KeywordWith, "with");
  map.insert(TT::LiteralFalse, "false");
  map.insert(TT::LiteralNull, "null");
  map.insert(TT::LiteralTrue, "true");
  map
});

// Future reserved words. They lex as a single token type since none of them
// is usable anywhere in the grammar.
pub const RESERVED_WORDS: [&str; 7] = [
  "class", "const", "enum", "export", "extends", "import", "super",
];

pub static KEYWORD_STRS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  KEYWORDS_MAPPING
    .values()
    .copied()
    .chain(RESERVED_WORDS)
    .collect()
});

#[rustfmt::skip]
static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  let mut words: Vec<(TT, &'static str)> = Vec::new();
  words.extend(KEYWORDS_MAPPING.iter().map(|(&k, &v)| (k, v)));
  words.extend(RESERVED_WORDS.iter().map(|&v| (TT::ReservedWord, v)));
  for (k, v) in words {
    patterns.push((k, v.into()));
    // Avoid accidentally matching an identifier starting with a keyword as a keyword.
    for c in ID_CONTINUE_CHARSTR.chars() {
      let mut v = v.to_string();
      v.push(c);
      if !KEYWORD_STRS.contains(v.as_str()) {
        patterns.push((TT::Identifier, v));
      }
    }
  }
  for c in ID_START_CHARSTR.chars() {
    patterns.push((TT::Identifier, c.to_string()));
  }
  // Backslash begins a Unicode escape in an identifier.
  patterns.push((TT::Identifier, "\\".into()));
  for c in "0123456789".chars() {
    patterns.push((TT::LiteralNumber, c.to_string()));
  }
  patterns.push((TT::LiteralNumberHex, "0x".into()));
  patterns.push((TT::LiteralNumberHex, "0X".into()));
  // Prevent `.` immediately followed by a digit from being recognised as the `.` operator.
  for digit in '0'..='9' {
    patterns.push((TT::LiteralNumber, format!(".{}", digit)));
  }
  patterns.push((TT::LiteralString, "\"".into()));
  patterns.push((TT::LiteralString, "'".into()));

  PatternMatcher::new(true, patterns)
});

static ML_COMMENT: Lazy<PatternMatcher> = Lazy::new(|| {
  PatternMatcher::new::<&str>(false, vec![
    (TT::CommentMultilineEnd, "*/"),
    (TT::LineTerminator, "\r\n"),
    (TT::LineTerminator, "\n\r"),
    (TT::LineTerminator, "\r"),
    (TT::LineTerminator, "\n"),
    (TT::LineTerminator, "\u{2028}"),
    (TT::LineTerminator, "\u{2029}"),
  ])
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = vec![
    (TT::LineTerminator, "\r\n".into()),
    (TT::LineTerminator, "\n\r".into()),
    (TT::LineTerminator, "\r".into()),
    (TT::LineTerminator, "\n".into()),
    (TT::LineTerminator, "\u{2028}".into()),
    (TT::LineTerminator, "\u{2029}".into()),
    (TT::CommentMultiline, "/*".into()),
    (TT::CommentSingle, "//".into()),
    (TT::CommentSingle, "<!--".into()),
    (TT::CommentSingle, "-->".into()),
  ];
  for c in crate::char::WHITESPACE_CHARS {
    patterns.push((TT::Whitespace, c.to_string()));
  }
  PatternMatcher::new(true, patterns)
});

/// Returns whether the comment crossed a line terminator.
fn lex_multiline_comment(lexer: &mut Lexer<'_>) -> bool {
  let comment_start = lexer.next;
  // Consume `/*`.
  lexer.skip_expect(2);
  let mut contains_newline = false;
  loop {
    let Some((tt, mat)) = ML_COMMENT.find(lexer) else {
      // No matching `*/` before the end of the source.
      lexer.consume(Match(lexer.remaining()));
      lexer.error_here(SyntaxErrorType::UnterminatedMultilineComment, comment_start);
      break;
    };
    lexer.consume(mat);
    match tt {
      TT::CommentMultilineEnd => {
        break;
      }
      TT::LineTerminator => {
        lexer.mark_line(lexer.next);
        contains_newline = true;
      }
      _ => unreachable!(),
    };
  }
  contains_newline
}

/// Consumes a line comment up to (not including) the next line terminator, so
/// the main loop still observes the terminator.
fn lex_single_comment(lexer: &mut Lexer<'_>, prefix: Match) {
  lexer.skip_expect(prefix.len());
  let rest = &lexer.source[lexer.next..];
  let ascii_end = memchr2(b'\r', b'\n', rest.as_bytes()).unwrap_or(rest.len());
  let end = rest[..ascii_end]
    .find(['\u{2028}', '\u{2029}'])
    .unwrap_or(ascii_end);
  lexer.consume(Match(end));
}

/// Consumes `\uHHHH` at the cursor (cursor on the backslash).
fn lex_identifier_escape(lexer: &mut Lexer<'_>) -> bool {
  let escape_start = lexer.next;
  lexer.skip_expect(1);
  if lexer.peek_or_eof(0) != Some('u') {
    let typ = if lexer.at_end() {
      SyntaxErrorType::UnterminatedIdentifierEscape
    } else {
      SyntaxErrorType::InvalidIdentifierEscape
    };
    lexer.error_here(typ, escape_start);
    return false;
  };
  lexer.skip_expect(1);
  for _ in 0..4 {
    match lexer.peek_or_eof(0) {
      Some(c) if DIGIT_HEX.has(c) => lexer.skip_expect(1),
      Some(_) => {
        lexer.error_here(SyntaxErrorType::InvalidUnicodeEscape, escape_start);
        return false;
      }
      None => {
        lexer.error_here(SyntaxErrorType::UnterminatedUnicodeEscape, escape_start);
        return false;
      }
    };
  }
  true
}

fn lex_identifier(lexer: &mut Lexer<'_>) -> TT {
  // Consume starter (either a char or a Unicode escape).
  let starter = lexer.peek_or_eof(0).unwrap();
  if starter == '\\' {
    if !lex_identifier_escape(lexer) {
      return TT::Invalid;
    }
  } else {
    lexer.skip_expect(starter.len_utf8());
  }

  loop {
    lexer.consume(lexer.while_chars(&ID_CONTINUE));
    match lexer.peek_or_eof(0) {
      Some('\\') => {
        if !lex_identifier_escape(lexer) {
          return TT::Invalid;
        }
      }
      // Assume any non-ASCII character continues the identifier.
      Some(c) if !c.is_ascii() && !crate::char::is_line_terminator(c) => {
        lexer.skip_expect(c.len_utf8());
      }
      _ => break,
    }
  }
  TT::Identifier
}

/// A numeric literal immediately followed by an identifier-start character is
/// a lexical error (`3in` is invalid).
fn check_number_suffix(lexer: &mut Lexer<'_>, start: usize) -> TT {
  match lexer.peek_or_eof(0) {
    Some(c) if ID_START.has(c) || c == '\\' => {
      lexer.skip_expect(c.len_utf8());
      lexer.error_here(SyntaxErrorType::InvalidNumber, start);
      TT::Invalid
    }
    _ => TT::LiteralNumber,
  }
}

fn lex_number(lexer: &mut Lexer<'_>) -> TT {
  let start = lexer.next;
  let first_char = lexer.peek_or_eof(0).unwrap();
  lexer.consume(lexer.while_chars(&DIGIT));
  let integer_part = &lexer.source[start..lexer.next];
  // A leading `0` followed by more digits is a legacy octal literal, unless a
  // non-octal digit or a fractional/exponent part forces a decimal reading.
  let is_legacy_octal = first_char == '0'
    && integer_part.len() > 1
    && integer_part.chars().all(|c| DIGIT_OCT.has(c))
    && !matches!(lexer.peek_or_eof(0), Some('.' | '8' | '9' | 'e' | 'E'));
  if is_legacy_octal {
    return check_number_suffix(lexer, start);
  };
  if lexer.peek_or_eof(0) == Some('.') {
    lexer.consume(lexer.if_char('.'));
    lexer.consume(lexer.while_chars(&DIGIT));
  };
  if matches!(lexer.peek_or_eof(0), Some('e' | 'E')) {
    lexer.skip_expect(1);
    if matches!(lexer.peek_or_eof(0), Some('+' | '-')) {
      lexer.skip_expect(1);
    };
    if lexer.consume(lexer.while_chars(&DIGIT)).is_empty() {
      let typ = if lexer.at_end() {
        SyntaxErrorType::UnterminatedNumber
      } else {
        SyntaxErrorType::InvalidNumber
      };
      lexer.error_here(typ, start);
      return TT::Invalid;
    };
  };
  check_number_suffix(lexer, start)
}

fn lex_hex_number(lexer: &mut Lexer<'_>) -> TT {
  let start = lexer.next;
  // Consume `0x`.
  lexer.skip_expect(2);
  if lexer.consume(lexer.while_chars(&DIGIT_HEX)).is_empty() {
    let typ = if lexer.at_end() {
      SyntaxErrorType::UnterminatedNumber
    } else {
      SyntaxErrorType::InvalidNumber
    };
    lexer.error_here(typ, start);
    return TT::Invalid;
  };
  check_number_suffix(lexer, start)
}

fn lex_string(lexer: &mut Lexer<'_>) -> TT {
  let start = lexer.next;
  let quote = lexer.peek_or_eof(0).unwrap();
  lexer.skip_expect(quote.len_utf8());
  let mut invalid = false;
  loop {
    // Fast path: scan for the backslash, a CR, or the closing quote, assuming
    // escape-free content in between. LF and the Unicode separators are
    // checked below since memchr3 wants single bytes.
    let fast = memchr3(
      b'\\',
      b'\r',
      quote as u8,
      lexer.source[lexer.next..].as_bytes(),
    );
    let stop = lexer.source[lexer.next..lexer.next + fast.unwrap_or(lexer.remaining())]
      .find(['\n', '\u{2028}', '\u{2029}'])
      .or(fast);
    let Some(stop) = stop else {
      lexer.consume(Match(lexer.remaining()));
      lexer.error_here(SyntaxErrorType::UnterminatedString, start);
      return TT::Invalid;
    };
    lexer.consume(Match(stop));
    match lexer.peek_or_eof(0) {
      Some('\\') => {
        lexer.skip_expect(1);
        // A backslash before a line terminator is a line continuation; the
        // line counter must still advance.
        if !lexer.consume_line_terminator() {
          match lexer.consume_next() {
            Some(_) => {}
            None => {
              lexer.error_here(SyntaxErrorType::UnterminatedString, start);
              return TT::Invalid;
            }
          };
        };
      }
      Some(c) if crate::char::is_line_terminator(c) => {
        // Bare line terminator inside the literal.
        invalid = true;
        lexer.consume_line_terminator();
      }
      Some(c) if c == quote => {
        lexer.skip_expect(c.len_utf8());
        break;
      }
      _ => unreachable!(),
    };
  }
  if invalid {
    lexer.error_here(SyntaxErrorType::InvalidString, start);
    TT::Invalid
  } else {
    TT::LiteralString
  }
}

/// Scans a regular expression literal starting at the `/`. Not called by the
/// main lexer; the parser invokes this (via [LexMode::SlashIsRegex]) only
/// where its grammar position expects a primary expression.
fn lex_regex(lexer: &mut Lexer<'_>) -> TT {
  let start = lexer.next;
  // Consume slash.
  lexer.skip_expect(1);
  let mut in_charset = false;
  loop {
    let Some(c) = lexer.consume_next() else {
      lexer.error_here(SyntaxErrorType::UnterminatedRegex, start);
      return TT::Invalid;
    };
    match c {
      '\\' => {
        // Cannot escape a line terminator.
        match lexer.peek_or_eof(0) {
          Some(c) if crate::char::is_line_terminator(c) => {
            lexer.consume_line_terminator();
            lexer.error_here(SyntaxErrorType::LineTerminatorInRegex, start);
            return TT::Invalid;
          }
          Some(c) => lexer.skip_expect(c.len_utf8()),
          None => {
            lexer.error_here(SyntaxErrorType::UnterminatedRegex, start);
            return TT::Invalid;
          }
        };
      }
      // `[`...`]` suppresses the terminating `/`.
      '/' if !in_charset => {
        break;
      }
      '[' => {
        in_charset = true;
      }
      ']' if in_charset => {
        in_charset = false;
      }
      c if crate::char::is_line_terminator(c) => {
        // consume_next already advanced past it; fix up the line counter.
        lexer.mark_line(lexer.next);
        lexer.error_here(SyntaxErrorType::LineTerminatorInRegex, start);
        return TT::Invalid;
      }
      _ => {}
    };
  }
  // Trailing identifier characters are the flags.
  lexer.consume(lexer.while_chars(&ID_CONTINUE));
  TT::LiteralRegex
}

pub fn lex_next(lexer: &mut Lexer<'_>, mode: LexMode) -> Token {
  // Skip whitespace and comments before the next significant token, tracking
  // whether a line terminator was crossed (consumed by ASI) and whether we
  // are at the start of a line (`-->` is only a comment there).
  let mut at_line_start = lexer.base + lexer.next == lexer.line_start;
  let mut preceded_by_line_terminator = false;
  while let Some((tt, mat)) = INSIG.find(lexer) {
    if tt == TT::CommentSingle && mat.len() == 3 && !at_line_start {
      // `-->` elsewhere than the start of a line is just tokens.
      break;
    }
    match tt {
      TT::LineTerminator => {
        lexer.consume(mat);
        lexer.mark_line(lexer.next);
        at_line_start = true;
        preceded_by_line_terminator = true;
      }
      TT::Whitespace => {
        lexer.consume(mat);
      }
      TT::CommentMultiline => {
        let crossed = lex_multiline_comment(lexer);
        at_line_start |= crossed;
        preceded_by_line_terminator |= crossed;
      }
      TT::CommentSingle => {
        lex_single_comment(lexer, mat);
      }
      _ => unreachable!(),
    };
  }

  // EOF is different from Invalid, so emit it specifically.
  if lexer.at_end() {
    let pos = lexer.pos();
    return Token {
      typ: TT::EOF,
      start: pos,
      end: pos,
      preceded_by_line_terminator,
    };
  };

  lexer.drive(preceded_by_line_terminator, |lexer| {
    // Non-ASCII start: assume an identifier.
    if let Some(c) = lexer.peek_or_eof(0) {
      if !c.is_ascii() {
        return lex_identifier(lexer);
      }
    };

    let Some((tt, mat)) = SIG.find(lexer) else {
      // No pattern matches: a character with no place in the language.
      let c = lexer.consume_next().unwrap();
      lexer.error_here(SyntaxErrorType::InvalidCharacter, lexer.next - c.len_utf8());
      return TT::Invalid;
    };
    match tt {
      TT::Identifier => lex_identifier(lexer),
      TT::LiteralNumber => lex_number(lexer),
      TT::LiteralNumberHex => lex_hex_number(lexer),
      TT::LiteralString => lex_string(lexer),
      TT::Slash | TT::SlashEquals if mode == LexMode::SlashIsRegex => lex_regex(lexer),
      typ => {
        lexer.consume(mat);
        typ
      }
    }
  })
}

/// Restricted fast path for positions where the grammar guarantees a plain
/// identifier follows (e.g. a property name after `.`). Scans a contiguous
/// ASCII identifier without the keyword lookup; anything more exotic
/// (escapes, non-ASCII, comments) falls back to the general lexer, where
/// keywords lex as keywords and are rejected by the caller.
pub fn lex_expect_identifier(lexer: &mut Lexer<'_>) -> Token {
  let cp = lexer.checkpoint();
  // The fast path permits simple horizontal whitespace before the name.
  while matches!(lexer.peek_or_eof(0), Some(' ' | '\t')) {
    lexer.skip_expect(1);
  }
  match lexer.peek_or_eof(0) {
    Some(c) if c.is_ascii() && ID_START.has(c) => {
      let token = lexer.drive(false, |lexer| {
        lexer.skip_expect(1);
        lexer.consume(lexer.while_chars(&ID_CONTINUE));
        TT::Identifier
      });
      match lexer.peek_or_eof(0) {
        // An escape or non-ASCII continuation invalidates the fast scan.
        Some(c) if c == '\\' || !c.is_ascii() => {
          lexer.apply_checkpoint(cp);
          lex_next(lexer, LexMode::Standard)
        }
        _ => token,
      }
    }
    _ => {
      lexer.apply_checkpoint(cp);
      lex_next(lexer, LexMode::Standard)
    }
  }
}
