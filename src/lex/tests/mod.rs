use super::lex_expect_identifier;
use super::lex_next;
use super::LexMode;
use super::Lexer;
use crate::error::SyntaxErrorType;
use crate::loc::Pos;
use crate::token::Token;
use crate::token::TT;

fn lex_all(code: &str) -> Vec<Token> {
  let mut lexer = Lexer::new(code, Pos::default());
  let mut tokens = Vec::new();
  loop {
    let token = lex_next(&mut lexer, LexMode::Standard);
    let typ = token.typ;
    tokens.push(token);
    if typ == TT::EOF || typ == TT::Invalid {
      break;
    };
  }
  tokens
}

fn check(code: &str, expected: &[TT]) {
  let types: Vec<TT> = lex_all(code).iter().map(|t| t.typ).collect();
  let mut expected = expected.to_vec();
  expected.push(TT::EOF);
  assert_eq!(types, expected, "while lexing {:?}", code);
}

fn check_error(code: &str, expected: SyntaxErrorType) {
  let mut lexer = Lexer::new(code, Pos::default());
  loop {
    let token = lex_next(&mut lexer, LexMode::Standard);
    match token.typ {
      TT::Invalid => break,
      TT::EOF => panic!("expected lexical error while lexing {:?}", code),
      _ => {}
    };
  }
  assert_eq!(lexer.error().unwrap().typ, expected, "while lexing {:?}", code);
}

#[test]
fn test_operators_and_keywords() {
  check("a instanceof b", &[TT::Identifier, TT::KeywordInstanceof, TT::Identifier]);
  check("a >>>= b", &[TT::Identifier, TT::ChevronRightChevronRightChevronRightEquals, TT::Identifier]);
  check("x===y", &[TT::Identifier, TT::EqualsEqualsEquals, TT::Identifier]);
  check("typeof void 0", &[TT::KeywordTypeof, TT::KeywordVoid, TT::LiteralNumber]);
  check("true false null", &[TT::LiteralTrue, TT::LiteralFalse, TT::LiteralNull]);
}

#[test]
fn test_keyword_prefixed_identifiers() {
  check("instanceofx", &[TT::Identifier]);
  check("new0", &[TT::Identifier]);
  check("void_", &[TT::Identifier]);
  check("$in", &[TT::Identifier]);
  check("in", &[TT::KeywordIn]);
}

#[test]
fn test_reserved_words() {
  check("class", &[TT::ReservedWord]);
  check("super", &[TT::ReservedWord]);
  check("classes", &[TT::Identifier]);
}

#[test]
fn test_numbers() {
  check("0", &[TT::LiteralNumber]);
  check("123.45", &[TT::LiteralNumber]);
  check(".5", &[TT::LiteralNumber]);
  check("1e10", &[TT::LiteralNumber]);
  check("1E-10", &[TT::LiteralNumber]);
  check("0x1F", &[TT::LiteralNumber]);
  check("017", &[TT::LiteralNumber]);
  // Leading-zero decimals are not octal.
  check("08.5", &[TT::LiteralNumber]);
  // The dot is a decimal point; only a second one reaches the member operator.
  check("1..toString", &[TT::LiteralNumber, TT::Dot, TT::Identifier]);
}

#[test]
fn test_number_errors() {
  check_error("3in", SyntaxErrorType::InvalidNumber);
  check_error("0xg", SyntaxErrorType::InvalidNumber);
  check_error("0x", SyntaxErrorType::UnterminatedNumber);
  check_error("1e", SyntaxErrorType::UnterminatedNumber);
  check_error("1e+", SyntaxErrorType::UnterminatedNumber);
}

#[test]
fn test_strings() {
  check(r#""hello""#, &[TT::LiteralString]);
  check(r#"'it\'s'"#, &[TT::LiteralString]);
  check("\"a\\\nb\"", &[TT::LiteralString]);
  check_error("\"abc", SyntaxErrorType::UnterminatedString);
  check_error("\"abc\ndef\"", SyntaxErrorType::InvalidString);
}

#[test]
fn test_line_continuation_advances_line() {
  let mut lexer = Lexer::new("'a\\\nb' c", Pos::default());
  let str_tok = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(str_tok.typ, TT::LiteralString);
  let c = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(c.start.line, 2);
  assert!(!c.preceded_by_line_terminator);
}

#[test]
fn test_comments() {
  check("a /* b */ c", &[TT::Identifier, TT::Identifier]);
  check("a // b\nc", &[TT::Identifier, TT::Identifier]);
  check("a <!-- b\nc", &[TT::Identifier, TT::Identifier]);
  check("--> whole line ignored\nc", &[TT::Identifier]);
  // `-->` not at the start of a line is just tokens.
  check("a --> b", &[TT::Identifier, TT::HyphenHyphen, TT::ChevronRight, TT::Identifier]);
  check_error("/* unterminated", SyntaxErrorType::UnterminatedMultilineComment);
}

#[test]
fn test_preceded_by_line_terminator() {
  let tokens = lex_all("a\nb /* x\ny */ c d");
  assert!(!tokens[0].preceded_by_line_terminator);
  assert!(tokens[1].preceded_by_line_terminator, "after newline");
  assert!(tokens[2].preceded_by_line_terminator, "after multiline comment containing newline");
  assert!(!tokens[3].preceded_by_line_terminator);
}

#[test]
fn test_line_counting() {
  let tokens = lex_all("a\r\nb\n\rc\u{2028}d");
  let lines: Vec<u32> = tokens.iter().map(|t| t.start.line).collect();
  // CRLF and LFCR each count as a single terminator.
  assert_eq!(lines, vec![1, 2, 3, 4, 4]);
}

#[test]
fn test_regex_mode() {
  let mut lexer = Lexer::new("/ab+c/gi", Pos::default());
  let token = lex_next(&mut lexer, LexMode::SlashIsRegex);
  assert_eq!(token.typ, TT::LiteralRegex);
  assert_eq!(token.loc(), crate::loc::Loc(0, 8));

  let mut lexer = Lexer::new("/a/ b", Pos::default());
  let token = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(token.typ, TT::Slash);
}

#[test]
fn test_regex_charset_hides_slash() {
  let mut lexer = Lexer::new("/[/]/", Pos::default());
  let token = lex_next(&mut lexer, LexMode::SlashIsRegex);
  assert_eq!(token.typ, TT::LiteralRegex);
  assert_eq!(token.loc(), crate::loc::Loc(0, 5));
}

#[test]
fn test_regex_errors() {
  let mut lexer = Lexer::new("/ab", Pos::default());
  let token = lex_next(&mut lexer, LexMode::SlashIsRegex);
  assert_eq!(token.typ, TT::Invalid);
  assert_eq!(lexer.error().unwrap().typ, SyntaxErrorType::UnterminatedRegex);

  let mut lexer = Lexer::new("/ab\ncd/", Pos::default());
  let token = lex_next(&mut lexer, LexMode::SlashIsRegex);
  assert_eq!(token.typ, TT::Invalid);
  assert_eq!(
    lexer.error().unwrap().typ,
    SyntaxErrorType::LineTerminatorInRegex
  );
}

#[test]
fn test_identifier_escapes() {
  check("\\u0061bc", &[TT::Identifier]);
  // An escaped keyword is an identifier, not a keyword.
  check("\\u0069n", &[TT::Identifier]);
  check_error("\\u006", SyntaxErrorType::UnterminatedUnicodeEscape);
  check_error("\\u00zz", SyntaxErrorType::InvalidUnicodeEscape);
  check_error("\\x61", SyntaxErrorType::InvalidIdentifierEscape);
}

#[test]
fn test_non_ascii_identifiers() {
  check("déjà_vu", &[TT::Identifier]);
  check("日本語", &[TT::Identifier]);
}

#[test]
fn test_invalid_character() {
  check_error("#", SyntaxErrorType::InvalidCharacter);
  check_error("a @ b", SyntaxErrorType::InvalidCharacter);
}

#[test]
fn test_sticky_error() {
  let mut lexer = Lexer::new("\"abc", Pos::default());
  let first = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(first.typ, TT::Invalid);
  // The error stays observable on subsequent calls.
  let second = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(second.typ, TT::EOF);
  assert_eq!(
    lexer.error().unwrap().typ,
    SyntaxErrorType::UnterminatedString
  );
}

#[test]
fn test_expect_identifier_fast_path() {
  let mut lexer = Lexer::new("delete", Pos::default());
  let token = lex_expect_identifier(&mut lexer);
  // No keyword lookup on this path.
  assert_eq!(token.typ, TT::Identifier);
  assert_eq!(token.loc(), crate::loc::Loc(0, 6));
}

#[test]
fn test_expect_identifier_fallback() {
  // An escape forces the general lexer.
  let mut lexer = Lexer::new("a\\u0062c", Pos::default());
  let token = lex_expect_identifier(&mut lexer);
  assert_eq!(token.typ, TT::Identifier);
  assert_eq!(token.loc(), crate::loc::Loc(0, 8));

  // A comment forces the general lexer too.
  let mut lexer = Lexer::new("/* x */ foo", Pos::default());
  let token = lex_expect_identifier(&mut lexer);
  assert_eq!(token.typ, TT::Identifier);
  assert_eq!(token.loc(), crate::loc::Loc(8, 11));
}

#[test]
fn test_base_offset() {
  let start = Pos::new(10, 100, 95);
  let mut lexer = Lexer::new("ab cd", start);
  let a = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(a.loc(), crate::loc::Loc(100, 102));
  assert_eq!(a.start.line, 10);
  assert_eq!(a.start.column(), 5);
  let b = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(b.loc(), crate::loc::Loc(103, 105));
}
