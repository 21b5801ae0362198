use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// Top-level classification of a parse failure.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ErrorKind {
  /// Ordinary syntax (or lexical) error.
  Syntax,
  /// Syntax error while parsing the string argument of `eval`; embedders
  /// report these distinctly from top-level/function syntax errors.
  Eval,
  /// The recursion guard tripped before the native call stack could.
  StackOverflow,
  /// Never produced by this crate (allocation failure aborts), but kept so the
  /// error taxonomy embedders switch over is a closed set.
  OutOfMemory,
}

/// How an embedding REPL should treat a syntax error.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Recovery {
  /// Malformed input; no amount of additional input helps.
  Irrecoverable,
  /// The error happened at end of input; more input might resolve it.
  Recoverable,
  /// A literal or comment was opened but never closed; worded as a missing
  /// closing quote/comment/bracket rather than a spelling mistake.
  Unterminated,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  // Lexical errors. The lexer records these as a sticky error alongside an
  // `Invalid` token; the parser surfaces them when it reaches that token.
  InvalidCharacter,
  InvalidIdentifierEscape,
  InvalidLegacyOctal,
  InvalidNumber,
  InvalidString,
  InvalidUnicodeEscape,
  LineTerminatorInRegex,
  UnterminatedIdentifierEscape,
  UnterminatedMultilineComment,
  UnterminatedNumber,
  UnterminatedRegex,
  UnterminatedString,
  UnterminatedUnicodeEscape,

  // Grammar errors.
  BindingNameRestricted,
  BreakOutsideLoopOrSwitch,
  ContinueLabelNotALoop,
  ContinueOutsideLoop,
  DuplicateParameter,
  ExpectedSyntax(&'static str),
  InvalidAssignmentTarget,
  LabelNotFound,
  LabelRedeclared,
  LineTerminatorAfterThrow,
  OctalInStrictMode,
  RequiredTokenNotFound(TT),
  ReturnOutsideFunction,
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
  UnexpectedToken,
  WithInStrictMode,
}

impl SyntaxErrorType {
  pub fn recovery(self) -> Recovery {
    match self {
      SyntaxErrorType::UnterminatedIdentifierEscape
      | SyntaxErrorType::UnterminatedMultilineComment
      | SyntaxErrorType::UnterminatedNumber
      | SyntaxErrorType::UnterminatedRegex
      | SyntaxErrorType::UnterminatedString
      | SyntaxErrorType::UnterminatedUnicodeEscape => Recovery::Unterminated,
      SyntaxErrorType::UnexpectedEnd => Recovery::Recoverable,
      _ => Recovery::Irrecoverable,
    }
  }

  pub fn message(self, actual_token: Option<TT>) -> String {
    match self {
      SyntaxErrorType::InvalidCharacter => "invalid character".into(),
      SyntaxErrorType::InvalidIdentifierEscape => "invalid escape in identifier".into(),
      SyntaxErrorType::InvalidLegacyOctal => "invalid octal literal".into(),
      SyntaxErrorType::InvalidNumber => "malformed number literal".into(),
      SyntaxErrorType::InvalidString => "line terminator not allowed in string literal".into(),
      SyntaxErrorType::InvalidUnicodeEscape => "invalid Unicode escape".into(),
      SyntaxErrorType::LineTerminatorInRegex => {
        "line terminator not allowed in regular expression".into()
      }
      SyntaxErrorType::UnterminatedIdentifierEscape => {
        "missing digits of escape in identifier".into()
      }
      SyntaxErrorType::UnterminatedMultilineComment => "missing closing `*/`".into(),
      SyntaxErrorType::UnterminatedNumber => "missing digits of number literal".into(),
      SyntaxErrorType::UnterminatedRegex => {
        "missing closing `/` of regular expression".into()
      }
      SyntaxErrorType::UnterminatedString => "missing closing quote".into(),
      SyntaxErrorType::UnterminatedUnicodeEscape => "missing digits of Unicode escape".into(),

      SyntaxErrorType::BindingNameRestricted => {
        "`eval` and `arguments` cannot be bound in strict mode".into()
      }
      SyntaxErrorType::BreakOutsideLoopOrSwitch => {
        "`break` outside of a loop or switch".into()
      }
      SyntaxErrorType::ContinueLabelNotALoop => {
        "`continue` label does not name an enclosing loop".into()
      }
      SyntaxErrorType::ContinueOutsideLoop => "`continue` outside of a loop".into(),
      SyntaxErrorType::DuplicateParameter => {
        "duplicate parameter name not allowed in strict mode".into()
      }
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidAssignmentTarget => "invalid assignment target".into(),
      SyntaxErrorType::LabelNotFound => "label not found".into(),
      SyntaxErrorType::LabelRedeclared => "label already declared".into(),
      SyntaxErrorType::LineTerminatorAfterThrow => {
        "line terminator not allowed after `throw`".into()
      }
      SyntaxErrorType::OctalInStrictMode => {
        "octal literals are not allowed in strict mode".into()
      }
      SyntaxErrorType::RequiredTokenNotFound(tt) => format!("expected {}", tt.description()),
      SyntaxErrorType::ReturnOutsideFunction => "`return` outside of a function".into(),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "try statement requires a catch or finally block".into()
      }
      SyntaxErrorType::UnexpectedEnd => "unexpected end of script".into(),
      SyntaxErrorType::UnexpectedToken => match actual_token {
        Some(tt) => format!("unexpected {}", tt.description()),
        None => "unexpected token".into(),
      },
      SyntaxErrorType::WithInStrictMode => {
        "`with` statements are not allowed in strict mode".into()
      }
    }
  }
}

#[derive(Clone)]
pub struct SyntaxError {
  pub kind: ErrorKind,
  pub typ: SyntaxErrorType,
  pub recovery: Recovery,
  pub loc: Loc,
  pub line: u32,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(
    kind: ErrorKind,
    typ: SyntaxErrorType,
    loc: Loc,
    line: u32,
    actual_token: Option<TT>,
  ) -> SyntaxError {
    SyntaxError {
      kind,
      typ,
      recovery: typ.recovery(),
      loc,
      line,
      actual_token,
    }
  }

  pub fn with_kind(mut self, kind: ErrorKind) -> SyntaxError {
    self.kind = kind;
    self
  }

  pub fn message(&self) -> String {
    match self.kind {
      ErrorKind::StackOverflow => "too much recursion".into(),
      ErrorKind::OutOfMemory => "out of memory".into(),
      _ => self.typ.message(self.actual_token),
    }
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} on line {} around loc [{}:{}]",
      self, self.line, self.loc.0, self.loc.1
    )
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} [token={:?}]", self.message(), self.actual_token)
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;
