use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::lex::KEYWORDS_MAPPING;
use crate::lex::OPERATORS_MAPPING;
use crate::loc::Loc;
use crate::loc::Pos;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Special token used to represent the end of the source code. Easier than using and handling Option everywhere.
  EOF,
  // Special token used to represent invalid source code. Easier than having to propagate errors from the lexer level, which means even peeking during parsing requires error handling. The lexer records the specific lexical error alongside.
  Invalid,
  // These are only used by lexer.
  CommentMultiline,
  CommentMultilineEnd,
  CommentSingle,
  LineTerminator,
  LiteralNumberHex,
  Whitespace,

  Ampersand,
  AmpersandAmpersand,
  AmpersandEquals,
  Asterisk,
  AsteriskEquals,
  Bar,
  BarBar,
  BarEquals,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  Caret,
  CaretEquals,
  ChevronLeft,
  ChevronLeftChevronLeft,
  ChevronLeftChevronLeftEquals,
  ChevronLeftEquals,
  ChevronRight,
  ChevronRightChevronRight,
  ChevronRightChevronRightChevronRight,
  ChevronRightChevronRightChevronRightEquals,
  ChevronRightChevronRightEquals,
  ChevronRightEquals,
  Colon,
  Comma,
  Dot,
  Equals,
  EqualsEquals,
  EqualsEqualsEquals,
  Exclamation,
  ExclamationEquals,
  ExclamationEqualsEquals,
  Hyphen,
  HyphenEquals,
  HyphenHyphen,
  Identifier,
  KeywordBreak,
  KeywordCase,
  KeywordCatch,
  KeywordContinue,
  KeywordDebugger,
  KeywordDefault,
  KeywordDelete,
  KeywordDo,
  KeywordElse,
  KeywordFinally,
  KeywordFor,
  KeywordFunction,
  KeywordIf,
  KeywordIn,
  KeywordInstanceof,
  KeywordNew,
  KeywordReturn,
  KeywordSwitch,
  KeywordThis,
  KeywordThrow,
  KeywordTry,
  KeywordTypeof,
  KeywordVar,
  KeywordVoid,
  KeywordWhile,
  KeywordWith,
  LiteralFalse,
  LiteralNull,
  LiteralNumber,
  LiteralRegex,
  LiteralString,
  LiteralTrue,
  ParenthesisClose,
  ParenthesisOpen,
  Percent,
  PercentEquals,
  Plus,
  PlusEquals,
  PlusPlus,
  Question,
  // Future reserved words (`class`, `enum`, `export`, `extends`, `import`, `super`, `const`). They can never be used as identifiers, so one token type suffices.
  ReservedWord,
  Semicolon,
  Slash,
  SlashEquals,
  Tilde,
}

impl TT {
  /// Human-readable description for error messages, derived from the
  /// operator/keyword tables with special cases for literal-family tokens.
  pub fn description(self) -> String {
    if let Some(syn) = OPERATORS_MAPPING.get(&self) {
      return format!("`{}`", syn);
    };
    if let Some(syn) = KEYWORDS_MAPPING.get(&self) {
      return format!("keyword `{}`", syn);
    };
    match self {
      TT::EOF => "end of script".to_string(),
      TT::Invalid => "invalid token".to_string(),
      TT::Identifier => "identifier".to_string(),
      TT::LiteralNumber => "number literal".to_string(),
      TT::LiteralRegex => "regular expression literal".to_string(),
      TT::LiteralString => "string literal".to_string(),
      TT::ReservedWord => "reserved word".to_string(),
      _ => format!("{:?}", self),
    }
  }
}

#[derive(Clone, Copy, Debug)]
pub struct Token {
  pub typ: TT,
  pub start: Pos,
  pub end: Pos,
  // Whether one or more whitespace characters appear immediately before this token, and at least one of those whitespace characters is a line terminator.
  pub preceded_by_line_terminator: bool,
}

impl Token {
  pub fn loc(&self) -> Loc {
    Loc(self.start.offset, self.end.offset)
  }

  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc().error(typ, self.start.line, Some(self.typ))
  }
}
