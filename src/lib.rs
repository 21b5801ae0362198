use ast::func::FuncFlags;
use ast::node::Node;
use ast::stx::TopLevel;
use cache::ReparseCache;
use error::ErrorKind;
use error::SyntaxResult;
use interner::Interner;
use lex::Lexer;
use loc::Pos;
use parse::Parser;

pub mod ast;
pub mod cache;
pub mod char;
pub mod error;
pub mod interner;
pub mod lex;
pub mod loc;
pub mod num;
pub mod operator;
pub mod parse;
pub mod scope;
pub mod token;

pub struct ParseOptions<'c> {
  /// Position of the first byte of `source` within the enclosing document;
  /// defaults to line 1, offset 0.
  pub start: Pos,
  /// Cache of function body analyses from a previous parse of the same
  /// source, letting this parse skip those bodies.
  pub cache: Option<&'c mut ReparseCache>,
}

impl Default for ParseOptions<'_> {
  fn default() -> Self {
    ParseOptions {
      start: Pos::default(),
      cache: None,
    }
  }
}

#[derive(Debug)]
pub struct ParseOutput {
  pub top_level: Node<TopLevel>,
  /// Analysis of the program treated as a function body: strictness, `eval`
  /// taint, and captured-variable information for the top level.
  pub flags: FuncFlags,
  /// Start and end positions of the parsed range.
  pub span: (Pos, Pos),
}

pub fn parse(
  source: &str,
  interner: &mut Interner,
  options: ParseOptions<'_>,
) -> SyntaxResult<ParseOutput> {
  let start = options.start;
  let lexer = Lexer::new(source, start);
  let mut parser = Parser::new(lexer, start, interner, options.cache);
  let top_level = parser.top_level()?;
  let end = parser.end_pos();
  let analysis = parser.finish();
  Ok(ParseOutput {
    top_level,
    flags: analysis.flags,
    span: (start, end),
  })
}

/// Like [parse], but for the string argument of a direct `eval` call: syntax
/// errors are tagged [ErrorKind::Eval] so embedders can report them
/// distinctly. Stack overflows keep their own kind.
pub fn parse_eval(
  source: &str,
  interner: &mut Interner,
  options: ParseOptions<'_>,
) -> SyntaxResult<ParseOutput> {
  parse(source, interner, options).map_err(|err| {
    if err.kind == ErrorKind::Syntax {
      err.with_kind(ErrorKind::Eval)
    } else {
      err
    }
  })
}
