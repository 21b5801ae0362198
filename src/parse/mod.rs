use crate::cache::ReparseCache;
use crate::error::ErrorKind;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::interner::Identifier;
use crate::interner::Interner;
use crate::lex::lex_expect_identifier;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::loc::Pos;
use crate::scope::FuncAnalysis;
use crate::scope::ScopeStack;
use crate::token::Token;
use crate::token::TT;

pub mod drive;
pub mod expr;
pub mod func;
pub mod lit;
pub mod operator;
pub mod stmt;
#[cfg(test)]
mod tests;
pub mod toplevel;

// Nesting this deep trips the guard before the native call stack does.
const RECURSION_LIMIT: u32 = 512;

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  typ: TT,
  loc: Loc,
  line: u32,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, self.line, Some(self.typ))
  }

  pub fn and_then<R, F: FnOnce() -> SyntaxResult<R>>(self, f: F) -> SyntaxResult<Option<R>> {
    Ok(if self.matched { Some(f()?) } else { None })
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

struct BufferedToken {
  token: Token,
  lex_mode: LexMode,
}

pub struct Parser<'a, 'b> {
  lexer: Lexer<'a>,
  start: Pos,
  buf: Vec<BufferedToken>,
  next_tok_i: usize,
  scopes: ScopeStack,
  interner: &'b mut Interner,
  cache: Option<&'b mut ReparseCache>,
  depth: u32,
}

// We extend this struct with added methods in the various submodules, instead
// of free functions passing `&mut Parser` around: more lifetime elision is
// available for `self`, no function imports needed, and if there's no reason
// for something to be a free function it should be a method.
impl<'a, 'b> Parser<'a, 'b> {
  pub fn new(
    lexer: Lexer<'a>,
    start: Pos,
    interner: &'b mut Interner,
    cache: Option<&'b mut ReparseCache>,
  ) -> Parser<'a, 'b> {
    Parser {
      lexer,
      start,
      buf: Vec::new(),
      next_tok_i: 0,
      scopes: ScopeStack::new(),
      interner,
      cache,
      depth: 0,
    }
  }

  pub fn str(&self, loc: Loc) -> &str {
    &self.lexer[loc]
  }

  pub fn intern(&mut self, loc: Loc) -> Identifier {
    self.interner.intern(&self.lexer[loc])
  }

  /// Pops the program scope. Call once, after the top level has been parsed.
  pub fn finish(&mut self) -> FuncAnalysis {
    self.scopes.pop_function()
  }

  pub fn end_pos(&self) -> Pos {
    self.lexer.pos()
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  pub fn since_checkpoint(&self, checkpoint: &ParserCheckpoint) -> Loc {
    let i = checkpoint.next_tok_i;
    if self.next_tok_i == i {
      // Nothing was consumed.
      let at = match self.buf.get(i) {
        Some(t) => t.token.start.offset,
        None => self.lexer.pos().offset,
      };
      return Loc(at, at);
    };
    Loc(
      self.buf[i].token.start.offset,
      self.buf[self.next_tok_i - 1].token.end.offset,
    )
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  fn reset_to(&mut self, n: usize) {
    self.next_tok_i = n;
    self.buf.truncate(n);
    match self.buf.last() {
      Some(t) => self.lexer.set_position(t.token.end),
      None => self.lexer.set_position(self.start),
    };
  }

  /// Repositions the parser at an arbitrary previously seen position,
  /// discarding any buffered lookahead past it. Used to fast-skip a function
  /// body known from a previous parse.
  pub fn skip_to(&mut self, pos: Pos) {
    self.buf.truncate(self.next_tok_i);
    self.lexer.set_position(pos);
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, mode: LexMode, keep: K) -> (bool, Token) {
    if self
      .buf
      .get(self.next_tok_i)
      .is_some_and(|t| t.lex_mode != mode)
    {
      // The buffered lookahead was lexed under a different mode; re-lex.
      self.reset_to(self.next_tok_i);
    };
    if self.buf.len() <= self.next_tok_i {
      debug_assert_eq!(self.buf.len(), self.next_tok_i);
      let token = lex_next(&mut self.lexer, mode);
      self.buf.push(BufferedToken {
        token,
        lex_mode: mode,
      });
    };
    let t = self.buf[self.next_tok_i].token;
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| true).1
  }

  pub fn consume(&mut self) -> Token {
    self.consume_with_mode(LexMode::Standard)
  }

  pub fn peek_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| false).1
  }

  pub fn peek(&mut self) -> Token {
    self.peek_with_mode(LexMode::Standard)
  }

  pub fn peek_n_with_mode<const N: usize>(&mut self, modes: [LexMode; N]) -> [Token; N] {
    let cp = self.checkpoint();
    let tokens = modes.map(|mode| self.forward(mode, |_| true).1);
    self.restore_checkpoint(cp);
    tokens
  }

  pub fn peek_n<const N: usize>(&mut self) -> [Token; N] {
    self.peek_n_with_mode([LexMode::Standard; N])
  }

  pub fn maybe_consume_with_mode(&mut self, typ: TT, mode: LexMode) -> MaybeToken {
    let (matched, t) = self.forward(mode, |t| t.typ == typ);
    MaybeToken {
      typ,
      matched,
      loc: t.loc(),
      line: t.start.line,
    }
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    self.maybe_consume_with_mode(typ, LexMode::Standard)
  }

  /// Builds the error for an unusable token. An `Invalid` token surfaces the
  /// lexer's recorded error instead of a generic one; EOF reports an
  /// unexpected end (recoverable for REPL callers).
  pub fn error_at(&self, t: Token, typ: SyntaxErrorType) -> SyntaxError {
    if t.typ == TT::Invalid {
      if let Some(err) = self.lexer.error() {
        return err.clone();
      };
    };
    if t.typ == TT::EOF {
      return t.error(SyntaxErrorType::UnexpectedEnd);
    };
    t.error(typ)
  }

  pub fn require_with_mode(&mut self, typ: TT, mode: LexMode) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(mode);
    if t.typ != typ {
      Err(self.error_at(t, SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    self.require_with_mode(typ, LexMode::Standard)
  }

  /// Consumes a property name after `.`, using the lexer's restricted fast
  /// path when no lookahead is buffered. Keywords and reserved words are
  /// valid property names.
  pub fn require_property_name(&mut self) -> SyntaxResult<(Identifier, Loc)> {
    if self.buf.len() <= self.next_tok_i {
      let token = lex_expect_identifier(&mut self.lexer);
      self.buf.push(BufferedToken {
        token,
        lex_mode: LexMode::Standard,
      });
    };
    let t = self.buf[self.next_tok_i].token;
    if !is_identifier_like(t.typ) {
      return Err(self.error_at(t, SyntaxErrorType::ExpectedSyntax("property name")));
    };
    self.next_tok_i += 1;
    Ok((self.intern(t.loc()), t.loc()))
  }

  // Recursion guard for the mutually recursive expression/statement grammar.
  // Callers must pair enter/exit; an error propagating out skips the exit,
  // which is fine since the parse aborts.

  pub fn enter_recursion(&mut self) -> SyntaxResult<()> {
    self.depth += 1;
    if self.depth > RECURSION_LIMIT {
      let t = self.peek();
      return Err(
        SyntaxError::new(
          ErrorKind::StackOverflow,
          SyntaxErrorType::UnexpectedToken,
          t.loc(),
          t.start.line,
          Some(t.typ),
        ),
      );
    };
    Ok(())
  }

  pub fn exit_recursion(&mut self) {
    self.depth -= 1;
  }
}

/// Whether a token can serve as a property name or object literal key:
/// identifiers, keywords, keyword-like literals, and reserved words.
pub fn is_identifier_like(typ: TT) -> bool {
  typ == TT::Identifier
    || typ == TT::ReservedWord
    || crate::lex::KEYWORDS_MAPPING.contains_key(&typ)
}
