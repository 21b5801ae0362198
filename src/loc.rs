use crate::error::ErrorKind;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A position within the source buffer: the 1-based line, the byte offset, and
/// the byte offset of the start of the line the position is on.
///
/// Invariant: `offset >= line_start`. Offsets are absolute UTF-8 byte offsets,
/// so positions remain meaningful for source embedded in a larger document
/// (e.g. an inline script parsed with a non-zero starting position).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Pos {
  pub line: u32,
  pub offset: usize,
  pub line_start: usize,
}

impl Pos {
  pub fn new(line: u32, offset: usize, line_start: usize) -> Pos {
    debug_assert!(offset >= line_start);
    Pos {
      line,
      offset,
      line_start,
    }
  }

  /// Zero-based column within the line, in bytes.
  pub fn column(&self) -> usize {
    self.offset - self.line_start
  }
}

impl Default for Pos {
  fn default() -> Self {
    Pos {
      line: 1,
      offset: 0,
      line_start: 0,
    }
  }
}

/// A half-open byte range within the source buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1 - self.0
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add_option(self, rhs: Option<Loc>) -> Loc {
    let mut new = self;
    if let Some(rhs) = rhs {
      new.extend(rhs);
    };
    new
  }

  pub fn error(self, typ: SyntaxErrorType, line: u32, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(ErrorKind::Syntax, typ, self, line, actual_token)
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}
