use super::node::Node;
use super::stmt::Stmt;
use crate::interner::Identifier;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// Analysis results for one function, computed when its scope is popped. A
/// compiler consuming the AST switches activation strategy on these without
/// re-walking the body.
#[derive(Copy, Clone, Default, Debug, Serialize)]
pub struct FuncFlags {
  /// The body contains a direct call to something named `eval`.
  pub uses_eval: bool,
  /// The body mentions `arguments` outside of a declaration.
  pub uses_arguments: bool,
  /// The body is governed by a `"use strict"` directive (its own or an
  /// enclosing one).
  pub is_strict: bool,
  /// Variables cannot live in registers: `eval`/`with`/`catch` in scope means
  /// every declared variable must be reachable by name at runtime.
  pub needs_full_activation: bool,
  /// Number of this function's own declarations referenced by inner functions.
  pub captured_variable_count: u32,
}

// This common type exists for better downstream usage, as one type is easier
// to match on and wrangle than both FuncDecl and FuncExpr.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Func {
  #[drive(skip)]
  pub flags: FuncFlags,
  pub parameters: Vec<Node<ParamDecl>>,
  pub body: FuncBody,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum FuncBody {
  Parsed(Vec<Node<Stmt>>),
  // The body was fast-skipped via a cache of a previous parse; `flags` still
  // holds the full analysis, and the node's loc covers the body in the source
  // for a later reparse.
  Skipped,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ParamDecl {
  #[drive(skip)]
  pub name: Identifier,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FuncName {
  #[drive(skip)]
  pub name: Identifier,
}
