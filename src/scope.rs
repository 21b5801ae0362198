use crate::ast::func::FuncFlags;
use crate::error::SyntaxErrorType;
use crate::interner::Identifier;
use crate::loc::Loc;
use ahash::HashSet;
use ahash::HashSetExt;

/// A lexical scope tracked during parsing. Only constructs that actually
/// introduce names get a scope: functions (including the program itself),
/// `catch` clauses, and the self-binding of a named function expression.
/// Plain blocks do not, since `var` hoists past them.
struct Scope {
  // A function (or program) scope; `var` declarations land on the nearest one
  // of these, and closure tracking happens when one is popped.
  is_function_boundary: bool,
  strict: bool,
  uses_eval: bool,
  uses_with: bool,
  uses_catch: bool,
  uses_arguments: bool,
  declared: HashSet<Identifier>,
  used: HashSet<Identifier>,
  written: HashSet<Identifier>,
  // Names referenced by a function nested somewhere below this scope.
  closed_over: HashSet<Identifier>,
  // Labels in scope for statements inside this function, innermost last.
  labels: Vec<(Identifier, bool)>,
  loop_depth: u32,
  switch_depth: u32,
  // First would-be strict-mode violation seen before the directive prologue
  // settled; surfaced retroactively if a `"use strict"` directive follows.
  strict_violation: Option<(SyntaxErrorType, Loc, u32)>,
}

impl Scope {
  fn new(is_function_boundary: bool, strict: bool) -> Scope {
    Scope {
      is_function_boundary,
      strict,
      uses_eval: false,
      uses_with: false,
      uses_catch: false,
      uses_arguments: false,
      declared: HashSet::new(),
      used: HashSet::new(),
      written: HashSet::new(),
      closed_over: HashSet::new(),
      labels: Vec::new(),
      loop_depth: 0,
      switch_depth: 0,
      strict_violation: None,
    }
  }
}

/// Result of popping a function scope. `free_used`/`free_written` are the
/// names referenced but not declared by the function, sorted; a cache of this
/// analysis replays them so that skipping a body folds into the enclosing
/// scopes identically to parsing it.
pub struct FuncAnalysis {
  pub flags: FuncFlags,
  pub captured: Vec<Identifier>,
  pub free_used: Vec<Identifier>,
  pub free_written: Vec<Identifier>,
}

pub struct ScopeStack {
  scopes: Vec<Scope>,
}

impl ScopeStack {
  /// Creates the stack with the program scope already pushed. The program
  /// scope is a function boundary: top-level `var` declarations land on it.
  pub fn new() -> ScopeStack {
    ScopeStack {
      scopes: vec![Scope::new(true, false)],
    }
  }

  fn top(&mut self) -> &mut Scope {
    self.scopes.last_mut().unwrap()
  }

  fn function_scope_index(&self) -> usize {
    self
      .scopes
      .iter()
      .rposition(|s| s.is_function_boundary)
      .unwrap()
  }

  fn function_scope(&mut self) -> &mut Scope {
    let i = self.function_scope_index();
    &mut self.scopes[i]
  }

  /// Whether any scope other than the program scope is a function boundary.
  pub fn in_function(&self) -> bool {
    self.scopes[1..].iter().any(|s| s.is_function_boundary)
  }

  pub fn push_function(&mut self) {
    let strict = self.scopes.last().unwrap().strict;
    self.scopes.push(Scope::new(true, strict));
  }

  /// Pushes a non-boundary scope: a `catch` clause or the self-binding of a
  /// named function expression.
  pub fn push_nested(&mut self) {
    let strict = self.scopes.last().unwrap().strict;
    self.scopes.push(Scope::new(false, strict));
  }

  /// Pops a non-boundary scope, folding its free names into the parent.
  pub fn pop_nested(&mut self) {
    let scope = self.scopes.pop().unwrap();
    debug_assert!(!scope.is_function_boundary);
    let parent = self.top();
    for &name in scope.used.difference(&scope.declared) {
      parent.used.insert(name);
    }
    for &name in scope.written.difference(&scope.declared) {
      parent.written.insert(name);
    }
    for &name in scope.closed_over.difference(&scope.declared) {
      parent.closed_over.insert(name);
    }
    parent.uses_eval |= scope.uses_eval;
  }

  /// Pops a function scope, computing its analysis and folding its free names
  /// into the parent as closed-over uses.
  pub fn pop_function(&mut self) -> FuncAnalysis {
    let scope = self.scopes.pop().unwrap();
    debug_assert!(scope.is_function_boundary);

    let mut free_used: Vec<Identifier> = scope.used.difference(&scope.declared).copied().collect();
    let mut free_written: Vec<Identifier> =
      scope.written.difference(&scope.declared).copied().collect();
    free_used.sort_unstable();
    free_written.sort_unstable();

    let needs_full_activation = scope.uses_eval || scope.uses_with || scope.uses_catch;
    let mut captured: Vec<Identifier> = if needs_full_activation {
      // Every declaration must stay reachable by name at runtime.
      scope.declared.iter().copied().collect()
    } else {
      scope
        .declared
        .intersection(&scope.closed_over)
        .copied()
        .collect()
    };
    captured.sort_unstable();

    // The program scope has no parent to fold into.
    if let Some(parent) = self.scopes.last_mut() {
      for &name in &free_used {
        parent.used.insert(name);
        parent.closed_over.insert(name);
      }
      for &name in &free_written {
        parent.written.insert(name);
        parent.closed_over.insert(name);
      }
      for &name in scope.closed_over.difference(&scope.declared) {
        parent.closed_over.insert(name);
      }
      // An eval anywhere below keeps enclosing activations alive too.
      parent.uses_eval |= scope.uses_eval;
    };

    FuncAnalysis {
      flags: FuncFlags {
        uses_eval: scope.uses_eval,
        uses_arguments: scope.uses_arguments,
        is_strict: scope.strict,
        needs_full_activation,
        captured_variable_count: captured.len() as u32,
      },
      captured,
      free_used,
      free_written,
    }
  }

  /// Discards a function scope without analysis. Used when a cached analysis
  /// will be replayed instead.
  pub fn pop_function_discard(&mut self) {
    let scope = self.scopes.pop().unwrap();
    debug_assert!(scope.is_function_boundary);
  }

  /// Folds a cached function analysis into the current scope, exactly as
  /// popping the freshly parsed function would have.
  pub fn replay_function(
    &mut self,
    free_used: &[Identifier],
    free_written: &[Identifier],
    uses_eval: bool,
  ) {
    let scope = self.top();
    for &name in free_used {
      scope.used.insert(name);
      scope.closed_over.insert(name);
    }
    for &name in free_written {
      scope.written.insert(name);
      scope.closed_over.insert(name);
    }
    if uses_eval {
      self.function_scope().uses_eval = true;
    };
  }

  pub fn is_strict(&self) -> bool {
    self.scopes.last().unwrap().strict
  }

  /// Marks the current function strict after its directive prologue, and
  /// surfaces any provisional violation recorded before the directive.
  pub fn set_strict(&mut self) -> Option<(SyntaxErrorType, Loc, u32)> {
    let scope = self.function_scope();
    scope.strict = true;
    scope.strict_violation.take()
  }

  /// Records a construct that is illegal under strict mode but seen before the
  /// directive prologue settled. Only the first one is kept.
  pub fn record_strict_violation(&mut self, typ: SyntaxErrorType, loc: Loc, line: u32) {
    let scope = self.function_scope();
    if scope.strict_violation.is_none() {
      scope.strict_violation = Some((typ, loc, line));
    };
  }

  /// Declares a `var` or hoisted function name on the nearest function scope.
  pub fn declare_variable(&mut self, name: Identifier) {
    self.function_scope().declared.insert(name);
  }

  /// Declares a parameter. Returns true if the name duplicates an earlier
  /// parameter of the same function.
  pub fn declare_parameter(&mut self, name: Identifier) -> bool {
    !self.function_scope().declared.insert(name)
  }

  /// Declares on the current (non-boundary) scope: a catch parameter or the
  /// self-binding of a named function expression.
  pub fn declare_local(&mut self, name: Identifier) {
    self.top().declared.insert(name);
  }

  pub fn use_variable(&mut self, name: Identifier) {
    self.top().used.insert(name);
    if name == Identifier::EVAL {
      self.function_scope().uses_eval = true;
    };
    if name == Identifier::ARGUMENTS {
      self.function_scope().uses_arguments = true;
    };
  }

  pub fn write_variable(&mut self, name: Identifier) {
    self.top().written.insert(name);
  }

  pub fn mark_uses_with(&mut self) {
    self.function_scope().uses_with = true;
  }

  pub fn mark_uses_catch(&mut self) {
    self.function_scope().uses_catch = true;
  }

  // Control-flow context. Loops, switches, and labels are scoped to the
  // current function; `break`/`continue` never cross a function boundary.

  pub fn enter_loop(&mut self) {
    self.function_scope().loop_depth += 1;
  }

  pub fn exit_loop(&mut self) {
    self.function_scope().loop_depth -= 1;
  }

  pub fn enter_switch(&mut self) {
    self.function_scope().switch_depth += 1;
  }

  pub fn exit_switch(&mut self) {
    self.function_scope().switch_depth -= 1;
  }

  pub fn in_loop(&mut self) -> bool {
    self.function_scope().loop_depth > 0
  }

  pub fn in_loop_or_switch(&mut self) -> bool {
    let scope = self.function_scope();
    scope.loop_depth > 0 || scope.switch_depth > 0
  }

  /// Returns false if the label is already in scope within this function.
  pub fn push_label(&mut self, name: Identifier, is_loop: bool) -> bool {
    let scope = self.function_scope();
    if scope.labels.iter().any(|&(l, _)| l == name) {
      return false;
    };
    scope.labels.push((name, is_loop));
    true
  }

  pub fn pop_label(&mut self) {
    self.function_scope().labels.pop().unwrap();
  }

  /// Looks up a label; returns whether it annotates a loop.
  pub fn find_label(&mut self, name: Identifier) -> Option<bool> {
    self
      .function_scope()
      .labels
      .iter()
      .rev()
      .find(|&&(l, _)| l == name)
      .map(|&(_, is_loop)| is_loop)
  }
}

impl Default for ScopeStack {
  fn default() -> Self {
    ScopeStack::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::interner::Interner;

  #[test]
  fn test_captured_variables() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");
    let g = interner.intern("g");

    // function f() { var x, y; function g() { return x; } }
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.declare_variable(x);
    scopes.declare_variable(y);
    scopes.declare_variable(g);
    scopes.push_function();
    scopes.use_variable(x);
    let inner = scopes.pop_function();
    assert_eq!(inner.flags.captured_variable_count, 0);
    assert_eq!(inner.free_used, vec![x]);
    let outer = scopes.pop_function();
    assert_eq!(outer.captured, vec![x]);
    assert_eq!(outer.flags.captured_variable_count, 1);
    assert!(outer.free_used.is_empty());
  }

  #[test]
  fn test_capture_skips_intermediate_function() {
    let mut interner = Interner::new();
    let x = interner.intern("x");

    // function a() { var x; function b() { function c() { x } } }
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.declare_variable(x);
    scopes.push_function();
    scopes.push_function();
    scopes.use_variable(x);
    scopes.pop_function();
    let b = scopes.pop_function();
    // `b` neither declares nor captures x, but still passes it through.
    assert_eq!(b.flags.captured_variable_count, 0);
    assert_eq!(b.free_used, vec![x]);
    let a = scopes.pop_function();
    assert_eq!(a.captured, vec![x]);
  }

  #[test]
  fn test_eval_forces_full_activation() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.declare_variable(x);
    scopes.declare_variable(y);
    scopes.use_variable(Identifier::EVAL);
    let f = scopes.pop_function();
    assert!(f.flags.uses_eval);
    assert!(f.flags.needs_full_activation);
    // Nothing is closed over, yet everything is captured.
    assert_eq!(f.flags.captured_variable_count, 2);
  }

  #[test]
  fn test_eval_taints_enclosing_functions() {
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.push_function();
    scopes.use_variable(Identifier::EVAL);
    scopes.pop_function();
    let outer = scopes.pop_function();
    assert!(outer.flags.uses_eval);
    assert!(outer.flags.needs_full_activation);
  }

  #[test]
  fn test_catch_scope_shadows() {
    let mut interner = Interner::new();
    let e = interner.intern("e");

    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.mark_uses_catch();
    scopes.push_nested();
    scopes.declare_local(e);
    scopes.use_variable(e);
    scopes.pop_nested();
    let f = scopes.pop_function();
    // The use of `e` resolved inside the catch scope; it is not free.
    assert!(f.free_used.is_empty());
    assert!(f.flags.needs_full_activation);
  }

  #[test]
  fn test_named_function_expression_binding() {
    let mut interner = Interner::new();
    let f = interner.intern("f");

    // (function f() { f(); })
    let mut scopes = ScopeStack::new();
    scopes.push_nested();
    scopes.declare_local(f);
    scopes.push_function();
    scopes.use_variable(f);
    let inner = scopes.pop_function();
    assert_eq!(inner.free_used, vec![f]);
    scopes.pop_nested();
    // The reference resolved to the self-binding; nothing leaks to the program.
    let program = scopes.pop_function();
    assert!(program.free_used.is_empty());
  }

  #[test]
  fn test_strict_violation_is_provisional() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let mut scopes = ScopeStack::new();
    scopes.push_function();
    scopes.record_strict_violation(SyntaxErrorType::DuplicateParameter, Loc(5, 6), 1);
    // Without a directive the violation is dropped.
    let _ = scopes.declare_parameter(x);
    assert!(scopes.pop_function().flags.is_strict == false);

    scopes.push_function();
    scopes.record_strict_violation(SyntaxErrorType::DuplicateParameter, Loc(5, 6), 1);
    let violation = scopes.set_strict();
    assert_eq!(
      violation,
      Some((SyntaxErrorType::DuplicateParameter, Loc(5, 6), 1))
    );
    assert!(scopes.pop_function().flags.is_strict);
  }

  #[test]
  fn test_strictness_inherited() {
    let mut scopes = ScopeStack::new();
    scopes.set_strict();
    scopes.push_function();
    assert!(scopes.is_strict());
    assert!(scopes.pop_function().flags.is_strict);
  }

  #[test]
  fn test_labels() {
    let mut interner = Interner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");

    let mut scopes = ScopeStack::new();
    assert!(scopes.push_label(a, true));
    assert!(!scopes.push_label(a, false), "redeclared");
    assert!(scopes.push_label(b, false));
    assert_eq!(scopes.find_label(a), Some(true));
    assert_eq!(scopes.find_label(b), Some(false));
    // Labels are not visible across function boundaries.
    scopes.push_function();
    assert_eq!(scopes.find_label(a), None);
    scopes.pop_function();
    scopes.pop_label();
    scopes.pop_label();
  }

  #[test]
  fn test_loop_depth_per_function() {
    let mut scopes = ScopeStack::new();
    scopes.enter_loop();
    assert!(scopes.in_loop());
    scopes.push_function();
    assert!(!scopes.in_loop());
    scopes.pop_function();
    scopes.exit_loop();
    assert!(!scopes.in_loop());
  }
}
