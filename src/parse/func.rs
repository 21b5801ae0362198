use super::Parser;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::func::FuncName;
use crate::ast::func::ParamDecl;
use crate::ast::expr::FuncExpr;
use crate::ast::node::Node;
use crate::ast::stmt::FuncDecl;
use crate::cache::ReparseCacheEntry;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::interner::Identifier;
use crate::loc::Loc;
use crate::token::TT;

// A restricted name (`eval`/`arguments`) seen where strict mode forbids a
// binding, before the function's own directive prologue has been parsed.
type NameViolation = Option<(SyntaxErrorType, Loc, u32)>;

impl<'a, 'b> Parser<'a, 'b> {
  /// Parses the parameter list, parentheses included. The enclosing function
  /// scope must already be pushed so the names land on it.
  pub fn func_params(&mut self) -> SyntaxResult<Vec<Node<ParamDecl>>> {
    self.require(TT::ParenthesisOpen)?;
    let mut parameters = Vec::new();
    if !self.consume_if(TT::ParenthesisClose).is_match() {
      loop {
        let t = self.require(TT::Identifier)?;
        let name = self.intern(t.loc());
        if name == Identifier::EVAL || name == Identifier::ARGUMENTS {
          if self.scopes.is_strict() {
            return Err(t.error(SyntaxErrorType::BindingNameRestricted));
          };
          self.scopes.record_strict_violation(
            SyntaxErrorType::BindingNameRestricted,
            t.loc(),
            t.start.line,
          );
        };
        if self.scopes.declare_parameter(name) {
          // Duplicates are legal in sloppy mode, but retroactively fatal if a
          // `"use strict"` directive follows.
          if self.scopes.is_strict() {
            return Err(t.error(SyntaxErrorType::DuplicateParameter));
          };
          self.scopes.record_strict_violation(
            SyntaxErrorType::DuplicateParameter,
            t.loc(),
            t.start.line,
          );
        };
        parameters.push(Node::new(t.loc(), ParamDecl { name }));
        if !self.consume_if(TT::Comma).is_match() {
          self.require(TT::ParenthesisClose)?;
          break;
        };
      }
    };
    Ok(parameters)
  }

  /// Parses `( params ) { body }`. When a reparse cache holds an entry for the
  /// body's opening brace, the body is skipped entirely: its cached analysis
  /// is replayed into the enclosing scopes and lexing resumes at the closing
  /// brace.
  pub fn func(&mut self, name_violation: NameViolation) -> SyntaxResult<Node<Func>> {
    self.with_loc(|p| {
      p.scopes.push_function();
      if let Some((typ, loc, line)) = name_violation {
        p.scopes.record_strict_violation(typ, loc, line);
      };
      let parameters = p.func_params()?;
      let open = p.require(TT::BraceOpen)?;

      let cached = p
        .cache
        .as_deref()
        .and_then(|c| c.get(open.start.offset))
        .map(|e| {
          (
            e.close_brace,
            e.flags,
            e.free_used.clone(),
            e.free_written.clone(),
          )
        });
      if let Some((close_brace, flags, free_used, free_written)) = cached {
        p.scopes.pop_function_discard();
        p.scopes.replay_function(&free_used, &free_written, flags.uses_eval);
        p.skip_to(close_brace);
        p.require(TT::BraceClose)?;
        return Ok(Func {
          flags,
          parameters,
          body: FuncBody::Skipped,
        });
      };

      let body = p.stmts_with_directives(TT::BraceClose)?;
      let close = p.require(TT::BraceClose)?;
      let analysis = p.scopes.pop_function();
      if let Some(cache) = p.cache.as_deref_mut() {
        cache.insert(open.start.offset, ReparseCacheEntry {
          close_brace: close.start,
          flags: analysis.flags,
          free_used: analysis.free_used,
          free_written: analysis.free_written,
        });
      };
      Ok(Func {
        flags: analysis.flags,
        parameters,
        body: FuncBody::Parsed(body),
      })
    })
  }

  pub fn func_decl(&mut self) -> SyntaxResult<Node<FuncDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFunction)?;
      let t = p.require(TT::Identifier)?;
      let name = p.intern(t.loc());
      let name_violation = p.check_binding_name(name, t.loc(), t.start.line)?;
      p.scopes.declare_variable(name);
      let fn_name = Node::new(t.loc(), FuncName { name });
      let function = p.func(name_violation)?;
      Ok(FuncDecl {
        name: fn_name,
        function,
      })
    })
  }

  /// The name of a function expression binds only inside the function, in a
  /// scope of its own so it cannot collide with surrounding declarations.
  pub fn func_expr(&mut self) -> SyntaxResult<Node<FuncExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordFunction)?;
      let t = p.peek();
      let name = if t.typ == TT::Identifier {
        p.consume();
        let name = p.intern(t.loc());
        Some((name, t))
      } else {
        None
      };
      let mut name_violation = None;
      if let Some((name, t)) = name {
        name_violation = p.check_binding_name(name, t.loc(), t.start.line)?;
        p.scopes.push_nested();
        p.scopes.declare_local(name);
      };
      let func = p.func(name_violation)?;
      if name.is_some() {
        p.scopes.pop_nested();
      };
      Ok(FuncExpr {
        name: name.map(|(name, t)| Node::new(t.loc(), FuncName { name })),
        func,
      })
    })
  }

  // Immediate error when already strict; otherwise a provisional violation for
  // the function's own scope to surface if its body turns out strict.
  fn check_binding_name(
    &mut self,
    name: Identifier,
    loc: Loc,
    line: u32,
  ) -> SyntaxResult<NameViolation> {
    if name != Identifier::EVAL && name != Identifier::ARGUMENTS {
      return Ok(None);
    };
    if self.scopes.is_strict() {
      return Err(loc.error(SyntaxErrorType::BindingNameRestricted, line, None));
    };
    Ok(Some((SyntaxErrorType::BindingNameRestricted, loc, line)))
  }
}
