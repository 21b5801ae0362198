use super::expr::Asi;
use super::Parser;
use crate::ast::expr::Expr;
use crate::ast::node::Node;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::BreakStmt;
use crate::ast::stmt::CatchBlock;
use crate::ast::stmt::ContinueStmt;
use crate::ast::stmt::DebuggerStmt;
use crate::ast::stmt::DoWhileStmt;
use crate::ast::stmt::EmptyStmt;
use crate::ast::stmt::ExprStmt;
use crate::ast::stmt::ForBody;
use crate::ast::stmt::ForInLhs;
use crate::ast::stmt::ForInStmt;
use crate::ast::stmt::ForTripleStmt;
use crate::ast::stmt::ForTripleStmtInit;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::LabelStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::SwitchBranch;
use crate::ast::stmt::SwitchStmt;
use crate::ast::stmt::ThrowStmt;
use crate::ast::stmt::TryStmt;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclarator;
use crate::ast::stmt::WhileStmt;
use crate::ast::stmt::WithStmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::interner::Identifier;
use crate::loc::Loc;
use crate::token::TT;

#[derive(Copy, Clone, Eq, PartialEq)]
pub enum VarDeclParseMode {
  // Standalone statement; the declaration list ends at a semicolon, possibly
  // inserted automatically.
  Asi,
  // Leftmost part of a `for` header; stops at `in` or `;` for the caller to
  // inspect, and never involves ASI.
  Leftmost,
}

impl<'a, 'b> Parser<'a, 'b> {
  pub fn stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    self.enter_recursion()?;
    let res = self.stmt_inner();
    self.exit_recursion();
    res
  }

  fn stmt_inner(&mut self) -> SyntaxResult<Node<Stmt>> {
    let [t0, t1] = self.peek_n::<2>();
    Ok(match t0.typ {
      TT::BraceOpen => self.block_stmt()?.into_wrapped(),
      TT::KeywordBreak => self.break_stmt()?.into_wrapped(),
      TT::KeywordContinue => self.continue_stmt()?.into_wrapped(),
      TT::KeywordDebugger => self.debugger_stmt()?.into_wrapped(),
      TT::KeywordDo => self.do_while_stmt()?.into_wrapped(),
      TT::KeywordFor => self.for_stmt()?,
      TT::KeywordFunction => self.func_decl()?.into_wrapped(),
      TT::KeywordIf => self.if_stmt()?.into_wrapped(),
      TT::KeywordReturn => self.return_stmt()?.into_wrapped(),
      TT::KeywordSwitch => self.switch_stmt()?.into_wrapped(),
      TT::KeywordThrow => self.throw_stmt()?.into_wrapped(),
      TT::KeywordTry => self.try_stmt()?.into_wrapped(),
      TT::KeywordVar => {
        let decl = self.var_decl(VarDeclParseMode::Asi)?;
        self.require_semicolon()?;
        decl.into_wrapped()
      }
      TT::KeywordWhile => self.while_stmt()?.into_wrapped(),
      TT::KeywordWith => self.with_stmt()?.into_wrapped(),
      TT::Semicolon => self.empty_stmt()?.into_wrapped(),
      TT::Identifier if t1.typ == TT::Colon => self.label_stmt()?,
      _ => self.expr_stmt()?.into_wrapped(),
    })
  }

  /// Consumes a `;`, or accepts its automatic insertion before a line
  /// terminator, a `}`, or the end of the source.
  fn require_semicolon(&mut self) -> SyntaxResult<()> {
    let t = self.peek();
    if t.typ == TT::Semicolon {
      self.consume();
      return Ok(());
    };
    if t.preceded_by_line_terminator || t.typ == TT::BraceClose || t.typ == TT::EOF {
      return Ok(());
    };
    Err(self.error_at(t, SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon)))
  }

  pub fn block_stmt(&mut self) -> SyntaxResult<Node<BlockStmt>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let body = p.repeat_until_tt(TT::BraceClose, |p| p.stmt())?;
      p.require(TT::BraceClose)?;
      Ok(BlockStmt { body })
    })
  }

  fn empty_stmt(&mut self) -> SyntaxResult<Node<EmptyStmt>> {
    self.with_loc(|p| {
      p.require(TT::Semicolon)?;
      Ok(EmptyStmt {})
    })
  }

  fn debugger_stmt(&mut self) -> SyntaxResult<Node<DebuggerStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordDebugger)?;
      p.require_semicolon()?;
      Ok(DebuggerStmt {})
    })
  }

  fn expr_stmt(&mut self) -> SyntaxResult<Node<ExprStmt>> {
    self.with_loc(|p| {
      let mut asi = Asi::can();
      let expr = p.expr_with_asi([TT::Semicolon], &mut asi)?;
      if !asi.did_end_with_asi {
        p.require_semicolon()?;
      };
      Ok(ExprStmt { expr })
    })
  }

  // Restricted production: a label must be on the same line as the `break`.
  fn break_stmt(&mut self) -> SyntaxResult<Node<BreakStmt>> {
    self.with_loc(|p| {
      let t = p.require(TT::KeywordBreak)?;
      let next = p.peek();
      let label = if next.typ == TT::Identifier && !next.preceded_by_line_terminator {
        p.consume();
        let name = p.intern(next.loc());
        if p.scopes.find_label(name).is_none() {
          return Err(next.error(SyntaxErrorType::LabelNotFound));
        };
        Some(name)
      } else {
        None
      };
      if label.is_none() && !p.scopes.in_loop_or_switch() {
        return Err(t.error(SyntaxErrorType::BreakOutsideLoopOrSwitch));
      };
      p.require_semicolon()?;
      Ok(BreakStmt { label })
    })
  }

  fn continue_stmt(&mut self) -> SyntaxResult<Node<ContinueStmt>> {
    self.with_loc(|p| {
      let t = p.require(TT::KeywordContinue)?;
      let next = p.peek();
      let label = if next.typ == TT::Identifier && !next.preceded_by_line_terminator {
        p.consume();
        let name = p.intern(next.loc());
        match p.scopes.find_label(name) {
          None => return Err(next.error(SyntaxErrorType::LabelNotFound)),
          Some(false) => return Err(next.error(SyntaxErrorType::ContinueLabelNotALoop)),
          Some(true) => {}
        };
        Some(name)
      } else {
        None
      };
      if label.is_none() && !p.scopes.in_loop() {
        return Err(t.error(SyntaxErrorType::ContinueOutsideLoop));
      };
      p.require_semicolon()?;
      Ok(ContinueStmt { label })
    })
  }

  // Restricted production: `return <newline> x` returns undefined.
  fn return_stmt(&mut self) -> SyntaxResult<Node<ReturnStmt>> {
    self.with_loc(|p| {
      let t = p.require(TT::KeywordReturn)?;
      if !p.scopes.in_function() {
        return Err(t.error(SyntaxErrorType::ReturnOutsideFunction));
      };
      let next = p.peek();
      let value = if next.preceded_by_line_terminator
        || matches!(next.typ, TT::Semicolon | TT::BraceClose | TT::EOF)
      {
        None
      } else {
        let mut asi = Asi::can();
        let value = p.expr_with_asi([TT::Semicolon], &mut asi)?;
        Some(value)
      };
      p.require_semicolon()?;
      Ok(ReturnStmt { value })
    })
  }

  // Restricted production: no line terminator is allowed after `throw`.
  fn throw_stmt(&mut self) -> SyntaxResult<Node<ThrowStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordThrow)?;
      let next = p.peek();
      if next.preceded_by_line_terminator {
        return Err(next.error(SyntaxErrorType::LineTerminatorAfterThrow));
      };
      let mut asi = Asi::can();
      let value = p.expr_with_asi([TT::Semicolon], &mut asi)?;
      p.require_semicolon()?;
      Ok(ThrowStmt { value })
    })
  }

  fn if_stmt(&mut self) -> SyntaxResult<Node<IfStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordIf)?;
      p.require(TT::ParenthesisOpen)?;
      let test = p.expr([TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let consequent = p.stmt()?;
      let alternate = p
        .consume_if(TT::KeywordElse)
        .and_then(|| p.stmt())?;
      Ok(IfStmt {
        test,
        consequent,
        alternate,
      })
    })
  }

  fn while_stmt(&mut self) -> SyntaxResult<Node<WhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordWhile)?;
      p.require(TT::ParenthesisOpen)?;
      let condition = p.expr([TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      p.scopes.enter_loop();
      let body = p.stmt()?;
      p.scopes.exit_loop();
      Ok(WhileStmt { condition, body })
    })
  }

  fn do_while_stmt(&mut self) -> SyntaxResult<Node<DoWhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordDo)?;
      p.scopes.enter_loop();
      let body = p.stmt()?;
      p.scopes.exit_loop();
      p.require(TT::KeywordWhile)?;
      p.require(TT::ParenthesisOpen)?;
      let condition = p.expr([TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      // The semicolon after `do..while (c)` is always insertable.
      let _ = p.consume_if(TT::Semicolon);
      Ok(DoWhileStmt { condition, body })
    })
  }

  fn with_stmt(&mut self) -> SyntaxResult<Node<WithStmt>> {
    self.with_loc(|p| {
      let t = p.require(TT::KeywordWith)?;
      if p.scopes.is_strict() {
        return Err(t.error(SyntaxErrorType::WithInStrictMode));
      };
      p.scopes.mark_uses_with();
      p.require(TT::ParenthesisOpen)?;
      let object = p.expr([TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let body = p.stmt()?;
      Ok(WithStmt { object, body })
    })
  }

  fn switch_stmt(&mut self) -> SyntaxResult<Node<SwitchStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordSwitch)?;
      p.require(TT::ParenthesisOpen)?;
      let test = p.expr([TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      p.require(TT::BraceOpen)?;
      p.scopes.enter_switch();
      let mut branches = Vec::new();
      let mut seen_default = false;
      while p.peek().typ != TT::BraceClose {
        let branch = p.with_loc(|p| {
          let t = p.consume();
          let case = match t.typ {
            TT::KeywordCase => Some(p.expr([TT::Colon])?),
            TT::KeywordDefault => {
              // At most one `default` clause.
              if seen_default {
                return Err(t.error(SyntaxErrorType::UnexpectedToken));
              };
              seen_default = true;
              None
            }
            _ => {
              return Err(p.error_at(t, SyntaxErrorType::ExpectedSyntax("`case` or `default` clause")))
            }
          };
          p.require(TT::Colon)?;
          let body = p.repeat_while(
            |p| {
              !matches!(
                p.peek().typ,
                TT::KeywordCase | TT::KeywordDefault | TT::BraceClose
              )
            },
            |p| p.stmt(),
          )?;
          Ok(SwitchBranch { case, body })
        })?;
        branches.push(branch);
      }
      p.scopes.exit_switch();
      p.require(TT::BraceClose)?;
      Ok(SwitchStmt { test, branches })
    })
  }

  fn try_stmt(&mut self) -> SyntaxResult<Node<TryStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordTry)?;
      let wrapped = p.block_stmt()?;
      let catch = if p.peek().typ == TT::KeywordCatch {
        Some(p.catch_block()?)
      } else {
        None
      };
      let finally = p
        .consume_if(TT::KeywordFinally)
        .and_then(|| p.block_stmt())?;
      if catch.is_none() && finally.is_none() {
        return Err(start.error(SyntaxErrorType::TryStatementHasNoCatchOrFinally));
      };
      Ok(TryStmt {
        wrapped,
        catch,
        finally,
      })
    })
  }

  // The catch parameter shadows outer declarations, so the parameter and body
  // live in their own nested scope.
  fn catch_block(&mut self) -> SyntaxResult<Node<CatchBlock>> {
    self.with_loc(|p| {
      p.require(TT::KeywordCatch)?;
      p.scopes.mark_uses_catch();
      p.require(TT::ParenthesisOpen)?;
      let t = p.require(TT::Identifier)?;
      let parameter = p.intern(t.loc());
      if p.scopes.is_strict()
        && (parameter == Identifier::EVAL || parameter == Identifier::ARGUMENTS)
      {
        return Err(t.error(SyntaxErrorType::BindingNameRestricted));
      };
      p.require(TT::ParenthesisClose)?;
      p.scopes.push_nested();
      p.scopes.declare_local(parameter);
      p.require(TT::BraceOpen)?;
      let body = p.repeat_until_tt(TT::BraceClose, |p| p.stmt())?;
      p.require(TT::BraceClose)?;
      p.scopes.pop_nested();
      Ok(CatchBlock { parameter, body })
    })
  }

  pub fn var_decl(&mut self, mode: VarDeclParseMode) -> SyntaxResult<Node<VarDecl>> {
    self.with_loc(|p| {
      p.require(TT::KeywordVar)?;
      let mut declarators = Vec::new();
      loop {
        let t = p.require(TT::Identifier)?;
        let name = p.intern(t.loc());
        if name == Identifier::EVAL || name == Identifier::ARGUMENTS {
          if p.scopes.is_strict() {
            return Err(t.error(SyntaxErrorType::BindingNameRestricted));
          };
          p.scopes.record_strict_violation(
            SyntaxErrorType::BindingNameRestricted,
            t.loc(),
            t.start.line,
          );
        };
        p.scopes.declare_variable(name);
        let mut ended_with_asi = false;
        let initializer = if p.consume_if(TT::Equals).is_match() {
          p.scopes.write_variable(name);
          Some(match mode {
            VarDeclParseMode::Asi => {
              let mut asi = Asi::can();
              let value = p.expr_with_asi([TT::Semicolon, TT::Comma], &mut asi)?;
              ended_with_asi = asi.did_end_with_asi;
              value
            }
            VarDeclParseMode::Leftmost => {
              p.expr([TT::KeywordIn, TT::Semicolon, TT::Comma])?
            }
          })
        } else {
          None
        };
        declarators.push(VarDeclarator { name, initializer });
        if ended_with_asi || !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      Ok(VarDecl { declarators })
    })
  }

  fn for_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let cp = self.checkpoint();
    self.require(TT::KeywordFor)?;
    self.require(TT::ParenthesisOpen)?;
    match self.peek().typ {
      TT::Semicolon => {
        self.consume();
        self.for_triple_tail(cp, ForTripleStmtInit::None)
      }
      TT::KeywordVar => {
        let decl = self.var_decl(VarDeclParseMode::Leftmost)?;
        let t = self.peek();
        if self.consume_if(TT::KeywordIn).is_match() {
          // `for (var a in b)`; the legacy initializer form `var a = x in b`
          // is allowed, but only a single declarator is.
          if decl.stx.declarators.len() != 1 {
            return Err(self.error_at(t, SyntaxErrorType::UnexpectedToken));
          };
          self.for_in_tail(cp, ForInLhs::Decl(decl))
        } else {
          self.require(TT::Semicolon)?;
          self.for_triple_tail(cp, ForTripleStmtInit::Decl(decl))
        }
      }
      _ => {
        let t0 = self.peek();
        let expr = self.expr([TT::KeywordIn, TT::Semicolon])?;
        if self.consume_if(TT::KeywordIn).is_match() {
          self.validate_for_in_target(&expr, t0.start.line)?;
          self.for_in_tail(cp, ForInLhs::Assign(expr))
        } else {
          self.require(TT::Semicolon)?;
          self.for_triple_tail(cp, ForTripleStmtInit::Expr(expr))
        }
      }
    }
  }

  fn for_triple_tail(
    &mut self,
    cp: super::ParserCheckpoint,
    init: ForTripleStmtInit,
  ) -> SyntaxResult<Node<Stmt>> {
    let cond = if self.peek().typ == TT::Semicolon {
      None
    } else {
      Some(self.expr([TT::Semicolon])?)
    };
    self.require(TT::Semicolon)?;
    let post = if self.peek().typ == TT::ParenthesisClose {
      None
    } else {
      Some(self.expr([TT::ParenthesisClose])?)
    };
    self.require(TT::ParenthesisClose)?;
    let body = self.for_body()?;
    let loc = self.since_checkpoint(&cp);
    Ok(
      Node::new(loc, ForTripleStmt {
        init,
        cond,
        post,
        body,
      })
      .into_wrapped(),
    )
  }

  fn for_in_tail(
    &mut self,
    cp: super::ParserCheckpoint,
    lhs: ForInLhs,
  ) -> SyntaxResult<Node<Stmt>> {
    let rhs = self.expr([TT::ParenthesisClose])?;
    self.require(TT::ParenthesisClose)?;
    let body = self.for_body()?;
    let loc = self.since_checkpoint(&cp);
    Ok(Node::new(loc, ForInStmt { lhs, rhs, body }).into_wrapped())
  }

  fn for_body(&mut self) -> SyntaxResult<Node<ForBody>> {
    self.scopes.enter_loop();
    let body = self.with_loc(|p| {
      let body = if p.consume_if(TT::BraceOpen).is_match() {
        let body = p.repeat_until_tt(TT::BraceClose, |p| p.stmt())?;
        p.require(TT::BraceClose)?;
        body
      } else {
        vec![p.stmt()?]
      };
      Ok(ForBody { body })
    });
    self.scopes.exit_loop();
    body
  }

  fn validate_for_in_target(&mut self, target: &Node<Expr>, line: u32) -> SyntaxResult<()> {
    match target.stx.as_ref() {
      Expr::Id(id) => {
        self.scopes.write_variable(id.stx.name);
        Ok(())
      }
      Expr::Member(_) | Expr::ComputedMember(_) => Ok(()),
      _ => Err(
        target
          .loc
          .error(SyntaxErrorType::InvalidAssignmentTarget, line, None),
      ),
    }
  }

  fn label_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let mut labels: Vec<(Identifier, Loc, u32)> = Vec::new();
    loop {
      let [t0, t1] = self.peek_n::<2>();
      if t0.typ != TT::Identifier || t1.typ != TT::Colon {
        break;
      };
      self.consume();
      self.consume();
      labels.push((self.intern(t0.loc()), t0.loc(), t0.start.line));
    }
    debug_assert!(!labels.is_empty());
    // All labels of a chain target the same statement; `continue l` is only
    // valid when that statement is a loop.
    let is_loop = matches!(
      self.peek().typ,
      TT::KeywordWhile | TT::KeywordDo | TT::KeywordFor
    );
    for &(name, loc, line) in &labels {
      if !self.scopes.push_label(name, is_loop) {
        return Err(loc.error(SyntaxErrorType::LabelRedeclared, line, None));
      };
    }
    let mut stmt = self.stmt()?;
    for &(name, loc, _) in labels.iter().rev() {
      self.scopes.pop_label();
      stmt = Node::new(loc + stmt.loc, LabelStmt {
        name,
        statement: stmt,
      })
      .into_wrapped();
    }
    Ok(stmt)
  }

  /// Parses statements up to `end`, processing the directive prologue: leading
  /// string literal statements, of which a verbatim `"use strict"` switches
  /// the current function to strict mode and surfaces any provisional
  /// violation recorded before it.
  pub fn stmts_with_directives(&mut self, end: TT) -> SyntaxResult<Vec<Node<Stmt>>> {
    let mut body = Vec::new();
    let mut in_prologue = true;
    while self.peek().typ != end {
      let stmt = self.stmt()?;
      if in_prologue {
        match self.as_directive(&stmt) {
          Some("use strict") => {
            if let Some((typ, loc, line)) = self.scopes.set_strict() {
              return Err(loc.error(typ, line, None));
            };
          }
          Some(_) => {}
          None => in_prologue = false,
        };
      };
      body.push(stmt);
    }
    Ok(body)
  }

  // A directive is an expression statement consisting of exactly a string
  // literal, compared by raw source text: escapes disqualify `"use strict"`,
  // and so do parentheses.
  fn as_directive(&self, stmt: &Node<Stmt>) -> Option<&str> {
    let Stmt::Expr(st) = stmt.stx.as_ref() else {
      return None;
    };
    let Expr::LitStr(s) = st.stx.expr.stx.as_ref() else {
      return None;
    };
    if stmt.loc.0 != s.loc.0 {
      return None;
    };
    let raw = self.str(s.loc);
    Some(&raw[1..raw.len() - 1])
  }
}
