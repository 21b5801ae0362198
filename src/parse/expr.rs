use super::lit::is_legacy_octal_number;
use super::lit::normalise_literal_number;
use super::lit::normalise_literal_regex;
use super::lit::normalise_literal_string;
use super::operator::is_assignment_operator;
use super::operator::MULTARY_OPERATOR_MAPPING;
use super::operator::UNARY_OPERATOR_MAPPING;
use super::is_identifier_like;
use super::Parser;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallExpr;
use crate::ast::expr::ComputedMemberExpr;
use crate::ast::expr::CondExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::LitArrElem;
use crate::ast::expr::LitArrExpr;
use crate::ast::expr::LitBoolExpr;
use crate::ast::expr::LitNullExpr;
use crate::ast::expr::LitNumExpr;
use crate::ast::expr::LitObjExpr;
use crate::ast::expr::LitRegexExpr;
use crate::ast::expr::LitStrExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::NewExpr;
use crate::ast::expr::ObjMember;
use crate::ast::expr::ObjMemberValue;
use crate::ast::expr::PropKey;
use crate::ast::expr::ThisExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::UnaryPostfixExpr;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::interner::Identifier;
use crate::lex::LexMode;
use crate::num::JsNumber;
use crate::operator::Associativity;
use crate::operator::OperatorName;
use crate::operator::OPERATORS;
use crate::token::Token;
use crate::token::TT;

/// Automatic Semicolon Insertion state threaded through expression parsing.
/// When the statement allows ASI, an unmapped token after a line terminator
/// (or `}`/EOF) ends the expression instead of erroring.
pub struct Asi {
  pub can_end_with_asi: bool,
  pub did_end_with_asi: bool,
}

impl Asi {
  pub fn can() -> Asi {
    Asi {
      can_end_with_asi: true,
      did_end_with_asi: false,
    }
  }

  pub fn no() -> Asi {
    Asi {
      can_end_with_asi: false,
      did_end_with_asi: false,
    }
  }
}

impl<'a, 'b> Parser<'a, 'b> {
  pub fn expr<const N: usize>(&mut self, terminators: [TT; N]) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(1, terminators, &mut Asi::no())
  }

  pub fn expr_with_asi<const N: usize>(
    &mut self,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(1, terminators, asi)
  }

  /// Parses a parenthesised expression like `(a + b)`. The node of the inner
  /// expression is returned directly; nothing in the AST records the
  /// parentheses.
  pub fn grouping(&mut self, asi: &mut Asi) -> SyntaxResult<Node<Expr>> {
    self.require(TT::ParenthesisOpen)?;
    let expr = self.expr_with_min_prec(1, [TT::ParenthesisClose], asi)?;
    self.require(TT::ParenthesisClose)?;
    Ok(expr)
  }

  /// Parses call arguments up to (but not including) the closing parenthesis.
  /// No trailing comma: after one, another argument must follow.
  pub fn call_args(&mut self) -> SyntaxResult<Vec<Node<Expr>>> {
    let mut args = Vec::new();
    if self.peek().typ == TT::ParenthesisClose {
      return Ok(args);
    };
    loop {
      args.push(self.expr([TT::Comma, TT::ParenthesisClose])?);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    Ok(args)
  }

  pub fn id_expr(&mut self) -> SyntaxResult<Node<IdExpr>> {
    self.with_loc(|p| {
      let t = p.require(TT::Identifier)?;
      let name = p.intern(t.loc());
      p.scopes.use_variable(name);
      Ok(IdExpr { name })
    })
  }

  fn this_expr(&mut self) -> SyntaxResult<Node<ThisExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordThis)?;
      Ok(ThisExpr {})
    })
  }

  fn lit_bool(&mut self) -> SyntaxResult<Node<LitBoolExpr>> {
    self.with_loc(|p| {
      let t = p.consume();
      debug_assert!(matches!(t.typ, TT::LiteralTrue | TT::LiteralFalse));
      Ok(LitBoolExpr {
        value: t.typ == TT::LiteralTrue,
      })
    })
  }

  fn lit_null(&mut self) -> SyntaxResult<Node<LitNullExpr>> {
    self.with_loc(|p| {
      p.require(TT::LiteralNull)?;
      Ok(LitNullExpr {})
    })
  }

  // Shared by number literal expressions and object literal keys.
  fn lit_num_value(&mut self, t: Token) -> SyntaxResult<JsNumber> {
    let raw = self.str(t.loc());
    if is_legacy_octal_number(raw) && self.scopes.is_strict() {
      return Err(t.error(SyntaxErrorType::OctalInStrictMode));
    };
    normalise_literal_number(raw).ok_or_else(|| t.error(SyntaxErrorType::InvalidNumber))
  }

  // Octal escapes in sloppy mode are recorded provisionally: if this string
  // turns out to be (or precede) a `"use strict"` directive, the violation is
  // surfaced when the directive is processed.
  fn lit_str_value(&mut self, t: Token) -> SyntaxResult<String> {
    let s = normalise_literal_string(self.str(t.loc()))
      .ok_or_else(|| t.error(SyntaxErrorType::InvalidString))?;
    if s.has_octal_escape {
      if self.scopes.is_strict() {
        return Err(t.error(SyntaxErrorType::OctalInStrictMode));
      };
      self
        .scopes
        .record_strict_violation(SyntaxErrorType::OctalInStrictMode, t.loc(), t.start.line);
    };
    Ok(s.value)
  }

  fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    self.with_loc(|p| {
      let t = p.require(TT::LiteralNumber)?;
      let value = p.lit_num_value(t)?;
      Ok(LitNumExpr { value })
    })
  }

  fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    self.with_loc(|p| {
      let t = p.require(TT::LiteralString)?;
      let value = p.lit_str_value(t)?;
      Ok(LitStrExpr { value })
    })
  }

  fn lit_regex(&mut self) -> SyntaxResult<Node<LitRegexExpr>> {
    self.with_loc(|p| {
      let t = p.require_with_mode(TT::LiteralRegex, LexMode::SlashIsRegex)?;
      let (pattern, flags) = normalise_literal_regex(p.str(t.loc()));
      Ok(LitRegexExpr {
        pattern: pattern.to_string(),
        flags: flags.to_string(),
      })
    })
  }

  pub fn lit_arr(&mut self) -> SyntaxResult<Node<LitArrExpr>> {
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::new();
      loop {
        if p.consume_if(TT::BracketClose).is_match() {
          break;
        };
        if p.consume_if(TT::Comma).is_match() {
          // An elision; `[a, , b]` and `[,]` are legal, and a lone trailing
          // comma does not add an element.
          elements.push(LitArrElem::Empty);
          continue;
        };
        elements.push(LitArrElem::Single(p.expr([TT::Comma, TT::BracketClose])?));
        if !p.consume_if(TT::Comma).is_match() {
          p.require(TT::BracketClose)?;
          break;
        };
      }
      Ok(LitArrExpr { elements })
    })
  }

  fn obj_key(&mut self) -> SyntaxResult<PropKey> {
    let t = self.consume();
    Ok(match t.typ {
      TT::LiteralString => PropKey::Str(self.lit_str_value(t)?),
      TT::LiteralNumber => PropKey::Num(self.lit_num_value(t)?),
      typ if is_identifier_like(typ) => PropKey::Ident(self.intern(t.loc())),
      _ => {
        return Err(self.error_at(t, SyntaxErrorType::ExpectedSyntax("property name")))
      }
    })
  }

  pub fn lit_obj(&mut self) -> SyntaxResult<Node<LitObjExpr>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let mut members = Vec::new();
      if !p.consume_if(TT::BraceClose).is_match() {
        loop {
          let member = p.with_loc(|p| {
            // `get`/`set` not followed by `:` begins an accessor member.
            let [t0, t1] = p.peek_n::<2>();
            if t0.typ == TT::Identifier
              && t1.typ != TT::Colon
              && matches!(p.str(t0.loc()), "get" | "set")
            {
              p.consume();
              let is_getter = p.str(t0.loc()) == "get";
              let key = p.obj_key()?;
              let func = p.func(None)?;
              let arity_ok = if is_getter {
                func.stx.parameters.is_empty()
              } else {
                func.stx.parameters.len() == 1
              };
              if !arity_ok {
                let expected = if is_getter {
                  "getter with no parameters"
                } else {
                  "setter with a single parameter"
                };
                return Err(func.loc.error(
                  SyntaxErrorType::ExpectedSyntax(expected),
                  t0.start.line,
                  None,
                ));
              };
              let value = if is_getter {
                ObjMemberValue::Getter(func)
              } else {
                ObjMemberValue::Setter(func)
              };
              return Ok(ObjMember { key, value });
            };
            let key = p.obj_key()?;
            p.require(TT::Colon)?;
            let value = p.expr([TT::Comma, TT::BraceClose])?;
            Ok(ObjMember {
              key,
              value: ObjMemberValue::Property(value),
            })
          })?;
          members.push(member);
          // No trailing comma: after one, another member must follow.
          if !p.consume_if(TT::Comma).is_match() {
            p.require(TT::BraceClose)?;
            break;
          };
        }
      };
      Ok(LitObjExpr { members })
    })
  }

  /// Parses a `new` expression. Member accesses after the operand belong to
  /// the callee; the first argument list (if any) belongs to this `new`, so
  /// `new a.b()()` constructs with `a.b` and then calls the instance.
  fn new_expr(&mut self) -> SyntaxResult<Node<NewExpr>> {
    self.with_loc(|p| {
      p.require(TT::KeywordNew)?;
      let mut callee = p.expr_operand([TT::ParenthesisOpen], &mut Asi::no())?;
      loop {
        let t = p.peek();
        callee = match t.typ {
          TT::Dot => {
            p.consume();
            let (right, right_loc) = p.require_property_name()?;
            Node::new(callee.loc + right_loc, MemberExpr {
              left: callee,
              right,
            })
            .into_wrapped()
          }
          TT::BracketOpen => {
            p.consume();
            let member = p.expr([TT::BracketClose])?;
            let end = p.require(TT::BracketClose)?;
            Node::new(callee.loc + end.loc(), ComputedMemberExpr {
              object: callee,
              member,
            })
            .into_wrapped()
          }
          _ => break,
        };
      }
      let mut arguments = Vec::new();
      if p.consume_if(TT::ParenthesisOpen).is_match() {
        arguments = p.call_args()?;
        p.require(TT::ParenthesisClose)?;
      };
      Ok(NewExpr { callee, arguments })
    })
  }

  /// Checks that `target` can be assigned or incremented. Identifier targets
  /// are recorded as writes; strict mode additionally forbids `eval` and
  /// `arguments`.
  fn validate_assignment_target(&mut self, target: &Node<Expr>, line: u32) -> SyntaxResult<()> {
    match target.stx.as_ref() {
      Expr::Id(id) => {
        let name = id.stx.name;
        if self.scopes.is_strict() && (name == Identifier::EVAL || name == Identifier::ARGUMENTS) {
          return Err(
            target
              .loc
              .error(SyntaxErrorType::BindingNameRestricted, line, None),
          );
        };
        self.scopes.write_variable(name);
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

  fn expr_operand<const N: usize>(
    &mut self,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    // A slash here starts a regex literal, not a division.
    let t0 = self.peek_with_mode(LexMode::SlashIsRegex);
    if let Some(&operator) = UNARY_OPERATOR_MAPPING.get(&t0.typ) {
      let is_inc_dec = matches!(
        operator.name,
        OperatorName::PrefixIncrement | OperatorName::PrefixDecrement
      );
      let parsed = self.with_loc(|p| {
        p.consume_with_mode(LexMode::SlashIsRegex);
        let next_min_prec =
          operator.precedence + (operator.associativity == Associativity::Left) as u8;
        let operand = p.expr_with_min_prec(next_min_prec, terminators, asi)?;
        if is_inc_dec {
          p.validate_assignment_target(&operand, t0.start.line)?;
        };
        Ok(UnaryExpr {
          operator: operator.name,
          argument: operand,
        })
      })?;
      return Ok(parsed.into_wrapped());
    };
    let expr: Node<Expr> = match t0.typ {
      TT::BracketOpen => self.lit_arr()?.into_wrapped(),
      TT::BraceOpen => self.lit_obj()?.into_wrapped(),
      TT::Identifier => self.id_expr()?.into_wrapped(),
      TT::KeywordFunction => self.func_expr()?.into_wrapped(),
      TT::KeywordNew => self.new_expr()?.into_wrapped(),
      TT::KeywordThis => self.this_expr()?.into_wrapped(),
      TT::LiteralTrue | TT::LiteralFalse => self.lit_bool()?.into_wrapped(),
      TT::LiteralNull => self.lit_null()?.into_wrapped(),
      TT::LiteralNumber => self.lit_num()?.into_wrapped(),
      TT::LiteralRegex => self.lit_regex()?.into_wrapped(),
      TT::LiteralString => self.lit_str()?.into_wrapped(),
      TT::ParenthesisOpen => self.grouping(asi)?,
      _ => return Err(self.error_at(t0, SyntaxErrorType::ExpectedSyntax("expression operand"))),
    };
    Ok(expr)
  }

  pub fn expr_with_min_prec<const N: usize>(
    &mut self,
    min_prec: u8,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    self.enter_recursion()?;
    let res = self.expr_with_min_prec_inner(min_prec, terminators, asi);
    self.exit_recursion();
    res
  }

  fn expr_with_min_prec_inner<const N: usize>(
    &mut self,
    min_prec: u8,
    terminators: [TT; N],
    asi: &mut Asi,
  ) -> SyntaxResult<Node<Expr>> {
    let mut left = self.expr_operand(terminators, asi)?;

    loop {
      let cp = self.checkpoint();
      let t = self.consume();

      if terminators.contains(&t.typ) {
        self.restore_checkpoint(cp);
        break;
      };

      // Restricted production: a line terminator before a postfix operator
      // ends the expression instead.
      if matches!(t.typ, TT::PlusPlus | TT::HyphenHyphen) && !t.preceded_by_line_terminator {
        let operator_name = if t.typ == TT::PlusPlus {
          OperatorName::PostfixIncrement
        } else {
          OperatorName::PostfixDecrement
        };
        let operator = &OPERATORS[&operator_name];
        if operator.precedence < min_prec {
          self.restore_checkpoint(cp);
          break;
        };
        self.validate_assignment_target(&left, t.start.line)?;
        left = Node::new(left.loc + t.loc(), UnaryPostfixExpr {
          operator: operator_name,
          argument: left,
        })
        .into_wrapped();
        continue;
      };

      match MULTARY_OPERATOR_MAPPING.get(&t.typ) {
        None => {
          if asi.can_end_with_asi
            && (t.preceded_by_line_terminator || t.typ == TT::BraceClose || t.typ == TT::EOF)
          {
            // Automatic Semicolon Insertion.
            self.restore_checkpoint(cp);
            asi.did_end_with_asi = true;
            break;
          };
          return Err(self.error_at(t, SyntaxErrorType::ExpectedSyntax("expression operator")));
        }
        Some(operator) => {
          if operator.precedence < min_prec {
            self.restore_checkpoint(cp);
            break;
          };

          let next_min_prec =
            operator.precedence + (operator.associativity == Associativity::Left) as u8;

          left = match operator.name {
            OperatorName::Call => {
              let arguments = self.call_args()?;
              let end = self.require(TT::ParenthesisClose)?;
              Node::new(left.loc + end.loc(), CallExpr {
                callee: left,
                arguments,
              })
              .into_wrapped()
            }
            OperatorName::ComputedMemberAccess => {
              let member = self.expr([TT::BracketClose])?;
              let end = self.require(TT::BracketClose)?;
              Node::new(left.loc + end.loc(), ComputedMemberExpr {
                object: left,
                member,
              })
              .into_wrapped()
            }
            OperatorName::Conditional => {
              let consequent = self.expr([TT::Colon])?;
              self.require(TT::Colon)?;
              // The alternate is an AssignmentExpression, so `a ? b : c = d`
              // assigns to `c`.
              let alternate = self.expr_with_min_prec(
                OPERATORS[&OperatorName::Assignment].precedence,
                terminators,
                asi,
              )?;
              Node::new(left.loc + alternate.loc, CondExpr {
                test: left,
                consequent,
                alternate,
              })
              .into_wrapped()
            }
            OperatorName::MemberAccess => {
              let (right, right_loc) = self.require_property_name()?;
              Node::new(left.loc + right_loc, MemberExpr { left, right }).into_wrapped()
            }
            name => {
              if is_assignment_operator(name) {
                self.validate_assignment_target(&left, t.start.line)?;
              };
              let right = self.expr_with_min_prec(next_min_prec, terminators, asi)?;
              Node::new(left.loc + right.loc, BinaryExpr {
                operator: name,
                left,
                right,
              })
              .into_wrapped()
            }
          };
        }
      };
    }

    Ok(left)
  }
}
