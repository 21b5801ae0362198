use crate::ast::expr::Expr;
use crate::ast::expr::LitArrElem;
use crate::ast::expr::ObjMemberValue;
use crate::ast::expr::PropKey;
use crate::ast::node::Node;
use crate::ast::stmt::ForTripleStmtInit;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::interner::Interner;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Pos;
use crate::operator::OperatorName;
use crate::parse::Parser;
use crate::token::TT;
use serde_json::json;
use serde_json::Value;
use similar::TextDiff;

fn parser<'a, 'b>(source: &'a str, interner: &'b mut Interner) -> Parser<'a, 'b> {
  Parser::new(
    Lexer::new(source, Pos::default()),
    Pos::default(),
    interner,
    None,
  )
}

fn parse_expr(source: &str) -> Node<Expr> {
  let mut interner = Interner::new();
  let mut p = parser(source, &mut interner);
  p.expr([TT::Semicolon]).unwrap()
}

fn parse_expr_err(source: &str) -> SyntaxError {
  let mut interner = Interner::new();
  let mut p = parser(source, &mut interner);
  p.expr([TT::Semicolon]).unwrap_err()
}

fn parse_stmt(source: &str) -> Node<Stmt> {
  let mut interner = Interner::new();
  let mut p = parser(source, &mut interner);
  p.stmt().unwrap()
}

fn parse_stmt_err(source: &str) -> SyntaxError {
  let mut interner = Interner::new();
  let mut p = parser(source, &mut interner);
  p.stmt().unwrap_err()
}

fn assert_json_eq(actual: Value, expected: Value) {
  if actual != expected {
    let actual = serde_json::to_string_pretty(&actual).unwrap();
    let expected = serde_json::to_string_pretty(&expected).unwrap();
    let diff = TextDiff::from_lines(&expected, &actual);
    panic!("AST mismatch (expected -> actual):\n{}", diff.unified_diff());
  };
}

#[test]
fn test_parser_buffer() {
  let mut interner = Interner::new();
  let mut p = parser("var x = /a/ / 1;", &mut interner);
  let cp = p.checkpoint();
  assert_eq!(p.next_tok_i, 0);

  let t = p.peek();
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordVar);

  let t = p.consume();
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordVar);

  let t = p.consume();
  assert_eq!(p.next_tok_i, 2);
  assert_eq!(p.buf.len(), 2);
  assert_eq!(t.typ, TT::Identifier);

  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 2);

  // Re-peeking under a different mode truncates and re-lexes.
  let t = p.peek_with_mode(LexMode::SlashIsRegex);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordVar);
}

#[test]
fn test_binary_precedence() {
  assert_json_eq(
    serde_json::to_value(parse_expr("1 + 2 * 3")).unwrap(),
    json!({
      "$t": "Binary",
      "operator": "Addition",
      "left": { "$t": "LitNum", "value": 1.0 },
      "right": {
        "$t": "Binary",
        "operator": "Multiplication",
        "left": { "$t": "LitNum", "value": 2.0 },
        "right": { "$t": "LitNum", "value": 3.0 },
      },
    }),
  );
}

#[test]
fn test_assignment_is_right_associative() {
  let expr = parse_expr("a = b = c");
  match *expr.stx {
    Expr::Binary(ref outer) => {
      assert_eq!(outer.stx.operator, OperatorName::Assignment);
      match *outer.stx.right.stx {
        Expr::Binary(ref inner) => assert_eq!(inner.stx.operator, OperatorName::Assignment),
        ref other => panic!("expected nested assignment, got {:?}", other),
      };
    }
    ref other => panic!("expected assignment, got {:?}", other),
  };
}

#[test]
fn test_conditional_alternate_is_assignment() {
  // `a ? b : c = d` assigns to `c`, not to the whole conditional.
  let expr = parse_expr("a ? b : c = d");
  match *expr.stx {
    Expr::Cond(ref cond) => match *cond.stx.alternate.stx {
      Expr::Binary(ref b) => assert_eq!(b.stx.operator, OperatorName::Assignment),
      ref other => panic!("expected assignment alternate, got {:?}", other),
    },
    ref other => panic!("expected conditional, got {:?}", other),
  };
}

#[test]
fn test_member_call_chain() {
  let expr = parse_expr("a.b(c)[d]");
  match *expr.stx {
    Expr::ComputedMember(ref cm) => match *cm.stx.object.stx {
      Expr::Call(ref call) => {
        assert_eq!(call.stx.arguments.len(), 1);
        match *call.stx.callee.stx {
          Expr::Member(_) => {}
          ref other => panic!("expected member callee, got {:?}", other),
        };
      }
      ref other => panic!("expected call, got {:?}", other),
    },
    ref other => panic!("expected computed member, got {:?}", other),
  };
}

#[test]
fn test_new_argument_binding() {
  // The first argument list binds to `new`; the trailing member access
  // applies to the constructed instance.
  let expr = parse_expr("new a.b(c).d");
  match *expr.stx {
    Expr::Member(ref m) => match *m.stx.left.stx {
      Expr::New(ref n) => {
        assert_eq!(n.stx.arguments.len(), 1);
        match *n.stx.callee.stx {
          Expr::Member(_) => {}
          ref other => panic!("expected member callee, got {:?}", other),
        };
      }
      ref other => panic!("expected new, got {:?}", other),
    },
    ref other => panic!("expected member of new, got {:?}", other),
  };
}

#[test]
fn test_new_without_arguments() {
  let expr = parse_expr("new A");
  match *expr.stx {
    Expr::New(ref n) => assert!(n.stx.arguments.is_empty()),
    ref other => panic!("expected new, got {:?}", other),
  };
}

#[test]
fn test_slash_is_division_after_operand() {
  let expr = parse_expr("a / b");
  match *expr.stx {
    Expr::Binary(ref b) => assert_eq!(b.stx.operator, OperatorName::Division),
    ref other => panic!("expected division, got {:?}", other),
  };
}

#[test]
fn test_slash_is_regex_in_operand_position() {
  let expr = parse_expr("/ab/gi.test");
  match *expr.stx {
    Expr::Member(ref m) => match *m.stx.left.stx {
      Expr::LitRegex(ref r) => {
        assert_eq!(r.stx.pattern, "ab");
        assert_eq!(r.stx.flags, "gi");
      }
      ref other => panic!("expected regex literal, got {:?}", other),
    },
    ref other => panic!("expected member, got {:?}", other),
  };
}

#[test]
fn test_comma_operator() {
  let expr = parse_expr("a, b");
  match *expr.stx {
    Expr::Binary(ref b) => assert_eq!(b.stx.operator, OperatorName::Comma),
    ref other => panic!("expected comma expression, got {:?}", other),
  };
}

#[test]
fn test_invalid_assignment_target() {
  assert_eq!(
    parse_expr_err("1 = 2").typ,
    SyntaxErrorType::InvalidAssignmentTarget
  );
  assert_eq!(
    parse_expr_err("a + b = c").typ,
    SyntaxErrorType::InvalidAssignmentTarget
  );
}

#[test]
fn test_string_and_number_values() {
  assert_json_eq(
    serde_json::to_value(parse_expr(r#""a\nb""#)).unwrap(),
    json!({ "$t": "LitStr", "value": "a\nb" }),
  );
  assert_json_eq(
    serde_json::to_value(parse_expr("0x10")).unwrap(),
    json!({ "$t": "LitNum", "value": 16.0 }),
  );
  assert_json_eq(
    serde_json::to_value(parse_expr("012")).unwrap(),
    json!({ "$t": "LitNum", "value": 10.0 }),
  );
}

#[test]
fn test_object_literal_keys() {
  let expr = parse_expr(r#"{a: 1, "b c": 2, 3: d}"#);
  match *expr.stx {
    Expr::LitObj(ref obj) => {
      assert_eq!(obj.stx.members.len(), 3);
      assert!(matches!(obj.stx.members[0].stx.key, PropKey::Ident(_)));
      match &obj.stx.members[1].stx.key {
        PropKey::Str(s) => assert_eq!(s, "b c"),
        other => panic!("expected string key, got {:?}", other),
      };
      assert!(matches!(obj.stx.members[2].stx.key, PropKey::Num(_)));
    }
    ref other => panic!("expected object literal, got {:?}", other),
  };
}

#[test]
fn test_object_literal_accessors() {
  let expr = parse_expr("{get x() { return 1; }, set x(v) { a = v; }, get: 1}");
  match *expr.stx {
    Expr::LitObj(ref obj) => {
      assert_eq!(obj.stx.members.len(), 3);
      match &obj.stx.members[0].stx.value {
        ObjMemberValue::Getter(f) => assert!(f.stx.parameters.is_empty()),
        other => panic!("expected getter, got {:?}", other),
      };
      match &obj.stx.members[1].stx.value {
        ObjMemberValue::Setter(f) => assert_eq!(f.stx.parameters.len(), 1),
        other => panic!("expected setter, got {:?}", other),
      };
      // `get` followed by `:` is a plain key.
      assert!(matches!(
        obj.stx.members[2].stx.value,
        ObjMemberValue::Property(_)
      ));
    }
    ref other => panic!("expected object literal, got {:?}", other),
  };
}

#[test]
fn test_accessor_arity() {
  assert!(matches!(
    parse_expr_err("{get x(a) {}}").typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
  assert!(matches!(
    parse_expr_err("{set x() {}}").typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
}

#[test]
fn test_object_literal_rejects_trailing_comma() {
  assert!(matches!(
    parse_expr_err("{a: 1,}").typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
}

#[test]
fn test_array_elisions() {
  let expr = parse_expr("[,,1,]");
  match *expr.stx {
    Expr::LitArr(ref arr) => {
      assert_eq!(arr.stx.elements.len(), 3);
      assert!(matches!(arr.stx.elements[0], LitArrElem::Empty));
      assert!(matches!(arr.stx.elements[1], LitArrElem::Empty));
      assert!(matches!(arr.stx.elements[2], LitArrElem::Single(_)));
    }
    ref other => panic!("expected array literal, got {:?}", other),
  };
}

#[test]
fn test_call_rejects_trailing_comma() {
  assert!(matches!(
    parse_expr_err("f(a,)").typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
}

#[test]
fn test_keyword_property_names() {
  // Keywords and reserved words are valid after `.` and as literal keys.
  let expr = parse_expr("a.delete.class");
  match *expr.stx {
    Expr::Member(_) => {}
    ref other => panic!("expected member, got {:?}", other),
  };
  let expr = parse_expr("{in: 1}");
  match *expr.stx {
    Expr::LitObj(ref obj) => assert_eq!(obj.stx.members.len(), 1),
    ref other => panic!("expected object literal, got {:?}", other),
  };
}

#[test]
fn test_var_decl() {
  let stmt = parse_stmt("var a = 1, b;");
  match *stmt.stx {
    Stmt::VarDecl(ref decl) => {
      assert_eq!(decl.stx.declarators.len(), 2);
      assert!(decl.stx.declarators[0].initializer.is_some());
      assert!(decl.stx.declarators[1].initializer.is_none());
    }
    ref other => panic!("expected var declaration, got {:?}", other),
  };
}

#[test]
fn test_if_else() {
  let stmt = parse_stmt("if (a) b; else c;");
  match *stmt.stx {
    Stmt::If(ref s) => assert!(s.stx.alternate.is_some()),
    ref other => panic!("expected if, got {:?}", other),
  };
}

#[test]
fn test_labelled_loop() {
  let stmt = parse_stmt("x: while (a) { continue x; }");
  match *stmt.stx {
    Stmt::Label(ref l) => match *l.stx.statement.stx {
      Stmt::While(_) => {}
      ref other => panic!("expected while, got {:?}", other),
    },
    ref other => panic!("expected label, got {:?}", other),
  };
}

#[test]
fn test_label_chain_continue() {
  assert!(matches!(
    *parse_stmt("a: b: for (;;) { continue a; }").stx,
    Stmt::Label(_)
  ));
}

#[test]
fn test_control_flow_errors() {
  assert_eq!(
    parse_stmt_err("continue;").typ,
    SyntaxErrorType::ContinueOutsideLoop
  );
  assert_eq!(
    parse_stmt_err("break;").typ,
    SyntaxErrorType::BreakOutsideLoopOrSwitch
  );
  assert_eq!(
    parse_stmt_err("while (a) { continue x; }").typ,
    SyntaxErrorType::LabelNotFound
  );
  assert_eq!(
    parse_stmt_err("x: { continue x; }").typ,
    SyntaxErrorType::ContinueLabelNotALoop
  );
  assert_eq!(
    parse_stmt_err("x: x: ;").typ,
    SyntaxErrorType::LabelRedeclared
  );
  assert_eq!(
    parse_stmt_err("return;").typ,
    SyntaxErrorType::ReturnOutsideFunction
  );
}

#[test]
fn test_switch() {
  let stmt = parse_stmt("switch (a) { case 1: b; break; default: ; }");
  match *stmt.stx {
    Stmt::Switch(ref s) => {
      assert_eq!(s.stx.branches.len(), 2);
      assert!(s.stx.branches[0].stx.case.is_some());
      assert!(s.stx.branches[1].stx.case.is_none());
    }
    ref other => panic!("expected switch, got {:?}", other),
  };
  assert_eq!(
    parse_stmt_err("switch (a) { default: ; default: ; }").typ,
    SyntaxErrorType::UnexpectedToken
  );
}

#[test]
fn test_try_requires_catch_or_finally() {
  assert_eq!(
    parse_stmt_err("try { a; }").typ,
    SyntaxErrorType::TryStatementHasNoCatchOrFinally
  );
  assert!(matches!(*parse_stmt("try { a; } finally { b; }").stx, Stmt::Try(_)));
}

#[test]
fn test_throw_restricted_production() {
  assert_eq!(
    parse_stmt_err("throw\na;").typ,
    SyntaxErrorType::LineTerminatorAfterThrow
  );
}

#[test]
fn test_for_header_forms() {
  assert!(matches!(*parse_stmt("for (;;) ;").stx, Stmt::ForTriple(_)));
  assert!(matches!(
    *parse_stmt("for (var i = 0; i < n; i++) { f(i); }").stx,
    Stmt::ForTriple(_)
  ));
  assert!(matches!(*parse_stmt("for (a in b) c;").stx, Stmt::ForIn(_)));
  assert!(matches!(
    *parse_stmt("for (var k in o) { f(k); }").stx,
    Stmt::ForIn(_)
  ));
  // Legacy: a single declarator with initializer is allowed in for-in.
  assert!(matches!(
    *parse_stmt("for (var k = 0 in o) ;").stx,
    Stmt::ForIn(_)
  ));
  assert_eq!(
    parse_stmt_err("for (var a, b in c) ;").typ,
    SyntaxErrorType::UnexpectedToken
  );
}

#[test]
fn test_for_header_in_operator() {
  // `in` is allowed in the header when parenthesised.
  let stmt = parse_stmt("for (var x = (a in b); ; ) ;");
  match *stmt.stx {
    Stmt::ForTriple(ref s) => assert!(matches!(s.stx.init, ForTripleStmtInit::Decl(_))),
    ref other => panic!("expected for, got {:?}", other),
  };
}

#[test]
fn test_asi_between_statements() {
  let mut interner = Interner::new();
  let mut p = parser("a\nb", &mut interner);
  assert!(matches!(*p.stmt().unwrap().stx, Stmt::Expr(_)));
  assert!(matches!(*p.stmt().unwrap().stx, Stmt::Expr(_)));
  assert_eq!(p.peek().typ, TT::EOF);
}

#[test]
fn test_postfix_asi_restriction() {
  // A line terminator before `++` ends the statement; the `++` then applies
  // as a prefix to the next one.
  let mut interner = Interner::new();
  let mut p = parser("a\n++b", &mut interner);
  let first = p.stmt().unwrap();
  match *first.stx {
    Stmt::Expr(ref s) => assert!(matches!(*s.stx.expr.stx, Expr::Id(_))),
    ref other => panic!("expected expression statement, got {:?}", other),
  };
  let second = p.stmt().unwrap();
  match *second.stx {
    Stmt::Expr(ref s) => match *s.stx.expr.stx {
      Expr::Unary(ref u) => assert_eq!(u.stx.operator, OperatorName::PrefixIncrement),
      ref other => panic!("expected prefix increment, got {:?}", other),
    },
    ref other => panic!("expected expression statement, got {:?}", other),
  };
}

#[test]
fn test_continue_is_a_restricted_production() {
  // `continue <newline> label` is `continue;` then an expression statement.
  let stmt = parse_stmt("while (a) { continue\nlabel; }");
  match *stmt.stx {
    Stmt::While(ref w) => match *w.stx.body.stx {
      Stmt::Block(ref b) => {
        assert_eq!(b.stx.body.len(), 2);
        match b.stx.body[0].stx.as_ref() {
          Stmt::Continue(c) => assert!(c.stx.label.is_none()),
          other => panic!("expected continue, got {:?}", other),
        };
      }
      ref other => panic!("expected block, got {:?}", other),
    },
    ref other => panic!("expected while, got {:?}", other),
  };
}

#[test]
fn test_operator_on_next_line_continues_statement() {
  let mut interner = Interner::new();
  let mut p = parser("a\n+b;", &mut interner);
  let stmt = p.stmt().unwrap();
  match *stmt.stx {
    Stmt::Expr(ref s) => match *s.stx.expr.stx {
      Expr::Binary(ref b) => assert_eq!(b.stx.operator, OperatorName::Addition),
      ref other => panic!("expected addition, got {:?}", other),
    },
    ref other => panic!("expected expression statement, got {:?}", other),
  };
  assert_eq!(p.peek().typ, TT::EOF);
}

#[test]
fn test_missing_semicolon_without_line_break() {
  let mut interner = Interner::new();
  let mut p = parser("a b", &mut interner);
  assert!(p.stmt().is_err());
}

#[test]
fn test_function_expression_self_binding() {
  let expr = parse_expr("function f(a, b) { return f; }");
  match *expr.stx {
    Expr::Func(ref f) => {
      assert!(f.stx.name.is_some());
      assert_eq!(f.stx.func.stx.parameters.len(), 2);
    }
    ref other => panic!("expected function expression, got {:?}", other),
  };
}

#[test]
fn test_eof_is_recoverable() {
  use crate::error::Recovery;
  let err = parse_expr_err("a +");
  assert_eq!(err.typ, SyntaxErrorType::UnexpectedEnd);
  assert_eq!(err.recovery, Recovery::Recoverable);
}
