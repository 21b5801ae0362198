use ahash::HashMap;
use ahash::HashMapExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum OperatorName {
  Addition,
  Assignment,
  AssignmentAddition,
  AssignmentBitwiseAnd,
  AssignmentBitwiseLeftShift,
  AssignmentBitwiseOr,
  AssignmentBitwiseRightShift,
  AssignmentBitwiseUnsignedRightShift,
  AssignmentBitwiseXor,
  AssignmentDivision,
  AssignmentMultiplication,
  AssignmentRemainder,
  AssignmentSubtraction,
  BitwiseAnd,
  BitwiseLeftShift,
  BitwiseNot,
  BitwiseOr,
  BitwiseRightShift,
  BitwiseUnsignedRightShift,
  BitwiseXor,
  Call,
  Comma,
  ComputedMemberAccess,
  Conditional,
  Delete,
  Division,
  Equality,
  GreaterThan,
  GreaterThanOrEqual,
  In,
  Inequality,
  Instanceof,
  LessThan,
  LessThanOrEqual,
  LogicalAnd,
  LogicalNot,
  LogicalOr,
  MemberAccess,
  Multiplication,
  New,
  PostfixDecrement,
  PostfixIncrement,
  PrefixDecrement,
  PrefixIncrement,
  Remainder,
  StrictEquality,
  StrictInequality,
  Subtraction,
  Typeof,
  UnaryNegation,
  UnaryPlus,
  Void,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Associativity {
  Left,
  Right,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Arity {
  Unary,
  Binary,
  Ternary,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Operator {
  pub name: OperatorName,
  pub arity: Arity,
  pub associativity: Associativity,
  // Higher binds tighter. Derived as an explicit table from the ECMAScript
  // grammar, lowest (comma) to highest (member access/call).
  pub precedence: u8,
}

// An operator with a higher precedence is evaluated before an operator with a
// lower precedence, no matter their order of appearance. For operators of the
// same precedence, left associativity means the leftmost is evaluated first.
pub static OPERATORS: Lazy<HashMap<OperatorName, Operator>> = Lazy::new(|| {
  use Arity::*;
  use Associativity::*;
  use OperatorName::*;
  #[rustfmt::skip]
  let defs: &[(OperatorName, Arity, Associativity, u8)] = &[
    (Comma,                               Binary,  Left,  1),

    (Assignment,                          Binary,  Right, 2),
    (AssignmentAddition,                  Binary,  Right, 2),
    (AssignmentBitwiseAnd,                Binary,  Right, 2),
    (AssignmentBitwiseLeftShift,          Binary,  Right, 2),
    (AssignmentBitwiseOr,                 Binary,  Right, 2),
    (AssignmentBitwiseRightShift,         Binary,  Right, 2),
    (AssignmentBitwiseUnsignedRightShift, Binary,  Right, 2),
    (AssignmentBitwiseXor,                Binary,  Right, 2),
    (AssignmentDivision,                  Binary,  Right, 2),
    (AssignmentMultiplication,            Binary,  Right, 2),
    (AssignmentRemainder,                 Binary,  Right, 2),
    (AssignmentSubtraction,               Binary,  Right, 2),

    (Conditional,                         Ternary, Right, 3),

    (LogicalOr,                           Binary,  Left,  4),
    (LogicalAnd,                          Binary,  Left,  5),
    (BitwiseOr,                           Binary,  Left,  6),
    (BitwiseXor,                          Binary,  Left,  7),
    (BitwiseAnd,                          Binary,  Left,  8),

    (Equality,                            Binary,  Left,  9),
    (Inequality,                          Binary,  Left,  9),
    (StrictEquality,                      Binary,  Left,  9),
    (StrictInequality,                    Binary,  Left,  9),

    (GreaterThan,                         Binary,  Left,  10),
    (GreaterThanOrEqual,                  Binary,  Left,  10),
    (In,                                  Binary,  Left,  10),
    (Instanceof,                          Binary,  Left,  10),
    (LessThan,                            Binary,  Left,  10),
    (LessThanOrEqual,                     Binary,  Left,  10),

    (BitwiseLeftShift,                    Binary,  Left,  11),
    (BitwiseRightShift,                   Binary,  Left,  11),
    (BitwiseUnsignedRightShift,           Binary,  Left,  11),

    (Addition,                            Binary,  Left,  12),
    (Subtraction,                         Binary,  Left,  12),

    (Division,                            Binary,  Left,  13),
    (Multiplication,                      Binary,  Left,  13),
    (Remainder,                           Binary,  Left,  13),

    (BitwiseNot,                          Unary,   Right, 14),
    (Delete,                              Unary,   Right, 14),
    (LogicalNot,                          Unary,   Right, 14),
    (PrefixDecrement,                     Unary,   Right, 14),
    (PrefixIncrement,                     Unary,   Right, 14),
    (Typeof,                              Unary,   Right, 14),
    (UnaryNegation,                       Unary,   Right, 14),
    (UnaryPlus,                           Unary,   Right, 14),
    (Void,                                Unary,   Right, 14),

    (PostfixDecrement,                    Unary,   Left,  15),
    (PostfixIncrement,                    Unary,   Left,  15),

    (New,                                 Unary,   Right, 16),

    (Call,                                Binary,  Left,  17),
    (ComputedMemberAccess,                Binary,  Left,  17),
    (MemberAccess,                        Binary,  Left,  17),
  ];
  let mut map = HashMap::<OperatorName, Operator>::new();
  for &(name, arity, associativity, precedence) in defs {
    map.insert(name, Operator {
      name,
      arity,
      associativity,
      precedence,
    });
  }
  map
});
