use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a, 'b> Parser<'a, 'b> {
  pub fn top_level(&mut self) -> SyntaxResult<Node<TopLevel>> {
    let top_level = self.with_loc(|p| {
      let body = p.stmts_with_directives(TT::EOF)?;
      Ok(TopLevel { body })
    })?;
    self.require(TT::EOF)?;
    Ok(top_level)
  }
}
