use crate::expression::ast::Expr;
use crate::expression::error::ExprError;
use crate::expression::interp::{ExprContext, ExprValue, eval};
use crate::expression::parser::parse_expr;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluates inline `{ ... }` sources against an animation context.
///
/// Implementations decide what a source can reach; nothing outside the
/// [`ExprContext`] is visible to scene-authored code.
pub trait ExpressionEngine {
    /// Validate a source without evaluating it.
    fn check(&self, src: &str) -> Result<(), ExprError>;

    /// Evaluate a source.
    fn evaluate(&self, src: &str, ctx: &dyn ExprContext) -> Result<ExprValue, ExprError>;
}

/// Pure arithmetic/logic language with a fixed builtin set and no host access.
/// Each distinct source is parsed once.
#[derive(Default)]
pub struct SandboxedEngine {
    cache: RefCell<HashMap<String, Rc<Expr>>>,
}

impl SandboxedEngine {
    /// Empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    fn compiled(&self, src: &str) -> Result<Rc<Expr>, ExprError> {
        if let Some(expr) = self.cache.borrow().get(src) {
            return Ok(Rc::clone(expr));
        }
        let expr = Rc::new(parse_expr(src)?);
        self.cache
            .borrow_mut()
            .insert(src.to_owned(), Rc::clone(&expr));
        Ok(expr)
    }

    pub(crate) fn cached_sources(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl ExpressionEngine for SandboxedEngine {
    fn check(&self, src: &str) -> Result<(), ExprError> {
        self.compiled(src).map(|_| ())
    }

    fn evaluate(&self, src: &str, ctx: &dyn ExprContext) -> Result<ExprValue, ExprError> {
        let expr = self.compiled(src)?;
        eval(&expr, ctx)
    }
}

impl std::fmt::Debug for SandboxedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxedEngine")
            .field("cached_sources", &self.cached_sources())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/engine.rs"]
mod tests;
