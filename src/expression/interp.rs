use crate::animation::ease::{Ease, clamp_progress, interpolate_kind};
use crate::expression::ast::{BinaryOp, Expr, Lit, UnaryOp};
use crate::expression::error::ExprError;
use crate::foundation::core::TimeWindow;

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExprValue {
    /// Numeric result.
    Number(f64),
    /// Boolean result.
    Bool(bool),
}

impl ExprValue {
    /// Numeric view; booleans map to 1 and 0.
    pub fn as_number(self) -> f64 {
        match self {
            Self::Number(v) => v,
            Self::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub(crate) fn as_bool(self) -> Result<bool, ExprError> {
        match self {
            Self::Bool(b) => Ok(b),
            other => Err(ExprError::eval(format!("expected bool, got {other:?}"))),
        }
    }

    pub(crate) fn as_f64(self) -> Result<f64, ExprError> {
        match self {
            Self::Number(v) => Ok(v),
            other => Err(ExprError::eval(format!("expected numeric, got {other:?}"))),
        }
    }
}

/// What an expression can see: the scene time and the owning animation.
pub trait ExprContext {
    /// Current scene time in seconds.
    fn time(&self) -> f64;

    /// Resolved window of the owning animation.
    fn window(&self) -> TimeWindow;

    /// Resolve a dotted path such as `animation.sync.progress`.
    fn lookup(&self, path: &[String]) -> Option<ExprValue>;
}

pub(crate) fn eval(expr: &Expr, ctx: &dyn ExprContext) -> Result<ExprValue, ExprError> {
    match expr {
        Expr::Lit(Lit::F64(v)) => Ok(ExprValue::Number(*v)),
        Expr::Lit(Lit::Bool(b)) => Ok(ExprValue::Bool(*b)),
        Expr::Path(path) => ctx
            .lookup(path)
            .ok_or_else(|| ExprError::eval(format!("unknown name '{}'", path.join(".")))),
        Expr::Unary { op, expr } => {
            let v = eval(expr, ctx)?;
            match op {
                UnaryOp::Neg => Ok(ExprValue::Number(-v.as_f64()?)),
                UnaryOp::Not => Ok(ExprValue::Bool(!v.as_bool()?)),
            }
        }
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, ctx),
        Expr::Cond {
            cond,
            then,
            otherwise,
        } => {
            if eval(cond, ctx)?.as_bool()? {
                eval(then, ctx)
            } else {
                eval(otherwise, ctx)
            }
        }
        Expr::Call { func, args } => {
            let mut values = Vec::with_capacity(args.len());
            for a in args {
                values.push(eval(a, ctx)?.as_f64()?);
            }
            call_builtin(func, &values, ctx).map(ExprValue::Number)
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    ctx: &dyn ExprContext,
) -> Result<ExprValue, ExprError> {
    let numbers = || -> Result<(f64, f64), ExprError> {
        Ok((eval(left, ctx)?.as_f64()?, eval(right, ctx)?.as_f64()?))
    };

    let out = match op {
        // Right side is only evaluated when needed.
        BinaryOp::And => {
            ExprValue::Bool(eval(left, ctx)?.as_bool()? && eval(right, ctx)?.as_bool()?)
        }
        BinaryOp::Or => {
            ExprValue::Bool(eval(left, ctx)?.as_bool()? || eval(right, ctx)?.as_bool()?)
        }
        BinaryOp::Eq | BinaryOp::Ne => {
            let same = match (eval(left, ctx)?, eval(right, ctx)?) {
                (ExprValue::Bool(a), ExprValue::Bool(b)) => a == b,
                (a, b) => a.as_f64()? == b.as_f64()?,
            };
            ExprValue::Bool(if op == BinaryOp::Eq { same } else { !same })
        }
        BinaryOp::Lt => numbers().map(|(a, b)| ExprValue::Bool(a < b))?,
        BinaryOp::Le => numbers().map(|(a, b)| ExprValue::Bool(a <= b))?,
        BinaryOp::Gt => numbers().map(|(a, b)| ExprValue::Bool(a > b))?,
        BinaryOp::Ge => numbers().map(|(a, b)| ExprValue::Bool(a >= b))?,
        BinaryOp::Add => numbers().map(|(a, b)| ExprValue::Number(a + b))?,
        BinaryOp::Sub => numbers().map(|(a, b)| ExprValue::Number(a - b))?,
        BinaryOp::Mul => numbers().map(|(a, b)| ExprValue::Number(a * b))?,
        BinaryOp::Div => numbers().map(|(a, b)| ExprValue::Number(a / b))?,
        BinaryOp::Mod => numbers().map(|(a, b)| ExprValue::Number(a % b))?,
    };
    Ok(out)
}

fn arity(name: &str, args: &[f64], expected: usize) -> Result<(), ExprError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::eval(format!(
            "{name} expects {expected} arg{}",
            if expected == 1 { "" } else { "s" }
        )))
    }
}

fn call_builtin(name: &str, args: &[f64], ctx: &dyn ExprContext) -> Result<f64, ExprError> {
    let unary = |f: fn(f64) -> f64| -> Result<f64, ExprError> {
        arity(name, args, 1)?;
        Ok(f(args[0]))
    };

    match name {
        "abs" => unary(f64::abs),
        "sin" => unary(f64::sin),
        "cos" => unary(f64::cos),
        "tan" => unary(f64::tan),
        "sqrt" => unary(f64::sqrt),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "min" => {
            arity(name, args, 2)?;
            Ok(args[0].min(args[1]))
        }
        "max" => {
            arity(name, args, 2)?;
            Ok(args[0].max(args[1]))
        }
        "pow" => {
            arity(name, args, 2)?;
            Ok(args[0].powf(args[1]))
        }
        "clamp" => {
            arity(name, args, 3)?;
            if !(args[1] <= args[2]) {
                return Err(ExprError::eval("clamp expects lo <= hi"));
            }
            Ok(args[0].clamp(args[1], args[2]))
        }
        "lerp" => {
            arity(name, args, 3)?;
            Ok(args[0] + (args[1] - args[0]) * args[2])
        }
        "interpolate" => {
            let ease = match args.len() {
                3 => Ease::Linear,
                4 => Ease::from_code(args[3] as i64),
                _ => return Err(ExprError::eval("interpolate expects 3 or 4 args")),
            };
            Ok(interpolate_kind(ease, args[0], args[1], args[2]))
        }
        "progress" => {
            arity(name, args, 0)?;
            let w = ctx.window();
            Ok(clamp_progress((ctx.time() - w.start) / w.duration))
        }
        other => Err(ExprError::eval(format!("unknown function '{other}'"))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/interp.rs"]
mod tests;
