//! Lowering of [`Expr`] trees into slot-addressed evaluation trees.

use std::fmt;

use super::parser::Expr;
use crate::error::{EvalError, FormulaError};

/// Built-in function library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Cbrt,
    Abs,
    Exp,
    /// Natural logarithm, or `log(x, base)` with two arguments.
    Log,
    Ln,
    Log10,
    Log2,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
    Sign,
    Min,
    Max,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        use Function::*;
        Some(match name {
            "sqrt" => Sqrt,
            "cbrt" => Cbrt,
            "abs" => Abs,
            "exp" => Exp,
            "log" => Log,
            "ln" => Ln,
            "log10" => Log10,
            "log2" => Log2,
            "sin" => Sin,
            "cos" => Cos,
            "tan" => Tan,
            "asin" => Asin,
            "acos" => Acos,
            "atan" => Atan,
            "sinh" => Sinh,
            "cosh" => Cosh,
            "tanh" => Tanh,
            "floor" => Floor,
            "ceil" => Ceil,
            "round" => Round,
            "sign" => Sign,
            "min" => Min,
            "max" => Max,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use Function::*;
        match self {
            Sqrt => "sqrt",
            Cbrt => "cbrt",
            Abs => "abs",
            Exp => "exp",
            Log => "log",
            Ln => "ln",
            Log10 => "log10",
            Log2 => "log2",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Asin => "asin",
            Acos => "acos",
            Atan => "atan",
            Sinh => "sinh",
            Cosh => "cosh",
            Tanh => "tanh",
            Floor => "floor",
            Ceil => "ceil",
            Round => "round",
            Sign => "sign",
            Min => "min",
            Max => "max",
        }
    }

    pub(crate) fn check_arity(self, got: usize) -> Result<(), FormulaError> {
        let (ok, expected) = match self {
            Function::Log => ((1..=2).contains(&got), "1 or 2"),
            Function::Min | Function::Max => (got >= 1, "at least 1"),
            _ => (got == 1, "1"),
        };
        if ok {
            Ok(())
        } else {
            Err(FormulaError::Arity {
                name: self.name(),
                expected,
                got,
            })
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        use Function::*;
        let x = args[0];
        match self {
            Sqrt => x.sqrt(),
            Cbrt => x.cbrt(),
            Abs => x.abs(),
            Exp => x.exp(),
            Log => match args.get(1) {
                Some(base) => x.ln() / base.ln(),
                None => x.ln(),
            },
            Ln => x.ln(),
            Log10 => x.log10(),
            Log2 => x.log2(),
            Sin => x.sin(),
            Cos => x.cos(),
            Tan => x.tan(),
            Asin => x.asin(),
            Acos => x.acos(),
            Atan => x.atan(),
            Sinh => x.sinh(),
            Cosh => x.cosh(),
            Tanh => x.tanh(),
            Floor => x.floor(),
            Ceil => x.ceil(),
            Round => x.round(),
            Sign => {
                if x == 0.0 {
                    0.0
                } else {
                    x.signum()
                }
            }
            Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(f64),
    Var(usize),
    Neg([Box<Node>; 1]),
    Add([Box<Node>; 2]),
    Sub([Box<Node>; 2]),
    Mul([Box<Node>; 2]),
    Div([Box<Node>; 2]),
    Pow([Box<Node>; 2]),
    Call(Function, Vec<Node>),
}

impl Node {
    fn lower(expr: &Expr, slots: &mut Vec<String>) -> Node {
        let pair = |l: &Expr, r: &Expr, slots: &mut Vec<String>| {
            [
                Box::new(Node::lower(l, slots)),
                Box::new(Node::lower(r, slots)),
            ]
        };
        match expr {
            Expr::Number(v) => Node::Const(*v),
            Expr::Variable(name) => {
                let slot = match slots.iter().position(|s| s == name) {
                    Some(slot) => slot,
                    None => {
                        slots.push(name.clone());
                        slots.len() - 1
                    }
                };
                Node::Var(slot)
            }
            Expr::Neg(inner) => Node::Neg([Box::new(Node::lower(inner, slots))]),
            Expr::Add(l, r) => Node::Add(pair(l, r, slots)),
            Expr::Sub(l, r) => Node::Sub(pair(l, r, slots)),
            Expr::Mul(l, r) => Node::Mul(pair(l, r, slots)),
            Expr::Div(l, r) => Node::Div(pair(l, r, slots)),
            Expr::Pow(l, r) => Node::Pow(pair(l, r, slots)),
            Expr::Call(func, args) => {
                Node::Call(*func, args.iter().map(|a| Node::lower(a, slots)).collect())
            }
        }
    }

    fn eval(&self, values: &[f64]) -> Result<f64, EvalError> {
        use Node::*;
        match self {
            Const(v) => Ok(*v),
            Var(slot) => values
                .get(*slot)
                .copied()
                .ok_or(EvalError::UnboundVariable(*slot)),
            Neg([c0]) => Ok(-c0.eval(values)?),
            Add([c0, c1]) => Ok(c0.eval(values)? + c1.eval(values)?),
            Sub([c0, c1]) => Ok(c0.eval(values)? - c1.eval(values)?),
            Mul([c0, c1]) => Ok(c0.eval(values)? * c1.eval(values)?),
            Div([c0, c1]) => {
                let numerator = c0.eval(values)?;
                let divisor = c1.eval(values)?;
                if divisor == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                Ok(numerator / divisor)
            }
            Pow([c0, c1]) => real(c0.eval(values)?.powf(c1.eval(values)?)),
            Call(func, args) => {
                let args = args
                    .iter()
                    .map(|a| a.eval(values))
                    .collect::<Result<Vec<_>, _>>()?;
                real(func.apply(&args))
            }
        }
    }
}

fn real(v: f64) -> Result<f64, EvalError> {
    if v.is_nan() {
        Err(EvalError::NonReal)
    } else {
        Ok(v)
    }
}

/// An expression lowered for repeated evaluation.
///
/// Free variables are numbered in first-occurrence order; evaluation reads
/// slot `i` from the `i`-th entry of the value slice.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    expr: Expr,
    root: Node,
    variables: Vec<String>,
}

impl CompiledFormula {
    pub fn compile(expr: Expr) -> Self {
        let mut variables = Vec::new();
        let root = Node::lower(&expr, &mut variables);
        Self {
            expr,
            root,
            variables,
        }
    }

    /// Free variable names in first-occurrence order, without duplicates.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates with `values[i]` bound to `variables()[i]`.
    pub fn eval(&self, values: &[f64]) -> Result<f64, EvalError> {
        real(self.root.eval(values)?)
    }
}

impl fmt::Display for CompiledFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.expr.fmt(f)
    }
}
