/// Restricted arithmetic expressions over `x`, `pi` and `e`
use std::f64::consts::{E, PI};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric0, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::ErrorKind,
    multi::{fold_many0, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// Deepest nesting of parentheses, signs and exponents accepted by the parser.
pub const MAX_DEPTH: usize = 64;

/// Longest source text accepted by the parser, in bytes.
pub const MAX_SOURCE_LEN: usize = 1024;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("cannot parse expression: {0:?}")]
    Parse(String),

    #[error("expression is longer than {} bytes", MAX_SOURCE_LEN)]
    TooLong,

    #[error("expression is nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{name} expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("argument outside the domain of {0}")]
    Domain(String),

    #[error("result is not a finite number")]
    NotFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinOp {
    fn from_symbol(symbol: char) -> Self {
        match symbol {
            '+' => BinOp::Add,
            '-' => BinOp::Sub,
            '*' => BinOp::Mul,
            '/' => BinOp::Div,
            '%' => BinOp::Rem,
            _ => BinOp::Pow,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> Result<f64, ExprError> {
        let value = match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div if rhs == 0.0 => return Err(ExprError::DivisionByZero),
            BinOp::Div => lhs / rhs,
            BinOp::Rem if rhs == 0.0 => return Err(ExprError::DivisionByZero),
            // Floored modulo: the result takes the sign of the divisor
            BinOp::Rem => lhs - rhs * (lhs / rhs).floor(),
            BinOp::Pow => lhs.powf(rhs),
        };
        finite(value)
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ident(String),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        if source.len() > MAX_SOURCE_LEN {
            return Err(ExprError::TooLong);
        }
        match all_consuming(ws(|i| expr(i, 0)))(source) {
            Ok((_, parsed)) => Ok(parsed),
            Err(nom::Err::Failure(err)) if err.code == ErrorKind::TooLarge => Err(ExprError::TooDeep),
            Err(_) => Err(ExprError::Parse(source.to_string())),
        }
    }

    /// Evaluate with `x` bound to a value.
    pub fn eval_at(&self, x: f64) -> Result<f64, ExprError> {
        self.eval(Some(x))
    }

    /// Evaluate an expression that may only use constants.
    pub fn eval_const(&self) -> Result<f64, ExprError> {
        self.eval(None)
    }

    fn eval(&self, x: Option<f64>) -> Result<f64, ExprError> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Ident(name) => match name.as_str() {
                "x" => x.ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
                "pi" => Ok(PI),
                "e" => Ok(E),
                _ => Err(ExprError::UnknownIdentifier(name.clone())),
            },
            Expr::Neg(inner) => Ok(-inner.eval(x)?),
            Expr::Binary(op, lhs, rhs) => op.apply(lhs.eval(x)?, rhs.eval(x)?),
            Expr::Call(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(x))
                    .collect::<Result<Vec<_>, _>>()?;
                call(name, &values)
            }
        }
    }
}

/// Parse and evaluate a constant expression such as `pi/2`.
pub fn eval_const_str(source: &str) -> Result<f64, ExprError> {
    Expr::parse(source)?.eval_const()
}

fn finite(value: f64) -> Result<f64, ExprError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NotFinite)
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, ExprError> {
    let unary: Option<fn(f64) -> f64> = match name {
        "sin" => Some(f64::sin),
        "cos" => Some(f64::cos),
        "tan" => Some(f64::tan),
        "asin" => Some(f64::asin),
        "acos" => Some(f64::acos),
        "atan" => Some(f64::atan),
        "sinh" => Some(f64::sinh),
        "cosh" => Some(f64::cosh),
        "tanh" => Some(f64::tanh),
        "sqrt" => Some(f64::sqrt),
        "exp" => Some(f64::exp),
        "ln" | "log" => Some(f64::ln),
        "log10" => Some(f64::log10),
        "log2" => Some(f64::log2),
        "abs" => Some(f64::abs),
        "floor" => Some(f64::floor),
        "ceil" => Some(f64::ceil),
        "round" => Some(f64::round),
        _ => None,
    };
    let binary: Option<fn(f64, f64) -> f64> = match name {
        "pow" => Some(f64::powf),
        "atan2" => Some(f64::atan2),
        "min" => Some(f64::min),
        "max" => Some(f64::max),
        _ => None,
    };

    let value = match (unary, binary) {
        (Some(f), _) => {
            arity(name, args, 1)?;
            f(args[0])
        }
        (_, Some(f)) => {
            arity(name, args, 2)?;
            f(args[0], args[1])
        }
        _ => return Err(ExprError::UnknownFunction(name.to_string())),
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::Domain(name.to_string()))
    }
}

fn arity(name: &str, args: &[f64], expected: usize) -> Result<(), ExprError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ExprError::Arity {
            name: name.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> IResult<&str, Expr> {
    map_res(
        recognize(tuple((
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |text: &str| text.parse::<f64>().map(Expr::Number),
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, alphanumeric0))(input)
}

fn call_or_ident(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, name) = identifier(input)?;
    let (input, args) = opt(delimited(
        ws(char('(')),
        separated_list0(char(','), ws(|i| expr(i, depth))),
        char(')'),
    ))(input)?;
    let node = match args {
        Some(args) => Expr::Call(name.to_string(), args),
        None => Expr::Ident(name.to_string()),
    };
    Ok((input, node))
}

fn atom(input: &str, depth: usize) -> IResult<&str, Expr> {
    ws(alt((
        number,
        |i| call_or_ident(i, depth),
        delimited(char('('), ws(|i| expr(i, depth)), char(')')),
    )))(input)
}

/// Right-associative; the exponent may carry its own sign (`2^-1`).
fn power(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, base) = atom(input, depth)?;
    let (input, exponent) = opt(preceded(
        ws(alt((tag("**"), tag("^")))),
        |i| unary(i, depth),
    ))(input)?;
    let node = match exponent {
        Some(exponent) => Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)),
        None => base,
    };
    Ok((input, node))
}

/// Every level of nesting passes through here, so this is where depth is counted.
fn unary(input: &str, depth: usize) -> IResult<&str, Expr> {
    if depth >= MAX_DEPTH {
        return Err(nom::Err::Failure(nom::error::Error::new(input, ErrorKind::TooLarge)));
    }
    let depth = depth + 1;
    alt((
        map(preceded(ws(char('-')), move |i| unary(i, depth)), |inner| {
            Expr::Neg(Box::new(inner))
        }),
        preceded(ws(char('+')), move |i| unary(i, depth)),
        move |i| power(i, depth),
    ))(input)
}

fn term(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = unary(input, depth)?;
    fold_many0(
        pair(ws(one_of("*/%")), |i| unary(i, depth)),
        move || first.clone(),
        |lhs, (op, rhs)| Expr::Binary(BinOp::from_symbol(op), Box::new(lhs), Box::new(rhs)),
    )(input)
}

fn expr(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, first) = term(input, depth)?;
    fold_many0(
        pair(ws(one_of("+-")), |i| term(i, depth)),
        move || first.clone(),
        |lhs, (op, rhs)| Expr::Binary(BinOp::from_symbol(op), Box::new(lhs), Box::new(rhs)),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn at(source: &str, x: f64) -> Result<f64, ExprError> {
        Expr::parse(source)?.eval_at(x)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval_const_str("1 + 2 * 3").unwrap(), 7.0);
        assert_eq!(eval_const_str("(1 + 2) * 3").unwrap(), 9.0);
        assert_eq!(eval_const_str("10 - 4 - 3").unwrap(), 3.0);
        assert_eq!(eval_const_str("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(eval_const_str("2 ** 3").unwrap(), 8.0);
        assert_eq!(eval_const_str("-2 ^ 2").unwrap(), -4.0);
        assert_eq!(eval_const_str("2 ^ -1").unwrap(), 0.5);
        assert_eq!(eval_const_str("7 % 3").unwrap(), 1.0);
        assert_eq!(eval_const_str("-7 % 3").unwrap(), 2.0);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(eval_const_str("1.5").unwrap(), 1.5);
        assert_eq!(eval_const_str(".25").unwrap(), 0.25);
        assert_eq!(eval_const_str("2e3").unwrap(), 2000.0);
        assert_eq!(eval_const_str("  3  ").unwrap(), 3.0);
    }

    #[test]
    fn test_constants_and_functions() {
        assert_relative_eq!(eval_const_str("pi/2").unwrap(), PI / 2.0);
        assert_relative_eq!(eval_const_str("2*e").unwrap(), 2.0 * E);
        assert_relative_eq!(at("sin(x)", PI / 2.0).unwrap(), 1.0);
        assert_relative_eq!(at("pow(x, 2) + max(1, x)", 3.0).unwrap(), 12.0);
        assert_relative_eq!(at("sqrt( abs(x) )", -16.0).unwrap(), 4.0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(at("4/(1-x)", 0.0), Ok(4.0));
        assert_eq!(at("4/(1-x)", 1.0), Err(ExprError::DivisionByZero));
        assert_eq!(at("x % 0", 1.0), Err(ExprError::DivisionByZero));
    }

    #[test]
    fn test_domain_errors() {
        assert_eq!(at("sqrt(x)", -1.0), Err(ExprError::Domain("sqrt".into())));
        assert_eq!(at("log(x)", 0.0), Err(ExprError::Domain("log".into())));
        assert_eq!(at("x ^ 0.5", -4.0), Err(ExprError::NotFinite));
    }

    #[test]
    fn test_rejected_input() {
        assert!(matches!(Expr::parse("1 +"), Err(ExprError::Parse(_))));
        assert!(matches!(Expr::parse("2 3"), Err(ExprError::Parse(_))));
        assert!(matches!(Expr::parse(""), Err(ExprError::Parse(_))));
        assert_eq!(eval_const_str("x + 1"), Err(ExprError::UnknownIdentifier("x".into())));
        assert_eq!(
            eval_const_str("system(1)"),
            Err(ExprError::UnknownFunction("system".into()))
        );
        assert_eq!(
            eval_const_str("sin(1, 2)"),
            Err(ExprError::Arity {
                name: "sin".into(),
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let shallow = format!("{}x{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(at(&shallow, 2.0), Ok(2.0));

        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert_eq!(Expr::parse(&deep), Err(ExprError::TooDeep));
        assert_eq!(Expr::parse(&format!("{}1", "-".repeat(500))), Err(ExprError::TooDeep));
        assert_eq!(Expr::parse(&format!("{}2", "2^".repeat(500))), Err(ExprError::TooDeep));
    }

    #[test]
    fn test_length_limit() {
        let huge = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
        assert_eq!(Expr::parse(&huge), Err(ExprError::TooLong));

        let long_sum = vec!["1"; 300].join("+");
        assert_eq!(eval_const_str(&long_sum), Ok(300.0));
    }
}
