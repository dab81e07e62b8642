//! Inline arithmetic for queries such as `=2+2*3` or `12 / 4`.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | 'pi' | 'e' | '(' expr ')'
//! ```

use crate::error::{Error, Result};

const OPERATORS: &[char] = &['+', '-', '*', '/', '%', '^'];

#[derive(Debug, Clone, PartialEq)]
pub struct CalcResult {
    /// The expression as evaluated, without the leading `=`.
    pub expression: String,
    pub value: f64,
    pub formatted: String,
}

/// Whether a query should be handed to the calculator: either an explicit
/// `=` prefix, or a digit together with an operator character.
pub fn is_calc_query(query: &str) -> bool {
    let query = query.trim();
    if query.starts_with('=') {
        return true;
    }
    if query.chars().count() < 2 {
        return false;
    }

    query.chars().any(|c| c.is_ascii_digit()) && query.chars().any(|c| OPERATORS.contains(&c))
}

pub fn evaluate(input: &str) -> Result<CalcResult> {
    let expression = input.trim();
    let expression = expression.strip_prefix('=').unwrap_or(expression).trim();
    if expression.is_empty() {
        return Err(Error::Calculator("empty expression".to_string()));
    }

    let tokens = tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(Error::Calculator(format!("unexpected {token:?}")));
    }

    let formatted = format_number(value)?;
    Ok(CalcResult {
        expression: expression.to_string(),
        value,
        formatted,
    })
}

/// Integral values print without a fraction, everything else with at most
/// ten decimals and no trailing zeros.
pub fn format_number(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::Calculator("result is not a finite number".to_string()));
    }

    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Ok(format!("{}", value as i64));
    }

    let fixed = format!("{value:.10}");
    Ok(fixed.trim_end_matches('0').trim_end_matches('.').to_string())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
    Open,
    Close,
    Constant(f64),
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut end = start;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &expression[start..end];
                let number = literal
                    .parse::<f64>()
                    .map_err(|_| Error::Calculator(format!("bad number {literal}")))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() => {
                let mut end = start;
                while let Some(&(i, a)) = chars.peek() {
                    if a.is_alphanumeric() {
                        end = i + a.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let ident = &expression[start..end];
                let constant = match ident.to_lowercase().as_str() {
                    "pi" => std::f64::consts::PI,
                    "e" => std::f64::consts::E,
                    _ => return Err(Error::Calculator(format!("unknown identifier {ident}"))),
                };
                tokens.push(Token::Constant(constant));
            }
            '(' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ')' => {
                tokens.push(Token::Close);
                chars.next();
            }
            c if OPERATORS.contains(&c) => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            other => return Err(Error::Calculator(format!("unexpected character {other:?}"))),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, ops: &[char]) -> Option<char> {
        match self.peek() {
            Some(Token::Op(op)) if ops.contains(&op) => {
                self.pos += 1;
                Some(op)
            }
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        while let Some(op) = self.eat_op(&['+', '-']) {
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        while let Some(op) = self.eat_op(&['*', '/', '%']) {
            let rhs = self.unary()?;
            value = match op {
                '*' => value * rhs,
                '/' if rhs == 0.0 => return Err(Error::Calculator("division by zero".into())),
                '/' => value / rhs,
                _ => {
                    let divisor = rhs.trunc() as i64;
                    if divisor == 0 {
                        return Err(Error::Calculator("modulo by zero".into()));
                    }
                    (value.trunc() as i64)
                        .checked_rem(divisor)
                        .ok_or_else(|| Error::Calculator("modulo overflow".into()))?
                        as f64
                }
            };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64> {
        match self.eat_op(&['+', '-']) {
            Some('-') => Ok(-self.unary()?),
            Some(_) => self.unary(),
            None => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64> {
        let base = self.primary()?;
        if self.eat_op(&['^']).is_some() {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64> {
        match self.next() {
            Some(Token::Number(n) | Token::Constant(n)) => Ok(n),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(Error::Calculator("missing closing parenthesis".into())),
                }
            }
            Some(token) => Err(Error::Calculator(format!("unexpected {token:?}"))),
            None => Err(Error::Calculator("unexpected end of expression".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> String {
        evaluate(input).unwrap().formatted
    }

    #[test]
    fn detects_calculator_queries() {
        assert!(is_calc_query("=pi"));
        assert!(is_calc_query("2+2"));
        assert!(is_calc_query(" 10 % 3 "));
        assert!(!is_calc_query("notepad"));
        assert!(!is_calc_query("7"));
        assert!(!is_calc_query("+"));
        assert!(!is_calc_query("c++"), "operators without digits");
    }

    #[test]
    fn respects_precedence() {
        assert_eq!(eval("=2+2*3"), "8");
        assert_eq!(eval("(2+2)*3"), "12");
        assert_eq!(eval("10 - 4 - 3"), "3");
        assert_eq!(eval("2^3^2"), "512", "power is right associative");
        assert_eq!(eval("-2^2"), "-4");
        assert_eq!(eval("2*-3"), "-6");
    }

    #[test]
    fn formats_fractions() {
        assert_eq!(eval("1/4"), "0.25");
        assert_eq!(eval("1/3"), "0.3333333333");
        assert_eq!(eval("= 7 % 3"), "1");
        assert_eq!(eval("7.9 % 3.2"), "1");
        assert!(eval("pi").starts_with("3.14159265"));
    }

    #[test]
    fn rejects_invalid_expressions() {
        assert!(evaluate("=").is_err());
        assert!(evaluate("1/0").is_err());
        assert!(evaluate("5 % 0.5").is_err());
        assert!(evaluate("2+").is_err());
        assert!(evaluate("(1+2").is_err());
        assert!(evaluate("1 2").is_err());
        assert!(evaluate("foo+1").is_err());
        assert!(evaluate("10^400").is_err(), "overflow is not finite");
    }

    #[test]
    fn modulo_overflow_is_an_error() {
        assert!(evaluate("=-2^63 % -1").is_err());
        assert_eq!(eval("-7 % -1"), "0");
    }

    #[test]
    fn keeps_expression_without_prefix() {
        let result = evaluate("= 3 * 4").unwrap();
        assert_eq!(result.expression, "3 * 4");
        assert_eq!(result.value, 12.0);
    }
}
