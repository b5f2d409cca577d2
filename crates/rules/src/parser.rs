//! Condition expression parser and evaluator.
//!
//! ```text
//! intensity >= 7
//! nivel == 3 && intensidade > 5
//! !(level < 2) or intensity >= 9
//! ```
//!
//! Grammar (informal):
//! ```text
//! expr     = and (("||" | "or") and)*
//! and      = unary (("&&" | "and") unary)*
//! unary    = ("!" | "not") unary | primary
//! primary  = "(" expr ")" | "true" | "false" | operand [OP operand]
//! operand  = VARIABLE | NUMBER
//! VARIABLE = "intensity" | "intensidade" | "level" | "nivel"
//! OP       = "==" | "===" | "!=" | "!==" | ">" | "<" | ">=" | "<="
//! ```
//!
//! A bare operand is true when non-zero.

use eco_core::RuleError;

/// A parsed condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Literal(bool),
    Compare(Comparison),
    /// A lone operand, true when non-zero.
    Truthy(Operand),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Operand,
    pub op: CmpOp,
    pub right: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Var(Variable),
    Num(f64),
}

/// The only two names an expression may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    /// Intensity of the first selected memory (0 when none).
    Intensity,
    /// Current openness level, 1–3.
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
}

/// Values bound to the two variables for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bindings {
    pub intensity: f64,
    pub level: f64,
}

impl Bindings {
    pub fn new(intensity: f64, level: f64) -> Self {
        Self { intensity, level }
    }

    fn get(&self, var: Variable) -> f64 {
        match var {
            Variable::Intensity => self.intensity,
            Variable::Level => self.level,
        }
    }
}

impl Condition {
    /// Evaluate this condition with the given bindings.
    pub fn evaluate(&self, bindings: &Bindings) -> bool {
        match self {
            Condition::Literal(b) => *b,
            Condition::Compare(cmp) => cmp.evaluate(bindings),
            Condition::Truthy(operand) => operand.resolve(bindings) != 0.0,
            Condition::And(a, b) => a.evaluate(bindings) && b.evaluate(bindings),
            Condition::Or(a, b) => a.evaluate(bindings) || b.evaluate(bindings),
            Condition::Not(inner) => !inner.evaluate(bindings),
        }
    }
}

impl Comparison {
    fn evaluate(&self, bindings: &Bindings) -> bool {
        let l = self.left.resolve(bindings);
        let r = self.right.resolve(bindings);
        match self.op {
            CmpOp::Eq => (l - r).abs() < f64::EPSILON,
            CmpOp::NotEq => (l - r).abs() >= f64::EPSILON,
            CmpOp::Gt => l > r,
            CmpOp::Lt => l < r,
            CmpOp::Gte => l >= r,
            CmpOp::Lte => l <= r,
        }
    }
}

impl Operand {
    fn resolve(&self, bindings: &Bindings) -> f64 {
        match self {
            Operand::Var(v) => bindings.get(*v),
            Operand::Num(n) => *n,
        }
    }
}

/// Parse and evaluate in one step.
pub fn evaluate(input: &str, bindings: Bindings) -> Result<bool, RuleError> {
    Ok(parse_condition(input)?.evaluate(&bindings))
}

// ─── Parser ──────────────────────────────────────────────────────────

/// Parse a condition expression string into a [`Condition`] tree.
///
/// A blank expression is an error: a rule that says nothing never activates
/// its module.
pub fn parse_condition(input: &str) -> Result<Condition, RuleError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(RuleError::Empty);
    }
    let tokens = tokenize(input)?;
    let parse_error = |detail: String| RuleError::Parse {
        expression: input.to_string(),
        detail,
    };
    let (cond, rest) = parse_or(&tokens).map_err(parse_error)?;
    if !rest.is_empty() {
        return Err(parse_error(format!(
            "unexpected tokens after expression: {rest:?}"
        )));
    }
    Ok(cond)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Var(Variable),
    Cmp(CmpOp),
    And,
    Or,
    Not,
    True,
    False,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, RuleError> {
    let fail = |detail: String| RuleError::Parse {
        expression: input.to_string(),
        detail,
    };
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '>' | '<' => {
                chars.next();
                let or_equal = chars.next_if_eq(&'=').is_some();
                tokens.push(Token::Cmp(match (c, or_equal) {
                    ('>', true) => CmpOp::Gte,
                    ('>', false) => CmpOp::Gt,
                    (_, true) => CmpOp::Lte,
                    (_, false) => CmpOp::Lt,
                }));
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(fail("assignment '=' is not a comparison".into()));
                }
                chars.next_if_eq(&'=');
                tokens.push(Token::Cmp(CmpOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    chars.next_if_eq(&'=');
                    tokens.push(Token::Cmp(CmpOp::NotEq));
                } else {
                    tokens.push(Token::Not);
                }
            }
            '&' | '|' => {
                chars.next();
                if chars.next_if_eq(&c).is_none() {
                    return Err(fail(format!("expected '{c}{c}'")));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            _ if c.is_ascii_digit() || c == '.' || c == '-' => {
                let mut num_str = String::new();
                num_str.push(c);
                chars.next();
                while let Some(nc) = chars.next_if(|nc| nc.is_ascii_digit() || *nc == '.') {
                    num_str.push(nc);
                }
                match num_str.parse::<f64>() {
                    Ok(n) => tokens.push(Token::Num(n)),
                    Err(_) => return Err(fail(format!("invalid number: {num_str}"))),
                }
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(wc) = chars.next_if(|wc| wc.is_alphanumeric() || *wc == '_') {
                    word.push(wc);
                }
                let token = match eco_core::normalize(&word).as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::True,
                    "false" => Token::False,
                    "intensity" | "intensidade" => Token::Var(Variable::Intensity),
                    "level" | "nivel" => Token::Var(Variable::Level),
                    _ => return Err(RuleError::UnknownVariable(word)),
                };
                tokens.push(token);
            }
            _ => return Err(fail(format!("unexpected character: {c}"))),
        }
    }

    Ok(tokens)
}

fn parse_or(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    let (mut left, mut rest) = parse_and(tokens)?;
    while rest.first() == Some(&Token::Or) {
        let (right, remaining) = parse_and(&rest[1..])?;
        left = Condition::Or(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_and(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    let (mut left, mut rest) = parse_unary(tokens)?;
    while rest.first() == Some(&Token::And) {
        let (right, remaining) = parse_unary(&rest[1..])?;
        left = Condition::And(Box::new(left), Box::new(right));
        rest = remaining;
    }
    Ok((left, rest))
}

fn parse_unary(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    if tokens.first() == Some(&Token::Not) {
        let (inner, rest) = parse_unary(&tokens[1..])?;
        return Ok((Condition::Not(Box::new(inner)), rest));
    }
    parse_primary(tokens)
}

fn parse_primary(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    match tokens.first() {
        Some(Token::LParen) => {
            let (inner, rest) = parse_or(&tokens[1..])?;
            if rest.first() != Some(&Token::RParen) {
                return Err("expected closing parenthesis".into());
            }
            Ok((inner, &rest[1..]))
        }
        Some(Token::True) => Ok((Condition::Literal(true), &tokens[1..])),
        Some(Token::False) => Ok((Condition::Literal(false), &tokens[1..])),
        _ => parse_comparison(tokens),
    }
}

fn parse_comparison(tokens: &[Token]) -> Result<(Condition, &[Token]), String> {
    let (left, rest) = parse_operand(tokens)?;
    let Some(Token::Cmp(op)) = rest.first() else {
        return Ok((Condition::Truthy(left), rest));
    };
    let (right, rest) = parse_operand(&rest[1..])?;
    Ok((
        Condition::Compare(Comparison {
            left,
            op: *op,
            right,
        }),
        rest,
    ))
}

fn parse_operand(tokens: &[Token]) -> Result<(Operand, &[Token]), String> {
    match tokens.first() {
        Some(Token::Var(v)) => Ok((Operand::Var(*v), &tokens[1..])),
        Some(Token::Num(n)) => Ok((Operand::Num(*n), &tokens[1..])),
        other => Err(format!("expected variable or number, got {other:?}")),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
