//! Parsing of polynomial expressions over named variables.
//!
//! The accepted grammar is sums of products: `expr := term ('+' term)*`,
//! `term := factor ('*' factor)*`, `factor := name | '0' | '1'`. Names start
//! with a letter and continue with letters, digits and underscores.
//! Whitespace is insignificant. This is the expression language used by the
//! self-equivalence coefficient tables.

use {
    super::{Poly, VarSet},
    crate::error::Error,
};

/// Parse an expression, interning any new variable names into `vars`.
pub fn parse_poly(input: &str, vars: &mut VarSet) -> Result<Poly, Error> {
    let mut tokens = tokenize(input)?;
    tokens.reverse();
    let poly = parse_sum(&mut tokens, vars)?;
    if let Some(token) = tokens.pop() {
        return Err(malformed(format!("unexpected trailing {token:?}")));
    }
    Ok(poly)
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Plus,
    Star,
    Zero,
    One,
    Name(String),
}

fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' => {}
            '+' => tokens.push(Token::Plus),
            '*' => tokens.push(Token::Star),
            '0' => tokens.push(Token::Zero),
            '1' => tokens.push(Token::One),
            c if c.is_ascii_alphabetic() => {
                let mut name = String::from(c);
                while let Some(c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '_' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(name));
            }
            c => return Err(malformed(format!("unexpected character {c:?}"))),
        }
    }
    Ok(tokens)
}

fn parse_sum(tokens: &mut Vec<Token>, vars: &mut VarSet) -> Result<Poly, Error> {
    let mut sum = parse_product(tokens, vars)?;
    while tokens.last() == Some(&Token::Plus) {
        tokens.pop();
        sum = sum.add(&parse_product(tokens, vars)?);
    }
    Ok(sum)
}

fn parse_product(tokens: &mut Vec<Token>, vars: &mut VarSet) -> Result<Poly, Error> {
    let mut product = parse_factor(tokens, vars)?;
    while tokens.last() == Some(&Token::Star) {
        tokens.pop();
        product = product.mul(&parse_factor(tokens, vars)?);
    }
    Ok(product)
}

fn parse_factor(tokens: &mut Vec<Token>, vars: &mut VarSet) -> Result<Poly, Error> {
    match tokens.pop() {
        Some(Token::Zero) => Ok(Poly::zero()),
        Some(Token::One) => Ok(Poly::one()),
        Some(Token::Name(name)) => Ok(Poly::variable(vars.intern(&name))),
        Some(token) => Err(malformed(format!("unexpected {token:?}"))),
        None => Err(malformed("unexpected end of expression".into())),
    }
}

fn malformed(detail: String) -> Error {
    Error::InvalidCoefficients(format!("malformed expression: {detail}"))
}
