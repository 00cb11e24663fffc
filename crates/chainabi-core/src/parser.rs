//! Type descriptor parser.
//!
//! Grammar (whitespace allowed around tokens):
//!
//! ```text
//! type   := base ( "[" digits? "]" )*
//! base   := tuple | "tuple" tuple | elementary
//! tuple  := "(" field ( "," field )* ")"
//! field  := type ident?
//! ```
//!
//! The rightmost bracket is the outermost dimension: `uint8[2][3]` is an
//! array of three `uint8[2]`.

use crate::error::AbiError;
use crate::types::{TupleField, TypeNode, MAX_TYPE_DEPTH};

/// Parse a type descriptor such as `uint256`, `bytes10`, `bool[]` or
/// `(uint256 value,string key)` into a validated `TypeNode`.
pub fn parse(descriptor: &str) -> Result<TypeNode, AbiError> {
    let mut p = Parser {
        src: descriptor,
        pos: 0,
    };
    p.skip_ws();
    let ty = p.parse_type(1)?;
    p.skip_ws();
    if p.pos != p.src.len() {
        return Err(p.error(format!("unexpected '{}'", &p.src[p.pos..])));
    }
    Ok(ty)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: impl Into<String>) -> AbiError {
        AbiError::ty(self.src, reason)
    }

    /// Re-tag errors from `TypeNode` construction with the full descriptor.
    fn node(&self, built: Result<TypeNode, AbiError>) -> Result<TypeNode, AbiError> {
        built.map_err(|e| match e {
            AbiError::Type { reason, .. } => self.error(reason),
            other => other,
        })
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), AbiError> {
        self.skip_ws();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!(
                "expected '{}' at position {}",
                byte as char, self.pos
            )))
        }
    }

    /// Consume a run of bytes matching `pred`.
    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if pred(b)) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeNode, AbiError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(self.error(format!(
                "nesting depth exceeds the maximum of {MAX_TYPE_DEPTH}"
            )));
        }
        self.skip_ws();

        let mut ty = if self.peek() == Some(b'(') {
            self.parse_tuple(depth)?
        } else if self.rest().starts_with("tuple") && self.rest()[5..].trim_start().starts_with('(') {
            self.pos += "tuple".len();
            self.skip_ws();
            self.parse_tuple(depth)?
        } else {
            let ident = self.take_while(|b| b.is_ascii_alphanumeric());
            if ident.is_empty() {
                return Err(self.error(format!("expected a type at position {}", self.pos)));
            }
            self.node(elementary(ident))?
        };

        loop {
            self.skip_ws();
            if self.peek() != Some(b'[') {
                break;
            }
            self.pos += 1;
            self.skip_ws();
            let digits = self.take_while(|b| b.is_ascii_digit());
            self.expect(b']')?;
            ty = if digits.is_empty() {
                self.node(TypeNode::array(ty))?
            } else {
                let len: usize = digits
                    .parse()
                    .map_err(|_| self.error(format!("array length '{digits}' is too large")))?;
                self.node(TypeNode::fixed_array(ty, len))?
            };
        }

        Ok(ty)
    }

    fn parse_tuple(&mut self, depth: usize) -> Result<TypeNode, AbiError> {
        self.expect(b'(')?;
        self.skip_ws();
        if self.peek() == Some(b')') {
            return Err(self.error("tuple must have at least one component"));
        }

        let mut fields = Vec::new();
        loop {
            let ty = self.parse_type(depth + 1)?;
            self.skip_ws();
            let name = match self.peek() {
                Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => Some(
                    self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
                        .to_string(),
                ),
                _ => None,
            };
            fields.push(TupleField::new(name, ty));

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    return Err(self.error(format!(
                        "expected ',' or ')' at position {}",
                        self.pos
                    )))
                }
                None => return Err(self.error("unbalanced parentheses")),
            }
        }

        self.node(TypeNode::tuple(fields))
    }
}

/// Resolve an elementary type name, including the legacy aliases.
fn elementary(name: &str) -> Result<TypeNode, AbiError> {
    match name {
        "address" => return Ok(TypeNode::address()),
        "bool" => return Ok(TypeNode::bool()),
        "string" => return Ok(TypeNode::string()),
        "bytes" => return Ok(TypeNode::bytes()),
        "function" => return Ok(TypeNode::function()),
        "byte" => return TypeNode::fixed_bytes(1),
        "uint" => return TypeNode::uint(256),
        "int" => return TypeNode::int(256),
        "fixed" => return TypeNode::fixed(128, 18, true),
        "ufixed" => return TypeNode::fixed(128, 18, false),
        _ => {}
    }

    let unknown = || AbiError::ty(name, "unknown type");

    if let Some(rest) = name.strip_prefix("ufixed") {
        let (bits, scale) = fixed_params(rest).ok_or_else(unknown)?;
        return TypeNode::fixed(bits, scale, false);
    }
    if let Some(rest) = name.strip_prefix("fixed") {
        let (bits, scale) = fixed_params(rest).ok_or_else(unknown)?;
        return TypeNode::fixed(bits, scale, true);
    }
    if let Some(rest) = name.strip_prefix("uint") {
        return TypeNode::uint(number(rest).ok_or_else(unknown)?);
    }
    if let Some(rest) = name.strip_prefix("int") {
        return TypeNode::int(number(rest).ok_or_else(unknown)?);
    }
    if let Some(rest) = name.strip_prefix("bytes") {
        let n = number(rest).ok_or_else(unknown)?;
        let n = u8::try_from(n).map_err(|_| AbiError::ty(name, "fixed byte length must be within 1..=32"))?;
        return TypeNode::fixed_bytes(n);
    }

    Err(unknown())
}

/// Decimal number without sign or leading zeros, small enough for a width.
fn number(s: &str) -> Option<u16> {
    if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// `<bits>x<scale>` suffix of a fixed-point type name.
fn fixed_params(s: &str) -> Option<(u16, u8)> {
    let (bits, scale) = s.split_once('x')?;
    let bits = number(bits)?;
    let scale = u8::try_from(number(scale)?).ok()?;
    Some((bits, scale))
}
