//! The ABI type system.
//!
//! A `TypeNode` is the canonical, immutable description of one ABI type.
//! Its static/dynamic classification and head width are computed once when
//! the node is built and never recomputed during decoding.

use crate::error::AbiError;
use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Size in bytes of one ABI word.
pub const WORD_SIZE: usize = 32;

/// Maximum nesting depth of a type tree (arrays and tuples each add a level).
pub const MAX_TYPE_DEPTH: usize = 32;

/// Maximum fixed-point scale accepted by the ABI.
pub const MAX_FIXED_SCALE: u8 = 80;

/// Width in bytes of the `function` type (address ++ selector).
pub const FUNCTION_SIZE: usize = 24;

/// The shape of an ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    // --- Scalars, one word each ---
    /// Unsigned integer. Width in bits.
    Uint(u16),
    /// Two's-complement signed integer. Width in bits.
    Int(u16),
    Bool,
    /// 20-byte account address, right-aligned in its word.
    Address,
    /// `bytes1` .. `bytes32`, left-aligned in its word.
    FixedBytes(u8),
    /// 24-byte function reference, left-aligned in its word.
    Function,
    /// Fixed-point decimal: `raw / 10^scale`.
    Fixed { bits: u16, scale: u8, signed: bool },

    // --- Dynamic byte sequences ---
    Bytes,
    String,

    // --- Composites ---
    FixedArray { element: Box<TypeNode>, len: usize },
    Array(Box<TypeNode>),
    Tuple(Vec<TupleField>),
}

/// One component of a tuple type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleField {
    pub name: Option<String>,
    pub ty: TypeNode,
}

impl TupleField {
    pub fn new(name: Option<String>, ty: TypeNode) -> Self {
        Self { name, ty }
    }

    pub fn unnamed(ty: TypeNode) -> Self {
        Self { name: None, ty }
    }
}

/// A validated ABI type with its layout memoized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeNode {
    kind: TypeKind,
    /// `Some(words)` for static types, `None` for dynamic ones.
    static_words: Option<usize>,
    depth: usize,
}

impl TypeNode {
    /// Validate `kind` and compute its layout.
    pub fn new(kind: TypeKind) -> Result<Self, AbiError> {
        let (static_words, depth) = match &kind {
            TypeKind::Uint(bits) | TypeKind::Int(bits) => {
                check_int_bits(*bits).map_err(|r| AbiError::ty(kind_name(&kind), r))?;
                (Some(1), 1)
            }
            TypeKind::Fixed { bits, scale, .. } => {
                check_int_bits(*bits).map_err(|r| AbiError::ty(kind_name(&kind), r))?;
                check_fixed_scale(*bits, *scale).map_err(|r| AbiError::ty(kind_name(&kind), r))?;
                (Some(1), 1)
            }
            TypeKind::FixedBytes(n) => {
                if *n == 0 || *n as usize > WORD_SIZE {
                    return Err(AbiError::ty(
                        kind_name(&kind),
                        "fixed byte length must be within 1..=32",
                    ));
                }
                (Some(1), 1)
            }
            TypeKind::Bool | TypeKind::Address | TypeKind::Function => (Some(1), 1),
            TypeKind::Bytes | TypeKind::String => (None, 1),
            TypeKind::FixedArray { element, len } => {
                let words = match element.static_words {
                    Some(w) => Some(w.checked_mul(*len).ok_or_else(|| {
                        AbiError::ty(kind_name(&kind), "fixed array is too large")
                    })?),
                    None => None,
                };
                (words, element.depth + 1)
            }
            TypeKind::Array(element) => (None, element.depth + 1),
            TypeKind::Tuple(fields) => {
                if fields.is_empty() {
                    return Err(AbiError::ty("()", "tuple must have at least one component"));
                }
                check_unique_names(fields)?;
                let mut words = Some(0usize);
                for f in fields {
                    words = match (words, f.ty.static_words) {
                        (Some(acc), Some(w)) => Some(acc.checked_add(w).ok_or_else(|| {
                            AbiError::ty(kind_name(&kind), "tuple is too large")
                        })?),
                        _ => None,
                    };
                }
                let depth = fields.iter().map(|f| f.ty.depth).max().unwrap_or(0) + 1;
                (words, depth)
            }
        };

        if depth > MAX_TYPE_DEPTH {
            return Err(AbiError::ty(
                kind_name(&kind),
                format!("nesting depth {depth} exceeds the maximum of {MAX_TYPE_DEPTH}"),
            ));
        }
        // `head_size` multiplies by the word size unchecked.
        if static_words.map_or(false, |w| w.checked_mul(WORD_SIZE).is_none()) {
            return Err(AbiError::ty(kind_name(&kind), "encoded size overflows usize"));
        }

        Ok(Self {
            kind,
            static_words,
            depth,
        })
    }

    pub fn uint(bits: u16) -> Result<Self, AbiError> {
        Self::new(TypeKind::Uint(bits))
    }

    pub fn int(bits: u16) -> Result<Self, AbiError> {
        Self::new(TypeKind::Int(bits))
    }

    pub fn fixed_bytes(n: u8) -> Result<Self, AbiError> {
        Self::new(TypeKind::FixedBytes(n))
    }

    pub fn fixed(bits: u16, scale: u8, signed: bool) -> Result<Self, AbiError> {
        Self::new(TypeKind::Fixed {
            bits,
            scale,
            signed,
        })
    }

    pub fn bool() -> Self {
        Self::leaf(TypeKind::Bool, Some(1))
    }

    pub fn address() -> Self {
        Self::leaf(TypeKind::Address, Some(1))
    }

    pub fn function() -> Self {
        Self::leaf(TypeKind::Function, Some(1))
    }

    pub fn bytes() -> Self {
        Self::leaf(TypeKind::Bytes, None)
    }

    pub fn string() -> Self {
        Self::leaf(TypeKind::String, None)
    }

    pub fn fixed_array(element: TypeNode, len: usize) -> Result<Self, AbiError> {
        Self::new(TypeKind::FixedArray {
            element: Box::new(element),
            len,
        })
    }

    pub fn array(element: TypeNode) -> Result<Self, AbiError> {
        Self::new(TypeKind::Array(Box::new(element)))
    }

    pub fn tuple(fields: Vec<TupleField>) -> Result<Self, AbiError> {
        Self::new(TypeKind::Tuple(fields))
    }

    /// Infallible constructor for parameterless leaves.
    fn leaf(kind: TypeKind, static_words: Option<usize>) -> Self {
        Self {
            kind,
            static_words,
            depth: 1,
        }
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_dynamic(&self) -> bool {
        self.static_words.is_none()
    }

    pub fn is_static(&self) -> bool {
        self.static_words.is_some()
    }

    /// Number of words a static value occupies in place; `None` if dynamic.
    pub fn static_words(&self) -> Option<usize> {
        self.static_words
    }

    /// Bytes this type occupies in its enclosing head region.
    /// Dynamic types only hold a one-word offset there.
    pub fn head_size(&self) -> usize {
        self.static_words.unwrap_or(1) * WORD_SIZE
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Single-word types that carry no nested structure.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Uint(_)
                | TypeKind::Int(_)
                | TypeKind::Bool
                | TypeKind::Address
                | TypeKind::FixedBytes(_)
                | TypeKind::Function
                | TypeKind::Fixed { .. }
        )
    }
}

fn check_int_bits(bits: u16) -> Result<(), String> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(format!(
            "bit width {bits} must be a multiple of 8 within 8..=256"
        ));
    }
    Ok(())
}

/// Number of decimal digits needed for the largest value that fits in `bits`.
pub(crate) fn decimal_digits(bits: u16) -> u32 {
    // floor(bits * log10(2)) + 1
    (bits as u32 * 30_103) / 100_000 + 1
}

fn check_fixed_scale(bits: u16, scale: u8) -> Result<(), String> {
    if scale == 0 || scale > MAX_FIXED_SCALE {
        return Err(format!(
            "scale {scale} must be within 1..={MAX_FIXED_SCALE}"
        ));
    }
    let digits = decimal_digits(bits);
    if scale as u32 > digits {
        return Err(format!(
            "scale {scale} exceeds the {digits} decimal digits representable in {bits} bits"
        ));
    }
    Ok(())
}

fn check_unique_names(fields: &[TupleField]) -> Result<(), AbiError> {
    for (i, f) in fields.iter().enumerate() {
        let Some(name) = f.name.as_deref() else {
            continue;
        };
        if fields[..i].iter().any(|o| o.name.as_deref() == Some(name)) {
            return Err(AbiError::mismatch(format!(
                "duplicate tuple component name '{name}'"
            )));
        }
    }
    Ok(())
}

/// Render a kind for error messages before it has become a `TypeNode`.
fn kind_name(kind: &TypeKind) -> String {
    let mut out = String::new();
    write_kind(&mut out, kind).map(|_| out).unwrap_or_default()
}

fn write_kind(f: &mut impl fmt::Write, kind: &TypeKind) -> fmt::Result {
    match kind {
        TypeKind::Uint(bits) => write!(f, "uint{bits}"),
        TypeKind::Int(bits) => write!(f, "int{bits}"),
        TypeKind::Bool => write!(f, "bool"),
        TypeKind::Address => write!(f, "address"),
        TypeKind::FixedBytes(n) => write!(f, "bytes{n}"),
        TypeKind::Function => write!(f, "function"),
        TypeKind::Fixed {
            bits,
            scale,
            signed,
        } => {
            let prefix = if *signed { "" } else { "u" };
            write!(f, "{prefix}fixed{bits}x{scale}")
        }
        TypeKind::Bytes => write!(f, "bytes"),
        TypeKind::String => write!(f, "string"),
        TypeKind::FixedArray { element, len } => {
            write_kind(f, &element.kind)?;
            write!(f, "[{len}]")
        }
        TypeKind::Array(element) => {
            write_kind(f, &element.kind)?;
            write!(f, "[]")
        }
        TypeKind::Tuple(fields) => {
            write!(f, "(")?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write_kind(f, &field.ty.kind)?;
            }
            write!(f, ")")
        }
    }
}

/// Canonical descriptor, as used in function and event signatures.
impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_kind(f, &self.kind)
    }
}

impl FromStr for TypeNode {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}

impl Serialize for TypeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
