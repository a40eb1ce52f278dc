//! Value universe crossing the automation seam.
//!
//! A late-bound host traffics in loosely typed values: numbers that may
//! arrive as integers or doubles, tri-state "booleans", strings, nested
//! objects, and argument lists. [`Variant`] models exactly that set, with
//! the coercions callers of a late-bound surface expect.

use crate::automation::Handle;
use crate::common::{Error, Result};

/// A loosely typed automation value.
#[derive(Debug, Clone)]
pub enum Variant {
    /// No value (VT_EMPTY); also what optional host slots report
    Empty,
    /// Boolean
    Bool(bool),
    /// Integer (all host integer widths widen to i64)
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
    /// Nested automation object
    Object(Handle),
    /// Argument list (e.g. index arrays for range re-derivation)
    List(Vec<Variant>),
}

impl Variant {
    /// Short kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Variant::Empty => "Empty",
            Variant::Bool(_) => "Bool",
            Variant::Int(_) => "Int",
            Variant::Float(_) => "Float",
            Variant::Str(_) => "Str",
            Variant::Object(_) => "Object",
            Variant::List(_) => "List",
        }
    }

    /// Whether this is [`Variant::Empty`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Variant::Empty)
    }

    /// Integer view. Floats with an integral value and booleans (host
    /// tri-state encoding, `true` → -1) coerce.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Variant::Int(v) => Ok(*v),
            Variant::Float(v) if v.fract() == 0.0 => Ok(*v as i64),
            Variant::Bool(b) => Ok(if *b { -1 } else { 0 }),
            other => Err(Error::TypeMismatch { expected: "Int", got: other.kind() }),
        }
    }

    /// Floating-point view; integers widen.
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Variant::Float(v) => Ok(*v),
            Variant::Int(v) => Ok(*v as f64),
            other => Err(Error::TypeMismatch { expected: "Float", got: other.kind() }),
        }
    }

    /// String view.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Variant::Str(s) => Ok(s),
            other => Err(Error::TypeMismatch { expected: "Str", got: other.kind() }),
        }
    }

    /// Boolean view. Host integers coerce with the tri-state convention
    /// (0 is false, anything else true).
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Variant::Bool(b) => Ok(*b),
            Variant::Int(v) => Ok(*v != 0),
            other => Err(Error::TypeMismatch { expected: "Bool", got: other.kind() }),
        }
    }

    /// Nested-object view.
    pub fn as_object(&self) -> Result<&Handle> {
        match self {
            Variant::Object(h) => Ok(h),
            other => Err(Error::TypeMismatch { expected: "Object", got: other.kind() }),
        }
    }

    /// Consuming nested-object view.
    pub fn into_object(self) -> Result<Handle> {
        match self {
            Variant::Object(h) => Ok(h),
            other => Err(Error::TypeMismatch { expected: "Object", got: other.kind() }),
        }
    }
}

/// Structural equality; nested objects compare by reference identity.
impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Variant::Empty, Variant::Empty) => true,
            (Variant::Bool(a), Variant::Bool(b)) => a == b,
            (Variant::Int(a), Variant::Int(b)) => a == b,
            (Variant::Float(a), Variant::Float(b)) => a == b,
            (Variant::Int(a), Variant::Float(b)) | (Variant::Float(b), Variant::Int(a)) => {
                *a as f64 == *b
            }
            (Variant::Str(a), Variant::Str(b)) => a == b,
            (Variant::Object(a), Variant::Object(b)) => a.ptr_eq(b),
            (Variant::List(a), Variant::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

impl From<i32> for Variant {
    fn from(v: i32) -> Self {
        Variant::Int(v as i64)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Variant::Int(v)
    }
}

impl From<usize> for Variant {
    fn from(v: usize) -> Self {
        Variant::Int(v as i64)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Float(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::Str(v.to_string())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::Str(v)
    }
}

impl From<Handle> for Variant {
    fn from(v: Handle) -> Self {
        Variant::Object(v)
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(v: Vec<Variant>) -> Self {
        Variant::List(v)
    }
}

impl<T: Into<Variant>> From<Option<T>> for Variant {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Variant::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Variant::Float(3.0).as_i64().unwrap(), 3);
        assert!(Variant::Float(3.5).as_i64().is_err());
        assert_eq!(Variant::Int(3).as_f64().unwrap(), 3.0);
        assert_eq!(Variant::Int(3), Variant::Float(3.0));
    }

    #[test]
    fn test_tri_state_booleans() {
        assert_eq!(Variant::Bool(true).as_i64().unwrap(), -1);
        assert_eq!(Variant::Bool(false).as_i64().unwrap(), 0);
        assert!(Variant::Int(-1).as_bool().unwrap());
        assert!(!Variant::Int(0).as_bool().unwrap());
    }

    #[test]
    fn test_mismatch_reports_kinds() {
        let err = Variant::Str("x".into()).as_i64().unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { expected: "Int", got: "Str" }));
    }
}
