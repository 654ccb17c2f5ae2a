//! Dynamically-typed values as seen by the template evaluator

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::host::HostObject;
use crate::types::NumericKind;

// ============================================================================
// Numbers
// ============================================================================

/// Number carrying its concrete representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// Wide integer
    BigInteger(i128),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
}

impl Number {
    /// Concrete kind of this number
    pub fn kind(&self) -> NumericKind {
        match self {
            Number::Byte(_) => NumericKind::Byte,
            Number::Short(_) => NumericKind::Short,
            Number::Int(_) => NumericKind::Int,
            Number::Long(_) => NumericKind::Long,
            Number::BigInteger(_) => NumericKind::BigInteger,
            Number::Float(_) => NumericKind::Float,
            Number::Double(_) => NumericKind::Double,
        }
    }

    /// Integral value, when this number is a whole number
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Number::Byte(v) => Some(v as i128),
            Number::Short(v) => Some(v as i128),
            Number::Int(v) => Some(v as i128),
            Number::Long(v) => Some(v as i128),
            Number::BigInteger(v) => Some(v),
            Number::Float(v) => whole_float(v as f64),
            Number::Double(v) => whole_float(v),
        }
    }

    /// Value as a 64-bit float (may round)
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Byte(v) => v as f64,
            Number::Short(v) => v as f64,
            Number::Int(v) => v as f64,
            Number::Long(v) => v as f64,
            Number::BigInteger(v) => v as f64,
            Number::Float(v) => v as f64,
            Number::Double(v) => v,
        }
    }

    /// Convert to `kind`, failing when the value would not survive exactly
    pub fn to_exact(&self, kind: NumericKind) -> Option<Number> {
        if kind == self.kind() {
            return Some(*self);
        }
        match kind {
            NumericKind::Byte => self.as_integer().and_then(|v| i8::try_from(v).ok()).map(Number::Byte),
            NumericKind::Short => self.as_integer().and_then(|v| i16::try_from(v).ok()).map(Number::Short),
            NumericKind::Int => self.as_integer().and_then(|v| i32::try_from(v).ok()).map(Number::Int),
            NumericKind::Long => self.as_integer().and_then(|v| i64::try_from(v).ok()).map(Number::Long),
            NumericKind::BigInteger => self.as_integer().map(Number::BigInteger),
            NumericKind::Float => {
                let wide = self.as_f64();
                let narrow = wide as f32;
                (narrow as f64 == wide && self.round_trips(wide)).then_some(Number::Float(narrow))
            }
            NumericKind::Double => {
                let wide = self.as_f64();
                self.round_trips(wide).then_some(Number::Double(wide))
            }
        }
    }

    /// Convert to `kind`, rounding or truncating as needed
    pub fn to_lossy(&self, kind: NumericKind) -> Number {
        match kind {
            NumericKind::Byte => Number::Byte(self.truncated() as i8),
            NumericKind::Short => Number::Short(self.truncated() as i16),
            NumericKind::Int => Number::Int(self.truncated() as i32),
            NumericKind::Long => Number::Long(self.truncated() as i64),
            NumericKind::BigInteger => Number::BigInteger(self.truncated()),
            NumericKind::Float => Number::Float(self.as_f64() as f32),
            NumericKind::Double => Number::Double(self.as_f64()),
        }
    }

    fn truncated(&self) -> i128 {
        match self.as_integer() {
            Some(v) => v,
            None => self.as_f64() as i128,
        }
    }

    fn round_trips(&self, wide: f64) -> bool {
        match self.kind() {
            NumericKind::Float | NumericKind::Double => true,
            _ => self.as_integer() == Some(wide as i128) && wide.abs() < 9.007_199_254_740_992e15,
        }
    }
}

/// Whole float inside the `i128` range; `as` would saturate outside it
fn whole_float(v: f64) -> Option<i128> {
    const LIMIT: f64 = i128::MAX as f64; // rounds to 2^127
    (v.is_finite() && v.fract() == 0.0 && (-LIMIT..LIMIT).contains(&v)).then(|| v as i128)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Byte(v) => write!(f, "{}", v),
            Number::Short(v) => write!(f, "{}", v),
            Number::Int(v) => write!(f, "{}", v),
            Number::Long(v) => write!(f, "{}", v),
            Number::BigInteger(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
            Number::Double(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// Dynamic values
// ============================================================================

/// Value as produced by the template evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Number with its concrete representation
    Number(Number),
    /// Text
    Text(Arc<str>),
    /// Ordered sequence
    Sequence(Vec<DynamicValue>),
    /// Text-keyed mapping
    Mapping(BTreeMap<Arc<str>, DynamicValue>),
    /// Wrapped host object
    Object(HostObject),
}

impl DynamicValue {
    /// Text value
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        DynamicValue::Text(s.into())
    }

    /// Human-readable type description for diagnostics
    pub fn type_name(&self) -> String {
        match self {
            DynamicValue::Null => "null".to_string(),
            DynamicValue::Bool(_) => "boolean".to_string(),
            DynamicValue::Number(n) => n.kind().name().to_string(),
            DynamicValue::Text(_) => "text".to_string(),
            DynamicValue::Sequence(_) => "sequence".to_string(),
            DynamicValue::Mapping(_) => "mapping".to_string(),
            DynamicValue::Object(obj) => obj.runtime_type().name().to_string(),
        }
    }

    /// Whether this is [`DynamicValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        DynamicValue::Bool(v)
    }
}

impl From<i8> for DynamicValue {
    fn from(v: i8) -> Self {
        DynamicValue::Number(Number::Byte(v))
    }
}

impl From<i16> for DynamicValue {
    fn from(v: i16) -> Self {
        DynamicValue::Number(Number::Short(v))
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        DynamicValue::Number(Number::Int(v))
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        DynamicValue::Number(Number::Long(v))
    }
}

impl From<f32> for DynamicValue {
    fn from(v: f32) -> Self {
        DynamicValue::Number(Number::Float(v))
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        DynamicValue::Number(Number::Double(v))
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        DynamicValue::Text(v.into())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        DynamicValue::Text(v.into())
    }
}

impl From<HostObject> for DynamicValue {
    fn from(v: HostObject) -> Self {
        DynamicValue::Object(v)
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(v: Vec<T>) -> Self {
        DynamicValue::Sequence(v.into_iter().map(Into::into).collect())
    }
}
