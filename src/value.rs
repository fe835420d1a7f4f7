//! Generic property values and their conversion to and from Rust types.
//!
//! The host addresses element properties with boxed, dynamically typed
//! values. [`Value`] is that box; [`ToValue`] and [`FromValue`] convert at
//! the boundary so element implementations only ever see typed data.
//!
//! A null generic value is modelled as `Option<Value>::None`.

use std::fmt;
use thiserror::Error;

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `bool`
    Bool,
    /// `i32`
    Int,
    /// `u32`
    UInt,
    /// `i64`
    Int64,
    /// `u64`
    UInt64,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// `String`
    String,
}

impl ValueType {
    /// Host-facing type name.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::UInt => "uint",
            ValueType::Int64 => "int64",
            ValueType::UInt64 => "uint64",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A boxed, dynamically typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// A signed 32-bit integer.
    Int(i32),
    /// An unsigned 32-bit integer.
    UInt(u32),
    /// A signed 64-bit integer.
    Int64(i64),
    /// An unsigned 64-bit integer.
    UInt64(u64),
    /// A single-precision float.
    Float(f32),
    /// A double-precision float.
    Double(f64),
    /// A string value.
    String(String),
}

impl Value {
    /// Get the type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::UInt(_) => ValueType::UInt,
            Value::Int64(_) => ValueType::Int64,
            Value::UInt64(_) => ValueType::UInt64,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
        }
    }

    /// Check whether this value can be stored in a slot of type `ty`.
    pub fn conforms_to(&self, ty: ValueType) -> bool {
        self.value_type() == ty
    }

    /// Convert to a typed value.
    pub fn get<T: FromValue>(&self) -> Result<T, ConversionError> {
        T::from_value(self)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::UInt(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
        }
    }
}

/// Conversion between a generic [`Value`] and a typed value failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The value has a different type than requested.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Requested type.
        expected: ValueType,
        /// Type actually held.
        actual: ValueType,
    },

    /// The typed value cannot be represented in the requested generic type.
    #[error("cannot represent value as {ty}: {reason}")]
    Unrepresentable {
        /// Target type.
        ty: ValueType,
        /// Why the conversion failed.
        reason: String,
    },
}

/// Typed → generic conversion.
pub trait ToValue {
    /// Box this value.
    fn to_value(&self) -> Value;

    /// Box this value, failing if the host cannot carry it.
    ///
    /// Host strings are NUL-terminated, so strings with interior NUL bytes
    /// are rejected here.
    fn try_to_value(&self) -> Result<Value, ConversionError> {
        let value = self.to_value();
        check_representable(&value)?;
        Ok(value)
    }
}

/// Check that the host can carry `value`.
///
/// Strings with interior NUL bytes are the only values it cannot.
pub fn check_representable(value: &Value) -> Result<(), ConversionError> {
    if let Value::String(s) = value {
        if let Some(pos) = s.find('\0') {
            return Err(ConversionError::Unrepresentable {
                ty: ValueType::String,
                reason: format!("interior NUL byte at position {pos}"),
            });
        }
    }
    Ok(())
}

/// Generic → typed conversion.
pub trait FromValue: Sized {
    /// The generic type this conversion accepts.
    fn value_type() -> ValueType;

    /// Unbox a value of the matching type.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

macro_rules! impl_value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(self.to_owned())
                }
            }

            impl FromValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }

                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => Err(ConversionError::TypeMismatch {
                            expected: ValueType::$variant,
                            actual: other.value_type(),
                        }),
                    }
                }
            }
        )*
    };
}

impl_value_conversions! {
    bool => Bool,
    i32 => Int,
    u32 => UInt,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::String((*self).to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

/// Unbox a possibly-null generic value.
///
/// Returns `Ok(None)` for a null value and an error on type mismatch.
pub fn from_generic<T: FromValue>(value: Option<&Value>) -> Result<Option<T>, ConversionError> {
    value.map(T::from_value).transpose()
}

/// Unbox a possibly-null generic value, mapping null to the type's empty form.
pub fn from_generic_or_default<T: FromValue + Default>(
    value: Option<&Value>,
) -> Result<T, ConversionError> {
    Ok(from_generic(value)?.unwrap_or_default())
}
