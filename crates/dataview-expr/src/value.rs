use ordered_float::OrderedFloat;
use std::fmt;
use std::sync::Arc;

/// Semantic type of a column or constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Integer,
    Double,
    Bool,
    DateTime,
    Duration,
}

impl ValueType {
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Double)
    }

    /// Arithmetic is defined for numeric, date/time and duration values only.
    pub fn supports_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Double | Self::DateTime | Self::Duration
        )
    }
}

/// A primitive cell value.
///
/// The variant order defines the total ordering used when sorting mixed
/// columns: nulls first, then booleans, numbers, text, date/times.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Number(OrderedFloat<f64>),
    Text(Arc<str>),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
}

impl Value {
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    pub fn text(value: impl Into<Arc<str>>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The natural [`ValueType`] of this value, if it has one.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueType::Bool),
            Self::Integer(_) => Some(ValueType::Integer),
            Self::Number(_) => Some(ValueType::Double),
            Self::Text(_) => Some(ValueType::Text),
            Self::DateTime(_) => Some(ValueType::DateTime),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(Arc::from(value.as_str()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "datetime({v})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mixed_values_sort_nulls_first() {
        let mut values = vec![
            Value::text("b"),
            Value::number(2.0),
            Value::Null,
            Value::Bool(true),
        ];
        values.sort();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
    }

    #[test]
    fn value_type_classification() {
        assert_eq!(Value::from(3i64).value_type(), Some(ValueType::Integer));
        assert_eq!(Value::Null.value_type(), None);
        assert!(ValueType::Double.supports_arithmetic());
        assert!(ValueType::Duration.supports_arithmetic());
        assert!(!ValueType::Text.supports_arithmetic());
    }
}
