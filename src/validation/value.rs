use std::fmt;

/// Shape of a property value as seen by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Text,
    Seq,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    pub const ALL: [ValueKind; 6] = [
        ValueKind::Null,
        ValueKind::Text,
        ValueKind::Seq,
        ValueKind::Int,
        ValueKind::Float,
        ValueKind::Bool,
    ];
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Null => "null",
            ValueKind::Text => "text",
            ValueKind::Seq => "sequence",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        };
        f.write_str(s)
    }
}

/// A borrowed view of one property of the object under validation.
///
/// `Seq` carries only the element count; that is all a rule ever needs of a
/// collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Null,
    Text(&'a str),
    Seq(usize),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue<'_> {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Null => ValueKind::Null,
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Seq(_) => ValueKind::Seq,
            FieldValue::Int(_) => ValueKind::Int,
            FieldValue::Float(_) => ValueKind::Float,
            FieldValue::Bool(_) => ValueKind::Bool,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Character count of text or element count of a sequence.
    #[must_use]
    pub fn length(&self) -> Option<usize> {
        match self {
            FieldValue::Text(s) => Some(s.chars().count()),
            FieldValue::Seq(n) => Some(*n),
            _ => None,
        }
    }

    /// `Text` for `Some`, `Null` for `None`.
    #[must_use]
    pub fn from_opt_str(value: Option<&str>) -> FieldValue<'_> {
        value.map_or(FieldValue::Null, FieldValue::Text)
    }

    /// `Seq` with the slice's length.
    #[must_use]
    pub fn from_slice<T>(value: &[T]) -> FieldValue<'static> {
        FieldValue::Seq(value.len())
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue<'_> {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<'a, T> From<Option<T>> for FieldValue<'a>
where
    T: Into<FieldValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
