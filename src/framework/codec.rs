//! # Typed Value Codec
//!
//! Converts between native field values and their wire representation: a text
//! value plus an optional `type` attribute (`integer`, `float`, `datetime`,
//! `date`, `bool`). The declared wire type must agree with the kind of the
//! native field; disagreement is reported as [`Error::TypeMismatch`] instead of
//! being coerced.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{Error, Result};

/// Wire format for outgoing date-times (`yyyy-MM-ddTHH:mm:ss`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Wire format for plain dates and date filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The declared kind of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    OptInt,
    Float,
    OptFloat,
    DateTime,
    OptDateTime,
    String,
    Bool,
    /// A string drawn from a fixed set of upper-case wire names.
    Enum(&'static [&'static str]),
}

impl ValueKind {
    /// The wire type name this kind expects, used in mismatch messages.
    pub fn wire_type(&self) -> &'static str {
        match self {
            ValueKind::Int | ValueKind::OptInt => "integer",
            ValueKind::Float | ValueKind::OptFloat => "float",
            ValueKind::DateTime | ValueKind::OptDateTime => "date' or 'datetime",
            ValueKind::String | ValueKind::Enum(_) => "string",
            ValueKind::Bool => "bool",
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, ValueKind::OptInt | ValueKind::OptFloat | ValueKind::OptDateTime)
    }
}

/// A native value read from or written to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Str(String),
    Bool(bool),
}

impl FieldValue {
    pub fn variant_name(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "an integer value",
            FieldValue::Float(_) => "a float value",
            FieldValue::DateTime(_) => "a datetime value",
            FieldValue::Str(_) => "a string value",
            FieldValue::Bool(_) => "a bool value",
        }
    }
}

/// Text and optional `type` attribute produced by [`encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub text: String,
    pub type_tag: Option<&'static str>,
}

// =============================================================================
// Serialize
// =============================================================================

/// Encodes `value` for the field `field` declared as `kind`.
///
/// Absent optional values never reach this function; the mapper omits them.
pub fn encode(field: &str, kind: ValueKind, value: &FieldValue) -> Result<Encoded> {
    let encoded = match (kind, value) {
        (ValueKind::Int | ValueKind::OptInt, FieldValue::Int(v)) => Encoded {
            text: v.to_string(),
            type_tag: Some("integer"),
        },
        (ValueKind::Float | ValueKind::OptFloat, FieldValue::Float(v)) => Encoded {
            text: format_float(*v)?,
            type_tag: Some("float"),
        },
        (ValueKind::DateTime | ValueKind::OptDateTime, FieldValue::DateTime(v)) => Encoded {
            text: v.format(DATETIME_FORMAT).to_string(),
            type_tag: Some("datetime"),
        },
        (ValueKind::String, FieldValue::Str(v)) => Encoded {
            text: v.clone(),
            type_tag: None,
        },
        (ValueKind::Enum(_), FieldValue::Str(v)) => Encoded {
            text: v.to_ascii_uppercase(),
            type_tag: None,
        },
        (ValueKind::Bool, FieldValue::Bool(v)) => Encoded {
            text: if *v { "1" } else { "0" }.to_string(),
            type_tag: None,
        },
        (_, other) => {
            return Err(Error::UnsupportedFieldType {
                field: field.to_string(),
                found: other.variant_name(),
            })
        }
    };
    Ok(encoded)
}

/// Culture-invariant decimal text: `.` separator, no grouping, no exponent.
/// NaN and the infinities have no decimal form and are refused.
fn format_float(v: f64) -> Result<String> {
    if !v.is_finite() {
        return Err(Error::ValueConversion {
            value: v.to_string(),
            kind: "float",
        });
    }
    Ok(v.to_string())
}

// =============================================================================
// Deserialize
// =============================================================================

/// Decodes wire `text` carrying the `type` attribute `type_tag` into a value
/// of `kind`. Returns `None` only for an empty optional date.
pub fn decode(field: &str, text: &str, type_tag: Option<&str>, kind: ValueKind) -> Result<Option<FieldValue>> {
    let tag = type_tag.unwrap_or("string");
    let mismatch = || Error::TypeMismatch {
        field: field.to_string(),
        expected: kind.wire_type(),
        found: tag.to_string(),
    };

    match kind {
        ValueKind::Int | ValueKind::OptInt => {
            if tag != "integer" {
                return Err(mismatch());
            }
            if text.is_empty() {
                return Ok(Some(FieldValue::Int(0)));
            }
            text.trim()
                .parse::<i64>()
                .map(|v| Some(FieldValue::Int(v)))
                .map_err(|_| conversion(text, "int"))
        }
        ValueKind::Float | ValueKind::OptFloat => {
            if tag != "float" {
                return Err(mismatch());
            }
            if text.is_empty() {
                return Ok(Some(FieldValue::Float(0.0)));
            }
            parse_float(text)
                .map(|v| Some(FieldValue::Float(v)))
                .ok_or_else(|| conversion(text, "float"))
        }
        ValueKind::DateTime | ValueKind::OptDateTime => {
            if tag != "datetime" && tag != "date" {
                return Err(mismatch());
            }
            if text.is_empty() && kind.is_optional() {
                return Ok(None);
            }
            let parsed = if tag == "date" {
                NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
                    .ok_or_else(|| conversion(text, "Date"))?
            } else {
                parse_datetime(text).ok_or_else(|| conversion(text, "DateTime"))?
            };
            Ok(Some(FieldValue::DateTime(parsed)))
        }
        ValueKind::String => {
            if tag != "string" {
                return Err(mismatch());
            }
            Ok(Some(FieldValue::Str(text.to_string())))
        }
        ValueKind::Enum(names) => {
            if tag != "string" {
                return Err(mismatch());
            }
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(text.trim()))
                .map(|name| Some(FieldValue::Str((*name).to_string())))
                .ok_or_else(|| conversion(text, "enum"))
        }
        ValueKind::Bool => {
            // Outgoing bools carry no type attribute, so an untagged value is
            // accepted as well.
            if tag != "bool" && type_tag.is_some() {
                return Err(mismatch());
            }
            text.trim()
                .parse::<i64>()
                .map(|v| Some(FieldValue::Bool(v != 0)))
                .map_err(|_| conversion(text, "bool"))
        }
    }
}

fn conversion(value: &str, kind: &'static str) -> Error {
    Error::ValueConversion {
        value: value.to_string(),
        kind,
    }
}

/// Invariant float parsing. Rejects grouping separators and non-finite input.
fn parse_float(text: &str) -> Option<f64> {
    let v = text.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// General date-time parsing: RFC 3339 with offset, the sortable local
/// format, a space-separated variant or a bare date.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for format in [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

// =============================================================================
// Native type bindings
// =============================================================================

/// Binds a native Rust field type to a [`ValueKind`].
///
/// `to_wire` returns `None` for absent values, which the mapper skips.
/// `from_wire` returns `None` when the value has the wrong shape for `Self`.
pub trait WireValue: Clone + Send + Sync + 'static {
    const KIND: ValueKind;

    fn to_wire(&self) -> Option<FieldValue>;

    fn from_wire(value: Option<FieldValue>) -> Option<Self>;
}

impl WireValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn to_wire(&self) -> Option<FieldValue> {
        Some(FieldValue::Int(*self))
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            Some(FieldValue::Int(v)) => Some(v),
            _ => None,
        }
    }
}

impl WireValue for Option<i64> {
    const KIND: ValueKind = ValueKind::OptInt;

    fn to_wire(&self) -> Option<FieldValue> {
        self.map(FieldValue::Int)
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(FieldValue::Int(v)) => Some(Some(v)),
            _ => None,
        }
    }
}

impl WireValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn to_wire(&self) -> Option<FieldValue> {
        Some(FieldValue::Float(*self))
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            Some(FieldValue::Float(v)) => Some(v),
            _ => None,
        }
    }
}

impl WireValue for Option<f64> {
    const KIND: ValueKind = ValueKind::OptFloat;

    fn to_wire(&self) -> Option<FieldValue> {
        self.map(FieldValue::Float)
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(FieldValue::Float(v)) => Some(Some(v)),
            _ => None,
        }
    }
}

impl WireValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn to_wire(&self) -> Option<FieldValue> {
        Some(FieldValue::DateTime(*self))
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            Some(FieldValue::DateTime(v)) => Some(v),
            _ => None,
        }
    }
}

impl WireValue for Option<NaiveDateTime> {
    const KIND: ValueKind = ValueKind::OptDateTime;

    fn to_wire(&self) -> Option<FieldValue> {
        self.map(FieldValue::DateTime)
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(FieldValue::DateTime(v)) => Some(Some(v)),
            _ => None,
        }
    }
}

/// Strings are optional on the wire: `None` is omitted, `Some("")` clears.
impl WireValue for Option<String> {
    const KIND: ValueKind = ValueKind::String;

    fn to_wire(&self) -> Option<FieldValue> {
        self.clone().map(FieldValue::Str)
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            None => Some(None),
            Some(FieldValue::Str(v)) => Some(Some(v)),
            _ => None,
        }
    }
}

impl WireValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_wire(&self) -> Option<FieldValue> {
        Some(FieldValue::Bool(*self))
    }

    fn from_wire(value: Option<FieldValue>) -> Option<Self> {
        match value {
            Some(FieldValue::Bool(v)) => Some(v),
            _ => None,
        }
    }
}

/// A typed enum with a fixed set of wire strings.
pub trait WireEnum: Copy + Send + Sync + 'static {
    /// Every wire name, upper-case, in declaration order.
    const WIRE_NAMES: &'static [&'static str];

    fn wire_name(&self) -> &'static str;

    fn from_wire_name(name: &str) -> Option<Self>;
}

/// Implements [`WireValue`] for `Option<$ty>` where `$ty: WireEnum`.
#[macro_export]
macro_rules! wire_enum_field {
    ($ty:ty) => {
        impl $crate::framework::codec::WireValue for Option<$ty> {
            const KIND: $crate::framework::codec::ValueKind =
                $crate::framework::codec::ValueKind::Enum(<$ty as $crate::framework::codec::WireEnum>::WIRE_NAMES);

            fn to_wire(&self) -> Option<$crate::framework::codec::FieldValue> {
                self.map(|v| {
                    $crate::framework::codec::FieldValue::Str(
                        $crate::framework::codec::WireEnum::wire_name(&v).to_string(),
                    )
                })
            }

            fn from_wire(value: Option<$crate::framework::codec::FieldValue>) -> Option<Self> {
                match value {
                    None => Some(None),
                    Some($crate::framework::codec::FieldValue::Str(s)) => {
                        <$ty as $crate::framework::codec::WireEnum>::from_wire_name(&s).map(Some)
                    }
                    _ => None,
                }
            }
        }
    };
}
