//! Schema-based validation of form input.
//!
//! A [`Schema`] is declared once per resource and turns raw [`Form`] text
//! into [`Valid`] values, coercing numbers, dates and choices on the way.
//! Validation is all-or-nothing: any invalid field rejects the whole
//! submission and every failure is reported in [`FieldErrors`].

use std::{
    collections::BTreeMap,
    fmt,
    ops::Bound,
    str::FromStr,
    sync::LazyLock,
};

use common::{Date, DateOf};
use derive_more::Error;
use itertools::Itertools as _;
use regex::Regex;
use rust_decimal::Decimal;

/// Raw textual form input, keyed by field name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Form(BTreeMap<String, String>);

impl Form {
    /// Creates a new empty [`Form`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `value` of the field with the provided `name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets the `value` of the field with the provided `name`, replacing the
    /// previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        drop(self.0.insert(name.into(), value.into()));
    }

    /// Returns the raw value of the field with the provided `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Overrides the fields of this [`Form`] with the ones of the `other`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for Form
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Ordered set of [`Field`]s a [`Form`] is validated against.
#[derive(Clone, Debug)]
pub struct Schema {
    /// [`Field`]s of this [`Schema`] in display order.
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a new [`Schema`] out of the provided [`Field`]s.
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Returns [`Field`]s of this [`Schema`].
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validates the provided [`Form`] against this [`Schema`].
    ///
    /// Values are trimmed (unless the [`Field`] is [verbatim]) and empty ones
    /// are treated as missing. Fields not declared in this [`Schema`] are
    /// ignored.
    ///
    /// [verbatim]: Field::verbatim
    ///
    /// # Errors
    ///
    /// With every invalid or missing required field, if any.
    pub fn validate(&self, form: &Form) -> Result<Valid, FieldErrors> {
        let mut valid = Valid::default();
        let mut errors = FieldErrors::default();

        for field in &self.fields {
            let raw = form
                .get(field.name)
                .map(|v| if field.verbatim { v } else { v.trim() })
                .filter(|v| !v.is_empty());
            match raw {
                Some(raw) => match field.coerce(raw) {
                    Ok(value) => valid.insert(field.name, value),
                    Err(message) => errors.push(field.name, message),
                },
                None => {
                    if let Some(default) = field.default {
                        valid.insert(field.name, default());
                    } else if field.required {
                        errors.push(
                            field.name,
                            format!("{} is required", field.label),
                        );
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(valid)
        } else {
            Err(errors)
        }
    }
}

/// Declaration of a single form field.
#[derive(Clone, Debug)]
pub struct Field {
    /// Name of this [`Field`] in a [`Form`].
    name: &'static str,

    /// Human-readable label used in error messages.
    label: String,

    /// [`Kind`] of this [`Field`].
    kind: Kind,

    /// Indicator whether this [`Field`] must be present.
    required: bool,

    /// Value used when this [`Field`] is missing.
    default: Option<fn() -> Value>,

    /// Indicator whether the input of this [`Field`] is taken as is, without
    /// trimming.
    verbatim: bool,
}

impl Field {
    /// Creates a new optional [`Field`] of the provided [`Kind`].
    #[must_use]
    pub fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            label: label_of(name),
            kind,
            required: false,
            default: None,
            verbatim: false,
        }
    }

    /// Creates a new free-text [`Field`].
    #[must_use]
    pub fn text(name: &'static str) -> Self {
        Self::new(name, Kind::Text { min: None, max: None })
    }

    /// Creates a new email address [`Field`].
    #[must_use]
    pub fn email(name: &'static str) -> Self {
        Self::new(name, Kind::Email)
    }

    /// Creates a new whole number [`Field`].
    #[must_use]
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, Kind::Integer { min: None, max: None })
    }

    /// Creates a new decimal number [`Field`].
    #[must_use]
    pub fn decimal(name: &'static str) -> Self {
        Self::new(
            name,
            Kind::Decimal {
                min: Bound::Unbounded,
                max: Bound::Unbounded,
            },
        )
    }

    /// Creates a new [`Field`] restricted to the provided `values`.
    #[must_use]
    pub fn choice(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::new(name, Kind::Choice(values))
    }

    /// Creates a new `YYYY-MM-DD` date [`Field`].
    #[must_use]
    pub fn date(name: &'static str) -> Self {
        Self::new(name, Kind::Date)
    }

    /// Creates a new [`Field`] referencing another record by its ID.
    #[must_use]
    pub fn id(name: &'static str) -> Self {
        Self::new(name, Kind::Id)
    }

    /// Marks this [`Field`] as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Takes the input of this [`Field`] as is, without trimming it.
    ///
    /// Meant for secrets, whose surrounding whitespace is significant.
    #[must_use]
    pub fn verbatim(mut self) -> Self {
        self.verbatim = true;
        self
    }

    /// Overrides the label of this [`Field`].
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the value this [`Field`] takes when it's missing.
    #[must_use]
    pub fn or_default(mut self, default: fn() -> Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Restricts the length (in characters) of a text [`Field`].
    #[must_use]
    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let Kind::Text { min: lo, max: hi } = &mut self.kind {
            *lo = min;
            *hi = max;
        }
        self
    }

    /// Restricts the value of a whole number [`Field`].
    #[must_use]
    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        if let Kind::Integer { min: lo, max: hi } = &mut self.kind {
            *lo = min;
            *hi = max;
        }
        self
    }

    /// Restricts the value of a decimal number [`Field`].
    #[must_use]
    pub fn bounds(mut self, min: Bound<Decimal>, max: Bound<Decimal>) -> Self {
        if let Kind::Decimal { min: lo, max: hi } = &mut self.kind {
            *lo = min;
            *hi = max;
        }
        self
    }

    /// Coerces the trimmed non-empty `raw` input into a [`Value`] of this
    /// [`Field`].
    ///
    /// # Errors
    ///
    /// With a human-readable message if the input violates a constraint.
    pub fn coerce(&self, raw: &str) -> Result<Value, String> {
        self.kind
            .coerce(raw)
            .map_err(|reason| format!("{} {reason}", self.label))
    }

    /// Returns the name of this [`Field`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns [`Kind`] of this [`Field`].
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Indicates whether this [`Field`] is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Turns a `snake_case` field name into a sentence-case label.
fn label_of(name: &str) -> String {
    let words = name.replace('_', " ");
    let mut chars = words.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Kind of a [`Field`] along with its constraints.
#[derive(Clone, Debug)]
pub enum Kind {
    /// Free text, optionally restricted in length.
    Text {
        /// Minimal number of characters.
        min: Option<usize>,

        /// Maximal number of characters.
        max: Option<usize>,
    },

    /// Email address.
    Email,

    /// Whole number.
    Integer {
        /// Minimal allowed value.
        min: Option<i64>,

        /// Maximal allowed value.
        max: Option<i64>,
    },

    /// Decimal number.
    Decimal {
        /// Lower bound of the allowed values.
        min: Bound<Decimal>,

        /// Upper bound of the allowed values.
        max: Bound<Decimal>,
    },

    /// One of the enumerated values, matched case-insensitively.
    Choice(&'static [&'static str]),

    /// `YYYY-MM-DD` calendar date.
    Date,

    /// Positive identifier of another record.
    Id,
}

impl Kind {
    /// Coerces the trimmed `raw` input into a [`Value`] of this [`Kind`].
    ///
    /// The error describes the violated constraint, to be prefixed with the
    /// [`Field`] label.
    fn coerce(&self, raw: &str) -> Result<Value, String> {
        match self {
            Self::Text { min, max } => {
                let len = raw.chars().count();
                if let Some(min) = min.filter(|min| len < *min) {
                    return Err(format!("must be at least {min} characters"));
                }
                if let Some(max) = max.filter(|max| len > *max) {
                    return Err(format!("must be at most {max} characters"));
                }
                Ok(Value::Text(raw.to_owned()))
            }
            Self::Email => is_email(raw)
                .then(|| Value::Text(raw.to_owned()))
                .ok_or_else(|| "must be a valid email address".to_owned()),
            Self::Integer { min, max } => {
                let n = raw
                    .parse::<i64>()
                    .map_err(|_| "must be a whole number".to_owned())?;
                if let Some(min) = min.filter(|min| n < *min) {
                    return Err(format!("must be at least {min}"));
                }
                if let Some(max) = max.filter(|max| n > *max) {
                    return Err(format!("must be at most {max}"));
                }
                Ok(Value::Integer(n))
            }
            Self::Decimal { min, max } => {
                let n = Decimal::from_str(raw)
                    .map_err(|_| "must be a number".to_owned())?;
                match min {
                    Bound::Included(min) if n < *min => {
                        return Err(format!("must be at least {min}"));
                    }
                    Bound::Excluded(min) if n <= *min => {
                        return Err(format!("must be greater than {min}"));
                    }
                    Bound::Included(_)
                    | Bound::Excluded(_)
                    | Bound::Unbounded => {}
                }
                match max {
                    Bound::Included(max) if n > *max => {
                        return Err(format!("must be at most {max}"));
                    }
                    Bound::Excluded(max) if n >= *max => {
                        return Err(format!("must be less than {max}"));
                    }
                    Bound::Included(_)
                    | Bound::Excluded(_)
                    | Bound::Unbounded => {}
                }
                Ok(Value::Decimal(n))
            }
            Self::Choice(values) => values
                .iter()
                .copied()
                .find(|v| v.eq_ignore_ascii_case(raw))
                .map(Value::Choice)
                .ok_or_else(|| {
                    format!("must be one of: {}", values.iter().join(", "))
                }),
            Self::Date => Date::parse(raw)
                .map(Value::Date)
                .map_err(|_| "must be a date in YYYY-MM-DD format".to_owned()),
            Self::Id => raw
                .parse::<u64>()
                .ok()
                .filter(|id| *id > 0)
                .map(Value::Id)
                .ok_or_else(|| "must be a positive identifier".to_owned()),
        }
    }
}

/// Checks whether the provided `address` looks like an email address.
#[must_use]
pub fn is_email(address: &str) -> bool {
    /// Regular expression checking the `local@domain.tld` shape.
    static REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
    });

    REGEX.is_match(address)
}

/// Coerced and normalized value of a [`Field`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// Trimmed text, including email addresses.
    Text(String),

    /// Whole number.
    Integer(i64),

    /// Decimal number.
    Decimal(Decimal),

    /// Canonical spelling of an enumerated value.
    Choice(&'static str),

    /// Calendar date.
    Date(Date),

    /// Positive record identifier.
    Id(u64),
}

/// Conversion of a [`Value`] into a typed field.
pub trait FromValue: Sized {
    /// Converts the provided [`Value`], if it has a matching shape.
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            Value::Choice(s) => Some(s.to_owned()),
            Value::Integer(_)
            | Value::Decimal(_)
            | Value::Date(_)
            | Value::Id(_) => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(n),
            Value::Text(_)
            | Value::Decimal(_)
            | Value::Choice(_)
            | Value::Date(_)
            | Value::Id(_) => None,
        }
    }
}

impl FromValue for u8 {
    fn from_value(value: Value) -> Option<Self> {
        i64::from_value(value).and_then(|n| n.try_into().ok())
    }
}

impl FromValue for u32 {
    fn from_value(value: Value) -> Option<Self> {
        i64::from_value(value).and_then(|n| n.try_into().ok())
    }
}

impl FromValue for Decimal {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Decimal(n) => Some(n),
            Value::Integer(n) => Some(Self::from(n)),
            Value::Text(_) | Value::Choice(_) | Value::Date(_) | Value::Id(_) => {
                None
            }
        }
    }
}

impl<Of: ?Sized> FromValue for DateOf<Of> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(d.coerce()),
            Value::Text(_)
            | Value::Integer(_)
            | Value::Decimal(_)
            | Value::Choice(_)
            | Value::Id(_) => None,
        }
    }
}

/// Successfully validated [`Form`] values, keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct Valid(BTreeMap<&'static str, Value>);

impl Valid {
    /// Stores the `value` of the field with the provided `name`.
    fn insert(&mut self, name: &'static str, value: Value) {
        drop(self.0.insert(name, value));
    }

    /// Returns the [`Value`] of the field with the provided `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Takes the value of an optional field.
    ///
    /// # Errors
    ///
    /// If the present value doesn't match the requested type, meaning the
    /// decoding disagrees with the [`Schema`].
    pub fn optional<T: FromValue>(
        &mut self,
        name: &'static str,
    ) -> Result<Option<T>, FieldErrors> {
        self.0
            .remove(name)
            .map(|v| {
                T::from_value(v)
                    .ok_or_else(|| FieldErrors::single(name, "has unexpected type"))
            })
            .transpose()
    }

    /// Takes the value of a required field.
    ///
    /// # Errors
    ///
    /// If the value is missing or has an unexpected type.
    pub fn required<T: FromValue>(
        &mut self,
        name: &'static str,
    ) -> Result<T, FieldErrors> {
        self.optional(name)?
            .ok_or_else(|| FieldErrors::single(name, "is missing"))
    }

    /// Takes the value of a required choice field and parses it.
    ///
    /// # Errors
    ///
    /// If the value is missing or is not a valid `T`.
    pub fn choice<T: FromStr>(
        &mut self,
        name: &'static str,
    ) -> Result<T, FieldErrors> {
        self.required::<String>(name)?
            .parse()
            .map_err(|_| FieldErrors::single(name, "has unexpected value"))
    }
}

/// Validation failures keyed by field name, in [`Schema`] order.
#[derive(Clone, Debug, Default, Eq, Error, PartialEq)]
pub struct FieldErrors {
    /// Field names along with human-readable messages.
    errors: Vec<(&'static str, String)>,
}

impl FieldErrors {
    /// Creates new [`FieldErrors`] with a single error for the field with the
    /// provided `name`.
    #[must_use]
    pub fn single(name: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(name, message);
        errors
    }

    /// Adds an error `message` for the field with the provided `name`.
    pub fn push(&mut self, name: &'static str, message: impl Into<String>) {
        self.errors.push((name, message.into()));
    }

    /// Returns the error message of the field with the provided `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, msg)| msg.as_str())
    }

    /// Iterates over field names and their error messages.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(n, msg)| (*n, msg.as_str()))
    }

    /// Returns the number of invalid fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Indicates whether there are no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.errors.iter().format_with("; ", |(_, msg), f| f(msg)),
        )
    }
}

#[cfg(test)]
mod spec {
    use std::ops::Bound;

    use common::Date;
    use rust_decimal::Decimal;

    use super::{Field, Form, Schema, Value};

    fn product() -> Schema {
        Schema::new([
            Field::text("name").required().length(Some(3), Some(255)),
            Field::text("description").required().length(Some(10), None),
            Field::decimal("price")
                .required()
                .bounds(Bound::Excluded(Decimal::ZERO), Bound::Unbounded),
            Field::integer("stock").required().range(Some(0), None),
            Field::choice("status", &["Active", "Draft"]).required(),
            Field::date("available_on"),
        ])
    }

    fn valid_form() -> Form {
        Form::new()
            .with("name", "  Desk lamp ")
            .with("description", "Warm light for late reading")
            .with("price", "19.90")
            .with("stock", "12")
            .with("status", "draft")
    }

    #[test]
    fn keeps_verbatim_values_untrimmed() {
        let schema = Schema::new([
            Field::text("password").length(Some(6), None).verbatim(),
            Field::text("name"),
        ]);
        let form = Form::new()
            .with("password", "  secret  ")
            .with("name", "  Jane ");

        let valid = schema.validate(&form).unwrap();

        assert_eq!(
            valid.get("password"),
            Some(&Value::Text("  secret  ".to_owned())),
        );
        assert_eq!(valid.get("name"), Some(&Value::Text("Jane".to_owned())));
    }

    #[test]
    fn coerces_and_normalizes() {
        let valid = product().validate(&valid_form()).unwrap();

        assert_eq!(
            valid.get("name"),
            Some(&Value::Text("Desk lamp".to_owned())),
        );
        assert_eq!(
            valid.get("price"),
            Some(&Value::Decimal("19.90".parse().unwrap())),
        );
        assert_eq!(valid.get("stock"), Some(&Value::Integer(12)));
        assert_eq!(valid.get("status"), Some(&Value::Choice("Draft")));
        assert_eq!(valid.get("available_on"), None);
    }

    #[test]
    fn reports_every_invalid_field() {
        let form = Form::new()
            .with("name", "ab")
            .with("description", "short")
            .with("price", "0")
            .with("stock", "1.5")
            .with("status", "archived")
            .with("available_on", "tomorrow");

        let errors = product().validate(&form).unwrap_err();

        assert_eq!(errors.len(), 6);
        assert_eq!(
            errors.get("name"),
            Some("Name must be at least 3 characters"),
        );
        assert_eq!(
            errors.get("description"),
            Some("Description must be at least 10 characters"),
        );
        assert_eq!(errors.get("price"), Some("Price must be greater than 0"));
        assert_eq!(errors.get("stock"), Some("Stock must be a whole number"));
        assert_eq!(
            errors.get("status"),
            Some("Status must be one of: Active, Draft"),
        );
        assert_eq!(
            errors.get("available_on"),
            Some("Available on must be a date in YYYY-MM-DD format"),
        );
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let form = valid_form().with("name", "   ").with("stock", "");

        let errors = product().validate(&form).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("stock"), Some("Stock is required"));
    }

    #[test]
    fn ignores_unknown_fields() {
        let form = valid_form().with("color", "green");

        assert!(product().validate(&form).is_ok());
    }

    #[test]
    fn applies_defaults_and_labels() {
        let schema = Schema::new([
            Field::date("registered_on")
                .or_default(|| Value::Date(Date::from_ymd(2024, 1, 2).unwrap())),
            Field::id("category_id").required().label("Category"),
            Field::email("email").required(),
        ]);

        let errors = schema
            .validate(&Form::new().with("category_id", "0").with("email", "x@y"))
            .unwrap_err();
        assert_eq!(
            errors.get("category_id"),
            Some("Category must be a positive identifier"),
        );
        assert_eq!(
            errors.get("email"),
            Some("Email must be a valid email address"),
        );
        assert_eq!(errors.get("registered_on"), None);

        let mut valid = schema
            .validate(
                &Form::new()
                    .with("category_id", "7")
                    .with("email", "jane@shop.test"),
            )
            .unwrap();
        assert_eq!(
            valid.required::<Date>("registered_on").unwrap(),
            Date::from_ymd(2024, 1, 2).unwrap(),
        );
        assert_eq!(valid.get("category_id"), Some(&Value::Id(7)));
    }

    #[test]
    fn displays_messages_in_schema_order() {
        let errors = product()
            .validate(&Form::new().with("name", "Lamp"))
            .unwrap_err();

        assert_eq!(
            errors.to_string(),
            "Description is required; Price is required; \
             Stock is required; Status is required",
        );
    }
}
