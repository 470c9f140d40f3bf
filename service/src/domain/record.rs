//! [`Record`] definitions shared by every managed resource.

use std::fmt;

use common::define_kind;
use derive_more::{Deref, Display, From, FromStr, Into};

use crate::validation::{self, FieldErrors, Form, FromValue, Schema, Valid, Value};

/// Record of a `T` resource stored in a [`ResourceListStore`].
///
/// [`ResourceListStore`]: crate::store::ResourceListStore
#[derive(Clone, Debug, Deref, Eq, PartialEq)]
pub struct Record<T> {
    /// ID of this [`Record`], unique within its collection.
    pub id: Id,

    /// Domain fields of this [`Record`].
    #[deref]
    pub fields: T,
}

/// ID of a [`Record`].
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
pub struct Id(u64);

impl Id {
    /// Returns the [`Id`] following this one, if it's not the last one.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl FromValue for Id {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Id(id) => Some(Self(id)),
            Value::Text(_)
            | Value::Integer(_)
            | Value::Decimal(_)
            | Value::Choice(_)
            | Value::Date(_) => None,
        }
    }
}

define_kind! {
    /// Activity status shared by most resources.
    enum Activity {
        /// Record is in use.
        Active,

        /// Record is hidden from the storefront.
        Inactive,
    }
}

/// Resource managed by a [`ResourceListStore`].
///
/// [`ResourceListStore`]: crate::store::ResourceListStore
pub trait Resource: Clone {
    /// Status enumeration of this [`Resource`].
    type Status: Copy + Eq + fmt::Display;

    /// Human-readable name of this [`Resource`].
    const NAME: &'static str;

    /// Returns the [`Schema`] forms of this [`Resource`] are validated with.
    fn schema() -> &'static Schema;

    /// Builds this [`Resource`] out of the [`Valid`] values of its
    /// [`Schema`].
    ///
    /// # Errors
    ///
    /// If the values violate a constraint spanning several fields.
    fn decode(valid: Valid) -> Result<Self, FieldErrors>;

    /// Renders this [`Resource`] back into a [`Form`] for editing.
    fn to_form(&self) -> Form;

    /// Returns the status of this [`Resource`].
    fn status(&self) -> Self::Status;

    /// Returns the text fields free-text search is performed over.
    fn search_fields(&self) -> impl Iterator<Item = &str>;

    /// Validates the provided [`Form`] and builds this [`Resource`] out of it.
    ///
    /// # Errors
    ///
    /// With every invalid field, if any.
    fn from_form(form: &Form) -> Result<Self, FieldErrors> {
        Self::decode(Self::schema().validate(form)?)
    }
}

/// Validates the provided [`Form`] into a `T` [`Resource`].
///
/// # Errors
///
/// With every invalid field, if any.
pub fn validate<T: Resource>(form: &Form) -> Result<T, FieldErrors> {
    T::from_form(form)
}

/// Helper for building text [`validation::Field`]s with both length bounds.
pub(crate) fn text(
    name: &'static str,
    min: usize,
    max: usize,
) -> validation::Field {
    validation::Field::text(name).length(Some(min), Some(max))
}
