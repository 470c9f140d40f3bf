//! [`Product`] definitions.

use std::{ops::Bound, sync::LazyLock};

use common::define_kind;
use rust_decimal::Decimal;

#[cfg(doc)]
use crate::domain::Category;
use crate::{
    domain::record::{self, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Catalog product.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Product {
    /// Name of this [`Product`].
    pub name: String,

    /// Description of this [`Product`].
    pub description: String,

    /// Unit price.
    pub price: Decimal,

    /// Units in stock.
    pub stock: u32,

    /// ID of the [`Category`] this [`Product`] is listed in.
    pub category_id: record::Id,

    /// [`Status`] of this [`Product`].
    pub status: Status,
}

define_kind! {
    /// Listing status of a [`Product`].
    enum Status {
        /// Listed on the storefront.
        Active,

        /// Not published yet.
        Draft,

        /// Listed, but cannot be ordered.
        OutOfStock,
    }
}

impl Resource for Product {
    type Status = Status;

    const NAME: &'static str = "Product";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 3, 255).required(),
                Field::text("description").required().length(Some(10), None),
                Field::decimal("price")
                    .required()
                    .bounds(Bound::Excluded(Decimal::ZERO), Bound::Unbounded),
                Field::integer("stock")
                    .required()
                    .range(Some(0), Some(u32::MAX.into())),
                Field::id("category_id").required().label("Category"),
                Field::choice("status", Status::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            description: valid.required("description")?,
            price: valid.required("price")?,
            stock: valid.required("stock")?,
            category_id: valid.required("category_id")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("description", &self.description)
            .with("price", self.price.to_string())
            .with("stock", self.stock.to_string())
            .with("category_id", self.category_id.to_string())
            .with("status", self.status.to_string())
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [self.name.as_str(), self.description.as_str()].into_iter()
    }
}
