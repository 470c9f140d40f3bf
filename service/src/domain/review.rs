//! [`Review`] definitions.

use std::sync::LazyLock;

use common::define_kind;

#[cfg(doc)]
use crate::domain::Product;
use crate::{
    domain::record::{self, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Customer review of a [`Product`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Review {
    /// ID of the reviewed [`Product`].
    ///
    /// Lookup only: the referenced [`Product`] is not required to exist.
    pub product_id: record::Id,

    /// Name of the reviewing customer.
    pub customer: String,

    /// Rating from `1` to `5`.
    pub rating: u8,

    /// Review text.
    pub comment: String,

    /// Moderation [`Status`] of this [`Review`].
    pub status: Status,
}

define_kind! {
    /// Moderation status of a [`Review`].
    enum Status {
        /// Published on the storefront.
        Approved,

        /// Awaiting moderation.
        Pending,

        /// Hidden by a moderator.
        Rejected,
    }
}

impl Resource for Review {
    type Status = Status;

    const NAME: &'static str = "Review";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                Field::id("product_id").required().label("Product"),
                record::text("customer", 2, 100).required(),
                Field::integer("rating").required().range(Some(1), Some(5)),
                record::text("comment", 10, 1000).required(),
                Field::choice("status", Status::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            product_id: valid.required("product_id")?,
            customer: valid.required("customer")?,
            rating: valid.required("rating")?,
            comment: valid.required("comment")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("product_id", self.product_id.to_string())
            .with("customer", &self.customer)
            .with("rating", self.rating.to_string())
            .with("comment", &self.comment)
            .with("status", self.status.to_string())
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [self.customer.as_str(), self.comment.as_str()].into_iter()
    }
}
