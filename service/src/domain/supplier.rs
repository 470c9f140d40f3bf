//! [`Supplier`] definitions.

use std::sync::LazyLock;

use crate::{
    domain::record::{self, Activity, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Supplier stock is purchased from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Supplier {
    /// Company name of this [`Supplier`].
    pub name: String,

    /// Name of the contact person at this [`Supplier`].
    pub contact_name: String,

    /// Contact email address.
    pub email: String,

    /// Contact phone number.
    pub phone: Option<String>,

    /// Postal address.
    pub address: Option<String>,

    /// [`Activity`] status of this [`Supplier`].
    pub status: Activity,
}

impl Resource for Supplier {
    type Status = Activity;

    const NAME: &'static str = "Supplier";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 2, 100).required(),
                record::text("contact_name", 2, 100).required(),
                Field::email("email").required(),
                record::text("phone", 7, 20),
                Field::text("address").length(None, Some(255)),
                Field::choice("status", Activity::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            contact_name: valid.required("contact_name")?,
            email: valid.required("email")?,
            phone: valid.optional("phone")?,
            address: valid.optional("address")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("contact_name", &self.contact_name)
            .with("email", &self.email)
            .with("phone", self.phone.clone().unwrap_or_default())
            .with("address", self.address.clone().unwrap_or_default())
            .with("status", self.status.to_string())
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.name.as_str(),
            self.contact_name.as_str(),
            self.email.as_str(),
        ]
        .into_iter()
    }
}
