//! [`User`] definitions.

use std::sync::LazyLock;

use common::{define_kind, unit, Date, DateOf};

use crate::{
    domain::record::{self, Activity, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid, Value},
};

/// Platform user listed on the users page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// Full name of this [`User`].
    pub name: String,

    /// Email address of this [`User`].
    pub email: String,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// Day this [`User`] registered.
    pub registered_on: RegistrationDate,

    /// [`Activity`] status of this [`User`].
    pub status: Activity,
}

define_kind! {
    /// Role of a [`User`].
    enum Role {
        /// Full access to the dashboard.
        Admin,

        /// Manages the catalog and orders.
        Manager,

        /// Storefront customer.
        Customer,
    }
}

/// [`DateOf`] a [`User`] registration.
pub type RegistrationDate = DateOf<(User, unit::Registration)>;

impl Resource for User {
    type Status = Activity;

    const NAME: &'static str = "User";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 2, 100).required(),
                Field::email("email").required(),
                Field::choice("role", Role::VALUES).required(),
                Field::date("registered_on")
                    .label("Registration date")
                    .or_default(|| Value::Date(Date::today())),
                Field::choice("status", Activity::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            email: valid.required("email")?,
            role: valid.choice("role")?,
            registered_on: valid.required("registered_on")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("email", &self.email)
            .with("role", self.role.to_string())
            .with("registered_on", self.registered_on.to_string())
            .with("status", self.status.to_string())
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [self.name.as_str(), self.email.as_str()].into_iter()
    }
}
