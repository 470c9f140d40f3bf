//! [`Brand`] definitions.

use std::sync::LazyLock;

use crate::{
    domain::record::{self, Activity, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Brand products are sold under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Brand {
    /// Name of this [`Brand`].
    pub name: String,

    /// Description of this [`Brand`].
    pub description: Option<String>,

    /// Website of this [`Brand`].
    pub website: Option<String>,

    /// [`Activity`] status of this [`Brand`].
    pub status: Activity,
}

impl Resource for Brand {
    type Status = Activity;

    const NAME: &'static str = "Brand";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 2, 50).required(),
                Field::text("description").length(None, Some(500)),
                Field::text("website").length(None, Some(255)),
                Field::choice("status", Activity::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            description: valid.optional("description")?,
            website: valid.optional("website")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("description", self.description.clone().unwrap_or_default())
            .with("website", self.website.clone().unwrap_or_default())
            .with("status", self.status.to_string())
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [Some(self.name.as_str()), self.description.as_deref()]
            .into_iter()
            .flatten()
    }
}
