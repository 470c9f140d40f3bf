//! [`Category`] definitions.

use std::sync::LazyLock;

use crate::{
    domain::record::{self, Activity, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Product category.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Category {
    /// Name of this [`Category`].
    pub name: String,

    /// Description of this [`Category`].
    pub description: Option<String>,

    /// [`Activity`] status of this [`Category`].
    pub status: Activity,
}

impl Resource for Category {
    type Status = Activity;

    const NAME: &'static str = "Category";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 2, 50).required(),
                Field::text("description").length(None, Some(500)),
                Field::choice("status", Activity::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            description: valid.optional("description")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("description", self.description.clone().unwrap_or_default())
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
