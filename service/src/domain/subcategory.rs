//! [`Subcategory`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use crate::domain::Category;
use crate::{
    domain::record::{self, Activity, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Subdivision of a [`Category`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subcategory {
    /// Name of this [`Subcategory`].
    pub name: String,

    /// ID of the [`Category`] this [`Subcategory`] belongs to.
    ///
    /// Lookup only: the referenced [`Category`] is not required to exist.
    pub category_id: record::Id,

    /// Description of this [`Subcategory`].
    pub description: Option<String>,

    /// [`Activity`] status of this [`Subcategory`].
    pub status: Activity,
}

impl Resource for Subcategory {
    type Status = Activity;

    const NAME: &'static str = "Subcategory";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 2, 50).required(),
                Field::id("category_id").required().label("Category"),
                Field::text("description").length(None, Some(500)),
                Field::choice("status", Activity::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            category_id: valid.required("category_id")?,
            description: valid.optional("description")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("category_id", self.category_id.to_string())
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
