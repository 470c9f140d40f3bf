//! [`Tax`] definitions.

use std::{ops::Bound, sync::LazyLock};

use rust_decimal::Decimal;

use crate::{
    domain::record::{self, Activity, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Tax applied to orders of a region.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tax {
    /// Name of this [`Tax`].
    pub name: String,

    /// Rate of this [`Tax`], in percents.
    pub rate: Decimal,

    /// Region this [`Tax`] applies to.
    pub region: String,

    /// [`Activity`] status of this [`Tax`].
    pub status: Activity,
}

impl Resource for Tax {
    type Status = Activity;

    const NAME: &'static str = "Tax";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("name", 2, 50).required(),
                Field::decimal("rate").required().bounds(
                    Bound::Included(Decimal::ZERO),
                    Bound::Included(Decimal::ONE_HUNDRED),
                ),
                record::text("region", 2, 100).required(),
                Field::choice("status", Activity::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        Ok(Self {
            name: valid.required("name")?,
            rate: valid.required("rate")?,
            region: valid.required("region")?,
            status: valid.choice("status")?,
        })
    }

    fn to_form(&self) -> Form {
        Form::new()
            .with("name", &self.name)
            .with("rate", self.rate.to_string())
            .with("region", &self.region)
            .with("status", self.status.to_string())
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [self.name.as_str(), self.region.as_str()].into_iter()
    }
}
