//! [`Coupon`] definitions.

use std::{ops::Bound, sync::LazyLock};

use common::{define_kind, unit, DateOf};
use rust_decimal::Decimal;

use crate::{
    domain::record::{self, Resource},
    validation::{Field, FieldErrors, Form, Schema, Valid},
};

/// Discount coupon redeemable at checkout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Coupon {
    /// Code customers enter, always upper-cased.
    pub code: String,

    /// [`DiscountType`] of this [`Coupon`].
    pub discount_type: DiscountType,

    /// Discount amount: percents or a fixed sum, depending on
    /// [`Coupon::discount_type`].
    pub discount: Decimal,

    /// Minimal order total this [`Coupon`] applies to.
    pub min_order: Option<Decimal>,

    /// Maximal number of redemptions.
    pub usage_limit: Option<u32>,

    /// Last day this [`Coupon`] may be redeemed.
    pub expires_on: ExpirationDate,

    /// [`Status`] of this [`Coupon`].
    pub status: Status,
}

define_kind! {
    /// Way a [`Coupon`] discount is computed.
    enum DiscountType {
        /// Percentage of the order total.
        Percentage,

        /// Fixed amount subtracted from the order total.
        Fixed,
    }
}

define_kind! {
    /// Status of a [`Coupon`].
    enum Status {
        /// May be redeemed.
        Active,

        /// Disabled manually.
        Inactive,

        /// Past its expiration date.
        Expired,
    }
}

/// [`DateOf`] a [`Coupon`] expiration.
pub type ExpirationDate = DateOf<(Coupon, unit::Expiration)>;

impl Resource for Coupon {
    type Status = Status;

    const NAME: &'static str = "Coupon";

    fn schema() -> &'static Schema {
        static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new([
                record::text("code", 3, 20).required(),
                Field::choice("discount_type", DiscountType::VALUES).required(),
                Field::decimal("discount")
                    .required()
                    .bounds(Bound::Excluded(Decimal::ZERO), Bound::Unbounded),
                Field::decimal("min_order")
                    .label("Minimum order")
                    .bounds(Bound::Included(Decimal::ZERO), Bound::Unbounded),
                Field::integer("usage_limit").range(Some(1), Some(u32::MAX.into())),
                Field::date("expires_on").required().label("Expiration date"),
                Field::choice("status", Status::VALUES).required(),
            ])
        });

        &SCHEMA
    }

    fn decode(mut valid: Valid) -> Result<Self, FieldErrors> {
        let coupon = Self {
            code: valid.required::<String>("code")?.to_uppercase(),
            discount_type: valid.choice("discount_type")?,
            discount: valid.required("discount")?,
            min_order: valid.optional("min_order")?,
            usage_limit: valid.optional("usage_limit")?,
            expires_on: valid.required("expires_on")?,
            status: valid.choice("status")?,
        };

        if coupon.discount_type == DiscountType::Percentage
            && coupon.discount > Decimal::ONE_HUNDRED
        {
            return Err(FieldErrors::single(
                "discount",
                "Discount must be at most 100 percent",
            ));
        }

        Ok(coupon)
    }

    fn to_form(&self) -> Form {
        let mut form = Form::new()
            .with("code", &self.code)
            .with("discount_type", self.discount_type.to_string())
            .with("discount", self.discount.to_string())
            .with("expires_on", self.expires_on.to_string())
            .with("status", self.status.to_string());
        if let Some(min_order) = self.min_order {
            form.insert("min_order", min_order.to_string());
        }
        if let Some(limit) = self.usage_limit {
            form.insert("usage_limit", limit.to_string());
        }
        form
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn search_fields(&self) -> impl Iterator<Item = &str> {
        [self.code.as_str()].into_iter()
    }
}
