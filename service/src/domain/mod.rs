//! Domain definitions.

pub mod account;
pub mod brand;
pub mod category;
pub mod coupon;
pub mod product;
pub mod record;
pub mod review;
pub mod session;
pub mod subcategory;
pub mod supplier;
pub mod tax;
pub mod user;

pub use self::{
    account::Account,
    brand::Brand,
    category::Category,
    coupon::Coupon,
    product::Product,
    record::{Record, Resource},
    review::Review,
    session::Session,
    subcategory::Subcategory,
    supplier::Supplier,
    tax::Tax,
    user::User,
};
