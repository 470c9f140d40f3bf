//! Resource intents of a [`Dashboard`].

use std::{collections::HashMap, fmt, str::FromStr};

use common::{
    operations::{By, Select},
    Date,
};
use itertools::Itertools as _;
use service::{
    domain::{
        record, Brand, Category, Coupon, Product, Record, Resource, Review,
        Subcategory, Supplier, Tax, User,
    },
    guard::{Decision, Page, Route},
    infra::{
        directory::{Entry, Listing},
        Directory,
    },
    store::NotFound,
    validation::{FieldErrors, Form, FromValue as _},
    ResourceListStore, RouteGuard,
};

use crate::{define_error, AsError};

use super::Dashboard;

/// Resource listed on its own [`Page`] of a [`Dashboard`].
pub trait Listed: Resource<Status: FromStr> + fmt::Debug {
    /// [`Page`] listing this resource.
    const PAGE: Page;

    /// Returns the [`ResourceListStore`] of this resource.
    fn store(stores: &Stores) -> &ResourceListStore<Self>;

    /// Returns the mutable [`ResourceListStore`] of this resource.
    fn store_mut(stores: &mut Stores) -> &mut ResourceListStore<Self>;
}

/// Declares [`Stores`] and the [`Listed`] implementations of its resources.
macro_rules! stores {
    ($($field:ident: $ty:ident => $page:ident),* $(,)?) => {
        /// [`ResourceListStore`]s of every [`Listed`] resource, along with
        /// their search terms.
        #[derive(Debug, Default)]
        pub struct Stores {
            $(
                #[doc = concat!("[`", stringify!($ty), "`] records.")]
                pub $field: ResourceListStore<$ty>,
            )*

            /// Free-text search term of each [`Page`].
            terms: HashMap<Page, String>,
        }

        $(
            impl Listed for $ty {
                const PAGE: Page = Page::$page;

                fn store(stores: &Stores) -> &ResourceListStore<Self> {
                    &stores.$field
                }

                fn store_mut(
                    stores: &mut Stores,
                ) -> &mut ResourceListStore<Self> {
                    &mut stores.$field
                }
            }
        )*
    };
}

stores! {
    categories: Category => Categories,
    subcategories: Subcategory => Subcategories,
    brands: Brand => Brands,
    suppliers: Supplier => Suppliers,
    taxes: Tax => Taxes,
    coupons: Coupon => Coupons,
    reviews: Review => Reviews,
    users: User => Users,
    products: Product => Products,
}

impl Stores {
    /// Returns the search term of the `T` resource.
    #[must_use]
    pub fn term<T: Listed>(&self) -> &str {
        self.terms.get(&T::PAGE).map_or("", String::as_str)
    }

    /// Returns the `T` [`Record`]s matching the search term of the `T`
    /// resource and the provided `status`, if any.
    pub fn visible<'s, T: Listed + 's>(
        &'s self,
        status: Option<T::Status>,
    ) -> impl Iterator<Item = &'s Record<T>> + 's {
        T::store(self).search_with(self.term::<T>(), status)
    }
}

define_error! {
    enum Refusal {
        #[code = "UNAUTHENTICATED"]
        #[message = "Sign in to manage the store"]
        Unauthenticated,
    }
}

impl<St, Dir> Dashboard<St, Dir> {
    /// Creates a new `T` record out of the provided [`Form`].
    pub fn create<T: Listed>(&mut self, form: &Form) -> bool {
        if !self.admit(T::PAGE) {
            return false;
        }

        match T::store_mut(&mut self.stores).submit(form) {
            Ok(record) => {
                self.succeed(format!("{} #{} created", T::NAME, record.id))
            }
            Err(e) => self.fail(e),
        }
    }

    /// Updates the `T` record with the provided `id` by the provided
    /// [`Form`].
    ///
    /// Fields missing in the [`Form`] keep their current values.
    pub fn update<T: Listed>(&mut self, id: record::Id, form: &Form) -> bool {
        if !self.admit(T::PAGE) {
            return false;
        }

        let store = T::store_mut(&mut self.stores);
        let form = store
            .get(id)
            .map_or_else(|| form.clone(), |r| r.to_form().merge(form.clone()));
        match store.submit_update(id, &form) {
            Ok(record) => {
                self.succeed(format!("{} #{} updated", T::NAME, record.id))
            }
            Err(e) => self.fail(e),
        }
    }

    /// Deletes the `T` record with the provided `id`.
    pub fn delete<T: Listed>(&mut self, id: record::Id) -> bool {
        if !self.admit(T::PAGE) {
            return false;
        }

        if T::store_mut(&mut self.stores).delete(id) {
            self.succeed(format!("{} #{id} deleted", T::NAME))
        } else {
            self.fail(NotFound(id))
        }
    }

    /// Sets the search `term` of the `T` resource and returns the matching
    /// records, narrowed to the provided `status` (if any).
    ///
    /// Returns [`None`] if the records cannot be shown.
    pub fn search<T: Listed>(
        &mut self,
        term: &str,
        status: Option<&str>,
    ) -> Option<Vec<Record<T>>> {
        if !self.admit(T::PAGE) {
            return None;
        }

        let status = match status.map(status_of::<T>).transpose() {
            Ok(status) => status,
            Err(e) => {
                _ = self.fail(e);
                return None;
            }
        };

        drop(self.stores.terms.insert(T::PAGE, term.trim().to_owned()));
        Some(self.stores.visible::<T>(status).cloned().collect())
    }

    /// Checks whether the [`Page`] of a resource may be rendered now,
    /// notifying the user otherwise.
    fn admit(&mut self, page: Page) -> bool {
        match RouteGuard.decide(&self.session(), Route::Page(page)) {
            Decision::Render(_) => true,
            Decision::Wait | Decision::Redirect { .. } => {
                self.fail(Refusal::Unauthenticated)
            }
        }
    }
}

/// Parses the provided `raw` status of the `T` resource the same way its
/// forms do.
fn status_of<T: Listed>(raw: &str) -> Result<T::Status, FieldErrors> {
    let field = T::schema()
        .fields()
        .iter()
        .find(|f| f.name() == "status")
        .ok_or_else(|| FieldErrors::single("status", "Status is unknown"))?;
    let canonical = field
        .coerce(raw.trim())
        .map_err(|msg| FieldErrors::single("status", msg))
        .and_then(|v| {
            String::from_value(v).ok_or_else(|| {
                FieldErrors::single("status", "Status is unknown")
            })
        })?;
    canonical
        .parse()
        .map_err(|_| FieldErrors::single("status", "Status is unknown"))
}

impl<St, Dir> Dashboard<St, Dir>
where
    Dir: Directory<Select<By<Vec<Entry>, Listing>>, Ok = Vec<Entry>>,
    Dir::Err: AsError + fmt::Display,
{
    /// Replaces the listed users with the ones of the remote directory.
    ///
    /// Imported users are active customers registered today.
    pub async fn import_users(&mut self) -> bool {
        if !self.admit(Page::Users) {
            return false;
        }

        match self.directory.execute(Select(By::new(Listing))).await {
            Ok(entries) => {
                let today = Date::today();
                let records = entries
                    .into_iter()
                    .filter(|e| e.id > 0)
                    .unique_by(|e| e.id)
                    .map(|e| e.into_record(today))
                    .collect::<Vec<_>>();
                let count = records.len();
                self.stores.users.replace_all(records);
                self.succeed(format!("Imported {count} users"))
            }
            Err(e) => self.fail(e),
        }
    }
}

impl AsError for Refusal {
    fn try_as_error(&self) -> Option<crate::Error> {
        Some((*self).into())
    }
}

#[cfg(test)]
mod spec {
    use service::{
        domain::{
            record, user::Role, Category, Coupon, Product, Record, Review,
            User,
        },
        infra::directory::Entry,
        validation::Form,
    };

    use crate::{
        dashboard::spec::{dashboard, signed_in, Fixed},
        notification::Level,
    };

    fn category(name: &str) -> Form {
        Form::new()
            .with("name", name)
            .with("description", "Everyday goods")
            .with("status", "active")
    }

    #[tokio::test]
    async fn refuses_resource_intents_when_signed_out() {
        let mut dashboard = dashboard(Fixed::default());
        assert!(dashboard.restore().await);

        assert!(!dashboard.create::<Category>(&category("Kitchen")));
        assert!(dashboard.search::<Category>("", None).is_none());
        assert!(dashboard.stores().categories.is_empty());
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Sign in to manage the store",
        );
    }

    #[tokio::test]
    async fn issues_never_reused_ids() {
        let mut dashboard = signed_in(Fixed::default()).await;

        assert!(dashboard.create::<Category>(&category("Kitchen")));
        assert!(dashboard.create::<Category>(&category("Garden")));
        assert!(dashboard.create::<Category>(&category("Toys")));
        assert!(dashboard.delete::<Category>(record::Id::from(3_u64)));
        assert!(dashboard.create::<Category>(&category("Books")));

        let ids = dashboard
            .stores()
            .categories
            .iter()
            .map(|r| u64::from(r.id))
            .collect::<Vec<_>>();
        assert_eq!(ids, [1, 2, 4]);
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Category #4 created",
        );
    }

    #[tokio::test]
    async fn reports_field_errors_on_invalid_form() {
        let mut dashboard = signed_in(Fixed::default()).await;

        let form = Form::new()
            .with("product_id", "1")
            .with("customer", "J")
            .with("rating", "6")
            .with("comment", "Great!")
            .with("status", "approved");

        assert!(!dashboard.create::<Review>(&form));
        let latest = dashboard.notifications().latest().unwrap();
        assert_eq!(latest.level, Level::Error);
        assert_eq!(
            latest.message,
            "Customer must be at least 2 characters; \
             Rating must be at most 5; \
             Comment must be at least 10 characters",
        );
        assert!(dashboard.stores().reviews.is_empty());
    }

    #[tokio::test]
    async fn updates_keeping_missing_fields() {
        let mut dashboard = signed_in(Fixed::default()).await;
        let form = Form::new()
            .with("name", "Kettle")
            .with("description", "Boils water quickly")
            .with("price", "19.99")
            .with("stock", "10")
            .with("category_id", "1")
            .with("status", "draft");
        assert!(dashboard.create::<Product>(&form));

        assert!(dashboard.update::<Product>(
            record::Id::from(1_u64),
            &Form::new().with("stock", "0").with("status", "OutOfStock"),
        ));

        let product = dashboard.stores().products.get(1_u64.into()).unwrap();
        assert_eq!(product.name, "Kettle");
        assert_eq!(product.stock, 0);
        assert_eq!(product.status.to_string(), "OutOfStock");

        assert!(!dashboard.update::<Product>(record::Id::from(9_u64), &form));
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Record #9 does not exist",
        );
    }

    #[tokio::test]
    async fn deletes_idempotently() {
        let mut dashboard = signed_in(Fixed::default()).await;
        assert!(dashboard.create::<Category>(&category("Kitchen")));

        assert!(dashboard.delete::<Category>(1_u64.into()));
        assert!(!dashboard.delete::<Category>(1_u64.into()));
        assert_eq!(
            dashboard.notifications().latest().unwrap().level,
            Level::Error,
        );
    }

    #[tokio::test]
    async fn searches_and_filters_by_status() {
        let mut dashboard = signed_in(Fixed::default()).await;
        for (code, status) in [
            ("SUMMER10", "active"),
            ("WINTER5", "expired"),
            ("SUMMER20", "inactive"),
        ] {
            let form = Form::new()
                .with("code", code)
                .with("discount_type", "percentage")
                .with("discount", "10")
                .with("expires_on", "2030-01-01")
                .with("status", status);
            assert!(dashboard.create::<Coupon>(&form));
        }

        let codes = |records: Vec<Record<Coupon>>| {
            records.into_iter().map(|r| r.fields.code).collect::<Vec<_>>()
        };
        assert_eq!(
            codes(dashboard.search::<Coupon>("summer", None).unwrap()),
            ["SUMMER10", "SUMMER20"],
        );
        assert_eq!(dashboard.stores().term::<Coupon>(), "summer");
        assert_eq!(
            codes(dashboard.search::<Coupon>(" ", Some("ACTIVE")).unwrap()),
            ["SUMMER10"],
        );
        assert!(dashboard.search::<Coupon>("", Some("archived")).is_none());
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Status must be one of: Active, Inactive, Expired",
        );
    }

    #[tokio::test]
    async fn imports_users_from_directory() {
        let entries = vec![
            Entry {
                id: 1,
                name: "Leanne Graham".to_owned(),
                email: "Sincere@april.biz".to_owned(),
            },
            Entry {
                id: 2,
                name: "Ervin Howell".to_owned(),
                email: "Shanna@melissa.tv".to_owned(),
            },
        ];
        let mut dashboard = signed_in(Fixed(Some(entries))).await;

        assert!(dashboard.import_users().await);

        let users = dashboard.stores().users.snapshot();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].name, "Ervin Howell");
        assert_eq!(users[1].role, Role::Customer);
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "Imported 2 users",
        );

        let form = Form::new()
            .with("name", "Clementine Bauch")
            .with("email", "nathan@yesenia.net")
            .with("role", "manager")
            .with("status", "active");
        assert!(dashboard.create::<User>(&form));
        let created = dashboard.stores().users.get(3_u64.into()).unwrap();
        assert_eq!(created.name, "Clementine Bauch");
    }

    #[tokio::test]
    async fn refuses_creating_once_ids_run_out() {
        let entries = vec![Entry {
            id: u64::MAX,
            name: "Leanne Graham".to_owned(),
            email: "Sincere@april.biz".to_owned(),
        }];
        let mut dashboard = signed_in(Fixed(Some(entries))).await;
        assert!(dashboard.import_users().await);

        let form = Form::new()
            .with("name", "Clementine Bauch")
            .with("email", "nathan@yesenia.net")
            .with("role", "manager")
            .with("status", "active");
        assert!(!dashboard.create::<User>(&form));

        assert_eq!(dashboard.stores().users.len(), 1);
        assert_eq!(
            dashboard.notifications().latest().unwrap().message,
            "No more records can be created",
        );
    }
}
