//! Macros for defining kind enums.

/// Macro for defining a kind enum, whose variants form a closed set of
/// values accepted from textual input.
///
/// Values are displayed in `PascalCase` and parsed case-insensitively, while
/// the `VALUES` constant lists every accepted value in declaration order.
///
/// # Example
///
/// ```rust
/// common::define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube,
///
///         #[doc = "A sphere"]
///         Sphere,
///     }
/// }
///
/// assert_eq!("sphere".parse::<Kind>().unwrap(), Kind::Sphere);
/// assert_eq!(Kind::VALUES, &["Cube", "Sphere"]);
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        $(#[doc = $doc:literal])+
        enum $name:ident {
            $(
                $(#[doc = $variant_doc:literal])+
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::EnumString,
            $crate::private::strum::VariantNames,
            Eq,
            Hash,
            PartialEq,
        )]
        $(#[doc = $doc])+
        #[strum(serialize_all = "PascalCase", ascii_case_insensitive)]
        pub enum $name {
            $(
                $(#[doc = $variant_doc])+
                $variant,
            )*
        }

        impl $name {
            /// Every accepted textual value, in declaration order.
            pub const VALUES: &'static [&'static str] =
                <Self as $crate::private::strum::VariantNames>::VARIANTS;
        }
    };
}
