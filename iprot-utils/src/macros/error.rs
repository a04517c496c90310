#[doc(hidden)]
#[macro_export]
macro_rules! __static_str_error {
    (
        #[doc = $desc:literal]
        $(#[$m:meta])*
        $vis:vis struct $name:ident;
    ) => {
        #[doc = $desc]
        $(#[$m])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        #[non_exhaustive]
        $vis struct $name;

        impl $name {
            #[doc = concat!("Create a new [`", stringify!($name), "`].")]
            #[must_use]
            pub const fn new() -> Self {
                Self
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($desc)
            }
        }

        impl ::std::error::Error for $name {}
    };
}
#[doc(inline)]
pub use crate::__static_str_error as static_str_error;
