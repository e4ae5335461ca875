//! `define_port_error!` declares an adapter-facing error enum together with
//! one snake-case constructor per variant, so adapters write
//! `UserCacheError::backend("reset")` instead of spelling out struct syntax.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $( define_port_error!(@constructor $variant $( { $($field : $ty),* } )?); )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("`", stringify!($variant), "` failure.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[doc = concat!("`", stringify!($variant), "` failure.")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;
