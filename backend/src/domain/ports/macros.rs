//! Helper macro for port error enums.
//!
//! Every variant carries named fields. Each gets a snake_case constructor
//! whose parameters take `impl Into<T>`, so adapters can write
//! `UserPersistenceError::query(err.to_string())` or pass a `&str`.

macro_rules! define_port_error {
    (@ctor $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty $(, $($rest:tt)*)?) => {
        define_port_error!(
            @ctor
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($($rest)*)?
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),+ },
            )+
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant [] [] $($field : $ty),+);
            )+
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Column {
        Email,
    }

    impl fmt::Display for Column {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("email")
        }
    }

    define_port_error! {
        pub enum StoreError {
            Query { message: String } => "query failed: {message}",
            Limit { bytes: u64 } => "over {bytes} bytes",
            Conflict { column: Column, value: String } => "{column} {value} taken",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(StoreError::query("timeout").to_string(), "query failed: timeout");
    }

    #[test]
    fn numeric_fields_widen_through_into() {
        let err = StoreError::limit(1024_u32);
        assert_eq!(err, StoreError::Limit { bytes: 1024 });
    }

    #[test]
    fn multi_field_variants_keep_declaration_order() {
        let err = StoreError::conflict(Column::Email, "ada@example.org");
        assert_eq!(err.to_string(), "email ada@example.org taken");
    }
}
