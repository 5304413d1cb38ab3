/// Imports needed by [`feature_model_derives`] and the query helpers on each model
#[macro_export]
macro_rules! feature_model_imports {
    () => {
        #[allow(unused_imports)]
        use serde::{Deserialize, Serialize};
        #[cfg(feature = "backend")]
        #[allow(unused_imports)]
        use {
            exemplar::Model as ExemplarModel,
            rusqlite::{Connection, OptionalExtension},
            sea_query::{enum_def, Expr, Func, Order, Query, SqliteQueryBuilder},
            sea_query_rusqlite::RusqliteBinder,
            $crate::model::Model,
        };
    };
}

/// Declares a row struct and, with the backend feature, its exemplar/sea-query plumbing
#[macro_export]
macro_rules! feature_model_derives {
    (
        $table:literal,
        $schema:literal,
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$field_meta:meta])* pub $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $crate::paste::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            #[cfg_attr(feature = "backend", derive(ExemplarModel))]
            #[cfg_attr(feature = "backend", table($table))]
            #[cfg_attr(feature = "backend", check($schema))]
            #[cfg_attr(feature = "backend", enum_def)]
            pub struct $name {
                $( $(#[$field_meta])* pub $field: $ty, )*
            }

            #[cfg(feature = "backend")]
            impl Model for $name {
                type Iden = [<$name Iden>];

                fn table_iden() -> Self::Iden {
                    [<$name Iden>]::Table
                }

                fn column_idens() -> Vec<Self::Iden> {
                    vec![ $( [<$name Iden>]::[<$field:camel>], )* ]
                }
            }
        }
    };
}

/// String backed enum stored as TEXT and sent over the wire as snake_case
#[macro_export]
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $text:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$variant_meta])* #[serde(rename = $text)] $variant, )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )* ];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )*
                    _ => Err($crate::model::UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        #[cfg(feature = "backend")]
        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::Borrowed(
                    rusqlite::types::ValueRef::Text(self.as_str().as_bytes()),
                ))
            }
        }

        #[cfg(feature = "backend")]
        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value.as_str()?.parse().map_err(|e: $crate::model::UnknownVariant| {
                    rusqlite::types::FromSqlError::Other(Box::new(e))
                })
            }
        }

        #[cfg(feature = "backend")]
        impl From<$name> for sea_query::Value {
            fn from(value: $name) -> Self {
                value.as_str().into()
            }
        }

        #[cfg(feature = "backend")]
        impl sea_query::Nullable for $name {
            fn null() -> sea_query::Value {
                sea_query::Value::String(None)
            }
        }
    };
}
