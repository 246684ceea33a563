//! Postgres `TEXT` mapping for string-backed domain types.

/// Implements sqlx `Type`, `Encode` and `Decode` for a type stored as
/// `TEXT`. Encoding goes through `Display`. Decoding goes through `FromStr`
/// (whose error must be `std::error::Error + Send + Sync + 'static`), or
/// through an infallible `fn(&str) -> Self` given as `decode_with`.
macro_rules! impl_text_type {
    (@impl $name:ty, $decode:expr) => {
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(($decode)(raw)?)
            }
        }
    };
    ($name:ty) => {
        $crate::sql::impl_text_type!(@impl $name, |raw: &str| raw.parse::<$name>());
    };
    ($name:ty, decode_with = $decode:path) => {
        $crate::sql::impl_text_type!(
            @impl $name,
            |raw: &str| Ok::<$name, std::convert::Infallible>($decode(raw))
        );
    };
}

pub(crate) use impl_text_type;
