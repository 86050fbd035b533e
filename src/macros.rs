/// Implements [crate::database::Table] for a model.
///
/// # Example
/// ```ignore
/// define_table!("videos": Video = id);
/// ```
#[macro_export]
macro_rules! define_table {
    ($table:literal : $model:ty = $id:ident) => {
        impl $crate::database::Table for $model {
            fn id(&self) -> &$crate::database::Thing {
                self.$id.as_ref()
            }

            fn table() -> &'static str {
                $table
            }
        }
    };
}

/// Defines the single-record operations every model shares.
#[macro_export]
macro_rules! define_model {
    ($model:ty) => {
        impl $model {
            pub async fn find(
                id: &$crate::database::Record<Self>,
                db: &$crate::database::Database,
            ) -> $crate::database::Result<Option<Self>> {
                use snafu::ResultExt as _;
                db.select(id.clone())
                    .await
                    .context($crate::database::QuerySnafu)
            }

            pub async fn create(
                &self,
                db: &$crate::database::Database,
            ) -> $crate::database::Result<Option<Self>> {
                use snafu::ResultExt as _;
                db.create($crate::database::Table::id(self).clone())
                    .content(self)
                    .await
                    .context($crate::database::QuerySnafu)
            }

            pub async fn update(
                &self,
                db: &$crate::database::Database,
            ) -> $crate::database::Result<Option<Self>> {
                use snafu::ResultExt as _;
                db.update($crate::database::Table::id(self).clone())
                    .content(self)
                    .await
                    .context($crate::database::QuerySnafu)
            }

            pub async fn delete(
                &self,
                db: &$crate::database::Database,
            ) -> $crate::database::Result<Option<Self>> {
                use snafu::ResultExt as _;
                db.delete($crate::database::Table::id(self).clone())
                    .await
                    .context($crate::database::QuerySnafu)
            }
        }
    };
}

/// Defines a method that queries the database with raw SurrealQL.
///
/// # Syntax
/// ```ignore
/// define_relation! {
///     Subscription > by_channel(channel: &Record<User>) > Vec<Subscription>
///         where "SELECT * FROM subscriptions WHERE channel = $channel"
/// }
///
/// let subscribers = Subscription::by_channel(&channel, &db).await?;
/// ```
#[macro_export]
macro_rules! define_relation {
    ($model:ty > $relation:ident ($($binding:ident : $binding_type:ty),*) > $export:ty where $query:literal) => {
        impl $model {
            #[tracing::instrument(skip(db))]
            pub async fn $relation($($binding : $binding_type ,)* db: &$crate::database::Database) -> $crate::database::Result<$export> {
                use $crate::database::Sql as _;
                db.sql($query)
                    $(.bind((stringify!($binding), $binding)))*
                    .fetch()
                    .await
            }
        }
    };
}
