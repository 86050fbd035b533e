use derive_new::new;

use crate::database::Database;
use crate::service::aggregate::Aggregator;
use crate::service::catalog::Catalog;
use crate::service::engagement::Engagement;

#[derive(Debug, Clone, new)]
pub struct App {
    pub engagement: Engagement,
    pub aggregator: Aggregator,
    pub catalog: Catalog,
    pub database: Database,
}

pub fn create_app(database: Database) -> App {
    App::new(
        Engagement::new(database.clone()),
        Aggregator::new(database.clone()),
        Catalog::new(database.clone()),
        database,
    )
}
