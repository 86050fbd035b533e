use std::net::SocketAddr;

use serde::Deserialize;
use snafu::ResultExt as _;

use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address")]
    pub host: SocketAddr,
    #[serde(flatten)]
    pub database: DatabaseConfig,
}

pub fn load() -> Result<Config, ApplicationError> {
    envy::from_env::<Config>().context(ConfigLoadSnafu)
}
