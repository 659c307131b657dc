use landtenure_engine::Ceilings;

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| RegistryError::Config("DATABASE_URL not set".into()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: String,
    pub owner_ceiling_rai: f64,
    pub heir_ceiling_rai: f64,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| RegistryError::Config("DATABASE_URL not set".into()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());

        let owner_ceiling_rai = std::env::var("OWNER_CEILING_RAI")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20.0);

        let heir_ceiling_rai = std::env::var("HEIR_CEILING_RAI")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20.0);

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            owner_ceiling_rai,
            heir_ceiling_rai,
        })
    }

    pub fn ceilings(&self) -> Ceilings {
        Ceilings::new(self.owner_ceiling_rai, self.heir_ceiling_rai)
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
        }
    }
}
