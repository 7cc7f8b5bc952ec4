//! MongoDB connection management with pool configuration and health checking

use bson::{doc, Document as BsonDocument};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection, Database,
};
use mongoref_common::{MongoRefError, Result};
use mongoref_core::{validate_database_name, Namespace};
use std::time::Duration;
use tracing::{debug, info};

/// Connection pool configuration
///
/// Only forwarded to the driver; pooling itself is the driver's job.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool (default: 0)
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the pool (default: 10)
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed (default: none)
    pub max_idle_time: Option<Duration>,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: Some(0),
            max_pool_size: Some(10),
            max_idle_time: None,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            app_name: Some("mongoref".to_string()),
        }
    }
}

impl PoolConfig {
    fn apply(self, client_options: &mut ClientOptions) {
        if let Some(min) = self.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = self.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = self.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(connect) = self.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = self.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = self.app_name {
            client_options.app_name = Some(app);
        }
    }
}

/// MongoDB connection bound to a default database
#[derive(Debug, Clone)]
pub struct Connection {
    client: Client,
    database: Database,
    database_name: String,
}

impl Connection {
    /// Create a new MongoDB connection with default pool settings.
    ///
    /// The connection string must name a default database.
    pub async fn new(connection_string: &str) -> Result<Self> {
        Self::with_config(connection_string, PoolConfig::default()).await
    }

    /// Create a new MongoDB connection with custom pool configuration
    pub async fn with_config(connection_string: &str, config: PoolConfig) -> Result<Self> {
        let client = Self::build_client(connection_string, config).await?;

        let database = client.default_database().ok_or_else(|| {
            MongoRefError::Config(
                "No default database specified in connection string".to_string(),
            )
        })?;

        Ok(Self::from_parts(client, database))
    }

    /// Create a connection with an explicit default database, for URIs without one
    pub async fn with_database(
        connection_string: &str,
        database: &str,
        config: PoolConfig,
    ) -> Result<Self> {
        validate_database_name(database)?;
        let client = Self::build_client(connection_string, config).await?;
        let database = client.database(database);
        Ok(Self::from_parts(client, database))
    }

    async fn build_client(connection_string: &str, config: PoolConfig) -> Result<Client> {
        let mut client_options = ClientOptions::parse(connection_string).await?;
        config.apply(&mut client_options);

        // Set stable API version for compatibility
        let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
        client_options.server_api = Some(server_api);

        Ok(Client::with_options(client_options)?)
    }

    fn from_parts(client: Client, database: Database) -> Self {
        let database_name = database.name().to_string();
        info!(database = %database_name, "MongoDB client configured");
        Self {
            client,
            database,
            database_name,
        }
    }

    /// Get the default database name
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Database addressed by a namespace (the default one when unset)
    pub fn database_for(&self, namespace: &Namespace) -> Database {
        match namespace.database() {
            Some(name) if name != self.database_name => {
                debug!(database = name, "switching database for namespace");
                self.client.database(name)
            }
            _ => self.database.clone(),
        }
    }

    /// Untyped collection addressed by a namespace
    pub fn namespace_collection(&self, namespace: &Namespace) -> Collection<BsonDocument> {
        self.database_for(namespace)
            .collection(namespace.collection_name().as_str())
    }

    /// Check if the connection is healthy by pinging the server
    pub async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| MongoRefError::Connection(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_config() {
        let config = PoolConfig::default();
        assert_eq!(config.min_pool_size, Some(0));
        assert_eq!(config.max_pool_size, Some(10));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.app_name, Some("mongoref".to_string()));
    }

    #[tokio::test]
    async fn test_pool_config_applied_to_options() {
        let mut options = ClientOptions::parse("mongodb://localhost:27017")
            .await
            .unwrap();
        let config = PoolConfig {
            min_pool_size: Some(5),
            max_pool_size: Some(50),
            max_idle_time: Some(Duration::from_secs(300)),
            connect_timeout: Some(Duration::from_secs(5)),
            server_selection_timeout: Some(Duration::from_secs(10)),
            app_name: Some("my-app".to_string()),
        };
        config.apply(&mut options);

        assert_eq!(options.min_pool_size, Some(5));
        assert_eq!(options.max_pool_size, Some(50));
        assert_eq!(options.max_idle_time, Some(Duration::from_secs(300)));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.app_name.as_deref(), Some("my-app"));
    }

    #[tokio::test]
    async fn test_missing_default_database_is_config_error() {
        // Client construction does not contact the server
        let err = Connection::new("mongodb://localhost:27017").await.unwrap_err();
        assert!(matches!(err, MongoRefError::Config(_)));
    }

    #[tokio::test]
    async fn test_database_for_namespace() {
        let conn = Connection::new("mongodb://localhost:27017/i18nMgr")
            .await
            .unwrap();
        assert_eq!(conn.database_name(), "i18nMgr");

        let default_ns = Namespace::collection("modules").unwrap();
        assert_eq!(conn.database_for(&default_ns).name(), "i18nMgr");

        let other_ns = default_ns.with_database("archive").unwrap();
        assert_eq!(conn.database_for(&other_ns).name(), "archive");
        assert_eq!(conn.namespace_collection(&other_ns).name(), "modules");
    }

    #[tokio::test]
    async fn test_with_database_validates_name() {
        let err = Connection::with_database(
            "mongodb://localhost:27017",
            "bad.name",
            PoolConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MongoRefError::Validation(_)));
    }
}
