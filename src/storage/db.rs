use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

use crate::config::DatabaseConfig;
use crate::entities;

/// Local storage manager for the back-office database.
///
/// Owns the SeaORM connection; all query logic lives in the repository
/// layer and the backup service, which borrow `conn` directly.
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Initialize storage. `in_memory` selects a private in-memory
    /// database (used by tests); otherwise the database file lives in
    /// the platform data directory.
    pub async fn new(in_memory: bool) -> Result<Self> {
        let database_url = if in_memory {
            "sqlite::memory:".to_string()
        } else {
            let data_dir = dirs::data_dir()
                .context("could not determine data directory")?
                .join("backoffice");
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
            format!("sqlite://{}?mode=rwc", data_dir.join("backoffice.db").display())
        };

        Self::connect(&database_url).await
    }

    /// Initialize storage as described by the database configuration.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        match (config.in_memory, &config.path) {
            (true, _) => Self::new(true).await,
            (false, Some(path)) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create data directory: {}", parent.display()))?;
                }
                Self::connect(&format!("sqlite://{}?mode=rwc", path.display())).await
            }
            (false, None) => Self::new(false).await,
        }
    }

    /// Initialize storage against an explicit database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let conn = Database::connect(database_url)
            .await
            .with_context(|| format!("failed to open database: {database_url}"))?;

        let storage = LocalStorage { conn };
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Create tables from the entity definitions.
    async fn init_schema(&self) -> Result<()> {
        let builder = self.conn.get_database_backend();
        let schema = Schema::new(builder);

        self.create_table(&schema, entities::Settings).await?;
        self.create_table(&schema, entities::Group).await?;
        self.create_table(&schema, entities::Branch).await?;
        self.create_table(&schema, entities::Category).await?;
        self.create_table(&schema, entities::Supplier).await?;
        self.create_table(&schema, entities::User).await?;
        self.create_table(&schema, entities::UserBranch).await?;
        self.create_table(&schema, entities::Sale).await?;
        self.create_table(&schema, entities::ApiKey).await?;

        Ok(())
    }

    async fn create_table<E>(&self, schema: &Schema, entity: E) -> Result<()>
    where
        E: EntityTrait,
    {
        let builder = self.conn.get_database_backend();
        let mut statement = schema.create_table_from_entity(entity);
        statement.if_not_exists();
        self.conn.execute(builder.build(&statement)).await?;
        Ok(())
    }
}
