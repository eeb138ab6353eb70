use arangolite_core::defaults::SYSTEM_DATABASE_NAME;
use arangolite_core::{HeaderMap, HttpClient, Method, QueryParams};
use serde::de::IgnoredAny;
use serde::Serialize;

use crate::client::{Client, ResultBody};
use crate::{context, Result};

/// Initial user granted access to a new database
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseUser {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDatabaseOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<DatabaseUser>,
}

impl<C: HttpClient> Client<C> {
    /// All databases on the server
    pub async fn list_databases(&self) -> Result<Vec<String>> {
        self.database_names("list databases", "/_api/database").await
    }

    /// Databases the current user can access
    pub async fn list_user_databases(&self) -> Result<Vec<String>> {
        self.database_names("list user databases", "/_api/database/user")
            .await
    }

    pub async fn create_database(&self, options: &CreateDatabaseOptions) -> Result<()> {
        const OP: &str = "create database";
        let path = self.path(SYSTEM_DATABASE_NAME, "/_api/database", &[], &QueryParams::new());
        self.call::<_, IgnoredAny>(OP, Method::POST, &path, &HeaderMap::new(), Some(options))
            .await?;
        tracing::info!(database = %options.name, "database created");
        Ok(())
    }

    pub async fn drop_database(&self, name: &str) -> Result<()> {
        const OP: &str = "drop database";
        let path = self.path(SYSTEM_DATABASE_NAME, "/_api/database/{}", &[name], &QueryParams::new());
        self.call::<(), IgnoredAny>(OP, Method::DELETE, &path, &HeaderMap::new(), None)
            .await?;
        tracing::info!(database = %name, "database dropped");
        Ok(())
    }

    async fn database_names(&self, operation: &'static str, template: &str) -> Result<Vec<String>> {
        let path = self.path(SYSTEM_DATABASE_NAME, template, &[], &QueryParams::new());
        let body = self
            .call::<(), ResultBody<Vec<String>>>(operation, Method::GET, &path, &HeaderMap::new(), None)
            .await?
            .decoded()
            .map_err(context(operation))?;
        Ok(body.result)
    }
}
