use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::error::CommonError;
use libsql::params::IntoParams;
use libsql::{BatchRows, Database, Rows};
use tracing::info;
use url::Url;

#[derive(Debug, Clone)]
pub struct Connection(pub libsql::Connection);

impl Connection {
    pub fn new(connection: libsql::Connection) -> Self {
        Self(connection)
    }
}

impl Deref for Connection {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[macro_export]
macro_rules! execute_with_retry {
    ($operation:expr) => {
        execute_with_retry!($operation, 10)
    };
    ($operation:expr, $max_retries:expr) => {{
        async {
            let mut _retries = 0u32;
            let _max_retries: u32 = $max_retries;

            loop {
                match $operation.await {
                    Ok(result) => break Ok(result),
                    Err(err) => {
                        let err_str = err.to_string();
                        if err_str.contains("database is locked") || err_str.contains("SQLITE_BUSY")
                        {
                            tracing::warn!("Database is locked, retrying... {:?}", err);
                            if _retries >= _max_retries {
                                break Err(err);
                            }

                            _retries += 1;

                            let delay_us = 10_000 * (1 << _retries.min(6));
                            tokio::time::sleep(std::time::Duration::from_micros(delay_us)).await;
                        } else {
                            tracing::error!("Error executing with retry: {:?}", err);
                            break Err(err);
                        }
                    }
                }
            }
        }
        .await
    }};
}

impl Connection {
    /// Execute sql query provided some type that implements [`IntoParams`]
    /// returning on success the number of rows that were changed.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> libsql::Result<u64> {
        tracing::trace!("executing `{}`", sql);
        let params = params.into_params()?;
        execute_with_retry!(self.0.execute(sql, params.clone()), 10)
    }

    /// Execute a batch set of statements.
    pub async fn execute_batch(&self, sql: &str) -> libsql::Result<BatchRows> {
        tracing::trace!("executing batch `{}`", sql);
        execute_with_retry!(self.0.execute_batch(sql), 10)
    }

    /// Execute sql query provided some type that implements [`IntoParams`]
    /// returning on success the [`Rows`].
    pub async fn query(&self, sql: &str, params: impl IntoParams) -> libsql::Result<Rows> {
        let mut stmt = self.prepare(sql).await?;
        let params = params.into_params()?;
        execute_with_retry!(stmt.query(params.clone()), 10)
    }
}

pub type Migrations<'a> = BTreeMap<&'a str, BTreeMap<&'a str, &'a str>>;

pub struct LocalConnectionParams {
    pub path_to_db_file: PathBuf,
}

pub struct RemoteConnectionParams {
    pub remote_url: String,
    pub auth_token: String,
}

pub enum ConnectionType {
    Local(LocalConnectionParams),
    Remote(RemoteConnectionParams),
}

fn get_libsql_path(url: &Url) -> String {
    // Keep `libsql://./relative/path` relative to the working directory
    let is_relative = url.as_str().starts_with("libsql://./");

    if is_relative {
        format!(".{}", url.path())
    } else {
        url.path().to_string()
    }
}

impl TryFrom<Url> for ConnectionType {
    type Error = CommonError;
    fn try_from(url: Url) -> Result<Self, Self::Error> {
        if url.scheme() != "libsql" {
            let scheme = url.scheme();
            return Err(CommonError::Unknown(anyhow::anyhow!(
                "invalid scheme: {scheme}"
            )));
        }

        let mode = match url
            .query_pairs()
            .find(|(key, _)| key == "mode")
            .map(|(_, value)| value.to_string())
        {
            Some(mode) => mode,
            None => {
                return Err(CommonError::Unknown(anyhow::anyhow!(
                    "missing mode query parameter"
                )));
            }
        };

        match mode.as_str() {
            "local" => Ok(ConnectionType::Local(LocalConnectionParams {
                path_to_db_file: PathBuf::from(get_libsql_path(&url)),
            })),
            "remote" => {
                let mut remote_url = url.clone();
                remote_url.set_query(None);

                let auth_token = match url.query_pairs().find(|(key, _)| key == "auth") {
                    Some((_, value)) => value.to_string(),
                    None => {
                        return Err(CommonError::Unknown(anyhow::anyhow!(
                            "missing auth query parameter for remote connection"
                        )));
                    }
                };

                Ok(ConnectionType::Remote(RemoteConnectionParams {
                    remote_url: remote_url.to_string(),
                    auth_token,
                }))
            }
            _ => Err(CommonError::Unknown(anyhow::anyhow!(
                "invalid mode: {mode}"
            ))),
        }
    }
}

/// Apply the `.up.sql` entries of the `sqlite` migration set, in filename
/// order.
pub async fn apply_migrations(
    conn: &Connection,
    migrations: &Migrations<'_>,
) -> Result<(), CommonError> {
    let migrations_to_run = match migrations.get("sqlite") {
        Some(migrations_to_run) => migrations_to_run,
        None => {
            return Err(CommonError::Unknown(anyhow::anyhow!(
                "no sqlite migrations provided"
            )));
        }
    };

    for (filename, contents) in migrations_to_run
        .iter()
        .filter(|(filename, _)| filename.contains(".up."))
    {
        tracing::debug!("applying migration `{}`", filename);
        conn.execute_batch(contents).await?;
    }

    Ok(())
}

pub async fn establish_db_connection<'a>(
    connection_string: &Url,
    migrations: Option<Migrations<'a>>,
) -> Result<(Database, Connection), CommonError> {
    let connection_type = ConnectionType::try_from(connection_string.clone())?;

    fn create_db_file_parent_dir(parent_path: Option<&Path>) -> Result<(), CommonError> {
        if let Some(path) = parent_path {
            if !std::fs::exists(path)? {
                std::fs::create_dir_all(path)?;
            }
        }
        Ok(())
    }

    let (db, conn) = match connection_type {
        ConnectionType::Local(params) => {
            info!("establishing local connection");
            create_db_file_parent_dir(params.path_to_db_file.parent())?;

            let db = libsql::Builder::new_local(params.path_to_db_file.clone())
                .build()
                .await?;

            let conn = db.connect()?;
            (db, conn)
        }
        ConnectionType::Remote(params) => {
            info!("establishing remote connection");
            let db =
                libsql::Builder::new_remote(params.remote_url.clone(), params.auth_token.clone())
                    .build()
                    .await?;
            let conn = db.connect()?;
            (db, conn)
        }
    };

    let conn = Connection(conn);

    if let Some(migrations) = migrations {
        apply_migrations(&conn, &migrations).await?;
    }

    Ok((db, conn))
}
