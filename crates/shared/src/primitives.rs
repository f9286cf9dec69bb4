use std::{fmt, str::FromStr};

use libsql::FromValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct WrappedUuidV4(uuid::Uuid);

impl Default for WrappedUuidV4 {
    fn default() -> Self {
        Self::new()
    }
}

impl WrappedUuidV4 {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl FromStr for WrappedUuidV4 {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

impl fmt::Display for WrappedUuidV4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for WrappedUuidV4 {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(Self(uuid::Uuid::parse_str(&value)?))
    }
}

impl FromValue for WrappedUuidV4 {
    fn from_sql(val: libsql::Value) -> libsql::Result<Self>
    where
        Self: Sized,
    {
        match val {
            libsql::Value::Text(s) => {
                WrappedUuidV4::try_from(s).map_err(|_e| libsql::Error::InvalidColumnType)
            }
            _ => Err(libsql::Error::InvalidColumnType),
        }
    }
}

impl From<WrappedUuidV4> for libsql::Value {
    fn from(val: WrappedUuidV4) -> Self {
        libsql::Value::Text(val.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct WrappedChronoDateTime(chrono::DateTime<chrono::Utc>);

impl WrappedChronoDateTime {
    pub fn get_inner(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }

    pub fn new(value: chrono::DateTime<chrono::Utc>) -> Self {
        Self(value)
    }

    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }
}

impl TryFrom<&str> for WrappedChronoDateTime {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Try SQLite datetime format first, then fall back to RFC3339
        let parsed = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .or_else(|_| chrono::DateTime::parse_from_rfc3339(value).map(|dt| dt.into()))
            .map_err(|_e| anyhow::anyhow!("invalid datetime value"))?;

        Ok(WrappedChronoDateTime::new(parsed))
    }
}

impl TryFrom<String> for WrappedChronoDateTime {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        WrappedChronoDateTime::try_from(value.as_str())
    }
}

impl fmt::Display for WrappedChronoDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<chrono::DateTime<chrono::Utc>> for WrappedChronoDateTime {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        Self(value)
    }
}

impl FromValue for WrappedChronoDateTime {
    fn from_sql(val: libsql::Value) -> libsql::Result<Self>
    where
        Self: Sized,
    {
        match val {
            libsql::Value::Text(s) => WrappedChronoDateTime::try_from(s.as_str())
                .map_err(|_e| libsql::Error::InvalidColumnType),
            _ => Err(libsql::Error::InvalidColumnType),
        }
    }
}

impl From<WrappedChronoDateTime> for libsql::Value {
    fn from(value: WrappedChronoDateTime) -> Self {
        // SQLite's expected datetime format, which also sorts chronologically
        // as text
        libsql::Value::Text(value.0.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

pub trait SqlMigrationLoader {
    fn load_sql_migrations() -> BTreeMap<&'static str, BTreeMap<&'static str, &'static str>>;
}
