use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// One of the three board columns a todo belongs to.
///
/// Serialized with the external names (`start-doing`, ...). The database
/// stores the storage names (`START_DOING`, ...); both directions are total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    StartDoing,
    DoDifferently,
    KeepDoing,
}

impl Category {
    /// Board column order.
    pub const ALL: [Category; 3] = [
        Category::StartDoing,
        Category::DoDifferently,
        Category::KeepDoing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::StartDoing => "start-doing",
            Category::DoDifferently => "do-differently",
            Category::KeepDoing => "keep-doing",
        }
    }

    pub fn storage_name(self) -> &'static str {
        match self {
            Category::StartDoing => "START_DOING",
            Category::DoDifferently => "DO_DIFFERENTLY",
            Category::KeepDoing => "KEEP_DOING",
        }
    }

    pub fn from_storage(value: &str) -> Option<Category> {
        match value {
            "START_DOING" => Some(Category::StartDoing),
            "DO_DIFFERENTLY" => Some(Category::DoDifferently),
            "KEEP_DOING" => Some(Category::KeepDoing),
            _ => None,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Category::StartDoing => "What should we start doing?",
            Category::DoDifferently => "What should we do differently?",
            Category::KeepDoing => "What should we keep doing?",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start-doing" => Ok(Category::StartDoing),
            "do-differently" => Ok(Category::DoDifferently),
            "keep-doing" => Ok(Category::KeepDoing),
            other => Err(ValidationError::InvalidCategory(other.to_string())),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.storage_name()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_str()?;
        Category::from_storage(raw)
            .ok_or_else(|| FromSqlError::Other(format!("unknown category {raw:?}").into()))
    }
}
