//! Site, design and animation settings
//!
//! Provides database-backed key/value settings with in-memory caching.
//! Settings are loaded from the database on startup and cached for fast access.

use crate::comments::FieldErrors;
use crate::db::StoreError;
use crate::orm::settings;
use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DatabaseConnection, DbErr, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

pub const KEY_MAX_CHARS: usize = 100;
pub const VALUE_MAX_CHARS: usize = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    Site,
    Design,
    Animation,
}

impl SettingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingCategory::Site => "site",
            SettingCategory::Design => "design",
            SettingCategory::Animation => "animation",
        }
    }
}

impl FromStr for SettingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "site" => Ok(SettingCategory::Site),
            "design" => Ok(SettingCategory::Design),
            "animation" => Ok(SettingCategory::Animation),
            other => Err(format!("Unknown settings category: {}", other)),
        }
    }
}

/// Check one key/value pair before it is written.
pub fn validate_entry(key: &str, value: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    let field = if key.is_empty() { "key" } else { key };
    let key_len = key.chars().count();
    if key_len == 0 || key_len > KEY_MAX_CHARS {
        errors.add(
            field,
            format!("Setting keys must be between 1 and {} characters", KEY_MAX_CHARS),
        );
    } else if value.chars().count() > VALUE_MAX_CHARS {
        errors.add(
            field,
            format!("Setting values must be at most {} characters", VALUE_MAX_CHARS),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Settings manager with caching
pub struct Settings {
    values: DashMap<SettingCategory, BTreeMap<String, String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            values: DashMap::new(),
        }
    }

    /// Load every setting from the database, replacing the cache.
    pub async fn load_from_database(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        let rows = settings::Entity::find().all(db).await?;

        self.values.clear();
        let mut skipped = 0;
        for row in rows {
            match row.category.parse::<SettingCategory>() {
                Ok(category) => {
                    self.values
                        .entry(category)
                        .or_default()
                        .insert(row.key, row.value);
                }
                Err(_) => skipped += 1,
            }
        }

        log::info!(
            "Loaded {} setting categories from database ({} unknown rows skipped)",
            self.values.len(),
            skipped
        );

        Ok(())
    }

    /// Every cached setting of a category.
    pub fn all(&self, category: SettingCategory) -> BTreeMap<String, String> {
        self.values
            .get(&category)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    pub fn get(&self, category: SettingCategory, key: &str) -> Option<String> {
        self.values
            .get(&category)
            .and_then(|m| m.get(key).cloned())
    }

    /// Insert or update one setting.
    pub async fn set(
        &self,
        db: &DatabaseConnection,
        category: SettingCategory,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        upsert(db, category, key, value).await?;

        self.values
            .entry(category)
            .or_default()
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    /// Upsert every pair in one transaction. Keys not mentioned keep their
    /// current value.
    pub async fn save_all(
        &self,
        db: &DatabaseConnection,
        category: SettingCategory,
        entries: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, StoreError> {
        let txn = db.begin().await?;
        for (key, value) in entries {
            upsert(&txn, category, key, value).await?;
        }
        txn.commit().await?;

        let mut merged = self.all(category);
        merged.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.values.insert(category, merged.clone());

        log::info!(
            "Saved {} {} setting(s)",
            entries.len(),
            category.as_str()
        );

        Ok(merged)
    }

    /// Remove every stored setting of a category so the site falls back to
    /// its built-in defaults.
    pub async fn reset(
        &self,
        db: &DatabaseConnection,
        category: SettingCategory,
    ) -> Result<u64, StoreError> {
        let res = settings::Entity::delete_many()
            .filter(settings::Column::Category.eq(category.as_str()))
            .exec(db)
            .await?;

        self.values.remove(&category);
        log::info!(
            "Reset {} setting(s) in category {}",
            res.rows_affected,
            category.as_str()
        );

        Ok(res.rows_affected)
    }
}

async fn upsert<C: ConnectionTrait>(
    conn: &C,
    category: SettingCategory,
    key: &str,
    value: &str,
) -> Result<(), DbErr> {
    let now = Utc::now().naive_utc();
    let existing = settings::Entity::find_by_id((category.as_str().to_string(), key.to_string()))
        .one(conn)
        .await?;

    if existing.is_some() {
        settings::Entity::update_many()
            .col_expr(settings::Column::Value, Expr::value(value.to_string()))
            .col_expr(settings::Column::UpdatedAt, Expr::value(now))
            .filter(settings::Column::Category.eq(category.as_str()))
            .filter(settings::Column::Key.eq(key))
            .exec(conn)
            .await?;
    } else {
        settings::ActiveModel {
            category: Set(category.as_str().to_string()),
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;
    }

    Ok(())
}

/// Create a new settings cache wrapped in Arc for sharing
pub fn create_settings() -> Arc<Settings> {
    Arc::new(Settings::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("design".parse::<SettingCategory>(), Ok(SettingCategory::Design));
        assert!("theme".parse::<SettingCategory>().is_err());
    }

    #[test]
    fn test_entry_limits() {
        assert!(validate_entry("primary_color", "#ff6600").is_ok());
        assert!(validate_entry("", "x").is_err());
        assert!(validate_entry(&"k".repeat(101), "x").is_err());
        assert!(validate_entry("hero_text", &"v".repeat(10_001)).is_err());
    }

    #[test]
    fn test_empty_cache_reads() {
        let settings = Settings::new();
        assert!(settings.all(SettingCategory::Site).is_empty());
        assert_eq!(settings.get(SettingCategory::Animation, "speed"), None);
    }
}
