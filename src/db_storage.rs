use crate::db::Database;
use crate::errors::{AppError, ResultExt};
use crate::models::{CollectionRecord, InventoryItem, Order, UserRecord};
use serde_json::Value;

/// Read-only accessors over the dashboard's fixed collections.
///
/// The typed accessors (`orders`, `inventory`, `users`) never fail: a read
/// error is logged and reported as an empty collection. Use [`try_list`]
/// when the caller needs to tell the two apart.
///
/// [`try_list`]: CollectionReader::try_list
#[derive(Clone)]
pub struct CollectionReader {
    db: Database,
}

impl CollectionReader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Reads every record of `T::COLLECTION`, propagating failures.
    pub async fn try_list<T: CollectionRecord>(&self) -> Result<Vec<T>, AppError> {
        let records = self
            .db
            .list_documents(T::COLLECTION)
            .await
            .context(format!("reading collection '{}'", T::COLLECTION))?;

        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record)).map_err(|e| {
                    AppError::InternalError(format!(
                        "Failed to decode '{}' document: {}",
                        T::COLLECTION,
                        e
                    ))
                })
            })
            .collect()
    }

    /// Reads every record of `T::COLLECTION`; empty on failure.
    pub async fn list<T: CollectionRecord>(&self) -> Vec<T> {
        match self.try_list::<T>().await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to read collection '{}': {}", T::COLLECTION, e);
                Vec::new()
            }
        }
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.list().await
    }

    pub async fn inventory(&self) -> Vec<InventoryItem> {
        self.list().await
    }

    pub async fn users(&self) -> Vec<UserRecord> {
        self.list().await
    }
}
