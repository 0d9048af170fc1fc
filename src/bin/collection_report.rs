//! Utility to print how many documents each dashboard collection holds.
//!
//! Unlike the dashboard endpoints, read failures are reported instead of
//! being shown as empty collections.

use rust_logistics_api::config::Config;
use rust_logistics_api::credentials::AccessTokenProvider;
use rust_logistics_api::db::Database;
use rust_logistics_api::db_storage::CollectionReader;
use rust_logistics_api::models::{CollectionRecord, InventoryItem, Order, UserRecord};

async fn report<T: CollectionRecord>(reader: &CollectionReader) {
    match reader.try_list::<T>().await {
        Ok(records) => println!("- {}: {} document(s)", T::COLLECTION, records.len()),
        Err(e) => println!("- {}: read failed ({})", T::COLLECTION, e),
    }
}

/// Main entry point for the collection report utility.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let tokens = AccessTokenProvider::from_config(&config)?;
    let reader = CollectionReader::new(Database::new(&config, tokens)?);

    println!("Collections in project {}:", config.firebase_project_id);
    report::<Order>(&reader).await;
    report::<InventoryItem>(&reader).await;
    report::<UserRecord>(&reader).await;

    Ok(())
}
