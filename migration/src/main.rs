use std::collections::HashSet;

use labs_common::database::{self, Database};

use crate::settings::Settings;
use crate::tables::table_definitions;

pub mod settings;
pub mod tables;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let database = database::connect(&settings.database).await?;
    println!("Connected to DB");

    let schema = database.database_schema().to_owned();
    database
        .execute_in_transaction(
            vec![format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, schema)],
            "CREATE SCHEMA",
        )
        .await?;

    let existing = existing_tables(database).await?;

    for table in table_definitions(&schema) {
        if existing.contains(table.name) {
            println!("Table {} already exists, skipping", table.name);
            continue;
        }
        database
            .execute_in_transaction(table.ddls, "CREATE TABLE")
            .await?;
        println!("Table {} created", table.name);
    }

    println!("Schema migrated");
    Ok(())
}

async fn existing_tables(database: &Database) -> anyhow::Result<HashSet<String>> {
    let sql = "SELECT table_name
        FROM information_schema.tables
        WHERE
          table_schema = $1
          AND table_type = 'BASE TABLE'";

    let names = sqlx::query_scalar::<_, String>(sql)
        .bind(database.database_schema())
        .fetch_all(database.database_pool())
        .await?;

    Ok(names.into_iter().collect())
}
