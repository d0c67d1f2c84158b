use product_catalog::infra::config::Config;
use product_catalog::{AggregationEngine, PgProductStore, ProductStore};
use std::sync::Arc;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--no-create-schema]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           PORT, DATABASE_MAX_CONNECTIONS, LOW_STOCK_THRESHOLD, RECENT_PRODUCTS_LIMIT\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let create_schema = !args.iter().any(|a| a == "--no-create-schema");

    // Force-read config (nice error messages if missing)
    let config = Config::from_env()?;

    println!("> Preflight:");
    println!("  PORT={}", config.port);
    println!("  DATABASE_MAX_CONNECTIONS={}", config.database_max_connections);
    println!("  LOW_STOCK_THRESHOLD={}", config.low_stock_threshold);
    println!("  RECENT_PRODUCTS_LIMIT={}", config.recent_products_limit);

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot connect to DATABASE_URL: {}", e))?;
    let store = PgProductStore::new(pool);

    store.ping().await?;
    println!("  Database reachable.");

    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = 'products')",
    )
    .fetch_one(store.pool())
    .await?;

    if table_exists {
        println!("  products table exists.");
    } else if create_schema {
        println!("  products table missing -> creating...");
        store.ensure_schema().await?;
        println!("  products table created.");
    } else {
        return Err(anyhow::anyhow!(
            "products table does not exist. Re-run without --no-create-schema"
        ));
    }

    let stats = AggregationEngine::new(Arc::new(store));
    let total = stats.total_count().await?;
    let value = stats.total_value().await?;
    let low = stats.low_stock(config.low_stock_threshold).await?;
    println!("  Products: {} (total price {}), low stock: {}", total, value, low.len());

    println!("> Preflight OK.");
    Ok(())
}
