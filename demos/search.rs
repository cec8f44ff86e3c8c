//! Batched keyword search against the sandbox.
//!
//! Requires `EBAY_SANDBOX_APP_ID` and `EBAY_SANDBOX_CERT_ID`.
//!
//! Run with: RUST_LOG=browse_batch=info cargo run --example search -- "leica m6" "rolleiflex"

use browse_batch::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut queries: Vec<String> = std::env::args().skip(1).collect();
    if queries.is_empty() {
        queries = vec!["film camera".into(), "medium format lens".into()];
    }

    let client = BrowseClient::from_env(Environment::Sandbox)?;
    let params = queries
        .iter()
        .map(|q| SearchParams::keywords(q.as_str()).limit(5).into_params())
        .collect();

    for envelope in client.execute("search", params, true).await? {
        let query = &queries[envelope.index()];
        match envelope.into_result() {
            Ok(response) => {
                println!("{query}: {} listings", response.total_count());
                for item in response.all_items() {
                    let price = item
                        .price
                        .as_ref()
                        .and_then(Amount::as_f64)
                        .map(|p| format!("{p:.2}"))
                        .unwrap_or_else(|| "-".into());
                    println!("  {price:>10}  {}", item.title.as_deref().unwrap_or(""));
                }
                for warning in &response.warnings {
                    println!("  warning: {}", warning.message.as_deref().unwrap_or(""));
                }
            }
            Err(err) => println!("{query}: failed ({err})"),
        }
    }

    Ok(())
}
