use backend_api::{run_server, DatasetStore};
use pivot_engine::Dataset;
use std::path::Path;
use std::sync::Arc;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse environment variables (with sane defaults)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let store = Arc::new(DatasetStore::new());

    // Optionally preload a report so the API is queryable right away;
    // otherwise the first dataset arrives via POST /api/upload.
    if let Ok(path) = env::var("REPORT_PATH") {
        match report_parser::parse_file(&path) {
            Ok(records) => {
                let filename = Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone());
                let dataset = store.replace(Dataset::new(filename, records)).await;
                println!("Preloaded {} rows from {}", dataset.len(), path);
            }
            Err(err) => {
                eprintln!("[WARN] could not preload report from {}: {}", path, err);
                eprintln!("       Continuing; upload a file via POST /api/upload.");
            }
        }
    }

    println!("Transaction Pivot API Server");
    println!("Listening on: {}:{}", host, port);
    println!();

    // Start the server
    run_server(store, &host, port).await?;

    Ok(())
}
