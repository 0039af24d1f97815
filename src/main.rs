use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    kubecov_cli::run().await
}
