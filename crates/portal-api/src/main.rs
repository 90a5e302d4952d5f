use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = portal_api::load_config()?;
    portal_api::run(config).await
}
