use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    banter::logging::init();
    banter::run().await
}
