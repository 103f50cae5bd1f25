use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    marquee::tui::run().await
}
