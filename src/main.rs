#[tokio::main]
async fn main() -> anyhow::Result<()> {
    drawboard_lib::run().await
}
