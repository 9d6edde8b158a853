#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ballot::start_server().await
}
