#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mathfluent_server::run().await
}
