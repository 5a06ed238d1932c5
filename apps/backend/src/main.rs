#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mnemosine_backend::run().await
}
