use async_trace_sink::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::main().await
}
