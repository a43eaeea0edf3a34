//! Offnet - offline learning companion

use offnet::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // WARN by default, RUST_LOG=offnet=debug for more
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into())
        )
        .init();

    cli::run().await
}
