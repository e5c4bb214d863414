use clap::Parser;
use tracing_subscriber::EnvFilter;
use vision_annotator::app::run;
use vision_annotator::config::{Args, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_args(Args::parse());
    run(&config).await;
}
