//! Stage 1: build the initial edge-dislocation configuration with the
//! structure builder.
use dislo_pin::io::input::Para;
use dislo_pin::stages::generate;

fn main() -> anyhow::Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let para = Para::new();
    generate::run(&para.generate)
}
