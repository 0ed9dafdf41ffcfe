//! Stage 2: energy-minimize the generated configuration under the
//! embedded-atom potential.
use dislo_pin::external::lammps::Lammps;
use dislo_pin::io::input::Para;
use dislo_pin::stages::minimize;

fn main() -> anyhow::Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let para = Para::new();
    minimize::run(&para.minimize, &para.potential, &Lammps::new())
}
