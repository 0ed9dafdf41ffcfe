//! Stage 3: run the finite-temperature shear MD simulation that drives the
//! dislocation toward the precipitate.
use dislo_pin::external::lammps::Lammps;
use dislo_pin::io::input::Para;
use dislo_pin::stages::shear;

fn main() -> anyhow::Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let para = Para::new();
    shear::run(&para.shear, &para.potential, &Lammps::new())
}
