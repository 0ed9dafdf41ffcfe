//! Stage 4a: extract the dislocation line network of every trajectory frame
//! in parallel over the MPI ranks.
use anyhow::Context;
use mpi::traits::*;
use tracing::info;
use dislo_pin::common::constants::ROOT_RANK;
use dislo_pin::io::input::Para;
use dislo_pin::stages::dxa;

fn main() -> anyhow::Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let universe = mpi::initialize().context("failed to initialize MPI")?;
    let world = universe.world();
    let para = Para::new();

    let report = dxa::run(&world, &para.analysis)?;

    // The barrier only sequences the summary after every rank's own log
    world.barrier();
    if world.rank() == ROOT_RANK
    {
        info!("all ranks finished");
    }

    match report.into_error()
    {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
