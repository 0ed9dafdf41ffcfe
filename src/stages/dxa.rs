//! Dislocation extraction over the trajectory: every dump file is passed
//! through the toolkit's DXA with a bcc input lattice, exporting the
//! dislocation line network and the per-atom cluster data side by side.
use std::env;
use mpi::traits::Communicator;
use tracing::info;
use crate::common::constants::{CrystalStructure, ROOT_RANK};
use crate::common::error::DispatchError;
use crate::dispatch::dispatcher::{broadcast_setup, dispatch, BatchSetup, DispatchReport, WorkItem};
use crate::dispatch::partition::PartitionPolicy;
use crate::dispatch::traits::ProcessItem;
use crate::external::ovito::{Export, Modifier, Ovitos, Pipeline};
use crate::io::input::AnalysisPara;





/// The per-file dislocation extraction. Output directory 0 receives the
/// line networks, directory 1 the per-atom data.
pub struct DxaProcessor
{
    pub toolkit: Ovitos,
    pub lattice: CrystalStructure,
}

impl ProcessItem for DxaProcessor
{
    fn label(&self) -> &str
    {
        "dislocation extraction"
    }

    fn process_item(&self, item: &WorkItem) -> anyhow::Result<()>
    {
        let mut pipeline = Pipeline::single(item.input_path());
        pipeline.modifier(Modifier::DislocationAnalysis
        {
            lattice: self.lattice,
        });
        pipeline.export(Export::Lines
        {
            file: item.output_path(0),
        });
        pipeline.export(Export::Atoms
        {
            file: item.output_path(1),
            columns: dump_columns(),
        });

        let script_path = env::temp_dir().join(format!("dxa_{}.py", item.name));
        self.toolkit.run_pipeline(&pipeline, &script_path)?;
        let _ = std::fs::remove_file(&script_path);

        Ok(())
    }
}

fn dump_columns() -> Vec<String>
{
    [
        "Particle Identifier",
        "Position.X",
        "Position.Y",
        "Position.Z",
        "c_peratom",
        "c_csym",
        "Cluster",
    ].map(String::from).to_vec()
}





/// The MPI body of the stage: the coordinator prepares the two output
/// directories and enumerates the dump files, the setup is broadcast, and
/// every rank extracts the dislocations of its contiguous share.
pub fn run<C: Communicator>(comm: &C, para: &AnalysisPara) -> Result<DispatchReport, DispatchError>
{
    let setup = match comm.rank() == ROOT_RANK
    {
        true =>
        {
            let setup = BatchSetup::prepare(
                &para.input_dir,
                &[para.dxa_lines_dir.clone(), para.dxa_atoms_dir.clone()],
            )?;
            info!(n_files = setup.files().len(), size = comm.size(), "found dump files to process");
            Some(setup)
        },
        false => None,
    };
    let setup = broadcast_setup(comm, setup)?;

    let processor = DxaProcessor
    {
        toolkit: Ovitos::new(),
        lattice: CrystalStructure::Bcc,
    };
    dispatch(comm, &setup, PartitionPolicy::ContiguousBlock, para.failure_policy, &processor)
}





#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn the_exported_columns_carry_the_cluster_assignment()
    {
        let columns = dump_columns();

        assert_eq!(columns.first().map(String::as_str), Some("Particle Identifier"));
        assert!(columns.contains(&String::from("Cluster")));
    }
}
