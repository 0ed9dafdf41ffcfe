//! Wigner-Seitz point-defect analysis over the trajectory: each frame is
//! compared against the minimized reference, normally occupied sites are
//! deleted, and only the point defects (vacancies and interstitials) remain.
use std::env;
use mpi::traits::Communicator;
use tracing::info;
use crate::common::constants::ROOT_RANK;
use crate::common::error::DispatchError;
use crate::dispatch::dispatcher::{broadcast_setup, dispatch, BatchSetup, DispatchReport, WorkItem};
use crate::dispatch::partition::PartitionPolicy;
use crate::dispatch::traits::ProcessItem;
use crate::external::ovito::{Export, Modifier, Ovitos, Pipeline};
use crate::io::input::AnalysisPara;
use std::path::PathBuf;





/// The per-file occupancy analysis against a fixed reference frame.
pub struct WignerSeitzProcessor
{
    pub toolkit: Ovitos,
    pub reference: PathBuf,
}

impl ProcessItem for WignerSeitzProcessor
{
    fn label(&self) -> &str
    {
        "Wigner-Seitz analysis"
    }

    fn process_item(&self, item: &WorkItem) -> anyhow::Result<()>
    {
        let mut pipeline = Pipeline::single(item.input_path());
        pipeline.modifier(Modifier::WignerSeitz
        {
            reference: self.reference.clone(),
        });
        // A singly occupied site is a perfect site; deleting those leaves
        // the point defects
        pipeline.modifier(Modifier::ExpressionSelection
        {
            expression: String::from("Occupancy == 1"),
        });
        pipeline.modifier(Modifier::DeleteSelected);
        pipeline.export(Export::Atoms
        {
            file: item.output_path(0),
            columns: [
                "Particle Identifier",
                "Position.X",
                "Position.Y",
                "Position.Z",
                "c_peratom",
                "Occupancy",
            ].map(String::from).to_vec(),
        });

        let script_path = env::temp_dir().join(format!("wigner_seitz_{}.py", item.name));
        self.toolkit.run_pipeline(&pipeline, &script_path)?;
        let _ = std::fs::remove_file(&script_path);

        Ok(())
    }
}





/// The MPI body of the stage.
pub fn run<C: Communicator>(comm: &C, para: &AnalysisPara) -> Result<DispatchReport, DispatchError>
{
    let setup = match comm.rank() == ROOT_RANK
    {
        true =>
        {
            let setup = BatchSetup::prepare(&para.input_dir, &[para.ws_dir.clone()])?;
            info!(n_files = setup.files().len(), size = comm.size(), "found dump files to process");
            Some(setup)
        },
        false => None,
    };
    let setup = broadcast_setup(comm, setup)?;

    let processor = WignerSeitzProcessor
    {
        toolkit: Ovitos::new(),
        reference: para.reference_file.clone(),
    };
    dispatch(comm, &setup, PartitionPolicy::ContiguousBlock, para.failure_policy, &processor)
}
