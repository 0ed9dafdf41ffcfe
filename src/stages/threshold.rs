//! Per-atom energy thresholding over the trajectory: each frame is reduced
//! to the precipitate atoms plus every atom above the energy threshold, so
//! the dislocation core and the obstacle stand out without the bulk.
use std::env;
use std::path::PathBuf;
use mpi::traits::Communicator;
use tracing::info;
use crate::common::constants::ROOT_RANK;
use crate::common::error::DispatchError;
use crate::dispatch::dispatcher::{broadcast_setup, dispatch, BatchSetup, DispatchReport, WorkItem};
use crate::dispatch::partition::PartitionPolicy;
use crate::dispatch::traits::ProcessItem;
use crate::external::ovito::{Export, Modifier, Ovitos, Pipeline};
use crate::io::input::{read_dump_ids, AnalysisPara};





/// The per-file selection of the precipitate and the high-energy atoms.
pub struct ThresholdProcessor
{
    pub toolkit: Ovitos,
    pub id_file: PathBuf,
    pub threshold: f64,
}

impl ProcessItem for ThresholdProcessor
{
    fn label(&self) -> &str
    {
        "per-atom thresholding"
    }

    fn process_item(&self, item: &WorkItem) -> anyhow::Result<()>
    {
        let mut pipeline = Pipeline::single(item.input_path());
        pipeline.modifier(Modifier::ThresholdSelection
        {
            id_file: self.id_file.clone(),
            threshold: self.threshold,
        });
        // Keep the selection, delete everything else
        pipeline.modifier(Modifier::InvertSelection);
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
            ].map(String::from).to_vec(),
        });

        let script_path = env::temp_dir().join(format!("threshold_{}.py", item.name));
        self.toolkit.run_pipeline(&pipeline, &script_path)?;
        let _ = std::fs::remove_file(&script_path);

        Ok(())
    }
}





/// The MPI body of the stage. The coordinator also loads the precipitate ID
/// dump before the broadcast, so a missing or malformed ID file aborts the
/// run instead of failing every item; the workers are then distributed round
/// robin, since the per-file work is independent and has no locality.
pub fn run<C: Communicator>(comm: &C, para: &AnalysisPara) -> Result<DispatchReport, DispatchError>
{
    let setup = match comm.rank() == ROOT_RANK
    {
        true =>
        {
            let precipitate_ids = read_dump_ids(&para.precipitate_id_file)?;
            info!(n_ids = precipitate_ids.len(), "loaded precipitate IDs");

            let setup = BatchSetup::prepare(&para.input_dir, &[para.threshold_dir.clone()])?;
            info!(n_files = setup.files().len(), size = comm.size(), "found dump files to process");
            Some(setup)
        },
        false => None,
    };
    let setup = broadcast_setup(comm, setup)?;

    let processor = ThresholdProcessor
    {
        toolkit: Ovitos::new(),
        id_file: para.precipitate_id_file.clone(),
        threshold: para.peratom_threshold,
    };
    dispatch(comm, &setup, PartitionPolicy::RoundRobin, para.failure_policy, &processor)
}
