//! Sliding-window time averaging over the trajectory: the worker owning
//! frame index `i` averages the per-atom energy and centrosymmetry over the
//! window `[i, i+window)` and writes the result under the window's first
//! file name. Indices whose window runs past the end of the trajectory are
//! skipped, not failed.
use std::env;
use mpi::traits::Communicator;
use tracing::info;
use crate::common::constants::ROOT_RANK;
use crate::common::error::DispatchError;
use crate::dispatch::dispatcher::{broadcast_setup, dispatch, BatchSetup, DispatchReport, WorkItem};
use crate::dispatch::partition::PartitionPolicy;
use crate::dispatch::traits::ProcessItem;
use crate::external::ovito::{Evaluate, Export, Modifier, Ovitos, Pipeline};
use crate::io::input::AnalysisPara;





/// The per-window time average.
pub struct TimeAverageProcessor
{
    pub toolkit: Ovitos,
    pub window: usize,
}

impl ProcessItem for TimeAverageProcessor
{
    fn label(&self) -> &str
    {
        "time averaging"
    }

    fn process_item(&self, item: &WorkItem) -> anyhow::Result<()>
    {
        let window = match item.files.window(item.index, self.window)
        {
            Some(window) => window,
            None =>
            {
                info!(index = item.index, "the averaging window runs past the end of the trajectory, skipping");
                return Ok(());
            },
        };

        let inputs = window.iter().map(|name| item.input_dir.join(name)).collect();
        let mut pipeline = Pipeline::new(inputs);
        pipeline.modifier(Modifier::TimeAveraging
        {
            properties: vec![String::from("c_peratom"), String::from("c_csym")],
        });
        pipeline.evaluate(Evaluate::LastFrame);
        pipeline.export(Export::Atoms
        {
            file: item.output_path(0),
            columns: [
                "Particle Identifier",
                "Position.X",
                "Position.Y",
                "Position.Z",
                "c_peratom",
                "c_peratom Average",
                "c_csym",
                "c_csym Average",
            ].map(String::from).to_vec(),
        });

        let script_path = env::temp_dir().join(format!("time_average_{}.py", item.name));
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
            let setup = BatchSetup::prepare(&para.input_dir, &[para.time_avg_dir.clone()])?;
            info!(n_files = setup.files().len(), size = comm.size(), "found dump files to process");
            Some(setup)
        },
        false => None,
    };
    let setup = broadcast_setup(comm, setup)?;

    let processor = TimeAverageProcessor
    {
        toolkit: Ovitos::new(),
        window: para.average_window,
    };
    dispatch(comm, &setup, PartitionPolicy::ContiguousBlock, para.failure_policy, &processor)
}





#[cfg(test)]
mod tests
{
    use super::*;
    use crate::dispatch::dispatcher::{process_share, FailurePolicy};

    /// A windowed processor whose toolkit is never reached: items past the
    /// end of the trajectory are skipped before any invocation.
    #[test]
    fn windows_past_the_end_are_skipped_without_failing()
    {
        let root = tempfile::tempdir().unwrap();
        let input_dir = root.path().join("dump_files");
        let output_dir = root.path().join("time_averaged_files");
        std::fs::create_dir(&input_dir).unwrap();
        for name in ["dumpfile_0", "dumpfile_1000", "dumpfile_2000"]
        {
            std::fs::File::create(input_dir.join(name)).unwrap();
        }

        let setup = BatchSetup::prepare(&input_dir, &[output_dir]).unwrap();
        let processor = TimeAverageProcessor
        {
            toolkit: Ovitos::new(),
            window: 4,
        };

        // Every window of 4 runs past a 3-frame trajectory, so all items
        // skip cleanly and nothing ever invokes the toolkit
        let report = process_share(0, &[0, 1, 2], &setup, FailurePolicy::HaltOnFirstError, &processor);

        assert!(report.succeeded());
        assert_eq!(report.processed, 3);
    }
}
