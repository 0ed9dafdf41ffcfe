//! About the coordinator/worker dispatch of the trajectory dump files.
use std::path::{Path, PathBuf};
use mpi::topology::Rank;
use mpi::traits::*;
use tracing::{error, info};
use crate::common::constants::ROOT_RANK;
use crate::common::error::DispatchError;
use crate::dispatch::enumerate::FileSet;
use crate::dispatch::partition::PartitionPolicy;
use crate::dispatch::traits::ProcessItem;
use crate::io::output::PreparedDir;





/// The immutable setup result of one analysis run: the input directory, the
/// prepared output directories, and the enumerated dump files.
///
/// A value of this type exists only after the filesystem work is done: the
/// coordinator obtains one from `prepare`, every other worker from
/// `broadcast_setup`. The dispatch step requires it by reference, so no
/// worker can start processing before the setup completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchSetup
{
    input_dir: PathBuf,
    output_dirs: Vec<PathBuf>,
    files: FileSet,
}

impl BatchSetup
{
    /// Coordinator-only setup: check the input directory, create and clear
    /// every output directory, and enumerate the dump files in natural
    /// order. Any failure here aborts the run before the broadcast.
    ///
    /// # Parameters
    /// ```text
    /// input_dir: the directory holding the dump files to process
    /// output_dirs: the output directories, created if absent and cleared of stale contents
    /// ```
    pub fn prepare(input_dir: &Path, output_dirs: &[PathBuf]) -> Result<Self, DispatchError>
    {
        // Validate the input before touching the outputs, so a mistyped
        // input path cannot wipe the previous run's results
        if !input_dir.is_dir()
        {
            return Err(DispatchError::DirectoryNotFound(input_dir.to_path_buf()));
        }

        let mut prepared: Vec<PathBuf> = Vec::with_capacity(output_dirs.len());
        for dir in output_dirs
        {
            prepared.push(PreparedDir::prepare(dir)?.into_path());
        }

        let files = FileSet::from_dir(input_dir)?;

        Ok(BatchSetup
        {
            input_dir: input_dir.to_path_buf(),
            output_dirs: prepared,
            files,
        })
    }

    pub fn input_dir(&self) -> &Path
    {
        &self.input_dir
    }

    pub fn output_dirs(&self) -> &[PathBuf]
    {
        &self.output_dirs
    }

    pub fn files(&self) -> &FileSet
    {
        &self.files
    }
}





/// Broadcast a list of lines from the coordinator to every rank.
///
/// The coordinator passes `Some(lines)`, every other rank passes `None` and
/// receives the coordinator's value. The lines are joined with newlines into
/// one byte buffer whose length is broadcast first.
pub fn broadcast_lines<C: Communicator>(comm: &C, lines: Option<Vec<String>>) -> Result<Vec<String>, DispatchError>
{
    let is_root = comm.rank() == ROOT_RANK;
    let root_process = comm.process_at_rank(ROOT_RANK);

    let joined = match (is_root, lines)
    {
        (true, Some(lines)) => lines.join("\n"),
        (true, None) => return Err(DispatchError::Broadcast(String::from("the coordinator has nothing to broadcast"))),
        (false, _) => String::new(),
    };

    let mut n_bytes: u64 = joined.len() as u64;
    root_process.broadcast_into(&mut n_bytes);

    let mut buffer: Vec<u8> = match is_root
    {
        true => joined.into_bytes(),
        false => vec![0; n_bytes as usize],
    };
    root_process.broadcast_into(&mut buffer[..]);

    let joined = String::from_utf8(buffer)
        .map_err(|_| DispatchError::Broadcast(String::from("the received buffer is not valid UTF-8")))?;
    match joined.is_empty()
    {
        true => Ok(Vec::new()),
        false => Ok(joined.split('\n').map(str::to_owned).collect()),
    }
}



/// One-shot broadcast of the coordinator's setup result.
///
/// # Parameters
/// ```text
/// comm: the communicator of the worker group
/// setup: Some on the coordinator (from BatchSetup::prepare), None on every other rank
/// ```
pub fn broadcast_setup<C: Communicator>(comm: &C, setup: Option<BatchSetup>) -> Result<BatchSetup, DispatchError>
{
    let (paths, names) = match setup
    {
        Some(setup) =>
        {
            let mut paths: Vec<String> = Vec::with_capacity(1 + setup.output_dirs.len());
            for dir in std::iter::once(&setup.input_dir).chain(setup.output_dirs.iter())
            {
                match dir.to_str()
                {
                    Some(path) => paths.push(path.to_owned()),
                    None => return Err(DispatchError::Broadcast(format!("the path '{}' is not valid UTF-8", dir.display()))),
                }
            }
            (Some(paths), Some(setup.files.names().to_vec()))
        },
        None => (None, None),
    };

    let paths = broadcast_lines(comm, paths)?;
    let names = broadcast_lines(comm, names)?;
    if paths.is_empty()
    {
        return Err(DispatchError::Broadcast(String::from("the received path table is empty")));
    }

    Ok(BatchSetup
    {
        input_dir: PathBuf::from(&paths[0]),
        output_dirs: paths[1..].iter().map(PathBuf::from).collect(),
        files: FileSet::from_names(names),
    })
}





/// One assigned file, handed to the item processor together with the setup
/// context it needs to build its input and output paths.
pub struct WorkItem<'a>
{
    pub index: usize,
    pub name: &'a str,
    pub input_dir: &'a Path,
    pub output_dirs: &'a [PathBuf],
    pub files: &'a FileSet,
}

impl WorkItem<'_>
{
    pub fn input_path(&self) -> PathBuf
    {
        self.input_dir.join(self.name)
    }

    /// The output path of this item inside the prepared output directory
    /// `dir_index` (stages with one output directory pass 0).
    pub fn output_path(&self, dir_index: usize) -> PathBuf
    {
        self.output_dirs[dir_index].join(self.name)
    }
}





/// Whether a worker keeps going after one of its items fails. The failure
/// never leaves the worker either way; other ranks are unaffected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy
{
    ContinueOnError,
    HaltOnFirstError,
}



/// Terminal state of one worker's share.
#[derive(Debug, PartialEq, Eq)]
pub enum WorkerStatus
{
    Done,
    Failed
    {
        index: usize,
    },
}



/// A record of one failed item: enough identity to locate and rerun just
/// this item after the fact.
#[derive(Debug)]
pub struct ItemFailure
{
    pub index: usize,
    pub name: String,
    pub cause: anyhow::Error,
}



/// What one worker did with its share.
#[derive(Debug)]
pub struct DispatchReport
{
    pub rank: Rank,
    pub share_size: usize,
    pub processed: usize,
    pub failures: Vec<ItemFailure>,
    pub status: WorkerStatus,
}

impl DispatchReport
{
    pub fn succeeded(&self) -> bool
    {
        self.failures.is_empty()
    }

    /// The first recorded failure as the typed per-item error, for
    /// propagation out of a stage binary.
    pub fn into_error(mut self) -> Option<DispatchError>
    {
        match self.failures.is_empty()
        {
            true => None,
            false =>
            {
                let failure = self.failures.remove(0);
                Some(DispatchError::ItemProcessing
                {
                    rank: self.rank,
                    index: failure.index,
                    name: failure.name,
                    cause: failure.cause,
                })
            },
        }
    }
}





/// Process this rank's share of the broadcast file set.
///
/// Every rank computes its own share from the same immutable setup, then
/// works through it sequentially; no coordination happens past this point.
///
/// # Parameters
/// ```text
/// comm: the communicator of the worker group
/// setup: the broadcast setup result
/// policy: the partitioning strategy of this analysis
/// failure_policy: whether this worker halts or continues after a failed item
/// processor: the per-file analysis to run
/// ```
pub fn dispatch<C, P>(
    comm: &C,
    setup: &BatchSetup,
    policy: PartitionPolicy,
    failure_policy: FailurePolicy,
    processor: &P,
) -> Result<DispatchReport, DispatchError>
where
    C: Communicator,
    P: ProcessItem,
{
    let rank = comm.rank();
    let size = comm.size();
    let share = policy.share(setup.files.len(), rank, size)?;

    info!(rank, size, n_files = setup.files.len(), share = share.len(),
        "processing the assigned share of the {}", processor.label());

    Ok(process_share(rank, &share, setup, failure_policy, processor))
}



/// Sequentially process the given index share. Item processing is strictly
/// blocking: one invocation of the external toolkit completes before the
/// next item starts.
pub fn process_share<P: ProcessItem>(
    rank: Rank,
    share: &[usize],
    setup: &BatchSetup,
    failure_policy: FailurePolicy,
    processor: &P,
) -> DispatchReport
{
    let mut report = DispatchReport
    {
        rank,
        share_size: share.len(),
        processed: 0,
        failures: Vec::new(),
        status: WorkerStatus::Done,
    };

    for &index in share
    {
        let name = setup.files.names()[index].as_str();
        let item = WorkItem
        {
            index,
            name,
            input_dir: &setup.input_dir,
            output_dirs: &setup.output_dirs,
            files: &setup.files,
        };

        match processor.process_item(&item)
        {
            Ok(()) =>
            {
                report.processed += 1;
                info!(rank, index, file = name, "processed");
            },

            Err(cause) =>
            {
                error!(rank, index, file = name, cause = %cause, "item failed");
                report.failures.push(ItemFailure
                {
                    index,
                    name: name.to_owned(),
                    cause,
                });

                if failure_policy == FailurePolicy::HaltOnFirstError
                {
                    report.status = WorkerStatus::Failed
                    {
                        index,
                    };
                    break;
                }
            },
        }
    }

    report
}





#[cfg(test)]
mod tests
{
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::Write;

    /// Records the indices it sees and fails on one designated index.
    struct Recording
    {
        fail_on: Option<usize>,
        seen: RefCell<Vec<usize>>,
    }

    impl ProcessItem for Recording
    {
        fn label(&self) -> &str
        {
            "recording analysis"
        }

        fn process_item(&self, item: &WorkItem) -> anyhow::Result<()>
        {
            self.seen.borrow_mut().push(item.index);
            match self.fail_on == Some(item.index)
            {
                true => Err(anyhow!("engine rejected '{}'", item.name)),
                false => Ok(()),
            }
        }
    }

    fn test_setup(n_files: usize) -> BatchSetup
    {
        BatchSetup
        {
            input_dir: PathBuf::from("dump_files"),
            output_dirs: vec![PathBuf::from("out_a"), PathBuf::from("out_b")],
            files: FileSet::from_names((0..n_files).map(|i| format!("dumpfile_{}", i * 1000)).collect()),
        }
    }

    #[test]
    fn a_clean_share_reports_done()
    {
        let setup = test_setup(4);
        let processor = Recording
        {
            fail_on: None,
            seen: RefCell::new(Vec::new()),
        };

        let report = process_share(0, &[0, 1, 2, 3], &setup, FailurePolicy::HaltOnFirstError, &processor);

        assert_eq!(report.share_size, 4);
        assert_eq!(report.processed, 4);
        assert_eq!(report.status, WorkerStatus::Done);
        assert!(report.succeeded());
    }

    #[test]
    fn continue_on_error_finishes_the_share_and_records_the_failure()
    {
        let setup = test_setup(5);
        let processor = Recording
        {
            fail_on: Some(2),
            seen: RefCell::new(Vec::new()),
        };

        let report = process_share(1, &[0, 1, 2, 3, 4], &setup, FailurePolicy::ContinueOnError, &processor);

        assert_eq!(*processor.seen.borrow(), vec![0, 1, 2, 3, 4]);
        assert_eq!(report.processed, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 2);
        assert_eq!(report.failures[0].name, "dumpfile_2000");
        assert_eq!(report.status, WorkerStatus::Done);
    }

    #[test]
    fn halt_on_first_error_stops_the_share_at_the_failed_item()
    {
        let setup = test_setup(5);
        let processor = Recording
        {
            fail_on: Some(2),
            seen: RefCell::new(Vec::new()),
        };

        let report = process_share(1, &[0, 1, 2, 3, 4], &setup, FailurePolicy::HaltOnFirstError, &processor);

        assert_eq!(*processor.seen.borrow(), vec![0, 1, 2]);
        assert_eq!(report.processed, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.status, WorkerStatus::Failed { index: 2 });
    }

    #[test]
    fn the_first_failure_converts_into_the_typed_error()
    {
        let setup = test_setup(3);
        let processor = Recording
        {
            fail_on: Some(1),
            seen: RefCell::new(Vec::new()),
        };

        let report = process_share(2, &[0, 1, 2], &setup, FailurePolicy::ContinueOnError, &processor);

        assert!(matches!(
            report.into_error(),
            Some(DispatchError::ItemProcessing { rank: 2, index: 1, name, .. }) if name == "dumpfile_1000"
        ));
    }

    #[test]
    fn a_clean_report_converts_into_no_error()
    {
        let setup = test_setup(2);
        let processor = Recording
        {
            fail_on: None,
            seen: RefCell::new(Vec::new()),
        };

        let report = process_share(0, &[0, 1], &setup, FailurePolicy::ContinueOnError, &processor);

        assert!(report.into_error().is_none());
    }

    #[test]
    fn work_items_resolve_their_paths_against_the_setup()
    {
        let setup = test_setup(1);
        let item = WorkItem
        {
            index: 0,
            name: "dumpfile_0",
            input_dir: &setup.input_dir,
            output_dirs: &setup.output_dirs,
            files: &setup.files,
        };

        assert_eq!(item.input_path(), PathBuf::from("dump_files/dumpfile_0"));
        assert_eq!(item.output_path(0), PathBuf::from("out_a/dumpfile_0"));
        assert_eq!(item.output_path(1), PathBuf::from("out_b/dumpfile_0"));
    }

    #[test]
    fn prepare_enumerates_inputs_and_clears_stale_outputs()
    {
        let root = tempfile::tempdir().unwrap();
        let input_dir = root.path().join("dump_files");
        let output_dir = root.path().join("processed");
        std::fs::create_dir(&input_dir).unwrap();
        std::fs::create_dir(&output_dir).unwrap();
        for name in ["dumpfile_2000", "dumpfile_0", "dumpfile_10000"]
        {
            File::create(input_dir.join(name)).unwrap();
        }
        File::create(output_dir.join("dumpfile_999")).unwrap().write_all(b"stale").unwrap();

        let setup = BatchSetup::prepare(&input_dir, &[output_dir.clone()]).unwrap();

        assert_eq!(setup.input_dir(), input_dir);
        assert_eq!(setup.output_dirs(), [output_dir.clone()]);
        assert_eq!(setup.files().names(), ["dumpfile_0", "dumpfile_2000", "dumpfile_10000"]);
        assert_eq!(std::fs::read_dir(&output_dir).unwrap().count(), 0);
    }

    #[test]
    fn prepare_aborts_before_touching_outputs_when_the_input_is_missing()
    {
        let root = tempfile::tempdir().unwrap();
        let output_dir = root.path().join("processed");
        std::fs::create_dir(&output_dir).unwrap();
        File::create(output_dir.join("dumpfile_999")).unwrap();

        let result = BatchSetup::prepare(&root.path().join("no_such_dir"), &[output_dir.clone()]);

        assert!(matches!(result, Err(DispatchError::DirectoryNotFound(_))));
        // The previous run's outputs survive a mistyped input path
        assert_eq!(std::fs::read_dir(&output_dir).unwrap().count(), 1);
    }
}
