//! About the error taxonomy of the workflow.
use std::io;
use std::path::PathBuf;
use mpi::topology::Rank;
use thiserror::Error;





/// Errors raised by the file-batch dispatcher and the setup around it.
///
/// Setup errors (`DirectoryNotFound`, `InvalidPath`) are fatal for the
/// coordinator and abort the run before the broadcast. `InvalidWorkerCount`
/// aborts before any partitioning. `ItemProcessing` stays local to the worker
/// that owns the item: it is recorded with the rank and the item identity,
/// never retried, and never propagated to the other workers. `Broadcast` is
/// fatal for the whole run.
#[derive(Debug, Error)]
pub enum DispatchError
{
    #[error("the path '{}' does not exist or is not a directory", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("there is some problem in accessing the path '{}'", .path.display())]
    InvalidPath
    {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a worker group must contain at least one rank, and every rank must lie within it")]
    InvalidWorkerCount,

    #[error("rank {rank} failed on item {index} ('{name}'): {cause:#}")]
    ItemProcessing
    {
        rank: Rank,
        index: usize,
        name: String,
        cause: anyhow::Error,
    },

    #[error("there is some problem in broadcasting the setup data: {0}")]
    Broadcast(String),
}
