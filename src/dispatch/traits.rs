//! About the traits
use crate::dispatch::dispatcher::WorkItem;





/// One unit of per-file post-processing work, e.g. a single analysis pass of
/// the trajectory toolkit. Implementations read only the assigned input file
/// and write only into the prepared output directories, so no two workers
/// ever touch the same file.
pub trait ProcessItem
{
    /// A short name of the analysis for the progress logs.
    fn label(&self) -> &str;

    /// Process one assigned file. An error stays local to the owning worker:
    /// it is recorded against the item and handled per the failure policy.
    fn process_item(&self, item: &WorkItem) -> anyhow::Result<()>;
}
