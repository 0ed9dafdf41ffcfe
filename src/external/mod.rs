//! A module about the interfaces to the external engines: the structure
//! builder, the MD engine, and the trajectory analysis toolkit. The engines
//! own all the numerics; these interfaces only assemble their command lines
//! and scripts, and run them to completion.

pub mod atomsk;
pub mod lammps;
pub mod ovito;

use std::io;
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;





/// Errors from invoking an external engine.
#[derive(Debug, Error)]
pub enum ToolError
{
    #[error("could not launch '{program}'")]
    Launch
    {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}")]
    Failed
    {
        program: String,
        status: ExitStatus,
    },
}





/// A fully assembled invocation of an external engine, kept as plain data so
/// the stages can be checked without the engine installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCommand
{
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand
{
    pub fn new(program: &str, args: Vec<String>) -> Self
    {
        ToolCommand
        {
            program: program.to_owned(),
            args,
        }
    }

    /// Run the engine to completion, inheriting its stdout and stderr. The
    /// invocation either succeeds or fails outright; there is no timeout and
    /// no retry.
    pub fn run(&self) -> Result<(), ToolError>
    {
        debug!(program = self.program.as_str(), args = ?self.args, "invoking external engine");

        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| ToolError::Launch
            {
                program: self.program.clone(),
                source,
            })?;

        match status.success()
        {
            true => Ok(()),
            false => Err(ToolError::Failed
            {
                program: self.program.clone(),
                status,
            }),
        }
    }
}
