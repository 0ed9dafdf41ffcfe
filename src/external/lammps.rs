//! An interface to the LAMMPS MD engine, driven through rendered command
//! scripts: a stage assembles its command sequence, writes it to a script
//! file, and runs the engine on it once.
use std::fs;
use std::io;
use std::path::Path;
use crate::external::{ToolCommand, ToolError};





/// A LAMMPS command script under construction. The convenience methods cover
/// the commands the workflow issues; anything else goes through `command`.
#[derive(Clone, Debug, Default)]
pub struct LammpsScript
{
    lines: Vec<String>,
}

impl LammpsScript
{
    pub fn new() -> Self
    {
        LammpsScript
        {
            lines: Vec::new(),
        }
    }

    /// Append one raw command line.
    pub fn command(&mut self, line: &str)
    {
        self.lines.push(line.to_owned());
    }

    pub fn log(&mut self, file: &Path)
    {
        self.command(&format!("log {}", file.display()));
    }

    pub fn units(&mut self, style: &str)
    {
        self.command(&format!("units {style}"));
    }

    pub fn atom_style(&mut self, style: &str)
    {
        self.command(&format!("atom_style {style}"));
    }

    pub fn boundary(&mut self, x: &str, y: &str, z: &str)
    {
        self.command(&format!("boundary {x} {y} {z}"));
    }

    pub fn read_data(&mut self, file: &Path)
    {
        self.command(&format!("read_data {}", file.display()));
    }

    pub fn pair_style(&mut self, style: &str)
    {
        self.command(&format!("pair_style {style}"));
    }

    pub fn pair_coeff(&mut self, types: &str, potential: &Path, element: &str)
    {
        self.command(&format!("pair_coeff {types} {} {element}", potential.display()));
    }

    pub fn group(&mut self, name: &str, spec: &str)
    {
        self.command(&format!("group {name} {spec}"));
    }

    pub fn region(&mut self, name: &str, spec: &str)
    {
        self.command(&format!("region {name} {spec}"));
    }

    /// Define an equal-style variable, e.g. a box-derived coordinate.
    pub fn variable_equal(&mut self, name: &str, expression: &str)
    {
        self.command(&format!("variable {name} equal {expression}"));
    }

    pub fn compute(&mut self, id: &str, group: &str, style: &str)
    {
        self.command(&format!("compute {id} {group} {style}"));
    }

    pub fn displace_atoms(&mut self, group: &str, spec: &str)
    {
        self.command(&format!("displace_atoms {group} {spec}"));
    }

    pub fn velocity(&mut self, group: &str, spec: &str)
    {
        self.command(&format!("velocity {group} {spec}"));
    }

    pub fn fix(&mut self, id: &str, group: &str, spec: &str)
    {
        self.command(&format!("fix {id} {group} {spec}"));
    }

    pub fn timestep(&mut self, dt: f64)
    {
        self.command(&format!("timestep {dt}"));
    }

    pub fn minimize(&mut self, energy_tol: f64, force_tol: f64, max_iter: usize, max_eval: usize)
    {
        self.command(&format!("minimize {energy_tol:e} {force_tol:e} {max_iter} {max_eval}"));
    }

    pub fn thermo_style(&mut self, spec: &str)
    {
        self.command(&format!("thermo_style custom {spec}"));
    }

    pub fn thermo(&mut self, every: usize)
    {
        self.command(&format!("thermo {every}"));
    }

    pub fn dump(&mut self, id: &str, group: &str, every: usize, file: &Path, columns: &str)
    {
        self.command(&format!("dump {id} {group} custom {every} {} {columns}", file.display()));
    }

    pub fn restart(&mut self, every: usize, file: &Path)
    {
        self.command(&format!("restart {every} {}", file.display()));
    }

    pub fn run(&mut self, steps: usize)
    {
        self.command(&format!("run {steps}"));
    }

    pub fn write_dump(&mut self, group: &str, file: &Path, columns: &str)
    {
        self.command(&format!("write_dump {group} custom {} {columns}", file.display()));
    }

    pub fn write_data(&mut self, file: &Path)
    {
        self.command(&format!("write_data {}", file.display()));
    }

    pub fn render(&self) -> String
    {
        let mut script = self.lines.join("\n");
        script.push('\n');
        script
    }

    pub fn write(&self, path: &Path) -> io::Result<()>
    {
        fs::write(path, self.render())
    }
}





/// The MD engine executable, optionally run under a parallel launcher
/// (e.g. `mpirun -np 8`). The engine owns its own parallelism; the workflow
/// only hands it a script.
#[derive(Clone, Debug)]
pub struct Lammps
{
    pub executable: String,
    pub launcher: Option<Vec<String>>,
}

impl Lammps
{
    pub fn new() -> Self
    {
        Lammps
        {
            executable: String::from("lmp"),
            launcher: None,
        }
    }

    /// Assemble the invocation for a rendered script file.
    pub fn run_command(&self, script: &Path) -> ToolCommand
    {
        let mut args: Vec<String> = Vec::new();
        let program = match &self.launcher
        {
            Some(launcher) if !launcher.is_empty() =>
            {
                args.extend(launcher[1..].iter().cloned());
                args.push(self.executable.clone());
                launcher[0].clone()
            },
            _ => self.executable.clone(),
        };

        args.push(String::from("-in"));
        args.push(script.display().to_string());

        ToolCommand::new(&program, args)
    }

    /// Write the script next to its outputs and run the engine on it once.
    ///
    /// # Parameters
    /// ```text
    /// script: the assembled command sequence
    /// script_path: where the rendered script file is written
    /// ```
    pub fn run_script(&self, script: &LammpsScript, script_path: &Path) -> Result<(), ToolError>
    {
        script.write(script_path).map_err(|source| ToolError::Launch
        {
            program: self.executable.clone(),
            source,
        })?;

        self.run_command(script_path).run()
    }
}
