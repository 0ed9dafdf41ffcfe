//! About the input parameters and the input files.
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use crate::common::constants::CrystalStructure;
use crate::common::error::DispatchError;
use crate::dispatch::dispatcher::FailurePolicy;





/// The structure containing the parameters of the input-generation stage.
///
/// # Fields
/// ```text
/// element: the element symbol handed to the structure builder
/// structure: the crystal structure of the lattice
/// lattice_constant: the cell parameter (Unit: Angstrom); when None, the tabulated value of the element is used
/// orientation: the crystallographic orientations of the x, y, and z axes
/// x_size, y_size, z_size: the supercell size in lattice periods
/// output_file: the final configuration file consumed by the MD engine
/// ```
#[derive(Clone)]
pub struct GeneratePara
{
    pub element: String,
    pub structure: CrystalStructure,
    pub lattice_constant: Option<f64>,
    pub orientation: [String; 3],
    pub x_size: usize,
    pub y_size: usize,
    pub z_size: usize,
    pub output_file: String,
}





/// The structure containing the location of the embedded-atom potential.
#[derive(Clone)]
pub struct PotentialPara
{
    pub dir: PathBuf,
    pub file: String,
    pub element: String,
}

impl PotentialPara
{
    pub fn path(&self) -> PathBuf
    {
        self.dir.join(&self.file)
    }
}





/// The structure containing the parameters of the minimization stage.
///
/// # Fields
/// ```text
/// input_file: the configuration file produced by the input-generation stage
/// dump_dir: where the per-atom energy dump of the relaxed state is written
/// output_dir: where the relaxed configuration file is written
/// energy_tol, force_tol: the stopping tolerances of the minimizer
/// max_iter, max_eval: the iteration and force-evaluation caps of the minimizer
/// ```
#[derive(Clone)]
pub struct MinimizePara
{
    pub input_file: PathBuf,
    pub dump_dir: PathBuf,
    pub dump_file: String,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub energy_tol: f64,
    pub force_tol: f64,
    pub max_iter: usize,
    pub max_eval: usize,
}





/// The structure containing the parameters of the shear MD stage.
///
/// # Fields
/// ```text
/// precipitate_radius: the radius of the spherical precipitate (Unit: Angstrom)
/// initial_displacement: the initial dislocation-precipitate distance (Unit: Angstrom)
/// fixed_surface_depth: the depth of the frozen surface slabs (Unit: Angstrom)
/// dt: the integration timestep (Unit: ps)
/// temperature: the bath temperature of the thermostat (Unit: K)
/// shear_velocity: the relative velocity of the surface slabs (Unit: Angstrom/ps)
/// run_steps: the number of integration steps
/// thermo_freq, dump_freq, restart_freq: the output intervals (Unit: steps)
/// ```
#[derive(Clone)]
pub struct ShearPara
{
    pub input_file: PathBuf,
    pub dump_dir: PathBuf,
    pub restart_dir: PathBuf,
    pub precipitate_id_file: PathBuf,
    pub precipitate_radius: f64,
    pub initial_displacement: f64,
    pub fixed_surface_depth: f64,
    pub dt: f64,
    pub temperature: f64,
    pub shear_velocity: f64,
    pub velocity_seed: u32,
    pub run_steps: usize,
    pub thermo_freq: usize,
    pub dump_freq: usize,
    pub restart_freq: usize,
}





/// The structure containing the parameters shared by the trajectory analyses.
///
/// # Fields
/// ```text
/// input_dir: the directory holding the dump files of the shear MD stage
/// dxa_lines_dir, dxa_atoms_dir: the output directories of the dislocation extraction
/// ws_dir: the output directory of the Wigner-Seitz point-defect analysis
/// threshold_dir: the output directory of the per-atom energy thresholding
/// time_avg_dir: the output directory of the time averaging
/// reference_file: the minimized reference frame of the Wigner-Seitz analysis
/// precipitate_id_file: the ID dump written by the shear MD stage
/// peratom_threshold: atoms above this per-atom energy are kept (Unit: eV)
/// average_window: the number of consecutive frames in one time average
/// failure_policy: whether a worker halts or continues after a failed item
/// ```
#[derive(Clone)]
pub struct AnalysisPara
{
    pub input_dir: PathBuf,
    pub dxa_lines_dir: PathBuf,
    pub dxa_atoms_dir: PathBuf,
    pub ws_dir: PathBuf,
    pub threshold_dir: PathBuf,
    pub time_avg_dir: PathBuf,
    pub reference_file: PathBuf,
    pub precipitate_id_file: PathBuf,
    pub peratom_threshold: f64,
    pub average_window: usize,
    pub failure_policy: FailurePolicy,
}





/// The structure containing the parameters of the whole workflow.
#[derive(Clone)]
pub struct Para
{
    // Input-generation parameters
    pub generate: GeneratePara,

    // Embedded-atom potential
    pub potential: PotentialPara,

    // Minimization parameters
    pub minimize: MinimizePara,

    // Shear MD parameters
    pub shear: ShearPara,

    // Trajectory-analysis parameters
    pub analysis: AnalysisPara,
}





impl Para
{
    pub fn new() -> Self
    {
        Para
        {
            // Input-generation parameters
            generate: GeneratePara
            {
                element: String::from("Fe"),
                structure: CrystalStructure::Bcc,
                lattice_constant: None,
                orientation: [String::from("[111]"), String::from("[-101]"), String::from("[1-21]")],
                x_size: 100,
                y_size: 70,
                z_size: 60,
                output_file: String::from("edge_dislo.lmp"),
            },

            // Embedded-atom potential
            potential: PotentialPara
            {
                dir: PathBuf::from("potentials"),
                file: String::from("malerba.fs"),
                element: String::from("Fe"),
            },

            // Minimization parameters
            minimize: MinimizePara
            {
                input_file: PathBuf::from("edge_dislo.lmp"),
                dump_dir: PathBuf::from("min_dump"),
                dump_file: String::from("edge_dislo_dump"),
                output_dir: PathBuf::from("min_input"),
                output_file: String::from("edge_dislo_min.lmp"),
                energy_tol: 1.0e-7,
                force_tol: 1.0e-10,
                max_iter: 1000,
                max_eval: 10000,
            },

            // Shear MD parameters
            shear: ShearPara
            {
                input_file: PathBuf::from("min_input/edge_dislo_min.lmp"),
                dump_dir: PathBuf::from("dump_files"),
                restart_dir: PathBuf::from("restart_files"),
                precipitate_id_file: PathBuf::from("precipitate_ID"),
                precipitate_radius: 30.0,
                initial_displacement: 10.0,
                fixed_surface_depth: 5.0,
                dt: 0.001,
                temperature: 100.0,
                shear_velocity: 1.0,
                velocity_seed: 1234,
                run_steps: 100,
                thermo_freq: 1000,
                dump_freq: 1000,
                restart_freq: 10000,
            },

            // Trajectory-analysis parameters
            analysis: AnalysisPara
            {
                input_dir: PathBuf::from("dump_files"),
                dxa_lines_dir: PathBuf::from("DXA_lines_files"),
                dxa_atoms_dir: PathBuf::from("DXA_atoms_files"),
                ws_dir: PathBuf::from("WS_point_defect_files"),
                threshold_dir: PathBuf::from("peratom_threshold_files"),
                time_avg_dir: PathBuf::from("time_averaged_files"),
                reference_file: PathBuf::from("min_dump/edge_dislo_dump"),
                precipitate_id_file: PathBuf::from("precipitate_ID"),
                peratom_threshold: -4.0,
                average_window: 5,
                failure_policy: FailurePolicy::HaltOnFirstError,
            },
        }
    }
}





/// Read the atom identifiers out of a dump file written with a single `id`
/// column, e.g. the precipitate ID dump of the shear MD stage. Only the
/// lines of the `ITEM: ATOMS` section are consumed; the first whitespace
/// token of each line is parsed as the identifier.
///
/// # Parameters
/// ```text
/// filename: the ID dump file to read
/// ```
pub fn read_dump_ids(filename: &std::path::Path) -> Result<BTreeSet<u64>, DispatchError>
{
    let invalid = |source| DispatchError::InvalidPath
    {
        path: filename.to_path_buf(),
        source,
    };

    let content = fs::read_to_string(filename).map_err(invalid)?;
    let mut ids: BTreeSet<u64> = BTreeSet::new();
    let mut reading_atoms = false;

    for line in content.lines()
    {
        let line = line.trim();
        if line.starts_with("ITEM: ATOMS")
        {
            reading_atoms = true;
        }
        else if line.starts_with("ITEM:")
        {
            reading_atoms = false;
        }
        else if reading_atoms && !line.is_empty()
        {
            let token = line.split_whitespace().next().unwrap_or(line);
            let id = token.parse().map_err(|_| invalid(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("'{token}' is not an atom identifier"),
            )))?;
            ids.insert(id);
        }
    }

    Ok(ids)
}





#[cfg(test)]
mod tests
{
    use super::*;
    use std::io::Write;

    const ID_DUMP: &str = "\
ITEM: TIMESTEP
0
ITEM: NUMBER OF ATOMS
4
ITEM: BOX BOUNDS pp fs pp
0.0 10.0
0.0 10.0
0.0 10.0
ITEM: ATOMS id
12
7
1033
7
";

    #[test]
    fn read_dump_ids_parses_the_atoms_section()
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ID_DUMP.as_bytes()).unwrap();

        let ids = read_dump_ids(file.path()).unwrap();

        assert_eq!(ids, BTreeSet::from([7, 12, 1033]));
    }

    #[test]
    fn read_dump_ids_ignores_header_numbers()
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ID_DUMP.as_bytes()).unwrap();

        // Neither the timestep nor the box bounds leak into the ID set
        let ids = read_dump_ids(file.path()).unwrap();
        assert!(!ids.contains(&0));
        assert!(!ids.contains(&4));
    }

    #[test]
    fn read_dump_ids_rejects_a_malformed_line()
    {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ITEM: ATOMS id\nnot_an_id\n").unwrap();

        assert!(read_dump_ids(file.path()).is_err());
    }

    #[test]
    fn read_dump_ids_fails_on_a_missing_file()
    {
        assert!(read_dump_ids(std::path::Path::new("no_such_id_dump")).is_err());
    }
}
