//! Energy-minimizes the generated configuration under the embedded-atom
//! potential, writing the relaxed configuration for the shear stage and a
//! per-atom energy dump that later serves as the Wigner-Seitz reference.
use std::path::{Path, PathBuf};
use tracing::info;
use crate::external::lammps::{Lammps, LammpsScript};
use crate::io::input::{MinimizePara, PotentialPara};
use crate::io::output::PreparedDir;



const SCRIPT_FILE: &str = "minimize.in";





/// Assemble the minimization command script.
///
/// # Parameters
/// ```text
/// para: the minimization parameters
/// potential: the embedded-atom potential
/// dump_path: where the relaxed per-atom energy dump is written
/// output_path: where the relaxed configuration file is written
/// ```
pub fn script(para: &MinimizePara, potential: &PotentialPara, dump_path: &Path, output_path: &Path) -> LammpsScript
{
    let mut script = LammpsScript::new();

    script.units("metal");
    script.atom_style("atomic");
    script.boundary("f", "f", "p");
    script.read_data(&para.input_file);

    script.pair_style("eam/fs");
    script.pair_coeff("* *", &potential.path(), &potential.element);

    script.group("metal_atoms", "type 1");
    script.compute("peratom", "all", "pe/atom");

    script.minimize(para.energy_tol, para.force_tol, para.max_iter, para.max_eval);

    script.write_dump("all", dump_path, "id x y z c_peratom");
    script.write_data(output_path);

    script
}





/// Run the minimization stage: prepare the output directories, render the
/// script, and invoke the engine once.
pub fn run(para: &MinimizePara, potential: &PotentialPara, engine: &Lammps) -> anyhow::Result<()>
{
    let dump_dir = PreparedDir::prepare(&para.dump_dir)?;
    let output_dir = PreparedDir::prepare(&para.output_dir)?;
    info!(dump_dir = %dump_dir.path().display(), output_dir = %output_dir.path().display(),
        "directories initialized");

    let dump_path = dump_dir.path().join(&para.dump_file);
    let output_path = output_dir.path().join(&para.output_file);
    let script = script(para, potential, &dump_path, &output_path);

    engine.run_script(&script, &PathBuf::from(SCRIPT_FILE))?;
    info!(output = %output_path.display(), "minimized configuration written");

    Ok(())
}





#[cfg(test)]
mod tests
{
    use super::*;
    use crate::io::input::Para;

    #[test]
    fn the_script_relaxes_under_the_eam_potential_with_free_x_y_surfaces()
    {
        let para = Para::new();
        let script = script(
            &para.minimize,
            &para.potential,
            &PathBuf::from("min_dump/edge_dislo_dump"),
            &PathBuf::from("min_input/edge_dislo_min.lmp"),
        ).render();

        assert!(script.contains("boundary f f p\n"));
        assert!(script.contains("pair_style eam/fs\n"));
        assert!(script.contains("pair_coeff * * potentials/malerba.fs Fe\n"));
        assert!(script.contains("minimize 1e-7 1e-10 1000 10000\n"));
        assert!(script.contains("write_dump all custom min_dump/edge_dislo_dump id x y z c_peratom\n"));
        assert!(script.contains("write_data min_input/edge_dislo_min.lmp\n"));
    }

    #[test]
    fn the_per_atom_energy_compute_precedes_the_minimization()
    {
        let para = Para::new();
        let script = script(
            &para.minimize,
            &para.potential,
            &PathBuf::from("dump"),
            &PathBuf::from("out"),
        ).render();

        let compute = script.find("compute peratom all pe/atom").unwrap();
        let minimize = script.find("minimize").unwrap();
        assert!(compute < minimize);
    }
}
