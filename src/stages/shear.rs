//! Runs the finite-temperature shear MD simulation: the minimized cell is
//! displaced so the dislocation starts a set distance from the precipitate,
//! the precipitate and the surface slabs are frozen, and opposite shear
//! velocities on the slabs drive the dislocation toward the precipitate.
use std::path::{Path, PathBuf};
use tracing::info;
use crate::external::lammps::{Lammps, LammpsScript};
use crate::io::input::{PotentialPara, ShearPara};
use crate::io::output::PreparedDir;



const SCRIPT_FILE: &str = "shear.in";
const LOG_FILE: &str = "log.lammps";
const DUMP_FILE_PATTERN: &str = "dumpfile_*";
const RESTART_FILE_PATTERN: &str = "restart.*";





/// Assemble the shear MD command script. The box-derived coordinates (the
/// precipitate center and the surface slab bounds) are expressed with
/// engine-side variables, so the script needs no knowledge of the box.
pub fn script(para: &ShearPara, potential: &PotentialPara) -> LammpsScript
{
    let mut script = LammpsScript::new();

    script.log(Path::new(LOG_FILE));
    script.units("metal");
    script.atom_style("atomic");
    script.boundary("p", "f", "p");
    script.read_data(&para.input_file);

    script.pair_style("eam/fs");
    script.pair_coeff("* *", &potential.path(), &potential.element);

    // Start the dislocation a set distance short of the precipitate
    let displacement = para.precipitate_radius + para.initial_displacement;
    script.displace_atoms("all", &format!("move {displacement} 0 0 units box"));

    // Box-derived geometry
    script.variable_equal("center_x", "0.5*(xlo+xhi)");
    script.variable_equal("center_y", "0.5*(ylo+yhi)");
    script.variable_equal("center_z", "0.5*(zlo+zhi)");
    script.variable_equal("top_slab_y", &format!("yhi-{}", para.fixed_surface_depth));
    script.variable_equal("bottom_slab_y", &format!("ylo+{}", para.fixed_surface_depth));

    script.region("precipitate_reg", &format!(
        "sphere ${{center_x}} ${{center_y}} ${{center_z}} {} units box",
        para.precipitate_radius,
    ));
    script.region("top_surface_reg", "block INF INF ${top_slab_y} INF INF INF units box");
    script.region("bottom_surface_reg", "block INF INF INF ${bottom_slab_y} INF INF units box");

    script.group("top_surface", "region top_surface_reg");
    script.group("bottom_surface", "region bottom_surface_reg");
    script.group("precipitate", "region precipitate_reg");
    script.group("mobile_atoms", "subtract all precipitate top_surface bottom_surface");

    // Per-atom and reduced computes followed by the trajectory output
    script.compute("peratom", "all", "pe/atom");
    script.compute("stress", "all", "stress/atom NULL");
    script.compute("temp_compute", "all", "temp");
    script.compute("press_comp", "all", "pressure temp_compute");
    for direction in ["x", "y", "z"]
    {
        script.compute(&format!("precipitate_force_{direction}"), "precipitate", &format!("reduce sum f{direction}"));
        script.compute(&format!("precipitate_velocity_{direction}"), "precipitate", &format!("reduce sum v{direction}"));
    }

    script.timestep(para.dt);
    script.fix("1", "all", &format!(
        "nvt temp {} {} {}",
        para.temperature,
        para.temperature,
        100.0 * para.dt,
    ));
    script.velocity("mobile_atoms", &format!(
        "create {} {} mom yes rot yes",
        para.temperature,
        para.velocity_seed,
    ));

    // Freeze the surface slabs and shear them in opposite directions
    script.fix("top_surface_freeze", "top_surface", "setforce 0.0 0.0 0.0");
    script.fix("bottom_surface_freeze", "bottom_surface", "setforce 0.0 0.0 0.0");
    script.velocity("top_surface", &format!("set {} 0.0 0.0", -para.shear_velocity / 2.0));
    script.velocity("bottom_surface", &format!("set {} 0.0 0.0", para.shear_velocity / 2.0));

    // The precipitate stays rigid
    script.fix("precipitate_freeze", "precipitate", "setforce 0.0 0.0 0.0");
    script.velocity("precipitate", "set 0.0 0.0 0.0");

    // The precipitate membership drives the post-processing selections
    script.write_dump("precipitate", &para.precipitate_id_file, "id");

    script.thermo_style(
        "step temp pe etotal c_press_comp[1] c_press_comp[2] c_press_comp[3] c_press_comp[4] c_press_comp[5] c_press_comp[6]",
    );
    script.thermo(para.thermo_freq);

    script.dump("1", "all", para.dump_freq, &para.dump_dir.join(DUMP_FILE_PATTERN), "id x y z c_peratom c_stress[4]");
    script.restart(para.restart_freq, &para.restart_dir.join(RESTART_FILE_PATTERN));

    script.run(para.run_steps);

    script
}





/// Run the shear MD stage: prepare the trajectory directories, render the
/// script, and invoke the engine once.
pub fn run(para: &ShearPara, potential: &PotentialPara, engine: &Lammps) -> anyhow::Result<()>
{
    let dump_dir = PreparedDir::prepare(&para.dump_dir)?;
    let restart_dir = PreparedDir::prepare(&para.restart_dir)?;
    info!(dump_dir = %dump_dir.path().display(), restart_dir = %restart_dir.path().display(),
        "directories initialized");

    let script = script(para, potential);
    engine.run_script(&script, &PathBuf::from(SCRIPT_FILE))?;
    info!(dump_dir = %dump_dir.path().display(), "trajectory written");

    Ok(())
}
