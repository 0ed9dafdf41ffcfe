//! Builds the initial edge-dislocation configuration with the structure
//! builder: two half-crystals with duplication counts differing by one
//! period along x are deformed toward a common length and merged along y,
//! leaving an edge dislocation at the interface.
use std::fs;
use std::path::Path;
use anyhow::{anyhow, Context};
use tracing::info;
use crate::common::constants::lattice_parameter;
use crate::external::atomsk::{Atomsk, Axis};
use crate::io::input::GeneratePara;



const UNIT_CELL_FILE: &str = "unitcell.xsf";
const HALF_A_FILE: &str = "half_a.xsf";
const HALF_B_FILE: &str = "half_b.xsf";
const MERGED_FILE: &str = "merged.xsf";





/// The derived geometry of the two half-crystals.
///
/// # Fields
/// ```text
/// a_duplication: duplication counts of the half carrying the extra x period
/// b_duplication: duplication counts of the other half
/// a_deform, b_deform: the engineering strains applied along x before merging
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HalfCrystals
{
    pub a_duplication: [usize; 3],
    pub b_duplication: [usize; 3],
    pub a_deform: f64,
    pub b_deform: f64,
}

/// Derive the duplication counts and deformation factors from the requested
/// supercell size: half A carries `x_size + 1` periods, half B `x_size`,
/// both at half the y size, and each is strained by half a period relative
/// to the other half's period count.
pub fn half_crystals(x_size: usize, y_size: usize, z_size: usize) -> HalfCrystals
{
    HalfCrystals
    {
        a_duplication: [x_size + 1, y_size / 2, z_size],
        b_duplication: [x_size, y_size / 2, z_size],
        a_deform: 0.5 / x_size as f64,
        b_deform: 0.5 / (x_size as f64 + 1.0),
    }
}





/// Run the input-generation stage: issue the builder command sequence and
/// keep only the final configuration file.
pub fn run(para: &GeneratePara) -> anyhow::Result<()>
{
    let lattice_constant = match para.lattice_constant
    {
        Some(lattice_constant) => lattice_constant,
        None => lattice_parameter(&para.element)
            .ok_or_else(|| anyhow!("no tabulated lattice constant for element '{}'", para.element))?
            .1,
    };

    let halves = half_crystals(para.x_size, para.y_size, para.z_size);
    let builder = Atomsk::new();
    let orientation = [
        para.orientation[0].as_str(),
        para.orientation[1].as_str(),
        para.orientation[2].as_str(),
    ];

    info!(element = para.element.as_str(), lattice_constant, "creating the oriented unit cell");
    builder.create_unit_cell(para.structure, lattice_constant, &para.element, orientation, UNIT_CELL_FILE).run()?;

    info!("duplicating and deforming the two half-crystals");
    builder.duplicate_deform(UNIT_CELL_FILE, halves.a_duplication, Axis::X, halves.a_deform, 0.0, HALF_A_FILE).run()?;
    builder.duplicate_deform(UNIT_CELL_FILE, halves.b_duplication, Axis::X, halves.b_deform, 0.0, HALF_B_FILE).run()?;

    info!("merging the half-crystals into the dislocation cell");
    builder.merge(Axis::Y, &[HALF_A_FILE, HALF_B_FILE], MERGED_FILE).run()?;
    builder.wrap(MERGED_FILE, &para.output_file).run()?;

    // Remove the intermediate builder artifacts, keeping only the
    // configuration the MD engine reads
    for file in [UNIT_CELL_FILE, HALF_A_FILE, HALF_B_FILE, MERGED_FILE]
    {
        if Path::new(file).exists()
        {
            fs::remove_file(file).with_context(|| format!("removing the intermediate file '{file}'"))?;
        }
    }

    info!(output = para.output_file.as_str(), "configuration written");
    Ok(())
}





#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn the_half_crystals_differ_by_one_period_along_x()
    {
        let halves = half_crystals(100, 70, 60);

        assert_eq!(halves.a_duplication, [101, 35, 60]);
        assert_eq!(halves.b_duplication, [100, 35, 60]);
    }

    #[test]
    fn the_deformations_are_half_a_period_over_the_opposite_count()
    {
        let halves = half_crystals(100, 70, 60);

        assert_eq!(halves.a_deform, 0.5 / 100.0);
        assert_eq!(halves.b_deform, 0.5 / 101.0);
    }

    #[test]
    fn an_odd_y_size_rounds_the_half_height_down()
    {
        let halves = half_crystals(10, 7, 4);

        assert_eq!(halves.a_duplication[1], 3);
        assert_eq!(halves.b_duplication[1], 3);
    }
}
