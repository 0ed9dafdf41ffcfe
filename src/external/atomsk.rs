//! An interface to the atomsk structure builder, which constructs the
//! atomistic configuration files the MD engine consumes.
use crate::common::constants::CrystalStructure;
use crate::external::ToolCommand;





/// Axis labels on the builder's command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis
{
    X,
    Y,
    Z,
}

impl Axis
{
    pub fn as_str(&self) -> &'static str
    {
        match self
        {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}





/// The structure builder executable. Each method assembles one invocation;
/// the caller decides when to run it.
#[derive(Clone, Debug)]
pub struct Atomsk
{
    pub executable: String,
}

impl Atomsk
{
    pub fn new() -> Self
    {
        Atomsk
        {
            executable: String::from("atomsk"),
        }
    }

    /// `--create` an oriented unit cell.
    ///
    /// # Parameters
    /// ```text
    /// structure: the crystal structure of the lattice
    /// lattice_constant: the cell parameter (Unit: Angstrom)
    /// element: the element symbol
    /// orientation: the crystallographic orientations of the x, y, and z axes
    /// output: the unit cell file to write
    /// ```
    pub fn create_unit_cell(
        &self,
        structure: CrystalStructure,
        lattice_constant: f64,
        element: &str,
        orientation: [&str; 3],
        output: &str,
    ) -> ToolCommand
    {
        ToolCommand::new(&self.executable, vec![
            String::from("--create"),
            structure.as_str().to_owned(),
            format!("{lattice_constant}"),
            element.to_owned(),
            String::from("orient"),
            orientation[0].to_owned(),
            orientation[1].to_owned(),
            orientation[2].to_owned(),
            output.to_owned(),
        ])
    }

    /// `-duplicate` a cell and `-deform` it along one axis.
    ///
    /// # Parameters
    /// ```text
    /// input: the cell file to duplicate
    /// duplication: the duplication counts along x, y, and z
    /// deform_axis: the axis of the applied deformation
    /// deform_factor: the engineering strain of the deformation
    /// poisson_ratio: the Poisson ratio handed to the builder
    /// output: the supercell file to write
    /// ```
    pub fn duplicate_deform(
        &self,
        input: &str,
        duplication: [usize; 3],
        deform_axis: Axis,
        deform_factor: f64,
        poisson_ratio: f64,
        output: &str,
    ) -> ToolCommand
    {
        ToolCommand::new(&self.executable, vec![
            input.to_owned(),
            String::from("-duplicate"),
            format!("{}", duplication[0]),
            format!("{}", duplication[1]),
            format!("{}", duplication[2]),
            String::from("-deform"),
            deform_axis.as_str().to_owned(),
            format!("{deform_factor}"),
            format!("{poisson_ratio}"),
            output.to_owned(),
        ])
    }

    /// `--merge` several cells into one box along an axis.
    pub fn merge(&self, axis: Axis, parts: &[&str], output: &str) -> ToolCommand
    {
        let mut args = vec![
            String::from("--merge"),
            axis.as_str().to_owned(),
            format!("{}", parts.len()),
        ];
        args.extend(parts.iter().map(|part| (*part).to_owned()));
        args.push(output.to_owned());

        ToolCommand::new(&self.executable, args)
    }

    /// `-wrap` the atoms back into the box.
    pub fn wrap(&self, input: &str, output: &str) -> ToolCommand
    {
        ToolCommand::new(&self.executable, vec![
            input.to_owned(),
            String::from("-wrap"),
            output.to_owned(),
        ])
    }
}





#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn create_unit_cell_places_the_orientation_after_its_keyword()
    {
        let command = Atomsk::new().create_unit_cell(
            CrystalStructure::Bcc,
            2.8553,
            "Fe",
            ["[111]", "[-101]", "[1-21]"],
            "unitcell.xsf",
        );

        assert_eq!(command.program, "atomsk");
        assert_eq!(command.args, [
            "--create", "bcc", "2.8553", "Fe",
            "orient", "[111]", "[-101]", "[1-21]",
            "unitcell.xsf",
        ]);
    }

    #[test]
    fn duplicate_deform_orders_the_operations_as_the_builder_expects()
    {
        let command = Atomsk::new().duplicate_deform(
            "unitcell.xsf",
            [101, 35, 60],
            Axis::X,
            0.005,
            0.0,
            "half_a.xsf",
        );

        assert_eq!(command.args, [
            "unitcell.xsf",
            "-duplicate", "101", "35", "60",
            "-deform", "X", "0.005", "0",
            "half_a.xsf",
        ]);
    }

    #[test]
    fn merge_counts_its_parts()
    {
        let command = Atomsk::new().merge(Axis::Y, &["half_a.xsf", "half_b.xsf"], "merged.xsf");

        assert_eq!(command.args, ["--merge", "Y", "2", "half_a.xsf", "half_b.xsf", "merged.xsf"]);
    }

    #[test]
    fn wrap_converts_the_merged_cell()
    {
        let command = Atomsk::new().wrap("merged.xsf", "edge_dislo.lmp");

        assert_eq!(command.args, ["merged.xsf", "-wrap", "edge_dislo.lmp"]);
    }
}
