//! Contains the shared constants of the workflow.
use mpi::topology::Rank;
use phf::phf_map;





/// The coordinator rank: the only rank allowed to touch the filesystem during
/// setup, and the source of every broadcast.
pub const ROOT_RANK: Rank = 0;





/// The crystal structures understood by the structure builder and the
/// dislocation-extraction analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrystalStructure
{
    Bcc,
    Fcc,
}

impl CrystalStructure
{
    /// The name of the crystal structure on the engines' command lines.
    pub fn as_str(&self) -> &'static str
    {
        match self
        {
            CrystalStructure::Bcc => "bcc",
            CrystalStructure::Fcc => "fcc",
        }
    }
}





// 'LATTICE_CONSTANT' is a static structure of type 'phf::Map', initialized by macro 'phf_map'.
// Zero-temperature lattice constants (Unit: Angstrom) of the metals the workflow supports;
// used as the default cell parameter when the input parameters do not override it.
static LATTICE_CONSTANT: phf::Map<&'static str, (CrystalStructure, f64)> = phf_map!
{
    "Fe" => (CrystalStructure::Bcc, 2.8553),
    "Cr" => (CrystalStructure::Bcc, 2.8846),
    "V" => (CrystalStructure::Bcc, 3.0399),
    "Mo" => (CrystalStructure::Bcc, 3.1472),
    "W" => (CrystalStructure::Bcc, 3.1652),
    "Al" => (CrystalStructure::Fcc, 4.0495),
    "Ni" => (CrystalStructure::Fcc, 3.5240),
    "Cu" => (CrystalStructure::Fcc, 3.6149),
};

/// Look up the tabulated crystal structure and lattice constant of an element.
///
/// # Parameters
/// ```text
/// element: the element symbol, e.g. "Fe"
/// ```
pub fn lattice_parameter(element: &str) -> Option<(CrystalStructure, f64)>
{
    LATTICE_CONSTANT.get(element).copied()
}
