//! An interface to the OVITO trajectory analysis toolkit, driven through its
//! `ovitos` script runner: an analysis pipeline is assembled as data,
//! rendered to a small driver script, and executed once per work item.
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use crate::common::constants::CrystalStructure;
use crate::external::{ToolCommand, ToolError};





/// One named analysis operation appended to a pipeline, in application order.
#[derive(Clone, Debug, PartialEq)]
pub enum Modifier
{
    /// Dislocation extraction (DXA) for the given input lattice.
    DislocationAnalysis
    {
        lattice: CrystalStructure,
    },

    /// Wigner-Seitz occupancy against a reference configuration.
    WignerSeitz
    {
        reference: PathBuf,
    },

    /// Boolean per-atom selection from an expression over the dump columns.
    ExpressionSelection
    {
        expression: String,
    },

    /// Per-atom selection of the precipitate members (read from an ID dump)
    /// plus every atom whose per-atom energy exceeds the threshold.
    ThresholdSelection
    {
        id_file: PathBuf,
        threshold: f64,
    },

    InvertSelection,

    DeleteSelected,

    /// Sliding-window time average of the given per-atom properties.
    TimeAveraging
    {
        properties: Vec<String>,
    },
}



/// One export of a computed frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Export
{
    /// The extracted dislocation lines, in the toolkit's "ca" format.
    Lines
    {
        file: PathBuf,
    },

    /// The per-atom data, in the engine's dump format with the given columns.
    Atoms
    {
        file: PathBuf,
        columns: Vec<String>,
    },
}



/// Which frames of the imported trajectory are computed and exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evaluate
{
    EveryFrame,
    LastFrame,
}





/// An analysis pipeline: the ordered input frames, the modifiers, and the
/// exports of each computed frame.
#[derive(Clone, Debug)]
pub struct Pipeline
{
    inputs: Vec<PathBuf>,
    modifiers: Vec<Modifier>,
    exports: Vec<Export>,
    evaluate: Evaluate,
}

impl Pipeline
{
    pub fn new(inputs: Vec<PathBuf>) -> Self
    {
        Pipeline
        {
            inputs,
            modifiers: Vec::new(),
            exports: Vec::new(),
            evaluate: Evaluate::EveryFrame,
        }
    }

    pub fn single(input: PathBuf) -> Self
    {
        Self::new(vec![input])
    }

    pub fn modifier(&mut self, modifier: Modifier)
    {
        self.modifiers.push(modifier);
    }

    pub fn export(&mut self, export: Export)
    {
        self.exports.push(export);
    }

    pub fn evaluate(&mut self, evaluate: Evaluate)
    {
        self.evaluate = evaluate;
    }

    /// Render the pipeline to a driver script for the toolkit's script
    /// runner.
    pub fn render(&self) -> String
    {
        let mut script = String::new();

        script.push_str("from ovito.io import import_file, export_file\n");
        let imports = self.modifier_imports();
        if !imports.is_empty()
        {
            let _ = writeln!(script, "from ovito.modifiers import {}", imports.join(", "));
        }
        if self.modifiers.iter().any(|m| matches!(m, Modifier::WignerSeitz { .. }))
        {
            script.push_str("from ovito.pipeline import FileSource\n");
        }
        script.push('\n');

        let inputs: Vec<String> = self.inputs.iter().map(|p| py_str(p)).collect();
        let _ = writeln!(script, "pipeline = import_file([{}])", inputs.join(", "));

        for (i, modifier) in self.modifiers.iter().enumerate()
        {
            script.push('\n');
            render_modifier(&mut script, i, modifier);
        }

        script.push('\n');
        match self.evaluate
        {
            Evaluate::EveryFrame =>
            {
                script.push_str("for frame in range(pipeline.source.num_frames):\n");
                script.push_str("    data = pipeline.compute(frame)\n");
                for export in &self.exports
                {
                    render_export(&mut script, "    ", export);
                }
            },

            Evaluate::LastFrame =>
            {
                script.push_str("data = pipeline.compute(pipeline.source.num_frames - 1)\n");
                for export in &self.exports
                {
                    render_export(&mut script, "", export);
                }
            },
        }

        script
    }

    /// The modifier classes the script imports.
    fn modifier_imports(&self) -> Vec<&'static str>
    {
        let mut imports: Vec<&'static str> = Vec::new();
        for modifier in &self.modifiers
        {
            let import = match modifier
            {
                Modifier::DislocationAnalysis { .. } => Some("DislocationAnalysisModifier"),
                Modifier::WignerSeitz { .. } => Some("WignerSeitzAnalysisModifier"),
                Modifier::ExpressionSelection { .. } => Some("ExpressionSelectionModifier"),
                Modifier::InvertSelection => Some("InvertSelectionModifier"),
                Modifier::DeleteSelected => Some("DeleteSelectedModifier"),
                Modifier::TimeAveraging { .. } => Some("TimeAveragingModifier"),
                Modifier::ThresholdSelection { .. } => None,
            };
            if let Some(import) = import
            {
                if !imports.contains(&import)
                {
                    imports.push(import);
                }
            }
        }
        imports
    }
}



fn render_modifier(script: &mut String, index: usize, modifier: &Modifier)
{
    match modifier
    {
        Modifier::DislocationAnalysis { lattice } =>
        {
            let _ = writeln!(script, "modifier_{index} = DislocationAnalysisModifier()");
            let _ = writeln!(
                script,
                "modifier_{index}.input_crystal_structure = DislocationAnalysisModifier.Lattice.{}",
                lattice.as_str().to_uppercase(),
            );
            let _ = writeln!(script, "pipeline.modifiers.append(modifier_{index})");
        },

        Modifier::WignerSeitz { reference } =>
        {
            let _ = writeln!(script, "modifier_{index} = WignerSeitzAnalysisModifier()");
            let _ = writeln!(script, "modifier_{index}.reference = FileSource()");
            let _ = writeln!(script, "modifier_{index}.reference.load({})", py_str(reference));
            let _ = writeln!(script, "pipeline.modifiers.append(modifier_{index})");
        },

        Modifier::ExpressionSelection { expression } =>
        {
            let _ = writeln!(
                script,
                "pipeline.modifiers.append(ExpressionSelectionModifier(expression = '{expression}'))",
            );
        },

        Modifier::ThresholdSelection { id_file, threshold } =>
        {
            let _ = writeln!(script, "def select_atoms_{index}(frame, data):");
            script.push_str("    ids = set()\n");
            script.push_str("    reading = False\n");
            let _ = writeln!(script, "    with open({}) as id_dump:", py_str(id_file));
            script.push_str("        for line in id_dump:\n");
            script.push_str("            line = line.strip()\n");
            script.push_str("            if line.startswith('ITEM: ATOMS'):\n");
            script.push_str("                reading = True\n");
            script.push_str("            elif line.startswith('ITEM:'):\n");
            script.push_str("                reading = False\n");
            script.push_str("            elif reading and line:\n");
            script.push_str("                ids.add(int(line.split()[0]))\n");
            script.push_str("    identifiers = data.particles['Particle Identifier']\n");
            script.push_str("    energy = data.particles['c_peratom']\n");
            let _ = writeln!(
                script,
                "    selection = [1 if int(identifiers[i]) in ids or energy[i] > {threshold} else 0 for i in range(data.particles.count)]",
            );
            script.push_str("    data.particles_.create_property('Selection', data = selection)\n");
            let _ = writeln!(script, "pipeline.modifiers.append(select_atoms_{index})");
        },

        Modifier::InvertSelection =>
        {
            script.push_str("pipeline.modifiers.append(InvertSelectionModifier())\n");
        },

        Modifier::DeleteSelected =>
        {
            script.push_str("pipeline.modifiers.append(DeleteSelectedModifier())\n");
        },

        Modifier::TimeAveraging { properties } =>
        {
            let properties: Vec<String> = properties
                .iter()
                .map(|p| format!("'property:particles/{p}'"))
                .collect();
            let _ = writeln!(
                script,
                "pipeline.modifiers.append(TimeAveragingModifier(operate_on = ({},)))",
                properties.join(", "),
            );
        },
    }
}



fn render_export(script: &mut String, indent: &str, export: &Export)
{
    match export
    {
        Export::Lines { file } =>
        {
            let _ = writeln!(script, "{indent}export_file(pipeline, {}, 'ca')", py_str(file));
        },

        Export::Atoms { file, columns } =>
        {
            let columns: Vec<String> = columns.iter().map(|c| format!("'{c}'")).collect();
            let _ = writeln!(
                script,
                "{indent}export_file(data, {}, 'lammps/dump', columns = [{}])",
                py_str(file),
                columns.join(", "),
            );
        },
    }
}



/// Render a path as a Python string literal.
fn py_str(path: &Path) -> String
{
    format!("'{}'", path.display())
}





/// The toolkit's script runner.
#[derive(Clone, Debug)]
pub struct Ovitos
{
    pub executable: String,
}

impl Ovitos
{
    pub fn new() -> Self
    {
        Ovitos
        {
            executable: String::from("ovitos"),
        }
    }

    /// Render the pipeline to `script_path` and run the toolkit on it.
    pub fn run_pipeline(&self, pipeline: &Pipeline, script_path: &Path) -> Result<(), ToolError>
    {
        fs::write(script_path, pipeline.render()).map_err(|source| ToolError::Launch
        {
            program: self.executable.clone(),
            source,
        })?;

        ToolCommand::new(&self.executable, vec![script_path.display().to_string()]).run()
    }
}





#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn a_dxa_pipeline_sets_the_input_lattice_and_exports_both_forms()
    {
        let mut pipeline = Pipeline::single(PathBuf::from("dump_files/dumpfile_1000"));
        pipeline.modifier(Modifier::DislocationAnalysis
        {
            lattice: CrystalStructure::Bcc,
        });
        pipeline.export(Export::Lines
        {
            file: PathBuf::from("DXA_lines_files/dumpfile_1000"),
        });
        pipeline.export(Export::Atoms
        {
            file: PathBuf::from("DXA_atoms_files/dumpfile_1000"),
            columns: vec![String::from("Particle Identifier"), String::from("Position.X")],
        });

        let script = pipeline.render();

        assert!(script.contains("from ovito.modifiers import DislocationAnalysisModifier"));
        assert!(script.contains("pipeline = import_file(['dump_files/dumpfile_1000'])"));
        assert!(script.contains("modifier_0.input_crystal_structure = DislocationAnalysisModifier.Lattice.BCC"));
        assert!(script.contains("for frame in range(pipeline.source.num_frames):"));
        assert!(script.contains("    export_file(pipeline, 'DXA_lines_files/dumpfile_1000', 'ca')"));
        assert!(script.contains("columns = ['Particle Identifier', 'Position.X']"));
    }

    #[test]
    fn a_wigner_seitz_pipeline_loads_its_reference_frame()
    {
        let mut pipeline = Pipeline::single(PathBuf::from("dump_files/dumpfile_0"));
        pipeline.modifier(Modifier::WignerSeitz
        {
            reference: PathBuf::from("min_dump/edge_dislo_dump"),
        });
        pipeline.modifier(Modifier::ExpressionSelection
        {
            expression: String::from("Occupancy == 1"),
        });
        pipeline.modifier(Modifier::DeleteSelected);

        let script = pipeline.render();

        assert!(script.contains("from ovito.pipeline import FileSource"));
        assert!(script.contains("modifier_0.reference.load('min_dump/edge_dislo_dump')"));
        assert!(script.contains("ExpressionSelectionModifier(expression = 'Occupancy == 1')"));
        assert!(script.contains("pipeline.modifiers.append(DeleteSelectedModifier())"));
    }

    #[test]
    fn a_threshold_pipeline_reads_the_id_dump_inside_the_toolkit()
    {
        let mut pipeline = Pipeline::single(PathBuf::from("dump_files/dumpfile_0"));
        pipeline.modifier(Modifier::ThresholdSelection
        {
            id_file: PathBuf::from("precipitate_ID"),
            threshold: -4.0,
        });
        pipeline.modifier(Modifier::InvertSelection);
        pipeline.modifier(Modifier::DeleteSelected);

        let script = pipeline.render();

        assert!(script.contains("with open('precipitate_ID') as id_dump:"));
        assert!(script.contains("energy[i] > -4"));
        assert!(script.contains("pipeline.modifiers.append(select_atoms_0)"));
        assert!(script.contains("InvertSelectionModifier()"));
    }

    #[test]
    fn a_time_average_pipeline_computes_only_the_last_frame()
    {
        let mut pipeline = Pipeline::new(vec![
            PathBuf::from("dump_files/dumpfile_0"),
            PathBuf::from("dump_files/dumpfile_1000"),
        ]);
        pipeline.modifier(Modifier::TimeAveraging
        {
            properties: vec![String::from("c_peratom"), String::from("c_csym")],
        });
        pipeline.evaluate(Evaluate::LastFrame);

        let script = pipeline.render();

        assert!(script.contains("TimeAveragingModifier(operate_on = ('property:particles/c_peratom', 'property:particles/c_csym',))"));
        assert!(script.contains("data = pipeline.compute(pipeline.source.num_frames - 1)"));
        assert!(!script.contains("for frame in range"));
    }
}
