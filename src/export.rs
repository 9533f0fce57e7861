//! Mutation lists for structure-based binding-affinity predictors.
//!
//! MutaBind2 takes tab-separated `chain residue mutant`; SAAMBE-3D takes
//! space-separated `chain residue original mutant`. Both files are written
//! once per structure, with the chain that carries the spike RBD.

use std::io::{self, Write};

use crate::substitution::Substitution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFormat {
    MutaBind2,
    Saambe3d,
}

impl ToolFormat {
    pub fn line(&self, chain: char, sub: &Substitution) -> String {
        match self {
            ToolFormat::MutaBind2 => {
                format!("{}\t{}\t{}", chain, sub.position, sub.observed as char)
            }
            ToolFormat::Saambe3d => format!(
                "{} {} {} {}",
                chain, sub.position, sub.reference as char, sub.observed as char
            ),
        }
    }
}

/// One exported file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTarget {
    pub file_name: &'static str,
    pub format: ToolFormat,
    /// PDB entry the chain label refers to
    pub structure: &'static str,
    pub chain: char,
}

pub const EXPORT_TARGETS: [ExportTarget; 4] = [
    // 7DF4: spike bound to ACE2, RBD on chain B
    ExportTarget {
        file_name: "mutabind2_7df4.txt",
        format: ToolFormat::MutaBind2,
        structure: "7DF4",
        chain: 'B',
    },
    // 8D8Q: spike with antibodies 2196/2130, spike on chain A
    ExportTarget {
        file_name: "mutabind2_8d8q.txt",
        format: ToolFormat::MutaBind2,
        structure: "8D8Q",
        chain: 'A',
    },
    // 6MOJ: RBD bound to ACE2, RBD on chain E
    ExportTarget {
        file_name: "saambe3d_6moj.txt",
        format: ToolFormat::Saambe3d,
        structure: "6MOJ",
        chain: 'E',
    },
    ExportTarget {
        file_name: "saambe3d_8d8q.txt",
        format: ToolFormat::Saambe3d,
        structure: "8D8Q",
        chain: 'A',
    },
];

/// Calls made only of canonical residues and digits, in input order.
pub fn exportable<'a, I>(calls: I) -> Vec<Substitution>
where
    I: IntoIterator<Item = &'a Substitution>,
{
    calls.into_iter().filter(|s| s.is_canonical()).copied().collect()
}

pub fn write_export<W: Write>(
    mut writer: W,
    target: &ExportTarget,
    calls: &[Substitution],
) -> io::Result<()> {
    for sub in calls {
        writeln!(writer, "{}", target.format.line(target.chain, sub))?;
    }
    writer.flush()
}
