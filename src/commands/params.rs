//! Parameter commands: LaTeX labels, fit exclusions and CLASS headers.

use crate::params::{exclude_nuisance, latex_pnames, ExcludeFlags, Exclusion, ParamsLists};
use crate::parser::read_class_file_headers;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Arguments for the exclude command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ExcludeArgs {
    /// JSON file with the parameter lists
    pub params_file: PathBuf,

    pub flags: ExcludeFlags,
}

/// Print the LaTeX label of every name, one per line
///
/// **Public** - main entry point for the latex command
pub fn execute_latex(names: &[String]) -> Result<()> {
    if names.is_empty() {
        anyhow::bail!("At least one parameter name is required");
    }

    for (name, label) in names.iter().zip(latex_pnames(names)) {
        println!("{}\t{}", name, label);
    }
    Ok(())
}

/// Compute and print the exclusion list
///
/// **Public** - main entry point for the exclude command
///
/// # Returns
/// The computed exclusion, also printed to stdout
pub fn execute_exclude(args: ExcludeArgs) -> Result<Exclusion> {
    info!("Loading parameter lists from: {}", args.params_file.display());

    let lists = ParamsLists::load(&args.params_file).with_context(|| {
        format!(
            "Failed to load parameter lists from {}",
            args.params_file.display()
        )
    })?;
    debug!(
        "Loaded {} cosmo / {} nuisance parameters",
        lists.cosmo.len(),
        lists.nuisance.len()
    );

    let exclusion = exclude_nuisance(&lists, args.flags);

    println!("Free parameters: {}", exclusion.partype);
    println!("Excluded ({}):", exclusion.exclude.len());
    for name in &exclusion.exclude {
        println!("  {}", name);
    }

    Ok(exclusion)
}

/// Print the column names of a CLASS output table
///
/// **Public** - main entry point for the headers command
pub fn execute_headers(file: &Path) -> Result<Vec<String>> {
    let columns = read_class_file_headers(file)
        .with_context(|| format!("Failed to read headers of {}", file.display()))?;

    info!("{} columns in {}", columns.len(), file.display());
    for (i, column) in columns.iter().enumerate() {
        println!("{:>3}: {}", i + 1, column);
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamType;
    use std::fs;

    #[test]
    fn test_latex_requires_names() {
        assert!(execute_latex(&[]).is_err());
        assert!(execute_latex(&["om".to_string()]).is_ok());
    }

    #[test]
    fn test_exclude_reads_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.json");
        fs::write(
            &path,
            r#"{"cosmo": ["om", "h"], "nuisance": ["b0"], "all_but_shear_bias": ["om"], "shear_bias": ["m0"]}"#,
        )
        .unwrap();

        let exclusion = execute_exclude(ExcludeArgs {
            params_file: path,
            flags: ExcludeFlags {
                excl_nuis: true,
                ..Default::default()
            },
        })
        .unwrap();

        assert_eq!(exclusion.exclude, vec!["tau", "b0"]);
        assert_eq!(exclusion.partype, ParamType::Cosmo);
    }

    #[test]
    fn test_exclude_missing_file() {
        let result = execute_exclude(ExcludeArgs {
            params_file: PathBuf::from("missing/lists.json"),
            flags: ExcludeFlags::default(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_headers_prints_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cl.dat");
        fs::write(&path, "# run\n# 1:l 2:TT\n2 1.0\n").unwrap();

        assert_eq!(execute_headers(&path).unwrap(), vec!["l", "TT"]);
    }
}
