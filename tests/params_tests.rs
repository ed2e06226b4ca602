use cosette::params::{
    exclude_nuisance, latex_pnames, ExcludeFlags, ParamType, ParamsLists,
};
use cosette::parser::read_class_file_headers;
use cosette::utils::{HeaderError, ParamsError};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LISTS: &str = r#"{
    "cosmo": ["om", "ob", "h", "ns", "sigma8"],
    "nuisance": ["aIA", "eIA", "b0", "b1", "m0", "m1"],
    "all_but_shear_bias": ["om", "ob", "h", "ns", "sigma8", "aIA", "eIA", "b0", "b1"],
    "shear_bias": ["m0", "m1"]
}"#;

fn load_lists() -> ParamsLists {
    let dir = tempdir().unwrap();
    let path = dir.path().join("params_lists.json");
    fs::write(&path, LISTS).unwrap();
    ParamsLists::load(&path).unwrap()
}

#[test]
fn test_class_headers_take_last_comment_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cl.dat");
    fs::write(&path, "# col1\n# col2\n# 1:col1 2:col2\n2 0.5\n3 0.25\n").unwrap();

    assert_eq!(read_class_file_headers(&path).unwrap(), vec!["col1", "col2"]);
}

#[test]
fn test_class_headers_errors() {
    let dir = tempdir().unwrap();
    let data_only = dir.path().join("data.dat");
    fs::write(&data_only, "2 0.5\n").unwrap();

    assert!(matches!(
        read_class_file_headers(&data_only),
        Err(HeaderError::NoHeaders(_))
    ));
    assert!(matches!(
        read_class_file_headers(Path::new("missing/cl.dat")),
        Err(HeaderError::FileNotFound(_))
    ));
}

#[test]
fn test_latex_labels() {
    let labels = latex_pnames(&["om", "sigma8", "b3", "bM12", "m0", "m14", "custom"]);
    assert_eq!(
        labels,
        vec![
            r"\Omega_{\rm m}".to_string(),
            r"\sigma_8".to_string(),
            "b_{3}".to_string(),
            r"b_{\rm M, 12}".to_string(),
            "m_{0}".to_string(),
            "m14".to_string(),
            "custom".to_string(),
        ]
    );
}

#[test]
fn test_exclude_nuisance_with_tau_and_mnu() {
    let lists = load_lists();
    let exclusion = exclude_nuisance(
        &lists,
        ExcludeFlags {
            excl_nuis: true,
            mnu: true,
            ..Default::default()
        },
    );

    assert_eq!(exclusion.partype, ParamType::Cosmo);
    assert_eq!(exclusion.exclude[..2].to_vec(), vec!["tau", "mnu"]);
    assert_eq!(exclusion.exclude.len(), 2 + lists.nuisance.len());
}

#[test]
fn test_exclude_cosmo_and_shear_bias() {
    let lists = load_lists();
    let exclusion = exclude_nuisance(
        &lists,
        ExcludeFlags {
            nuis_without_shear_bias: true,
            ..Default::default()
        },
    );

    assert_eq!(exclusion.partype, ParamType::Nuisance);
    assert_eq!(
        exclusion.exclude,
        vec!["om", "ob", "h", "ns", "sigma8", "m0", "m1"]
    );
    // Loaded lists are left as they were
    assert_eq!(lists.cosmo.len(), 5);
}

#[test]
fn test_only_shear_bias_wins() {
    let lists = load_lists();
    let exclusion = exclude_nuisance(
        &lists,
        ExcludeFlags {
            excl_nuis: true,
            only_shear_bias: true,
            ..Default::default()
        },
    );

    assert_eq!(exclusion.exclude, lists.all_but_shear_bias);
    assert_eq!(exclusion.partype, ParamType::Nuisance);
}

#[test]
fn test_bundled_params_lists_parse() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("params_lists.json");
    let lists = ParamsLists::load(path).unwrap();
    assert!(lists.cosmo.contains(&"om".to_string()));
    assert!(!lists.shear_bias.is_empty());
}

#[test]
fn test_malformed_params_lists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{"cosmo": ["om"]}"#).unwrap();

    assert!(matches!(ParamsLists::load(&path), Err(ParamsError::Json(_))));
}
