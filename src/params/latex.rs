//! LaTeX labels for SFX_CLASS parameter names.

use crate::utils::config::LATEX_INDEXED_LIMIT;

/// Convert parameter names to LaTeX labels
///
/// **Public** - used for plot axis labels
///
/// Names without a known label are returned unchanged.
pub fn latex_pnames<S: AsRef<str>>(pnames: &[S]) -> Vec<String> {
    pnames.iter().map(|p| latex_name(p.as_ref())).collect()
}

/// LaTeX label of a single parameter name
pub fn latex_name(pname: &str) -> String {
    let fixed = match pname {
        "w0" => Some(r"w_0"),
        "wa" => Some(r"w_{\rm a}"),
        "ob" => Some(r"\Omega_{\rm b}"),
        "om" => Some(r"\Omega_{\rm m}"),
        "sigma8" => Some(r"\sigma_8"),
        "tau" => Some(r"\tau"),
        "ns" => Some(r"n_{\rm s}"),
        "h" => Some(r"h"),
        "delta_IG" | "Delta" => Some(r"\Delta"),
        "gamma_IG" => Some(r"\xi"),
        "mnu" => Some(r"\sum m_{\nu} \rm [eV]"),
        "aIA" => Some(r"{\cal A}_{\rm IA}"),
        "eIA" => Some(r"\eta_{\rm IA}"),
        "bIA" => Some(r"\beta_{\rm IA}"),
        _ => None,
    };
    if let Some(label) = fixed {
        return label.to_string();
    }

    if let Some(i) = indexed(pname, "bM") {
        format!(r"b_{{\rm M, {}}}", i)
    } else if let Some(i) = indexed(pname, "b") {
        format!("b_{{{}}}", i)
    } else if let Some(i) = indexed(pname, "m") {
        format!("m_{{{}}}", i)
    } else {
        pname.to_string()
    }
}

/// Index `i` of a `{prefix}{i}` name, written without leading zeros
fn indexed(pname: &str, prefix: &str) -> Option<u32> {
    let digits = pname.strip_prefix(prefix)?;
    let i = digits.parse::<u32>().ok()?;
    (i < LATEX_INDEXED_LIMIT && i.to_string() == digits).then_some(i)
}
