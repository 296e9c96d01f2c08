//! Reading and writing section outlines and focus-sample files.
//!
//! Section outlines are a JSON array of quads, each quad an array of four
//! `[x, y]` corners, in cutting order.
//!
//! Focus files are plain text:
//!
//! ```text
//! # comment lines and blank lines are ignored
//! xmin xmax ymin ymax step
//! x y z
//! x y z
//! ```

use std::path::Path;

use crate::focus::{FocusDomain, FocusError, FocusSample};
use crate::quad::{Quad, QuadError};

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum IoError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// Malformed line in a focus file (1-based line number).
    Parse { line: usize, message: String },
    /// Focus file has no `xmin xmax ymin ymax step` header.
    MissingHeader,
    Domain(FocusError),
    Quad(QuadError),
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Parse { line, message } => write!(f, "line {}: {}", line, message),
            Self::MissingHeader => write!(f, "focus file has no domain header"),
            Self::Domain(e) => write!(f, "{}", e),
            Self::Quad(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Domain(e) => Some(e),
            Self::Quad(e) => Some(e),
            Self::Parse { .. } | Self::MissingHeader => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ── Section outlines ───────────────────────────────────────────────────────

/// Parse a JSON section collection. Corner order is canonicalized per quad.
pub fn sections_from_json(json: &str) -> Result<Vec<Quad>, IoError> {
    let raw: Vec<[[f64; 2]; 4]> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|c| Quad::new(c).map_err(IoError::Quad))
        .collect()
}

pub fn sections_to_json(quads: &[Quad]) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(quads)?)
}

pub fn read_sections_json(path: impl AsRef<Path>) -> Result<Vec<Quad>, IoError> {
    let text = std::fs::read_to_string(path)?;
    sections_from_json(&text)
}

pub fn write_sections_json(path: impl AsRef<Path>, quads: &[Quad]) -> Result<(), IoError> {
    std::fs::write(path, sections_to_json(quads)?)?;
    Ok(())
}

// ── Focus samples ──────────────────────────────────────────────────────────

fn parse_floats<const N: usize>(text: &str, line: usize) -> Result<[f64; N], IoError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != N {
        return Err(IoError::Parse {
            line,
            message: format!("expected {} values, found {}", N, fields.len()),
        });
    }
    let mut out = [0.0; N];
    for (slot, field) in out.iter_mut().zip(&fields) {
        *slot = field.parse().map_err(|_| IoError::Parse {
            line,
            message: format!("invalid number {:?}", field),
        })?;
    }
    Ok(out)
}

/// Parse a focus file into its domain and samples.
pub fn parse_focus_file(text: &str) -> Result<(FocusDomain, Vec<FocusSample>), IoError> {
    let mut domain = None;
    let mut samples = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        match domain {
            None => {
                let [xmin, xmax, ymin, ymax, step] = parse_floats::<5>(content, line)?;
                domain = Some(FocusDomain::new(xmin, xmax, ymin, ymax, step).map_err(IoError::Domain)?);
            }
            Some(_) => {
                let [x, y, z] = parse_floats::<3>(content, line)?;
                let s = FocusSample::new(x, y, z);
                if !s.is_finite() {
                    return Err(IoError::Parse {
                        line,
                        message: "non-finite sample".to_string(),
                    });
                }
                samples.push(s);
            }
        }
    }

    let domain = domain.ok_or(IoError::MissingHeader)?;
    Ok((domain, samples))
}

/// Render a focus file readable by [`parse_focus_file`].
pub fn format_focus_file(domain: &FocusDomain, samples: &[FocusSample]) -> String {
    let mut out = String::new();
    out.push_str("# xmin xmax ymin ymax step\n");
    out.push_str(&format!(
        "{} {} {} {} {}\n",
        domain.xmin(),
        domain.xmax(),
        domain.ymin(),
        domain.ymax(),
        domain.step()
    ));
    out.push_str("# x y z\n");
    for s in samples {
        out.push_str(&format!("{} {} {}\n", s.x, s.y, s.z));
    }
    out
}

pub fn read_focus_file(path: impl AsRef<Path>) -> Result<(FocusDomain, Vec<FocusSample>), IoError> {
    parse_focus_file(&std::fs::read_to_string(path)?)
}

pub fn write_focus_file(
    path: impl AsRef<Path>,
    domain: &FocusDomain,
    samples: &[FocusSample],
) -> Result<(), IoError> {
    std::fs::write(path, format_focus_file(domain, samples))?;
    Ok(())
}
