//! Isoparametric (bilinear Q4) mapping between a quad and the normalized
//! square `[-1, 1]²`, and propagation of a point along a chain of quads.
//!
//! Image coordinates have y pointing down. All formulas here work in a y-up
//! frame: y is negated on input and negated back on output.

use super::types::Quad;

// ── Error types ────────────────────────────────────────────────────────────

/// Failure modes of the bilinear inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MappingError {
    /// The conditioning divisor `min(a, b, c)` of the η quadratic is zero.
    DegenerateScaling,
    /// The η quadratic has no real root; the point cannot be expressed in
    /// this quad's bilinear frame.
    NegativeDiscriminant {
        /// Value of the (scaled) discriminant.
        discriminant: f64,
    },
    /// `A + C·η` vanished while solving for ξ.
    SingularDenominator,
    /// Intermediate or final value became NaN or infinite.
    NonFinite,
}

impl std::fmt::Display for MappingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateScaling => write!(f, "degenerate quad: eta quadratic cannot be scaled"),
            Self::NegativeDiscriminant { discriminant } => {
                write!(f, "no real eta root (discriminant {:.3e})", discriminant)
            }
            Self::SingularDenominator => write!(f, "singular denominator while solving for xi"),
            Self::NonFinite => write!(f, "mapping produced a non-finite coordinate"),
        }
    }
}

impl std::error::Error for MappingError {}

/// A link of a quad chain failed; no partial result is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainError {
    /// Index `i` of the failing transform `quads[i] -> quads[i + 1]`.
    pub link: usize,
    /// Underlying mapping failure.
    pub source: MappingError,
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "propagation failed at link {} -> {}: {}",
            self.link,
            self.link + 1,
            self.source
        )
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

// ── Inversion ──────────────────────────────────────────────────────────────

/// Both real roots of the η quadratic and the one picked for ξ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtaRoots {
    /// Root computed as `q / a'`. `None` when the quadratic degenerates to a
    /// linear equation (`a' == 0`).
    pub near: Option<f64>,
    /// Root computed as `c' / q` (always present).
    pub far: f64,
    /// Root used to solve for ξ: the one with the smaller absolute value.
    pub chosen: f64,
}

/// Coefficients of the bilinear inversion for one (quad, point) pair.
struct Coeffs {
    a_x: f64,
    b_x: f64,
    c_x: f64,
    g: f64,
    quad_a: f64,
    quad_b: f64,
    quad_c: f64,
}

fn y_up(p: [f64; 2]) -> [f64; 2] {
    [p[0], -p[1]]
}

fn coefficients(quad: &Quad, p: [f64; 2]) -> Coeffs {
    let c = quad.corners();
    let [x1, y1] = y_up(c[0]);
    let [x2, y2] = y_up(c[1]);
    let [x3, y3] = y_up(c[2]);
    let [x4, y4] = y_up(c[3]);
    let [px, py] = y_up(p);

    let a_x = -x1 + x2 + x3 - x4;
    let b_x = -x1 - x2 + x3 + x4;
    let c_x = x1 - x2 + x3 - x4;
    let d_y = -y1 + y2 + y3 - y4;
    let e_y = -y1 - y2 + y3 + y4;
    let f_y = y1 - y2 + y3 - y4;
    let g = 4.0 * px - (x1 + x2 + x3 + x4);
    let h = 4.0 * py - (y1 + y2 + y3 + y4);

    Coeffs {
        a_x,
        b_x,
        c_x,
        g,
        quad_a: e_y * c_x - b_x * f_y,
        quad_b: f_y * g + e_y * a_x - b_x * d_y - c_x * h,
        quad_c: g * d_y - h * a_x,
    }
}

fn eta_roots(k: &Coeffs) -> Result<EtaRoots, MappingError> {
    // Conditioning step: divide by the smallest coefficient value (not the
    // smallest magnitude).
    let m = k.quad_a.min(k.quad_b).min(k.quad_c);
    if !m.is_finite() {
        return Err(MappingError::NonFinite);
    }
    if m.abs() < f64::MIN_POSITIVE {
        return Err(MappingError::DegenerateScaling);
    }
    let a = k.quad_a / m;
    let b = k.quad_b / m;
    let c = k.quad_c / m;

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Err(MappingError::NegativeDiscriminant { discriminant: disc });
    }

    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        // b' == 0 and disc == 0 imply a' c' == 0; with m != 0 the only real
        // solution left is η = 0.
        return Ok(EtaRoots {
            near: (a != 0.0).then_some(0.0),
            far: 0.0,
            chosen: 0.0,
        });
    }

    let far = c / q;
    let near = (a != 0.0).then(|| q / a);
    let chosen = match near {
        Some(n) if n.abs() < far.abs() => n,
        _ => far,
    };

    if !chosen.is_finite() {
        return Err(MappingError::NonFinite);
    }
    Ok(EtaRoots { near, far, chosen })
}

/// Both candidate η roots for `p` in `quad`.
///
/// [`normalize_point`] always takes [`EtaRoots::chosen`], the root with the
/// smaller absolute value. That rule is a heuristic: on strongly tapered
/// quads the true root can be the larger one (e.g. a point outside a
/// trapezoid near its short side). Callers that need certainty can inspect
/// both roots here.
pub fn solve_eta(quad: &Quad, p: [f64; 2]) -> Result<EtaRoots, MappingError> {
    if !p[0].is_finite() || !p[1].is_finite() {
        return Err(MappingError::NonFinite);
    }
    eta_roots(&coefficients(quad, p))
}

/// Invert the bilinear map of `quad`: image point → normalized `(ξ, η)`.
///
/// Corners map to `(-1,-1)`, `(1,-1)`, `(1,1)`, `(-1,1)` in canonical corner
/// order. Points outside the quad give coordinates outside `[-1, 1]²` as long
/// as a real root exists.
pub fn normalize_point(quad: &Quad, p: [f64; 2]) -> Result<[f64; 2], MappingError> {
    if !p[0].is_finite() || !p[1].is_finite() {
        return Err(MappingError::NonFinite);
    }
    let k = coefficients(quad, p);
    let eta = eta_roots(&k)?.chosen;

    let denom = k.a_x + k.c_x * eta;
    if denom == 0.0 {
        return Err(MappingError::SingularDenominator);
    }
    let xi = (k.g - k.b_x * eta) / denom;

    if !xi.is_finite() || !eta.is_finite() {
        return Err(MappingError::NonFinite);
    }
    Ok([xi, eta])
}

/// Forward bilinear map: normalized `(ξ, η)` → image point inside `quad`.
pub fn unnormalize_point(quad: &Quad, n: [f64; 2]) -> [f64; 2] {
    let [xi, eta] = n;
    let w = [
        0.25 * (1.0 - xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 - eta),
        0.25 * (1.0 + xi) * (1.0 + eta),
        0.25 * (1.0 - xi) * (1.0 + eta),
    ];
    let mut x = 0.0;
    let mut y = 0.0;
    for (wi, c) in w.iter().zip(quad.corners()) {
        let [cx, cy] = y_up(*c);
        x += wi * cx;
        y += wi * cy;
    }
    y_up([x, y])
}

/// Map `p` from `from` to the same normalized position in `to`.
pub fn transform_point(from: &Quad, to: &Quad, p: [f64; 2]) -> Result<[f64; 2], MappingError> {
    let n = normalize_point(from, p)?;
    let out = unnormalize_point(to, n);
    if !out[0].is_finite() || !out[1].is_finite() {
        return Err(MappingError::NonFinite);
    }
    Ok(out)
}

/// Propagate `start` through consecutive quads of a serial-section chain.
///
/// Returns one point per link (`quads.len() - 1` points; empty for fewer than
/// two quads). Point `i` is the image of the running point transformed from
/// `quads[i]` into `quads[i + 1]`. Any failing link fails the whole call.
pub fn propagate_point(quads: &[Quad], start: [f64; 2]) -> Result<Vec<[f64; 2]>, ChainError> {
    let mut out = Vec::with_capacity(quads.len().saturating_sub(1));
    let mut current = start;
    for (link, pair) in quads.windows(2).enumerate() {
        current = transform_point(&pair[0], &pair[1], current)
            .map_err(|source| ChainError { link, source })?;
        out.push(current);
    }
    tracing::trace!(links = out.len(), "propagated point through quad chain");
    Ok(out)
}
