//! Elementary flow laws.
//!
//! Heads are measured from a crest or an opening invert. Flows are signed:
//! positive when the upstream level is the higher one.

use hsl_core::element::StructureElement;
use hsl_core::params::WeirKind;
use hsl_core::settings::LawSettings;
use hsl_core::{LawError, Result};

/// Submergence ratio under which a thick weir runs free.
const FREE_FLOW_RATIO: f64 = 0.8;

/// Broad- or sharp-crested weir.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeirLaw {
    pub coef: f64,
    pub kind: WeirKind,
    pub gravity: f64,
}

impl WeirLaw {
    /// Flow over a crest at `crest` of width `width`.
    ///
    /// The drowning factor `k` of a thick crest is 1 up to a submergence
    /// ratio of 0.8, follows `-25r² + 40r - 15` up to 1 and is 0 beyond.
    pub fn flow(&self, zam: f64, zav: f64, crest: f64, width: f64) -> f64 {
        let h1 = (zam - crest).max(0.0);
        let h2 = (zav - crest).max(0.0);
        if h1 == 0.0 && h2 == 0.0 {
            return 0.0;
        }
        let high = h1.max(h2);
        let low = h1.min(h2);
        let r = low / high;
        let sign = if h1 >= h2 { 1.0 } else { -1.0 };

        let free_flow = self.coef * (2.0 * self.gravity).sqrt() * width * high.powf(1.5);
        let k = match self.kind {
            WeirKind::Thick => {
                if r <= FREE_FLOW_RATIO {
                    1.0
                } else if r <= 1.0 {
                    -25.0 * r * r + 40.0 * r - 15.0
                } else {
                    0.0
                }
            }
            WeirKind::Thin => (1.0 - r).powf(1.5).powf(0.385),
        };
        sign * k * free_flow
    }
}

/// Opening that runs as a weir until drowned, then as an orifice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrificeLaw {
    pub weir: WeirLaw,
    pub coef: f64,
    pub contraction: f64,
    /// Head difference under which the orifice law is linearized.
    pub balance_gap: f64,
    /// Blending band as a fraction of the gap between opening top and deck.
    pub band_fraction: f64,
    pub deck_top: f64,
}

impl OrificeLaw {
    pub fn new(weir: WeirLaw, coef: f64, band_fraction: f64, deck_top: f64, settings: &LawSettings) -> Self {
        Self {
            weir,
            coef,
            contraction: settings.orifice_contraction,
            balance_gap: settings.balance_gap,
            band_fraction,
            deck_top,
        }
    }

    /// Flow through `element`; `None` when both levels are below its invert.
    pub fn flow(&self, zam: f64, zav: f64, element: &StructureElement) -> Option<f64> {
        let height = element.opening_height();
        let h1 = zam - element.z_min;
        let h2 = zav - element.z_min;
        let high = h1.max(h2);
        let low = h1.min(h2);
        if high < 0.0 {
            return None;
        }
        if element.area <= 0.0 {
            return Some(0.0);
        }
        let sign = if h1 >= h2 { 1.0 } else { -1.0 };
        let band = self.band_fraction * (self.deck_top - element.z_max).max(0.0);

        let weir = if high <= height + band {
            self.weir.flow(zam, zav, element.z_min, element.width).abs()
        } else {
            0.0
        };

        let orifice = if high >= height {
            let scaled = element.area * self.contraction;
            let q = if high - low <= self.balance_gap {
                scaled * (high - low) / self.balance_gap.sqrt()
            } else {
                scaled * (high - low.max(0.5 * height)).sqrt()
            };
            self.coef * (2.0 * self.weir.gravity).sqrt() * q
        } else {
            0.0
        };

        let q = if high < height || (band <= 0.0 && high == height) {
            weir
        } else if high >= height + band {
            orifice
        } else {
            weir + (high - height) * (orifice - weir) / band
        };
        Some(sign * q)
    }
}

/// Head-loss coefficient of an abrupt expansion from `struct_area` to `down_area`.
pub fn borda_coefficient(down_area: f64, struct_area: f64) -> f64 {
    (down_area / struct_area - 1.0).powi(2) + 1.0 / 9.0
}

/// Flow through a contraction for a given level difference.
pub fn borda_flow(
    down_area: f64,
    struct_area: f64,
    zam: f64,
    zav: f64,
    coef: f64,
    gravity: f64,
) -> f64 {
    if struct_area <= 0.0 || zam <= zav {
        return 0.0;
    }
    let k = borda_coefficient(down_area, struct_area);
    ((zam - zav) * 2.0 * gravity / k).sqrt() * down_area * coef
}

/// Upstream level for a given flow through a contraction.
pub fn borda_level(
    down_area: f64,
    struct_area: f64,
    q: f64,
    zav: f64,
    coef: f64,
    gravity: f64,
) -> f64 {
    let k = borda_coefficient(down_area, struct_area);
    (q / (down_area * coef)).powi(2) * k / (2.0 * gravity) + zav
}

/// Upstream level at which the weir flow over every crest reaches `q`.
///
/// `crests` holds (crest elevation, width) pairs. The level is searched by
/// bisection in `[low, high]` until the bracket is narrower than the
/// configured tolerance; if the flow cannot be reached the result sits on
/// the upper bound.
pub fn dichotomy_level(
    q: f64,
    zav: f64,
    low: f64,
    high: f64,
    crests: &[(f64, f64)],
    weir: &WeirLaw,
    settings: &LawSettings,
) -> Result<f64> {
    let (mut low, mut high) = (low, high);
    if !(low.is_finite() && high.is_finite()) {
        return Err(LawError::NonConvergence {
            iterations: 0,
            low,
            high,
        });
    }

    let mut mid = (low + high) / 2.0;
    let mut iterations = 0;
    while high - low > settings.dichotomy_tolerance {
        if iterations >= settings.max_dichotomy_iterations {
            return Err(LawError::NonConvergence {
                iterations,
                low,
                high,
            });
        }
        mid = (low + high) / 2.0;
        let flow: f64 = crests
            .iter()
            .map(|&(crest, width)| weir.flow(mid, zav, crest, width))
            .sum();
        if flow > q {
            high = mid;
        } else {
            low = mid;
        }
        iterations += 1;
    }
    Ok(mid)
}
