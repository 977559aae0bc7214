//! Structure snapshot shared by the solvers of one computation.

use hsl_core::element::{lowest_invert, lowest_top, ElementKind, StructureElement};
use hsl_core::geometry::{shape_of, SectionGeometry, Shape};
use hsl_core::params::{GeneralParams, ParamMap};
use hsl_core::settings::LawSettings;
use hsl_core::store::{ElementStore, ParameterStore};
use hsl_core::{LawError, Result};
use hsl_utils::grid;

use crate::flow::{OrificeLaw, WeirLaw};

/// Geometry, general parameters and level grid of one structure.
///
/// Loaded fresh for every computation; nothing here is cached across calls.
#[derive(Debug, Clone)]
pub struct StructureContext {
    pub structure_id: i64,
    pub profile: Shape,
    pub openings: Vec<StructureElement>,
    pub general: GeneralParams,
    /// Invert of the cross-section.
    pub min_elevation: f64,
    /// Width of the section at deck level, the crest of the deck weir.
    pub deck_width: f64,
    /// Sum of the opening widths.
    pub opening_width: f64,
    /// Downstream levels of the law; also the upstream search grid.
    pub levels: Vec<f64>,
    pub settings: LawSettings,
}

impl StructureContext {
    pub fn load<S>(
        store: &S,
        geometry: &dyn SectionGeometry,
        structure_id: i64,
        settings: &LawSettings,
    ) -> Result<Self>
    where
        S: ParameterStore + ElementStore + ?Sized,
    {
        let params = store.parameters(GeneralParams::KEYS, structure_id)?;
        let general = GeneralParams::from_map(&params)?;

        let profile = store
            .profile(structure_id)?
            .map(shape_of)
            .ok_or(LawError::MissingProfile(structure_id))?;
        let bounds = geometry.bounds(&profile).ok_or_else(|| {
            LawError::InvalidGeometry(format!("profile of structure {} is empty", structure_id))
        })?;

        let openings = store.elements(structure_id, ElementKind::Opening)?;
        if openings.is_empty() {
            return Err(LawError::MissingElements {
                structure_id,
                kind: ElementKind::Opening.to_string(),
            });
        }

        let deck_width = geometry
            .bounds(&geometry.clip_horizontal(&profile, general.deck_top))
            .map(|b| b.width())
            .unwrap_or(0.0);
        let opening_width = openings.iter().map(|o| o.width).sum();

        let min_elevation = bounds.min_elevation;
        let levels = grid::stepped(
            min_elevation + general.min_depth,
            min_elevation + general.max_depth,
            general.depth_step,
        )
        .map_err(|e| LawError::invalid_parameter("depth grid", e))?;

        log::info!(
            "[HSL Debug] context: structure {} with {} openings, {} levels from {} to {}",
            structure_id,
            openings.len(),
            levels.len(),
            levels.first().copied().unwrap_or(f64::NAN),
            levels.last().copied().unwrap_or(f64::NAN)
        );

        Ok(Self {
            structure_id,
            profile,
            openings,
            general,
            min_elevation,
            deck_width,
            opening_width,
            levels,
            settings: settings.clone(),
        })
    }

    /// Method-specific parameters of the same structure.
    pub fn method_params<S>(&self, store: &S, names: &[&str]) -> Result<ParamMap>
    where
        S: ParameterStore + ?Sized,
    {
        Ok(store.parameters(names, self.structure_id)?)
    }

    /// Lowest opening top: above it the first opening runs full.
    pub fn transition_elevation(&self) -> f64 {
        lowest_top(&self.openings).unwrap_or(self.general.deck_top)
    }

    pub fn lowest_invert(&self) -> f64 {
        lowest_invert(&self.openings).unwrap_or(self.min_elevation)
    }

    /// Highest downstream level of the grid.
    pub fn top_level(&self) -> f64 {
        self.levels.last().copied().unwrap_or(self.general.deck_top)
    }

    pub fn weir_law(&self) -> WeirLaw {
        WeirLaw {
            coef: self.general.weir_coef,
            kind: self.general.weir_kind,
            gravity: self.settings.gravity,
        }
    }

    pub fn orifice_law(&self) -> OrificeLaw {
        OrificeLaw::new(
            self.weir_law(),
            self.general.orifice_coef,
            self.general.orifice_band,
            self.general.deck_top,
            &self.settings,
        )
    }

    /// Weir flow over the deck, zero below its crest.
    pub fn deck_overflow(&self, zam: f64, zav: f64) -> f64 {
        if zam >= self.general.deck_top {
            self.weir_law()
                .flow(zam, zav, self.general.deck_top, self.deck_width)
        } else {
            0.0
        }
    }

    /// Orifice flow summed over every opening.
    pub fn orifice_flow(&self, zam: f64, zav: f64) -> f64 {
        let law = self.orifice_law();
        self.openings
            .iter()
            .filter_map(|o| law.flow(zam, zav, o))
            .sum()
    }

    /// (crest, width) of every opening, for the dichotomy solver.
    pub fn opening_crests(&self) -> Vec<(f64, f64)> {
        self.openings.iter().map(|o| (o.z_min, o.width)).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::bridge;
    use super::*;
    use hsl_core::geometry::GeoClipper;

    #[test]
    fn loads_bridge_snapshot() {
        let store = bridge();
        let ctx = StructureContext::load(&store, &GeoClipper, 1, &LawSettings::default()).unwrap();
        assert_eq!(ctx.openings.len(), 2);
        assert_eq!(ctx.min_elevation, 0.0);
        assert_eq!(ctx.levels.first().copied(), Some(0.5));
        assert_eq!(ctx.levels.last().copied(), Some(8.0));
        assert_eq!(ctx.levels.len(), 16);
        assert!((ctx.opening_width - 24.0).abs() < 1e-9);
        // Banks slope 1:1, so the section is 42 m wide at 6 m.
        assert!((ctx.deck_width - 42.0).abs() < 1e-9);
        assert_eq!(ctx.transition_elevation(), 5.0);
        assert_eq!(ctx.lowest_invert(), 0.0);
    }

    #[test]
    fn missing_profile_is_fatal() {
        let mut store = bridge();
        store.profile = None;
        let err = StructureContext::load(&store, &GeoClipper, 1, &LawSettings::default());
        assert!(matches!(err, Err(LawError::MissingProfile(1))));
    }

    #[test]
    fn missing_openings_is_fatal() {
        let mut store = bridge();
        store.openings.clear();
        let err = StructureContext::load(&store, &GeoClipper, 1, &LawSettings::default());
        assert!(matches!(err, Err(LawError::MissingElements { .. })));
    }

    #[test]
    fn missing_deck_top_is_fatal() {
        let mut store = bridge();
        store.params = ParamMap::new(1);
        let err = StructureContext::load(&store, &GeoClipper, 1, &LawSettings::default());
        assert!(matches!(err, Err(LawError::MissingParameter { .. })));
    }

    #[test]
    fn deck_overflow_only_above_crest() {
        let store = bridge();
        let ctx = StructureContext::load(&store, &GeoClipper, 1, &LawSettings::default()).unwrap();
        assert_eq!(ctx.deck_overflow(5.9, 1.0), 0.0);
        assert!(ctx.deck_overflow(6.5, 1.0) > 0.0);
    }
}
