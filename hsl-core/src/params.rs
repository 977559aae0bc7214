//! Structure parameters.
//!
//! The parameter store hands back a loose name → value mapping
//! ([`ParamMap`]). Each method then resolves the names it needs into an
//! explicit struct, applying documented defaults and computing derived
//! values once, at load time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{LawError, Result};

/// Parameter names as stored per structure.
pub mod keys {
    pub const FIRST_BAY_STATION: &str = "first_bay_station";
    pub const SPAN_COUNT: &str = "span_count";
    pub const DECK_TOP: &str = "deck_top";
    pub const WEIR_COEF: &str = "weir_coef";
    pub const ORIFICE_COEF: &str = "orifice_coef";
    pub const WEIR_KIND: &str = "weir_kind";
    pub const ORIFICE_BAND: &str = "orifice_band";
    pub const MAX_DEPTH: &str = "max_depth";
    pub const MIN_DEPTH: &str = "min_depth";
    pub const DEPTH_STEP: &str = "depth_step";
    pub const FLOW_STEP: &str = "flow_step";

    pub const MIN_FLOW: &str = "min_flow";
    pub const MAX_FLOW: &str = "max_flow";

    pub const OPENING_SKEW: &str = "opening_skew";
    pub const ABUTMENT_FORM: &str = "abutment_form";
    pub const WINGWALL_ANGLE: &str = "wingwall_angle";
    pub const EMBANKMENT_SLOPE: &str = "embankment_slope";
    pub const ABUTMENT_SKEW: &str = "abutment_skew";
    pub const PIER_WIDTH: &str = "pier_width";
    pub const PIER_LENGTH: &str = "pier_length";
    pub const PIER_FORM: &str = "pier_form";
    pub const PIER_SKEW: &str = "pier_skew";

    pub const BORDA_COEF: &str = "borda_coef";
}

/// A raw parameter value: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Interpret stored text, preferring a number when it parses as one.
    pub fn parse(raw: &str) -> Self {
        match hsl_utils::parse::number(raw) {
            Ok(v) => ParamValue::Number(v),
            Err(_) => ParamValue::Text(raw.trim().to_string()),
        }
    }
}

/// Parameters returned by the store for one structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    pub structure_id: i64,
    values: BTreeMap<String, ParamValue>,
}

impl ParamMap {
    pub fn new(structure_id: i64) -> Self {
        Self {
            structure_id,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn number(&self, name: &str) -> Result<f64> {
        match self.values.get(name) {
            Some(ParamValue::Number(v)) => Ok(*v),
            Some(ParamValue::Text(t)) => Err(LawError::invalid_parameter(name, t)),
            None => Err(LawError::missing_parameter(name, self.structure_id)),
        }
    }

    pub fn number_or(&self, name: &str, default: f64) -> Result<f64> {
        if self.contains(name) {
            self.number(name)
        } else {
            Ok(default)
        }
    }

    /// Integral code such as a pier or abutment form.
    pub fn code(&self, name: &str) -> Result<i64> {
        let v = self.number(name)?;
        if v.fract() != 0.0 {
            return Err(LawError::invalid_parameter(name, v));
        }
        Ok(v as i64)
    }

    pub fn code_or(&self, name: &str, default: i64) -> Result<i64> {
        if self.contains(name) {
            self.code(name)
        } else {
            Ok(default)
        }
    }

    /// A yes/no switch stored as `0`/`1` or as text.
    pub fn switch(&self, name: &str) -> Result<bool> {
        match self.values.get(name) {
            Some(ParamValue::Number(v)) => Ok(*v != 0.0),
            Some(ParamValue::Text(t)) => hsl_utils::parse::flag(t)
                .ok_or_else(|| LawError::invalid_parameter(name, t)),
            None => Err(LawError::missing_parameter(name, self.structure_id)),
        }
    }

    pub fn text_or(&self, name: &str, default: &str) -> String {
        match self.values.get(name) {
            Some(ParamValue::Text(t)) => t.clone(),
            Some(ParamValue::Number(v)) => v.to_string(),
            None => default.to_string(),
        }
    }
}

/// Crest shape used by the weir law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeirKind {
    #[default]
    Thick,
    Thin,
}

impl FromStr for WeirKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "thick" | "0" => Ok(WeirKind::Thick),
            "thin" | "1" => Ok(WeirKind::Thin),
            other => Err(format!("unknown weir kind '{}'", other)),
        }
    }
}

/// Parameters shared by every method.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralParams {
    /// Station of the left edge of the first bay.
    pub first_bay_station: f64,
    pub span_count: u32,
    /// Derived: `span_count - 1`.
    pub pier_count: u32,
    /// Deck top, the crest of the overtopping weir.
    pub deck_top: f64,
    pub weir_coef: f64,
    pub orifice_coef: f64,
    pub weir_kind: WeirKind,
    /// Fraction of the gap between opening top and deck top over which the
    /// orifice law blends into the weir law.
    pub orifice_band: f64,
    /// Downstream depths above the section invert covered by the law.
    pub min_depth: f64,
    pub max_depth: f64,
    pub depth_step: f64,
    pub flow_step: f64,
}

impl GeneralParams {
    pub const KEYS: &'static [&'static str] = &[
        keys::FIRST_BAY_STATION,
        keys::SPAN_COUNT,
        keys::DECK_TOP,
        keys::WEIR_COEF,
        keys::ORIFICE_COEF,
        keys::WEIR_KIND,
        keys::ORIFICE_BAND,
        keys::MAX_DEPTH,
        keys::MIN_DEPTH,
        keys::DEPTH_STEP,
        keys::FLOW_STEP,
    ];

    pub const DEFAULT_WEIR_COEF: f64 = 0.385;
    pub const DEFAULT_ORIFICE_COEF: f64 = 1.0;
    pub const DEFAULT_ORIFICE_BAND: f64 = 0.05;

    pub fn from_map(map: &ParamMap) -> Result<Self> {
        let span_count = map.code_or(keys::SPAN_COUNT, 1)?;
        if span_count < 1 {
            return Err(LawError::invalid_parameter(keys::SPAN_COUNT, span_count));
        }
        let weir_kind_raw = map.text_or(keys::WEIR_KIND, "thick");
        let weir_kind = weir_kind_raw
            .parse::<WeirKind>()
            .map_err(|_| LawError::invalid_parameter(keys::WEIR_KIND, &weir_kind_raw))?;

        let params = Self {
            first_bay_station: map.number(keys::FIRST_BAY_STATION)?,
            span_count: span_count as u32,
            pier_count: (span_count - 1) as u32,
            deck_top: map.number(keys::DECK_TOP)?,
            weir_coef: map.number_or(keys::WEIR_COEF, Self::DEFAULT_WEIR_COEF)?,
            orifice_coef: map.number_or(keys::ORIFICE_COEF, Self::DEFAULT_ORIFICE_COEF)?,
            weir_kind,
            orifice_band: map.number_or(keys::ORIFICE_BAND, Self::DEFAULT_ORIFICE_BAND)?,
            min_depth: map.number(keys::MIN_DEPTH)?,
            max_depth: map.number(keys::MAX_DEPTH)?,
            depth_step: map.number(keys::DEPTH_STEP)?,
            flow_step: map.number(keys::FLOW_STEP)?,
        };
        if params.depth_step <= 0.0 {
            return Err(LawError::invalid_parameter(keys::DEPTH_STEP, params.depth_step));
        }
        if params.flow_step <= 0.0 {
            return Err(LawError::invalid_parameter(keys::FLOW_STEP, params.flow_step));
        }
        Ok(params)
    }
}

/// Flow bounds swept by the free-surface solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowRange {
    pub min_flow: f64,
    pub max_flow: f64,
}

impl FlowRange {
    fn from_map(map: &ParamMap) -> Result<Self> {
        let range = Self {
            min_flow: map.number(keys::MIN_FLOW)?,
            max_flow: map.number(keys::MAX_FLOW)?,
        };
        if range.max_flow < range.min_flow {
            return Err(LawError::invalid_parameter(keys::MAX_FLOW, range.max_flow));
        }
        Ok(range)
    }
}

/// Parameters of the Bradley method.
#[derive(Debug, Clone, PartialEq)]
pub struct BradleyParams {
    pub flows: FlowRange,
    /// Skew of the opening relative to the flow, degrees.
    pub opening_skew_deg: f64,
    /// Derived: skew in radians.
    pub opening_skew: f64,
    pub abutment_form: i64,
    /// Wingwall angle in degrees (abutment form 2).
    pub wingwall_angle: f64,
    /// Embankment slope code (abutment form 3): 0 = 1:1, 1 = 1.5:1, other = 2:1.
    pub embankment_slope: i64,
    /// Skewed abutments select the case B skew table.
    pub abutment_skewed: bool,
    pub pier_width: f64,
    pub pier_length: f64,
    /// Pier shape code, 1 to 8.
    pub pier_form: i64,
    pub pier_skew: f64,
}

impl BradleyParams {
    pub const KEYS: &'static [&'static str] = &[
        keys::OPENING_SKEW,
        keys::ABUTMENT_FORM,
        keys::WINGWALL_ANGLE,
        keys::EMBANKMENT_SLOPE,
        keys::ABUTMENT_SKEW,
        keys::PIER_WIDTH,
        keys::PIER_LENGTH,
        keys::PIER_FORM,
        keys::PIER_SKEW,
        keys::MAX_FLOW,
        keys::MIN_FLOW,
    ];

    pub fn from_map(map: &ParamMap) -> Result<Self> {
        let opening_skew_deg = map.number_or(keys::OPENING_SKEW, 0.0)?;
        let pier_width = map.number(keys::PIER_WIDTH)?;
        if pier_width <= 0.0 {
            return Err(LawError::invalid_parameter(keys::PIER_WIDTH, pier_width));
        }
        let pier_form = map.code(keys::PIER_FORM)?;
        if !(1..=8).contains(&pier_form) {
            return Err(LawError::invalid_parameter(keys::PIER_FORM, pier_form));
        }
        Ok(Self {
            flows: FlowRange::from_map(map)?,
            opening_skew_deg,
            opening_skew: opening_skew_deg.to_radians(),
            abutment_form: map.code(keys::ABUTMENT_FORM)?,
            wingwall_angle: map.number_or(keys::WINGWALL_ANGLE, 0.0)?,
            embankment_slope: map.code_or(keys::EMBANKMENT_SLOPE, 0)?,
            abutment_skewed: map.switch(keys::ABUTMENT_SKEW)?,
            pier_width,
            pier_length: map.number(keys::PIER_LENGTH)?,
            pier_form,
            pier_skew: map.number_or(keys::PIER_SKEW, 0.0)?,
        })
    }

    /// Ratio of the pier's projected width to its width for the opening skew.
    pub fn skew_correction(&self) -> f64 {
        (self.pier_length * self.opening_skew.sin() + self.pier_width * self.opening_skew.cos())
            / self.pier_width
    }
}

/// Parameters of the Borda method.
#[derive(Debug, Clone, PartialEq)]
pub struct BordaParams {
    pub flows: FlowRange,
    pub borda_coef: f64,
}

impl BordaParams {
    pub const KEYS: &'static [&'static str] = &[keys::MAX_FLOW, keys::MIN_FLOW, keys::BORDA_COEF];

    pub fn from_map(map: &ParamMap) -> Result<Self> {
        Ok(Self {
            flows: FlowRange::from_map(map)?,
            borda_coef: map.number(keys::BORDA_COEF)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general_map() -> ParamMap {
        let mut map = ParamMap::new(3);
        for (k, v) in [
            (keys::FIRST_BAY_STATION, "12"),
            (keys::SPAN_COUNT, "3"),
            (keys::DECK_TOP, "6.0"),
            (keys::MIN_DEPTH, "0.5"),
            (keys::MAX_DEPTH, "8"),
            (keys::DEPTH_STEP, "0.5"),
            (keys::FLOW_STEP, "10"),
        ] {
            map.insert(k, ParamValue::parse(v));
        }
        map
    }

    #[test]
    fn general_defaults_and_derived_values() {
        let p = GeneralParams::from_map(&general_map()).unwrap();
        assert_eq!(p.span_count, 3);
        assert_eq!(p.pier_count, 2);
        assert_eq!(p.weir_coef, 0.385);
        assert_eq!(p.orifice_coef, 1.0);
        assert_eq!(p.weir_kind, WeirKind::Thick);
        assert_eq!(p.orifice_band, 0.05);
    }

    #[test]
    fn missing_required_key_fails_at_load() {
        let mut map = general_map();
        map.values.remove(keys::DECK_TOP);
        let err = GeneralParams::from_map(&map).unwrap_err();
        assert!(matches!(err, LawError::MissingParameter { ref name, structure_id: 3 } if name == "deck_top"));
    }

    #[test]
    fn text_where_number_expected_is_invalid() {
        let mut map = general_map();
        map.insert(keys::FLOW_STEP, ParamValue::parse("ten"));
        assert!(matches!(
            GeneralParams::from_map(&map).unwrap_err(),
            LawError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn bradley_converts_skew_to_radians() {
        let mut map = ParamMap::new(1);
        for (k, v) in [
            (keys::OPENING_SKEW, "30"),
            (keys::ABUTMENT_FORM, "1"),
            (keys::ABUTMENT_SKEW, "0"),
            (keys::PIER_WIDTH, "2"),
            (keys::PIER_LENGTH, "8"),
            (keys::PIER_FORM, "3"),
            (keys::MIN_FLOW, "10"),
            (keys::MAX_FLOW, "200"),
        ] {
            map.insert(k, ParamValue::parse(v));
        }
        let p = BradleyParams::from_map(&map).unwrap();
        assert!((p.opening_skew - std::f64::consts::PI / 6.0).abs() < 1e-12);
        assert!(!p.abutment_skewed);
        assert_eq!(p.pier_skew, 0.0);
        // (8 * 0.5 + 2 * cos 30) / 2
        let expected = (8.0 * 0.5 + 2.0 * (3f64.sqrt() / 2.0)) / 2.0;
        assert!((p.skew_correction() - expected).abs() < 1e-12);
    }

    #[test]
    fn bradley_rejects_unknown_pier_form() {
        let mut map = ParamMap::new(1);
        for (k, v) in [
            (keys::ABUTMENT_FORM, "1"),
            (keys::ABUTMENT_SKEW, "0"),
            (keys::PIER_WIDTH, "2"),
            (keys::PIER_LENGTH, "8"),
            (keys::PIER_FORM, "9"),
            (keys::MIN_FLOW, "10"),
            (keys::MAX_FLOW, "200"),
        ] {
            map.insert(k, ParamValue::parse(v));
        }
        assert!(BradleyParams::from_map(&map).is_err());
    }

    #[test]
    fn borda_requires_coefficient() {
        let mut map = ParamMap::new(9);
        map.insert(keys::MIN_FLOW, ParamValue::Number(0.0));
        map.insert(keys::MAX_FLOW, ParamValue::Number(50.0));
        assert!(BordaParams::from_map(&map).is_err());
        map.insert(keys::BORDA_COEF, ParamValue::Number(0.9));
        let p = BordaParams::from_map(&map).unwrap();
        assert_eq!(p.borda_coef, 0.9);
        assert_eq!(p.flows.max_flow, 50.0);
    }
}
