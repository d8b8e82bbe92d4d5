//! Colour schemes for grid cells and concentration fields.
//!
//! A [`Palette`] is a list of evenly spaced sRGB stops sampled by linear
//! interpolation. Boolean simulations use [`CellColors`] directly; the
//! reaction field maps `v` through a palette.

use crate::color::Srgb;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Evenly spaced colour stops; `sample(0.0)` is the first, `sample(1.0)` the last.
#[derive(Debug, Clone)]
pub struct Palette {
    stops: Vec<Srgb>,
}

impl Palette {
    /// Requires at least one stop.
    pub fn new(stops: Vec<Srgb>) -> Result<Self, EngineError> {
        if stops.is_empty() {
            return Err(EngineError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { stops })
    }

    pub fn from_hex(hexes: &[&str]) -> Result<Self, EngineError> {
        let stops = hexes
            .iter()
            .map(|h| Srgb::from_hex(h))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stops)
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Samples at `t`, clamped to [0, 1]. NaN samples the first stop.
    pub fn sample(&self, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.stops.len();
        if n == 1 {
            return self.stops[0];
        }
        let scaled = t * (n - 1) as f64;
        let idx = (scaled as usize).min(n - 2);
        self.stops[idx].lerp(self.stops[idx + 1], scaled - idx as f64)
    }

    /// Dark navy through teal to pale mint.
    pub fn ocean() -> Self {
        Self::from_hex(&["#001f3f", "#003366", "#005f73", "#0a9396", "#94d2bd"])
            .expect("ocean palette hex values are valid")
    }

    /// Black through reds to gold.
    pub fn fire() -> Self {
        Self::from_hex(&["#000000", "#800000", "#ff4500", "#ff8c00", "#ffd700"])
            .expect("fire palette hex values are valid")
    }

    /// Black to white.
    pub fn monochrome() -> Self {
        Self::from_hex(&["#000000", "#ffffff"]).expect("monochrome palette hex values are valid")
    }

    /// Looks up a built-in palette by name.
    pub fn from_name(name: &str) -> Result<Self, EngineError> {
        match name {
            "ocean" => Ok(Self::ocean()),
            "fire" => Ok(Self::fire()),
            "monochrome" => Ok(Self::monochrome()),
            other => Err(EngineError::InvalidPalette(format!(
                "unknown palette '{other}' (expected one of: {})",
                Self::list_names().join(", ")
            ))),
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        &["ocean", "fire", "monochrome"]
    }
}

/// Colours used to paint boolean grids and their actors.
///
/// In params JSON this is the `"colors"` object of `"#rrggbb"` strings; any
/// key left out keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellColors {
    pub background: Srgb,
    pub alive: Srgb,
    pub actor: Srgb,
    /// Actor that is carrying something (termites).
    pub actor_loaded: Srgb,
    pub trail: Srgb,
}

impl CellColors {
    /// Colour of a cell with fade factor `brightness`; 0 is background.
    pub fn cell(&self, brightness: f64) -> Srgb {
        self.background.lerp(self.alive, brightness)
    }

    /// Reads the `"colors"` entry of a params object.
    ///
    /// Missing entry gives the defaults; a malformed one is
    /// `EngineError::InvalidColor`.
    pub fn from_params(params: &Value) -> Result<Self, EngineError> {
        match params.get("colors") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(colors) => serde_json::from_value(colors.clone())
                .map_err(|e| EngineError::InvalidColor(e.to_string())),
        }
    }
}

impl Default for CellColors {
    fn default() -> Self {
        Self {
            background: Srgb::new(0.04, 0.04, 0.06),
            alive: Srgb::new(0.36, 0.85, 0.55),
            actor: Srgb::new(0.95, 0.3, 0.25),
            actor_loaded: Srgb::new(1.0, 0.8, 0.2),
            trail: Srgb::new(0.45, 0.2, 0.2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_no_stops_is_an_error() {
        assert!(Palette::new(vec![]).is_err());
        assert!(Palette::from_hex(&[]).is_err());
    }

    #[test]
    fn single_stop_palette_is_constant() {
        let p = Palette::from_hex(&["#336699"]).unwrap();
        assert_eq!(p.sample(0.0), p.sample(1.0));
    }

    #[test]
    fn sample_hits_endpoints() {
        let p = Palette::monochrome();
        assert_eq!(p.sample(0.0), Srgb::BLACK);
        assert_eq!(p.sample(1.0), Srgb::WHITE);
        assert_eq!(p.sample(-3.0), Srgb::BLACK);
        assert_eq!(p.sample(f64::NAN), Srgb::BLACK);
    }

    #[test]
    fn sample_interpolates_between_stops() {
        let p = Palette::monochrome();
        let mid = p.sample(0.25);
        assert!((mid.g - 0.25).abs() < 1e-12);
    }

    #[test]
    fn built_ins_resolve_by_name() {
        for name in Palette::list_names() {
            assert!(Palette::from_name(name).is_ok(), "{name} should resolve");
        }
        assert!(Palette::from_name("plaid").is_err());
    }

    #[test]
    fn colors_from_params_override_only_given_keys() {
        let colors =
            CellColors::from_params(&serde_json::json!({"colors": {"alive": "#ff0000"}})).unwrap();
        assert_eq!(colors.alive, Srgb::new(1.0, 0.0, 0.0));
        assert_eq!(colors.background, CellColors::default().background);
        assert_eq!(
            CellColors::from_params(&serde_json::json!({})).unwrap(),
            CellColors::default()
        );
    }

    #[test]
    fn colors_from_params_rejects_bad_entries() {
        for bad in [
            serde_json::json!({"colors": {"alive": "#ff00"}}),
            serde_json::json!({"colors": {"glow": "#ffffff"}}),
            serde_json::json!({"colors": "red"}),
        ] {
            assert!(matches!(
                CellColors::from_params(&bad),
                Err(EngineError::InvalidColor(_))
            ));
        }
    }

    #[test]
    fn colors_serialize_as_hex() {
        let v = serde_json::to_value(CellColors::default()).unwrap();
        assert_eq!(v["background"], Srgb::new(0.04, 0.04, 0.06).to_hex());
        let back: CellColors = serde_json::from_value(v).unwrap();
        assert_eq!(back.alive.to_hex(), CellColors::default().alive.to_hex());
    }

    #[test]
    fn cell_color_fades_to_background() {
        let colors = CellColors::default();
        assert_eq!(colors.cell(1.0), colors.alive);
        assert_eq!(colors.cell(0.0), colors.background);
    }
}
