//! CMX format configuration.

use crate::common::color::SpotFallback;
use crate::common::config::FormatConfig;

/// Persisted CMX settings.
#[derive(Debug, Clone)]
pub struct CmxConfig {
    /// Scale from file coordinate units to document units.
    pub factor: f64,
    /// Write big-endian (RIFX) containers instead of RIFF.
    pub big_endian: bool,
    /// Alternate representation used for spot colors on save.
    pub spot_fallback: SpotFallback,
}

impl Default for CmxConfig {
    fn default() -> Self {
        CmxConfig {
            factor: 0.072,
            big_endian: false,
            spot_fallback: SpotFallback::Cmyk,
        }
    }
}

impl FormatConfig for CmxConfig {
    fn set_option(&mut self, key: &str, value: &str) {
        match key {
            "factor" => {
                if let Ok(v) = value.parse::<f64>() {
                    if v > 0.0 {
                        self.factor = v;
                    }
                }
            }
            "big_endian" => self.big_endian = value == "1" || value == "true",
            "spot_fallback" => {
                self.spot_fallback = match value {
                    "rgb" => SpotFallback::Rgb,
                    _ => SpotFallback::Cmyk,
                }
            }
            _ => {}
        }
    }

    fn options(&self) -> Vec<(String, String)> {
        vec![
            ("factor".to_string(), self.factor.to_string()),
            (
                "big_endian".to_string(),
                (self.big_endian as u8).to_string(),
            ),
            (
                "spot_fallback".to_string(),
                match self.spot_fallback {
                    SpotFallback::Cmyk => "cmyk".to_string(),
                    SpotFallback::Rgb => "rgb".to_string(),
                },
            ),
        ]
    }
}
