//! XAR format configuration.

use crate::common::color::SpotFallback;
use crate::common::config::FormatConfig;

/// Persisted XAR settings.
#[derive(Debug, Clone)]
pub struct XarConfig {
    /// Wrap the stream body in a compressed region on save.
    pub save_compressed: bool,
    /// Alternate representation used for spot colors on save. XAR stores RGB
    /// channels, so the RGB alternate is the default here.
    pub spot_fallback: SpotFallback,
}

impl Default for XarConfig {
    fn default() -> Self {
        XarConfig {
            save_compressed: true,
            spot_fallback: SpotFallback::Rgb,
        }
    }
}

impl FormatConfig for XarConfig {
    fn set_option(&mut self, key: &str, value: &str) {
        match key {
            "save_compressed" => self.save_compressed = value == "1" || value == "true",
            "spot_fallback" => {
                self.spot_fallback = match value {
                    "cmyk" => SpotFallback::Cmyk,
                    _ => SpotFallback::Rgb,
                }
            }
            _ => {}
        }
    }

    fn options(&self) -> Vec<(String, String)> {
        vec![
            (
                "save_compressed".to_string(),
                (self.save_compressed as u8).to_string(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = XarConfig::default();
        assert!(cfg.save_compressed);
        assert_eq!(cfg.spot_fallback, SpotFallback::Rgb);
    }
}
