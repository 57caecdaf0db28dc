//! Per-format configuration persistence.
//!
//! Every Presenter owns exactly one config instance, populated at
//! construction from a `key = value` text file and written back on demand.
//! Unknown keys are ignored so newer files stay loadable by older builds;
//! missing keys keep their built-in defaults.

use std::fs;
use std::path::Path;

use crate::common::error::Result;

/// Persisted per-format settings.
///
/// Implementors provide defaults via `Default`, accept individual options in
/// [`set_option`](FormatConfig::set_option) and list the persisted state in
/// [`options`](FormatConfig::options); loading and saving are shared.
pub trait FormatConfig: Default {
    /// Apply one `key = value` pair. Unknown keys must be ignored silently;
    /// unparsable values keep the previous setting.
    fn set_option(&mut self, key: &str, value: &str);

    /// The full persisted state as `(key, value)` pairs.
    fn options(&self) -> Vec<(String, String)>;

    /// Populate this config from a `key = value` file.
    ///
    /// A missing file is not an error: defaults stay in place.
    fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let text = fs::read_to_string(path)?;
        for (key, value) in parse_key_values(&text) {
            self.set_option(key, value);
        }
        Ok(())
    }

    /// Write the current state back as a `key = value` file.
    fn save(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        for (key, value) in self.options() {
            out.push_str(&key);
            out.push_str(" = ");
            out.push_str(&value);
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }
}

/// Iterate `key = value` lines, skipping blanks and `#` comments.
pub fn parse_key_values(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct ProbeConfig {
        scale: f64,
        compressed: bool,
    }

    impl FormatConfig for ProbeConfig {
        fn set_option(&mut self, key: &str, value: &str) {
            match key {
                "scale" => {
                    if let Ok(v) = value.parse() {
                        self.scale = v;
                    }
                }
                "compressed" => self.compressed = value == "1" || value == "true",
                _ => {}
            }
        }

        fn options(&self) -> Vec<(String, String)> {
            vec![
                ("scale".to_string(), self.scale.to_string()),
                ("compressed".to_string(), (self.compressed as u8).to_string()),
            ]
        }
    }

    #[test]
    fn test_unknown_keys_ignored_missing_keys_default() {
        let mut cfg = ProbeConfig::default();
        for (k, v) in parse_key_values("# comment\nscale = 2.5\nno_such_key = 7\n") {
            cfg.set_option(k, v);
        }
        assert_eq!(cfg.scale, 2.5);
        assert!(!cfg.compressed); // untouched default
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.cfg");

        let mut cfg = ProbeConfig::default();
        cfg.scale = 0.072;
        cfg.compressed = true;
        cfg.save(&path).unwrap();

        let mut loaded = ProbeConfig::default();
        loaded.load(&path).unwrap();
        assert_eq!(loaded.scale, 0.072);
        assert!(loaded.compressed);
    }

    #[test]
    fn test_missing_file_keeps_defaults() {
        let mut cfg = ProbeConfig::default();
        cfg.load(Path::new("/nonexistent/probe.cfg")).unwrap();
        assert_eq!(cfg.scale, 0.0);
    }
}
