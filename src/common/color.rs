//! Color model and the narrow color-management interface.
//!
//! Every color in the engine is a `(colorspace, channel values)` pair with an
//! alpha and an optional name. The colorspace set is closed: translators
//! dispatch on it exhaustively instead of branching on loosely typed
//! identifiers. Spot colors carry both RGB and CMYK alternate channels so a
//! target format without spot support can fall back either way.
//!
//! Color management is consumed through the [`ColorManager`] trait only;
//! [`SimpleColorManager`] emulates a CMS transform with direct conversion
//! formulas and is good enough for interchange purposes.

use smallvec::{SmallVec, smallvec};

/// Closed set of colorspaces the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colorspace {
    Rgb,
    Cmyk,
    Gray,
    Lab,
    Spot,
}

impl Colorspace {
    /// Number of channel values for this space.
    ///
    /// Spot colors answer for their RGB alternate representation.
    pub fn channel_count(self) -> usize {
        match self {
            Colorspace::Rgb | Colorspace::Lab | Colorspace::Spot => 3,
            Colorspace::Cmyk => 4,
            Colorspace::Gray => 1,
        }
    }
}

/// Channel buffer; four slots cover every supported space without heap use.
pub type Channels = SmallVec<[f64; 4]>;

/// A device-independent color value.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    pub space: Colorspace,
    /// Channel values in 0.0..=1.0 (Lab uses the normalized uc-style range).
    /// For spot colors this holds the RGB alternate.
    pub channels: Channels,
    /// CMYK alternate channels, present for spot colors only.
    pub spot_cmyk: Option<[f64; 4]>,
    pub alpha: f64,
    /// Palette or spot-color name; empty for anonymous colors.
    pub name: String,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Color {
            space: Colorspace::Rgb,
            channels: smallvec![r, g, b],
            spot_cmyk: None,
            alpha: 1.0,
            name: String::new(),
        }
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Color {
            space: Colorspace::Cmyk,
            channels: smallvec![c, m, y, k],
            spot_cmyk: None,
            alpha: 1.0,
            name: String::new(),
        }
    }

    pub fn gray(l: f64) -> Self {
        Color {
            space: Colorspace::Gray,
            channels: smallvec![l],
            spot_cmyk: None,
            alpha: 1.0,
            name: String::new(),
        }
    }

    /// A named spot color with explicit RGB and CMYK alternates.
    pub fn spot(name: &str, rgb: [f64; 3], cmyk: [f64; 4]) -> Self {
        Color {
            space: Colorspace::Spot,
            channels: SmallVec::from_slice(&rgb),
            spot_cmyk: Some(cmyk),
            alpha: 1.0,
            name: name.to_string(),
        }
    }

    pub fn black() -> Self {
        Color::gray(0.0)
    }
}

/// Which alternate representation replaces a spot color when the target
/// format has no spot support. Kept as an explicit per-format configuration
/// option rather than a hardcoded default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpotFallback {
    #[default]
    Cmyk,
    Rgb,
}

/// The narrow interface through which the engine consumes color management.
pub trait ColorManager {
    /// Resolve any color to display RGB channels in 0.0..=1.0.
    fn resolve_rgb(&self, color: &Color) -> [f64; 3];

    /// Convert a color into the target colorspace.
    ///
    /// Spot colors are replaced by the alternate selected with `fallback`
    /// before conversion; converting into `Colorspace::Spot` is not a
    /// meaningful operation and yields the RGB resolution instead.
    fn convert(&self, color: &Color, target: Colorspace, fallback: SpotFallback) -> Color;
}

/// CMS-free color manager emulating a managed transform with direct formulas.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleColorManager;

impl ColorManager for SimpleColorManager {
    fn resolve_rgb(&self, color: &Color) -> [f64; 3] {
        match color.space {
            Colorspace::Rgb | Colorspace::Spot => {
                [color.channels[0], color.channels[1], color.channels[2]]
            }
            Colorspace::Cmyk => cmyk_to_rgb([
                color.channels[0],
                color.channels[1],
                color.channels[2],
                color.channels[3],
            ]),
            Colorspace::Gray => {
                let v = color.channels[0];
                [v, v, v]
            }
            Colorspace::Lab => {
                lab_to_rgb([color.channels[0], color.channels[1], color.channels[2]])
            }
        }
    }

    fn convert(&self, color: &Color, target: Colorspace, fallback: SpotFallback) -> Color {
        if color.space == target {
            return color.clone();
        }
        if color.space == Colorspace::Spot {
            let base = match fallback {
                SpotFallback::Cmyk => {
                    let cmyk = color.spot_cmyk.unwrap_or_else(|| {
                        rgb_to_cmyk([color.channels[0], color.channels[1], color.channels[2]])
                    });
                    Color {
                        name: color.name.clone(),
                        alpha: color.alpha,
                        ..Color::cmyk(cmyk[0], cmyk[1], cmyk[2], cmyk[3])
                    }
                }
                SpotFallback::Rgb => Color {
                    name: color.name.clone(),
                    alpha: color.alpha,
                    ..Color::rgb(color.channels[0], color.channels[1], color.channels[2])
                },
            };
            return self.convert(&base, target, fallback);
        }

        let rgb = self.resolve_rgb(color);
        let channels: Channels = match target {
            Colorspace::Rgb | Colorspace::Spot => SmallVec::from_slice(&rgb),
            Colorspace::Cmyk => {
                // Direct RGB->CMYK keeps pure primaries lossless both ways.
                SmallVec::from_slice(&rgb_to_cmyk(rgb))
            }
            Colorspace::Gray => smallvec![(rgb[0] + rgb[1] + rgb[2]) / 3.0],
            Colorspace::Lab => SmallVec::from_slice(&rgb_to_lab(rgb)),
        };
        Color {
            space: if target == Colorspace::Spot {
                Colorspace::Rgb
            } else {
                target
            },
            channels,
            spot_cmyk: None,
            alpha: color.alpha,
            name: color.name.clone(),
        }
    }
}

/// CMYK to RGB, component-wise with ink addition clamped at full coverage.
pub fn cmyk_to_rgb(cmyk: [f64; 4]) -> [f64; 3] {
    let [c, m, y, k] = cmyk;
    [
        1.0 - (c + k).min(1.0),
        1.0 - (m + k).min(1.0),
        1.0 - (y + k).min(1.0),
    ]
}

/// RGB to CMYK with full black extraction.
pub fn rgb_to_cmyk(rgb: [f64; 3]) -> [f64; 4] {
    let c = 1.0 - rgb[0];
    let m = 1.0 - rgb[1];
    let y = 1.0 - rgb[2];
    let k = c.min(m).min(y);
    [c - k, m - k, y - k, k]
}

fn linear_to_srgb(c: f64) -> f64 {
    if c > 0.0031308 {
        c.powf(1.0 / 2.4) * 1.055 - 0.055
    } else {
        c * 12.92
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c > 0.0031308 * 12.92 {
        (c / 1.055 + 0.055 / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn xyz_to_lab_f(c: f64) -> f64 {
    if c > 216.0 / 24389.0 {
        c.cbrt()
    } else {
        c * (841.0 / 108.0) + 4.0 / 29.0
    }
}

/// Normalized CIE-L*ab (all channels in 0..1) to sRGB.
pub fn lab_to_rgb(lab: [f64; 3]) -> [f64; 3] {
    let l = lab[0] * 100.0;
    let a = lab[1] * 255.0 - 128.0;
    let b = lab[2] * 255.0 - 128.0;

    let mut y = l / 116.0 + 16.0 / 116.0;
    let mut x = a / 500.0 + y;
    let mut z = -b / 200.0 + y;

    x = if x > 6.0 / 29.0 {
        x * x * x
    } else {
        x * (108.0 / 841.0) - 432.0 / 24389.0
    };
    y = if l > 8.0 {
        y * y * y
    } else {
        l * (27.0 / 24389.0)
    };
    z = if z > 6.0 / 29.0 {
        z * z * z
    } else {
        z * (108.0 / 841.0) - 432.0 / 24389.0
    };

    let r = x * (1219569.0 / 395920.0) + y * (-608687.0 / 395920.0) + z * (-107481.0 / 197960.0);
    let g = x * (-80960619.0 / 87888100.0)
        + y * (82435961.0 / 43944050.0)
        + z * (3976797.0 / 87888100.0);
    let bl = x * (93813.0 / 1774030.0) + y * (-180961.0 / 887015.0) + z * (107481.0 / 93370.0);

    [
        linear_to_srgb(r).clamp(0.0, 1.0),
        linear_to_srgb(g).clamp(0.0, 1.0),
        linear_to_srgb(bl).clamp(0.0, 1.0),
    ]
}

/// sRGB to normalized CIE-L*ab (all channels in 0..1).
pub fn rgb_to_lab(rgb: [f64; 3]) -> [f64; 3] {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    let x = xyz_to_lab_f(
        r * (10135552.0 / 23359437.0) + g * (8788810.0 / 23359437.0) + b * (4435075.0 / 23359437.0),
    );
    let y = xyz_to_lab_f(
        r * (871024.0 / 4096299.0) + g * (8788810.0 / 12288897.0) + b * (887015.0 / 12288897.0),
    );
    let z = xyz_to_lab_f(
        r * (158368.0 / 8920923.0) + g * (8788810.0 / 80288307.0) + b * (70074185.0 / 80288307.0),
    );

    [
        (y * 116.0 - 16.0) / 100.0,
        ((x - y) * 500.0 + 128.0) / 255.0,
        ((y - z) * 200.0 + 128.0) / 255.0,
    ]
}
