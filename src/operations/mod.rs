//! The fixed catalog of cooking operations.
//!
//! Dispatch is by [`Operation`] variant; the `-token` strings exist only as
//! the recipe serialization form. Parameter generation is split from pixel
//! mutation: [`Operation::random_params`] is a pure draw that yields a fully
//! resolved [`Params`], and [`Params::apply`] mutates a buffer. That lets a
//! recipe be generated without touching any pixels.

pub mod catalog;
mod color;
mod edge;
mod noise;
mod quality;
mod transform;

pub use catalog::{Category, OperationCatalog, OperationInfo, ParameterInfo};
pub use edge::LAPLACIAN_KERNEL;
pub use quality::{jpeg_quality, quality_fraction, JpegCodec, LossyCodec};
pub use transform::{letterbox, shrunk_size, LetterboxRect};

use crate::core::buffer::PixelBuffer;
use crate::core::config::CookConfig;
use crate::core::error::OperationResult;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// One named, catalog-fixed pixel transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Saturation stretch plus brightness swing.
    Modulate,
    /// Lossy re-encode round trip.
    Quality,
    /// Linear contrast around 128.
    Contrast,
    /// Nearest-neighbour shrink and blow back up.
    Resize,
    /// 3x3 Laplacian edge detector.
    Edge,
    /// Uniform per-pixel noise.
    Noise,
    /// Luminance min/max stretch.
    Normalize,
}

impl Operation {
    /// Every operation, in catalog order.
    pub const ALL: [Operation; 7] = [
        Operation::Modulate,
        Operation::Quality,
        Operation::Contrast,
        Operation::Resize,
        Operation::Edge,
        Operation::Noise,
        Operation::Normalize,
    ];

    /// Canonical recipe token.
    pub fn token(self) -> &'static str {
        match self {
            Operation::Modulate => "-modulate",
            Operation::Quality => "-quality",
            Operation::Contrast => "-contrast",
            Operation::Resize => "-resize",
            Operation::Edge => "-edge",
            Operation::Noise => "-noise",
            Operation::Normalize => "-normalize",
        }
    }

    /// Look up an operation by its recipe token. Case sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    /// Whether the operation reads a numeric parameter at all.
    pub fn takes_parameter(self) -> bool {
        !matches!(self, Operation::Edge | Operation::Normalize)
    }

    /// Legal domain for an explicit parameter; explicit values are clamped into it.
    pub fn parameter_domain(self) -> Option<RangeInclusive<i64>> {
        match self {
            Operation::Modulate => Some(0..=1000),
            Operation::Quality => Some(1..=100),
            Operation::Contrast => Some(-255..=255),
            Operation::Resize => Some(1..=100),
            Operation::Noise => Some(0..=255),
            Operation::Edge | Operation::Normalize => None,
        }
    }

    /// Range a random draw lands in at full strength.
    ///
    /// `-noise` reports the configured amount as a single-value range.
    pub fn random_range(self, config: &CookConfig) -> Option<RangeInclusive<i64>> {
        match self {
            Operation::Modulate => Some(100..=500),
            Operation::Quality => Some(1..=100),
            Operation::Contrast => Some(10..=200),
            Operation::Resize => Some(5..=95),
            Operation::Noise => Some(config.noise_amount..=config.noise_amount),
            Operation::Edge | Operation::Normalize => None,
        }
    }

    /// Draw a full parameter set from `rng`, scaled by `config.strength`.
    pub fn random_params<R: Rng + ?Sized>(self, rng: &mut R, config: &CookConfig) -> Params {
        let strength = config.strength;
        match self {
            Operation::Modulate => {
                let factor = rng.random_range(100..=500) as f64;
                let brightness = rng.random_range(-50..=80) as f64;
                Params::Modulate {
                    factor: ((factor - 100.0) * strength + 100.0).round() as i64,
                    brightness: (brightness * strength).round() as i64,
                }
            }
            Operation::Quality => {
                let r = rng.random_range(1..=100) as f64;
                Params::Quality {
                    factor: ((101.0 - r * strength).round() as i64).clamp(1, 100),
                }
            }
            Operation::Contrast => {
                let value = rng.random_range(10..=200) as f64;
                Params::Contrast {
                    value: (value * strength).round() as i64,
                }
            }
            Operation::Resize => {
                let percent = rng.random_range(5..=95) as f64;
                Params::Resize {
                    percent: (100.0 - (100.0 - percent) * strength).round() as i64,
                }
            }
            Operation::Edge => Params::Edge,
            Operation::Noise => Params::Noise {
                amount: (config.noise_amount as f64 * strength).round() as i64,
            },
            Operation::Normalize => Params::Normalize,
        }
    }

    /// Resolve a recipe step's raw fields into parameters.
    ///
    /// A missing parameter falls back to [`random_params`](Self::random_params).
    /// `offset` is only read by `-modulate` (brightness) and defaults to 0 when
    /// the factor is explicit.
    pub fn resolve<R: Rng + ?Sized>(
        self,
        parameter: Option<i64>,
        offset: Option<i64>,
        rng: &mut R,
        config: &CookConfig,
    ) -> Params {
        let Some(value) = parameter.filter(|_| self.takes_parameter()) else {
            return self.random_params(rng, config);
        };
        let value = match self.parameter_domain() {
            Some(domain) => value.clamp(*domain.start(), *domain.end()),
            None => value,
        };
        match self {
            Operation::Modulate => Params::Modulate {
                factor: value,
                brightness: offset.unwrap_or(0).clamp(-255, 255),
            },
            Operation::Quality => Params::Quality { factor: value },
            Operation::Contrast => Params::Contrast { value },
            Operation::Resize => Params::Resize { percent: value },
            Operation::Noise => Params::Noise { amount: value },
            Operation::Edge => Params::Edge,
            Operation::Normalize => Params::Normalize,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// An operation with every parameter decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Params {
    Modulate { factor: i64, brightness: i64 },
    Quality { factor: i64 },
    Contrast { value: i64 },
    Resize { percent: i64 },
    Edge,
    Noise { amount: i64 },
    Normalize,
}

impl Params {
    /// The operation these parameters belong to.
    pub fn operation(&self) -> Operation {
        match self {
            Params::Modulate { .. } => Operation::Modulate,
            Params::Quality { .. } => Operation::Quality,
            Params::Contrast { .. } => Operation::Contrast,
            Params::Resize { .. } => Operation::Resize,
            Params::Edge => Operation::Edge,
            Params::Noise { .. } => Operation::Noise,
            Params::Normalize => Operation::Normalize,
        }
    }

    /// Primary recipe parameter.
    pub fn parameter(&self) -> Option<i64> {
        match *self {
            Params::Modulate { factor, .. } => Some(factor),
            Params::Quality { factor } => Some(factor),
            Params::Contrast { value } => Some(value),
            Params::Resize { percent } => Some(percent),
            Params::Noise { amount } => Some(amount),
            Params::Edge | Params::Normalize => None,
        }
    }

    /// Secondary recipe field (`-modulate` brightness offset).
    pub fn offset(&self) -> Option<i64> {
        match *self {
            Params::Modulate { brightness, .. } => Some(brightness),
            _ => None,
        }
    }

    /// Canonical token with effective parameters, e.g. `-modulate 240 -12`.
    pub fn token(&self) -> String {
        self.to_string()
    }

    /// Mutate `buffer` in place.
    ///
    /// `rng` is only consumed by `-noise`; `codec` only by `-quality`.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        buffer: &mut PixelBuffer,
        rng: &mut R,
        codec: &dyn LossyCodec,
    ) -> OperationResult<()> {
        match *self {
            Params::Modulate { factor, brightness } => color::modulate(buffer, factor, brightness),
            Params::Quality { factor } => quality::quality(buffer, factor, codec)?,
            Params::Contrast { value } => color::contrast(buffer, value),
            Params::Resize { percent } => transform::resize(buffer, percent)?,
            Params::Edge => edge::edge(buffer),
            Params::Noise { amount } => noise::noise(buffer, amount, rng),
            Params::Normalize => color::normalize(buffer),
        }
        Ok(())
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation().token())?;
        if let Some(parameter) = self.parameter() {
            write!(f, " {parameter}")?;
        }
        if let Some(offset) = self.offset() {
            write!(f, " {offset}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Codec that returns the buffer unchanged.
    struct IdentityCodec;

    impl LossyCodec for IdentityCodec {
        fn round_trip(&self, buffer: &PixelBuffer, _quality: f64) -> OperationResult<PixelBuffer> {
            Ok(buffer.clone())
        }
    }

    fn gray(width: u32, height: u32, value: u8) -> PixelBuffer {
        PixelBuffer::filled(width, height, [value, value, value, 255]).unwrap()
    }

    #[test]
    fn test_token_lookup_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_token(op.token()), Some(op));
        }
        assert_eq!(Operation::from_token("-blur"), None);
        assert_eq!(Operation::from_token("modulate"), None);
    }

    #[test]
    fn test_modulate_identity_on_gray() {
        let mut buffer = gray(10, 10, 128);
        let before = buffer.clone();
        let mut rng = StdRng::seed_from_u64(1);
        let params = Operation::Modulate.resolve(Some(100), None, &mut rng, &CookConfig::default());
        assert_eq!(params, Params::Modulate { factor: 100, brightness: 0 });
        params.apply(&mut buffer, &mut rng, &IdentityCodec).unwrap();
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_contrast_keeps_midpoint() {
        let mut buffer = gray(4, 4, 128);
        let mut rng = StdRng::seed_from_u64(2);
        Params::Contrast { value: 10 }
            .apply(&mut buffer, &mut rng, &IdentityCodec)
            .unwrap();
        assert_eq!(buffer.get_pixel(2, 2).unwrap(), [128, 128, 128, 255]);
    }

    #[test]
    fn test_explicit_parameters_are_clamped() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = CookConfig::default();
        assert_eq!(
            Operation::Contrast.resolve(Some(900), None, &mut rng, &config),
            Params::Contrast { value: 255 }
        );
        assert_eq!(
            Operation::Resize.resolve(Some(0), None, &mut rng, &config),
            Params::Resize { percent: 1 }
        );
        assert_eq!(
            Operation::Edge.resolve(Some(1), None, &mut rng, &config),
            Params::Edge
        );
    }

    #[test]
    fn test_random_params_within_declared_ranges() {
        let config = CookConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..500 {
            for op in Operation::ALL {
                let params = op.random_params(&mut rng, &config);
                assert_eq!(params.operation(), op);
                if let (Some(range), Some(value)) = (op.random_range(&config), params.parameter()) {
                    assert!(range.contains(&value), "{op} drew {value}");
                }
                if let Params::Modulate { brightness, .. } = params {
                    assert!((-50..=80).contains(&brightness));
                }
            }
        }
    }

    #[test]
    fn test_zero_strength_draws_identity_parameters() {
        let config = CookConfig::default().with_strength(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            Operation::Modulate.random_params(&mut rng, &config),
            Params::Modulate { factor: 100, brightness: 0 }
        );
        assert_eq!(
            Operation::Resize.random_params(&mut rng, &config),
            Params::Resize { percent: 100 }
        );
        assert_eq!(
            Operation::Noise.random_params(&mut rng, &config),
            Params::Noise { amount: 0 }
        );
        assert_eq!(
            Operation::Quality.random_params(&mut rng, &config),
            Params::Quality { factor: 100 }
        );
    }

    #[test]
    fn test_canonical_tokens() {
        assert_eq!(Params::Modulate { factor: 240, brightness: -12 }.token(), "-modulate 240 -12");
        assert_eq!(Params::Resize { percent: 50 }.token(), "-resize 50");
        assert_eq!(Params::Edge.token(), "-edge");
        assert_eq!(Params::Normalize.to_string(), "-normalize");
    }

    fn any_buffer() -> impl Strategy<Value = PixelBuffer> {
        (1u32..12, 1u32..12).prop_flat_map(|(w, h)| {
            prop::collection::vec(any::<u8>(), (w * h * 4) as usize)
                .prop_map(move |raw| PixelBuffer::from_raw(w, h, raw).unwrap())
        })
    }

    fn any_params() -> impl Strategy<Value = Params> {
        prop_oneof![
            (0i64..=1000, -255i64..=255)
                .prop_map(|(factor, brightness)| Params::Modulate { factor, brightness }),
            (1i64..=100).prop_map(|factor| Params::Quality { factor }),
            (-255i64..=255).prop_map(|value| Params::Contrast { value }),
            (1i64..=100).prop_map(|percent| Params::Resize { percent }),
            Just(Params::Edge),
            (0i64..=255).prop_map(|amount| Params::Noise { amount }),
            Just(Params::Normalize),
        ]
    }

    proptest! {
        #[test]
        fn prop_operations_keep_shape_and_alpha(buffer in any_buffer(), params in any_params(), seed in any::<u64>()) {
            let mut cooked = buffer.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            params.apply(&mut cooked, &mut rng, &IdentityCodec).unwrap();
            prop_assert_eq!(cooked.dimensions(), buffer.dimensions());
            prop_assert_eq!(cooked.as_raw().len(), buffer.as_raw().len());
            // Resize resamples whole pixels, alpha included; everything else leaves alpha alone.
            if params.operation() != Operation::Resize {
                for (a, b) in cooked.as_raw().chunks_exact(4).zip(buffer.as_raw().chunks_exact(4)) {
                    prop_assert_eq!(a[3], b[3]);
                }
            }
        }
    }
}
