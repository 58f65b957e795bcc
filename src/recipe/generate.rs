//! Random recipe generation.
//!
//! Parameters are drawn up front, so a generated recipe replays exactly
//! (modulo `-noise` and the codec) without a throwaway buffer.

use crate::core::config::CookConfig;
use crate::operations::{Operation, Params};
use crate::recipe::Recipe;
use rand::Rng;

/// Pick one operation uniformly and draw its parameters.
pub fn random_step<R: Rng + ?Sized>(rng: &mut R, config: &CookConfig) -> Params {
    let op = Operation::ALL[rng.random_range(0..Operation::ALL.len())];
    op.random_params(rng, config)
}

/// A recipe of exactly `count` random steps.
pub fn generate_random<R: Rng + ?Sized>(count: usize, rng: &mut R, config: &CookConfig) -> Recipe {
    (0..count).map(|_| random_step(rng, config)).collect()
}

/// A short recipe (`config.light_steps`, 4 to 7 by default) for live use.
pub fn generate_light<R: Rng + ?Sized>(rng: &mut R, config: &CookConfig) -> Recipe {
    let count = rng.random_range(config.light_step_range());
    generate_random(count, rng, config)
}
