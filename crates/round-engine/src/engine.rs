//! Target selection and guess grading

use crate::{Country, GameError, GuessResult, Region, Result};
use geo_math::{bearing_degrees, distance_km, to_compass};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// One game's candidate pool and hidden target
///
/// The target is stored as an index into the pool, so it is always a pool
/// member. A failed round start leaves the previous round untouched.
#[derive(Debug)]
pub struct RoundEngine<R = StdRng> {
    rng: R,
    pool: Vec<Country>,
    target: Option<usize>,
    region: Option<Region>,
}

impl RoundEngine<StdRng> {
    /// Engine seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible target sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RoundEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RoundEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            pool: Vec::new(),
            target: None,
            region: None,
        }
    }

    /// Filter the pool by region and pick a uniformly random target
    pub fn start_round(&mut self, countries: &[Country], region: &Region) -> Result<&Country> {
        let pool: Vec<Country> = countries
            .iter()
            .filter(|c| region.matches(c))
            .cloned()
            .collect();

        if pool.is_empty() {
            warn!("Region {} has no countries ({} in dataset)", region, countries.len());
            return Err(GameError::EmptyPool(region.clone()));
        }

        let index = self.rng.gen_range(0..pool.len());
        self.pool = pool;
        self.target = Some(index);
        self.region = Some(region.clone());

        info!("Round started: region={}, pool={}", region, self.pool.len());
        let target = &self.pool[index];
        debug!("Target (for debugging): {}", target.name);

        Ok(target)
    }

    /// Grade a guess by exact, case-sensitive name
    ///
    /// Names outside the current pool yield `Ok(None)`.
    pub fn evaluate(&self, guess_name: &str) -> Result<Option<GuessResult>> {
        let target = self.target().ok_or(GameError::NoActiveRound)?;

        let Some(guess) = self.pool.iter().find(|c| c.name == guess_name) else {
            debug!("Ignoring unrecognized guess {:?}", guess_name);
            return Ok(None);
        };

        if guess.name == target.name {
            debug!("Correct guess: {}", target.name);
            return Ok(Some(GuessResult::Correct {
                name: target.name.clone(),
            }));
        }

        let result = GuessResult::Incomplete {
            name: guess.name.clone(),
            continent_match: guess.continent == target.continent,
            distance_km: distance_km(guess.point(), target.point()),
            direction: to_compass(bearing_degrees(guess.point(), target.point())),
        };
        debug!("Graded guess {}: {:?}", guess.name, result);

        Ok(Some(result))
    }

    pub fn target(&self) -> Option<&Country> {
        self.target.map(|i| &self.pool[i])
    }

    pub fn pool(&self) -> &[Country] {
        &self.pool
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    /// Autocomplete list, in pool order
    pub fn candidate_names(&self) -> Vec<&str> {
        self.pool.iter().map(|c| c.name.as_str()).collect()
    }
}
