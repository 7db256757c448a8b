//! Random stream bundle and sampling helpers.
//!
//! Every consumer of randomness draws from its own stream so that, for an
//! injected seed, adding a draw in one subsystem does not shift the rolls
//! of another. Without a seed the bundle is seeded from OS entropy.
use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use sha2::Sha256;

/// Independent RNG streams for one expedition.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    map: CountingRng<SmallRng>,
    encounter: CountingRng<SmallRng>,
    salvage: CountingRng<SmallRng>,
    failure: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            map: CountingRng::new(derive_stream_seed(seed, b"map")),
            encounter: CountingRng::new(derive_stream_seed(seed, b"encounter")),
            salvage: CountingRng::new(derive_stream_seed(seed, b"salvage")),
            failure: CountingRng::new(derive_stream_seed(seed, b"failure")),
        }
    }

    /// Free-running bundle seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_user_seed(rand::random())
    }

    /// Seed the streams were derived from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Stream used for map generation.
    pub const fn map(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.map
    }

    /// Stream used for sampling salvage options.
    pub const fn encounter(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.encounter
    }

    /// Stream used for salvage and scrap success rolls.
    pub const fn salvage(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.salvage
    }

    /// Stream used for picking failure variants.
    pub const fn failure(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.failure
    }

    /// Total draws across every stream.
    #[must_use]
    pub const fn total_draws(&self) -> u64 {
        self.map
            .draws()
            .saturating_add(self.encounter.draws())
            .saturating_add(self.salvage.draws())
            .saturating_add(self.failure.draws())
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Uniform roll in `[0, 1)`.
pub fn roll_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.r#gen::<f64>()
}

/// Sample up to `count` distinct entries from `pool` without replacement.
///
/// Returns fewer than `count` entries when the pool is smaller. The order of
/// the result follows the draw order.
pub fn pick_some<T: Clone, R: Rng + ?Sized>(pool: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let amount = count.min(pool.len());
    if amount == 0 {
        return Vec::new();
    }
    rand::seq::index::sample(rng, pool.len(), amount)
        .into_iter()
        .filter_map(|idx| pool.get(idx).cloned())
        .collect()
}
