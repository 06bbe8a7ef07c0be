//! Java-compatible pseudo-random number generator.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{UNIX_EPOCH, SystemTime};
use std::num::Wrapping;

use glam::DVec3;


const MULTIPLIER: Wrapping<i64> = Wrapping(0x5DEECE66D);
const ADDEND: Wrapping<i64> = Wrapping(0xB);
const MASK: Wrapping<i64> = Wrapping((1 << 48) - 1);

const DOUBLE_DIV: f64 = (1u64 << 53) as f64;


#[inline]
fn initial_scramble(seed: i64) -> Wrapping<i64> {
    (Wrapping(seed) ^ MULTIPLIER) & MASK
}

/// Generate a new seed in the same way as `java.util.Random` (same constants).
pub fn gen_seed() -> i64 {
    static SEED: AtomicI64 = AtomicI64::new(8682522807148012);
    let mut current = SEED.load(Ordering::Relaxed);
    loop {
        let next = current.wrapping_mul(181783497276652981);
        match SEED.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => {
                // Nano time is not available as an integer, the duration since the unix
                // epoch is used instead.
                return match SystemTime::now().duration_since(UNIX_EPOCH) {
                    Ok(d) => next ^ (d.as_nanos() as i64),
                    Err(_) => next
                };
            }
            Err(old) => current = old
        }
    }
}


/// The world's random source, every randomized placement goes through it so that a 
/// seeded world replays identically.
#[derive(Debug, Clone)]
pub struct JavaRandom {
    seed: Wrapping<i64>
}

impl JavaRandom {

    #[inline]
    pub fn new(seed: i64) -> JavaRandom {
        JavaRandom { seed: initial_scramble(seed) }
    }

    #[inline]
    pub fn new_seeded() -> JavaRandom {
        Self::new(gen_seed())
    }

    #[inline]
    fn next(&mut self, bits: u8) -> i32 {
        self.seed = (self.seed * MULTIPLIER + ADDEND) & MASK;
        (self.seed.0 as u64 >> (48 - bits)) as i32
    }

    /// Get the next pseudo-random double-precision float in `0.0..1.0`.
    pub fn next_double(&mut self) -> f64 {
        let high = (self.next(26) as i64) << 27;
        let low = self.next(27) as i64;
        (high.wrapping_add(low) as f64) / DOUBLE_DIV
    }

    /// Get the next pseudo-random double-precision float vector, x, y and z in order.
    /// **This is not part of the standard Java class.**
    pub fn next_dvec3(&mut self) -> DVec3 {
        DVec3 {
            x: self.next_double(), 
            y: self.next_double(),
            z: self.next_double(),
        }
    }

}
