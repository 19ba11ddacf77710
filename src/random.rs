//! Injectable randomness for the proactive roll and vibe checks.

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn roll(&self) -> f64;
}

/// Thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn roll(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Always returns the same draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn roll(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_unit_interval() {
        let source = ThreadRandom;
        for _ in 0..1000 {
            let draw = source.roll();
            assert!((0.0..1.0).contains(&draw));
        }
    }
}
