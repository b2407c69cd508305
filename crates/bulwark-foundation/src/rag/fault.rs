//! Simulated latency and failure for stand-in capability tiers.
//!
//! Real backing calls fail on their own; the simulated tiers use a
//! [`FaultInjector`] to behave like a degraded service.

use bulwark_kernel::utils::duration_secs;
use bulwark_kernel::{CapabilityError, CapabilityResult, ComponentType};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure probability and latency bounds of a simulated tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultProfile {
    /// Probability in [0, 1] that a call fails
    pub failure_rate: f64,
    /// Lower bound of the simulated call latency
    #[serde(with = "duration_secs")]
    pub min_latency: Duration,
    /// Upper bound of the simulated call latency
    #[serde(with = "duration_secs")]
    pub max_latency: Duration,
}

impl Default for FaultProfile {
    fn default() -> Self {
        Self::reliable()
    }
}

impl FaultProfile {
    /// Never fails, no latency
    pub const fn reliable() -> Self {
        Self {
            failure_rate: 0.0,
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
        }
    }

    /// Fails with the given probability, no latency
    pub fn failing(failure_rate: f64) -> Self {
        Self {
            failure_rate,
            ..Self::reliable()
        }
    }

    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.min_latency = min;
        self.max_latency = max;
        self
    }

    /// Reject a failure rate outside [0, 1] or inverted latency bounds.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(format!(
                "failure_rate must be in [0, 1], got {}",
                self.failure_rate
            ));
        }
        if self.min_latency > self.max_latency {
            return Err(format!(
                "min_latency {:?} exceeds max_latency {:?}",
                self.min_latency, self.max_latency
            ));
        }
        Ok(())
    }
}

/// Draws latency and failure outcomes from a [`FaultProfile`]
#[derive(Debug)]
pub struct FaultInjector {
    profile: FaultProfile,
    rng: Mutex<StdRng>,
}

impl FaultInjector {
    /// Injector seeded from OS entropy
    pub fn new(profile: FaultProfile) -> Self {
        Self {
            profile,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Injector with a reproducible outcome sequence
    pub fn seeded(profile: FaultProfile, seed: u64) -> Self {
        Self {
            profile,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Injector that never fails or sleeps
    pub fn reliable() -> Self {
        Self::new(FaultProfile::reliable())
    }

    pub fn profile(&self) -> &FaultProfile {
        &self.profile
    }

    /// Sleep for a sampled latency, then fail with the profile's probability.
    pub async fn inject(&self, component: ComponentType, tier: &str) -> CapabilityResult<()> {
        let (latency, fails) = {
            let mut rng = self.rng.lock();
            let FaultProfile {
                failure_rate,
                min_latency,
                max_latency,
            } = self.profile;
            let latency = if max_latency > min_latency {
                rng.gen_range(min_latency..=max_latency)
            } else {
                min_latency
            };
            let failure_rate = if failure_rate.is_nan() {
                0.0
            } else {
                failure_rate.clamp(0.0, 1.0)
            };
            (latency, rng.gen_bool(failure_rate))
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if fails {
            Err(CapabilityError::unavailable(
                component,
                format!("{tier} simulated failure"),
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::reliable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reliable_never_fails() {
        let injector = FaultInjector::reliable();
        for _ in 0..100 {
            assert!(injector.inject(ComponentType::Embedder, "t").await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_always_failing() {
        let injector = FaultInjector::new(FaultProfile::failing(1.0));
        let err = injector
            .inject(ComponentType::Retriever, "primary")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::RetrievalUnavailable("primary simulated failure".into())
        );
    }

    #[tokio::test]
    async fn test_out_of_range_rate_is_clamped() {
        let injector = FaultInjector::new(FaultProfile::failing(7.0));
        assert!(injector.inject(ComponentType::Generator, "g").await.is_err());
        let injector = FaultInjector::new(FaultProfile::failing(-1.0));
        assert!(injector.inject(ComponentType::Generator, "g").await.is_ok());
    }

    #[tokio::test]
    async fn test_seeded_injectors_agree() {
        let a = FaultInjector::seeded(FaultProfile::failing(0.5), 42);
        let b = FaultInjector::seeded(FaultProfile::failing(0.5), 42);
        for _ in 0..50 {
            let ra = a.inject(ComponentType::Embedder, "x").await.is_ok();
            let rb = b.inject(ComponentType::Embedder, "x").await.is_ok();
            assert_eq!(ra, rb);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_within_bounds() {
        let injector = FaultInjector::seeded(
            FaultProfile::reliable()
                .with_latency(Duration::from_millis(20), Duration::from_millis(40)),
            7,
        );
        let started = tokio::time::Instant::now();
        injector.inject(ComponentType::Embedder, "x").await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(20));
        assert!(elapsed <= Duration::from_millis(41));
    }

    #[tokio::test]
    async fn test_nan_rate_never_fails() {
        let injector = FaultInjector::seeded(FaultProfile::failing(f64::NAN), 3);
        for _ in 0..20 {
            assert!(injector.inject(ComponentType::Embedder, "x").await.is_ok());
        }
    }

    #[test]
    fn test_validate_profile() {
        assert_eq!(FaultProfile::failing(0.3).validate(), Ok(()));
        assert!(FaultProfile::failing(f64::NAN).validate().is_err());
        assert!(FaultProfile::failing(1.5).validate().is_err());

        let inverted = FaultProfile::reliable()
            .with_latency(Duration::from_millis(50), Duration::from_millis(10));
        assert!(inverted.validate().unwrap_err().contains("max_latency"));
    }
}
