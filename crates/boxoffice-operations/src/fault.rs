use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use boxoffice_core::DomainError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// When an in-memory collaborator should simulate an outage.
///
/// In TOML the variant goes in a `mode` key:
///
/// ```toml
/// fault = { mode = "rate", probability = 0.25, seed = 7 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FaultPolicy {
    #[default]
    Never,
    Always,
    /// Fail each call independently with `probability`, clamped to `0.0..=1.0`.
    Rate {
        probability: f64,
        /// Fixed seed for reproducible runs; drawn from the OS otherwise.
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Fail only the `call`-th call (1-based).
    OnCall { call: u64 },
}

/// Applies a [`FaultPolicy`] to a stream of calls.
pub struct FaultInjector {
    policy: FaultPolicy,
    calls: AtomicU64,
    rng: Mutex<StdRng>,
}

impl FaultInjector {
    #[must_use]
    pub fn new(policy: FaultPolicy) -> Self {
        let rng = match policy {
            FaultPolicy::Rate {
                seed: Some(seed), ..
            } => StdRng::seed_from_u64(seed),
            _ => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            policy,
            calls: AtomicU64::new(0),
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn never() -> Self {
        Self::new(FaultPolicy::Never)
    }

    #[must_use]
    pub fn always() -> Self {
        Self::new(FaultPolicy::Always)
    }

    #[must_use]
    pub fn policy(&self) -> FaultPolicy {
        self.policy
    }

    /// Number of calls observed so far.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Count one call and decide whether it fails.
    pub fn should_fail(&self) -> bool {
        self.next_call().1
    }

    /// Count one call and turn an injected failure into a transient error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Transient` naming `service` when the policy
    /// decides this call fails.
    pub fn check(&self, service: &'static str) -> Result<(), DomainError> {
        let (call, fail) = self.next_call();
        if fail {
            debug!(service, call, "injecting fault");
            return Err(DomainError::transient(
                service,
                format!("injected fault on call {call}"),
            ));
        }
        Ok(())
    }

    fn next_call(&self) -> (u64, bool) {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail = match self.policy {
            FaultPolicy::Never => false,
            FaultPolicy::Always => true,
            FaultPolicy::Rate { probability, .. } => {
                let p = if probability.is_nan() {
                    0.0
                } else {
                    probability.clamp(0.0, 1.0)
                };
                self.rng
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .random_bool(p)
            }
            FaultPolicy::OnCall { call: target } => call == target,
        };
        (call, fail)
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::never()
    }
}

impl std::fmt::Debug for FaultInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultInjector")
            .field("policy", &self.policy)
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_core::ErrorKind;

    use super::*;

    #[test]
    fn never_and_always_are_constant() {
        let never = FaultInjector::never();
        let always = FaultInjector::always();

        for _ in 0..10 {
            assert!(!never.should_fail());
            assert!(always.should_fail());
        }
        assert_eq!(never.calls(), 10);
    }

    #[test]
    fn on_call_fails_only_the_selected_call() {
        let faults = FaultInjector::new(FaultPolicy::OnCall { call: 2 });

        let outcomes: Vec<bool> = (0..4).map(|_| faults.should_fail()).collect();

        assert_eq!(outcomes, vec![false, true, false, false]);
    }

    #[test]
    fn seeded_rate_is_reproducible() {
        let policy = FaultPolicy::Rate {
            probability: 0.5,
            seed: Some(42),
        };
        let a = FaultInjector::new(policy);
        let b = FaultInjector::new(policy);

        let first: Vec<bool> = (0..64).map(|_| a.should_fail()).collect();
        let second: Vec<bool> = (0..64).map(|_| b.should_fail()).collect();

        assert_eq!(first, second);
        assert!(first.iter().any(|f| *f));
        assert!(first.iter().any(|f| !*f));
    }

    #[test]
    fn out_of_range_probability_is_clamped() {
        let high = FaultInjector::new(FaultPolicy::Rate {
            probability: 5.0,
            seed: Some(1),
        });
        let low = FaultInjector::new(FaultPolicy::Rate {
            probability: -1.0,
            seed: Some(1),
        });
        let nan = FaultInjector::new(FaultPolicy::Rate {
            probability: f64::NAN,
            seed: Some(1),
        });

        assert!(high.should_fail());
        assert!(!low.should_fail());
        assert!(!nan.should_fail());
    }

    #[test]
    fn check_reports_transient_error_with_service_name() {
        let faults = FaultInjector::always();

        let err = faults.check("payment gateway").expect_err("always fails");

        assert_eq!(err.kind(), ErrorKind::Transient);
        assert!(err.to_string().contains("payment gateway"));
        assert!(err.to_string().contains("call 1"));
    }

    #[test]
    fn policy_deserializes_from_mode_table() -> anyhow::Result<()> {
        #[derive(Deserialize)]
        struct Section {
            fault: FaultPolicy,
        }

        let rate: Section = toml::from_str(
            r#"fault = { mode = "rate", probability = 0.25, seed = 7 }"#,
        )?;
        let on_call: Section = toml::from_str(r#"fault = { mode = "on_call", call = 3 }"#)?;
        let always: Section = toml::from_str(r#"fault = { mode = "always" }"#)?;

        assert_eq!(
            rate.fault,
            FaultPolicy::Rate {
                probability: 0.25,
                seed: Some(7)
            }
        );
        assert_eq!(on_call.fault, FaultPolicy::OnCall { call: 3 });
        assert_eq!(always.fault, FaultPolicy::Always);
        Ok(())
    }
}
