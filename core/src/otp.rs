//! OTP challenge manager — issues short numeric confirmation codes and
//! enforces a bounded validity window.
//!
//! Expiry is not an error, it is a terminal state: once the window closes
//! the caller must restart the session and request a new challenge. No
//! retry of the same code is permitted after expiry.

use crate::{clock::Clock, config::OtpConfig, types::TimestampMs};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Challenge {
    pub code: String,
    pub issued_at_ms: TimestampMs,
    pub ttl_seconds: u64,
}

impl Challenge {
    pub fn deadline_ms(&self) -> TimestampMs {
        self.issued_at_ms + self.ttl_seconds as i64 * 1000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
    Expired,
}

pub struct OtpManager {
    config: OtpConfig,
    clock: Arc<dyn Clock>,
    codes: Pcg64Mcg,
}

impl OtpManager {
    pub fn new(config: OtpConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            codes: Pcg64Mcg::from_entropy(),
        }
    }

    /// Deterministic code stream for tests.
    pub fn with_seed(config: OtpConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            config,
            clock,
            codes: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Generate a fresh challenge and start its window. Configured lengths
    /// outside 4..=9 digits are clamped to the nearest bound.
    pub fn issue(&mut self) -> Challenge {
        let digits = self.config.code_length.clamp(4, 9);
        let span = 10u64.pow(digits as u32);
        let n = self.codes.gen_range(0..span);
        Challenge {
            code: format!("{n:0digits$}"),
            issued_at_ms: self.clock.now_ms(),
            ttl_seconds: self.config.ttl_seconds,
        }
    }

    /// Monotonically decreasing; reaches 0 exactly at expiry.
    pub fn remaining_seconds(&self, challenge: &Challenge) -> u64 {
        let left_ms = challenge.deadline_ms() - self.clock.now_ms();
        if left_ms <= 0 {
            0
        } else {
            (left_ms as u64).div_ceil(1000)
        }
    }

    /// Ties resolve to expired: a code is dead the instant its window closes.
    pub fn is_expired(&self, challenge: &Challenge) -> bool {
        self.clock.now_ms() >= challenge.deadline_ms()
    }

    /// Expired takes precedence over code comparison — an expired challenge
    /// fails verification even with the correct code.
    pub fn verify(&self, challenge: &Challenge, entered: &str) -> Verification {
        if self.is_expired(challenge) {
            return Verification::Expired;
        }
        if !entered.is_empty() && entered == challenge.code {
            Verification::Valid
        } else {
            Verification::Invalid
        }
    }
}
