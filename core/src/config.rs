use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub otp: OtpConfig,
    /// Whether a transfer may name the same account on both sides.
    /// Left as an explicit policy knob pending a product decision;
    /// default deny, so a self-transfer is a validation error.
    pub allow_self_transfer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Seconds a challenge stays valid after issuance.
    pub ttl_seconds: u64,
    /// Digits in the generated code. Codes are issued with 4 to 9 digits;
    /// values outside that range are clamped at issue time.
    pub code_length: usize,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 20,
            code_length: 6,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            otp: OtpConfig::default(),
            allow_self_transfer: false,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {path}"))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing engine config from {path}"))?;
        Ok(config)
    }
}
