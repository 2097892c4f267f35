//! Device capability classification and environment validation.
//!
//! Hardware decoder reliability varies per device; the resolver in the
//! playback crate consumes a single classification supplied by an injected
//! [`DeviceProfile`]. Two implementations ship with the crate: a constant
//! answer for hosts that know their hardware, and a rule-driven table lookup
//! for hosts that maintain a device database.

use serde::{Deserialize, Serialize};

/// How well the device's hardware decoders are known to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecoderSupport {
    /// No hardware decoder works on this device.
    None,
    /// The device is not in any database; reliability unknown.
    Unknown,
    /// Only the OMX decoder path is known to work.
    Omx,
    /// Only the MediaCodec decoder path is known to work.
    MediaCodec,
    /// Every hardware decoder path works.
    All,
}

/// Source of the device-capability classification.
///
/// The classification is immutable for the life of a session; callers query
/// it once at session init and cache the result.
pub trait DeviceProfile: Send + Sync {
    fn decoder_support(&self) -> DecoderSupport;
}

/// Profile with a constant, host-supplied classification.
#[derive(Debug, Clone, Copy)]
pub struct FixedProfile(pub DecoderSupport);

impl DeviceProfile for FixedProfile {
    fn decoder_support(&self) -> DecoderSupport {
        self.0
    }
}

/// One row of a device database: matches on vendor and an optional model
/// prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRule {
    pub vendor: String,
    /// Model prefix to match, or `None` to match every model of the vendor.
    pub model_prefix: Option<String>,
    pub support: DecoderSupport,
}

impl ProfileRule {
    pub fn new(
        vendor: impl Into<String>,
        model_prefix: Option<&str>,
        support: DecoderSupport,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            model_prefix: model_prefix.map(str::to_owned),
            support,
        }
    }

    fn matches(&self, vendor: &str, model: &str) -> bool {
        if !self.vendor.eq_ignore_ascii_case(vendor) {
            return false;
        }
        match &self.model_prefix {
            Some(prefix) => model.to_ascii_lowercase().starts_with(&prefix.to_ascii_lowercase()),
            None => true,
        }
    }
}

/// Table-driven profile: first matching rule wins, unmatched devices are
/// conservatively [`DecoderSupport::Unknown`].
pub struct ProfileTable {
    rules: Vec<ProfileRule>,
    vendor: String,
    model: String,
}

impl ProfileTable {
    pub fn new(rules: Vec<ProfileRule>, vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            rules,
            vendor: vendor.into(),
            model: model.into(),
        }
    }
}

impl DeviceProfile for ProfileTable {
    fn decoder_support(&self) -> DecoderSupport {
        self.rules
            .iter()
            .find(|rule| rule.matches(&self.vendor, &self.model))
            .map(|rule| rule.support)
            .unwrap_or(DecoderSupport::Unknown)
    }
}

/// Pre-flight environment validation run before the native engine is loaded.
///
/// A failed check aborts session startup with a fatal error; it is never
/// silently downgraded.
pub trait EnvironmentProbe: Send + Sync {
    /// Returns `Err` with a human-readable reason when the environment cannot
    /// run the native engine (e.g. missing CPU features).
    fn verify(&self) -> std::result::Result<(), String>;
}

/// Probe that accepts every environment. Default when the host injects none.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysCompatible;

impl EnvironmentProbe for AlwaysCompatible {
    fn verify(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_profile_returns_constant() {
        assert_eq!(
            FixedProfile(DecoderSupport::MediaCodec).decoder_support(),
            DecoderSupport::MediaCodec
        );
    }

    #[test]
    fn profile_table_first_match_wins() {
        let table = ProfileTable::new(
            vec![
                ProfileRule::new("acme", Some("tab"), DecoderSupport::Omx),
                ProfileRule::new("acme", None, DecoderSupport::All),
            ],
            "Acme",
            "Tablet-9",
        );
        assert_eq!(table.decoder_support(), DecoderSupport::Omx);
    }

    #[test]
    fn profile_table_vendor_wide_rule() {
        let table = ProfileTable::new(
            vec![ProfileRule::new("acme", None, DecoderSupport::All)],
            "ACME",
            "Phone-1",
        );
        assert_eq!(table.decoder_support(), DecoderSupport::All);
    }

    #[test]
    fn profile_table_defaults_to_unknown() {
        let table = ProfileTable::new(
            vec![ProfileRule::new("acme", None, DecoderSupport::All)],
            "other",
            "Phone-1",
        );
        assert_eq!(table.decoder_support(), DecoderSupport::Unknown);
    }

    #[test]
    fn always_compatible_verifies() {
        assert!(AlwaysCompatible.verify().is_ok());
    }
}
