//! # Playback Option Builder
//!
//! Combines the hardware policy with latency-compensation tuning into the
//! ordered option directive list passed to the native engine.
//!
//! The engine applies directives positionally on some paths, so the output
//! order is part of the contract: caching directives come before the codec
//! directive. The builder always returns a fresh list and never mutates the
//! settings it reads.

use crate::config::PlayerSettings;
use crate::hardware::{dev_codec_list, HwAcceleration, HwPolicy};
use tracing::trace;

/// Per-request suppression flags, usually sourced from a media list entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionFlags {
    /// Suppress the hardware decoding path for this request.
    pub no_hardware_acceleration: bool,
    /// Suppress the video track for this request.
    pub no_video: bool,
}

/// Build the option directive list for one play request.
///
/// A configured dev decoder override forces the full hardware path and
/// keeps video, regardless of the suppression flags. Otherwise suppression
/// is also implied by a disabled effective mode.
pub fn media_options(
    settings: &PlayerSettings,
    policy: &HwPolicy,
    flags: OptionFlags,
) -> Vec<String> {
    let dev_list = dev_codec_list(settings.dev_decoder);

    let mut no_hardware_acceleration = flags.no_hardware_acceleration;
    let mut no_video = flags.no_video;
    if dev_list.is_some() {
        no_hardware_acceleration = false;
        no_video = false;
    } else if !no_hardware_acceleration {
        no_hardware_acceleration = policy.effective == HwAcceleration::Disabled;
    }

    let mut options = Vec::new();

    if !no_hardware_acceleration {
        // Hardware decoders can need substantial preroll before they emit
        // the first frame; without the elevated caching the playback clock
        // starts too early and every decoded frame arrives late.
        options.push(format!(":file-caching={}", settings.hw_latency_caching_ms));
        options.push(format!(
            ":network-caching={}",
            settings.hw_latency_caching_ms
        ));
        let codec = dev_list.as_deref().unwrap_or(&policy.codec_list);
        options.push(format!(":codec={}", codec));
    }

    if no_video {
        options.push(":no-video".to_string());
    }

    trace!(?options, "Built media options");
    options
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::DevDecoder;

    fn enabled_policy() -> HwPolicy {
        HwPolicy {
            effective: HwAcceleration::Full,
            codec_list: "mediacodec,all".to_string(),
        }
    }

    fn disabled_policy() -> HwPolicy {
        HwPolicy {
            effective: HwAcceleration::Disabled,
            codec_list: "all".to_string(),
        }
    }

    #[test]
    fn caching_precedes_codec() {
        let options = media_options(
            &PlayerSettings::default(),
            &enabled_policy(),
            OptionFlags::default(),
        );
        assert_eq!(
            options,
            vec![
                ":file-caching=1500".to_string(),
                ":network-caching=1500".to_string(),
                ":codec=mediacodec,all".to_string(),
            ]
        );
    }

    #[test]
    fn suppressed_hardware_emits_no_codec_directive() {
        let options = media_options(
            &PlayerSettings::default(),
            &enabled_policy(),
            OptionFlags {
                no_hardware_acceleration: true,
                no_video: false,
            },
        );
        assert!(options.is_empty());
    }

    #[test]
    fn disabled_policy_implies_suppression() {
        let options = media_options(
            &PlayerSettings::default(),
            &disabled_policy(),
            OptionFlags::default(),
        );
        assert!(options.iter().all(|opt| !opt.starts_with(":codec")));
        assert!(options.is_empty());
    }

    #[test]
    fn no_video_appends_directive() {
        let options = media_options(
            &PlayerSettings::default(),
            &enabled_policy(),
            OptionFlags {
                no_hardware_acceleration: false,
                no_video: true,
            },
        );
        assert_eq!(options.last().map(String::as_str), Some(":no-video"));
        assert_eq!(options.len(), 4);
    }

    #[test]
    fn suppressed_audio_only_request() {
        let options = media_options(
            &PlayerSettings::default(),
            &enabled_policy(),
            OptionFlags {
                no_hardware_acceleration: true,
                no_video: true,
            },
        );
        assert_eq!(options, vec![":no-video".to_string()]);
    }

    #[test]
    fn dev_override_forces_hardware_and_video() {
        let settings = PlayerSettings {
            dev_decoder: DevDecoder::MediaCodecDirect,
            ..Default::default()
        };
        let options = media_options(
            &settings,
            &disabled_policy(),
            OptionFlags {
                no_hardware_acceleration: true,
                no_video: true,
            },
        );
        assert_eq!(
            options,
            vec![
                ":file-caching=1500".to_string(),
                ":network-caching=1500".to_string(),
                ":codec=mediacodec,none".to_string(),
            ]
        );
    }

    #[test]
    fn caching_uses_configured_latency_value() {
        let settings = PlayerSettings {
            hw_latency_caching_ms: 2000,
            ..Default::default()
        };
        let options = media_options(&settings, &enabled_policy(), OptionFlags::default());
        assert_eq!(options[0], ":file-caching=2000");
        assert_eq!(options[1], ":network-caching=2000");
    }

    #[test]
    fn output_is_fresh_per_call() {
        let settings = PlayerSettings::default();
        let policy = enabled_policy();
        let first = media_options(&settings, &policy, OptionFlags::default());
        let second = media_options(&settings, &policy, OptionFlags::default());
        assert_eq!(first, second);
        assert_eq!(settings, PlayerSettings::default());
    }
}
