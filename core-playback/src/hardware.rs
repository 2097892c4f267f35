//! # Hardware Acceleration Policy
//!
//! Pure decision logic mapping a requested acceleration mode and the
//! device-capability classification to an effective mode plus an ordered
//! codec-preference list.
//!
//! ## Overview
//!
//! Hardware decoders are fast but unevenly reliable across devices, so the
//! policy is conservative: hardware is only engaged when the device is known
//! to work with at least one decoder path, or when the user explicitly
//! forces it. The whole decision is a pure function of two inputs; it
//! performs no I/O and is fully enumerable in tests.
//!
//! A separate, developer-facing decoder override bypasses the automatic
//! path entirely: it pins the codec list to exactly one decoder followed by
//! the `none` sentinel, meaning "try only this decoder, then give up
//! instead of falling back".

use bridge_engine::DecoderSupport;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Codec preference used when every hardware decoder path works.
pub const DEFAULT_CODEC_LIST: &str = "mediacodec,iomx,all";

/// Codec preference used when hardware decoding is off: no hardware-specific
/// decoder is requested.
pub const CODEC_LIST_ALL: &str = "all";

// ============================================================================
// Modes
// ============================================================================

/// Requested (and effective) hardware acceleration mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HwAcceleration {
    /// Decide from the device capability classification.
    #[default]
    Automatic,
    /// No hardware acceleration.
    Disabled,
    /// Hardware decoding only; rendering stays in software.
    DecodingOnly,
    /// Hardware decoding and rendering.
    Full,
}

impl HwAcceleration {
    /// Returns `true` when the mode was explicitly chosen rather than left
    /// to the automatic decision.
    pub fn is_forced(self) -> bool {
        !matches!(self, HwAcceleration::Automatic)
    }
}

/// Developer-facing decoder override, independent of the automatic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DevDecoder {
    /// No override; use the automatic policy.
    #[default]
    Automatic,
    /// OMX decoder only.
    Omx,
    /// OMX decoder with direct rendering.
    OmxDirect,
    /// MediaCodec decoder only.
    MediaCodec,
    /// MediaCodec decoder with direct rendering.
    MediaCodecDirect,
}

// ============================================================================
// Resolution
// ============================================================================

/// Outcome of the hardware acceleration decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwPolicy {
    /// Mode actually in effect.
    pub effective: HwAcceleration,
    /// Ordered decoder families the engine should attempt, most preferred
    /// first.
    pub codec_list: String,
}

impl HwPolicy {
    fn disabled() -> Self {
        Self {
            effective: HwAcceleration::Disabled,
            codec_list: CODEC_LIST_ALL.to_string(),
        }
    }
}

/// Map the requested mode and the device classification to the effective
/// policy.
///
/// Deterministic; the classification is queried once by the caller and never
/// re-read here.
pub fn resolve(requested: HwAcceleration, support: DecoderSupport) -> HwPolicy {
    if requested == HwAcceleration::Disabled {
        debug!("Hardware decoding off: disabled by user");
        return HwPolicy::disabled();
    }

    match support {
        DecoderSupport::None => {
            debug!("Hardware decoding off: no decoder works on this device");
            HwPolicy::disabled()
        }
        DecoderSupport::Unknown => {
            if requested.is_forced() {
                debug!("Hardware decoding on: forced by user on unknown device");
                HwPolicy {
                    effective: requested,
                    codec_list: DEFAULT_CODEC_LIST.to_string(),
                }
            } else {
                // Unknown hardware is assumed unreliable.
                debug!("Hardware decoding off: automatic mode and unknown device");
                HwPolicy::disabled()
            }
        }
        DecoderSupport::Omx | DecoderSupport::MediaCodec | DecoderSupport::All => {
            let effective = if requested.is_forced() {
                requested
            } else {
                HwAcceleration::Full
            };
            let codec_list = match support {
                DecoderSupport::Omx => "iomx,all".to_string(),
                DecoderSupport::MediaCodec => "mediacodec,all".to_string(),
                _ => DEFAULT_CODEC_LIST.to_string(),
            };
            debug!(codec_list = %codec_list, "Hardware decoding on");
            HwPolicy {
                effective,
                codec_list,
            }
        }
    }
}

/// Codec list pinned by the developer decoder override, or `None` when no
/// override is configured.
///
/// The terminal `none` entry keeps the engine from falling back to another
/// decoder family when the pinned one fails.
pub fn dev_codec_list(dev: DevDecoder) -> Option<String> {
    match dev {
        DevDecoder::Automatic => None,
        DevDecoder::Omx | DevDecoder::OmxDirect => Some("iomx,none".to_string()),
        DevDecoder::MediaCodec | DevDecoder::MediaCodecDirect => {
            Some("mediacodec,none".to_string())
        }
    }
}

/// Whether decoded frames go straight to the display surface without an
/// intermediate copy.
///
/// Requires a windowed video output; with a decoder override, only the
/// direct-rendering variants qualify, otherwise direct rendering follows
/// from full acceleration.
pub fn direct_rendering(dev: DevDecoder, effective: HwAcceleration, windowed_video: bool) -> bool {
    if !windowed_video {
        return false;
    }
    match dev {
        DevDecoder::Automatic => effective == HwAcceleration::Full,
        DevDecoder::OmxDirect | DevDecoder::MediaCodecDirect => true,
        DevDecoder::Omx | DevDecoder::MediaCodec => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
