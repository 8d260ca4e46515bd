//! Structured patch records extracted from dump-tool text.

use serde::{Deserialize, Serialize};

/// One DX7 voice as rendered by the dump tool.
///
/// Every field is optional: the parser is best-effort, anything it never saw
/// stays unset, and unset fields are omitted from the serialized document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    /// Patch display name, raw (10 characters on the instrument)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Algorithm number (1-32)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<i32>,
    /// Feedback amount (0-7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<i32>,
    /// Oscillator key sync, raw token ("On"/"Off")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscillator_key_sync: Option<String>,
    /// Transpose as the note name the dump tool prints (e.g. "C3"),
    /// deliberately not parsed to a number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transpose: Option<String>,
    /// LFO parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lfo: Option<Lfo>,
    /// Pitch envelope
    #[serde(rename = "pitchEG", skip_serializing_if = "Option::is_none")]
    pub pitch_eg: Option<Envelope>,
    /// Operators indexed by declared operator number minus one; a complete
    /// dump yields exactly 6
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<Operator>,
}

/// LFO parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lfo {
    /// Waveform name, lowercased ("triangle", "sine", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wave: Option<String>,
    /// LFO rate (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    /// LFO delay (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<i32>,
    /// Pitch modulation depth (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_mod_depth: Option<i32>,
    /// Amplitude modulation depth, kept as lowercased text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub am_depth: Option<String>,
    /// Key sync, lowercased ("on"/"off")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<String>,
    /// Pitch modulation sensitivity (0-7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_mod_sensitivity: Option<i32>,
}

/// Four-stage rate/level envelope, shared by the pitch envelope and the
/// per-operator envelope generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Stage 1 rate (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate1: Option<i32>,
    /// Stage 2 rate (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate2: Option<i32>,
    /// Stage 3 rate (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate3: Option<i32>,
    /// Stage 4 rate (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate4: Option<i32>,
    /// Stage 1 level (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level1: Option<i32>,
    /// Stage 2 level (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level2: Option<i32>,
    /// Stage 3 level (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level3: Option<i32>,
    /// Stage 4 level (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level4: Option<i32>,
}

/// One of the six sound-generating operators within a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    /// Amplitude modulation sensitivity (0-3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub am_sensitivity: Option<i32>,
    /// "ratio" or "fixed" when the dump text names either mode; otherwise
    /// the raw token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oscillator_mode: Option<String>,
    /// Frequency, truncated to its integer part (the dump prints ratios
    /// like "3.5" and fixed frequencies like "375Hz")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,
    /// Detune (-7 to 7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detune: Option<i32>,
    /// Amplitude envelope, present once the first rate/level line is seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eg: Option<Envelope>,
    /// Keyboard level scaling, present once its section header is seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_level_scaling: Option<KeyboardLevelScaling>,
    /// Keyboard rate scaling (0-7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_rate_scaling: Option<i32>,
    /// Output level (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_level: Option<i32>,
    /// Key velocity sensitivity (0-7)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_velocity_sensitivity: Option<i32>,
}

/// Keyboard level scaling around a breakpoint key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardLevelScaling {
    /// Break point as a note name (e.g. "A-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<String>,
    /// Curve type on the left side ("-LIN", "-EXP", "+EXP", "+LIN")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_curve: Option<String>,
    /// Curve type on the right side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_curve: Option<String>,
    /// Depth of scaling on the left side (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_depth: Option<i32>,
    /// Depth of scaling on the right side (0-99)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_depth: Option<i32>,
}
