//! Line-oriented scanner for dump-tool patch listings.
//!
//! The dump tool renders one patch as a sequence of `Label: value` lines,
//! with section headers ("LFO", "Pitch Envelope Generator", "Operator: N")
//! and indentation (0/2/4 leading spaces) marking nesting depth. The scanner
//! walks the lines once, tracking which section it is inside, and fills in a
//! [`Patch`] best-effort: unrecognized or malformed lines are skipped, never
//! an error.

use crate::patch::{Envelope, KeyboardLevelScaling, Lfo, Operator, Patch};

/// Number of operators in a DX7 voice.
const NUM_OPERATORS: usize = 6;

/// Which logical section of the listing the scanner is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Meta,
    Lfo,
    PitchEg,
    Operators,
}

/// Scanner state for a single patch block. Lives for one `parse_patch` call.
struct Scanner {
    patch: Patch,
    stage: Stage,
    op_index: usize,
}

/// Parses one patch's rendered text block into a [`Patch`].
///
/// Deterministic and infallible: identical input yields a deeply-equal
/// record, and fields whose lines are missing or garbled simply stay unset.
pub fn parse_patch(text: &str) -> Patch {
    let mut scanner = Scanner {
        patch: Patch::default(),
        stage: Stage::Meta,
        op_index: 0,
    };
    for line in text.lines() {
        scanner.line(line);
    }
    scanner.patch
}

impl Scanner {
    fn line(&mut self, line: &str) {
        self.triggers(line);
        match self.stage {
            Stage::Meta => self.meta(line),
            Stage::Lfo => self.lfo(line),
            Stage::PitchEg => self.pitch_eg(line),
            Stage::Operators => self.operators(line),
        }
    }

    /// Stage transitions and the two stage-independent fields, checked for
    /// every line before stage dispatch. A header line therefore also runs
    /// through its own section's dispatch (where it matches no field).
    fn triggers(&mut self, line: &str) {
        if line.starts_with("LFO") {
            self.patch.lfo = Some(Lfo::default());
            self.stage = Stage::Lfo;
        }
        if line.starts_with("Pitch Envelope Generator") {
            self.patch.pitch_eg = Some(Envelope::default());
            self.stage = Stage::PitchEg;
        }
        if let Some(n) = operator_header(line) {
            self.stage = Stage::Operators;
            self.op_index = n - 1;
            if n == 1 {
                // The only point the sequence resets: a listing that
                // declares operators out of order, or a second
                // "Operator: 1", starts the sequence over.
                self.patch.operators.clear();
            }
        }
        if let Some(value) = field(line, "Oscillator Key Sync") {
            self.patch.oscillator_key_sync = Some(value.to_string());
        }
        if let Some(value) = field(line, "Transpose") {
            // Kept as the raw note name ("C3"), not parsed to a number.
            self.patch.transpose = Some(value.to_string());
        }
    }

    fn meta(&mut self, line: &str) {
        if let Some(value) = field(line, "Name") {
            self.patch.name = Some(value.to_string());
        } else if let Some(value) = field(line, "Algorithm") {
            self.patch.algorithm = leading_int(value);
        } else if let Some(value) = field(line, "Feedback") {
            self.patch.feedback = leading_int(value);
        }
    }

    fn lfo(&mut self, line: &str) {
        let Some(lfo) = self.patch.lfo.as_mut() else {
            return;
        };
        if let Some(value) = field(line, "  Wave") {
            lfo.wave = Some(value.to_lowercase());
        } else if let Some(value) = field(line, "  Speed") {
            lfo.speed = leading_int(value);
        } else if let Some(value) = field(line, "  Delay") {
            lfo.delay = leading_int(value);
        } else if let Some(value) = field(line, "  Pitch Mod Depth") {
            lfo.pitch_mod_depth = leading_int(value);
        } else if let Some(value) = field(line, "  AM Depth") {
            lfo.am_depth = Some(value.to_lowercase());
        } else if let Some(value) = field(line, "  Sync") {
            lfo.sync = Some(value.to_lowercase());
        } else if let Some(value) = field(line, "  Pitch Modulation Sensitivity") {
            lfo.pitch_mod_sensitivity = leading_int(value);
        }
    }

    fn pitch_eg(&mut self, line: &str) {
        envelope_field(&mut self.patch.pitch_eg, line, "  ");
    }

    fn operators(&mut self, line: &str) {
        // The slot for the declared operator exists from its header line on,
        // even if no field for it ever appears.
        while self.patch.operators.len() <= self.op_index {
            self.patch.operators.push(Operator::default());
        }
        let op = &mut self.patch.operators[self.op_index];

        if let Some(value) = field(line, "  AM Sensitivity") {
            op.am_sensitivity = leading_int(value);
        } else if let Some(value) = field(line, "  Oscillator Mode") {
            op.oscillator_mode = Some(oscillator_mode(value));
        } else if let Some(value) = field(line, "  Frequency") {
            op.frequency = leading_int(value);
        } else if let Some(value) = field(line, "  Detune") {
            op.detune = leading_int(value);
        } else if line.starts_with("  Keyboard Level Scaling") {
            op.keyboard_level_scaling = Some(KeyboardLevelScaling::default());
        } else if let Some(value) = field(line, "  Keyboard Rate Scaling") {
            op.keyboard_rate_scaling = leading_int(value);
        } else if let Some(value) = field(line, "  Output Level") {
            op.output_level = leading_int(value);
        } else if let Some(value) = field(line, "  Key Velocity Sensitivity") {
            op.key_velocity_sensitivity = leading_int(value);
        } else if !envelope_field(&mut op.eg, line, "    ") {
            scaling_field(op, line);
        }
    }
}

/// Matches "Operator: 1" through "Operator: 6" at the start of a line.
fn operator_header(line: &str) -> Option<usize> {
    let rest = line.strip_prefix("Operator: ")?;
    let n = rest.chars().next()?.to_digit(10)? as usize;
    (1..=NUM_OPERATORS).contains(&n).then_some(n)
}

/// Matches a literal label at the start of a line and returns the text after
/// its `": "` separator. Indentation is part of the label, so nested fields
/// only match at their own depth.
fn field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.strip_prefix(label)?.strip_prefix(": ")
}

/// Applies one envelope "Rate N"/"Level N" line at the given indentation
/// depth, reporting whether the line matched. The envelope is created on
/// first contact: the operator envelope has no header line of its own, so
/// creation keys off the first field.
fn envelope_field(env: &mut Option<Envelope>, line: &str, indent: &str) -> bool {
    let Some(rest) = line.strip_prefix(indent) else {
        return false;
    };
    let Some((label, value)) = rest.split_once(": ") else {
        return false;
    };
    if !matches!(
        label,
        "Rate 1" | "Rate 2" | "Rate 3" | "Rate 4" | "Level 1" | "Level 2" | "Level 3" | "Level 4"
    ) {
        return false;
    }
    let env = env.get_or_insert_with(Envelope::default);
    let value = leading_int(value);
    match label {
        "Rate 1" => env.rate1 = value,
        "Rate 2" => env.rate2 = value,
        "Rate 3" => env.rate3 = value,
        "Rate 4" => env.rate4 = value,
        "Level 1" => env.level1 = value,
        "Level 2" => env.level2 = value,
        "Level 3" => env.level3 = value,
        _ => env.level4 = value,
    }
    true
}

/// Keyboard level scaling sub-fields, ignored unless the section header has
/// already created the record.
fn scaling_field(op: &mut Operator, line: &str) {
    let Some(scaling) = op.keyboard_level_scaling.as_mut() else {
        return;
    };
    if let Some(value) = field(line, "    Breakpoint") {
        scaling.breakpoint = Some(value.to_string());
    } else if let Some(value) = field(line, "    Left Curve") {
        scaling.left_curve = Some(value.to_string());
    } else if let Some(value) = field(line, "    Right Curve") {
        scaling.right_curve = Some(value.to_string());
    } else if let Some(value) = field(line, "    Left Depth") {
        scaling.left_depth = leading_int(value);
    } else if let Some(value) = field(line, "    Right Depth") {
        scaling.right_depth = leading_int(value);
    }
}

/// The dump tool prints "Frequency (Ratio)" or "Fixed Frequency (Hz)";
/// collapse to the bare mode word, keeping anything unrecognized verbatim.
fn oscillator_mode(value: &str) -> String {
    let lower = value.to_lowercase();
    if lower.contains("ratio") {
        "ratio".to_string()
    } else if lower.contains("fixed") {
        "fixed".to_string()
    } else {
        value.to_string()
    }
}

/// Permissive integer parse: optional sign, longest leading digit run,
/// trailing text ignored ("1 Ratio" -> 1, "375Hz" -> 375, "-7" -> -7).
/// Values with no leading digits parse to nothing.
fn leading_int(value: &str) -> Option<i32> {
    let s = value.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let n: i32 = s[..end].parse().ok()?;
    Some(if negative { -n } else { n })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_fields() {
        let patch = parse_patch("Name: BRASS   1\nAlgorithm: 18\nFeedback: 7\n");
        assert_eq!(patch.name.as_deref(), Some("BRASS   1"));
        assert_eq!(patch.algorithm, Some(18));
        assert_eq!(patch.feedback, Some(7));
    }

    #[test]
    fn lfo_fields_require_lfo_stage() {
        // "Speed" before any LFO header must not populate anything.
        let patch = parse_patch("  Speed: 3\nName: X\n");
        assert!(patch.lfo.is_none());

        let patch = parse_patch("LFO\n  Speed: 35\n  Wave: Sine\n  Sync: Off\n");
        let lfo = patch.lfo.expect("lfo stage entered");
        assert_eq!(lfo.speed, Some(35));
        assert_eq!(lfo.wave.as_deref(), Some("sine"));
        assert_eq!(lfo.sync.as_deref(), Some("off"));
    }

    #[test]
    fn transpose_and_key_sync_ignore_stage() {
        let patch = parse_patch("LFO\n  Speed: 35\nOscillator Key Sync: On\nTranspose: C3\n");
        assert_eq!(patch.oscillator_key_sync.as_deref(), Some("On"));
        assert_eq!(patch.transpose.as_deref(), Some("C3"));
        // Transpose stays the raw note name.
        assert_eq!(patch.algorithm, None);
    }

    #[test]
    fn pitch_envelope() {
        let patch = parse_patch("Pitch Envelope Generator\n  Rate 1: 84\n  Level 4: 50\n");
        let eg = patch.pitch_eg.expect("pitch envelope created by header");
        assert_eq!(eg.rate1, Some(84));
        assert_eq!(eg.level4, Some(50));
        assert_eq!(eg.rate2, None);
    }

    #[test]
    fn operator_one_resets_sequence() {
        let patch = parse_patch("Operator: 3\nOperator: 1\n  Output Level: 98\n");
        assert_eq!(patch.operators.len(), 1);
        assert_eq!(patch.operators[0].output_level, Some(98));
    }

    #[test]
    fn declared_operator_allocates_preceding_slots() {
        let patch = parse_patch("Operator: 1\nOperator: 3\n  Detune: -7\n");
        assert_eq!(patch.operators.len(), 3);
        assert_eq!(patch.operators[2].detune, Some(-7));
        assert_eq!(patch.operators[1], Default::default());
    }

    #[test]
    fn operator_envelope_needs_no_header() {
        let patch = parse_patch("Operator: 1\n    Rate 1: 72\n    Level 2: 88\n");
        let eg = patch.operators[0].eg.as_ref().expect("created on first field");
        assert_eq!(eg.rate1, Some(72));
        assert_eq!(eg.level2, Some(88));
    }

    #[test]
    fn level_scaling_needs_its_header() {
        let patch = parse_patch("Operator: 1\n    Breakpoint: A-1\n");
        assert!(patch.operators[0].keyboard_level_scaling.is_none());

        let patch = parse_patch(
            "Operator: 1\n  Keyboard Level Scaling\n    Breakpoint: A-1\n    Left Curve: -LIN\n    Right Depth: 14\n",
        );
        let scaling = patch.operators[0]
            .keyboard_level_scaling
            .as_ref()
            .expect("created by header");
        assert_eq!(scaling.breakpoint.as_deref(), Some("A-1"));
        assert_eq!(scaling.left_curve.as_deref(), Some("-LIN"));
        assert_eq!(scaling.right_depth, Some(14));
    }

    #[test]
    fn oscillator_mode_normalization() {
        for (raw, want) in [
            ("  Oscillator Mode: 1 Ratio", "ratio"),
            ("  Oscillator Mode: 0 Fixed", "fixed"),
            ("  Oscillator Mode: Frequency (Ratio)", "ratio"),
            ("  Oscillator Mode: Fixed Frequency (Hz)", "fixed"),
            ("  Oscillator Mode: Warble", "Warble"),
        ] {
            let patch = parse_patch(&format!("Operator: 1\n{raw}\n"));
            assert_eq!(
                patch.operators[0].oscillator_mode.as_deref(),
                Some(want),
                "raw line: {raw:?}"
            );
        }
    }

    #[test]
    fn integer_values_parse_permissively() {
        assert_eq!(leading_int("35"), Some(35));
        assert_eq!(leading_int("3.5"), Some(3));
        assert_eq!(leading_int("375Hz"), Some(375));
        assert_eq!(leading_int(" -7"), Some(-7));
        assert_eq!(leading_int("C3"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn unknown_lines_are_ignored() {
        let patch = parse_patch("Filename: rom1a.syx\nVoice #: 1\nName: X\nNot A Label\n\n");
        assert_eq!(patch.name.as_deref(), Some("X"));
        assert!(patch.operators.is_empty());
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "Name: Test Patch\nAlgorithm: 5\nLFO\n  Speed: 35\nOperator: 1\n  Output Level: 99\n";
        assert_eq!(parse_patch(text), parse_patch(text));
    }
}
