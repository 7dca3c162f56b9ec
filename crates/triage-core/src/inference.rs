//! Deterministic stand-in for model inference.
//!
//! The verdict is derived from the file's name and size only, so the same
//! file always gets the same answer. Confidence is
//! `clamp(0.90 + ((size mod 1000) / 1000) * 0.09, 0.90, 0.99)` and the label is
//! `cancerous` whenever confidence exceeds 0.6, which with the 0.90 floor means
//! always. The file-name hash is computed and logged but does not feed the
//! decision; see DESIGN.md.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Simulated processing time before a result is produced.
pub const SIMULATED_DELAY: Duration = Duration::from_millis(600);

pub const CONFIDENCE_FLOOR: f64 = 0.90;
pub const CONFIDENCE_CEIL: f64 = 0.99;
const CONFIDENCE_SPAN: f64 = 0.09;
const LABEL_THRESHOLD: f64 = 0.6;
const HIGH_CONFIDENCE: f64 = 0.95;

/// Name used when a file has none.
pub const UNNAMED: &str = "unnamed";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Cancerous,
    NonCancerous,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancerous => write!(f, "cancerous"),
            Self::NonCancerous => write!(f, "non-cancerous"),
        }
    }
}

/// Outcome of one simulated analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub label: Label,
    pub confidence: f64,
}

impl InferenceResult {
    pub fn is_cancerous(&self) -> bool {
        self.label == Label::Cancerous
    }

    /// Confidence as a whole percentage, rounded half up.
    pub fn confidence_pct(&self) -> u32 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u32
    }

    /// Headline shown on the result view.
    pub fn verdict(&self) -> &'static str {
        match self.label {
            Label::Cancerous => "Image is cancerous",
            Label::NonCancerous => "Image is non-cancerous",
        }
    }

    /// Whether the image gets the "Gastric cancer" badge.
    pub fn shows_badge(&self) -> bool {
        self.is_cancerous() && self.confidence >= CONFIDENCE_FLOOR
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// Java-style string hash over UTF-16 code units with 32-bit wraparound:
/// `h = h * 31 + c`, written as `(h << 5) - h + c`.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16().fold(0i32, |h, c| {
        (h << 5).wrapping_sub(h).wrapping_add(i32::from(c))
    })
}

/// Run the simulated model on a file's name and byte size.
///
/// An empty name counts as `"unnamed"` and a zero size as `1`.
pub fn infer(file_name: &str, file_size: u64) -> InferenceResult {
    let name = if file_name.is_empty() { UNNAMED } else { file_name };
    let size = if file_size == 0 { 1 } else { file_size };

    let hash = name_hash(name);
    let base = f64::from((hash % 1000).unsigned_abs()) / 1000.0;
    log::debug!("inference fingerprint for {name:?}: hash={hash} base={base:.3} (unused)");

    let confidence = (CONFIDENCE_FLOOR + ((size % 1000) as f64 / 1000.0) * CONFIDENCE_SPAN)
        .clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEIL);
    let label = if confidence > LABEL_THRESHOLD {
        Label::Cancerous
    } else {
        Label::NonCancerous
    };

    InferenceResult { label, confidence }
}

// ---------------------------------------------------------------------------
// Follow-up guidance
// ---------------------------------------------------------------------------

/// Three lines of follow-up guidance for a result.
pub fn recommendations(result: &InferenceResult) -> [String; 3] {
    let pct = result.confidence_pct();
    let high = result.confidence >= HIGH_CONFIDENCE;
    match (result.is_cancerous(), high) {
        (true, true) => [
            format!(
                "Urgent referral to gastroenterology for confirmatory endoscopy/biopsy (confidence {pct}%)."
            ),
            "Document clinical symptoms and risk factors to aid triage.".into(),
            "Do not rely solely on AI; confirm with clinical evaluation.".into(),
        ],
        (true, false) => [
            format!("Refer to gastroenterology for diagnostic confirmation (confidence {pct}%)."),
            "Consider additional imaging views if available to improve assessment.".into(),
            "Discuss findings with the patient and plan timely follow-up.".into(),
        ],
        (false, true) => [
            format!("No immediate red flags detected (confidence {pct}%)."),
            "Continue routine screening per local guidelines.".into(),
            "Consult a clinician if symptoms persist or worsen.".into(),
        ],
        (false, false) => [
            format!("Low likelihood detected (confidence {pct}%)."),
            "If image quality is suboptimal, consider re-imaging for clarity.".into(),
            "Monitor symptoms; seek medical advice if concerns arise.".into(),
        ],
    }
}

/// A specialist listed on the result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Specialist {
    pub name: &'static str,
    pub title: &'static str,
    pub org: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
}

const SPECIALISTS: &[Specialist] = &[
    Specialist {
        name: "Dr. Aisha Rahman",
        title: "Gastroenterologist",
        org: "City Medical Center",
        email: "a.rahman@example.org",
        phone: "+1-555-201-1100",
    },
    Specialist {
        name: "Dr. Kenji Nakamura",
        title: "GI Oncologist",
        org: "Regional Cancer Institute",
        email: "k.nakamura@example.org",
        phone: "+1-555-201-2233",
    },
    Specialist {
        name: "Dr. Maria Gomez",
        title: "Endoscopy Specialist",
        org: "St. Mary Hospital",
        email: "m.gomez@example.org",
        phone: "+1-555-201-3344",
    },
];

/// Fixed specialist directory.
pub fn specialists() -> &'static [Specialist] {
    SPECIALISTS
}
