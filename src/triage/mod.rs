//! Keyword triage: free-text description → {category, urgency}.
//!
//! Pure and deterministic. Critical keywords win over urgent ones; within
//! the urgent tier the category is refined by secondary keyword groups.
//! Keyword tables cover Bahasa Indonesia (the field language) and English.
//! The result is advisory: reporters may pin either field before submitting.

pub mod debounce;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::enums::{IncidentCategory, Urgency};

pub use debounce::{DebouncedTriage, TriageDebouncer};

/// Life-threatening conditions: breathing distress, unconsciousness,
/// cardiac, severe bleeding, stroke, severe accidents.
const CRITICAL_KEYWORDS: &[&str] = &[
    "sesak",
    "darurat",
    "kritis",
    "pingsan",
    "tidak sadar",
    "jantung",
    "pendarahan",
    "stroke",
    "kecelakaan parah",
    "not breathing",
    "shortness of breath",
    "unconscious",
    "fainted",
    "cardiac",
    "heart attack",
    "severe bleeding",
    "critical",
    "emergency",
    "severe accident",
];

const URGENT_KEYWORDS: &[&str] = &[
    "sakit",
    "patah",
    "luka",
    "hamil",
    "melahirkan",
    "mendesak",
    "demam tinggi",
    "kecelakaan",
    "infeksi",
    "pain",
    "fracture",
    "broken",
    "wound",
    "pregnan",
    "childbirth",
    "giving birth",
    "urgent",
    "high fever",
    "accident",
    "infection",
];

const PREGNANCY_KEYWORDS: &[&str] = &["hamil", "lahir", "pregnan", "childbirth", "giving birth"];

const ACCIDENT_KEYWORDS: &[&str] = &["patah", "kecelakaan", "fracture", "broken", "accident"];

/// Proposed category and urgency for a description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triage {
    pub category: IncidentCategory,
    pub urgency: Urgency,
}

impl Default for Triage {
    /// Unmatched input: uncategorized and stable.
    fn default() -> Self {
        Self {
            category: IncidentCategory::Other,
            urgency: Urgency::Stable,
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify a description. Never fails; unmatched text yields `{Other, Stable}`.
pub fn classify(description: &str) -> Triage {
    let text = description.to_lowercase();

    if contains_any(&text, CRITICAL_KEYWORDS) {
        return Triage {
            category: IncidentCategory::GeneralEmergency,
            urgency: Urgency::Critical,
        };
    }

    if contains_any(&text, URGENT_KEYWORDS) {
        let category = if contains_any(&text, PREGNANCY_KEYWORDS) {
            IncidentCategory::PregnancyChildbirth
        } else if contains_any(&text, ACCIDENT_KEYWORDS) {
            IncidentCategory::Accident
        } else {
            IncidentCategory::ElderlyChronicIllness
        };
        return Triage {
            category,
            urgency: Urgency::Urgent,
        };
    }

    Triage::default()
}

/// Whether a description is long enough to be worth classifying.
pub fn is_classifiable(description: &str) -> bool {
    description.trim().chars().count() >= config::TRIAGE_MIN_DESCRIPTION_CHARS
}

/// Classify only once the description passes the minimum length.
pub fn classify_if_ready(description: &str) -> Option<Triage> {
    is_classifiable(description).then(|| classify(description))
}

/// Triage state of a report draft: the current proposal plus which fields
/// the reporter has pinned by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTriage {
    pub triage: Triage,
    pub category_pinned: bool,
    pub urgency_pinned: bool,
}

impl DraftTriage {
    pub fn override_category(&mut self, category: IncidentCategory) {
        self.triage.category = category;
        self.category_pinned = true;
    }

    pub fn override_urgency(&mut self, urgency: Urgency) {
        self.triage.urgency = urgency;
        self.urgency_pinned = true;
    }

    /// Merge a classifier proposal, leaving pinned fields alone.
    pub fn merge(&mut self, proposal: Triage) {
        if !self.category_pinned {
            self.triage.category = proposal.category;
        }
        if !self.urgency_pinned {
            self.triage.urgency = proposal.urgency;
        }
    }

    /// Re-classify after a description edit. Short descriptions leave the
    /// current values untouched. Returns whether a classification ran.
    pub fn apply_description(&mut self, description: &str) -> bool {
        match classify_if_ready(description) {
            Some(proposal) => {
                self.merge(proposal);
                true
            }
            None => false,
        }
    }
}
