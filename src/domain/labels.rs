//! Human-readable labels for encounter class codes
//!
//! Class codes come from the HL7 v3 ActEncounterCode value set and mean little
//! to non-clinical readers. Presentation only; nothing in the aggregation
//! depends on these labels.

/// Display information for one encounter class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterClassInfo {
    /// Plain-English label
    pub label: String,
    /// One-line description
    pub description: String,
    /// Short visual marker
    pub marker: &'static str,
}

const FALLBACK_MARKER: &str = "📌";

const KNOWN_CLASSES: &[(&str, &str, &str, &str)] = &[
    ("AMB", "Outpatient", "Walk-in or scheduled clinic visits", "🏥"),
    ("EMER", "Emergency", "Emergency room visits", "🚨"),
    ("IMP", "Inpatient", "Admitted and stayed overnight", "🛏️"),
    ("HH", "Home Health", "Healthcare provided at home", "🏠"),
    ("VR", "Virtual", "Telehealth / video consultations", "💻"),
    ("FLD", "Field", "Healthcare provided in the field", "🚑"),
    ("SS", "Short Stay", "Brief observation stays", "⏱️"),
    ("OBSENC", "Observation", "Under observation but not admitted", "👁️"),
    ("PRENC", "Pre-Admission", "Pre-admission testing or evaluation", "📋"),
];

/// Resolves a class code to its display information
///
/// Unknown codes use the raw code as label with a generic description.
///
/// ```
/// use tally::domain::labels::encounter_class_info;
///
/// assert_eq!(encounter_class_info("EMER").label, "Emergency");
/// assert_eq!(encounter_class_info("XYZ").label, "XYZ");
/// ```
pub fn encounter_class_info(code: &str) -> EncounterClassInfo {
    KNOWN_CLASSES
        .iter()
        .find(|(known, ..)| *known == code)
        .map(|(_, label, description, marker)| EncounterClassInfo {
            label: (*label).to_string(),
            description: (*description).to_string(),
            marker: *marker,
        })
        .unwrap_or_else(|| EncounterClassInfo {
            label: code.to_string(),
            description: format!("Encounter type: {code}"),
            marker: FALLBACK_MARKER,
        })
}

/// Label only; the raw code when unmapped
pub fn encounter_label(code: &str) -> String {
    encounter_class_info(code).label
}
