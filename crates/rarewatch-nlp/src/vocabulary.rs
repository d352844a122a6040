//! Fixed symptom vocabulary and narrative patterns.
//!
//! These tables are the only knowledge the extractor has. Keep entries
//! lower-case; matching runs against lower-cased text.

/// Known symptom terms matched on word boundaries.
pub const SYMPTOM_KEYWORDS: &[&str] = &[
    // General
    "fever",
    "chills",
    "fatigue",
    "weakness",
    "malaise",
    "weight loss",
    "weight gain",
    "loss of appetite",
    "night sweats",
    // Pain
    "pain",
    "headache",
    "chest pain",
    "abdominal pain",
    "back pain",
    "joint pain",
    "muscle pain",
    "neck pain",
    "pelvic pain",
    // Respiratory
    "cough",
    "shortness of breath",
    "wheezing",
    "sputum",
    "hemoptysis",
    "dyspnea",
    "congestion",
    "runny nose",
    "sneezing",
    "sore throat",
    // Gastrointestinal
    "nausea",
    "vomiting",
    "diarrhea",
    "constipation",
    "bloating",
    "heartburn",
    "dysphagia",
    "melena",
    "hematochezia",
    "jaundice",
    // Neurological
    "dizziness",
    "vertigo",
    "syncope",
    "seizure",
    "tremor",
    "paralysis",
    "numbness",
    "tingling",
    "confusion",
    "memory loss",
    "difficulty speaking",
    // Cardiovascular
    "palpitations",
    "irregular heartbeat",
    "edema",
    "swelling",
    "claudication",
    "cyanosis",
    // Dermatological
    "rash",
    "itching",
    "lesions",
    "bruising",
    "discoloration",
    "hives",
    "eczema",
    "psoriasis",
    // Genitourinary
    "dysuria",
    "hematuria",
    "frequency",
    "urgency",
    "incontinence",
    "discharge",
    "erectile dysfunction",
    // Psychiatric
    "anxiety",
    "depression",
    "insomnia",
    "hallucinations",
    "delusions",
    "mood swings",
    "irritability",
    // Special senses
    "blurred vision",
    "vision loss",
    "hearing loss",
    "tinnitus",
    "ear pain",
    "eye pain",
    "photophobia",
];

/// Multi-word phrases whose constituent words are dropped once the phrase matches.
pub const MULTI_WORD_SYMPTOMS: &[&str] = &[
    "shortness of breath",
    "chest pain",
    "abdominal pain",
    "difficulty speaking",
    "difficulty swallowing",
    "loss of appetite",
    "weight loss",
    "weight gain",
    "night sweats",
    "memory loss",
    "irregular heartbeat",
    "blurred vision",
    "vision loss",
    "hearing loss",
    "joint pain",
    "muscle pain",
    "back pain",
    "body ache",
];

/// Narrative lead-ins that introduce a complaint list. Each regex captures the
/// complaint span in group 1; the span ends at sentence punctuation, a duration
/// or accompaniment clause ("for", "since", "with", "over") or end of text.
pub const COMPLAINT_PATTERNS: &[&str] = &[
    r"\bcomplains? of (.+?)(?:[.;:\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bpresents? with (.+?)(?:[.;:\n]|\s+(?:for|since|over)\s|$)",
    r"\breports? (.+?)(?:[.;:\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bexperiencing (.+?)(?:[.;:\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bhas (?:been having|had) (.+?)(?:[.;:\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bsuffering from (.+?)(?:[.;:\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bsymptoms? (?:include|are|:) (.+?)(?:[.;\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bchief complaints?(?:\s+is|\s+are|:) (.+?)(?:[.;\n]|\s+(?:for|since|with|over)\s|$)",
    r"\bc/o (.+?)(?:[.;:\n]|\s+(?:for|since|with|over)\s|$)",
];

/// Words stripped from a captured complaint fragment before validation.
pub const QUALIFIER_WORDS: &[&str] = &[
    "symptoms",
    "symptom",
    "complains",
    "complaint",
    "presents",
    "reports",
    "states",
    "denies",
    "patient",
    "bilateral",
    "left",
    "right",
    "mild",
    "moderate",
    "severe",
    "acute",
    "chronic",
    "intermittent",
    "persistent",
    "some",
    "a",
    "an",
    "the",
];

/// A fragment containing any of these is clinical bookkeeping, not a symptom.
pub const EXCLUDED_TERMS: &[&str] = &[
    "patient",
    "history",
    "examination",
    "treatment",
    "medication",
    "allergy",
    "surgery",
    "procedure",
];

/// Minimum character length of an accepted fragment.
pub const MIN_SYMPTOM_CHARS: usize = 3;

/// Maximum word count of an accepted fragment.
pub const MAX_SYMPTOM_WORDS: usize = 5;
