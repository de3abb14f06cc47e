use serde::{Deserialize, Serialize};

/// One normalized marksheet, keyed by (section, usn, subject).
/// Field names stay camelCase in both JSON responses and BSON documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksRecord {
    pub section: String,
    pub usn: String,
    pub subject: String,
    pub marks_details: MarksDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarksDetails {
    pub questions: Vec<Question>,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_number: u32,
    pub max_marks: f64,
    pub marks_obtained: MarksBreakdown,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MarksBreakdown {
    #[serde(default)]
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub d: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_max_marks: f64,
    pub total_obtained_marks: f64,
}
