//! Normalization of the vision model's free-text reply into a
//! [`MarksRecord`]. Kept as pure functions so the fragile text-to-JSON
//! step can be unit-tested against malformed inputs.

use serde_json::Value;

use crate::errors::{AppError, Result};
use crate::models::marks::{MarksBreakdown, MarksDetails, MarksRecord, Question, Summary};

/// Strip code-fence markers and keep the substring between the first `{`
/// and the last `}`.
pub fn clean_json_string(raw: &str) -> Result<String> {
    let stripped = raw.replace("```json", "").replace("```", "");
    let start = stripped.find('{');
    let end = stripped.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(stripped[start..=end].trim().to_string()),
        _ => Err(AppError::MalformedExtraction(
            "no JSON object found in model reply".to_string(),
        )),
    }
}

/// Full pipeline: raw model reply -> cleaned JSON -> normalized record.
pub fn parse_extraction(raw: &str) -> Result<MarksRecord> {
    let cleaned = clean_json_string(raw)?;
    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| AppError::MalformedExtraction(format!("JSON parse error: {}", e)))?;
    transform(&value)
}

/// Reshape the parsed object into the persistence schema. Top-level keys
/// are matched against the two capitalizations the model produces. A
/// question is kept only if both its maximum marks and its total are
/// greater than zero; a missing per-part breakdown defaults to all zeros.
pub fn transform(extracted: &Value) -> Result<MarksRecord> {
    let section = get_str(extracted, "Section", "section")?;
    let usn = get_str(extracted, "USN", "usn")?;
    let subject = get_str(extracted, "Subject", "subject")?;

    let details = get_field(extracted, "Marks Details", "marksDetails")
        .ok_or_else(|| missing("Marks Details"))?;

    let questions = get_field(details, "Questions", "questions")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("Questions"))?;

    let questions: Vec<Question> = questions
        .iter()
        .filter_map(transform_question)
        .collect();

    let summary = get_field(details, "Summary", "summary").ok_or_else(|| missing("Summary"))?;
    let summary = Summary {
        total_max_marks: get_number(summary, "Total Maximum Marks", "totalMaxMarks")?,
        total_obtained_marks: get_number(summary, "Total Obtained Marks", "totalObtainedMarks")?,
    };

    Ok(MarksRecord {
        section,
        usn,
        subject,
        marks_details: MarksDetails { questions, summary },
    })
}

fn transform_question(q: &Value) -> Option<Question> {
    let max_marks = get_field(q, "Maximum Marks", "maxMarks")?.as_f64()?;
    let total = get_field(q, "Total", "total")?.as_f64()?;
    if max_marks <= 0.0 || total <= 0.0 {
        return None;
    }

    let question_number = get_field(q, "Question Number", "questionNumber")?.as_u64()? as u32;
    let marks_obtained = get_field(q, "Marks Obtained", "marksObtained")
        .map(breakdown_from_value)
        .unwrap_or_default();

    Some(Question {
        question_number,
        max_marks,
        marks_obtained,
        total,
    })
}

fn breakdown_from_value(value: &Value) -> MarksBreakdown {
    let part = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(0.0);
    MarksBreakdown {
        a: part("a"),
        b: part("b"),
        c: part("c"),
        d: part("d"),
    }
}

fn get_field<'a>(value: &'a Value, primary: &str, fallback: &str) -> Option<&'a Value> {
    value.get(primary).or_else(|| value.get(fallback))
}

fn get_str(value: &Value, primary: &str, fallback: &str) -> Result<String> {
    get_field(value, primary, fallback)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(primary))
}

fn get_number(value: &Value, primary: &str, fallback: &str) -> Result<f64> {
    get_field(value, primary, fallback)
        .and_then(Value::as_f64)
        .ok_or_else(|| missing(primary))
}

fn missing(field: &str) -> AppError {
    AppError::MalformedExtraction(format!("missing or invalid field: {}", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FENCED: &str = "```json\n{\"Section\":\"A\",\"USN\":\"1BM21IS001\",\"Subject\":\"DBMS\",\"Marks Details\":{\"Questions\":[],\"Summary\":{\"Total Maximum Marks\":100,\"Total Obtained Marks\":0}}}\n```";

    fn sample_reply() -> Value {
        json!({
            "Section": "B",
            "USN": "1BM21IS042",
            "Subject": "Operating Systems",
            "Marks Details": {
                "Questions": [
                    {
                        "Question Number": 1,
                        "Maximum Marks": 10,
                        "Marks Obtained": { "a": 3, "b": 4 },
                        "Total": 7
                    },
                    {
                        "Question Number": 2,
                        "Maximum Marks": 0,
                        "Total": 0
                    },
                    {
                        "Question Number": 3,
                        "Maximum Marks": 10,
                        "Total": 9
                    }
                ],
                "Summary": {
                    "Total Maximum Marks": 20,
                    "Total Obtained Marks": 16
                }
            }
        })
    }

    #[test]
    fn strips_code_fences_around_object() {
        let cleaned = clean_json_string(FENCED).unwrap();
        assert!(cleaned.starts_with('{'));
        assert!(cleaned.ends_with('}'));
        assert!(!cleaned.contains("```"));
        serde_json::from_str::<Value>(&cleaned).unwrap();
    }

    #[test]
    fn extracts_object_embedded_in_prose() {
        let raw = "Here is the extracted data: {\"Section\":\"A\"} hope that helps!";
        assert_eq!(clean_json_string(raw).unwrap(), "{\"Section\":\"A\"}");
    }

    #[test]
    fn rejects_reply_with_no_object() {
        assert!(matches!(
            clean_json_string("sorry, I cannot read this image"),
            Err(AppError::MalformedExtraction(_))
        ));
    }

    #[test]
    fn rejects_unparseable_json() {
        assert!(matches!(
            parse_extraction("{not json at all}"),
            Err(AppError::MalformedExtraction(_))
        ));
    }

    #[test]
    fn drops_zero_scored_questions_and_preserves_order() {
        let record = transform(&sample_reply()).unwrap();
        assert_eq!(record.marks_details.questions.len(), 2);
        assert_eq!(record.marks_details.questions[0].question_number, 1);
        assert_eq!(record.marks_details.questions[1].question_number, 3);
    }

    #[test]
    fn missing_breakdown_defaults_to_zeros() {
        let record = transform(&sample_reply()).unwrap();
        let q3 = &record.marks_details.questions[1];
        assert_eq!(q3.marks_obtained, MarksBreakdown::default());
    }

    #[test]
    fn partial_breakdown_fills_missing_parts_with_zero() {
        let record = transform(&sample_reply()).unwrap();
        let q1 = &record.marks_details.questions[0];
        assert_eq!(q1.marks_obtained.a, 3.0);
        assert_eq!(q1.marks_obtained.b, 4.0);
        assert_eq!(q1.marks_obtained.c, 0.0);
        assert_eq!(q1.marks_obtained.d, 0.0);
    }

    #[test]
    fn accepts_lowercase_field_variants() {
        let value = json!({
            "section": "C",
            "usn": "1BM21IS007",
            "subject": "Maths",
            "marksDetails": {
                "questions": [],
                "summary": { "totalMaxMarks": 50, "totalObtainedMarks": 31 }
            }
        });
        let record = transform(&value).unwrap();
        assert_eq!(record.usn, "1BM21IS007");
        assert_eq!(record.marks_details.summary.total_obtained_marks, 31.0);
    }

    #[test]
    fn missing_usn_is_an_error() {
        let value = json!({
            "Section": "A",
            "Subject": "DBMS",
            "Marks Details": {
                "Questions": [],
                "Summary": { "Total Maximum Marks": 0, "Total Obtained Marks": 0 }
            }
        });
        assert!(matches!(transform(&value), Err(AppError::MalformedExtraction(_))));
    }

    #[test]
    fn fenced_reply_parses_end_to_end() {
        let record = parse_extraction(FENCED).unwrap();
        assert_eq!(record.section, "A");
        assert_eq!(record.subject, "DBMS");
        assert!(record.marks_details.questions.is_empty());
    }
}
