use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use axum_extra::extract::Multipart;
use mongodb::bson::doc;
use mongodb::Collection;

use crate::database::connection::MARKS_COLLECTION;
use crate::errors::{AppError, Result};
use crate::middleware::auth::policy;
use crate::models::marks::MarksRecord;
use crate::models::user::Claims;
use crate::services::extraction::parse_extraction;
use crate::state::AppState;

/// Upload a marksheet photo, extract its contents through the vision
/// model and upsert the normalized record.
pub async fn process_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<MarksRecord>> {
    claims.authorize(policy::UPLOAD_MARKS)?;

    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Multipart(format!("Failed to process multipart field: {}", e)))?
    {
        if field.name() == Some("image") {
            let mime_type = field
                .content_type()
                .unwrap_or("image/jpeg")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Multipart(format!("Failed to read image data: {}", e)))?;
            image = Some((data.to_vec(), mime_type));
        }
    }

    let (data, mime_type) = image.ok_or(AppError::MissingInput)?;
    if data.is_empty() {
        return Err(AppError::MissingInput);
    }

    tracing::info!(
        "processing marksheet upload from {} ({} bytes, {})",
        claims.email,
        data.len(),
        mime_type
    );

    let raw_reply = state.vision.extract_marksheet(&data, &mime_type).await?;
    let record = parse_extraction(&raw_reply)?;

    let marks: Collection<MarksRecord> = state.db.collection(MARKS_COLLECTION);
    // Full replacement keyed on the natural key: last write wins.
    marks
        .replace_one(record_key(&record), &record)
        .upsert(true)
        .await?;

    Ok(Json(record))
}

/// Upsert filter on the natural key. Replacement via this filter rewrites
/// the whole document, so resubmitting the same key leaves only the
/// latest marks queryable.
fn record_key(record: &MarksRecord) -> mongodb::bson::Document {
    doc! {
        "section": &record.section,
        "usn": &record.usn,
        "subject": &record.subject,
    }
}

pub async fn get_marks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((section, usn, subject)): Path<(String, String, String)>,
) -> Result<Json<MarksRecord>> {
    claims.authorize(policy::READ_MARKS)?;

    let marks: Collection<MarksRecord> = state.db.collection(MARKS_COLLECTION);
    let record = marks
        .find_one(doc! { "section": &section, "usn": &usn, "subject": &subject })
        .await?
        .ok_or(AppError::RecordNotFound)?;

    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::marks::{MarksBreakdown, MarksDetails, Question, Summary};
    use mongodb::bson::to_document;

    fn record_with_total(total: f64) -> MarksRecord {
        MarksRecord {
            section: "A".into(),
            usn: "1BM21IS001".into(),
            subject: "DBMS".into(),
            marks_details: MarksDetails {
                questions: vec![Question {
                    question_number: 1,
                    max_marks: 10.0,
                    marks_obtained: MarksBreakdown { a: total, b: 0.0, c: 0.0, d: 0.0 },
                    total,
                }],
                summary: Summary {
                    total_max_marks: 10.0,
                    total_obtained_marks: total,
                },
            },
        }
    }

    #[test]
    fn record_key_holds_exactly_the_natural_key() {
        let key = record_key(&record_with_total(7.0));
        assert_eq!(key.len(), 3);
        assert_eq!(key.get_str("section").unwrap(), "A");
        assert_eq!(key.get_str("usn").unwrap(), "1BM21IS001");
        assert_eq!(key.get_str("subject").unwrap(), "DBMS");
    }

    #[test]
    fn resubmission_targets_the_same_document_with_the_new_marks() {
        let first = record_with_total(7.0);
        let second = record_with_total(9.0);

        // Same filter, so the replacement overwrites the earlier upload.
        assert_eq!(record_key(&first), record_key(&second));

        // The replacement document is the full new record, not a merge.
        let replacement = to_document(&second).unwrap();
        let summary = replacement
            .get_document("marksDetails")
            .unwrap()
            .get_document("summary")
            .unwrap();
        assert_eq!(summary.get_f64("totalObtainedMarks").unwrap(), 9.0);
    }
}
