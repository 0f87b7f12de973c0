//! Prescription Handlers
//!
//! Upload is multipart; the image part is required, metadata parts are
//! optional. OCR runs best-effort after the image is stored.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Prescription, PrescriptionVerify};
use crate::db::repository::PrescriptionRepository;
use crate::db::repository::prescription::PrescriptionNew;
use crate::services::TextExtractor;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Parsed multipart fields of an upload request
#[derive(Default)]
struct UploadForm {
    image: Option<(String, Vec<u8>)>,
    doctor_name: Option<String>,
    doctor_license: Option<String>,
    prescription_date: Option<chrono::DateTime<chrono::Utc>>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "image" => {
                let file_name = field.file_name().unwrap_or("prescription").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read image: {e}")))?;
                form.image = Some((file_name, bytes.to_vec()));
            }
            "doctor_name" => {
                form.doctor_name = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Failed to read doctor_name: {e}"))
                })?);
            }
            "doctor_license" => {
                form.doctor_license = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Failed to read doctor_license: {e}"))
                })?);
            }
            "prescription_date" => {
                let raw = field.text().await.map_err(|e| {
                    AppError::validation(format!("Failed to read prescription_date: {e}"))
                })?;
                let parsed = raw
                    .parse::<chrono::DateTime<chrono::Utc>>()
                    .map_err(|_| AppError::validation("prescription_date must be RFC 3339"))?;
                form.prescription_date = Some(parsed);
            }
            // Unknown parts are ignored
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/prescriptions/upload - 上传处方图片
pub async fn upload(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Prescription>)> {
    let form = read_upload_form(multipart).await?;

    let (file_name, bytes) = form
        .image
        .ok_or_else(|| AppError::new(ErrorCode::PrescriptionImageRequired))?;
    validate_optional_text(&form.doctor_name, "doctor_name", MAX_NAME_LEN)?;
    validate_optional_text(&form.doctor_license, "doctor_license", MAX_NAME_LEN)?;

    let image_url = state.prescription_store().save_image(&file_name, &bytes).await?;

    // Best-effort OCR: failure degrades to empty text, never fails the upload
    let extracted_text = match state.prescription_store().resolve(&image_url) {
        Some(path) => {
            let text = state.get_text_extractor().extract_text(&path).await;
            (!text.is_empty()).then_some(text)
        }
        None => None,
    };

    let repo = PrescriptionRepository::new(state.db.clone());
    let prescription = repo
        .create(PrescriptionNew {
            user_id: user.id.clone(),
            doctor_name: form.doctor_name,
            doctor_license: form.doctor_license,
            prescription_date: form.prescription_date,
            image_url,
            extracted_text,
            medicines: Vec::new(),
        })
        .await?;

    tracing::info!(
        user_id = %user.id,
        prescription_id = %prescription.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        "Prescription uploaded"
    );

    Ok((StatusCode::CREATED, Json(prescription)))
}

/// GET /api/prescriptions/my-prescriptions - 本人处方，最新在前
pub async fn my_prescriptions(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Prescription>>> {
    let repo = PrescriptionRepository::new(state.db.clone());
    let prescriptions = repo.find_by_user(&user.id).await?;
    Ok(Json(prescriptions))
}

/// GET /api/prescriptions/pending - 待审队列，最早上传在前
pub async fn pending(State(state): State<ServerState>) -> AppResult<Json<Vec<Prescription>>> {
    let repo = PrescriptionRepository::new(state.db.clone());
    let prescriptions = repo.find_pending().await?;
    Ok(Json(prescriptions))
}

/// PUT /api/prescriptions/:id/verify - 审核处方 (药房工作人员)
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(decision): Json<PrescriptionVerify>,
) -> AppResult<Json<Prescription>> {
    validate_optional_text(&decision.notes, "notes", MAX_NOTE_LEN)?;
    validate_optional_text(&decision.rejection_reason, "rejection_reason", MAX_NOTE_LEN)?;

    let repo = PrescriptionRepository::new(state.db.clone());
    let prescription = repo.verify(&id, &user.id, decision.clone()).await?;

    tracing::info!(
        prescription_id = %id,
        verifier = %user.id,
        status = ?decision.status,
        "Prescription resolved"
    );

    Ok(Json(prescription))
}
