use axum::{
    extract::{Extension, Multipart, State},
    response::{IntoResponse, Json},
};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::user_dto::{ImageUploadResponse, UpdateProfilePayload},
    error::{Error, Result},
    middleware::auth::CurrentUser,
    services::storage_service::{profile_image_name, validate_image},
    AppState,
};

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let profile = state.user_service.get_profile(&user).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state.user_service.update_profile(&user, payload.into()).await?;
    Ok(Json(json!({ "success": true, "message": "Profile updated successfully" })))
}

#[axum::debug_handler]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        validate_image(&content_type, data.len())?;

        let object_name = profile_image_name(&user, &content_type);
        let image_url = state
            .storage_service
            .upload(&object_name, &content_type, data)
            .await?;
        state.user_service.set_image_url(&user, &image_url).await?;

        return Ok(Json(ImageUploadResponse {
            success: true,
            image_url: Some(image_url),
            message: "Profile image uploaded successfully".to_string(),
        }));
    }

    Err(Error::BadRequest("No image file provided".to_string()))
}

#[axum::debug_handler]
pub async fn delete_profile_image(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let previous = state
        .user_service
        .clear_image_url(&user)
        .await?
        .ok_or_else(|| Error::NotFound("No profile image found".to_string()))?;

    if let Some(object_name) = state.storage_service.object_name_from_url(&previous) {
        if let Err(e) = state.storage_service.delete(&object_name).await {
            tracing::warn!(user = %user, error = %e, "Failed to delete stored profile image");
        }
    }

    Ok(Json(ImageUploadResponse {
        success: true,
        image_url: None,
        message: "Profile image removed successfully".to_string(),
    }))
}
