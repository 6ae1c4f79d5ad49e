use std::path::Path as FsPath;

use axum::{
    extract::{Json, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::users::{self, CreateUserRequest, UpdateUserRequest};
use crate::AppState;

const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let users = users::list_users(&state.db).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = users::get_user(&state.db, id).await?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = users::create_user(&state.db, request).await?;
    let location = format!("/users/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    users::update_user(&state.db, id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    users::delete_user(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn roles_dropdown(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let roles = users::roles_dropdown(&state.db).await?;
    Ok(Json(roles))
}

/// Accepts a multipart image upload, stores it under the configured uploads
/// directory with a random filename and persists the relative URL on the
/// user. Only common image extensions are accepted.
async fn upload_image(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Invalid multipart payload: {e}")))?
    {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::ValidationError(format!("Invalid multipart payload: {e}")))?;
        file = Some((file_name, data.to_vec()));
        break;
    }

    let (file_name, data) =
        file.ok_or_else(|| ServiceError::ValidationError("No file uploaded.".to_string()))?;
    if data.is_empty() {
        return Err(ServiceError::ValidationError("No file uploaded.".to_string()));
    }

    let extension = FsPath::new(&file_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ServiceError::ValidationError(
            "Unsupported file type. Only .jpg, .jpeg, .png, and .gif are allowed.".to_string(),
        ));
    }

    // Resolve the user before touching the filesystem.
    users::get_user(&state.db, user_id).await?;

    let unique_name = format!("{}{}", Uuid::new_v4(), extension);
    let uploads_dir = FsPath::new(&state.config.uploads_dir);
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| ServiceError::InternalError(format!("failed to create uploads dir: {e}")))?;
    tokio::fs::write(uploads_dir.join(&unique_name), &data)
        .await
        .map_err(|e| ServiceError::InternalError(format!("failed to store upload: {e}")))?;

    let image_url = format!("/UserImages/{unique_name}");
    users::set_image_url(&state.db, user_id, &image_url).await?;

    Ok(Json(json!({
        "message": "Image uploaded successfully.",
        "imageUrl": image_url,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/rolesDropDown", get(roles_dropdown))
        .route("/UploadImage/:user_id", post(upload_image))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}
