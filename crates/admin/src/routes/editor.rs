//! Vehicle editor route handlers.
//!
//! The editor is one multipart form. Every post carries the field values
//! (so nothing typed is lost) plus the button that was pressed:
//!
//! - `save` submits the vehicle
//! - `preview` (or no button) keeps the values and any newly chosen photos
//! - `remove:{index}` drops one selected photo
//!
//! Choosing photos replaces the whole selection; an empty file input keeps
//! the current one.

use askama::Template;
use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use linha_verde_core::VehicleForm;
use linha_verde_supabase::UploadFile;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::middleware::session::{clear_editor_id, editor_id, set_flash};
use crate::models::Flash;
use crate::routes::{AdminUserView, render};
use crate::services::{Editor, EditorHandle, EditorStatus, WorkflowError};
use crate::state::AppState;

const EDITOR_PATH: &str = "/admin/editor";

/// Which button submitted the editor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Save,
    Preview,
    Remove(usize),
}

impl EditorAction {
    /// Parse the `action` field. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "preview" => Some(Self::Preview),
            "save" => Some(Self::Save),
            other => other
                .strip_prefix("remove:")
                .and_then(|index| index.parse().ok())
                .map(Self::Remove),
        }
    }
}

/// Multipart body of the editor form.
#[derive(Debug, TryFromMultipart)]
pub struct EditorSubmission {
    #[form_data(default)]
    pub action: String,
    #[form_data(default)]
    pub name: String,
    #[form_data(default)]
    pub year: String,
    #[form_data(default)]
    pub price: String,
    #[form_data(default)]
    pub mileage: String,
    #[form_data(default)]
    pub fuel: String,
    #[form_data(default)]
    pub transmission: String,
    #[form_data(default)]
    pub engine: String,
    #[form_data(default)]
    pub color: String,
    #[form_data(default)]
    pub doors: String,
    #[form_data(default)]
    pub description: String,
    #[form_data(default)]
    pub features: String,
    #[form_data(default)]
    pub specifications: String,
    #[form_data(limit = "unlimited")]
    pub images: Vec<FieldData<Bytes>>,
}

impl EditorSubmission {
    /// Field values as typed.
    #[must_use]
    pub fn form(&self) -> VehicleForm {
        VehicleForm {
            name: self.name.clone(),
            year: self.year.clone(),
            price: self.price.clone(),
            mileage: self.mileage.clone(),
            fuel: self.fuel.clone(),
            transmission: self.transmission.clone(),
            engine: self.engine.clone(),
            color: self.color.clone(),
            doors: self.doors.clone(),
            description: self.description.clone(),
            features: self.features.clone(),
            specifications: self.specifications.clone(),
        }
    }

    /// Newly chosen photos, in the order the browser sent them.
    ///
    /// An untouched file input arrives as one nameless empty part, which is
    /// skipped.
    #[must_use]
    pub fn chosen_images(&self) -> Vec<UploadFile> {
        self.images
            .iter()
            .filter(|field| {
                field.metadata.file_name.as_deref().is_some_and(|name| !name.is_empty())
                    || !field.contents.is_empty()
            })
            .map(|field| {
                UploadFile::new(
                    field.metadata.file_name.clone().unwrap_or_default(),
                    field
                        .metadata
                        .content_type
                        .clone()
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    field.contents.to_vec(),
                )
            })
            .collect()
    }
}

/// One selected photo shown with its preview.
#[derive(Debug, Clone)]
pub struct PreviewView {
    pub index: usize,
    pub file_name: String,
    pub size: String,
    pub url: String,
}

/// Editor page template.
#[derive(Template)]
#[template(path = "inventory/editor.html")]
pub struct EditorTemplate {
    pub admin_user: AdminUserView,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub form: VehicleForm,
    pub previews: Vec<PreviewView>,
    pub current_images: Vec<String>,
    pub error: Option<String>,
    /// Set while a submission from this editor is still running.
    pub progress: Option<&'static str>,
}

impl EditorTemplate {
    fn new(admin_user: AdminUserView, editor: &Editor, state: &AppState) -> Self {
        let updating = editor.target().is_some();
        Self {
            admin_user,
            title: if updating {
                "Editar Veículo"
            } else {
                "Adicionar Novo Veículo"
            },
            submit_label: if updating { "Atualizar" } else { "Salvar" },
            form: editor.form.clone(),
            previews: editor
                .images
                .iter()
                .enumerate()
                .map(|(index, file)| PreviewView {
                    index,
                    file_name: file.file_name.clone(),
                    size: size_label(file.bytes.len()),
                    url: format!("{EDITOR_PATH}/previews/{index}"),
                })
                .collect(),
            current_images: editor
                .current_images
                .iter()
                .map(|image| state.config().image_url(image))
                .collect(),
            error: editor.error.clone(),
            progress: match editor.status {
                EditorStatus::Editing => None,
                EditorStatus::Submitting => Some("Salvando..."),
                EditorStatus::UploadingImages => Some("Enviando fotos..."),
            },
        }
    }
}

/// Human-readable size of a selected photo.
#[allow(clippy::cast_precision_loss)]
fn size_label(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < KB * KB {
        format!("{:.0} KB", value / KB)
    } else {
        format!("{:.1} MB", value / (KB * KB)).replace('.', ",")
    }
}

/// Build the editor router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(EDITOR_PATH, get(show).post(submit))
        .route("/admin/editor/cancel", post(cancel))
        .route("/admin/editor/previews/{index}", get(preview))
}

/// This browser's open editor.
async fn current_editor(state: &AppState, session: &Session) -> Result<Option<EditorHandle>> {
    Ok(match editor_id(session).await? {
        Some(id) => state.editors().get(&id).await,
        None => None,
    })
}

/// Show the open editor, or go back to the list when there is none.
///
/// GET /admin/editor
#[instrument(skip_all)]
async fn show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    let Some(handle) = current_editor(&state, &session).await? else {
        return Ok(Redirect::to("/admin").into_response());
    };
    let editor = handle.lock().await;
    Ok(render(&EditorTemplate::new(
        AdminUserView::new(&admin, &state),
        &editor,
        &state,
    )))
}

/// Apply a post of the editor form.
///
/// POST /admin/editor
#[instrument(skip_all, fields(action = %submission.action))]
async fn submit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    TypedMultipart(submission): TypedMultipart<EditorSubmission>,
) -> Result<Response> {
    let action = EditorAction::parse(&submission.action)
        .ok_or_else(|| AppError::BadRequest(format!("unknown action '{}'", submission.action)))?;

    let Some(handle) = current_editor(&state, &session).await? else {
        return Ok(Redirect::to("/admin").into_response());
    };

    {
        let mut editor = handle.lock().await;
        if editor.is_busy() {
            // The running submission owns the editor; show its progress.
            return Ok(Redirect::to(EDITOR_PATH).into_response());
        }
        editor.form = submission.form();
        let chosen = submission.chosen_images();
        if !chosen.is_empty() {
            editor.select_images(chosen);
        }
        if let EditorAction::Remove(index) = action {
            editor.remove_image(index);
        }
    }

    if action != EditorAction::Save {
        return Ok(Redirect::to(EDITOR_PATH).into_response());
    }

    match state.workflow().submit(&admin.access_token, &handle).await {
        Ok(outcome) => {
            info!(id = %outcome.id(), "Vehicle saved");
            if let Some(id) = clear_editor_id(&session).await? {
                state.editors().close(&id).await;
            }
            set_flash(&session, Flash::success(outcome.message())).await?;
            Ok(Redirect::to("/admin").into_response())
        }
        Err(WorkflowError::Busy) => Ok(Redirect::to(EDITOR_PATH).into_response()),
        Err(e) => {
            warn!(error = %e, "Vehicle not saved");
            Ok(Redirect::to(EDITOR_PATH).into_response())
        }
    }
}

/// Close the editor without saving.
///
/// POST /admin/editor/cancel
#[instrument(skip_all)]
async fn cancel(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect> {
    if let Some(id) = clear_editor_id(&session).await? {
        state.editors().close(&id).await;
    }
    Ok(Redirect::to("/admin"))
}

/// Serve a selected photo for its preview.
///
/// GET /admin/editor/previews/{index}
async fn preview(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
) -> Result<Response> {
    let handle = current_editor(&state, &session)
        .await?
        .ok_or_else(|| AppError::NotFound("editor".to_string()))?;
    let editor = handle.lock().await;
    let file = editor
        .image(index)
        .ok_or_else(|| AppError::NotFound(format!("photo {index}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.clone()),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        file.bytes.clone(),
    )
        .into_response())
}
