//! Inventory route handlers.
//!
//! The list is fetched from the backend on every render, so it always
//! reflects the last create, update or delete.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use linha_verde_core::{Vehicle, VehicleId};
use linha_verde_supabase::SortOrder;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::middleware::session::{clear_editor_id, editor_id, set_editor_id, set_flash, take_flash};
use crate::models::Flash;
use crate::routes::{AdminUserView, render};
use crate::services::Editor;
use crate::services::inventory::{
    DELETED_MESSAGE, delete_failed_message, list_failed_message,
};
use crate::state::AppState;

/// One row of the inventory table.
#[derive(Debug, Clone)]
pub struct VehicleRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub year: i32,
    pub price: String,
    pub mileage: String,
    pub thumbnail: Option<String>,
}

impl VehicleRow {
    fn new(vehicle: &Vehicle, state: &AppState) -> Self {
        Self {
            id: vehicle.id.to_string(),
            name: vehicle.name.clone(),
            color: vehicle.color.clone().unwrap_or_default(),
            year: vehicle.year,
            price: vehicle.price_display(),
            mileage: vehicle.mileage_display(),
            thumbnail: vehicle
                .cover_image()
                .map(|image| state.config().image_url(image)),
        }
    }
}

/// Inventory list page template.
#[derive(Template)]
#[template(path = "inventory/list.html")]
pub struct InventoryTemplate {
    pub admin_user: AdminUserView,
    pub vehicles: Vec<VehicleRow>,
    pub flash: Option<Flash>,
    /// Set when the list could not be loaded.
    pub load_error: Option<String>,
    /// Whether this browser has an editor open.
    pub editor_open: bool,
}

impl InventoryTemplate {
    /// "N veículo(s) cadastrado(s)" line under the title.
    #[must_use]
    pub fn count_label(&self) -> String {
        match self.vehicles.len() {
            1 => "1 veículo cadastrado".to_string(),
            n => format!("{n} veículos cadastrados"),
        }
    }
}

/// Deletion prompt template.
#[derive(Template)]
#[template(path = "inventory/delete.html")]
pub struct DeleteTemplate {
    pub admin_user: AdminUserView,
    pub vehicle: VehicleRow,
}

/// Deletion form.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    /// Must be `yes` for anything to be deleted.
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteForm {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}

/// Build the inventory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/vehicles/new", post(open_new))
        .route("/admin/vehicles/{id}/edit", post(open_edit))
        .route(
            "/admin/vehicles/{id}/delete",
            get(confirm_delete).post(delete),
        )
}

/// List all vehicles, newest first.
///
/// GET /admin
#[instrument(skip_all, fields(user_id = %admin.user_id))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response> {
    let flash = take_flash(&session).await?;

    let (vehicles, load_error) = match state.backend().records.list(SortOrder::NewestFirst).await
    {
        Ok(vehicles) => (
            vehicles.iter().map(|v| VehicleRow::new(v, &state)).collect(),
            None,
        ),
        Err(e) => {
            warn!(error = %e, "Failed to load vehicles");
            (Vec::new(), Some(list_failed_message(&e)))
        }
    };

    let editor_open = match editor_id(&session).await? {
        Some(id) => state.editors().get(&id).await.is_some(),
        None => false,
    };

    Ok(render(&InventoryTemplate {
        admin_user: AdminUserView::new(&admin, &state),
        vehicles,
        flash,
        load_error,
        editor_open,
    }))
}

/// Open an empty editor, discarding any open one.
///
/// POST /admin/vehicles/new
#[instrument(skip_all)]
async fn open_new(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Redirect> {
    open_editor(&state, &session, Editor::for_create()).await?;
    Ok(Redirect::to("/admin/editor"))
}

/// Open the editor pre-filled from a vehicle.
///
/// POST /admin/vehicles/{id}/edit
#[instrument(skip_all, fields(id = %id))]
async fn open_edit(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = VehicleId::new(id);
    match state.backend().records.get(&id).await {
        Ok(Some(vehicle)) => {
            open_editor(&state, &session, Editor::for_update(&vehicle)).await?;
            Ok(Redirect::to("/admin/editor"))
        }
        Ok(None) => {
            set_flash(&session, Flash::error("Veículo não encontrado")).await?;
            Ok(Redirect::to("/admin"))
        }
        Err(e) => {
            warn!(error = %e, "Failed to load vehicle for editing");
            set_flash(&session, Flash::error(format!("Erro ao carregar veículo: {e}"))).await?;
            Ok(Redirect::to("/admin"))
        }
    }
}

async fn open_editor(state: &AppState, session: &Session, editor: Editor) -> Result<()> {
    if let Some(previous) = clear_editor_id(session).await? {
        state.editors().close(&previous).await;
    }
    let id = state.editors().open(editor).await;
    set_editor_id(session, &id).await?;
    Ok(())
}

/// Ask for confirmation before deleting.
///
/// GET /admin/vehicles/{id}/delete
#[instrument(skip_all, fields(id = %id))]
async fn confirm_delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = VehicleId::new(id);
    let vehicle = state
        .backend()
        .records
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("vehicle {id}")))?;

    Ok(render(&DeleteTemplate {
        admin_user: AdminUserView::new(&admin, &state),
        vehicle: VehicleRow::new(&vehicle, &state),
    }))
}

/// Delete a vehicle when confirmed, then show the list again.
///
/// POST /admin/vehicles/{id}/delete
#[instrument(skip_all, fields(id = %id, confirmed = form.is_confirmed()))]
async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Response> {
    if !form.is_confirmed() {
        return Ok(Redirect::to("/admin").into_response());
    }

    let id = VehicleId::new(id);
    let flash = match state.workflow().delete(&admin.access_token, &id).await {
        Ok(()) => Flash::success(DELETED_MESSAGE),
        Err(e) => {
            warn!(error = %e, "Failed to delete vehicle");
            Flash::error(delete_failed_message(&e))
        }
    };
    set_flash(&session, flash).await?;

    Ok(Redirect::to("/admin").into_response())
}
