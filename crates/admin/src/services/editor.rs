//! Per-browser editing sessions.
//!
//! The editor holds everything the form shows between requests: raw field
//! text, the selected photos and the last error. It lives server-side in an
//! [`EditorStore`] keyed by an id kept in the browser session, so a page
//! reload or a failed submission never loses typed values.

use std::sync::Arc;
use std::time::Duration;

use linha_verde_core::{Vehicle, VehicleForm, VehicleId};
use linha_verde_supabase::UploadFile;
use moka::future::Cache;
use tokio::sync::Mutex;

/// Maximum number of open editors.
const MAX_EDITORS: u64 = 256;

/// Idle time after which an abandoned editor is dropped.
const EDITOR_IDLE: Duration = Duration::from_secs(2 * 60 * 60);

/// What a submission will do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// Insert a new record.
    Create,
    /// Update the record with this id.
    Update { id: VehicleId },
}

/// Where the editor is in the submit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    /// Open and accepting input.
    Editing,
    /// A submission is writing the record.
    Submitting,
    /// A submission is uploading photos.
    UploadingImages,
}

/// An open editing form.
#[derive(Debug, Clone)]
pub struct Editor {
    pub mode: EditorMode,
    pub status: EditorStatus,
    pub form: VehicleForm,
    /// Selected photos in upload order. The preview of photo `i` is served
    /// from the same element, so files and previews cannot drift apart.
    pub images: Vec<UploadFile>,
    /// Photos the record already has. Replaced only when new photos are
    /// saved.
    pub current_images: Vec<String>,
    /// Message from the last failed submission.
    pub error: Option<String>,
}

impl Editor {
    /// An empty form for a new vehicle.
    #[must_use]
    pub fn for_create() -> Self {
        Self {
            mode: EditorMode::Create,
            status: EditorStatus::Editing,
            form: VehicleForm::default(),
            images: Vec::new(),
            current_images: Vec::new(),
            error: None,
        }
    }

    /// A form pre-filled from a stored vehicle, with no photos selected.
    #[must_use]
    pub fn for_update(vehicle: &Vehicle) -> Self {
        Self {
            mode: EditorMode::Update {
                id: vehicle.id.clone(),
            },
            status: EditorStatus::Editing,
            form: VehicleForm::from_vehicle(vehicle),
            images: Vec::new(),
            current_images: vehicle.gallery().into_iter().map(str::to_string).collect(),
            error: None,
        }
    }

    /// Replace the photo selection wholesale.
    pub fn select_images(&mut self, files: Vec<UploadFile>) {
        self.images = files;
    }

    /// Drop the photo at `index`. Returns `false` if there was none.
    pub fn remove_image(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.images.remove(index);
            true
        } else {
            false
        }
    }

    /// The selected photo at `index`.
    #[must_use]
    pub fn image(&self, index: usize) -> Option<&UploadFile> {
        self.images.get(index)
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status != EditorStatus::Editing
    }

    /// Id of the record being edited, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&VehicleId> {
        match &self.mode {
            EditorMode::Create => None,
            EditorMode::Update { id } => Some(id),
        }
    }
}

/// Shared handle to one editor.
pub type EditorHandle = Arc<Mutex<Editor>>;

/// Open editors, bounded and expiring when idle.
#[derive(Clone)]
pub struct EditorStore {
    cache: Cache<String, EditorHandle>,
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorStore {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_EDITORS)
            .time_to_idle(EDITOR_IDLE)
            .build();
        Self { cache }
    }

    /// Store a new editor and return its id.
    pub async fn open(&self, editor: Editor) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.cache.insert(id.clone(), Arc::new(Mutex::new(editor))).await;
        id
    }

    /// The editor with this id, unless it was closed or expired.
    pub async fn get(&self, id: &str) -> Option<EditorHandle> {
        self.cache.get(id).await
    }

    /// Forget an editor.
    pub async fn close(&self, id: &str) {
        self.cache.invalidate(id).await;
    }
}

impl std::fmt::Debug for EditorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorStore")
            .field("open", &self.cache.entry_count())
            .finish()
    }
}
