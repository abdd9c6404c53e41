//! Inventory writes: the two-phase save and deletion.
//!
//! Saving a vehicle with photos takes several backend calls that cannot be
//! made atomic:
//!
//! 1. validate the form (no backend call on failure)
//! 2. insert or update the record fields
//! 3. upload each photo in order to `vehicles/{id}_{n}.{ext}`
//! 4. set the record's `images` to the uploaded URLs
//!
//! When step 3 or 4 fails after step 2 succeeded, the record stays saved
//! without its new photos and [`WorkflowError::PartialFailure`] is returned.
//! Nothing is rolled back or retried.

use std::fmt;
use std::sync::Arc;

use linha_verde_core::{ValidationError, VehicleForm, VehicleId, VehiclePatch};
use linha_verde_supabase::{
    AccessToken, Backend, BackendError, BlobStorage, RecordStore, UploadFile,
};
use thiserror::Error;
use tracing::{Instrument, error, info, instrument, warn};

use super::editor::{EditorHandle, EditorMode, EditorStatus};

/// Step of the photo phase that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStage {
    Upload,
    Attach,
}

impl fmt::Display for ImageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("Erro ao fazer upload das imagens"),
            Self::Attach => f.write_str("Erro ao vincular as imagens"),
        }
    }
}

/// Why a submission did not complete.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The form is invalid; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record write failed; nothing was written.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The record was saved but its new photos were not.
    #[error("Veículo salvo sem as novas fotos. {stage}: {source}")]
    PartialFailure {
        id: VehicleId,
        stage: ImageStage,
        #[source]
        source: BackendError,
    },

    /// Another submission from this editor is still running.
    #[error("Aguarde: o veículo ainda está sendo salvo.")]
    Busy,

    /// The submission task stopped before reporting an outcome.
    #[error("O salvamento foi interrompido. Confira a lista antes de tentar novamente.")]
    Interrupted,
}

/// A completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(VehicleId),
    Updated(VehicleId),
}

impl SubmitOutcome {
    /// Confirmation shown above the list.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Created(_) => "Veículo criado com sucesso!",
            Self::Updated(_) => "Veículo atualizado com sucesso!",
        }
    }

    #[must_use]
    pub const fn id(&self) -> &VehicleId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

/// Confirmation shown after a deletion.
pub const DELETED_MESSAGE: &str = "Veículo excluído com sucesso!";

/// Message shown when a deletion fails.
#[must_use]
pub fn delete_failed_message(error: &BackendError) -> String {
    format!("Erro ao excluir veículo: {error}")
}

/// Message shown when the list cannot be loaded.
#[must_use]
pub fn list_failed_message(error: &BackendError) -> String {
    format!("Erro ao carregar veículos: {error}")
}

/// Object path of the `n`th photo (1-based) of a vehicle.
#[must_use]
pub fn image_path(id: &VehicleId, n: usize, file: &UploadFile) -> String {
    format!("vehicles/{id}_{n}.{}", file.extension())
}

/// Inventory writes against the injected backend.
#[derive(Clone)]
pub struct InventoryWorkflow {
    records: Arc<dyn RecordStore>,
    storage: Arc<dyn BlobStorage>,
}

impl InventoryWorkflow {
    #[must_use]
    pub fn new(backend: &Backend) -> Self {
        Self {
            records: backend.records.clone(),
            storage: backend.storage.clone(),
        }
    }

    /// Submit the editor.
    ///
    /// The editor is locked against a second submission while this runs.
    /// On failure it is back in [`EditorStatus::Editing`] with the message
    /// set and its fields and photos untouched. A partially failed create
    /// turns into an update of the record that was created, so submitting
    /// again does not insert a duplicate.
    ///
    /// The writes run on their own task: dropping the returned future does
    /// not stop them, and the editor is unlocked when they finish.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError`] describing the first failure.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        token: &AccessToken,
        editor: &EditorHandle,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let (mode, form, images) = {
            let mut guard = editor.lock().await;
            if guard.is_busy() {
                return Err(WorkflowError::Busy);
            }
            guard.status = EditorStatus::Submitting;
            guard.error = None;
            (guard.mode.clone(), guard.form.clone(), guard.images.clone())
        };

        let workflow = self.clone();
        let token = token.clone();
        let task_editor = Arc::clone(editor);
        let task = tokio::spawn(
            async move {
                let result = workflow
                    .run(&token, &mode, &form, &images, &task_editor)
                    .await;
                finish(&task_editor, &result).await;
                result
            }
            .in_current_span(),
        );

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Submission task failed");
                let result = Err(WorkflowError::Interrupted);
                finish(editor, &result).await;
                result
            }
        }
    }

    async fn run(
        &self,
        token: &AccessToken,
        mode: &EditorMode,
        form: &VehicleForm,
        images: &[UploadFile],
        editor: &EditorHandle,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let fields = form.validate()?;

        let outcome = match mode {
            EditorMode::Create => {
                let vehicle = self.records.insert(token, &fields).await?;
                info!(id = %vehicle.id, "Vehicle created");
                SubmitOutcome::Created(vehicle.id)
            }
            EditorMode::Update { id } => {
                self.records
                    .update(token, id, &VehiclePatch::Fields(fields))
                    .await?;
                info!(id = %id, "Vehicle updated");
                SubmitOutcome::Updated(id.clone())
            }
        };

        if images.is_empty() {
            return Ok(outcome);
        }

        editor.lock().await.status = EditorStatus::UploadingImages;
        let id = outcome.id();

        let urls = self
            .upload_images(token, id, images)
            .await
            .map_err(|source| partial_failure(id, ImageStage::Upload, source))?;

        self.records
            .update(token, id, &VehiclePatch::Images { images: urls })
            .await
            .map_err(|source| partial_failure(id, ImageStage::Attach, source))?;

        Ok(outcome)
    }

    /// Upload photos one at a time, in order, returning their public URLs.
    ///
    /// # Errors
    ///
    /// Stops at the first failed upload. Photos already uploaded stay in the
    /// bucket.
    #[instrument(skip_all, fields(id = %id, count = images.len()))]
    pub async fn upload_images(
        &self,
        token: &AccessToken,
        id: &VehicleId,
        images: &[UploadFile],
    ) -> Result<Vec<String>, BackendError> {
        let mut urls = Vec::with_capacity(images.len());
        for (n, file) in (1..).zip(images) {
            let path = image_path(id, n, file);
            self.storage.upload(token, &path, file).await?;
            urls.push(self.storage.public_url(&path));
        }
        Ok(urls)
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(&self, token: &AccessToken, id: &VehicleId) -> Result<(), BackendError> {
        self.records.delete(token, id).await?;
        info!("Vehicle deleted");
        Ok(())
    }
}

/// Unlock the editor and record the outcome of a submission.
async fn finish(editor: &EditorHandle, result: &Result<SubmitOutcome, WorkflowError>) {
    let mut guard = editor.lock().await;
    guard.status = EditorStatus::Editing;
    if let Err(e) = result {
        guard.error = Some(e.to_string());
        if let WorkflowError::PartialFailure { id, .. } = e {
            guard.mode = EditorMode::Update { id: id.clone() };
        }
    }
}

fn partial_failure(id: &VehicleId, stage: ImageStage, source: BackendError) -> WorkflowError {
    warn!(id = %id, %stage, error = %source, "Vehicle saved without its new photos");
    WorkflowError::PartialFailure {
        id: id.clone(),
        stage,
        source,
    }
}

impl fmt::Debug for InventoryWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryWorkflow").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use linha_verde_core::{Vehicle, VehicleFields, fallback};
    use linha_verde_supabase::{AuthService, BackendCall, MemoryBackend, Operation, SortOrder};
    use tokio::sync::{Mutex, Notify};

    use crate::services::Editor;
    use super::*;

    const EMAIL: &str = "admin@linhaverde.com.br";
    const PASSWORD: &str = "s3nh4-forte";

    async fn setup() -> (MemoryBackend, InventoryWorkflow, AccessToken) {
        let memory = MemoryBackend::new().with_account(EMAIL, PASSWORD);
        let token = memory.sign_in(EMAIL, PASSWORD).await.unwrap().access_token;
        memory.clear_calls();
        let workflow = InventoryWorkflow::new(&Backend::memory(&memory));
        (memory, workflow, token)
    }

    fn filled_form() -> VehicleForm {
        VehicleForm {
            name: "Fiat Argo Drive".to_string(),
            year: "2022".to_string(),
            price: "R$ 72.500".to_string(),
            mileage: "18.000 km".to_string(),
            features: "Ar condicionado\n\nCâmera de ré\n".to_string(),
            specifications: r#"{"Motor": "1.0 Firefly"}"#.to_string(),
            ..VehicleForm::default()
        }
    }

    fn photo(name: &str) -> UploadFile {
        UploadFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
    }

    fn editor_with(form: VehicleForm, images: Vec<UploadFile>) -> EditorHandle {
        let mut editor = Editor::for_create();
        editor.form = form;
        editor.select_images(images);
        Arc::new(Mutex::new(editor))
    }

    /// Record store whose inserts wait until the gate is opened.
    struct GatedRecords {
        inner: MemoryBackend,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl RecordStore for GatedRecords {
        async fn list(&self, order: SortOrder) -> Result<Vec<Vehicle>, BackendError> {
            self.inner.list(order).await
        }

        async fn get(&self, id: &VehicleId) -> Result<Option<Vehicle>, BackendError> {
            self.inner.get(id).await
        }

        async fn insert(
            &self,
            token: &AccessToken,
            fields: &VehicleFields,
        ) -> Result<Vehicle, BackendError> {
            self.gate.notified().await;
            self.inner.insert(token, fields).await
        }

        async fn update(
            &self,
            token: &AccessToken,
            id: &VehicleId,
            patch: &VehiclePatch,
        ) -> Result<(), BackendError> {
            self.inner.update(token, id, patch).await
        }

        async fn delete(&self, token: &AccessToken, id: &VehicleId) -> Result<(), BackendError> {
            self.inner.delete(token, id).await
        }
    }

    fn stored(memory: &MemoryBackend, id: &VehicleId) -> Vehicle {
        memory.record(id).unwrap()
    }

    #[test]
    fn test_image_path() {
        let id = VehicleId::from(12);
        assert_eq!(image_path(&id, 1, &photo("frente.JPG")), "vehicles/12_1.JPG");
        assert_eq!(image_path(&id, 3, &photo("lateral.png")), "vehicles/12_3.png");
    }

    #[tokio::test]
    async fn test_create_with_two_images() {
        let (memory, workflow, token) = setup().await;
        let editor = editor_with(filled_form(), vec![photo("frente.jpg"), photo("traseira.png")]);

        let outcome = workflow.submit(&token, &editor).await.unwrap();
        assert_eq!(outcome.message(), "Veículo criado com sucesso!");

        let vehicle = stored(&memory, outcome.id());
        assert_eq!(vehicle.name, "Fiat Argo Drive");
        assert_eq!(vehicle.features.len(), 2);
        assert_eq!(vehicle.images.len(), 2);
        let first = format!("vehicles/{}_1.jpg", outcome.id());
        assert!(vehicle.images.first().unwrap().ends_with(&first));
        assert_eq!(
            memory.blob_paths(),
            [first, format!("vehicles/{}_2.png", outcome.id())]
        );
        assert_eq!(editor.lock().await.status, EditorStatus::Editing);
    }

    #[tokio::test]
    async fn test_invalid_specifications_make_no_backend_call() {
        let (memory, workflow, token) = setup().await;
        let form = VehicleForm {
            specifications: "{invalid json".to_string(),
            ..filled_form()
        };
        let editor = editor_with(form, vec![photo("frente.jpg")]);

        let err = workflow.submit(&token, &editor).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(memory.calls().is_empty());

        let editor = editor.lock().await;
        assert_eq!(editor.form.name, "Fiat Argo Drive");
        assert_eq!(editor.form.specifications, "{invalid json");
        assert_eq!(editor.images.len(), 1);
        assert!(editor.error.is_some());
        assert!(!editor.is_busy());
    }

    #[tokio::test]
    async fn test_update_without_images_leaves_images_alone() {
        let (memory, workflow, token) = setup().await;
        let original = fallback::find(&VehicleId::from(1)).unwrap();
        memory.seed(original.clone());

        let mut editor = Editor::for_update(&original);
        editor.form.name = "Honda Civic Touring".to_string();
        let editor = Arc::new(Mutex::new(editor));

        let outcome = workflow.submit(&token, &editor).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Updated(VehicleId::from(1)));

        let updates = memory.calls_of(Operation::Update);
        assert_eq!(updates.len(), 1);
        assert!(matches!(
            updates.first(),
            Some(BackendCall::Update { patch, .. }) if !patch.touches_images()
        ));

        let vehicle = stored(&memory, &VehicleId::from(1));
        assert_eq!(vehicle.name, "Honda Civic Touring");
        assert_eq!(vehicle.images, original.images);
    }

    #[tokio::test]
    async fn test_upload_failure_after_insert_is_partial() {
        let (memory, workflow, token) = setup().await;
        memory.fail_after(Operation::Upload, 1, "The object exceeded the maximum allowed size");
        let editor = editor_with(filled_form(), vec![photo("a.jpg"), photo("b.jpg")]);

        let err = workflow.submit(&token, &editor).await.unwrap_err();
        let WorkflowError::PartialFailure { id, stage, .. } = &err else {
            panic!("expected partial failure, got {err:?}");
        };
        assert_eq!(*stage, ImageStage::Upload);
        assert!(err.to_string().contains("The object exceeded the maximum allowed size"));

        let vehicle = stored(&memory, id);
        assert!(vehicle.images.is_empty());

        let editor = editor.lock().await;
        assert_eq!(editor.mode, EditorMode::Update { id: id.clone() });
        assert_eq!(editor.images.len(), 2);
        assert_eq!(editor.status, EditorStatus::Editing);
    }

    #[tokio::test]
    async fn test_attach_failure_is_partial() {
        let (memory, workflow, token) = setup().await;
        memory.fail_after(Operation::Update, 0, "permission denied for table vehicles");
        let editor = editor_with(filled_form(), vec![photo("a.jpg")]);

        let err = workflow.submit(&token, &editor).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::PartialFailure { stage: ImageStage::Attach, .. }
        ));
        assert_eq!(memory.records().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_failure_reports_raw_message() {
        let (memory, workflow, token) = setup().await;
        memory.fail(Operation::Insert, "new row violates row-level security policy");
        let editor = editor_with(filled_form(), vec![photo("a.jpg")]);

        let err = workflow.submit(&token, &editor).await.unwrap_err();
        assert_eq!(err.to_string(), "new row violates row-level security policy");
        assert!(memory.calls_of(Operation::Upload).is_empty());
        assert_eq!(editor.lock().await.mode, EditorMode::Create);
    }

    #[tokio::test]
    async fn test_busy_editor_rejects_second_submit() {
        let (memory, workflow, token) = setup().await;
        let editor = editor_with(filled_form(), Vec::new());
        editor.lock().await.status = EditorStatus::Submitting;

        let err = workflow.submit(&token, &editor).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Busy));
        assert!(memory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_submit_still_saves_and_unlocks() {
        let (memory, _, token) = setup().await;
        let gate = Arc::new(Notify::new());
        let backend = Backend {
            records: Arc::new(GatedRecords {
                inner: memory.clone(),
                gate: Arc::clone(&gate),
            }),
            ..Backend::memory(&memory)
        };
        let workflow = InventoryWorkflow::new(&backend);
        let editor = editor_with(filled_form(), vec![photo("frente.jpg")]);

        let dropped =
            tokio::time::timeout(Duration::from_millis(20), workflow.submit(&token, &editor)).await;
        assert!(dropped.is_err());
        assert!(editor.lock().await.is_busy());
        assert!(matches!(
            workflow.submit(&token, &editor).await,
            Err(WorkflowError::Busy)
        ));

        gate.notify_one();
        for _ in 0..200 {
            if !editor.lock().await.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let editor = editor.lock().await;
        assert!(!editor.is_busy());
        assert!(editor.error.is_none());
        let vehicle = memory.records().into_iter().next().unwrap();
        assert_eq!(vehicle.name, "Fiat Argo Drive");
        assert_eq!(vehicle.images.len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let (memory, workflow, token) = setup().await;
        memory.seed(fallback::find(&VehicleId::from(2)).unwrap());

        workflow.delete(&token, &VehicleId::from(2)).await.unwrap();
        assert!(memory.records().is_empty());

        memory.fail(Operation::Delete, "timeout");
        let err = workflow.delete(&token, &VehicleId::from(3)).await.unwrap_err();
        assert_eq!(delete_failed_message(&err), "Erro ao excluir veículo: timeout");

        memory.clear_failures();
        let err = workflow.delete(&token, &VehicleId::from(2)).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }
}
