//! Resource list editor for the `/dpp` collection.
//!
//! The editor keeps a local mirror of the backend collection and a single
//! form draft. Every mutation is followed by a full re-read; the mirror is
//! never patched locally.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::EditorError;
use crate::models::{ConnectivityStatus, FormField, FormState, Record, StatusError};
use crate::services::api::ApiClient;

pub const DELETE_FAILED_ALERT: &str = "❌ Failed to delete DPP";

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    LoadSucceeded {
        records: Vec<Record>,
        at: DateTime<Utc>,
    },
    LoadFailed,
    BeginCreate,
    BeginEdit(Record),
    FieldChanged(FormField, String),
    CancelEdit,
    SaveSucceeded,
    SaveFailed,
    DeleteFailed,
    AlertDismissed,
    Unmounted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub records: Vec<Record>,
    pub form: FormState,
    pub status: ConnectivityStatus,
    /// Blocking notification the front end must show before continuing.
    pub alert: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub mounted: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        EditorState {
            records: Vec::new(),
            form: FormState::default(),
            status: ConnectivityStatus::Loading,
            alert: None,
            last_synced_at: None,
            mounted: true,
        }
    }
}

impl EditorState {
    /// Pure transition. Once unmounted, every event is ignored.
    pub fn apply(mut self, event: EditorEvent) -> Self {
        if !self.mounted {
            return self;
        }
        match event {
            EditorEvent::LoadSucceeded { records, at } => {
                self.records = records;
                self.status = ConnectivityStatus::Connected;
                self.last_synced_at = Some(at);
            }
            EditorEvent::LoadFailed => {
                self.status = ConnectivityStatus::Error(StatusError::Unreachable);
            }
            EditorEvent::BeginCreate | EditorEvent::CancelEdit | EditorEvent::SaveSucceeded => {
                self.form = FormState::default();
            }
            EditorEvent::BeginEdit(record) => {
                self.form = FormState::for_record(&record);
            }
            EditorEvent::FieldChanged(field, value) => {
                self.form.set(field, value);
            }
            EditorEvent::SaveFailed => {
                self.status = ConnectivityStatus::Error(StatusError::SaveFailed);
            }
            EditorEvent::DeleteFailed => {
                self.alert = Some(DELETE_FAILED_ALERT.to_string());
            }
            EditorEvent::AlertDismissed => {
                self.alert = None;
            }
            EditorEvent::Unmounted => {
                self.mounted = false;
            }
        }
        self
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// Handle to one editor instance. Clones share the same state, so
/// operations may be spawned and overlap; the last load to resolve wins.
#[derive(Debug, Clone)]
pub struct ResourceListEditor {
    client: ApiClient,
    state: Arc<Mutex<EditorState>>,
}

impl ResourceListEditor {
    pub fn new(client: ApiClient) -> Self {
        ResourceListEditor {
            client,
            state: Arc::new(Mutex::new(EditorState::default())),
        }
    }

    /// Creates the editor and performs the initial load. A failed load is
    /// reflected in the status rather than returned.
    pub async fn mount(client: ApiClient) -> Self {
        let editor = Self::new(client);
        if let Err(err) = editor.load().await {
            debug!(error = %err, "initial load failed");
        }
        editor
    }

    pub fn snapshot(&self) -> Result<EditorState, EditorError> {
        let guard = self.state.lock().map_err(|_| EditorError::StateLock)?;
        Ok(guard.clone())
    }

    fn dispatch(&self, event: EditorEvent) -> Result<(), EditorError> {
        let mut guard = self.state.lock().map_err(|_| EditorError::StateLock)?;
        if !guard.mounted {
            debug!(?event, "editor unmounted, discarding");
            return Err(EditorError::Unmounted);
        }
        let next = guard.clone().apply(event);
        *guard = next;
        Ok(())
    }

    fn ensure_mounted(&self) -> Result<(), EditorError> {
        let guard = self.state.lock().map_err(|_| EditorError::StateLock)?;
        if guard.mounted {
            Ok(())
        } else {
            Err(EditorError::Unmounted)
        }
    }

    /// Re-reads the whole collection and replaces the mirror. Returns the
    /// number of records loaded.
    pub async fn load(&self) -> Result<usize, EditorError> {
        self.ensure_mounted()?;
        match self.client.list_records().await {
            Ok(records) => {
                let count = records.len();
                self.dispatch(EditorEvent::LoadSucceeded {
                    records,
                    at: Utc::now(),
                })?;
                info!(count, "collection reloaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "cannot load collection");
                self.dispatch(EditorEvent::LoadFailed)?;
                Err(err.into())
            }
        }
    }

    pub fn begin_create(&self) -> Result<(), EditorError> {
        self.dispatch(EditorEvent::BeginCreate)
    }

    pub fn begin_edit(&self, record: &Record) -> Result<(), EditorError> {
        self.dispatch(EditorEvent::BeginEdit(record.clone()))
    }

    /// Starts editing a record currently present in the mirror.
    pub fn begin_edit_by_id(&self, id: &str) -> Result<(), EditorError> {
        let record = self
            .snapshot()?
            .find(id)
            .cloned()
            .ok_or_else(|| EditorError::UnknownRecord(id.to_string()))?;
        self.begin_edit(&record)
    }

    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> Result<(), EditorError> {
        self.dispatch(EditorEvent::FieldChanged(field, value.into()))
    }

    pub fn cancel_edit(&self) -> Result<(), EditorError> {
        self.dispatch(EditorEvent::CancelEdit)
    }

    /// Validates the draft, then updates or creates depending on whether a
    /// record is being edited. On failure the draft is kept for a retry.
    pub async fn save(&self) -> Result<(), EditorError> {
        let form = self.snapshot()?.form;
        form.validate().map_err(EditorError::Validation)?;
        self.ensure_mounted()?;

        let result = match &form.editing {
            Some(id) => self.client.update_record(id, &form.fields).await,
            None => self.client.create_record(&form.fields).await,
        };

        match result {
            Ok(()) => {
                info!(editing = ?form.editing, "record saved");
                self.dispatch(EditorEvent::SaveSucceeded)?;
                if let Err(err) = self.load().await {
                    debug!(error = %err, "reload after save failed");
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, editing = ?form.editing, "cannot save record");
                self.dispatch(EditorEvent::SaveFailed)?;
                Err(err.into())
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), EditorError> {
        self.ensure_mounted()?;
        match self.client.delete_record(id).await {
            Ok(()) => {
                info!(id, "record deleted");
                if let Err(err) = self.load().await {
                    debug!(error = %err, "reload after delete failed");
                }
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, id, "cannot delete record");
                self.dispatch(EditorEvent::DeleteFailed)?;
                Err(err.into())
            }
        }
    }

    /// Returns the pending blocking alert, if any, and clears it.
    pub fn take_alert(&self) -> Result<Option<String>, EditorError> {
        let alert = self.snapshot()?.alert;
        if alert.is_some() {
            self.dispatch(EditorEvent::AlertDismissed)?;
        }
        Ok(alert)
    }

    /// Tears the editor down. Responses still in flight are dropped when
    /// they arrive.
    pub fn unmount(&self) -> Result<(), EditorError> {
        let mut guard = self.state.lock().map_err(|_| EditorError::StateLock)?;
        let next = guard.clone().apply(EditorEvent::Unmounted);
        *guard = next;
        Ok(())
    }
}
