//! Batch Editor
//!
//! One edit session per opened batch. The session owns a working copy of the
//! rows, the projected common fields and the record of what was edited, and
//! moves through [`EditorState`] as the operator edits and saves.

use core_kernel::{AmountText, BatchId, EditTicket, PortError, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

use crate::batch::Batch;
use crate::error::InvoiceError;
use crate::fee::{fill_missing_fees, refresh_fee, refresh_fee_from_input, transfer_out_total};
use crate::field::{FieldKey, FieldValue};
use crate::projection::{project_common, CommonFields};
use crate::reconcile::{interpret_failure, BulkUpsertRequest, SaveOutcome};
use crate::record::{InvoiceRecord, TransferOutPolicy};
use crate::validation::{validate_rows, ValidationReport};

/// Where an edit session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorState {
    /// Closed, nothing open
    Idle,
    Editing,
    /// Running local validation
    Validating,
    /// Local validation failed; messages are attached to rows
    Error,
    /// Bulk request in flight
    Submitting,
    /// Backend accepted the batch; the session is finished
    Saved,
    /// Backend rejected the batch; edits are kept
    SubmitError,
}

impl EditorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorState::Idle => "idle",
            EditorState::Editing => "editing",
            EditorState::Validating => "validating",
            EditorState::Error => "error",
            EditorState::Submitting => "submitting",
            EditorState::Saved => "saved",
            EditorState::SubmitError => "submit_error",
        }
    }

    /// States in which the operator may change the batch
    pub fn accepts_edits(&self) -> bool {
        matches!(
            self,
            EditorState::Editing | EditorState::Error | EditorState::SubmitError
        )
    }
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edit session over one batch
#[derive(Debug, Clone)]
pub struct BatchEditSession<R: InvoiceRecord> {
    ticket: EditTicket,
    state: EditorState,
    batch_id: BatchId,
    records: Vec<R>,
    common: CommonFields<R::Field>,
    /// Shared fields that had one value across the batch when it was opened
    projected: BTreeSet<R::Field>,
    common_edits: BTreeSet<R::Field>,
    row_edits: Vec<BTreeSet<R::Field>>,
    removed_ids: Vec<i64>,
    report: ValidationReport,
    row_messages: BTreeMap<usize, Vec<String>>,
    banner: Vec<String>,
}

impl<R: InvoiceRecord> BatchEditSession<R> {
    /// Opens a session over a loaded batch and projects its shared fields
    pub fn open(batch: Batch<R>) -> Self {
        let common = project_common(&batch.records, R::shared_fields());
        let projected = common.iter().filter(|(_, v)| !v.is_empty()).map(|(f, _)| f).collect();
        let row_edits = vec![BTreeSet::new(); batch.records.len()];
        debug!(batch = %batch.batch_id, rows = batch.records.len(), family = R::FAMILY.label(), "Opened batch for editing");
        Self {
            ticket: EditTicket::new(),
            state: EditorState::Editing,
            batch_id: batch.batch_id,
            records: batch.records,
            common,
            projected,
            common_edits: BTreeSet::new(),
            row_edits,
            removed_ids: Vec::new(),
            report: ValidationReport::default(),
            row_messages: BTreeMap::new(),
            banner: Vec::new(),
        }
    }

    /// Opens an empty session for a batch that does not exist yet
    pub fn create(batch_id: BatchId) -> Self {
        let mut session = Self::open(Batch::new(batch_id.clone(), Vec::new()));
        if let Some(field) = R::shared_fields()
            .iter()
            .copied()
            .find(|f| f.wire_name() == "batch_id")
        {
            session.common.set(field, FieldValue::text(batch_id.as_str()));
        }
        session
    }

    pub fn ticket(&self) -> EditTicket {
        self.ticket
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn common(&self) -> &CommonFields<R::Field> {
        &self.common
    }

    /// Persisted ids removed in this session, sent with the next save
    pub fn removed_ids(&self) -> &[i64] {
        &self.removed_ids
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Local and server messages for one row
    pub fn row_messages(&self, row: usize) -> Vec<String> {
        let mut messages: Vec<String> = self.report.errors_for_row(row).map(ToString::to_string).collect();
        if let Some(server) = self.row_messages.get(&row) {
            messages.extend(server.iter().cloned());
        }
        messages
    }

    pub fn banner(&self) -> &[String] {
        &self.banner
    }

    pub fn was_edited(&self, row: usize, field: R::Field) -> bool {
        self.common_edits.contains(&field)
            || self.row_edits.get(row).map_or(false, |edits| edits.contains(&field))
    }

    fn ensure_editable(&mut self, action: &'static str) -> Result<(), InvoiceError> {
        if !self.state.accepts_edits() {
            return Err(InvoiceError::invalid_state(action, self.state.as_str()));
        }
        self.state = EditorState::Editing;
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<(), InvoiceError> {
        if row >= self.records.len() {
            return Err(InvoiceError::RowOutOfRange(row));
        }
        Ok(())
    }

    fn check_shared(field: R::Field) -> Result<(), InvoiceError> {
        if !R::shared_fields().contains(&field) {
            return Err(InvoiceError::InvalidInput {
                field: field.wire_name(),
                reason: "not edited per batch".to_string(),
            });
        }
        Ok(())
    }

    /// Sets a shared field for the whole batch.
    ///
    /// Overrides any earlier per-row edit of the same field.
    pub fn apply_common_edit(&mut self, field: R::Field, value: FieldValue) -> Result<(), InvoiceError> {
        Self::check_shared(field)?;
        Self::reject_derived(field)?;
        // Type-check against a scratch record before touching the session
        R::blank().set(field, value.clone())?;
        self.ensure_editable("edit common field")?;
        self.common.set(field, value);
        self.common_edits.insert(field);
        for edits in &mut self.row_edits {
            edits.remove(&field);
        }
        Ok(())
    }

    /// Sets a shared field from raw operator input
    pub fn apply_common_input(&mut self, field: R::Field, raw: &str) -> Result<(), InvoiceError> {
        Self::check_shared(field)?;
        Self::reject_derived(field)?;
        let mut scratch = R::blank();
        scratch.set_input(field, raw)?;
        self.apply_common_edit(field, scratch.get(field))
    }

    /// Sets a field on one row.
    ///
    /// Changing the gross amount re-derives the fee; a derived fee cannot be
    /// set directly.
    pub fn apply_row_edit(&mut self, row: usize, field: R::Field, value: FieldValue) -> Result<(), InvoiceError> {
        self.check_row(row)?;
        Self::reject_derived(field)?;
        self.ensure_editable("edit row")?;
        let record = &mut self.records[row];
        record.set(field, value)?;
        if field == R::gross_field() {
            refresh_fee(record)?;
        }
        self.row_edits[row].insert(field);
        Ok(())
    }

    /// Sets a field on one row from raw operator input.
    ///
    /// A typed gross amount derives the fee from its digits, so `1.234.567`
    /// gives 123456.
    pub fn apply_row_input(&mut self, row: usize, field: R::Field, raw: &str) -> Result<(), InvoiceError> {
        self.check_row(row)?;
        Self::reject_derived(field)?;
        self.ensure_editable("edit row")?;
        let record = &mut self.records[row];
        record.set_input(field, raw)?;
        if field == R::gross_field() {
            refresh_fee_from_input(record, raw)?;
        }
        self.row_edits[row].insert(field);
        Ok(())
    }

    fn reject_derived(field: R::Field) -> Result<(), InvoiceError> {
        if R::derives_fee() && field == R::fee_field() {
            return Err(InvoiceError::InvalidInput {
                field: field.wire_name(),
                reason: "derived from the amount".to_string(),
            });
        }
        if R::transfer_out_policy() == TransferOutPolicy::Recompute && Some(field) == R::transfer_out_field() {
            return Err(InvoiceError::InvalidInput {
                field: field.wire_name(),
                reason: "recomputed on save".to_string(),
            });
        }
        Ok(())
    }

    /// Appends a blank row prefilled from the common fields; returns its index
    pub fn add_row(&mut self) -> Result<usize, InvoiceError> {
        self.ensure_editable("add row")?;
        let mut record = R::blank();
        record.set_batch_id(self.batch_id.clone());
        for (field, value) in self.common.iter() {
            if !value.is_empty() {
                record.set(field, value.clone())?;
            }
        }
        self.records.push(record);
        self.row_edits.push(BTreeSet::new());
        self.clear_messages();
        Ok(self.records.len() - 1)
    }

    /// Removes a row from the working copy.
    ///
    /// Persisted rows are remembered and deleted by the next save; nothing is
    /// sent now.
    pub fn remove_row(&mut self, row: usize) -> Result<R, InvoiceError> {
        self.check_row(row)?;
        self.ensure_editable("remove row")?;
        let record = self.records.remove(row);
        self.row_edits.remove(row);
        if let RecordId::Persisted(id) = record.id() {
            self.removed_ids.push(id);
        }
        self.clear_messages();
        Ok(record)
    }

    fn clear_messages(&mut self) {
        self.report = ValidationReport::default();
        self.row_messages.clear();
        self.banner.clear();
    }

    /// The rows as they would be sent: shared fields merged in, missing fees
    /// filled, transfer-out settled.
    ///
    /// A shared field is written to a row when it had a common value at open
    /// time or was edited in the common form, unless the row overrode it.
    pub fn merged_records(&self) -> Result<Vec<R>, InvoiceError> {
        let recompute = R::transfer_out_policy() == TransferOutPolicy::Recompute;
        let transfer_out = R::transfer_out_field();
        let mut records = self.records.clone();

        for (row, record) in records.iter_mut().enumerate() {
            for (field, value) in self.common.iter() {
                if recompute && Some(field) == transfer_out {
                    continue;
                }
                if self.row_edits[row].contains(&field) {
                    continue;
                }
                if self.projected.contains(&field) || self.common_edits.contains(&field) {
                    record.set(field, value.clone())?;
                }
            }
        }

        fill_missing_fees(&mut records)?;

        if let (true, Some(field)) = (recompute, transfer_out) {
            let total = AmountText::from(transfer_out_total(&records)?);
            for record in &mut records {
                record.set(field, FieldValue::amount(total.clone()))?;
            }
        }

        Ok(records)
    }

    /// Validates the merged batch and, if it passes, moves to
    /// [`EditorState::Submitting`] and returns the request to send.
    pub fn begin_save(&mut self) -> Result<BulkUpsertRequest<R>, InvoiceError> {
        match self.state {
            EditorState::Submitting => return Err(InvoiceError::SaveInProgress),
            s if s.accepts_edits() => {}
            s => return Err(InvoiceError::invalid_state("save", s.as_str())),
        }

        self.state = EditorState::Validating;
        self.clear_messages();

        let merged = match self.merged_records() {
            Ok(records) => records,
            Err(e) => {
                warn!(batch = %self.batch_id, error = %e, "Batch cannot be merged");
                self.banner = vec![e.to_string()];
                self.state = EditorState::Editing;
                return Err(e);
            }
        };

        let report = validate_rows(&merged, |row, field| self.was_edited(row, field));
        if !report.is_valid() {
            warn!(batch = %self.batch_id, errors = report.errors.len(), "Batch failed local validation");
            self.report = report.clone();
            self.state = EditorState::Error;
            return Err(InvoiceError::Invalid(report));
        }

        self.state = EditorState::Submitting;
        Ok(BulkUpsertRequest {
            records: merged,
            removed_ids: self.removed_ids.clone(),
        })
    }

    /// Applies the backend's answer to a save started by [`Self::begin_save`].
    ///
    /// Answers for another ticket, or arriving when no save is in flight,
    /// are ignored.
    pub fn finish_save(&mut self, ticket: EditTicket, result: Result<Vec<R>, PortError>) -> SaveOutcome<R> {
        if ticket != self.ticket || self.state != EditorState::Submitting {
            debug!(%ticket, state = %self.state, "Ignoring stale save response");
            return SaveOutcome::Stale;
        }
        match result {
            Ok(records) => {
                self.state = EditorState::Saved;
                SaveOutcome::Saved { records }
            }
            Err(error) => {
                let (row_messages, banner) = interpret_failure::<R>(self.records.len(), &error);
                self.row_messages = row_messages.clone();
                self.banner = banner.clone();
                self.state = EditorState::SubmitError;
                SaveOutcome::Rejected { row_messages, banner }
            }
        }
    }

    /// Discards the session; late save responses become stale
    pub fn close(&mut self) {
        self.state = EditorState::Idle;
    }
}
