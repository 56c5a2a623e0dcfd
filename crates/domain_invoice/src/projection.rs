//! Common-Field Projector
//!
//! Pre-fills the shared part of a batch edit form: a field gets a value only
//! when every record in the batch stores exactly that value.

use std::collections::BTreeMap;

use crate::field::{FieldKey, FieldValue};
use crate::record::InvoiceRecord;

static EMPTY: FieldValue = FieldValue::Empty;

/// Values of the batch-shared fields; [`FieldValue::Empty`] where records disagree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFields<F: FieldKey> {
    values: BTreeMap<F, FieldValue>,
}

impl<F: FieldKey> CommonFields<F> {
    pub fn empty(fields: &[F]) -> Self {
        Self {
            values: fields.iter().map(|f| (*f, FieldValue::Empty)).collect(),
        }
    }

    pub fn get(&self, field: F) -> &FieldValue {
        self.values.get(&field).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, field: F, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn has_value(&self, field: F) -> bool {
        !self.get(field).is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &FieldValue)> + '_ {
        self.values.iter().map(|(f, v)| (*f, v))
    }
}

/// Projects the given fields over a batch.
///
/// Comparison is strict equality on the stored value. An empty batch projects
/// every field to empty.
pub fn project_common<R: InvoiceRecord>(records: &[R], fields: &[R::Field]) -> CommonFields<R::Field> {
    let mut common = CommonFields::empty(fields);
    let Some((first, rest)) = records.split_first() else {
        return common;
    };
    for &field in fields {
        let candidate = first.get(field);
        if rest.iter().all(|r| r.get(field) == candidate) {
            common.set(field, candidate);
        }
    }
    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardField, CardInvoice};

    fn with_sender(sender: &str) -> CardInvoice {
        CardInvoice {
            sender: Some(sender.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_uniform_field_projects_value() {
        let records = vec![with_sender("lan"), with_sender("lan")];
        let common = project_common(&records, &[CardField::Sender]);
        assert_eq!(common.get(CardField::Sender), &FieldValue::text("lan"));
    }

    #[test]
    fn test_disagreeing_field_projects_empty() {
        let records = vec![with_sender("lan"), with_sender("minh")];
        let common = project_common(&records, &[CardField::Sender]);
        assert!(!common.has_value(CardField::Sender));
    }

    #[test]
    fn test_empty_batch_projects_empty_for_every_field() {
        let common = project_common::<CardInvoice>(&[], CardField::ALL);
        assert_eq!(common.fields().count(), CardField::ALL.len());
        assert!(common.iter().all(|(_, v)| v.is_empty()));
    }
}
