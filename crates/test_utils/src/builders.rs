//! Test Data Builders
//!
//! Builder patterns for invoice records and accounts. Tests set only the
//! fields they care about; everything else gets a plausible default.

use core_kernel::{AmountText, BatchId, RecordId, UserId};
use domain_access::{Role, User};
use domain_invoice::{CardInvoice, MomoInvoice, OffsetInvoice, TransactionType};

use crate::fixtures::{InvoiceFixtures, UserFixtures, REFERENCE_TIME};

/// Builder for card invoices
#[derive(Debug, Clone)]
pub struct CardInvoiceBuilder {
    record: CardInvoice,
}

impl Default for CardInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CardInvoiceBuilder {
    /// A new, unsaved card row that passes validation
    pub fn new() -> Self {
        Self {
            record: CardInvoice {
                sent_at: Some(*REFERENCE_TIME),
                sender: Some(InvoiceFixtures::sender().to_string()),
                customer_name: Some(InvoiceFixtures::customer().to_string()),
                phone: Some(InvoiceFixtures::phone().to_string()),
                transaction_type: Some(TransactionType::Dao),
                card_number: Some(InvoiceFixtures::card_number().to_string()),
                gross_amount: AmountText::new("1000000"),
                batch_id: InvoiceFixtures::batch_id(),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.record.id = RecordId::Persisted(id);
        self
    }

    pub fn in_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.record.batch_id = BatchId::new(batch_id);
        self
    }

    pub fn with_gross(mut self, amount: &str) -> Self {
        self.record.gross_amount = AmountText::new(amount);
        self
    }

    pub fn with_transfer_out(mut self, amount: &str) -> Self {
        self.record.transfer_out = AmountText::new(amount);
        self
    }

    pub fn with_customer(mut self, name: Option<&str>) -> Self {
        self.record.customer_name = name.map(str::to_string);
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.record.phone = Some(phone.to_string());
        self
    }

    pub fn with_card_number(mut self, number: &str) -> Self {
        self.record.card_number = Some(number.to_string());
        self
    }

    pub fn build(self) -> CardInvoice {
        self.record
    }
}

/// Builder for MoMo invoices
#[derive(Debug, Clone)]
pub struct MomoInvoiceBuilder {
    record: MomoInvoice,
}

impl Default for MomoInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MomoInvoiceBuilder {
    pub fn new() -> Self {
        Self {
            record: MomoInvoice {
                provider: Some("EVN Hà Nội".to_string()),
                customer_name: Some(InvoiceFixtures::customer().to_string()),
                customer_code: Some("PD0012345".to_string()),
                billing_period: Some("03/2024".to_string()),
                amount: AmountText::new("100000"),
                sent_at: Some(*REFERENCE_TIME),
                sender: Some(InvoiceFixtures::sender().to_string()),
                batch_id: InvoiceFixtures::batch_id(),
                zalo_name: Some("Zalo A".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.record.id = RecordId::Persisted(id);
        self
    }

    pub fn in_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.record.batch_id = BatchId::new(batch_id);
        self
    }

    pub fn with_amount(mut self, amount: &str) -> Self {
        self.record.amount = AmountText::new(amount);
        self
    }

    pub fn with_fee(mut self, fee: &str) -> Self {
        self.record.company_fee = AmountText::new(fee);
        self
    }

    pub fn with_transfer_out(mut self, amount: &str) -> Self {
        self.record.transfer_out = AmountText::new(amount);
        self
    }

    pub fn with_customer_code(mut self, code: &str) -> Self {
        self.record.customer_code = Some(code.to_string());
        self
    }

    pub fn with_sender(mut self, sender: Option<&str>) -> Self {
        self.record.sender = sender.map(str::to_string);
        self
    }

    pub fn build(self) -> MomoInvoice {
        self.record
    }
}

/// Builder for offset invoices
#[derive(Debug, Clone)]
pub struct OffsetInvoiceBuilder {
    record: OffsetInvoice,
}

impl Default for OffsetInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetInvoiceBuilder {
    pub fn new() -> Self {
        Self {
            record: OffsetInvoice {
                provider: Some("VNPT".to_string()),
                customer_name: Some(InvoiceFixtures::customer().to_string()),
                customer_code: Some("KH001".to_string()),
                amount: AmountText::new("500000"),
                total_fee: AmountText::new("5000"),
                sent_at: Some(*REFERENCE_TIME),
                sender: Some(InvoiceFixtures::sender().to_string()),
                batch_id: InvoiceFixtures::batch_id(),
                partner: Some("Đối tác X".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.record.id = RecordId::Persisted(id);
        self
    }

    pub fn in_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.record.batch_id = BatchId::new(batch_id);
        self
    }

    pub fn with_partner(mut self, partner: &str) -> Self {
        self.record.partner = Some(partner.to_string());
        self
    }

    pub fn build(self) -> OffsetInvoice {
        self.record
    }
}

/// Builder for accounts
#[derive(Debug, Clone)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    pub fn new(id: i64, username: &str) -> Self {
        Self {
            user: UserFixtures::with_role(id, username, Role::User),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.user.role = Some(role.as_str().to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.user.is_active = false;
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.user.id = UserId::new(id);
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}

/// `count` persisted MoMo rows of one batch, ids starting at `first_id`
pub fn momo_batch(batch_id: &str, first_id: i64, amounts: &[&str]) -> Vec<MomoInvoice> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            MomoInvoiceBuilder::new()
                .with_id(first_id + i as i64)
                .in_batch(batch_id)
                .with_amount(amount)
                .build()
        })
        .collect()
}
