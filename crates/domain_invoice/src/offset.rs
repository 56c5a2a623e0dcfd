//! Offset (đối ứng) invoices
//!
//! Settlement counter-transactions against partners. The backend lists them
//! flat; batches are formed on the client. The fee (`tong_phi`) is entered,
//! not derived, and there is no transfer-out amount.

use chrono::{DateTime, Utc};
use core_kernel::temporal::wire_timestamp;
use core_kernel::{AmountText, BatchId, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;
use crate::filter::OffsetFilter;
use crate::field::{loose, record_fields, FieldValue};
use crate::record::{Check, FieldRule, InvoiceFamily, InvoiceRecord, RuleScope, TransferOutPolicy};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetInvoice {
    #[serde(default, skip_serializing_if = "RecordId::is_new")]
    pub id: RecordId,
    #[serde(rename = "nha_cung_cap", default, deserialize_with = "loose::option")]
    pub provider: Option<String>,
    #[serde(rename = "ten_khach_hang", default, deserialize_with = "loose::option")]
    pub customer_name: Option<String>,
    #[serde(rename = "ma_khach_hang", default, deserialize_with = "loose::option")]
    pub customer_code: Option<String>,
    #[serde(rename = "dia_chi", default, deserialize_with = "loose::option")]
    pub address: Option<String>,
    #[serde(rename = "ky_thanh_toan", default, deserialize_with = "loose::option")]
    pub billing_period: Option<String>,
    #[serde(rename = "so_tien", default)]
    pub amount: AmountText,
    #[serde(rename = "ma_giao_dich", default, deserialize_with = "loose::option")]
    pub transaction_code: Option<String>,
    #[serde(rename = "thoi_gian", default, with = "wire_timestamp")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(rename = "tai_khoan_the", default, deserialize_with = "loose::option")]
    pub card_account: Option<String>,
    #[serde(rename = "tong_phi", default)]
    pub total_fee: AmountText,
    #[serde(rename = "trang_thai", default, deserialize_with = "loose::option")]
    pub state: Option<String>,
    #[serde(rename = "nguoi_gui", default, deserialize_with = "loose::option")]
    pub sender: Option<String>,
    #[serde(default)]
    pub batch_id: BatchId,
    #[serde(rename = "update_at", default, with = "wire_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "phi_phan_tram", default, deserialize_with = "loose::option")]
    pub fee_percentage: Option<String>,
    #[serde(rename = "doi_tac", default, deserialize_with = "loose::option")]
    pub partner: Option<String>,
    #[serde(rename = "key_redis", default, deserialize_with = "loose::option")]
    pub redis_key: Option<String>,
}

record_fields! {
    OffsetInvoice => OffsetField {
        Provider => provider, "nha_cung_cap", "Nhà cung cấp";
        CustomerName => customer_name, "ten_khach_hang", "Tên khách";
        CustomerCode => customer_code, "ma_khach_hang", "Mã khách";
        Address => address, "dia_chi", "Địa chỉ";
        BillingPeriod => billing_period, "ky_thanh_toan", "Kỳ thanh toán";
        Amount => amount, "so_tien", "Số tiền";
        TransactionCode => transaction_code, "ma_giao_dich", "Mã giao dịch";
        SentAt => sent_at, "thoi_gian", "Thời gian";
        CardAccount => card_account, "tai_khoan_the", "Tài khoản thẻ";
        TotalFee => total_fee, "tong_phi", "Tổng phí";
        State => state, "trang_thai", "Trạng thái";
        Sender => sender, "nguoi_gui", "Người gửi";
        BatchId => batch_id, "batch_id", "Batch ID";
        UpdatedAt => updated_at, "update_at", "Cập nhật";
        FeePercentage => fee_percentage, "phi_phan_tram", "Phí %";
        Partner => partner, "doi_tac", "Đối tác";
        RedisKey => redis_key, "key_redis", "Key Redis";
    }
}

const SHARED: &[OffsetField] = &[
    OffsetField::Sender,
    OffsetField::CustomerName,
    OffsetField::CustomerCode,
    OffsetField::Partner,
    OffsetField::Provider,
    OffsetField::BillingPeriod,
    OffsetField::State,
    OffsetField::FeePercentage,
];

const RULES: &[FieldRule<OffsetField>] = &[
    FieldRule::new(OffsetField::TotalFee, Check::Numeric, RuleScope::AllRows),
    FieldRule::new(OffsetField::CustomerName, Check::Required, RuleScope::NewRows),
    FieldRule::new(OffsetField::CustomerCode, Check::Required, RuleScope::NewRows),
    FieldRule::new(OffsetField::Address, Check::Required, RuleScope::NewRows),
    FieldRule::new(OffsetField::SentAt, Check::Required, RuleScope::NewRows),
    FieldRule::new(OffsetField::TransactionCode, Check::Required, RuleScope::NewRows),
    FieldRule::new(OffsetField::BatchId, Check::Required, RuleScope::NewRows),
    FieldRule::new(OffsetField::Amount, Check::RequiredNumeric, RuleScope::NewRows),
];

const MASKED: &[OffsetField] = &[OffsetField::CardAccount];

impl InvoiceRecord for OffsetInvoice {
    type Field = OffsetField;
    type Filter = OffsetFilter;

    const FAMILY: InvoiceFamily = InvoiceFamily::Offset;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    fn set_batch_id(&mut self, batch_id: BatchId) {
        self.batch_id = batch_id;
    }

    fn get(&self, field: OffsetField) -> FieldValue {
        self.read_slot(field)
    }

    fn set(&mut self, field: OffsetField, value: FieldValue) -> Result<(), InvoiceError> {
        self.write_slot(field, value)
    }

    fn set_input(&mut self, field: OffsetField, raw: &str) -> Result<(), InvoiceError> {
        self.write_slot_input(field, raw)
    }

    fn gross_amount(&self) -> &AmountText {
        &self.amount
    }

    fn fee(&self) -> &AmountText {
        &self.total_fee
    }

    fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    fn phone(&self) -> Option<&str> {
        None
    }

    fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    fn transaction_time(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    fn gross_field() -> OffsetField {
        OffsetField::Amount
    }

    fn fee_field() -> OffsetField {
        OffsetField::TotalFee
    }

    fn derives_fee() -> bool {
        false
    }

    fn transfer_out_field() -> Option<OffsetField> {
        None
    }

    fn transfer_out_policy() -> TransferOutPolicy {
        TransferOutPolicy::NotApplicable
    }

    fn shared_fields() -> &'static [OffsetField] {
        SHARED
    }

    fn row_rules() -> &'static [FieldRule<OffsetField>] {
        RULES
    }

    fn masked_fields() -> &'static [OffsetField] {
        MASKED
    }
}
