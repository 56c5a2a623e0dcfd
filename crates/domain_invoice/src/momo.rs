//! MoMo invoices
//!
//! Bill payments made through the MoMo wallet. `so_tien` is the gross amount,
//! `phi_cong_ty_thu` the company fee derived from it, and the batch's
//! transfer-out (`ck_ra`) is always recomputed from the rows on save.

use chrono::{DateTime, Utc};
use core_kernel::temporal::wire_timestamp;
use core_kernel::{AmountText, BatchId, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;
use crate::filter::MomoFilter;
use crate::field::{loose, record_fields, FieldValue, StatusFlag};
use crate::record::{Check, FieldRule, InvoiceFamily, InvoiceRecord, RuleScope, TransferOutPolicy};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomoInvoice {
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
    #[serde(default, with = "wire_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "tai_khoan_the", default, deserialize_with = "loose::option")]
    pub card_account: Option<String>,
    #[serde(rename = "trang_thai", default, deserialize_with = "loose::option")]
    pub state: Option<String>,
    #[serde(rename = "nguoi_gui", default, deserialize_with = "loose::option")]
    pub sender: Option<String>,
    #[serde(default)]
    pub batch_id: BatchId,
    #[serde(rename = "update_at", default, with = "wire_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "ten_zalo", default, deserialize_with = "loose::option")]
    pub zalo_name: Option<String>,
    #[serde(rename = "phi_cong_ty_thu", default)]
    pub company_fee: AmountText,
    #[serde(rename = "ck_vao", default)]
    pub transfer_in: AmountText,
    #[serde(rename = "ck_ra", default)]
    pub transfer_out: AmountText,
    #[serde(rename = "ma_chuyen_khoan", default, deserialize_with = "loose::option")]
    pub transfer_code: Option<String>,
    #[serde(rename = "so_tk", default, deserialize_with = "loose::option")]
    pub account_number: Option<String>,
    #[serde(rename = "is_send_or_recieve", default, deserialize_with = "loose::option")]
    pub sent_or_received: Option<StatusFlag>,
    #[serde(default, deserialize_with = "loose::option")]
    pub note: Option<String>,
}

record_fields! {
    MomoInvoice => MomoField {
        Provider => provider, "nha_cung_cap", "Nhà cung cấp";
        CustomerName => customer_name, "ten_khach_hang", "Tên KH";
        CustomerCode => customer_code, "ma_khach_hang", "Mã KH";
        Address => address, "dia_chi", "Địa chỉ";
        BillingPeriod => billing_period, "ky_thanh_toan", "Kỳ thanh toán";
        Amount => amount, "so_tien", "Số tiền";
        TransactionCode => transaction_code, "ma_giao_dich", "Mã giao dịch";
        SentAt => sent_at, "thoi_gian", "Thời gian";
        CreatedAt => created_at, "created_at", "Ngày tạo";
        CardAccount => card_account, "tai_khoan_the", "Tài khoản thẻ";
        State => state, "trang_thai", "Trạng thái";
        Sender => sender, "nguoi_gui", "Người gửi";
        BatchId => batch_id, "batch_id", "Batch ID";
        UpdatedAt => updated_at, "update_at", "Cập nhật";
        ZaloName => zalo_name, "ten_zalo", "Tên Zalo";
        CompanyFee => company_fee, "phi_cong_ty_thu", "Phí công ty thu";
        TransferIn => transfer_in, "ck_vao", "CK vào";
        TransferOut => transfer_out, "ck_ra", "CK ra";
        TransferCode => transfer_code, "ma_chuyen_khoan", "Mã chuyển khoản";
        AccountNumber => account_number, "so_tk", "Số TK";
        SentOrReceived => sent_or_received, "is_send_or_recieve", "Đã gửi/nhận";
        Note => note, "note", "Ghi chú";
    }
}

const SHARED: &[MomoField] = &[
    MomoField::TransferOut,
    MomoField::TransferIn,
    MomoField::AccountNumber,
    MomoField::Note,
    MomoField::ZaloName,
    MomoField::SentOrReceived,
    MomoField::BatchId,
    MomoField::SentAt,
];

const RULES: &[FieldRule<MomoField>] = &[
    FieldRule::new(MomoField::TransferIn, Check::Numeric, RuleScope::AllRows),
    FieldRule::new(MomoField::TransferOut, Check::Numeric, RuleScope::AllRows),
    FieldRule::new(MomoField::CustomerName, Check::Required, RuleScope::NewRows),
    FieldRule::new(MomoField::CustomerCode, Check::Required, RuleScope::NewRows),
    FieldRule::new(MomoField::Address, Check::Required, RuleScope::NewRows),
    FieldRule::new(MomoField::SentAt, Check::Required, RuleScope::NewRows),
    FieldRule::new(MomoField::TransactionCode, Check::Required, RuleScope::NewRows),
    FieldRule::new(MomoField::BatchId, Check::Required, RuleScope::NewRows),
    FieldRule::new(MomoField::Amount, Check::RequiredNumeric, RuleScope::NewRows),
];

const MASKED: &[MomoField] = &[MomoField::CardAccount, MomoField::AccountNumber];

impl InvoiceRecord for MomoInvoice {
    type Field = MomoField;
    type Filter = MomoFilter;

    const FAMILY: InvoiceFamily = InvoiceFamily::Momo;

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

    fn get(&self, field: MomoField) -> FieldValue {
        self.read_slot(field)
    }

    fn set(&mut self, field: MomoField, value: FieldValue) -> Result<(), InvoiceError> {
        self.write_slot(field, value)
    }

    fn set_input(&mut self, field: MomoField, raw: &str) -> Result<(), InvoiceError> {
        self.write_slot_input(field, raw)
    }

    fn gross_amount(&self) -> &AmountText {
        &self.amount
    }

    fn fee(&self) -> &AmountText {
        &self.company_fee
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

    fn gross_field() -> MomoField {
        MomoField::Amount
    }

    fn fee_field() -> MomoField {
        MomoField::CompanyFee
    }

    fn derives_fee() -> bool {
        true
    }

    fn transfer_out_field() -> Option<MomoField> {
        Some(MomoField::TransferOut)
    }

    fn transfer_out_policy() -> TransferOutPolicy {
        TransferOutPolicy::Recompute
    }

    fn shared_fields() -> &'static [MomoField] {
        SHARED
    }

    fn row_rules() -> &'static [FieldRule<MomoField>] {
        RULES
    }

    fn masked_fields() -> &'static [MomoField] {
        MASKED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_flag_accepts_capitalized_wire_value() {
        let record: MomoInvoice =
            serde_json::from_str(r#"{"id": 1, "is_send_or_recieve": "False", "so_tien": "100000"}"#)
                .unwrap();
        assert_eq!(record.sent_or_received, Some(StatusFlag::False));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["is_send_or_recieve"], "false");
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_null_fee_reads_as_empty() {
        let record: MomoInvoice =
            serde_json::from_str(r#"{"so_tien": "200000", "phi_cong_ty_thu": null}"#).unwrap();
        assert!(record.company_fee.is_empty());
        assert!(record.get(MomoField::CompanyFee).is_empty());
    }
}
