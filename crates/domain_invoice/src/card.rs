//! Card invoices
//!
//! One row per POS bill. Rows created from one customer message share a
//! batch id; `tong_so_tien` is the gross amount and `phi_per_bill` the fee
//! derived from it.

use chrono::{DateTime, Utc};
use core_kernel::temporal::wire_timestamp;
use core_kernel::{AmountText, BatchId, RecordId};
use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;
use crate::filter::CardFilter;
use crate::field::{loose, record_fields, FieldValue, StatusFlag, TransactionType};
use crate::record::{Check, FieldRule, InvoiceFamily, InvoiceRecord, RuleScope, TransferOutPolicy};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInvoice {
    #[serde(default, skip_serializing_if = "RecordId::is_new")]
    pub id: RecordId,
    #[serde(rename = "thoi_gian", default, with = "wire_timestamp")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(rename = "nguoi_gui", default, deserialize_with = "loose::option")]
    pub sender: Option<String>,
    #[serde(rename = "ten_khach", default, deserialize_with = "loose::option")]
    pub customer_name: Option<String>,
    #[serde(rename = "so_dien_thoai", default, deserialize_with = "loose::option")]
    pub phone: Option<String>,
    #[serde(rename = "type_dao_rut", default, deserialize_with = "loose::option")]
    pub transaction_type: Option<TransactionType>,
    #[serde(rename = "ngan_hang", default, deserialize_with = "loose::option")]
    pub bank: Option<String>,
    #[serde(rename = "ngay_giao_dich", default, deserialize_with = "loose::option")]
    pub transaction_date: Option<String>,
    #[serde(rename = "gio_giao_dich", default, deserialize_with = "loose::option")]
    pub transaction_clock: Option<String>,
    #[serde(rename = "tong_so_tien", default)]
    pub gross_amount: AmountText,
    #[serde(rename = "so_the", default, deserialize_with = "loose::option")]
    pub card_number: Option<String>,
    #[serde(rename = "tid", default, deserialize_with = "loose::option")]
    pub terminal_id: Option<String>,
    #[serde(rename = "mid", default, deserialize_with = "loose::option")]
    pub merchant_id: Option<String>,
    #[serde(rename = "so_lo", default, deserialize_with = "loose::option")]
    pub lot_number: Option<String>,
    #[serde(rename = "so_hoa_don", default, deserialize_with = "loose::option")]
    pub invoice_number: Option<String>,
    #[serde(rename = "ten_may_pos", default, deserialize_with = "loose::option")]
    pub pos_name: Option<String>,
    #[serde(rename = "lich_canh_bao", default, deserialize_with = "loose::option")]
    pub alert_schedule: Option<String>,
    #[serde(rename = "tien_phi", default)]
    pub charged_fee: AmountText,
    #[serde(default)]
    pub batch_id: BatchId,
    #[serde(rename = "caption_goc", default, deserialize_with = "loose::option")]
    pub original_caption: Option<String>,
    #[serde(rename = "ck_ra", default)]
    pub transfer_out: AmountText,
    #[serde(rename = "ck_vao", default)]
    pub transfer_in: AmountText,
    #[serde(rename = "stk_khach", default, deserialize_with = "loose::option")]
    pub customer_account: Option<String>,
    #[serde(rename = "stk_cty", default, deserialize_with = "loose::option")]
    pub company_account: Option<String>,
    #[serde(rename = "tinh_trang", default, deserialize_with = "loose::option")]
    pub status: Option<StatusFlag>,
    #[serde(rename = "ly_do", default, deserialize_with = "loose::option")]
    pub reason: Option<String>,
    #[serde(rename = "dia_chi", default, deserialize_with = "loose::option")]
    pub address: Option<String>,
    #[serde(rename = "khach_moi", default, deserialize_with = "loose::flag")]
    pub new_customer: bool,
    #[serde(rename = "phan_tram_phi", default, deserialize_with = "loose::option")]
    pub fee_percentage: Option<String>,
    #[serde(rename = "key_redis", default, deserialize_with = "loose::option")]
    pub redis_key: Option<String>,
    #[serde(rename = "ma_chuyen_khoan", default, deserialize_with = "loose::option")]
    pub transfer_code: Option<String>,
    #[serde(rename = "lich_canh_bao_datetime", default, with = "wire_timestamp")]
    pub alert_at: Option<DateTime<Utc>>,
    #[serde(default, with = "wire_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "wire_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "phi_per_bill", default)]
    pub fee_per_bill: AmountText,
}

record_fields! {
    CardInvoice => CardField {
        SentAt => sent_at, "thoi_gian", "Thời gian";
        Sender => sender, "nguoi_gui", "Người gửi";
        CustomerName => customer_name, "ten_khach", "Tên khách";
        Phone => phone, "so_dien_thoai", "Số điện thoại";
        TransactionType => transaction_type, "type_dao_rut", "Đáo/Rút";
        Bank => bank, "ngan_hang", "Ngân hàng";
        TransactionDate => transaction_date, "ngay_giao_dich", "Ngày giao dịch";
        TransactionClock => transaction_clock, "gio_giao_dich", "Giờ giao dịch";
        GrossAmount => gross_amount, "tong_so_tien", "Tổng số tiền";
        CardNumber => card_number, "so_the", "Số thẻ";
        TerminalId => terminal_id, "tid", "TID";
        MerchantId => merchant_id, "mid", "MID";
        LotNumber => lot_number, "so_lo", "Số lô";
        InvoiceNumber => invoice_number, "so_hoa_don", "Số hóa đơn";
        PosName => pos_name, "ten_may_pos", "Tên máy POS";
        AlertSchedule => alert_schedule, "lich_canh_bao", "Lịch cảnh báo";
        ChargedFee => charged_fee, "tien_phi", "Tiền phí";
        BatchId => batch_id, "batch_id", "Batch ID";
        OriginalCaption => original_caption, "caption_goc", "Caption gốc";
        TransferOut => transfer_out, "ck_ra", "CK ra";
        TransferIn => transfer_in, "ck_vao", "CK vào";
        CustomerAccount => customer_account, "stk_khach", "STK khách";
        CompanyAccount => company_account, "stk_cty", "STK công ty";
        Status => status, "tinh_trang", "Tình trạng";
        Reason => reason, "ly_do", "Lý do";
        Address => address, "dia_chi", "Địa chỉ";
        NewCustomer => new_customer, "khach_moi", "Khách mới";
        FeePercentage => fee_percentage, "phan_tram_phi", "Phần trăm phí";
        RedisKey => redis_key, "key_redis", "Key Redis";
        TransferCode => transfer_code, "ma_chuyen_khoan", "Mã chuyển khoản";
        AlertAt => alert_at, "lich_canh_bao_datetime", "Thời điểm cảnh báo";
        CreatedAt => created_at, "created_at", "Ngày tạo";
        UpdatedAt => updated_at, "updated_at", "Ngày cập nhật";
        FeePerBill => fee_per_bill, "phi_per_bill", "Phí/bill";
    }
}

const SHARED: &[CardField] = &[
    CardField::Sender,
    CardField::CustomerName,
    CardField::Phone,
    CardField::TransactionType,
    CardField::RedisKey,
    CardField::TransferOut,
    CardField::TransferIn,
    CardField::CompanyAccount,
    CardField::CustomerAccount,
    CardField::OriginalCaption,
    CardField::Status,
    CardField::AlertAt,
    CardField::CreatedAt,
    CardField::FeePercentage,
];

const RULES: &[FieldRule<CardField>] = &[
    FieldRule::new(CardField::TransferOut, Check::RequiredNumeric, RuleScope::AllRows),
    FieldRule::new(CardField::TransferIn, Check::Numeric, RuleScope::AllRows),
    FieldRule::new(CardField::Phone, Check::RequiredNumeric, RuleScope::WhenEdited),
    FieldRule::new(CardField::GrossAmount, Check::RequiredNumeric, RuleScope::WhenEdited),
    FieldRule::new(CardField::FeePerBill, Check::Numeric, RuleScope::AllRows),
    FieldRule::new(CardField::CustomerName, Check::Required, RuleScope::NewRows),
    FieldRule::new(CardField::SentAt, Check::Required, RuleScope::NewRows),
    FieldRule::new(CardField::BatchId, Check::Required, RuleScope::NewRows),
    FieldRule::new(CardField::GrossAmount, Check::RequiredNumeric, RuleScope::NewRows),
];

const MASKED: &[CardField] = &[
    CardField::CardNumber,
    CardField::CustomerAccount,
    CardField::CompanyAccount,
];

impl InvoiceRecord for CardInvoice {
    type Field = CardField;
    type Filter = CardFilter;

    const FAMILY: InvoiceFamily = InvoiceFamily::Card;

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

    fn get(&self, field: CardField) -> FieldValue {
        self.read_slot(field)
    }

    fn set(&mut self, field: CardField, value: FieldValue) -> Result<(), InvoiceError> {
        self.write_slot(field, value)
    }

    fn set_input(&mut self, field: CardField, raw: &str) -> Result<(), InvoiceError> {
        self.write_slot_input(field, raw)
    }

    fn gross_amount(&self) -> &AmountText {
        &self.gross_amount
    }

    fn fee(&self) -> &AmountText {
        &self.fee_per_bill
    }

    fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    fn transaction_time(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    fn is_new_customer(&self) -> bool {
        self.new_customer
    }

    fn gross_field() -> CardField {
        CardField::GrossAmount
    }

    fn fee_field() -> CardField {
        CardField::FeePerBill
    }

    fn derives_fee() -> bool {
        true
    }

    fn transfer_out_field() -> Option<CardField> {
        Some(CardField::TransferOut)
    }

    fn transfer_out_policy() -> TransferOutPolicy {
        TransferOutPolicy::FromCommonField
    }

    fn shared_fields() -> &'static [CardField] {
        SHARED
    }

    fn row_rules() -> &'static [FieldRule<CardField>] {
        RULES
    }

    fn masked_fields() -> &'static [CardField] {
        MASKED
    }
}
