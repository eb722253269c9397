use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized row of the transaction report.
///
/// Built once at ingestion and never mutated afterwards. Missing cells in
/// the source report become empty strings so that no row can drop out of
/// the aggregates; `kind` and `status` are lowercased and trimmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub legal_name: String,
    pub brand_name: String,
    pub acquirer: String,
    pub currency: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub psp_buy_fee: Decimal,
    pub kind: String,
    pub status: String,
}

/// Operation type selector, wire codes 1-4.
///
/// Each variant carries its admission rule: the report marks a purchase
/// as settled under several statuses, while refunds, chargebacks and
/// payouts only count when their status is "success".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Purchase,
    Refund,
    Chargeback,
    Payout,
}

impl OperationType {
    pub const ALL: [OperationType; 4] = [
        OperationType::Purchase,
        OperationType::Refund,
        OperationType::Chargeback,
        OperationType::Payout,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(OperationType::Purchase),
            2 => Some(OperationType::Refund),
            3 => Some(OperationType::Chargeback),
            4 => Some(OperationType::Payout),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            OperationType::Purchase => 1,
            OperationType::Refund => 2,
            OperationType::Chargeback => 3,
            OperationType::Payout => 4,
        }
    }

    /// Label used by the summary endpoint.
    pub fn label(self) -> &'static str {
        match self {
            OperationType::Purchase => "Purchase (paid/refunded/chargedback)",
            OperationType::Refund => "Refund (success)",
            OperationType::Chargeback => "Chargeback (success)",
            OperationType::Payout => "Payout (success)",
        }
    }

    /// Whether a record counts towards this operation type.
    pub fn matches(self, record: &TransactionRecord) -> bool {
        match self {
            OperationType::Purchase => {
                record.kind == "purchase"
                    && matches!(record.status.as_str(), "paid" | "refunded" | "chargedback")
            }
            OperationType::Refund => record.kind == "refund" && record.status == "success",
            OperationType::Chargeback => record.kind == "chargeback" && record.status == "success",
            OperationType::Payout => record.kind == "payout" && record.status == "success",
        }
    }
}

/// Pivot hierarchy selector, wire codes 1-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    /// Acquirer -> Legal name -> Currency
    ByAcquirer,
    /// Legal name -> Acquirer -> Currency
    ByMerchant,
}

impl ViewType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(ViewType::ByAcquirer),
            2 => Some(ViewType::ByMerchant),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ViewType::ByAcquirer => 1,
            ViewType::ByMerchant => 2,
        }
    }

    /// Grouping keys of a record in this view's order, leaf last.
    pub fn key_path<'a>(self, record: &'a TransactionRecord) -> [&'a str; 3] {
        match self {
            ViewType::ByAcquirer => [&record.acquirer, &record.legal_name, &record.currency],
            ViewType::ByMerchant => [&record.legal_name, &record.acquirer, &record.currency],
        }
    }
}

/// Accumulated measures of a bucket or of a whole result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub amount: Decimal,
    pub fee: Decimal,
    pub psp_buy_fee: Decimal,
    pub count: u64,
}

impl Totals {
    pub fn add_record(&mut self, record: &TransactionRecord) {
        self.amount += record.amount;
        self.fee += record.fee;
        self.psp_buy_fee += record.psp_buy_fee;
        self.count += 1;
    }

    /// Copy with monetary fields rounded to 2 decimal places, applied at
    /// the response boundary only.
    pub fn rounded(self) -> Self {
        Self {
            amount: self.amount.round_dp(2),
            fee: self.fee.round_dp(2),
            psp_buy_fee: self.psp_buy_fee.round_dp(2),
            count: self.count,
        }
    }
}

/// One node of the pivot tree. The shape is identical at every level;
/// currency leaves have no children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateBucket {
    pub key: String,
    pub subtotals: Totals,
    pub children: Vec<AggregateBucket>,
}

impl AggregateBucket {
    fn rounded(self) -> Self {
        Self {
            key: self.key,
            subtotals: self.subtotals.rounded(),
            children: self.children.into_iter().map(AggregateBucket::rounded).collect(),
        }
    }
}

/// Pivot tree plus grand total, as computed by the aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotData {
    pub groups: Vec<AggregateBucket>,
    pub totals: Totals,
}

impl PivotData {
    pub fn rounded(self) -> Self {
        Self {
            groups: self.groups.into_iter().map(AggregateBucket::rounded).collect(),
            totals: self.totals.rounded(),
        }
    }
}

/// Body of the pivot endpoint: the resolved query echoed back plus the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotResponse {
    pub operation_type: u8,
    pub view_type: u8,
    pub currency_filter: Option<String>,
    pub data: PivotData,
}

/// One line of the dashboard summary, emitted only for operation types
/// with at least one matching record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub operation_type: u8,
    pub name: String,
    pub count: u64,
    pub total_amount: Decimal,
    pub total_fee: Decimal,
    pub total_psp_buy_fee: Decimal,
}

impl SummaryEntry {
    pub fn rounded(self) -> Self {
        Self {
            total_amount: self.total_amount.round_dp(2),
            total_fee: self.total_fee.round_dp(2),
            total_psp_buy_fee: self.total_psp_buy_fee.round_dp(2),
            ..self
        }
    }
}

/// Count of records per (kind, status) pair, reported after an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeStatusCount {
    pub kind: String,
    pub status: String,
    pub count: u64,
}
