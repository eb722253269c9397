use models::{OperationType, SummaryEntry, Totals};

use crate::dataset::Dataset;

/// Flat per-operation-type totals over the whole dataset.
///
/// Entries come out in code order (1-4); operation types with no
/// matching record are omitted.
pub fn summarize(dataset: &Dataset) -> Vec<SummaryEntry> {
    OperationType::ALL
        .iter()
        .filter_map(|&op| {
            let mut totals = Totals::default();
            for record in dataset.filtered(op, None) {
                totals.add_record(record);
            }
            if totals.count == 0 {
                return None;
            }
            Some(SummaryEntry {
                operation_type: op.code(),
                name: op.label().to_owned(),
                count: totals.count,
                total_amount: totals.amount,
                total_fee: totals.fee,
                total_psp_buy_fee: totals.psp_buy_fee,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::TransactionRecord;
    use rust_decimal_macros::dec;

    fn record(kind: &str, status: &str, amount: &str) -> TransactionRecord {
        TransactionRecord {
            legal_name: "Merchant X".into(),
            brand_name: String::new(),
            acquirer: "Acquirer A".into(),
            currency: "EUR".into(),
            amount: amount.parse().unwrap(),
            fee: dec!(0.10),
            psp_buy_fee: dec!(0.05),
            kind: kind.into(),
            status: status.into(),
        }
    }

    #[test]
    fn test_summary_sums_per_operation_type() {
        let ds = Dataset::new(
            "report.xlsx",
            vec![
                record("purchase", "paid", "100.00"),
                record("purchase", "refunded", "25.50"),
                record("refund", "success", "25.50"),
            ],
        );

        let summaries = summarize(&ds);
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].operation_type, 1);
        assert_eq!(summaries[0].name, "Purchase (paid/refunded/chargedback)");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].total_amount, dec!(125.50));
        assert_eq!(summaries[0].total_fee, dec!(0.20));

        assert_eq!(summaries[1].operation_type, 2);
        assert_eq!(summaries[1].count, 1);
        assert_eq!(summaries[1].total_amount, dec!(25.50));
    }

    #[test]
    fn test_empty_operation_types_omitted() {
        let ds = Dataset::new("report.xlsx", vec![record("payout", "success", "10.00")]);
        let summaries = summarize(&ds);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].operation_type, 4);
        assert_eq!(summaries[0].name, "Payout (success)");
    }

    #[test]
    fn test_records_failing_status_rule_do_not_count() {
        let ds = Dataset::new(
            "report.xlsx",
            vec![
                record("purchase", "pending", "10.00"),
                record("refund", "failed", "10.00"),
            ],
        );
        assert!(summarize(&ds).is_empty());
    }
}
