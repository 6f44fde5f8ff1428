//! Transaction history display formatting

use crate::models::TransactionRecord;

/// Format transaction records as a register
pub fn format_transaction_list(records: &[TransactionRecord], symbol: &str) -> String {
    if records.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:10}  {:<7}  {:>12}  {:<16}  {}\n",
        "ID", "Date", "Kind", "Amount", "Category", "Source"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for record in records {
        output.push_str(&format!(
            "{:<12}  {}  {:<7}  {:>12}  {:<16}  {}\n",
            record.id.short(),
            record.date.format("%Y-%m-%d"),
            record.kind,
            record.amount.format_with_symbol(symbol),
            record.category.as_deref().unwrap_or("-"),
            record.source.as_deref().unwrap_or("-"),
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, TransactionKind};
    use chrono::Utc;

    #[test]
    fn test_format_transaction_list() {
        let now = Utc::now();
        let mut record =
            TransactionRecord::new("u".into(), TransactionKind::Expense, Money::from_cents(1250), now, now);
        record.category = Some("groceries".into());

        let output = format_transaction_list(&[record], "$");
        assert!(output.contains("expense"));
        assert!(output.contains("$12.50"));
        assert!(output.contains("groceries"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_transaction_list(&[], "$"), "No transactions found.\n");
    }
}
