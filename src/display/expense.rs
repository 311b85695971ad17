//! Expense display formatting

use crate::models::Expense;

use super::report::{format_amount, separator, truncate};

/// Format a single expense as a list row
pub fn format_expense_row(expense: &Expense, symbol: &str) -> String {
    format!(
        "{:12} {:10} {:16} {:10} {:>14}  {}",
        expense.id.short(),
        expense.date.format("%Y-%m-%d"),
        truncate(&expense.category, 16),
        truncate(&expense.payment_method, 10),
        format_amount(expense.amount, symbol),
        expense.note
    )
    .trim_end()
    .to_string()
}

/// Format a list of expenses with a header and a total line
pub fn format_expense_list(expenses: &[Expense], symbol: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12} {:10} {:16} {:10} {:>14}  {}\n",
        "ID", "Date", "Category", "Method", "Amount", "Note"
    ));
    output.push_str(&separator(80));
    output.push('\n');

    for expense in expenses {
        output.push_str(&format_expense_row(expense, symbol));
        output.push('\n');
    }

    let total: f64 = expenses.iter().map(|e| e.amount).sum();
    output.push_str(&separator(80));
    output.push('\n');
    output.push_str(&format!(
        "{} expense(s), total {}\n",
        expenses.len(),
        format_amount(total, symbol)
    ));
    output
}

/// Format expense details for display
pub fn format_expense_details(expense: &Expense, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id.short()));
    output.push_str(&format!("Full ID:     {}\n", expense.id.as_uuid()));
    output.push_str(&format!("Date:        {}\n", expense.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:      {}\n", format_amount(expense.amount, symbol)));
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!("Method:      {}\n", expense.payment_method));
    if !expense.note.is_empty() {
        output.push_str(&format!("Note:        {}\n", expense.note));
    }
    output.push_str(&format!(
        "Created:     {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M")
    ));
    if expense.updated_at != expense.created_at {
        output.push_str(&format!(
            "Updated:     {}\n",
            expense.updated_at.format("%Y-%m-%d %H:%M")
        ));
    }

    output
}
