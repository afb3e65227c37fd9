// 📤 Ledger export - invoices and expenses as one CSV

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{Expense, Invoice};
use crate::error::ClinicResult;

/// One CSV line; invoices leave `category` empty
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow<'a> {
    pub kind: &'static str,
    pub id: &'a str,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub description: &'a str,
    pub category: &'static str,
    pub amount: f64,
    pub status: &'static str,
}

impl<'a> From<&'a Invoice> for LedgerRow<'a> {
    fn from(invoice: &'a Invoice) -> Self {
        LedgerRow {
            kind: "invoice",
            id: &invoice.id,
            date: invoice.date,
            due_date: invoice.due_date,
            description: &invoice.description,
            category: "",
            amount: invoice.amount,
            status: invoice.status.as_str(),
        }
    }
}

impl<'a> From<&'a Expense> for LedgerRow<'a> {
    fn from(expense: &'a Expense) -> Self {
        LedgerRow {
            kind: "expense",
            id: &expense.id,
            date: expense.date,
            due_date: expense.due_date,
            description: &expense.description,
            category: expense.category.as_str(),
            amount: expense.amount,
            status: expense.status.as_str(),
        }
    }
}

/// Invoices first, then expenses, each in collection order. Returns rows written.
pub fn write_ledger<W: Write>(writer: W, invoices: &[Invoice], expenses: &[Expense]) -> ClinicResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for row in invoices
        .iter()
        .map(LedgerRow::from)
        .chain(expenses.iter().map(LedgerRow::from))
    {
        wtr.serialize(row)?;
        rows += 1;
    }

    wtr.flush()?;
    Ok(rows)
}

pub fn export_ledger(path: &Path, invoices: &[Invoice], expenses: &[Expense]) -> ClinicResult<usize> {
    let file = std::fs::File::create(path)?;
    write_ledger(file, invoices, expenses)
}
