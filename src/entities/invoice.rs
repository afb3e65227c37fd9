// 🧾 Invoice Entity - a billable charge with a payment lifecycle
//
// Invoices only exist in seed data; nothing in the library creates them.
// Status moves only through `FinancialCommands::update_invoice`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BadgeColor, Identified};

// ============================================================================
// PAYMENT STATUS (shared by invoices and expenses)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,

    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Pago",
            PaymentStatus::Pending => "Pendente",
            PaymentStatus::Overdue => "Vencido",
            PaymentStatus::Unknown => "Desconhecido",
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            PaymentStatus::Paid => BadgeColor::Green,
            PaymentStatus::Pending => BadgeColor::Yellow,
            PaymentStatus::Overdue => BadgeColor::Red,
            PaymentStatus::Unknown => BadgeColor::Gray,
        }
    }

    /// Money still owed (pending or overdue)
    pub fn is_open(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Overdue)
    }
}

// ============================================================================
// INVOICE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,

    /// Date issued
    pub date: NaiveDate,

    pub amount: f64,
    pub status: PaymentStatus,
    pub description: String,
    pub client_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,

    pub due_date: NaiveDate,
}

impl Identified for Invoice {
    const KIND: &'static str = "Invoice";

    fn id(&self) -> &str {
        &self.id
    }
}
