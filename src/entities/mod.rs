// Entity Models - Appointments, invoices, expenses and read-only catalogs
//
// Identity: `id` is assigned by the store and never changes.
// Values: every other field, replaced wholesale on update.

pub mod appointment;
pub mod expense;
pub mod invoice;
pub mod notification;
pub mod service;

pub use appointment::{Appointment, AppointmentStatus, NewAppointment};
pub use expense::{Expense, ExpenseCategory, NewExpense};
pub use invoice::{Invoice, PaymentStatus};
pub use notification::{Notification, NotificationType};
pub use service::Service;

/// Badge color for a status, independent of any rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Blue,
    Green,
    Red,
    Yellow,
    Gray,
}

/// Records that live in a store collection keyed by `id`
pub trait Identified {
    /// Human name of the collection element, used in error messages
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Render a currency amount the way the clinic prints it: `R$ 120.00`
pub fn format_brl(amount: f64) -> String {
    format!("R$ {:.2}", amount)
}
