// Caramelo Clinic - Core Library
// Appointment, invoice and expense state for a therapy practice,
// plus WhatsApp message templates. Used by the dashboard binary and tests.

pub mod entities;
pub mod error;
pub mod store;
pub mod seed;
pub mod stats;
pub mod appointments;
pub mod financial;
pub mod whatsapp;
pub mod session;
pub mod config;
pub mod export;
pub mod logger;

// Re-export commonly used types
pub use entities::{
    Appointment, AppointmentStatus, BadgeColor, Expense, ExpenseCategory, Invoice,
    NewAppointment, NewExpense, Notification, NotificationType, PaymentStatus, Service,
    format_brl,
};
pub use error::{ClinicError, ClinicResult};
pub use store::{AppointmentCommands, ClinicStore, FinancialCommands};
pub use stats::DashboardStats;
pub use appointments::{filter_by_date, AppointmentAction, AppointmentBoard, AppointmentDraft};
pub use financial::{
    group_by_category, parse_amount, CategoryGroup, ExpenseDraft, FinancialBoard, FinancialTab,
    Overview,
};
pub use whatsapp::{
    deep_link, phone, templates, BusinessApi, BusinessApiConfig, Messenger, OutboundMessage,
    Outbox, Recipient, SystemOpener, WhatsApp,
};
pub use session::{ClientDashboard, Role, Session, SessionState, Tab, TherapistDashboard};
pub use config::{ClinicConfig, LogConfig};
pub use export::{export_ledger, write_ledger};
