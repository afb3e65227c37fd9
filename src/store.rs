// 🗄️ Domain Store - in-memory collections for one session
//
// Four mutable collections (appointments, invoices, expenses) plus two
// read-only catalogs (services, notifications). Nothing is persisted.
//
// View-models never see `ClinicStore` directly: they get read slices and one
// of the command traits below.

use tracing::{info, warn};

use crate::entities::{
    Appointment, Expense, Identified, Invoice, NewAppointment, NewExpense, Notification, Service,
};
use crate::error::{ClinicError, ClinicResult};

// ============================================================================
// COMMAND TRAITS
// ============================================================================

/// Mutations the appointment board may perform
pub trait AppointmentCommands {
    /// Append a new appointment with a fresh id and status `scheduled`; returns the id
    fn create_appointment(&mut self, data: NewAppointment) -> String;

    /// Replace the appointment with `record.id`; `NotFound` leaves the collection untouched
    fn update_appointment(&mut self, record: Appointment) -> ClinicResult<()>;

    /// Remove the appointment with `id` and return it; `NotFound` leaves the collection untouched
    fn delete_appointment(&mut self, id: &str) -> ClinicResult<Appointment>;
}

/// Mutations the financial board may perform
pub trait FinancialCommands {
    fn update_invoice(&mut self, record: Invoice) -> ClinicResult<()>;

    /// Append a new expense with a fresh id and status `pending`; returns the id
    fn create_expense(&mut self, data: NewExpense) -> String;

    fn update_expense(&mut self, record: Expense) -> ClinicResult<()>;
}

// ============================================================================
// CLINIC STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ClinicStore {
    appointments: Vec<Appointment>,
    invoices: Vec<Invoice>,
    expenses: Vec<Expense>,
    services: Vec<Service>,
    notifications: Vec<Notification>,
}

impl ClinicStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with the given collections (seed data)
    pub fn with_collections(
        appointments: Vec<Appointment>,
        invoices: Vec<Invoice>,
        expenses: Vec<Expense>,
        services: Vec<Service>,
        notifications: Vec<Notification>,
    ) -> Self {
        ClinicStore {
            appointments,
            invoices,
            expenses,
            services,
            notifications,
        }
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn find_appointment(&self, id: &str) -> Option<&Appointment> {
        find_by_id(&self.appointments, id)
    }

    pub fn find_invoice(&self, id: &str) -> Option<&Invoice> {
        find_by_id(&self.invoices, id)
    }

    pub fn find_expense(&self, id: &str) -> Option<&Expense> {
        find_by_id(&self.expenses, id)
    }

    /// Fresh identifier, unique within `items`
    fn next_id<T: Identified>(items: &[T]) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if find_by_id(items, &id).is_none() {
                return id;
            }
        }
    }
}

impl AppointmentCommands for ClinicStore {
    fn create_appointment(&mut self, data: NewAppointment) -> String {
        let id = Self::next_id(&self.appointments);
        let appointment = data.into_appointment(id.clone());

        info!(
            id = %appointment.id,
            date = %appointment.date,
            client = %appointment.client,
            "appointment created"
        );
        self.appointments.push(appointment);
        id
    }

    fn update_appointment(&mut self, record: Appointment) -> ClinicResult<()> {
        let id = record.id.clone();
        replace_by_id(&mut self.appointments, record)?;
        info!(id = %id, "appointment updated");
        Ok(())
    }

    fn delete_appointment(&mut self, id: &str) -> ClinicResult<Appointment> {
        let Some(position) = self.appointments.iter().position(|a| a.id == id) else {
            warn!(id = %id, "delete of unknown appointment ignored");
            return Err(ClinicError::not_found(Appointment::KIND, id));
        };

        let removed = self.appointments.remove(position);
        info!(id = %id, "appointment deleted");
        Ok(removed)
    }
}

impl FinancialCommands for ClinicStore {
    fn update_invoice(&mut self, record: Invoice) -> ClinicResult<()> {
        let id = record.id.clone();
        let status = record.status;
        replace_by_id(&mut self.invoices, record)?;
        info!(id = %id, status = status.as_str(), "invoice updated");
        Ok(())
    }

    fn create_expense(&mut self, data: NewExpense) -> String {
        let id = Self::next_id(&self.expenses);
        let expense = data.into_expense(id.clone());

        info!(
            id = %expense.id,
            category = expense.category.as_str(),
            amount = expense.amount,
            "expense created"
        );
        self.expenses.push(expense);
        id
    }

    fn update_expense(&mut self, record: Expense) -> ClinicResult<()> {
        let id = record.id.clone();
        replace_by_id(&mut self.expenses, record)?;
        info!(id = %id, "expense updated");
        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn find_by_id<'a, T: Identified>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// Overwrite the element sharing `record`'s id, in place
fn replace_by_id<T: Identified>(items: &mut [T], record: T) -> ClinicResult<()> {
    match items.iter_mut().find(|item| item.id() == record.id()) {
        Some(slot) => {
            *slot = record;
            Ok(())
        }
        None => {
            warn!(kind = T::KIND, id = %record.id(), "update of unknown record ignored");
            Err(ClinicError::not_found(T::KIND, record.id()))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
