// 🌱 Seed data - the demo clinic every session starts from
//
// Ids here are literal ("1", "2", ...); ids created at runtime are UUIDs.

use chrono::{NaiveDate, NaiveTime};

use crate::entities::{
    Appointment, AppointmentStatus, Expense, ExpenseCategory, Invoice, Notification,
    NotificationType, PaymentStatus, Service,
};
use crate::store::ClinicStore;

/// Store pre-loaded with the demo appointments, invoices, expenses and catalogs
pub fn seeded_store() -> ClinicStore {
    ClinicStore::with_collections(
        appointments(),
        invoices(),
        expenses(),
        services(),
        notifications(),
    )
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    // literal calendar dates below are all valid
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

pub fn services() -> Vec<Service> {
    let entries = [
        ("1", "Fisioterapia Neurológica", 60, 120.0, "Tratamento especializado em neurologia"),
        ("2", "Terapia Ocupacional", 45, 100.0, "Reabilitação ocupacional"),
        ("3", "Fonoaudiologia", 50, 110.0, "Tratamento da comunicação"),
        ("4", "Psicomotricidade", 45, 95.0, "Desenvolvimento psicomotor"),
    ];

    entries
        .into_iter()
        .map(|(id, name, duration, price, description)| Service {
            id: id.to_string(),
            name: name.to_string(),
            duration_minutes: duration,
            price,
            description: Some(description.to_string()),
            active: true,
        })
        .collect()
}

pub fn appointments() -> Vec<Appointment> {
    let entries = [
        ("1", day(2024, 1, 15), at(9, 0), "Maria Silva", "1", "Fisioterapia Neurológica", AppointmentStatus::Scheduled, 120.0, Some("Primeira consulta")),
        ("2", day(2024, 1, 15), at(10, 30), "João Santos", "2", "Terapia Ocupacional", AppointmentStatus::Scheduled, 100.0, None),
        ("3", day(2024, 1, 16), at(14, 0), "Ana Costa", "3", "Fonoaudiologia", AppointmentStatus::Completed, 110.0, None),
        ("4", day(2024, 1, 17), at(16, 0), "Pedro Lima", "4", "Fisioterapia Neurológica", AppointmentStatus::Scheduled, 120.0, None),
    ];

    entries
        .into_iter()
        .map(|(id, date, time, client, client_id, service, status, price, notes)| Appointment {
            id: id.to_string(),
            date,
            time,
            client: client.to_string(),
            client_id: client_id.to_string(),
            service: service.to_string(),
            status,
            price,
            notes: notes.map(str::to_string),
            therapist_id: None,
        })
        .collect()
}

pub fn invoices() -> Vec<Invoice> {
    let entries = [
        ("1", day(2024, 1, 10), 120.0, PaymentStatus::Paid, "Consulta Fisioterapia", "1", day(2024, 1, 15)),
        ("2", day(2024, 1, 5), 100.0, PaymentStatus::Pending, "Terapia Ocupacional", "2", day(2024, 1, 20)),
        ("3", day(2023, 12, 28), 110.0, PaymentStatus::Overdue, "Fonoaudiologia", "3", day(2024, 1, 5)),
        ("4", day(2024, 1, 12), 120.0, PaymentStatus::Pending, "Fisioterapia Neurológica", "4", day(2024, 1, 25)),
    ];

    entries
        .into_iter()
        .map(|(id, date, amount, status, description, client_id, due_date)| Invoice {
            id: id.to_string(),
            date,
            amount,
            status,
            description: description.to_string(),
            client_id: client_id.to_string(),
            appointment_id: None,
            due_date,
        })
        .collect()
}

pub fn expenses() -> Vec<Expense> {
    let entries = [
        ("1", "Aluguel da Clínica", 2500.0, ExpenseCategory::Rent, day(2024, 1, 1), day(2024, 1, 15), PaymentStatus::Pending, true),
        ("2", "Energia Elétrica", 350.0, ExpenseCategory::Utilities, day(2024, 1, 1), day(2024, 1, 20), PaymentStatus::Pending, true),
        ("3", "Material Terapêutico", 800.0, ExpenseCategory::Supplies, day(2024, 1, 10), day(2024, 1, 10), PaymentStatus::Paid, false),
        ("4", "Equipamento Fisioterapia", 1200.0, ExpenseCategory::Equipment, day(2024, 1, 5), day(2024, 1, 30), PaymentStatus::Pending, false),
    ];

    entries
        .into_iter()
        .map(|(id, description, amount, category, date, due_date, status, recurring)| Expense {
            id: id.to_string(),
            description: description.to_string(),
            amount,
            category,
            date,
            due_date,
            status,
            recurring,
        })
        .collect()
}

pub fn notifications() -> Vec<Notification> {
    let entries = [
        ("1", "Consulta agendada para amanhã às 09:00", NotificationType::Appointment, false, day(2024, 1, 14), "1"),
        ("2", "Fatura vencendo em 3 dias", NotificationType::Payment, false, day(2024, 1, 12), "1"),
        ("3", "Lembrete: Consulta em 1 hora", NotificationType::Reminder, true, day(2024, 1, 14), "1"),
        ("4", "Nova consulta agendada por Maria Silva", NotificationType::Appointment, false, day(2024, 1, 14), "therapist"),
    ];

    entries
        .into_iter()
        .map(|(id, message, kind, read, date, user_id)| Notification {
            id: id.to_string(),
            message: message.to_string(),
            kind,
            read,
            date,
            user_id: user_id.to_string(),
            action_url: None,
        })
        .collect()
}
