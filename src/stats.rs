// 📊 Dashboard statistics - derived from the live collections
//
// Rules:
// - today_appointments: dated today, not cancelled
// - today_revenue: price of today's completed appointments
// - active_clients: distinct client ids over non-cancelled appointments
// - pending_invoices: invoices pending or overdue
// - monthly_revenue: paid invoices issued in today's month
// - monthly_appointments: non-cancelled appointments in today's month

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entities::{Appointment, AppointmentStatus, Invoice, PaymentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_appointments: usize,
    pub today_revenue: f64,
    pub active_clients: usize,
    pub pending_invoices: usize,
    pub monthly_revenue: f64,
    pub monthly_appointments: usize,
}

impl DashboardStats {
    pub fn derive(appointments: &[Appointment], invoices: &[Invoice], today: NaiveDate) -> Self {
        let mut stats = DashboardStats::default();
        let mut clients: HashSet<&str> = HashSet::new();

        for appointment in appointments {
            if appointment.status == AppointmentStatus::Cancelled {
                continue;
            }

            clients.insert(appointment.client_id.as_str());

            if appointment.date == today {
                stats.today_appointments += 1;
                if appointment.status == AppointmentStatus::Completed {
                    stats.today_revenue += appointment.price;
                }
            }

            if same_month(appointment.date, today) {
                stats.monthly_appointments += 1;
            }
        }

        for invoice in invoices {
            if invoice.status.is_open() {
                stats.pending_invoices += 1;
            }
            if invoice.status == PaymentStatus::Paid && same_month(invoice.date, today) {
                stats.monthly_revenue += invoice.amount;
            }
        }

        stats.active_clients = clients.len();
        stats
    }
}

fn same_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stats_over_seed_data() {
        let stats = DashboardStats::derive(&seed::appointments(), &seed::invoices(), day(2024, 1, 15));

        assert_eq!(stats.today_appointments, 2);
        // both of today's sessions are still scheduled
        assert_eq!(stats.today_revenue, 0.0);
        assert_eq!(stats.active_clients, 4);
        assert_eq!(stats.pending_invoices, 3);
        assert_eq!(stats.monthly_revenue, 120.0);
        assert_eq!(stats.monthly_appointments, 4);
    }

    #[test]
    fn test_completed_today_counts_as_revenue() {
        let stats = DashboardStats::derive(&seed::appointments(), &[], day(2024, 1, 16));

        assert_eq!(stats.today_appointments, 1);
        assert_eq!(stats.today_revenue, 110.0);
        assert_eq!(stats.pending_invoices, 0);
    }

    #[test]
    fn test_cancelled_appointments_are_ignored() {
        let mut appointments = seed::appointments();
        for appointment in appointments.iter_mut() {
            appointment.status = AppointmentStatus::Cancelled;
        }

        let stats = DashboardStats::derive(&appointments, &[], day(2024, 1, 15));
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_other_month_is_empty() {
        let stats = DashboardStats::derive(&seed::appointments(), &seed::invoices(), day(2024, 2, 1));

        assert_eq!(stats.today_appointments, 0);
        assert_eq!(stats.monthly_appointments, 0);
        assert_eq!(stats.monthly_revenue, 0.0);
        assert_eq!(stats.pending_invoices, 3);
    }
}
