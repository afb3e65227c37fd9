// 📅 Appointment Entity - a scheduled therapy session
//
// Created only through the store (status forced to `scheduled`),
// updated by full-record replacement, removed by id.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{BadgeColor, Identified};

// ============================================================================
// APPOINTMENT STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,

    /// Any status string this build does not know about
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Unknown => "unknown",
        }
    }

    /// Label shown on the status badge
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendado",
            AppointmentStatus::Completed => "Concluído",
            AppointmentStatus::Cancelled => "Cancelado",
            AppointmentStatus::Rescheduled => "Reagendado",
            AppointmentStatus::Unknown => "Desconhecido",
        }
    }

    pub fn color(&self) -> BadgeColor {
        match self {
            AppointmentStatus::Scheduled => BadgeColor::Blue,
            AppointmentStatus::Completed => BadgeColor::Green,
            AppointmentStatus::Cancelled => BadgeColor::Red,
            AppointmentStatus::Rescheduled => BadgeColor::Yellow,
            AppointmentStatus::Unknown => BadgeColor::Gray,
        }
    }
}

/// Times travel as `HH:MM`; `HH:MM:SS` is still accepted on input
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(de::Error::custom)
    }
}

// ============================================================================
// APPOINTMENT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Stable identity, assigned by the store
    pub id: String,

    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,

    /// Client display name
    pub client: String,

    /// Foreign key into a client registry; never checked for existence
    pub client_id: String,

    /// Service name as listed in the catalog
    pub service: String,

    pub status: AppointmentStatus,
    pub price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist_id: Option<String>,
}

impl Appointment {
    /// `HH:MM`, the way times are typed into the booking form
    pub fn time_label(&self) -> String {
        self.time.format("%H:%M").to_string()
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}

impl Identified for Appointment {
    const KIND: &'static str = "Appointment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Everything a caller supplies when booking; id and status come from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub client: String,
    pub client_id: String,
    pub service: String,
    pub price: f64,
    pub notes: Option<String>,
    pub therapist_id: Option<String>,
}

impl NewAppointment {
    pub(crate) fn into_appointment(self, id: String) -> Appointment {
        Appointment {
            id,
            date: self.date,
            time: self.time,
            client: self.client,
            client_id: self.client_id,
            service: self.service,
            status: AppointmentStatus::Scheduled,
            price: self.price,
            notes: self.notes,
            therapist_id: self.therapist_id,
        }
    }
}
