// 📅 Appointment Board - date-filtered agenda and role-gated actions
//
// Reads come in as slices, writes go out through `AppointmentCommands`.
// Patient actions only build messages; they never touch the store.

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::entities::{service, Appointment, AppointmentStatus, NewAppointment, Service};
use crate::error::{ClinicError, ClinicResult};
use crate::session::Role;
use crate::store::AppointmentCommands;
use crate::whatsapp::{templates, OutboundMessage};

// ============================================================================
// FILTERING
// ============================================================================

/// Appointments on `date`, in collection order. `None` lets everything through.
pub fn filter_by_date(appointments: &[Appointment], date: Option<NaiveDate>) -> Vec<&Appointment> {
    appointments
        .iter()
        .filter(|a| date.map_or(true, |d| a.date == d))
        .collect()
}

// ============================================================================
// BOOKING FORM
// ============================================================================

/// The "new appointment" form as typed, before any parsing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentDraft {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub client: String,
    pub client_id: String,
    pub service: String,
    pub price: f64,
    pub notes: String,
}

impl AppointmentDraft {
    /// Pick a service by name and copy its price; unknown services price at 0
    pub fn select_service(&mut self, name: &str, services: &[Service]) {
        self.service = name.to_string();
        self.price = service::price_for(services, name).unwrap_or(0.0);
    }

    /// Required-field gate, then parse into a store command
    pub fn validate(&self) -> ClinicResult<NewAppointment> {
        let required = [
            ("date", &self.date),
            ("time", &self.time),
            ("client", &self.client),
            ("service", &self.service),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ClinicError::missing(*field));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ClinicError::invalid("date", &self.date))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| ClinicError::invalid("time", &self.time))?;

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ClinicError::invalid("price", self.price.to_string()));
        }

        let notes = self.notes.trim();
        Ok(NewAppointment {
            date,
            time,
            client: self.client.trim().to_string(),
            client_id: self.client_id.trim().to_string(),
            service: self.service.clone(),
            price: self.price,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            therapist_id: None,
        })
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

/// Buttons offered on an appointment card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    /// Patient: ask the clinic for another slot
    RequestReschedule,
    /// Patient: send the confirmation text to the clinic
    ConfirmWithClinic,
    /// Therapist: send the confirmation text to the client
    SendConfirmation,
    /// Therapist: warn the client a call is coming
    Call,
    Edit,
    Delete,
}

// ============================================================================
// APPOINTMENT BOARD
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppointmentBoard {
    role: Role,
    selected_date: Option<NaiveDate>,
    draft: Option<AppointmentDraft>,
    editing: Option<Appointment>,
}

impl AppointmentBoard {
    /// Board for `role`, filtered to `today`
    pub fn new(role: Role, today: NaiveDate) -> Self {
        AppointmentBoard {
            role,
            selected_date: Some(today),
            draft: None,
            editing: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// `None` clears the filter
    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        self.selected_date = date;
    }

    /// Move the filter by whole days; a cleared filter restarts from `today`
    pub fn shift_date(&mut self, days: i64, today: NaiveDate) {
        let base = self.selected_date.unwrap_or(today);
        self.selected_date = Some(base + chrono::Duration::days(days));
    }

    pub fn visible<'a>(&self, appointments: &'a [Appointment]) -> Vec<&'a Appointment> {
        filter_by_date(appointments, self.selected_date)
    }

    pub fn actions_for(&self, appointment: &Appointment) -> Vec<AppointmentAction> {
        match self.role {
            Role::Client if appointment.status == AppointmentStatus::Scheduled => vec![
                AppointmentAction::RequestReschedule,
                AppointmentAction::ConfirmWithClinic,
            ],
            Role::Client => Vec::new(),
            Role::Therapist => vec![
                AppointmentAction::SendConfirmation,
                AppointmentAction::Call,
                AppointmentAction::Edit,
                AppointmentAction::Delete,
            ],
        }
    }

    // ------------------------------------------------------------------------
    // Creation (therapist)
    // ------------------------------------------------------------------------

    pub fn open_create_form(&mut self) -> ClinicResult<&mut AppointmentDraft> {
        self.require(Role::Therapist, "create appointments")?;
        Ok(self.draft.get_or_insert_with(AppointmentDraft::default))
    }

    pub fn draft(&self) -> Option<&AppointmentDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut AppointmentDraft> {
        self.draft.as_mut()
    }

    pub fn close_create_form(&mut self) {
        self.draft = None;
    }

    /// Submit the open form. On a validation error the form stays open and
    /// the store is not called.
    pub fn submit_create_form(&mut self, commands: &mut dyn AppointmentCommands) -> ClinicResult<String> {
        self.require(Role::Therapist, "create appointments")?;
        let draft = self
            .draft
            .as_ref()
            .ok_or(ClinicError::NoOpenForm { form: "appointment" })?;

        let new = draft.validate().map_err(|e| {
            warn!(error = %e, "appointment form rejected");
            e
        })?;

        let id = commands.create_appointment(new);
        self.draft = None;
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Editing and deletion (therapist)
    // ------------------------------------------------------------------------

    pub fn begin_edit(&mut self, appointment: &Appointment) -> ClinicResult<&mut Appointment> {
        self.require(Role::Therapist, "edit appointments")?;
        Ok(self.editing.insert(appointment.clone()))
    }

    pub fn editing(&self) -> Option<&Appointment> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut Appointment> {
        self.editing.as_mut()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Write the edited copy back as a full replacement
    pub fn save_edit(&mut self, commands: &mut dyn AppointmentCommands) -> ClinicResult<()> {
        self.require(Role::Therapist, "edit appointments")?;
        let record = self
            .editing
            .take()
            .ok_or(ClinicError::NoOpenForm { form: "appointment edit" })?;

        commands.update_appointment(record)
    }

    /// Change only the status of `appointment` (reschedule, cancel, complete)
    pub fn set_status(
        &self,
        appointment: &Appointment,
        status: AppointmentStatus,
        commands: &mut dyn AppointmentCommands,
    ) -> ClinicResult<()> {
        self.require(Role::Therapist, "change appointment status")?;
        let mut record = appointment.clone();
        record.status = status;
        commands.update_appointment(record)
    }

    /// Irreversible. Without `confirmed` nothing happens and `Ok(None)` is returned.
    pub fn delete(
        &self,
        id: &str,
        confirmed: bool,
        commands: &mut dyn AppointmentCommands,
    ) -> ClinicResult<Option<Appointment>> {
        self.require(Role::Therapist, "delete appointments")?;
        if !confirmed {
            info!(id = %id, "appointment delete not confirmed");
            return Ok(None);
        }

        commands.delete_appointment(id).map(Some)
    }

    // ------------------------------------------------------------------------
    // Messages
    // ------------------------------------------------------------------------

    pub fn request_reschedule(&self, appointment: &Appointment) -> ClinicResult<OutboundMessage> {
        self.require_client_scheduled(appointment, "request a reschedule")?;
        Ok(OutboundMessage::to_clinic(templates::reschedule_request(appointment)))
    }

    pub fn confirm_with_clinic(&self, appointment: &Appointment) -> ClinicResult<OutboundMessage> {
        self.require_client_scheduled(appointment, "confirm")?;
        Ok(OutboundMessage::to_clinic(templates::appointment_confirmation(appointment)))
    }

    pub fn send_confirmation(&self, appointment: &Appointment, phone: &str) -> ClinicResult<OutboundMessage> {
        self.require(Role::Therapist, "send confirmations")?;
        Ok(OutboundMessage::to_phone(
            phone,
            templates::appointment_confirmation(appointment),
        ))
    }

    pub fn send_reminder(&self, appointment: &Appointment, phone: &str) -> ClinicResult<OutboundMessage> {
        self.require(Role::Therapist, "send reminders")?;
        Ok(OutboundMessage::to_phone(phone, templates::appointment_reminder(appointment)))
    }

    pub fn call_notice(&self, appointment: &Appointment, phone: &str) -> ClinicResult<OutboundMessage> {
        self.require(Role::Therapist, "call clients")?;
        Ok(OutboundMessage::to_phone(phone, templates::call_notice(appointment)))
    }

    fn require(&self, role: Role, action: &'static str) -> ClinicResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ClinicError::forbidden(self.role, action))
        }
    }

    fn require_client_scheduled(&self, appointment: &Appointment, action: &'static str) -> ClinicResult<()> {
        self.require(Role::Client, action)?;
        if appointment.status != AppointmentStatus::Scheduled {
            return Err(ClinicError::InvalidState {
                kind: "Appointment",
                id: appointment.id.clone(),
                status: appointment.status.as_str(),
                action,
            });
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::store::ClinicStore;
    use crate::whatsapp::Recipient;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled_draft(board: &mut AppointmentBoard, services: &[Service]) {
        let draft = board.open_create_form().unwrap();
        draft.date = "2024-01-18".to_string();
        draft.time = "11:00".to_string();
        draft.client = "Carla Souza".to_string();
        draft.client_id = "5".to_string();
        draft.select_service("Fonoaudiologia", services);
    }

    #[test]
    fn test_filter_by_date() {
        let appointments = seed::appointments();

        let on_15 = filter_by_date(&appointments, Some(day(2024, 1, 15)));
        assert_eq!(on_15.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);

        assert!(filter_by_date(&appointments, Some(day(2030, 1, 1))).is_empty());
        assert_eq!(filter_by_date(&appointments, None).len(), appointments.len());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let appointments = seed::appointments();
        let once: Vec<Appointment> = filter_by_date(&appointments, Some(day(2024, 1, 15)))
            .into_iter()
            .cloned()
            .collect();
        let twice = filter_by_date(&once, Some(day(2024, 1, 15)));

        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_board_defaults_to_today_and_shifts() {
        let today = day(2024, 1, 15);
        let mut board = AppointmentBoard::new(Role::Therapist, today);
        assert_eq!(board.selected_date(), Some(today));

        board.shift_date(1, today);
        assert_eq!(board.selected_date(), Some(day(2024, 1, 16)));

        board.select_date(None);
        assert_eq!(board.visible(&seed::appointments()).len(), 4);

        board.shift_date(-1, today);
        assert_eq!(board.selected_date(), Some(day(2024, 1, 14)));
    }

    #[test]
    fn test_service_selection_fills_price() {
        let services = seed::services();
        let mut draft = AppointmentDraft::default();

        draft.select_service("Terapia Ocupacional", &services);
        assert_eq!(draft.price, 100.0);

        // price stays overridable after the auto-fill
        draft.price = 80.0;
        assert_eq!(draft.service, "Terapia Ocupacional");
        assert_eq!(draft.price, 80.0);

        draft.select_service("Inexistente", &services);
        assert_eq!(draft.price, 0.0);
    }

    #[test]
    fn test_create_with_all_required_fields() {
        let mut store = seed::seeded_store();
        let mut board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));
        let services = store.services().to_vec();
        filled_draft(&mut board, &services);

        let id = board.submit_create_form(&mut store).unwrap();

        assert_eq!(store.appointments().len(), 5);
        let created = store.find_appointment(&id).unwrap();
        assert_eq!(created.status, AppointmentStatus::Scheduled);
        assert_eq!(created.price, 110.0);
        assert_eq!(created.time_label(), "11:00");
        assert!(created.notes.is_none());
        assert!(board.draft().is_none());
    }

    #[test]
    fn test_missing_required_field_blocks_submission() {
        let services = seed::services();

        for field in ["date", "time", "client", "service"] {
            let mut store = seed::seeded_store();
            let before = store.appointments().to_vec();
            let mut board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));
            filled_draft(&mut board, &services);

            let draft = board.draft_mut().unwrap();
            match field {
                "date" => draft.date.clear(),
                "time" => draft.time.clear(),
                "client" => draft.client = "   ".to_string(),
                _ => draft.service.clear(),
            }

            let err = board.submit_create_form(&mut store).unwrap_err();
            assert!(matches!(err, ClinicError::MissingField { field: f } if f == field));
            assert!(err.is_validation());
            assert_eq!(store.appointments(), before.as_slice());
            assert!(board.draft().is_some(), "form stays open after a rejected submit");
        }
    }

    #[test]
    fn test_unparseable_time_is_rejected() {
        let mut store = ClinicStore::new();
        let mut board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));
        filled_draft(&mut board, &seed::services());
        board.draft_mut().unwrap().time = "9h".to_string();

        let err = board.submit_create_form(&mut store).unwrap_err();
        assert!(matches!(err, ClinicError::InvalidField { field: "time", .. }));
        assert!(store.appointments().is_empty());
    }

    #[test]
    fn test_client_cannot_create_or_delete() {
        let mut store = seed::seeded_store();
        let mut board = AppointmentBoard::new(Role::Client, day(2024, 1, 15));

        assert!(matches!(board.open_create_form(), Err(ClinicError::Forbidden { .. })));
        assert!(board.delete("1", true, &mut store).is_err());
        assert_eq!(store.appointments().len(), 4);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut store = seed::seeded_store();
        let board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));

        assert_eq!(board.delete("1", false, &mut store).unwrap(), None);
        assert_eq!(store.appointments().len(), 4);

        let removed = board.delete("1", true, &mut store).unwrap().unwrap();
        assert_eq!(removed.id, "1");
        assert_eq!(store.appointments().len(), 3);

        assert!(matches!(
            board.delete("1", true, &mut store),
            Err(ClinicError::NotFound { .. })
        ));
        assert_eq!(store.appointments().len(), 3);
    }

    #[test]
    fn test_edit_replaces_record() {
        let mut store = seed::seeded_store();
        let mut board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));
        let original = store.find_appointment("4").unwrap().clone();

        let editing = board.begin_edit(&original).unwrap();
        editing.status = AppointmentStatus::Rescheduled;
        editing.date = day(2024, 1, 19);

        board.save_edit(&mut store).unwrap();

        let saved = store.find_appointment("4").unwrap();
        assert_eq!(saved.status, AppointmentStatus::Rescheduled);
        assert_eq!(saved.date, day(2024, 1, 19));
        assert!(board.editing().is_none());
    }

    #[test]
    fn test_set_status_cancels() {
        let mut store = seed::seeded_store();
        let board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));
        let appointment = store.find_appointment("2").unwrap().clone();

        board
            .set_status(&appointment, AppointmentStatus::Cancelled, &mut store)
            .unwrap();
        assert_eq!(store.find_appointment("2").unwrap().status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_patient_messages_do_not_touch_store() {
        let store = seed::seeded_store();
        let board = AppointmentBoard::new(Role::Client, day(2024, 1, 15));
        let scheduled = store.find_appointment("1").unwrap();

        let message = board.request_reschedule(scheduled).unwrap();
        assert_eq!(message.recipient, Recipient::Clinic);
        assert!(message.text.contains("Solicitação de Reagendamento"));

        let confirm = board.confirm_with_clinic(scheduled).unwrap();
        assert!(confirm.text.contains("15/01/2024"));

        let completed = store.find_appointment("3").unwrap();
        assert!(board.request_reschedule(completed).is_err());
        assert!(board.actions_for(completed).is_empty());
    }

    #[test]
    fn test_therapist_messages_go_to_client_phone() {
        let store = seed::seeded_store();
        let board = AppointmentBoard::new(Role::Therapist, day(2024, 1, 15));
        let appointment = store.find_appointment("1").unwrap();

        let call = board.call_notice(appointment, "11999999999").unwrap();
        assert_eq!(call.recipient, Recipient::Phone("11999999999".to_string()));
        assert_eq!(call.text, "Olá Maria Silva! Ligando para confirmar sua consulta.");

        assert!(board.send_confirmation(appointment, "11999999999").is_ok());
        assert!(board.send_reminder(appointment, "11999999999").is_ok());
        assert!(board.request_reschedule(appointment).is_err());
        assert_eq!(board.actions_for(appointment).len(), 4);
    }
}
