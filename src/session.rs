// 👤 Session - who is logged in, which tab is open, and the data they act on
//
// The session owns the store. Boards are created at login and dropped at
// logout; they only reach the store through the command traits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::appointments::AppointmentBoard;
use crate::config::ClinicConfig;
use crate::entities::{
    notification, Appointment, AppointmentStatus, Invoice, Notification, PaymentStatus,
};
use crate::error::{ClinicError, ClinicResult};
use crate::financial::FinancialBoard;
use crate::stats::DashboardStats;
use crate::store::{ClinicStore, FinancialCommands};
use crate::whatsapp::{templates, BusinessApi, Messenger, OutboundMessage, WhatsApp};

/// Notification feed owner for the therapist account
pub const THERAPIST_USER_ID: &str = "therapist";

// ============================================================================
// ROLE / STATE / TAB
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Patient: read and request-only
    Client,
    /// Staff: full mutation rights
    Therapist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Therapist => "therapist",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Client => "Paciente",
            Role::Therapist => "Fisioterapeuta",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Appointments,
    Financial,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Appointments, Tab::Financial];

    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Appointments,
            Tab::Appointments => Tab::Financial,
            Tab::Financial => Tab::Dashboard,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Financial,
            Tab::Appointments => Tab::Dashboard,
            Tab::Financial => Tab::Appointments,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Appointments => "Agendamentos",
            Tab::Financial => "Financeiro",
        }
    }
}

// ============================================================================
// DASHBOARDS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClientDashboard<'a> {
    /// First two scheduled appointments
    pub upcoming: Vec<&'a Appointment>,
    /// First three invoices
    pub recent_invoices: Vec<&'a Invoice>,
    /// First three notifications for the demo patient
    pub notifications: Vec<&'a Notification>,
    pub unread: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TherapistDashboard<'a> {
    pub stats: DashboardStats,
    /// Expenses still `pending`
    pub pending_expenses: usize,
    pub today_agenda: Vec<&'a Appointment>,
    pub notifications: Vec<&'a Notification>,
    pub unread: usize,
}

// ============================================================================
// SESSION
// ============================================================================

struct Boards {
    appointments: AppointmentBoard,
    financial: FinancialBoard,
}

pub struct Session<M: Messenger> {
    config: ClinicConfig,
    store: ClinicStore,
    state: SessionState,
    tab: Tab,
    boards: Option<Boards>,
    whatsapp: WhatsApp<M>,
    business_api: BusinessApi,
    today: NaiveDate,
}

impl<M: Messenger> Session<M> {
    pub fn new(config: ClinicConfig, store: ClinicStore, messenger: M, today: NaiveDate) -> Self {
        let whatsapp = WhatsApp::new(config.clinic_whatsapp.clone(), messenger);
        let business_api = BusinessApi::new(config.business_api.clone());
        info!(
            configured = business_api.config().is_configured(),
            "business api loaded (deep links remain the delivery path)"
        );

        Session {
            config,
            store,
            state: SessionState::LoggedOut,
            tab: Tab::Dashboard,
            boards: None,
            whatsapp,
            business_api,
            today,
        }
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn store(&self) -> &ClinicStore {
        &self.store
    }

    pub fn messenger(&self) -> &M {
        self.whatsapp.messenger()
    }

    pub fn business_api(&self) -> &BusinessApi {
        &self.business_api
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        match self.state {
            SessionState::LoggedIn(role) => Some(role),
            SessionState::LoggedOut => None,
        }
    }

    pub fn login(&mut self, role: Role) {
        info!(role = role.as_str(), "login");
        self.state = SessionState::LoggedIn(role);
        self.tab = Tab::Dashboard;
        self.boards = Some(Boards {
            appointments: AppointmentBoard::new(role, self.today),
            financial: FinancialBoard::new(role),
        });
    }

    /// Back to the login screen; collections survive until the process exits
    pub fn logout(&mut self) {
        if let Some(role) = self.role() {
            info!(role = role.as_str(), "logout");
        }
        self.state = SessionState::LoggedOut;
        self.tab = Tab::Dashboard;
        self.boards = None;
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.tab = self.tab.previous();
    }

    // ------------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------------

    fn boards(&self) -> ClinicResult<&Boards> {
        self.boards.as_ref().ok_or(ClinicError::NotAuthenticated)
    }

    fn boards_mut(&mut self) -> ClinicResult<&mut Boards> {
        self.boards.as_mut().ok_or(ClinicError::NotAuthenticated)
    }

    pub fn appointment_board(&self) -> ClinicResult<&AppointmentBoard> {
        Ok(&self.boards()?.appointments)
    }

    pub fn appointment_board_mut(&mut self) -> ClinicResult<&mut AppointmentBoard> {
        Ok(&mut self.boards_mut()?.appointments)
    }

    pub fn financial_board(&self) -> ClinicResult<&FinancialBoard> {
        Ok(&self.boards()?.financial)
    }

    pub fn financial_board_mut(&mut self) -> ClinicResult<&mut FinancialBoard> {
        Ok(&mut self.boards_mut()?.financial)
    }

    pub fn visible_appointments(&self) -> ClinicResult<Vec<&Appointment>> {
        Ok(self.appointment_board()?.visible(self.store.appointments()))
    }

    // ------------------------------------------------------------------------
    // Mutations routed through the boards
    // ------------------------------------------------------------------------

    pub fn submit_appointment(&mut self) -> ClinicResult<String> {
        let boards = self.boards.as_mut().ok_or(ClinicError::NotAuthenticated)?;
        boards.appointments.submit_create_form(&mut self.store)
    }

    pub fn save_appointment_edit(&mut self) -> ClinicResult<()> {
        let boards = self.boards.as_mut().ok_or(ClinicError::NotAuthenticated)?;
        boards.appointments.save_edit(&mut self.store)
    }

    pub fn set_appointment_status(&mut self, id: &str, status: AppointmentStatus) -> ClinicResult<()> {
        let boards = self.boards.as_ref().ok_or(ClinicError::NotAuthenticated)?;
        let appointment = self
            .store
            .find_appointment(id)
            .cloned()
            .ok_or_else(|| ClinicError::not_found("Appointment", id))?;
        boards.appointments.set_status(&appointment, status, &mut self.store)
    }

    pub fn delete_appointment(&mut self, id: &str, confirmed: bool) -> ClinicResult<Option<Appointment>> {
        let boards = self.boards.as_ref().ok_or(ClinicError::NotAuthenticated)?;
        boards.appointments.delete(id, confirmed, &mut self.store)
    }

    pub fn submit_expense(&mut self) -> ClinicResult<String> {
        let boards = self.boards.as_mut().ok_or(ClinicError::NotAuthenticated)?;
        boards.financial.submit_expense(&mut self.store)
    }

    pub fn set_expense_status(&mut self, id: &str, status: PaymentStatus) -> ClinicResult<()> {
        let boards = self.boards.as_ref().ok_or(ClinicError::NotAuthenticated)?;
        let expense = self
            .store
            .find_expense(id)
            .cloned()
            .ok_or_else(|| ClinicError::not_found("Expense", id))?;
        boards.financial.set_expense_status(&expense, status, &mut self.store)
    }

    /// Generic invoice replacement (e.g. marking as paid); therapist only
    pub fn update_invoice(&mut self, record: Invoice) -> ClinicResult<()> {
        match self.role() {
            Some(Role::Therapist) => self.store.update_invoice(record),
            Some(role) => Err(ClinicError::forbidden(role, "update invoices")),
            None => Err(ClinicError::NotAuthenticated),
        }
    }

    // ------------------------------------------------------------------------
    // Messaging
    // ------------------------------------------------------------------------

    /// Hand a message to WhatsApp; returns the link opened
    pub fn send(&mut self, message: &OutboundMessage) -> String {
        self.whatsapp.deliver(message)
    }

    /// The "WhatsApp" menu shortcut
    pub fn ask_for_help(&mut self) -> String {
        self.whatsapp.send_to_clinic(templates::HELP_REQUEST)
    }

    // ------------------------------------------------------------------------
    // Dashboards
    // ------------------------------------------------------------------------

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::derive(self.store.appointments(), self.store.invoices(), self.today)
    }

    pub fn client_dashboard(&self) -> ClientDashboard<'_> {
        let user_id = self.config.demo_client_id.as_str();
        let notifications = self.store.notifications();

        ClientDashboard {
            upcoming: self
                .store
                .appointments()
                .iter()
                .filter(|a| a.status == AppointmentStatus::Scheduled)
                .take(2)
                .collect(),
            recent_invoices: self.store.invoices().iter().take(3).collect(),
            notifications: notification::for_user(notifications, user_id)
                .into_iter()
                .take(3)
                .collect(),
            unread: notification::unread_count(notifications, user_id),
        }
    }

    pub fn therapist_dashboard(&self) -> TherapistDashboard<'_> {
        let notifications = self.store.notifications();

        TherapistDashboard {
            stats: self.stats(),
            pending_expenses: self
                .store
                .expenses()
                .iter()
                .filter(|e| e.status == PaymentStatus::Pending)
                .count(),
            today_agenda: self
                .store
                .appointments()
                .iter()
                .filter(|a| a.is_on(self.today))
                .collect(),
            notifications: notification::for_user(notifications, THERAPIST_USER_ID),
            unread: notification::unread_count(notifications, THERAPIST_USER_ID),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::whatsapp::Outbox;

    fn session() -> Session<Outbox> {
        Session::new(
            ClinicConfig::default(),
            seed::seeded_store(),
            Outbox::new(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_logged_out_has_no_boards() {
        let mut session = session();

        assert_eq!(session.state(), SessionState::LoggedOut);
        assert_eq!(session.role(), None);
        assert!(matches!(session.appointment_board(), Err(ClinicError::NotAuthenticated)));
        assert!(matches!(session.submit_expense(), Err(ClinicError::NotAuthenticated)));
        assert!(session.delete_appointment("1", true).is_err());
        assert_eq!(session.store().appointments().len(), 4);
    }

    #[test]
    fn test_login_logout_cycle() {
        let mut session = session();

        session.login(Role::Therapist);
        session.next_tab();
        assert_eq!(session.tab(), Tab::Appointments);
        assert_eq!(session.role(), Some(Role::Therapist));

        session.logout();
        assert_eq!(session.state(), SessionState::LoggedOut);
        assert_eq!(session.tab(), Tab::Dashboard);
        assert!(session.financial_board().is_err());

        session.login(Role::Client);
        assert_eq!(session.appointment_board().unwrap().role(), Role::Client);
    }

    #[test]
    fn test_tab_cycle() {
        let mut tab = Tab::Dashboard;
        for _ in 0..Tab::ALL.len() {
            tab = tab.next();
        }
        assert_eq!(tab, Tab::Dashboard);
        assert_eq!(Tab::Dashboard.previous(), Tab::Financial);
    }

    #[test]
    fn test_therapist_creates_and_deletes_through_session() {
        let mut session = session();
        session.login(Role::Therapist);

        let services = session.store().services().to_vec();
        {
            let board = session.appointment_board_mut().unwrap();
            let draft = board.open_create_form().unwrap();
            draft.date = "2024-01-15".to_string();
            draft.time = "15:00".to_string();
            draft.client = "Lucas Prado".to_string();
            draft.select_service("Psicomotricidade", &services);
        }

        let id = session.submit_appointment().unwrap();
        assert_eq!(session.visible_appointments().unwrap().len(), 3);

        session.set_appointment_status(&id, AppointmentStatus::Completed).unwrap();
        assert_eq!(session.stats().today_revenue, 95.0);

        assert!(session.delete_appointment(&id, true).unwrap().is_some());
        assert_eq!(session.store().appointments().len(), 4);
    }

    #[test]
    fn test_messages_are_dispatched_as_links() {
        let mut session = session();
        session.login(Role::Client);

        let appointment = session.store().find_appointment("1").unwrap().clone();
        let message = session
            .appointment_board()
            .unwrap()
            .request_reschedule(&appointment)
            .unwrap();
        let link = session.send(&message);

        assert!(link.starts_with("https://wa.me/5511999999999?text="));
        let help = session.ask_for_help();
        assert_eq!(session.messenger().links().len(), 2);
        assert_eq!(session.messenger().last(), Some(help.as_str()));
    }

    #[test]
    fn test_update_invoice_is_therapist_only() {
        let mut session = session();
        let mut invoice = session.store().find_invoice("2").unwrap().clone();
        invoice.status = PaymentStatus::Paid;

        assert!(matches!(session.update_invoice(invoice.clone()), Err(ClinicError::NotAuthenticated)));

        session.login(Role::Client);
        assert!(matches!(session.update_invoice(invoice.clone()), Err(ClinicError::Forbidden { .. })));

        session.login(Role::Therapist);
        session.update_invoice(invoice).unwrap();
        assert_eq!(session.store().find_invoice("2").unwrap().status, PaymentStatus::Paid);
        assert_eq!(session.stats().pending_invoices, 2);
    }

    #[test]
    fn test_dashboards() {
        let mut session = session();
        session.login(Role::Client);

        let client = session.client_dashboard();
        assert_eq!(client.upcoming.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(client.recent_invoices.len(), 3);
        assert_eq!(client.notifications.len(), 3);
        assert_eq!(client.unread, 2);

        let therapist = session.therapist_dashboard();
        assert_eq!(therapist.today_agenda.len(), 2);
        assert_eq!(therapist.notifications.len(), 1);
        assert_eq!(therapist.stats.today_appointments, 2);
        assert_eq!(therapist.pending_expenses, 3);
    }

    #[test]
    fn test_paying_an_expense_lowers_pending_count() {
        let mut session = session();
        session.login(Role::Therapist);

        session.set_expense_status("2", PaymentStatus::Paid).unwrap();
        assert_eq!(session.therapist_dashboard().pending_expenses, 2);
    }

    #[test]
    fn test_business_api_built_from_config() {
        assert!(!session().business_api().config().is_configured());

        let config = ClinicConfig::from_lookup(|key| match key {
            "WHATSAPP_API_URL" => Some("https://graph.example/v18.0".to_string()),
            "WHATSAPP_ACCESS_TOKEN" => Some("token".to_string()),
            "WHATSAPP_PHONE_NUMBER_ID" => Some("123".to_string()),
            _ => None,
        });
        let session = Session::new(
            config,
            seed::seeded_store(),
            Outbox::new(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );

        let api = session.business_api();
        assert!(api.config().is_configured());
        assert_eq!(api.config().phone_number_id, "123");
    }
}
