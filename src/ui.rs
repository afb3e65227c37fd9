use anyhow::Result;
use caramelo_clinic::{
    format_brl, phone, templates, Appointment, AppointmentAction, AppointmentStatus, BadgeColor,
    group_by_category, ClinicError, ClinicResult, Expense, ExpenseCategory, FinancialTab,
    Messenger, OutboundMessage,
    PaymentStatus, Role, Session, SessionState, Tab,
};
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use tracing::warn;

// ============================================================================
// APP STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Field index into the appointment form
    AppointmentForm(usize),
    /// Field index into the expense form
    ExpenseForm(usize),
    /// Waiting for y/n before deleting this appointment id
    ConfirmDelete(String),
}

const APPOINTMENT_FIELDS: [&str; 7] = ["Data", "Horário", "Cliente", "ID Cliente", "Serviço", "Valor", "Observações"];
const EXPENSE_FIELDS: [&str; 5] = ["Descrição", "Valor", "Categoria", "Vencimento", "Recorrente"];

pub struct App<M: Messenger> {
    pub session: Session<M>,
    pub mode: Mode,
    pub table_state: TableState,
    /// Last link, confirmation or error shown in the status bar
    pub status: Option<(String, Color)>,
    /// Text buffers for fields that are not strings in the drafts
    price_input: String,
    due_input: String,
}

impl<M: Messenger> App<M> {
    pub fn new(session: Session<M>) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            session,
            mode: Mode::Normal,
            table_state,
            status: None,
            price_input: String::new(),
            due_input: String::new(),
        }
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Color::Green));
    }

    fn error(&mut self, err: &ClinicError) {
        if !err.is_validation() {
            warn!(error = %err, "action failed");
        }
        self.status = Some((err.to_string(), Color::Red));
    }

    /// Rows shown in the current list, used for selection bounds
    fn row_count(&self) -> usize {
        match self.session.tab() {
            Tab::Dashboard => 0,
            Tab::Appointments => self.session.visible_appointments().map(|v| v.len()).unwrap_or(0),
            Tab::Financial => match self.session.financial_board().map(|b| b.tab()) {
                Ok(FinancialTab::Invoices) => self.session.store().invoices().len(),
                Ok(FinancialTab::Expenses) => self.session.store().expenses().len(),
                _ => 0,
            },
        }
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    fn reset_selection(&mut self) {
        self.table_state.select(Some(0));
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_appointment(&self) -> Option<Appointment> {
        let visible = self.session.visible_appointments().ok()?;
        visible.get(self.selected_index()).map(|a| (*a).clone())
    }

    fn send(&mut self, message: ClinicResult<OutboundMessage>) {
        match message {
            Ok(message) => {
                let link = self.session.send(&message);
                self.info(format!("WhatsApp: {}", truncate(&link, 80)));
            }
            Err(e) => self.error(&e),
        }
    }

    // ------------------------------------------------------------------------
    // Key handling
    // ------------------------------------------------------------------------

    /// Returns false when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.session.state() == SessionState::LoggedOut {
            return self.handle_login_key(key);
        }

        match self.mode.clone() {
            Mode::AppointmentForm(field) => self.handle_appointment_form(key, field),
            Mode::ExpenseForm(field) => self.handle_expense_form(key, field),
            Mode::ConfirmDelete(id) => self.handle_confirm_delete(key, &id),
            Mode::Normal => return self.handle_normal_key(key),
        }
        true
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('1') => self.session.login(Role::Client),
            KeyCode::Char('2') => self.session.login(Role::Therapist),
            KeyCode::Char('q') | KeyCode::Esc => return false,
            _ => {}
        }
        self.reset_selection();
        true
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Tab => {
                self.session.next_tab();
                self.reset_selection();
            }
            KeyCode::BackTab => {
                self.session.previous_tab();
                self.reset_selection();
            }
            KeyCode::Char('l') => {
                self.session.logout();
                self.status = None;
            }
            KeyCode::Char('w') => {
                let link = self.session.ask_for_help();
                self.info(format!("WhatsApp: {}", truncate(&link, 80)));
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            _ => match self.session.tab() {
                Tab::Dashboard => {}
                Tab::Appointments => self.handle_appointments_key(key),
                Tab::Financial => self.handle_financial_key(key),
            },
        }
        true
    }

    fn handle_appointments_key(&mut self, key: KeyEvent) {
        let today = self.session.today();
        let role = self.session.role();
        let client_phone = self.session.config().client_phone.clone();

        match key.code {
            KeyCode::Char('[') | KeyCode::Char(']') => {
                let days = if key.code == KeyCode::Char('[') { -1 } else { 1 };
                if let Ok(board) = self.session.appointment_board_mut() {
                    board.shift_date(days, today);
                }
                self.reset_selection();
            }
            KeyCode::Char('a') => {
                if let Ok(board) = self.session.appointment_board_mut() {
                    board.select_date(None);
                }
                self.reset_selection();
            }
            KeyCode::Char('t') => {
                if let Ok(board) = self.session.appointment_board_mut() {
                    board.select_date(Some(today));
                }
                self.reset_selection();
            }
            KeyCode::Char('n') => {
                let opened = self
                    .session
                    .appointment_board_mut()
                    .and_then(|board| board.open_create_form().map(|_| ()));
                match opened {
                    Ok(()) => {
                        self.price_input.clear();
                        self.mode = Mode::AppointmentForm(0);
                    }
                    Err(e) => self.error(&e),
                }
            }
            KeyCode::Char(c) => {
                let Some(appointment) = self.selected_appointment() else {
                    return;
                };
                let Ok(board) = self.session.appointment_board() else {
                    return;
                };
                let actions = board.actions_for(&appointment);

                let message = match (role, c) {
                    (Some(Role::Client), 'r') if actions.contains(&AppointmentAction::RequestReschedule) => {
                        Some(board.request_reschedule(&appointment))
                    }
                    (Some(Role::Client), 'c') if actions.contains(&AppointmentAction::ConfirmWithClinic) => {
                        Some(board.confirm_with_clinic(&appointment))
                    }
                    (Some(Role::Therapist), 'c') => Some(board.send_confirmation(&appointment, &client_phone)),
                    (Some(Role::Therapist), 'p') => Some(board.call_notice(&appointment, &client_phone)),
                    (Some(Role::Therapist), 'm') => Some(board.send_reminder(&appointment, &client_phone)),
                    _ => None,
                };

                if let Some(message) = message {
                    self.send(message);
                    return;
                }

                match (role, c) {
                    (Some(Role::Therapist), 'd') => {
                        self.mode = Mode::ConfirmDelete(appointment.id.clone());
                        self.status = Some((
                            "Tem certeza que deseja cancelar este agendamento? (y/n)".to_string(),
                            Color::Yellow,
                        ));
                    }
                    (Some(Role::Therapist), 's') => {
                        let status = next_status(appointment.status);
                        match self.session.set_appointment_status(&appointment.id, status) {
                            Ok(()) => self.info(format!("Status: {}", status.label())),
                            Err(e) => self.error(&e),
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, id: &str) {
        let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
        match self.session.delete_appointment(id, confirmed) {
            Ok(Some(removed)) => self.info(format!("Agendamento de {} removido", removed.client)),
            Ok(None) => self.status = None,
            Err(e) => self.error(&e),
        }
        self.mode = Mode::Normal;
        self.reset_selection();
    }

    fn handle_financial_key(&mut self, key: KeyEvent) {
        let today = self.session.today();
        let role = self.session.role();
        let client_phone = self.session.config().client_phone.clone();
        let index = self.selected_index();

        match key.code {
            KeyCode::Char('f') => {
                if let Ok(board) = self.session.financial_board_mut() {
                    board.next_tab();
                }
                self.reset_selection();
            }
            KeyCode::Enter => {
                // row index only means an invoice on the invoices sub-tab
                let on_invoices = self
                    .session
                    .financial_board()
                    .map_or(false, |board| board.tab() == FinancialTab::Invoices);
                if !on_invoices {
                    return;
                }
                let Some(id) = self.session.store().invoices().get(index).map(|i| i.id.clone()) else {
                    return;
                };
                if let Ok(board) = self.session.financial_board_mut() {
                    board.view_invoice(&id);
                }
            }
            KeyCode::Char('x') => {
                let opened = self
                    .session
                    .financial_board_mut()
                    .and_then(|board| board.open_expense_form(today).map(|draft| draft.due_date));
                match opened {
                    Ok(due) => {
                        self.due_input = due.format("%Y-%m-%d").to_string();
                        self.mode = Mode::ExpenseForm(0);
                    }
                    Err(e) => self.error(&e),
                }
            }
            KeyCode::Char(c) => {
                let Ok(board) = self.session.financial_board() else {
                    return;
                };
                match (board.tab(), role, c) {
                    (FinancialTab::Invoices, Some(Role::Therapist), 'm') => {
                        if let Some(invoice) = self.session.store().invoices().get(index) {
                            let message = board.send_invoice_reminder(invoice, &client_phone);
                            self.send(message);
                        }
                    }
                    (FinancialTab::Invoices, Some(Role::Therapist), 'r') => {
                        if let Some(invoice) = self.session.store().invoices().get(index) {
                            let message = board.send_payment_confirmation(invoice, &client_phone);
                            self.send(message);
                        }
                    }
                    (FinancialTab::Invoices, Some(Role::Therapist), 'P') => {
                        let Some(mut invoice) = self.session.store().invoices().get(index).cloned() else {
                            return;
                        };
                        invoice.status = PaymentStatus::Paid;
                        match self.session.update_invoice(invoice) {
                            Ok(()) => self.info("Fatura marcada como paga"),
                            Err(e) => self.error(&e),
                        }
                    }
                    (FinancialTab::Invoices, Some(Role::Client), 'p') => {
                        if let Some(invoice) = self.session.store().invoices().get(index) {
                            let message = board.request_payment(invoice);
                            self.send(message);
                        }
                    }
                    (FinancialTab::Expenses, Some(Role::Therapist), 'p') => {
                        let Some(id) = self.session.store().expenses().get(index).map(|e| e.id.clone()) else {
                            return;
                        };
                        match self.session.set_expense_status(&id, PaymentStatus::Paid) {
                            Ok(()) => self.info("Despesa marcada como paga"),
                            Err(e) => self.error(&e),
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn handle_appointment_form(&mut self, key: KeyEvent, field: usize) {
        match key.code {
            KeyCode::Esc => {
                if let Ok(board) = self.session.appointment_board_mut() {
                    board.close_create_form();
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.mode = Mode::AppointmentForm((field + 1) % APPOINTMENT_FIELDS.len());
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.mode = Mode::AppointmentForm((field + APPOINTMENT_FIELDS.len() - 1) % APPOINTMENT_FIELDS.len());
            }
            KeyCode::Left | KeyCode::Right if field == 4 => {
                let names: Vec<String> = self
                    .session
                    .store()
                    .services()
                    .iter()
                    .filter(|s| s.active)
                    .map(|s| s.name.clone())
                    .collect();
                let services = self.session.store().services().to_vec();
                let Ok(board) = self.session.appointment_board_mut() else {
                    return;
                };
                let Some(draft) = board.draft_mut() else {
                    return;
                };
                if names.is_empty() {
                    return;
                }
                let current = names.iter().position(|n| *n == draft.service);
                let next = match (current, key.code) {
                    (None, _) => 0,
                    (Some(i), KeyCode::Right) => (i + 1) % names.len(),
                    (Some(i), _) => (i + names.len() - 1) % names.len(),
                };
                draft.select_service(&names[next], &services);
                self.price_input = format!("{:.2}", draft.price);
            }
            KeyCode::Enter => self.submit_appointment_form(),
            KeyCode::Backspace => {
                if field == 5 {
                    self.price_input.pop();
                } else if let Some(text) = self.appointment_text_field(field) {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if field == 5 {
                    self.price_input.push(c);
                } else if let Some(text) = self.appointment_text_field(field) {
                    text.push(c);
                }
            }
            _ => {}
        }
    }

    fn appointment_text_field(&mut self, field: usize) -> Option<&mut String> {
        let draft = self.session.appointment_board_mut().ok()?.draft_mut()?;
        match field {
            0 => Some(&mut draft.date),
            1 => Some(&mut draft.time),
            2 => Some(&mut draft.client),
            3 => Some(&mut draft.client_id),
            6 => Some(&mut draft.notes),
            _ => None,
        }
    }

    fn submit_appointment_form(&mut self) {
        if !self.price_input.trim().is_empty() {
            match self.price_input.trim().replace(',', ".").parse::<f64>() {
                Ok(price) => {
                    if let Some(draft) = self.session.appointment_board_mut().ok().and_then(|b| b.draft_mut()) {
                        draft.price = price;
                    }
                }
                Err(_) => {
                    let err = ClinicError::invalid("price", self.price_input.clone());
                    self.error(&err);
                    return;
                }
            }
        }

        match self.session.submit_appointment() {
            Ok(_) => {
                self.info("Consulta criada");
                self.mode = Mode::Normal;
            }
            Err(e) => self.error(&e),
        }
    }

    fn handle_expense_form(&mut self, key: KeyEvent, field: usize) {
        match key.code {
            KeyCode::Esc => {
                if let Ok(board) = self.session.financial_board_mut() {
                    board.close_expense_form();
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.mode = Mode::ExpenseForm((field + 1) % EXPENSE_FIELDS.len());
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.mode = Mode::ExpenseForm((field + EXPENSE_FIELDS.len() - 1) % EXPENSE_FIELDS.len());
            }
            KeyCode::Enter => self.submit_expense_form(),
            code => {
                if field == 3 {
                    match code {
                        KeyCode::Backspace => {
                            self.due_input.pop();
                        }
                        KeyCode::Char(c) => self.due_input.push(c),
                        _ => {}
                    }
                    return;
                }

                let Some(draft) = self.session.financial_board_mut().ok().and_then(|b| b.draft_mut()) else {
                    return;
                };
                match (field, code) {
                    (0, KeyCode::Char(c)) => draft.description.push(c),
                    (0, KeyCode::Backspace) => {
                        draft.description.pop();
                    }
                    (1, KeyCode::Char(c)) => draft.amount.push(c),
                    (1, KeyCode::Backspace) => {
                        draft.amount.pop();
                    }
                    (2, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
                        draft.category = draft.category.next();
                    }
                    (4, KeyCode::Char(' ')) => draft.recurring = !draft.recurring,
                    _ => {}
                }
            }
        }
    }

    fn submit_expense_form(&mut self) {
        let due = match NaiveDate::parse_from_str(self.due_input.trim(), "%Y-%m-%d") {
            Ok(due) => due,
            Err(_) => {
                let err = ClinicError::invalid("due_date", self.due_input.clone());
                self.error(&err);
                return;
            }
        };
        if let Some(draft) = self.session.financial_board_mut().ok().and_then(|b| b.draft_mut()) {
            draft.due_date = due;
        }

        match self.session.submit_expense() {
            Ok(_) => {
                self.info("Despesa adicionada");
                self.mode = Mode::Normal;
            }
            Err(e) => self.error(&e),
        }
    }
}

fn next_status(status: AppointmentStatus) -> AppointmentStatus {
    match status {
        AppointmentStatus::Scheduled => AppointmentStatus::Completed,
        AppointmentStatus::Completed => AppointmentStatus::Rescheduled,
        AppointmentStatus::Rescheduled => AppointmentStatus::Cancelled,
        AppointmentStatus::Cancelled | AppointmentStatus::Unknown => AppointmentStatus::Scheduled,
    }
}

fn badge(color: BadgeColor) -> Color {
    match color {
        BadgeColor::Blue => Color::Blue,
        BadgeColor::Green => Color::Green,
        BadgeColor::Red => Color::Red,
        BadgeColor::Yellow => Color::Yellow,
        BadgeColor::Gray => Color::Gray,
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui<M: Messenger>(app: &mut App<M>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, M: Messenger>(
    terminal: &mut Terminal<B>,
    app: &mut App<M>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui<M: Messenger>(f: &mut Frame, app: &mut App<M>) {
    if app.session.state() == SessionState::LoggedOut {
        let area = f.size();
        render_login(f, area, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.mode {
        Mode::AppointmentForm(field) => render_appointment_form(f, chunks[1], app, field),
        Mode::ExpenseForm(field) => render_expense_form(f, chunks[1], app, field),
        _ => match app.session.tab() {
            Tab::Dashboard => render_dashboard(f, chunks[1], app),
            Tab::Appointments => render_appointments(f, chunks[1], app),
            Tab::Financial => render_financial(f, chunks[1], app),
        },
    }

    render_status_bar(f, chunks[2], app);
}

fn title_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn render_login<M: Messenger>(f: &mut Frame, area: Rect, app: &App<M>) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  🏥 {}", app.session.config().clinic_name),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  1", title_style()),
            Span::raw(". Acesso do Paciente"),
        ]),
        Line::from(vec![
            Span::styled("  2", title_style()),
            Span::raw(". Acesso da Fisioterapeuta"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  q para sair",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(content).block(bordered(" Entrar ")), area);
}

fn render_header<M: Messenger>(f: &mut Frame, area: Rect, app: &App<M>) {
    let mut spans = vec![];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *tab == app.session.tab() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(tab.title(), style));
    }

    if let Some(role) = app.session.role() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(role.label(), Style::default().fg(Color::Cyan)));
    }
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        app.session.today().format("%d/%m/%Y").to_string(),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn render_dashboard<M: Messenger>(f: &mut Frame, area: Rect, app: &App<M>) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut content = vec![Line::from("")];

    match app.session.role() {
        Some(Role::Therapist) => {
            let dashboard = app.session.therapist_dashboard();
            let stats = dashboard.stats;
            content.push(Line::from(vec![
                Span::styled("  Consultas hoje: ", label),
                Span::raw(stats.today_appointments.to_string()),
                Span::styled("   Receita hoje: ", label),
                Span::raw(format_brl(stats.today_revenue)),
            ]));
            content.push(Line::from(vec![
                Span::styled("  Clientes ativos: ", label),
                Span::raw(stats.active_clients.to_string()),
                Span::styled("   Faturas pendentes: ", label),
                Span::raw(stats.pending_invoices.to_string()),
            ]));
            content.push(Line::from(vec![
                Span::styled("  Receita do mês: ", label),
                Span::raw(format_brl(stats.monthly_revenue)),
                Span::styled("   Consultas do mês: ", label),
                Span::raw(stats.monthly_appointments.to_string()),
                Span::styled("   Despesas pendentes: ", label),
                Span::styled(
                    dashboard.pending_expenses.to_string(),
                    Style::default().fg(Color::Red),
                ),
            ]));
            content.push(Line::from(""));
            content.push(Line::from(Span::styled("  AGENDA DE HOJE", title_style())));
            if dashboard.today_agenda.is_empty() {
                content.push(Line::from("  Nenhum agendamento para hoje"));
            }
            for appointment in dashboard.today_agenda {
                content.push(appointment_line(appointment));
            }
            content.push(Line::from(""));
            content.push(Line::from(Span::styled(
                format!("  NOTIFICAÇÕES ({} não lidas)", dashboard.unread),
                title_style(),
            )));
            for n in dashboard.notifications {
                content.push(Line::from(format!("  {} {}", n.kind.icon(), n.message)));
            }
        }
        _ => {
            let dashboard = app.session.client_dashboard();
            content.push(Line::from(Span::styled("  PRÓXIMAS CONSULTAS", title_style())));
            for appointment in dashboard.upcoming {
                content.push(appointment_line(appointment));
            }
            content.push(Line::from(""));
            content.push(Line::from(Span::styled("  FATURAS", title_style())));
            for invoice in dashboard.recent_invoices {
                content.push(Line::from(vec![
                    Span::raw(format!("  {}  {}  ", invoice.description, format_brl(invoice.amount))),
                    Span::styled(invoice.status.label(), Style::default().fg(badge(invoice.status.color()))),
                ]));
            }
            content.push(Line::from(""));
            content.push(Line::from(Span::styled(
                format!("  NOTIFICAÇÕES ({} não lidas)", dashboard.unread),
                title_style(),
            )));
            for n in dashboard.notifications {
                content.push(Line::from(format!("  {} {}", n.kind.icon(), n.message)));
            }
        }
    }

    f.render_widget(Paragraph::new(content).block(bordered(" Dashboard ")), area);
}

fn appointment_line(appointment: &Appointment) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!(
            "  {} {}  {}  {}  ",
            templates::format_date(appointment.date),
            appointment.time_label(),
            appointment.client,
            appointment.service
        )),
        Span::styled(
            appointment.status.label(),
            Style::default().fg(badge(appointment.status.color())),
        ),
    ])
}

fn render_appointments<M: Messenger>(f: &mut Frame, area: Rect, app: &mut App<M>) {
    let filter = match app.session.appointment_board().ok().and_then(|b| b.selected_date()) {
        Some(date) => templates::format_date(date),
        None => "todas as datas".to_string(),
    };

    let header_cells = ["Data", "Horário", "Cliente", "Serviço", "Valor", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(title_style()));
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let visible = app.session.visible_appointments().unwrap_or_default();
    let empty = visible.is_empty();
    let rows: Vec<Row> = visible
        .iter()
        .map(|a| {
            Row::new(vec![
                Cell::from(templates::format_date(a.date)),
                Cell::from(a.time_label()),
                Cell::from(truncate(&a.client, 24)),
                Cell::from(truncate(&a.service, 28)),
                Cell::from(format_brl(a.price)),
                Cell::from(a.status.label()).style(Style::default().fg(badge(a.status.color()))),
            ])
        })
        .collect();

    let title = if empty {
        format!(" Agendamentos - {} (nenhum agendamento encontrado para esta data) ", filter)
    } else {
        format!(" Agendamentos - {} ", filter)
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(26),
            Constraint::Length(30),
            Constraint::Length(12),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(bordered(&title))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_financial<M: Messenger>(f: &mut Frame, area: Rect, app: &mut App<M>) {
    let Ok(board) = app.session.financial_board() else {
        return;
    };
    let tab = board.tab();
    let tabs = board.tabs();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let mut tab_spans = vec![Span::raw(" ")];
    for t in &tabs {
        let style = if *t == tab { title_style() } else { Style::default().fg(Color::DarkGray) };
        tab_spans.push(Span::styled(t.title(), style));
        tab_spans.push(Span::raw("   "));
    }
    f.render_widget(Paragraph::new(Line::from(tab_spans)), chunks[0]);

    match tab {
        FinancialTab::Overview => {
            let store = app.session.store();
            let overview = board.overview(app.session.stats(), store.invoices(), store.expenses());
            let mut content = vec![
                Line::from(""),
                Line::from(format!(
                    "  Receita do mês: {}   Faturas pendentes: {}",
                    format_brl(overview.stats.monthly_revenue),
                    overview.stats.pending_invoices
                )),
                Line::from(""),
                Line::from(Span::styled("  FATURAS RECENTES", title_style())),
            ];
            for invoice in overview.recent_invoices {
                content.push(Line::from(vec![
                    Span::raw(format!("  {:<28} {:>12}  ", invoice.description, format_brl(invoice.amount))),
                    Span::styled(invoice.status.label(), Style::default().fg(badge(invoice.status.color()))),
                ]));
            }
            if let Some(pending) = overview.pending_expenses {
                content.push(Line::from(""));
                content.push(Line::from(Span::styled("  DESPESAS PENDENTES", title_style())));
                for expense in pending {
                    content.push(Line::from(format!(
                        "  {} {:<28} {:>12}  vence {}",
                        expense.category.icon(),
                        expense.description,
                        format_brl(expense.amount),
                        templates::format_date(expense.due_date)
                    )));
                }
            }
            f.render_widget(Paragraph::new(content).block(bordered(" Visão Geral ")), chunks[1]);
        }
        FinancialTab::Invoices => {
            let selected = board
                .selected_invoice(app.session.store().invoices())
                .map(|i| format!(" Fatura {} - {} ", i.id, i.description));
            let rows: Vec<Row> = app
                .session
                .store()
                .invoices()
                .iter()
                .map(|i| {
                    Row::new(vec![
                        Cell::from(truncate(&i.description, 28)),
                        Cell::from(format_brl(i.amount)),
                        Cell::from(templates::format_date(i.date)),
                        Cell::from(templates::format_date(i.due_date)),
                        Cell::from(i.status.label()).style(Style::default().fg(badge(i.status.color()))),
                    ])
                })
                .collect();
            let header = Row::new(
                ["Descrição", "Valor", "Data", "Vencimento", "Status"]
                    .iter()
                    .map(|h| Cell::from(*h).style(title_style())),
            )
            .style(Style::default().bg(Color::DarkGray));
            let title = selected.unwrap_or_else(|| " Faturas ".to_string());
            let table = Table::new(
                rows,
                [
                    Constraint::Length(30),
                    Constraint::Length(14),
                    Constraint::Length(12),
                    Constraint::Length(12),
                    Constraint::Length(12),
                ],
            )
            .header(header)
            .block(bordered(&title))
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("→ ");
            f.render_stateful_widget(table, chunks[1], &mut app.table_state);
        }
        FinancialTab::Expenses => {
            let rows: Vec<Row> = app
                .session
                .store()
                .expenses()
                .iter()
                .map(|e| {
                    let recurring = if e.recurring { "Recorrente" } else { "" };
                    Row::new(vec![
                        Cell::from(format!("{} {}", e.category.icon(), truncate(&e.description, 26))),
                        Cell::from(e.category.display_name()),
                        Cell::from(format_brl(e.amount)),
                        Cell::from(templates::format_date(e.due_date)),
                        Cell::from(recurring),
                        Cell::from(e.status.label()).style(Style::default().fg(badge(e.status.color()))),
                    ])
                })
                .collect();
            let header = Row::new(
                ["Descrição", "Categoria", "Valor", "Vencimento", "", "Status"]
                    .iter()
                    .map(|h| Cell::from(*h).style(title_style())),
            )
            .style(Style::default().bg(Color::DarkGray));
            let table = Table::new(
                rows,
                [
                    Constraint::Length(32),
                    Constraint::Length(14),
                    Constraint::Length(14),
                    Constraint::Length(12),
                    Constraint::Length(11),
                    Constraint::Length(12),
                ],
            )
            .header(header)
            .block(bordered(" Despesas "))
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("→ ");

            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(chunks[1]);
            let totals = Paragraph::new(category_totals(app.session.store().expenses()))
                .block(bordered(" Por Categoria "));

            f.render_stateful_widget(table, parts[0], &mut app.table_state);
            f.render_widget(totals, parts[1]);
        }
    }
}

fn form_line(label: &str, value: String, active: bool) -> Line<'static> {
    let marker = if active {
        Span::styled("→ ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::raw("  ")
    };
    Line::from(vec![
        Span::raw("  "),
        marker,
        Span::styled(format!("{:<14}", label), Style::default().fg(Color::Cyan)),
        Span::raw(value),
    ])
}

fn render_appointment_form<M: Messenger>(f: &mut Frame, area: Rect, app: &App<M>, field: usize) {
    let Some(draft) = app.session.appointment_board().ok().and_then(|b| b.draft()) else {
        return;
    };
    let price = if app.price_input.is_empty() {
        format!("{:.2}", draft.price)
    } else {
        app.price_input.clone()
    };
    let values = [
        draft.date.clone(),
        draft.time.clone(),
        draft.client.clone(),
        draft.client_id.clone(),
        format!("◀ {} ▶", if draft.service.is_empty() { "Selecione um serviço" } else { &draft.service }),
        price,
        draft.notes.clone(),
    ];

    let mut content = vec![Line::from("")];
    for (i, (label, value)) in APPOINTMENT_FIELDS.iter().zip(values).enumerate() {
        content.push(form_line(label, value, i == field));
    }
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Tab próximo campo | ←/→ serviço | Enter criar | Esc cancelar",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(bordered(" Nova Consulta ")), area);
}

fn render_expense_form<M: Messenger>(f: &mut Frame, area: Rect, app: &App<M>, field: usize) {
    let Some(draft) = app.session.financial_board().ok().and_then(|b| b.draft()) else {
        return;
    };
    let category: ExpenseCategory = draft.category;
    let values = [
        draft.description.clone(),
        draft.amount.clone(),
        format!("◀ {} {} ▶", category.icon(), category.display_name()),
        app.due_input.clone(),
        if draft.recurring { "[x]".to_string() } else { "[ ]".to_string() },
    ];

    let mut content = vec![Line::from("")];
    for (i, (label, value)) in EXPENSE_FIELDS.iter().zip(values).enumerate() {
        content.push(form_line(label, value, i == field));
    }
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Tab próximo campo | ←/→ categoria | Espaço recorrente | Enter adicionar | Esc cancelar",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(bordered(" Nova Despesa ")), area);
}

fn render_status_bar<M: Messenger>(f: &mut Frame, area: Rect, app: &App<M>) {
    let mut spans = vec![];

    if let Some((message, color)) = &app.status {
        spans.push(Span::styled(format!(" {} ", message), Style::default().fg(*color)));
    } else {
        let hints: &[(&str, &str)] = match (app.session.tab(), app.session.role()) {
            (Tab::Appointments, Some(Role::Therapist)) => &[
                ("[/]", " Dia"), ("a", " Todos"), ("n", " Nova"), ("c", " Confirmar"),
                ("p", " Ligar"), ("s", " Status"), ("d", " Cancelar"),
            ],
            (Tab::Appointments, _) => &[("[/]", " Dia"), ("a", " Todos"), ("r", " Reagendar"), ("c", " Confirmar")],
            (Tab::Financial, Some(Role::Therapist)) => &[
                ("f", " Aba"), ("m", " Lembrete"), ("P", " Pago"), ("x", " Despesa"), ("p", " Despesa paga"),
            ],
            (Tab::Financial, _) => &[("f", " Aba"), ("Enter", " Detalhes"), ("p", " Pagar")],
            (Tab::Dashboard, _) => &[],
        };
        for (key, text) in hints {
            spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(format!("{} | ", text)));
        }
    }

    spans.push(Span::styled(" Tab", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Página | "));
    spans.push(Span::styled("w", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" WhatsApp | "));
    spans.push(Span::styled("l", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Sair | "));
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Fechar"));

    let clinic = phone::format(&app.session.config().clinic_whatsapp);
    spans.push(Span::styled(format!("  ☎ {}", clinic), Style::default().fg(Color::DarkGray)));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

/// One `icon name total` entry per non-empty category
fn category_totals(expenses: &[Expense]) -> String {
    group_by_category(expenses)
        .iter()
        .map(|group| {
            format!(
                "{} {} {}",
                group.category.icon(),
                group.category.display_name(),
                format_brl(group.total)
            )
        })
        .collect::<Vec<_>>()
        .join("  │  ")
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caramelo_clinic::{seed, ClinicConfig, Outbox};
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App<Outbox>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn logged_in(role_key: char) -> App<Outbox> {
        let session = Session::new(
            ClinicConfig::default(),
            seed::seeded_store(),
            Outbox::new(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );
        let mut app = App::new(session);
        press(&mut app, KeyCode::Char(role_key));
        app
    }

    fn selected_invoice_id(app: &App<Outbox>) -> Option<String> {
        let board = app.session.financial_board().unwrap();
        board
            .selected_invoice(app.session.store().invoices())
            .map(|i| i.id.clone())
    }

    #[test]
    fn test_enter_only_opens_invoices_on_invoice_tab() {
        let mut app = logged_in('2');
        app.session.set_tab(Tab::Financial);

        // overview
        press(&mut app, KeyCode::Enter);
        assert_eq!(selected_invoice_id(&app), None);

        // expenses, second row
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.session.financial_board().unwrap().tab(), FinancialTab::Expenses);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(selected_invoice_id(&app), None);

        // invoices, second row
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.session.financial_board().unwrap().tab(), FinancialTab::Invoices);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(selected_invoice_id(&app).as_deref(), Some("2"));
    }

    #[test]
    fn test_category_totals_follow_category_order() {
        let totals = category_totals(&seed::expenses());

        assert_eq!(
            totals,
            "🏠 Aluguel R$ 2500.00  │  ⚡ Utilidades R$ 350.00  │  \
             📦 Materiais R$ 800.00  │  🔧 Equipamentos R$ 1200.00"
        );
        assert_eq!(category_totals(&[]), "");
    }

    #[test]
    fn test_help_shortcut_records_link() {
        let mut app = logged_in('1');
        press(&mut app, KeyCode::Char('w'));

        assert_eq!(app.session.messenger().links().len(), 1);
        assert!(matches!(&app.status, Some((text, Color::Green)) if text.starts_with("WhatsApp: ")));
    }
}
