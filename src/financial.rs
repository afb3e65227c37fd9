// 💰 Financial Board - overview, invoices and expenses
//
// Stats arrive as a ready-made `DashboardStats`; the board never computes them.
// Invoices are read-only here apart from reminder/payment messages.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::entities::{Expense, ExpenseCategory, Invoice, NewExpense, PaymentStatus};
use crate::error::{ClinicError, ClinicResult};
use crate::session::Role;
use crate::stats::DashboardStats;
use crate::store::FinancialCommands;
use crate::whatsapp::{templates, OutboundMessage};

/// How many rows the overview lists show
pub const OVERVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialTab {
    Overview,
    Invoices,
    Expenses,
}

impl FinancialTab {
    pub fn title(&self) -> &'static str {
        match self {
            FinancialTab::Overview => "Visão Geral",
            FinancialTab::Invoices => "Faturas",
            FinancialTab::Expenses => "Despesas",
        }
    }
}

// ============================================================================
// EXPENSE FORM
// ============================================================================

/// The "new expense" form as typed
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    /// Raw amount input, parsed on submit
    pub amount: String,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub recurring: bool,
}

impl ExpenseDraft {
    /// Empty form dated `today`, category `other`
    pub fn new(today: NaiveDate) -> Self {
        ExpenseDraft {
            description: String::new(),
            amount: String::new(),
            category: ExpenseCategory::default(),
            date: today,
            due_date: today,
            recurring: false,
        }
    }

    pub fn validate(&self) -> ClinicResult<NewExpense> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ClinicError::missing("description"));
        }

        let amount = parse_amount(&self.amount)?;

        Ok(NewExpense {
            description: description.to_string(),
            amount,
            category: self.category,
            date: self.date,
            due_date: self.due_date,
            recurring: self.recurring,
        })
    }
}

/// Positive, finite number; a decimal comma is accepted
pub fn parse_amount(input: &str) -> ClinicResult<f64> {
    let invalid = || ClinicError::InvalidAmount {
        value: input.to_string(),
    };

    let amount: f64 = input.trim().replace(',', ".").parse().map_err(|_| invalid())?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid());
    }
    Ok(amount)
}

// ============================================================================
// VIEWS
// ============================================================================

/// What the overview tab shows
#[derive(Debug, Clone, PartialEq)]
pub struct Overview<'a> {
    pub stats: DashboardStats,
    pub recent_invoices: Vec<&'a Invoice>,
    /// Therapist only
    pub pending_expenses: Option<Vec<&'a Expense>>,
}

/// Expenses of one category with their total
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: ExpenseCategory,
    pub expenses: Vec<&'a Expense>,
    pub total: f64,
}

/// Group expenses by category, in `ExpenseCategory::ALL` order, skipping empty groups
pub fn group_by_category(expenses: &[Expense]) -> Vec<CategoryGroup<'_>> {
    let mut buckets: HashMap<ExpenseCategory, Vec<&Expense>> = HashMap::new();
    for expense in expenses {
        buckets.entry(expense.category).or_default().push(expense);
    }

    ExpenseCategory::ALL
        .iter()
        .filter_map(|category| {
            buckets.remove(category).map(|expenses| CategoryGroup {
                category: *category,
                total: expenses.iter().map(|e| e.amount).sum(),
                expenses,
            })
        })
        .collect()
}

// ============================================================================
// FINANCIAL BOARD
// ============================================================================

#[derive(Debug, Clone)]
pub struct FinancialBoard {
    role: Role,
    tab: FinancialTab,
    draft: Option<ExpenseDraft>,
    selected_invoice: Option<String>,
}

impl FinancialBoard {
    pub fn new(role: Role) -> Self {
        FinancialBoard {
            role,
            tab: FinancialTab::Overview,
            draft: None,
            selected_invoice: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tab(&self) -> FinancialTab {
        self.tab
    }

    /// Tabs this role can open
    pub fn tabs(&self) -> Vec<FinancialTab> {
        match self.role {
            Role::Therapist => vec![FinancialTab::Overview, FinancialTab::Invoices, FinancialTab::Expenses],
            Role::Client => vec![FinancialTab::Overview, FinancialTab::Invoices],
        }
    }

    pub fn select_tab(&mut self, tab: FinancialTab) -> ClinicResult<()> {
        if !self.tabs().contains(&tab) {
            return Err(ClinicError::forbidden(self.role, "view expenses"));
        }
        self.tab = tab;
        Ok(())
    }

    /// Cycle to the next tab this role can open
    pub fn next_tab(&mut self) {
        let tabs = self.tabs();
        let index = tabs.iter().position(|t| *t == self.tab).unwrap_or(0);
        self.tab = tabs[(index + 1) % tabs.len()];
    }

    pub fn overview<'a>(
        &self,
        stats: DashboardStats,
        invoices: &'a [Invoice],
        expenses: &'a [Expense],
    ) -> Overview<'a> {
        let pending_expenses = (self.role == Role::Therapist).then(|| {
            expenses
                .iter()
                .filter(|e| e.status == PaymentStatus::Pending)
                .take(OVERVIEW_ROWS)
                .collect()
        });

        Overview {
            stats,
            recent_invoices: invoices.iter().take(OVERVIEW_ROWS).collect(),
            pending_expenses,
        }
    }

    // ------------------------------------------------------------------------
    // Invoices
    // ------------------------------------------------------------------------

    pub fn view_invoice(&mut self, id: &str) {
        self.selected_invoice = Some(id.to_string());
    }

    pub fn close_invoice(&mut self) {
        self.selected_invoice = None;
    }

    pub fn selected_invoice<'a>(&self, invoices: &'a [Invoice]) -> Option<&'a Invoice> {
        let id = self.selected_invoice.as_deref()?;
        invoices.iter().find(|i| i.id == id)
    }

    /// Therapist: payment reminder to the client, for any invoice not yet paid
    pub fn send_invoice_reminder(&self, invoice: &Invoice, phone: &str) -> ClinicResult<OutboundMessage> {
        self.require(Role::Therapist, "send payment reminders")?;
        if invoice.status == PaymentStatus::Paid {
            return Err(invoice_state(invoice, "send a reminder"));
        }
        Ok(OutboundMessage::to_phone(phone, templates::invoice_reminder(invoice)))
    }

    /// Therapist: receipt for a paid invoice
    pub fn send_payment_confirmation(&self, invoice: &Invoice, phone: &str) -> ClinicResult<OutboundMessage> {
        self.require(Role::Therapist, "send receipts")?;
        if invoice.status != PaymentStatus::Paid {
            return Err(invoice_state(invoice, "confirm payment"));
        }
        Ok(OutboundMessage::to_phone(phone, templates::payment_confirmation(invoice)))
    }

    /// Client: ask the clinic how to settle a pending invoice
    pub fn request_payment(&self, invoice: &Invoice) -> ClinicResult<OutboundMessage> {
        self.require(Role::Client, "pay invoices")?;
        if invoice.status != PaymentStatus::Pending {
            return Err(invoice_state(invoice, "pay"));
        }
        Ok(OutboundMessage::to_clinic(templates::payment_request(invoice)))
    }

    // ------------------------------------------------------------------------
    // Expenses (therapist)
    // ------------------------------------------------------------------------

    pub fn open_expense_form(&mut self, today: NaiveDate) -> ClinicResult<&mut ExpenseDraft> {
        self.require(Role::Therapist, "create expenses")?;
        Ok(self.draft.get_or_insert_with(|| ExpenseDraft::new(today)))
    }

    pub fn draft(&self) -> Option<&ExpenseDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ExpenseDraft> {
        self.draft.as_mut()
    }

    pub fn close_expense_form(&mut self) {
        self.draft = None;
    }

    /// Submit the open form; status is forced to `pending` by the store
    pub fn submit_expense(&mut self, commands: &mut dyn FinancialCommands) -> ClinicResult<String> {
        self.require(Role::Therapist, "create expenses")?;
        let draft = self
            .draft
            .as_ref()
            .ok_or(ClinicError::NoOpenForm { form: "expense" })?;

        let new = draft.validate().map_err(|e| {
            warn!(error = %e, "expense form rejected");
            e
        })?;

        let id = commands.create_expense(new);
        self.draft = None;
        Ok(id)
    }

    /// Change an expense's payment status (full-record replacement)
    pub fn set_expense_status(
        &self,
        expense: &Expense,
        status: PaymentStatus,
        commands: &mut dyn FinancialCommands,
    ) -> ClinicResult<()> {
        self.require(Role::Therapist, "update expenses")?;
        let mut record = expense.clone();
        record.status = status;
        commands.update_expense(record)
    }

    fn require(&self, role: Role, action: &'static str) -> ClinicResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ClinicError::forbidden(self.role, action))
        }
    }
}

fn invoice_state(invoice: &Invoice, action: &'static str) -> ClinicError {
    ClinicError::InvalidState {
        kind: "Invoice",
        id: invoice.id.clone(),
        status: invoice.status.as_str(),
        action,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::whatsapp::Recipient;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("800").unwrap(), 800.0);
        assert_eq!(parse_amount(" 12,50 ").unwrap(), 12.5);
        assert!(matches!(parse_amount("0"), Err(ClinicError::InvalidAmount { .. })));
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn test_expense_accepted_with_pending_status() {
        let mut store = seed::seeded_store();
        let mut board = FinancialBoard::new(Role::Therapist);

        let draft = board.open_expense_form(today()).unwrap();
        assert_eq!(draft.category, ExpenseCategory::Other);
        draft.description = "Material Terapêutico".to_string();
        draft.amount = "800".to_string();
        draft.category = ExpenseCategory::Supplies;

        let id = board.submit_expense(&mut store).unwrap();

        let created = store.find_expense(&id).unwrap();
        assert_eq!(created.status, PaymentStatus::Pending);
        assert_eq!(created.amount, 800.0);
        assert_eq!(created.category, ExpenseCategory::Supplies);
        assert_eq!(created.due_date, today());
        assert!(board.draft().is_none());
    }

    #[test]
    fn test_expense_rejected_for_bad_amount() {
        for amount in ["0", "abc"] {
            let mut store = seed::seeded_store();
            let before = store.expenses().to_vec();
            let mut board = FinancialBoard::new(Role::Therapist);

            let draft = board.open_expense_form(today()).unwrap();
            draft.description = "Internet".to_string();
            draft.amount = amount.to_string();

            let err = board.submit_expense(&mut store).unwrap_err();
            assert!(err.is_validation());
            assert_eq!(store.expenses(), before.as_slice());
            assert!(board.draft().is_some());
        }
    }

    #[test]
    fn test_expense_rejected_without_description() {
        let mut store = seed::seeded_store();
        let mut board = FinancialBoard::new(Role::Therapist);
        board.open_expense_form(today()).unwrap().amount = "100".to_string();

        assert!(matches!(
            board.submit_expense(&mut store),
            Err(ClinicError::MissingField { field: "description" })
        ));
        assert_eq!(store.expenses().len(), 4);
    }

    #[test]
    fn test_client_has_no_expense_tab() {
        let mut board = FinancialBoard::new(Role::Client);

        assert_eq!(board.tabs(), vec![FinancialTab::Overview, FinancialTab::Invoices]);
        assert!(board.select_tab(FinancialTab::Expenses).is_err());
        assert_eq!(board.tab(), FinancialTab::Overview);
        assert!(board.open_expense_form(today()).is_err());

        board.next_tab();
        board.next_tab();
        assert_eq!(board.tab(), FinancialTab::Overview);
    }

    #[test]
    fn test_overview_lists() {
        let store = seed::seeded_store();
        let stats = DashboardStats::derive(store.appointments(), store.invoices(), today());

        let therapist = FinancialBoard::new(Role::Therapist);
        let overview = therapist.overview(stats, store.invoices(), store.expenses());
        assert_eq!(overview.recent_invoices.len(), 4);
        assert_eq!(overview.stats, stats);

        let pending = overview.pending_expenses.unwrap();
        assert_eq!(pending.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["1", "2", "4"]);

        let client = FinancialBoard::new(Role::Client);
        assert!(client.overview(stats, store.invoices(), store.expenses()).pending_expenses.is_none());
    }

    #[test]
    fn test_group_by_category() {
        let mut expenses = seed::expenses();
        expenses.push(Expense {
            id: "5".to_string(),
            description: "Aluguel sala 2".to_string(),
            amount: 500.0,
            ..expenses[0].clone()
        });

        let groups = group_by_category(&expenses);
        let categories: Vec<_> = groups.iter().map(|g| g.category).collect();
        assert_eq!(
            categories,
            vec![
                ExpenseCategory::Rent,
                ExpenseCategory::Utilities,
                ExpenseCategory::Supplies,
                ExpenseCategory::Equipment
            ]
        );
        assert_eq!(groups[0].expenses.len(), 2);
        assert_eq!(groups[0].total, 3000.0);
    }

    #[test]
    fn test_invoice_reminder_never_mutates() {
        let store = seed::seeded_store();
        let board = FinancialBoard::new(Role::Therapist);

        let pending = store.find_invoice("2").unwrap();
        let message = board.send_invoice_reminder(pending, "11999999999").unwrap();
        assert_eq!(message.recipient, Recipient::Phone("11999999999".to_string()));
        assert!(message.text.contains("Terapia Ocupacional"));
        assert_eq!(store.find_invoice("2").unwrap().status, PaymentStatus::Pending);

        let overdue = store.find_invoice("3").unwrap();
        assert!(board.send_invoice_reminder(overdue, "11999999999").is_ok());

        let paid = store.find_invoice("1").unwrap();
        assert!(matches!(
            board.send_invoice_reminder(paid, "11999999999"),
            Err(ClinicError::InvalidState { .. })
        ));
        assert!(board.send_payment_confirmation(paid, "11999999999").is_ok());
    }

    #[test]
    fn test_client_payment_request() {
        let store = seed::seeded_store();
        let board = FinancialBoard::new(Role::Client);

        let message = board.request_payment(store.find_invoice("4").unwrap()).unwrap();
        assert_eq!(message.recipient, Recipient::Clinic);
        assert_eq!(
            message.text,
            "Gostaria de quitar a fatura: Fisioterapia Neurológica - R$ 120.00"
        );

        assert!(board.request_payment(store.find_invoice("3").unwrap()).is_err());
        assert!(board.send_invoice_reminder(store.find_invoice("2").unwrap(), "1").is_err());
    }

    #[test]
    fn test_selected_invoice() {
        let store = seed::seeded_store();
        let mut board = FinancialBoard::new(Role::Client);
        assert!(board.selected_invoice(store.invoices()).is_none());

        board.view_invoice("3");
        assert_eq!(board.selected_invoice(store.invoices()).unwrap().description, "Fonoaudiologia");

        board.close_invoice();
        assert!(board.selected_invoice(store.invoices()).is_none());
    }

    #[test]
    fn test_set_expense_status() {
        let mut store = seed::seeded_store();
        let board = FinancialBoard::new(Role::Therapist);
        let expense = store.find_expense("1").unwrap().clone();

        board.set_expense_status(&expense, PaymentStatus::Paid, &mut store).unwrap();
        assert_eq!(store.find_expense("1").unwrap().status, PaymentStatus::Paid);
    }
}
