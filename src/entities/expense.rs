// 💸 Expense Entity - an outgoing clinic cost, optionally recurring

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Identified, PaymentStatus};

// ============================================================================
// EXPENSE CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Rent,
    Utilities,
    Supplies,
    Equipment,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Rent,
        ExpenseCategory::Utilities,
        ExpenseCategory::Supplies,
        ExpenseCategory::Equipment,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Supplies => "supplies",
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "🏠",
            ExpenseCategory::Utilities => "⚡",
            ExpenseCategory::Supplies => "📦",
            ExpenseCategory::Equipment => "🔧",
            ExpenseCategory::Other => "📄",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Aluguel",
            ExpenseCategory::Utilities => "Utilidades",
            ExpenseCategory::Supplies => "Materiais",
            ExpenseCategory::Equipment => "Equipamentos",
            ExpenseCategory::Other => "Outros",
        }
    }

    /// Cycle used by the category selector
    pub fn next(&self) -> Self {
        match self {
            ExpenseCategory::Rent => ExpenseCategory::Utilities,
            ExpenseCategory::Utilities => ExpenseCategory::Supplies,
            ExpenseCategory::Supplies => ExpenseCategory::Equipment,
            ExpenseCategory::Equipment => ExpenseCategory::Other,
            ExpenseCategory::Other => ExpenseCategory::Rent,
        }
    }
}

// ============================================================================
// EXPENSE ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,

    /// Date incurred
    pub date: NaiveDate,

    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub recurring: bool,
}

impl Identified for Expense {
    const KIND: &'static str = "Expense";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Expense fields supplied by the caller; id and status come from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub recurring: bool,
}

impl NewExpense {
    pub(crate) fn into_expense(self, id: String) -> Expense {
        Expense {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            date: self.date,
            due_date: self.due_date,
            status: PaymentStatus::Pending,
            recurring: self.recurring,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_icons_and_names() {
        let expected = [
            (ExpenseCategory::Rent, "🏠", "Aluguel"),
            (ExpenseCategory::Utilities, "⚡", "Utilidades"),
            (ExpenseCategory::Supplies, "📦", "Materiais"),
            (ExpenseCategory::Equipment, "🔧", "Equipamentos"),
            (ExpenseCategory::Other, "📄", "Outros"),
        ];

        for (category, icon, name) in expected {
            assert_eq!(category.icon(), icon);
            assert_eq!(category.display_name(), name);
        }
    }

    #[test]
    fn test_category_defaults_to_other() {
        assert_eq!(ExpenseCategory::default(), ExpenseCategory::Other);
    }

    #[test]
    fn test_category_cycle_visits_all() {
        let mut category = ExpenseCategory::Rent;
        let mut seen = Vec::new();
        for _ in 0..ExpenseCategory::ALL.len() {
            seen.push(category);
            category = category.next();
        }

        assert_eq!(category, ExpenseCategory::Rent);
        assert_eq!(seen, ExpenseCategory::ALL.to_vec());
    }
}
