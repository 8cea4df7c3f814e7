use serde::{Deserialize, Serialize};

/// Expense category.
///
/// Blank labels map to [`ExpenseCategory::Uncategorized`]. Labels outside the
/// known set are kept verbatim in [`ExpenseCategory::Other`] so older records
/// round-trip unchanged and still show up in the yearly breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpenseCategory {
    Food,
    Travelling,
    Shopping,
    Groceries,
    Recharge,
    Cosmetics,
    #[default]
    Uncategorized,
    /// A label no longer offered for new expenses.
    Other(String),
}

impl ExpenseCategory {
    /// The fixed set shown in the today/month breakdowns, in chart order.
    pub const CHARTED: [ExpenseCategory; 6] = [
        ExpenseCategory::Food,
        ExpenseCategory::Travelling,
        ExpenseCategory::Shopping,
        ExpenseCategory::Groceries,
        ExpenseCategory::Recharge,
        ExpenseCategory::Cosmetics,
    ];

    pub fn label(&self) -> &str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Travelling => "Travelling",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Groceries => "Groceries",
            ExpenseCategory::Recharge => "Recharge",
            ExpenseCategory::Cosmetics => "Cosmetics",
            ExpenseCategory::Uncategorized => "Uncategorized",
            ExpenseCategory::Other(label) => label,
        }
    }

    /// Lenient parse: known labels match case-insensitively, blank is
    /// `Uncategorized`, anything else is kept as `Other`.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("uncategorized") {
            return ExpenseCategory::Uncategorized;
        }
        Self::CHARTED
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| ExpenseCategory::Other(trimmed.to_string()))
    }

    /// Whether this category has a slot in the fixed chart set.
    pub fn is_charted(&self) -> bool {
        Self::CHARTED.contains(self)
    }
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ExpenseCategory {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<&str> for ExpenseCategory {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<ExpenseCategory> for String {
    fn from(c: ExpenseCategory) -> Self {
        match c {
            ExpenseCategory::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}
