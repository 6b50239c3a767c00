use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single income or expense record as served by the backend.
///
/// Transactions are created and deleted but never mutated in place; every
/// derived view (category totals, monthly series, budget rollups) is
/// recomputed from the full list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Always positive; `kind` carries the direction of the flow.
    pub amount: f64,
    pub description: String,
    /// Must name a category registered for this transaction's kind.
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Calendar date as sent by the backend, either `YYYY-MM-DD` or a full
    /// RFC 3339 timestamp.
    pub date: String,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Transaction {
    /// Parse the transaction's calendar date, tolerating both plain dates
    /// and RFC 3339 timestamps.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

/// Parse the `YYYY-MM-DD` prefix of a date string. Anything after a `T`
/// (time-of-day, offset) is ignored; a string that does not start with a
/// calendar date yields `None`.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// A per-category monthly spending cap.
///
/// `spent` is derived, never stored: the backend may omit it and the client
/// always recomputes it from the transaction list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: String,
    /// The configured cap.
    pub amount: f64,
    #[serde(default)]
    pub spent: f64,
    /// 1-12.
    pub month: u32,
    pub year: i32,
}

/// The registry of valid category names, split by transaction kind.
///
/// Names are unique within a kind and keep their server-side order. A name
/// may be added but never removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySet {
    pub income: Vec<String>,
    pub expense: Vec<String>,
}

impl CategorySet {
    /// Category names available under a kind selection. "All" concatenates
    /// income then expense, preserving order.
    pub fn for_selection(&self, selection: &KindSelection) -> Vec<String> {
        match selection {
            KindSelection::Only(TransactionKind::Income) => self.income.clone(),
            KindSelection::Only(TransactionKind::Expense) => self.expense.clone(),
            KindSelection::All => {
                let mut all = self.income.clone();
                all.extend(self.expense.iter().cloned());
                all
            }
        }
    }

    /// Whether `name` is registered for `kind`.
    pub fn contains(&self, name: &str, kind: TransactionKind) -> bool {
        match kind {
            TransactionKind::Income => self.income.iter().any(|c| c == name),
            TransactionKind::Expense => self.expense.iter().any(|c| c == name),
        }
    }
}

/// Kind clause of a filter: a single kind or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindSelection {
    All,
    Only(TransactionKind),
}

impl KindSelection {
    pub fn matches(&self, kind: TransactionKind) -> bool {
        match self {
            KindSelection::All => true,
            KindSelection::Only(only) => *only == kind,
        }
    }

    /// Value used for the `type=` query parameter of the analytics API.
    pub fn as_query(&self) -> &'static str {
        match self {
            KindSelection::All => "All",
            KindSelection::Only(kind) => kind.as_str(),
        }
    }
}

/// Category clause of a filter: a single name or everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    All,
    Named(String),
}

impl CategorySelection {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Named(name) => name == category,
        }
    }
}

/// Query parameters for the analytics views. Two copies live side by side,
/// a draft being edited and an applied one driving the aggregates; see the
/// frontend filter controller.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub category: CategorySelection,
    pub kind: KindSelection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TransactionFilter {
    /// The default view: current-month expenses across all categories.
    pub fn default_for(today: NaiveDate) -> Self {
        Self {
            category: CategorySelection::All,
            kind: KindSelection::Only(TransactionKind::Expense),
            start_date: first_of_month(today),
            end_date: today,
        }
    }

    /// Selection predicate, all three clauses ANDed. The end date is
    /// inclusive through the whole of its day: comparison happens at date
    /// granularity, so a timestamp anywhere inside `end_date` matches.
    /// Transactions whose date cannot be parsed never match.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let Some(date) = transaction.calendar_date() else {
            return false;
        };
        date >= self.start_date
            && date <= self.end_date
            && self.category.matches(&transaction.category)
            && self.kind.matches(transaction.kind)
    }
}

/// Per-category totals for the analytics view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    /// Sum of matching transaction amounts, rounded to 2 decimals.
    pub amount: f64,
    pub count: usize,
    /// Share of the filtered total, rounded to 1 decimal. 0 when the
    /// filtered total is 0.
    pub percentage: f64,
}

/// One point of the monthly trend series. Computed by the backend; the
/// client stores and displays it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub amount: f64,
}

/// Server-computed budget-vs-spent pair for the comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
}

/// Client-side rollup of one budget against current-month spending.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatus {
    pub id: String,
    pub category: String,
    /// The configured cap.
    pub amount: f64,
    /// Current calendar month expense total for the category.
    pub spent: f64,
    /// spent / amount * 100 when the cap is positive, else 0.
    pub percent_used: f64,
    /// amount - spent; negative when over budget.
    pub remaining: f64,
    /// Strictly over the cap. A zero cap is never over budget.
    pub over_budget: bool,
    /// Used more than 80% of the cap without going over.
    pub near_limit: bool,
}

impl BudgetStatus {
    /// Human-readable remaining/overrun line, e.g. "Over by ₹200.00" or
    /// "₹800.00 remaining".
    pub fn status_line(&self) -> String {
        if self.over_budget {
            format!("Over by {}", format_inr(self.spent - self.amount))
        } else {
            format!("{} remaining", format_inr(self.remaining))
        }
    }
}

/// Dashboard headline figures, recomputed from the transaction list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
}

/// Authenticated user profile as returned by `/api/user/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Payload for POST /api/transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: String,
}

/// Payload for POST /api/budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBudgetRequest {
    pub category: String,
    pub amount: f64,
    pub month: u32,
    pub year: i32,
}

/// Payload for PUT /api/budgets/{id}. Only the cap is editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBudgetRequest {
    pub amount: f64,
}

/// Payload for POST /api/categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Error body shape used by the backend collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Format an amount the way the UI displays money: rupee sign, en-IN digit
/// grouping (last three digits, then pairs), two decimals.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let rupees = (cents / 100).to_string();
    let paise = cents % 100;

    let grouped = if rupees.len() > 3 {
        let (head, tail) = rupees.split_at(rupees.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            parts.push(&head[end - 2..end]);
            end -= 2;
        }
        parts.push(&head[..end]);
        parts.reverse();
        format!("{},{}", parts.join(","), tail)
    } else {
        rupees
    };

    if negative {
        format!("-₹{}.{:02}", grouped, paise)
    } else {
        format!("₹{}.{:02}", grouped, paise)
    }
}

/// Form-level validation failure, caught before any network call and shown
/// inline next to the offending field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    EmptyField(&'static str),
    InvalidAmount(String),
    AmountNotPositive,
    UnknownCategory {
        category: String,
        kind: TransactionKind,
    },
    InvalidMonth(u32),
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::EmptyField(field) => write!(f, "Please fill in the {} field", field),
            FormError::InvalidAmount(raw) => write!(f, "\"{}\" is not a valid amount", raw),
            FormError::AmountNotPositive => {
                write!(f, "Please enter a valid amount greater than 0")
            }
            FormError::UnknownCategory { category, kind } => {
                write!(f, "\"{}\" is not a known {} category", category, kind)
            }
            FormError::InvalidMonth(month) => write!(f, "{} is not a valid month", month),
        }
    }
}

impl std::error::Error for FormError {}

/// Raw user input of the create-transaction form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionForm {
    pub amount: String,
    pub description: String,
    pub category: String,
    pub kind: Option<TransactionKind>,
    pub date: String,
}

/// Validate the create-transaction form against the category registry.
/// Every field is required, the amount must parse to a positive number and
/// the category must be registered for the chosen kind.
pub fn validate_transaction_form(
    form: &TransactionForm,
    categories: &CategorySet,
) -> Result<CreateTransactionRequest, FormError> {
    let kind = form.kind.ok_or(FormError::EmptyField("type"))?;
    if form.description.trim().is_empty() {
        return Err(FormError::EmptyField("description"));
    }
    if form.category.trim().is_empty() {
        return Err(FormError::EmptyField("category"));
    }
    if form.date.trim().is_empty() {
        return Err(FormError::EmptyField("date"));
    }
    let amount = parse_positive_amount(&form.amount)?;
    if !categories.contains(&form.category, kind) {
        return Err(FormError::UnknownCategory {
            category: form.category.clone(),
            kind,
        });
    }
    Ok(CreateTransactionRequest {
        amount,
        description: form.description.trim().to_string(),
        category: form.category.clone(),
        kind,
        date: form.date.clone(),
    })
}

/// Validate the create-budget form.
pub fn validate_budget_form(
    category: &str,
    amount: &str,
    month: u32,
    year: i32,
) -> Result<CreateBudgetRequest, FormError> {
    if category.trim().is_empty() {
        return Err(FormError::EmptyField("category"));
    }
    if !(1..=12).contains(&month) {
        return Err(FormError::InvalidMonth(month));
    }
    let amount = parse_positive_amount(amount)?;
    Ok(CreateBudgetRequest {
        category: category.to_string(),
        amount,
        month,
        year,
    })
}

fn parse_positive_amount(raw: &str) -> Result<f64, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormError::EmptyField("amount"));
    }
    let amount = trimmed
        .parse::<f64>()
        .map_err(|_| FormError::InvalidAmount(raw.to_string()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FormError::AmountNotPositive);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transaction(category: &str, kind: TransactionKind, date: &str) -> Transaction {
        Transaction {
            id: format!("tx-{}-{}", category, date),
            amount: 100.0,
            description: "test".to_string(),
            category: category.to_string(),
            kind,
            date: date.to_string(),
        }
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2025-06-15"), Some(date(2025, 6, 15)));
        assert_eq!(
            parse_calendar_date("2025-06-15T13:45:00.000Z"),
            Some(date(2025, 6, 15))
        );
        assert_eq!(parse_calendar_date("15/06/2025"), None);
        assert_eq!(parse_calendar_date(""), None);
    }

    #[test]
    fn test_transaction_json_uses_type_field() {
        let json = r#"{
            "id": "t1",
            "amount": 42.5,
            "description": "groceries",
            "category": "Food & Dining",
            "type": "expense",
            "date": "2025-06-15"
        }"#;
        let parsed: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Expense);

        let round_trip = serde_json::to_value(&parsed).unwrap();
        assert_eq!(round_trip["type"], "expense");
    }

    #[test]
    fn test_budget_spent_defaults_when_omitted() {
        let json = r#"{
            "id": "b1",
            "category": "Food",
            "amount": 1000.0,
            "month": 6,
            "year": 2025
        }"#;
        let parsed: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.spent, 0.0);
    }

    #[test]
    fn test_filter_matches_date_bounds_inclusive() {
        let filter = TransactionFilter {
            category: CategorySelection::All,
            kind: KindSelection::All,
            start_date: date(2025, 6, 1),
            end_date: date(2025, 6, 15),
        };

        // A timestamp late on the end date still matches: comparison is at
        // date granularity.
        let on_end = transaction("Food", TransactionKind::Expense, "2025-06-15T23:59:59.000Z");
        let on_start = transaction("Food", TransactionKind::Expense, "2025-06-01");
        let after = transaction("Food", TransactionKind::Expense, "2025-06-16");
        let unparseable = transaction("Food", TransactionKind::Expense, "not-a-date");

        assert!(filter.matches(&on_end));
        assert!(filter.matches(&on_start));
        assert!(!filter.matches(&after));
        assert!(!filter.matches(&unparseable));
    }

    #[test]
    fn test_filter_same_day_range_matches_whole_day() {
        let filter = TransactionFilter {
            category: CategorySelection::All,
            kind: KindSelection::All,
            start_date: date(2025, 6, 15),
            end_date: date(2025, 6, 15),
        };
        let morning = transaction("Food", TransactionKind::Expense, "2025-06-15T08:00:00Z");
        let night = transaction("Food", TransactionKind::Expense, "2025-06-15T23:30:00Z");
        assert!(filter.matches(&morning));
        assert!(filter.matches(&night));
    }

    #[test]
    fn test_filter_category_and_kind_clauses() {
        let mut filter = TransactionFilter {
            category: CategorySelection::Named("Food".to_string()),
            kind: KindSelection::Only(TransactionKind::Expense),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 12, 31),
        };

        let food = transaction("Food", TransactionKind::Expense, "2025-06-15");
        let rent = transaction("Rent", TransactionKind::Expense, "2025-06-15");
        let salary = transaction("Food", TransactionKind::Income, "2025-06-15");

        assert!(filter.matches(&food));
        assert!(!filter.matches(&rent));
        assert!(!filter.matches(&salary));

        filter.category = CategorySelection::All;
        filter.kind = KindSelection::All;
        assert!(filter.matches(&rent));
        assert!(filter.matches(&salary));
    }

    #[test]
    fn test_default_filter() {
        let today = date(2025, 6, 19);
        let filter = TransactionFilter::default_for(today);
        assert_eq!(filter.category, CategorySelection::All);
        assert_eq!(filter.kind, KindSelection::Only(TransactionKind::Expense));
        assert_eq!(filter.start_date, date(2025, 6, 1));
        assert_eq!(filter.end_date, today);
    }

    #[test]
    fn test_category_set_for_selection() {
        let categories = CategorySet {
            income: vec!["Salary".to_string(), "Other Income".to_string()],
            expense: vec!["Food".to_string(), "Rent".to_string()],
        };

        assert_eq!(
            categories.for_selection(&KindSelection::Only(TransactionKind::Income)),
            vec!["Salary", "Other Income"]
        );
        // "All" keeps income first, then expense, in registry order.
        assert_eq!(
            categories.for_selection(&KindSelection::All),
            vec!["Salary", "Other Income", "Food", "Rent"]
        );
        assert!(categories.contains("Food", TransactionKind::Expense));
        assert!(!categories.contains("Food", TransactionKind::Income));
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0.0), "₹0.00");
        assert_eq!(format_inr(200.0), "₹200.00");
        assert_eq!(format_inr(1200.0), "₹1,200.00");
        assert_eq!(format_inr(100000.0), "₹1,00,000.00");
        assert_eq!(format_inr(12345678.9), "₹1,23,45,678.90");
        assert_eq!(format_inr(-200.0), "-₹200.00");
    }

    #[test]
    fn test_budget_status_line() {
        let over = BudgetStatus {
            id: "b1".to_string(),
            category: "Food".to_string(),
            amount: 1000.0,
            spent: 1200.0,
            percent_used: 120.0,
            remaining: -200.0,
            over_budget: true,
            near_limit: false,
        };
        assert_eq!(over.status_line(), "Over by ₹200.00");

        let under = BudgetStatus {
            spent: 200.0,
            percent_used: 20.0,
            remaining: 800.0,
            over_budget: false,
            ..over
        };
        assert_eq!(under.status_line(), "₹800.00 remaining");
    }

    fn sample_categories() -> CategorySet {
        CategorySet {
            income: vec!["Salary".to_string()],
            expense: vec!["Food".to_string(), "Rent".to_string()],
        }
    }

    #[test]
    fn test_validate_transaction_form_success() {
        let form = TransactionForm {
            amount: " 250.50 ".to_string(),
            description: "weekly groceries".to_string(),
            category: "Food".to_string(),
            kind: Some(TransactionKind::Expense),
            date: "2025-06-15".to_string(),
        };
        let request = validate_transaction_form(&form, &sample_categories()).unwrap();
        assert_eq!(request.amount, 250.50);
        assert_eq!(request.category, "Food");
        assert_eq!(request.kind, TransactionKind::Expense);
    }

    #[test]
    fn test_validate_transaction_form_failures() {
        let categories = sample_categories();
        let base = TransactionForm {
            amount: "100".to_string(),
            description: "desc".to_string(),
            category: "Food".to_string(),
            kind: Some(TransactionKind::Expense),
            date: "2025-06-15".to_string(),
        };

        let empty_description = TransactionForm {
            description: "  ".to_string(),
            ..base.clone()
        };
        assert_eq!(
            validate_transaction_form(&empty_description, &categories),
            Err(FormError::EmptyField("description"))
        );

        let bad_amount = TransactionForm {
            amount: "abc".to_string(),
            ..base.clone()
        };
        assert_eq!(
            validate_transaction_form(&bad_amount, &categories),
            Err(FormError::InvalidAmount("abc".to_string()))
        );

        let negative = TransactionForm {
            amount: "-5".to_string(),
            ..base.clone()
        };
        assert_eq!(
            validate_transaction_form(&negative, &categories),
            Err(FormError::AmountNotPositive)
        );

        let zero = TransactionForm {
            amount: "0".to_string(),
            ..base.clone()
        };
        assert_eq!(
            validate_transaction_form(&zero, &categories),
            Err(FormError::AmountNotPositive)
        );

        // "Salary" exists, but as an income category.
        let wrong_kind = TransactionForm {
            category: "Salary".to_string(),
            ..base
        };
        assert_eq!(
            validate_transaction_form(&wrong_kind, &categories),
            Err(FormError::UnknownCategory {
                category: "Salary".to_string(),
                kind: TransactionKind::Expense,
            })
        );
    }

    #[test]
    fn test_validate_budget_form() {
        let request = validate_budget_form("Food", "1000", 6, 2025).unwrap();
        assert_eq!(request.amount, 1000.0);
        assert_eq!(request.month, 6);

        assert_eq!(
            validate_budget_form("", "1000", 6, 2025),
            Err(FormError::EmptyField("category"))
        );
        assert_eq!(
            validate_budget_form("Food", "0", 6, 2025),
            Err(FormError::AmountNotPositive)
        );
        assert_eq!(
            validate_budget_form("Food", "1000", 13, 2025),
            Err(FormError::InvalidMonth(13))
        );
    }
}
