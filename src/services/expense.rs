//! Expense service
//!
//! Business logic for expense management: validated creation, filtered
//! listing, partial updates and batch deletion.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{SpendError, SpendResult};
use crate::models::{Expense, ExpenseId, ExpenseRecord, DEFAULT_PAYMENT_METHOD};
use crate::storage::Storage;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Inclusive lower date bound
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub end_date: Option<NaiveDate>,
    /// Keep only these categories (empty = all)
    pub categories: Vec<String>,
    /// Keep only these payment methods (empty = all)
    pub payment_methods: Vec<String>,
    pub min_amount: Option<f64>,
    /// Ignored unless positive
    pub max_amount: Option<f64>,
    /// Maximum number of expenses to return
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by date range
    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn since(mut self, start: NaiveDate) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn until(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_methods.push(method.into());
        self
    }

    pub fn amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, expense: &Expense) -> bool {
        if self.start_date.is_some_and(|start| expense.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| expense.date > end) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.iter().any(|c| *c == expense.category)
        {
            return false;
        }
        if !self.payment_methods.is_empty()
            && !self
                .payment_methods
                .iter()
                .any(|m| *m == expense.payment_method)
        {
            return false;
        }
        if self.min_amount.is_some_and(|min| expense.amount < min) {
            return false;
        }
        if self
            .max_amount
            .is_some_and(|max| max > 0.0 && expense.amount > max)
        {
            return false;
        }
        true
    }
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub amount: f64,
    pub category: String,
    pub payment_method: Option<String>,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl CreateExpenseInput {
    pub fn new(amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount,
            category: category.into(),
            payment_method: None,
            date,
            note: None,
        }
    }
}

/// Fields to change on an existing expense; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl UpdateExpenseInput {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.payment_method.is_none()
            && self.date.is_none()
            && self.note.is_none()
    }
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Validate and persist a new expense
    pub fn create(&self, input: CreateExpenseInput) -> SpendResult<Expense> {
        let expense = Self::build(input);
        expense.validate()?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(id = %expense.id, category = %expense.category, amount = expense.amount, "created expense");
        Ok(expense)
    }

    /// Validate and persist several expenses with a single write
    pub fn create_many(&self, inputs: Vec<CreateExpenseInput>) -> SpendResult<Vec<Expense>> {
        let expenses: Vec<Expense> = inputs.into_iter().map(Self::build).collect();
        for expense in &expenses {
            expense.validate()?;
        }
        for expense in &expenses {
            self.storage.expenses.upsert(expense.clone())?;
        }
        self.storage.expenses.save()?;

        info!(count = expenses.len(), "created expenses");
        Ok(expenses)
    }

    fn build(input: CreateExpenseInput) -> Expense {
        let payment_method = input
            .payment_method
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        Expense::with_details(
            input.amount,
            input.category.trim(),
            payment_method,
            input.date,
            input.note.unwrap_or_default().trim(),
        )
    }

    pub fn get(&self, id: ExpenseId) -> SpendResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Resolve a full id or a unique short prefix such as `exp-1a2b`
    pub fn find(&self, identifier: &str) -> SpendResult<Expense> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            if let Some(expense) = self.storage.expenses.get(id)? {
                return Ok(expense);
            }
        }

        let mut matches = self.storage.expenses.find_by_prefix(identifier)?;
        match matches.len() {
            0 => Err(SpendError::expense_not_found(identifier)),
            1 => Ok(matches.remove(0)),
            n => Err(SpendError::Validation(format!(
                "'{}' matches {} expenses; use a longer id",
                identifier, n
            ))),
        }
    }

    /// List expenses matching the filter, newest first
    pub fn list(&self, filter: &ExpenseFilter) -> SpendResult<Vec<Expense>> {
        let mut expenses = match (filter.start_date, filter.end_date) {
            (Some(start), Some(end)) => self.storage.expenses.get_by_date_range(start, end)?,
            _ if filter.categories.len() == 1 => {
                self.storage.expenses.get_by_category(&filter.categories[0])?
            }
            _ => self.storage.expenses.get_all()?,
        };

        expenses.retain(|e| filter.matches(e));

        if let Some(limit) = filter.limit {
            expenses.truncate(limit);
        }

        debug!(count = expenses.len(), "listed expenses");
        Ok(expenses)
    }

    /// Apply the supplied fields and return the updated expense
    pub fn update(&self, id: ExpenseId, input: UpdateExpenseInput) -> SpendResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| SpendError::expense_not_found(id.to_string()))?;

        if input.is_empty() {
            return Ok(expense);
        }

        if let Some(amount) = input.amount {
            expense.amount = amount;
        }
        if let Some(category) = input.category {
            expense.category = category.trim().to_string();
        }
        if let Some(method) = input.payment_method {
            expense.payment_method = method.trim().to_string();
        }
        if let Some(date) = input.date {
            expense.date = date;
        }
        if let Some(note) = input.note {
            expense.note = note.trim().to_string();
        }

        expense.validate()?;
        expense.touch();

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        info!(id = %expense.id, "updated expense");
        Ok(expense)
    }

    /// Delete the given expenses; returns how many existed
    pub fn delete_many(&self, ids: &[ExpenseId]) -> SpendResult<usize> {
        let mut removed = 0;
        for &id in ids {
            if self.storage.expenses.delete(id)? {
                removed += 1;
            }
        }
        if removed > 0 {
            self.storage.expenses.save()?;
        }

        info!(requested = ids.len(), removed, "deleted expenses");
        Ok(removed)
    }

    /// Filtered expenses as analysis records
    pub fn records(&self, filter: &ExpenseFilter) -> SpendResult<Vec<ExpenseRecord>> {
        Ok(self
            .list(filter)?
            .iter()
            .map(Expense::to_record)
            .collect())
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> SpendResult<Vec<String>> {
        self.storage.expenses.categories()
    }

    pub fn count(&self) -> SpendResult<usize> {
        self.storage.expenses.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpendPaths;
    use tempfile::TempDir;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(service: &ExpenseService) {
        let inputs = vec![
            CreateExpenseInput {
                payment_method: Some("cash".into()),
                ..CreateExpenseInput::new(12.0, "food", date(1, 5))
            },
            CreateExpenseInput::new(850.0, "rent", date(1, 1)),
            CreateExpenseInput::new(30.0, "food", date(2, 10)),
            CreateExpenseInput {
                note: Some("bus pass".into()),
                ..CreateExpenseInput::new(60.0, "transport", date(2, 3))
            },
        ];
        service.create_many(inputs).unwrap();
    }

    #[test]
    fn test_create_expense() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let expense = service
            .create(CreateExpenseInput::new(19.99, "  food ", date(3, 1)))
            .unwrap();
        assert_eq!(expense.category, "food");
        assert_eq!(expense.payment_method, "card");

        let fetched = service.get(expense.id).unwrap().unwrap();
        assert_eq!(fetched, expense);
    }

    #[test]
    fn test_create_rejects_invalid() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let err = service
            .create(CreateExpenseInput::new(-3.0, "food", date(3, 1)))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service
            .create(CreateExpenseInput::new(3.0, "   ", date(3, 1)))
            .is_err());
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_list_filters() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        seed(&service);

        let all = service.list(&ExpenseFilter::new()).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].date, date(2, 10));

        let food = service.list(&ExpenseFilter::new().category("food")).unwrap();
        assert_eq!(food.len(), 2);

        let cash = service
            .list(&ExpenseFilter::new().payment_method("cash"))
            .unwrap();
        assert_eq!(cash.len(), 1);

        let february = service
            .list(&ExpenseFilter::new().date_range(date(2, 1), date(2, 28)))
            .unwrap();
        assert_eq!(february.len(), 2);

        let mid = service
            .list(&ExpenseFilter::new().amount_range(Some(20.0), Some(100.0)))
            .unwrap();
        assert_eq!(mid.len(), 2);

        // non-positive max is ignored
        let above = service
            .list(&ExpenseFilter::new().amount_range(Some(20.0), Some(0.0)))
            .unwrap();
        assert_eq!(above.len(), 3);

        let limited = service.list(&ExpenseFilter::new().limit(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let created = service
            .create(CreateExpenseInput::new(10.0, "food", date(3, 1)))
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateExpenseInput {
                    amount: Some(14.5),
                    note: Some("lunch".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, 14.5);
        assert_eq!(updated.note, "lunch");
        assert_eq!(updated.category, "food");
        assert_eq!(updated.date, date(3, 1));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_missing_and_invalid() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);

        let err = service
            .update(ExpenseId::new(), UpdateExpenseInput::default())
            .unwrap_err();
        assert!(err.is_not_found());

        let created = service
            .create(CreateExpenseInput::new(10.0, "food", date(3, 1)))
            .unwrap();
        let err = service
            .update(
                created.id,
                UpdateExpenseInput {
                    amount: Some(0.0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.get(created.id).unwrap().unwrap().amount, 10.0);
    }

    #[test]
    fn test_delete_many() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        seed(&service);

        let ids: Vec<_> = service
            .list(&ExpenseFilter::new().category("food"))
            .unwrap()
            .iter()
            .map(|e| e.id)
            .chain(std::iter::once(ExpenseId::new()))
            .collect();

        assert_eq!(service.delete_many(&ids).unwrap(), 2);
        assert_eq!(service.count().unwrap(), 2);
        assert_eq!(service.categories().unwrap(), vec!["rent", "transport"]);
    }

    #[test]
    fn test_find_by_prefix() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        let created = service
            .create(CreateExpenseInput::new(10.0, "food", date(3, 1)))
            .unwrap();

        assert_eq!(service.find(&created.id.short()).unwrap().id, created.id);
        assert_eq!(
            service.find(&created.id.as_uuid().to_string()).unwrap().id,
            created.id
        );
        assert!(service.find("exp-zzzz").unwrap_err().is_not_found());
    }

    #[test]
    fn test_records_projection() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ExpenseService::new(&storage);
        seed(&service);

        let records = service
            .records(&ExpenseFilter::new().category("transport"))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, 60.0);
        assert_eq!(records[0].note.as_deref(), Some("bus pass"));
    }

    #[test]
    fn test_changes_persist() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SpendPaths::with_base_dir(temp_dir.path().to_path_buf());
        {
            let mut storage = Storage::new(paths.clone()).unwrap();
            storage.load_all().unwrap();
            seed(&ExpenseService::new(&storage));
        }

        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        assert_eq!(ExpenseService::new(&storage).count().unwrap(), 4);
    }
}
