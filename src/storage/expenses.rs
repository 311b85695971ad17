//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::debug;

use crate::error::SpendError;
use crate::models::{Expense, ExpenseId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expense file layout
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence with a category index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: category -> expense ids
    by_category: RwLock<HashMap<String, Vec<ExpenseId>>>,
}

fn read_guard<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SpendError> {
    lock.read()
        .map_err(|e| SpendError::Storage(format!("Failed to acquire read lock: {}", e)))
}

fn write_guard<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SpendError> {
    lock.write()
        .map_err(|e| SpendError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Newest first; same-day expenses by creation time, newest first
fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and rebuild the index
    pub fn load(&self) -> Result<(), SpendError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;
        data.clear();
        by_category.clear();

        for expense in file_data.expenses {
            by_category
                .entry(expense.category.clone())
                .or_default()
                .push(expense.id);
            data.insert(expense.id, expense);
        }

        debug!(path = %self.path.display(), count = data.len(), "loaded expenses");
        Ok(())
    }

    pub fn save(&self) -> Result<(), SpendError> {
        let data = read_guard(&self.data)?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut expenses);

        debug!(path = %self.path.display(), count = expenses.len(), "saving expenses");
        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, SpendError> {
        let data = read_guard(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Expenses whose id starts with the given short form
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Expense>, SpendError> {
        let data = read_guard(&self.data)?;
        let mut matches: Vec<_> = data
            .values()
            .filter(|e| e.id.matches_prefix(prefix))
            .cloned()
            .collect();
        sort_newest_first(&mut matches);
        Ok(matches)
    }

    /// All expenses, newest first
    pub fn get_all(&self) -> Result<Vec<Expense>, SpendError> {
        let data = read_guard(&self.data)?;
        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    pub fn get_by_category(&self, category: &str) -> Result<Vec<Expense>, SpendError> {
        let data = read_guard(&self.data)?;
        let by_category = read_guard(&self.by_category)?;

        let ids = by_category.get(category).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    /// Expenses dated within `[start, end]`
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, SpendError> {
        let all = self.get_all()?;
        Ok(all
            .into_iter()
            .filter(|e| e.date >= start && e.date <= end)
            .collect())
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Result<Vec<String>, SpendError> {
        let by_category = read_guard(&self.by_category)?;
        let mut names: Vec<_> = by_category
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), SpendError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;

        if let Some(old) = data.get(&expense.id) {
            if let Some(ids) = by_category.get_mut(&old.category) {
                ids.retain(|&id| id != expense.id);
            }
        }

        by_category
            .entry(expense.category.clone())
            .or_default()
            .push(expense.id);
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Delete an expense; returns whether it existed
    pub fn delete(&self, id: ExpenseId) -> Result<bool, SpendError> {
        let mut data = write_guard(&self.data)?;
        let mut by_category = write_guard(&self.by_category)?;

        match data.remove(&id) {
            Some(expense) => {
                if let Some(ids) = by_category.get_mut(&expense.category) {
                    ids.retain(|&eid| eid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> Result<usize, SpendError> {
        let data = read_guard(&self.data)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.categories().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_moves_category_index() {
        let (_temp_dir, repo) = create_test_repo();

        let mut expense = Expense::new(25.0, "food", date(2025, 1, 15));
        let id = expense.id;
        repo.upsert(expense.clone()).unwrap();
        assert_eq!(repo.get_by_category("food").unwrap().len(), 1);

        expense.category = "dining".into();
        repo.upsert(expense).unwrap();

        assert!(repo.get_by_category("food").unwrap().is_empty());
        assert_eq!(repo.get_by_category("dining").unwrap()[0].id, id);
        assert_eq!(repo.categories().unwrap(), vec!["dining".to_string()]);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();

        let expense = Expense::with_details(99.9, "bills", "cash", date(2025, 2, 1), "power");
        let id = expense.id;
        repo.upsert(expense).unwrap();
        repo.save().unwrap();

        let repo2 = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        repo2.load().unwrap();

        let loaded = repo2.get(id).unwrap().unwrap();
        assert_eq!(loaded.amount, 99.9);
        assert_eq!(loaded.note, "power");
        assert_eq!(loaded.payment_method, "cash");
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let expense = Expense::new(10.0, "food", date(2025, 1, 15));
        let id = expense.id;
        repo.upsert(expense).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.categories().unwrap().is_empty());
    }

    #[test]
    fn test_date_range_and_ordering() {
        let (_temp_dir, repo) = create_test_repo();
        for (day, amount) in [(10, 1.0), (15, 2.0), (20, 3.0)] {
            repo.upsert(Expense::new(amount, "food", date(2025, 1, day)))
                .unwrap();
        }

        let all = repo.get_all().unwrap();
        assert_eq!(all[0].date, date(2025, 1, 20));

        let range = repo
            .get_by_date_range(date(2025, 1, 12), date(2025, 1, 18))
            .unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].amount, 2.0);
    }

    #[test]
    fn test_find_by_prefix() {
        let (_temp_dir, repo) = create_test_repo();
        let expense = Expense::new(10.0, "food", date(2025, 1, 15));
        let short = expense.id.short();
        repo.upsert(expense).unwrap();

        assert_eq!(repo.find_by_prefix(&short).unwrap().len(), 1);
    }
}
