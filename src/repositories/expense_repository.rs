use crate::error::RepositoryError;
use crate::models::{Cursor, Expense, ExpenseSplit};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

const EXPENSE_COLUMNS: &str =
    "id, group_id, paid_by, amount_cents, description, receipt_url, created_by, created_at";

/// Repository for expense and expense-split data access
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Create a new ExpenseRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an expense on an open transaction.
    ///
    /// Used by draft approval, which writes the expense and resolves the
    /// draft in one atomic unit.
    pub async fn insert_tx(
        conn: &mut SqliteConnection,
        expense: &Expense,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, group_id, paid_by, amount_cents, description, receipt_url, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id)
        .bind(expense.group_id)
        .bind(expense.paid_by)
        .bind(expense.amount_cents)
        .bind(&expense.description)
        .bind(&expense.receipt_url)
        .bind(expense.created_by)
        .bind(expense.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Insert a split on an open transaction
    pub async fn insert_split_tx(
        conn: &mut SqliteConnection,
        split: &ExpenseSplit,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO expense_splits (id, expense_id, user_id, amount_cents, split_type)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(split.id)
        .bind(split.expense_id)
        .bind(split.user_id)
        .bind(split.amount_cents)
        .bind(&split.split_type)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Insert an expense with its splits atomically
    pub async fn create_with_splits(
        &self,
        expense: &Expense,
        splits: &[ExpenseSplit],
    ) -> Result<Expense, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        Self::insert_tx(&mut tx, expense).await?;
        for split in splits {
            Self::insert_split_tx(&mut tx, split).await?;
        }

        tx.commit().await?;

        Ok(expense.clone())
    }

    /// Find an expense by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, RepositoryError> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {} FROM expenses WHERE id = ?",
            EXPENSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Splits of one expense, in a stable order
    pub async fn splits_for_expense(
        &self,
        expense_id: Uuid,
    ) -> Result<Vec<ExpenseSplit>, RepositoryError> {
        let splits = sqlx::query_as::<_, ExpenseSplit>(
            r#"
            SELECT id, expense_id, user_id, amount_cents, split_type
            FROM expense_splits
            WHERE expense_id = ?
            ORDER BY user_id ASC
            "#,
        )
        .bind(expense_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(splits)
    }

    /// One page of a group's expenses, newest first
    pub async fn list_for_group(
        &self,
        group_id: Uuid,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<Expense>, RepositoryError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM expenses WHERE group_id = ",
            EXPENSE_COLUMNS
        ));
        qb.push_bind(group_id);
        if let Some(cursor) = cursor {
            qb.push(" AND (created_at, id) < (SELECT created_at, id FROM expenses WHERE id = ");
            qb.push_bind(cursor.0);
            qb.push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit);

        let expenses = qb
            .build_query_as::<Expense>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        Ok(expenses)
    }

    /// Total number of expenses in a group
    pub async fn count_for_group(&self, group_id: Uuid) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM expenses WHERE group_id = ?",
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Every (payer, amount) pair in the group, for balance computation
    pub async fn payments_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT paid_by, amount_cents FROM expenses WHERE group_id = ?",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every (participant, share) pair in the group, for balance computation
    pub async fn split_shares_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<(Uuid, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT s.user_id, s.amount_cents
            FROM expense_splits s
            JOIN expenses e ON e.id = s.expense_id
            WHERE e.group_id = ?
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
