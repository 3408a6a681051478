//! Repository checks against a migrated throwaway database

use budgetgov_core::{AopId, AopState, BudgetId, BudgetState, NewEmployee};
use budgetgov_persistence::{
    AopRepo, BudgetQuery, BudgetRepo, Database, DatabaseConfig, EmployeeRepo, PersistenceError,
};
use rust_decimal_macros::dec;
use tempfile::TempDir;

async fn setup() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("repos.db").display());
    let db = Database::init(DatabaseConfig::new(url), dir.path().join("events"))
        .await
        .unwrap();
    (dir, db)
}

#[tokio::test]
async fn test_committed_filter_skips_inactive_and_deleted() {
    let (_dir, db) = setup().await;
    let pool = db.pool();

    let aop = AopRepo::insert(pool, "FY27", dec!(1000)).await.unwrap();
    let emp = EmployeeRepo::insert(
        pool,
        &NewEmployee::new("alice", "Alice", "Ng")
            .with_email("alice@example.com")
            .with_cost_center("CC100"),
    )
    .await
    .unwrap();

    let live = BudgetRepo::insert(pool, aop, emp, "A", "", dec!(100), BudgetState::Active)
        .await
        .unwrap();
    BudgetRepo::insert(pool, aop, emp, "B", "", dec!(200), BudgetState::Inactive)
        .await
        .unwrap();
    let gone = BudgetRepo::insert(pool, aop, emp, "C", "", dec!(400), BudgetState::Active)
        .await
        .unwrap();
    BudgetRepo::soft_delete(pool, gone).await.unwrap();

    let amounts = BudgetRepo::committed_amounts(pool, aop).await.unwrap();
    assert_eq!(amounts, vec!["100".to_string()]);
    assert_eq!(BudgetRepo::count_committed_for_employee(pool, emp).await.unwrap(), 1);

    let committed = BudgetRepo::committed_for_aop(pool, aop).await.unwrap();
    assert_eq!(committed.len(), 1);
    assert_eq!(committed[0].id, live.0);

    // Default listing hides soft-deleted rows but keeps inactive ones
    let visible = BudgetRepo::list(pool, &BudgetQuery::new().aop(aop)).await.unwrap();
    assert_eq!(visible.len(), 2);
    let everything = BudgetRepo::list(pool, &BudgetQuery::new().include_deleted())
        .await
        .unwrap();
    assert_eq!(everything.len(), 3);
    let by_employee = BudgetRepo::list(pool, &BudgetQuery::new().employee(emp))
        .await
        .unwrap();
    assert_eq!(by_employee.len(), 2);
}

#[tokio::test]
async fn test_single_active_index() {
    let (_dir, db) = setup().await;
    let pool = db.pool();

    let a1 = AopRepo::insert(pool, "FY26", dec!(1)).await.unwrap();
    let a2 = AopRepo::insert(pool, "FY27", dec!(1)).await.unwrap();

    AopRepo::update_state(pool, a1, AopState::Active).await.unwrap();
    let err = AopRepo::update_state(pool, a2, AopState::Active)
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    let active = AopRepo::find_active(pool).await.unwrap().unwrap();
    assert_eq!(active.id, a1.0);
}

#[tokio::test]
async fn test_lock_reports_missing_aop() {
    let (_dir, db) = setup().await;
    let pool = db.pool();

    let aop = AopRepo::insert(pool, "FY27", dec!(1)).await.unwrap();
    assert!(AopRepo::lock(pool, aop).await.unwrap());
    assert!(!AopRepo::lock(pool, AopId(999)).await.unwrap());

    let err = AopRepo::delete(pool, AopId(999)).await.unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound { .. }));
}

#[tokio::test]
async fn test_lock_reports_missing_budget() {
    let (_dir, db) = setup().await;
    let pool = db.pool();

    let aop = AopRepo::insert(pool, "FY27", dec!(100)).await.unwrap();
    let emp = EmployeeRepo::insert(
        pool,
        &NewEmployee::new("alice", "Alice", "Ng")
            .with_email("alice@example.com")
            .with_cost_center("CC100"),
    )
    .await
    .unwrap();
    let budget = BudgetRepo::insert(pool, aop, emp, "A", "", dec!(10), BudgetState::Active)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    assert!(BudgetRepo::lock(&mut *tx, budget).await.unwrap());
    BudgetRepo::update_amount(&mut *tx, budget, dec!(20)).await.unwrap();
    tx.commit().await.unwrap();

    // Soft-deleted rows can still be locked
    BudgetRepo::soft_delete(pool, budget).await.unwrap();
    assert!(BudgetRepo::lock(pool, budget).await.unwrap());
    assert!(!BudgetRepo::lock(pool, BudgetId(999)).await.unwrap());

    let row = BudgetRepo::get(pool, budget).await.unwrap().unwrap();
    assert_eq!(row.amount, "20");
}

#[tokio::test]
async fn test_amounts_round_trip_exactly() {
    let (_dir, db) = setup().await;
    let pool = db.pool();

    let aop = AopRepo::insert(pool, "FY27", dec!(1234567.89)).await.unwrap();
    let row = AopRepo::get(pool, aop).await.unwrap().unwrap();
    let loaded = row.into_aop(Vec::new()).unwrap();
    assert_eq!(loaded.total_approved_amount, dec!(1234567.89));
    assert_eq!(loaded.state, AopState::Draft);
}
