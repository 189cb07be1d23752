use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Engine, EngineError, ExpenseParams, User,
    query::{FilterField, Filters, Pagination, QueryError, QueryOptions, Sorting},
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn seed_users(engine: &Engine) -> (User, User, i64) {
    let alice = engine
        .create_user("alice", "alice@example.com", "secret")
        .await
        .unwrap();
    let bob = engine
        .create_user("bob", "bob@example.com", "hunter2")
        .await
        .unwrap();
    let food = engine.create_category("Food").await.unwrap();
    (alice, bob, food.id)
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
}

fn params(category_id: i64, description: &str, amount: i64, date: DateTime<Utc>) -> ExpenseParams {
    ExpenseParams {
        category_id,
        description: description.to_string(),
        amount,
        date,
    }
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() {
    let engine = engine_with_db().await;
    let (alice, bob, food) = seed_users(&engine).await;

    for (i, amount) in [100, 200, 300, 400, 500].into_iter().enumerate() {
        engine
            .create_expense(alice.id, params(food, "groceries", amount, day(i as u32 + 1)))
            .await
            .unwrap();
    }
    engine
        .create_expense(bob.id, params(food, "groceries", 900, day(1)))
        .await
        .unwrap();

    let filters = Filters::new(
        vec![
            FilterField::new("user_id", "=", alice.id),
            FilterField::new("amount", ">=", 200),
        ],
        "and",
    );

    let first = engine
        .list_expenses(QueryOptions::new(
            filters.clone(),
            Sorting::new("amount", "desc"),
            Pagination::new(2, 1),
        ))
        .await
        .unwrap();
    assert_eq!(
        first.iter().map(|e| e.amount).collect::<Vec<_>>(),
        vec![500, 400]
    );

    let second = engine
        .list_expenses(QueryOptions::new(
            filters.clone(),
            Sorting::new("amount", "DESC"),
            Pagination::new(2, 2),
        ))
        .await
        .unwrap();
    assert_eq!(
        second.iter().map(|e| e.amount).collect::<Vec<_>>(),
        vec![300, 200]
    );

    // Pagination never affects the count.
    assert_eq!(engine.count_expenses(&filters).await.unwrap(), 4);
    assert_eq!(engine.count_expenses(&Filters::default()).await.unwrap(), 6);
}

#[tokio::test]
async fn or_connector_and_date_filters() {
    let engine = engine_with_db().await;
    let (alice, _bob, food) = seed_users(&engine).await;

    for (d, amount) in [(1, 100), (10, 200), (20, 300)] {
        engine
            .create_expense(alice.id, params(food, "rent share", amount, day(d)))
            .await
            .unwrap();
    }

    let either = Filters::new(
        vec![
            FilterField::new("amount", "=", 100),
            FilterField::new("amount", "=", 300),
        ],
        "or",
    );
    assert_eq!(engine.count_expenses(&either).await.unwrap(), 2);

    let since = Filters::new(vec![FilterField::new("date", ">=", day(10))], "");
    let rows = engine
        .list_expenses(QueryOptions::new(
            since,
            Sorting::new("date", "asc"),
            Pagination::default(),
        ))
        .await
        .unwrap();
    assert_eq!(
        rows.iter().map(|e| e.date).collect::<Vec<_>>(),
        vec![day(10), day(20)]
    );
}

#[tokio::test]
async fn unknown_columns_are_rejected() {
    let engine = engine_with_db().await;
    let (alice, _bob, _food) = seed_users(&engine).await;

    let opts = QueryOptions::new(
        Filters::new(vec![FilterField::new("user_id", "=", alice.id)], ""),
        Sorting::new("secret", "ASC"),
        Pagination::default(),
    );
    let err = engine.list_expenses(opts).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Query(QueryError::InvalidField { ref field, .. }) if field == "secret"
    ));

    // The password column is never exposed.
    let opts = QueryOptions::new(
        Filters::new(vec![FilterField::new("password", "=", "secret")], ""),
        Sorting::default(),
        Pagination::default(),
    );
    let err = engine.list_users(opts).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Query(QueryError::InvalidField { .. })
    ));

    let bad_count = Filters::new(vec![FilterField::new("nope", "=", 1)], "");
    assert!(matches!(
        engine.count_expenses(&bad_count).await.unwrap_err(),
        EngineError::Query(QueryError::InvalidField { .. })
    ));
}

#[tokio::test]
async fn shape_errors_surface_before_the_database() {
    let engine = engine_with_db().await;

    let opts = QueryOptions::new(
        Filters::new(vec![FilterField::new("amount", "LIKE", 1)], ""),
        Sorting::default(),
        Pagination::default(),
    );
    assert!(matches!(
        engine.list_expenses(opts).await.unwrap_err(),
        EngineError::Query(QueryError::InvalidOperator(_))
    ));

    let opts = QueryOptions::new(
        Filters::default(),
        Sorting::default(),
        Pagination::new(10, 0),
    );
    assert!(matches!(
        engine.list_expenses(opts).await.unwrap_err(),
        EngineError::Query(QueryError::InvalidPagination { .. })
    ));
}

#[tokio::test]
async fn injection_strings_are_plain_values() {
    let engine = engine_with_db().await;
    let (alice, _bob, food) = seed_users(&engine).await;

    let evil = "x'; DROP TABLE expenses; --";
    engine
        .create_expense(alice.id, params(food, evil, 100, day(1)))
        .await
        .unwrap();
    engine
        .create_expense(alice.id, params(food, "coffee", 300, day(2)))
        .await
        .unwrap();

    let filters = Filters::new(vec![FilterField::new("description", "=", evil)], "");
    let rows = engine
        .list_expenses(QueryOptions::new(
            filters,
            Sorting::default(),
            Pagination::default(),
        ))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, evil);

    assert_eq!(engine.count_expenses(&Filters::default()).await.unwrap(), 2);
}

#[tokio::test]
async fn expenses_are_scoped_and_validated() {
    let engine = engine_with_db().await;
    let (alice, bob, food) = seed_users(&engine).await;

    let expense = engine
        .create_expense(alice.id, params(food, "  dinner  ", 4200, day(3)))
        .await
        .unwrap();
    assert_eq!(expense.description, "dinner");

    assert!(matches!(
        engine.expense(expense.id, bob.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine
            .create_expense(alice.id, params(food, "ab", 10, day(3)))
            .await
            .unwrap_err(),
        EngineError::InvalidInput(_)
    ));
    assert!(matches!(
        engine
            .create_expense(alice.id, params(food, "lunch", 0, day(3)))
            .await
            .unwrap_err(),
        EngineError::InvalidInput(_)
    ));
    assert!(matches!(
        engine
            .create_expense(alice.id, params(food + 100, "lunch", 10, day(3)))
            .await
            .unwrap_err(),
        EngineError::InvalidInput(_)
    ));

    let updated = engine
        .update_expense(expense.id, alice.id, params(food, "late dinner", 5000, day(4)))
        .await
        .unwrap();
    assert_eq!(updated.description, "late dinner");
    assert_eq!(updated.amount, 5000);
    assert_eq!(updated.date, day(4));

    engine.delete_expense(expense.id, alice.id).await.unwrap();
    assert!(matches!(
        engine.expense(expense.id, alice.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn users_and_categories() {
    let engine = engine_with_db().await;
    let (alice, _bob, _food) = seed_users(&engine).await;

    assert_eq!(
        engine.authenticate("alice", "secret").await.unwrap().id,
        alice.id
    );
    assert!(matches!(
        engine.authenticate("alice", "wrong").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine
            .create_user("alice", "other@example.com", "pw")
            .await
            .unwrap_err(),
        EngineError::ExistingKey(_)
    ));

    let car = engine.create_category("Car insurance").await.unwrap();
    assert_eq!(car.uid, "carInsurance");
    assert!(matches!(
        engine.create_category("car  INSURANCE").await.unwrap_err(),
        EngineError::ExistingKey(_)
    ));
    let names: Vec<_> = engine
        .categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Car insurance", "Food"]);

    let filters = Filters::new(vec![FilterField::new("username", "=", "bob")], "");
    assert_eq!(engine.count_users(&filters).await.unwrap(), 1);
}
