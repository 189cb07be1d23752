use chrono::{TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Engine, EngineError, Expense, ExpenseParams, User, parse_tag_names,
    query::{FilterField, Filters, Pagination, QueryOptions, Sorting},
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn seed(engine: &Engine) -> (User, Expense) {
    let alice = engine
        .create_user("alice", "alice@example.com", "secret")
        .await
        .unwrap();
    let food = engine.create_category("Food").await.unwrap();
    let expense = engine
        .create_expense(
            alice.id,
            ExpenseParams {
                category_id: food.id,
                description: "groceries".to_string(),
                amount: 1200,
                date: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();
    (alice, expense)
}

fn names(tags: &[engine::Tag]) -> Vec<&str> {
    tags.iter().map(|t| t.name.as_str()).collect()
}

#[tokio::test]
async fn set_expense_tags_replaces_previous_ones() {
    let engine = engine_with_db().await;
    let (alice, expense) = seed(&engine).await;

    let tags = engine
        .set_expense_tags(expense.id, alice.id, &parse_tag_names("Market; weekly ;market"))
        .await
        .unwrap();
    assert_eq!(names(&tags), vec!["market", "weekly"]);

    let tags = engine
        .set_expense_tags(expense.id, alice.id, &parse_tag_names("weekly; organic"))
        .await
        .unwrap();
    assert_eq!(names(&tags), vec!["organic", "weekly"]);
    assert_eq!(
        names(&engine.expense_tags(expense.id, alice.id).await.unwrap()),
        vec!["organic", "weekly"]
    );

    // Detached tags stay available to the user.
    let user_tags = Filters::new(vec![FilterField::new("user_id", "=", alice.id)], "");
    assert_eq!(engine.count_tags(&user_tags).await.unwrap(), 3);

    let rows = engine
        .expense_tag_rows(&[expense.id], alice.id)
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![
            (expense.id, "organic".to_string()),
            (expense.id, "weekly".to_string())
        ]
    );

    engine
        .set_expense_tags(expense.id, alice.id, &[])
        .await
        .unwrap();
    assert!(engine.expense_tags(expense.id, alice.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_tag_names_leave_taggings_untouched() {
    let engine = engine_with_db().await;
    let (alice, expense) = seed(&engine).await;

    engine
        .set_expense_tags(expense.id, alice.id, &["rent".to_string()])
        .await
        .unwrap();

    let too_long = vec!["ok".to_string(), "x".repeat(21)];
    assert!(matches!(
        engine
            .set_expense_tags(expense.id, alice.id, &too_long)
            .await
            .unwrap_err(),
        EngineError::InvalidInput(_)
    ));
    assert_eq!(
        names(&engine.expense_tags(expense.id, alice.id).await.unwrap()),
        vec!["rent"]
    );
}

#[tokio::test]
async fn tags_are_unique_per_user() {
    let engine = engine_with_db().await;
    let (alice, _expense) = seed(&engine).await;
    let bob = engine
        .create_user("bob", "bob@example.com", "pw")
        .await
        .unwrap();

    let tag = engine.create_tag(alice.id, " Travel ").await.unwrap();
    assert_eq!(tag.name, "travel");
    assert!(matches!(
        engine.create_tag(alice.id, "TRAVEL").await.unwrap_err(),
        EngineError::ExistingKey(_)
    ));
    engine.create_tag(bob.id, "travel").await.unwrap();

    let listed = engine
        .list_tags(QueryOptions::new(
            Filters::new(vec![FilterField::new("name", "=", "travel")], ""),
            Sorting::new("user_id", "ASC"),
            Pagination::default(),
        ))
        .await
        .unwrap();
    assert_eq!(
        listed.iter().map(|t| t.user_id).collect::<Vec<_>>(),
        vec![alice.id, bob.id]
    );

    assert!(matches!(
        engine.delete_tag(tag.id, bob.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn deleting_detaches_taggings() {
    let engine = engine_with_db().await;
    let (alice, expense) = seed(&engine).await;

    let tags = engine
        .set_expense_tags(expense.id, alice.id, &parse_tag_names("a; b"))
        .await
        .unwrap();

    engine.delete_tag(tags[0].id, alice.id).await.unwrap();
    assert_eq!(
        names(&engine.expense_tags(expense.id, alice.id).await.unwrap()),
        vec!["b"]
    );

    engine.delete_expense(expense.id, alice.id).await.unwrap();
    assert!(
        engine
            .expense_tag_rows(&[expense.id], alice.id)
            .await
            .unwrap()
            .is_empty()
    );
}
