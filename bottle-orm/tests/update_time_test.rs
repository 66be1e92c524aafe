use bottle_orm::{Database, Model, Op};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Model, PartialEq)]
#[orm(guarded = "role")]
struct Article {
    #[orm(primary_key)]
    id: Uuid,
    title: String,
    role: String,

    #[orm(create_time)]
    created_at: DateTime<Utc>,

    #[orm(update_time)]
    updated_at: DateTime<Utc>,
}

#[tokio::test]
async fn test_update_stamps_update_time_column() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    db.migrator().register::<Article>().run().await?;

    let article_id = Uuid::new_v4();
    let now = Utc::now();
    let article = Article { id: article_id, title: "Draft".to_string(), role: "editor".to_string(), created_at: now, updated_at: now };
    db.model::<Article>().insert(&article).await?;

    // Give the stamped timestamp a visible delta from the insert-time value.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    db.model::<Article>().filter(article_fields::ID, Op::Eq, article_id.to_string()).update("title", "Published").await?;

    let refreshed = db
        .model::<Article>()
        .filter(article_fields::ID, Op::Eq, article_id.to_string())
        .first::<Article>()
        .await?;

    assert_eq!(refreshed.title, "Published");
    assert!(refreshed.updated_at > now, "update_time column should be auto-stamped on update()");
    assert_eq!(refreshed.created_at.timestamp(), now.timestamp(), "create_time should not change on update");

    Ok(())
}

#[test]
fn test_fillable_excludes_guarded_and_primary_key() {
    let fillable = Article::fillable();
    assert!(fillable.contains(&"title"));
    assert!(!fillable.contains(&"id"), "primary key must not be mass-assignable");
    assert!(!fillable.contains(&"role"), "#[orm(guarded)] column must not be mass-assignable");
    assert_eq!(Article::guarded(), vec!["role"]);
}
