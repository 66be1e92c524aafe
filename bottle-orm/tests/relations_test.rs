use std::collections::HashMap;

use bottle_orm::relations::{belongs_to, eager_load_belongs_to, eager_load_has_many, has_many, BelongsToMany};
use bottle_orm::schema::Schema;
use bottle_orm::{Database, Model};
use uuid::Uuid;

#[derive(Debug, Clone, Model, PartialEq)]
struct RelUser {
    #[orm(primary_key)]
    id: Uuid,
    name: String,
}

#[derive(Debug, Clone, Model, PartialEq)]
struct RelPost {
    #[orm(primary_key)]
    id: Uuid,
    #[orm(foreign_key = "RelUser::id")]
    user_id: Uuid,
    title: String,
}

#[derive(Debug, Clone, Model, PartialEq)]
struct RelRole {
    #[orm(primary_key)]
    id: Uuid,
    name: String,
}

async fn setup() -> Result<Database, Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    db.migrator().register::<RelUser>().register::<RelPost>().register::<RelRole>().run().await?;
    let mut db = db;
    Schema::create(&mut db, "role_user", |table| {
        table.uuid("user_id");
        table.uuid("role_id");
    })
    .await?;
    Ok(db)
}

#[tokio::test]
async fn has_many_lazy_and_eager_load_agree() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;

    let alice = RelUser { id: Uuid::new_v4(), name: "Alice".to_string() };
    let bob = RelUser { id: Uuid::new_v4(), name: "Bob".to_string() };
    db.model::<RelUser>().insert(&alice).await?;
    db.model::<RelUser>().insert(&bob).await?;

    let alice_post = RelPost { id: Uuid::new_v4(), user_id: alice.id, title: "Alice's first post".to_string() };
    let bob_post_1 = RelPost { id: Uuid::new_v4(), user_id: bob.id, title: "Bob's first post".to_string() };
    let bob_post_2 = RelPost { id: Uuid::new_v4(), user_id: bob.id, title: "Bob's second post".to_string() };
    db.model::<RelPost>().insert(&alice_post).await?;
    db.model::<RelPost>().insert(&bob_post_1).await?;
    db.model::<RelPost>().insert(&bob_post_2).await?;

    // Lazy: one parent at a time.
    let alice_posts: Vec<RelPost> = has_many(&db, &alice, "user_id").await?;
    assert_eq!(alice_posts.len(), 1);
    let bob_posts: Vec<RelPost> = has_many(&db, &bob, "user_id").await?;
    assert_eq!(bob_posts.len(), 2);

    // Eager: every parent resolved with one batched query.
    let parents = vec![alice.clone(), bob.clone()];
    let by_parent: HashMap<String, Vec<RelPost>> = eager_load_has_many(&db, &parents, "id", "user_id").await?;
    assert_eq!(by_parent.get(&alice.id.to_string()).map(Vec::len), Some(1));
    assert_eq!(by_parent.get(&bob.id.to_string()).map(Vec::len), Some(2));

    // Eager-load equivalence (testable property #5): same set of related
    // rows whether fetched lazily per-parent or batched, order aside.
    let mut lazy_titles: Vec<String> = bob_posts.iter().map(|p| p.title.clone()).collect();
    let mut eager_titles: Vec<String> = by_parent[&bob.id.to_string()].iter().map(|p| p.title.clone()).collect();
    lazy_titles.sort();
    eager_titles.sort();
    assert_eq!(lazy_titles, eager_titles);

    Ok(())
}

#[tokio::test]
async fn belongs_to_lazy_and_eager_load() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;

    let alice = RelUser { id: Uuid::new_v4(), name: "Alice".to_string() };
    db.model::<RelUser>().insert(&alice).await?;

    let post_1 = RelPost { id: Uuid::new_v4(), user_id: alice.id, title: "One".to_string() };
    let post_2 = RelPost { id: Uuid::new_v4(), user_id: alice.id, title: "Two".to_string() };
    db.model::<RelPost>().insert(&post_1).await?;
    db.model::<RelPost>().insert(&post_2).await?;

    let owner: Option<RelUser> = belongs_to(&db, &post_1, "user_id").await?;
    assert_eq!(owner.map(|u| u.id), Some(alice.id));

    let posts = vec![post_1, post_2];
    let owners: HashMap<String, RelUser> = eager_load_belongs_to(&db, &posts, "user_id").await?;
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[&alice.id.to_string()].name, "Alice");

    Ok(())
}

#[tokio::test]
async fn belongs_to_many_pivot_attach_sync_and_eager_load() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;

    let alice = RelUser { id: Uuid::new_v4(), name: "Alice".to_string() };
    let bob = RelUser { id: Uuid::new_v4(), name: "Bob".to_string() };
    db.model::<RelUser>().insert(&alice).await?;
    db.model::<RelUser>().insert(&bob).await?;

    let admin = RelRole { id: Uuid::new_v4(), name: "admin".to_string() };
    let editor = RelRole { id: Uuid::new_v4(), name: "editor".to_string() };
    db.model::<RelRole>().insert(&admin).await?;
    db.model::<RelRole>().insert(&editor).await?;

    let roles = BelongsToMany::new("role_user", "user_id", "role_id");

    roles.attach(&db, &alice.id.to_string(), &[admin.id.to_string(), editor.id.to_string()]).await?;
    roles.attach(&db, &bob.id.to_string(), &[editor.id.to_string()]).await?;

    let alice_roles: Vec<RelRole> = roles.load(&db, &alice).await?;
    assert_eq!(alice_roles.len(), 2);

    let parents = vec![alice.clone(), bob.clone()];
    let by_parent: HashMap<String, Vec<RelRole>> = roles.eager_load(&db, &parents).await?;
    assert_eq!(by_parent[&alice.id.to_string()].len(), 2);
    assert_eq!(by_parent[&bob.id.to_string()].len(), 1);

    // sync() replaces Alice's roles wholesale: only editor remains afterward.
    roles.sync(&db, &alice.id.to_string(), &[editor.id.to_string()]).await?;
    let alice_roles_after_sync: Vec<RelRole> = roles.load(&db, &alice).await?;
    assert_eq!(alice_roles_after_sync.len(), 1);
    assert_eq!(alice_roles_after_sync[0].id, editor.id);

    // detach() removes a specific pivot row.
    let removed = roles.detach(&db, &bob.id.to_string(), &[editor.id.to_string()]).await?;
    assert_eq!(removed, 1);
    let bob_roles: Vec<RelRole> = roles.load(&db, &bob).await?;
    assert!(bob_roles.is_empty());

    Ok(())
}
