use extrude::{Executor, ExtrudeError, Reflect, Session, Value};
use time::{Duration, OffsetDateTime, macros::datetime};

#[derive(Reflect, Clone, Debug, PartialEq)]
pub struct Article {
    #[extrude(id)]
    pub ID: i64,
    pub Title: String,
    pub Body: String,
    pub Authors: Vec<Option<String>>,
    pub CreatedAt: OffsetDateTime,
    pub UpdatedAt: OffsetDateTime,
}

impl Article {
    /// Article with only the key set, ready to be filled by `Session::get`.
    pub fn with_id(id: i64) -> Self {
        Self {
            ID: id,
            Title: Default::default(),
            Body: Default::default(),
            Authors: Default::default(),
            CreatedAt: OffsetDateTime::UNIX_EPOCH,
            UpdatedAt: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

fn is_not_found(error: &extrude::Error) -> bool {
    matches!(
        error.downcast_ref::<ExtrudeError>(),
        Some(ExtrudeError::NotFound { .. })
    )
}

pub async fn article<E: Executor>(session: &mut Session<E>) {
    let created = datetime!(2024-05-01 09:30:00 UTC);
    let article = Article {
        ID: 300,
        Title: "Title Session::get".into(),
        Body: "Body Session::get".into(),
        Authors: vec![Some("vvakame".into()), None, Some("maya".into())],
        CreatedAt: created,
        UpdatedAt: created,
    };

    // Clean
    let key = session.key(&article).expect("Failed to compute the key");
    assert_eq!(key.table(), "Article");
    assert_eq!(key.parts(), [Value::Int64(Some(300))]);
    assert_eq!(session.table(&article).unwrap(), "Article");
    session
        .delete(key.clone())
        .await
        .expect("Deleting a missing row should succeed");

    // Insert
    let inserted = session
        .insert(&article)
        .await
        .expect("Failed to insert the article");
    assert_eq!(inserted, key);
    assert!(
        session.insert(&article).await.is_err(),
        "Inserting the same key twice should fail"
    );

    // Get
    let mut loaded = Article::with_id(300);
    session
        .get(&mut loaded)
        .await
        .expect("Failed to get the article");
    assert_eq!(loaded, article);

    // Missing
    let mut missing = Article::with_id(301);
    let error = session.get(&mut missing).await.unwrap_err();
    assert!(is_not_found(&error), "Unexpected error: {:#}", error);
    assert_eq!(missing, Article::with_id(301));
    assert!(
        session.update(&missing).await.is_err(),
        "Updating a missing row should fail"
    );

    // Update
    let mut changed = article.clone();
    changed.Title = "Title updated".into();
    changed.Authors = vec![];
    changed.UpdatedAt = created + Duration::days(1);
    session
        .update(&changed)
        .await
        .expect("Failed to update the article");
    let mut loaded = Article::with_id(300);
    session.get(&mut loaded).await.unwrap();
    assert_eq!(loaded.Title, "Title updated");
    assert_eq!(loaded.Authors, Vec::<Option<String>>::new());
    assert_eq!(loaded.UpdatedAt, created + Duration::days(1));
    assert_eq!(loaded.CreatedAt, created);

    // Insert or update
    let mut upserted = Article::with_id(302);
    upserted.Title = "Fresh".into();
    session
        .insert_or_update(&upserted)
        .await
        .expect("Failed to insert a new article with insert_or_update");
    upserted.Body = "Second write".into();
    session
        .insert_or_update(&Box::new(upserted.clone()))
        .await
        .expect("Failed to update an article with insert_or_update");
    let mut loaded = Article::with_id(302);
    session.get(&mut loaded).await.unwrap();
    assert_eq!(loaded, upserted);

    // Delete
    session.delete(key).await.expect("Failed to delete");
    let mut loaded = Article::with_id(300);
    let error = session.get(&mut loaded).await.unwrap_err();
    assert!(is_not_found(&error), "Unexpected error: {:#}", error);
    let key = session.key(&upserted).unwrap();
    session.delete(key).await.expect("Failed to delete");
}
