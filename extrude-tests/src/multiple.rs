use extrude::{Executor, ExtrudeError, Key, Reflect, Session, Value};

#[derive(Reflect, Default, Clone, Debug, PartialEq)]
pub struct Comment {
    #[extrude(id)]
    pub ArticleID: i64,
    #[extrude(id)]
    pub ID: i64,
    #[extrude(length = 1000)]
    pub Text: String,
    pub Score: Option<f64>,
    pub Attachment: Vec<u8>,
    #[extrude(skip)]
    pub Dirty: bool,
}

mod mismatched {
    use extrude::Reflect;

    /// Maps the `Comment` table with an integer `Score`, rows holding a score
    /// cannot be read into it.
    #[derive(Reflect, Default, Clone, Debug, PartialEq)]
    pub struct Comment {
        #[extrude(id)]
        pub ArticleID: i64,
        #[extrude(id)]
        pub ID: i64,
        pub Text: String,
        pub Score: Option<i64>,
    }

    pub fn untouched(article: i64, id: i64) -> Comment {
        Comment {
            ArticleID: article,
            ID: id,
            Text: "untouched".into(),
            Score: Some(-1),
        }
    }
}

fn comment(article: i64, id: i64) -> Comment {
    Comment {
        ArticleID: article,
        ID: id,
        Text: format!("Comment {} on {}", id, article),
        Score: if id % 2 == 0 { Some(id as f64 / 4.0) } else { None },
        Attachment: vec![id as u8; id as usize % 4],
        Dirty: false,
    }
}

fn empty(article: i64, id: i64) -> Comment {
    Comment {
        ArticleID: article,
        ID: id,
        ..Default::default()
    }
}

fn error_kind(error: &extrude::Error) -> Option<&ExtrudeError> {
    error.downcast_ref::<ExtrudeError>()
}

pub async fn multiple<E: Executor>(session: &mut Session<E>) {
    let comments: Vec<Comment> = (1..=20).map(|i| comment(7, i)).collect();

    // Shape
    let error = session.insert_multi(&comments[0]).await.unwrap_err();
    assert!(
        matches!(
            error_kind(&error),
            Some(ExtrudeError::UnsupportedShape { .. })
        ),
        "Unexpected error: {:#}",
        error
    );
    let mut single = empty(7, 1);
    let error = session.get_multi(&mut single).await.unwrap_err();
    assert!(matches!(
        error_kind(&error),
        Some(ExtrudeError::UnsupportedShape { .. })
    ));
    assert!(
        session
            .insert_multi(&Vec::<Comment>::new())
            .await
            .expect("Empty batches should succeed")
            .is_empty()
    );

    // Insert
    let keys = session
        .insert_multi(&comments)
        .await
        .expect("Failed to insert the comments");
    assert_eq!(keys.len(), 20);
    assert_eq!(
        keys[3],
        Key::new("Comment", [Value::Int64(Some(7)), Value::Int64(Some(4))])
    );
    assert!(
        session.insert_multi(&comments[..2].to_vec()).await.is_err(),
        "Inserting existing comments should fail"
    );

    // Get
    let mut loaded: Vec<Comment> = (1..=20).rev().map(|i| empty(7, i)).collect();
    session
        .get_multi(&mut loaded)
        .await
        .expect("Failed to get the comments");
    loaded.reverse();
    assert_eq!(loaded, comments);

    // Get with a row that does not fit
    let mut single = mismatched::untouched(7, 2);
    let error = session.get(&mut single).await.unwrap_err();
    assert!(
        format!("{:#}", error).contains("Score"),
        "Unexpected error: {:#}",
        error
    );
    assert_eq!(single, mismatched::untouched(7, 2));
    let mut batch = vec![
        mismatched::untouched(7, 1),
        mismatched::untouched(7, 2),
        mismatched::untouched(7, 3),
    ];
    let error = session.get_multi(&mut batch).await.unwrap_err();
    assert!(
        format!("{:#}", error).contains("Score"),
        "Unexpected error: {:#}",
        error
    );
    assert_eq!(
        batch,
        [
            mismatched::untouched(7, 1),
            mismatched::untouched(7, 2),
            mismatched::untouched(7, 3),
        ]
    );

    // Get with a missing key
    let mut partial = vec![empty(7, 1), empty(7, 99)];
    let error = session.get_multi(&mut partial).await.unwrap_err();
    assert!(
        matches!(
            error_kind(&error),
            Some(ExtrudeError::NotFound { key }) if key.parts()[1] == Value::Int64(Some(99))
        ),
        "Unexpected error: {:#}",
        error
    );
    assert_eq!(partial[0], empty(7, 1));

    // Update through pointers
    let updated: Vec<Box<Comment>> = comments
        .iter()
        .take(5)
        .map(|v| {
            let mut v = Box::new(v.clone());
            v.Text = format!("Edited {}", v.ID);
            v.Dirty = true;
            v
        })
        .collect();
    session
        .update_multi(&updated)
        .await
        .expect("Failed to update the comments");
    let mut loaded: Vec<Comment> = (1..=5).map(|i| empty(7, i)).collect();
    session.get_multi(&mut loaded).await.unwrap();
    for comment in &loaded {
        assert_eq!(comment.Text, format!("Edited {}", comment.ID));
        assert!(!comment.Dirty);
    }
    assert!(
        session.update_multi(&vec![comment(8, 1)]).await.is_err(),
        "Updating missing comments should fail"
    );

    // Insert or update
    let upserts = vec![comment(7, 1), comment(8, 1), comment(8, 2)];
    let keys = session
        .insert_or_update_multi(&upserts)
        .await
        .expect("Failed to insert or update the comments");
    assert_eq!(keys.len(), 3);
    let mut loaded = vec![empty(7, 1), empty(8, 1), empty(8, 2)];
    session.get_multi(&mut loaded).await.unwrap();
    assert_eq!(loaded, upserts);

    // Delete
    let all: Vec<Key> = comments
        .iter()
        .chain(&upserts[1..])
        .map(|v| session.key(v).unwrap())
        .collect();
    session
        .delete_multi(all)
        .await
        .expect("Failed to delete the comments");
    let mut loaded = vec![empty(7, 1)];
    let error = session.get_multi(&mut loaded).await.unwrap_err();
    assert!(matches!(
        error_kind(&error),
        Some(ExtrudeError::NotFound { .. })
    ));
    session
        .delete_multi(vec![])
        .await
        .expect("Deleting nothing should succeed");
}
