use crate::test_types;
use extrude::{Executor, ExtrudeError, Reflect, Session};

pub async fn schema<E: Executor>(session: &mut Session<E>) {
    // Invalid types are rejected before anything reaches the executor
    let mut types = test_types();
    types.push(i64::type_info());
    let error = session.create_database(&types).await.unwrap_err();
    assert!(
        matches!(
            error.downcast_ref::<ExtrudeError>(),
            Some(ExtrudeError::NotAStruct { type_name: "i64" })
        ),
        "Unexpected error: {:#}",
        error
    );

    session
        .create_database(&test_types())
        .await
        .expect("Failed to create the database");
    for info in test_types() {
        assert!(session.cache().contains_type(&info));
    }
}
