#[cfg(test)]
mod tests {
    use extrude::{DescriptorCache, Session};
    use extrude_tests::{MemoryExecutor, execute_tests, init_logs, test_config, test_types};
    use std::sync::Arc;

    #[tokio::test]
    async fn memory() {
        init_logs();
        let executor = MemoryExecutor::new();
        let session = Session::new(executor.clone(), test_config());
        execute_tests(session).await;
        assert_eq!(executor.tables(), ["Article", "Comment"]);
        assert_eq!(executor.rows("Article"), Some(0));
        assert_eq!(executor.rows("Comment"), Some(0));
        assert_eq!(executor.rows("Missing"), None);
    }

    #[tokio::test]
    async fn create_database_request() {
        init_logs();
        let executor = MemoryExecutor::new();
        let mut session = Session::new(executor.clone(), test_config());
        session.create_database(&test_types()).await.unwrap();
        let databases = executor.databases();
        assert_eq!(databases.len(), 1);
        let request = &databases[0];
        assert_eq!(request.parent, "projects/extrude-project/instances/extrude-instance");
        assert_eq!(request.statement, "CREATE DATABASE `extrude`");
        assert_eq!(request.extra_statements.len(), 2);
        assert_eq!(
            request.extra_statements[0],
            "CREATE TABLE Article (\n\
            \tID\tINT64\tNOT NULL,\n\
            \tTitle\tSTRING(MAX)\tNOT NULL,\n\
            \tBody\tSTRING(MAX)\tNOT NULL,\n\
            \tAuthors\tARRAY<STRING(MAX)>,\n\
            \tCreatedAt\tTIMESTAMP\tNOT NULL,\n\
            \tUpdatedAt\tTIMESTAMP\tNOT NULL,\n\
            ) PRIMARY KEY (ID)"
        );
        assert!(
            request.extra_statements[1].ends_with(") PRIMARY KEY (ArticleID, ID)"),
            "{}",
            request.extra_statements[1]
        );
        assert!(
            session.create_database(&test_types()).await.is_err(),
            "Creating the same database twice should fail"
        );
    }

    #[tokio::test]
    async fn shared_cache() {
        init_logs();
        let cache = Arc::new(DescriptorCache::new());
        let first = Session::with_cache(MemoryExecutor::new(), test_config(), cache.clone());
        let second = Session::with_cache(MemoryExecutor::new(), test_config(), cache.clone());
        execute_tests(first).await;
        assert_eq!(cache.len(), 3);
        execute_tests(second).await;
        assert_eq!(cache.len(), 3);
    }
}
