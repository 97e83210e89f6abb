use feedbackdesk::database::Database;
use uuid::Uuid;

pub struct TestDb {
    db: Database,
    file: String,
}

impl TestDb {
    pub fn db(&self) -> &Database {
        &self.db
    }
}

/// File-based SQLite with a unique name per test so tests can run in
/// parallel.
pub async fn setup_test_db() -> TestDb {
    let file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.create_schema().await.expect("Failed to create schema");

    TestDb { db, file }
}

pub async fn teardown_test_db(test_db: TestDb) {
    drop(test_db.db);
    let _ = std::fs::remove_file(&test_db.file);
}
