use quizforge::store::Store;
use tempfile::TempDir;

pub struct TestStore {
    pub store: Store,
    // Held so the directory outlives the test.
    #[allow(dead_code)]
    pub dir: TempDir,
}

pub fn create_test_store() -> TestStore {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = Store::new(dir.path()).expect("failed to create test store");
    TestStore { store, dir }
}
