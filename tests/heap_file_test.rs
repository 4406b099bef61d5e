use heapdb::storage::heap_file::HeapFile;
use heapdb::types::error::DbError;
use tempfile::tempdir;

#[test]
fn create_allocates_the_first_block() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();

    assert_eq!(file.last_block_id(), 1);
    assert_eq!(file.block_ids(), vec![1]);
    assert!(dir.path().join("t.db").exists());

    // the first block comes back as a valid empty page
    let page = file.get(1).unwrap();
    assert!(page.ids().is_empty());
}

#[test]
fn get_new_hands_out_dense_block_ids() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();

    assert_eq!(file.get_new().unwrap().block_id(), 2);
    assert_eq!(file.get_new().unwrap().block_id(), 3);
    assert_eq!(file.block_ids(), vec![1, 2, 3]);
}

#[test]
fn put_persists_page_mutations() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();

    let mut page = file.get(1).unwrap();
    let id = page.add(b"stored bytes").unwrap();
    file.put(&page).unwrap();

    let reloaded = file.get(1).unwrap();
    assert_eq!(reloaded.get(id).unwrap(), b"stored bytes");
}

#[test]
fn last_block_id_survives_close_and_open() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();
    file.get_new().unwrap();
    file.get_new().unwrap();

    file.close().unwrap();
    assert!(file.is_closed());
    file.open().unwrap();
    assert_eq!(file.last_block_id(), 3);
}

#[test]
fn create_fails_when_file_exists() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();
    file.close().unwrap();

    let mut duplicate = HeapFile::new(dir.path(), "t");
    assert!(matches!(
        duplicate.create(),
        Err(DbError::FileExists { .. })
    ));
}

#[test]
fn operations_on_a_closed_file_fail() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();
    file.close().unwrap();

    assert!(matches!(file.get(1), Err(DbError::FileClosed { .. })));
    assert!(matches!(file.get_new(), Err(DbError::FileClosed { .. })));
}

#[test]
fn drop_file_removes_the_backing_file() {
    let dir = tempdir().unwrap();
    let mut file = HeapFile::new(dir.path(), "t");
    file.create().unwrap();
    file.drop_file().unwrap();

    assert!(!dir.path().join("t.db").exists());
    assert!(matches!(file.open(), Err(DbError::FileNotFound { .. })));
}
