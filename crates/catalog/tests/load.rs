use std::io::Write;

use catalog::{Catalog, CatalogError};

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{ "question": "How long does shipping take?", "answer": "Ship in 3 days", "embedding": [1.0, 0.0] }},
            {{ "question": "Do you ship abroad?", "answer": "Yes, worldwide", "embedding": [0.6, 0.8] }}
        ]"#
    )
    .unwrap();

    let catalog = Catalog::load(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.dimension(), Some(2));
    assert_eq!(catalog.entries()[0].answer, "Ship in 3 days");
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.json");

    let err = Catalog::load(&path).unwrap_err();
    match err {
        CatalogError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn load_invalid_json_is_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[{{ \"answer\": \"a\", \"embedding\": [1.0,").unwrap();

    let err = Catalog::load(file.path()).unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}
