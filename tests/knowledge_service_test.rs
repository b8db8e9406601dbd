//! Tests for KnowledgeService against the real filesystem

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use guesstree::application::services::{ExportFormat, KnowledgeService};
use guesstree::application::ApplicationError;
use guesstree::domain::{ArenaOptions, CodecOptions, DomainError};
use guesstree::infrastructure::traits::RealFileSystem;
use guesstree::util::testing;

fn service() -> KnowledgeService {
    testing::init_test_setup();
    KnowledgeService::new(
        Arc::new(RealFileSystem),
        ArenaOptions::default(),
        CodecOptions::default(),
    )
}

fn create_kb_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write knowledge base");
    path
}

#[test]
fn given_saved_base_when_loading_then_same_tree() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let service = service();
    let mut kb = service.fresh("void").unwrap();
    kb.cursor().learn("alive", "cat").unwrap();
    let path = temp.path().join("nested/dir/kb.txt");

    // Act
    service.save(&kb, &path, ExportFormat::Text).unwrap();
    let loaded = service.load(&path).unwrap();

    // Assert
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "(\"alive\"\n    \"cat\"\n    \"void\"\n)\n"
    );
    assert_eq!(loaded.tree_size(), 3);
    assert!(loaded.contains("cat"));
}

#[test]
fn given_graph_format_when_saving_then_writes_digraph() {
    let temp = TempDir::new().unwrap();
    let service = service();
    let kb = service.fresh("void").unwrap();
    let path = temp.path().join("kb.dot");

    service.save(&kb, &path, ExportFormat::Graph).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("digraph {"));
    assert!(content.contains("node1 [label = \"void\", shape = box];"));
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.txt");

    let err = service().load(&path).unwrap_err();

    match err {
        ApplicationError::OperationFailed { context, .. } => {
            assert!(context.contains("absent.txt"), "context: {context}")
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}

#[test]
fn given_malformed_file_when_loading_then_domain_error() {
    let temp = TempDir::new().unwrap();
    let path = create_kb_file(&temp, "bad.txt", "(\"alive\" \"cat\"");

    let err = service().load(&path).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MalformedDocument { offset: 14, .. })
    ));
}

#[test]
fn given_non_utf8_file_when_loading_then_operation_failed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("latin1.txt");
    std::fs::write(&path, b"(\"caf\xe9\" \"a\" \"b\")").unwrap();

    let err = service().load(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

#[test]
fn given_nested_subject_when_describing_then_owned_definition() {
    let temp = TempDir::new().unwrap();
    let path = create_kb_file(
        &temp,
        "kb.txt",
        r#"("alive" ("barks" "dog" "cat") "void")"#,
    );
    let service = service();
    let kb = service.load(&path).unwrap();

    let definition = service.describe(&kb, "cat").unwrap();

    assert_eq!(
        definition.properties,
        vec![("barks".to_string(), false), ("alive".to_string(), true)]
    );
    assert_eq!(definition.to_string(), "cat: not barks, alive");
}

#[test]
fn given_unknown_subject_when_describing_then_no_such_subject() {
    let service = service();
    let kb = service.fresh("void").unwrap();

    let err = service.describe(&kb, "cat").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NoSuchSubject(_))
    ));
}

#[test]
fn given_base_when_collecting_stats_then_reports_shape() {
    let service = service();
    let kb = guesstree::domain::KnowledgeBase::parse(r#"("alive" ("barks" "dog" "cat") "void")"#)
        .unwrap();

    let stats = service.stats(&kb);

    assert_eq!(stats.tree_size, 5);
    assert_eq!(stats.leaf_count, 3);
    assert_eq!(stats.allocated_nodes, 5);
    assert_eq!(stats.depth, 3);
    assert!(stats.slab_count >= 1);
    assert!(stats.reserved_bytes >= 1024);
}
