use std::fs;
use std::sync::Arc;

use crate::{Engine, Error, FileSystemLoader, Loader, MemoryLoader};

#[test]
fn memory_loader_serves_inserted_templates() {
    let loader = MemoryLoader::new().with("a.html", "{{ a }}");

    assert_eq!(loader.load("a.html").unwrap(), "{{ a }}");
    assert!(matches!(loader.load("b.html"), Err(Error::TemplateNotFound(name)) if name == "b.html"));
}

#[test]
fn file_system_loader_reads_under_root() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("partials")).unwrap();
    fs::write(dir.path().join("partials/footer.html"), "{{ company }}").unwrap();
    let loader = FileSystemLoader::new(dir.path());

    assert_eq!(loader.load("partials/footer.html").unwrap(), "{{ company }}");
    assert!(matches!(
        loader.load("partials/missing.html"),
        Err(Error::TemplateNotFound(_))
    ));
}

#[test]
fn file_system_loader_rejects_escaping_names() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileSystemLoader::new(dir.path().join("root"));

    assert_eq!(loader.resolve("../secret.html"), None);
    assert_eq!(loader.resolve("/etc/passwd"), None);
    assert!(matches!(
        loader.load("../secret.html"),
        Err(Error::TemplateNotFound(_))
    ));
    assert_eq!(
        loader.resolve("layouts/base.html"),
        Some(dir.path().join("root/layouts/base.html"))
    );
}

#[test]
fn engine_caches_parsed_templates() {
    let engine = Engine::new(MemoryLoader::new().with("a.html", "{{ a }}"));

    let first = engine.template("a.html").unwrap();
    let second = engine.template("a.html").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn engine_reports_syntax_errors_of_named_templates() {
    let engine = Engine::new(MemoryLoader::new().with("bad.html", "{% if x %}"));

    let err = engine.infer("bad.html").unwrap_err();

    assert_eq!(
        err.to_string(),
        "line 1: expected `{% endif %}`, found end of template"
    );
}
