// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_utils::{create_tree, temp_project};

fn loader(root: &Path) -> (FsModuleLoader, Arc<MemoryModuleCache>) {
    let cache = Arc::new(MemoryModuleCache::new());
    let loader = FsModuleLoader::with_search_paths(vec![root.join("plugins")], cache.clone());
    (loader, cache)
}

#[test]
fn loads_are_cached_by_canonical_path() {
    let tmp = temp_project();
    create_tree(tmp.path(), &[("test/a.sh", "exit 0\n")]);
    let (loader, cache) = loader(tmp.path());

    let first = loader.load(&tmp.path().join("test/a.sh")).unwrap();
    let second = loader.load(&tmp.path().join("test/../test/a.sh")).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(cache.get(&first.path).is_some());
}

#[test]
fn cached_module_keeps_stale_source_until_purged() {
    let tmp = temp_project();
    create_tree(tmp.path(), &[("test/a.sh", "exit 0\n")]);
    let (loader, cache) = loader(tmp.path());
    let path = tmp.path().join("test/a.sh");

    let first = loader.load(&path).unwrap();
    create_tree(tmp.path(), &[("test/a.sh", "exit 1\n")]);
    assert_eq!(loader.load(&path).unwrap().source, first.source);

    assert!(cache.purge(&first.path));
    let fresh = loader.load(&path).unwrap();
    assert_eq!(fresh.source.as_deref(), Some("exit 1\n"));
}

#[test]
fn purge_of_unknown_path_reports_absent() {
    let cache = MemoryModuleCache::new();
    assert!(!cache.purge(Path::new("/nowhere")));
}

#[test]
fn json_modules_expose_exports() {
    let tmp = temp_project();
    create_tree(tmp.path(), &[("reg.json", r#"{"reporters": {}}"#)]);
    let (loader, _) = loader(tmp.path());

    let module = loader.load(&tmp.path().join("reg.json")).unwrap();
    assert_eq!(module.kind, ModuleKind::Json);
    assert!(module.exports.as_ref().is_some_and(|e| e.get("reporters").is_some()));
}

#[test]
fn invalid_json_module_is_a_module_error() {
    let tmp = temp_project();
    create_tree(tmp.path(), &[("bad.json", "{")]);
    let (loader, _) = loader(tmp.path());

    let err = loader.load(&tmp.path().join("bad.json")).unwrap_err();
    assert!(matches!(err, Error::Module { .. }), "{err}");
}

#[test]
fn missing_module_is_a_module_error() {
    let tmp = temp_project();
    let (loader, _) = loader(tmp.path());
    assert!(matches!(
        loader.load(&tmp.path().join("nope.sh")),
        Err(Error::Module { .. })
    ));
}

#[test]
fn resolve_searches_roots_and_extensions() {
    let tmp = temp_project();
    create_tree(tmp.path(), &[("plugins/fancy.sh", "cat\n")]);
    let (loader, _) = loader(tmp.path());

    assert_eq!(
        loader.resolve("fancy"),
        Some(tmp.path().join("plugins/fancy.sh"))
    );
    assert_eq!(loader.resolve("missing"), None);
}

#[test]
fn resolve_accepts_absolute_paths() {
    let tmp = temp_project();
    create_tree(tmp.path(), &[("abs.json", "{}")]);
    let (loader, _) = loader(tmp.path());

    let abs = tmp.path().join("abs.json");
    assert_eq!(loader.resolve(abs.to_str().unwrap()), Some(abs));
}

#[test]
fn setup_script_failure_is_reported() {
    let tmp = temp_project();
    create_tree(
        tmp.path(),
        &[("ok.sh", "touch marker\n"), ("bad.sh", "echo nope >&2; exit 2\n")],
    );
    let (loader, _) = loader(tmp.path());

    loader
        .load(&tmp.path().join("ok.sh"))
        .unwrap()
        .run_setup(tmp.path())
        .unwrap();
    assert!(tmp.path().join("marker").exists());

    let err = loader
        .load(&tmp.path().join("bad.sh"))
        .unwrap()
        .run_setup(tmp.path())
        .unwrap_err();
    assert!(err.to_string().contains("nope"), "{err}");
}
