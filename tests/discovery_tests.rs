//! Namespace discovery tests
//!
//! Static and manifest-backed discovery feeding a catalog that is then resolved.

use std::fs;
use std::sync::Arc;

use modgraph::config::DiscoveryConfig;
use modgraph::module::registry::{
    ComputationTable, Declaration, ManifestDiscovery, StaticDiscovery,
};
use modgraph::{
    DependencyResolver, Module, ModuleCatalog, ModuleDiscovery, ModuleError, ModuleInputs,
};
use tempfile::TempDir;

fn write_manifest(dir: &TempDir, namespace: &str, contents: &str) {
    fs::write(dir.path().join(format!("{}.toml", namespace)), contents).unwrap();
}

fn sorted_names(modules: &[Module<String>]) -> Vec<String> {
    let mut names: Vec<String> = modules.iter().map(|m| m.name().to_string()).collect();
    names.sort();
    names
}

fn table() -> ComputationTable<String> {
    ComputationTable::new()
        .bind("load", |_| Ok("raw".to_string()))
        .bind("clean", |inputs| {
            Ok(format!("clean({})", inputs.require("source")?))
        })
        .bind("report", |inputs| {
            let parts: Vec<&str> = inputs.iter().map(|(_, a)| a.as_str()).collect();
            Ok(format!("report[{}]", parts.join("+")))
        })
}

#[test]
fn test_static_discovery_returns_only_singletons() {
    let discovery = StaticDiscovery::new()
        .singleton("app", Module::new("X", |_| Ok("x".to_string())))
        .singleton(
            "app",
            Module::new("Y", |_| Ok("y".to_string())).depends_on(["X"]),
        )
        .plain_type("app", "X")
        .class("app", "Z", ["X"])
        .declare("app", Declaration::PlainType { name: "Helper".into() });

    let modules = discovery.discover("app").unwrap();

    assert_eq!(sorted_names(&modules), vec!["X", "Y"]);
}

#[test]
fn test_static_discovery_feeds_catalog() {
    let discovery = StaticDiscovery::new()
        .singleton(
            "app",
            Module::new("total", |inputs: &ModuleInputs<String>| {
                Ok(format!("total of {}", inputs.require("numbers")?))
            })
            .depends_on(["numbers"]),
        )
        .singleton("app", Module::new("numbers", |_| Ok("1,2,3".to_string())));

    let mut catalog = ModuleCatalog::new();
    assert_eq!(catalog.register_discovered(&discovery, "app").unwrap(), 2);
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["numbers", "total"]);

    let mut resolver = DependencyResolver::new(Arc::new(catalog));
    assert_eq!(resolver.resolve("total").unwrap(), "total of 1,2,3");
}

#[test]
fn test_manifest_discovery_binds_singletons() {
    let dir = TempDir::new().unwrap();
    write_manifest(
        &dir,
        "pipeline",
        r#"
[[declarations]]
name = "source"
kind = "singleton"
computation = "load"

[[declarations]]
name = "cleaned"
kind = "singleton"
description = "Source with noise removed"
dependencies = ["source"]
computation = "clean"

[[declarations]]
name = "report"
kind = "singleton"
dependencies = ["source", "cleaned"]

[[declarations]]
name = "Row"
kind = "type"

[[declarations]]
name = "Exporter"
kind = "class"
dependencies = ["report"]
"#,
    );
    let discovery = ManifestDiscovery::new(dir.path(), table());

    let modules = discovery.discover("pipeline").unwrap();
    assert_eq!(sorted_names(&modules), vec!["cleaned", "report", "source"]);

    let cleaned = modules.iter().find(|m| m.name() == "cleaned").unwrap();
    assert_eq!(cleaned.description(), "Source with noise removed");

    let mut catalog = ModuleCatalog::new();
    catalog.register_discovered(&discovery, "pipeline").unwrap();
    let mut resolver = DependencyResolver::new(Arc::new(catalog));

    assert_eq!(
        resolver.resolve("report").unwrap(),
        "report[raw+clean(raw)]"
    );
    assert_eq!(resolver.stats().executed, 3);
}

#[test]
fn test_manifest_discovery_missing_namespace_is_empty() {
    let dir = TempDir::new().unwrap();
    let discovery = ManifestDiscovery::new(dir.path(), table());

    assert!(discovery.discover("absent").unwrap().is_empty());
}

#[test]
fn test_manifest_discovery_unbound_computation() {
    let dir = TempDir::new().unwrap();
    write_manifest(
        &dir,
        "extra",
        r#"
[[declarations]]
name = "mystery"
kind = "singleton"
"#,
    );
    let discovery = ManifestDiscovery::new(dir.path(), table());

    match discovery.discover("extra") {
        Err(ModuleError::UnboundComputation { namespace, name }) => {
            assert_eq!(namespace, "extra");
            assert_eq!(name, "mystery");
        }
        other => panic!("expected unbound computation, got {:?}", other.map(|m| m.len())),
    }
}

#[test]
fn test_manifest_discovery_rejects_invalid_manifest() {
    let dir = TempDir::new().unwrap();
    write_manifest(
        &dir,
        "broken",
        r#"
[[declarations]]
name = "load"
kind = "singleton"
dependencies = ["load"]
"#,
    );
    write_manifest(&dir, "garbled", "declarations = 5\n");
    let discovery = ManifestDiscovery::new(dir.path(), table());

    assert!(matches!(
        discovery.discover("broken"),
        Err(ModuleError::InvalidManifest(_))
    ));
    assert!(matches!(
        discovery.discover("garbled"),
        Err(ModuleError::InvalidManifest(_))
    ));
}

#[test]
fn test_discovered_name_clash_is_duplicate() {
    let discovery = StaticDiscovery::new()
        .singleton("first", Module::new("shared", |_| Ok("one".to_string())))
        .singleton("second", Module::new("shared", |_| Ok("two".to_string())));

    let mut catalog = ModuleCatalog::new();
    catalog.register_discovered(&discovery, "first").unwrap();

    assert!(matches!(
        catalog.register_discovered(&discovery, "second"),
        Err(ModuleError::DuplicateName(ref name)) if name == "shared"
    ));
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_catalog_from_discovery_config() {
    let dir = TempDir::new().unwrap();
    write_manifest(
        &dir,
        "inputs",
        r#"
[[declarations]]
name = "source"
kind = "singleton"
computation = "load"
"#,
    );
    write_manifest(
        &dir,
        "inputs.clean",
        r#"
[[declarations]]
name = "cleaned"
kind = "singleton"
dependencies = ["source"]
computation = "clean"
"#,
    );
    let config = DiscoveryConfig {
        manifest_dir: dir.path().to_path_buf(),
        namespaces: vec!["inputs".to_string(), "inputs.clean".to_string(), "absent".to_string()],
    };

    let catalog = ModuleCatalog::from_discovery_config(&config, table()).unwrap();

    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["source", "cleaned"]);
    let mut resolver = DependencyResolver::new(Arc::new(catalog));
    assert_eq!(resolver.resolve("cleaned").unwrap(), "clean(raw)");
}

#[test]
fn test_catalog_from_discovery_config_rejects_clash_across_namespaces() {
    let dir = TempDir::new().unwrap();
    let manifest = r#"
[[declarations]]
name = "source"
kind = "singleton"
computation = "load"
"#;
    write_manifest(&dir, "first", manifest);
    write_manifest(&dir, "second", manifest);
    let config = DiscoveryConfig {
        manifest_dir: dir.path().to_path_buf(),
        namespaces: vec!["first".to_string(), "second".to_string()],
    };

    assert!(matches!(
        ModuleCatalog::from_discovery_config(&config, table()),
        Err(ModuleError::DuplicateName(ref name)) if name == "source"
    ));
}

#[test]
fn test_multi_module_namespace_clash_registers_nothing() {
    let discovery = StaticDiscovery::new()
        .singleton("ns", Module::new("a", |_| Ok("a".to_string())))
        .singleton("ns", Module::new("z", |_| Ok("z".to_string())));
    let mut catalog =
        ModuleCatalog::from_modules(vec![Module::new("z", |_| Ok("existing".to_string()))])
            .unwrap();

    assert!(catalog.register_discovered(&discovery, "ns").is_err());
    assert_eq!(catalog.len(), 1);
    assert!(!catalog.contains("a"));
}
