use clap::Parser;
use pretty_assertions::assert_eq;
use schema_from_source::{
    cli::{generate, CliArgs},
    loader,
    overrides::OverrideTable,
    parser::SourceParser,
    resolver::{resolve_pass, PassConfig},
    scanner::FileScanner,
    serializer::{serialize_json, serialize_yaml},
};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn petstore() -> TempDir {
    create_test_project(vec![
        ("src/lib.rs", "pub mod models;\npub mod handlers;\n"),
        ("src/models/mod.rs", "pub mod pet;\npub mod store;\n"),
        ("src/models/pet.rs", include_str!("fixtures/petstore_pet.rs")),
        ("src/models/store.rs", include_str!("fixtures/petstore_store.rs")),
        ("src/handlers.rs", include_str!("fixtures/petstore_handlers.rs")),
    ])
}

fn args(dir: &Path, extra: &[&str]) -> CliArgs {
    let mut argv = vec!["schema-from-source".to_string(), dir.display().to_string()];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::parse_from(argv)
}

#[test]
fn test_petstore_end_to_end_generation() {
    let temp_dir = petstore();

    // Step 1: Scan directory
    let base = temp_dir.path().join("src");
    let scan_result = FileScanner::new(base.clone())
        .scan()
        .expect("Failed to scan directory");
    assert_eq!(scan_result.rust_files.len(), 5);

    // Step 2: Parse files
    let parsed_files: Vec<_> = SourceParser::parse_files(&base, &scan_result.rust_files)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(parsed_files.len(), 5);

    // Step 3: Load and resolve
    let store = loader::load(&parsed_files);
    let definitions = resolve_pass(
        &store,
        &OverrideTable::new(),
        PassConfig::default(),
        &[],
    )
    .expect("Failed to resolve");

    let names: Vec<&str> = definitions.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec![
            "Category",
            "Order",
            "OrderStatus",
            "Pet",
            "Tag",
            "handlers.create_pet.response",
            "handlers.list_pets.response",
        ]
    );

    let pet = serde_json::to_value(&definitions["Pet"]).unwrap();
    assert_eq!(pet["description"], "A pet for sale in the pet store");
    assert_eq!(pet["properties"]["id"], json!({"type": "integer", "format": "int64"}));
    assert_eq!(
        pet["properties"]["tags"],
        json!({"type": "array", "items": {"$ref": "#/definitions/Tag"}})
    );
    assert_eq!(pet["properties"]["parent"], json!({"$ref": "#/definitions/Pet"}));
    assert_eq!(
        pet["properties"]["category"],
        json!({"allOf": [{"$ref": "#/definitions/Category"}], "description": "Grouping used by the catalogue"})
    );
    assert_eq!(pet["properties"]["photoUrls"]["type"], "array");
    assert!(pet["properties"].get("internalNotes").is_none());
    assert_eq!(pet["required"], json!(["name", "photoUrls"]));

    let status = serde_json::to_value(&definitions["OrderStatus"]).unwrap();
    assert_eq!(status["type"], "string");
    assert_eq!(status["enum"], json!(["placed", "approved", "delivered"]));
    assert_eq!(
        status["x-enum-comments"],
        json!({"Placed": "Order has been placed"})
    );

    let order = serde_json::to_value(&definitions["Order"]).unwrap();
    assert_eq!(order["properties"]["pet"], json!({"$ref": "#/definitions/Pet"}));
    assert_eq!(order["properties"]["status"], json!({"$ref": "#/definitions/OrderStatus"}));
    assert_eq!(
        order["properties"]["ship_date"],
        json!({"type": "string", "format": "date-time"})
    );
}

#[test]
fn test_generate_is_idempotent() {
    let temp_dir = petstore();

    let first = serialize_json(&generate(&args(temp_dir.path(), &[])).unwrap()).unwrap();
    let second = serialize_json(&generate(&args(temp_dir.path(), &[])).unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_generate_with_roots_and_strategy() {
    let temp_dir = petstore();

    let document = generate(&args(temp_dir.path(), &["-r", "Order", "-p", "camelcase"])).unwrap();

    let names: Vec<&str> = document.definitions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Category", "Order", "OrderStatus", "Pet", "Tag"]);

    let order = &document.definitions["Order"];
    assert!(order.properties.contains_key("shipDate"));
    assert!(!order.properties.contains_key("ship_date"));
}

#[test]
fn test_generate_with_overrides_file() {
    let temp_dir = petstore();
    std::fs::write(
        temp_dir.path().join("types.overrides"),
        "// hide the catalogue\nskip crate::models::pet::Category\nreplace crate::models::pet::Tag String\n",
    )
    .unwrap();
    let overrides = temp_dir.path().join("types.overrides");

    let document = generate(&args(
        temp_dir.path(),
        &["--overrides-file", overrides.to_str().unwrap()],
    ))
    .unwrap();

    assert!(!document.definitions.contains_key("Category"));
    assert!(!document.definitions.contains_key("Tag"));
    let pet = serde_json::to_value(&document.definitions["Pet"]).unwrap();
    assert!(pet["properties"].get("category").is_none());
    assert_eq!(pet["properties"]["tags"], json!({"type": "array", "items": {"type": "string"}}));
}

#[test]
fn test_yaml_output() {
    let temp_dir = petstore();

    let document = generate(&args(temp_dir.path(), &["--title", "Petstore", "--api-version", "3.1"]))
        .unwrap();
    let yaml = serialize_yaml(&document).unwrap();

    assert!(yaml.contains("swagger: '2.0'"));
    assert!(yaml.contains("title: Petstore"));
    assert!(yaml.contains("#/definitions/Pet"));
}

#[test]
fn test_broken_file_does_not_hide_other_types() {
    let temp_dir = create_test_project(vec![
        ("src/lib.rs", "pub struct Healthy { pub ok: bool }"),
        ("src/broken.rs", "pub struct Broken { pub x: u8"),
    ]);

    let document = generate(&args(temp_dir.path(), &[])).unwrap();
    assert!(document.definitions.contains_key("Healthy"));
}

#[test]
fn test_unresolved_reference_fails_the_run() {
    let temp_dir = create_test_project(vec![(
        "src/lib.rs",
        "pub struct Holder { pub value: Mystery }",
    )]);

    let err = generate(&args(temp_dir.path(), &[])).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("cannot find type definition: Mystery"), "{}", message);
    assert!(message.contains("Holder.value"), "{}", message);
}

#[test]
fn test_binary_root_beside_library_is_not_described() {
    let temp_dir = create_test_project(vec![
        ("src/lib.rs", "pub struct Config { pub port: u16 }"),
        (
            "src/main.rs",
            "pub struct Config { pub verbose: bool }\nfn main() {}",
        ),
    ]);

    let document = generate(&args(temp_dir.path(), &[])).unwrap();
    let names: Vec<&str> = document.definitions.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Config"]);
    assert!(document.definitions["Config"].properties.contains_key("port"));
}
