use super::*;

#[test]
fn test_defaults_match_naming_contract() {
    let opts = MigrationOptions::default();
    assert_eq!(opts.sql_migration_prefix, "V");
    assert_eq!(opts.sql_repeatable_prefix, "R");
    assert_eq!(opts.sql_migration_separator, "__");
    assert_eq!(opts.sql_migration_suffix, ".sql");
    assert_eq!(opts.placeholder_prefix, "${");
    assert_eq!(opts.placeholder_suffix, "}");
    assert_eq!(opts.metadata_table_name, "changelog");
    assert_eq!(opts.transaction_mode, TransactionMode::CommitEach);
    assert!(!opts.out_of_order);
    assert!(!opts.erase_disabled);
}

#[test]
fn test_deserialize_partial_json_fills_defaults() {
    let opts: MigrationOptions = serde_json::from_str(
        r#"{
            "schemas": ["app"],
            "transaction_mode": "commit_all",
            "target_version": "2.1"
        }"#,
    )
    .unwrap();
    assert_eq!(opts.schemas, vec!["app".to_string()]);
    assert_eq!(opts.transaction_mode, TransactionMode::CommitAll);
    assert_eq!(opts.target_version.unwrap().parts(), &[2, 1]);
    assert_eq!(opts.metadata_table_name, "changelog");
}

#[test]
fn test_deserialize_rejects_bad_target_version() {
    let result: Result<MigrationOptions, _> =
        serde_json::from_str(r#"{ "target_version": "1..2" }"#);
    assert!(result.is_err());
}
