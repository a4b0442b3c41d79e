use super::*;

fn placeholders(pairs: &[(&str, &str)]) -> Placeholders {
    let map = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Placeholders::new("${", "}", map)
}

#[test]
fn test_literal_substitution() {
    let p = placeholders(&[("schema", "app"), ("owner", "svc")]);
    let sql = "CREATE TABLE ${schema}.t (owner TEXT DEFAULT '${owner}');";
    assert_eq!(
        p.apply(sql),
        "CREATE TABLE app.t (owner TEXT DEFAULT 'svc');"
    );
}

#[test]
fn test_unknown_tokens_left_alone() {
    let p = placeholders(&[("schema", "app")]);
    assert_eq!(p.apply("SELECT '${missing}';"), "SELECT '${missing}';");
}

#[test]
fn test_custom_delimiters() {
    let map = [("env".to_string(), "prod".to_string())].into();
    let p = Placeholders::new("%%", "%%", map);
    assert_eq!(p.apply("USE %%env%%;"), "USE prod;");
}

#[test]
fn test_none_is_identity() {
    let p = Placeholders::none();
    assert!(p.is_empty());
    assert_eq!(p.apply("SELECT ${x};"), "SELECT ${x};");
}
