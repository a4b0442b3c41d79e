use super::*;

fn build(raw: &str) -> Vec<SqlStatement> {
    BatchStatementBuilder::new().build(raw, &Placeholders::none())
}

#[test]
fn test_go_in_comments_never_splits() {
    let script = "\
/* setup batch
   run GO carefully
*/
CREATE TABLE a (id INT); -- then GO home
GO 2
CREATE TABLE b (id INT)
GO
SELECT 1\n";
    let stmts = build(script);
    // Batch one repeated twice, batch two, trailing batch.
    assert_eq!(stmts.len(), 4);
    assert!(stmts[0].sql.contains("CREATE TABLE a"));
    assert!(stmts[0].sql.contains("run GO carefully"));
    assert_eq!(stmts[0].sql, stmts[1].sql);
    assert!(stmts[2].sql.contains("CREATE TABLE b"));
    assert_eq!(stmts[3].sql, "SELECT 1");
    assert!(stmts.iter().all(|s| s.transactable));
}

#[test]
fn test_go_case_insensitive_and_whitespace_anchored() {
    let stmts = build("SELECT 1\n   go\nSELECT 2\nGo   -- deploy\nSELECT 3\n");
    assert_eq!(stmts.len(), 3);
    assert_eq!(stmts[0].sql, "SELECT 1");
    assert_eq!(stmts[1].sql, "SELECT 2");
    assert_eq!(stmts[2].sql, "SELECT 3");
}

#[test]
fn test_go_inside_statement_text_is_content() {
    let stmts = build("UPDATE t SET note = 'GO'\nWHERE id = 1\nGO\n");
    assert_eq!(stmts.len(), 1);
    assert!(stmts[0].sql.contains("note = 'GO'"));
}

#[test]
fn test_go_inside_multiline_string_is_content() {
    let script = "INSERT INTO t VALUES ('line one\nGO\nline two')\nGO\n";
    let stmts = build(script);
    assert_eq!(stmts.len(), 1);
    assert!(stmts[0].sql.contains("line one\nGO\nline two"));
}

#[test]
fn test_empty_segments_discarded() {
    let stmts = build("GO\n\nGO\nSELECT 1\nGO\nGO\n");
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].sql, "SELECT 1");
}

#[test]
fn test_segment_line_numbers() {
    let stmts = build("\n\nSELECT 1\nGO\n\nSELECT 2\n");
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[0].line, 3);
    assert_eq!(stmts[1].line, 6);
}

#[test]
fn test_empty_script() {
    assert!(build("").is_empty());
    assert!(build("GO\nGO 5\n").is_empty());
}
