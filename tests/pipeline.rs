//! Offline pipeline tests: description generation, retrieval, SQL
//! sanitization, and rendering, with no database or network.

use nlsql::llm::{clean_sql, validate_select};
use nlsql::output::ResultSet;
use nlsql::retrieval::{describe_table, TableIndex, TfidfVectorizer, DEFAULT_TOP_K};
use nlsql::types::{ColumnInfo, SchemaCatalog, TableInfo};

fn column(name: &str, data_type: &str) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        data_type: data_type.to_string(),
        nullable: true,
        default: None,
        description: String::new(),
    }
}

fn table(name: &str, columns: Vec<ColumnInfo>) -> TableInfo {
    TableInfo {
        schema: "public".to_string(),
        name: name.to_string(),
        columns,
    }
}

fn sample_catalog() -> SchemaCatalog {
    SchemaCatalog::new(vec![
        table(
            "employees",
            vec![
                column("employee_id", "integer"),
                column("name", "text"),
                column("salary", "numeric"),
                column("hire_date", "date"),
            ],
        ),
        table(
            "orders",
            vec![
                column("order_id", "integer"),
                column("amount", "numeric"),
                column("order_date", "timestamp without time zone"),
            ],
        ),
        table(
            "products",
            vec![
                column("product_id", "integer"),
                column("title", "text"),
                column("price", "numeric"),
            ],
        ),
    ])
}

#[tokio::test]
async fn retrieval_finds_the_right_table_for_a_salary_question() {
    let catalog = sample_catalog();
    let descriptions: Vec<_> = catalog.tables.values().map(describe_table).collect();
    let corpus: Vec<String> = descriptions.iter().map(|d| d.document.clone()).collect();

    let vectorizer = TfidfVectorizer::fit(&corpus).unwrap();
    let index = TableIndex::build(&vectorizer, descriptions).await.unwrap();

    let matches = index
        .find_relevant(&vectorizer, "show employees with a salary over 50000", DEFAULT_TOP_K)
        .await
        .unwrap();

    assert!(!matches.is_empty());
    assert_eq!(matches[0].table_name, "public.employees");
    assert!(matches.len() <= DEFAULT_TOP_K);
}

#[tokio::test]
async fn retrieval_returns_nothing_for_an_unrelated_question() {
    let catalog = sample_catalog();
    let descriptions: Vec<_> = catalog.tables.values().map(describe_table).collect();
    let corpus: Vec<String> = descriptions.iter().map(|d| d.document.clone()).collect();

    let vectorizer = TfidfVectorizer::fit(&corpus).unwrap();
    let index = TableIndex::build(&vectorizer, descriptions).await.unwrap();

    let matches = index
        .find_relevant(&vectorizer, "quantum flux capacitor telemetry", DEFAULT_TOP_K)
        .await
        .unwrap();

    assert!(matches.is_empty());
}

#[test]
fn prompt_context_covers_only_retrieved_tables() {
    let catalog = sample_catalog();
    let context = catalog.prompt_context(&["public.employees".to_string()]);

    assert!(context.contains("Table public.employees columns:"));
    assert!(context.contains("salary (numeric)"));
    assert!(!context.contains("public.orders"));
}

#[test]
fn generated_sql_is_sanitized_and_gated() {
    // A typical chatty model reply.
    let raw = "Sure! Here is the query:\n```sql\nSELECT name, salary\nFROM employees\nWHERE salary > 50000; -- high earners\n```";
    let sql = clean_sql(raw).unwrap();
    assert_eq!(sql, "SELECT name, salary FROM employees WHERE salary > 50000;");
    validate_select(&sql).unwrap();

    // A destructive reply never reaches the executor.
    let cleaned = clean_sql("SELECT 1; DELETE FROM employees;").unwrap();
    assert_eq!(cleaned, "SELECT 1;");
    assert!(validate_select("DELETE FROM employees;").is_err());
}

#[test]
fn result_set_renders_and_exports() {
    let results = ResultSet {
        columns: vec!["name".to_string(), "salary".to_string()],
        rows: vec![
            vec![Some("Alice".to_string()), Some("62000".to_string())],
            vec![Some("Bob".to_string()), None],
        ],
    };

    let rendered = results.render_table();
    assert!(rendered.contains("| name"));
    assert!(rendered.contains("Alice"));
    assert!(rendered.ends_with("(2 rows)\n"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    results.write_csv(&path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.starts_with("name,salary\n"));
}
