//! Natural-language descriptions of tables and columns.
//!
//! The retrieval index does not embed raw schema metadata; it embeds a
//! generated description document per table, built from naming
//! heuristics (identifier columns, monetary columns, date columns) so
//! that questions phrased in business language land near the right
//! table.

use crate::types::TableInfo;

/// Monetary column names that get a "monetary value" description.
const MONEY_COLUMNS: [&str; 5] = ["salary", "wage", "payment", "amount", "price"];

/// Name-like column names that get a "name or title" description.
const NAME_COLUMNS: [&str; 3] = ["name", "title", "label"];

/// A table's description document, ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescription {
    /// Qualified table name
    pub table_name: String,

    /// Concatenated description document
    pub document: String,
}

/// Semantic description for a single column.
///
/// Heuristics, in order:
/// - `*_id` / `*id` suffix: unique identifier
/// - salary/wage/payment/amount/price: monetary value
/// - date in the name, or a date/timestamp type: date/time information
/// - name/title/label: name or title field
/// - otherwise: the column words plus "information"
pub fn describe_column(name: &str, data_type: &str) -> String {
    let lower = name.to_lowercase();
    let type_lower = data_type.to_lowercase();

    if lower.contains("id") && lower.ends_with("id") {
        format!(
            "unique identifier for {}",
            lower.trim_end_matches("id").trim_end_matches('_')
        )
    } else if MONEY_COLUMNS.contains(&lower.as_str()) {
        format!("monetary value representing {}", lower)
    } else if lower.contains("date")
        || type_lower.starts_with("date")
        || type_lower.starts_with("timestamp")
    {
        format!(
            "date/time information for {}",
            lower.trim_end_matches("_date")
        )
    } else if NAME_COLUMNS.contains(&lower.as_str()) {
        "name or title field".to_string()
    } else {
        format!("{} information", lower.replace('_', " "))
    }
}

/// Build the description document for one table.
///
/// The document concatenates a column inventory, a table purpose
/// sentence derived from the table name, and one sentence per column
/// so that both structural and semantic tokens are present.
pub fn describe_table(table: &TableInfo) -> TableDescription {
    let qualified = table.qualified_name();

    let column_lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            format!(
                "{} ({}): {}",
                c.name,
                c.data_type,
                describe_column(&c.name, &c.data_type)
            )
        })
        .collect();

    let purpose = format!(
        "This table named {} stores information about {}",
        table.name,
        table.name.to_lowercase().replace('_', " ")
    );

    let mut parts = vec![
        format!("Table {} contains columns: {}", qualified, column_lines.join(", ")),
        purpose,
    ];
    for column in &table.columns {
        parts.push(format!(
            "Information about {}",
            describe_column(&column.name, &column.data_type)
        ));
    }

    TableDescription {
        table_name: qualified,
        document: parts.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnInfo;

    fn column(name: &str, data_type: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: true,
            default: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_describe_identifier_column() {
        assert_eq!(
            describe_column("employee_id", "integer"),
            "unique identifier for employee"
        );
    }

    #[test]
    fn test_describe_money_column() {
        assert_eq!(
            describe_column("salary", "numeric"),
            "monetary value representing salary"
        );
    }

    #[test]
    fn test_describe_date_column() {
        assert_eq!(
            describe_column("hire_date", "date"),
            "date/time information for hire"
        );
        assert_eq!(
            describe_column("created", "timestamp with time zone"),
            "date/time information for created"
        );
    }

    #[test]
    fn test_describe_name_column() {
        assert_eq!(describe_column("title", "text"), "name or title field");
    }

    #[test]
    fn test_describe_fallback_column() {
        assert_eq!(
            describe_column("shipping_address", "text"),
            "shipping address information"
        );
    }

    #[test]
    fn test_describe_table_document() {
        let table = TableInfo {
            schema: "public".to_string(),
            name: "employee_records".to_string(),
            columns: vec![column("employee_id", "integer"), column("salary", "numeric")],
        };

        let desc = describe_table(&table);
        assert_eq!(desc.table_name, "public.employee_records");
        assert!(desc.document.contains("stores information about employee records"));
        assert!(desc.document.contains("unique identifier for employee"));
        assert!(desc.document.contains("monetary value representing salary"));
    }
}
