//! nlsql CLI
//!
//! Command-line interface for the natural-language-to-SQL assistant.

use clap::{Parser, Subcommand};
use nlsql::assistant::Assistant;
use nlsql::config::{EmbeddingBackend, PgSettings};
use nlsql::db::{extract_catalog, PgClient};
use nlsql::types::{AssistantError, SchemaCatalog};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Natural-language-to-SQL assistant for PostgreSQL
#[derive(Parser)]
#[command(name = "nlsql")]
#[command(about = "Ask a PostgreSQL database questions in plain English", long_about = None)]
#[command(version)]
struct Cli {
    /// Connection URL (overrides the DB_* environment variables)
    #[arg(long, env = "DATABASE_URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive question loop (type 'exit' to quit)
    Repl,

    /// Ask a single question
    Ask {
        /// Question in natural language
        question: String,

        /// Show the generated SQL without executing it
        #[arg(long)]
        plan: bool,

        /// Also write the result rows to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Schema catalog inspection
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Verify the database connection
    Verify,
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// List extracted tables
    List,

    /// Show one table's columns
    Show {
        /// Table name (qualified or bare)
        table: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = PgSettings::resolve(cli.url.as_deref())?;
    let backend = EmbeddingBackend::from_env()?;

    match cli.command {
        Commands::Repl => {
            let assistant = Assistant::initialize(&settings, backend).await?;
            cmd_repl(&assistant).await?;
        }
        Commands::Ask { question, plan, csv } => {
            let assistant = Assistant::initialize(&settings, backend).await?;
            cmd_ask(&assistant, &question, plan, csv.as_deref()).await?;
        }
        Commands::Schema(cmd) => {
            // Catalog inspection needs the database, not the LLM.
            let client = PgClient::connect(&settings).await?;
            let catalog = extract_catalog(&client).await?;
            match cmd {
                SchemaCommands::List => cmd_schema_list(&catalog),
                SchemaCommands::Show { table } => cmd_schema_show(&catalog, &table)?,
            }
        }
        Commands::Verify => {
            cmd_verify(&settings).await?;
        }
    }

    Ok(())
}

async fn cmd_repl(assistant: &Assistant) -> anyhow::Result<()> {
    println!("Natural Language to SQL Query System");
    println!("====================================");
    println!("Type 'exit' to quit.");
    println!();

    let stdin = io::stdin();
    loop {
        print!("question> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();

        if question.eq_ignore_ascii_case("exit") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        // A failed question never kills the loop.
        match assistant.answer(question).await {
            Ok(answer) => print_answer(&answer, None)?,
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }

    println!("Thank you for using nlsql!");
    Ok(())
}

async fn cmd_ask(
    assistant: &Assistant,
    question: &str,
    plan: bool,
    csv: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let answer = if plan {
        assistant.plan(question).await?
    } else {
        assistant.answer(question).await?
    };
    print_answer(&answer, csv)?;
    Ok(())
}

fn print_answer(answer: &nlsql::Answer, csv: Option<&std::path::Path>) -> anyhow::Result<()> {
    let names: Vec<String> = answer
        .relevant_tables
        .iter()
        .map(|m| format!("{} ({:.2})", m.table_name, m.score))
        .collect();
    println!("Relevant tables: {}", names.join(", "));
    println!("SQL: {}", answer.sql);

    if let Some(results) = &answer.results {
        println!();
        print!("{}", results.render_table());

        if let Some(path) = csv {
            results.write_csv(path)?;
            println!("Wrote {} rows to {}", results.len(), path.display());
        }
    }
    Ok(())
}

fn cmd_schema_list(catalog: &SchemaCatalog) {
    for table in catalog.tables.values() {
        println!("{} ({} columns)", table.qualified_name(), table.columns.len());
    }
    println!("({} tables)", catalog.len());
}

fn cmd_schema_show(catalog: &SchemaCatalog, name: &str) -> anyhow::Result<()> {
    let table = catalog
        .get(name)
        .ok_or_else(|| AssistantError::Schema(format!("table '{}' not found in catalog", name)))?;

    println!("{}", table.qualified_name());
    for column in &table.columns {
        let nullable = if column.nullable { "" } else { " NOT NULL" };
        println!("  {} {}{}", column.name, column.data_type, nullable);
        if !column.description.is_empty() {
            println!("    -- {}", column.description);
        }
    }
    Ok(())
}

async fn cmd_verify(settings: &PgSettings) -> anyhow::Result<()> {
    let client = PgClient::connect(settings).await?;
    let report = client.verify().await?;

    println!("Server:        {}", report.server_version);
    println!("Database:      {}", report.database);
    println!("Current user:  {}", report.current_user);
    println!("Session user:  {}", report.session_user);
    println!("Visible tables: {}", report.visible_tables);
    Ok(())
}
