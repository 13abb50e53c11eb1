use crate::argparse::{FilterArgs, ParseArgs, QueryArgs, SqliteArgs};
use anyhow::Context;
use card_search::{
    build_where, Catalog, Compilation, Compiler, LogicTree, QueryParser, Registry, SearchToken,
    SqlValue, UsageStats,
};
use card_search_cli::validate_query;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row as _;
use std::collections::BTreeSet;

fn parse_query(registry: &Registry, query: &str) -> anyhow::Result<LogicTree<SearchToken>> {
    let query = validate_query(query)?;
    Ok(QueryParser::new(registry).parse(query)?)
}

fn compile_query(registry: &Registry, query: &str) -> anyhow::Result<Compilation> {
    let tree = parse_query(registry, query)?;
    Ok(Compiler::new(registry).compile(tree)?)
}

pub fn handle_parse_command(args: ParseArgs, registry: &Registry) -> anyhow::Result<()> {
    let tree = parse_query(registry, &args.query)?;
    let tree = if args.normalized {
        tree.normalize()
    } else {
        tree
    };
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

pub fn handle_sql_command(args: QueryArgs, registry: &Registry) -> anyhow::Result<()> {
    let compilation = compile_query(registry, &args.query)?;
    let (clause, values) = build_where(compilation.predicate.as_ref());

    if clause.is_empty() {
        println!("(no constraint)");
    } else {
        println!("WHERE {}", clause);
    }
    for (idx, value) in values.iter().enumerate() {
        match value {
            SqlValue::String(text) => println!("  ?{} = {:?}", idx + 1, text),
            SqlValue::Integer(number) => println!("  ?{} = {}", idx + 1, number),
        }
    }
    println!("Keywords used: {}", describe_usage(&compilation.usage));
    Ok(())
}

pub fn handle_filter_command(args: FilterArgs, registry: &Registry) -> anyhow::Result<()> {
    let compilation = compile_query(registry, &args.query)?;

    let json = fs_read(&args.catalog)?;
    let mut catalog = Catalog::from_json_str(&json)
        .with_context(|| format!("Invalid catalog file {}", args.catalog.display()))?;
    catalog.derive_generalized_columns(registry);

    let matching = catalog.filter(compilation.predicate.as_ref());
    for row in &matching {
        println!("{}", serde_json::to_string(row)?);
    }
    tracing::info!("{} of {} cards match", matching.len(), catalog.rows().len());
    Ok(())
}

pub async fn handle_sqlite_command(args: SqliteArgs, registry: &Registry) -> anyhow::Result<()> {
    let compilation = compile_query(registry, &args.query)?;
    let (clause, values) = build_where(compilation.predicate.as_ref());

    let sql = select_sql(registry, &args.table, &args.select, &clause);
    tracing::debug!("Running {}", sql);

    let options = SqliteConnectOptions::new()
        .filename(&args.database)
        .read_only(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;

    let mut query = sqlx::query(&sql);
    for value in values {
        query = match value {
            SqlValue::String(text) => query.bind(text),
            SqlValue::Integer(number) => query.bind(number),
        };
    }
    let rows = query.fetch_all(&pool).await?;
    for row in &rows {
        let value: Option<String> = row.try_get(0)?;
        println!("{}", value.unwrap_or_default());
    }
    tracing::info!("{} rows match", rows.len());
    Ok(())
}

/// The registry qualifies columns with a table name (`card.level`). When it uses a
/// single table name, the queried table is aliased to it.
fn select_sql(registry: &Registry, table: &str, select: &str, clause: &str) -> String {
    let prefixes: BTreeSet<&str> = registry
        .columns()
        .keys()
        .filter_map(|column| column.split_once('.').map(|(prefix, _)| prefix))
        .collect();

    let mut sql = format!(
        "SELECT CAST({} AS TEXT) FROM {}",
        quote(select),
        quote(table)
    );
    if prefixes.len() == 1 {
        if let Some(prefix) = prefixes.first() {
            if *prefix != table {
                sql.push_str(&format!(" AS {}", quote(prefix)));
            }
        }
    }
    if !clause.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }
    sql
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn describe_usage(usage: &UsageStats) -> String {
    if usage.total() == 0 {
        return "none".to_string();
    }
    usage
        .iter()
        .map(|(keyword, count)| format!("{} x{}", keyword, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fs_read(path: &std::path::Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
