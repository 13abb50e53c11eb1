use card_search::{Keyword, Registry};
use tabular::{Row, Table};

pub fn handle_keywords_command(registry: &Registry) -> anyhow::Result<()> {
    print!("{}", keywords_table(registry));
    println!(
        "\nFree text searches keyword: {}",
        registry.free_text_keyword().name
    );
    Ok(())
}

fn keywords_table(registry: &Registry) -> Table {
    #[allow(clippy::literal_string_with_formatting_args)]
    let mut table = Table::new("{:<}  {:<}  {:<}  {:<}  {:<}").with_row(Row::from_cells(
        ["Keyword", "Type", "Aliases", "Columns", "Options"]
            .iter()
            .cloned(),
    ));

    for keyword in registry.keywords() {
        table.add_row(
            Row::new()
                .with_cell(&keyword.name)
                .with_cell(keyword.value_type)
                .with_cell(keyword.aliases.join(", "))
                .with_cell(keyword.columns.join(", "))
                .with_cell(options(keyword)),
        );
    }
    table
}

fn options(keyword: &Keyword) -> String {
    let mut options = Vec::new();
    if keyword.allow_search_none {
        options.push("search none".to_string());
    }
    if keyword.force_exact_matches {
        options.push("exact".to_string());
    }
    if !keyword.value_mapping.is_empty() {
        let mut shorthands: Vec<&str> = keyword.value_mapping.keys().map(String::as_str).collect();
        shorthands.sort_unstable();
        options.push(format!("shorthands: {}", shorthands.join("/")));
    }
    if let Some(placeholder) = &keyword.placeholder {
        options.push(format!("placeholder {}", placeholder.token()));
    }
    options.join("; ")
}
