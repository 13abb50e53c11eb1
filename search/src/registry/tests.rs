use super::*;

const MINIMAL: &str = r#"
columns:
  card.name: text
  card.level: integer
  card.tags: json
keywords:
  name:
    type: string
    aliases: [n]
    dbColumn: card.name
  level:
    type: number
    aliases: [lv]
    allowSearchNone: true
    dbColumn: card.level
  tag:
    type: array
    dbColumn: card.tags
"#;

fn config(yaml: &str) -> RegistryConfig {
    RegistryConfig::from_yaml_str(yaml).unwrap()
}

#[test]
fn test_default_registry_loads() {
    let registry = Registry::default_cards().unwrap();
    assert_eq!(registry.free_text_keyword().name, "name");
    assert_eq!(registry.resolve("LV").unwrap().name, "level");
    assert_eq!(registry.resolve("c").unwrap().name, "color");

    let text = registry.keyword("text").unwrap();
    assert_eq!(text.columns, vec!["card.name", "card.flavor"]);

    let ability = registry.keyword("ability").unwrap();
    let placeholder = ability.placeholder.as_ref().unwrap();
    assert_eq!(
        placeholder.generalized_column("card.abilities"),
        Some("card.abilities_ph")
    );
}

#[test]
fn test_resolve_is_case_insensitive() {
    let registry = Registry::new(config(MINIMAL)).unwrap();
    assert_eq!(registry.resolve("N").unwrap().name, "name");
    assert_eq!(registry.resolve("Level").unwrap().name, "level");
    assert!(registry.resolve("color").is_none());
    assert_eq!(registry.aliases().get("lv"), Some(&"level".to_string()));
}

#[test]
fn test_json_config() {
    let json = r#"{
        "columns": {"t.name": "text"},
        "freeTextKeyword": "title",
        "keywords": {
            "title": {"valueType": "string", "dbColumn": "t.name", "forceExactMatches": true}
        }
    }"#;
    let registry = Registry::new(RegistryConfig::from_json_str(json).unwrap()).unwrap();
    let title = registry.free_text_keyword();
    assert_eq!(title.name, "title");
    assert!(title.force_exact_matches);
}

#[test]
fn test_from_path_picks_format_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let yaml_path = dir.path().join("registry.yaml");
    std::fs::write(&yaml_path, MINIMAL).unwrap();
    assert!(Registry::from_path(&yaml_path).is_ok());

    let json_path = dir.path().join("registry.json");
    std::fs::write(&json_path, MINIMAL).unwrap();
    assert!(matches!(
        Registry::from_path(&json_path),
        Err(RegistryError::Config(_))
    ));

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        Registry::from_path(&missing),
        Err(RegistryError::Config(_))
    ));
}

#[test]
fn test_unknown_column() {
    let mut cfg = config(MINIMAL);
    cfg.keywords.get_mut("name").unwrap().db_column = ColumnRef::One("card.title".into());
    assert_eq!(
        Registry::new(cfg).unwrap_err(),
        RegistryError::UnknownColumn {
            keyword: "name".into(),
            column: "card.title".into()
        }
    );
}

#[test]
fn test_column_kind_must_match_type() {
    let mut cfg = config(MINIMAL);
    cfg.keywords.get_mut("level").unwrap().db_column = ColumnRef::One("card.name".into());
    assert!(matches!(
        Registry::new(cfg),
        Err(RegistryError::ColumnKindMismatch { .. })
    ));
}

#[test]
fn test_duplicate_alias() {
    let mut cfg = config(MINIMAL);
    cfg.keywords.get_mut("tag").unwrap().aliases = vec!["N".into()];
    assert!(matches!(
        Registry::new(cfg),
        Err(RegistryError::DuplicateAlias { ref alias, .. }) if alias == "n"
    ));
}

#[test]
fn test_invalid_alias_name() {
    let mut cfg = config(MINIMAL);
    cfg.keywords.get_mut("tag").unwrap().aliases = vec!["2tag".into()];
    assert_eq!(
        Registry::new(cfg).unwrap_err(),
        RegistryError::InvalidKeywordName("2tag".into())
    );
}

#[test]
fn test_free_text_keyword_must_exist() {
    let mut cfg = config(MINIMAL);
    cfg.free_text_keyword = "title".into();
    assert_eq!(
        Registry::new(cfg).unwrap_err(),
        RegistryError::UnknownKeyword("title".into())
    );

    let mut cfg = config(MINIMAL);
    cfg.free_text_keyword = "level".into();
    assert!(matches!(Registry::new(cfg), Err(RegistryError::Config(_))));
}

#[test]
fn test_number_value_mapping_must_be_numeric() {
    let mut cfg = config(MINIMAL);
    cfg.keywords
        .get_mut("level")
        .unwrap()
        .value_mapping
        .insert("max".into(), "high".into());
    assert!(matches!(
        Registry::new(cfg),
        Err(RegistryError::InvalidValueMapping { .. })
    ));
}

#[test]
fn test_placeholder_mapping_is_validated() {
    let placeholder = |literal: &str, generalized: &str, pattern: &str| PlaceholderConfig {
        column_map: [(literal.to_string(), generalized.to_string())].into(),
        placeholder_token: "《TRAIT》".into(),
        pattern: pattern.into(),
    };
    let with_placeholder = |ph: PlaceholderConfig| {
        let mut cfg = config(MINIMAL);
        cfg.columns.insert("card.tags_ph".into(), ColumnKind::Json);
        cfg.keywords.get_mut("tag").unwrap().placeholder_search = Some(ph);
        Registry::new(cfg)
    };

    assert!(with_placeholder(placeholder("card.tags", "card.tags_ph", "《.*?》")).is_ok());
    // Literal column not owned by the keyword.
    assert!(matches!(
        with_placeholder(placeholder("card.name", "card.tags_ph", "《.*?》")),
        Err(RegistryError::InvalidPlaceholder { .. })
    ));
    // Unknown generalized column.
    assert!(matches!(
        with_placeholder(placeholder("card.tags", "card.nope", "《.*?》")),
        Err(RegistryError::UnknownColumn { .. })
    ));
    // Pattern that can never produce its own token.
    assert!(matches!(
        with_placeholder(placeholder("card.tags", "card.tags_ph", r"\[.*?\]")),
        Err(RegistryError::InvalidPlaceholder { .. })
    ));
    assert!(matches!(
        with_placeholder(placeholder("card.tags", "card.tags_ph", "(")),
        Err(RegistryError::InvalidPlaceholder { .. })
    ));
}

#[test]
fn test_placeholderize() {
    let registry = Registry::default_cards().unwrap();
    let placeholder = registry
        .keyword("ability")
        .unwrap()
        .placeholder
        .as_ref()
        .unwrap();
    assert_eq!(
        placeholder.placeholderize("Choose a 《Magic》 or 《Weapon》 character"),
        "Choose a 《TRAIT》 or 《TRAIT》 character"
    );
    assert_eq!(placeholder.placeholderize("no traits here"), "no traits here");
}

#[test]
fn test_value_type_operators() {
    assert!(ValueType::Number.allows(Operator::Ge));
    assert!(!ValueType::Number.allows(Operator::ElementExact));
    assert!(ValueType::Array.allows(Operator::ElementExact));
    assert!(!ValueType::Array.allows(Operator::Lt));
    assert!(ValueType::String.allows(Operator::Exact));
    assert!(!ValueType::String.allows(Operator::ElementExact));
}
