use super::*;
use crate::logic::{Connective, Member};

fn registry() -> Registry {
    Registry::default_cards().unwrap()
}

fn parse(query: &str) -> LogicTree<SearchToken> {
    QueryParser::new(&registry()).parse(query).unwrap()
}

fn parse_err(query: &str) -> SearchError {
    QueryParser::new(&registry()).parse(query).unwrap_err()
}

fn text(value: &str, negated: bool) -> SearchToken {
    SearchToken::FreeText(FreeText {
        value: value.to_string(),
        negated,
    })
}

fn expr(keyword: &str, operator: Operator, value: Option<&str>) -> SearchToken {
    SearchToken::Expression(Expression {
        keyword: keyword.to_string(),
        operator,
        value: value.map(str::to_string),
        negated: false,
    })
}

fn single(tree: &LogicTree<SearchToken>) -> &SearchToken {
    assert_eq!(tree.members.len(), 1, "expected one member in {:?}", tree);
    match &tree.members[0] {
        Member::Single(token) => token,
        other => panic!("expected a single member, got {:?}", other),
    }
}

#[test]
fn test_free_text_only() {
    let tree = parse(r#"dark  "magic girl" 'it\'s'"#);
    assert_eq!(tree.connective, Connective::And);
    assert_eq!(
        tree.members,
        vec![
            Member::Single(text("dark", false)),
            Member::Single(text("magic girl", false)),
            Member::Single(text("it's", false)),
        ]
    );
}

#[test]
fn test_simple_expression() {
    let tree = parse("color:red");
    assert_eq!(tree.connective, Connective::And);
    assert_eq!(single(&tree), &expr("color", Operator::Contains, Some("red")));
}

#[test]
fn test_comparison_operators() {
    assert_eq!(single(&parse("level>=3")), &expr("level", Operator::Ge, Some("3")));
    assert_eq!(single(&parse("level<3")), &expr("level", Operator::Lt, Some("3")));
    assert_eq!(single(&parse("power=9000")), &expr("power", Operator::Exact, Some("9000")));
    assert_eq!(
        single(&parse("trait:=avatar")),
        &expr("trait", Operator::ElementExact, Some("avatar"))
    );
}

#[test]
fn test_alias_transparency() {
    assert_eq!(parse("lv>=3"), parse("level>=3"));
    assert_eq!(parse("LV>=3"), parse("level>=3"));
    assert_eq!(parse("tt:avatar"), parse("trait:avatar"));
    assert_eq!(parse("x:sword"), parse("text:sword"));
}

#[test]
fn test_value_mapping_and_none() {
    assert_eq!(single(&parse("c:R")), &expr("color", Operator::Contains, Some("red")));
    assert_eq!(single(&parse("type:CH")), &expr("type", Operator::Contains, Some("character")));
    assert_eq!(single(&parse("tag:-")), &expr("tag", Operator::Contains, None));
    assert_eq!(single(&parse("level:None")), &expr("level", Operator::Contains, None));
    // No "search none" on name: the word is searched literally.
    assert_eq!(single(&parse("name:none")), &expr("name", Operator::Contains, Some("none")));
    // Unmapped values keep their casing.
    assert_eq!(single(&parse("name:Nanoha")), &expr("name", Operator::Contains, Some("Nanoha")));
}

#[test]
fn test_keyword_needs_adjacent_operator_and_value() {
    let tree = parse("level: 3");
    assert_eq!(
        tree.members,
        vec![Member::Single(text("level:", false)), Member::Single(text("3", false))]
    );
    assert_eq!(single(&parse("unknown:3")), &text("unknown:3", false));
}

#[test]
fn test_android_is_not_a_logical_operator() {
    let tree = parse("Android or Oracle");
    assert_eq!(tree.connective, Connective::Or);
    assert_eq!(
        tree.members,
        vec![
            Member::Single(text("Android", false)),
            Member::Single(text("Oracle", false)),
        ]
    );
}

#[test]
fn test_or_branches() {
    let tree = parse("(color:red trait:avatar) or color:blue");
    assert_eq!(tree.connective, Connective::Or);
    assert_eq!(tree.members.len(), 2);
    match &tree.members[0] {
        Member::Single(SearchToken::Group(group)) => {
            assert!(!group.negated);
            assert_eq!(group.tree.connective, Connective::And);
            assert_eq!(group.tree.members.len(), 2);
        }
        other => panic!("expected a group, got {:?}", other),
    }

    let tree = parse("a b OR c");
    assert_eq!(
        tree.members,
        vec![
            Member::Bundle(vec![text("a", false), text("b", false)]),
            Member::Single(text("c", false)),
        ]
    );
}

#[test]
fn test_dangling_logical_operators_are_tolerated() {
    let tree = parse("or red and or or blue or ");
    assert_eq!(tree.connective, Connective::Or);
    assert_eq!(
        tree.members,
        vec![
            Member::Single(text("red", false)),
            Member::Single(text("blue", false)),
        ]
    );
    assert_eq!(parse("red and blue"), parse("red blue"));
}

#[test]
fn test_negation() {
    assert_eq!(single(&parse("-red")), &text("red", true));
    assert_eq!(single(&parse("--red")), &text("red", false));
    assert_eq!(single(&parse("---red")), &text("red", true));
    assert!(single(&parse("-level>=3")).is_negated());
}

#[test]
fn test_negated_logical_operator_is_text() {
    let tree = parse("-and red");
    assert_eq!(
        tree.members,
        vec![Member::Single(text("and", true)), Member::Single(text("red", false))]
    );
    assert_eq!(parse("-OR red").members[0], Member::Single(text("OR", true)));
}

#[test]
fn test_negated_group_keeps_its_flag() {
    let tree = parse("-(red or blue)");
    match single(&tree) {
        SearchToken::Group(group) => {
            assert!(group.negated);
            assert_eq!(group.tree.connective, Connective::Or);
            assert!(!tree.is_normalized());
        }
        other => panic!("expected a group, got {:?}", other),
    }
}

#[test]
fn test_empty_group() {
    let tree = parse("()");
    match single(&tree) {
        SearchToken::Group(group) => assert!(group.tree.is_empty()),
        other => panic!("expected a group, got {:?}", other),
    }
}

#[test]
fn test_empty_query() {
    for query in ["", "   "] {
        let err = parse_err(query);
        assert_eq!(err.message(), "You didn't enter anything to search for.");
        assert_eq!(err.offset(), 0);
    }
}

#[test]
fn test_invalid_value_type() {
    let err = parse_err("level:abc");
    assert_eq!(err.message(), "Type text cannot be used with level.");
    assert_eq!(err.offset(), 6);
}

#[test]
fn test_invalid_operator_for_type() {
    let err = parse_err("color<3");
    assert_eq!(err.message(), "Operator < is invalid for keyword color.");
    assert_eq!(err.offset(), 5);

    let err = parse_err("name:=red");
    assert_eq!(err.message(), "Operator := is invalid for keyword name.");
    assert!(parse_err("trait>3").message().contains("invalid for keyword trait"));
}

#[test]
fn test_missing_value() {
    assert_eq!(
        parse_err(r#"name:"""#).message(),
        "You must provide a search value for the name expression."
    );
}

#[test]
fn test_number_out_of_range() {
    let err = parse_err("power>=99999999999999999999");
    assert!(err.message().contains("out of range"), "{}", err);
    // Digits on a string keyword are plain text.
    assert_eq!(
        single(&parse("cardno:99999999999999999999")),
        &expr("cardno", Operator::Contains, Some("99999999999999999999"))
    );
}

#[test]
fn test_unclosed_group() {
    assert_eq!(
        parse_err("(red blue").message(),
        "Your search contains unclosed parentheses."
    );
    assert_eq!(
        parse_err("((red) blue").message(),
        "Your search contains unclosed parentheses."
    );
}

#[test]
fn test_stray_close_group() {
    let err = parse_err("red )");
    assert_eq!(err.message(), "Unexpected token: )");
    assert_eq!(err.offset(), 4);
}

#[test]
fn test_dangling_negation() {
    assert!(parse_err("red -").message().contains("Unexpected end"));
    assert_eq!(parse_err("(red -)").message(), "Unexpected token: )");
}

#[test]
fn test_parser_is_reusable() {
    let registry = registry();
    let parser = QueryParser::new(&registry);
    assert!(parser.parse("(red").is_err());
    assert_eq!(parser.parse("red").unwrap(), parse("red"));
}
