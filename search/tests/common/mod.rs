//! Shared catalog and helpers for the card-search integration tests

#![allow(dead_code)]

use card_search::{Catalog, Compiler, Predicate, QueryParser, Registry, Row};

/// Small card catalog. Cells are keyed by bare column names; `null` and
/// missing cells both count as absent.
pub const SAMPLE_CATALOG: &str = r#"[
  {
    "id": "NS-001", "cardno": "NS/W01-001", "name": "Takamachi Nanoha",
    "type": "Character", "color": "Red", "rarity": "RR", "side": "W",
    "level": 3, "cost": 2, "power": 9000, "soul": 2,
    "trigger": ["soul"], "traits": ["Magic", "Avatar"],
    "abilities": ["When this card attacks, choose a 《Magic》 character and give it +1000 power."],
    "flavor": "Let's be friends.", "tags": ["avatar"], "icons": null
  },
  {
    "id": "NS-002", "cardno": "NS/W01-002", "name": "Fate Testarossa",
    "type": "Character", "color": "Yellow", "rarity": "R", "side": "W",
    "level": 1, "cost": 0, "power": 5000, "soul": 1,
    "trigger": [], "traits": ["Magic", "Net"],
    "abilities": ["Draw a card."],
    "flavor": "Bardiche, set up.", "tags": null
  },
  {
    "id": "NS-003", "cardno": "NS/W01-003", "name": "Starlight Breaker",
    "type": "Climax", "color": "Blue", "rarity": "CR", "side": "W",
    "level": null, "cost": null, "power": null, "soul": null,
    "trigger": ["soul", "soul"], "traits": [],
    "abilities": ["All of your characters get +1 soul."]
  },
  {
    "id": "NS-004", "cardno": "NS/W01-004", "name": "Signum",
    "type": "Character", "color": "Red", "rarity": "U", "side": "S",
    "level": 2, "cost": 1, "power": 7500, "soul": 1,
    "trigger": [], "traits": ["Weapon", "Knight"],
    "abilities": ["Choose a 《Weapon》 character and give it +500 power."],
    "flavor": "Sword of the Wolkenritter.", "tags": ["knight"]
  },
  {
    "id": "NS-005", "cardno": "NS/W01-005", "name": "Vita",
    "type": "Character", "color": "Blue", "rarity": "C", "side": "S",
    "level": 0, "cost": 0, "power": 3000, "soul": 1,
    "trigger": [], "traits": ["Avatar", "Weapon"],
    "abilities": [],
    "flavor": "Graf Eisen!", "tags": ["knight", "100% effort"]
  }
]"#;

pub fn registry() -> Registry {
    Registry::default_cards().unwrap()
}

/// The sample catalog with its generalized ability column filled in.
pub fn catalog(registry: &Registry) -> Catalog {
    let mut catalog = Catalog::from_json_str(SAMPLE_CATALOG).unwrap();
    catalog.derive_generalized_columns(registry);
    catalog
}

pub fn compile(registry: &Registry, query: &str) -> Option<Predicate> {
    let tree = QueryParser::new(registry).parse(query).unwrap();
    Compiler::new(registry).compile(tree).unwrap().predicate
}

pub fn names(rows: Vec<&Row>) -> Vec<String> {
    rows.iter()
        .map(|row| match row.get("name") {
            Some(card_search::Cell::Text(name)) => name.clone(),
            other => panic!("row without a name: {:?}", other),
        })
        .collect()
}

/// Names of the sample cards matching `query`, in catalog order.
pub fn search(query: &str) -> Vec<String> {
    let registry = registry();
    let catalog = catalog(&registry);
    names(catalog.filter(compile(&registry, query).as_ref()))
}
