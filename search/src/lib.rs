pub mod compiler;
pub mod cursor;
pub mod errors;
pub mod lexer;
pub mod logic;
pub mod memory;
pub mod normalize;
pub mod parser;
pub mod predicate;
pub mod registry;
pub mod sql;
pub mod types;

pub use compiler::{Compilation, Compiler, UsageStats};
pub use errors::{RegistryError, SearchError};
pub use logic::{Connective, LogicAccumulator, LogicTree, Member, Negate};
pub use memory::{Catalog, Cell, Row};
pub use parser::QueryParser;
pub use predicate::{Comparison, LikePattern, Literal, PatternPart, Predicate};
pub use registry::{Keyword, Registry, RegistryConfig, ValueType, DEFAULT_REGISTRY_YAML};
pub use sql::{build_sql, build_where, SqlValue};
pub use types::{Expression, FreeText, Group, Operator, SearchToken};
