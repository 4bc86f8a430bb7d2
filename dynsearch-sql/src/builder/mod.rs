//! Filter, sort and query compilation with parameterization.

mod filter;
mod operation;
mod param;
mod parse;
mod query;
mod sort;
mod types;
mod value;

// Re-export all public items
pub use filter::{DEFAULT_MAX_DEPTH, FilterCompiler};
pub use operation::{BuildOptions, Template, escape_like_pattern};
pub use param::{Param, ParamAllocator};
pub use parse::{FilterDecoder, WireFormat};
pub use query::{DEFAULT_PAGE_SIZE, QueryAssembler, QueryCriteria};
pub use sort::SortCompiler;
pub use types::{
    Arity, Bindings, Compiled, FilterNode, Group, LogicalOp, Operation, Predicate, QueryResult,
    QueryType, RawValue, SortDir, SortField, Value, and, leaf, or,
};
pub use value::{
    DefaultParsers, ValueParser, parse_boolean, parse_datetime, parse_guid, parse_numeric,
    split_bracket_list,
};
