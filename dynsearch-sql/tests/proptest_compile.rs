//! Property-based tests for identifier validation and filter compilation.
//!
//! These tests generate random identifiers and filter trees to check the
//! quoting round-trip, the forbidden-character rule and placeholder numbering.

use dynsearch_sql::{
    FilterCompiler, FilterNode, Operation, ParamAllocator, QueryType, and, is_valid_identifier,
    leaf, or, quote_identifier,
};
use proptest::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

/// Placeholder indexes in order of appearance.
fn placeholders(sql: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut chars = sql.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '@' {
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while let Some(&(j, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = j + 1;
            chars.next();
        }
        if end > start {
            out.push(sql[start..end].parse().unwrap());
        }
    }
    out
}

/// The SQL with every `@N` reduced to `@`.
fn strip_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_param = false;
    for c in sql.chars() {
        if c == '@' {
            in_param = true;
            out.push(c);
        } else if in_param && c.is_ascii_digit() {
            continue;
        } else {
            in_param = false;
            out.push(c);
        }
    }
    out
}

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_]{1,20}(\\.[A-Za-z0-9_]{1,20}){0,3}"
}

fn leaf_node() -> impl Strategy<Value = FilterNode> {
    let key = "[a-z][a-z0-9_]{0,12}";
    prop_oneof![
        (key, "[a-zA-Z0-9 ]{0,12}")
            .prop_map(|(k, v)| leaf(k, QueryType::Text, Operation::Eq, v)),
        (key, -1000i32..1000).prop_map(|(k, n)| leaf(
            k,
            QueryType::Numeric,
            Operation::Gt,
            n.to_string()
        )),
        (key, "[a-z]{0,8}").prop_map(|(k, v)| leaf(k, QueryType::Text, Operation::Contains, v)),
        (key, prop::collection::vec(0u16..500, 1..6)).prop_map(|(k, ns)| {
            let list = ns.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            leaf(k, QueryType::Numeric, Operation::In, format!("[{list}]"))
        }),
        (key, 0u16..100, 100u16..200).prop_map(|(k, lo, hi)| leaf(
            k,
            QueryType::Numeric,
            Operation::Between,
            format!("[{lo},{hi}]")
        )),
    ]
}

fn filter_tree() -> impl Strategy<Value = FilterNode> {
    leaf_node().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(and),
            prop::collection::vec(inner, 1..4).prop_map(or),
        ]
    })
}

// =============================================================================
// Identifier Property Tests
// =============================================================================

proptest! {
    /// Whitelisted identifiers validate and survive a quote/unquote round-trip
    #[test]
    fn valid_identifiers_round_trip(ident in identifier()) {
        prop_assume!(ident.len() <= 128);
        prop_assert!(is_valid_identifier(&ident));

        let quoted = quote_identifier(&ident).unwrap();
        prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        let unquoted = quoted[1..quoted.len() - 1].replace("\"\"", "\"");
        prop_assert_eq!(unquoted, ident);
    }

    /// Any forbidden character anywhere makes an identifier invalid
    #[test]
    fn forbidden_characters_rejected(
        prefix in "[a-z]{0,8}",
        bad in prop::sample::select(vec![
            ";", "--", "/*", "'", "\"", "(", ")", "=", "<", ">",
            "{", "}", "[", "]", "|", "\\", " ", "\t", "\n",
        ]),
        suffix in "[a-z]{0,8}",
    ) {
        let ident = format!("{prefix}{bad}{suffix}");
        prop_assert!(!is_valid_identifier(&ident));
        prop_assert!(quote_identifier(&ident).is_err());
    }

    /// Overlong identifiers are rejected
    #[test]
    fn overlong_identifiers_rejected(len in 129usize..300) {
        prop_assert!(!is_valid_identifier(&"a".repeat(len)));
    }
}

// =============================================================================
// Compilation Property Tests
// =============================================================================

proptest! {
    /// Placeholders appear as 0, 1, 2, ... and match the binding keys in order
    #[test]
    fn placeholders_are_sequential(tree in filter_tree()) {
        let compiled = FilterCompiler::new().compile_root(&tree).unwrap();
        let seen = placeholders(&compiled.sql);
        let expected: Vec<usize> = (0..compiled.bindings.len()).collect();
        prop_assert_eq!(&seen, &expected);

        let keys: Vec<String> = compiled.bindings.keys().map(str::to_string).collect();
        let expected_keys: Vec<String> = expected.iter().map(ToString::to_string).collect();
        prop_assert_eq!(keys, expected_keys);
    }

    /// Independent allocators give the same SQL up to numbering and the same
    /// values in the same order
    #[test]
    fn compile_is_deterministic(tree in filter_tree(), offset in 0usize..1000) {
        let compiler = FilterCompiler::new();
        let a = compiler.compile(&tree, &mut ParamAllocator::new()).unwrap();
        let b = compiler
            .compile(&tree, &mut ParamAllocator::starting_at(offset))
            .unwrap();

        prop_assert_eq!(strip_placeholders(&a.sql), strip_placeholders(&b.sql));
        let shifted: Vec<usize> = placeholders(&a.sql).into_iter().map(|i| i + offset).collect();
        prop_assert_eq!(placeholders(&b.sql), shifted);
        prop_assert!(a.bindings.values().eq(b.bindings.values()));
    }

    /// Group output is always wrapped in "( ... )"
    #[test]
    fn groups_are_parenthesised(tree in filter_tree()) {
        let compiled = FilterCompiler::new().compile_root(&tree).unwrap();
        if matches!(tree, FilterNode::Group(_)) {
            prop_assert!(compiled.sql.starts_with("( "));
            prop_assert!(compiled.sql.ends_with(" )"));
        }
    }
}
