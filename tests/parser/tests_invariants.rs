//! Invariants every dialect parser upholds.

use rstest::rstest;
use sourcedb::base::{DatabaseId, Dialect};
use sourcedb::fragment::FileFragment;
use sourcedb::parser::{ParseContext, ParserSet};

const SCRIPT: &str = "\
module('a.B').requires().toRun(function() {
Object.subclass('a.B.Thing', {
    m: function() { return 1; },
});
function helper() { }
});";

const GRAMMAR: &str = "ometa G {\n  a = x,\n  b = y\n}\n";

const CHANGES: &str = "<cs><doit name=\"a\">1</doit><doit name=\"b\">2</doit></cs>";

fn sample(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Script => SCRIPT,
        Dialect::Grammar => GRAMMAR,
        Dialect::ChangeList => CHANGES,
        Dialect::LegacyScript => "",
    }
}

fn parse(dialect: Dialect, source: &str, database: DatabaseId) -> Vec<FileFragment> {
    let parsers = ParserSet::with_defaults();
    let parser = parsers.get(dialect).unwrap_or_else(|| panic!("no parser for {dialect}"));
    let ctx = ParseContext {
        file_name: "sample",
        database,
    };
    parser.parse_source(source, &ctx)
}

fn assert_tree_invariants(fragment: &FileFragment, database: DatabaseId) {
    assert_eq!(fragment.source_control(), database);
    assert_eq!(fragment.file_name(), "sample");
    let mut last_end = fragment.range().start();
    for child in fragment.children() {
        assert!(
            fragment.range().contains_range(child.range()),
            "{:?} escapes {:?}",
            child.range(),
            fragment.range()
        );
        assert!(child.range().start() >= last_end, "siblings out of order");
        last_end = child.range().end();
        assert_tree_invariants(child, database);
    }
}

#[rstest]
#[case(Dialect::Script)]
#[case(Dialect::Grammar)]
#[case(Dialect::ChangeList)]
fn test_trees_are_ordered_contained_and_stamped(#[case] dialect: Dialect) {
    let database = DatabaseId::fresh();
    let fragments = parse(dialect, sample(dialect), database);
    assert!(!fragments.is_empty());
    for fragment in &fragments {
        assert_tree_invariants(fragment, database);
    }
}

#[rstest]
#[case(Dialect::Script)]
#[case(Dialect::Grammar)]
#[case(Dialect::ChangeList)]
fn test_flattened_visits_every_fragment_in_pre_order(#[case] dialect: Dialect) {
    let database = DatabaseId::fresh();
    let fragments = parse(dialect, sample(dialect), database);
    for root in &fragments {
        let visited: Vec<_> = root.flattened().collect();
        assert_eq!(visited[0], root);
        let expected = 1 + count_descendants(root);
        assert_eq!(visited.len(), expected);
    }
}

fn count_descendants(fragment: &FileFragment) -> usize {
    fragment
        .children()
        .iter()
        .map(|c| 1 + count_descendants(c))
        .sum()
}
