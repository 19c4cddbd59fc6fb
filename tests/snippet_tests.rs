use didact::{
    constants::{BASE_CASE_SNIPPET, RECURSIVE_CASE_SNIPPET, TRUST_RECURSION_SNIPPET},
    grade,
    snippets::{SNIPPET_NAMES, snippet, suggest},
};

#[test]
fn every_named_snippet_resolves() {
    for name in SNIPPET_NAMES {
        let text = snippet(name).expect("snippet");
        assert!(!text.trim().is_empty());
    }
    assert!(snippet("tail_calls").is_none());
}

#[test]
fn runaway_recursion_suggests_the_base_case_lesson() {
    let report = grade("fn factorial(n) { factorial(n) }").expect("grade");
    assert_eq!(suggest(&report), BASE_CASE_SNIPPET);
}

#[test]
fn wrong_values_suggest_the_recursive_case_lesson() {
    let report = grade("fn factorial(n) { n }").expect("grade");
    assert_eq!(suggest(&report), RECURSIVE_CASE_SNIPPET);
}

#[test]
fn a_clean_pass_suggests_trusting_the_recursion() {
    let report = grade("fn factorial(n) { if n <= 1 { 1 } else { n * factorial(n - 1) } }")
        .expect("grade");
    assert_eq!(suggest(&report), TRUST_RECURSION_SNIPPET);
}
