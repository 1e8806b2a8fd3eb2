use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chatfmt_core::{FormatOptions, format_text};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    input: String,
    #[serde(default = "default_true")]
    markdown: bool,
    #[serde(default)]
    singleline: bool,
    #[serde(default = "default_true")]
    mention_highlight: bool,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    users: Vec<String>,
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    expected: Option<String>,
    #[serde(default)]
    contains: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[test]
fn table_cases() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases.json");
    let json = fs::read_to_string(&path).expect("Failed to read cases.json");
    let cases: Vec<Case> = serde_json::from_str(&json).expect("Failed to parse cases.json");

    let mut failures = Vec::new();
    for case in &cases {
        let users: HashSet<String> = case.users.iter().cloned().collect();
        let options = FormatOptions {
            search_term: case.search.clone(),
            mention_highlight: case.mention_highlight,
            singleline: case.singleline,
            markdown: case.markdown,
        };
        let actual = format_text(&case.input, &options, &users, &case.keys);

        if let Some(expected) = &case.expected {
            if &actual != expected {
                failures.push(format!(
                    "{}\n  expected: {}\n  actual:   {}",
                    case.name, expected, actual
                ));
                continue;
            }
        }
        for needle in &case.contains {
            if !actual.contains(needle.as_str()) {
                failures.push(format!("{}\n  missing {} in: {}", case.name, needle, actual));
            }
        }
        for needle in &case.excludes {
            if actual.contains(needle.as_str()) {
                failures.push(format!("{}\n  unexpected {} in: {}", case.name, needle, actual));
            }
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} cases failed:\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n")
    );
}
