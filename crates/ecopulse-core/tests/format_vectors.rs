//! `format_number` vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::Deserialize;

use ecopulse_core::format_number;

#[derive(Debug, Deserialize)]
struct FormatVector {
    description: String,
    input: f64,
    expect: String,
}

fn load(name: &str) -> Vec<FormatVector> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn format_number_vectors() {
    let vectors = load("format_number.json");
    assert!(!vectors.is_empty());
    for v in vectors {
        assert_eq!(format_number(v.input), v.expect, "vector={}", v.description);
    }
}
