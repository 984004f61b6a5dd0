//! Unit tests for query constraint parsing.

use rstest::rstest;
use serde_json::{Value, json};

use super::*;

fn structured(value: Value) -> QueryPayload {
    serde_json::from_value(value).expect("structured payload")
}

fn as_json(constraints: &[Constraint]) -> Value {
    serde_json::to_value(constraints).expect("serialize constraints")
}

#[rstest]
#[case::single_quoted("'North'", json!("North"))]
#[case::double_quoted("\"North\"", json!("North"))]
#[case::concatenated("'Nor' \"th\"", json!("North"))]
#[case::escapes(r"'a\tb\n\'c\x41\u00e9'", json!("a\tb\n'cAé"))]
#[case::unknown_escape(r"'C:\path'", json!("C:\\path"))]
#[case::octal_escape(r"'\101'", json!("A"))]
#[case::integer("50", json!(50))]
#[case::negative("-7", json!(-7))]
#[case::spaced_sign("- 7", json!(-7))]
#[case::underscores("1_000", json!(1000))]
#[case::hex("0x1F", json!(31))]
#[case::zeroes("000", json!(0))]
#[case::large_unsigned("18446744073709551615", json!(18_446_744_073_709_551_615_u64))]
#[case::float("2.5", json!(2.5))]
#[case::leading_dot(".5", json!(0.5))]
#[case::exponent("1e3", json!(1000.0))]
#[case::true_name("True", json!(true))]
#[case::false_name("False", json!(false))]
#[case::none_name("None", Value::Null)]
#[case::list("[1, 'a', [True]]", json!([1, "a", [true]]))]
#[case::trailing_comma("[1, 2,]", json!([1, 2]))]
#[case::tuple("(1, 2)", json!([1, 2]))]
#[case::one_tuple("(1,)", json!([1]))]
#[case::empty_tuple("()", json!([]))]
#[case::grouping("('x')", json!("x"))]
#[case::mapping("{'Price': '50', \"Area\": None}", json!({"Price": "50", "Area": null}))]
#[case::whitespace("  [ 1 ,\n 2 ]  ", json!([1, 2]))]
fn parses_python_literals(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(parse_literal(source).expect("valid literal"), expected);
}

#[rstest]
#[case::empty("", LiteralError::UnexpectedEnd)]
#[case::open_list("[1, 2", LiteralError::UnexpectedEnd)]
#[case::call("__import__('os')", LiteralError::UnknownName { name: "__import__".to_owned() })]
#[case::lowercase_bool("true", LiteralError::UnknownName { name: "true".to_owned() })]
#[case::unterminated("'abc", LiteralError::UnterminatedString { offset: 0 })]
#[case::newline_in_string("'a\nb'", LiteralError::UnterminatedString { offset: 0 })]
#[case::short_hex(r"'\x4'", LiteralError::InvalidEscape { offset: 1 })]
#[case::surrogate(r"'\ud800'", LiteralError::InvalidEscape { offset: 1 })]
#[case::leading_zero("007", LiteralError::InvalidNumber { literal: "007".to_owned() })]
#[case::double_underscore("1__0", LiteralError::InvalidNumber { literal: "1__0".to_owned() })]
#[case::double_sign("--5", LiteralError::InvalidNumber { literal: "-".to_owned() })]
#[case::suffix("5px", LiteralError::InvalidNumber { literal: "5px".to_owned() })]
#[case::overflow(
    "-9223372036854775809",
    LiteralError::NumberOutOfRange { literal: "-9223372036854775809".to_owned() }
)]
#[case::float_overflow("1e999", LiteralError::NumberOutOfRange { literal: "1e999".to_owned() })]
#[case::int_key("{1: 'a'}", LiteralError::NonStringKey { offset: 1 })]
#[case::missing_colon("{'a' 1}", LiteralError::UnexpectedCharacter { found: '1', offset: 5 })]
#[case::operator("1 + 2", LiteralError::TrailingCharacters { offset: 2 })]
#[case::leading_comma("[,]", LiteralError::UnexpectedCharacter { found: ',', offset: 1 })]
fn rejects_invalid_literals(#[case] source: &str, #[case] expected: LiteralError) {
    assert_eq!(parse_literal(source), Err(expected));
}

#[test]
fn rejects_deep_nesting() {
    let source = format!("{}{}", "[".repeat(MAX_DEPTH + 2), "]".repeat(MAX_DEPTH + 2));
    assert_eq!(
        parse_literal(&source),
        Err(LiteralError::NestingTooDeep { limit: MAX_DEPTH })
    );
}

#[test]
fn accepts_nesting_at_the_limit() {
    let source = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
    assert!(parse_literal(&source).is_ok());
}

#[test]
fn empty_structured_query_matches_everything() {
    let constraints = constraints_from_payload(&QueryPayload::Structured(Vec::new()))
        .expect("empty query");
    assert_eq!(constraints, vec![Constraint::default()]);
    assert!(constraints.iter().all(Constraint::is_empty));
}

#[test]
fn structured_expressions_are_evaluated() {
    let payload = structured(json!([{"Price": "50"}]));
    let constraints = constraints_from_payload(&payload).expect("valid query");
    assert_eq!(as_json(&constraints), json!([{"Price": 50}]));
}

#[test]
fn structured_entries_split_into_single_field_constraints_in_order() {
    let payload = structured(json!([
        {"Price": "50", "Area": "'North'"},
        {"Pets": "True"}
    ]));
    let constraints = constraints_from_payload(&payload).expect("valid query");
    assert_eq!(
        as_json(&constraints),
        json!([{"Price": 50}, {"Area": "North"}, {"Pets": true}])
    );
    let fields: Vec<_> = constraints
        .iter()
        .flat_map(|constraint| constraint.iter().map(|(field, _)| field.clone()))
        .collect();
    assert_eq!(fields, ["Price", "Area", "Pets"]);
}

#[test]
fn structured_typed_values_pass_through() {
    let payload = structured(json!([{"Price": 50, "Pets": [true]}]));
    let constraints = constraints_from_payload(&payload).expect("valid query");
    assert_eq!(as_json(&constraints), json!([{"Price": 50}, {"Pets": [true]}]));
}

#[test]
fn structured_errors_name_the_field() {
    let payload = structured(json!([{"Price": "fifty"}]));
    let error = constraints_from_payload(&payload).expect_err("bare name");
    assert_eq!(
        error,
        ConstraintError::expression("Price", LiteralError::UnknownName { name: "fifty".to_owned() })
    );
    assert!(error.to_string().contains("'Price'"));
}

#[rstest]
#[case::single("[{'Price': '50'}]", json!([{"Price": 50}]))]
#[case::multiple(
    "[{'Price': '50'}, {'Area': \"'North'\"}]",
    json!([{"Price": 50}, {"Area": "North"}])
)]
#[case::empty_list("[]", json!([{}]))]
#[case::empty_entries("[{}, {}]", json!([{}]))]
fn bracketed_text_is_evaluated_per_field(#[case] text: &str, #[case] expected: Value) {
    let payload = QueryPayload::Text(text.to_owned());
    let constraints = constraints_from_payload(&payload).expect("valid query");
    assert_eq!(as_json(&constraints), expected);
}

#[rstest]
#[case::entry_not_mapping("[{'a': '1'}, 2]", ConstraintError::EntryNotMapping { index: 1 })]
#[case::invalid_text(
    "[{'a': '1'}",
    ConstraintError::query(LiteralError::UnexpectedEnd)
)]
#[case::bad_expression(
    "[{'a': 'b'}]",
    ConstraintError::expression("a", LiteralError::UnknownName { name: "b".to_owned() })
)]
fn bracketed_text_errors(#[case] text: &str, #[case] expected: ConstraintError) {
    let payload = QueryPayload::Text(text.to_owned());
    assert_eq!(constraints_from_payload(&payload), Err(expected));
}

#[cfg(feature = "legacy-query-text")]
mod legacy {
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::super::*;
    use super::as_json;

    #[rstest]
    #[case::list_of_mappings(
        " [{'Price': 50, 'Area': 'North'}]",
        json!([{"Price": 50, "Area": "North"}])
    )]
    #[case::single_mapping("{'Price': '50'}", json!([{"Price": "50"}]))]
    #[case::tuple_of_mappings("({'a': 1}, {'b': 2})", json!([{"a": 1}, {"b": 2}]))]
    #[case::empty_tuple("()", json!([{}]))]
    fn legacy_text_keeps_mappings_whole(#[case] text: &str, #[case] expected: Value) {
        let payload = QueryPayload::Text(text.to_owned());
        let constraints = constraints_from_payload(&payload).expect("valid legacy query");
        assert_eq!(as_json(&constraints), expected);
    }

    #[rstest]
    #[case::scalar("42", ConstraintError::NotAList)]
    #[case::not_mapping("('a',)", ConstraintError::EntryNotMapping { index: 0 })]
    #[case::code("open('x')", ConstraintError::query(LiteralError::UnknownName { name: "open".to_owned() }))]
    fn legacy_text_errors(#[case] text: &str, #[case] expected: ConstraintError) {
        let payload = QueryPayload::Text(text.to_owned());
        assert_eq!(constraints_from_payload(&payload), Err(expected));
    }
}

#[cfg(not(feature = "legacy-query-text"))]
#[test]
fn legacy_text_is_rejected_when_disabled() {
    let payload = QueryPayload::Text("{'Price': 50}".to_owned());
    assert_eq!(
        constraints_from_payload(&payload),
        Err(ConstraintError::LegacySyntaxDisabled)
    );
}
