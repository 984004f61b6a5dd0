//! Unit tests for prefix decoding.

use std::collections::BTreeMap;
use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::command::{OutboundMessage, QueryPayload};
use crate::constraints::{ConstraintError, LiteralError};
use crate::registry::{BUNDLED_CONSTANTS, FRONT_TO_BACK};

#[fixture]
fn decoder() -> Decoder {
    let registry = ConstantsRegistry::bundled().expect("bundled registry");
    Decoder::new(Arc::new(registry)).expect("decoder")
}

#[fixture]
fn wizard() -> Participant {
    Participant::new("Wizard")
}

fn decode_text(decoder: &Decoder, text: &str, sender: &Participant) -> Command {
    decoder
        .decode(Some(&InboundMessage::with_text(text)), Some(sender))
        .expect("decodes")
        .expect("message present")
}

fn decoder_with_prefixes(overrides: &[(&str, &str)]) -> Decoder {
    let mut tables: BTreeMap<String, BTreeMap<String, String>> =
        serde_json::from_str(BUNDLED_CONSTANTS).expect("bundled constants parse");
    let prefixes = tables.get_mut(FRONT_TO_BACK).expect("prefix category");
    for (key, token) in overrides {
        prefixes.insert((*key).to_owned(), (*token).to_owned());
    }
    let registry = ConstantsRegistry::from_tables(tables).expect("valid registry");
    Decoder::new(Arc::new(registry)).expect("decoder")
}

#[rstest]
fn bundled_table_has_seven_distinct_prefixes(decoder: Decoder) {
    let prefixes: Vec<_> = decoder
        .prefixes()
        .entries()
        .iter()
        .map(|entry| (entry.prefix(), entry.kind()))
        .collect();
    assert_eq!(
        prefixes,
        [
            ("?", CommandKind::Query),
            ("[COMPLETE]", CommandKind::DialogueCompleted),
            ("[DONE]", CommandKind::TaskDone),
            ("[SELECT]", CommandKind::SelectPrimary),
            ("[SELECT_REFERENCE]", CommandKind::SelectSecondary),
            ("[REQUEST_SUGGESTIONS]", CommandKind::RequestSuggestions),
            ("[PICK_SUGGESTION]", CommandKind::PickSuggestion),
        ]
    );
}

#[rstest]
fn absent_message_decodes_to_nothing(decoder: Decoder, wizard: Participant) {
    assert_eq!(decoder.decode(None, Some(&wizard)).expect("no error"), None);
    assert_eq!(decoder.decode(None, None).expect("no error"), None);
}

#[rstest]
fn done_prefix_decodes_to_task_done(decoder: Decoder, wizard: Participant) {
    let command = decode_text(&decoder, "[DONE] finished early", &wizard);
    assert_eq!(command, Command::TaskDone(crate::TaskDone::new(wizard.clone())));
    assert_eq!(
        serde_json::to_value(command.message()).expect("serialize"),
        json!({"id": "Wizard", "text": ""})
    );
}

#[rstest]
#[case::complete("[COMPLETE]", CommandKind::DialogueCompleted)]
#[case::done("[DONE]", CommandKind::TaskDone)]
#[case::select("[SELECT]", CommandKind::SelectPrimary)]
#[case::select_reference("[SELECT_REFERENCE]", CommandKind::SelectSecondary)]
#[case::request_suggestions("[REQUEST_SUGGESTIONS]", CommandKind::RequestSuggestions)]
#[case::pick_suggestion("[PICK_SUGGESTION]", CommandKind::PickSuggestion)]
#[case::query("?", CommandKind::Query)]
fn every_prefix_selects_its_command(
    decoder: Decoder,
    wizard: Participant,
    #[case] prefix: &str,
    #[case] expected: CommandKind,
) {
    let command = decode_text(&decoder, &format!("{prefix}payload"), &wizard);
    assert_eq!(command.kind(), expected);
    assert_eq!(command.sender(), Some(&wizard));
}

#[rstest]
fn select_reference_is_not_shadowed_by_select(decoder: Decoder, wizard: Participant) {
    // `[SELECT]` is not a prefix of `[SELECT_REFERENCE]`.
    let command = decode_text(&decoder, "[SELECT_REFERENCE]", &wizard);
    assert_eq!(command.kind(), CommandKind::SelectSecondary);
}

#[rstest]
fn query_prefix_extracts_remaining_text(decoder: Decoder, wizard: Participant) {
    let command = decode_text(&decoder, "?[{'Price': '50'}]", &wizard);
    let Command::Query(query) = command else {
        panic!("expected a query, got {command:?}");
    };
    assert_eq!(
        query.payload(),
        &QueryPayload::Text("[{'Price': '50'}]".to_owned())
    );
}

#[rstest]
fn bare_query_decodes_but_has_no_constraints(decoder: Decoder, wizard: Participant) {
    // An empty query text is not a literal, so it does not mean "match all".
    let command = decode_text(&decoder, "?", &wizard);
    let Command::Query(query) = command else {
        panic!("expected a query, got {command:?}");
    };
    assert_eq!(query.payload(), &QueryPayload::Text(String::new()));
    let error = query.constraints().expect_err("empty query text");
    #[cfg(feature = "legacy-query-text")]
    assert!(
        matches!(
            error,
            ConstraintError::Query {
                source: LiteralError::UnexpectedEnd
            }
        ),
        "unexpected error: {error}"
    );
    #[cfg(not(feature = "legacy-query-text"))]
    assert!(matches!(error, ConstraintError::LegacySyntaxDisabled));
}

#[rstest]
fn structured_query_field_takes_precedence(decoder: Decoder, wizard: Participant) {
    let entry = json!({"Price": "50"})
        .as_object()
        .cloned()
        .expect("object literal");
    let message = InboundMessage::with_text("?").with_query(vec![entry.clone()]);
    let command = decoder
        .decode(Some(&message), Some(&wizard))
        .expect("decodes")
        .expect("message present");
    let Command::Query(query) = command else {
        panic!("expected a query, got {command:?}");
    };
    assert_eq!(query.payload(), &QueryPayload::Structured(vec![entry]));
}

#[rstest]
fn pick_suggestion_carries_extracted_text(decoder: Decoder, wizard: Participant) {
    let command = decode_text(&decoder, "[PICK_SUGGESTION]Sure, where to?", &wizard);
    assert_eq!(
        command.message(),
        OutboundMessage::addressed("Wizard", "Sure, where to?")
    );
}

#[rstest]
fn empty_pick_suggestion_is_rejected(decoder: Decoder, wizard: Participant) {
    let message = InboundMessage::with_text("[PICK_SUGGESTION]");
    let error = decoder
        .decode(Some(&message), Some(&wizard))
        .expect_err("empty pick");
    assert!(matches!(
        error,
        CommandError::MissingField {
            command: CommandKind::PickSuggestion,
            field: "extracted_from_text",
        }
    ));
}

#[rstest]
#[case::plain("hello")]
#[case::bracket_without_prefix("[NOT_A_COMMAND] hi")]
#[case::prefix_not_at_start("well [DONE]")]
#[case::lowercase("[done]")]
#[case::empty("")]
fn unprefixed_text_is_an_utterance(decoder: Decoder, wizard: Participant, #[case] text: &str) {
    let command = decode_text(&decoder, text, &wizard);
    assert_eq!(command.message(), OutboundMessage::addressed("Wizard", text));
}

#[rstest]
fn missing_text_fails_for_utterances(decoder: Decoder, wizard: Participant) {
    let error = decoder
        .decode(Some(&InboundMessage::default()), Some(&wizard))
        .expect_err("no text");
    assert!(matches!(
        error,
        CommandError::MissingField {
            command: CommandKind::Utter,
            field: "text",
        }
    ));
}

#[rstest]
fn missing_sender_fails_for_worker_commands(decoder: Decoder) {
    let message = InboundMessage::with_text("[DONE]");
    let error = decoder.decode(Some(&message), None).expect_err("no sender");
    assert!(matches!(
        error,
        CommandError::MissingField {
            command: CommandKind::TaskDone,
            field: "sender",
        }
    ));
}

#[test]
fn duplicate_prefix_rebinds_in_place() {
    // `[DONE]` now also names the pick prefix: the later definition wins but
    // the entry keeps the position of the first.
    let decoder = decoder_with_prefixes(&[("pick_suggestion_prefix", "[DONE]")]);
    let kinds: Vec<_> = decoder
        .prefixes()
        .entries()
        .iter()
        .map(PrefixEntry::kind)
        .collect();
    assert_eq!(
        kinds,
        [
            CommandKind::Query,
            CommandKind::DialogueCompleted,
            CommandKind::PickSuggestion,
            CommandKind::SelectPrimary,
            CommandKind::SelectSecondary,
            CommandKind::RequestSuggestions,
        ]
    );
    let wizard = Participant::new("Wizard");
    let command = decode_text(&decoder, "[DONE]Sure", &wizard);
    assert_eq!(command.kind(), CommandKind::PickSuggestion);
}

#[test]
fn earlier_prefix_wins_when_prefixes_overlap() {
    let decoder = decoder_with_prefixes(&[("complete_prefix", "[")]);
    let wizard = Participant::new("Wizard");
    let command = decode_text(&decoder, "[DONE] finished", &wizard);
    assert_eq!(command.kind(), CommandKind::DialogueCompleted);
}

#[test]
fn prefix_table_insert_appends_new_prefixes() {
    let mut table = PrefixTable::default();
    assert!(table.is_empty());
    table.insert("!", CommandKind::TaskDone, "done_prefix");
    table.insert("?", CommandKind::Query, "query_prefix");
    table.insert("!", CommandKind::DialogueCompleted, "complete_prefix");
    assert_eq!(table.len(), 2);
    let (entry, rest) = table.match_text("!now").expect("match");
    assert_eq!(entry.kind(), CommandKind::DialogueCompleted);
    assert_eq!(entry.key(), "complete_prefix");
    assert_eq!(rest, "now");
    assert!(table.match_text("now!").is_none());
}

#[test]
fn tracing_targets_use_the_crate_path() {
    assert_eq!(DECODER_TARGET, "woz_protocol::decoder");
    assert_eq!(crate::dispatch::DISPATCH_TARGET, "woz_protocol::dispatch");
}
