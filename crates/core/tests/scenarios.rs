use serde_json::{json, Value};

use transcript_serializer_core::{
    classify_turn, convert_records, parse_records, scrub_fake_turns, Record, RecordKind,
    TurnAssembler, TurnVerdict,
};

fn records(lines: &[Value]) -> Vec<Record> {
    let raw: Vec<String> = lines.iter().map(Value::to_string).collect();
    parse_records(&raw.join("\n"))
}

fn user(text: &str) -> Value {
    json!({
        "type": "user",
        "cwd": "/work/demo",
        "timestamp": "2024-02-03T04:05:06Z",
        "message": {"role": "user", "content": text}
    })
}

fn assistant_text(text: &str) -> Value {
    json!({
        "type": "assistant",
        "message": {"role": "assistant", "content": [{"type": "text", "text": text}]}
    })
}

fn assistant_tool(name: &str, input: Value) -> Value {
    json!({
        "type": "assistant",
        "message": {"role": "assistant", "content": [{"type": "tool_use", "id": "t1", "name": name, "input": input}]}
    })
}

fn tool_result(stdout: &str) -> Value {
    json!({
        "type": "user",
        "toolUseResult": {"stdout": stdout, "stderr": ""},
        "message": {"role": "user", "content": [{"type": "tool_result", "tool_use_id": "t1", "content": stdout}]}
    })
}

#[test]
fn scenario_a_single_exchange() {
    let recs = records(&[user("hello"), assistant_text("hi")]);
    let turns = TurnAssembler::assemble(&recs);
    assert_eq!(turns.len(), 1);
    assert_eq!(classify_turn(&turns[0]), TurnVerdict::Keep);

    let doc = convert_records(&recs, Some("a.jsonl"));
    assert_eq!(doc.turns_after, 1);
    assert_eq!(
        doc.markdown,
        "<!-- Generated by SpecStory -->\n\nSource: a.jsonl\n\n# demo (2024-02-03 04:05:06)\n\n_**User**_\n\nhello\n\n---\n\n_**Assistant**_\n\nhi\n\n---"
    );
}

#[test]
fn scenario_b_tool_only_turn_dropped() {
    let recs = records(&[
        tool_result("fn main() {}"),
        assistant_tool("Read", json!({"file_path": "/work/demo/src/main.rs"})),
    ]);
    let turns = TurnAssembler::assemble(&recs);
    assert_eq!(turns.len(), 1);
    assert!(turns[0].user.is_none());
    assert_eq!(classify_turn(&turns[0]), TurnVerdict::DiscardToolOnly);

    let doc = convert_records(&recs, None);
    assert_eq!(doc.turns_filtered, 1);
    assert_eq!(doc.turns_after, 0);
    assert!(!doc.markdown.contains("_**User**_"));
}

#[test]
fn scenario_c_exit_turn_dropped_despite_prose() {
    let recs = records(&[
        user("<command-name>exit</command-name>\n<command-message>exit</command-message>"),
        assistant_text("Here is a long, careful explanation of everything that happened today."),
    ]);
    let turns = TurnAssembler::assemble(&recs);
    assert_eq!(classify_turn(&turns[0]), TurnVerdict::DiscardExit);
    assert_eq!(convert_records(&recs, None).turns_after, 0);
}

#[test]
fn scenario_d_consecutive_assistants_share_turn() {
    let recs = records(&[user("explain"), assistant_text("first"), assistant_text("second")]);
    let turns = TurnAssembler::assemble(&recs);
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].assistant_messages.len(), 2);

    let doc = convert_records(&recs, None);
    assert!(doc.markdown.contains("_**Assistant**_\n\nfirst\n\nsecond\n\n---"));
}

#[test]
fn tool_output_rendered_inside_turn() {
    let recs = records(&[
        user("run the tests"),
        assistant_tool("Bash", json!({"command": "cargo test"})),
        tool_result("test result: ok"),
        assistant_text("All tests pass."),
    ]);
    let doc = convert_records(&recs, None);
    assert_eq!(doc.turns_after, 1);
    assert!(doc.markdown.contains(
        "Bash: {\n  \"command\": \"cargo test\"\n}\n\nAll tests pass.\n\n```\ntest result: ok\n```"
    ));
}

#[test]
fn scrubber_removes_turn_that_renders_empty() {
    // Both texts are empty so the filter keeps the turn; only the rendered
    // shape reveals it as empty.
    let recs = records(&[
        json!({"type": "user", "message": {"content": [{"type": "image", "source": {}}]}}),
        tool_result("listing"),
        user("real question"),
        assistant_text("real answer"),
    ]);
    let turns = TurnAssembler::assemble(&recs);
    assert_eq!(turns.len(), 2);
    assert_eq!(classify_turn(&turns[0]), TurnVerdict::Keep);

    let doc = convert_records(&recs, None);
    assert_eq!(doc.turns_filtered, 0);
    assert_eq!(doc.turns_before, 2);
    assert_eq!(doc.turns_after, 1);
    assert!(!doc.markdown.contains("listing"));
    assert!(doc.markdown.contains("real answer"));

    let (again, removed) = scrub_fake_turns(&doc.markdown);
    assert_eq!(removed, 0);
    assert_eq!(again, doc.markdown);
}

#[test]
fn turn_count_never_exceeds_user_starts_plus_one() {
    let recs = records(&[
        assistant_text("resumed session"),
        tool_result("x"),
        user("one"),
        assistant_text("a"),
        tool_result("y"),
        user("two"),
        json!({"type": "summary", "summary": "ignored"}),
        user("three"),
    ]);
    let user_starts = recs
        .iter()
        .filter(|r| r.kind == RecordKind::User && !r.is_tool_result())
        .count();
    let turns = TurnAssembler::assemble(&recs);
    assert_eq!(user_starts, 3);
    assert!(turns.len() <= user_starts + 1);
    assert!(turns.iter().all(|t| t.user.is_some() || !t.assistant_messages.is_empty()));
}
