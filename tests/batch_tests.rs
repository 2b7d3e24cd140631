use cloudeval::batch::{
    extract_batch, read_json_array, read_jsonl, write_jsonl, BatchError, EvaluationInput,
    EvaluationSummary,
};
use cloudeval::{EvaluationRecord, RecordExtractor};
use serde_json::json;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

const RUNS: &str = r#"{"query":[{"role":"system","content":"You are a physics expert."},{"role":"user","content":[{"type":"text","text":"What is temperature?"}]}],"response":[{"role":"assistant","content":[{"type":"text","text":"A measure of average kinetic energy."}]}]}

{"log":{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]},"ground_truth":"hello","latency":1.5}
{"agent_data":{"conversation":[{"role":"user","message":"Capital of France?"},{"role":"assistant","content":"Paris"}]},"ground_truth":"Paris"}
"not a log"
"#;

#[test]
fn test_read_jsonl_file_and_extract() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("runs.jsonl");
    File::create(&path).unwrap().write_all(RUNS.as_bytes()).unwrap();

    let inputs = read_jsonl(File::open(&path).unwrap()).unwrap();
    assert_eq!(inputs.len(), 4);

    let records = extract_batch(&RecordExtractor::new(), &inputs);
    assert_eq!(records[0].query, "What is temperature?");
    assert_eq!(records[0].context, "You are a physics expert.");
    assert_eq!(records[0].latency, 8.5);

    assert_eq!(records[1].query, "hi");
    assert_eq!(records[1].response, "hello");
    assert_eq!(records[1].ground_truth, "hello");
    assert_eq!(records[1].latency, 1.5);

    assert_eq!(records[2].query, "Capital of France?");
    assert_eq!(records[2].response, "Paris");
    assert_eq!(records[2].ground_truth, "Paris");

    assert_eq!(records[3], EvaluationRecord::empty("", 8.5));
}

#[test]
fn test_read_jsonl_reports_invalid_line() {
    let input = "{\"response\":\"ok\"}\n\n{not json}\n";
    match read_jsonl(input.as_bytes()) {
        Err(BatchError::InvalidJson { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected invalid JSON error, got {:?}", other),
    }
}

#[test]
fn test_batch_error_display() {
    let err = BatchError::InvalidJson {
        line: 7,
        message: "expected value".to_string(),
    };
    assert_eq!(err.to_string(), "Invalid JSON on line 7: expected value");

    let io_err: BatchError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(io_err.to_string().starts_with("I/O error"));
}

#[test]
fn test_read_json_array() {
    let input = json!([
        {"response": "a"},
        {"log": {"response": "b"}, "latency": 2.0}
    ])
    .to_string();

    let inputs = read_json_array(input.as_bytes()).unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0], EvaluationInput::new(json!({"response": "a"})));
    assert_eq!(
        inputs[1],
        EvaluationInput::new(json!({"response": "b"})).with_latency(2.0)
    );
}

#[test]
fn test_read_json_array_single_value() {
    let inputs = read_json_array("{\"response\":\"solo\"}".as_bytes()).unwrap();
    assert_eq!(inputs.len(), 1);

    let records = extract_batch(&RecordExtractor::new(), &inputs);
    assert_eq!(records[0].response, "solo");
}

#[test]
fn test_read_json_array_invalid_document() {
    match read_json_array("[{\"response\": }]".as_bytes()) {
        Err(BatchError::InvalidJson { line, .. }) => assert_eq!(line, 1),
        other => panic!("expected invalid JSON error, got {:?}", other),
    }
}

#[test]
fn test_envelope_with_wrong_typed_fields() {
    let input = EvaluationInput::from_value(json!({
        "log": {"response": "x"},
        "ground_truth": 4,
        "latency": "fast"
    }));
    assert_eq!(input.ground_truth, "");
    assert_eq!(input.latency, None);
}

#[test]
fn test_evaluation_input_deserializes_with_alias() {
    let input: EvaluationInput = serde_json::from_value(json!({
        "agent_data": {"response": "x"},
        "ground_truth": "x"
    }))
    .unwrap();

    assert_eq!(
        input,
        EvaluationInput::new(json!({"response": "x"})).with_ground_truth("x")
    );
}

#[test]
fn test_write_jsonl_round_trips_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.jsonl");

    let inputs = vec![
        EvaluationInput::new(json!({"response": "one"})).with_ground_truth("one"),
        EvaluationInput::new(json!({"messages": [{"role": "user", "content": "q"}]})),
    ];
    let records = extract_batch(&RecordExtractor::new(), &inputs);
    write_jsonl(File::create(&path).unwrap(), &records).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        r#"{"query":"","ground_truth":"one","response":"one","context":"","latency":8.5,"response_length":3}"#
    );

    let parsed: EvaluationRecord = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(parsed, records[1]);
}

#[test]
fn test_summary_over_records() {
    let inputs = vec![
        EvaluationInput::new(json!({"messages": [
            {"role": "user", "content": "q"},
            {"role": "assistant", "content": "abcd"}
        ]}))
        .with_latency(1.0),
        EvaluationInput::new(json!({"response": "ab"})).with_latency(2.0),
        EvaluationInput::new(json!(null)).with_latency(3.0),
    ];

    let records = extract_batch(&RecordExtractor::new(), &inputs);
    let summary = EvaluationSummary::from_records(&records);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.empty_queries, 2);
    assert_eq!(summary.empty_responses, 1);
    assert_eq!(summary.mean_latency, 2.0);
    assert_eq!(summary.mean_response_length, 2.0);
    assert!(summary.to_string().starts_with("3 records"));
}

#[test]
fn test_summary_of_empty_batch() {
    let summary = EvaluationSummary::from_records(&[]);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.mean_latency, 0.0);
    assert_eq!(summary.mean_response_length, 0.0);
}

#[test]
fn test_serde_deserialize_matches_from_value() {
    let bare = json!({"response": "ok"});
    let via_serde: EvaluationInput = serde_json::from_value(bare.clone()).unwrap();
    assert_eq!(via_serde, EvaluationInput::from_value(bare));
    assert_eq!(via_serde.log, json!({"response": "ok"}));

    let loose = json!({"log": {"response": "x"}, "ground_truth": 4, "latency": "fast"});
    let via_serde: EvaluationInput = serde_json::from_value(loose.clone()).unwrap();
    assert_eq!(via_serde, EvaluationInput::from_value(loose));
    assert_eq!(via_serde.ground_truth, "");
    assert_eq!(via_serde.latency, None);
}

#[test]
fn test_evaluation_input_list_deserializes_bare_and_envelopes() {
    let inputs: Vec<EvaluationInput> = serde_json::from_str(
        r#"[{"response":"a"},{"log":{"response":"b"},"ground_truth":"b"}]"#,
    )
    .unwrap();

    assert_eq!(inputs[0], EvaluationInput::new(json!({"response": "a"})));
    assert_eq!(
        inputs[1],
        EvaluationInput::new(json!({"response": "b"})).with_ground_truth("b")
    );
}

#[test]
fn test_read_jsonl_reports_invalid_utf8_line() {
    let input: &[u8] = b"{\"response\":\"ok\"}\n{\"response\":\"\xff\"}\n";
    match read_jsonl(input) {
        Err(BatchError::InvalidJson { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected invalid JSON error, got {:?}", other),
    }
}

#[test]
fn test_read_jsonl_accepts_crlf_and_missing_final_newline() {
    let input = "{\"response\":\"a\"}\r\n\r\n{\"response\":\"b\"}";
    let inputs = read_jsonl(input.as_bytes()).unwrap();
    assert_eq!(inputs.len(), 2);

    let records = extract_batch(&RecordExtractor::new(), &inputs);
    assert_eq!(records[0].response, "a");
    assert_eq!(records[1].response, "b");
}

#[test]
fn test_serialize_error_display() {
    let err = BatchError::Serialize("bad float".to_string());
    assert_eq!(err.to_string(), "Serialization failed: bad float");
}
