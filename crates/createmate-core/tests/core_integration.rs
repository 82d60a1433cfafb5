#![allow(clippy::unwrap_used, clippy::expect_used)]

use createmate_core::*;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// 1. Wire format accepted from frontend payloads
// ---------------------------------------------------------------------------

#[test]
fn user_input_from_frontend_payload() {
    let payload = serde_json::json!({
        "area_of_interest": "Technology",
        "content_type": "Event Updates",
        "keywords": ["Ethereum"],
        "post_frequency": 3
    });
    let input: UserInput = serde_json::from_value(payload).unwrap();
    assert_eq!(input.keywords, vec!["Ethereum".to_string()]);
    assert!(validate_user_input(&input).is_ok());
}

#[test]
fn feedback_comments_optional() {
    let fb: Feedback = serde_json::from_str(r#"{"liked": true}"#).unwrap();
    assert!(fb.liked);
    assert!(fb.comments.is_none());
}

// ---------------------------------------------------------------------------
// 2. Storage messages carry arbitrary documents
// ---------------------------------------------------------------------------

#[test]
fn store_data_carries_document() {
    let content = GeneratedContent {
        session_id: Uuid::new_v4(),
        topic: "Merge anniversary".into(),
        content: "Body".into(),
        day: "Monday".into(),
    };
    let data = match serde_json::to_value(&content).unwrap() {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    };
    let msg = AgentMessage::from(StoreData {
        collection: "generated_content".into(),
        data,
    });

    let json = serde_json::to_string(&msg).unwrap();
    let parsed: AgentMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, msg);
    assert_eq!(parsed.kind(), "store_data");
}

// ---------------------------------------------------------------------------
// 3. State snapshot defaults
// ---------------------------------------------------------------------------

#[test]
fn empty_state_response() {
    let state = StateResponse::default();
    let json = serde_json::to_value(&state).unwrap();
    assert!(json["user_input"].is_null());
    assert_eq!(json["generated_content"], serde_json::json!([]));
    assert_eq!(json["suggested_topics"], serde_json::json!([]));
}

#[test]
fn weekday_names_round_trip_through_display() {
    for day in Weekday::ALL {
        assert_eq!(day.to_string().parse::<Weekday>().unwrap(), day);
    }
}
