//! API surface tests. These don't need Postgres.

use prixfixe_events::{OutboundMessage, StoredMessage};
use serde_json::json;

#[test]
fn outbound_message_minimal_construction() {
    let msg = OutboundMessage::new("recipeCreated", "recipe", json!({"id": "r1"}));
    assert_eq!(msg.topic, OutboundMessage::DEFAULT_TOPIC);
    assert_eq!(msg.message_type, "recipeCreated");
    assert_eq!(msg.data_type, "recipe");
    assert_eq!(msg.schema_v, 1);
}

#[test]
fn outbound_message_builder_chain() {
    let msg = OutboundMessage::new("meal_created", "meal", json!({}))
        .with_topic("data_changes_v2")
        .with_schema_v(2);

    assert_eq!(msg.topic, "data_changes_v2");
    assert_eq!(msg.schema_v, 2);
}

#[test]
fn stored_message_is_serializable() {
    let stored = StoredMessage {
        seq: 42,
        ts: chrono::Utc::now(),
        topic: "data_changes".to_string(),
        message_type: "mealPlanFinalized".to_string(),
        data_type: "meal_plan".to_string(),
        payload: json!({"mealPlanID": "mp1"}),
        schema_v: 1,
    };

    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["seq"], 42);
    assert_eq!(json["message_type"], "mealPlanFinalized");
    assert_eq!(json["payload"]["mealPlanID"], "mp1");
}
