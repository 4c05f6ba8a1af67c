//! Tests for the wire schema

use super::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

// ============================================================================
// Field value union
// ============================================================================

#[test_case(r#"{"type": "text", "data": "hello"}"#, "text" ; "text")]
#[test_case(r#"{"type": "filterable-text", "data": null}"#, "filterable-text" ; "filterable text")]
#[test_case(r#"{"type": "filterable-text-multi", "data": ["a"]}"#, "filterable-text-multi" ; "filterable text multi")]
#[test_case(r#"{"type": "number", "data": 1.5}"#, "number" ; "number")]
#[test_case(r#"{"type": "number-multi", "data": [1.0]}"#, "number-multi" ; "number multi")]
#[test_case(r#"{"type": "datetime", "data": "2024-03-01T10:00:00Z"}"#, "datetime" ; "datetime")]
#[test_case(r#"{"type": "location", "data": {"city": "Berlin"}}"#, "location" ; "location")]
#[test_case(r#"{"type": "location-multi", "data": null}"#, "location-multi" ; "location multi")]
#[test_case(r#"{"type": "dropdown", "data": {"dropdownOptionId": 1}}"#, "dropdown" ; "dropdown")]
#[test_case(r#"{"type": "ranked-dropdown", "data": null}"#, "ranked-dropdown" ; "ranked dropdown")]
#[test_case(r#"{"type": "dropdown-multi", "data": []}"#, "dropdown-multi" ; "dropdown multi")]
#[test_case(r#"{"type": "person", "data": {"id": 3}}"#, "person" ; "person")]
#[test_case(r#"{"type": "person-multi", "data": [{"id": 3}]}"#, "person-multi" ; "person multi")]
#[test_case(r#"{"type": "company", "data": null}"#, "company" ; "company")]
#[test_case(r#"{"type": "company-multi", "data": null}"#, "company-multi" ; "company multi")]
#[test_case(r#"{"type": "formula-number", "data": {"calculatedValue": 0.5}}"#, "formula-number" ; "formula number")]
fn test_field_value_tags(json_str: &str, expected_kind: &str) {
    let value: FieldValue = serde_json::from_str(json_str).unwrap();
    assert_eq!(value.kind_name(), expected_kind);
}

#[test]
fn test_unrecognized_tag_deserializes_to_unknown() {
    let value: FieldValue =
        serde_json::from_str(r#"{"type": "hologram", "data": {"whatever": 1}}"#).unwrap();
    assert!(matches!(value, FieldValue::Unknown));
    assert_eq!(value.kind_name(), "unknown");
}

#[test]
fn test_interaction_field_value() {
    let value: FieldValue = serde_json::from_str(
        r#"{
            "type": "interaction",
            "data": {
                "type": "email",
                "id": 4,
                "subject": "Intro",
                "sentAt": "2024-03-01T10:00:00Z",
                "from": {"emailAddress": "a@x.com", "person": {"id": 9}},
                "to": [{"emailAddress": "b@y.com", "person": null}]
            }
        }"#,
    )
    .unwrap();

    let FieldValue::Interaction(Some(interaction)) = value else {
        panic!("Expected interaction");
    };
    assert_eq!(interaction.id(), 4);
    assert_eq!(interaction.kind(), "email");
}

#[test]
fn test_entity_ref_ignores_embedded_payload() {
    // The wire may embed the whole referenced entity; only the id survives.
    let value: FieldValue = serde_json::from_str(
        r#"{"type": "company", "data": {"id": 11, "name": "Acme", "domain": "acme.com"}}"#,
    )
    .unwrap();

    let FieldValue::Company(Some(entity_ref)) = value else {
        panic!("Expected company ref");
    };
    assert_eq!(entity_ref, EntityRef { id: 11 });
}

#[test]
fn test_field_column_naming() {
    let custom: Field = serde_json::from_str(
        r#"{"id": "field-42", "name": "Stage", "value": {"type": "text", "data": null}}"#,
    )
    .unwrap();
    assert!(custom.is_custom());
    assert_eq!(custom.column_name(), "field-42_Stage");

    let builtin: Field = serde_json::from_str(
        r#"{"id": "industry", "name": "Industry", "value": {"type": "text", "data": null}}"#,
    )
    .unwrap();
    assert!(!builtin.is_custom());
    assert_eq!(builtin.column_name(), "industry");
}

// ============================================================================
// Interactions
// ============================================================================

#[test]
fn test_meeting_flattened_has_full_column_set() {
    let interaction: Interaction = serde_json::from_str(
        r#"{
            "type": "meeting",
            "id": 900,
            "title": "Kickoff",
            "allDay": false,
            "startTime": "2024-03-01T10:00:00Z",
            "attendees": [{"emailAddress": "a@x.com", "person": {"id": 42}}]
        }"#,
    )
    .unwrap();

    let record = interaction.flattened();
    assert_eq!(record.get("id"), Some(&json!(900)));
    assert_eq!(record.get("type"), Some(&json!("meeting")));
    assert_eq!(record.get("title"), Some(&json!("Kickoff")));
    assert_eq!(
        record.get("attendees"),
        Some(&json!([{ "email_address": "a@x.com", "person_id": 42 }]))
    );
    // Columns of the other variants are present and null.
    for column in ["direction", "subject", "from", "to", "cc", "sent_at"] {
        assert_eq!(record.get(column), Some(&JsonValue::Null), "{column}");
    }
}

#[test]
fn test_chat_message_tag_is_kebab_case() {
    let interaction: Interaction = serde_json::from_str(
        r#"{"type": "chat-message", "id": 5, "direction": "outgoing", "manualCreator": 7}"#,
    )
    .unwrap();

    assert_eq!(interaction.kind(), "chat-message");
    assert_eq!(interaction.summary(), json!({"id": 5, "type": "chat-message"}));
    let record = interaction.flattened();
    assert_eq!(record.get("manual_creator"), Some(&json!(7)));
}

// ============================================================================
// Paged envelopes
// ============================================================================

#[test]
fn test_paged_envelope_next_url() {
    let page: Paged<Company> = serde_json::from_str(
        r#"{
            "data": [{"id": 1, "name": "Acme"}],
            "pagination": {"nextUrl": "https://api.affinity.co/v2/companies?cursor=x", "prevUrl": null}
        }"#,
    )
    .unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(
        page.next_url(),
        Some("https://api.affinity.co/v2/companies?cursor=x")
    );
}

#[test]
fn test_paged_envelope_last_page() {
    let page: Paged<Company> =
        serde_json::from_str(r#"{"data": [], "pagination": {"nextUrl": null}}"#).unwrap();
    assert!(page.next_url().is_none());

    let bare: Paged<Company> = serde_json::from_str(r#"{"data": []}"#).unwrap();
    assert!(bare.next_url().is_none());
}

#[test]
fn test_notes_page_cursor() {
    let page: NotesPage = serde_json::from_str(
        r#"{"notes": [{"id": 1, "content": "hi", "creator_id": 2}], "next_page_token": "tok"}"#,
    )
    .unwrap();

    assert_eq!(page.notes.len(), 1);
    assert_eq!(page.notes[0].creator_id, Some(2));
    assert_eq!(page.next_page_token.as_deref(), Some("tok"));
}

#[test]
fn test_error_envelope_joins_messages() {
    let envelope: ErrorEnvelope = serde_json::from_str(
        r#"{"errors": [{"message": "first", "code": "bad"}, {"message": "second"}]}"#,
    )
    .unwrap();

    assert_eq!(envelope.joined_messages(), "first\nsecond");
}

// ============================================================================
// Entities
// ============================================================================

#[test]
fn test_company_base_record_excludes_fields() {
    let company: Company = serde_json::from_str(
        r#"{
            "id": 7,
            "name": "Acme",
            "domain": "acme.com",
            "fields": [{"id": "industry", "name": "Industry", "value": {"type": "text", "data": "saas"}}]
        }"#,
    )
    .unwrap();

    assert_eq!(company.fields().len(), 1);
    let record = company.base_record().unwrap();
    assert_eq!(record.get("id"), Some(&json!(7)));
    assert_eq!(record.get("name"), Some(&json!("Acme")));
    assert!(!record.contains_key("fields"));
}

#[test]
fn test_person_type_rename() {
    let person: Person = serde_json::from_str(
        r#"{"id": 3, "firstName": "Ada", "lastName": "Lovelace", "type": "external"}"#,
    )
    .unwrap();

    assert_eq!(person.person_type.as_deref(), Some("external"));
    assert_eq!(person.entity_id(), 3);
    assert!(person.fields().is_empty());
}

#[test]
fn test_note_v1_snake_case() {
    let note: Note = serde_json::from_str(
        r#"{
            "id": 22,
            "creator_id": 38706,
            "person_ids": [38622],
            "organization_ids": [],
            "interaction_id": 1,
            "interaction_type": 0,
            "parent_id": null,
            "content": "Some note",
            "type": 0,
            "created_at": "2024-03-01T10:00:00Z"
        }"#,
    )
    .unwrap();

    assert_eq!(note.id, 22);
    assert_eq!(note.person_ids, Some(vec![38622]));
    assert_eq!(note.note_type, Some(0));
    assert!(note.parent_id.is_none());
}

// ============================================================================
// List entries
// ============================================================================

#[test]
fn test_list_entry_tag_dispatch() {
    let entry: ListEntry = serde_json::from_str(
        r#"{
            "type": "company",
            "id": 501,
            "createdAt": "2024-03-01T10:00:00Z",
            "creatorId": 9,
            "entity": {"id": 7, "name": "Acme"}
        }"#,
    )
    .unwrap();

    assert_eq!(entry.id(), 501);
    assert_eq!(entry.entity_kind(), "company");
    assert_eq!(entry.entity_id(), 7);
}

#[test]
fn test_list_entry_base_record() {
    let entry: ListEntry = serde_json::from_str(
        r#"{
            "type": "opportunity",
            "id": 88,
            "creatorId": 9,
            "entity": {
                "id": 12,
                "name": "Series A",
                "fields": [{"id": "field-1", "name": "Stage", "value": {"type": "text", "data": "open"}}]
            }
        }"#,
    )
    .unwrap();

    let record = entry.base_record();
    assert_eq!(record.get("id"), Some(&json!(88)));
    assert_eq!(record.get("type"), Some(&json!("opportunity")));
    assert_eq!(record.get("creatorId"), Some(&json!(9)));
    assert_eq!(record.get("entity_id"), Some(&json!(12)));
    assert!(!record.contains_key("entity"));
    assert_eq!(entry.fields().len(), 1);
}
