use super::*;

#[test]
fn test_split_identity() {
    assert_eq!(
        split_identity("alice-telegram"),
        ("alice".to_string(), "telegram".to_string())
    );

    assert_eq!(
        split_identity("alice"),
        ("alice".to_string(), String::new())
    );

    assert_eq!(
        split_identity("bob-discord-guild42"),
        ("bob".to_string(), "discord-guild42".to_string())
    );
}

#[test]
fn test_new_conversation_derives_identity() {
    let conversation = Conversation::new("alice-telegram");
    assert_eq!(conversation.id(), "alice-telegram");
    assert_eq!(conversation.user(), "alice");
    assert_eq!(conversation.platform(), "telegram");
    assert!(conversation.messages().is_empty());
    assert!(conversation.contexts().is_empty());
    assert!(conversation.metadata().is_none());
}

#[test]
fn test_default_conversation_has_unique_id() {
    let a = Conversation::default();
    let b = Conversation::default();
    assert_ne!(a.id(), b.id());
    assert!(!a.user().is_empty());
}
