//! Unit tests for identifiers

use core_kernel::{BatchId, EditTicket, RecordId, UserId, NEW_RECORD_SENTINEL};

mod record_id {
    use super::*;

    #[test]
    fn test_sentinel_maps_to_new() {
        assert_eq!(RecordId::from_wire(NEW_RECORD_SENTINEL), RecordId::New);
        assert!(RecordId::from_wire(-1).is_new());
        assert_eq!(RecordId::from_wire(7), RecordId::Persisted(7));
    }

    #[test]
    fn test_deserializes_from_number_string_and_null() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[12, "13", null, -1]"#).unwrap();
        assert_eq!(
            ids,
            vec![
                RecordId::Persisted(12),
                RecordId::Persisted(13),
                RecordId::New,
                RecordId::New,
            ]
        );
    }

    #[test]
    fn test_persisted_accessor() {
        assert_eq!(RecordId::Persisted(3).persisted(), Some(3));
        assert_eq!(RecordId::New.persisted(), None);
    }
}

mod other_ids {
    use super::*;

    #[test]
    fn test_user_id_display_and_parse() {
        let id = UserId::new(42);
        assert_eq!(id.to_string(), "USR-42");
        assert_eq!("USR-42".parse::<UserId>().unwrap(), id);
        assert_eq!("42".parse::<UserId>().unwrap(), id);
    }

    #[test]
    fn test_blank_batch_id_is_empty() {
        assert!(BatchId::new("  ").is_empty());
        assert!(!BatchId::from("B-01").is_empty());
    }

    #[test]
    fn test_edit_tickets_are_unique() {
        assert_ne!(EditTicket::new(), EditTicket::new());
    }
}
