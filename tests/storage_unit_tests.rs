use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use portfolio_backend::models::{NewContactMessage, NewUser};
use portfolio_backend::storage::{MemStorage, Storage, StorageError};

fn new_message(name: &str) -> NewContactMessage {
    NewContactMessage {
        name: name.to_string(),
        email: "visitor@example.com".to_string(),
        subject: None,
        message: "I would like to talk about a project.".to_string(),
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

// Часы, которые по очереди возвращают заданные моменты времени
fn scripted_clock(ticks: Vec<DateTime<Utc>>) -> impl Fn() -> DateTime<Utc> + Send + Sync {
    let ticks = Mutex::new(ticks.into_iter());
    move || ticks.lock().unwrap().next().unwrap()
}

fn listed_ids(storage: &MemStorage) -> Vec<String> {
    storage
        .get_contact_messages()
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect()
}

#[cfg(test)]
mod contact_message_storage_tests {
    use super::*;

    #[test]
    fn test_create_assigns_id_timestamp_and_unread() {
        let storage = MemStorage::new();

        let message = storage.create_contact_message(new_message("Alice")).unwrap();

        assert!(!message.id.is_empty());
        assert!(uuid::Uuid::parse_str(&message.id).is_ok());
        assert!(!message.is_read);
        assert_eq!(message.name, "Alice");
        assert_eq!(message.subject, None);
    }

    #[test]
    fn test_ids_are_unique() {
        let storage = MemStorage::new();

        let ids: std::collections::HashSet<String> = (0..50)
            .map(|i| storage.create_contact_message(new_message(&format!("n{}", i))).unwrap().id)
            .collect();

        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_empty_subject_stored_as_none() {
        let storage = MemStorage::new();
        let mut input = new_message("Alice");
        input.subject = Some(String::new());

        let message = storage.create_contact_message(input).unwrap();

        assert_eq!(message.subject, None);
    }

    #[test]
    fn test_get_returns_stored_message() {
        let storage = MemStorage::new();
        let created = storage.create_contact_message(new_message("Alice")).unwrap();

        let fetched = storage.get_contact_message(&created.id).unwrap();

        assert_eq!(fetched, Some(created));
    }

    #[test]
    fn test_get_unknown_id_returns_none() {
        let storage = MemStorage::new();
        storage.create_contact_message(new_message("Alice")).unwrap();

        assert_eq!(storage.get_contact_message("does-not-exist").unwrap(), None);
    }

    #[test]
    fn test_list_is_newest_first() {
        let t1 = base_time();
        let storage = MemStorage::with_clock(scripted_clock(vec![
            t1,
            t1 + Duration::seconds(1),
            t1 + Duration::seconds(2),
        ]));
        let first = storage.create_contact_message(new_message("first")).unwrap();
        let second = storage.create_contact_message(new_message("second")).unwrap();
        let third = storage.create_contact_message(new_message("third")).unwrap();

        assert!(first.created_at < second.created_at && second.created_at < third.created_at);
        assert_eq!(listed_ids(&storage), vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_equal_timestamps_list_later_insertion_first() {
        let fixed = base_time();
        let storage = MemStorage::with_clock(move || fixed);
        let first = storage.create_contact_message(new_message("first")).unwrap();
        let second = storage.create_contact_message(new_message("second")).unwrap();
        let third = storage.create_contact_message(new_message("third")).unwrap();

        assert_eq!(first.created_at, third.created_at);
        assert_eq!(listed_ids(&storage), vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_created_at_clamped_when_clock_goes_back() {
        let t0 = base_time();
        let storage = MemStorage::with_clock(scripted_clock(vec![
            t0,
            t0 - Duration::minutes(5),
            t0 + Duration::minutes(1),
        ]));
        let first = storage.create_contact_message(new_message("first")).unwrap();
        let second = storage.create_contact_message(new_message("second")).unwrap();
        let third = storage.create_contact_message(new_message("third")).unwrap();

        // Откат часов не делает created_at меньше предыдущего
        assert_eq!(first.created_at, t0);
        assert_eq!(second.created_at, t0);
        assert_eq!(third.created_at, t0 + Duration::minutes(1));
        assert_eq!(listed_ids(&storage), vec![third.id, second.id, first.id]);
    }

    #[test]
    fn test_created_at_is_non_decreasing() {
        let storage = MemStorage::new();
        let messages: Vec<_> = (0..20)
            .map(|i| storage.create_contact_message(new_message(&format!("n{}", i))).unwrap())
            .collect();

        for pair in messages.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn test_list_empty_storage() {
        let storage = MemStorage::new();

        assert!(storage.get_contact_messages().unwrap().is_empty());
    }

    #[test]
    fn test_mark_as_read() {
        let storage = MemStorage::new();
        let created = storage.create_contact_message(new_message("Alice")).unwrap();

        let updated = storage.mark_message_as_read(&created.id).unwrap().unwrap();

        assert!(updated.is_read);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(storage.get_contact_message(&created.id).unwrap().unwrap().is_read);
        assert!(storage.get_contact_messages().unwrap()[0].is_read);
    }

    #[test]
    fn test_mark_as_read_is_idempotent() {
        let storage = MemStorage::new();
        let created = storage.create_contact_message(new_message("Alice")).unwrap();

        let first = storage.mark_message_as_read(&created.id).unwrap().unwrap();
        let second = storage.mark_message_as_read(&created.id).unwrap().unwrap();

        assert!(first.is_read);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mark_unknown_id_has_no_side_effect() {
        let storage = MemStorage::new();
        let created = storage.create_contact_message(new_message("Alice")).unwrap();

        assert_eq!(storage.mark_message_as_read("does-not-exist").unwrap(), None);
        assert!(!storage.get_contact_message(&created.id).unwrap().unwrap().is_read);
    }

    #[test]
    fn test_mark_only_touches_target() {
        let storage = MemStorage::new();
        let a = storage.create_contact_message(new_message("a")).unwrap();
        let b = storage.create_contact_message(new_message("b")).unwrap();

        storage.mark_message_as_read(&a.id).unwrap();

        assert!(storage.get_contact_message(&a.id).unwrap().unwrap().is_read);
        assert!(!storage.get_contact_message(&b.id).unwrap().unwrap().is_read);
    }
}

#[cfg(test)]
mod user_storage_tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "opaque".to_string(),
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let storage = MemStorage::new();

        let user = storage.create_user(new_user("owner")).unwrap();

        assert_eq!(storage.get_user(&user.id).unwrap(), Some(user.clone()));
        assert_eq!(user.password, "opaque");
    }

    #[test]
    fn test_get_user_by_username() {
        let storage = MemStorage::new();
        storage.create_user(new_user("alice")).unwrap();
        let bob = storage.create_user(new_user("bob")).unwrap();

        assert_eq!(storage.get_user_by_username("bob").unwrap(), Some(bob));
        assert_eq!(storage.get_user_by_username("carol").unwrap(), None);
    }

    #[test]
    fn test_duplicate_username_returns_first_match() {
        let storage = MemStorage::new();
        let first = storage.create_user(new_user("owner")).unwrap();
        let second = storage.create_user(new_user("owner")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(storage.get_user_by_username("owner").unwrap(), Some(first));
    }

    #[test]
    fn test_unknown_user_id() {
        let storage = MemStorage::new();

        assert_eq!(storage.get_user("missing").unwrap(), None);
    }
}

#[cfg(test)]
mod storage_error_tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    #[test]
    fn test_poison_error_converts() {
        let lock = Mutex::new(());
        let error: StorageError = PoisonError::new(lock.lock().unwrap()).into();

        assert!(matches!(error, StorageError::Poisoned));
        assert!(!format!("{}", error).is_empty());
    }

    #[test]
    fn test_storage_is_object_safe() {
        let storage: Box<dyn Storage> = Box::new(MemStorage::new());

        assert!(storage.get_contact_messages().unwrap().is_empty());
    }
}
