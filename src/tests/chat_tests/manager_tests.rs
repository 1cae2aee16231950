// Manager Tests - Testing ChatManager operations, callbacks and invariants

use crate::chat::{ChatManager, ChatState};
use crate::settings::ChatSettings;
use crate::Error;
use std::sync::{Arc, Mutex};

/// Record every state transition into a shared vector
fn record_transitions(chat: &mut ChatManager) -> Arc<Mutex<Vec<(ChatState, ChatState)>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    chat.on_state_changed(move |old, new| sink.lock().unwrap().push((old, new)));
    log
}

/// Record the id of every appended message
fn record_messages(chat: &mut ChatManager) -> Arc<Mutex<Vec<u64>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    chat.on_message_received(move |msg| sink.lock().unwrap().push(msg.id));
    log
}

fn permissive() -> ChatManager {
    ChatManager::with_settings(ChatSettings {
        strict_transitions: false,
        ..ChatSettings::default()
    })
}

fn expected_unread(chat: &ChatManager) -> usize {
    chat.messages().iter().filter(|m| !m.is_user && !m.read).count()
}

#[test]
fn test_new_manager_is_empty() {
    let chat = ChatManager::new();

    assert_eq!(chat.state(), ChatState::Idle);
    assert_eq!(chat.message_count(), 0);
    assert_eq!(chat.unread_count(), 0);
    assert!(chat.last_message().is_none());
    assert!(!chat.is_typing());
    assert!(!chat.is_awaiting_response());
}

#[test]
fn test_send_message() {
    let mut chat = ChatManager::new();
    let transitions = record_transitions(&mut chat);

    let msg = chat.send_message("hi").expect("Failed to send");

    assert_eq!(msg.text, "hi");
    assert!(msg.is_user);
    assert!(msg.read);
    assert_eq!(chat.message_count(), 1);
    assert_eq!(chat.get_history(None)[0], msg);
    assert_eq!(chat.state(), ChatState::WaitingResponse);
    assert!(chat.is_awaiting_response());
    assert_eq!(
        *transitions.lock().unwrap(),
        vec![
            (ChatState::Idle, ChatState::Sending),
            (ChatState::Sending, ChatState::WaitingResponse),
        ]
    );
}

#[test]
fn test_receive_after_send() {
    let mut chat = ChatManager::new();
    chat.send_message("hi").expect("Failed to send");

    let msg = chat.receive_message("hello").expect("Failed to receive");

    assert!(!msg.is_user);
    assert!(!msg.read);
    assert_eq!(chat.unread_count(), 1);
    assert_eq!(chat.state(), ChatState::Idle);
    assert!(!chat.is_awaiting_response());
    assert_eq!(chat.last_message().map(|m| m.text.as_str()), Some("hello"));
}

#[test]
fn test_message_callback_fires_before_state_callbacks() {
    let mut chat = ChatManager::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&order);
    chat.on_message_received(move |msg| sink.lock().unwrap().push(format!("message {}", msg.id)));
    let sink = Arc::clone(&order);
    chat.on_state_changed(move |_, new| sink.lock().unwrap().push(format!("state {:?}", new)));

    chat.send_message("hi").expect("Failed to send");

    assert_eq!(
        *order.lock().unwrap(),
        vec!["message 1", "state Sending", "state WaitingResponse"]
    );
}

#[test]
fn test_multiple_observers_all_notified() {
    let mut chat = ChatManager::new();
    let first = record_messages(&mut chat);
    let second = record_messages(&mut chat);

    chat.send_message("one").expect("Failed to send");
    chat.receive_message("two").expect("Failed to receive");

    assert_eq!(*first.lock().unwrap(), vec![1, 2]);
    assert_eq!(*second.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_remove_callback() {
    let mut chat = ChatManager::new();
    let log = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&log);
    let id = chat.on_message_received(move |_| *sink.lock().unwrap() += 1);

    chat.send_message("one").expect("Failed to send");
    assert!(chat.remove_callback(id));
    assert!(!chat.remove_callback(id), "Second removal finds nothing");
    chat.receive_message("two").expect("Failed to receive");

    assert_eq!(*log.lock().unwrap(), 1);
}

#[test]
fn test_empty_text_rejected_without_effect() {
    let mut chat = ChatManager::new();
    let transitions = record_transitions(&mut chat);
    let messages = record_messages(&mut chat);

    assert!(matches!(chat.send_message(""), Err(Error::InvalidInput(_))));
    assert!(matches!(chat.send_message("   \n\t"), Err(Error::InvalidInput(_))));
    assert!(matches!(chat.receive_message(""), Err(Error::InvalidInput(_))));

    assert_eq!(chat.message_count(), 0);
    assert_eq!(chat.state(), ChatState::Idle);
    assert!(transitions.lock().unwrap().is_empty());
    assert!(messages.lock().unwrap().is_empty());
}

#[test]
fn test_message_count_matches_successful_calls_in_order() {
    let mut chat = permissive();

    let mut expected = Vec::new();
    for i in 0..6 {
        let text = format!("msg {}", i);
        if i % 3 == 0 {
            chat.receive_message(text.clone()).expect("Failed to receive");
        } else {
            chat.send_message(text.clone()).expect("Failed to send");
        }
        expected.push(text);
        // Failed calls do not count
        let _ = chat.send_message("");
    }

    assert_eq!(chat.message_count(), 6);
    let texts: Vec<&str> = chat.get_history(None).iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, expected);
}

#[test]
fn test_ids_increase_monotonically() {
    let mut chat = permissive();
    chat.send_message("a").expect("Failed to send");
    chat.receive_message("b").expect("Failed to receive");
    chat.send_message("c").expect("Failed to send");

    let ids: Vec<u64> = chat.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    chat.clear_history();
    let next = chat.send_message("d").expect("Failed to send");
    assert_eq!(next.id, 4, "Ids are not reused after a clear");
}

#[test]
fn test_unread_count_tracks_messages() {
    let mut chat = permissive();

    chat.receive_message("one").expect("Failed to receive");
    assert_eq!(chat.unread_count(), expected_unread(&chat));
    chat.send_message("two").expect("Failed to send");
    assert_eq!(chat.unread_count(), expected_unread(&chat));
    chat.receive_message("three").expect("Failed to receive");
    chat.receive_message("four").expect("Failed to receive");
    assert_eq!(chat.unread_count(), 3);
    assert_eq!(chat.unread_count(), expected_unread(&chat));

    let second_id = chat.messages()[2].id;
    assert!(chat.mark_read(second_id).expect("Failed to mark read"));
    assert!(!chat.mark_read(second_id).expect("Failed to mark read"), "Already read");
    assert_eq!(chat.unread_count(), 2);
    assert_eq!(chat.unread_count(), expected_unread(&chat));
}

#[test]
fn test_mark_read_unknown_id() {
    let mut chat = ChatManager::new();
    assert!(matches!(chat.mark_read(99), Err(Error::MessageNotFound(99))));
}

#[test]
fn test_mark_all_read() {
    let mut chat = permissive();
    let transitions = record_transitions(&mut chat);
    let messages = record_messages(&mut chat);

    chat.send_message("hi").expect("Failed to send");
    chat.receive_message("one").expect("Failed to receive");
    chat.receive_message("two").expect("Failed to receive");
    let transitions_before = transitions.lock().unwrap().len();
    let messages_before = messages.lock().unwrap().len();
    let state_before = chat.state();

    assert_eq!(chat.mark_all_read(), 2);

    assert_eq!(chat.unread_count(), 0);
    assert!(chat.messages().iter().all(|m| m.read));
    assert_eq!(chat.state(), state_before);
    assert_eq!(transitions.lock().unwrap().len(), transitions_before, "No state notification");
    assert_eq!(messages.lock().unwrap().len(), messages_before, "No message notification");

    assert_eq!(chat.mark_all_read(), 0, "Nothing left to mark");
}

#[test]
fn test_clear_history() {
    let mut chat = ChatManager::new();
    let cleared = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&cleared);
    chat.on_history_cleared(move || *sink.lock().unwrap() += 1);
    let transitions = record_transitions(&mut chat);

    chat.send_message("hi").expect("Failed to send");
    chat.set_assistant_typing(true).expect("Failed to set typing");
    chat.clear_history();

    assert_eq!(chat.message_count(), 0);
    assert_eq!(chat.state(), ChatState::Idle);
    assert_eq!(chat.unread_count(), 0);
    assert!(!chat.is_typing());
    assert!(!chat.is_awaiting_response());
    assert_eq!(*cleared.lock().unwrap(), 1);
    assert_eq!(
        transitions.lock().unwrap().last(),
        Some(&(ChatState::AssistantTyping, ChatState::Idle))
    );
}

#[test]
fn test_clear_history_when_idle_fires_no_state_change() {
    let mut chat = permissive();
    let transitions = record_transitions(&mut chat);
    chat.receive_message("hello").expect("Failed to receive");
    assert_eq!(chat.unread_count(), 1);

    chat.clear_history();

    assert!(transitions.lock().unwrap().is_empty());
    assert_eq!(chat.unread_count(), 0);
}

#[test]
fn test_get_history_limit() {
    let mut chat = permissive();
    for i in 1..=5 {
        chat.receive_message(format!("m{}", i)).expect("Failed to receive");
    }

    let last_two: Vec<&str> = chat.get_history(Some(2)).iter().map(|m| m.text.as_str()).collect();
    assert_eq!(last_two, vec!["m4", "m5"]);

    assert_eq!(chat.get_history(None).len(), 5);
    assert_eq!(chat.get_history(Some(0)).len(), 5, "Zero limit returns everything");
    assert_eq!(chat.get_history(Some(50)).len(), 5);

    // Reading history does not acknowledge anything
    assert_eq!(chat.unread_count(), 5);
}

#[test]
fn test_full_conversation_cycle_follows_table() {
    let mut chat = ChatManager::new();
    let transitions = record_transitions(&mut chat);

    chat.set_user_typing(true).expect("Failed to set typing");
    assert!(chat.is_typing());
    chat.send_message("question").expect("Failed to send");
    assert!(!chat.is_user_typing());
    chat.set_assistant_typing(true).expect("Failed to set typing");
    assert!(chat.is_assistant_typing());
    chat.receive_message("answer").expect("Failed to receive");
    assert!(!chat.is_typing());

    use ChatState::*;
    assert_eq!(
        *transitions.lock().unwrap(),
        vec![
            (Idle, UserTyping),
            (UserTyping, Sending),
            (Sending, WaitingResponse),
            (WaitingResponse, AssistantTyping),
            (AssistantTyping, Idle),
        ]
    );
    for (from, to) in transitions.lock().unwrap().iter() {
        assert!(from.can_transition_to(*to));
    }
}

#[test]
fn test_typing_cleared_returns_to_idle() {
    let mut chat = ChatManager::new();

    chat.set_user_typing(true).expect("Failed to set typing");
    assert_eq!(chat.state(), ChatState::UserTyping);
    chat.set_user_typing(false).expect("Failed to clear typing");
    assert_eq!(chat.state(), ChatState::Idle);
    assert!(!chat.is_typing());
}

#[test]
fn test_assistant_typing_cleared_while_reply_pending() {
    let mut chat = ChatManager::new();
    chat.send_message("hi").expect("Failed to send");
    chat.set_assistant_typing(true).expect("Failed to set typing");

    chat.set_assistant_typing(false).expect("Failed to clear typing");

    assert_eq!(chat.state(), ChatState::WaitingResponse);
    assert!(chat.is_awaiting_response());
}

#[test]
fn test_repeated_typing_flag_is_noop() {
    let mut chat = ChatManager::new();
    let transitions = record_transitions(&mut chat);

    chat.set_user_typing(true).expect("Failed to set typing");
    chat.set_user_typing(true).expect("Failed to set typing");
    chat.set_assistant_typing(false).expect("Failed to clear typing");

    assert_eq!(transitions.lock().unwrap().len(), 1);
}

#[test]
fn test_strict_rejects_send_while_waiting() {
    let mut chat = ChatManager::new();
    chat.send_message("first").expect("Failed to send");
    let transitions = record_transitions(&mut chat);

    let err = chat.send_message("second").unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidState {
            from: ChatState::WaitingResponse,
            to: ChatState::Sending
        }
    ));
    assert_eq!(chat.message_count(), 1);
    assert_eq!(chat.state(), ChatState::WaitingResponse);
    assert!(transitions.lock().unwrap().is_empty());
}

#[test]
fn test_strict_rejects_typing_outside_table() {
    let mut chat = ChatManager::new();

    // Assistant cannot start typing with nothing to answer
    assert!(matches!(
        chat.set_assistant_typing(true),
        Err(Error::InvalidState { .. })
    ));
    assert!(!chat.is_assistant_typing(), "Flag unchanged on failure");
    assert_eq!(chat.state(), ChatState::Idle);

    chat.send_message("hi").expect("Failed to send");
    // User cannot start typing while the reply is outstanding
    assert!(matches!(chat.set_user_typing(true), Err(Error::InvalidState { .. })));
    assert!(!chat.is_user_typing());
    assert_eq!(chat.state(), ChatState::WaitingResponse);
}

#[test]
fn test_permissive_follows_latest_typing_flag() {
    let mut chat = permissive();
    chat.send_message("hi").expect("Failed to send");

    chat.set_user_typing(true).expect("Failed to set typing");
    assert_eq!(chat.state(), ChatState::UserTyping);
    chat.set_assistant_typing(true).expect("Failed to set typing");
    assert_eq!(chat.state(), ChatState::AssistantTyping);
    chat.set_assistant_typing(false).expect("Failed to clear typing");
    assert_eq!(chat.state(), ChatState::UserTyping, "User still typing");
    chat.set_user_typing(false).expect("Failed to clear typing");
    assert_eq!(chat.state(), ChatState::WaitingResponse, "Reply still pending");

    chat.send_message("again").expect("Permissive mode allows a second send");
    assert_eq!(chat.message_count(), 2);
}

#[test]
fn test_receive_without_send_stays_idle() {
    let mut chat = ChatManager::new();
    let transitions = record_transitions(&mut chat);

    chat.receive_message("unsolicited").expect("Failed to receive");

    assert_eq!(chat.state(), ChatState::Idle);
    assert!(transitions.lock().unwrap().is_empty());
    assert_eq!(chat.unread_count(), 1);
}

#[test]
fn test_get_message_by_id() {
    let mut chat = ChatManager::new();
    let sent = chat.send_message("find me").expect("Failed to send");

    assert_eq!(chat.get_message(sent.id), Some(&sent));
    assert!(chat.get_message(sent.id + 1).is_none());
}
