//! Simulated users driving the demo bot end to end

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use teloxide_testkit::factories::sent_message;
use teloxide_testkit::{CallKind, DiceEmoji, TestkitError, UserSpec};

#[tokio::test]
async fn test_start_command_greets_user() {
    let client = demo_client().await;
    let alice = client
        .create_user(UserSpec::default().with_first_name("Alice"))
        .expect("Failed to create user");

    let records = alice.send_command("start", None).await.expect("Dispatch failed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), CallKind::SendMessage);
    assert_eq!(records[0].chat_id(), Some(alice.chat_id()));
    assert_eq!(records[0].text(), Some("Welcome, Alice!"));
    assert_eq!(
        records[0].inline_buttons(),
        vec![
            ("Roll".to_string(), "roll".to_string()),
            ("Help".to_string(), "help".to_string())
        ]
    );
    assert!(alice.has_received_message_containing("Welcome"));
}

#[tokio::test]
async fn test_replies_are_scoped_per_user() {
    let client = demo_client().await;
    let alice = client.create_user(UserSpec::default().with_first_name("Alice")).unwrap();
    let bob = client.create_user(UserSpec::default().with_first_name("Bob")).unwrap();
    assert_ne!(alice.user_id(), bob.user_id());

    alice.send_command("start", None).await.unwrap();
    let bob_records = bob.send_message("hello").await.unwrap();

    assert_eq!(bob_records.len(), 1);
    assert_eq!(bob_records[0].text(), Some("Echo: hello"));
    assert_eq!(alice.get_sent_messages().len(), 1);
    assert_eq!(bob.get_sent_messages().len(), 1);
    assert!(!bob.has_received_message_containing("Welcome"));
    assert_eq!(client.capture().len(), 2);
}

#[tokio::test]
async fn test_echo_and_last_message() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();

    user.send_message("first").await.unwrap();
    user.send_message("second").await.unwrap();

    let last = user.get_last_message().expect("No message captured");
    assert_eq!(last.text(), Some("Echo: second"));
    assert_eq!(user.get_sent_messages().len(), 2);
}

#[tokio::test]
async fn test_click_button_answers_and_edits() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();

    let records = user.send_command("start", None).await.unwrap();
    let welcome = sent_message(&records[0]).expect("Response is not a message");

    let records = user.click_button("help", Some(&welcome)).await.unwrap();

    let kinds: Vec<CallKind> = records.iter().map(|record| record.kind()).collect();
    assert_eq!(kinds, vec![CallKind::AnswerCallbackQuery, CallKind::EditMessageText]);
    assert_eq!(records[1].message_id(), Some(welcome.id.0 as i64));
    assert_eq!(records[1].text(), Some("Use /roll to roll a dice"));
}

#[tokio::test]
async fn test_click_button_without_message() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();
    client.set_next_dice_value(3).unwrap();

    let records = user.click_button("roll", None).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[1].kind(), CallKind::SendDice);
    assert_eq!(records[1].dice_value(), Some(3));
    assert_eq!(records[2].text(), Some("You rolled 3"));
}

#[tokio::test]
async fn test_user_dice_reaches_handler() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();

    let records = user.send_dice(DiceEmoji::Darts, Some(5)).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text(), Some("Nice throw: 5"));
}

#[tokio::test]
async fn test_user_dice_value_validated() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();

    let result = user.send_dice(DiceEmoji::Basketball, Some(6)).await;

    assert_matches!(result, Err(TestkitError::InvalidOverrideValue { value: 6, max: 5, .. }));
    assert!(client.capture().is_empty());
}

#[tokio::test]
async fn test_unsupported_call_reported() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();

    let result = user.send_command("pin", None).await;

    assert_matches!(result, Err(TestkitError::UnsupportedCallKind { ref method }) if method.eq_ignore_ascii_case("pinChatMessage"));
    assert!(client.capture().is_empty());
}

#[tokio::test]
async fn test_handler_failure_propagates() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();

    let result = user.send_command("fail", None).await;

    let err = result.expect_err("Handler failure was swallowed");
    assert!(err.is_dispatch_failure());
    assert!(err.to_string().contains("command failed on purpose"));
}

#[tokio::test]
async fn test_user_in_group_chat() {
    let client = demo_client().await;
    let user = client.create_user(UserSpec::default()).unwrap();
    let group = client
        .with_factories(|factories| factories.group_chat(-100200, "Dancers"))
        .unwrap();

    let records = client.send_message("hi all", user.user(), Some(&group)).await.unwrap();

    assert_eq!(records[0].chat_id(), Some(-100200));
    assert!(user.get_sent_messages().is_empty());
}

#[tokio::test]
async fn test_change_client() {
    let first = demo_client().await;
    let second = demo_client().await;
    let mut user = first.create_user(UserSpec::default()).unwrap();

    user.change_client(second.clone());
    user.send_message("moved").await.unwrap();

    assert!(first.capture().is_empty());
    assert_eq!(second.capture().len(), 1);
}
