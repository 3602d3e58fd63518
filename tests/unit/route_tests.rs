//! Unit tests for message route selection precedence.

use teledo::dispatch::commands::SlashCommand;
use teledo::dispatch::{route_message, Route};
use teledo::state::{Flow, MessageRef};
use teledo::texts;

fn waiting_for_name() -> Flow {
    Flow::WaitingForName {
        task_id: 1,
        origin: MessageRef {
            chat_id: 1,
            message_id: 1,
        },
    }
}

#[test]
fn plain_command_routes_to_command() {
    assert_eq!(
        route_message(Some("/tasks"), false, None),
        Route::Command(SlashCommand::Tasks)
    );
}

#[test]
fn active_flow_intercepts_command_looking_text() {
    // State-bound handlers win over the command matcher.
    assert_eq!(
        route_message(Some("/add something"), false, Some(&waiting_for_name())),
        Route::FlowText
    );
}

#[test]
fn cancel_wins_over_the_flow() {
    assert_eq!(
        route_message(Some(texts::CANCEL_LABEL), false, Some(&waiting_for_name())),
        Route::Cancel
    );
    assert_eq!(
        route_message(
            Some(texts::CANCEL_LABEL),
            false,
            Some(&Flow::CollectingAttachments { task_id: 2 })
        ),
        Route::Cancel
    );
}

#[test]
fn cancel_label_without_flow_is_ignored() {
    assert_eq!(route_message(Some(texts::CANCEL_LABEL), false, None), Route::Ignore);
}

#[test]
fn collection_mode_captures_media() {
    assert_eq!(
        route_message(None, true, Some(&Flow::CollectingAttachments { task_id: 2 })),
        Route::FlowMedia
    );
}

#[test]
fn collection_mode_captures_plain_text() {
    assert_eq!(
        route_message(
            Some("meeting notes"),
            false,
            Some(&Flow::CollectingAttachments { task_id: 2 })
        ),
        Route::FlowText
    );
}

#[test]
fn collection_mode_lets_commands_through() {
    assert_eq!(
        route_message(
            Some("/tasks"),
            false,
            Some(&Flow::CollectingAttachments { task_id: 2 })
        ),
        Route::Command(SlashCommand::Tasks)
    );
}

#[test]
fn menu_text_routes_to_menu() {
    let route = route_message(Some(texts::MENU_MY_TASKS), false, None);
    assert!(matches!(route, Route::Menu(_)));
}

#[test]
fn menu_text_is_not_captured_by_collection_mode() {
    let route = route_message(
        Some(texts::MENU_MANAGE_TASKS),
        false,
        Some(&Flow::CollectingAttachments { task_id: 2 }),
    );
    assert!(matches!(route, Route::Menu(_)));
}

#[test]
fn unmatched_text_is_ignored() {
    assert_eq!(route_message(Some("random chatter"), false, None), Route::Ignore);
    assert_eq!(route_message(None, false, None), Route::Ignore);
}

#[test]
fn media_without_collection_mode_is_ignored() {
    assert_eq!(route_message(None, true, None), Route::Ignore);
}
