//! Unit tests for slash command recognition.

use teledo::dispatch::commands::{parse_command, SlashCommand};

#[test]
fn add_with_inline_title() {
    assert_eq!(
        parse_command("/add Ship release"),
        Some(SlashCommand::Add {
            title: Some("Ship release".to_owned())
        })
    );
}

#[test]
fn add_without_argument() {
    assert_eq!(parse_command("/add"), Some(SlashCommand::Add { title: None }));
}

#[test]
fn commands_are_case_insensitive() {
    assert_eq!(
        parse_command("/ADD fix the build"),
        Some(SlashCommand::Add {
            title: Some("fix the build".to_owned())
        })
    );
    assert_eq!(parse_command("/Tasks"), Some(SlashCommand::Tasks));
}

#[test]
fn bot_suffix_is_tolerated() {
    assert_eq!(
        parse_command("/name@teledo_bot New title"),
        Some(SlashCommand::Name {
            value: Some("New title".to_owned())
        })
    );
}

#[test]
fn desc_accepts_both_spellings() {
    let expected = Some(SlashCommand::Desc {
        value: Some("details".to_owned()),
    });
    assert_eq!(parse_command("/des details"), expected);
    assert_eq!(parse_command("/desc details"), expected);
}

#[test]
fn time_takes_a_single_token() {
    assert_eq!(
        parse_command("/time 2026-12-31"),
        Some(SlashCommand::Time {
            value: Some("2026-12-31".to_owned())
        })
    );
    assert_eq!(parse_command("/time"), Some(SlashCommand::Time { value: None }));
    // Two tokens do not match the single-token pattern.
    assert_eq!(parse_command("/time next week"), None);
}

#[test]
fn attach_accepts_misspelling() {
    assert_eq!(parse_command("/attach"), Some(SlashCommand::Attach));
    assert_eq!(parse_command("/atach"), Some(SlashCommand::Attach));
    assert_eq!(parse_command("/attach notes.pdf"), Some(SlashCommand::Attach));
}

#[test]
fn user_with_and_without_name() {
    assert_eq!(
        parse_command("/user alice"),
        Some(SlashCommand::User {
            username: Some("alice".to_owned())
        })
    );
    assert_eq!(parse_command("/user"), Some(SlashCommand::User { username: None }));
}

#[test]
fn menu_and_help_commands() {
    assert_eq!(parse_command("/teledo"), Some(SlashCommand::Menu));
    assert_eq!(parse_command("/commands"), Some(SlashCommand::Commands));
    assert_eq!(parse_command("/menu"), Some(SlashCommand::Commands));
    assert_eq!(parse_command("/my_tasks"), Some(SlashCommand::MyTasks));
    assert_eq!(parse_command("/start"), Some(SlashCommand::Start));
}

#[test]
fn non_commands_do_not_match() {
    assert_eq!(parse_command("hello"), None);
    assert_eq!(parse_command("/unknown"), None);
    assert_eq!(parse_command("add something"), None);
    assert_eq!(parse_command(""), None);
}

#[test]
fn whitespace_only_argument_is_dropped() {
    assert_eq!(parse_command("/add    "), Some(SlashCommand::Add { title: None }));
}
