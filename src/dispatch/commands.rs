//! Slash command recognition.
//!
//! Commands are matched by regex, case-insensitively, with an optional
//! `@botname` suffix. Several commands take their argument inline; when
//! it is absent the handler falls back to the text of the replied-to
//! message (the reply-sourced argument pattern).

use std::sync::OnceLock;

use regex::Regex;

/// A recognized slash command with its inline argument, when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// `/add [title]` — create a task.
    Add {
        /// Inline title, if supplied.
        title: Option<String>,
    },
    /// `/tasks` — browse and manage all tasks.
    Tasks,
    /// `/user [name]` — assign a user to a task.
    User {
        /// Inline display name, if supplied.
        username: Option<String>,
    },
    /// `/name [title]` — rename a task via deferred selection.
    Name {
        /// Inline new title, if supplied.
        value: Option<String>,
    },
    /// `/des [text]` — change a description via deferred selection.
    Desc {
        /// Inline new description, if supplied.
        value: Option<String>,
    },
    /// `/time [date]` — set a deadline via deferred selection.
    Time {
        /// Inline date string, if supplied.
        value: Option<String>,
    },
    /// `/attach` — attach the replied-to message's media.
    Attach,
    /// `/my_tasks` — the actor's assigned tasks.
    MyTasks,
    /// `/teledo` — open the main menu.
    Menu,
    /// `/commands` — help text.
    Commands,
    /// `/start` — register and open the main menu.
    Start,
}

struct Pattern {
    regex: Regex,
    build: fn(Option<&str>) -> SlashCommand,
}

fn patterns() -> &'static Vec<Pattern> {
    static PATTERNS: OnceLock<Vec<Pattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let entry = |raw: &str, build: fn(Option<&str>) -> SlashCommand| {
            // The patterns are fixed literals; compilation cannot fail.
            #[allow(clippy::unwrap_used)]
            let regex = Regex::new(raw).unwrap();
            Pattern { regex, build }
        };
        vec![
            entry(r"(?i)^/add(?:@\w+)?(?:\s+(.+))?$", |arg| SlashCommand::Add {
                title: arg.map(str::to_owned),
            }),
            entry(r"(?i)^/tasks(?:@\w+)?$", |_| SlashCommand::Tasks),
            entry(r"(?i)^/user(?:@\w+)?(?:\s+(.+))?$", |arg| SlashCommand::User {
                username: arg.map(str::to_owned),
            }),
            entry(r"(?i)^/name(?:@\w+)?(?:\s+(.+))?$", |arg| SlashCommand::Name {
                value: arg.map(str::to_owned),
            }),
            entry(r"(?i)^/(?:des|desc)(?:@\w+)?(?:\s+(.+))?$", |arg| SlashCommand::Desc {
                value: arg.map(str::to_owned),
            }),
            entry(r"(?i)^/time(?:@\w+)?(?:\s+(\S+))?$", |arg| SlashCommand::Time {
                value: arg.map(str::to_owned),
            }),
            // Accept the common misspelling too.
            entry(r"(?i)^/(?:attach|atach)(?:@\w+)?(?:\s+.+)?$", |_| SlashCommand::Attach),
            entry(r"(?i)^/my_tasks(?:@\w+)?$", |_| SlashCommand::MyTasks),
            entry(r"(?i)^/teledo(?:@\w+)?$", |_| SlashCommand::Menu),
            entry(r"(?i)^/(?:commands|menu)(?:@\w+)?$", |_| SlashCommand::Commands),
            entry(r"(?i)^/start(?:@\w+)?$", |_| SlashCommand::Start),
        ]
    })
}

/// Parse a message text as a slash command, if it is one.
#[must_use]
pub fn parse_command(text: &str) -> Option<SlashCommand> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }
    for pattern in patterns() {
        if let Some(captures) = pattern.regex.captures(trimmed) {
            let arg = captures.get(1).map(|m| m.as_str().trim());
            return Some((pattern.build)(arg.filter(|a| !a.is_empty())));
        }
    }
    None
}
