//! Inline-button payload wire format.
//!
//! Payloads are ASCII strings of `|`-separated fields; the first field is
//! the action tag, the rest are positional arguments. This is the de facto
//! wire format between the bot's own messages and itself — delimiter and
//! field order must stay stable for buttons on old messages to keep
//! working.

/// Field delimiter inside callback payloads.
pub const DELIMITER: char = '|';

/// A parsed inline-button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackPayload {
    /// Action tag — the first field.
    pub action: String,
    /// Positional arguments after the action tag.
    pub args: Vec<String>,
}

impl CallbackPayload {
    /// Split a raw payload into action and positional arguments.
    ///
    /// Returns `None` for an empty payload or an empty action tag;
    /// argument arity is the handler's business.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut fields = raw.split(DELIMITER);
        let action = fields.next()?;
        if action.is_empty() {
            return None;
        }
        Some(Self {
            action: action.to_owned(),
            args: fields.map(str::to_owned).collect(),
        })
    }

    /// Encode an action and arguments into the wire form.
    #[must_use]
    pub fn encode(action: &str, args: &[&str]) -> String {
        let mut out = action.to_owned();
        for arg in args {
            out.push(DELIMITER);
            out.push_str(arg);
        }
        out
    }

    /// Positional argument by index.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Positional argument parsed as a numeric id.
    #[must_use]
    pub fn id_arg(&self, index: usize) -> Option<i64> {
        self.arg(index)?.parse().ok()
    }
}
