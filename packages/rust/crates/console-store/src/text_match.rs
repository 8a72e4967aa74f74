//! Free-text query matching shared by the text filter and the search index.
//!
//! Query syntax:
//! - empty: matches everything
//! - leading `-` followed by a term: exclude mode, the final answer is
//!   inverted; a lone `-` is a literal search for a dash
//! - `/pattern/`: case-insensitive regular expression; a pattern that fails to
//!   compile is matched literally, slashes included
//! - anything else: case-insensitive substring
//!
//! Fields are tried in a fixed order and the first hit short-circuits:
//! parameters (through object previews), frame, network request, stack frames,
//! message text, notes, prefix.

use std::collections::HashSet;

use console_types::{Message, ObjectId, ObjectPreviews, Value};
use regex::{Regex, RegexBuilder};

use crate::observability::StoreEvent;

#[derive(Debug, Clone)]
enum Matcher {
    All,
    Regex(Regex),
    Literal(String),
}

/// Parsed query.
#[derive(Debug, Clone)]
pub struct TextQuery {
    raw: String,
    exclude: bool,
    matcher: Matcher,
}

impl TextQuery {
    /// Parse a query string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (exclude, term) = match trimmed.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, trimmed),
        };
        if term.is_empty() {
            return Self {
                raw: raw.to_string(),
                exclude: false,
                matcher: Matcher::All,
            };
        }
        Self {
            raw: raw.to_string(),
            exclude,
            matcher: Self::term_matcher(term),
        }
    }

    fn term_matcher(term: &str) -> Matcher {
        if let Some(pattern) = term
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
            .filter(|pattern| !pattern.is_empty())
        {
            match RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
            {
                Ok(regex) => return Matcher::Regex(regex),
                Err(error) => {
                    tracing::debug!(
                        event = StoreEvent::RegexQueryRejected.as_str(),
                        pattern,
                        error = %error,
                        "regex query failed to compile; matching literally"
                    );
                }
            }
        }
        Matcher::Literal(term.to_lowercase())
    }

    /// The query as typed.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the query matches everything.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        matches!(self.matcher, Matcher::All)
    }

    /// Whether the query is in exclude mode.
    #[must_use]
    pub fn is_exclude(&self) -> bool {
        self.exclude
    }

    /// Final verdict for a message, exclusion applied.
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        match self.matcher {
            Matcher::All => true,
            _ => self.hits(message) != self.exclude,
        }
    }

    fn test(&self, haystack: &str) -> bool {
        match &self.matcher {
            Matcher::All => true,
            Matcher::Regex(regex) => regex.is_match(haystack),
            Matcher::Literal(needle) => haystack.to_lowercase().contains(needle.as_str()),
        }
    }

    fn hits(&self, message: &Message) -> bool {
        let mut visited = HashSet::new();
        if message
            .parameters
            .iter()
            .any(|value| self.value_hits(value, &message.previews, &mut visited))
        {
            return true;
        }
        if message
            .frame
            .as_ref()
            .is_some_and(|frame| self.test(&frame.to_string()))
        {
            return true;
        }
        if message
            .request
            .as_ref()
            .is_some_and(|request| self.test(&format!("{} {}", request.method, request.url)))
        {
            return true;
        }
        if message
            .stacktrace
            .iter()
            .any(|frame| self.test(&frame.to_string()))
        {
            return true;
        }
        if self.test(&message.message_text) {
            return true;
        }
        if message.notes.iter().any(|note| {
            note.frame
                .as_ref()
                .is_some_and(|frame| self.test(&frame.to_string()))
                || self.test(&note.body)
        }) {
            return true;
        }
        message
            .prefix
            .as_deref()
            .is_some_and(|prefix| self.test(prefix))
    }

    fn value_hits<'a>(
        &self,
        value: &'a Value,
        previews: &'a ObjectPreviews,
        visited: &mut HashSet<&'a ObjectId>,
    ) -> bool {
        match value {
            Value::Undefined => self.test("undefined"),
            Value::Null => self.test("null"),
            Value::Bool(flag) => self.test(if *flag { "true" } else { "false" }),
            Value::Number(number) => self.test(&number.to_string()),
            Value::String(text) | Value::BigInt(text) | Value::Symbol(text) => self.test(text),
            Value::Object(id) => {
                if !visited.insert(id) {
                    return false;
                }
                let Some(preview) = previews.get(id) else {
                    return false;
                };
                self.test(&preview.class_name)
                    || preview.properties.iter().any(|property| {
                        self.test(&property.name)
                            || self.value_hits(&property.value, previews, visited)
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_types::{
        ConsoleCall, Frame, Level, MessageDraft, MessageId, MessageKind, MessageSource,
        NetworkRequest, ObjectPreview, Property,
    };

    fn message(text: &str) -> Message {
        let draft = MessageDraft::new(
            MessageKind::ConsoleLog {
                call: ConsoleCall::Log,
            },
            Level::Log,
            MessageSource::ConsoleApi,
            text,
        );
        Message::from_draft(MessageId(1), draft, None)
    }

    #[test]
    fn substring_is_case_insensitive() {
        let query = TextQuery::parse("ERROR");
        assert!(query.matches(&message("fatal error")));
        assert!(!query.matches(&message("ok")));
    }

    #[test]
    fn exclude_inverts() {
        let query = TextQuery::parse("-error");
        assert!(!query.matches(&message("fatal error")));
        assert!(query.matches(&message("ok")));
        assert!(query.is_exclude());
    }

    #[test]
    fn empty_query_passes_through() {
        assert!(TextQuery::parse("").is_pass_through());
        assert!(TextQuery::parse("   ").matches(&message("anything")));
    }

    #[test]
    fn lone_dash_searches_for_a_dash() {
        let query = TextQuery::parse("-");
        assert!(!query.is_pass_through());
        assert!(!query.is_exclude());
        assert!(query.matches(&message("a - b")));
        assert!(!query.matches(&message("plain")));
    }

    #[test]
    fn regex_queries() {
        let query = TextQuery::parse("/^fa.al/");
        assert!(query.matches(&message("FATAL error")));
        assert!(!query.matches(&message("not fatal")));
    }

    #[test]
    fn broken_regex_matches_literally() {
        let query = TextQuery::parse("/a(b/");
        assert!(!query.is_pass_through());
        assert!(!query.matches(&message("ab")));
        assert!(query.matches(&message("path /a(b/ here")));
    }

    #[test]
    fn frame_and_request_are_searched() {
        let mut msg = message("plain");
        msg.frame = Some(Frame {
            function_name: Some("handler".to_string()),
            source: "app.js".to_string(),
            line: 3,
            column: 9,
        });
        assert!(TextQuery::parse("app.js:3:9").matches(&msg));

        let mut msg = message("plain");
        msg.request = Some(NetworkRequest {
            method: "POST".to_string(),
            url: "https://api.test/login".to_string(),
        });
        assert!(TextQuery::parse("post https").matches(&msg));
    }

    #[test]
    fn self_referential_previews_terminate() {
        let id = ObjectId("o1".to_string());
        let mut msg = message("plain");
        msg.parameters = vec![Value::Object(id.clone())];
        msg.previews.insert(
            id.clone(),
            ObjectPreview {
                id: id.clone(),
                class_name: "Node".to_string(),
                properties: vec![
                    Property {
                        name: "next".to_string(),
                        value: Value::Object(id.clone()),
                    },
                    Property {
                        name: "label".to_string(),
                        value: Value::String("needle".to_string()),
                    },
                ],
            },
        );
        assert!(TextQuery::parse("needle").matches(&msg));
        assert!(!TextQuery::parse("haystack").matches(&msg));
    }
}
