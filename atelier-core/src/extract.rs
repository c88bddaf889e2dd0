//! Artifact extraction from the conversation log
//!
//! The deployable artifact is never stored on its own: it is reassembled on
//! demand by collecting every fenced ```html block authored by the Software
//! Engineer, in textual order within each message and log order across
//! messages.

use crate::chat::{ConversationLog, Role};

const OPEN_FENCE: &str = "```html";
const CLOSE_FENCE: &str = "```";

/// Extract the concatenated HTML artifact authored by the given role
///
/// Fenced segments are joined with a newline. Messages without a fenced
/// segment contribute nothing, and an empty result means "nothing to
/// publish", not an error. The function is pure over the log, so repeated
/// extraction always yields the same text.
pub fn extract(log: &ConversationLog, author: Role) -> String {
    let mut blocks = Vec::new();

    for message in log.messages().iter().filter(|m| m.role == author) {
        collect_blocks(&message.content, &mut blocks);
    }

    blocks.join("\n")
}

/// Extract the artifact from the Software Engineer's messages
pub fn extract_artifact(log: &ConversationLog) -> String {
    extract(log, Role::SoftwareEngineer)
}

/// Collect all complete fenced blocks from one message body
///
/// The opening marker is matched case-insensitively and may carry trailing
/// whitespace before the content. An opening fence with no matching close
/// is skipped entirely rather than partially extracted.
fn collect_blocks(content: &str, out: &mut Vec<String>) {
    let bytes = content.as_bytes();
    let mut cursor = 0;

    while let Some(open) = find_ascii_ci(bytes, OPEN_FENCE.as_bytes(), cursor) {
        let start = open + OPEN_FENCE.len();
        match find_ascii_ci(bytes, CLOSE_FENCE.as_bytes(), start) {
            Some(close) => {
                // The fence markers are ASCII, so these offsets sit on
                // UTF-8 boundaries.
                out.push(content[start..close].trim().to_string());
                cursor = close + CLOSE_FENCE.len();
            }
            // Unterminated fence: nothing more to extract from this message
            None => break,
        }
    }
}

/// Find `needle` in `haystack` at or after `from`, ignoring ASCII case
fn find_ascii_ci(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() || from > haystack.len() - needle.len() {
        return None;
    }

    (from..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Message;

    fn log_with(contents: &[(Role, &str)]) -> ConversationLog {
        let mut log = ConversationLog::new();
        for (role, content) in contents {
            log.append(Message::new(*role, *content));
        }
        log
    }

    #[test]
    fn test_extract_single_block() {
        let log = log_with(&[
            (Role::User, "build a counter app"),
            (
                Role::SoftwareEngineer,
                "Here you go:\n```html\n<html>counter</html>\n```\nLet me know.",
            ),
        ]);

        assert_eq!(extract_artifact(&log), "<html>counter</html>");
    }

    #[test]
    fn test_extract_joins_blocks_in_log_order() {
        let log = log_with(&[
            (Role::SoftwareEngineer, "```html\n<header/>\n```"),
            (Role::ProductOwner, "Needs a footer too."),
            (Role::SoftwareEngineer, "```html\n<footer/>\n```"),
        ]);

        assert_eq!(extract_artifact(&log), "<header/>\n<footer/>");
    }

    #[test]
    fn test_multiple_blocks_within_one_message() {
        let log = log_with(&[(
            Role::SoftwareEngineer,
            "Page: ```html\n<main/>\n``` and styles: ```HTML\n<style/>\n```",
        )]);

        assert_eq!(extract_artifact(&log), "<main/>\n<style/>");
    }

    #[test]
    fn test_other_roles_ignored() {
        let log = log_with(&[
            (Role::BusinessAnalyst, "```html\n<plan/>\n```"),
            (Role::ProductOwner, "```html\n<review/>\n```"),
        ]);

        assert!(extract_artifact(&log).is_empty());
    }

    #[test]
    fn test_no_fences_returns_empty() {
        let log = log_with(&[(Role::SoftwareEngineer, "I will write the code next turn.")]);
        assert!(extract_artifact(&log).is_empty());
    }

    #[test]
    fn test_unterminated_fence_skipped() {
        let log = log_with(&[
            (Role::SoftwareEngineer, "```html\n<html>half finished"),
            (
                Role::SoftwareEngineer,
                "Complete version:\n```html\n<html>done</html>\n```",
            ),
        ]);

        // Only the complete block from the later message is extracted
        assert_eq!(extract_artifact(&log), "<html>done</html>");
    }

    #[test]
    fn test_case_insensitive_open_fence() {
        let log = log_with(&[(Role::SoftwareEngineer, "```HTML\n<html/>\n```")]);
        assert_eq!(extract_artifact(&log), "<html/>");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let log = log_with(&[(Role::SoftwareEngineer, "```html\n<html/>\n```")]);
        assert_eq!(extract_artifact(&log), extract_artifact(&log));
    }

    #[test]
    fn test_empty_block() {
        let log = log_with(&[(Role::SoftwareEngineer, "```html\n```")]);
        assert_eq!(extract_artifact(&log), "");
    }

    #[test]
    fn test_multibyte_content_around_fences() {
        let log = log_with(&[(
            Role::SoftwareEngineer,
            "Voilà — ✨ \n```html\n<html>café</html>\n``` 終わり",
        )]);

        assert_eq!(extract_artifact(&log), "<html>café</html>");
    }
}
