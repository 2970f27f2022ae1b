use folio_common::types::Comment;
use uuid::Uuid;

use super::{char_len, check_status, ValidationReport};

pub const MIN_COMMENT_CHARS: usize = 3;
pub const MAX_COMMENT_CHARS: usize = 2000;
pub const MAX_AUTHOR_NAME_CHARS: usize = 100;
pub const SHORT_COMMENT_CHARS: usize = 10;

/// Candidate fields for a new comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentDraft<'a> {
    pub content: Option<&'a str>,
    pub text_id: Option<Uuid>,
    pub author_id: Option<&'a str>,
    pub author_name: Option<&'a str>,
    pub status: Option<&'a str>,
    pub parent_id: Option<&'a str>,
}

/// Candidate changes to an existing comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentChanges<'a> {
    pub content: Option<&'a str>,
    pub status: Option<&'a str>,
    pub workspace_id: Option<Uuid>,
    pub text_id: Option<Uuid>,
    pub author_id: Option<&'a str>,
}

fn check_content(report: &mut ValidationReport, content: &str) {
    let trimmed = content.trim();
    if char_len(trimmed) < MIN_COMMENT_CHARS {
        report.error(format!("content must be at least {MIN_COMMENT_CHARS} characters"));
        return;
    }
    if char_len(trimmed) > MAX_COMMENT_CHARS {
        report.error(format!("content must be at most {MAX_COMMENT_CHARS} characters"));
        return;
    }
    if char_len(trimmed) < SHORT_COMMENT_CHARS {
        report.warn("content is very short");
    }
    if trimmed.contains("http") && !trimmed.contains("https") {
        report.warn("content contains non-HTTPS links");
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |value| value.trim().is_empty())
}

pub fn validate_comment_data(draft: &CommentDraft<'_>) -> ValidationReport {
    let mut report = ValidationReport::new();

    match draft.content {
        Some(content) if !content.is_empty() => check_content(&mut report, content),
        _ => report.error("content is required"),
    }

    if draft.text_id.is_none() {
        report.error("text_id is required");
    }
    if is_blank(draft.author_id) {
        report.error("author_id is required");
    }
    match draft.author_name {
        Some(name) if !name.trim().is_empty() => {
            if char_len(name) > MAX_AUTHOR_NAME_CHARS {
                report.error(format!(
                    "author_name must be at most {MAX_AUTHOR_NAME_CHARS} characters"
                ));
            }
        }
        _ => report.error("author_name is required"),
    }

    check_status(&mut report, draft.status);

    if draft.parent_id.is_some_and(|parent_id| parent_id.trim().is_empty()) {
        report.error("parent_id must not be empty");
    }

    report
}

pub fn validate_comment_update(existing: &Comment, changes: &CommentChanges<'_>) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Some(content) = changes.content {
        check_content(&mut report, content);
    }
    check_status(&mut report, changes.status);

    if changes.workspace_id.is_some_and(|workspace_id| workspace_id != existing.workspace_id) {
        report.error("workspace_id cannot be changed");
    }
    if changes.text_id.is_some_and(|text_id| text_id != existing.text_id) {
        report.error("text_id cannot be changed");
    }
    if changes.author_id.is_some_and(|author_id| author_id != existing.author_id) {
        report.error("author_id cannot be changed");
    }

    report
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use folio_common::types::PublicationStatus;
    use proptest::prelude::*;

    use super::*;

    fn draft(content: &str) -> CommentDraft<'_> {
        CommentDraft {
            content: Some(content),
            text_id: Some(Uuid::from_u128(1)),
            author_id: Some("user-1"),
            author_name: Some("Ada"),
            status: None,
            parent_id: None,
        }
    }

    fn existing_comment() -> Comment {
        Comment {
            id: Uuid::from_u128(5),
            workspace_id: Uuid::from_u128(10),
            text_id: Uuid::from_u128(1),
            content: "A thoughtful remark".into(),
            status: PublicationStatus::Published,
            author_id: "user-1".into(),
            author_name: "Ada".into(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            parent_id: None,
        }
    }

    #[test]
    fn two_letter_comment_fails_minimum_length() {
        let report = validate_comment_data(&draft("ok"));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["content must be at least 3 characters"]);
    }

    #[test]
    fn whitespace_padding_does_not_count() {
        let report = validate_comment_data(&draft("   ab   "));
        assert!(report.has_error_containing("at least 3 characters"));
    }

    #[test]
    fn over_long_comment_is_rejected() {
        let content = "a".repeat(MAX_COMMENT_CHARS + 1);
        let report = validate_comment_data(&draft(&content));
        assert_eq!(report.errors, vec!["content must be at most 2000 characters"]);
    }

    #[test]
    fn required_fields_are_reported_together() {
        let report = validate_comment_data(&CommentDraft::default());
        assert_eq!(
            report.errors,
            vec![
                "content is required",
                "text_id is required",
                "author_id is required",
                "author_name is required"
            ]
        );
    }

    #[test]
    fn author_name_is_capped() {
        let name = "n".repeat(MAX_AUTHOR_NAME_CHARS + 1);
        let report =
            validate_comment_data(&CommentDraft { author_name: Some(&name), ..draft("Nice work here") });
        assert_eq!(report.errors, vec!["author_name must be at most 100 characters"]);
    }

    #[test]
    fn blank_parent_id_is_rejected() {
        let report =
            validate_comment_data(&CommentDraft { parent_id: Some(" "), ..draft("Nice work here") });
        assert_eq!(report.errors, vec!["parent_id must not be empty"]);
    }

    #[test]
    fn short_and_insecure_links_warn() {
        let report = validate_comment_data(&draft("nice!"));
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["content is very short"]);

        let report = validate_comment_data(&draft("see http://example.com for details"));
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["content contains non-HTTPS links"]);

        let report = validate_comment_data(&draft("see https://example.com for details"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn update_checks_present_fields_only() {
        let existing = existing_comment();
        assert!(validate_comment_update(&existing, &CommentChanges::default()).valid);

        let report = validate_comment_update(
            &existing,
            &CommentChanges { content: Some("no"), ..Default::default() },
        );
        assert_eq!(report.errors, vec!["content must be at least 3 characters"]);

        let report = validate_comment_update(
            &existing,
            &CommentChanges { status: Some("archived"), ..Default::default() },
        );
        assert!(report.valid);
    }

    #[test]
    fn update_rejects_immutable_field_changes() {
        let existing = existing_comment();
        let report = validate_comment_update(
            &existing,
            &CommentChanges {
                workspace_id: Some(Uuid::from_u128(11)),
                text_id: Some(Uuid::from_u128(2)),
                author_id: Some("user-2"),
                ..Default::default()
            },
        );
        assert_eq!(
            report.errors,
            vec![
                "workspace_id cannot be changed",
                "text_id cannot be changed",
                "author_id cannot be changed"
            ]
        );
    }

    proptest! {
        #[test]
        fn trimmed_content_under_three_chars_always_fails(
            content in "[ \t]{0,4}[a-z]{1,2}[ \t]{0,4}",
        ) {
            let report = validate_comment_data(&draft(&content));
            prop_assert!(!report.valid);
            prop_assert!(report.has_error_containing("at least 3 characters"));
        }

        #[test]
        fn reasonable_comments_validate(content in "[a-zA-Z]{3}[a-zA-Z ]{0,1997}") {
            let report = validate_comment_data(&draft(&content));
            prop_assert!(report.valid, "errors: {:?}", report.errors);
        }
    }
}
