use chrono::{DateTime, Duration, Utc};
use folio_common::types::{PublicationStatus, Text};
use uuid::Uuid;

use super::{char_len, check_status, ValidationReport};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 5000;
pub const SHORT_CONTENT_CHARS: usize = 10;
pub const STALE_TEXT_DAYS: i64 = 30;

/// Candidate fields for a new text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDraft<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub status: Option<&'a str>,
}

/// Candidate changes to an existing text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChanges<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub status: Option<&'a str>,
    pub workspace_id: Option<Uuid>,
    pub created_by: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Content,
}

impl TextField {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
        }
    }

    pub const fn max_chars(self) -> usize {
        match self {
            Self::Title => MAX_TITLE_CHARS,
            Self::Content => MAX_CONTENT_CHARS,
        }
    }
}

/// Check one text field against its length cap.
pub fn validate_text_length(value: &str, field: TextField) -> Result<(), String> {
    if char_len(value) > field.max_chars() {
        return Err(format!("{} must be at most {} characters", field.name(), field.max_chars()));
    }
    Ok(())
}

pub fn validate_text_data(draft: &TextDraft<'_>) -> ValidationReport {
    let mut report = ValidationReport::new();

    match draft.content {
        Some(content) if !content.trim().is_empty() => {
            if let Err(message) = validate_text_length(content, TextField::Content) {
                report.error(message);
            }
            if char_len(content.trim()) < SHORT_CONTENT_CHARS {
                report.warn("content is very short");
            }
        }
        _ => report.error("content is required"),
    }

    match draft.title {
        Some(title) if !title.trim().is_empty() => {
            if let Err(message) = validate_text_length(title, TextField::Title) {
                report.error(message);
            }
        }
        _ => report.warn("a title is recommended"),
    }

    check_status(&mut report, draft.status);
    report
}

pub fn validate_text_update(existing: &Text, changes: &TextChanges<'_>) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Some(content) = changes.content {
        if content.trim().is_empty() {
            report.error("content must not be empty");
        } else if let Err(message) = validate_text_length(content, TextField::Content) {
            report.error(message);
        } else if char_len(content.trim()) < SHORT_CONTENT_CHARS {
            report.warn("content is very short");
        }
    }

    if let Some(title) = changes.title {
        if let Err(message) = validate_text_length(title, TextField::Title) {
            report.error(message);
        }
    }

    check_status(&mut report, changes.status);

    if changes.workspace_id.is_some_and(|workspace_id| workspace_id != existing.workspace_id) {
        report.error("workspace_id cannot be changed");
    }
    if changes.created_by.is_some_and(|created_by| created_by != existing.created_by) {
        report.error("created_by cannot be changed");
    }

    report
}

/// Advisory checks before deleting a text. Never blocks.
pub fn validate_text_deletion(text: &Text, now: DateTime<Utc>) -> ValidationReport {
    let mut report = ValidationReport::new();

    if text.status == PublicationStatus::Published {
        report.warn("text is published");
    }
    if now - text.created_at > Duration::days(STALE_TEXT_DAYS) {
        report.warn(format!("text is older than {STALE_TEXT_DAYS} days"));
    }

    report
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn existing_text() -> Text {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).single().expect("valid date");
        Text {
            id: Uuid::from_u128(1),
            workspace_id: Uuid::from_u128(10),
            title: "Notes".into(),
            content: "Some meaningful content".into(),
            status: PublicationStatus::Draft,
            created_by: "user-1".into(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn missing_or_blank_content_is_rejected() {
        let report = validate_text_data(&TextDraft { title: Some("Demo"), ..Default::default() });
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["content is required"]);

        let report = validate_text_data(&TextDraft { content: Some("   "), ..Default::default() });
        assert!(report.has_error_containing("content is required"));
    }

    #[test]
    fn demo_payload_is_valid() {
        let report = validate_text_data(&TextDraft {
            title: Some("Demo"),
            content: Some("Hello world"),
            status: None,
        });
        assert!(report.valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn over_long_fields_are_rejected() {
        let content = "a".repeat(MAX_CONTENT_CHARS + 1);
        let title = "t".repeat(MAX_TITLE_CHARS + 1);
        let report = validate_text_data(&TextDraft {
            title: Some(&title),
            content: Some(&content),
            status: None,
        });
        assert_eq!(
            report.errors,
            vec!["content must be at most 5000 characters", "title must be at most 200 characters"]
        );
    }

    #[test]
    fn short_content_and_missing_title_warn() {
        let report = validate_text_data(&TextDraft { content: Some("hi"), ..Default::default() });
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["content is very short", "a title is recommended"]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let report = validate_text_data(&TextDraft {
            title: Some("Demo"),
            content: Some("Hello world"),
            status: Some("deleted"),
        });
        assert!(report.has_error_containing("status must be one of"));
    }

    #[test]
    fn update_relaxes_required_fields() {
        let report = validate_text_update(&existing_text(), &TextChanges::default());
        assert!(report.valid);

        let report = validate_text_update(
            &existing_text(),
            &TextChanges { status: Some("published"), ..Default::default() },
        );
        assert!(report.valid);
    }

    #[test]
    fn update_rejects_blank_content_when_present() {
        let report = validate_text_update(
            &existing_text(),
            &TextChanges { content: Some(""), ..Default::default() },
        );
        assert_eq!(report.errors, vec!["content must not be empty"]);
    }

    #[test]
    fn update_rejects_immutable_field_changes() {
        let existing = existing_text();
        let report = validate_text_update(
            &existing,
            &TextChanges {
                workspace_id: Some(Uuid::from_u128(99)),
                created_by: Some("someone-else"),
                ..Default::default()
            },
        );
        assert_eq!(
            report.errors,
            vec!["workspace_id cannot be changed", "created_by cannot be changed"]
        );

        let unchanged = validate_text_update(
            &existing,
            &TextChanges {
                workspace_id: Some(existing.workspace_id),
                created_by: Some("user-1"),
                ..Default::default()
            },
        );
        assert!(unchanged.valid);
    }

    #[test]
    fn deletion_warns_for_published_and_stale_texts() {
        let mut text = existing_text();
        let now = text.created_at + Duration::days(1);
        assert!(validate_text_deletion(&text, now).warnings.is_empty());

        text.status = PublicationStatus::Published;
        let report = validate_text_deletion(&text, text.created_at + Duration::days(45));
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["text is published", "text is older than 30 days"]);
    }

    #[test]
    fn length_helper_reports_field_name() {
        assert!(validate_text_length("short", TextField::Title).is_ok());
        assert_eq!(
            validate_text_length(&"x".repeat(201), TextField::Title),
            Err("title must be at most 200 characters".to_owned())
        );
    }

    proptest! {
        #[test]
        fn any_content_within_bounds_validates(
            content in "[a-zA-Z0-9][a-zA-Z0-9 .,!?]{0,4999}",
            title in proptest::option::of("[a-zA-Z ]{0,200}"),
        ) {
            let report = validate_text_data(&TextDraft {
                title: title.as_deref(),
                content: Some(&content),
                status: None,
            });
            prop_assert!(report.valid, "errors: {:?}", report.errors);
        }

        #[test]
        fn content_over_limit_never_validates(extra in 1usize..64) {
            let content = "é".repeat(MAX_CONTENT_CHARS + extra);
            let report = validate_text_data(&TextDraft {
                title: Some("Title"),
                content: Some(&content),
                status: None,
            });
            prop_assert!(!report.valid);
        }
    }
}
