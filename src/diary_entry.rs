use serde::{Deserialize, Serialize};

/// Seed list shipped with the binary, used when no seed file is configured.
const BUILTIN_SEED: &str = include_str!("seed.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub photo_uri: Option<String>,
}

/// The candidate record of a save: everything but the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub date: String,
    pub activities: Vec<String>,
    pub memo: Option<String>,
    pub photo_uri: Option<String>,
}

impl DiaryEntry {
    pub fn from_draft(id: String, draft: EntryDraft) -> Self {
        DiaryEntry {
            id,
            date: draft.date,
            activities: draft.activities,
            memo: draft.memo,
            photo_uri: draft.photo_uri,
        }
    }

    pub fn memo(&self) -> &str {
        self.memo.as_deref().unwrap_or("")
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo_uri.as_deref().filter(|uri| !uri.is_empty())
    }

    pub fn has_photo(&self) -> bool {
        self.photo().is_some()
    }
}

impl EntryDraft {
    /// Builds a draft from raw form values; blank text fields become `None`.
    pub fn new(date: &str, activities: Vec<String>, memo: &str, photo_uri: &str) -> Self {
        EntryDraft {
            date: date.to_string(),
            activities,
            memo: non_blank(memo),
            photo_uri: non_blank(photo_uri.trim()),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn parse_entries(json: &str) -> serde_json::Result<Vec<DiaryEntry>> {
    serde_json::from_str(json)
}

pub fn builtin_seed() -> serde_json::Result<Vec<DiaryEntry>> {
    parse_entries(BUILTIN_SEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_seed_has_two_entries() {
        let seed = builtin_seed().unwrap();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed[0].date, "2025-08-15");
        assert_eq!(seed[0].activities, vec!["물주기", "해충방제"]);
        assert_eq!(seed[1].date, "2025-08-26");
        assert!(seed.iter().all(DiaryEntry::has_photo));
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let entries = parse_entries(r#"[{"id": "7", "date": "2025-01-02"}]"#).unwrap();
        assert!(entries[0].activities.is_empty());
        assert_eq!(entries[0].memo(), "");
        assert!(!entries[0].has_photo());
    }

    #[test]
    fn empty_photo_uri_is_not_a_photo() {
        let entries =
            parse_entries(r#"[{"id": "1", "date": "2025-01-02", "photoUri": ""}]"#).unwrap();
        assert_eq!(entries[0].photo(), None);
    }

    #[test]
    fn draft_normalises_blank_fields() {
        let draft = EntryDraft::new("2025-09-01", vec!["물주기".into()], "  ", "");
        assert_eq!(draft.memo, None);
        assert_eq!(draft.photo_uri, None);

        let draft = EntryDraft::new("2025-09-01", vec![], "잘 자람", " /tmp/a.jpg ");
        assert_eq!(draft.memo.as_deref(), Some("잘 자람"));
        assert_eq!(draft.photo_uri.as_deref(), Some("/tmp/a.jpg"));
    }
}
