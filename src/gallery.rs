use crate::diary_entry::DiaryEntry;
use crate::diary_state::DiaryState;
use ratatui::widgets::ListState;

pub const EMPTY_ICON: &str = "📸";
pub const EMPTY_TITLE: &str = "아직 등록된 사진이 없습니다";
pub const EMPTY_HINT: &str = "캘린더에서 날짜를 선택하여 식물 사진을 추가해보세요";

/// Entries that carry a photo, in store order.
pub fn photo_entries(state: &DiaryState) -> Vec<DiaryEntry> {
    state
        .get_entries()
        .iter()
        .filter(|e| e.has_photo())
        .cloned()
        .collect()
}

/// Selection and scroll position of the gallery panel.
#[derive(Debug, Default)]
pub struct GalleryView {
    list_state: ListState,
}

impl GalleryView {
    pub fn new() -> Self {
        GalleryView::default()
    }

    pub fn list_state(&mut self) -> &mut ListState {
        &mut self.list_state
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Keeps the selection inside `len` items after the list changed.
    pub fn clamp(&mut self, len: usize) {
        match (self.list_state.selected(), len) {
            (_, 0) => self.list_state.select(None),
            (None, _) => self.list_state.select(Some(0)),
            (Some(i), len) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn select_next(&mut self, len: usize) {
        self.clamp(len);
        if let Some(i) = self.list_state.selected() {
            if i + 1 < len {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    pub fn select_previous(&mut self, len: usize) {
        self.clamp(len);
        if let Some(i) = self.list_state.selected() {
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn selected_date<'a>(&self, photos: &'a [DiaryEntry]) -> Option<&'a str> {
        self.selected()
            .and_then(|i| photos.get(i))
            .map(|e| e.date.as_str())
    }
}
