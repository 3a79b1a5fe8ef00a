use crate::calendar::{CalendarView, WeekStart};
use crate::diary_entry::{DiaryEntry, EntryDraft};
use crate::diary_state::{DiaryState, SnapshotMemo};
use crate::gallery::{self, GalleryView};
use crate::modal::{DiaryModal, ModalOutcome};
use crate::picker::PickOutcome;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Calendar,
    Photo,
}

/// Identifies one launch of the photo picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickRequest(u64);

#[derive(Debug)]
struct PendingPick {
    request: PickRequest,
    date: String,
}

pub struct App {
    diary: DiaryState,
    view_mode: ViewMode,
    calendar: CalendarView,
    gallery: GalleryView,
    photos: SnapshotMemo<Vec<DiaryEntry>>,
    marked: SnapshotMemo<HashMap<String, Vec<String>>>,
    modal: Option<DiaryModal>,
    pending_pick: Option<PendingPick>,
    next_request: u64,
    today: NaiveDate,
    should_quit: bool,
}

impl App {
    pub fn new(entries: Vec<DiaryEntry>, today: NaiveDate, week_start: WeekStart) -> Self {
        App {
            diary: DiaryState::new(entries),
            view_mode: ViewMode::Calendar,
            calendar: CalendarView::new(today, week_start),
            gallery: GalleryView::new(),
            photos: SnapshotMemo::new(gallery::photo_entries),
            marked: SnapshotMemo::new(DiaryState::marked_dates),
            modal: None,
            pending_pick: None,
            next_request: 0,
            today,
            should_quit: false,
        }
    }

    pub fn diary(&self) -> &DiaryState {
        &self.diary
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn calendar(&self) -> &CalendarView {
        &self.calendar
    }

    pub fn modal(&self) -> Option<&DiaryModal> {
        self.modal.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn has_pending_pick(&self) -> bool {
        self.pending_pick.is_some()
    }

    pub fn marked_dates(&mut self) -> &HashMap<String, Vec<String>> {
        self.marked.get(&self.diary)
    }

    /// Photo entries together with the gallery's selection state.
    pub fn gallery_parts(&mut self) -> (&[DiaryEntry], &mut GalleryView) {
        let photos = self.photos.get(&self.diary);
        self.gallery.clamp(photos.len());
        (photos, &mut self.gallery)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.view_mode != mode {
            tracing::debug!(?mode, "switching view");
            self.view_mode = mode;
        }
    }

    /// A tap on a calendar day or gallery card.
    pub fn open_editor(&mut self, date: &str) {
        let existing = self.diary.find_by_date(date);
        tracing::debug!(date, existing = existing.is_some(), "opening editor");
        self.modal = Some(DiaryModal::open(date, existing));
    }

    pub fn save(&mut self, draft: EntryDraft) {
        self.diary = self.diary.upsert(draft);
        self.close_editor();
    }

    pub fn delete(&mut self, date: &str) {
        self.diary = self.diary.delete_by_date(date);
        self.close_editor();
    }

    fn close_editor(&mut self) {
        self.modal = None;
        self.pending_pick = None;
    }

    /// Routes a key press. Returns a request when the photo picker should be
    /// launched; its result comes back through [`App::apply_pick`].
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PickRequest> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        if let Some(modal) = self.modal.as_mut() {
            return match modal.handle_key(key) {
                ModalOutcome::Continue => None,
                ModalOutcome::Close => {
                    self.close_editor();
                    None
                }
                ModalOutcome::Save(draft) => {
                    self.save(draft);
                    None
                }
                ModalOutcome::Delete(date) => {
                    self.delete(&date);
                    None
                }
                ModalOutcome::PickPhoto => self.start_pick(),
            };
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.set_view_mode(match self.view_mode {
                ViewMode::Calendar => ViewMode::Photo,
                ViewMode::Photo => ViewMode::Calendar,
            }),
            KeyCode::Char('c') => self.set_view_mode(ViewMode::Calendar),
            KeyCode::Char('p') => self.set_view_mode(ViewMode::Photo),
            _ => match self.view_mode {
                ViewMode::Calendar => self.handle_calendar_key(key.code),
                ViewMode::Photo => self.handle_gallery_key(key.code),
            },
        }
        None
    }

    fn handle_calendar_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.calendar.move_days(-1),
            KeyCode::Right => self.calendar.move_days(1),
            KeyCode::Up => self.calendar.move_days(-7),
            KeyCode::Down => self.calendar.move_days(7),
            KeyCode::Char('[') | KeyCode::PageUp => self.calendar.move_months(-1),
            KeyCode::Char(']') | KeyCode::PageDown => self.calendar.move_months(1),
            KeyCode::Char('t') => self.calendar.jump_to(self.today),
            KeyCode::Enter => {
                let date = self.calendar.cursor_key();
                self.open_editor(&date);
            }
            _ => {}
        }
    }

    fn handle_gallery_key(&mut self, code: KeyCode) {
        let (photos, view) = self.gallery_parts();
        let len = photos.len();
        match code {
            KeyCode::Up => view.select_previous(len),
            KeyCode::Down => view.select_next(len),
            KeyCode::Enter => {
                let date = view.selected_date(photos).map(str::to_string);
                if let Some(date) = date {
                    self.open_editor(&date);
                }
            }
            _ => {}
        }
    }

    fn start_pick(&mut self) -> Option<PickRequest> {
        let date = self.modal.as_ref()?.date().to_string();
        if self.pending_pick.is_some() {
            tracing::debug!(date, "photo picker already open");
            return None;
        }
        self.next_request += 1;
        let request = PickRequest(self.next_request);
        self.pending_pick = Some(PendingPick { request, date });
        Some(request)
    }

    /// Applies a picker result if it still belongs to the open editor.
    pub fn apply_pick(&mut self, request: PickRequest, outcome: PickOutcome) {
        let is_current = self
            .pending_pick
            .as_ref()
            .is_some_and(|pending| pending.request == request);
        let current = if is_current {
            self.pending_pick.take()
        } else {
            None
        };
        let modal = match (current, self.modal.as_mut()) {
            (Some(pending), Some(modal)) if pending.date == modal.date() => modal,
            _ => {
                tracing::debug!(?request, ?outcome, "discarding stale picker result");
                return;
            }
        };

        match outcome {
            PickOutcome::Selected(uri) => {
                tracing::info!(date = modal.date(), %uri, "photo selected");
                modal.set_photo(&uri);
            }
            PickOutcome::Cancelled => tracing::debug!("photo picker cancelled"),
            PickOutcome::Failed(reason) => tracing::warn!(%reason, "photo picker failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary_entry::builtin_seed;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_on(date: (i32, u32, u32)) -> App {
        let today = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        App::new(builtin_seed().unwrap(), today, WeekStart::Sunday)
    }

    #[test]
    fn saving_existing_date_replaces_entry() {
        let mut app = app_on((2025, 8, 15));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.modal().unwrap().activities(), ["물주기", "해충방제"]);

        // deselect 물주기 then 해충방제, select 물주기 again
        app.handle_key(key(KeyCode::Char(' ')));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Right));
        }
        app.handle_key(key(KeyCode::Char(' ')));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Left));
        }
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(ctrl('s'));

        assert!(app.modal().is_none());
        assert_eq!(app.diary().len(), 2);
        let entry = app.diary().find_by_date("2025-08-15").unwrap();
        assert_eq!(entry.id, "1");
        assert_eq!(entry.activities, vec!["물주기"]);
    }

    #[test]
    fn saving_new_date_appends_entry() {
        let mut app = app_on((2025, 9, 1));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(ctrl('s'));

        assert_eq!(app.diary().len(), 3);
        let entry = app.diary().find_by_date("2025-09-01").unwrap();
        assert_eq!(entry.id, "3");
        assert_eq!(app.marked_dates()["2025-09-01"], vec!["물주기"]);
    }

    #[test]
    fn delete_from_editor() {
        let mut app = app_on((2025, 8, 26));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(ctrl('d'));
        assert!(app.diary().find_by_date("2025-08-26").is_none());
        assert!(app.modal().is_none());
    }

    #[test]
    fn escape_discards_changes() {
        let mut app = app_on((2025, 8, 15));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char(' ')));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(
            app.diary().find_by_date("2025-08-15").unwrap().activities.len(),
            2
        );
    }

    #[test]
    fn toggling_views_keeps_calendar_position() {
        let mut app = app_on((2025, 8, 15));
        app.handle_key(key(KeyCode::Char(']')));
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view_mode(), ViewMode::Photo);
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.view_mode(), ViewMode::Calendar);
        assert_eq!(app.calendar().cursor_key(), "2025-09-15");
        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(app.calendar().cursor_key(), "2025-08-15");
    }

    #[test]
    fn gallery_enter_opens_selected_date() {
        let mut app = app_on((2025, 1, 1));
        app.handle_key(key(KeyCode::Char('p')));
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.modal().unwrap().date(), "2025-08-26");
    }

    #[test]
    fn gallery_tracks_store_changes() {
        let mut app = app_on((2025, 8, 15));
        assert_eq!(app.gallery_parts().0.len(), 2);
        app.delete("2025-08-15");
        let (photos, view) = app.gallery_parts();
        assert_eq!(photos.len(), 1);
        assert_eq!(view.selected(), Some(0));
    }

    #[test]
    fn picker_result_fills_photo_field() {
        let mut app = app_on((2025, 9, 1));
        app.handle_key(key(KeyCode::Enter));
        let request = app.handle_key(ctrl('o')).unwrap();
        assert!(app.handle_key(ctrl('o')).is_none());

        app.apply_pick(request, PickOutcome::Selected("/tmp/fern.jpg".into()));
        assert_eq!(app.modal().unwrap().photo().text(), "/tmp/fern.jpg");
        assert!(!app.has_pending_pick());

        app.handle_key(ctrl('s'));
        let (photos, _) = app.gallery_parts();
        assert_eq!(photos.last().unwrap().date, "2025-09-01");
    }

    #[test]
    fn cancelled_or_failed_pick_changes_nothing() {
        let mut app = app_on((2025, 8, 15));
        app.handle_key(key(KeyCode::Enter));
        let before = app.modal().unwrap().photo().text().to_string();

        let request = app.handle_key(ctrl('o')).unwrap();
        app.apply_pick(request, PickOutcome::Cancelled);
        let request = app.handle_key(ctrl('o')).unwrap();
        app.apply_pick(request, PickOutcome::Failed("boom".into()));

        assert_eq!(app.modal().unwrap().photo().text(), before);
    }

    #[test]
    fn late_pick_after_close_is_ignored() {
        let mut app = app_on((2025, 9, 1));
        app.handle_key(key(KeyCode::Enter));
        let request = app.handle_key(ctrl('o')).unwrap();
        app.handle_key(key(KeyCode::Esc));

        // another date is opened before the old picker answers
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Enter));
        app.apply_pick(request, PickOutcome::Selected("/tmp/late.jpg".into()));

        assert_eq!(app.modal().unwrap().date(), "2025-09-02");
        assert_eq!(app.modal().unwrap().photo().text(), "");
    }

    #[test]
    fn quit_keys() {
        let mut app = app_on((2025, 8, 15));
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit(), "q is text inside the editor");
        app.handle_key(ctrl('c'));
        assert!(app.should_quit());
    }
}
