use crate::activity::ALL_ACTIVITIES;
use crate::diary_entry::{DiaryEntry, EntryDraft};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Activities,
    Photo,
    Memo,
}

impl Field {
    fn next(self) -> Field {
        match self {
            Field::Activities => Field::Photo,
            Field::Photo => Field::Memo,
            Field::Memo => Field::Activities,
        }
    }

    fn previous(self) -> Field {
        match self {
            Field::Activities => Field::Memo,
            Field::Photo => Field::Activities,
            Field::Memo => Field::Photo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    Continue,
    Close,
    Save(EntryDraft),
    Delete(String),
    PickPhoto,
}

/// Single- or multi-line text with a cursor counted in chars.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(text: &str) -> Self {
        TextInput {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn set(&mut self, text: &str) {
        *self = TextInput::new(text);
    }

    /// Splits the text into rows at most `width` cells wide, breaking at
    /// newlines and where a row fills up. Also returns the cursor's
    /// (row, column), column in terminal cells.
    pub fn wrapped(&self, width: usize) -> (Vec<String>, (usize, usize)) {
        let width = width.max(2);
        let mut rows = Vec::new();
        let mut row = String::new();
        let mut used = 0;
        let mut cursor = None;
        for (i, c) in self.text.chars().enumerate() {
            let w = c.width().unwrap_or(0);
            if c != '\n' && used + w > width {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            if i == self.cursor {
                cursor = Some((rows.len(), used));
            }
            if c == '\n' {
                rows.push(std::mem::take(&mut row));
                used = 0;
            } else {
                row.push(c);
                used += w;
            }
        }
        let cursor = match cursor {
            Some(cell) => cell,
            // a cursor past a full row starts the next one
            None if used >= width => {
                rows.push(std::mem::take(&mut row));
                (rows.len(), 0)
            }
            None => (rows.len(), used),
        };
        rows.push(row);
        (rows, cursor)
    }

    /// The slice of a one-line text that fits `width` cells with the cursor
    /// in view, and the cursor column within it.
    pub fn window(&self, width: usize) -> (String, usize) {
        let width = width.max(2);
        let cells = |c: &char| c.width().unwrap_or(0);
        let chars: Vec<char> = self.text.chars().collect();
        let mut start = 0;
        let mut column: usize = chars[..self.cursor].iter().map(cells).sum();
        while column >= width {
            column -= cells(&chars[start]);
            start += 1;
        }
        let mut used = 0;
        let visible = chars[start..]
            .iter()
            .take_while(|c| {
                used += cells(c);
                used <= width
            })
            .collect();
        (visible, column)
    }

    /// Applies an editing key. Returns false for keys it does not handle.
    fn edit(&mut self, key: KeyEvent, multiline: bool) -> bool {
        match key.code {
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Enter if multiline => self.insert('\n'),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }
}

/// Edit form for the entry of one date.
#[derive(Debug, Clone)]
pub struct DiaryModal {
    date: String,
    activities: Vec<String>,
    photo: TextInput,
    memo: TextInput,
    focus: Field,
    chip_cursor: usize,
}

impl DiaryModal {
    pub fn open(date: &str, existing: Option<&DiaryEntry>) -> Self {
        let (activities, memo, photo) = match existing {
            Some(entry) => (
                entry.activities.clone(),
                entry.memo(),
                entry.photo_uri.as_deref().unwrap_or(""),
            ),
            None => (Vec::new(), "", ""),
        };
        DiaryModal {
            date: date.to_string(),
            activities,
            photo: TextInput::new(photo),
            memo: TextInput::new(memo),
            focus: Field::Activities,
            chip_cursor: 0,
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn title(&self) -> String {
        format!("{} 기록", self.date.replace('-', "."))
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn is_selected(&self, activity: &str) -> bool {
        self.activities.iter().any(|a| a == activity)
    }

    pub fn photo(&self) -> &TextInput {
        &self.photo
    }

    pub fn memo(&self) -> &TextInput {
        &self.memo
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn chip_cursor(&self) -> usize {
        self.chip_cursor
    }

    /// Selecting appends, so stored order follows the order of selection.
    pub fn toggle_activity(&mut self, activity: &str) {
        if self.is_selected(activity) {
            self.activities.retain(|a| a != activity);
        } else {
            self.activities.push(activity.to_string());
        }
    }

    pub fn set_photo(&mut self, uri: &str) {
        self.photo.set(uri);
    }

    pub fn draft(&self) -> EntryDraft {
        EntryDraft::new(
            &self.date,
            self.activities.clone(),
            self.memo.text(),
            self.photo.text(),
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ModalOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => ModalOutcome::Save(self.draft()),
                KeyCode::Char('d') => ModalOutcome::Delete(self.date.clone()),
                KeyCode::Char('o') => ModalOutcome::PickPhoto,
                _ => ModalOutcome::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => return ModalOutcome::Close,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            _ => match self.focus {
                Field::Activities => self.handle_chip_key(key.code),
                Field::Photo if key.code == KeyCode::Enter => return ModalOutcome::PickPhoto,
                Field::Photo => {
                    self.photo.edit(key, false);
                }
                Field::Memo => {
                    self.memo.edit(key, true);
                }
            },
        }
        ModalOutcome::Continue
    }

    fn handle_chip_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.chip_cursor = self.chip_cursor.saturating_sub(1),
            KeyCode::Right => {
                self.chip_cursor = (self.chip_cursor + 1).min(ALL_ACTIVITIES.len() - 1)
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let activity = ALL_ACTIVITIES[self.chip_cursor];
                self.toggle_activity(activity);
            }
            _ => {}
        }
    }
}
