use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Deserialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const WEEKS_PER_GRID: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

const WEEKDAY_NAMES: [&str; DAYS_PER_WEEK] = ["일", "월", "화", "수", "목", "금", "토"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    fn offset(self) -> usize {
        match self {
            WeekStart::Sunday => 0,
            WeekStart::Monday => 1,
        }
    }

    /// Short weekday names in column order.
    pub fn weekday_names(self) -> Vec<&'static str> {
        (0..DAYS_PER_WEEK)
            .map(|i| WEEKDAY_NAMES[(i + self.offset()) % DAYS_PER_WEEK])
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    Today,
    InMonth,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub state: DayState,
}

impl GridDay {
    pub fn key(&self) -> String {
        date_key(self.date)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn month_title(year: i32, month: u32) -> String {
    format!("{year}년 {month}월")
}

/// Six full weeks covering one month, padded with the neighbouring months.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub days: Vec<GridDay>,
}

impl MonthGrid {
    pub fn new(year: i32, month: u32, week_start: WeekStart, today: NaiveDate) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let lead = (first.weekday().num_days_from_sunday() as usize + DAYS_PER_WEEK
            - week_start.offset())
            % DAYS_PER_WEEK;
        let start = first.checked_sub_days(Days::new(lead as u64))?;

        let days = start
            .iter_days()
            .take(WEEKS_PER_GRID * DAYS_PER_WEEK)
            .map(|date| {
                let state = if date.month() != month {
                    DayState::Disabled
                } else if date == today {
                    DayState::Today
                } else {
                    DayState::InMonth
                };
                GridDay { date, state }
            })
            .collect();

        Some(MonthGrid { year, month, days })
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[GridDay]> {
        self.days.chunks(DAYS_PER_WEEK)
    }

    pub fn title(&self) -> String {
        month_title(self.year, self.month)
    }
}

/// Cursor and visible month of the calendar panel.
#[derive(Debug, Clone)]
pub struct CalendarView {
    cursor: NaiveDate,
    week_start: WeekStart,
}

impl CalendarView {
    pub fn new(today: NaiveDate, week_start: WeekStart) -> Self {
        CalendarView {
            cursor: today,
            week_start,
        }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn cursor_key(&self) -> String {
        date_key(self.cursor)
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn grid(&self, today: NaiveDate) -> Option<MonthGrid> {
        MonthGrid::new(self.cursor.year(), self.cursor.month(), self.week_start, today)
    }

    pub fn move_days(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.cursor.checked_add_days(Days::new(days as u64))
        } else {
            self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    /// Moves by whole months; the day is clamped to the target month's length.
    pub fn move_months(&mut self, months: i32) {
        let moved = if months >= 0 {
            self.cursor.checked_add_months(Months::new(months as u32))
        } else {
            self.cursor.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        if let Some(date) = moved {
            tracing::debug!(month = %month_title(date.year(), date.month()), "calendar month changed");
            self.cursor = date;
        }
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.cursor = date;
    }
}
