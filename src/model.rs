use chrono::{Datelike, Local, NaiveDate};

use crate::error::AppError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { month, year })
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn label(&self) -> String {
        match self.first_day() {
            Some(day) => day.format("%B %Y").to_string(),
            None => format!("{:02}/{}", self.month, self.year),
        }
    }
}

// `header_text: None` leaves the stored header untouched.
#[derive(Clone, Debug, Default)]
pub struct GoalFields {
    pub name: String,
    pub description: String,
    pub completion_criteria: String,
    pub header_text: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JournalWrite {
    Inserted,
    Updated,
}

impl JournalWrite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_rejects_out_of_range_month() {
        assert!(Period::new(0, 2024).is_err());
        assert!(Period::new(13, 2024).is_err());
        assert_eq!(Period::new(6, 2024).unwrap().month, 6);
    }

    #[test]
    fn period_label_uses_month_name() {
        let period = Period::new(6, 2024).unwrap();
        assert_eq!(period.label(), "June 2024");
    }

    #[test]
    fn period_containing_date() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(Period::containing(date), Period { month: 12, year: 2023 });
    }
}
