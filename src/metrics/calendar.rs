// src/metrics/calendar.rs

use chrono::{Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::error::AppError;

/// Janela padrão das análises quando o período não é informado.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Âncoras mensais a partir de "hoje".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub today: NaiveDate,
    pub month_start: NaiveDate,
    pub last_month_start: NaiveDate,
}

impl Calendar {
    pub fn new(today: NaiveDate) -> Self {
        let month_start = today.with_day(1).unwrap_or(today);
        let last_month_start = month_start
            .pred_opt()
            .and_then(|last_day| last_day.with_day(1))
            .unwrap_or(month_start);

        Self {
            today,
            month_start,
            last_month_start,
        }
    }

    pub fn current() -> Self {
        Self::new(Utc::now().date_naive())
    }

    pub fn in_current_month(&self, day: NaiveDate) -> bool {
        day >= self.month_start
    }

    pub fn in_last_month(&self, day: NaiveDate) -> bool {
        day >= self.last_month_start && day < self.month_start
    }

    pub fn days_ago(&self, days: u64) -> NaiveDate {
        self.today.checked_sub_days(Days::new(days)).unwrap_or(self.today)
    }
}

/// Período fechado `[start_date, end_date]` das análises de receita.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateWindow {
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        Self {
            start_date: today.checked_sub_days(Days::new(days)).unwrap_or(today),
            end_date: today,
        }
    }

    /// Só usa as datas informadas quando as duas vêm; caso contrário, os
    /// últimos [`DEFAULT_WINDOW_DAYS`] dias.
    pub fn from_params(
        start_date: Option<&str>,
        end_date: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        match (start_date, end_date) {
            (Some(start), Some(end)) => {
                let window = Self {
                    start_date: parse_day("start_date", start)?,
                    end_date: parse_day("end_date", end)?,
                };
                if window.start_date > window.end_date {
                    return Err(AppError::InvalidDate(
                        "start_date deve ser anterior ou igual a end_date".into(),
                    ));
                }
                Ok(window)
            }
            _ => Ok(Self::last_days(today, DEFAULT_WINDOW_DAYS)),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date
    }
}

fn parse_day(name: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(format!("{name} deve estar no formato AAAA-MM-DD")))
}
