//! Search query parsing.
//!
//! A search arrives as a path segment `city.mood1.mood2` plus optional query parameters.
//! [`SearchQuery::parse`] validates all of it up front so the scan never runs on an
//! invalid query.

use crate::config;
use crate::document::{normalize_token, parse_date};
use crate::search::types::Pagination;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Raw, unvalidated query parameters of `GET /trips/search/:opts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub moods: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub persons: Option<String>,
    pub days: Option<String>,
    pub budget: Option<String>,
    pub accommodations: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Reasons a search query is rejected before scanning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("a city is required")]
    MissingCity,
    #[error("invalid date for '{field}': '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("invalid number for '{field}': '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("start_date must not be after end_date")]
    InvertedDateRange,
    #[error("page must be 1 or greater")]
    InvalidPage,
    #[error("page_size must be 1-{max}")]
    InvalidPageSize { max: usize },
    #[error("at most {max} moods may be requested")]
    TooManyMoods { max: usize },
}

/// A validated search query. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub city: String,
    /// Requested moods, normalized and deduplicated in request order.
    pub moods: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub persons: Option<u32>,
    pub days: Option<u32>,
    /// Deprecated criterion.
    pub budget: Option<f64>,
    /// Deprecated criterion.
    pub accommodations: Option<u32>,
    pub pagination: Pagination,
}

impl SearchQuery {
    /// A query for `city` with no optional criteria and default pagination.
    pub fn for_city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            moods: Vec::new(),
            start_date: None,
            end_date: None,
            persons: None,
            days: None,
            budget: None,
            accommodations: None,
            pagination: Pagination::default(),
        }
    }

    /// Parses the `city.mood1.moodX` path segment and the query parameters.
    ///
    /// Moods from the path and from the `moods` parameter are merged.
    pub fn parse(opts: &str, params: &SearchParams) -> Result<Self, QueryError> {
        let mut tokens = opts.split(config::QUERY_DELIMITER);
        let city = tokens.next().unwrap_or_default().trim().to_string();
        if city.is_empty() {
            return Err(QueryError::MissingCity);
        }

        let mut moods: Vec<String> = Vec::new();
        let param_moods = params
            .moods
            .as_deref()
            .map(|m| m.split(config::QUERY_DELIMITER))
            .into_iter()
            .flatten();
        for mood in tokens.chain(param_moods) {
            let mood = normalize_token(mood);
            if !mood.is_empty() && !moods.contains(&mood) {
                moods.push(mood);
            }
        }
        if moods.len() > config::MAX_QUERY_MOODS {
            return Err(QueryError::TooManyMoods {
                max: config::MAX_QUERY_MOODS,
            });
        }

        let start_date = parse_date_param("start_date", params.start_date.as_deref())?;
        let end_date = parse_date_param("end_date", params.end_date.as_deref())?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(QueryError::InvertedDateRange);
            }
        }

        Ok(Self {
            city,
            moods,
            start_date,
            end_date,
            persons: parse_count("persons", params.persons.as_deref())?,
            days: parse_count("days", params.days.as_deref())?,
            budget: parse_amount("budget", params.budget.as_deref())?,
            accommodations: parse_count("accommodations", params.accommodations.as_deref())?,
            pagination: parse_pagination(params.page.as_deref(), params.page_size.as_deref())?,
        })
    }

    /// The requested date range, when both ends were given.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

/// Parses `page` and `page_size` parameters, applying defaults for absent values.
pub fn parse_pagination(
    page: Option<&str>,
    page_size: Option<&str>,
) -> Result<Pagination, QueryError> {
    let page = match non_empty(page) {
        None => config::DEFAULT_PAGE,
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) => return Err(QueryError::InvalidPage),
            Ok(p) => p,
            Err(_) => {
                return Err(QueryError::InvalidNumber {
                    field: "page",
                    value: raw.to_string(),
                })
            }
        },
    };
    let page_size = match non_empty(page_size) {
        None => config::DEFAULT_PAGE_SIZE,
        Some(raw) => {
            let size = raw.parse::<usize>().map_err(|_| QueryError::InvalidNumber {
                field: "page_size",
                value: raw.to_string(),
            })?;
            if size == 0 || size > config::MAX_PAGE_SIZE {
                return Err(QueryError::InvalidPageSize {
                    max: config::MAX_PAGE_SIZE,
                });
            }
            size
        }
    };
    Ok(Pagination::new(page, page_size))
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date_param(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, QueryError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| QueryError::InvalidDate {
                field,
                value: value.to_string(),
            }),
    }
}

/// A zero count means "not supplied".
fn parse_count(field: &'static str, raw: Option<&str>) -> Result<Option<u32>, QueryError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => match value.parse::<u32>() {
            Ok(0) => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(QueryError::InvalidNumber {
                field,
                value: value.to_string(),
            }),
        },
    }
}

fn parse_amount(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, QueryError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => match value.parse::<f64>() {
            Ok(n) if n.is_finite() && n > 0.0 => Ok(Some(n)),
            Ok(n) if n == 0.0 => Ok(None),
            _ => Err(QueryError::InvalidNumber {
                field,
                value: value.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams::default()
    }

    #[test]
    fn test_city_only() {
        let q = SearchQuery::parse("Berlin", &params()).unwrap();
        assert_eq!(q.city, "Berlin");
        assert!(q.moods.is_empty());
        assert_eq!(q.pagination, Pagination::default());
    }

    #[test]
    fn test_path_moods_split_on_dot() {
        let q = SearchQuery::parse("berlin.Beach.culture", &params()).unwrap();
        assert_eq!(q.city, "berlin");
        assert_eq!(q.moods, vec!["beach", "culture"]);
    }

    #[test]
    fn test_param_moods_merged_and_deduplicated() {
        let p = SearchParams {
            moods: Some("culture.food".into()),
            ..params()
        };
        let q = SearchQuery::parse("berlin.beach.culture", &p).unwrap();
        assert_eq!(q.moods, vec!["beach", "culture", "food"]);
    }

    #[test]
    fn test_empty_mood_tokens_ignored() {
        let q = SearchQuery::parse("berlin..beach.", &params()).unwrap();
        assert_eq!(q.moods, vec!["beach"]);
    }

    #[test]
    fn test_missing_city_rejected() {
        assert_eq!(
            SearchQuery::parse(".beach", &params()),
            Err(QueryError::MissingCity)
        );
        assert_eq!(SearchQuery::parse("", &params()), Err(QueryError::MissingCity));
    }

    #[test]
    fn test_too_many_moods_rejected() {
        let opts = format!(
            "berlin.{}",
            (0..=config::MAX_QUERY_MOODS)
                .map(|i| format!("m{i}"))
                .collect::<Vec<_>>()
                .join(".")
        );
        assert!(matches!(
            SearchQuery::parse(&opts, &params()),
            Err(QueryError::TooManyMoods { .. })
        ));
    }

    #[test]
    fn test_dates_parsed() {
        let p = SearchParams {
            start_date: Some("2026-07-01".into()),
            end_date: Some("2026-07-05T00:00:00Z".into()),
            ..params()
        };
        let q = SearchQuery::parse("berlin", &p).unwrap();
        assert_eq!(
            q.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 7, 5).unwrap()
            ))
        );
    }

    #[test]
    fn test_single_date_gives_no_range() {
        let p = SearchParams {
            end_date: Some("2026-07-05".into()),
            ..params()
        };
        let q = SearchQuery::parse("berlin", &p).unwrap();
        assert!(q.date_range().is_none());
    }

    #[test]
    fn test_unparsable_date_rejected() {
        let p = SearchParams {
            start_date: Some("tomorrow".into()),
            ..params()
        };
        assert_eq!(
            SearchQuery::parse("berlin", &p),
            Err(QueryError::InvalidDate {
                field: "start_date",
                value: "tomorrow".into()
            })
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let p = SearchParams {
            start_date: Some("2026-07-05".into()),
            end_date: Some("2026-07-01".into()),
            ..params()
        };
        assert_eq!(
            SearchQuery::parse("berlin", &p),
            Err(QueryError::InvertedDateRange)
        );
    }

    #[test]
    fn test_numeric_criteria() {
        let p = SearchParams {
            persons: Some("2".into()),
            days: Some("0".into()),
            budget: Some("450.5".into()),
            accommodations: Some("".into()),
            ..params()
        };
        let q = SearchQuery::parse("berlin", &p).unwrap();
        assert_eq!(q.persons, Some(2));
        assert_eq!(q.days, None);
        assert_eq!(q.budget, Some(450.5));
        assert_eq!(q.accommodations, None);
    }

    #[test]
    fn test_negative_persons_rejected() {
        let p = SearchParams {
            persons: Some("-1".into()),
            ..params()
        };
        assert!(matches!(
            SearchQuery::parse("berlin", &p),
            Err(QueryError::InvalidNumber { field: "persons", .. })
        ));
    }

    #[test]
    fn test_nan_budget_rejected() {
        let p = SearchParams {
            budget: Some("NaN".into()),
            ..params()
        };
        assert!(SearchQuery::parse("berlin", &p).is_err());
    }

    #[test]
    fn test_pagination_params() {
        assert_eq!(
            parse_pagination(Some("3"), Some("25")).unwrap(),
            Pagination::new(3, 25)
        );
        assert_eq!(parse_pagination(Some("0"), None), Err(QueryError::InvalidPage));
        assert!(matches!(
            parse_pagination(None, Some("0")),
            Err(QueryError::InvalidPageSize { .. })
        ));
        assert!(matches!(
            parse_pagination(None, Some("101")),
            Err(QueryError::InvalidPageSize { .. })
        ));
        assert!(matches!(
            parse_pagination(Some("x"), None),
            Err(QueryError::InvalidNumber { field: "page", .. })
        ));
    }
}
