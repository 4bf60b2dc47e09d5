//! `ordering` query parameter parsing.

use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// A sort key with direction; `-price` sorts by price descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder<F> {
    pub field: F,
    pub descending: bool,
}

impl<F> SortOrder<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

impl<F: FromStr<Err = AppError>> SortOrder<F> {
    /// Parse the raw parameter, falling back to `default` when absent or blank.
    pub fn parse_or(raw: Option<&str>, default: Self) -> AppResult<Self> {
        let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw,
            None => return Ok(default),
        };

        match raw.strip_prefix('-') {
            Some(field) => Ok(Self::desc(field.parse()?)),
            None => Ok(Self::asc(raw.parse()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PropertySortField;

    #[test]
    fn test_leading_dash_means_descending() {
        let sort = SortOrder::parse_or(Some("-price"), SortOrder::asc(PropertySortField::CreatedAt)).unwrap();
        assert_eq!(sort, SortOrder::desc(PropertySortField::Price));

        let sort = SortOrder::parse_or(Some("bedrooms"), SortOrder::asc(PropertySortField::CreatedAt)).unwrap();
        assert_eq!(sort, SortOrder::asc(PropertySortField::Bedrooms));
    }

    #[test]
    fn test_missing_ordering_uses_default() {
        let default = SortOrder::desc(PropertySortField::CreatedAt);
        assert_eq!(SortOrder::parse_or(None, default).unwrap(), default);
        assert_eq!(SortOrder::parse_or(Some("  "), default).unwrap(), default);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let default = SortOrder::desc(PropertySortField::CreatedAt);
        assert!(SortOrder::parse_or(Some("-owner"), default).is_err());
    }
}
