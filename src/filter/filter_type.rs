use std::fmt;
use std::str::FromStr;

use super::FilterError;

/// Selectable host filters. The identifier of each variant is also the DOM id
/// of the control that activates it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterType {
    #[default]
    All,
    Cheapest,
    TopRated,
    FiveStars,
}

impl FilterType {
    pub const ALL_TYPES: [FilterType; 4] = [
        FilterType::All,
        FilterType::Cheapest,
        FilterType::TopRated,
        FilterType::FiveStars,
    ];

    pub fn id(self) -> &'static str {
        match self {
            FilterType::All => "filter-all",
            FilterType::Cheapest => "filter-cheapest",
            FilterType::TopRated => "filter-top-rated",
            FilterType::FiveStars => "filter-five-stars",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterType::All => "All",
            FilterType::Cheapest => "Cheapest first",
            FilterType::TopRated => "Top rated",
            FilterType::FiveStars => "Five stars",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FilterType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        FilterType::ALL_TYPES
            .into_iter()
            .find(|ft| ft.id() == trimmed)
            .ok_or_else(|| FilterError::UnknownFilter {
                id: trimmed.to_string(),
            })
    }
}
