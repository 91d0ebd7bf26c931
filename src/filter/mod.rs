mod filter_type;

pub use filter_type::FilterType;

use thiserror::Error;

use crate::host::Host;

/// Minimum guest rating a host needs to show up under [`FilterType::TopRated`].
pub const TOP_RATED_THRESHOLD: f32 = 8.0;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter type '{id}'")]
    UnknownFilter { id: String },
}

/// Returns the view of `hosts` selected by `filter_type`.
///
/// The input is never modified; every call builds a new list. Sorting is
/// stable, so hosts that compare equal keep their load order and the result
/// is the same for the same input.
pub fn apply(hosts: &[Host], filter_type: FilterType) -> Vec<Host> {
    match filter_type {
        FilterType::All => hosts.to_vec(),
        FilterType::Cheapest => {
            let mut out = hosts.to_vec();
            out.sort_by_key(|h| h.price);
            out
        }
        FilterType::TopRated => {
            let mut out: Vec<Host> = hosts
                .iter()
                .filter(|h| h.rating >= TOP_RATED_THRESHOLD)
                .cloned()
                .collect();
            out.sort_by(|a, b| b.rating.total_cmp(&a.rating));
            out
        }
        FilterType::FiveStars => hosts.iter().filter(|h| h.stars == 5).cloned().collect(),
    }
}
