use fin_types::{ResultSet, SearchResult};

/// Sort `incoming` and compare it with `previous`.
///
/// Returns `None` when the sorted batch equals what is already shown, so the
/// caller can skip the assignment and keep its selection.
#[must_use]
pub fn merge(previous: &ResultSet, incoming: Vec<SearchResult>) -> Option<ResultSet> {
    let sorted = ResultSet::sorted(incoming);
    (sorted != *previous).then_some(sorted)
}
