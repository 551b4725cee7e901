use std::collections::BTreeSet;

use shared::domain::SortOrder;

/// Fixed number of results requested per page.
pub const PAGE_SIZE: u32 = 24;

/// Deterministic request descriptor for the id-search endpoint, ready to be
/// passed as query pairs to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    params: Vec<(&'static str, String)>,
}

impl QueryDescriptor {
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }
}

/// Builds the id-search query for one page. Pure: `size` and `sort` are
/// always present, the zero-based `from` offset is omitted on the first
/// page, and each selected breed becomes a repeated `breeds` parameter.
pub fn build_search_query(
    breeds: &BTreeSet<String>,
    sort: SortOrder,
    page: u32,
) -> QueryDescriptor {
    debug_assert!(page >= 1, "pages are 1-indexed");
    let mut params = vec![
        ("size", PAGE_SIZE.to_string()),
        ("sort", sort.as_query_value().to_string()),
    ];
    let from = u64::from(page.saturating_sub(1)) * u64::from(PAGE_SIZE);
    if from > 0 {
        params.push(("from", from.to_string()));
    }
    for breed in breeds {
        params.push(("breeds", breed.clone()));
    }
    QueryDescriptor { params }
}

/// Number of addressable pages for a known result total.
pub fn total_pages(total_results: u64) -> u64 {
    total_results.div_ceil(u64::from(PAGE_SIZE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breeds(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn first_page_omits_offset() {
        let query = build_search_query(&BTreeSet::new(), SortOrder::BreedAscending, 1);
        assert_eq!(
            query.params(),
            &[
                ("size", "24".to_string()),
                ("sort", "breed:asc".to_string()),
            ]
        );
    }

    #[test]
    fn later_pages_carry_zero_based_offset() {
        let query = build_search_query(&BTreeSet::new(), SortOrder::BreedDescending, 3);
        assert_eq!(
            query.params(),
            &[
                ("size", "24".to_string()),
                ("sort", "breed:desc".to_string()),
                ("from", "48".to_string()),
            ]
        );
    }

    #[test]
    fn each_selected_breed_is_a_repeated_parameter() {
        let query = build_search_query(&breeds(&["Beagle", "Akita"]), SortOrder::BreedAscending, 1);
        let repeated: Vec<_> = query
            .params()
            .iter()
            .filter(|(key, _)| *key == "breeds")
            .map(|(_, value)| value.as_str())
            .collect();
        assert_eq!(repeated, vec!["Akita", "Beagle"]);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(24), 1);
        assert_eq!(total_pages(25), 2);
        assert_eq!(total_pages(50), 3);
    }
}
