use crate::domain::entities::listing::{ItemsResult, Record};
use crate::domain::entities::query::PaginationState;
use crate::usecase::services::query_builder::LocalPlan;

pub fn process(all_items: &[Record], plan: &LocalPlan, pagination: &PaginationState) -> ItemsResult {
    let mut matched: Vec<&Record> = all_items.iter().filter(|item| plan.matches(item)).collect();

    if plan.is_sorted() {
        matched.sort_by(|a, b| plan.compare(a, b));
    }

    let total = matched.len() as u64;
    let items = matched
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.page_size)
        .cloned()
        .collect();

    ItemsResult { items, total }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::entities::query::{FilterValues, ListQuery, SortSpec};
    use crate::usecase::services::query_builder::{build_local_plan, QueryOptions};

    fn people() -> Vec<Record> {
        vec![
            json!({"name": "Chi", "status": "approved", "score": 7}),
            json!({"name": "an", "status": "pending", "score": 9}),
            json!({"name": "Binh", "status": "approved", "score": 7}),
            json!({"name": "Dung", "status": "rejected"}),
        ]
    }

    fn page(current_page: usize, page_size: usize) -> PaginationState {
        PaginationState {
            current_page,
            page_size,
            total: 0,
        }
    }

    #[test]
    fn total_counts_matches_before_slicing() {
        let query = ListQuery {
            filters: FilterValues::new().with("status", "approved"),
            ..ListQuery::default()
        };
        let plan = build_local_plan(&query, &QueryOptions::new("name"));

        let result = process(&people(), &plan, &page(1, 1));

        assert_eq!(result.total, 2);
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn sorts_then_slices_the_requested_page() {
        let query = ListQuery {
            sort: Some(SortSpec::ascending("name")),
            ..ListQuery::default()
        };
        let plan = build_local_plan(&query, &QueryOptions::new("name"));

        let result = process(&people(), &plan, &page(2, 2));

        let names: Vec<&str> = result
            .items
            .iter()
            .filter_map(|item| item["name"].as_str())
            .collect();
        assert_eq!(names, vec!["Chi", "Dung"]);
        assert_eq!(result.total, 4);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let query = ListQuery {
            sort: Some(SortSpec::descending("score")),
            ..ListQuery::default()
        };
        let plan = build_local_plan(&query, &QueryOptions::new("name"));

        let result = process(&people(), &plan, &page(1, 10));

        let names: Vec<&str> = result
            .items
            .iter()
            .filter_map(|item| item["name"].as_str())
            .collect();
        assert_eq!(names[..3], ["an", "Chi", "Binh"]);
    }

    #[test]
    fn source_is_left_untouched() {
        let source = people();
        let snapshot = source.clone();
        let query = ListQuery {
            sort: Some(SortSpec::ascending("name")),
            ..ListQuery::default()
        };
        let plan = build_local_plan(&query, &QueryOptions::new("name"));

        let first = process(&source, &plan, &page(1, 3));
        let second = process(&source, &plan, &page(1, 3));

        assert_eq!(source, snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let plan = build_local_plan(&ListQuery::default(), &QueryOptions::new("name"));
        let result = process(&people(), &plan, &page(5, 10));

        assert!(result.items.is_empty());
        assert_eq!(result.total, 4);
    }
}
