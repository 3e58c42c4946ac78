use dioxus::prelude::*;

use crate::domain::entities::listing::{field_text, ColumnSpec, FilterSpec, Record};
use crate::domain::entities::query::{
    FilterValues, PageRequest, SortDirection, SortSpec, QUERY_VALUE_KEY,
};
use crate::ui::hooks::use_data_source::DataSourceHandle;
use crate::ui::layout::{visible_columns, TableLayout};
use crate::ui::state::list_view::ListViewState;

const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 20, 50, 100];
const ALL_OPTION_VALUE: &str = "__all__";
const EMPTY_CELL: &str = "-";

pub fn next_sort(current: Option<&SortSpec>, field: &str) -> Option<SortSpec> {
    match current {
        Some(sort) if sort.field == field => match sort.direction {
            SortDirection::Ascending => Some(SortSpec::descending(field)),
            SortDirection::Descending => None,
        },
        _ => Some(SortSpec::ascending(field)),
    }
}

pub fn select_filter(
    filters: &FilterValues,
    spec: &FilterSpec,
    index: Option<usize>,
) -> FilterValues {
    let mut next = filters.clone();
    match index.and_then(|index| spec.options.get(index)) {
        Some(option) => next.insert(spec.key.clone(), option.value.clone()),
        None => {
            next.remove(&spec.key);
        }
    }
    next
}

pub fn with_search(filters: &FilterValues, text: &str) -> FilterValues {
    let mut next = filters.clone();
    if text.is_empty() {
        next.remove(QUERY_VALUE_KEY);
    } else {
        next.insert(QUERY_VALUE_KEY, text);
    }
    next
}

fn cell_text(record: &Record, key: &str) -> String {
    field_text(record, key).unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn header_cell_style(sortable: bool) -> String {
    let cursor = if sortable { "pointer" } else { "default" };
    format!(
        "border: 1px solid #bbb; padding: 6px 8px; background: #f4f4f4; text-align: left; cursor: {cursor}; white-space: nowrap;"
    )
}

fn sort_marker(sort: Option<&SortSpec>, key: &str) -> &'static str {
    match sort {
        Some(sort) if sort.field == key => match sort.direction {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        },
        _ => "",
    }
}

#[component]
pub fn ListTable(
    title: String,
    handle: DataSourceHandle,
    columns: Vec<ColumnSpec>,
    #[props(default)] filters: Vec<FilterSpec>,
) -> Element {
    let state = handle.state;
    let snapshot = state();
    let view = ListViewState::new(
        snapshot
            .filter_values
            .query_value()
            .unwrap_or_default()
            .to_string(),
    );

    let mut search = view.search;
    let mut width = view.width;
    let mut expanded_card = view.expanded_card;
    let breakpoint = view.breakpoint();
    let layout = view.layout();
    let shown: Vec<ColumnSpec> = visible_columns(&columns, breakpoint)
        .into_iter()
        .cloned()
        .collect();
    let sort = snapshot.sort.clone();
    let page = snapshot.page();
    let page_size = snapshot.pagination.page_size;
    let page_count = snapshot.pagination.page_count().max(1);
    let total = snapshot.total();
    let items = snapshot.items.clone();
    let busy = snapshot.loading;

    rsx! {
        div {
            style: "display: flex; flex-direction: column; gap: 12px; padding: 12px;",
            onresize: move |event: Event<ResizeData>| {
                if let Ok(size) = event.data().get_border_box_size() {
                    width.set(size.width);
                }
            },

            div { style: "display: flex; align-items: center; justify-content: space-between;",
                h2 { style: "margin: 0;", "{title}" }
                button {
                    disabled: busy,
                    onclick: {
                        let handle = handle.clone();
                        move |_| handle.reload()
                    },
                    "Reload"
                }
            }

            div { style: "display: flex; flex-wrap: wrap; gap: 12px; align-items: center;",
                input {
                    placeholder: "Search",
                    value: search(),
                    oninput: {
                        let handle = handle.clone();
                        move |event: Event<FormData>| {
                            let text = event.value();
                            search.set(text.clone());
                            handle.set_filter_values(with_search(&state().filter_values, &text));
                        }
                    },
                }

                for spec in filters.iter().cloned() {
                    FilterSelect {
                        key: "{spec.key}",
                        spec: spec.clone(),
                        filters: snapshot.filter_values.clone(),
                        handle: handle.clone(),
                    }
                }
            }

            if let Some(message) = snapshot.error.clone() {
                div { style: "padding: 8px 12px; border: 1px solid #e5a; background: #fff1f3; color: #a12;",
                    "{message}"
                }
            }

            div { style: "position: relative; min-height: 120px;",
                if busy {
                    div { style: "position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(255,255,255,0.6); z-index: 10;",
                        "Loading..."
                    }
                }

                if items.is_empty() && !snapshot.first_load {
                    p { style: "color: #777;", "No data" }
                } else if layout == TableLayout::Table {
                    table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                        thead {
                            tr {
                                for column in shown.iter().cloned() {
                                    th {
                                        key: "{column.key}",
                                        style: "{header_cell_style(column.sortable)}",
                                        onclick: {
                                            let handle = handle.clone();
                                            let column = column.clone();
                                            move |_| {
                                                if !column.sortable {
                                                    return;
                                                }
                                                let current = state().sort;
                                                handle.set_sort(next_sort(current.as_ref(), &column.key));
                                            }
                                        },
                                        "{column.label}{sort_marker(sort.as_ref(), &column.key)}"
                                    }
                                }
                            }
                        }
                        tbody {
                            {items.iter().enumerate().map(|(row_idx, record)| {
                                let cells: Vec<(String, String)> = shown
                                    .iter()
                                    .map(|column| (column.key.clone(), cell_text(record, &column.key)))
                                    .collect();
                                rsx!(
                                    tr { key: "{row_idx}",
                                        for (cell_key, text) in cells {
                                            td {
                                                key: "{cell_key}",
                                                style: "border: 1px solid #bbb; padding: 6px 8px;",
                                                "{text}"
                                            }
                                        }
                                    }
                                )
                            })}
                        }
                    }
                } else {
                    div { style: "display: flex; flex-direction: column; gap: 8px;",
                        {items.iter().enumerate().map(|(row_idx, record)| {
                            let expanded = expanded_card() == Some(row_idx);
                            let fields: Vec<(String, String)> = columns
                                .iter()
                                .filter(|column| expanded || shown.iter().any(|s| s.key == column.key))
                                .map(|column| (column.label.clone(), cell_text(record, &column.key)))
                                .collect();
                            rsx!(
                                div {
                                    key: "{row_idx}",
                                    style: "border: 1px solid #ddd; border-radius: 8px; padding: 10px; background: #fff;",
                                    onclick: move |_| {
                                        let next = if expanded { None } else { Some(row_idx) };
                                        expanded_card.set(next);
                                    },
                                    for (label, text) in fields {
                                        div { style: "display: flex; justify-content: space-between; gap: 12px;",
                                            span { style: "color: #666;", "{label}" }
                                            span { "{text}" }
                                        }
                                    }
                                }
                            )
                        })}
                    }
                }
            }

            div { style: "display: flex; gap: 8px; align-items: center; justify-content: flex-end;",
                span { "Total {total}" }
                button {
                    disabled: busy || page <= 1,
                    onclick: {
                        let handle = handle.clone();
                        move |_| handle.set_pagination(PageRequest::new(page.saturating_sub(1), page_size))
                    },
                    "Prev"
                }
                span { "Page {page} / {page_count}" }
                button {
                    disabled: busy || page >= page_count,
                    onclick: {
                        let handle = handle.clone();
                        move |_| handle.set_pagination(PageRequest::new(page.saturating_add(1), page_size))
                    },
                    "Next"
                }
                select {
                    value: "{page_size}",
                    onchange: {
                        let handle = handle.clone();
                        move |event: Event<FormData>| {
                            if let Ok(size) = event.value().parse::<usize>() {
                                handle.set_pagination(PageRequest::new(1, size));
                            }
                        }
                    },
                    for size in PAGE_SIZE_OPTIONS {
                        option { value: "{size}", selected: size == page_size, "{size} / page" }
                    }
                }
            }
        }
    }
}

#[component]
fn FilterSelect(spec: FilterSpec, filters: FilterValues, handle: DataSourceHandle) -> Element {
    let selected = filters
        .get(&spec.key)
        .and_then(|value| spec.options.iter().position(|option| &option.value == value));
    let on_change_spec = spec.clone();

    rsx! {
        label { style: "display: inline-flex; align-items: center; gap: 6px;",
            span { "{spec.label}" }
            select {
                onchange: move |event: Event<FormData>| {
                    let index = event.value().parse::<usize>().ok();
                    let current = handle.state.peek().filter_values.clone();
                    handle.set_filter_values(select_filter(&current, &on_change_spec, index));
                },
                option { value: ALL_OPTION_VALUE, selected: selected.is_none(), "All" }
                for (index, choice) in spec.options.iter().enumerate() {
                    option {
                        value: "{index}",
                        selected: selected == Some(index),
                        "{choice.label}"
                    }
                }
            }
        }
    }
}
