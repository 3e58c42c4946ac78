use dioxus::prelude::*;
use serde_json::json;

use crate::config::AppConfig;
use crate::domain::entities::listing::{Breakpoint, ColumnSpec, FilterSpec, Record};
use crate::domain::entities::query::SortSpec;
use crate::ui::components::list_table::ListTable;
use crate::ui::hooks::use_data_source::use_data_source;
use crate::usecase::services::controller::DataSourceProps;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Page {
    MyInitiatives,
    Users,
    Roles,
    Reports,
}

impl Page {
    const ALL: [Page; 4] = [Page::MyInitiatives, Page::Users, Page::Roles, Page::Reports];

    fn label(self) -> &'static str {
        match self {
            Page::MyInitiatives => "My initiatives",
            Page::Users => "Users",
            Page::Roles => "Roles",
            Page::Reports => "Reports",
        }
    }
}

fn nav_button_style(active: bool) -> &'static str {
    if active {
        "border: 1px solid #356; background: #356; color: #fff; padding: 6px 14px; border-radius: 6px; cursor: pointer;"
    } else {
        "border: 1px solid #bbb; background: #fff; padding: 6px 14px; border-radius: 6px; cursor: pointer;"
    }
}

#[component]
pub fn App() -> Element {
    let mut page = use_signal(|| Page::MyInitiatives);

    rsx! {
        div { style: "font-family: sans-serif; background: #fafafa; min-height: 100vh;",
            nav { style: "display: flex; gap: 8px; padding: 12px; border-bottom: 1px solid #ddd; background: #fff;",
                for entry in Page::ALL {
                    button {
                        key: "{entry.label()}",
                        style: "{nav_button_style(page() == entry)}",
                        onclick: move |_| page.set(entry),
                        "{entry.label()}"
                    }
                }
            }

            match page() {
                Page::MyInitiatives => rsx! { MyInitiativesPage {} },
                Page::Users => rsx! { UsersPage {} },
                Page::Roles => rsx! { RolesPage {} },
                Page::Reports => rsx! { ReportsPage {} },
            }
        }
    }
}

#[component]
fn MyInitiativesPage() -> Element {
    let config = use_context::<AppConfig>();
    let handle = use_data_source(
        DataSourceProps::remote("initiatives", "initiativeName")
            .with_page_size(config.page_size)
            .with_sort(SortSpec::descending("createdAt")),
    );
    let mut scope = use_signal(|| "initiatives");

    let columns = vec![
        ColumnSpec::new("initiativeName", "Initiative").sortable(),
        ColumnSpec::new("createdAt", "Submitted")
            .sortable()
            .responsive([Breakpoint::Md]),
        ColumnSpec::new("status", "Status").sortable(),
        ColumnSpec::new("score", "Score")
            .sortable()
            .responsive([Breakpoint::Lg]),
    ];
    let filters = vec![FilterSpec::new("status", "Status")
        .option("Pending", "pending")
        .option("Approved", "approved")
        .option("Rejected", "rejected")];

    rsx! {
        div { style: "display: flex; gap: 8px; padding: 12px 12px 0;",
            for (data_source, label) in [("initiatives", "All"), ("initiatives/mine", "Mine")] {
                button {
                    key: "{data_source}",
                    style: "{nav_button_style(scope() == data_source)}",
                    onclick: {
                        let handle = handle.clone();
                        move |_| {
                            scope.set(data_source);
                            handle.set_data_source(data_source);
                        }
                    },
                    "{label}"
                }
            }
        }
        ListTable {
            title: "My initiatives",
            handle: handle.clone(),
            columns,
            filters,
        }
    }
}

#[component]
fn UsersPage() -> Element {
    let config = use_context::<AppConfig>();
    let handle = use_data_source(
        DataSourceProps::remote("users", "name").with_page_size(config.page_size),
    );

    let columns = vec![
        ColumnSpec::new("name", "Name").sortable(),
        ColumnSpec::new("email", "Email")
            .sortable()
            .responsive([Breakpoint::Md]),
        ColumnSpec::new("department", "Department").responsive([Breakpoint::Lg]),
        ColumnSpec::new("isActive", "Active").sortable(),
        ColumnSpec::new("roles", "Roles").responsive([Breakpoint::Xl]),
    ];
    let filters = vec![
        FilterSpec::new("isActive", "Status")
            .option("Active", true)
            .option("Locked", false),
        FilterSpec::new("department", "Department")
            .option("Technical", "technical")
            .option("Human resources", "hr")
            .option("Sales", "sales"),
    ];

    rsx! {
        ListTable {
            title: "User management",
            handle,
            columns,
            filters,
        }
    }
}

#[component]
fn RolesPage() -> Element {
    let config = use_context::<AppConfig>();
    let handle = use_data_source(
        DataSourceProps::remote("roles", "name")
            .with_page_size(config.page_size)
            .abbreviated(),
    );

    let columns = vec![
        ColumnSpec::new("name", "Role").sortable(),
        ColumnSpec::new("description", "Description"),
    ];

    rsx! {
        ListTable {
            title: "Role management",
            handle,
            columns,
        }
    }
}

fn report_rows() -> Vec<Record> {
    vec![
        json!({"initiativeName": "Solar rooftop pilot", "department": "technical", "score": 87, "submissionDate": "2024-03-02"}),
        json!({"initiativeName": "Paperless onboarding", "department": "hr", "score": 74, "submissionDate": "2024-01-18"}),
        json!({"initiativeName": "Regional sales dashboard", "department": "sales", "score": 91, "submissionDate": "2024-02-11"}),
        json!({"initiativeName": "Shared car pool", "department": "hr", "score": null, "submissionDate": "2023-12-05"}),
    ]
}

#[component]
fn ReportsPage() -> Element {
    let handle = use_data_source(
        DataSourceProps::local(report_rows(), "initiativeName")
            .with_sort(SortSpec::descending("score")),
    );

    let columns = vec![
        ColumnSpec::new("initiativeName", "Initiative").sortable(),
        ColumnSpec::new("department", "Department"),
        ColumnSpec::new("score", "Score").sortable(),
        ColumnSpec::new("submissionDate", "Submitted")
            .sortable()
            .responsive([Breakpoint::Md]),
    ];
    let filters = vec![FilterSpec::new("department", "Department")
        .option("Technical", "technical")
        .option("Human resources", "hr")
        .option("Sales", "sales")];

    rsx! {
        ListTable {
            title: "Reports",
            handle,
            columns,
            filters,
        }
    }
}
