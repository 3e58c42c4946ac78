use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use url::form_urlencoded::byte_serialize;

use crate::domain::entities::listing::{display_value, field_text, Record};
use crate::domain::entities::query::{FilterValue, ListQuery, SortDirection};

const DEFAULT_DATE_FIELDS: [&str; 3] = ["createdAt", "updatedAt", "submissionDate"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub query_key: String,
    pub abbreviated: bool,
    pub date_fields: BTreeSet<String>,
}

impl QueryOptions {
    pub fn new(query_key: impl Into<String>) -> Self {
        Self {
            query_key: query_key.into(),
            abbreviated: false,
            date_fields: DEFAULT_DATE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteQuery {
    params: Vec<(&'static str, String)>,
}

impl RemoteQuery {
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn url_for(&self, data_source: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            return data_source.to_string();
        }
        let delimiter = if data_source.contains('?') { '&' } else { '?' };
        format!("{data_source}{delimiter}{query}")
    }
}

pub fn build_remote_query(query: &ListQuery, options: &QueryOptions) -> RemoteQuery {
    let mut params = vec![("limit", query.pagination.page_size.to_string())];

    if options.abbreviated {
        params.push(("abbreviated", "true".to_string()));
    }

    if query.pagination.current_page > 1 {
        params.push(("page", query.pagination.current_page.to_string()));
    }

    if let Some(sort) = &query.sort {
        params.push(("sort", format!("{}|{}", sort.field, sort.direction.wire_name())));
    }

    if let Some(text) = query.filters.query_value() {
        params.push((
            "filter",
            format!("{}|{}", options.query_key, encode_component(text)),
        ));
    }

    for (key, value) in query.filters.active_filters() {
        let rendered = match value {
            FilterValue::Scalar(text) => text.clone(),
            FilterValue::Selection(values) => {
                values.iter().cloned().collect::<Vec<_>>().join(",")
            }
            FilterValue::Boolean(flag) => flag.to_string(),
        };
        params.push(("filter", format!("{key}|{rendered}")));
    }

    RemoteQuery { params }
}

// Same output as a browser's encodeURIComponent for the characters we care about.
fn encode_component(text: &str) -> String {
    byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Contains(String),
    OneOf(BTreeSet<String>),
    Equals(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldPredicate {
    field: String,
    condition: Condition,
}

impl FieldPredicate {
    fn matches(&self, record: &Record) -> bool {
        match &self.condition {
            Condition::Contains(needle) => field_text(record, &self.field)
                .map(|text| text.to_lowercase().contains(needle.as_str()))
                .unwrap_or(false),
            Condition::OneOf(values) => field_text(record, &self.field)
                .map(|text| values.contains(&text))
                .unwrap_or(false),
            Condition::Equals(expected) => match record.get(&self.field) {
                Some(Value::Bool(flag)) => flag == expected,
                Some(Value::String(text)) => text.eq_ignore_ascii_case(&expected.to_string()),
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKind {
    Timestamp,
    Natural,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SortOrder {
    field: String,
    direction: SortDirection,
    kind: SortKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalPlan {
    search: Option<FieldPredicate>,
    predicates: Vec<FieldPredicate>,
    order: Option<SortOrder>,
}

impl LocalPlan {
    pub fn matches(&self, record: &Record) -> bool {
        self.search
            .iter()
            .chain(self.predicates.iter())
            .all(|predicate| predicate.matches(record))
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let Some(order) = &self.order else {
            return Ordering::Equal;
        };

        let left = sort_key(a.get(&order.field), order.kind);
        let right = sort_key(b.get(&order.field), order.kind);

        match (left, right) {
            (Some(left), Some(right)) => match order.direction {
                SortDirection::Ascending => left.compare(&right),
                SortDirection::Descending => right.compare(&left),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.order.is_some()
    }
}

pub fn build_local_plan(query: &ListQuery, options: &QueryOptions) -> LocalPlan {
    let search = query.filters.query_value().map(|text| FieldPredicate {
        field: options.query_key.clone(),
        condition: Condition::Contains(text.to_lowercase()),
    });

    let predicates = query
        .filters
        .active_filters()
        .map(|(key, value)| FieldPredicate {
            field: key.to_string(),
            condition: match value {
                FilterValue::Scalar(text) => Condition::Contains(text.to_lowercase()),
                FilterValue::Selection(values) => Condition::OneOf(values.clone()),
                FilterValue::Boolean(flag) => Condition::Equals(*flag),
            },
        })
        .collect();

    let order = query.sort.as_ref().map(|sort| SortOrder {
        field: sort.field.clone(),
        direction: sort.direction,
        kind: if options.date_fields.contains(&sort.field) {
            SortKind::Timestamp
        } else {
            SortKind::Natural
        },
    });

    LocalPlan {
        search,
        predicates,
        order,
    }
}

// Numbers order before text so mixed columns still sort consistently.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text { folded: String, raw: String },
}

impl SortKey {
    fn text(raw: String) -> Self {
        SortKey::Text {
            folded: raw.to_lowercase(),
            raw,
        }
    }

    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(left), SortKey::Number(right)) => left.total_cmp(right),
            (SortKey::Number(_), SortKey::Text { .. }) => Ordering::Less,
            (SortKey::Text { .. }, SortKey::Number(_)) => Ordering::Greater,
            (
                SortKey::Text { folded, raw },
                SortKey::Text {
                    folded: other_folded,
                    raw: other_raw,
                },
            ) => folded.cmp(other_folded).then_with(|| raw.cmp(other_raw)),
        }
    }
}

fn sort_key(value: Option<&Value>, kind: SortKind) -> Option<SortKey> {
    let value = value.filter(|value| !value.is_null())?;
    match kind {
        SortKind::Timestamp => parse_timestamp(value).map(|millis| SortKey::Number(millis as f64)),
        SortKind::Natural => match value {
            Value::Number(number) => number.as_f64().map(SortKey::Number),
            Value::Bool(flag) => Some(SortKey::Number(if *flag { 1.0 } else { 0.0 })),
            other => display_value(other).map(SortKey::text),
        },
    }
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.timestamp_millis());
            }
            if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(parsed.and_utc().timestamp_millis());
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc().timestamp_millis())
        }
        _ => None,
    }
}
