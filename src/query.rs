use std::collections::{BTreeMap, HashMap};

/// Records per page. Not configurable per request.
pub const PAGE_LIMIT: u64 = 25;

pub const FILTER_FIELDS: [&str; 4] = ["id", "author", "from", "to"];

pub type RawParams = HashMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
    pub filters: BTreeMap<String, String>,
    pub reverse: bool,
}

impl QueryDescriptor {
    pub fn from_params(params: &RawParams) -> Self {
        let page = parse_page(params.get("p").map(String::as_str));
        let filters = FILTER_FIELDS
            .iter()
            .filter_map(|field| {
                params
                    .get(*field)
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect();
        let reverse = params
            .get("reverse")
            .map(|v| parse_flag(v))
            .unwrap_or(false);

        Self {
            page,
            limit: PAGE_LIMIT,
            offset: page_offset(page, PAGE_LIMIT),
            filters,
            reverse,
        }
    }

    /// Verbatim filter value, empty when the field was not submitted.
    pub fn filter(&self, field: &str) -> &str {
        self.filters.get(field).map(String::as_str).unwrap_or("")
    }

    /// Integer filter value; anything unparsable means "unfiltered" (0).
    pub fn numeric_filter(&self, field: &str) -> i64 {
        parse_lenient_i64(self.filter(field))
    }

    pub fn limit_i64(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }

    pub fn offset_i64(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    /// Human readable summary of the search filters, e.g. `id: foo, author: alice`.
    pub fn describe_search(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let id = self.filter("id");
        if !id.is_empty() {
            parts.push(format!("id: {id}"));
        }
        let author = self.filter("author");
        if !author.is_empty() {
            parts.push(format!("author: {author}"));
        }
        parts.join(", ")
    }

    /// Query string for another page of the audit log under the same
    /// `from`/`to`/`reverse` settings, e.g. `p=3&from=100`.
    pub fn audit_query(&self, page: u64) -> String {
        let mut pairs: Vec<(&str, String)> = vec![("p", page.to_string())];
        for field in ["from", "to"] {
            let value = self.filter(field);
            if !value.is_empty() {
                pairs.push((field, value.to_string()));
            }
        }
        if self.reverse {
            pairs.push(("reverse", "true".to_string()));
        }
        match reqwest::Url::parse_with_params("http://localhost/", &pairs) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => format!("p={page}"),
        }
    }
}

pub fn parse_page(raw: Option<&str>) -> u64 {
    match raw.map(str::trim).and_then(|v| v.parse::<i64>().ok()) {
        Some(page) if page >= 1 => page as u64,
        _ => 1,
    }
}

pub fn page_offset(page: u64, limit: u64) -> u64 {
    page.max(1).saturating_sub(1).saturating_mul(limit)
}

pub fn parse_lenient_i64(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}
