use common_types::{
    Constraint, FilterCriteria, FilterOp, FilterValue, PoolQuery, SortField, SortKey, Topic,
};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const ALLOWED_SORTS: [&str; 4] = ["fees", "liquidity", "volume", "apr"];
const ALLOWED_FILTERS: [&str; 8] = [
    "bin_step",
    "base_fee",
    "max_fee",
    "protocol",
    "liquidity",
    "fees",
    "volume",
    "apr",
];

static FILTER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+)(>=|<=|==|=|>|<)(.+)$").expect("filter token pattern"));

/// Errors reported back to the user verbatim; they must stay descriptive and
/// free of internal detail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid sort field: {0}. Allowed sort fields are: fees, liquidity, volume, apr.")]
    InvalidSortField(String),
    #[error(
        "Invalid filter format: {0}. Filters must follow the field<operator>value format, \
         e.g. liquidity>5000."
    )]
    InvalidFilterFormat(String),
    #[error(
        "Invalid filter field: {0}. Allowed filter fields are: bin_step, base_fee, max_fee, \
         protocol, liquidity, fees, volume, apr."
    )]
    InvalidFilterField(String),
    #[error("Unexpected command part: {0}. Use -f for filters and -s for sorting.")]
    UnexpectedToken(String),
    #[error("Unknown subscription topic: {0}. Available topics: newPools, increasedVolume.")]
    InvalidTopic(String),
}

/// User-facing filter aliases -> record attribute names. Unmapped names pass
/// through unchanged.
fn resolve_alias(field: &str) -> &str {
    match field {
        "fees" => "fees_24h",
        "volume" => "trade_volume_24h",
        other => other,
    }
}

enum Section {
    None,
    Sort,
    Filter,
}

/// Parses the argument string of a `/pools` command into sort fields and
/// filter criteria. Defaults: `bin_step = 100` and `liquidity > 0` unless the
/// user constrains the same field; sort `liquidity desc` when no `-s` section
/// was given. Repeated filter tokens for one field accumulate, so
/// `liquidity>100 liquidity<9000` expresses a range.
pub fn parse_pools_command(input: &str) -> Result<PoolQuery, ParseError> {
    let mut sort = Vec::new();
    let mut filters = FilterCriteria::new();
    let mut section = Section::None;
    let mut saw_sort_flag = false;

    for token in input.split_whitespace() {
        match token {
            "-s" => {
                section = Section::Sort;
                saw_sort_flag = true;
            }
            "-f" => section = Section::Filter,
            _ => match section {
                Section::Sort => sort.push(parse_sort_token(token)?),
                Section::Filter => {
                    let (field, constraint) = parse_filter_token(token)?;
                    filters.entry(field).or_default().push(constraint);
                }
                Section::None => return Err(ParseError::UnexpectedToken(token.to_string())),
            },
        }
    }

    if !saw_sort_flag {
        sort.push(SortField::desc(SortKey::Liquidity));
    }
    filters
        .entry("bin_step".to_string())
        .or_insert_with(|| vec![Constraint {
            op: FilterOp::Eq,
            value: FilterValue::Num(100.0),
        }]);
    filters
        .entry("liquidity".to_string())
        .or_insert_with(|| vec![Constraint {
            op: FilterOp::Gt,
            value: FilterValue::Num(0.0),
        }]);

    Ok(PoolQuery { sort, filters })
}

fn parse_sort_token(token: &str) -> Result<SortField, ParseError> {
    let key = match token {
        "fees" => SortKey::Fees,
        "liquidity" => SortKey::Liquidity,
        "volume" => SortKey::Volume,
        "apr" => SortKey::Apr,
        _ => return Err(ParseError::InvalidSortField(token.to_string())),
    };
    debug_assert!(ALLOWED_SORTS.contains(&token));
    Ok(SortField::desc(key))
}

fn parse_filter_token(token: &str) -> Result<(String, Constraint), ParseError> {
    let caps = FILTER_TOKEN
        .captures(token)
        .ok_or_else(|| ParseError::InvalidFilterFormat(token.to_string()))?;
    let field = &caps[1];
    if !ALLOWED_FILTERS.contains(&field) {
        return Err(ParseError::InvalidFilterField(field.to_string()));
    }
    let op = match &caps[2] {
        ">" => FilterOp::Gt,
        "<" => FilterOp::Lt,
        ">=" => FilterOp::Ge,
        "<=" => FilterOp::Le,
        _ => FilterOp::Eq,
    };
    let raw = &caps[3];
    let value = match raw.parse::<f64>() {
        Ok(n) => FilterValue::Num(n),
        Err(_) => FilterValue::Text(raw.to_string()),
    };
    Ok((resolve_alias(field).to_string(), Constraint { op, value }))
}

/// Parses subscription topics for `/subscribe` and `/unsubscribe`. An empty
/// result is valid: for `/unsubscribe` it means "everything".
pub fn parse_topics(input: &str) -> Result<Vec<Topic>, ParseError> {
    input
        .split_whitespace()
        .map(|token| match token {
            "newPools" => Ok(Topic::NewPools),
            "increasedVolume" => Ok(Topic::IncreasedVolume),
            _ => Err(ParseError::InvalidTopic(token.to_string())),
        })
        .collect()
}
