use std::cmp::Ordering;

use common_types::{FilterCriteria, FilterValue, PoolRecord, SortField, SortOrder};

/// Numeric view over a pool attribute by its resolved name. `None` for
/// unknown names and values that do not coerce to a finite number; a `None`
/// fails every filter operator and sorts last under every direction.
pub fn numeric_attr(pool: &PoolRecord, attr: &str) -> Option<f64> {
    let value = match attr {
        "bin_step" => Some(pool.bin_step as f64),
        "liquidity" => parse_num(&pool.liquidity),
        "fees_24h" => Some(pool.fees_24h),
        "trade_volume_24h" => Some(pool.trade_volume_24h),
        "current_price" => Some(pool.current_price),
        "apr" => Some(pool.apr),
        "apy" => Some(pool.apy),
        "base_fee" | "base_fee_percentage" => parse_num(&pool.base_fee_percentage),
        "max_fee" | "max_fee_percentage" => parse_num(&pool.max_fee_percentage),
        "protocol" | "protocol_fee_percentage" => parse_num(&pool.protocol_fee_percentage),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn parse_num(raw: &str) -> Option<f64> {
    raw.parse().ok()
}

/// Keeps the pools satisfying every constraint of every criteria field.
/// Returns a subset of the input and is idempotent.
pub fn filter_pools(pools: &[PoolRecord], criteria: &FilterCriteria) -> Vec<PoolRecord> {
    pools
        .iter()
        .filter(|pool| passes(pool, criteria))
        .cloned()
        .collect()
}

fn passes(pool: &PoolRecord, criteria: &FilterCriteria) -> bool {
    criteria.iter().all(|(field, constraints)| {
        let Some(lhs) = numeric_attr(pool, field) else {
            return false;
        };
        constraints.iter().all(|c| match &c.value {
            FilterValue::Num(rhs) => c.op.holds(lhs, *rhs),
            FilterValue::Text(_) => false,
        })
    })
}

/// Stable multi-key sort. Missing values go last regardless of direction;
/// full ties keep their input order.
pub fn sort_pools(mut pools: Vec<PoolRecord>, keys: &[SortField]) -> Vec<PoolRecord> {
    pools.sort_by(|a, b| compare(a, b, keys));
    pools
}

fn compare(a: &PoolRecord, b: &PoolRecord, keys: &[SortField]) -> Ordering {
    for key in keys {
        let attr = key.field.attr();
        match (numeric_attr(a, attr), numeric_attr(b, attr)) {
            (None, None) => continue,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                if ord == Ordering::Equal {
                    continue;
                }
                return match key.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                };
            }
        }
    }
    Ordering::Equal
}
