// src/fetch/response.rs
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::trace;

use crate::acs;

/// One tract's B18105 estimates. `None` marks a value the API left null or
/// sent as something other than an integer count.
#[derive(Debug, Clone, PartialEq)]
pub struct TractEstimates {
    pub geoid: String,
    pub name: Option<String>,
    pub estimates: [Option<i64>; acs::VARIABLE_COUNT],
}

impl TractEstimates {
    pub fn get(&self, code: &str) -> Option<i64> {
        acs::variable_index(code).and_then(|i| self.estimates[i])
    }
}

/// Cell as text, for the geography columns.
fn cell_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce an estimate cell to a count; anything unparseable becomes `None`.
fn cell_count(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Parse the API's array-of-arrays body (first row = headers), rebuild each
/// GEOID from state+county+tract and keep only tracts in `requested`.
pub fn parse_response(body: &str, requested: &HashSet<&str>) -> Result<Vec<TractEstimates>> {
    let table: Vec<Vec<Value>> =
        serde_json::from_str(body).context("response is not a JSON array of arrays")?;
    let mut rows = table.into_iter();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("response has no header row"))?
        .iter()
        .map(|h| cell_text(h).unwrap_or_default())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("response is missing column {:?}", name))
    };
    let state_idx = column(acs::STATE_FIELD)?;
    let county_idx = column(acs::COUNTY_FIELD)?;
    let tract_idx = column(acs::TRACT_FIELD)?;
    let name_idx = headers.iter().position(|h| h == acs::NAME_FIELD);
    let var_idx = acs::VARIABLES
        .iter()
        .map(|v| column(*v))
        .collect::<Result<Vec<_>>>()?;

    let mut out = Vec::new();
    for (n, row) in rows.enumerate() {
        if row.len() != headers.len() {
            bail!(
                "data row {} has {} cells, header has {}",
                n + 1,
                row.len(),
                headers.len()
            );
        }
        let geoid = [state_idx, county_idx, tract_idx]
            .iter()
            .map(|&i| cell_text(&row[i]).unwrap_or_default())
            .collect::<String>();
        if !requested.contains(geoid.as_str()) {
            trace!(geoid = %geoid, "skipping unrequested tract");
            continue;
        }

        let mut estimates = [None; acs::VARIABLE_COUNT];
        for (slot, &i) in estimates.iter_mut().zip(&var_idx) {
            *slot = cell_count(&row[i]);
        }
        out.push(TractEstimates {
            geoid,
            name: name_idx.and_then(|i| cell_text(&row[i])),
            estimates,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_with(values: Vec<Value>) -> String {
        let mut header = vec![json!("NAME")];
        header.extend(acs::VARIABLES.iter().map(|v| json!(v)));
        header.extend([json!("state"), json!("county"), json!("tract")]);

        let mut row = vec![json!("Census Tract 108; San Francisco County; California")];
        row.extend(values);
        row.extend([json!("06"), json!("075"), json!("010800")]);
        json!([header, row]).to_string()
    }

    fn requested() -> HashSet<&'static str> {
        ["06075010800"].into_iter().collect()
    }

    #[test]
    fn coerces_text_numbers_and_marks_junk_undefined() -> Result<()> {
        let mut values: Vec<Value> = (0..15).map(|i| json!(i.to_string())).collect();
        values[0] = json!(1000);
        values[1] = Value::Null;
        values[2] = json!("-");
        values[3] = json!("12.0");
        let rows = parse_response(&body_with(values), &requested())?;

        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.geoid, "06075010800");
        assert_eq!(
            r.name.as_deref(),
            Some("Census Tract 108; San Francisco County; California")
        );
        assert_eq!(r.get(acs::TOTAL_5PLUS), Some(1000));
        assert_eq!(r.estimates[1], None);
        assert_eq!(r.estimates[2], None);
        assert_eq!(r.estimates[3], Some(12));
        assert_eq!(r.estimates[14], Some(14));
        Ok(())
    }

    #[test]
    fn drops_tracts_not_requested() -> Result<()> {
        let values = (0..15).map(|_| json!("1")).collect();
        let none: HashSet<&str> = HashSet::new();
        assert!(parse_response(&body_with(values), &none)?.is_empty());
        Ok(())
    }

    #[test]
    fn header_only_response_is_empty() -> Result<()> {
        let mut header = vec![json!("NAME")];
        header.extend(acs::VARIABLES.iter().map(|v| json!(v)));
        header.extend([json!("state"), json!("county"), json!("tract")]);
        let body = json!([header]).to_string();
        assert!(parse_response(&body, &requested())?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_variable_column_is_an_error() {
        let body = json!([["NAME", "state", "county", "tract"], ["x", "06", "075", "010800"]]);
        let err = parse_response(&body.to_string(), &requested()).unwrap_err();
        assert!(err.to_string().contains("B18105_001E"));
    }

    #[test]
    fn non_tabular_body_is_an_error() {
        assert!(parse_response("{\"error\": \"unknown variable\"}", &requested()).is_err());
        assert!(parse_response("[]", &requested()).is_err());
    }
}
