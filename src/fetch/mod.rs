// src/fetch/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::acs;

pub mod response;

pub use response::{parse_response, TractEstimates};

/// State + county pair every requested tract is assumed to share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountyScope {
    pub state: String,
    pub county: String,
}

impl CountyScope {
    /// Derive the scope from the first GEOID (`SSCCCTTTTTT`).
    ///
    /// Only the first identifier is consulted. Tracts from another county are
    /// reported but still queried against this scope, so they come back as
    /// join misses.
    pub fn from_geoids(geoids: &[String]) -> Result<Self> {
        let first = geoids
            .first()
            .ok_or_else(|| anyhow!("no tract identifiers to fetch"))?;
        let (state, county) = match (first.get(..2), first.get(2..5)) {
            (Some(s), Some(c)) => (s.to_string(), c.to_string()),
            _ => bail!("GEOID {:?} is shorter than state+county", first),
        };

        let prefix = &first[..5];
        let foreign: Vec<&str> = geoids
            .iter()
            .filter(|g| !g.starts_with(prefix))
            .map(String::as_str)
            .collect();
        if !foreign.is_empty() {
            warn!(
                state = %state,
                county = %county,
                tracts = ?foreign,
                "tracts outside the queried county will not be found"
            );
        }

        Ok(Self { state, county })
    }
}

/// `<base>?get=NAME,<vars>&for=tract:*&in=state:SS&in=county:CCC`
pub fn build_query_url(base: &Url, scope: &CountyScope) -> Url {
    let fields = std::iter::once(acs::NAME_FIELD)
        .chain(acs::VARIABLES.iter().copied())
        .collect::<Vec<_>>()
        .join(",");

    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("get", &fields)
        .append_pair("for", &format!("{}:*", acs::TRACT_FIELD))
        .append_pair("in", &format!("{}:{}", acs::STATE_FIELD, scope.state))
        .append_pair("in", &format!("{}:{}", acs::COUNTY_FIELD, scope.county));
    url
}

async fn get_text(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

/// Fetch B18105 estimates for every tract in the county of the first GEOID
/// and keep only the requested tracts. One request, no retry.
#[instrument(level = "info", skip(client, base, geoids), fields(tracts = geoids.len()))]
pub async fn fetch_b18105(
    client: &Client,
    base: &Url,
    geoids: &[String],
) -> Result<Vec<TractEstimates>> {
    let scope = CountyScope::from_geoids(geoids)?;
    info!("Fetching data for State {}, County {}", scope.state, scope.county);

    let url = build_query_url(base, &scope);
    info!("API URL: {}", url);

    let body = get_text(client, &url).await?;
    let requested: HashSet<&str> = geoids.iter().map(String::as_str).collect();
    let rows = parse_response(&body, &requested)?;

    info!("Fetched data for {} tracts", rows.len());
    if rows.len() < requested.len() {
        warn!(
            requested = requested.len(),
            returned = rows.len(),
            "API returned fewer tracts than requested"
        );
    }
    Ok(rows)
}
