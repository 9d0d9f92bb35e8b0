//
//  asc-cli
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! Pagination over `links.next` chains.
//!
//! App Store Connect paginates collections with an opaque cursor carried in
//! `links.next`. The [`Paginator`] follows that chain in one of two modes:
//!
//! | Mode | Operation | Result |
//! |------|-----------|--------|
//! | Aggregate | [`Paginator::paginate_all`] | one [`Document`] with every page's `data` in server order and `included` deduplicated by `(type, id)` |
//! | Stream | [`Paginator::paginate_stream`] | each page handed to a sink before the next request is sent |
//!
//! Every next URL is checked before it is followed:
//!
//! - it must share scheme and host with the client's base URL, or be a known
//!   App Store Connect host
//! - query parameters of the first request that the server dropped from the
//!   next URL are carried over
//! - a URL already visited in this traversal aborts with
//!   `detected repeated pagination URL`
//!
//! The paginator knows nothing about output. Callers decide what a page
//! becomes.

use std::collections::HashSet;
use std::time::Duration;

use indicatif::ProgressBar;
use reqwest::Method;
use url::Url;

use super::{Document, PrimaryData, Resource};
use crate::api::client::{AscClient, KNOWN_HOSTS};
use crate::api::request::RequestDescriptor;
use crate::error::AscError;

/// Walks paginated collections for one client.
pub struct Paginator<'a> {
    client: &'a AscClient,
    page_timeout: Option<Duration>,
    progress: Option<ProgressBar>,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a AscClient) -> Self {
        Self {
            client,
            page_timeout: None,
            progress: None,
        }
    }

    /// Bounds each page request separately from the invocation deadline.
    pub fn with_page_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.page_timeout = timeout;
        self
    }

    /// Reports progress on a spinner while aggregating.
    pub fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches every page and merges them into one collection document.
    ///
    /// # Errors
    ///
    /// Any transport or API error from a page, or [`AscError::Pagination`]
    /// when the chain is unsafe to follow. Partial results are discarded.
    pub async fn paginate_all(&self, req: &RequestDescriptor) -> Result<Document, AscError> {
        let mut data: Vec<Resource> = Vec::new();
        let mut included: Vec<Resource> = Vec::new();
        let mut included_keys: HashSet<(String, String)> = HashSet::new();
        let mut meta = None;

        let outcome = self
            .walk(req, |page| {
                for resource in page.included {
                    if included_keys.insert((resource.kind.clone(), resource.id.clone())) {
                        included.push(resource);
                    }
                }
                if page.meta.is_some() {
                    meta = page.meta;
                }
                data.extend(match page.data {
                    PrimaryData::Many(items) => items,
                    PrimaryData::One(item) => vec![*item],
                    PrimaryData::None => Vec::new(),
                });
                if let Some(progress) = &self.progress {
                    progress.set_message(format!("fetched {} items", data.len()));
                }
                Ok(())
            })
            .await;

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }
        let pages = outcome?;
        tracing::debug!("paginated {} pages, {} items, {} included", pages, data.len(), included.len());

        Ok(Document {
            data: PrimaryData::Many(data),
            included,
            links: None,
            meta,
            errors: Vec::new(),
        })
    }

    /// Hands each page to `sink` as it arrives.
    ///
    /// The sink runs before the next page is requested, so pages already
    /// handed over stay delivered even if a later page fails.
    ///
    /// Returns the number of pages delivered.
    pub async fn paginate_stream<F>(&self, req: &RequestDescriptor, mut sink: F) -> Result<usize, AscError>
    where
        F: FnMut(&Document) -> Result<(), AscError>,
    {
        self.walk(req, |page| sink(&page)).await
    }

    async fn walk<F>(&self, req: &RequestDescriptor, mut on_page: F) -> Result<usize, AscError>
    where
        F: FnMut(Document) -> Result<(), AscError>,
    {
        let base = self.client.base_url();
        let first_url = req.url(base)?;
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(first_url.to_string());

        let mut current = req.clone();
        let mut pages = 0usize;

        loop {
            let page = self
                .client
                .send_with_timeout(&current, self.page_timeout)
                .await?;
            pages += 1;
            if let Some(progress) = &self.progress {
                progress.tick();
            }

            let next = page.next_url().map(str::to_string);
            on_page(page)?;

            let Some(next) = next else {
                break;
            };

            let next_url = merge_omitted_query(validate_next_url(&next, base)?, &first_url);
            if !seen.insert(next_url.to_string()) {
                return Err(AscError::Pagination("detected repeated pagination URL".to_string()));
            }
            tracing::trace!("following {}", next_url);

            current = RequestDescriptor {
                method: Method::GET,
                path: next_url.to_string(),
                query: Vec::new(),
                headers: req.headers.clone(),
                body: None,
                accept: req.accept.clone(),
            };
        }

        Ok(pages)
    }
}

/// Checks that `next` is safe to follow from a client rooted at `base`.
///
/// Relative URLs are resolved against `base`.
pub fn validate_next_url(next: &str, base: &Url) -> Result<Url, AscError> {
    let url = base
        .join(next)
        .map_err(|e| AscError::Pagination(format!("malformed pagination URL {next:?}: {e}")))?;

    let same_origin = url.scheme() == base.scheme()
        && url.host_str() == base.host_str()
        && url.port_or_known_default() == base.port_or_known_default();
    let known_host = url.scheme() == "https"
        && url
            .host_str()
            .is_some_and(|host| KNOWN_HOSTS.iter().any(|known| known.eq_ignore_ascii_case(host)));

    if same_origin || known_host {
        Ok(url)
    } else {
        Err(AscError::Pagination(format!(
            "refusing to follow pagination URL on unexpected host {}",
            url.host_str().unwrap_or("<none>")
        )))
    }
}

/// Re-adds first-page query parameters whose keys are absent from `next`.
pub fn merge_omitted_query(mut next: Url, first: &Url) -> Url {
    let present: HashSet<String> = next.query_pairs().map(|(k, _)| k.into_owned()).collect();
    let missing: Vec<(String, String)> = first
        .query_pairs()
        .filter(|(k, _)| !present.contains(k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if !missing.is_empty() {
        let mut pairs = next.query_pairs_mut();
        for (key, value) in &missing {
            pairs.append_pair(key, value);
        }
    }
    next
}
