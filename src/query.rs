// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Query and Filter Engine
//!
//! Turns a declarative list request into a deterministic, ordered page.
//!
//! Exact-match conditions are pushed down to the store, which evaluates them
//! against the snake_case storage record. Free-text search, location and tag
//! criteria are evaluated here on the full matching set, so the pagination
//! window is always applied after every filter.
//!
//! Ordering is newest-created-first with ties broken by ascending id.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{Property, User};
use crate::storage::{Resource, ResourceStore, StoreResult};

/// An equality condition on a storage record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatch {
    /// snake_case storage field name.
    pub field: &'static str,
    /// Expected wire value of the field.
    pub value: String,
}

impl ExactMatch {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Whether a serialized storage record satisfies this condition.
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        record.get(self.field).and_then(serde_json::Value::as_str) == Some(self.value.as_str())
    }
}

/// A `limit`/`offset` slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub offset: usize,
    /// `None` means "to the end".
    pub limit: Option<usize>,
}

impl Window {
    /// The whole result set.
    pub const ALL: Window = Window {
        offset: 0,
        limit: None,
    };

    /// Build a window from raw query parameters.
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit,
        }
    }

    /// Whether the item at `position` (0-based, after filtering) is inside.
    pub fn contains(&self, position: usize) -> bool {
        position >= self.offset
            && self
                .limit
                .is_none_or(|limit| position - self.offset < limit)
    }

    /// Slice an already filtered and ordered list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let take = self.limit.unwrap_or(usize::MAX);
        items.into_iter().skip(self.offset).take(take).collect()
    }
}

/// What a store is asked for: exact-match conditions plus a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    pub conditions: Vec<ExactMatch>,
    pub window: Window,
}

impl StoreQuery {
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        self.conditions.iter().all(|condition| condition.matches(record))
    }
}

/// One page of results plus the filtered total before windowing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Newest-first comparator shared by every backend.
pub fn newest_first(
    a: (DateTime<Utc>, &str),
    b: (DateTime<Utc>, &str),
) -> Ordering {
    b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

/// Text attributes a resource exposes to post-retrieval filters.
pub trait Filterable {
    /// Attributes scanned by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Location attribute, if the resource supports location filtering.
    fn location(&self) -> Option<&str> {
        None
    }

    /// Tag set, if the resource supports tag filtering.
    fn tags(&self) -> &[String] {
        &[]
    }
}

/// A fully parsed list request.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    pub exact: Vec<ExactMatch>,
    /// Lowercased free-text needle.
    pub search: Option<String>,
    /// Lowercased location needle.
    pub location: Option<String>,
    /// Lowercased tag needles; blanks already removed.
    pub tags: Vec<String>,
    pub window: Window,
}

impl ListRequest {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub fn exact(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.exact.push(ExactMatch::new(field, value));
        self
    }

    pub fn search(mut self, needle: Option<&str>) -> Self {
        self.search = normalize_needle(needle);
        self
    }

    pub fn location(mut self, needle: Option<&str>) -> Self {
        self.location = normalize_needle(needle);
        self
    }

    /// Comma-separated tag list, e.g. `pool,garden`.
    pub fn tags(mut self, raw: Option<&str>) -> Self {
        self.tags = raw
            .unwrap_or_default()
            .split(',')
            .filter_map(|tag| normalize_needle(Some(tag)))
            .collect();
        self
    }

    fn has_post_filters(&self) -> bool {
        self.search.is_some() || self.location.is_some() || !self.tags.is_empty()
    }

    /// Whether an item passes the search, location and tag criteria.
    pub fn accepts<R: Filterable>(&self, item: &R) -> bool {
        if let Some(needle) = &self.search {
            let hit = item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(needle) = &self.location {
            let hit = item
                .location()
                .is_some_and(|location| location.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }

        if !self.tags.is_empty() {
            let stored: Vec<String> = item.tags().iter().map(|tag| tag.to_lowercase()).collect();
            let hit = self
                .tags
                .iter()
                .any(|wanted| stored.iter().any(|tag| tag.contains(wanted.as_str())));
            if !hit {
                return false;
            }
        }

        true
    }
}

impl Filterable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.display_name.as_str(), self.wallet_address.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.location.as_deref());
        fields
    }
}

impl Filterable for Property {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.location.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }

    fn location(&self) -> Option<&str> {
        Some(&self.location)
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

fn normalize_needle(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase)
}

/// Run a list request against a store.
///
/// Without post-filters the window is pushed down; otherwise the store
/// returns the full exact-matching set and the window is applied here.
pub fn execute<R>(store: &dyn ResourceStore<R>, request: &ListRequest) -> StoreResult<Page<R>>
where
    R: Resource + Filterable,
{
    if !request.has_post_filters() {
        return store.list(&StoreQuery {
            conditions: request.exact.clone(),
            window: request.window,
        });
    }

    let candidates = store.list(&StoreQuery {
        conditions: request.exact.clone(),
        window: Window::ALL,
    })?;

    let filtered: Vec<R> = candidates
        .items
        .into_iter()
        .filter(|item| request.accepts(item))
        .collect();
    let total = filtered.len();

    Ok(Page {
        items: request.window.apply(filtered),
        total,
    })
}
