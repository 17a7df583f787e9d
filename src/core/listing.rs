//! Client-side list reducers
//!
//! Filtering, sorting and paging applied to lists already fetched from the
//! backend (admin category table, class browse and search pages), plus the
//! small text helpers the class and category forms use.

use std::cmp::Ordering;

use crate::core::api::{Category, LiveClass};

// ============================================================================
// Categories
// ============================================================================

/// Visibility filter on the admin category table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum VisibilityFilter {
    #[default]
    #[display("all")]
    All,
    #[display("visible")]
    Visible,
    #[display("hidden")]
    Hidden,
}

impl VisibilityFilter {
    fn matches(self, visible: bool) -> bool {
        match self {
            VisibilityFilter::All => true,
            VisibilityFilter::Visible => visible,
            VisibilityFilter::Hidden => !visible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityCounts {
    pub visible: usize,
    pub hidden: usize,
}

/// Order categories by `display_order`, keeping ties in their current order
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by_key(|c| c.display_order);
}

/// Categories matching `search` (name or description, case-insensitive) and
/// the visibility filter
pub fn filter_categories<'a>(
    categories: &'a [Category],
    search: &str,
    visibility: VisibilityFilter,
) -> Vec<&'a Category> {
    let needle = search.trim().to_lowercase();
    categories
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .filter(|c| visibility.matches(c.visible))
        .collect()
}

pub fn visibility_counts(categories: &[Category]) -> VisibilityCounts {
    let visible = categories.iter().filter(|c| c.visible).count();
    VisibilityCounts {
        visible,
        hidden: categories.len() - visible,
    }
}

/// Flip visibility of the category with `id` after the server accepted the
/// toggle. Returns false when no such category is loaded.
pub fn toggle_visibility(categories: &mut [Category], id: &str) -> bool {
    match categories.iter_mut().find(|c| c.id == id) {
        Some(category) => {
            category.visible = !category.visible;
            true
        }
        None => false,
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Class length buckets used by the search filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    /// Up to an hour
    Short,
    /// Over one hour, up to two
    Medium,
    Long,
}

impl DurationBucket {
    pub fn contains(self, minutes: u32) -> bool {
        match self {
            DurationBucket::Short => minutes <= 60,
            DurationBucket::Medium => minutes > 60 && minutes <= 120,
            DurationBucket::Long => minutes > 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassSort {
    /// Keep the order the results arrived in
    #[default]
    Relevance,
    /// Soonest first; unscheduled classes last
    Date,
    PriceLow,
    PriceHigh,
    /// Most enrollments first
    Popularity,
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Browse/search filters; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassFilter {
    pub query: Option<String>,
    /// Any of these category ids; empty means all
    pub category_ids: Vec<String>,
    pub price_range: Option<PriceRange>,
    pub duration: Option<DurationBucket>,
}

impl ClassFilter {
    pub fn is_active(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
            || !self.category_ids.is_empty()
            || self.price_range.is_some()
            || self.duration.is_some()
    }

    pub fn matches(&self, class: &LiveClass) -> bool {
        self.matches_query(class)
            && (self.category_ids.is_empty() || self.category_ids.contains(&class.category.id))
            && self
                .price_range
                .is_none_or(|range| range.contains(class.price))
            && self
                .duration
                .is_none_or(|bucket| bucket.contains(class.duration_minutes))
    }

    fn matches_query(&self, class: &LiveClass) -> bool {
        let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        let needle = query.to_lowercase();
        let hit = |text: &str| text.to_lowercase().contains(&needle);

        hit(&class.title)
            || class.description.as_deref().is_some_and(hit)
            || hit(&class.educator.name)
            || hit(&class.category.name)
            || class.topics.iter().any(|t| hit(t))
    }
}

pub fn filter_classes(classes: &[LiveClass], filter: &ClassFilter) -> Vec<LiveClass> {
    classes
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect()
}

pub fn sort_classes(classes: &mut [LiveClass], sort: ClassSort) {
    match sort {
        ClassSort::Relevance => {}
        ClassSort::Date => classes.sort_by(|a, b| match (a.scheduled_at, b.scheduled_at) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        ClassSort::PriceLow => classes.sort_by(|a, b| a.price.total_cmp(&b.price)),
        ClassSort::PriceHigh => classes.sort_by(|a, b| b.price.total_cmp(&a.price)),
        ClassSort::Popularity => {
            classes.sort_by(|a, b| b.enrollment_count.cmp(&a.enrollment_count))
        }
    }
}

// ============================================================================
// Paging
// ============================================================================

/// One page of a client-side list
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    /// Zero-based
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> PageSlice<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 0 && self.total_pages > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }
}

/// Zero-based page of `items`; out-of-range pages are empty
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> PageSlice<T> {
    let total_pages = if page_size == 0 {
        0
    } else {
        items.len().div_ceil(page_size)
    };
    let start = page.saturating_mul(page_size);
    let page_items = if page < total_pages {
        items[start..(start + page_size).min(items.len())].to_vec()
    } else {
        Vec::new()
    };

    PageSlice {
        items: page_items,
        page,
        page_size,
        total_items: items.len(),
        total_pages,
    }
}

// ============================================================================
// Text Helpers
// ============================================================================

/// URL slug: lowercase, runs of anything but `[a-z0-9]` become `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Trimmed, non-empty lines of a multi-line text field
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
