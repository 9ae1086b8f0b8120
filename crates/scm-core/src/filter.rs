// ── List queries and post-fetch filtering ──
//
// The API only narrows listings by container. Everything else (exact
// container match, exclusions, attribute filters) is applied client-side
// to the fully paginated result, in that order, without reordering.

use tracing::warn;

use crate::container::{Container, ContainerKind};
use crate::error::CoreError;
use crate::resource::Contained;

/// Typed attribute filter for one resource type.
///
/// A record passes when it matches every filter key that was supplied.
pub trait AttributeFilter<R> {
    fn matches(&self, record: &R) -> bool;

    /// Reject filter values the API could never match.
    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Filter for resource types without attribute filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;

impl<R> AttributeFilter<R> for NoFilter {
    fn matches(&self, _record: &R) -> bool {
        true
    }
}

/// `None` means "not supplied" and always matches; otherwise `value` must be in `wanted`.
pub fn match_one<T: PartialEq>(wanted: Option<&[T]>, value: Option<&T>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => value.is_some_and(|v| wanted.contains(v)),
    }
}

/// `None` means "not supplied" and always matches; otherwise the intersection
/// of `wanted` and `values` must be non-empty.
pub fn match_any<'a, T: PartialEq + 'a>(
    wanted: Option<&[T]>,
    values: impl IntoIterator<Item = &'a T>,
) -> bool {
    match wanted {
        None => true,
        Some(wanted) => values.into_iter().any(|v| wanted.contains(v)),
    }
}

/// Everything a `list()` call needs: the container, paging, and filters.
#[derive(Debug, Clone)]
pub struct ListQuery<F> {
    pub container: Container,
    /// Page size; `None` uses the resource default.
    pub max_limit: Option<u32>,
    /// Keep only records that live literally in `container`.
    pub exact_match: bool,
    pub exclude_folders: Vec<String>,
    pub exclude_snippets: Vec<String>,
    pub exclude_devices: Vec<String>,
    pub filter: F,
}

impl<F: Default> ListQuery<F> {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            max_limit: None,
            exact_match: false,
            exclude_folders: Vec::new(),
            exclude_snippets: Vec::new(),
            exclude_devices: Vec::new(),
            filter: F::default(),
        }
    }
}

impl<F> ListQuery<F> {
    pub fn max_limit(mut self, limit: u32) -> Self {
        self.max_limit = Some(limit);
        self
    }

    pub fn exact_match(mut self, exact: bool) -> Self {
        self.exact_match = exact;
        self
    }

    pub fn exclude_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_folders = folders.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_snippets<I, S>(mut self, snippets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_snippets = snippets.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_devices<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_devices = devices.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filter = filter;
        self
    }

    fn excluded(&self, kind: ContainerKind) -> &[String] {
        match kind {
            ContainerKind::Folder => &self.exclude_folders,
            ContainerKind::Snippet => &self.exclude_snippets,
            ContainerKind::Device => &self.exclude_devices,
        }
    }
}

/// Resolve the page size for a listing.
///
/// `0` is rejected; anything above `cap` is silently clamped to `cap`.
pub fn effective_limit(requested: Option<u32>, default: u32, cap: u32) -> Result<u32, CoreError> {
    match requested {
        Some(0) => Err(CoreError::validation("max_limit must be greater than 0")),
        Some(limit) if limit > cap => {
            warn!("max_limit {limit} exceeds server maximum, using {cap}");
            Ok(cap)
        }
        Some(limit) => Ok(limit),
        None => Ok(default.min(cap)),
    }
}

/// Apply the post-fetch filters to a fully paginated listing.
///
/// Order: exact container match, then exclusions, then attribute filters.
/// Filtering only selects; server order is preserved.
pub fn apply_filters<R, F>(records: Vec<R>, query: &ListQuery<F>) -> Vec<R>
where
    R: Contained,
    F: AttributeFilter<R>,
{
    records
        .into_iter()
        .filter(|r| !query.exact_match || r.container_fields().is_in(&query.container))
        .filter(|r| {
            let fields = r.container_fields();
            [
                ContainerKind::Folder,
                ContainerKind::Snippet,
                ContainerKind::Device,
            ]
            .into_iter()
            .all(|kind| {
                fields
                    .get(kind)
                    .is_none_or(|value| !query.excluded(kind).iter().any(|x| x == value))
            })
        })
        .filter(|r| query.filter.matches(r))
        .collect()
}
