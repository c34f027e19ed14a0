//! Pagination envelope shared by the list operations.

use serde::{Deserialize, Serialize};

/// A 1-based page request. Construct with [`PageRequest::clamped`] at the
/// boundary; the store additionally rejects a zero limit outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u32,
  pub limit: u32,
}

impl PageRequest {
  pub const DEFAULT_LIMIT: u32 = 20;
  pub const MAX_LIMIT: u32 = 100;

  /// Clamp raw query values: a page below 1 becomes 1, a limit outside
  /// `[1, MAX_LIMIT]` falls back to `DEFAULT_LIMIT`.
  pub fn clamped(page: i64, limit: i64) -> Self {
    let page = page.clamp(1, i64::from(u32::MAX)) as u32;
    let limit = if (1..=i64::from(Self::MAX_LIMIT)).contains(&limit) {
      limit as u32
    } else {
      Self::DEFAULT_LIMIT
    };
    Self { page, limit }
  }

  /// Number of records skipped before this page starts.
  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self { page: 1, limit: Self::DEFAULT_LIMIT }
  }
}

/// One page of results plus the totals a client needs to walk the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub total:       u64,
  pub page:        u32,
  pub limit:       u32,
  pub total_pages: u64,
}

impl<T> Page<T> {
  /// Assemble a page. `request.limit` must be at least 1 — the stores
  /// guarantee this before querying.
  pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
    Self {
      items,
      total,
      page: request.page,
      limit: request.limit,
      total_pages: total.div_ceil(u64::from(request.limit)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clamping() {
    assert_eq!(PageRequest::clamped(0, 20), PageRequest { page: 1, limit: 20 });
    assert_eq!(PageRequest::clamped(-3, 20).page, 1);
    assert_eq!(
      PageRequest::clamped(2, 0).limit,
      PageRequest::DEFAULT_LIMIT
    );
    assert_eq!(
      PageRequest::clamped(2, 101).limit,
      PageRequest::DEFAULT_LIMIT
    );
    assert_eq!(PageRequest::clamped(2, 100).limit, 100);
  }

  #[test]
  fn total_pages_rounds_up() {
    let request = PageRequest { page: 1, limit: 3 };
    assert_eq!(Page::new(vec![1, 2, 3], 5, request).total_pages, 2);
    assert_eq!(Page::<i32>::new(vec![], 0, request).total_pages, 0);
    assert_eq!(Page::new(vec![1], 3, request).total_pages, 1);
  }

  #[test]
  fn offset_is_zero_based() {
    assert_eq!(PageRequest { page: 1, limit: 20 }.offset(), 0);
    assert_eq!(PageRequest { page: 3, limit: 20 }.offset(), 40);
  }
}
