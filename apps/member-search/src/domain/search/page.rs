use serde::{Deserialize, Serialize};

use crate::errors::{QueryError, QueryResult};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Where NULL values land in an ordering
///
/// `Native` follows PostgreSQL: nulls sort last ascending, first descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullHandling {
    #[default]
    Native,
    NullsFirst,
    NullsLast,
}

/// One ordering term, naming a property of the search projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub property: String,
    pub direction: Direction,
    #[serde(default)]
    pub nulls: NullHandling,
}

impl Order {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Asc,
            nulls: NullHandling::Native,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: Direction::Desc,
            nulls: NullHandling::Native,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = NullHandling::NullsFirst;
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = NullHandling::NullsLast;
        self
    }
}

/// Ordered list of [`Order`] terms; empty means unsorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: orders.into_iter().collect(),
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Zero-based page request
///
/// # Example
/// ```
/// use member_search::domain::search::PageRequest;
///
/// let request = PageRequest::of(2, 3).unwrap();
/// assert_eq!(request.offset(), 6);
/// assert!(PageRequest::of(0, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

/// Wire form of [`PageRequest`], checked by [`PageRequest::of`] on the way in
#[derive(Deserialize)]
struct RawPageRequest {
    page: u32,
    size: u32,
    #[serde(default)]
    sort: Sort,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = QueryError;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        Ok(PageRequest::of(raw.page, raw.size)?.with_sort(raw.sort))
    }
}

impl PageRequest {
    /// Creates an unsorted request; `size` must be at least one
    pub fn of(page: u32, size: u32) -> QueryResult<Self> {
        if size == 0 {
            return Err(QueryError::InvalidPageRequest(
                "page size must be at least one".to_string(),
            ));
        }

        Ok(Self {
            page,
            size,
            sort: Sort::unsorted(),
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page_number(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Row offset of the first element on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn first(&self) -> Self {
        Self {
            page: 0,
            ..self.clone()
        }
    }
}

/// One page of results plus the total element count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    content: Vec<T>,
    number: u32,
    size: u32,
    total_elements: u64,
}

impl<T> Page<T> {
    /// Wraps `content` for `pageable`
    ///
    /// A non-empty page whose window reaches past `total` reports
    /// `offset + content.len()` instead, so a stale total never claims fewer
    /// elements than were actually returned.
    pub fn new(content: Vec<T>, pageable: &PageRequest, total: u64) -> Self {
        let offset = pageable.offset();
        let total_elements =
            if !content.is_empty() && offset + u64::from(pageable.page_size()) > total {
                offset + content.len() as u64
            } else {
                total
            };

        Self {
            content,
            number: pageable.page_number(),
            size: pageable.page_size(),
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Zero-based page index
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Requested page size
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn total_pages(&self) -> u64 {
        match self.size {
            0 => 0,
            size => self.total_elements.div_ceil(u64::from(size)),
        }
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_rejected() {
        let result = PageRequest::of(0, 0);
        assert!(matches!(result, Err(QueryError::InvalidPageRequest(_))));
    }

    #[test]
    fn zero_size_is_rejected_when_deserialized() {
        let result = serde_json::from_str::<PageRequest>(r#"{"page":0,"size":0}"#);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("page size must be at least one"));
    }

    #[test]
    fn deserialized_request_keeps_sort() {
        let request: PageRequest = serde_json::from_str(
            r#"{"page":1,"size":3,"sort":[{"property":"age","direction":"DESC"}]}"#,
        )
        .unwrap();

        assert_eq!(request, PageRequest::of(1, 3).unwrap().with_sort(Sort::by([Order::desc("age")])));
    }

    #[test]
    fn next_saturates_at_last_page_index() {
        let request = PageRequest::of(u32::MAX, 1).unwrap();
        assert_eq!(request.next().page_number(), u32::MAX);
    }

    #[test]
    fn offset_is_page_times_size() {
        let request = PageRequest::of(3, 4).unwrap();
        assert_eq!(request.offset(), 12);
        assert_eq!(request.next().offset(), 16);
        assert_eq!(request.first().offset(), 0);
    }

    #[test]
    fn page_navigation_flags() {
        let request = PageRequest::of(0, 3).unwrap();
        let page = Page::new(vec![1, 2, 3], &request, 4);

        assert_eq!(page.total_pages(), 2);
        assert!(page.is_first());
        assert!(page.has_next());
        assert!(!page.is_last());
        assert!(!page.has_previous());

        let second = Page::new(vec![4], &request.next(), 4);
        assert!(second.is_last());
        assert!(second.has_previous());
    }

    #[test]
    fn stale_total_is_raised_to_returned_rows() {
        let request = PageRequest::of(1, 3).unwrap();
        let page = Page::new(vec!['a', 'b'], &request, 2);

        assert_eq!(page.total_elements(), 5);
    }

    #[test]
    fn empty_page_keeps_reported_total() {
        let request = PageRequest::of(5, 3).unwrap();
        let page: Page<u8> = Page::new(Vec::new(), &request, 4);

        assert_eq!(page.total_elements(), 4);
        assert_eq!(page.number_of_elements(), 0);
    }

    #[test]
    fn map_preserves_metadata() {
        let request = PageRequest::of(0, 2).unwrap();
        let page = Page::new(vec![1, 2], &request, 7).map(|n| n * 10);

        assert_eq!(page.content(), &[10, 20]);
        assert_eq!(page.total_elements(), 7);
        assert_eq!(page.size(), 2);
    }

    #[test]
    fn page_serializes_camel_case() {
        let request = PageRequest::of(0, 2).unwrap();
        let json = serde_json::to_value(Page::new(vec!["x"], &request, 1)).unwrap();

        assert_eq!(json["totalElements"], 1);
        assert_eq!(json["content"][0], "x");
    }

    #[test]
    fn sort_helpers_build_orders() {
        let sort = Sort::by([Order::desc("age"), Order::asc("username").nulls_last()]);

        assert_eq!(sort.orders().len(), 2);
        assert_eq!(sort.orders()[0].direction, Direction::Desc);
        assert_eq!(sort.orders()[1].nulls, NullHandling::NullsLast);
        assert!(Sort::unsorted().is_unsorted());
    }
}
