use std::future::Future;

use super::composer::MemberQuery;
use super::engine::{MemberTeamRow, PagedRows, QueryEngine};
use crate::domain::search::{Page, PageRequest};
use crate::errors::QueryResult;

/// When and how the total element count of a page is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountStrategy {
    /// Content and total from one engine call over one snapshot
    Combined,
    /// Content query, then an unconditional count query
    Separate,
    /// Content query, then a count query only if the page cannot prove the total
    #[default]
    Deferred,
}

/// Total for a page that already holds `content_len` rows
///
/// `count` only runs when the rows cannot settle the total:
/// - first page, fewer rows than the page size: the rows are everything
/// - later page, some rows but fewer than the page size: this is the last page
///   and the total is `offset + rows`
/// - anything else: the count query runs
///
/// # Example
/// ```
/// use member_search::domain::search::PageRequest;
/// use member_search::errors::QueryError;
/// use member_search::query::pagination::deferred_total;
///
/// # tokio_test_block_on(async {
/// let pageable = PageRequest::of(0, 3).unwrap();
/// // two rows on a first page of three: the count query is never awaited
/// let total = deferred_total(2, &pageable, || async { Ok::<u64, QueryError>(99) }).await.unwrap();
/// assert_eq!(total, 2);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn deferred_total<F, Fut>(
    content_len: usize,
    pageable: &PageRequest,
    count: F,
) -> QueryResult<u64>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = QueryResult<u64>>,
{
    let rows = content_len as u64;
    let size = u64::from(pageable.page_size());
    let offset = pageable.offset();

    if offset == 0 {
        if rows < size {
            return Ok(rows);
        }
        return count().await;
    }

    if rows != 0 && rows < size {
        return Ok(offset + rows);
    }

    count().await
}

/// Runs `query` for one page using the chosen count strategy
///
/// The page request's sort, offset and size are applied on top of `query`.
/// Errors from either statement abort the page; nothing partial is returned.
pub async fn fetch_page<E>(
    engine: &E,
    query: &MemberQuery,
    pageable: &PageRequest,
    strategy: CountStrategy,
) -> QueryResult<Page<MemberTeamRow>>
where
    E: QueryEngine + ?Sized,
{
    let paged = query.clone().page(pageable)?;

    let (rows, total) = match strategy {
        CountStrategy::Combined => {
            let PagedRows { rows, total } = engine.fetch_with_total(&paged).await?;
            (rows, total)
        }
        CountStrategy::Separate => {
            let rows = engine.fetch(&paged).await?;
            let total = engine.count(&paged.for_count()).await?;
            (rows, total)
        }
        CountStrategy::Deferred => {
            let rows = engine.fetch(&paged).await?;
            let count_query = paged.for_count();
            let total = deferred_total(rows.len(), pageable, || engine.count(&count_query)).await?;
            (rows, total)
        }
    };

    tracing::debug!(
        ?strategy,
        page = pageable.page_number(),
        size = pageable.page_size(),
        rows = rows.len(),
        total,
        "page fetched"
    );

    Ok(Page::new(rows, pageable, total))
}
