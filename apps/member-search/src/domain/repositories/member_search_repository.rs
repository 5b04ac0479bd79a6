use async_trait::async_trait;

use crate::domain::dto::MemberTeamDto;
use crate::domain::search::{MemberSearchCondition, Page, PageRequest};
use crate::errors::QueryResult;

/// Condition-driven member searches returning member/team projections
///
/// Every search left-joins the team so members without one are kept, and all
/// variants apply the same four optional fragments. The paged variants differ
/// only in how the total is counted.
#[async_trait]
pub trait MemberSearchRepository: Send + Sync {
    /// Unpaged search
    async fn search(&self, condition: &MemberSearchCondition) -> QueryResult<Vec<MemberTeamDto>>;

    /// Content and total from a single combined fetch
    async fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>>;

    /// Content query followed by an unconditional count query
    async fn search_page_complex(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>>;

    /// Content query; the count query runs only when the page cannot prove the total
    async fn search_page_optimized(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>>;
}
