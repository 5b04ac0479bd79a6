use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::dto::MemberTeamDto;
use crate::domain::repositories::MemberSearchRepository;
use crate::domain::search::{MemberSearchCondition, Page, PageRequest};
use crate::errors::QueryResult;
use crate::query::composer::MemberQuery;
use crate::query::engine::QueryEngine;
use crate::query::fragments::condition_fragments;
use crate::query::materializer::{materialize, materialize_page};
use crate::query::pagination::{fetch_page, CountStrategy};

/// MemberSearchRepository over any [`QueryEngine`]
///
/// The search is written once; storage specifics live in the engine.
pub struct MemberQueryRepository<E: QueryEngine> {
    engine: Arc<E>,
}

impl<E: QueryEngine> MemberQueryRepository<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Members left-joined to their team, filtered by whichever fields are set
    fn base_query(condition: &MemberSearchCondition) -> MemberQuery {
        MemberQuery::select_from_members()
            .left_join_team()
            .filter(condition_fragments(condition))
    }

    async fn search_page(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
        strategy: CountStrategy,
    ) -> QueryResult<Page<MemberTeamDto>> {
        let query = Self::base_query(condition);
        let page = fetch_page(self.engine.as_ref(), &query, pageable, strategy).await?;
        Ok(materialize_page(page))
    }
}

impl<E: QueryEngine> Clone for MemberQueryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

#[async_trait]
impl<E: QueryEngine> MemberSearchRepository for MemberQueryRepository<E> {
    async fn search(&self, condition: &MemberSearchCondition) -> QueryResult<Vec<MemberTeamDto>> {
        let rows = self.engine.fetch(&Self::base_query(condition)).await?;
        tracing::debug!(rows = rows.len(), "member search");
        Ok(materialize(rows).collect())
    }

    async fn search_page_simple(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.search_page(condition, pageable, CountStrategy::Combined)
            .await
    }

    async fn search_page_complex(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.search_page(condition, pageable, CountStrategy::Separate)
            .await
    }

    async fn search_page_optimized(
        &self,
        condition: &MemberSearchCondition,
        pageable: &PageRequest,
    ) -> QueryResult<Page<MemberTeamDto>> {
        self.search_page(condition, pageable, CountStrategy::Deferred)
            .await
    }
}
