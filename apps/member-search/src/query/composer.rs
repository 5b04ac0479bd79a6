use super::path::{Field, OrderSpecifier};
use super::predicate::Predicate;
use crate::domain::search::{PageRequest, Sort};
use crate::errors::{QueryError, QueryResult};

/// How the team is joined onto each member row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Drops members without a (matching) team
    Inner,
    /// Keeps every member; team columns are NULL when nothing matches
    Left,
    /// Every member paired with every team (theta join); conditions go in WHERE
    Cross,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// Query over members, optionally joined to teams
///
/// Built fluently and handed to a [`QueryEngine`](super::engine::QueryEngine).
/// Absent fragments are dropped on the way in, offset and limit are passed
/// through untouched, and rows are always ordered by member id (then joined
/// team id) after any explicit ordering.
///
/// A team join follows the member's team relation unless it was built with
/// [`join_unrelated_team`](Self::join_unrelated_team) or
/// [`cross_join_team`](Self::cross_join_team); then every team is a
/// candidate and only the ON conditions decide the match.
///
/// # Example
/// ```
/// use member_search::query::composer::{JoinKind, MemberQuery};
/// use member_search::query::fragments::{age_goe, team_name_eq, username_eq};
///
/// let query = MemberQuery::select_from_members()
///     .left_join_team()
///     .filter([username_eq(None), team_name_eq(Some("teamB")), age_goe(Some(20))])
///     .offset(0)
///     .limit(3);
///
/// assert_eq!(query.join_kind(), Some(JoinKind::Left));
/// assert_eq!(query.filters().len(), 2);
/// assert!(query.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberQuery {
    join: Option<JoinKind>,
    related: bool,
    join_on: Vec<Predicate>,
    filters: Vec<Predicate>,
    orders: Vec<OrderSpecifier>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl MemberQuery {
    pub fn select_from_members() -> Self {
        Self::default()
    }

    /// Joins the member's own team
    pub fn join_team(mut self, kind: JoinKind) -> Self {
        self.join = Some(kind);
        self.related = true;
        self
    }

    /// Joins teams without the member relation, e.g.
    /// `.join_unrelated_team(JoinKind::Left).on(member::username().eq_path(team::name()))`
    pub fn join_unrelated_team(mut self, kind: JoinKind) -> Self {
        self.join = Some(kind);
        self.related = false;
        self
    }

    pub fn left_join_unrelated_team(self) -> Self {
        self.join_unrelated_team(JoinKind::Left)
    }

    /// Theta join: every member with every team, filtered in WHERE
    pub fn cross_join_team(self) -> Self {
        self.join_unrelated_team(JoinKind::Cross)
    }

    pub fn left_join_team(self) -> Self {
        self.join_team(JoinKind::Left)
    }

    pub fn inner_join_team(self) -> Self {
        self.join_team(JoinKind::Inner)
    }

    /// Adds a condition to the join itself rather than to the WHERE clause
    pub fn on(mut self, predicate: Predicate) -> Self {
        self.join_on.push(predicate);
        self
    }

    /// Adds every present fragment; `None`s are skipped
    pub fn filter(mut self, fragments: impl IntoIterator<Item = Option<Predicate>>) -> Self {
        self.filters.extend(fragments.into_iter().flatten());
        self
    }

    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn order_by(mut self, order: OrderSpecifier) -> Self {
        self.orders.push(order);
        self
    }

    /// Appends the orders of a sort request, resolving property names
    pub fn sort(mut self, sort: &Sort) -> QueryResult<Self> {
        for order in sort.orders() {
            let field = Field::from_property(&order.property)
                .ok_or_else(|| QueryError::UnknownSortProperty(order.property.clone()))?;
            self.orders.push(OrderSpecifier {
                field,
                direction: order.direction,
                nulls: order.nulls,
            });
        }
        Ok(self)
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Applies a page request's offset, size and sort
    pub fn page(self, pageable: &PageRequest) -> QueryResult<Self> {
        Ok(self
            .sort(pageable.sort())?
            .offset(pageable.offset())
            .limit(u64::from(pageable.page_size())))
    }

    /// Same source, join and filters; no ordering or paging
    pub fn for_count(&self) -> Self {
        Self {
            join: self.join,
            related: self.related,
            join_on: self.join_on.clone(),
            filters: self.filters.clone(),
            orders: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn join_kind(&self) -> Option<JoinKind> {
        self.join
    }

    /// Whether the team join follows the member's team relation
    pub fn joins_by_relation(&self) -> bool {
        self.join.is_some() && self.related
    }

    pub fn join_on(&self) -> &[Predicate] {
        &self.join_on
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn orders(&self) -> &[OrderSpecifier] {
        &self.orders
    }

    pub fn row_offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Rejects team references without a join and malformed subqueries
    pub fn validate(&self) -> QueryResult<()> {
        if self.join == Some(JoinKind::Cross) {
            if self.related {
                return Err(QueryError::InvalidComposition(
                    "a cross join cannot follow the team relation".to_string(),
                ));
            }
            if !self.join_on.is_empty() {
                return Err(QueryError::InvalidComposition(
                    "a cross join takes no ON condition; filter in WHERE".to_string(),
                ));
            }
        }

        if self.join.is_none() {
            if !self.join_on.is_empty() {
                return Err(QueryError::InvalidComposition(
                    "join condition given without a team join".to_string(),
                ));
            }
            if let Some(predicate) = self.filters.iter().find(|p| p.references_team()) {
                return Err(QueryError::InvalidComposition(format!(
                    "filter `{}` references the team without a team join",
                    predicate
                )));
            }
            if let Some(order) = self.orders.iter().find(|o| o.field.is_team_field()) {
                return Err(QueryError::InvalidComposition(format!(
                    "ordering by {} requires a team join",
                    order.field
                )));
            }
        }

        self.join_on
            .iter()
            .chain(self.filters.iter())
            .try_for_each(Predicate::validate)
    }

    /// Validation for UPDATE and DELETE, which operate on members alone
    pub fn validate_bulk(&self) -> QueryResult<()> {
        if self.join.is_some() {
            return Err(QueryError::InvalidComposition(
                "bulk statements cannot join the team".to_string(),
            ));
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::{Direction, NullHandling, Order};
    use crate::query::fragments::{age_loe, team_name_eq, username_eq};
    use crate::query::path::{member, team};

    #[test]
    fn absent_fragments_are_dropped() {
        let query = MemberQuery::select_from_members().filter([
            username_eq(Some("")),
            age_loe(None),
            age_loe(Some(30)),
        ]);

        assert_eq!(query.filters(), &[member::age().loe(30)]);
    }

    #[test]
    fn team_filter_without_join_is_invalid() {
        let query = MemberQuery::select_from_members().filter([team_name_eq(Some("teamA"))]);

        assert!(matches!(
            query.validate(),
            Err(QueryError::InvalidComposition(_))
        ));
        assert!(query.left_join_team().validate().is_ok());
    }

    #[test]
    fn team_ordering_without_join_is_invalid() {
        let query = MemberQuery::select_from_members().order_by(team::name().asc());
        assert!(query.validate().is_err());
    }

    #[test]
    fn on_without_join_is_invalid() {
        let query = MemberQuery::select_from_members().on(team::name().eq("teamA"));
        assert!(query.validate().is_err());
    }

    #[test]
    fn cross_join_rejects_on_and_relation() {
        let theta = MemberQuery::select_from_members()
            .cross_join_team()
            .and_where(member::username().eq_path(team::name()));
        assert!(theta.validate().is_ok());
        assert!(!theta.joins_by_relation());

        assert!(theta.clone().on(team::name().eq("teamA")).validate().is_err());
        assert!(MemberQuery::select_from_members()
            .join_team(JoinKind::Cross)
            .validate()
            .is_err());
    }

    #[test]
    fn unrelated_join_keeps_its_kind_for_counting() {
        let query = MemberQuery::select_from_members()
            .left_join_unrelated_team()
            .on(member::username().eq_path(team::name()))
            .limit(2);
        let count = query.for_count();

        assert_eq!(count.join_kind(), Some(JoinKind::Left));
        assert!(!count.joins_by_relation());
        assert_eq!(count.join_on(), query.join_on());
        assert!(MemberQuery::select_from_members()
            .left_join_team()
            .joins_by_relation());
    }

    #[test]
    fn page_passes_offset_and_limit_through() {
        let pageable = PageRequest::of(2, 5).unwrap();
        let query = MemberQuery::select_from_members().page(&pageable).unwrap();

        assert_eq!(query.row_offset(), Some(10));
        assert_eq!(query.row_limit(), Some(5));
    }

    #[test]
    fn sort_resolves_properties() {
        let sort = Sort::by([Order::desc("age"), Order::asc("username").nulls_last()]);
        let query = MemberQuery::select_from_members().sort(&sort).unwrap();

        assert_eq!(query.orders().len(), 2);
        assert_eq!(query.orders()[0].field, Field::Age);
        assert_eq!(query.orders()[0].direction, Direction::Desc);
        assert_eq!(query.orders()[1].nulls, NullHandling::NullsLast);
    }

    #[test]
    fn unknown_sort_property_fails() {
        let sort = Sort::by([Order::asc("salary")]);
        let result = MemberQuery::select_from_members().sort(&sort);

        assert!(matches!(
            result,
            Err(QueryError::UnknownSortProperty(name)) if name == "salary"
        ));
    }

    #[test]
    fn count_query_drops_ordering_and_paging() {
        let query = MemberQuery::select_from_members()
            .left_join_team()
            .filter([age_loe(Some(30))])
            .order_by(member::age().desc())
            .offset(3)
            .limit(3);
        let count = query.for_count();

        assert_eq!(count.join_kind(), Some(JoinKind::Left));
        assert_eq!(count.filters(), query.filters());
        assert!(count.orders().is_empty());
        assert_eq!(count.row_offset(), None);
        assert_eq!(count.row_limit(), None);
    }

    #[test]
    fn bulk_statements_reject_joins() {
        let query = MemberQuery::select_from_members()
            .inner_join_team()
            .and_where(member::age().lt(25));

        assert!(query.validate_bulk().is_err());
        assert!(MemberQuery::select_from_members()
            .and_where(member::age().lt(25))
            .validate_bulk()
            .is_ok());
    }
}
