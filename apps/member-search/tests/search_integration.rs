//! Integration tests for member search over the in-memory store
//!
//! These run the same repositories and query engine contract the PostgreSQL
//! adapters implement, without needing a database.

use std::sync::Arc;

use member_search::domain::member::{MemberId, NewMember};
use member_search::domain::repositories::{
    MemberRepository, MemberSearchRepository, TeamRepository,
};
use member_search::domain::search::{MemberSearchCondition, Order, PageRequest, Sort};
use member_search::domain::team::{NewTeam, Team};
use member_search::errors::QueryError;
use member_search::infrastructure::repositories::{
    InMemoryDatabase, InMemoryMemberRepository, InMemoryQueryEngine, InMemoryTeamRepository,
    MemberQueryRepository,
};
use member_search::query::engine::{Assignment, QueryEngine};
use member_search::query::materializer::{materialize, materialize_users};
use member_search::query::path::{member, team};
use member_search::query::predicate::{AgeSubquery, CmpOp};
use member_search::query::projection::{Cell, Expr};
use member_search::query::MemberQuery;

struct Fixture {
    db: InMemoryDatabase,
    teams: InMemoryTeamRepository,
    members: InMemoryMemberRepository,
    search: MemberQueryRepository<InMemoryQueryEngine>,
    team_a: Team,
    team_b: Team,
}

impl Fixture {
    async fn new() -> Self {
        let db = InMemoryDatabase::new();
        let teams = InMemoryTeamRepository::new(db.clone());
        let members = InMemoryMemberRepository::new(db.clone());
        let search = MemberQueryRepository::new(Arc::new(InMemoryQueryEngine::new(db.clone())));

        let team_a = teams.save(NewTeam::new("teamA")).await.unwrap();
        let team_b = teams.save(NewTeam::new("teamB")).await.unwrap();

        Self {
            db,
            teams,
            members,
            search,
            team_a,
            team_b,
        }
    }

    /// member1..member4 split across teamA and teamB with the given ages
    async fn with_members(ages: [i32; 4]) -> Self {
        let fixture = Self::new().await;
        for (i, age) in ages.into_iter().enumerate() {
            let team = if i < 2 { &fixture.team_a } else { &fixture.team_b };
            fixture
                .members
                .save(NewMember::new(format!("member{}", i + 1), age).in_team(team.id()))
                .await
                .unwrap();
        }
        fixture.db.reset_statement_counters();
        fixture
    }

    fn engine(&self) -> &InMemoryQueryEngine {
        self.search.engine()
    }
}

fn usernames<'a>(names: impl IntoIterator<Item = &'a Option<String>>) -> Vec<&'a str> {
    names.into_iter().filter_map(|name| name.as_deref()).collect()
}

#[tokio::test]
async fn test_search_without_conditions_returns_every_member() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    fixture
        .members
        .save(NewMember::new("loner", 50))
        .await
        .unwrap();

    let found = fixture
        .search
        .search(&MemberSearchCondition::default())
        .await
        .unwrap();

    assert_eq!(found.len(), 5);
    assert_eq!(found[0].team_name.as_deref(), Some("teamA"));
    assert_eq!(found[3].team_name.as_deref(), Some("teamB"));
    assert_eq!(found[4].username.as_deref(), Some("loner"));
    assert!(found[4].team_id.is_none());
    assert!(found[4].team_name.is_none());
}

#[tokio::test]
async fn test_empty_strings_behave_like_absent_conditions() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;

    let absent = fixture
        .search
        .search(&MemberSearchCondition::default())
        .await
        .unwrap();
    let empty = fixture
        .search
        .search(
            &MemberSearchCondition::default()
                .with_username("")
                .with_team_name(""),
        )
        .await
        .unwrap();

    assert_eq!(absent, empty);
    assert_eq!(empty.len(), 4);
}

#[tokio::test]
async fn test_search_with_every_condition() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let condition = MemberSearchCondition::default()
        .with_age_goe(32)
        .with_age_loe(40)
        .with_username("member4");

    let found = fixture.search.search(&condition).await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username.as_deref(), Some("member4"));
    assert_eq!(found[0].age, 40);
}

#[tokio::test]
async fn test_search_by_team_name_and_age_range() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let condition = MemberSearchCondition::default()
        .with_team_name("teamB")
        .with_age_goe(35);

    let found = fixture.search.search(&condition).await.unwrap();

    assert_eq!(usernames(found.iter().map(|dto| &dto.username)), ["member4"]);
}

#[tokio::test]
async fn test_dto_reflects_member_and_current_team() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let member1 = fixture.members.find_by_username("member1").await.unwrap()[0].clone();
    fixture
        .members
        .change_team(member1.id(), fixture.team_b.id())
        .await
        .unwrap();

    let found = fixture
        .search
        .search(&MemberSearchCondition::default().with_username("member1"))
        .await
        .unwrap();

    let dto = &found[0];
    assert_eq!(dto.member_id, member1.id());
    assert_eq!(dto.age, 10);
    assert_eq!(dto.team_id, Some(fixture.team_b.id()));
    assert_eq!(dto.team_name.as_deref(), Some("teamB"));

    let json = serde_json::to_value(dto).unwrap();
    assert_eq!(json["memberId"], member1.id().value());
    assert_eq!(json["teamName"], "teamB");
}

#[tokio::test]
async fn test_change_team_keeps_both_sides_in_step() {
    let fixture = Fixture::new().await;
    let member = fixture
        .members
        .save(NewMember::new("member1", 10).in_team(fixture.team_a.id()))
        .await
        .unwrap();

    fixture
        .members
        .change_team(member.id(), fixture.team_b.id())
        .await
        .unwrap();
    fixture
        .members
        .change_team(member.id(), fixture.team_b.id())
        .await
        .unwrap();

    let team_a = fixture.teams.find_by_id(fixture.team_a.id()).await.unwrap().unwrap();
    let team_b = fixture.teams.find_by_id(fixture.team_b.id()).await.unwrap().unwrap();
    let reloaded = fixture.members.find_by_id(member.id()).await.unwrap().unwrap();

    assert!(team_a.member_ids().is_empty());
    assert_eq!(team_b.member_ids(), &[member.id()]);
    assert_eq!(reloaded.team_id(), Some(fixture.team_b.id()));
}

#[tokio::test]
async fn test_change_team_to_missing_team_fails() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let member = fixture.members.find_all().await.unwrap()[0].clone();

    let result = fixture
        .members
        .change_team(member.id(), member_search::domain::team::TeamId::new(999))
        .await;

    assert!(matches!(
        result,
        Err(QueryError::NotFound { entity: "Team", id: 999 })
    ));
}

#[tokio::test]
async fn test_leave_team_and_delete() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let member = fixture.members.find_by_username("member1").await.unwrap()[0].clone();

    fixture.members.leave_team(member.id()).await.unwrap();
    let team_a = fixture.teams.find_by_id(fixture.team_a.id()).await.unwrap().unwrap();
    assert!(!team_a.has_member(member.id()));

    fixture.members.delete(member.id()).await.unwrap();
    assert!(fixture.members.find_by_id(member.id()).await.unwrap().is_none());
    assert!(matches!(
        fixture.members.delete(member.id()).await,
        Err(QueryError::NotFound { entity: "Member", .. })
    ));
}

#[tokio::test]
async fn test_optimized_page_issues_count_when_first_page_is_full() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let pageable = PageRequest::of(0, 3).unwrap();

    let page = fixture
        .search
        .search_page_optimized(&MemberSearchCondition::default(), &pageable)
        .await
        .unwrap();

    assert_eq!(page.number_of_elements(), 3);
    assert_eq!(page.total_elements(), 4);
    assert_eq!(page.total_pages(), 2);
    assert!(page.has_next());
    assert_eq!(fixture.db.select_statements(), 1);
    assert_eq!(fixture.db.count_statements(), 1);
}

#[tokio::test]
async fn test_optimized_page_skips_count_when_rows_prove_total() {
    let fixture = Fixture::new().await;
    for (name, age) in [("member1", 10), ("member2", 20)] {
        fixture
            .members
            .save(NewMember::new(name, age).in_team(fixture.team_a.id()))
            .await
            .unwrap();
    }
    fixture.db.reset_statement_counters();

    let page = fixture
        .search
        .search_page_optimized(&MemberSearchCondition::default(), &PageRequest::of(0, 3).unwrap())
        .await
        .unwrap();

    assert_eq!(page.number_of_elements(), 2);
    assert_eq!(page.total_elements(), 2);
    assert_eq!(fixture.db.count_statements(), 0);
}

#[tokio::test]
async fn test_optimized_last_page_infers_total() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;

    let page = fixture
        .search
        .search_page_optimized(&MemberSearchCondition::default(), &PageRequest::of(1, 3).unwrap())
        .await
        .unwrap();

    assert_eq!(usernames(page.content().iter().map(|dto| &dto.username)), ["member4"]);
    assert_eq!(page.total_elements(), 4);
    assert!(page.is_last());
    assert_eq!(fixture.db.count_statements(), 0);
}

#[tokio::test]
async fn test_strategies_agree_on_totals() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let condition = MemberSearchCondition::default().with_age_goe(15);

    for page in 0..3 {
        let pageable = PageRequest::of(page, 2).unwrap();
        let simple = fixture.search.search_page_simple(&condition, &pageable).await.unwrap();
        let complex = fixture.search.search_page_complex(&condition, &pageable).await.unwrap();
        let optimized = fixture
            .search
            .search_page_optimized(&condition, &pageable)
            .await
            .unwrap();

        assert_eq!(simple.total_elements(), 3);
        assert_eq!(simple, complex);
        assert_eq!(complex, optimized);
    }
}

#[tokio::test]
async fn test_simple_page_uses_one_statement() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;

    let page = fixture
        .search
        .search_page_simple(&MemberSearchCondition::default(), &PageRequest::of(0, 3).unwrap())
        .await
        .unwrap();

    assert_eq!(page.total_elements(), 4);
    assert_eq!(fixture.db.select_statements(), 1);
    assert_eq!(fixture.db.count_statements(), 0);
}

#[tokio::test]
async fn test_sorted_page_by_property() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let pageable = PageRequest::of(0, 2)
        .unwrap()
        .with_sort(Sort::by([Order::desc("age")]));

    let page = fixture
        .search
        .search_page_complex(&MemberSearchCondition::default(), &pageable)
        .await
        .unwrap();

    assert_eq!(
        usernames(page.content().iter().map(|dto| &dto.username)),
        ["member4", "member3"]
    );
}

#[tokio::test]
async fn test_unknown_sort_property_is_rejected() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let pageable = PageRequest::of(0, 2)
        .unwrap()
        .with_sort(Sort::by([Order::asc("salary")]));

    let result = fixture
        .search
        .search_page_optimized(&MemberSearchCondition::default(), &pageable)
        .await;

    assert!(matches!(result, Err(QueryError::UnknownSortProperty(_))));
    assert_eq!(fixture.db.select_statements(), 0);
}

#[tokio::test]
async fn test_fetch_one_distinguishes_none_one_many() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let engine = fixture.engine();

    let none = MemberQuery::select_from_members().and_where(member::age().eq(99));
    let one = MemberQuery::select_from_members().and_where(member::age().eq(30));
    let many = MemberQuery::select_from_members().and_where(member::age().eq(10));

    assert!(engine.fetch_one(&none).await.unwrap().is_none());
    assert_eq!(
        engine.fetch_one(&one).await.unwrap().unwrap().username.as_deref(),
        Some("member3")
    );
    assert!(matches!(
        engine.fetch_one(&many).await,
        Err(QueryError::NonUniqueResult(3))
    ));
    assert_eq!(
        engine.fetch_first(&many).await.unwrap().unwrap().username.as_deref(),
        Some("member1")
    );
}

#[tokio::test]
async fn test_sort_with_nulls_last() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    fixture.members.save(NewMember::anonymous(100)).await.unwrap();

    let query = MemberQuery::select_from_members()
        .and_where(member::age().eq(100).or(member::age().eq(10)))
        .order_by(member::age().desc())
        .order_by(member::username().asc().nulls_last());
    let rows = fixture.engine().fetch(&query).await.unwrap();

    assert!(rows[0].username.is_none());
    assert_eq!(
        usernames(rows[1..].iter().map(|row| &row.username)),
        ["member1", "member2", "member4"]
    );

    let by_name = MemberQuery::select_from_members().order_by(member::username().desc().nulls_last());
    let rows = fixture.engine().fetch(&by_name).await.unwrap();
    assert_eq!(rows[0].username.as_deref(), Some("member4"));
    assert!(rows[4].username.is_none());
}

#[tokio::test]
async fn test_offset_and_limit_paging() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let query = MemberQuery::select_from_members()
        .order_by(member::username().desc())
        .offset(1)
        .limit(2);

    let rows = fixture.engine().fetch(&query).await.unwrap();
    let total = fixture.engine().count(&query.for_count()).await.unwrap();

    assert_eq!(usernames(rows.iter().map(|row| &row.username)), ["member3", "member2"]);
    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_age_aggregates() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;

    let stats = fixture
        .engine()
        .age_stats(&MemberQuery::select_from_members())
        .await
        .unwrap();

    assert_eq!(stats.count, 4);
    assert_eq!(stats.sum, Some(60));
    assert_eq!(stats.avg, Some(15.0));
    assert_eq!(stats.max, Some(30));
    assert_eq!(stats.min, Some(10));
}

#[tokio::test]
async fn test_average_age_per_team() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let query = MemberQuery::select_from_members().inner_join_team();

    let averages = fixture.engine().average_age_by_team(&query).await.unwrap();

    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0].team_name.as_deref(), Some("teamA"));
    assert_eq!(averages[0].average_age, 10.0);
    assert_eq!(averages[1].team_name.as_deref(), Some("teamB"));
    assert_eq!(averages[1].average_age, 20.0);

    assert!(matches!(
        fixture
            .engine()
            .average_age_by_team(&MemberQuery::select_from_members())
            .await,
        Err(QueryError::InvalidComposition(_))
    ));
}

#[tokio::test]
async fn test_inner_join_filtered_by_team_name() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let query = MemberQuery::select_from_members()
        .inner_join_team()
        .and_where(team::name().eq("teamA"));

    let rows = fixture.engine().fetch(&query).await.unwrap();

    assert_eq!(usernames(rows.iter().map(|row| &row.username)), ["member1", "member2"]);
}

#[tokio::test]
async fn test_left_join_on_keeps_every_member() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let query = MemberQuery::select_from_members()
        .left_join_team()
        .on(team::name().eq("teamA"));

    let dtos: Vec<_> = materialize(fixture.engine().fetch(&query).await.unwrap()).collect();

    assert_eq!(dtos.len(), 4);
    assert_eq!(dtos[0].team_name.as_deref(), Some("teamA"));
    assert!(dtos[2].team_name.is_none());
    assert!(dtos[3].team_id.is_none());
}

#[tokio::test]
async fn test_subqueries() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;

    let oldest = MemberQuery::select_from_members()
        .and_where(member::age().cmp_subquery(CmpOp::Eq, AgeSubquery::max()));
    let above_average = MemberQuery::select_from_members()
        .and_where(member::age().cmp_subquery(CmpOp::Goe, AgeSubquery::avg()));
    let above_min_query = MemberQuery::select_from_members()
        .and_where(member::age().cmp_subquery(CmpOp::Gt, AgeSubquery::min().filter(member::age().gt(10))));

    let oldest = fixture.engine().fetch(&oldest).await.unwrap();
    let above_average = fixture.engine().fetch(&above_average).await.unwrap();
    let above_min = fixture.engine().fetch(&above_min_query).await.unwrap();

    assert_eq!(usernames(oldest.iter().map(|row| &row.username)), ["member4"]);
    assert_eq!(
        usernames(above_average.iter().map(|row| &row.username)),
        ["member3", "member4"]
    );
    assert_eq!(
        usernames(above_min.iter().map(|row| &row.username)),
        ["member3", "member4"]
    );
}

#[tokio::test]
async fn test_theta_join_matches_usernames_to_team_names() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    for name in ["teamA", "teamB"] {
        fixture.members.save(NewMember::new(name, 0)).await.unwrap();
    }

    let query = MemberQuery::select_from_members()
        .cross_join_team()
        .and_where(member::username().eq_path(team::name()));
    let rows = fixture.engine().fetch(&query).await.unwrap();

    assert_eq!(usernames(rows.iter().map(|row| &row.username)), ["teamA", "teamB"]);
    assert_eq!(rows[0].team.as_ref().map(|team| team.name.as_str()), Some("teamA"));
    assert!(rows[0].member_team_id.is_none());
}

#[tokio::test]
async fn test_left_join_without_relation() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    for name in ["teamA", "teamB", "teamC"] {
        fixture.members.save(NewMember::new(name, 0)).await.unwrap();
    }

    let query = MemberQuery::select_from_members()
        .left_join_unrelated_team()
        .on(member::username().eq_path(team::name()));
    let dtos: Vec<_> = materialize(fixture.engine().fetch(&query).await.unwrap()).collect();

    assert_eq!(dtos.len(), 7);
    assert!(dtos[..4].iter().all(|dto| dto.team_name.is_none()));
    assert_eq!(dtos[4].team_name.as_deref(), Some("teamA"));
    assert_eq!(dtos[5].team_name.as_deref(), Some("teamB"));
    assert_eq!(dtos[6].username.as_deref(), Some("teamC"));
    assert!(dtos[6].team_name.is_none());
    assert_eq!(fixture.engine().count(&query.for_count()).await.unwrap(), 7);
}

#[tokio::test]
async fn test_subquery_in() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let query = MemberQuery::select_from_members().and_where(
        member::age().in_subquery(AgeSubquery::ages().filter(member::age().gt(10))),
    );

    let rows = fixture.engine().fetch(&query).await.unwrap();

    assert_eq!(
        usernames(rows.iter().map(|row| &row.username)),
        ["member2", "member3", "member4"]
    );
}

#[tokio::test]
async fn test_select_subquery_column() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let columns = [
        Expr::from(member::username()),
        Expr::subquery(AgeSubquery::avg()),
    ];

    let rows = fixture
        .engine()
        .project(&MemberQuery::select_from_members(), &columns)
        .await
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|row| row[1] == Cell::Double(25.0)));
}

#[tokio::test]
async fn test_user_dto_with_max_age_subquery() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let columns = [
        Expr::from(member::username()),
        Expr::subquery(AgeSubquery::max()),
    ];

    let rows = fixture
        .engine()
        .project(&MemberQuery::select_from_members(), &columns)
        .await
        .unwrap();
    let users = materialize_users(rows).unwrap();

    assert_eq!(users.len(), 4);
    assert_eq!(users[0].name.as_deref(), Some("member1"));
    assert!(users.iter().all(|user| user.age == 40.0));
}

#[tokio::test]
async fn test_basic_and_complex_case() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let basic = member::age()
        .case()
        .when(10)
        .then("ten")
        .when(20)
        .then("twenty")
        .otherwise("other");
    let complex = Expr::case_when(member::age().between(0, 20))
        .then("0~20")
        .when(member::age().between(21, 30))
        .then("21~30")
        .otherwise("older");

    let rows = fixture
        .engine()
        .project(&MemberQuery::select_from_members(), &[basic, complex])
        .await
        .unwrap();
    let text: Vec<Vec<&str>> = rows
        .iter()
        .map(|row| row.iter().filter_map(Cell::as_text).collect())
        .collect();

    assert_eq!(
        text,
        [
            ["ten", "0~20"],
            ["twenty", "0~20"],
            ["other", "21~30"],
            ["other", "older"],
        ]
    );
}

#[tokio::test]
async fn test_constant_and_concat_columns() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let query = MemberQuery::select_from_members().and_where(member::username().eq("member1"));
    let columns = [
        Expr::from(member::username()),
        Expr::constant("A"),
        Expr::from(member::username()).concat("_").concat(member::age()),
    ];

    let rows = fixture.engine().project(&query, &columns).await.unwrap();

    assert_eq!(
        rows,
        [vec![
            Cell::Text("member1".to_string()),
            Cell::Text("A".to_string()),
            Cell::Text("member1_10".to_string()),
        ]]
    );
}

#[tokio::test]
async fn test_projection_pages_like_rows() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let query = MemberQuery::select_from_members()
        .left_join_team()
        .order_by(member::age().desc())
        .offset(1)
        .limit(2);
    let columns = [Expr::from(member::age()), Expr::from(team::name())];

    let rows = fixture.engine().project(&query, &columns).await.unwrap();

    assert_eq!(
        rows,
        [
            vec![Cell::Long(30), Cell::Text("teamB".to_string())],
            vec![Cell::Long(20), Cell::Text("teamA".to_string())],
        ]
    );
}

#[tokio::test]
async fn test_projection_rejects_team_column_without_join() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;

    let result = fixture
        .engine()
        .project(&MemberQuery::select_from_members(), &[Expr::from(team::name())])
        .await;

    assert!(matches!(result, Err(QueryError::InvalidComposition(_))));
    assert_eq!(fixture.db.select_statements(), 0);
}

#[tokio::test]
async fn test_subquery_referencing_team_is_rejected() {
    let fixture = Fixture::with_members([10, 20, 30, 40]).await;
    let query = MemberQuery::select_from_members().and_where(
        member::age().cmp_subquery(CmpOp::Eq, AgeSubquery::max().filter(team::name().eq("teamA"))),
    );

    assert!(matches!(
        fixture.engine().fetch(&query).await,
        Err(QueryError::InvalidComposition(_))
    ));
}

#[tokio::test]
async fn test_bulk_update_then_bulk_delete() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let engine = fixture.engine();

    let young = MemberQuery::select_from_members().and_where(member::age().lt(25));
    let updated = engine.bulk_update(&young, Assignment::AddAge(3)).await.unwrap();
    assert_eq!(updated, 3);

    let ages: Vec<i32> = fixture
        .members
        .find_all()
        .await
        .unwrap()
        .iter()
        .map(|member| member.age())
        .collect();
    assert_eq!(ages, [13, 13, 30, 13]);

    let old = MemberQuery::select_from_members().and_where(member::age().gt(25));
    assert_eq!(engine.bulk_delete(&old).await.unwrap(), 1);
    assert!(engine.fetch(&old).await.unwrap().is_empty());

    let team_b = fixture.teams.find_by_id(fixture.team_b.id()).await.unwrap().unwrap();
    assert_eq!(team_b.member_ids().len(), 1);
}

#[tokio::test]
async fn test_bulk_rename() {
    let fixture = Fixture::with_members([10, 10, 30, 10]).await;
    let query = MemberQuery::select_from_members().and_where(member::age().lt(28));

    let renamed = fixture
        .engine()
        .bulk_update(&query, Assignment::SetUsername(Some("non-member".to_string())))
        .await
        .unwrap();

    assert_eq!(renamed, 3);
    assert_eq!(fixture.members.find_by_username("non-member").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_team_lookup_by_name() {
    let fixture = Fixture::new().await;

    let found = fixture.teams.find_by_name("teamA").await.unwrap().unwrap();
    assert_eq!(found.id(), fixture.team_a.id());
    assert!(fixture.teams.find_by_name("teamC").await.unwrap().is_none());
    assert_eq!(fixture.teams.find_all().await.unwrap().len(), 2);
    assert!(fixture
        .members
        .find_by_id(MemberId::new(999))
        .await
        .unwrap()
        .is_none());
}
