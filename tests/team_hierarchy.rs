// tests/team_hierarchy.rs

mod test_utils;

use crm_backend::{
    common::error::AppError,
    models::{auth::Role, team::UpdateTeamMemberPayload},
};
use test_utils::{TenantFixture, app_state, database};
use uuid::Uuid;

const ROUNDS: usize = 25;

fn managed_by(manager: Uuid) -> UpdateTeamMemberPayload {
    UpdateTeamMemberPayload {
        manager_id: Some(Some(manager)),
        ..Default::default()
    }
}

// Duas trocas cruzadas ao mesmo tempo: a passa a responder a b e b a a.
// Só uma pode vencer; a outra precisa enxergar a primeira e recusar.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crossing_manager_swaps_never_leave_a_cycle() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let fixture = TenantFixture::seed(&pool, "Joalheria Esmeralda").await;

    for round in 0..ROUNDS {
        let (a, _) = fixture.add_member(&state, Role::Manager, None).await;
        let (b, _) = fixture.add_member(&state, Role::Manager, None).await;
        let (a, b) = (a.member.id, b.member.id);

        let to_b = managed_by(b);
        let to_a = managed_by(a);
        let (first, second) = tokio::join!(
            state.team_service.update(&fixture.admin, a, &to_b),
            state.team_service.update(&fixture.admin, b, &to_a),
        );

        let refused = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Err(AppError::HierarchyCycle)))
            .count();
        assert_eq!(
            (first.is_ok() as usize + second.is_ok() as usize, refused),
            (1, 1),
            "rodada {round}: {first:?} / {second:?}"
        );

        let links: Vec<(Uuid, Option<Uuid>)> =
            sqlx::query_as("SELECT id, manager_id FROM team_members WHERE id = ANY($1)")
                .bind(vec![a, b])
                .fetch_all(&pool)
                .await
                .expect("hierarquia");
        let manager_of = |id: Uuid| links.iter().find(|(m, _)| *m == id).and_then(|(_, g)| *g);
        assert!(
            !(manager_of(a) == Some(b) && manager_of(b) == Some(a)),
            "rodada {round}: ciclo gravado"
        );
    }
}

#[tokio::test]
async fn reassigning_to_a_descendant_is_refused() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let fixture = TenantFixture::seed(&pool, "Joalheria Fluorita").await;

    let (top, _) = fixture.add_member(&state, Role::Manager, None).await;
    let (middle, _) = fixture
        .add_member(&state, Role::Manager, Some(top.member.id))
        .await;
    let (bottom, _) = fixture
        .add_member(&state, Role::InhouseSales, Some(middle.member.id))
        .await;

    let result = state
        .team_service
        .update(&fixture.admin, top.member.id, &managed_by(bottom.member.id))
        .await;
    assert!(matches!(result, Err(AppError::HierarchyCycle)));

    let cleared = state
        .team_service
        .update(
            &fixture.admin,
            middle.member.id,
            &UpdateTeamMemberPayload {
                manager_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("gerente removido");
    assert_eq!(cleared.member.manager_id, None);

    let activities = state
        .team_service
        .activities(&fixture.admin, middle.member.id)
        .await
        .expect("histórico");
    // Cadastro e a atualização.
    assert_eq!(activities.len(), 2);
    assert!(activities[0].created_at >= activities[1].created_at);
}
