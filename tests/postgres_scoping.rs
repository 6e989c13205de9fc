// tests/postgres_scoping.rs

mod test_utils;

use crm_backend::{
    common::error::AppError,
    config::AppState,
    models::{
        auth::Role,
        crm::CreateClientPayload,
        inventory::CreateProductPayload,
        sales::{CreateSalePayload, SaleDetail, SaleItemPayload, SaleStatus},
    },
    scope::{Actor, ListFilters},
};
use rust_decimal::Decimal;
use test_utils::{TenantFixture, app_state, database, platform_admin, unique};
use uuid::Uuid;

async fn add_client(state: &AppState, actor: &Actor, name: &str) -> Uuid {
    let payload = CreateClientPayload {
        first_name: name.into(),
        last_name: "Cliente".into(),
        email: None,
        phone: None,
        notes: None,
        assigned_to_id: None,
    };
    state
        .crm_service
        .create_client(actor, &payload)
        .await
        .expect("cliente")
        .client
        .id
}

async fn add_product(state: &AppState, fixture: &TenantFixture) -> Uuid {
    let payload = CreateProductPayload {
        name: "Anel de Ouro".into(),
        sku: unique("SKU"),
        category_id: None,
        status: None,
        quantity: 5,
        min_quantity: 1,
        cost_price: Decimal::from(40),
        selling_price: Decimal::from(100),
        material: Some("ouro 18k".into()),
    };
    state
        .inventory_service
        .create_product(&fixture.admin, &payload)
        .await
        .expect("produto")
        .id
}

async fn confirmed_sale(
    state: &AppState,
    actor: &Actor,
    product_id: Uuid,
    unit_price: i64,
) -> SaleDetail {
    let payload = CreateSalePayload {
        invoice_number: unique("NF"),
        client_id: None,
        status: Some(SaleStatus::Confirmed),
        notes: None,
        items: vec![SaleItemPayload {
            product_id,
            quantity: 1,
            unit_price: Some(Decimal::from(unit_price)),
        }],
    };
    state
        .sales_service
        .create_sale(actor, &payload)
        .await
        .expect("venda")
}

#[tokio::test]
async fn each_role_sees_its_slice_of_its_own_tenant() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);

    let ours = TenantFixture::seed(&pool, "Joalheria Aurora").await;
    let theirs = TenantFixture::seed(&pool, "Joalheria Boreal").await;

    let (manager, manager_actor) = ours.add_member(&state, Role::Manager, None).await;
    let (_, managed_seller) = ours
        .add_member(&state, Role::InhouseSales, Some(manager.member.id))
        .await;
    let (_, loose_seller) = ours.add_member(&state, Role::InhouseSales, None).await;
    let (_, foreign_seller) = theirs.add_member(&state, Role::InhouseSales, None).await;

    let managed_client = add_client(&state, &managed_seller, "Beatriz").await;
    let loose_client = add_client(&state, &loose_seller, "Carolina").await;
    let foreign_client = add_client(&state, &foreign_seller, "Daniela").await;

    let our_product = add_product(&state, &ours).await;
    let their_product = add_product(&state, &theirs).await;
    confirmed_sale(&state, &managed_seller, our_product, 100).await;
    confirmed_sale(&state, &loose_seller, our_product, 50).await;
    let foreign_sale = confirmed_sale(&state, &foreign_seller, their_product, 70).await;

    let client_ids = |actor: Actor| {
        let state = state.clone();
        async move {
            let mut ids: Vec<Uuid> = state
                .crm_service
                .list_clients(&actor, &ListFilters::default())
                .await
                .expect("clientes")
                .into_iter()
                .map(|c| c.client.id)
                .collect();
            ids.sort();
            ids
        }
    };

    let mut both = vec![managed_client, loose_client];
    both.sort();
    assert_eq!(client_ids(ours.admin.clone()).await, both);
    assert_eq!(client_ids(manager_actor.clone()).await, vec![managed_client]);
    assert_eq!(client_ids(managed_seller.clone()).await, vec![managed_client]);
    assert_eq!(client_ids(loose_seller.clone()).await, vec![loose_client]);
    assert_eq!(client_ids(theirs.admin.clone()).await, vec![foreign_client]);

    // Administrador da plataforma escolhe o tenant pelo filtro.
    let operator = platform_admin(&pool).await;
    let only_ours = ListFilters {
        tenant_id: Some(ours.tenant_id),
        ..Default::default()
    };
    let mut seen: Vec<Uuid> = state
        .crm_service
        .list_clients(&operator, &only_ours)
        .await
        .expect("clientes")
        .into_iter()
        .map(|c| c.client.id)
        .collect();
    seen.sort();
    assert_eq!(seen, both);

    // Agregados seguem o mesmo escopo das listagens.
    let admin_stats = state
        .dashboard_service
        .stats(&ours.admin, None)
        .await
        .expect("painel");
    assert_eq!(admin_stats.total_orders, 2);
    assert_eq!(admin_stats.total_clients, 2);
    assert_eq!(admin_stats.total_revenue, Decimal::from(150));

    let manager_stats = state
        .dashboard_service
        .stats(&manager_actor, None)
        .await
        .expect("painel");
    assert_eq!(manager_stats.total_orders, 1);
    assert_eq!(manager_stats.total_revenue, Decimal::from(100));

    let seller_stats = state
        .dashboard_service
        .stats(&loose_seller, None)
        .await
        .expect("painel");
    assert_eq!(seller_stats.total_orders, 1);
    assert_eq!(seller_stats.total_clients, 1);
    assert_eq!(seller_stats.total_revenue, Decimal::from(50));

    let operator_stats = state
        .dashboard_service
        .stats(&operator, Some(ours.tenant_id))
        .await
        .expect("painel");
    assert_eq!(operator_stats.total_orders, 2);
    assert_eq!(
        state
            .dashboard_service
            .stats(&operator, None)
            .await
            .expect("painel")
            .total_orders,
        0
    );

    // Registro de outro tenant é tratado como inexistente.
    assert!(matches!(
        state.sales_service.get_sale(&ours.admin, foreign_sale.sale.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        state.inventory_service.get_product(&ours.admin, their_product).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn team_listing_follows_the_hierarchy() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let ours = TenantFixture::seed(&pool, "Joalheria Citrino").await;
    let theirs = TenantFixture::seed(&pool, "Joalheria Diamante").await;

    let (manager, manager_actor) = ours.add_member(&state, Role::Manager, None).await;
    let (report, report_actor) = ours
        .add_member(&state, Role::InhouseSales, Some(manager.member.id))
        .await;
    let (outsider, _) = ours.add_member(&state, Role::Marketing, None).await;
    theirs.add_member(&state, Role::InhouseSales, None).await;

    let ids = |records: Vec<crm_backend::models::team::TeamMemberRecord>| {
        let mut ids: Vec<Uuid> = records.into_iter().map(|r| r.member.id).collect();
        ids.sort();
        ids
    };

    let all = ids(state
        .team_service
        .list(&ours.admin, &ListFilters::default())
        .await
        .expect("equipe"));
    let mut expected = vec![manager.member.id, report.member.id, outsider.member.id];
    expected.sort();
    assert_eq!(all, expected);

    let mut team = vec![manager.member.id, report.member.id];
    team.sort();
    assert_eq!(
        ids(state
            .team_service
            .list(&manager_actor, &ListFilters::default())
            .await
            .expect("equipe")),
        team
    );
    assert_eq!(
        ids(state
            .team_service
            .list(&report_actor, &ListFilters::default())
            .await
            .expect("equipe")),
        vec![report.member.id]
    );
    assert!(matches!(
        state.team_service.get(&theirs.admin, report.member.id).await,
        Err(AppError::NotFound)
    ));
}
