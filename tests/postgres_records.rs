// tests/postgres_records.rs

mod test_utils;

use chrono::{NaiveDate, Utc};
use crm_backend::{
    common::error::AppError,
    models::{
        auth::{Role, UpdateUserPayload},
        inventory::{CreateCategoryPayload, CreateProductPayload, UpdateProductPayload},
        sales::{
            CreateDealPayload, CreateSalePayload, DealStage, SaleItemPayload, SaleStatus,
            TransitionDealPayload, UpdateDealPayload, UpdateSalePayload,
        },
    },
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use test_utils::{TenantFixture, app_state, database, unique};
use uuid::Uuid;

fn old_close_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 15).expect("data válida")
}

async fn backdate(pool: &PgPool, deal_id: Uuid) {
    sqlx::query("UPDATE sales_pipeline SET actual_close_date = $2 WHERE id = $1")
        .bind(deal_id)
        .bind(old_close_date())
        .execute(pool)
        .await
        .expect("data retroativa");
}

#[tokio::test]
async fn closing_date_follows_the_closing_stage() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let fixture = TenantFixture::seed(&pool, "Joalheria Granada").await;
    let (_, seller) = fixture.add_member(&state, Role::InhouseSales, None).await;

    let deal = state
        .sales_service
        .create_deal(
            &seller,
            &CreateDealPayload {
                title: "Aliança sob medida".into(),
                client_id: None,
                sales_representative_id: None,
                stage: None,
                probability: 30,
                expected_value: Decimal::from(2_500),
                expected_close_date: None,
                notes: None,
            },
        )
        .await
        .expect("negócio");
    let id = deal.deal.id;

    let move_to = |stage| TransitionDealPayload {
        stage,
        actual_value: None,
    };

    state
        .sales_service
        .transition_deal(&seller, id, &move_to(DealStage::ClosedWon))
        .await
        .expect("ganho");
    backdate(&pool, id).await;

    // Mesmo estágio de fechamento: a data original fica.
    let again = state
        .sales_service
        .transition_deal(&seller, id, &move_to(DealStage::ClosedWon))
        .await
        .expect("ganho de novo");
    assert_eq!(again.deal.actual_close_date, Some(old_close_date()));

    // Ganho -> perdido é um novo fechamento.
    let lost = state
        .sales_service
        .transition_deal(&seller, id, &move_to(DealStage::ClosedLost))
        .await
        .expect("perdido");
    assert!(lost.deal.is_closed);
    assert_ne!(lost.deal.actual_close_date, Some(old_close_date()));
    let yesterday = Utc::now().date_naive().pred_opt().expect("ontem");
    assert!(lost.deal.actual_close_date >= Some(yesterday));

    let reopened = state
        .sales_service
        .transition_deal(&seller, id, &move_to(DealStage::Negotiation))
        .await
        .expect("reaberto");
    assert!(!reopened.deal.is_closed);
    assert_eq!(reopened.deal.actual_close_date, None);
}

#[tokio::test]
async fn deals_and_sales_are_edited_and_removed_within_scope() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let ours = TenantFixture::seed(&pool, "Joalheria Hematita").await;
    let theirs = TenantFixture::seed(&pool, "Joalheria Iolita").await;
    let (_, seller) = ours.add_member(&state, Role::InhouseSales, None).await;
    let (_, peer) = ours.add_member(&state, Role::InhouseSales, None).await;

    let deal = state
        .sales_service
        .create_deal(
            &seller,
            &CreateDealPayload {
                title: "Colar de pérolas".into(),
                client_id: None,
                sales_representative_id: None,
                stage: Some(DealStage::Proposal),
                probability: 50,
                expected_value: Decimal::from(4_000),
                expected_close_date: None,
                notes: None,
            },
        )
        .await
        .expect("negócio");

    let updated = state
        .sales_service
        .update_deal(
            &seller,
            deal.deal.id,
            &UpdateDealPayload {
                probability: Some(80),
                notes: Some("Cliente pediu gravação".into()),
                ..Default::default()
            },
        )
        .await
        .expect("negócio atualizado");
    assert_eq!(updated.deal.probability, 80);
    assert_eq!(updated.deal.stage, DealStage::Proposal);
    assert_eq!(updated.deal.title, "Colar de pérolas");

    // Colega de mesmo papel não enxerga o negócio.
    assert!(matches!(
        state.sales_service.get_deal(&peer, deal.deal.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        state.sales_service.delete_deal(&theirs.admin, deal.deal.id).await,
        Err(AppError::NotFound)
    ));
    state
        .sales_service
        .delete_deal(&ours.admin, deal.deal.id)
        .await
        .expect("negócio removido");
    assert!(matches!(
        state.sales_service.get_deal(&seller, deal.deal.id).await,
        Err(AppError::NotFound)
    ));

    let product = state
        .inventory_service
        .create_product(
            &ours.admin,
            &CreateProductPayload {
                name: "Pulseira de Prata".into(),
                sku: unique("PUL"),
                category_id: None,
                status: None,
                quantity: 3,
                min_quantity: 1,
                cost_price: Decimal::from(80),
                selling_price: Decimal::from(200),
                material: None,
            },
        )
        .await
        .expect("produto");

    let sale = state
        .sales_service
        .create_sale(
            &seller,
            &CreateSalePayload {
                invoice_number: unique("NF"),
                client_id: None,
                status: None,
                notes: None,
                items: vec![SaleItemPayload {
                    product_id: product.id,
                    quantity: 2,
                    unit_price: None,
                }],
            },
        )
        .await
        .expect("venda");

    let detail = state
        .sales_service
        .get_sale(&seller, sale.sale.id)
        .await
        .expect("detalhe");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.sale.total_amount, Decimal::from(400));

    let confirmed = state
        .sales_service
        .update_sale(
            &seller,
            sale.sale.id,
            &UpdateSalePayload {
                status: Some(SaleStatus::Confirmed),
                notes: None,
            },
        )
        .await
        .expect("venda confirmada");
    assert_eq!(confirmed.sale.status, SaleStatus::Confirmed);
    assert_eq!(confirmed.items.len(), 1);

    // Produto vendido não pode ser apagado.
    assert!(matches!(
        state.inventory_service.delete_product(&ours.admin, product.id).await,
        Err(AppError::Conflict(_))
    ));

    state
        .sales_service
        .delete_sale(&ours.admin, sale.sale.id)
        .await
        .expect("venda removida");
    state
        .inventory_service
        .delete_product(&ours.admin, product.id)
        .await
        .expect("produto sem vendas é removido");
}

#[tokio::test]
async fn catalog_records_stay_inside_the_tenant() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let ours = TenantFixture::seed(&pool, "Joalheria Jade").await;
    let theirs = TenantFixture::seed(&pool, "Joalheria Kunzita").await;

    let rings = state
        .inventory_service
        .create_category(
            &ours.admin,
            &CreateCategoryPayload {
                name: "Anéis".into(),
                description: None,
            },
        )
        .await
        .expect("categoria");
    let foreign = state
        .inventory_service
        .create_category(
            &theirs.admin,
            &CreateCategoryPayload {
                name: "Brincos".into(),
                description: None,
            },
        )
        .await
        .expect("categoria");

    let product = state
        .inventory_service
        .create_product(
            &ours.admin,
            &CreateProductPayload {
                name: "Solitário".into(),
                sku: unique("SOL"),
                category_id: Some(rings.id),
                status: None,
                quantity: 1,
                min_quantity: 0,
                cost_price: Decimal::from(900),
                selling_price: Decimal::from(2_000),
                material: Some("ouro branco".into()),
            },
        )
        .await
        .expect("produto");

    let in_rings = state
        .inventory_service
        .products_in_category(&ours.admin, rings.id)
        .await
        .expect("produtos da categoria");
    assert_eq!(in_rings.len(), 1);
    assert_eq!(in_rings[0].category_name.as_deref(), Some("Anéis"));

    // Categoria de outro tenant não serve de referência.
    let moved = state
        .inventory_service
        .update_product(
            &ours.admin,
            product.id,
            &UpdateProductPayload {
                category_id: Some(Some(foreign.id)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(
        moved,
        Err(AppError::MissingReference { field: "categoryId" })
    ));

    let repriced = state
        .inventory_service
        .update_product(
            &ours.admin,
            product.id,
            &UpdateProductPayload {
                selling_price: Some(Decimal::from(2_200)),
                ..Default::default()
            },
        )
        .await
        .expect("preço atualizado");
    assert_eq!(repriced.product.selling_price, Decimal::from(2_200));
    assert_eq!(repriced.product.category_id, Some(rings.id));

    assert!(matches!(
        state.inventory_service.get_category(&theirs.admin, rings.id).await,
        Err(AppError::NotFound)
    ));

    state
        .inventory_service
        .delete_category(&ours.admin, rings.id)
        .await
        .expect("categoria removida");
    let orphan = state
        .inventory_service
        .get_product(&ours.admin, product.id)
        .await
        .expect("produto continua");
    assert_eq!(orphan.product.category_id, None);
}

#[tokio::test]
async fn users_are_edited_only_by_whoever_sees_them() {
    let Some(pool) = database().await else {
        return;
    };
    let state = app_state(&pool);
    let ours = TenantFixture::seed(&pool, "Joalheria Lápis-Lazúli").await;
    let theirs = TenantFixture::seed(&pool, "Joalheria Malaquita").await;

    let (manager, manager_actor) = ours.add_member(&state, Role::Manager, None).await;
    let (report, _) = ours
        .add_member(&state, Role::InhouseSales, Some(manager.member.id))
        .await;
    let report_user = report.member.user_id;

    let promoted = state
        .user_service
        .update(
            &manager_actor,
            report_user,
            &UpdateUserPayload {
                role: Some(Role::TeleCalling),
                phone: Some("+55 11 99999-0000".into()),
                ..Default::default()
            },
        )
        .await
        .expect("usuário atualizado");
    assert_eq!(promoted.user.role, Some(Role::TeleCalling));
    assert_eq!(promoted.user.phone.as_deref(), Some("+55 11 99999-0000"));

    // Gerente não promove ninguém a gerente, nem muda o próprio papel.
    assert!(matches!(
        state
            .user_service
            .update(
                &manager_actor,
                report_user,
                &UpdateUserPayload {
                    role: Some(Role::Manager),
                    ..Default::default()
                },
            )
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        state
            .user_service
            .update(
                &manager_actor,
                manager_actor.user_id,
                &UpdateUserPayload {
                    role: Some(Role::BusinessAdmin),
                    ..Default::default()
                },
            )
            .await,
        Err(AppError::Forbidden(_))
    ));

    assert!(matches!(
        state.user_service.get(&theirs.admin, report_user).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        state.user_service.delete(&theirs.admin, report_user).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        state.user_service.delete(&ours.admin, ours.admin.user_id).await,
        Err(AppError::BadRequest(_))
    ));

    state
        .user_service
        .delete(&ours.admin, report_user)
        .await
        .expect("usuário removido");
    assert!(matches!(
        state.team_service.get(&ours.admin, report.member.id).await,
        Err(AppError::NotFound)
    ));
}
