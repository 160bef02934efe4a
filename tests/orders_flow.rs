use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddCartItemRequest,
        orders::{CreateOrderRequest, UpdateOrderStatusRequest},
    },
    entity::{
        audit_logs::{Column as AuditCol, Entity as AuditLogs},
        cart_items::{ActiveModel as CartItemActive, Column as CartItemCol, Entity as CartItems},
        carts::Entity as Carts,
        categories::ActiveModel as CategoryActive,
        customers::ActiveModel as CustomerActive,
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Model as ProductModel},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{OrderStatus, OrderView},
    routes::params::OrderListQuery,
    services::{
        cart_service::{self, MAX_ITEM_QUANTITY},
        order_service::{self, CART_EMPTY, CART_NOT_FOUND, OrderContext},
        product_service,
    },
    state::AppState,
};
use uuid::Uuid;

// Tests share one database, so every fixture gets unique ids and names
// instead of truncating tables between runs.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let orm = create_orm_conn(&database_url, 5).await?;
    run_migrations(&orm).await?;
    let pool = create_pool(&database_url, 5).await?;

    Ok(Some(AppState { pool, orm }))
}

/// A user with role `role` and the customer profile registration would create.
async fn create_customer(state: &AppState, role: &str) -> anyhow::Result<(AuthUser, Uuid)> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{}@example.com", Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        first_name: Set("Test".into()),
        last_name: Set(role.into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        birth_date: Set(None),
    }
    .insert(&state.orm)
    .await?;

    let auth = AuthUser {
        user_id: user.id,
        role: role.into(),
    };
    Ok((auth, customer.id))
}

async fn create_product(state: &AppState, unit_price: Decimal) -> anyhow::Result<ProductModel> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        title: Set("Testing".into()),
        description: Set(String::new()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let name = format!("Widget {}", Uuid::new_v4());
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        slug: Set(product_service::slugify(&name)),
        name: Set(name),
        description: Set("A product for testing".into()),
        unit_price: Set(unit_price),
        inventory: Set(10),
        category_id: Set(category.id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}

async fn cart_with(state: &AppState, lines: &[(Uuid, i32)]) -> anyhow::Result<Uuid> {
    let cart = cart_service::create_cart(&state.pool)
        .await?
        .into_data()
        .expect("cart data");

    for &(product_id, quantity) in lines {
        cart_service::add_cart_item(
            &state.pool,
            cart.id,
            AddCartItemRequest {
                product_id,
                quantity,
            },
        )
        .await?;
    }
    Ok(cart.id)
}

async fn orders_of(state: &AppState, customer_id: Uuid) -> anyhow::Result<u64> {
    Ok(Orders::find()
        .filter(OrderCol::CustomerId.eq(customer_id))
        .count(&state.orm)
        .await?)
}

async fn cart_exists(state: &AppState, cart_id: Uuid) -> anyhow::Result<bool> {
    Ok(Carts::find_by_id(cart_id).one(&state.orm).await?.is_some())
}

// Customer fills a cart, checks out, sees their order; admin moves it along.
#[tokio::test]
async fn checkout_snapshots_cart_and_consumes_it() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, customer_id) = create_customer(&state, "user").await?;
    let (admin, _) = create_customer(&state, "admin").await?;
    let p1 = create_product(&state, Decimal::new(1000, 2)).await?;
    let p2 = create_product(&state, Decimal::new(550, 2)).await?;

    let cart_id = cart_with(&state, &[(p1.id, 2), (p2.id, 1)]).await?;

    let created = order_service::create_order(&state, &user, CreateOrderRequest { cart_id })
        .await?
        .into_data()
        .expect("order data");

    let OrderView::Customer(order) = &created else {
        panic!("customer should get the customer projection");
    };
    assert_eq!(order.customer, customer_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);

    let line = |product_id: Uuid| {
        order
            .items
            .iter()
            .find(|item| item.product.id == product_id)
            .expect("order item for product")
    };
    assert_eq!(line(p1.id).quantity, 2);
    assert_eq!(line(p1.id).unit_price, Decimal::new(1000, 2));
    assert_eq!(line(p2.id).quantity, 1);
    assert_eq!(line(p2.id).unit_price, Decimal::new(550, 2));

    // The cart and its items are gone.
    assert!(!cart_exists(&state, cart_id).await?);
    let leftover = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .count(&state.orm)
        .await?;
    assert_eq!(leftover, 0);

    let audited = AuditLogs::find()
        .filter(AuditCol::UserId.eq(user.user_id))
        .filter(AuditCol::Action.eq("order_create"))
        .count(&state.orm)
        .await?;
    assert_eq!(audited, 1);

    // Customers only see their own orders.
    let mine = order_service::list_orders(&state, &user, OrderListQuery::default())
        .await?
        .into_data()
        .expect("order list");
    assert_eq!(mine.items.len(), 1);

    // Staff get the admin projection and may change the status.
    let order_id = Orders::find()
        .filter(OrderCol::CustomerId.eq(customer_id))
        .one(&state.orm)
        .await?
        .expect("order row")
        .id;
    let updated = order_service::update_order_status(
        &state,
        &admin,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Complete,
        },
    )
    .await?
    .into_data()
    .expect("updated order");
    let OrderView::Admin(admin_view) = &updated else {
        panic!("admin should get the admin projection");
    };
    assert_eq!(admin_view.id, order_id);
    assert_eq!(admin_view.customer.id, customer_id);
    assert_eq!(admin_view.status, OrderStatus::Complete);

    // A customer may not change statuses.
    let denied = order_service::update_order_status(
        &state,
        &user,
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Failed,
        },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    Ok(())
}

#[tokio::test]
async fn order_keeps_price_after_product_price_change() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, _) = create_customer(&state, "user").await?;
    let product = create_product(&state, Decimal::new(1000, 2)).await?;
    let cart_id = cart_with(&state, &[(product.id, 1)]).await?;

    let placed = order_service::place_order(
        &state.orm,
        OrderContext {
            cart_id,
            user_id: user.user_id,
        },
    )
    .await?;

    let mut active: ProductActive = product.into();
    active.unit_price = Set(Decimal::new(2000, 2));
    let product = active.update(&state.orm).await?;

    let stored = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(placed.order.id))
        .one(&state.orm)
        .await?
        .expect("order item");
    assert_eq!(stored.product_id, product.id);
    assert_eq!(stored.unit_price, Decimal::new(1000, 2));

    Ok(())
}

#[tokio::test]
async fn checkout_of_empty_cart_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, customer_id) = create_customer(&state, "user").await?;
    let cart_id = cart_with(&state, &[]).await?;

    let result = order_service::place_order(
        &state.orm,
        OrderContext {
            cart_id,
            user_id: user.user_id,
        },
    )
    .await;

    match result {
        Err(AppError::Validation(message)) => assert_eq!(message, CART_EMPTY),
        other => panic!("expected empty cart validation, got {other:?}"),
    }
    assert_eq!(orders_of(&state, customer_id).await?, 0);
    assert!(cart_exists(&state, cart_id).await?);

    Ok(())
}

#[tokio::test]
async fn checkout_of_unknown_cart_is_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, customer_id) = create_customer(&state, "user").await?;

    let result = order_service::place_order(
        &state.orm,
        OrderContext {
            cart_id: Uuid::new_v4(),
            user_id: user.user_id,
        },
    )
    .await;

    match result {
        Err(AppError::Validation(message)) => assert_eq!(message, CART_NOT_FOUND),
        other => panic!("expected missing cart validation, got {other:?}"),
    }
    assert_eq!(orders_of(&state, customer_id).await?, 0);

    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_of_one_cart_place_one_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, customer_id) = create_customer(&state, "user").await?;
    let product = create_product(&state, Decimal::new(300, 2)).await?;
    let cart_id = cart_with(&state, &[(product.id, 3)]).await?;

    let ctx = OrderContext {
        cart_id,
        user_id: user.user_id,
    };
    let (first, second) = tokio::join!(
        order_service::place_order(&state.orm, ctx),
        order_service::place_order(&state.orm, ctx),
    );

    let (won, lost) = match (first, second) {
        (Ok(placed), Err(err)) | (Err(err), Ok(placed)) => (placed, err),
        (a, b) => panic!("expected exactly one checkout to succeed: {a:?} / {b:?}"),
    };
    assert_eq!(won.items.len(), 1);
    assert_eq!(won.items[0].quantity, 3);
    assert!(matches!(lost, AppError::Validation(ref message) if message == CART_NOT_FOUND));

    assert_eq!(orders_of(&state, customer_id).await?, 1);
    assert!(!cart_exists(&state, cart_id).await?);

    Ok(())
}

// A line that violates the order item constraint makes the bulk insert fail
// after the order row was written; nothing may survive.
#[tokio::test]
async fn failed_checkout_leaves_no_trace() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (user, customer_id) = create_customer(&state, "user").await?;
    let good = create_product(&state, Decimal::new(1000, 2)).await?;
    let bad = create_product(&state, Decimal::new(500, 2)).await?;
    let cart_id = cart_with(&state, &[(good.id, 1)]).await?;

    CartItemActive {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart_id),
        product_id: Set(bad.id),
        quantity: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let result = order_service::place_order(
        &state.orm,
        OrderContext {
            cart_id,
            user_id: user.user_id,
        },
    )
    .await;
    assert!(result.is_err());

    assert_eq!(orders_of(&state, customer_id).await?, 0);
    assert!(cart_exists(&state, cart_id).await?);
    let items = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart_id))
        .count(&state.orm)
        .await?;
    assert_eq!(items, 2);

    Ok(())
}

#[tokio::test]
async fn checkout_without_customer_profile_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let product = create_product(&state, Decimal::new(1000, 2)).await?;
    let cart_id = cart_with(&state, &[(product.id, 1)]).await?;

    let result = order_service::place_order(
        &state.orm,
        OrderContext {
            cart_id,
            user_id: Uuid::new_v4(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound)));
    assert!(cart_exists(&state, cart_id).await?);

    Ok(())
}

#[tokio::test]
async fn adding_same_product_twice_increments_quantity() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let product = create_product(&state, Decimal::new(250, 2)).await?;
    let cart_id = cart_with(&state, &[(product.id, 2), (product.id, 3)]).await?;

    let cart = cart_service::get_cart(&state.pool, cart_id)
        .await?
        .into_data()
        .expect("cart data");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.total_price, Decimal::new(1250, 2));

    let rejected = cart_service::add_cart_item(
        &state.pool,
        cart_id,
        AddCartItemRequest {
            product_id: product.id,
            quantity: 0,
        },
    )
    .await;
    assert!(rejected.is_err());

    Ok(())
}

#[tokio::test]
async fn merged_quantity_is_capped() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let product = create_product(&state, Decimal::new(100, 2)).await?;
    let cart_id = cart_with(&state, &[(product.id, MAX_ITEM_QUANTITY)]).await?;

    let add = |quantity| {
        cart_service::add_cart_item(
            &state.pool,
            cart_id,
            AddCartItemRequest {
                product_id: product.id,
                quantity,
            },
        )
    };

    assert!(matches!(add(1).await, Err(AppError::BadRequest(_))));
    assert!(matches!(add(i32::MAX).await, Err(AppError::BadRequest(_))));

    let cart = cart_service::get_cart(&state.pool, cart_id)
        .await?
        .into_data()
        .expect("cart data");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, MAX_ITEM_QUANTITY);

    Ok(())
}
