use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
    entity::{
        cart_items::{self, Column as CartItemCol, Entity as CartItems},
        carts::Entity as Carts,
        customers::{Column as CustomerCol, Entity as Customers},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ViewRole, ensure_admin},
    models::{AdminOrder, CustomerOrder, OrderCustomer, OrderItem, OrderStatus, OrderView, ProductSummary},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub const CART_NOT_FOUND: &str = "There is no cart with this cart id";
pub const CART_EMPTY: &str = "Your cart is empty. Please add some product to it first";

/// Everything the placement workflow needs to know about the caller.
#[derive(Debug, Clone, Copy)]
pub struct OrderContext {
    pub cart_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
    /// The cart lines the items were copied from, in the same order.
    pub lines: Vec<CartLine>,
}

impl PlacedOrder {
    /// Customer projection built from what the transaction already holds,
    /// so answering the caller needs no read after commit.
    pub fn customer_view(&self) -> AppResult<OrderView> {
        let items = self
            .items
            .iter()
            .zip(&self.lines)
            .map(|(item, line)| OrderItem {
                id: item.id,
                product: ProductSummary {
                    id: item.product_id,
                    name: line.product_name.clone(),
                    unit_price: line.unit_price,
                },
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        project_order(ViewRole::Customer, self.order.clone(), items, None)
    }
}

/// A cart item with the price its product carries right now.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct CartLine {
    pub cart_item_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Turns a cart into an order.
///
/// Runs in one transaction: the cart row is locked, validated, copied into an
/// order with one item per cart line and then deleted. Any error drops the
/// transaction uncommitted, so a failed call leaves the cart untouched and
/// creates nothing. A second caller racing on the same cart waits on the lock
/// and then sees the cart gone.
pub async fn place_order(db: &OrmConn, ctx: OrderContext) -> AppResult<PlacedOrder> {
    let txn = db.begin().await?;

    let cart = Carts::find_by_id(ctx.cart_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Validation(CART_NOT_FOUND.into()))?;

    let lines = load_cart_lines(&txn, cart.id).await?;
    if lines.is_empty() {
        return Err(AppError::Validation(CART_EMPTY.into()));
    }

    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(ctx.user_id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer.id),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let items = snapshot_lines(order.id, &lines);
    OrderItems::insert_many(items.iter().cloned().map(order_item_active))
        .exec_without_returning(&txn)
        .await?;

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;
    Carts::delete_by_id(cart.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        cart_id = %cart.id,
        customer_id = %customer.id,
        items = items.len(),
        "order placed"
    );

    Ok(PlacedOrder {
        order,
        items,
        lines,
    })
}

async fn load_cart_lines<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
    let lines = CartItems::find()
        .select_only()
        .column_as(CartItemCol::Id, "cart_item_id")
        .column(CartItemCol::ProductId)
        .column(CartItemCol::Quantity)
        .column_as(ProdCol::Name, "product_name")
        .column_as(ProdCol::UnitPrice, "unit_price")
        .join(JoinType::InnerJoin, cart_items::Relation::Products.def())
        .filter(CartItemCol::CartId.eq(cart_id))
        .order_by_asc(CartItemCol::CreatedAt)
        .order_by_asc(CartItemCol::Id)
        .into_model::<CartLine>()
        .all(conn)
        .await?;
    Ok(lines)
}

/// One order item per cart line, carrying the line's quantity and the
/// product's price at this moment.
pub fn snapshot_lines(order_id: Uuid, lines: &[CartLine]) -> Vec<OrderItemModel> {
    lines
        .iter()
        .map(|line| OrderItemModel {
            id: Uuid::new_v4(),
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        })
        .collect()
}

fn order_item_active(model: OrderItemModel) -> OrderItemActive {
    OrderItemActive {
        id: Set(model.id),
        order_id: Set(model.order_id),
        product_id: Set(model.product_id),
        quantity: Set(model.quantity),
        unit_price: Set(model.unit_price),
    }
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderView>> {
    let ctx = OrderContext {
        cart_id: payload.cart_id,
        user_id: user.user_id,
    };
    let placed = place_order(&state.orm, ctx).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({
            "order_id": placed.order.id,
            "cart_id": ctx.cart_id,
            "items": placed.items.len(),
        }),
    )
    .await;

    let view = placed.customer_view()?;
    Ok(ApiResponse::single("Order created", view))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let role = user.view_role();
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if role == ViewRole::Customer {
        let customer_id = customer_id_for(&state.orm, user.user_id).await?;
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = load_order_views(&state.orm, orders, role).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderView>> {
    let role = user.view_role();
    let mut condition = Condition::all().add(OrderCol::Id.eq(id));
    if role == ViewRole::Customer {
        let customer_id = customer_id_for(&state.orm, user.user_id).await?;
        condition = condition.add(OrderCol::CustomerId.eq(customer_id));
    }

    let order = Orders::find()
        .filter(condition)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let view = load_order_views(&state.orm, vec![order], role)
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::single("OK", view))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderView>> {
    ensure_admin(user)?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status.as_str().to_string());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    let view = load_order_views(&state.orm, vec![order], ViewRole::Admin)
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::single("Order updated", view))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}

async fn customer_id_for(db: &OrmConn, user_id: Uuid) -> AppResult<Uuid> {
    let customer = Customers::find()
        .filter(CustomerCol::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(customer.id)
}

/// Loads items (and for staff, customer details) for a page of orders and
/// projects each one for `role`. Keeps the input order.
pub async fn load_order_views(
    db: &OrmConn,
    orders: Vec<OrderModel>,
    role: ViewRole,
) -> AppResult<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .find_also_related(Products)
        .all(db)
        .await?;

    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for (item, product) in rows {
        let order_id = item.order_id;
        items_by_order
            .entry(order_id)
            .or_default()
            .push(order_item_view(item, product.as_ref()));
    }

    let mut customers: HashMap<Uuid, OrderCustomer> = HashMap::new();
    if role == ViewRole::Admin {
        let customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
        let rows = Customers::find()
            .filter(CustomerCol::Id.is_in(customer_ids))
            .find_also_related(Users)
            .all(db)
            .await?;
        for (customer, user) in rows {
            let (first_name, last_name, email) = match user {
                Some(u) => (u.first_name, u.last_name, u.email),
                None => Default::default(),
            };
            customers.insert(
                customer.id,
                OrderCustomer {
                    id: customer.id,
                    first_name,
                    last_name,
                    email,
                },
            );
        }
    }

    orders
        .into_iter()
        .map(|order| {
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            let customer = customers.get(&order.customer_id).cloned();
            project_order(role, order, items, customer)
        })
        .collect()
}

fn order_item_view(item: OrderItemModel, product: Option<&ProductModel>) -> OrderItem {
    OrderItem {
        id: item.id,
        product: ProductSummary {
            id: item.product_id,
            name: product.map(|p| p.name.clone()).unwrap_or_default(),
            unit_price: product.map(|p| p.unit_price).unwrap_or(item.unit_price),
        },
        quantity: item.quantity,
        unit_price: item.unit_price,
    }
}

/// Builds the role-specific shape of an order. Staff see who placed it,
/// customers only see their own customer id.
pub fn project_order(
    role: ViewRole,
    order: OrderModel,
    items: Vec<OrderItem>,
    customer: Option<OrderCustomer>,
) -> AppResult<OrderView> {
    let status = OrderStatus::parse(&order.status)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("order {} has unknown status", order.id)))?;
    let created_at = order.created_at.with_timezone(&Utc);

    let view = match role {
        ViewRole::Admin => OrderView::Admin(AdminOrder {
            id: order.id,
            customer: customer.unwrap_or(OrderCustomer {
                id: order.customer_id,
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
            }),
            status,
            created_at,
            items,
        }),
        ViewRole::Customer => OrderView::Customer(CustomerOrder {
            customer: order.customer_id,
            status,
            created_at,
            items,
        }),
    };
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, cents: i64) -> CartLine {
        CartLine {
            cart_item_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "Widget".into(),
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    fn order(status: &str) -> OrderModel {
        OrderModel {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            status: status.into(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn snapshot_keeps_one_item_per_line() {
        let order_id = Uuid::new_v4();
        let lines = vec![line(2, 1000), line(1, 500)];

        let items = snapshot_lines(order_id, &lines);

        assert_eq!(items.len(), 2);
        for (item, line) in items.iter().zip(&lines) {
            assert_eq!(item.order_id, order_id);
            assert_eq!(item.product_id, line.product_id);
            assert_eq!(item.quantity, line.quantity);
            assert_eq!(item.unit_price, line.unit_price);
        }
        assert_ne!(items[0].id, items[1].id);
    }

    #[test]
    fn placed_order_answers_without_reloading() {
        let model = order("pending");
        let customer_id = model.customer_id;
        let lines = vec![line(2, 1000), line(1, 550)];
        let items = snapshot_lines(model.id, &lines);
        let placed = PlacedOrder {
            order: model,
            items,
            lines: lines.clone(),
        };

        let OrderView::Customer(view) = placed.customer_view().unwrap() else {
            panic!("expected customer projection");
        };
        assert_eq!(view.customer, customer_id);
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.items.len(), 2);
        for (item, line) in view.items.iter().zip(&lines) {
            assert_eq!(item.product.id, line.product_id);
            assert_eq!(item.product.name, "Widget");
            assert_eq!(item.quantity, line.quantity);
            assert_eq!(item.unit_price, line.unit_price);
        }
    }

    #[test]
    fn snapshot_of_empty_cart_is_empty() {
        assert!(snapshot_lines(Uuid::new_v4(), &[]).is_empty());
    }

    #[test]
    fn customers_get_the_short_projection() {
        let model = order("pending");
        let customer_id = model.customer_id;
        let view = project_order(ViewRole::Customer, model, Vec::new(), None).unwrap();
        match view {
            OrderView::Customer(o) => {
                assert_eq!(o.customer, customer_id);
                assert_eq!(o.status, OrderStatus::Pending);
            }
            OrderView::Admin(_) => panic!("expected customer projection"),
        }
    }

    #[test]
    fn staff_see_customer_details() {
        let model = order("complete");
        let customer = OrderCustomer {
            id: model.customer_id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
        };
        let view = project_order(ViewRole::Admin, model, Vec::new(), Some(customer)).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["customer"]["email"], "ada@example.com");
        assert_eq!(json["status"], "complete");
        assert!(json.get("id").is_some());
    }

    #[test]
    fn unknown_stored_status_is_an_internal_error() {
        let err = project_order(ViewRole::Customer, order("shipped"), Vec::new(), None).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
