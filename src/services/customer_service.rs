use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    dto::customers::{CustomerList, UpdateCustomerRequest},
    entity::{
        customers::{ActiveModel, Column, Entity as Customers, Model as CustomerModel},
        orders::{Column as OrderCol, Entity as Orders},
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Customers::find()
        .find_also_related(Users)
        .order_by_asc(UserCol::FirstName)
        .order_by_asc(UserCol::LastName);

    let total = Customers::find().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(customer, user)| customer_view(customer, user))
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

async fn find_customer(state: &AppState, id: Uuid) -> AppResult<(CustomerModel, Option<UserModel>)> {
    Customers::find_by_id(id)
        .find_also_related(Users)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_customer_for_user(
    state: &AppState,
    user_id: Uuid,
) -> AppResult<(CustomerModel, Option<UserModel>)> {
    Customers::find()
        .filter(Column::UserId.eq(user_id))
        .find_also_related(Users)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    ensure_admin(user)?;
    let (customer, owner) = find_customer(state, id).await?;
    Ok(ApiResponse::single("Customer", customer_view(customer, owner)))
}

pub async fn get_me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Customer>> {
    let (customer, owner) = find_customer_for_user(state, user.user_id).await?;
    Ok(ApiResponse::single("Customer", customer_view(customer, owner)))
}

async fn apply_update(
    state: &AppState,
    customer: CustomerModel,
    owner: Option<UserModel>,
    payload: UpdateCustomerRequest,
) -> AppResult<Customer> {
    let mut active: ActiveModel = customer.into();
    active.birth_date = Set(payload.birth_date);
    let customer = active.update(&state.orm).await?;
    Ok(customer_view(customer, owner))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    ensure_admin(user)?;
    let (customer, owner) = find_customer(state, id).await?;
    let customer = apply_update(state, customer, owner, payload).await?;
    Ok(ApiResponse::single("Updated", customer))
}

pub async fn update_me(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let (customer, owner) = find_customer_for_user(state, user.user_id).await?;
    let customer = apply_update(state, customer, owner, payload).await?;
    Ok(ApiResponse::single("Updated", customer))
}

pub async fn delete_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let (customer, _) = find_customer(state, id).await?;

    let orders = Orders::find()
        .filter(OrderCol::CustomerId.eq(customer.id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::MethodNotAllowed(
            "This customer has orders and cannot be removed".into(),
        ));
    }

    Customers::delete_by_id(customer.id).exec(&state.orm).await?;
    Ok(ApiResponse::single("Deleted", serde_json::json!({})))
}

fn customer_view(customer: CustomerModel, user: Option<UserModel>) -> Customer {
    let (first_name, last_name, email) = match user {
        Some(u) => (u.first_name, u.last_name, u.email),
        None => Default::default(),
    };
    Customer {
        id: customer.id,
        user_id: customer.user_id,
        first_name,
        last_name,
        email,
        birth_date: customer.birth_date,
    }
}
