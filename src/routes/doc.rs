use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddCartItemRequest, CartItemList, UpdateCartItemRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        comments::{CommentList, CreateCommentRequest, UpdateCommentRequest},
        customers::{CustomerList, UpdateCustomerRequest},
        orders::{CreateOrderRequest, OrderList, UpdateOrderStatusRequest},
        products::{
            AdminProductList, ClearInventoryRequest, ClearInventoryResponse, CreateProductRequest,
            ProductList, UpdateProductRequest,
        },
    },
    models::{
        AdminOrder, AdminProduct, Cart, CartItem, Category, Comment, CommentStatus, Customer,
        CustomerOrder, InventoryStatus, OrderCustomer, OrderItem, OrderStatus, OrderView, Product,
        ProductSummary, User,
    },
    response::{ApiResponse, Meta},
    routes::{admin, auth, carts, categories, customers, health, orders, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::register,
        auth::login,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::list_comments,
        products::create_comment,
        products::get_comment,
        products::update_comment,
        products::delete_comment,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        carts::create_cart,
        carts::get_cart,
        carts::delete_cart,
        carts::list_items,
        carts::add_item,
        carts::get_item,
        carts::update_item,
        carts::remove_item,
        customers::list_customers,
        customers::get_me,
        customers::update_me,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,
        admin::list_products,
        admin::list_low_stock,
        admin::clear_inventory
    ),
    components(
        schemas(
            User,
            Customer,
            Category,
            Product,
            AdminProduct,
            InventoryStatus,
            Comment,
            CommentStatus,
            ProductSummary,
            Cart,
            CartItem,
            OrderStatus,
            OrderItem,
            OrderCustomer,
            AdminOrder,
            CustomerOrder,
            OrderView,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddCartItemRequest,
            UpdateCartItemRequest,
            CartItemList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateCommentRequest,
            UpdateCommentRequest,
            CommentList,
            UpdateCustomerRequest,
            CustomerList,
            CreateOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AdminProductList,
            ClearInventoryRequest,
            ClearInventoryResponse,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Cart>,
            ApiResponse<OrderView>,
            ApiResponse<OrderList>,
            ApiResponse<AdminProductList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Registration and login"),
        (name = "Products", description = "Catalogue, public read and staff write"),
        (name = "Comments", description = "Product comments"),
        (name = "Categories", description = "Product categories"),
        (name = "Cart", description = "Anonymous carts"),
        (name = "Customers", description = "Customer profiles"),
        (name = "Orders", description = "Order placement and history"),
        (name = "Admin", description = "Staff inventory tools"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
