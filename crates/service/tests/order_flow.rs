//! End-to-end order flow against the in-memory store.

use std::sync::Once;

use common::{CustomerId, ProductId};
use domain::{Customer, Money, OrderItemStatus, Seller};
use service::{
    ErrorKind, NewProduct, OrderLine, OrderService, ProductService, ServiceError,
};
use store::{CustomerStore, InMemoryStore, ProductStore, SellerStore};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("warn")
            }))
            .with_test_writer()
            .try_init()
            .ok();
    });
}

struct App {
    store: InMemoryStore,
    orders: OrderService<InMemoryStore>,
    products: ProductService<InMemoryStore>,
}

impl App {
    fn new() -> Self {
        init_tracing();
        let store = InMemoryStore::new();
        Self {
            orders: OrderService::new(store.clone()),
            products: ProductService::new(store.clone()),
            store,
        }
    }

    async fn seed_customer(&self, name: &str) -> CustomerId {
        let mut customer = Customer::new(name, "1 Main St");
        self.store.save_customer(&mut customer).await.unwrap()
    }

    async fn seed_product(&self, name: &str, price_cents: i64, quantity: u32) -> ProductId {
        let mut seller = Seller::new("Acme Corp", "2 Warehouse Way");
        let seller_id = self.store.save_seller(&mut seller).await.unwrap();

        self.products
            .create_product(NewProduct {
                seller_id,
                name: name.to_string(),
                description: format!("{name} from Acme"),
                price: Money::from_cents(price_cents),
                quantity,
            })
            .await
            .unwrap()
    }

    async fn quantity_of(&self, id: ProductId) -> u32 {
        self.store.find_product(id).await.unwrap().unwrap().quantity
    }
}

#[tokio::test]
async fn full_order_lifecycle() {
    let app = App::new();
    let customer_id = app.seed_customer("Jane Doe").await;
    let keyboard = app.seed_product("Keyboard", 4500, 10).await;
    let mouse = app.seed_product("Mouse", 1500, 6).await;

    // Place the order.
    let order_id = app
        .orders
        .create_order(
            customer_id,
            &[
                OrderLine {
                    product_id: keyboard,
                    count: 2,
                },
                OrderLine {
                    product_id: mouse,
                    count: 3,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(app.quantity_of(keyboard).await, 8);
    assert_eq!(app.quantity_of(mouse).await, 3);

    let order = app.orders.find_order(order_id).await.unwrap();
    assert_eq!(order.item_count(), 2);
    assert_eq!(order.total_amount().cents(), 2 * 4500 + 3 * 1500);
    assert_eq!(order.customer.name, "Jane Doe");

    // Walk the first line to delivered.
    let keyboard_line = order.items[0].id.unwrap();
    for target in [
        OrderItemStatus::Confirmed,
        OrderItemStatus::Shipped,
        OrderItemStatus::Delivered,
    ] {
        app.orders
            .update_order_item_status(keyboard_line, target)
            .await
            .unwrap();
    }

    // Cancel the second line; stock is not restored by cancellation.
    let mouse_line = order.items[1].id.unwrap();
    app.orders.cancel_order_item(mouse_line).await.unwrap();
    assert_eq!(app.quantity_of(mouse).await, 3);

    let order = app.orders.find_order(order_id).await.unwrap();
    assert_eq!(order.items[0].status, OrderItemStatus::Delivered);
    assert_eq!(order.items[1].status, OrderItemStatus::Cancelled);

    // A delivered line admits nothing further.
    let result = app.orders.cancel_order_item(keyboard_line).await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidOperation);
}

#[tokio::test]
async fn orders_accumulate_per_customer() {
    let app = App::new();
    let jane = app.seed_customer("Jane Doe").await;
    let john = app.seed_customer("John Doe").await;
    let product = app.seed_product("Keyboard", 4500, 10).await;

    let line = [OrderLine {
        product_id: product,
        count: 1,
    }];
    app.orders.create_order(jane, &line).await.unwrap();
    app.orders.create_order(jane, &line).await.unwrap();
    app.orders.create_order(john, &line).await.unwrap();

    assert_eq!(
        app.orders.find_orders_by_customer(jane).await.unwrap().len(),
        2
    );
    assert_eq!(
        app.orders.find_orders_by_customer(john).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn concurrent_orders_on_scarce_stock_have_one_winner() {
    let app = App::new();
    let jane = app.seed_customer("Jane Doe").await;
    let john = app.seed_customer("John Doe").await;
    let product = app.seed_product("Keyboard", 4500, 3).await;

    let place = |customer_id: CustomerId| {
        let store = app.store.clone();
        tokio::spawn(async move {
            let orders = OrderService::new(store);
            orders
                .create_order(
                    customer_id,
                    &[OrderLine {
                        product_id: product,
                        count: 2,
                    }],
                )
                .await
        })
    };

    let first = place(jane);
    let second = place(john);
    let results = [first.await.unwrap(), second.await.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let rejections = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(err) if err.kind() == ErrorKind::InvalidArgument
            )
        })
        .count();

    assert_eq!(successes, 1);
    assert_eq!(rejections, 1);
    assert_eq!(app.quantity_of(product).await, 1);
}

#[tokio::test]
async fn retired_products_cannot_be_ordered_but_old_orders_survive() {
    let app = App::new();
    let customer_id = app.seed_customer("Jane Doe").await;
    let product = app.seed_product("Keyboard", 4500, 10).await;

    let order_id = app
        .orders
        .create_order(
            customer_id,
            &[OrderLine {
                product_id: product,
                count: 1,
            }],
        )
        .await
        .unwrap();

    app.products.delete_product(product).await.unwrap();

    // New orders no longer resolve the product.
    let result = app
        .orders
        .create_order(
            customer_id,
            &[OrderLine {
                product_id: product,
                count: 1,
            }],
        )
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::UnknownProducts { .. })
    ));

    // The existing order still loads with the retired product attached.
    let order = app.orders.find_order(order_id).await.unwrap();
    assert_eq!(order.items[0].product.id, Some(product));
    assert!(order.items[0].product.is_deleted());
}
