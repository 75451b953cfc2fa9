//! Demo wiring: settings, logging, in-memory stores and the order operator.
//!
//! Opens an order for a seeded customer, adds and removes a few line items
//! and logs the outcome of each step.

use std::sync::Arc;

use anyhow::Context;

use storefront_core::{CustomerId, ExpectedVersion, Money, ProductId};
use storefront_infra::{
    InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository, Settings,
};
use storefront_parties::{Customer, CustomerRepository};
use storefront_products::{Product, ProductRepository};
use storefront_sales::{OrderOperator, OrderRepository};

const DEFAULT_CONFIG_PATH: &str = "config/settings.json";

fn main() -> anyhow::Result<()> {
    let config_path =
        std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let settings = Settings::from_env_and_file(&config_path)
        .with_context(|| format!("loading settings from {config_path}"))?;

    storefront_observability::init(&settings.logging);
    tracing::info!(stock_policy = ?settings.orders.stock_policy, "starting storefront demo");

    let orders = Arc::new(InMemoryOrderRepository::new());
    let customers = Arc::new(InMemoryCustomerRepository::new());
    let products = Arc::new(InMemoryProductRepository::new());

    let customer = Customer::new(CustomerId::new(), "Ada", "30.00".parse::<Money>()?)?;
    let tea = Product::new(ProductId::new(), "Tea", "7.75".parse::<Money>()?, 20)?;
    let biscuits = Product::new(ProductId::new(), "Biscuits", "1.25".parse::<Money>()?, 3)?;

    customers.store(&customer, ExpectedVersion::Exact(0))?;
    products.store(&tea, ExpectedVersion::Exact(0))?;
    products.store(&biscuits, ExpectedVersion::Exact(0))?;

    let operator = OrderOperator::new(orders.clone(), customers.clone(), products.clone())
        .with_stock_policy(settings.orders.stock_policy);

    let customer_id = customer.id_typed();
    let order_id = operator.open_order(customer_id)?.id_typed();

    let additions = [
        (tea.id_typed(), 2),
        (biscuits.id_typed(), 2),
        (tea.id_typed(), 2),
        (biscuits.id_typed(), 5),
    ];
    for (product_id, quantity) in additions {
        match operator.add_product(order_id, customer_id, product_id, quantity) {
            Ok(change) => operator.commit(change).context("committing order change")?,
            Err(err) => tracing::warn!(
                product_id = %product_id,
                quantity,
                kind = err.kind(),
                error = %err,
                "line item rejected"
            ),
        }
    }

    let change = operator.remove_product(order_id, customer_id, tea.id_typed(), 1)?;
    operator.commit(change).context("committing order change")?;

    let order = orders.fetch(&order_id)?;
    tracing::info!(
        order_id = %order_id,
        lines = order.items().len(),
        units = order.unit_count(),
        total = %order.total(),
        balance = %customers.fetch(&customer_id)?.balance(),
        "final order"
    );

    Ok(())
}
