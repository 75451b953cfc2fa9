//! Integration tests for the order use cases against the in-memory stores.
//!
//! Tests: OrderOperator → repositories → Order aggregate → commit
//!
//! Verifies:
//! - Ownership is checked before anything is touched
//! - Use cases never store; `commit` persists order, customer and product
//! - Stale changes are rejected by optimistic concurrency

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use storefront_core::{
        AggregateRoot, CustomerId, DomainError, ExpectedVersion, Money, OrderId, ProductId,
    };
    use storefront_parties::{Customer, CustomerRepository};
    use storefront_products::{Product, ProductRepository};
    use storefront_sales::{Order, OrderOperator, OrderRepository, StockPolicy};

    use crate::store::{
        InMemoryCustomerRepository, InMemoryOrderRepository, InMemoryProductRepository,
    };

    struct Fixture {
        orders: Arc<InMemoryOrderRepository>,
        customers: Arc<InMemoryCustomerRepository>,
        products: Arc<InMemoryProductRepository>,
        operator: OrderOperator,
        customer_id: CustomerId,
        order_id: OrderId,
        product_id: ProductId,
    }

    impl Fixture {
        fn store_counts(&self) -> (usize, usize, usize) {
            (
                self.orders.store_count(),
                self.customers.store_count(),
                self.products.store_count(),
            )
        }
    }

    /// Customer with 30.00, an empty order for them, and a 7.75 product with 20 in stock.
    fn setup(policy: StockPolicy) -> Fixture {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let customers = Arc::new(InMemoryCustomerRepository::new());
        let products = Arc::new(InMemoryProductRepository::new());

        let customer =
            Customer::new(CustomerId::new(), "Customer Name1", Money::from_minor(3000)).unwrap();
        let product =
            Product::new(ProductId::new(), "Product One", Money::from_minor(775), 20).unwrap();
        let order = Order::new(OrderId::new(), customer.clone(), Utc::now());

        customers.store(&customer, ExpectedVersion::Exact(0)).unwrap();
        products.store(&product, ExpectedVersion::Exact(0)).unwrap();
        orders.store(&order, ExpectedVersion::Exact(0)).unwrap();

        let operator = OrderOperator::new(orders.clone(), customers.clone(), products.clone())
            .with_stock_policy(policy);

        Fixture {
            orders,
            customers,
            products,
            operator,
            customer_id: customer.id_typed(),
            order_id: order.id_typed(),
            product_id: product.id_typed(),
        }
    }

    #[test]
    fn add_product_mutates_without_storing() {
        let fx = setup(StockPolicy::Enforce);
        let before = fx.store_counts();

        let change = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 2)
            .unwrap();

        assert_eq!(change.order().total(), Money::from_minor(1550));
        assert_eq!(change.order().customer().balance(), Money::from_minor(1450));
        assert_eq!(change.product().stock_count(), 18);
        assert_eq!(fx.store_counts(), before);

        // Nothing persisted yet.
        let stored = fx.orders.fetch(&fx.order_id).unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn ownership_mismatch_is_rejected_without_store_calls() {
        let fx = setup(StockPolicy::Enforce);
        let before = fx.store_counts();
        let stranger = CustomerId::new();

        let err = fx
            .operator
            .add_product(fx.order_id, stranger, fx.product_id, 1)
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::OrderOwnershipMismatch {
                order_id: fx.order_id,
                customer_id: stranger,
            }
        );
        assert_eq!(fx.store_counts(), before);
        assert!(fx.orders.fetch(&fx.order_id).unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_propagate_not_found() {
        let fx = setup(StockPolicy::Enforce);

        let missing_order = OrderId::new();
        let err = fx
            .operator
            .add_product(missing_order, fx.customer_id, fx.product_id, 1)
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("order", missing_order));

        let missing_product = ProductId::new();
        let err = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, missing_product, 1)
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("product", missing_product));
    }

    #[test]
    fn commit_persists_all_three_aggregates() {
        let fx = setup(StockPolicy::Enforce);

        let change = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 2)
            .unwrap();
        fx.operator.commit(change).unwrap();

        let order = fx.orders.fetch(&fx.order_id).unwrap();
        assert_eq!(order.total(), Money::from_minor(1550));
        assert_eq!(
            fx.customers.fetch(&fx.customer_id).unwrap().balance(),
            Money::from_minor(1450)
        );
        assert_eq!(fx.products.fetch(&fx.product_id).unwrap().stock_count(), 18);

        // A second round trip builds on the persisted state.
        let change = fx
            .operator
            .remove_product(fx.order_id, fx.customer_id, fx.product_id, 2)
            .unwrap();
        fx.operator.commit(change).unwrap();

        let order = fx.orders.fetch(&fx.order_id).unwrap();
        assert!(order.is_empty());
        assert_eq!(order.total(), Money::ZERO);
        assert_eq!(
            fx.customers.fetch(&fx.customer_id).unwrap().balance(),
            Money::from_minor(3000)
        );
        assert_eq!(fx.products.fetch(&fx.product_id).unwrap().stock_count(), 20);
    }

    #[test]
    fn rejected_add_leaves_stores_untouched() {
        let fx = setup(StockPolicy::Enforce);

        let err = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 5)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientBalance { .. }));

        let err = fx
            .operator
            .remove_product(fx.order_id, fx.customer_id, fx.product_id, 1)
            .unwrap_err();
        assert_eq!(err, DomainError::ProductNotInOrder(fx.product_id));

        assert_eq!(fx.store_counts(), (1, 1, 1));
    }

    #[test]
    fn stock_policy_is_applied_by_the_operator() {
        let fx = setup(StockPolicy::Enforce);
        let scarce = Product::new(ProductId::new(), "Scarce", Money::from_minor(100), 1).unwrap();
        fx.products.store(&scarce, ExpectedVersion::Exact(0)).unwrap();

        let err = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, scarce.id_typed(), 3)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                available: 1,
                requested: 3
            }
        );

        let permissive = OrderOperator::new(
            fx.orders.clone(),
            fx.customers.clone(),
            fx.products.clone(),
        )
        .with_stock_policy(StockPolicy::Permissive);
        let change = permissive
            .add_product(fx.order_id, fx.customer_id, scarce.id_typed(), 3)
            .unwrap();
        assert_eq!(change.order().total(), Money::from_minor(300));
        assert_eq!(change.product().stock_count(), 1);
    }

    #[test]
    fn stale_change_is_a_conflict() {
        let fx = setup(StockPolicy::Enforce);

        let first = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 1)
            .unwrap();
        let second = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 1)
            .unwrap();

        fx.operator.commit(first).unwrap();
        let err = fx.operator.commit(second).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let order = fx.orders.fetch(&fx.order_id).unwrap();
        assert_eq!(order.unit_count(), 1);
        assert_eq!(order.version(), 1);
    }

    #[test]
    fn two_orders_for_one_customer_debit_the_same_balance() {
        let fx = setup(StockPolicy::Enforce);
        let second = fx.operator.open_order(fx.customer_id).unwrap().id_typed();

        let change = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 1)
            .unwrap();
        fx.operator.commit(change).unwrap();

        // The second order still embeds the opening balance; the stored one wins.
        let change = fx
            .operator
            .add_product(second, fx.customer_id, fx.product_id, 2)
            .unwrap();
        assert_eq!(change.order().customer().balance(), Money::from_minor(675));
        fx.operator.commit(change).unwrap();

        let err = fx
            .operator
            .add_product(second, fx.customer_id, fx.product_id, 1)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientBalance {
                balance: Money::from_minor(675),
                requested: Money::from_minor(775),
            }
        );

        let first_total = fx.orders.fetch(&fx.order_id).unwrap().total();
        let second_total = fx.orders.fetch(&second).unwrap().total();
        let balance = fx.customers.fetch(&fx.customer_id).unwrap().balance();
        assert_eq!(first_total, Money::from_minor(775));
        assert_eq!(second_total, Money::from_minor(1550));
        assert_eq!(
            first_total
                .checked_add(second_total)
                .and_then(|sum| sum.checked_add(balance))
                .unwrap(),
            Money::from_minor(3000)
        );
        assert_eq!(fx.products.fetch(&fx.product_id).unwrap().stock_count(), 17);
    }

    #[test]
    fn conflicting_commit_writes_nothing() {
        let fx = setup(StockPolicy::Enforce);
        let second = fx.operator.open_order(fx.customer_id).unwrap().id_typed();

        // Both changes read the customer and product at the same version.
        let first_change = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 1)
            .unwrap();
        let second_change = fx
            .operator
            .add_product(second, fx.customer_id, fx.product_id, 2)
            .unwrap();

        fx.operator.commit(first_change).unwrap();
        let before = fx.store_counts();

        // The second order itself is unchanged, so only the customer check can catch this.
        let err = fx.operator.commit(second_change).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(fx.store_counts(), before);

        let stored = fx.orders.fetch(&second).unwrap();
        assert!(stored.is_empty());
        assert_eq!(stored.version(), 0);
        assert_eq!(
            fx.customers.fetch(&fx.customer_id).unwrap().balance(),
            Money::from_minor(2225)
        );
        assert_eq!(fx.products.fetch(&fx.product_id).unwrap().stock_count(), 19);

        // Retrying against fresh state succeeds.
        let retry = fx
            .operator
            .add_product(second, fx.customer_id, fx.product_id, 2)
            .unwrap();
        fx.operator.commit(retry).unwrap();
        assert_eq!(
            fx.customers.fetch(&fx.customer_id).unwrap().balance(),
            Money::from_minor(675)
        );
    }

    #[test]
    fn open_order_stores_an_empty_order_for_the_customer() {
        let fx = setup(StockPolicy::Enforce);

        let order = fx.operator.open_order(fx.customer_id).unwrap();
        assert!(order.is_empty());
        assert!(order.belongs_to(fx.customer_id));
        assert_eq!(fx.orders.fetch(&order.id_typed()).unwrap(), order);

        let missing = CustomerId::new();
        let err = fx.operator.open_order(missing).unwrap_err();
        assert_eq!(err, DomainError::not_found("customer", missing));
    }

    #[test]
    fn operator_accepts_zero_quantity_as_validation_error() {
        let fx = setup(StockPolicy::Enforce);
        let err = fx
            .operator
            .add_product(fx.order_id, fx.customer_id, fx.product_id, 0)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
