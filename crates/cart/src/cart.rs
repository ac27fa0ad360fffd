use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rocketshoes_core::{Aggregate, DomainError, Entity, Event, ProductId};

use crate::product::{Product, Stock};

/// Aggregate root: the shopping cart.
///
/// An ordered list of products, unique by id, each held with `amount >= 1`.
/// Serializes as a bare JSON array of [`Product`]; deserialization rejects
/// payloads that break either invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Product>", into = "Vec<Product>")]
pub struct Cart {
    products: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }
}

impl TryFrom<Vec<Product>> for Cart {
    type Error = DomainError;

    fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
        for (idx, product) in products.iter().enumerate() {
            if product.amount == 0 {
                return Err(DomainError::invariant(format!(
                    "product {} is held with amount 0",
                    product.id
                )));
            }
            if products[..idx].iter().any(|p| p.same_identity_as(product)) {
                return Err(DomainError::invariant(format!(
                    "product {} appears more than once",
                    product.id
                )));
            }
        }
        Ok(Self { products })
    }
}

impl From<Cart> for Vec<Product> {
    fn from(cart: Cart) -> Self {
        cart.products
    }
}

/// Command: AddProduct.
///
/// Carries the freshly fetched catalog entry and stock level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProduct {
    pub product: Product,
    pub stock: Stock,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveProduct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProductAmount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: u32,
    pub stock: Stock,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    AddProduct(AddProduct),
    RemoveProduct(RemoveProduct),
    UpdateProductAmount(UpdateProductAmount),
    ClearCart(ClearCart),
}

/// Event: ProductAdded (new cart line, amount 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAdded {
    pub product: Product,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductAmountChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAmountChanged {
    pub product_id: ProductId,
    pub amount: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRemoved {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    ProductAdded(ProductAdded),
    ProductAmountChanged(ProductAmountChanged),
    ProductRemoved(ProductRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ProductAdded(_) => "cart.product.added",
            CartEvent::ProductAmountChanged(_) => "cart.product.amount_changed",
            CartEvent::ProductRemoved(_) => "cart.product.removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ProductAdded(e) => e.occurred_at,
            CartEvent::ProductAmountChanged(e) => e.occurred_at,
            CartEvent::ProductRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ProductAdded(e) => {
                self.products.push(e.product.clone());
            }
            CartEvent::ProductAmountChanged(e) => {
                if let Some(line) = self.products.iter_mut().find(|p| p.id == e.product_id) {
                    line.amount = e.amount;
                }
            }
            CartEvent::ProductRemoved(e) => {
                self.products.retain(|p| p.id != e.product_id);
            }
            CartEvent::CartCleared(_) => {
                self.products.clear();
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddProduct(cmd) => self.handle_add(cmd),
            CartCommand::RemoveProduct(cmd) => self.handle_remove(cmd),
            CartCommand::UpdateProductAmount(cmd) => self.handle_update_amount(cmd),
            CartCommand::ClearCart(cmd) => self.handle_clear(cmd),
        }
    }
}

impl Cart {
    fn ensure_stock_matches(product_id: ProductId, stock: &Stock) -> Result<(), DomainError> {
        if stock.id != product_id {
            return Err(DomainError::validation(format!(
                "stock entry {} does not belong to product {}",
                stock.id, product_id
            )));
        }
        Ok(())
    }

    fn handle_add(&self, cmd: &AddProduct) -> Result<Vec<CartEvent>, DomainError> {
        let product_id = cmd.product.id;
        Self::ensure_stock_matches(product_id, &cmd.stock)?;

        match self.get(product_id) {
            Some(line) => {
                let requested = line.amount.saturating_add(1);
                if !cmd.stock.covers(requested) {
                    return Err(DomainError::out_of_stock(
                        product_id,
                        requested,
                        cmd.stock.amount,
                    ));
                }
                Ok(vec![CartEvent::ProductAmountChanged(ProductAmountChanged {
                    product_id,
                    amount: requested,
                    occurred_at: cmd.occurred_at,
                })])
            }
            None => {
                if cmd.stock.is_empty() {
                    return Err(DomainError::out_of_stock(product_id, 1, 0));
                }
                Ok(vec![CartEvent::ProductAdded(ProductAdded {
                    product: cmd.product.with_amount(1),
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }

    fn handle_remove(&self, cmd: &RemoveProduct) -> Result<Vec<CartEvent>, DomainError> {
        if !self.contains(cmd.product_id) {
            return Err(DomainError::not_in_cart(cmd.product_id));
        }
        Ok(vec![CartEvent::ProductRemoved(ProductRemoved {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_amount(
        &self,
        cmd: &UpdateProductAmount,
    ) -> Result<Vec<CartEvent>, DomainError> {
        // Zero means "nothing to do", not "remove".
        if cmd.amount == 0 {
            return Ok(Vec::new());
        }
        if !self.contains(cmd.product_id) {
            return Err(DomainError::not_in_cart(cmd.product_id));
        }
        Self::ensure_stock_matches(cmd.product_id, &cmd.stock)?;
        if !cmd.stock.covers(cmd.amount) {
            return Err(DomainError::out_of_stock(
                cmd.product_id,
                cmd.amount,
                cmd.stock.amount,
            ));
        }
        Ok(vec![CartEvent::ProductAmountChanged(ProductAmountChanged {
            product_id: cmd.product_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Result<Vec<CartEvent>, DomainError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![CartEvent::CartCleared(CartCleared {
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn test_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn test_product(id: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Sneaker {id}"),
            price: Decimal::new(17990, 2),
            image: format!("https://cdn.example/{id}.jpg"),
            amount: 0,
        }
    }

    fn add(product: Product, stock: u32) -> CartCommand {
        let stock = Stock::new(product.id, stock);
        CartCommand::AddProduct(AddProduct {
            product,
            stock,
            occurred_at: test_time(),
        })
    }

    fn update(id: u64, amount: u32, stock: u32) -> CartCommand {
        CartCommand::UpdateProductAmount(UpdateProductAmount {
            product_id: ProductId::new(id),
            amount,
            stock: Stock::new(ProductId::new(id), stock),
            occurred_at: test_time(),
        })
    }

    fn remove(id: u64) -> CartCommand {
        CartCommand::RemoveProduct(RemoveProduct {
            product_id: ProductId::new(id),
            occurred_at: test_time(),
        })
    }

    #[test]
    fn adding_new_product_appends_line_with_amount_one() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();
        let events = cart.execute(&add(test_product(2), 5)).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.products()[1].id, ProductId::new(2));
        assert_eq!(cart.products()[1].amount, 1);
        assert_eq!(events[0].event_type(), "cart.product.added");
    }

    #[test]
    fn adding_new_product_without_stock_is_rejected() {
        let cart = Cart::new();
        let err = cart.handle(&add(test_product(1), 0)).unwrap_err();
        assert!(err.is_out_of_stock());
        assert!(cart.is_empty());
    }

    #[test]
    fn adding_existing_product_increments_while_below_stock() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 2)).unwrap();
        cart.execute(&add(test_product(1), 2)).unwrap();
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 2);
        assert_eq!(cart.len(), 1);

        let err = cart.execute(&add(test_product(1), 2)).unwrap_err();
        assert_eq!(err, DomainError::out_of_stock(ProductId::new(1), 3, 2));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 2);
    }

    #[test]
    fn adding_keeps_existing_line_details() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();

        let mut repriced = test_product(1);
        repriced.price = Decimal::new(9990, 2);
        cart.execute(&add(repriced, 5)).unwrap();

        assert_eq!(cart.products()[0].price, Decimal::new(17990, 2));
        assert_eq!(cart.products()[0].amount, 2);
    }

    #[test]
    fn mismatched_stock_entry_is_rejected() {
        let cart = Cart::new();
        let cmd = CartCommand::AddProduct(AddProduct {
            product: test_product(1),
            stock: Stock::new(ProductId::new(9), 5),
            occurred_at: test_time(),
        });
        assert!(matches!(cart.handle(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn removing_missing_product_signals_error() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();
        let before = cart.clone();

        let err = cart.execute(&remove(2)).unwrap_err();
        assert_eq!(err, DomainError::not_in_cart(ProductId::new(2)));
        assert_eq!(cart, before);
    }

    #[test]
    fn removing_product_filters_it_out_preserving_order() {
        let mut cart = Cart::new();
        for id in 1..=3 {
            cart.execute(&add(test_product(id), 5)).unwrap();
        }
        cart.execute(&remove(2)).unwrap();

        let ids: Vec<u64> = cart.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn updating_amount_to_zero_is_a_noop() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();
        let events = cart.execute(&update(1, 0, 0)).unwrap();
        assert!(events.is_empty());
        assert_eq!(cart.products()[0].amount, 1);
    }

    #[test]
    fn updating_amount_sets_exact_value_within_stock() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();
        cart.execute(&update(1, 5, 5)).unwrap();
        assert_eq!(cart.products()[0].amount, 5);

        cart.execute(&update(1, 2, 5)).unwrap();
        assert_eq!(cart.products()[0].amount, 2);
    }

    #[test]
    fn updating_amount_beyond_stock_is_rejected() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();
        let err = cart.execute(&update(1, 6, 5)).unwrap_err();
        assert!(err.is_out_of_stock());
        assert_eq!(cart.products()[0].amount, 1);
    }

    #[test]
    fn updating_amount_of_missing_product_is_rejected() {
        let cart = Cart::new();
        let err = cart.handle(&update(4, 1, 10)).unwrap_err();
        assert_eq!(err, DomainError::not_in_cart(ProductId::new(4)));
    }

    #[test]
    fn clearing_empties_the_cart() {
        let mut cart = Cart::new();
        let clear = CartCommand::ClearCart(ClearCart {
            occurred_at: test_time(),
        });
        assert!(cart.handle(&clear).unwrap().is_empty());

        cart.execute(&add(test_product(1), 5)).unwrap();
        let events = cart.execute(&clear).unwrap();
        assert_eq!(events.len(), 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn serializes_as_plain_product_array() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["amount"], 1);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn deserializing_rejects_duplicates_and_empty_lines() {
        let line = r#"{"id":1,"name":"A","price":10.0,"image":"a.jpg","amount":1}"#;
        let dup = format!("[{line},{line}]");
        assert!(serde_json::from_str::<Cart>(&dup).is_err());

        let zero = r#"[{"id":1,"name":"A","price":10.0,"image":"a.jpg","amount":0}]"#;
        assert!(serde_json::from_str::<Cart>(zero).is_err());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut cart = Cart::new();
        cart.execute(&add(test_product(1), 5)).unwrap();
        let before = cart.clone();

        let first = cart.handle(&add(test_product(1), 5));
        let second = cart.handle(&add(test_product(1), 5));

        assert_eq!(cart, before);
        assert_eq!(first, second);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add { id: u64, stock: u32 },
            Update { id: u64, amount: u32, stock: u32 },
            Remove { id: u64 },
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (1u64..6, 0u32..6).prop_map(|(id, stock)| Op::Add { id, stock }),
                (1u64..6, 0u32..8, 0u32..6)
                    .prop_map(|(id, amount, stock)| Op::Update { id, amount, stock }),
                (1u64..6).prop_map(|id| Op::Remove { id }),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: whatever sequence of operations runs, ids stay unique,
            /// every line holds at least one unit, and accepted mutations never
            /// exceed the stock they were checked against.
            #[test]
            fn cart_invariants_hold(ops in prop::collection::vec(op(), 0..40)) {
                let mut cart = Cart::new();

                for op in ops {
                    let (cmd, stock) = match op {
                        Op::Add { id, stock } => (add(test_product(id), stock), stock),
                        Op::Update { id, amount, stock } => (update(id, amount, stock), stock),
                        Op::Remove { id } => (remove(id), u32::MAX),
                    };
                    let before = cart.clone();
                    match cart.execute(&cmd) {
                        Ok(events) => {
                            for event in &events {
                                if let CartEvent::ProductAmountChanged(e) = event {
                                    prop_assert!(e.amount <= stock);
                                }
                            }
                        }
                        Err(_) => prop_assert_eq!(&cart, &before),
                    }

                    let rebuilt = Cart::try_from(cart.products().to_vec());
                    prop_assert!(rebuilt.is_ok());
                }
            }

            /// Property: adding a product not yet in the cart with stock > 0
            /// grows the cart by exactly one line holding one unit.
            #[test]
            fn adding_new_product_grows_by_one(existing in 0u64..5, stock in 1u32..100) {
                let mut cart = Cart::new();
                for id in 1..=existing {
                    cart.execute(&add(test_product(id), 10)).unwrap();
                }
                let len = cart.len();

                cart.execute(&add(test_product(100), stock)).unwrap();

                prop_assert_eq!(cart.len(), len + 1);
                prop_assert_eq!(cart.get(ProductId::new(100)).map(|p| p.amount), Some(1));
            }
        }
    }
}
