//! Cart store integration tests: mutations, persistence and recovery.

mod common;

use std::sync::Arc;

use common::{ids, product, FailingStore, GatedStore, Op, RecordingStore};
use rust_decimal::Decimal;
use shopcart_sdk::{Cart, CartStore, KeyValueStore, MemoryStore};

// ---------------------------------------------------------------------------
// add / remove / clear
// ---------------------------------------------------------------------------

#[tokio::test]
async fn adding_same_product_twice_keeps_one_entry() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();

    cart.add(product(1, 1000)).await;
    assert_eq!(ids(&cart.cart()), vec![1]);

    cart.add(product(1, 1000)).await;
    assert_eq!(ids(&cart.cart()), vec![1]);
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn add_preserves_insertion_order() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();
    for id in [3, 1, 2] {
        cart.add(product(id, 100)).await;
    }
    assert_eq!(ids(&cart.cart()), vec![3, 1, 2]);
}

#[tokio::test]
async fn remove_drops_matching_entry() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();
    cart.add(product(1, 100)).await;
    cart.add(product(2, 200)).await;

    cart.remove(1);
    assert_eq!(ids(&cart.cart()), vec![2]);
    assert!(!cart.contains(1));
}

#[tokio::test]
async fn remove_missing_id_is_noop() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();
    cart.add(product(1, 100)).await;
    cart.add(product(2, 200)).await;

    cart.remove(99);
    assert_eq!(ids(&cart.cart()), vec![1, 2]);
}

#[tokio::test]
async fn total_sums_prices() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();
    assert_eq!(cart.total(), Decimal::ZERO);

    cart.add(product(1, 1000)).await;
    cart.add(product(2, 550)).await;
    assert_eq!(cart.total(), Decimal::new(155, 1));
}

#[tokio::test]
async fn clear_empties_cart_and_deletes_blob() {
    let store = RecordingStore::new();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();
    cart.add(product(1, 100)).await;
    cart.add(product(2, 200)).await;
    cart.flush().await;
    assert!(store.peek("cart").await.is_some());

    cart.clear().await;

    assert!(cart.is_empty());
    assert_eq!(store.peek("cart").await, None);
    assert_eq!(store.ops().last(), Some(&Op::Delete("cart".to_string())));
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn every_mutation_writes_full_cart() {
    let store = RecordingStore::new();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();

    cart.add(product(1, 100)).await;
    cart.add(product(1, 100)).await;
    cart.add(product(2, 200)).await;
    cart.remove(1);
    cart.remove(42);
    cart.flush().await;

    assert_eq!(store.writes(), 5);
    let blob = store.peek("cart").await.unwrap();
    let saved: Cart = serde_json::from_str(&blob).unwrap();
    assert_eq!(saved.ids(), vec![2]);
}

#[tokio::test]
async fn writes_land_in_mutation_order() {
    let store = RecordingStore::new();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();

    for id in 1..=20 {
        cart.add(product(id, 100)).await;
    }
    cart.flush().await;

    let sizes: Vec<usize> = store
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            Op::Set(_, blob) => Some(serde_json::from_str::<Cart>(&blob).unwrap().len()),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn saved_prices_are_json_numbers() {
    let store = RecordingStore::new();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();
    cart.add(product(1, 24999)).await;
    cart.flush().await;

    let blob = store.peek("cart").await.unwrap();
    let v: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert!(v[0]["price"].is_number());
    assert_eq!(v[0]["price"].as_f64(), Some(249.99));
    assert_eq!(v[0]["inStock"], serde_json::Value::Bool(true));
}

#[tokio::test]
async fn stored_entries_breaking_model_rules_are_dropped() {
    let store = RecordingStore::new();
    store
        .preload(
            "cart",
            r#"[{"id":1,"name":"Refund","price":-5,"image":"","description":"",
                "inStock":true,"category":"Audio"},
               {"id":2,"name":"Hyped","price":10,"image":"","description":"",
                "reviews":[{"user":"Fan","rating":9,"comment":"Eleven"}],
                "inStock":true,"category":"Audio"},
               {"id":3,"name":"Fine","price":"12.50","image":"","description":"",
                "inStock":true,"category":"Audio"}]"#,
        )
        .await;

    let cart = CartStore::initialize(store, "cart").await.unwrap();
    assert_eq!(ids(&cart.cart()), vec![3]);
    assert_eq!(cart.total(), Decimal::new(1250, 2));
}

#[tokio::test]
async fn restart_restores_same_cart() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let before = {
        let cart = CartStore::initialize(Arc::clone(&store), "cart").await.unwrap();
        cart.add(product(5, 500)).await;
        cart.add(product(2, 200)).await;
        cart.add(product(9, 900)).await;
        cart.flush().await;
        cart.cart()
    };

    let cart = CartStore::initialize(store, "cart").await.unwrap();
    assert_eq!(cart.cart(), before);
    assert_eq!(ids(&cart.cart()), vec![5, 2, 9]);
}

#[tokio::test]
async fn initialize_reads_persisted_blob_written_by_app() {
    let store = RecordingStore::new();
    store
        .preload(
            "cart",
            r#"[{"id":1,"name":"Premium Wireless Headphones","price":249.99,
                "image":"https://example.com/1.jpg","description":"Headphones",
                "specs":{"batteryLife":"30 hours"},
                "reviews":[{"user":"TechGuru","rating":4,"comment":"Great"}],
                "inStock":true,"category":"Audio"}]"#,
        )
        .await;

    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();
    let items = cart.cart();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].price.round_dp(2), Decimal::new(24999, 2));
    assert_eq!(items[0].reviews[0].rating, 4);
    assert_eq!(store.ops(), vec![Op::Get("cart".to_string())]);
}

#[tokio::test]
async fn custom_key_is_used() {
    let store = RecordingStore::new();
    let cart = CartStore::initialize(store.clone(), "guest-cart").await.unwrap();
    assert_eq!(cart.key(), "guest-cart");
    cart.add(product(1, 100)).await;
    cart.flush().await;
    assert!(store.peek("guest-cart").await.is_some());
    assert!(store.peek("cart").await.is_none());
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreadable_blob_starts_empty() {
    let store = RecordingStore::new();
    store.preload("cart", "{not json").await;

    let cart = CartStore::initialize(store, "cart").await.unwrap();
    assert!(cart.is_empty());
    assert!(!cart.is_loading());
}

#[tokio::test]
async fn failing_storage_never_surfaces() {
    let cart = CartStore::initialize(Arc::new(FailingStore), "cart")
        .await
        .unwrap();
    assert!(cart.is_empty());

    cart.add(product(1, 100)).await;
    cart.add(product(2, 200)).await;
    cart.remove(2);
    cart.flush().await;
    assert_eq!(ids(&cart.cart()), vec![1]);

    cart.clear().await;
    assert!(cart.is_empty());
}

// ---------------------------------------------------------------------------
// Loading state and change notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn is_loading_until_first_load() {
    let cart = CartStore::new(Arc::new(MemoryStore::new()), "cart").unwrap();
    assert!(cart.is_loading());
    cart.load().await;
    assert!(!cart.is_loading());
}

#[tokio::test]
async fn is_loading_while_clear_waits_on_storage() {
    let store = GatedStore::new();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();
    cart.add(product(1, 100)).await;
    assert!(!cart.is_loading());

    store.hold_deletes();
    let clearing = tokio::spawn({
        let cart = cart.clone();
        async move { cart.clear().await }
    });
    store.entered().await;
    assert!(cart.is_loading());
    assert!(cart.is_empty());

    store.release();
    clearing.await.unwrap();
    assert!(!cart.is_loading());
    assert_eq!(store.get("cart").await.unwrap(), None);
}

#[tokio::test]
async fn is_loading_while_reload_waits_on_storage() {
    let store = GatedStore::new();
    store
        .set("cart", &serde_json::to_string(&vec![product(4, 400)]).unwrap())
        .await
        .unwrap();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();
    assert!(!cart.is_loading());

    store.hold_gets();
    let loading = tokio::spawn({
        let cart = cart.clone();
        async move { cart.load().await }
    });
    store.entered().await;
    assert!(cart.is_loading());

    store.release();
    loading.await.unwrap();
    assert!(!cart.is_loading());
    assert_eq!(ids(&cart.cart()), vec![4]);
}

#[tokio::test]
async fn products_added_before_load_are_merged() {
    let store = RecordingStore::new();
    store
        .preload("cart", &serde_json::to_string(&vec![product(1, 100), product(2, 200)]).unwrap())
        .await;

    let cart = CartStore::new(store.clone(), "cart").unwrap();
    cart.add(product(2, 200)).await;
    cart.add(product(3, 300)).await;
    cart.load().await;
    cart.flush().await;

    assert_eq!(ids(&cart.cart()), vec![1, 2, 3]);
    assert_eq!(store.writes(), 1);
    let saved: Cart = serde_json::from_str(&store.peek("cart").await.unwrap()).unwrap();
    assert_eq!(saved.ids(), vec![1, 2, 3]);
}

#[tokio::test]
async fn changes_after_close_are_not_persisted() {
    let store = RecordingStore::new();
    let cart = CartStore::initialize(store.clone(), "cart").await.unwrap();
    cart.add(product(1, 100)).await;
    cart.close().await;
    assert_eq!(store.writes(), 1);

    cart.add(product(2, 200)).await;
    cart.remove(1);
    cart.flush().await;
    assert_eq!(ids(&cart.cart()), vec![2]);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn clones_share_contents() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();
    let view = cart.clone();
    cart.add(product(1, 100)).await;
    assert_eq!(ids(&view.cart()), vec![1]);
}

#[tokio::test]
async fn subscribers_see_changes() {
    let cart = CartStore::initialize(Arc::new(MemoryStore::new()), "cart")
        .await
        .unwrap();
    let mut rx = cart.subscribe();

    cart.add(product(7, 700)).await;
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().ids(), vec![7]);

    cart.clear().await;
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_empty());
}

#[test]
fn new_outside_runtime_is_an_error() {
    let result = CartStore::new(Arc::new(MemoryStore::new()), "cart");
    assert!(result.is_err());
}
