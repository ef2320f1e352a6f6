//! End-to-end cart flows through the synchronizer, local and remote.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use shopfront_client::{CartGateway, CartOperationError, InMemoryCartService, InjectedFailure};
use shopfront_core::{Cart, CartLineItem, Category, CustomerId, Price, ProductId, Variant};
use shopfront_events::{CartMutation, InMemoryEventBus, Subscription};
use shopfront_store::LocalStore;
use shopfront_sync::{AddItem, CartMode, CartSynchronizer, RemoveItem, SyncError, UpdateQuantity};

fn owner() -> CustomerId {
    CustomerId::new(7)
}

fn book(quantity: u32) -> CartLineItem {
    CartLineItem {
        product_id: ProductId::new(11),
        category: Category::Books,
        name: "Dune".to_string(),
        unit_price: Price::new("19.99".parse().unwrap()).unwrap(),
        image_ref: None,
        quantity,
        variant: Variant::default(),
    }
}

// Same product id as `book` on purpose; only the category differs.
fn phone(quantity: u32) -> CartLineItem {
    CartLineItem {
        product_id: ProductId::new(11),
        category: Category::Phones,
        name: "Fairphone 5".to_string(),
        unit_price: Price::new("599.00".parse().unwrap()).unwrap(),
        image_ref: Some("https://cdn.example/fairphone.jpg".to_string()),
        quantity,
        variant: Variant {
            size: None,
            color: Some("sky blue".to_string()),
        },
    }
}

fn open_store(dir: &tempfile::TempDir) -> LocalStore {
    LocalStore::open(dir.path().join("shopfront")).unwrap()
}

async fn local_sync(dir: &tempfile::TempDir) -> CartSynchronizer {
    let gateway: Arc<dyn CartGateway> = Arc::new(InMemoryCartService::new());
    CartSynchronizer::start(
        CartMode::Local,
        owner(),
        open_store(dir),
        gateway,
        Arc::new(InMemoryEventBus::new()),
    )
    .await
}

async fn remote_sync(dir: &tempfile::TempDir, service: &Arc<InMemoryCartService>) -> CartSynchronizer {
    let gateway: Arc<dyn CartGateway> = Arc::clone(service) as Arc<dyn CartGateway>;
    CartSynchronizer::start(
        CartMode::Remote,
        owner(),
        open_store(dir),
        gateway,
        Arc::new(InMemoryEventBus::new()),
    )
    .await
}

fn count_notifications(sync: &CartSynchronizer) -> (Arc<AtomicUsize>, Subscription) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let guard = sync.subscribe(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    (count, guard)
}

fn record_mutations(sync: &CartSynchronizer) -> (Arc<Mutex<Vec<CartMutation>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let guard = sync.subscribe(Box::new(move |change| {
        sink.lock().unwrap().push(change.mutation());
    }));
    (seen, guard)
}

fn encoded(cart: &Cart) -> Vec<u8> {
    serde_json::to_vec(cart).unwrap()
}

#[tokio::test]
async fn adding_the_same_line_twice_merges_quantities() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    let cart = sync.add_item(AddItem::new(book(2))).await.unwrap();

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.subtotal(), "59.97".parse().unwrap());

    // The snapshot on disk is the committed cart, not a draft.
    assert_eq!(open_store(&dir).load_cart(owner()), cart);
}

#[tokio::test]
async fn the_same_product_id_in_another_category_is_a_separate_line() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    let cart = sync.add_item(AddItem::new(phone(1))).await.unwrap();

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.subtotal(), "618.99".parse().unwrap());
}

#[tokio::test]
async fn quantity_updates_at_or_below_zero_remove_the_line() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;
    let (mutations, _guard) = record_mutations(&sync);
    let key = book(1).key();

    sync.add_item(AddItem::new(book(2))).await.unwrap();
    let cart = sync
        .update_quantity(UpdateQuantity::new(key, 0))
        .await
        .unwrap();
    assert!(cart.is_empty());

    sync.add_item(AddItem::new(book(2))).await.unwrap();
    let cart = sync
        .update_quantity(UpdateQuantity::new(key, -3))
        .await
        .unwrap();
    assert!(cart.is_empty());

    assert_eq!(
        mutations.lock().unwrap().as_slice(),
        &[
            CartMutation::ItemAdded { line: key },
            CartMutation::ItemRemoved { line: key },
            CartMutation::ItemAdded { line: key },
            CartMutation::ItemRemoved { line: key },
        ]
    );
}

#[tokio::test]
async fn updating_an_unknown_line_is_rejected_without_a_notification() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;
    let (notifications, _guard) = count_notifications(&sync);

    let err = sync
        .update_quantity(UpdateQuantity::new(book(1).key(), 2))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Domain(_)));
    assert!(sync.cart().is_empty());
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_intents_leave_the_published_cart_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;
    let (notifications, _guard) = count_notifications(&sync);

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    let before = encoded(&sync.cart());

    let err = sync.add_item(AddItem::new(book(0))).await.unwrap_err();
    assert!(matches!(err, SyncError::Domain(_)));

    assert_eq!(encoded(&sync.cart()), before);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn every_committed_mutation_notifies_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;
    let (notifications, _guard) = count_notifications(&sync);
    let key = book(1).key();

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    sync.add_item(AddItem::new(book(1))).await.unwrap();
    sync.update_quantity(UpdateQuantity::new(key, 5)).await.unwrap();
    sync.remove_item(RemoveItem::new(key)).await.unwrap();
    // Removing the line again is a success and still counts as a commit.
    sync.remove_item(RemoveItem::new(key)).await.unwrap();
    sync.clear().await;
    sync.refresh().await;

    assert_eq!(notifications.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn notifications_identify_the_mutated_line_but_carry_no_cart() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _guard = sync.subscribe(Box::new(move |change| {
        sink.lock().unwrap().push((change.owner(), change.mutation()));
    }));

    sync.add_item(AddItem::new(phone(2))).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[(
            owner(),
            CartMutation::ItemAdded {
                line: phone(1).key()
            }
        )]
    );
}

#[tokio::test]
async fn remote_commits_mirror_the_service_cart() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    service.seed_product(book(1));
    let sync = remote_sync(&dir, &service).await;

    let cart = sync.add_item(AddItem::new(book(2))).await.unwrap();

    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart, service.stored_cart(owner()));
    // The display cache follows the committed state.
    assert_eq!(open_store(&dir).load_cart(owner()), cart);
}

#[tokio::test]
async fn remote_rejections_preserve_the_published_cart() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    service.seed_product(book(1));
    let sync = remote_sync(&dir, &service).await;
    let (notifications, _guard) = count_notifications(&sync);

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    let before = encoded(&sync.cart());

    service.fail_next(InjectedFailure::Rejected {
        status: 500,
        reason: "internal error".to_string(),
    });
    let err = sync.add_item(AddItem::new(book(1))).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Remote(CartOperationError::ServerRejected { status: 500, .. })
    ));

    assert_eq!(encoded(&sync.cart()), before);
    assert_eq!(encoded(&open_store(&dir).load_cart(owner())), before);
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn remote_network_failures_surface_without_committing() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    service.seed_product(book(1));
    let sync = remote_sync(&dir, &service).await;

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    let before = sync.cart();

    service.fail_next(InjectedFailure::Network);
    let err = sync
        .update_quantity(UpdateQuantity::new(book(1).key(), 4))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Remote(CartOperationError::NetworkFailure(_))
    ));
    assert_eq!(sync.cart(), before);
    assert_eq!(service.stored_cart(owner()).item_count(), 1);
}

#[tokio::test]
async fn remote_removal_commits_from_the_service_ack() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    service.seed_product(book(1));
    service.seed_product(phone(1));
    let sync = remote_sync(&dir, &service).await;

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    sync.add_item(AddItem::new(phone(1))).await.unwrap();

    let cart = sync.remove_item(RemoveItem::new(book(1).key())).await.unwrap();

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items()[0].key(), phone(1).key());
    assert_eq!(service.stored_cart(owner()), cart);
    assert_eq!(open_store(&dir).load_cart(owner()), cart);
}

#[tokio::test]
async fn start_primes_the_cart_from_the_remote_service() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    let mut seeded = Cart::empty(owner());
    seeded.add(book(2)).unwrap();
    service.seed_cart(seeded.clone());

    let sync = remote_sync(&dir, &service).await;

    assert_eq!(sync.cart(), seeded);
    assert_eq!(open_store(&dir).load_cart(owner()), seeded);
}

#[tokio::test]
async fn a_failed_first_read_degrades_to_an_empty_cart_until_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    let mut seeded = Cart::empty(owner());
    seeded.add(book(2)).unwrap();
    service.seed_cart(seeded.clone());

    service.fail_next(InjectedFailure::Network);
    let sync = remote_sync(&dir, &service).await;
    assert!(sync.cart().is_empty());

    let (mutations, _guard) = record_mutations(&sync);
    let cart = sync.refresh().await;

    assert_eq!(cart, seeded);
    assert_eq!(sync.cart(), seeded);
    assert_eq!(mutations.lock().unwrap().as_slice(), &[CartMutation::Reloaded]);
}

#[tokio::test]
async fn refresh_discards_drift_in_favor_of_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    service.seed_product(book(1));
    let sync = remote_sync(&dir, &service).await;

    sync.add_item(AddItem::new(book(1))).await.unwrap();

    // Another session rewrites the remote cart behind this one's back.
    let mut rewritten = Cart::empty(owner());
    rewritten.add(book(5)).unwrap();
    service.seed_cart(rewritten.clone());

    let cart = sync.refresh().await;
    assert_eq!(cart, rewritten);
}

#[tokio::test]
async fn clear_empties_the_cart_and_its_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let sync = local_sync(&dir).await;
    let (mutations, _guard) = record_mutations(&sync);

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    sync.add_item(AddItem::new(phone(1))).await.unwrap();
    let cart = sync.clear().await;

    assert!(cart.is_empty());
    assert!(open_store(&dir).load_cart(owner()).is_empty());
    assert_eq!(
        mutations.lock().unwrap().last(),
        Some(&CartMutation::Cleared)
    );
}

#[tokio::test]
async fn clear_empties_the_cart_even_when_remote_removals_fail() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(InMemoryCartService::new());
    service.seed_product(book(1));
    service.seed_product(phone(1));
    let sync = remote_sync(&dir, &service).await;

    sync.add_item(AddItem::new(book(1))).await.unwrap();
    sync.add_item(AddItem::new(phone(1))).await.unwrap();
    let (mutations, _guard) = record_mutations(&sync);

    // The first removal fails, the second goes through; the cleared view
    // must not depend on either outcome.
    service.fail_next(InjectedFailure::Network);
    let cart = sync.clear().await;

    assert!(cart.is_empty());
    assert!(sync.cart().is_empty());
    assert!(open_store(&dir).load_cart(owner()).is_empty());
    assert_eq!(mutations.lock().unwrap().as_slice(), &[CartMutation::Cleared]);

    // The line whose removal failed is still on the service side; the next
    // refresh re-surfaces it.
    assert_eq!(service.stored_cart(owner()).len(), 1);
    let refreshed = sync.refresh().await;
    assert_eq!(refreshed.items()[0].key(), book(1).key());
}

#[tokio::test]
async fn local_carts_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let sync = local_sync(&dir).await;
        sync.add_item(AddItem::new(book(3))).await.unwrap();
    }

    let sync = local_sync(&dir).await;
    let cart = sync.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.items()[0].name, "Dune");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_on_one_line_serialize() {
    let dir = tempfile::tempdir().unwrap();
    let sync = Arc::new(local_sync(&dir).await);
    let (notifications, _guard) = count_notifications(&sync);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let sync = Arc::clone(&sync);
        tasks.push(tokio::spawn(async move {
            sync.add_item(AddItem::new(book(1))).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let cart = sync.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.item_count(), 8);
    assert_eq!(notifications.load(Ordering::SeqCst), 8);
    assert_eq!(open_store(&dir).load_cart(owner()), cart);
}
