//! Delivery context and index provisioning.

mod harness;

use std::time::{Duration, Instant};

use harness::Rig;
use prixfixe_common::fakes;
use prixfixe_common::*;
use prixfixe_workers::{
    ContextError, MemorySearchIndexProvider, MessageContext, SearchIndexes, Topic, Verb,
    WorkerError,
};
use tokio_util::sync::CancellationToken;

fn recipe_bytes() -> Vec<u8> {
    fakes::to_bytes(&fakes::pre_write(PreWrite::Recipe(fakes::recipe_input())))
}

#[tokio::test]
async fn cancelled_context_fails_at_the_first_step() {
    let rig = Rig::new();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = MessageContext::new().with_cancellation(token);

    let err = rig
        .workers
        .handle(Topic::PreWrites, &ctx, &recipe_bytes())
        .await
        .unwrap_err();

    match &err {
        WorkerError::Persistence { verb, source, .. } => {
            assert_eq!(*verb, Verb::Create);
            assert_eq!(
                source.downcast_ref::<ContextError>(),
                Some(&ContextError::Cancelled)
            );
        }
        other => panic!("expected a persistence error, got {other:?}"),
    }
    assert!(rig.dm.calls().is_empty());
    assert_eq!(rig.publisher.attempts(), 0);
}

#[tokio::test]
async fn expired_deadline_fails_at_the_first_step() {
    let rig = Rig::new();
    let ctx = MessageContext::new().with_deadline(Instant::now() - Duration::from_millis(1));

    let err = rig
        .workers
        .handle(Topic::PreWrites, &ctx, &recipe_bytes())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "persistence");
    assert_eq!(rig.publisher.attempts(), 0);
}

#[tokio::test]
async fn generous_deadline_lets_the_pipeline_finish() {
    let rig = Rig::new();
    let ctx = MessageContext::new().with_timeout(Duration::from_secs(30));

    rig.workers
        .handle(Topic::PreWrites, &ctx, &recipe_bytes())
        .await
        .unwrap();

    assert_eq!(
        rig.publisher.message_types(),
        vec![MessageType::RecipeCreated]
    );
}

#[tokio::test]
async fn provisioning_builds_every_index() {
    let provider = MemorySearchIndexProvider::new();

    let indexes = SearchIndexes::provision(&provider).await.unwrap();

    for data_type in DataType::ALL {
        assert_eq!(
            indexes.for_data_type(data_type).is_some(),
            data_type.is_searchable(),
            "{data_type}"
        );
    }
    assert!(provider.index("valid_ingredients").is_some());
}

#[tokio::test]
async fn provisioning_failure_names_the_index() {
    let provider = MemorySearchIndexProvider::new().failing_on("valid_ingredients");

    let err = SearchIndexes::provision(&provider).await.err().unwrap();

    assert!(
        err.to_string()
            .contains("setting up valid ingredients search index manager"),
        "{err:#}"
    );
}
