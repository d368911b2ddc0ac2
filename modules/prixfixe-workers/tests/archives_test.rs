//! Pre-archives worker.

mod harness;

use harness::{existing_for_archive, Rig};
use prixfixe_common::fakes::{self, HOUSEHOLD_ID, USER_ID};
use prixfixe_common::*;
use prixfixe_workers::memory::IndexCall;
use prixfixe_workers::{
    ArchivesWorker, Dispatch, IndexOp, MemoryDataManager, MemoryPublisher, MemorySearchIndex,
    Topic, WorkerError,
};

fn archive_ingredient(id: &str) -> PreArchiveMessage {
    fakes::pre_archive(ArchiveTarget::ValidIngredient {
        valid_ingredient_id: id.into(),
    })
}

#[tokio::test]
async fn archive_deletes_from_index_then_publishes() {
    let ingredient = ValidIngredient {
        id: "vi1".into(),
        ..Default::default()
    };
    let rig = Rig::with_dm(MemoryDataManager::new().seed(ingredient));

    rig.deliver(Topic::PreArchives, &archive_ingredient("vi1"))
        .await
        .unwrap();

    assert!(rig.dm.is_archived(DataType::ValidIngredient, "vi1"));
    assert_eq!(
        rig.valid_ingredients.calls(),
        vec![IndexCall::Delete("vi1".into())]
    );
    let published = rig.publisher.messages();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].message_type, MessageType::ValidIngredientArchived);
    assert_eq!(published[0].data_type, DataType::ValidIngredient);
    assert!(published[0].entity.is_none());
}

#[tokio::test]
async fn index_delete_failure_blocks_publish() {
    let ingredient = ValidIngredient {
        id: "vi1".into(),
        ..Default::default()
    };
    let rig = Rig::build(
        MemoryDataManager::new().seed(ingredient),
        MemoryPublisher::new(),
        |name| MemorySearchIndex::new(name).failing_delete(),
    );

    let err = rig
        .deliver(Topic::PreArchives, &archive_ingredient("vi1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkerError::Index {
            op: IndexOp::Delete,
            data_type: DataType::ValidIngredient,
            ..
        }
    ));
    assert!(rig.dm.is_archived(DataType::ValidIngredient, "vi1"));
    assert_eq!(rig.publisher.attempts(), 0);
}

#[tokio::test]
async fn archive_of_unknown_entity_is_a_persistence_error() {
    let rig = Rig::new();

    let err = rig
        .deliver(Topic::PreArchives, &archive_ingredient("missing"))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("archiving valid ingredient"), "{err}");
    assert_eq!(rig.index_call_count(), 0);
    assert_eq!(rig.publisher.attempts(), 0);
}

#[tokio::test]
async fn redelivered_archive_succeeds_again() {
    let target = ArchiveTarget::MealPlanOptionVote {
        meal_plan_option_id: "o1".into(),
        meal_plan_option_vote_id: "v1".into(),
    };
    let rig = Rig::with_dm(MemoryDataManager::new().seed(existing_for_archive(&target)));
    let message = fakes::pre_archive(target);

    rig.deliver(Topic::PreArchives, &message).await.unwrap();
    rig.deliver(Topic::PreArchives, &message).await.unwrap();

    assert_eq!(
        rig.publisher.message_types(),
        vec![
            MessageType::MealPlanOptionVoteArchived,
            MessageType::MealPlanOptionVoteArchived
        ]
    );
}

#[tokio::test]
async fn household_scoped_archive_uses_the_envelope_household() {
    let webhook = Webhook {
        id: "w1".into(),
        belongs_to_household: "another-household".into(),
        ..Default::default()
    };
    let rig = Rig::with_dm(MemoryDataManager::new().seed(webhook));

    let err = rig
        .deliver(
            Topic::PreArchives,
            &fakes::pre_archive(ArchiveTarget::Webhook {
                webhook_id: "w1".into(),
            }),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "persistence");
    assert!(!rig.dm.is_archived(DataType::Webhook, "w1"));
}

#[tokio::test]
async fn archive_events_carry_attribution() {
    let target = ArchiveTarget::Meal {
        meal_id: "m1".into(),
    };
    let rig = Rig::with_dm(MemoryDataManager::new().seed(existing_for_archive(&target)));

    rig.deliver(Topic::PreArchives, &fakes::pre_archive(target))
        .await
        .unwrap();

    let event = &rig.publisher.messages()[0];
    assert_eq!(event.message_type.as_str(), "meal_archived");
    assert_eq!(event.attributable_to_user_id, USER_ID);
    assert_eq!(event.attributable_to_household_id, HOUSEHOLD_ID);
}

#[tokio::test]
async fn user_membership_is_a_noop() {
    let rig = Rig::new();

    rig.deliver_raw(Topic::PreArchives, br#"{"dataType":"user_membership"}"#)
        .await
        .unwrap();

    assert!(rig.dm.calls().is_empty());
    assert_eq!(rig.publisher.attempts(), 0);
    assert_eq!(rig.index_call_count(), 0);
}

#[tokio::test]
async fn missing_identifier_is_a_decode_error() {
    let rig = Rig::new();

    let err = rig
        .deliver_raw(
            Topic::PreArchives,
            br#"{"dataType":"recipe_step","recipeID":"r1","attributableToUserID":"u1","attributableToHouseholdID":"h1"}"#,
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "decode");
    assert!(rig.dm.calls().is_empty());
}

#[test]
fn every_archivable_type_has_a_handler() {
    for data_type in DataType::ALL {
        let dispatch = ArchivesWorker::dispatch(data_type);
        assert_eq!(
            fakes::pre_archive_for(data_type).is_some(),
            matches!(dispatch, Dispatch::Handle(_)),
            "{data_type}"
        );
    }
}
