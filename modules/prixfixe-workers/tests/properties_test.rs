//! Pipeline invariants over every (data type, verb, failure point).

mod harness;

use harness::{existing_for_archive, existing_for_update, ballot, Rig};
use prixfixe_common::fakes::{self, HOUSEHOLD_ID, USER_ID};
use prixfixe_common::*;
use prixfixe_workers::memory::operation;
use prixfixe_workers::{
    ArchivesWorker, Dispatch, MemoryDataManager, MemoryPublisher, MemorySearchIndex, Topic,
    UpdatesWorker, Verb, WorkerError, WritesWorker,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailAt {
    Nothing,
    Persist,
    Index,
    Publish,
}

fn verb_strategy() -> impl Strategy<Value = Verb> {
    prop::sample::select(vec![Verb::Create, Verb::Update, Verb::Archive])
}

fn fail_strategy() -> impl Strategy<Value = FailAt> {
    prop::sample::select(vec![FailAt::Nothing, FailAt::Persist, FailAt::Index, FailAt::Publish])
}

fn topic(verb: Verb) -> Topic {
    match verb {
        Verb::Create => Topic::PreWrites,
        Verb::Update => Topic::PreUpdates,
        Verb::Archive => Topic::PreArchives,
    }
}

fn dispatch(verb: Verb, data_type: DataType) -> Dispatch {
    match verb {
        Verb::Create => WritesWorker::dispatch(data_type),
        Verb::Update => UpdatesWorker::dispatch(data_type),
        Verb::Archive => ArchivesWorker::dispatch(data_type),
    }
}

fn past_tense(verb: Verb) -> &'static str {
    match verb {
        Verb::Create => "created",
        Verb::Update => "updated",
        Verb::Archive => "archived",
    }
}

/// One delivery and the data manager state it expects.
struct Scenario {
    bytes: Vec<u8>,
    dm: MemoryDataManager,
    /// The entity an update submits, which its event must echo.
    submitted: Option<Entity>,
}

/// `None` if the verb does not handle the type.
fn scenario(verb: Verb, data_type: DataType) -> Option<Scenario> {
    match verb {
        Verb::Create => {
            let message = fakes::pre_write_for(data_type)?;
            let dm = match &message.payload {
                PreWrite::MealPlanOptionVote { meal_plan_id, vote } => {
                    ballot(meal_plan_id, &[vote.belongs_to_meal_plan_option.as_str()], &[])
                }
                _ => MemoryDataManager::new(),
            };
            Some(Scenario {
                bytes: fakes::to_bytes(&message),
                dm,
                submitted: None,
            })
        }
        Verb::Update => {
            let message = fakes::pre_update_for(data_type)?;
            let submitted = existing_for_update(&message.payload);
            Some(Scenario {
                bytes: fakes::to_bytes(&message),
                dm: MemoryDataManager::new().seed(submitted.clone()),
                submitted: Some(submitted),
            })
        }
        Verb::Archive => {
            let message = fakes::pre_archive_for(data_type)?;
            Some(Scenario {
                bytes: fakes::to_bytes(&message),
                dm: MemoryDataManager::new().seed(existing_for_archive(&message.target)),
                submitted: None,
            })
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn mutation_outcomes_follow_the_step_order(
        data_type in prop::sample::select(DataType::ALL.to_vec()),
        verb in verb_strategy(),
        fail_at in fail_strategy(),
    ) {
        let Some(Scenario { bytes, dm, submitted }) = scenario(verb, data_type) else {
            // Recognized but not handled on this topic: always a quiet success.
            prop_assert_eq!(dispatch(verb, data_type), Dispatch::Noop);
            let rig = Rig::new();
            let body = format!(r#"{{"dataType":"{data_type}"}}"#);
            prop_assert!(runtime().block_on(rig.deliver_raw(topic(verb), body.as_bytes())).is_ok());
            prop_assert!(rig.dm.calls().is_empty());
            prop_assert_eq!(rig.publisher.attempts(), 0);
            prop_assert_eq!(rig.index_call_count(), 0);
            return Ok(());
        };
        prop_assert!(matches!(dispatch(verb, data_type), Dispatch::Handle(_)));

        let dm = match fail_at {
            FailAt::Persist => dm.fail_on(operation(verb, data_type)),
            _ => dm,
        };
        let publisher = match fail_at {
            FailAt::Publish => MemoryPublisher::new().failing(),
            _ => MemoryPublisher::new(),
        };
        let rig = Rig::build(dm, publisher, |name| {
            let index = MemorySearchIndex::new(name);
            if fail_at == FailAt::Index {
                index.failing_index().failing_delete()
            } else {
                index
            }
        });
        let searchable = data_type.is_searchable();

        let result = runtime().block_on(rig.deliver_raw(topic(verb), &bytes));

        match fail_at {
            FailAt::Persist => {
                let is_persistence = matches!(result, Err(WorkerError::Persistence { .. }));
                prop_assert!(is_persistence, "{:?}", result);
                prop_assert_eq!(rig.index_call_count(), 0);
                prop_assert_eq!(rig.publisher.attempts(), 0);
            }
            FailAt::Index if searchable => {
                let is_index = matches!(result, Err(WorkerError::Index { .. }));
                prop_assert!(is_index, "{:?}", result);
                prop_assert_eq!(rig.publisher.attempts(), 0);
            }
            FailAt::Publish => {
                prop_assert!(result.is_err());
                prop_assert!(rig.publisher.messages().is_empty());
                if searchable {
                    prop_assert_eq!(rig.index_call_count(), 1);
                }
            }
            FailAt::Nothing | FailAt::Index => {
                prop_assert!(result.is_ok(), "{:?}", result);
                let published = rig.publisher.messages();
                prop_assert_eq!(published.len(), 1);
                let event = &published[0];
                prop_assert_eq!(event.data_type, data_type);
                prop_assert!(
                    event.message_type.as_str().to_lowercase().ends_with(past_tense(verb)),
                    "{} for {:?}", event.message_type, verb
                );
                prop_assert_eq!(event.attributable_to_user_id.as_str(), USER_ID);
                prop_assert_eq!(event.attributable_to_household_id.as_str(), HOUSEHOLD_ID);
                prop_assert_eq!(rig.index_call_count(), usize::from(searchable));

                match verb {
                    Verb::Archive => prop_assert!(event.entity.is_none()),
                    Verb::Update => prop_assert_eq!(&event.entity, &submitted),
                    Verb::Create => {
                        // The stored row, as the data manager returned it.
                        let payload = event.to_payload().unwrap();
                        let sent = &payload[payload_slot(data_type)];
                        let id = sent["id"].as_str().unwrap_or_default();
                        prop_assert!(!id.is_empty());
                        prop_assert_eq!(Some(sent.clone()), rig.dm.snapshot(data_type, id));
                    }
                }
            }
        }
    }

    #[test]
    fn unrecognized_tags_touch_nothing(
        tag in "[a-z_]{1,24}",
        verb in verb_strategy(),
    ) {
        prop_assume!(tag.parse::<DataType>().is_err());
        let rig = Rig::new();
        let body = format!(r#"{{"dataType":"{tag}","attributableToUserID":"u1"}}"#);

        let result = runtime().block_on(rig.deliver_raw(topic(verb), body.as_bytes()));

        let is_unknown = matches!(result, Err(WorkerError::UnknownDataType(ref t)) if *t == tag);
        prop_assert!(is_unknown, "{:?}", result);
        prop_assert!(rig.dm.calls().is_empty());
        prop_assert_eq!(rig.publisher.attempts(), 0);
        prop_assert_eq!(rig.index_call_count(), 0);
    }
}

#[test]
fn every_tag_is_handled_or_ignored_on_every_topic() {
    for data_type in DataType::ALL {
        for verb in [Verb::Create, Verb::Update, Verb::Archive] {
            let handled = matches!(dispatch(verb, data_type), Dispatch::Handle(_));
            assert_eq!(handled, scenario(verb, data_type).is_some(), "{verb} {data_type}");
        }
    }
}

#[tokio::test]
async fn missing_publisher_keeps_db_and_index_outcomes() {
    use std::sync::Arc;

    use prixfixe_workers::{SearchIndexes, Workers};

    for verb in [Verb::Create, Verb::Update, Verb::Archive] {
        for data_type in DataType::ALL {
            let Some(Scenario { bytes, dm, .. }) = scenario(verb, data_type) else {
                continue;
            };
            let dm = Arc::new(dm);
            let index = Arc::new(MemorySearchIndex::new("any").recording());
            let indexes = SearchIndexes {
                valid_ingredients: Some(index.clone()),
                valid_instruments: Some(index.clone()),
                valid_preparations: Some(index.clone()),
            };
            let workers = Workers::new(dm.clone(), None, indexes);

            workers
                .handle(topic(verb), &Default::default(), &bytes)
                .await
                .unwrap_or_else(|e| panic!("{verb} {data_type}: {e}"));

            let live = usize::from(verb != Verb::Archive);
            assert_eq!(dm.count(data_type), live, "{verb} {data_type}");
            assert_eq!(
                index.calls().len(),
                usize::from(data_type.is_searchable()),
                "{verb} {data_type}"
            );
        }
    }
}
