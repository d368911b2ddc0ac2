//! Meal plan option vote cascade.
//!
//! A vote is the one input that can drive several durable effects:
//!
//! 1. persist the vote
//! 2. publish `mealPlanOptionVoteCreated`
//! 3. try to finalize the voted-on option
//! 4. publish `mealPlanOptionFinalized` if step 3 transitioned it
//! 5. try to finalize the whole plan
//! 6. publish `mealPlanFinalized` if step 5 transitioned it
//!
//! Steps run strictly in order and the first failure stops the cascade. The
//! finalize calls report whether *this* call caused the transition; only a
//! transition emits a finalization event.

use std::future::Future;

use prixfixe_common::{
    DataType, MealPlanOptionVoteDatabaseCreationInput, MessageType, PrixFixeError,
};
use tracing::{debug, info, warn};

use crate::error::{CascadeStep, Verb, WorkerError};
use crate::pipeline::Steps;
use crate::traits::DataManager;

pub(crate) async fn cascade(
    steps: &Steps<'_>,
    dm: &dyn DataManager,
    meal_plan_id: &str,
    input: &MealPlanOptionVoteDatabaseCreationInput,
) -> Result<(), WorkerError> {
    if meal_plan_id.is_empty() {
        return Err(WorkerError::Invalid {
            data_type: DataType::MealPlanOptionVote,
            source: PrixFixeError::MissingField {
                data_type: DataType::MealPlanOptionVote.as_str(),
                field: "mealPlanID",
            },
        });
    }

    let vote = steps
        .persist(Verb::Create, dm.create_meal_plan_option_vote(input))
        .await?;
    let option_id = vote.belongs_to_meal_plan_option.clone();

    let created = steps
        .message(DataType::MealPlanOptionVote, MessageType::MealPlanOptionVoteCreated)
        .with_entity(vote);
    step(CascadeStep::PublishVoteCreated, steps.send(&created)).await?;

    let option_done = step(
        CascadeStep::FinalizeOption,
        steps.ctx().run(dm.finalize_meal_plan_option(
            meal_plan_id,
            &option_id,
            steps.household_id(),
        )),
    )
    .await?;

    if option_done {
        info!(meal_plan_id, option_id = %option_id, "Meal plan option finalized");
        let finalized = steps
            .message(DataType::MealPlanOption, MessageType::MealPlanOptionFinalized)
            .with_meal_plan_id(meal_plan_id)
            .with_meal_plan_option_id(option_id.as_str());
        step(CascadeStep::PublishOptionFinalized, steps.send(&finalized)).await?;
    }

    let plan_done = step(
        CascadeStep::FinalizePlan,
        steps.ctx().run(
            dm.attempt_to_finalize_complete_meal_plan(meal_plan_id, steps.household_id()),
        ),
    )
    .await?;

    if plan_done {
        info!(meal_plan_id, "Meal plan finalized");
        let finalized = steps
            .message(DataType::MealPlan, MessageType::MealPlanFinalized)
            .with_meal_plan_id(meal_plan_id);
        step(CascadeStep::PublishPlanFinalized, steps.send(&finalized)).await?;
    }

    Ok(())
}

async fn step<T, F>(step: CascadeStep, fut: F) -> Result<T, WorkerError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match fut.await {
        Ok(value) => {
            debug!(step = %step, "Cascade step succeeded");
            Ok(value)
        }
        Err(source) => {
            warn!(step = %step, error = %source, "Cascade step failed");
            Err(WorkerError::Cascade { step, source })
        }
    }
}
