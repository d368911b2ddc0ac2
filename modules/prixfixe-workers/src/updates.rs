//! Pre-updates worker: persists full-entity updates.

use std::sync::Arc;

use async_trait::async_trait;
use prixfixe_common::{DataType, MessageType, PreUpdate, PreUpdateMessage};
use tracing::{debug, info_span, Instrument};
use typed_builder::TypedBuilder;

use crate::context::MessageContext;
use crate::dispatch::{self, Dispatch};
use crate::error::WorkerError;
use crate::pipeline::{self, Steps};
use crate::search::SearchIndexes;
use crate::traits::{DataManager, MessageHandler, Publisher};

const ENVELOPE: &str = "pre-update";

#[derive(Clone, TypedBuilder)]
pub struct UpdatesWorker {
    data_manager: Arc<dyn DataManager>,
    #[builder(default)]
    publisher: Option<Arc<dyn Publisher>>,
    #[builder(default)]
    indexes: SearchIndexes,
}

impl UpdatesWorker {
    pub fn dispatch(data_type: DataType) -> Dispatch {
        match data_type {
            DataType::Recipe => Dispatch::Handle("update_recipe"),
            DataType::RecipeStep => Dispatch::Handle("update_recipe_step"),
            DataType::RecipeStepInstrument => Dispatch::Handle("update_recipe_step_instrument"),
            DataType::RecipeStepIngredient => Dispatch::Handle("update_recipe_step_ingredient"),
            DataType::RecipeStepProduct => Dispatch::Handle("update_recipe_step_product"),
            DataType::MealPlan => Dispatch::Handle("update_meal_plan"),
            DataType::MealPlanOption => Dispatch::Handle("update_meal_plan_option"),
            DataType::MealPlanOptionVote => Dispatch::Handle("update_meal_plan_option_vote"),
            DataType::ValidIngredient => Dispatch::Handle("update_valid_ingredient"),
            DataType::ValidInstrument => Dispatch::Handle("update_valid_instrument"),
            DataType::ValidPreparation => Dispatch::Handle("update_valid_preparation"),
            DataType::ValidIngredientPreparation => {
                Dispatch::Handle("update_valid_ingredient_preparation")
            }
            DataType::Meal
            | DataType::HouseholdInvitation
            | DataType::UserMembership
            | DataType::Webhook => Dispatch::Noop,
        }
    }

    /// Run the update handler for an already-decoded envelope.
    pub async fn update(&self, ctx: &MessageContext, msg: &PreUpdateMessage) -> Result<(), WorkerError> {
        let data_type = msg.data_type();
        let steps = Steps::new(
            ctx,
            data_type,
            self.indexes.for_data_type(data_type),
            self.publisher.as_deref(),
            &msg.attributable_to_user_id,
            &msg.attributable_to_household_id,
        );
        let dm = &*self.data_manager;

        match &msg.payload {
            PreUpdate::Recipe(e) => {
                pipeline::update(&steps, MessageType::RecipeUpdated, e, dm.update_recipe(e)).await
            }
            PreUpdate::RecipeStep(e) => {
                pipeline::update(&steps, MessageType::RecipeStepUpdated, e, dm.update_recipe_step(e))
                    .await
            }
            PreUpdate::RecipeStepInstrument(e) => {
                pipeline::update(
                    &steps,
                    MessageType::RecipeStepInstrumentUpdated,
                    e,
                    dm.update_recipe_step_instrument(e),
                )
                .await
            }
            PreUpdate::RecipeStepIngredient(e) => {
                pipeline::update(
                    &steps,
                    MessageType::RecipeStepIngredientUpdated,
                    e,
                    dm.update_recipe_step_ingredient(e),
                )
                .await
            }
            PreUpdate::RecipeStepProduct(e) => {
                pipeline::update(
                    &steps,
                    MessageType::RecipeStepProductUpdated,
                    e,
                    dm.update_recipe_step_product(e),
                )
                .await
            }
            PreUpdate::MealPlan(e) => {
                pipeline::update(&steps, MessageType::MealPlanUpdated, e, dm.update_meal_plan(e))
                    .await
            }
            PreUpdate::MealPlanOption(e) => {
                pipeline::update(
                    &steps,
                    MessageType::MealPlanOptionUpdated,
                    e,
                    dm.update_meal_plan_option(e),
                )
                .await
            }
            PreUpdate::MealPlanOptionVote(e) => {
                pipeline::update(
                    &steps,
                    MessageType::MealPlanOptionVoteUpdated,
                    e,
                    dm.update_meal_plan_option_vote(e),
                )
                .await
            }
            PreUpdate::ValidIngredient(e) => {
                pipeline::update(
                    &steps,
                    MessageType::ValidIngredientUpdated,
                    e,
                    dm.update_valid_ingredient(e),
                )
                .await
            }
            PreUpdate::ValidInstrument(e) => {
                pipeline::update(
                    &steps,
                    MessageType::ValidInstrumentUpdated,
                    e,
                    dm.update_valid_instrument(e),
                )
                .await
            }
            PreUpdate::ValidPreparation(e) => {
                pipeline::update(
                    &steps,
                    MessageType::ValidPreparationUpdated,
                    e,
                    dm.update_valid_preparation(e),
                )
                .await
            }
            PreUpdate::ValidIngredientPreparation(e) => {
                pipeline::update(
                    &steps,
                    MessageType::ValidIngredientPreparationUpdated,
                    e,
                    dm.update_valid_ingredient_preparation(e),
                )
                .await
            }
        }
    }
}

#[async_trait]
impl MessageHandler for UpdatesWorker {
    async fn handle_message(&self, ctx: &MessageContext, bytes: &[u8]) -> Result<(), WorkerError> {
        let routed = dispatch::route(ENVELOPE, bytes)?;
        let span = info_span!(
            "handle_message",
            topic = "pre_updates",
            data_type = %routed.data_type,
            user_id = %routed.user_id,
        );

        async {
            if let Dispatch::Noop = Self::dispatch(routed.data_type) {
                debug!("Data type is a no-op on this topic");
                return Ok(());
            }
            let msg: PreUpdateMessage = dispatch::decode(ENVELOPE, bytes)?;
            debug!("Message read");
            self.update(ctx, &msg).await
        }
        .instrument(span)
        .await
    }
}
