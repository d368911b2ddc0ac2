//! Pre-archives worker: soft-deletes entities by identifier.

use std::sync::Arc;

use async_trait::async_trait;
use prixfixe_common::{ArchiveTarget, DataType, MessageType, PreArchiveMessage};
use tracing::{debug, info_span, Instrument};
use typed_builder::TypedBuilder;

use crate::context::MessageContext;
use crate::dispatch::{self, Dispatch};
use crate::error::WorkerError;
use crate::pipeline::{self, Steps};
use crate::search::SearchIndexes;
use crate::traits::{DataManager, MessageHandler, Publisher};

const ENVELOPE: &str = "pre-archive";

#[derive(Clone, TypedBuilder)]
pub struct ArchivesWorker {
    data_manager: Arc<dyn DataManager>,
    #[builder(default)]
    publisher: Option<Arc<dyn Publisher>>,
    #[builder(default)]
    indexes: SearchIndexes,
}

impl ArchivesWorker {
    pub fn dispatch(data_type: DataType) -> Dispatch {
        match data_type {
            DataType::Meal => Dispatch::Handle("archive_meal"),
            DataType::Recipe => Dispatch::Handle("archive_recipe"),
            DataType::RecipeStep => Dispatch::Handle("archive_recipe_step"),
            DataType::RecipeStepInstrument => Dispatch::Handle("archive_recipe_step_instrument"),
            DataType::RecipeStepIngredient => Dispatch::Handle("archive_recipe_step_ingredient"),
            DataType::RecipeStepProduct => Dispatch::Handle("archive_recipe_step_product"),
            DataType::MealPlan => Dispatch::Handle("archive_meal_plan"),
            DataType::MealPlanOption => Dispatch::Handle("archive_meal_plan_option"),
            DataType::MealPlanOptionVote => Dispatch::Handle("archive_meal_plan_option_vote"),
            DataType::ValidIngredient => Dispatch::Handle("archive_valid_ingredient"),
            DataType::ValidInstrument => Dispatch::Handle("archive_valid_instrument"),
            DataType::ValidPreparation => Dispatch::Handle("archive_valid_preparation"),
            DataType::ValidIngredientPreparation => {
                Dispatch::Handle("archive_valid_ingredient_preparation")
            }
            DataType::Webhook => Dispatch::Handle("archive_webhook"),
            DataType::HouseholdInvitation | DataType::UserMembership => Dispatch::Noop,
        }
    }

    /// Run the archive handler for an already-decoded envelope.
    pub async fn archive(&self, ctx: &MessageContext, msg: &PreArchiveMessage) -> Result<(), WorkerError> {
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
        let household_id = steps.household_id();

        match &msg.target {
            ArchiveTarget::Meal { meal_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::MealArchived,
                    meal_id,
                    dm.archive_meal(meal_id, household_id),
                )
                .await
            }
            ArchiveTarget::Recipe { recipe_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::RecipeArchived,
                    recipe_id,
                    dm.archive_recipe(recipe_id, household_id),
                )
                .await
            }
            ArchiveTarget::RecipeStep {
                recipe_id,
                recipe_step_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::RecipeStepArchived,
                    recipe_step_id,
                    dm.archive_recipe_step(recipe_id, recipe_step_id),
                )
                .await
            }
            ArchiveTarget::RecipeStepInstrument {
                recipe_step_id,
                recipe_step_instrument_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::RecipeStepInstrumentArchived,
                    recipe_step_instrument_id,
                    dm.archive_recipe_step_instrument(recipe_step_id, recipe_step_instrument_id),
                )
                .await
            }
            ArchiveTarget::RecipeStepIngredient {
                recipe_step_id,
                recipe_step_ingredient_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::RecipeStepIngredientArchived,
                    recipe_step_ingredient_id,
                    dm.archive_recipe_step_ingredient(recipe_step_id, recipe_step_ingredient_id),
                )
                .await
            }
            ArchiveTarget::RecipeStepProduct {
                recipe_step_id,
                recipe_step_product_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::RecipeStepProductArchived,
                    recipe_step_product_id,
                    dm.archive_recipe_step_product(recipe_step_id, recipe_step_product_id),
                )
                .await
            }
            ArchiveTarget::MealPlan { meal_plan_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::MealPlanArchived,
                    meal_plan_id,
                    dm.archive_meal_plan(meal_plan_id, household_id),
                )
                .await
            }
            ArchiveTarget::MealPlanOption {
                meal_plan_id,
                meal_plan_option_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::MealPlanOptionArchived,
                    meal_plan_option_id,
                    dm.archive_meal_plan_option(meal_plan_id, meal_plan_option_id),
                )
                .await
            }
            ArchiveTarget::MealPlanOptionVote {
                meal_plan_option_id,
                meal_plan_option_vote_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::MealPlanOptionVoteArchived,
                    meal_plan_option_vote_id,
                    dm.archive_meal_plan_option_vote(meal_plan_option_id, meal_plan_option_vote_id),
                )
                .await
            }
            ArchiveTarget::ValidIngredient { valid_ingredient_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::ValidIngredientArchived,
                    valid_ingredient_id,
                    dm.archive_valid_ingredient(valid_ingredient_id),
                )
                .await
            }
            ArchiveTarget::ValidInstrument { valid_instrument_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::ValidInstrumentArchived,
                    valid_instrument_id,
                    dm.archive_valid_instrument(valid_instrument_id),
                )
                .await
            }
            ArchiveTarget::ValidPreparation { valid_preparation_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::ValidPreparationArchived,
                    valid_preparation_id,
                    dm.archive_valid_preparation(valid_preparation_id),
                )
                .await
            }
            ArchiveTarget::ValidIngredientPreparation {
                valid_ingredient_preparation_id,
            } => {
                pipeline::archive(
                    &steps,
                    MessageType::ValidIngredientPreparationArchived,
                    valid_ingredient_preparation_id,
                    dm.archive_valid_ingredient_preparation(valid_ingredient_preparation_id),
                )
                .await
            }
            ArchiveTarget::Webhook { webhook_id } => {
                pipeline::archive(
                    &steps,
                    MessageType::WebhookArchived,
                    webhook_id,
                    dm.archive_webhook(webhook_id, household_id),
                )
                .await
            }
        }
    }
}

#[async_trait]
impl MessageHandler for ArchivesWorker {
    async fn handle_message(&self, ctx: &MessageContext, bytes: &[u8]) -> Result<(), WorkerError> {
        let routed = dispatch::route(ENVELOPE, bytes)?;
        let span = info_span!(
            "handle_message",
            topic = "pre_archives",
            data_type = %routed.data_type,
            user_id = %routed.user_id,
        );

        async {
            if let Dispatch::Noop = Self::dispatch(routed.data_type) {
                debug!("Data type is a no-op on this topic");
                return Ok(());
            }
            let msg: PreArchiveMessage = dispatch::decode(ENVELOPE, bytes)?;
            debug!("Message read");
            self.archive(ctx, &msg).await
        }
        .instrument(span)
        .await
    }
}
