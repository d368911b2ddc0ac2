//! Pre-writes worker: creates entities.

use std::sync::Arc;

use async_trait::async_trait;
use prixfixe_common::{DataType, MessageType, PreWrite, PreWriteMessage};
use tracing::{debug, info_span, Instrument};
use typed_builder::TypedBuilder;

use crate::context::MessageContext;
use crate::dispatch::{self, Dispatch};
use crate::error::WorkerError;
use crate::pipeline::{self, Steps};
use crate::search::SearchIndexes;
use crate::traits::{DataManager, MessageHandler, Publisher};
use crate::votes;

const ENVELOPE: &str = "pre-write";

#[derive(Clone, TypedBuilder)]
pub struct WritesWorker {
    data_manager: Arc<dyn DataManager>,
    #[builder(default)]
    publisher: Option<Arc<dyn Publisher>>,
    #[builder(default)]
    indexes: SearchIndexes,
}

impl WritesWorker {
    pub fn dispatch(data_type: DataType) -> Dispatch {
        match data_type {
            DataType::Meal => Dispatch::Handle("create_meal"),
            DataType::Recipe => Dispatch::Handle("create_recipe"),
            DataType::RecipeStep => Dispatch::Handle("create_recipe_step"),
            DataType::RecipeStepInstrument => Dispatch::Handle("create_recipe_step_instrument"),
            DataType::RecipeStepIngredient => Dispatch::Handle("create_recipe_step_ingredient"),
            DataType::RecipeStepProduct => Dispatch::Handle("create_recipe_step_product"),
            DataType::MealPlan => Dispatch::Handle("create_meal_plan"),
            DataType::MealPlanOption => Dispatch::Handle("create_meal_plan_option"),
            DataType::MealPlanOptionVote => Dispatch::Handle("vote_cascade"),
            DataType::ValidIngredient => Dispatch::Handle("create_valid_ingredient"),
            DataType::ValidInstrument => Dispatch::Handle("create_valid_instrument"),
            DataType::ValidPreparation => Dispatch::Handle("create_valid_preparation"),
            DataType::ValidIngredientPreparation => {
                Dispatch::Handle("create_valid_ingredient_preparation")
            }
            DataType::HouseholdInvitation => Dispatch::Handle("create_household_invitation"),
            DataType::Webhook => Dispatch::Handle("create_webhook"),
            DataType::UserMembership => Dispatch::Noop,
        }
    }

    /// Run the create handler for an already-decoded envelope.
    pub async fn write(&self, ctx: &MessageContext, msg: &PreWriteMessage) -> Result<(), WorkerError> {
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
            PreWrite::Meal(input) => {
                pipeline::create(&steps, MessageType::MealCreated, dm.create_meal(input)).await
            }
            PreWrite::Recipe(input) => {
                pipeline::create(&steps, MessageType::RecipeCreated, dm.create_recipe(input)).await
            }
            PreWrite::RecipeStep(input) => {
                pipeline::create(
                    &steps,
                    MessageType::RecipeStepCreated,
                    dm.create_recipe_step(input),
                )
                .await
            }
            PreWrite::RecipeStepInstrument(input) => {
                pipeline::create(
                    &steps,
                    MessageType::RecipeStepInstrumentCreated,
                    dm.create_recipe_step_instrument(input),
                )
                .await
            }
            PreWrite::RecipeStepIngredient(input) => {
                pipeline::create(
                    &steps,
                    MessageType::RecipeStepIngredientCreated,
                    dm.create_recipe_step_ingredient(input),
                )
                .await
            }
            PreWrite::RecipeStepProduct(input) => {
                pipeline::create(
                    &steps,
                    MessageType::RecipeStepProductCreated,
                    dm.create_recipe_step_product(input),
                )
                .await
            }
            PreWrite::MealPlan(input) => {
                pipeline::create(&steps, MessageType::MealPlanCreated, dm.create_meal_plan(input))
                    .await
            }
            PreWrite::MealPlanOption(input) => {
                pipeline::create(
                    &steps,
                    MessageType::MealPlanOptionCreated,
                    dm.create_meal_plan_option(input),
                )
                .await
            }
            PreWrite::MealPlanOptionVote { meal_plan_id, vote } => {
                votes::cascade(&steps, dm, meal_plan_id, vote).await
            }
            PreWrite::ValidIngredient(input) => {
                pipeline::create(
                    &steps,
                    MessageType::ValidIngredientCreated,
                    dm.create_valid_ingredient(input),
                )
                .await
            }
            PreWrite::ValidInstrument(input) => {
                pipeline::create(
                    &steps,
                    MessageType::ValidInstrumentCreated,
                    dm.create_valid_instrument(input),
                )
                .await
            }
            PreWrite::ValidPreparation(input) => {
                pipeline::create(
                    &steps,
                    MessageType::ValidPreparationCreated,
                    dm.create_valid_preparation(input),
                )
                .await
            }
            PreWrite::ValidIngredientPreparation(input) => {
                pipeline::create(
                    &steps,
                    MessageType::ValidIngredientPreparationCreated,
                    dm.create_valid_ingredient_preparation(input),
                )
                .await
            }
            PreWrite::HouseholdInvitation(input) => {
                pipeline::create(
                    &steps,
                    MessageType::HouseholdInvitationCreated,
                    dm.create_household_invitation(input),
                )
                .await
            }
            PreWrite::Webhook(input) => {
                pipeline::create(&steps, MessageType::WebhookCreated, dm.create_webhook(input)).await
            }
        }
    }
}

#[async_trait]
impl MessageHandler for WritesWorker {
    async fn handle_message(&self, ctx: &MessageContext, bytes: &[u8]) -> Result<(), WorkerError> {
        let routed = dispatch::route(ENVELOPE, bytes)?;
        let span = info_span!(
            "handle_message",
            topic = "pre_writes",
            data_type = %routed.data_type,
            user_id = %routed.user_id,
        );

        async {
            if let Dispatch::Noop = Self::dispatch(routed.data_type) {
                debug!("Data type is a no-op on this topic");
                return Ok(());
            }
            let msg: PreWriteMessage = dispatch::decode(ENVELOPE, bytes)?;
            debug!("Message read");
            self.write(ctx, &msg).await
        }
        .instrument(span)
        .await
    }
}
