//! Collaborator seams. Every external system a worker talks to sits behind one
//! of these traits so the pipeline can run against Postgres/HTTP in
//! production and in-memory doubles in tests.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use prixfixe_common::*;

use crate::context::MessageContext;
use crate::error::WorkerError;
use crate::search::IndexDefinition;

/// Durable entity state. One method group per entity.
///
/// Implementations must tolerate redelivery: creating an entity whose ID
/// already exists returns the stored row, and archiving an archived entity
/// succeeds.
#[async_trait]
pub trait DataManager: Send + Sync {
    // --- Create ---
    async fn create_meal(&self, input: &MealDatabaseCreationInput) -> Result<Meal>;
    async fn create_recipe(&self, input: &RecipeDatabaseCreationInput) -> Result<Recipe>;
    async fn create_recipe_step(&self, input: &RecipeStepDatabaseCreationInput)
        -> Result<RecipeStep>;
    async fn create_recipe_step_instrument(
        &self,
        input: &RecipeStepInstrumentDatabaseCreationInput,
    ) -> Result<RecipeStepInstrument>;
    async fn create_recipe_step_ingredient(
        &self,
        input: &RecipeStepIngredientDatabaseCreationInput,
    ) -> Result<RecipeStepIngredient>;
    async fn create_recipe_step_product(
        &self,
        input: &RecipeStepProductDatabaseCreationInput,
    ) -> Result<RecipeStepProduct>;
    async fn create_meal_plan(&self, input: &MealPlanDatabaseCreationInput) -> Result<MealPlan>;
    async fn create_meal_plan_option(
        &self,
        input: &MealPlanOptionDatabaseCreationInput,
    ) -> Result<MealPlanOption>;
    async fn create_meal_plan_option_vote(
        &self,
        input: &MealPlanOptionVoteDatabaseCreationInput,
    ) -> Result<MealPlanOptionVote>;
    async fn create_valid_ingredient(
        &self,
        input: &ValidIngredientDatabaseCreationInput,
    ) -> Result<ValidIngredient>;
    async fn create_valid_instrument(
        &self,
        input: &ValidInstrumentDatabaseCreationInput,
    ) -> Result<ValidInstrument>;
    async fn create_valid_preparation(
        &self,
        input: &ValidPreparationDatabaseCreationInput,
    ) -> Result<ValidPreparation>;
    async fn create_valid_ingredient_preparation(
        &self,
        input: &ValidIngredientPreparationDatabaseCreationInput,
    ) -> Result<ValidIngredientPreparation>;
    async fn create_household_invitation(
        &self,
        input: &HouseholdInvitationDatabaseCreationInput,
    ) -> Result<HouseholdInvitation>;
    async fn create_webhook(&self, input: &WebhookDatabaseCreationInput) -> Result<Webhook>;

    // --- Update ---
    async fn update_recipe(&self, recipe: &Recipe) -> Result<()>;
    async fn update_recipe_step(&self, step: &RecipeStep) -> Result<()>;
    async fn update_recipe_step_instrument(&self, instrument: &RecipeStepInstrument)
        -> Result<()>;
    async fn update_recipe_step_ingredient(&self, ingredient: &RecipeStepIngredient)
        -> Result<()>;
    async fn update_recipe_step_product(&self, product: &RecipeStepProduct) -> Result<()>;
    async fn update_meal_plan(&self, plan: &MealPlan) -> Result<()>;
    async fn update_meal_plan_option(&self, option: &MealPlanOption) -> Result<()>;
    async fn update_meal_plan_option_vote(&self, vote: &MealPlanOptionVote) -> Result<()>;
    async fn update_valid_ingredient(&self, ingredient: &ValidIngredient) -> Result<()>;
    async fn update_valid_instrument(&self, instrument: &ValidInstrument) -> Result<()>;
    async fn update_valid_preparation(&self, preparation: &ValidPreparation) -> Result<()>;
    async fn update_valid_ingredient_preparation(
        &self,
        pairing: &ValidIngredientPreparation,
    ) -> Result<()>;

    // --- Archive ---
    async fn archive_meal(&self, meal_id: &str, household_id: &str) -> Result<()>;
    async fn archive_recipe(&self, recipe_id: &str, household_id: &str) -> Result<()>;
    async fn archive_recipe_step(&self, recipe_id: &str, recipe_step_id: &str) -> Result<()>;
    async fn archive_recipe_step_instrument(
        &self,
        recipe_step_id: &str,
        recipe_step_instrument_id: &str,
    ) -> Result<()>;
    async fn archive_recipe_step_ingredient(
        &self,
        recipe_step_id: &str,
        recipe_step_ingredient_id: &str,
    ) -> Result<()>;
    async fn archive_recipe_step_product(
        &self,
        recipe_step_id: &str,
        recipe_step_product_id: &str,
    ) -> Result<()>;
    async fn archive_meal_plan(&self, meal_plan_id: &str, household_id: &str) -> Result<()>;
    async fn archive_meal_plan_option(
        &self,
        meal_plan_id: &str,
        meal_plan_option_id: &str,
    ) -> Result<()>;
    async fn archive_meal_plan_option_vote(
        &self,
        meal_plan_option_id: &str,
        meal_plan_option_vote_id: &str,
    ) -> Result<()>;
    async fn archive_valid_ingredient(&self, valid_ingredient_id: &str) -> Result<()>;
    async fn archive_valid_instrument(&self, valid_instrument_id: &str) -> Result<()>;
    async fn archive_valid_preparation(&self, valid_preparation_id: &str) -> Result<()>;
    async fn archive_valid_ingredient_preparation(
        &self,
        valid_ingredient_preparation_id: &str,
    ) -> Result<()>;
    async fn archive_webhook(&self, webhook_id: &str, household_id: &str) -> Result<()>;

    // --- Vote finalization ---

    /// Returns `true` only if this call moved the option into its finalized
    /// state. Already finalized or still awaiting votes both return `false`.
    async fn finalize_meal_plan_option(
        &self,
        meal_plan_id: &str,
        meal_plan_option_id: &str,
        household_id: &str,
    ) -> Result<bool>;

    /// Returns `true` only if this call moved the meal plan into its finalized
    /// state.
    async fn attempt_to_finalize_complete_meal_plan(
        &self,
        meal_plan_id: &str,
        household_id: &str,
    ) -> Result<bool>;
}

/// Derived search state for one index. `index` is an upsert keyed by ID.
#[async_trait]
pub trait SearchIndexManager: Send + Sync {
    async fn index(&self, id: &str, document: &serde_json::Value) -> Result<()>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Builds a manager for one index definition.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    async fn provide(&self, definition: &IndexDefinition) -> Result<Arc<dyn SearchIndexManager>>;
}

/// The outbound data-change stream.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &DataChangeMessage) -> Result<()>;
}

/// The single operation a broker invokes per delivery.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, ctx: &MessageContext, bytes: &[u8]) -> Result<(), WorkerError>;
}
