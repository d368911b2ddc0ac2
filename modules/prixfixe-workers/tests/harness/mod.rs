//! Shared rig for worker integration tests.
//!
//! Wires the three workers to in-memory collaborators and keeps handles to
//! each of them for assertions. No database or search cluster required.

#![allow(dead_code)]

use std::sync::Arc;

use prixfixe_common::fakes::HOUSEHOLD_ID;
use prixfixe_common::*;
use prixfixe_workers::search::{VALID_INGREDIENTS, VALID_INSTRUMENTS, VALID_PREPARATIONS};
use prixfixe_workers::{
    MemoryDataManager, MemoryPublisher, MemorySearchIndex, MessageContext, SearchIndexes, Topic,
    WorkerError, Workers,
};
use serde::Serialize;

pub struct Rig {
    pub dm: Arc<MemoryDataManager>,
    pub publisher: Arc<MemoryPublisher>,
    pub valid_ingredients: Arc<MemorySearchIndex>,
    pub valid_instruments: Arc<MemorySearchIndex>,
    pub valid_preparations: Arc<MemorySearchIndex>,
    pub workers: Workers,
}

impl Rig {
    pub fn new() -> Self {
        Self::build(MemoryDataManager::new(), MemoryPublisher::new(), |name| {
            MemorySearchIndex::new(name)
        })
    }

    pub fn with_dm(dm: MemoryDataManager) -> Self {
        Self::build(dm, MemoryPublisher::new(), |name| {
            MemorySearchIndex::new(name)
        })
    }

    /// Build a rig; `index` makes the manager for each named index. Every
    /// collaborator records its calls.
    pub fn build(
        dm: MemoryDataManager,
        publisher: MemoryPublisher,
        index: impl Fn(&'static str) -> MemorySearchIndex,
    ) -> Self {
        let dm = Arc::new(dm.recording());
        let publisher = Arc::new(publisher.recording());
        let recorded = |name| Arc::new(index(name).recording());
        let valid_ingredients = recorded(VALID_INGREDIENTS.name);
        let valid_instruments = recorded(VALID_INSTRUMENTS.name);
        let valid_preparations = recorded(VALID_PREPARATIONS.name);

        let indexes = SearchIndexes {
            valid_ingredients: Some(valid_ingredients.clone()),
            valid_instruments: Some(valid_instruments.clone()),
            valid_preparations: Some(valid_preparations.clone()),
        };
        let workers = Workers::new(dm.clone(), Some(publisher.clone()), indexes);

        Self {
            dm,
            publisher,
            valid_ingredients,
            valid_instruments,
            valid_preparations,
            workers,
        }
    }

    /// The index mirroring `data_type`, if it has one.
    pub fn index(&self, data_type: DataType) -> Option<&MemorySearchIndex> {
        match data_type {
            DataType::ValidIngredient => Some(self.valid_ingredients.as_ref()),
            DataType::ValidInstrument => Some(self.valid_instruments.as_ref()),
            DataType::ValidPreparation => Some(self.valid_preparations.as_ref()),
            _ => None,
        }
    }

    /// Index calls across every index.
    pub fn index_call_count(&self) -> usize {
        self.valid_ingredients.calls().len()
            + self.valid_instruments.calls().len()
            + self.valid_preparations.calls().len()
    }

    pub async fn deliver<T: Serialize>(&self, topic: Topic, envelope: &T) -> Result<(), WorkerError> {
        self.deliver_raw(topic, &fakes::to_bytes(envelope)).await
    }

    pub async fn deliver_raw(&self, topic: Topic, bytes: &[u8]) -> Result<(), WorkerError> {
        self.workers
            .handle(topic, &MessageContext::new(), bytes)
            .await
    }
}

/// The stored entity an update envelope expects to find.
pub fn existing_for_update(update: &PreUpdate) -> Entity {
    match update.clone() {
        PreUpdate::Recipe(e) => e.into(),
        PreUpdate::RecipeStep(e) => e.into(),
        PreUpdate::RecipeStepInstrument(e) => e.into(),
        PreUpdate::RecipeStepIngredient(e) => e.into(),
        PreUpdate::RecipeStepProduct(e) => e.into(),
        PreUpdate::MealPlan(e) => e.into(),
        PreUpdate::MealPlanOption(e) => e.into(),
        PreUpdate::MealPlanOptionVote(e) => e.into(),
        PreUpdate::ValidIngredient(e) => e.into(),
        PreUpdate::ValidInstrument(e) => e.into(),
        PreUpdate::ValidPreparation(e) => e.into(),
        PreUpdate::ValidIngredientPreparation(e) => e.into(),
    }
}

/// A stored entity matching every identifier column of an archive target.
pub fn existing_for_archive(target: &ArchiveTarget) -> Entity {
    match target.clone() {
        ArchiveTarget::Meal { meal_id } => Meal {
            id: meal_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::Recipe { recipe_id } => Recipe {
            id: recipe_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::RecipeStep {
            recipe_id,
            recipe_step_id,
        } => RecipeStep {
            id: recipe_step_id,
            belongs_to_recipe: recipe_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::RecipeStepInstrument {
            recipe_step_id,
            recipe_step_instrument_id,
        } => RecipeStepInstrument {
            id: recipe_step_instrument_id,
            belongs_to_recipe_step: recipe_step_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::RecipeStepIngredient {
            recipe_step_id,
            recipe_step_ingredient_id,
        } => RecipeStepIngredient {
            id: recipe_step_ingredient_id,
            belongs_to_recipe_step: recipe_step_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::RecipeStepProduct {
            recipe_step_id,
            recipe_step_product_id,
        } => RecipeStepProduct {
            id: recipe_step_product_id,
            belongs_to_recipe_step: recipe_step_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::MealPlan { meal_plan_id } => MealPlan {
            id: meal_plan_id,
            belongs_to_household: HOUSEHOLD_ID.into(),
            ..Default::default()
        }
        .into(),
        ArchiveTarget::MealPlanOption {
            meal_plan_id,
            meal_plan_option_id,
        } => MealPlanOption {
            id: meal_plan_option_id,
            belongs_to_meal_plan: meal_plan_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::MealPlanOptionVote {
            meal_plan_option_id,
            meal_plan_option_vote_id,
        } => MealPlanOptionVote {
            id: meal_plan_option_vote_id,
            belongs_to_meal_plan_option: meal_plan_option_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::ValidIngredient { valid_ingredient_id } => ValidIngredient {
            id: valid_ingredient_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::ValidInstrument { valid_instrument_id } => ValidInstrument {
            id: valid_instrument_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::ValidPreparation {
            valid_preparation_id,
        } => ValidPreparation {
            id: valid_preparation_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::ValidIngredientPreparation {
            valid_ingredient_preparation_id,
        } => ValidIngredientPreparation {
            id: valid_ingredient_preparation_id,
            ..Default::default()
        }
        .into(),
        ArchiveTarget::Webhook { webhook_id } => Webhook {
            id: webhook_id,
            belongs_to_household: HOUSEHOLD_ID.into(),
            ..Default::default()
        }
        .into(),
    }
}

/// Seed the meal plan and option a vote envelope refers to, with a household
/// of the given members.
pub fn ballot(meal_plan_id: &str, option_ids: &[&str], members: &[&str]) -> MemoryDataManager {
    let mut dm = MemoryDataManager::new()
        .with_household(HOUSEHOLD_ID, members)
        .seed(MealPlan {
            id: meal_plan_id.into(),
            belongs_to_household: HOUSEHOLD_ID.into(),
            ..Default::default()
        });
    for option_id in option_ids {
        dm = dm.seed(MealPlanOption {
            id: option_id.to_string(),
            belongs_to_meal_plan: meal_plan_id.into(),
            ..Default::default()
        });
    }
    dm
}

/// A vote by `by_user` on `option_id`.
pub fn vote_on(vote_id: &str, option_id: &str, by_user: &str) -> MealPlanOptionVoteDatabaseCreationInput {
    MealPlanOptionVoteDatabaseCreationInput {
        id: vote_id.into(),
        belongs_to_meal_plan_option: option_id.into(),
        by_user: by_user.into(),
        ..Default::default()
    }
}
