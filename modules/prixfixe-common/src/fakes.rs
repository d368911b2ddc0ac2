//! Fixture builders for tests.
//!
//! Every builder returns a fully populated value with fresh IDs, so tests only
//! override the fields they care about:
//!
//! ```ignore
//! let input = RecipeDatabaseCreationInput { name: "soup".into(), ..fakes::recipe_input() };
//! ```

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::messages::*;
use crate::types::*;

pub const USER_ID: &str = "user-fixture";
pub const HOUSEHOLD_ID: &str = "household-fixture";

pub fn id() -> String {
    Uuid::new_v4().to_string()
}

// --- Creation inputs ---

pub fn meal_input() -> MealDatabaseCreationInput {
    MealDatabaseCreationInput {
        id: id(),
        name: "Sunday roast".into(),
        description: "roast chicken with potatoes".into(),
        created_by_user: USER_ID.into(),
        recipe_ids: vec![id(), id()],
    }
}

pub fn recipe_input() -> RecipeDatabaseCreationInput {
    RecipeDatabaseCreationInput {
        id: id(),
        name: "Roast chicken".into(),
        slug: "roast-chicken".into(),
        source: "grandma".into(),
        description: "a whole bird".into(),
        inspired_by_recipe_id: None,
        yields_portions: 4,
        seal_of_approval: false,
        created_by_user: USER_ID.into(),
    }
}

pub fn recipe_step_input() -> RecipeStepDatabaseCreationInput {
    RecipeStepDatabaseCreationInput {
        id: id(),
        index: 0,
        preparation_id: id(),
        notes: "preheat".into(),
        minimum_estimated_time_in_seconds: Some(300),
        maximum_estimated_time_in_seconds: Some(600),
        minimum_temperature_in_celsius: Some(200.0),
        maximum_temperature_in_celsius: None,
        optional: false,
        belongs_to_recipe: id(),
    }
}

pub fn recipe_step_instrument_input() -> RecipeStepInstrumentDatabaseCreationInput {
    RecipeStepInstrumentDatabaseCreationInput {
        id: id(),
        instrument_id: Some(id()),
        name: "roasting pan".into(),
        notes: String::new(),
        preference_rank: 1,
        optional: false,
        minimum_quantity: 1,
        belongs_to_recipe_step: id(),
    }
}

pub fn recipe_step_ingredient_input() -> RecipeStepIngredientDatabaseCreationInput {
    RecipeStepIngredientDatabaseCreationInput {
        id: id(),
        ingredient_id: Some(id()),
        name: "chicken".into(),
        measurement_unit_id: id(),
        minimum_quantity: 1.0,
        maximum_quantity: None,
        quantity_notes: String::new(),
        ingredient_notes: "free range".into(),
        product_of_recipe_step: false,
        optional: false,
        belongs_to_recipe_step: id(),
    }
}

pub fn recipe_step_product_input() -> RecipeStepProductDatabaseCreationInput {
    RecipeStepProductDatabaseCreationInput {
        id: id(),
        name: "roasted chicken".into(),
        kind: RecipeStepProductType::Ingredient,
        measurement_unit_id: None,
        quantity_notes: String::new(),
        belongs_to_recipe_step: id(),
    }
}

pub fn meal_plan_input() -> MealPlanDatabaseCreationInput {
    MealPlanDatabaseCreationInput {
        id: id(),
        notes: "this week".into(),
        voting_deadline: Utc::now() + Duration::days(2),
        belongs_to_household: HOUSEHOLD_ID.into(),
    }
}

pub fn meal_plan_option_input() -> MealPlanOptionDatabaseCreationInput {
    MealPlanOptionDatabaseCreationInput {
        id: id(),
        meal_id: id(),
        meal_name: "Sunday roast".into(),
        notes: String::new(),
        belongs_to_meal_plan: id(),
    }
}

pub fn meal_plan_option_vote_input() -> MealPlanOptionVoteDatabaseCreationInput {
    MealPlanOptionVoteDatabaseCreationInput {
        id: id(),
        rank: 0,
        abstain: false,
        notes: String::new(),
        by_user: USER_ID.into(),
        belongs_to_meal_plan_option: id(),
    }
}

pub fn valid_ingredient_input() -> ValidIngredientDatabaseCreationInput {
    ValidIngredientDatabaseCreationInput {
        id: id(),
        name: "flour".into(),
        plural_name: "flours".into(),
        variant: "all-purpose".into(),
        description: "milled wheat".into(),
        warning: "contains gluten".into(),
        icon_path: "icons/flour.svg".into(),
        contains_wheat: true,
        contains_gluten: true,
        is_measured_volumetrically: true,
        ..Default::default()
    }
}

pub fn valid_instrument_input() -> ValidInstrumentDatabaseCreationInput {
    ValidInstrumentDatabaseCreationInput {
        id: id(),
        name: "whisk".into(),
        plural_name: "whisks".into(),
        variant: "balloon".into(),
        description: "for aerating".into(),
        icon_path: "icons/whisk.svg".into(),
        usable_for_storage: false,
    }
}

pub fn valid_preparation_input() -> ValidPreparationDatabaseCreationInput {
    ValidPreparationDatabaseCreationInput {
        id: id(),
        name: "dice".into(),
        past_tense: "diced".into(),
        description: "cut into cubes".into(),
        icon_path: "icons/dice.svg".into(),
        yields_nothing: false,
        restrict_to_ingredients: true,
    }
}

pub fn valid_ingredient_preparation_input() -> ValidIngredientPreparationDatabaseCreationInput {
    ValidIngredientPreparationDatabaseCreationInput {
        id: id(),
        notes: String::new(),
        valid_preparation_id: id(),
        valid_ingredient_id: id(),
    }
}

pub fn household_invitation_input() -> HouseholdInvitationDatabaseCreationInput {
    HouseholdInvitationDatabaseCreationInput {
        id: id(),
        destination_household: HOUSEHOLD_ID.into(),
        from_user: USER_ID.into(),
        to_email: "friend@example.com".into(),
        to_user: None,
        note: "join us".into(),
        token: id(),
        expires_at: Utc::now() + Duration::days(7),
    }
}

pub fn webhook_input() -> WebhookDatabaseCreationInput {
    WebhookDatabaseCreationInput {
        id: id(),
        name: "notify".into(),
        content_type: "application/json".into(),
        url: "https://hooks.example.com/prixfixe".into(),
        method: "POST".into(),
        events: vec!["create".into()],
        data_types: vec!["recipe".into()],
        topics: vec!["recipes".into()],
        belongs_to_household: HOUSEHOLD_ID.into(),
    }
}

// --- Entities ---
//
// Stored entities as a data manager would return them.

pub fn recipe() -> Recipe {
    Recipe {
        created_at: Utc::now(),
        ..Recipe::from(recipe_input())
    }
}

pub fn recipe_step() -> RecipeStep {
    RecipeStep {
        created_at: Utc::now(),
        ..RecipeStep::from(recipe_step_input())
    }
}

pub fn recipe_step_instrument() -> RecipeStepInstrument {
    RecipeStepInstrument {
        created_at: Utc::now(),
        ..RecipeStepInstrument::from(recipe_step_instrument_input())
    }
}

pub fn recipe_step_ingredient() -> RecipeStepIngredient {
    RecipeStepIngredient {
        created_at: Utc::now(),
        ..RecipeStepIngredient::from(recipe_step_ingredient_input())
    }
}

pub fn recipe_step_product() -> RecipeStepProduct {
    RecipeStepProduct {
        created_at: Utc::now(),
        ..RecipeStepProduct::from(recipe_step_product_input())
    }
}

pub fn meal_plan() -> MealPlan {
    MealPlan {
        created_at: Utc::now(),
        ..MealPlan::from(meal_plan_input())
    }
}

pub fn meal_plan_option() -> MealPlanOption {
    MealPlanOption {
        created_at: Utc::now(),
        ..MealPlanOption::from(meal_plan_option_input())
    }
}

pub fn meal_plan_option_vote() -> MealPlanOptionVote {
    MealPlanOptionVote {
        created_at: Utc::now(),
        ..MealPlanOptionVote::from(meal_plan_option_vote_input())
    }
}

pub fn valid_ingredient() -> ValidIngredient {
    ValidIngredient {
        created_at: Utc::now(),
        ..ValidIngredient::from(valid_ingredient_input())
    }
}

pub fn valid_instrument() -> ValidInstrument {
    ValidInstrument {
        created_at: Utc::now(),
        ..ValidInstrument::from(valid_instrument_input())
    }
}

pub fn valid_preparation() -> ValidPreparation {
    ValidPreparation {
        created_at: Utc::now(),
        ..ValidPreparation::from(valid_preparation_input())
    }
}

pub fn valid_ingredient_preparation() -> ValidIngredientPreparation {
    ValidIngredientPreparation {
        created_at: Utc::now(),
        ..ValidIngredientPreparation::from(valid_ingredient_preparation_input())
    }
}

// --- Envelopes ---

pub fn pre_write(payload: PreWrite) -> PreWriteMessage {
    PreWriteMessage {
        attributable_to_user_id: USER_ID.into(),
        attributable_to_household_id: HOUSEHOLD_ID.into(),
        payload,
    }
}

/// A vote envelope naming the plan the voted-on option belongs to.
pub fn pre_write_vote(
    meal_plan_id: &str,
    vote: MealPlanOptionVoteDatabaseCreationInput,
) -> PreWriteMessage {
    pre_write(PreWrite::MealPlanOptionVote {
        meal_plan_id: meal_plan_id.to_string(),
        vote,
    })
}

pub fn pre_update(payload: PreUpdate) -> PreUpdateMessage {
    PreUpdateMessage {
        attributable_to_user_id: USER_ID.into(),
        attributable_to_household_id: HOUSEHOLD_ID.into(),
        payload,
    }
}

pub fn pre_archive(target: ArchiveTarget) -> PreArchiveMessage {
    PreArchiveMessage {
        attributable_to_user_id: USER_ID.into(),
        attributable_to_household_id: HOUSEHOLD_ID.into(),
        target,
    }
}

/// A fresh creation envelope for `data_type`, or `None` if pre-writes never
/// carry it.
pub fn pre_write_for(data_type: DataType) -> Option<PreWriteMessage> {
    let payload = match data_type {
        DataType::Meal => PreWrite::Meal(meal_input()),
        DataType::Recipe => PreWrite::Recipe(recipe_input()),
        DataType::RecipeStep => PreWrite::RecipeStep(recipe_step_input()),
        DataType::RecipeStepInstrument => {
            PreWrite::RecipeStepInstrument(recipe_step_instrument_input())
        }
        DataType::RecipeStepIngredient => {
            PreWrite::RecipeStepIngredient(recipe_step_ingredient_input())
        }
        DataType::RecipeStepProduct => PreWrite::RecipeStepProduct(recipe_step_product_input()),
        DataType::MealPlan => PreWrite::MealPlan(meal_plan_input()),
        DataType::MealPlanOption => PreWrite::MealPlanOption(meal_plan_option_input()),
        DataType::MealPlanOptionVote => {
            return Some(pre_write_vote(&id(), meal_plan_option_vote_input()))
        }
        DataType::ValidIngredient => PreWrite::ValidIngredient(valid_ingredient_input()),
        DataType::ValidInstrument => PreWrite::ValidInstrument(valid_instrument_input()),
        DataType::ValidPreparation => PreWrite::ValidPreparation(valid_preparation_input()),
        DataType::ValidIngredientPreparation => {
            PreWrite::ValidIngredientPreparation(valid_ingredient_preparation_input())
        }
        DataType::HouseholdInvitation => {
            PreWrite::HouseholdInvitation(household_invitation_input())
        }
        DataType::Webhook => PreWrite::Webhook(webhook_input()),
        DataType::UserMembership => return None,
    };
    Some(pre_write(payload))
}

/// A fresh update envelope for `data_type`, or `None` if pre-updates never
/// carry it.
pub fn pre_update_for(data_type: DataType) -> Option<PreUpdateMessage> {
    let payload = match data_type {
        DataType::Recipe => PreUpdate::Recipe(recipe()),
        DataType::RecipeStep => PreUpdate::RecipeStep(recipe_step()),
        DataType::RecipeStepInstrument => PreUpdate::RecipeStepInstrument(recipe_step_instrument()),
        DataType::RecipeStepIngredient => PreUpdate::RecipeStepIngredient(recipe_step_ingredient()),
        DataType::RecipeStepProduct => PreUpdate::RecipeStepProduct(recipe_step_product()),
        DataType::MealPlan => PreUpdate::MealPlan(meal_plan()),
        DataType::MealPlanOption => PreUpdate::MealPlanOption(meal_plan_option()),
        DataType::MealPlanOptionVote => PreUpdate::MealPlanOptionVote(meal_plan_option_vote()),
        DataType::ValidIngredient => PreUpdate::ValidIngredient(valid_ingredient()),
        DataType::ValidInstrument => PreUpdate::ValidInstrument(valid_instrument()),
        DataType::ValidPreparation => PreUpdate::ValidPreparation(valid_preparation()),
        DataType::ValidIngredientPreparation => {
            PreUpdate::ValidIngredientPreparation(valid_ingredient_preparation())
        }
        DataType::Meal
        | DataType::HouseholdInvitation
        | DataType::UserMembership
        | DataType::Webhook => return None,
    };
    Some(pre_update(payload))
}

/// A fresh archive envelope for `data_type`, or `None` if pre-archives never
/// carry it.
pub fn pre_archive_for(data_type: DataType) -> Option<PreArchiveMessage> {
    let target = match data_type {
        DataType::Meal => ArchiveTarget::Meal { meal_id: id() },
        DataType::MealPlan => ArchiveTarget::MealPlan { meal_plan_id: id() },
        DataType::MealPlanOption => ArchiveTarget::MealPlanOption {
            meal_plan_id: id(),
            meal_plan_option_id: id(),
        },
        DataType::MealPlanOptionVote => ArchiveTarget::MealPlanOptionVote {
            meal_plan_option_id: id(),
            meal_plan_option_vote_id: id(),
        },
        DataType::Recipe => ArchiveTarget::Recipe { recipe_id: id() },
        DataType::RecipeStep => ArchiveTarget::RecipeStep {
            recipe_id: id(),
            recipe_step_id: id(),
        },
        DataType::RecipeStepInstrument => ArchiveTarget::RecipeStepInstrument {
            recipe_step_id: id(),
            recipe_step_instrument_id: id(),
        },
        DataType::RecipeStepIngredient => ArchiveTarget::RecipeStepIngredient {
            recipe_step_id: id(),
            recipe_step_ingredient_id: id(),
        },
        DataType::RecipeStepProduct => ArchiveTarget::RecipeStepProduct {
            recipe_step_id: id(),
            recipe_step_product_id: id(),
        },
        DataType::ValidIngredient => ArchiveTarget::ValidIngredient {
            valid_ingredient_id: id(),
        },
        DataType::ValidInstrument => ArchiveTarget::ValidInstrument {
            valid_instrument_id: id(),
        },
        DataType::ValidPreparation => ArchiveTarget::ValidPreparation {
            valid_preparation_id: id(),
        },
        DataType::ValidIngredientPreparation => ArchiveTarget::ValidIngredientPreparation {
            valid_ingredient_preparation_id: id(),
        },
        DataType::Webhook => ArchiveTarget::Webhook { webhook_id: id() },
        DataType::HouseholdInvitation | DataType::UserMembership => return None,
    };
    Some(pre_archive(target))
}

/// Serialize an envelope to the bytes a worker consumes.
pub fn to_bytes<T: serde::Serialize>(envelope: &T) -> Vec<u8> {
    serde_json::to_vec(envelope).unwrap_or_default()
}
