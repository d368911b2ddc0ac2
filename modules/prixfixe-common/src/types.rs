use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PrixFixeError;

// --- Data types ---

/// The closed set of entity kinds a mutation message can name.
///
/// The serde form is the wire tag carried in `dataType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Meal,
    Recipe,
    RecipeStep,
    RecipeStepInstrument,
    RecipeStepIngredient,
    RecipeStepProduct,
    MealPlan,
    MealPlanOption,
    MealPlanOptionVote,
    ValidIngredient,
    ValidInstrument,
    ValidPreparation,
    ValidIngredientPreparation,
    HouseholdInvitation,
    UserMembership,
    Webhook,
}

impl DataType {
    pub const ALL: [DataType; 16] = [
        DataType::Meal,
        DataType::Recipe,
        DataType::RecipeStep,
        DataType::RecipeStepInstrument,
        DataType::RecipeStepIngredient,
        DataType::RecipeStepProduct,
        DataType::MealPlan,
        DataType::MealPlanOption,
        DataType::MealPlanOptionVote,
        DataType::ValidIngredient,
        DataType::ValidInstrument,
        DataType::ValidPreparation,
        DataType::ValidIngredientPreparation,
        DataType::HouseholdInvitation,
        DataType::UserMembership,
        DataType::Webhook,
    ];

    /// Wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Meal => "meal",
            DataType::Recipe => "recipe",
            DataType::RecipeStep => "recipe_step",
            DataType::RecipeStepInstrument => "recipe_step_instrument",
            DataType::RecipeStepIngredient => "recipe_step_ingredient",
            DataType::RecipeStepProduct => "recipe_step_product",
            DataType::MealPlan => "meal_plan",
            DataType::MealPlanOption => "meal_plan_option",
            DataType::MealPlanOptionVote => "meal_plan_option_vote",
            DataType::ValidIngredient => "valid_ingredient",
            DataType::ValidInstrument => "valid_instrument",
            DataType::ValidPreparation => "valid_preparation",
            DataType::ValidIngredientPreparation => "valid_ingredient_preparation",
            DataType::HouseholdInvitation => "household_invitation",
            DataType::UserMembership => "user_membership",
            DataType::Webhook => "webhook",
        }
    }

    /// Human-readable name used in log lines and error context.
    pub fn noun(&self) -> &'static str {
        match self {
            DataType::Meal => "meal",
            DataType::Recipe => "recipe",
            DataType::RecipeStep => "recipe step",
            DataType::RecipeStepInstrument => "recipe step instrument",
            DataType::RecipeStepIngredient => "recipe step ingredient",
            DataType::RecipeStepProduct => "recipe step product",
            DataType::MealPlan => "meal plan",
            DataType::MealPlanOption => "meal plan option",
            DataType::MealPlanOptionVote => "meal plan option vote",
            DataType::ValidIngredient => "valid ingredient",
            DataType::ValidInstrument => "valid instrument",
            DataType::ValidPreparation => "valid preparation",
            DataType::ValidIngredientPreparation => "valid ingredient preparation",
            DataType::HouseholdInvitation => "household invitation",
            DataType::UserMembership => "user membership",
            DataType::Webhook => "webhook",
        }
    }

    /// Whether entities of this type are mirrored into a search index.
    pub fn is_searchable(&self) -> bool {
        matches!(
            self,
            DataType::ValidIngredient | DataType::ValidInstrument | DataType::ValidPreparation
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = PrixFixeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|dt| dt.as_str() == s)
            .ok_or_else(|| PrixFixeError::UnknownDataType(s.to_string()))
    }
}

// --- Enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealPlanStatus {
    #[default]
    AwaitingVotes,
    Finalized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeStepProductType {
    #[default]
    Ingredient,
    Instrument,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdInvitationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// Anything stored under a stable string ID.
pub trait Record {
    fn id(&self) -> &str;
}

// --- Meals ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by_user: String,
    #[serde(rename = "recipeIDs")]
    pub recipe_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealDatabaseCreationInput {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by_user: String,
    #[serde(rename = "recipeIDs")]
    pub recipe_ids: Vec<String>,
}

// --- Recipes ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub source: String,
    pub description: String,
    #[serde(rename = "inspiredByRecipeID")]
    pub inspired_by_recipe_id: Option<String>,
    pub yields_portions: u32,
    pub seal_of_approval: bool,
    pub created_by_user: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeDatabaseCreationInput {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub source: String,
    pub description: String,
    #[serde(rename = "inspiredByRecipeID")]
    pub inspired_by_recipe_id: Option<String>,
    pub yields_portions: u32,
    pub seal_of_approval: bool,
    pub created_by_user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStep {
    pub id: String,
    pub index: u32,
    #[serde(rename = "preparationID")]
    pub preparation_id: String,
    pub notes: String,
    pub minimum_estimated_time_in_seconds: Option<u32>,
    pub maximum_estimated_time_in_seconds: Option<u32>,
    pub minimum_temperature_in_celsius: Option<f32>,
    pub maximum_temperature_in_celsius: Option<f32>,
    pub optional: bool,
    pub belongs_to_recipe: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepDatabaseCreationInput {
    pub id: String,
    pub index: u32,
    #[serde(rename = "preparationID")]
    pub preparation_id: String,
    pub notes: String,
    pub minimum_estimated_time_in_seconds: Option<u32>,
    pub maximum_estimated_time_in_seconds: Option<u32>,
    pub minimum_temperature_in_celsius: Option<f32>,
    pub maximum_temperature_in_celsius: Option<f32>,
    pub optional: bool,
    pub belongs_to_recipe: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepInstrument {
    pub id: String,
    #[serde(rename = "instrumentID")]
    pub instrument_id: Option<String>,
    pub name: String,
    pub notes: String,
    pub preference_rank: u8,
    pub optional: bool,
    pub minimum_quantity: u32,
    pub belongs_to_recipe_step: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepInstrumentDatabaseCreationInput {
    pub id: String,
    #[serde(rename = "instrumentID")]
    pub instrument_id: Option<String>,
    pub name: String,
    pub notes: String,
    pub preference_rank: u8,
    pub optional: bool,
    pub minimum_quantity: u32,
    pub belongs_to_recipe_step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepIngredient {
    pub id: String,
    #[serde(rename = "ingredientID")]
    pub ingredient_id: Option<String>,
    pub name: String,
    #[serde(rename = "measurementUnitID")]
    pub measurement_unit_id: String,
    pub minimum_quantity: f32,
    pub maximum_quantity: Option<f32>,
    pub quantity_notes: String,
    pub ingredient_notes: String,
    pub product_of_recipe_step: bool,
    pub optional: bool,
    pub belongs_to_recipe_step: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepIngredientDatabaseCreationInput {
    pub id: String,
    #[serde(rename = "ingredientID")]
    pub ingredient_id: Option<String>,
    pub name: String,
    #[serde(rename = "measurementUnitID")]
    pub measurement_unit_id: String,
    pub minimum_quantity: f32,
    pub maximum_quantity: Option<f32>,
    pub quantity_notes: String,
    pub ingredient_notes: String,
    pub product_of_recipe_step: bool,
    pub optional: bool,
    pub belongs_to_recipe_step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepProduct {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecipeStepProductType,
    #[serde(rename = "measurementUnitID")]
    pub measurement_unit_id: Option<String>,
    pub quantity_notes: String,
    pub belongs_to_recipe_step: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeStepProductDatabaseCreationInput {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RecipeStepProductType,
    #[serde(rename = "measurementUnitID")]
    pub measurement_unit_id: Option<String>,
    pub quantity_notes: String,
    pub belongs_to_recipe_step: String,
}

// --- Meal planning ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPlan {
    pub id: String,
    pub notes: String,
    pub status: MealPlanStatus,
    pub voting_deadline: DateTime<Utc>,
    pub belongs_to_household: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPlanDatabaseCreationInput {
    pub id: String,
    pub notes: String,
    pub voting_deadline: DateTime<Utc>,
    pub belongs_to_household: String,
}

/// One candidate meal on a plan. `chosen` marks the option as finalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPlanOption {
    pub id: String,
    #[serde(rename = "mealID")]
    pub meal_id: String,
    pub meal_name: String,
    pub notes: String,
    pub chosen: bool,
    pub tiebroken: bool,
    pub belongs_to_meal_plan: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPlanOptionDatabaseCreationInput {
    pub id: String,
    #[serde(rename = "mealID")]
    pub meal_id: String,
    pub meal_name: String,
    pub notes: String,
    pub belongs_to_meal_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPlanOptionVote {
    pub id: String,
    pub rank: u8,
    pub abstain: bool,
    pub notes: String,
    pub by_user: String,
    pub belongs_to_meal_plan_option: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MealPlanOptionVoteDatabaseCreationInput {
    pub id: String,
    pub rank: u8,
    pub abstain: bool,
    pub notes: String,
    pub by_user: String,
    pub belongs_to_meal_plan_option: String,
}

// --- Valid enumerations (searchable) ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidIngredient {
    pub id: String,
    pub name: String,
    pub plural_name: String,
    pub variant: String,
    pub description: String,
    pub warning: String,
    pub icon_path: String,
    pub contains_dairy: bool,
    pub contains_peanut: bool,
    pub contains_tree_nut: bool,
    pub contains_egg: bool,
    pub contains_wheat: bool,
    pub contains_shellfish: bool,
    pub contains_sesame: bool,
    pub contains_fish: bool,
    pub contains_gluten: bool,
    pub contains_soy: bool,
    pub animal_flesh: bool,
    pub animal_derived: bool,
    pub is_liquid: bool,
    pub is_measured_volumetrically: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidIngredientDatabaseCreationInput {
    pub id: String,
    pub name: String,
    pub plural_name: String,
    pub variant: String,
    pub description: String,
    pub warning: String,
    pub icon_path: String,
    pub contains_dairy: bool,
    pub contains_peanut: bool,
    pub contains_tree_nut: bool,
    pub contains_egg: bool,
    pub contains_wheat: bool,
    pub contains_shellfish: bool,
    pub contains_sesame: bool,
    pub contains_fish: bool,
    pub contains_gluten: bool,
    pub contains_soy: bool,
    pub animal_flesh: bool,
    pub animal_derived: bool,
    pub is_liquid: bool,
    pub is_measured_volumetrically: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidInstrument {
    pub id: String,
    pub name: String,
    pub plural_name: String,
    pub variant: String,
    pub description: String,
    pub icon_path: String,
    pub usable_for_storage: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidInstrumentDatabaseCreationInput {
    pub id: String,
    pub name: String,
    pub plural_name: String,
    pub variant: String,
    pub description: String,
    pub icon_path: String,
    pub usable_for_storage: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidPreparation {
    pub id: String,
    pub name: String,
    pub past_tense: String,
    pub description: String,
    pub icon_path: String,
    pub yields_nothing: bool,
    pub restrict_to_ingredients: bool,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidPreparationDatabaseCreationInput {
    pub id: String,
    pub name: String,
    pub past_tense: String,
    pub description: String,
    pub icon_path: String,
    pub yields_nothing: bool,
    pub restrict_to_ingredients: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidIngredientPreparation {
    pub id: String,
    pub notes: String,
    #[serde(rename = "validPreparationID")]
    pub valid_preparation_id: String,
    #[serde(rename = "validIngredientID")]
    pub valid_ingredient_id: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidIngredientPreparationDatabaseCreationInput {
    pub id: String,
    pub notes: String,
    #[serde(rename = "validPreparationID")]
    pub valid_preparation_id: String,
    #[serde(rename = "validIngredientID")]
    pub valid_ingredient_id: String,
}

// --- Households and webhooks ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HouseholdInvitation {
    pub id: String,
    pub destination_household: String,
    pub from_user: String,
    pub to_email: String,
    pub to_user: Option<String>,
    pub note: String,
    pub token: String,
    pub status: HouseholdInvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HouseholdInvitationDatabaseCreationInput {
    pub id: String,
    pub destination_household: String,
    pub from_user: String,
    pub to_email: String,
    pub to_user: Option<String>,
    pub note: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub url: String,
    pub method: String,
    pub events: Vec<String>,
    pub data_types: Vec<String>,
    pub topics: Vec<String>,
    pub belongs_to_household: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookDatabaseCreationInput {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub url: String,
    pub method: String,
    pub events: Vec<String>,
    pub data_types: Vec<String>,
    pub topics: Vec<String>,
    pub belongs_to_household: String,
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
            }
        )*
    };
}

impl_record!(
    Meal,
    Recipe,
    RecipeStep,
    RecipeStepInstrument,
    RecipeStepIngredient,
    RecipeStepProduct,
    MealPlan,
    MealPlanOption,
    MealPlanOptionVote,
    ValidIngredient,
    ValidInstrument,
    ValidPreparation,
    ValidIngredientPreparation,
    HouseholdInvitation,
    Webhook,
);

// --- Materialization ---
//
// A creation input becomes the stored entity with the same ID. Timestamps are
// left for the data manager to stamp.

impl From<MealDatabaseCreationInput> for Meal {
    fn from(input: MealDatabaseCreationInput) -> Self {
        Meal {
            id: input.id,
            name: input.name,
            description: input.description,
            created_by_user: input.created_by_user,
            recipe_ids: input.recipe_ids,
            ..Default::default()
        }
    }
}

impl From<RecipeDatabaseCreationInput> for Recipe {
    fn from(input: RecipeDatabaseCreationInput) -> Self {
        Recipe {
            id: input.id,
            name: input.name,
            slug: input.slug,
            source: input.source,
            description: input.description,
            inspired_by_recipe_id: input.inspired_by_recipe_id,
            yields_portions: input.yields_portions,
            seal_of_approval: input.seal_of_approval,
            created_by_user: input.created_by_user,
            ..Default::default()
        }
    }
}

impl From<RecipeStepDatabaseCreationInput> for RecipeStep {
    fn from(input: RecipeStepDatabaseCreationInput) -> Self {
        RecipeStep {
            id: input.id,
            index: input.index,
            preparation_id: input.preparation_id,
            notes: input.notes,
            minimum_estimated_time_in_seconds: input.minimum_estimated_time_in_seconds,
            maximum_estimated_time_in_seconds: input.maximum_estimated_time_in_seconds,
            minimum_temperature_in_celsius: input.minimum_temperature_in_celsius,
            maximum_temperature_in_celsius: input.maximum_temperature_in_celsius,
            optional: input.optional,
            belongs_to_recipe: input.belongs_to_recipe,
            ..Default::default()
        }
    }
}

impl From<RecipeStepInstrumentDatabaseCreationInput> for RecipeStepInstrument {
    fn from(input: RecipeStepInstrumentDatabaseCreationInput) -> Self {
        RecipeStepInstrument {
            id: input.id,
            instrument_id: input.instrument_id,
            name: input.name,
            notes: input.notes,
            preference_rank: input.preference_rank,
            optional: input.optional,
            minimum_quantity: input.minimum_quantity,
            belongs_to_recipe_step: input.belongs_to_recipe_step,
            ..Default::default()
        }
    }
}

impl From<RecipeStepIngredientDatabaseCreationInput> for RecipeStepIngredient {
    fn from(input: RecipeStepIngredientDatabaseCreationInput) -> Self {
        RecipeStepIngredient {
            id: input.id,
            ingredient_id: input.ingredient_id,
            name: input.name,
            measurement_unit_id: input.measurement_unit_id,
            minimum_quantity: input.minimum_quantity,
            maximum_quantity: input.maximum_quantity,
            quantity_notes: input.quantity_notes,
            ingredient_notes: input.ingredient_notes,
            product_of_recipe_step: input.product_of_recipe_step,
            optional: input.optional,
            belongs_to_recipe_step: input.belongs_to_recipe_step,
            ..Default::default()
        }
    }
}

impl From<RecipeStepProductDatabaseCreationInput> for RecipeStepProduct {
    fn from(input: RecipeStepProductDatabaseCreationInput) -> Self {
        RecipeStepProduct {
            id: input.id,
            name: input.name,
            kind: input.kind,
            measurement_unit_id: input.measurement_unit_id,
            quantity_notes: input.quantity_notes,
            belongs_to_recipe_step: input.belongs_to_recipe_step,
            ..Default::default()
        }
    }
}

impl From<MealPlanDatabaseCreationInput> for MealPlan {
    fn from(input: MealPlanDatabaseCreationInput) -> Self {
        MealPlan {
            id: input.id,
            notes: input.notes,
            status: MealPlanStatus::AwaitingVotes,
            voting_deadline: input.voting_deadline,
            belongs_to_household: input.belongs_to_household,
            ..Default::default()
        }
    }
}

impl From<MealPlanOptionDatabaseCreationInput> for MealPlanOption {
    fn from(input: MealPlanOptionDatabaseCreationInput) -> Self {
        MealPlanOption {
            id: input.id,
            meal_id: input.meal_id,
            meal_name: input.meal_name,
            notes: input.notes,
            belongs_to_meal_plan: input.belongs_to_meal_plan,
            ..Default::default()
        }
    }
}

impl From<MealPlanOptionVoteDatabaseCreationInput> for MealPlanOptionVote {
    fn from(input: MealPlanOptionVoteDatabaseCreationInput) -> Self {
        MealPlanOptionVote {
            id: input.id,
            rank: input.rank,
            abstain: input.abstain,
            notes: input.notes,
            by_user: input.by_user,
            belongs_to_meal_plan_option: input.belongs_to_meal_plan_option,
            ..Default::default()
        }
    }
}

impl From<ValidIngredientDatabaseCreationInput> for ValidIngredient {
    fn from(input: ValidIngredientDatabaseCreationInput) -> Self {
        ValidIngredient {
            id: input.id,
            name: input.name,
            plural_name: input.plural_name,
            variant: input.variant,
            description: input.description,
            warning: input.warning,
            icon_path: input.icon_path,
            contains_dairy: input.contains_dairy,
            contains_peanut: input.contains_peanut,
            contains_tree_nut: input.contains_tree_nut,
            contains_egg: input.contains_egg,
            contains_wheat: input.contains_wheat,
            contains_shellfish: input.contains_shellfish,
            contains_sesame: input.contains_sesame,
            contains_fish: input.contains_fish,
            contains_gluten: input.contains_gluten,
            contains_soy: input.contains_soy,
            animal_flesh: input.animal_flesh,
            animal_derived: input.animal_derived,
            is_liquid: input.is_liquid,
            is_measured_volumetrically: input.is_measured_volumetrically,
            ..Default::default()
        }
    }
}

impl From<ValidInstrumentDatabaseCreationInput> for ValidInstrument {
    fn from(input: ValidInstrumentDatabaseCreationInput) -> Self {
        ValidInstrument {
            id: input.id,
            name: input.name,
            plural_name: input.plural_name,
            variant: input.variant,
            description: input.description,
            icon_path: input.icon_path,
            usable_for_storage: input.usable_for_storage,
            ..Default::default()
        }
    }
}

impl From<ValidPreparationDatabaseCreationInput> for ValidPreparation {
    fn from(input: ValidPreparationDatabaseCreationInput) -> Self {
        ValidPreparation {
            id: input.id,
            name: input.name,
            past_tense: input.past_tense,
            description: input.description,
            icon_path: input.icon_path,
            yields_nothing: input.yields_nothing,
            restrict_to_ingredients: input.restrict_to_ingredients,
            ..Default::default()
        }
    }
}

impl From<ValidIngredientPreparationDatabaseCreationInput> for ValidIngredientPreparation {
    fn from(input: ValidIngredientPreparationDatabaseCreationInput) -> Self {
        ValidIngredientPreparation {
            id: input.id,
            notes: input.notes,
            valid_preparation_id: input.valid_preparation_id,
            valid_ingredient_id: input.valid_ingredient_id,
            ..Default::default()
        }
    }
}

impl From<HouseholdInvitationDatabaseCreationInput> for HouseholdInvitation {
    fn from(input: HouseholdInvitationDatabaseCreationInput) -> Self {
        HouseholdInvitation {
            id: input.id,
            destination_household: input.destination_household,
            from_user: input.from_user,
            to_email: input.to_email,
            to_user: input.to_user,
            note: input.note,
            token: input.token,
            status: HouseholdInvitationStatus::Pending,
            expires_at: input.expires_at,
            ..Default::default()
        }
    }
}

impl From<WebhookDatabaseCreationInput> for Webhook {
    fn from(input: WebhookDatabaseCreationInput) -> Self {
        Webhook {
            id: input.id,
            name: input.name,
            content_type: input.content_type,
            url: input.url,
            method: input.method,
            events: input.events,
            data_types: input.data_types,
            topics: input.topics,
            belongs_to_household: input.belongs_to_household,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_tags_roundtrip_through_from_str() {
        for dt in DataType::ALL {
            assert_eq!(dt.as_str().parse::<DataType>().unwrap(), dt);
            let json = serde_json::to_value(dt).unwrap();
            assert_eq!(json.as_str().unwrap(), dt.as_str());
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "nonexistent".parse::<DataType>().unwrap_err();
        assert!(matches!(err, PrixFixeError::UnknownDataType(ref tag) if tag == "nonexistent"));
    }

    #[test]
    fn only_valid_enumerations_are_searchable() {
        let searchable: Vec<_> = DataType::ALL
            .into_iter()
            .filter(DataType::is_searchable)
            .collect();
        assert_eq!(
            searchable,
            vec![
                DataType::ValidIngredient,
                DataType::ValidInstrument,
                DataType::ValidPreparation
            ]
        );
    }

    #[test]
    fn id_suffixed_fields_keep_uppercase_id() {
        let step = RecipeStep {
            preparation_id: "prep".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["preparationID"], "prep");
        assert!(json.get("belongsToRecipe").is_some());
    }

    #[test]
    fn missing_payload_fields_default() {
        let recipe: RecipeDatabaseCreationInput =
            serde_json::from_str(r#"{"name":"x","unknownField":true}"#).unwrap();
        assert_eq!(recipe.name, "x");
        assert!(recipe.id.is_empty());
        assert!(recipe.inspired_by_recipe_id.is_none());
    }

    #[test]
    fn creation_input_materializes_with_same_id() {
        let input = ValidIngredientDatabaseCreationInput {
            id: "vi1".into(),
            name: "flour".into(),
            contains_gluten: true,
            ..Default::default()
        };
        let entity = ValidIngredient::from(input);
        assert_eq!(entity.id(), "vi1");
        assert_eq!(entity.name, "flour");
        assert!(entity.contains_gluten);
        assert!(entity.archived_at.is_none());
    }
}
