//! Wire records for the three inbound topics.
//!
//! On the wire every envelope is a flat JSON object: a `dataType` tag, the two
//! attribution IDs, and one populated payload slot named after the entity.
//! In Rust the payload is a sum type, so each worker matches exhaustively on
//! the entities it handles. The flat form lives in private `Raw*` records and
//! is converted with `#[serde(try_from, into)]`.

use serde::{Deserialize, Serialize};

use crate::error::PrixFixeError;
use crate::types::*;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The part of an envelope every worker reads before dispatching.
///
/// `dataType` stays a raw string here so an unrecognized tag can be reported
/// as a dispatch miss rather than a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(rename = "dataType")]
    pub data_type: String,
    #[serde(rename = "attributableToUserID", default)]
    pub attributable_to_user_id: Option<String>,
    #[serde(rename = "attributableToHouseholdID", default)]
    pub attributable_to_household_id: Option<String>,
}

fn missing(data_type: DataType, field: &'static str) -> PrixFixeError {
    PrixFixeError::MissingField {
        data_type: data_type.as_str(),
        field,
    }
}

fn unsupported(data_type: DataType, envelope: &'static str) -> PrixFixeError {
    PrixFixeError::UnsupportedDataType {
        data_type: data_type.as_str(),
        envelope,
    }
}

fn required_id(value: Option<String>, data_type: DataType, field: &'static str) -> Result<String, PrixFixeError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(data_type, field))
}

// ---------------------------------------------------------------------------
// Pre-write
// ---------------------------------------------------------------------------

/// A requested creation, consumed from the pre-writes topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPreWriteMessage", into = "RawPreWriteMessage")]
pub struct PreWriteMessage {
    pub attributable_to_user_id: String,
    pub attributable_to_household_id: String,
    pub payload: PreWrite,
}

impl PreWriteMessage {
    pub fn data_type(&self) -> DataType {
        self.payload.data_type()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreWrite {
    Meal(MealDatabaseCreationInput),
    Recipe(RecipeDatabaseCreationInput),
    RecipeStep(RecipeStepDatabaseCreationInput),
    RecipeStepInstrument(RecipeStepInstrumentDatabaseCreationInput),
    RecipeStepIngredient(RecipeStepIngredientDatabaseCreationInput),
    RecipeStepProduct(RecipeStepProductDatabaseCreationInput),
    MealPlan(MealPlanDatabaseCreationInput),
    MealPlanOption(MealPlanOptionDatabaseCreationInput),
    /// A vote travels with the plan its option belongs to.
    MealPlanOptionVote {
        meal_plan_id: String,
        vote: MealPlanOptionVoteDatabaseCreationInput,
    },
    ValidIngredient(ValidIngredientDatabaseCreationInput),
    ValidInstrument(ValidInstrumentDatabaseCreationInput),
    ValidPreparation(ValidPreparationDatabaseCreationInput),
    ValidIngredientPreparation(ValidIngredientPreparationDatabaseCreationInput),
    HouseholdInvitation(HouseholdInvitationDatabaseCreationInput),
    Webhook(WebhookDatabaseCreationInput),
}

impl PreWrite {
    pub fn data_type(&self) -> DataType {
        match self {
            PreWrite::Meal(_) => DataType::Meal,
            PreWrite::Recipe(_) => DataType::Recipe,
            PreWrite::RecipeStep(_) => DataType::RecipeStep,
            PreWrite::RecipeStepInstrument(_) => DataType::RecipeStepInstrument,
            PreWrite::RecipeStepIngredient(_) => DataType::RecipeStepIngredient,
            PreWrite::RecipeStepProduct(_) => DataType::RecipeStepProduct,
            PreWrite::MealPlan(_) => DataType::MealPlan,
            PreWrite::MealPlanOption(_) => DataType::MealPlanOption,
            PreWrite::MealPlanOptionVote { .. } => DataType::MealPlanOptionVote,
            PreWrite::ValidIngredient(_) => DataType::ValidIngredient,
            PreWrite::ValidInstrument(_) => DataType::ValidInstrument,
            PreWrite::ValidPreparation(_) => DataType::ValidPreparation,
            PreWrite::ValidIngredientPreparation(_) => DataType::ValidIngredientPreparation,
            PreWrite::HouseholdInvitation(_) => DataType::HouseholdInvitation,
            PreWrite::Webhook(_) => DataType::Webhook,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreWriteMessage {
    data_type: Option<DataType>,
    #[serde(rename = "attributableToUserID")]
    attributable_to_user_id: String,
    #[serde(rename = "attributableToHouseholdID")]
    attributable_to_household_id: String,
    #[serde(rename = "mealPlanID", default, skip_serializing_if = "Option::is_none")]
    meal_plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal: Option<MealDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe: Option<RecipeDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step: Option<RecipeStepDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step_instrument: Option<RecipeStepInstrumentDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step_ingredient: Option<RecipeStepIngredientDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step_product: Option<RecipeStepProductDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal_plan: Option<MealPlanDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal_plan_option: Option<MealPlanOptionDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal_plan_option_vote: Option<MealPlanOptionVoteDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_ingredient: Option<ValidIngredientDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_instrument: Option<ValidInstrumentDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_preparation: Option<ValidPreparationDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_ingredient_preparation: Option<ValidIngredientPreparationDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    household_invitation: Option<HouseholdInvitationDatabaseCreationInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    webhook: Option<WebhookDatabaseCreationInput>,
}

impl TryFrom<RawPreWriteMessage> for PreWriteMessage {
    type Error = PrixFixeError;

    fn try_from(raw: RawPreWriteMessage) -> Result<Self, Self::Error> {
        let data_type = raw.data_type.ok_or(PrixFixeError::MissingField {
            data_type: "pre-write",
            field: "dataType",
        })?;

        let payload = match data_type {
            DataType::Meal => raw.meal.map(PreWrite::Meal),
            DataType::Recipe => raw.recipe.map(PreWrite::Recipe),
            DataType::RecipeStep => raw.recipe_step.map(PreWrite::RecipeStep),
            DataType::RecipeStepInstrument => {
                raw.recipe_step_instrument.map(PreWrite::RecipeStepInstrument)
            }
            DataType::RecipeStepIngredient => {
                raw.recipe_step_ingredient.map(PreWrite::RecipeStepIngredient)
            }
            DataType::RecipeStepProduct => raw.recipe_step_product.map(PreWrite::RecipeStepProduct),
            DataType::MealPlan => raw.meal_plan.map(PreWrite::MealPlan),
            DataType::MealPlanOption => raw.meal_plan_option.map(PreWrite::MealPlanOption),
            DataType::MealPlanOptionVote => {
                let meal_plan_id = required_id(raw.meal_plan_id, data_type, "mealPlanID")?;
                raw.meal_plan_option_vote
                    .map(|vote| PreWrite::MealPlanOptionVote { meal_plan_id, vote })
            }
            DataType::ValidIngredient => raw.valid_ingredient.map(PreWrite::ValidIngredient),
            DataType::ValidInstrument => raw.valid_instrument.map(PreWrite::ValidInstrument),
            DataType::ValidPreparation => raw.valid_preparation.map(PreWrite::ValidPreparation),
            DataType::ValidIngredientPreparation => raw
                .valid_ingredient_preparation
                .map(PreWrite::ValidIngredientPreparation),
            DataType::HouseholdInvitation => {
                raw.household_invitation.map(PreWrite::HouseholdInvitation)
            }
            DataType::Webhook => raw.webhook.map(PreWrite::Webhook),
            DataType::UserMembership => return Err(unsupported(data_type, "pre-write")),
        }
        .ok_or_else(|| missing(data_type, payload_slot(data_type)))?;

        Ok(PreWriteMessage {
            attributable_to_user_id: raw.attributable_to_user_id,
            attributable_to_household_id: raw.attributable_to_household_id,
            payload,
        })
    }
}

impl From<PreWriteMessage> for RawPreWriteMessage {
    fn from(msg: PreWriteMessage) -> Self {
        let mut raw = RawPreWriteMessage {
            data_type: Some(msg.data_type()),
            attributable_to_user_id: msg.attributable_to_user_id,
            attributable_to_household_id: msg.attributable_to_household_id,
            ..Default::default()
        };
        match msg.payload {
            PreWrite::Meal(v) => raw.meal = Some(v),
            PreWrite::Recipe(v) => raw.recipe = Some(v),
            PreWrite::RecipeStep(v) => raw.recipe_step = Some(v),
            PreWrite::RecipeStepInstrument(v) => raw.recipe_step_instrument = Some(v),
            PreWrite::RecipeStepIngredient(v) => raw.recipe_step_ingredient = Some(v),
            PreWrite::RecipeStepProduct(v) => raw.recipe_step_product = Some(v),
            PreWrite::MealPlan(v) => raw.meal_plan = Some(v),
            PreWrite::MealPlanOption(v) => raw.meal_plan_option = Some(v),
            PreWrite::MealPlanOptionVote { meal_plan_id, vote } => {
                raw.meal_plan_id = Some(meal_plan_id);
                raw.meal_plan_option_vote = Some(vote);
            }
            PreWrite::ValidIngredient(v) => raw.valid_ingredient = Some(v),
            PreWrite::ValidInstrument(v) => raw.valid_instrument = Some(v),
            PreWrite::ValidPreparation(v) => raw.valid_preparation = Some(v),
            PreWrite::ValidIngredientPreparation(v) => raw.valid_ingredient_preparation = Some(v),
            PreWrite::HouseholdInvitation(v) => raw.household_invitation = Some(v),
            PreWrite::Webhook(v) => raw.webhook = Some(v),
        }
        raw
    }
}

/// The wire name of the payload slot an entity travels in.
pub fn payload_slot(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Meal => "meal",
        DataType::Recipe => "recipe",
        DataType::RecipeStep => "recipeStep",
        DataType::RecipeStepInstrument => "recipeStepInstrument",
        DataType::RecipeStepIngredient => "recipeStepIngredient",
        DataType::RecipeStepProduct => "recipeStepProduct",
        DataType::MealPlan => "mealPlan",
        DataType::MealPlanOption => "mealPlanOption",
        DataType::MealPlanOptionVote => "mealPlanOptionVote",
        DataType::ValidIngredient => "validIngredient",
        DataType::ValidInstrument => "validInstrument",
        DataType::ValidPreparation => "validPreparation",
        DataType::ValidIngredientPreparation => "validIngredientPreparation",
        DataType::HouseholdInvitation => "householdInvitation",
        DataType::UserMembership => "userMembership",
        DataType::Webhook => "webhook",
    }
}

// ---------------------------------------------------------------------------
// Pre-update
// ---------------------------------------------------------------------------

/// A requested update, consumed from the pre-updates topic. The payload is
/// the full updated entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPreUpdateMessage", into = "RawPreUpdateMessage")]
pub struct PreUpdateMessage {
    pub attributable_to_user_id: String,
    pub attributable_to_household_id: String,
    pub payload: PreUpdate,
}

impl PreUpdateMessage {
    pub fn data_type(&self) -> DataType {
        self.payload.data_type()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreUpdate {
    Recipe(Recipe),
    RecipeStep(RecipeStep),
    RecipeStepInstrument(RecipeStepInstrument),
    RecipeStepIngredient(RecipeStepIngredient),
    RecipeStepProduct(RecipeStepProduct),
    MealPlan(MealPlan),
    MealPlanOption(MealPlanOption),
    MealPlanOptionVote(MealPlanOptionVote),
    ValidIngredient(ValidIngredient),
    ValidInstrument(ValidInstrument),
    ValidPreparation(ValidPreparation),
    ValidIngredientPreparation(ValidIngredientPreparation),
}

impl PreUpdate {
    pub fn data_type(&self) -> DataType {
        match self {
            PreUpdate::Recipe(_) => DataType::Recipe,
            PreUpdate::RecipeStep(_) => DataType::RecipeStep,
            PreUpdate::RecipeStepInstrument(_) => DataType::RecipeStepInstrument,
            PreUpdate::RecipeStepIngredient(_) => DataType::RecipeStepIngredient,
            PreUpdate::RecipeStepProduct(_) => DataType::RecipeStepProduct,
            PreUpdate::MealPlan(_) => DataType::MealPlan,
            PreUpdate::MealPlanOption(_) => DataType::MealPlanOption,
            PreUpdate::MealPlanOptionVote(_) => DataType::MealPlanOptionVote,
            PreUpdate::ValidIngredient(_) => DataType::ValidIngredient,
            PreUpdate::ValidInstrument(_) => DataType::ValidInstrument,
            PreUpdate::ValidPreparation(_) => DataType::ValidPreparation,
            PreUpdate::ValidIngredientPreparation(_) => DataType::ValidIngredientPreparation,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreUpdateMessage {
    data_type: Option<DataType>,
    #[serde(rename = "attributableToUserID")]
    attributable_to_user_id: String,
    #[serde(rename = "attributableToHouseholdID")]
    attributable_to_household_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe: Option<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step: Option<RecipeStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step_instrument: Option<RecipeStepInstrument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step_ingredient: Option<RecipeStepIngredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipe_step_product: Option<RecipeStepProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal_plan: Option<MealPlan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal_plan_option: Option<MealPlanOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal_plan_option_vote: Option<MealPlanOptionVote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_ingredient: Option<ValidIngredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_instrument: Option<ValidInstrument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_preparation: Option<ValidPreparation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_ingredient_preparation: Option<ValidIngredientPreparation>,
}

impl TryFrom<RawPreUpdateMessage> for PreUpdateMessage {
    type Error = PrixFixeError;

    fn try_from(raw: RawPreUpdateMessage) -> Result<Self, Self::Error> {
        let data_type = raw.data_type.ok_or(PrixFixeError::MissingField {
            data_type: "pre-update",
            field: "dataType",
        })?;

        let payload = match data_type {
            DataType::Recipe => raw.recipe.map(PreUpdate::Recipe),
            DataType::RecipeStep => raw.recipe_step.map(PreUpdate::RecipeStep),
            DataType::RecipeStepInstrument => {
                raw.recipe_step_instrument.map(PreUpdate::RecipeStepInstrument)
            }
            DataType::RecipeStepIngredient => {
                raw.recipe_step_ingredient.map(PreUpdate::RecipeStepIngredient)
            }
            DataType::RecipeStepProduct => raw.recipe_step_product.map(PreUpdate::RecipeStepProduct),
            DataType::MealPlan => raw.meal_plan.map(PreUpdate::MealPlan),
            DataType::MealPlanOption => raw.meal_plan_option.map(PreUpdate::MealPlanOption),
            DataType::MealPlanOptionVote => {
                raw.meal_plan_option_vote.map(PreUpdate::MealPlanOptionVote)
            }
            DataType::ValidIngredient => raw.valid_ingredient.map(PreUpdate::ValidIngredient),
            DataType::ValidInstrument => raw.valid_instrument.map(PreUpdate::ValidInstrument),
            DataType::ValidPreparation => raw.valid_preparation.map(PreUpdate::ValidPreparation),
            DataType::ValidIngredientPreparation => raw
                .valid_ingredient_preparation
                .map(PreUpdate::ValidIngredientPreparation),
            DataType::Meal
            | DataType::HouseholdInvitation
            | DataType::UserMembership
            | DataType::Webhook => return Err(unsupported(data_type, "pre-update")),
        }
        .ok_or_else(|| missing(data_type, payload_slot(data_type)))?;

        Ok(PreUpdateMessage {
            attributable_to_user_id: raw.attributable_to_user_id,
            attributable_to_household_id: raw.attributable_to_household_id,
            payload,
        })
    }
}

impl From<PreUpdateMessage> for RawPreUpdateMessage {
    fn from(msg: PreUpdateMessage) -> Self {
        let mut raw = RawPreUpdateMessage {
            data_type: Some(msg.data_type()),
            attributable_to_user_id: msg.attributable_to_user_id,
            attributable_to_household_id: msg.attributable_to_household_id,
            ..Default::default()
        };
        match msg.payload {
            PreUpdate::Recipe(v) => raw.recipe = Some(v),
            PreUpdate::RecipeStep(v) => raw.recipe_step = Some(v),
            PreUpdate::RecipeStepInstrument(v) => raw.recipe_step_instrument = Some(v),
            PreUpdate::RecipeStepIngredient(v) => raw.recipe_step_ingredient = Some(v),
            PreUpdate::RecipeStepProduct(v) => raw.recipe_step_product = Some(v),
            PreUpdate::MealPlan(v) => raw.meal_plan = Some(v),
            PreUpdate::MealPlanOption(v) => raw.meal_plan_option = Some(v),
            PreUpdate::MealPlanOptionVote(v) => raw.meal_plan_option_vote = Some(v),
            PreUpdate::ValidIngredient(v) => raw.valid_ingredient = Some(v),
            PreUpdate::ValidInstrument(v) => raw.valid_instrument = Some(v),
            PreUpdate::ValidPreparation(v) => raw.valid_preparation = Some(v),
            PreUpdate::ValidIngredientPreparation(v) => raw.valid_ingredient_preparation = Some(v),
        }
        raw
    }
}

// ---------------------------------------------------------------------------
// Pre-archive
// ---------------------------------------------------------------------------

/// A requested soft delete, consumed from the pre-archives topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPreArchiveMessage", into = "RawPreArchiveMessage")]
pub struct PreArchiveMessage {
    pub attributable_to_user_id: String,
    pub attributable_to_household_id: String,
    pub target: ArchiveTarget,
}

impl PreArchiveMessage {
    pub fn data_type(&self) -> DataType {
        self.target.data_type()
    }
}

/// The identifier columns that name the entity to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveTarget {
    Meal {
        meal_id: String,
    },
    MealPlan {
        meal_plan_id: String,
    },
    MealPlanOption {
        meal_plan_id: String,
        meal_plan_option_id: String,
    },
    MealPlanOptionVote {
        meal_plan_option_id: String,
        meal_plan_option_vote_id: String,
    },
    Recipe {
        recipe_id: String,
    },
    RecipeStep {
        recipe_id: String,
        recipe_step_id: String,
    },
    RecipeStepInstrument {
        recipe_step_id: String,
        recipe_step_instrument_id: String,
    },
    RecipeStepIngredient {
        recipe_step_id: String,
        recipe_step_ingredient_id: String,
    },
    RecipeStepProduct {
        recipe_step_id: String,
        recipe_step_product_id: String,
    },
    ValidIngredient {
        valid_ingredient_id: String,
    },
    ValidInstrument {
        valid_instrument_id: String,
    },
    ValidPreparation {
        valid_preparation_id: String,
    },
    ValidIngredientPreparation {
        valid_ingredient_preparation_id: String,
    },
    Webhook {
        webhook_id: String,
    },
}

impl ArchiveTarget {
    pub fn data_type(&self) -> DataType {
        match self {
            ArchiveTarget::Meal { .. } => DataType::Meal,
            ArchiveTarget::MealPlan { .. } => DataType::MealPlan,
            ArchiveTarget::MealPlanOption { .. } => DataType::MealPlanOption,
            ArchiveTarget::MealPlanOptionVote { .. } => DataType::MealPlanOptionVote,
            ArchiveTarget::Recipe { .. } => DataType::Recipe,
            ArchiveTarget::RecipeStep { .. } => DataType::RecipeStep,
            ArchiveTarget::RecipeStepInstrument { .. } => DataType::RecipeStepInstrument,
            ArchiveTarget::RecipeStepIngredient { .. } => DataType::RecipeStepIngredient,
            ArchiveTarget::RecipeStepProduct { .. } => DataType::RecipeStepProduct,
            ArchiveTarget::ValidIngredient { .. } => DataType::ValidIngredient,
            ArchiveTarget::ValidInstrument { .. } => DataType::ValidInstrument,
            ArchiveTarget::ValidPreparation { .. } => DataType::ValidPreparation,
            ArchiveTarget::ValidIngredientPreparation { .. } => {
                DataType::ValidIngredientPreparation
            }
            ArchiveTarget::Webhook { .. } => DataType::Webhook,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreArchiveMessage {
    data_type: Option<DataType>,
    #[serde(rename = "attributableToUserID")]
    attributable_to_user_id: String,
    #[serde(rename = "attributableToHouseholdID")]
    attributable_to_household_id: String,
    #[serde(rename = "mealID", default, skip_serializing_if = "Option::is_none")]
    meal_id: Option<String>,
    #[serde(rename = "mealPlanID", default, skip_serializing_if = "Option::is_none")]
    meal_plan_id: Option<String>,
    #[serde(rename = "mealPlanOptionID", default, skip_serializing_if = "Option::is_none")]
    meal_plan_option_id: Option<String>,
    #[serde(rename = "mealPlanOptionVoteID", default, skip_serializing_if = "Option::is_none")]
    meal_plan_option_vote_id: Option<String>,
    #[serde(rename = "recipeID", default, skip_serializing_if = "Option::is_none")]
    recipe_id: Option<String>,
    #[serde(rename = "recipeStepID", default, skip_serializing_if = "Option::is_none")]
    recipe_step_id: Option<String>,
    #[serde(rename = "recipeStepInstrumentID", default, skip_serializing_if = "Option::is_none")]
    recipe_step_instrument_id: Option<String>,
    #[serde(rename = "recipeStepIngredientID", default, skip_serializing_if = "Option::is_none")]
    recipe_step_ingredient_id: Option<String>,
    #[serde(rename = "recipeStepProductID", default, skip_serializing_if = "Option::is_none")]
    recipe_step_product_id: Option<String>,
    #[serde(rename = "validIngredientID", default, skip_serializing_if = "Option::is_none")]
    valid_ingredient_id: Option<String>,
    #[serde(rename = "validInstrumentID", default, skip_serializing_if = "Option::is_none")]
    valid_instrument_id: Option<String>,
    #[serde(rename = "validPreparationID", default, skip_serializing_if = "Option::is_none")]
    valid_preparation_id: Option<String>,
    #[serde(
        rename = "validIngredientPreparationID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    valid_ingredient_preparation_id: Option<String>,
    #[serde(rename = "webhookID", default, skip_serializing_if = "Option::is_none")]
    webhook_id: Option<String>,
}

impl TryFrom<RawPreArchiveMessage> for PreArchiveMessage {
    type Error = PrixFixeError;

    fn try_from(raw: RawPreArchiveMessage) -> Result<Self, Self::Error> {
        let dt = raw.data_type.ok_or(PrixFixeError::MissingField {
            data_type: "pre-archive",
            field: "dataType",
        })?;

        let target = match dt {
            DataType::Meal => ArchiveTarget::Meal {
                meal_id: required_id(raw.meal_id, dt, "mealID")?,
            },
            DataType::MealPlan => ArchiveTarget::MealPlan {
                meal_plan_id: required_id(raw.meal_plan_id, dt, "mealPlanID")?,
            },
            DataType::MealPlanOption => ArchiveTarget::MealPlanOption {
                meal_plan_id: required_id(raw.meal_plan_id, dt, "mealPlanID")?,
                meal_plan_option_id: required_id(raw.meal_plan_option_id, dt, "mealPlanOptionID")?,
            },
            DataType::MealPlanOptionVote => ArchiveTarget::MealPlanOptionVote {
                meal_plan_option_id: required_id(raw.meal_plan_option_id, dt, "mealPlanOptionID")?,
                meal_plan_option_vote_id: required_id(
                    raw.meal_plan_option_vote_id,
                    dt,
                    "mealPlanOptionVoteID",
                )?,
            },
            DataType::Recipe => ArchiveTarget::Recipe {
                recipe_id: required_id(raw.recipe_id, dt, "recipeID")?,
            },
            DataType::RecipeStep => ArchiveTarget::RecipeStep {
                recipe_id: required_id(raw.recipe_id, dt, "recipeID")?,
                recipe_step_id: required_id(raw.recipe_step_id, dt, "recipeStepID")?,
            },
            DataType::RecipeStepInstrument => ArchiveTarget::RecipeStepInstrument {
                recipe_step_id: required_id(raw.recipe_step_id, dt, "recipeStepID")?,
                recipe_step_instrument_id: required_id(
                    raw.recipe_step_instrument_id,
                    dt,
                    "recipeStepInstrumentID",
                )?,
            },
            DataType::RecipeStepIngredient => ArchiveTarget::RecipeStepIngredient {
                recipe_step_id: required_id(raw.recipe_step_id, dt, "recipeStepID")?,
                recipe_step_ingredient_id: required_id(
                    raw.recipe_step_ingredient_id,
                    dt,
                    "recipeStepIngredientID",
                )?,
            },
            DataType::RecipeStepProduct => ArchiveTarget::RecipeStepProduct {
                recipe_step_id: required_id(raw.recipe_step_id, dt, "recipeStepID")?,
                recipe_step_product_id: required_id(
                    raw.recipe_step_product_id,
                    dt,
                    "recipeStepProductID",
                )?,
            },
            DataType::ValidIngredient => ArchiveTarget::ValidIngredient {
                valid_ingredient_id: required_id(raw.valid_ingredient_id, dt, "validIngredientID")?,
            },
            DataType::ValidInstrument => ArchiveTarget::ValidInstrument {
                valid_instrument_id: required_id(raw.valid_instrument_id, dt, "validInstrumentID")?,
            },
            DataType::ValidPreparation => ArchiveTarget::ValidPreparation {
                valid_preparation_id: required_id(
                    raw.valid_preparation_id,
                    dt,
                    "validPreparationID",
                )?,
            },
            DataType::ValidIngredientPreparation => ArchiveTarget::ValidIngredientPreparation {
                valid_ingredient_preparation_id: required_id(
                    raw.valid_ingredient_preparation_id,
                    dt,
                    "validIngredientPreparationID",
                )?,
            },
            DataType::Webhook => ArchiveTarget::Webhook {
                webhook_id: required_id(raw.webhook_id, dt, "webhookID")?,
            },
            DataType::HouseholdInvitation | DataType::UserMembership => {
                return Err(unsupported(dt, "pre-archive"))
            }
        };

        Ok(PreArchiveMessage {
            attributable_to_user_id: raw.attributable_to_user_id,
            attributable_to_household_id: raw.attributable_to_household_id,
            target,
        })
    }
}

impl From<PreArchiveMessage> for RawPreArchiveMessage {
    fn from(msg: PreArchiveMessage) -> Self {
        let mut raw = RawPreArchiveMessage {
            data_type: Some(msg.data_type()),
            attributable_to_user_id: msg.attributable_to_user_id,
            attributable_to_household_id: msg.attributable_to_household_id,
            ..Default::default()
        };
        match msg.target {
            ArchiveTarget::Meal { meal_id } => raw.meal_id = Some(meal_id),
            ArchiveTarget::MealPlan { meal_plan_id } => raw.meal_plan_id = Some(meal_plan_id),
            ArchiveTarget::MealPlanOption {
                meal_plan_id,
                meal_plan_option_id,
            } => {
                raw.meal_plan_id = Some(meal_plan_id);
                raw.meal_plan_option_id = Some(meal_plan_option_id);
            }
            ArchiveTarget::MealPlanOptionVote {
                meal_plan_option_id,
                meal_plan_option_vote_id,
            } => {
                raw.meal_plan_option_id = Some(meal_plan_option_id);
                raw.meal_plan_option_vote_id = Some(meal_plan_option_vote_id);
            }
            ArchiveTarget::Recipe { recipe_id } => raw.recipe_id = Some(recipe_id),
            ArchiveTarget::RecipeStep {
                recipe_id,
                recipe_step_id,
            } => {
                raw.recipe_id = Some(recipe_id);
                raw.recipe_step_id = Some(recipe_step_id);
            }
            ArchiveTarget::RecipeStepInstrument {
                recipe_step_id,
                recipe_step_instrument_id,
            } => {
                raw.recipe_step_id = Some(recipe_step_id);
                raw.recipe_step_instrument_id = Some(recipe_step_instrument_id);
            }
            ArchiveTarget::RecipeStepIngredient {
                recipe_step_id,
                recipe_step_ingredient_id,
            } => {
                raw.recipe_step_id = Some(recipe_step_id);
                raw.recipe_step_ingredient_id = Some(recipe_step_ingredient_id);
            }
            ArchiveTarget::RecipeStepProduct {
                recipe_step_id,
                recipe_step_product_id,
            } => {
                raw.recipe_step_id = Some(recipe_step_id);
                raw.recipe_step_product_id = Some(recipe_step_product_id);
            }
            ArchiveTarget::ValidIngredient { valid_ingredient_id } => {
                raw.valid_ingredient_id = Some(valid_ingredient_id)
            }
            ArchiveTarget::ValidInstrument { valid_instrument_id } => {
                raw.valid_instrument_id = Some(valid_instrument_id)
            }
            ArchiveTarget::ValidPreparation {
                valid_preparation_id,
            } => raw.valid_preparation_id = Some(valid_preparation_id),
            ArchiveTarget::ValidIngredientPreparation {
                valid_ingredient_preparation_id,
            } => raw.valid_ingredient_preparation_id = Some(valid_ingredient_preparation_id),
            ArchiveTarget::Webhook { webhook_id } => raw.webhook_id = Some(webhook_id),
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn pre_write_decodes_the_named_slot() {
        let msg: PreWriteMessage = serde_json::from_value(json!({
            "dataType": "recipe",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1",
            "recipe": { "id": "r1", "name": "soup" }
        }))
        .unwrap();

        assert_eq!(msg.data_type(), DataType::Recipe);
        assert_eq!(msg.attributable_to_user_id, "u1");
        match msg.payload {
            PreWrite::Recipe(input) => {
                assert_eq!(input.id, "r1");
                assert_eq!(input.name, "soup");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn pre_write_without_its_slot_is_rejected() {
        let err = serde_json::from_value::<PreWriteMessage>(json!({
            "dataType": "recipe",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1",
            "meal": { "id": "m1" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("recipe"), "{err}");
    }

    #[test]
    fn vote_requires_meal_plan_id() {
        let err = serde_json::from_value::<PreWriteMessage>(json!({
            "dataType": "meal_plan_option_vote",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1",
            "mealPlanOptionVote": { "id": "v1" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("mealPlanID"), "{err}");

        let ok: PreWriteMessage = serde_json::from_value(json!({
            "dataType": "meal_plan_option_vote",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1",
            "mealPlanID": "mp1",
            "mealPlanOptionVote": { "id": "v1" }
        }))
        .unwrap();
        match ok.payload {
            PreWrite::MealPlanOptionVote { meal_plan_id, vote } => {
                assert_eq!(meal_plan_id, "mp1");
                assert_eq!(vote.id, "v1");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn pre_write_serializes_flat() {
        let msg = PreWriteMessage {
            attributable_to_user_id: "u1".into(),
            attributable_to_household_id: "h1".into(),
            payload: PreWrite::ValidPreparation(ValidPreparationDatabaseCreationInput {
                id: "p1".into(),
                ..Default::default()
            }),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["dataType"], "valid_preparation");
        assert_eq!(json["validPreparation"]["id"], "p1");
        assert!(json.get("mealPlanID").is_none());
        assert!(json.get("recipe").is_none());
    }

    #[test]
    fn pre_update_rejects_types_it_never_carries() {
        for tag in ["meal", "household_invitation", "webhook", "user_membership"] {
            let result = serde_json::from_value::<PreUpdateMessage>(json!({
                "dataType": tag,
                "attributableToUserID": "u1",
                "attributableToHouseholdID": "h1"
            }));
            assert!(result.is_err(), "{tag} should not decode as a pre-update");
        }
    }

    #[test]
    fn pre_archive_reads_the_id_columns() {
        let msg: PreArchiveMessage = serde_json::from_value(json!({
            "dataType": "recipe_step",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1",
            "recipeID": "r1",
            "recipeStepID": "s1"
        }))
        .unwrap();
        assert_eq!(
            msg.target,
            ArchiveTarget::RecipeStep {
                recipe_id: "r1".into(),
                recipe_step_id: "s1".into(),
            }
        );
    }

    #[test]
    fn pre_archive_treats_empty_ids_as_missing() {
        let err = serde_json::from_value::<PreArchiveMessage>(json!({
            "dataType": "meal_plan_option",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1",
            "mealPlanID": "mp1",
            "mealPlanOptionID": ""
        }))
        .unwrap_err();
        assert!(err.to_string().contains("mealPlanOptionID"), "{err}");
    }

    #[test]
    fn header_keeps_unknown_tags_as_strings() {
        let header: EnvelopeHeader =
            serde_json::from_value(json!({ "dataType": "nonexistent" })).unwrap();
        assert_eq!(header.data_type, "nonexistent");
        assert!(header.attributable_to_user_id.is_none());
    }

    #[test]
    fn unknown_tag_fails_full_decode() {
        let result = serde_json::from_value::<PreWriteMessage>(json!({
            "dataType": "nonexistent",
            "attributableToUserID": "u1",
            "attributableToHouseholdID": "h1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn every_data_type_has_a_distinct_slot() {
        let slots: std::collections::HashSet<_> =
            DataType::ALL.iter().map(|dt| payload_slot(*dt)).collect();
        assert_eq!(slots.len(), DataType::ALL.len());
    }
}
