//! Outbound data-change events: facts about a mutation that actually happened.
//!
//! `MessageType` strings are the only identifiers downstream consumers switch
//! on. They mix snake_case and camelCase; that mix is part of the contract and
//! is preserved verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::*;

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    #[serde(rename = "meal_created")]
    MealCreated,
    #[serde(rename = "meal_archived")]
    MealArchived,

    RecipeCreated,
    RecipeUpdated,
    RecipeArchived,
    RecipeStepCreated,
    RecipeStepUpdated,
    RecipeStepArchived,
    RecipeStepInstrumentCreated,
    RecipeStepInstrumentUpdated,
    RecipeStepInstrumentArchived,
    RecipeStepIngredientCreated,
    RecipeStepIngredientUpdated,
    RecipeStepIngredientArchived,
    RecipeStepProductCreated,
    RecipeStepProductUpdated,
    RecipeStepProductArchived,

    MealPlanCreated,
    MealPlanUpdated,
    MealPlanArchived,
    MealPlanOptionCreated,
    MealPlanOptionUpdated,
    MealPlanOptionArchived,
    MealPlanOptionVoteCreated,
    MealPlanOptionVoteUpdated,
    MealPlanOptionVoteArchived,
    MealPlanOptionFinalized,
    MealPlanFinalized,

    ValidIngredientCreated,
    ValidIngredientUpdated,
    ValidIngredientArchived,
    ValidInstrumentCreated,
    ValidInstrumentUpdated,
    ValidInstrumentArchived,
    ValidPreparationCreated,
    ValidPreparationUpdated,
    ValidPreparationArchived,
    ValidIngredientPreparationCreated,
    ValidIngredientPreparationUpdated,
    ValidIngredientPreparationArchived,

    HouseholdInvitationCreated,

    #[serde(rename = "webhook_created")]
    WebhookCreated,
    WebhookArchived,
}

impl MessageType {
    pub const ALL: [MessageType; 43] = [
        MessageType::MealCreated,
        MessageType::MealArchived,
        MessageType::RecipeCreated,
        MessageType::RecipeUpdated,
        MessageType::RecipeArchived,
        MessageType::RecipeStepCreated,
        MessageType::RecipeStepUpdated,
        MessageType::RecipeStepArchived,
        MessageType::RecipeStepInstrumentCreated,
        MessageType::RecipeStepInstrumentUpdated,
        MessageType::RecipeStepInstrumentArchived,
        MessageType::RecipeStepIngredientCreated,
        MessageType::RecipeStepIngredientUpdated,
        MessageType::RecipeStepIngredientArchived,
        MessageType::RecipeStepProductCreated,
        MessageType::RecipeStepProductUpdated,
        MessageType::RecipeStepProductArchived,
        MessageType::MealPlanCreated,
        MessageType::MealPlanUpdated,
        MessageType::MealPlanArchived,
        MessageType::MealPlanOptionCreated,
        MessageType::MealPlanOptionUpdated,
        MessageType::MealPlanOptionArchived,
        MessageType::MealPlanOptionVoteCreated,
        MessageType::MealPlanOptionVoteUpdated,
        MessageType::MealPlanOptionVoteArchived,
        MessageType::MealPlanOptionFinalized,
        MessageType::MealPlanFinalized,
        MessageType::ValidIngredientCreated,
        MessageType::ValidIngredientUpdated,
        MessageType::ValidIngredientArchived,
        MessageType::ValidInstrumentCreated,
        MessageType::ValidInstrumentUpdated,
        MessageType::ValidInstrumentArchived,
        MessageType::ValidPreparationCreated,
        MessageType::ValidPreparationUpdated,
        MessageType::ValidPreparationArchived,
        MessageType::ValidIngredientPreparationCreated,
        MessageType::ValidIngredientPreparationUpdated,
        MessageType::ValidIngredientPreparationArchived,
        MessageType::HouseholdInvitationCreated,
        MessageType::WebhookCreated,
        MessageType::WebhookArchived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::MealCreated => "meal_created",
            MessageType::MealArchived => "meal_archived",
            MessageType::RecipeCreated => "recipeCreated",
            MessageType::RecipeUpdated => "recipeUpdated",
            MessageType::RecipeArchived => "recipeArchived",
            MessageType::RecipeStepCreated => "recipeStepCreated",
            MessageType::RecipeStepUpdated => "recipeStepUpdated",
            MessageType::RecipeStepArchived => "recipeStepArchived",
            MessageType::RecipeStepInstrumentCreated => "recipeStepInstrumentCreated",
            MessageType::RecipeStepInstrumentUpdated => "recipeStepInstrumentUpdated",
            MessageType::RecipeStepInstrumentArchived => "recipeStepInstrumentArchived",
            MessageType::RecipeStepIngredientCreated => "recipeStepIngredientCreated",
            MessageType::RecipeStepIngredientUpdated => "recipeStepIngredientUpdated",
            MessageType::RecipeStepIngredientArchived => "recipeStepIngredientArchived",
            MessageType::RecipeStepProductCreated => "recipeStepProductCreated",
            MessageType::RecipeStepProductUpdated => "recipeStepProductUpdated",
            MessageType::RecipeStepProductArchived => "recipeStepProductArchived",
            MessageType::MealPlanCreated => "mealPlanCreated",
            MessageType::MealPlanUpdated => "mealPlanUpdated",
            MessageType::MealPlanArchived => "mealPlanArchived",
            MessageType::MealPlanOptionCreated => "mealPlanOptionCreated",
            MessageType::MealPlanOptionUpdated => "mealPlanOptionUpdated",
            MessageType::MealPlanOptionArchived => "mealPlanOptionArchived",
            MessageType::MealPlanOptionVoteCreated => "mealPlanOptionVoteCreated",
            MessageType::MealPlanOptionVoteUpdated => "mealPlanOptionVoteUpdated",
            MessageType::MealPlanOptionVoteArchived => "mealPlanOptionVoteArchived",
            MessageType::MealPlanOptionFinalized => "mealPlanOptionFinalized",
            MessageType::MealPlanFinalized => "mealPlanFinalized",
            MessageType::ValidIngredientCreated => "validIngredientCreated",
            MessageType::ValidIngredientUpdated => "validIngredientUpdated",
            MessageType::ValidIngredientArchived => "validIngredientArchived",
            MessageType::ValidInstrumentCreated => "validInstrumentCreated",
            MessageType::ValidInstrumentUpdated => "validInstrumentUpdated",
            MessageType::ValidInstrumentArchived => "validInstrumentArchived",
            MessageType::ValidPreparationCreated => "validPreparationCreated",
            MessageType::ValidPreparationUpdated => "validPreparationUpdated",
            MessageType::ValidPreparationArchived => "validPreparationArchived",
            MessageType::ValidIngredientPreparationCreated => "validIngredientPreparationCreated",
            MessageType::ValidIngredientPreparationUpdated => "validIngredientPreparationUpdated",
            MessageType::ValidIngredientPreparationArchived => "validIngredientPreparationArchived",
            MessageType::HouseholdInvitationCreated => "householdInvitationCreated",
            MessageType::WebhookCreated => "webhook_created",
            MessageType::WebhookArchived => "webhookArchived",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entity snapshot
// ---------------------------------------------------------------------------

/// The entity value an event carries, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Meal(Meal),
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
    HouseholdInvitation(HouseholdInvitation),
    Webhook(Webhook),
}

macro_rules! entity_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Entity {
                fn from(value: $variant) -> Self {
                    Entity::$variant(value)
                }
            }
        )*
    };
}

entity_from!(
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

// ---------------------------------------------------------------------------
// DataChangeMessage
// ---------------------------------------------------------------------------

/// Emitted after a mutation has been persisted (and indexed, where applicable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDataChangeMessage", into = "RawDataChangeMessage")]
pub struct DataChangeMessage {
    pub data_type: DataType,
    pub message_type: MessageType,
    pub attributable_to_user_id: String,
    pub attributable_to_household_id: String,
    pub entity: Option<Entity>,
    /// Set on finalization events to name the plan involved.
    pub meal_plan_id: Option<String>,
    /// Set on option-finalized events to name the option.
    pub meal_plan_option_id: Option<String>,
}

impl DataChangeMessage {
    pub fn new(
        data_type: DataType,
        message_type: MessageType,
        user_id: impl Into<String>,
        household_id: impl Into<String>,
    ) -> Self {
        Self {
            data_type,
            message_type,
            attributable_to_user_id: user_id.into(),
            attributable_to_household_id: household_id.into(),
            entity: None,
            meal_plan_id: None,
            meal_plan_option_id: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<Entity>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_meal_plan_id(mut self, id: impl Into<String>) -> Self {
        self.meal_plan_id = Some(id.into());
        self
    }

    pub fn with_meal_plan_option_id(mut self, id: impl Into<String>) -> Self {
        self.meal_plan_option_id = Some(id.into());
        self
    }

    /// Serialize for an outbound payload column or wire frame.
    pub fn to_payload(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataChangeMessage {
    data_type: DataType,
    message_type: MessageType,
    #[serde(rename = "attributableToUserID")]
    attributable_to_user_id: String,
    #[serde(rename = "attributableToHouseholdID")]
    attributable_to_household_id: String,
    #[serde(rename = "mealPlanID", default, skip_serializing_if = "Option::is_none")]
    meal_plan_id: Option<String>,
    #[serde(rename = "mealPlanOptionID", default, skip_serializing_if = "Option::is_none")]
    meal_plan_option_id: Option<String>,
    #[serde(flatten)]
    slots: EntitySlots,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntitySlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meal: Option<Meal>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    household_invitation: Option<HouseholdInvitation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    webhook: Option<Webhook>,
}

impl EntitySlots {
    fn from_entity(entity: Option<Entity>) -> Self {
        let mut slots = EntitySlots::default();
        match entity {
            None => {}
            Some(Entity::Meal(v)) => slots.meal = Some(v),
            Some(Entity::Recipe(v)) => slots.recipe = Some(v),
            Some(Entity::RecipeStep(v)) => slots.recipe_step = Some(v),
            Some(Entity::RecipeStepInstrument(v)) => slots.recipe_step_instrument = Some(v),
            Some(Entity::RecipeStepIngredient(v)) => slots.recipe_step_ingredient = Some(v),
            Some(Entity::RecipeStepProduct(v)) => slots.recipe_step_product = Some(v),
            Some(Entity::MealPlan(v)) => slots.meal_plan = Some(v),
            Some(Entity::MealPlanOption(v)) => slots.meal_plan_option = Some(v),
            Some(Entity::MealPlanOptionVote(v)) => slots.meal_plan_option_vote = Some(v),
            Some(Entity::ValidIngredient(v)) => slots.valid_ingredient = Some(v),
            Some(Entity::ValidInstrument(v)) => slots.valid_instrument = Some(v),
            Some(Entity::ValidPreparation(v)) => slots.valid_preparation = Some(v),
            Some(Entity::ValidIngredientPreparation(v)) => {
                slots.valid_ingredient_preparation = Some(v)
            }
            Some(Entity::HouseholdInvitation(v)) => slots.household_invitation = Some(v),
            Some(Entity::Webhook(v)) => slots.webhook = Some(v),
        }
        slots
    }

    /// At most one slot is populated by this crate; for foreign producers the
    /// first populated slot in declaration order wins.
    fn into_entity(self) -> Option<Entity> {
        let EntitySlots {
            meal,
            recipe,
            recipe_step,
            recipe_step_instrument,
            recipe_step_ingredient,
            recipe_step_product,
            meal_plan,
            meal_plan_option,
            meal_plan_option_vote,
            valid_ingredient,
            valid_instrument,
            valid_preparation,
            valid_ingredient_preparation,
            household_invitation,
            webhook,
        } = self;

        meal.map(Entity::Meal)
            .or(recipe.map(Entity::Recipe))
            .or(recipe_step.map(Entity::RecipeStep))
            .or(recipe_step_instrument.map(Entity::RecipeStepInstrument))
            .or(recipe_step_ingredient.map(Entity::RecipeStepIngredient))
            .or(recipe_step_product.map(Entity::RecipeStepProduct))
            .or(meal_plan.map(Entity::MealPlan))
            .or(meal_plan_option.map(Entity::MealPlanOption))
            .or(meal_plan_option_vote.map(Entity::MealPlanOptionVote))
            .or(valid_ingredient.map(Entity::ValidIngredient))
            .or(valid_instrument.map(Entity::ValidInstrument))
            .or(valid_preparation.map(Entity::ValidPreparation))
            .or(valid_ingredient_preparation.map(Entity::ValidIngredientPreparation))
            .or(household_invitation.map(Entity::HouseholdInvitation))
            .or(webhook.map(Entity::Webhook))
    }
}

impl From<RawDataChangeMessage> for DataChangeMessage {
    fn from(raw: RawDataChangeMessage) -> Self {
        DataChangeMessage {
            data_type: raw.data_type,
            message_type: raw.message_type,
            attributable_to_user_id: raw.attributable_to_user_id,
            attributable_to_household_id: raw.attributable_to_household_id,
            entity: raw.slots.into_entity(),
            meal_plan_id: raw.meal_plan_id,
            meal_plan_option_id: raw.meal_plan_option_id,
        }
    }
}

impl From<DataChangeMessage> for RawDataChangeMessage {
    fn from(msg: DataChangeMessage) -> Self {
        RawDataChangeMessage {
            data_type: msg.data_type,
            message_type: msg.message_type,
            attributable_to_user_id: msg.attributable_to_user_id,
            attributable_to_household_id: msg.attributable_to_household_id,
            meal_plan_id: msg.meal_plan_id,
            meal_plan_option_id: msg.meal_plan_option_id,
            slots: EntitySlots::from_entity(msg.entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_serde_matches_as_str() {
        for mt in MessageType::ALL {
            let json = serde_json::to_value(mt).unwrap();
            assert_eq!(json.as_str().unwrap(), mt.as_str(), "{mt:?}");
        }
    }

    #[test]
    fn message_type_strings_are_unique() {
        let unique: std::collections::HashSet<&str> =
            MessageType::ALL.iter().map(MessageType::as_str).collect();
        assert_eq!(unique.len(), MessageType::ALL.len());
    }

    #[test]
    fn snake_case_event_names_are_preserved() {
        assert_eq!(MessageType::MealCreated.as_str(), "meal_created");
        assert_eq!(MessageType::MealArchived.as_str(), "meal_archived");
        assert_eq!(MessageType::WebhookCreated.as_str(), "webhook_created");
        assert_eq!(MessageType::WebhookArchived.as_str(), "webhookArchived");
    }

    #[test]
    fn snapshot_travels_in_its_named_slot() {
        let recipe = Recipe {
            id: "r1".into(),
            name: "x".into(),
            ..Default::default()
        };
        let msg = DataChangeMessage::new(DataType::Recipe, MessageType::RecipeCreated, "u1", "h1")
            .with_entity(recipe.clone());

        let json = msg.to_payload().unwrap();
        assert_eq!(json["dataType"], "recipe");
        assert_eq!(json["messageType"], "recipeCreated");
        assert_eq!(json["attributableToUserID"], "u1");
        assert_eq!(json["attributableToHouseholdID"], "h1");
        assert_eq!(json["recipe"]["id"], "r1");
        assert!(json.get("mealPlanID").is_none());

        let back: DataChangeMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back.entity, Some(Entity::Recipe(recipe)));
    }

    #[test]
    fn finalization_event_references_plan_and_option() {
        let msg = DataChangeMessage::new(
            DataType::MealPlanOption,
            MessageType::MealPlanOptionFinalized,
            "u1",
            "h1",
        )
        .with_meal_plan_id("mp1")
        .with_meal_plan_option_id("o1");

        let json = msg.to_payload().unwrap();
        assert_eq!(json["mealPlanID"], "mp1");
        assert_eq!(json["mealPlanOptionID"], "o1");
        assert_eq!(json["messageType"], "mealPlanOptionFinalized");
    }

    #[test]
    fn archive_event_round_trips_without_a_snapshot() {
        let msg = DataChangeMessage::new(
            DataType::Webhook,
            MessageType::WebhookArchived,
            "u1",
            "h1",
        );

        let json = msg.to_payload().unwrap();
        assert!(json.get("webhook").is_none());

        let back: DataChangeMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }
}
