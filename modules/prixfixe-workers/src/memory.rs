//! In-memory collaborators for tests and the replay tool. No database or
//! search cluster required.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prixfixe_common::*;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Verb;
use crate::search::IndexDefinition;
use crate::traits::{DataManager, SearchIndexManager, SearchIndexProvider};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

trait Stored: Record + Serialize + Clone {
    const DATA_TYPE: DataType;

    fn table(state: &mut State) -> &mut Table<Self>;
    fn set_id(&mut self, id: String);
    fn created_at(&self) -> DateTime<Utc>;
    fn set_created_at(&mut self, at: DateTime<Utc>);
    fn set_last_updated_at(&mut self, at: DateTime<Utc>);
    fn archived_at(&self) -> Option<DateTime<Utc>>;
    fn set_archived_at(&mut self, at: Option<DateTime<Utc>>);
}

macro_rules! impl_stored {
    ($($ty:ty => $data_type:ident, $table:ident;)*) => {
        $(
            impl Stored for $ty {
                const DATA_TYPE: DataType = DataType::$data_type;

                fn table(state: &mut State) -> &mut Table<Self> {
                    &mut state.$table
                }
                fn set_id(&mut self, id: String) {
                    self.id = id;
                }
                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
                fn set_created_at(&mut self, at: DateTime<Utc>) {
                    self.created_at = at;
                }
                fn set_last_updated_at(&mut self, at: DateTime<Utc>) {
                    self.last_updated_at = Some(at);
                }
                fn archived_at(&self) -> Option<DateTime<Utc>> {
                    self.archived_at
                }
                fn set_archived_at(&mut self, at: Option<DateTime<Utc>>) {
                    self.archived_at = at;
                }
            }
        )*
    };
}

impl_stored! {
    Meal => Meal, meals;
    Recipe => Recipe, recipes;
    RecipeStep => RecipeStep, recipe_steps;
    RecipeStepInstrument => RecipeStepInstrument, recipe_step_instruments;
    RecipeStepIngredient => RecipeStepIngredient, recipe_step_ingredients;
    RecipeStepProduct => RecipeStepProduct, recipe_step_products;
    MealPlan => MealPlan, meal_plans;
    MealPlanOption => MealPlanOption, meal_plan_options;
    MealPlanOptionVote => MealPlanOptionVote, meal_plan_option_votes;
    ValidIngredient => ValidIngredient, valid_ingredients;
    ValidInstrument => ValidInstrument, valid_instruments;
    ValidPreparation => ValidPreparation, valid_preparations;
    ValidIngredientPreparation => ValidIngredientPreparation, valid_ingredient_preparations;
    HouseholdInvitation => HouseholdInvitation, household_invitations;
    Webhook => Webhook, webhooks;
}

struct Table<T> {
    rows: BTreeMap<String, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Stored> Table<T> {
    /// Insert unless the ID is taken, in which case the stored row wins.
    fn create(&mut self, mut row: T) -> T {
        if row.id().is_empty() {
            row.set_id(Uuid::new_v4().to_string());
        }
        if let Some(existing) = self.rows.get(row.id()) {
            return existing.clone();
        }
        row.set_created_at(Utc::now());
        row.set_archived_at(None);
        self.rows.insert(row.id().to_string(), row.clone());
        row
    }

    fn update(&mut self, row: &T) -> Result<()> {
        let noun = T::DATA_TYPE.noun();
        let Some(existing) = self.rows.get_mut(row.id()) else {
            bail!("{noun} {} not found", row.id());
        };
        if existing.archived_at().is_some() {
            bail!("{noun} {} is archived", row.id());
        }
        let mut next = row.clone();
        next.set_created_at(existing.created_at());
        next.set_archived_at(None);
        next.set_last_updated_at(Utc::now());
        *existing = next;
        Ok(())
    }

    /// Archive `id` if `belongs` accepts it. Archiving twice is a no-op.
    fn archive(&mut self, id: &str, belongs: impl Fn(&T) -> bool) -> Result<()> {
        let noun = T::DATA_TYPE.noun();
        let row = self
            .rows
            .get_mut(id)
            .filter(|row| belongs(row))
            .ok_or_else(|| anyhow!("{noun} {id} not found"))?;
        if row.archived_at().is_none() {
            row.set_archived_at(Some(Utc::now()));
        }
        Ok(())
    }

    fn live(&self) -> impl Iterator<Item = &T> {
        self.rows.values().filter(|row| row.archived_at().is_none())
    }
}

/// Type-erased read access for assertions keyed by `DataType`.
trait Rows {
    fn contains(&self, id: &str) -> bool;
    fn is_archived(&self, id: &str) -> bool;
    fn live_count(&self) -> usize;
    fn snapshot(&self, id: &str) -> Option<serde_json::Value>;
}

impl<T: Stored> Rows for Table<T> {
    fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    fn is_archived(&self, id: &str) -> bool {
        self.rows
            .get(id)
            .is_some_and(|row| row.archived_at().is_some())
    }

    fn live_count(&self) -> usize {
        self.live().count()
    }

    fn snapshot(&self, id: &str) -> Option<serde_json::Value> {
        self.rows
            .get(id)
            .and_then(|row| serde_json::to_value(row).ok())
    }
}

#[derive(Default)]
struct State {
    meals: Table<Meal>,
    recipes: Table<Recipe>,
    recipe_steps: Table<RecipeStep>,
    recipe_step_instruments: Table<RecipeStepInstrument>,
    recipe_step_ingredients: Table<RecipeStepIngredient>,
    recipe_step_products: Table<RecipeStepProduct>,
    meal_plans: Table<MealPlan>,
    meal_plan_options: Table<MealPlanOption>,
    meal_plan_option_votes: Table<MealPlanOptionVote>,
    valid_ingredients: Table<ValidIngredient>,
    valid_instruments: Table<ValidInstrument>,
    valid_preparations: Table<ValidPreparation>,
    valid_ingredient_preparations: Table<ValidIngredientPreparation>,
    household_invitations: Table<HouseholdInvitation>,
    webhooks: Table<Webhook>,
    members: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    recording: bool,
    calls: Vec<String>,
}

impl State {
    fn rows(&self, data_type: DataType) -> Option<&dyn Rows> {
        let rows: &dyn Rows = match data_type {
            DataType::Meal => &self.meals,
            DataType::Recipe => &self.recipes,
            DataType::RecipeStep => &self.recipe_steps,
            DataType::RecipeStepInstrument => &self.recipe_step_instruments,
            DataType::RecipeStepIngredient => &self.recipe_step_ingredients,
            DataType::RecipeStepProduct => &self.recipe_step_products,
            DataType::MealPlan => &self.meal_plans,
            DataType::MealPlanOption => &self.meal_plan_options,
            DataType::MealPlanOptionVote => &self.meal_plan_option_votes,
            DataType::ValidIngredient => &self.valid_ingredients,
            DataType::ValidInstrument => &self.valid_instruments,
            DataType::ValidPreparation => &self.valid_preparations,
            DataType::ValidIngredientPreparation => &self.valid_ingredient_preparations,
            DataType::HouseholdInvitation => &self.household_invitations,
            DataType::Webhook => &self.webhooks,
            DataType::UserMembership => return None,
        };
        Some(rows)
    }

    fn insert(&mut self, entity: Entity) {
        match entity {
            Entity::Meal(e) => self.put(e),
            Entity::Recipe(e) => self.put(e),
            Entity::RecipeStep(e) => self.put(e),
            Entity::RecipeStepInstrument(e) => self.put(e),
            Entity::RecipeStepIngredient(e) => self.put(e),
            Entity::RecipeStepProduct(e) => self.put(e),
            Entity::MealPlan(e) => self.put(e),
            Entity::MealPlanOption(e) => self.put(e),
            Entity::MealPlanOptionVote(e) => self.put(e),
            Entity::ValidIngredient(e) => self.put(e),
            Entity::ValidInstrument(e) => self.put(e),
            Entity::ValidPreparation(e) => self.put(e),
            Entity::ValidIngredientPreparation(e) => self.put(e),
            Entity::HouseholdInvitation(e) => self.put(e),
            Entity::Webhook(e) => self.put(e),
        }
    }

    fn put<T: Stored>(&mut self, row: T) {
        T::table(self).rows.insert(row.id().to_string(), row);
    }
}

// ---------------------------------------------------------------------------
// MemoryDataManager
// ---------------------------------------------------------------------------

/// Name under which `fail_on` matches a create/update/archive call,
/// e.g. `create_recipe` or `archive_valid_ingredient`.
pub fn operation(verb: Verb, data_type: DataType) -> String {
    format!("{}_{}", verb.as_str(), data_type.as_str())
}

pub const FINALIZE_OPTION: &str = "finalize_meal_plan_option";
pub const FINALIZE_PLAN: &str = "attempt_to_finalize_complete_meal_plan";

/// Thread-safe in-memory data manager. Any operation can be made to fail, and
/// with [`recording`](Self::recording) every call is logged in order.
///
/// An option's ballot is complete once every member of the plan's household
/// has an unarchived vote on it. A plan is complete once it has at least one
/// unarchived option and every such option is chosen.
#[derive(Default)]
pub struct MemoryDataManager {
    state: Mutex<State>,
}

impl MemoryDataManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the users whose votes complete a ballot in `household_id`.
    pub fn with_household(self, household_id: &str, members: &[&str]) -> Self {
        self.with_households([(
            household_id.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        )])
    }

    /// Register several households' members at once.
    pub fn with_households(
        self,
        households: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Self {
        lock(&self.state).members.extend(households);
        self
    }

    /// Keep a log of every operation invoked, readable through [`calls`](Self::calls).
    pub fn recording(self) -> Self {
        lock(&self.state).recording = true;
        self
    }

    /// Store `entity` as-is, bypassing create semantics.
    pub fn seed(self, entity: impl Into<Entity>) -> Self {
        lock(&self.state).insert(entity.into());
        self
    }

    /// Make every call to `op` fail. See [`operation`], [`FINALIZE_OPTION`]
    /// and [`FINALIZE_PLAN`].
    pub fn fail_on(self, op: impl Into<String>) -> Self {
        lock(&self.state).failing.insert(op.into());
        self
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: &str) {
        lock(&self.state).failing.remove(op);
    }

    /// Every operation invoked so far, in order. Empty unless recording.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    pub fn contains(&self, data_type: DataType, id: &str) -> bool {
        lock(&self.state)
            .rows(data_type)
            .is_some_and(|rows| rows.contains(id))
    }

    pub fn is_archived(&self, data_type: DataType, id: &str) -> bool {
        lock(&self.state)
            .rows(data_type)
            .is_some_and(|rows| rows.is_archived(id))
    }

    /// Number of unarchived rows of `data_type`.
    pub fn count(&self, data_type: DataType) -> usize {
        lock(&self.state)
            .rows(data_type)
            .map_or(0, |rows| rows.live_count())
    }

    /// The stored row as it would appear on the wire.
    pub fn snapshot(&self, data_type: DataType, id: &str) -> Option<serde_json::Value> {
        lock(&self.state)
            .rows(data_type)
            .and_then(|rows| rows.snapshot(id))
    }

    pub fn meal_plan(&self, id: &str) -> Option<MealPlan> {
        lock(&self.state).meal_plans.rows.get(id).cloned()
    }

    pub fn meal_plan_option(&self, id: &str) -> Option<MealPlanOption> {
        lock(&self.state).meal_plan_options.rows.get(id).cloned()
    }

    fn begin(&self, op: &str) -> Result<MutexGuard<'_, State>> {
        let mut state = lock(&self.state);
        if state.recording {
            state.calls.push(op.to_string());
        }
        if state.failing.contains(op) {
            bail!("injected failure in {op}");
        }
        Ok(state)
    }

    fn create<T: Stored>(&self, row: T) -> Result<T> {
        let mut state = self.begin(&operation(Verb::Create, T::DATA_TYPE))?;
        Ok(T::table(&mut state).create(row))
    }

    fn update<T: Stored>(&self, row: &T) -> Result<()> {
        let mut state = self.begin(&operation(Verb::Update, T::DATA_TYPE))?;
        T::table(&mut state).update(row)
    }

    fn archive<T: Stored>(&self, id: &str, belongs: impl Fn(&T) -> bool) -> Result<()> {
        let mut state = self.begin(&operation(Verb::Archive, T::DATA_TYPE))?;
        T::table(&mut state).archive(id, belongs)
    }
}

#[async_trait]
impl DataManager for MemoryDataManager {
    // --- Create ---

    async fn create_meal(&self, input: &MealDatabaseCreationInput) -> Result<Meal> {
        self.create(Meal::from(input.clone()))
    }

    async fn create_recipe(&self, input: &RecipeDatabaseCreationInput) -> Result<Recipe> {
        self.create(Recipe::from(input.clone()))
    }

    async fn create_recipe_step(
        &self,
        input: &RecipeStepDatabaseCreationInput,
    ) -> Result<RecipeStep> {
        self.create(RecipeStep::from(input.clone()))
    }

    async fn create_recipe_step_instrument(
        &self,
        input: &RecipeStepInstrumentDatabaseCreationInput,
    ) -> Result<RecipeStepInstrument> {
        self.create(RecipeStepInstrument::from(input.clone()))
    }

    async fn create_recipe_step_ingredient(
        &self,
        input: &RecipeStepIngredientDatabaseCreationInput,
    ) -> Result<RecipeStepIngredient> {
        self.create(RecipeStepIngredient::from(input.clone()))
    }

    async fn create_recipe_step_product(
        &self,
        input: &RecipeStepProductDatabaseCreationInput,
    ) -> Result<RecipeStepProduct> {
        self.create(RecipeStepProduct::from(input.clone()))
    }

    async fn create_meal_plan(&self, input: &MealPlanDatabaseCreationInput) -> Result<MealPlan> {
        self.create(MealPlan::from(input.clone()))
    }

    async fn create_meal_plan_option(
        &self,
        input: &MealPlanOptionDatabaseCreationInput,
    ) -> Result<MealPlanOption> {
        self.create(MealPlanOption::from(input.clone()))
    }

    async fn create_meal_plan_option_vote(
        &self,
        input: &MealPlanOptionVoteDatabaseCreationInput,
    ) -> Result<MealPlanOptionVote> {
        self.create(MealPlanOptionVote::from(input.clone()))
    }

    async fn create_valid_ingredient(
        &self,
        input: &ValidIngredientDatabaseCreationInput,
    ) -> Result<ValidIngredient> {
        self.create(ValidIngredient::from(input.clone()))
    }

    async fn create_valid_instrument(
        &self,
        input: &ValidInstrumentDatabaseCreationInput,
    ) -> Result<ValidInstrument> {
        self.create(ValidInstrument::from(input.clone()))
    }

    async fn create_valid_preparation(
        &self,
        input: &ValidPreparationDatabaseCreationInput,
    ) -> Result<ValidPreparation> {
        self.create(ValidPreparation::from(input.clone()))
    }

    async fn create_valid_ingredient_preparation(
        &self,
        input: &ValidIngredientPreparationDatabaseCreationInput,
    ) -> Result<ValidIngredientPreparation> {
        self.create(ValidIngredientPreparation::from(input.clone()))
    }

    async fn create_household_invitation(
        &self,
        input: &HouseholdInvitationDatabaseCreationInput,
    ) -> Result<HouseholdInvitation> {
        self.create(HouseholdInvitation::from(input.clone()))
    }

    async fn create_webhook(&self, input: &WebhookDatabaseCreationInput) -> Result<Webhook> {
        self.create(Webhook::from(input.clone()))
    }

    // --- Update ---

    async fn update_recipe(&self, recipe: &Recipe) -> Result<()> {
        self.update(recipe)
    }

    async fn update_recipe_step(&self, step: &RecipeStep) -> Result<()> {
        self.update(step)
    }

    async fn update_recipe_step_instrument(
        &self,
        instrument: &RecipeStepInstrument,
    ) -> Result<()> {
        self.update(instrument)
    }

    async fn update_recipe_step_ingredient(
        &self,
        ingredient: &RecipeStepIngredient,
    ) -> Result<()> {
        self.update(ingredient)
    }

    async fn update_recipe_step_product(&self, product: &RecipeStepProduct) -> Result<()> {
        self.update(product)
    }

    async fn update_meal_plan(&self, plan: &MealPlan) -> Result<()> {
        self.update(plan)
    }

    async fn update_meal_plan_option(&self, option: &MealPlanOption) -> Result<()> {
        self.update(option)
    }

    async fn update_meal_plan_option_vote(&self, vote: &MealPlanOptionVote) -> Result<()> {
        self.update(vote)
    }

    async fn update_valid_ingredient(&self, ingredient: &ValidIngredient) -> Result<()> {
        self.update(ingredient)
    }

    async fn update_valid_instrument(&self, instrument: &ValidInstrument) -> Result<()> {
        self.update(instrument)
    }

    async fn update_valid_preparation(&self, preparation: &ValidPreparation) -> Result<()> {
        self.update(preparation)
    }

    async fn update_valid_ingredient_preparation(
        &self,
        pairing: &ValidIngredientPreparation,
    ) -> Result<()> {
        self.update(pairing)
    }

    // --- Archive ---

    // Meals and recipes record their author, not a household, so there is no
    // household column to scope these two by.
    async fn archive_meal(&self, meal_id: &str, _household_id: &str) -> Result<()> {
        self.archive::<Meal>(meal_id, |_| true)
    }

    async fn archive_recipe(&self, recipe_id: &str, _household_id: &str) -> Result<()> {
        self.archive::<Recipe>(recipe_id, |_| true)
    }

    async fn archive_recipe_step(&self, recipe_id: &str, recipe_step_id: &str) -> Result<()> {
        self.archive::<RecipeStep>(recipe_step_id, |s| s.belongs_to_recipe == recipe_id)
    }

    async fn archive_recipe_step_instrument(
        &self,
        recipe_step_id: &str,
        recipe_step_instrument_id: &str,
    ) -> Result<()> {
        self.archive::<RecipeStepInstrument>(recipe_step_instrument_id, |i| {
            i.belongs_to_recipe_step == recipe_step_id
        })
    }

    async fn archive_recipe_step_ingredient(
        &self,
        recipe_step_id: &str,
        recipe_step_ingredient_id: &str,
    ) -> Result<()> {
        self.archive::<RecipeStepIngredient>(recipe_step_ingredient_id, |i| {
            i.belongs_to_recipe_step == recipe_step_id
        })
    }

    async fn archive_recipe_step_product(
        &self,
        recipe_step_id: &str,
        recipe_step_product_id: &str,
    ) -> Result<()> {
        self.archive::<RecipeStepProduct>(recipe_step_product_id, |p| {
            p.belongs_to_recipe_step == recipe_step_id
        })
    }

    async fn archive_meal_plan(&self, meal_plan_id: &str, household_id: &str) -> Result<()> {
        self.archive::<MealPlan>(meal_plan_id, |p| p.belongs_to_household == household_id)
    }

    async fn archive_meal_plan_option(
        &self,
        meal_plan_id: &str,
        meal_plan_option_id: &str,
    ) -> Result<()> {
        self.archive::<MealPlanOption>(meal_plan_option_id, |o| {
            o.belongs_to_meal_plan == meal_plan_id
        })
    }

    async fn archive_meal_plan_option_vote(
        &self,
        meal_plan_option_id: &str,
        meal_plan_option_vote_id: &str,
    ) -> Result<()> {
        self.archive::<MealPlanOptionVote>(meal_plan_option_vote_id, |v| {
            v.belongs_to_meal_plan_option == meal_plan_option_id
        })
    }

    async fn archive_valid_ingredient(&self, valid_ingredient_id: &str) -> Result<()> {
        self.archive::<ValidIngredient>(valid_ingredient_id, |_| true)
    }

    async fn archive_valid_instrument(&self, valid_instrument_id: &str) -> Result<()> {
        self.archive::<ValidInstrument>(valid_instrument_id, |_| true)
    }

    async fn archive_valid_preparation(&self, valid_preparation_id: &str) -> Result<()> {
        self.archive::<ValidPreparation>(valid_preparation_id, |_| true)
    }

    async fn archive_valid_ingredient_preparation(
        &self,
        valid_ingredient_preparation_id: &str,
    ) -> Result<()> {
        self.archive::<ValidIngredientPreparation>(valid_ingredient_preparation_id, |_| true)
    }

    async fn archive_webhook(&self, webhook_id: &str, household_id: &str) -> Result<()> {
        self.archive::<Webhook>(webhook_id, |w| w.belongs_to_household == household_id)
    }

    // --- Vote finalization ---

    async fn finalize_meal_plan_option(
        &self,
        meal_plan_id: &str,
        meal_plan_option_id: &str,
        household_id: &str,
    ) -> Result<bool> {
        let mut guard = self.begin(FINALIZE_OPTION)?;
        let state = &mut *guard;

        let in_household = state
            .meal_plans
            .rows
            .get(meal_plan_id)
            .is_some_and(|p| p.belongs_to_household == household_id);
        if !in_household {
            bail!("meal plan {meal_plan_id} not found in household {household_id}");
        }

        let voters: HashSet<&str> = state
            .meal_plan_option_votes
            .live()
            .filter(|v| v.belongs_to_meal_plan_option == meal_plan_option_id)
            .map(|v| v.by_user.as_str())
            .collect();
        let members = state
            .members
            .get(household_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let ballot_complete =
            !members.is_empty() && members.iter().all(|m| voters.contains(m.as_str()));

        let option = state
            .meal_plan_options
            .rows
            .get_mut(meal_plan_option_id)
            .filter(|o| o.belongs_to_meal_plan == meal_plan_id)
            .ok_or_else(|| anyhow!("meal plan option {meal_plan_option_id} not found"))?;

        if option.archived_at.is_some() || option.chosen || !ballot_complete {
            return Ok(false);
        }
        option.chosen = true;
        option.last_updated_at = Some(Utc::now());
        Ok(true)
    }

    async fn attempt_to_finalize_complete_meal_plan(
        &self,
        meal_plan_id: &str,
        household_id: &str,
    ) -> Result<bool> {
        let mut guard = self.begin(FINALIZE_PLAN)?;
        let state = &mut *guard;

        let mut options = state
            .meal_plan_options
            .live()
            .filter(|o| o.belongs_to_meal_plan == meal_plan_id)
            .peekable();
        let has_options = options.peek().is_some();
        let all_chosen = options.all(|o| o.chosen);

        let plan = state
            .meal_plans
            .rows
            .get_mut(meal_plan_id)
            .filter(|p| p.belongs_to_household == household_id)
            .ok_or_else(|| {
                anyhow!("meal plan {meal_plan_id} not found in household {household_id}")
            })?;

        if plan.archived_at.is_some()
            || plan.status == MealPlanStatus::Finalized
            || !(has_options && all_chosen)
        {
            return Ok(false);
        }
        plan.status = MealPlanStatus::Finalized;
        plan.last_updated_at = Some(Utc::now());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// MemorySearchIndex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexCall {
    Index(String),
    Delete(String),
}

#[derive(Default)]
struct IndexState {
    documents: BTreeMap<String, serde_json::Value>,
    recording: bool,
    calls: Vec<IndexCall>,
    fail_index: bool,
    fail_delete: bool,
}

impl IndexState {
    fn record(&mut self, call: IndexCall) {
        if self.recording {
            self.calls.push(call);
        }
    }
}

/// Upsert/delete map standing in for one search index.
#[derive(Default)]
pub struct MemorySearchIndex {
    name: String,
    state: Mutex<IndexState>,
}

impl MemorySearchIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::default(),
        }
    }

    pub fn failing_index(self) -> Self {
        lock(&self.state).fail_index = true;
        self
    }

    pub fn failing_delete(self) -> Self {
        lock(&self.state).fail_delete = true;
        self
    }

    /// Keep a log of index and delete calls, readable through [`calls`](Self::calls).
    pub fn recording(self) -> Self {
        lock(&self.state).recording = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self, id: &str) -> Option<serde_json::Value> {
        lock(&self.state).documents.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> Vec<IndexCall> {
        lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl SearchIndexManager for MemorySearchIndex {
    async fn index(&self, id: &str, document: &serde_json::Value) -> Result<()> {
        let mut state = lock(&self.state);
        state.record(IndexCall::Index(id.to_string()));
        if state.fail_index {
            bail!("index {} rejected document {id}", self.name);
        }
        state.documents.insert(id.to_string(), document.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.record(IndexCall::Delete(id.to_string()));
        if state.fail_delete {
            bail!("index {} rejected delete of {id}", self.name);
        }
        state.documents.remove(id);
        Ok(())
    }
}

/// Hands out [`MemorySearchIndex`]es and keeps them for inspection.
#[derive(Default)]
pub struct MemorySearchIndexProvider {
    failing: HashSet<String>,
    provided: Mutex<HashMap<String, Arc<MemorySearchIndex>>>,
}

impl MemorySearchIndexProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, index: &str) -> Self {
        self.failing.insert(index.to_string());
        self
    }

    pub fn index(&self, name: &str) -> Option<Arc<MemorySearchIndex>> {
        lock(&self.provided).get(name).cloned()
    }
}

#[async_trait]
impl SearchIndexProvider for MemorySearchIndexProvider {
    async fn provide(&self, definition: &IndexDefinition) -> Result<Arc<dyn SearchIndexManager>> {
        if self.failing.contains(definition.name) {
            bail!("search backend refused index {}", definition.name);
        }
        let index = Arc::new(MemorySearchIndex::new(definition.name));
        lock(&self.provided).insert(definition.name.to_string(), index.clone());
        Ok(index)
    }
}
