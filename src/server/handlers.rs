use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    planner::{
        normalize::{normalize_meal, normalize_section},
        operations::TaskToggle,
        DayRecord,
    },
    utils::time::{date_to_record_name, parse_iso_date},
};

use super::{
    error::ApiError,
    extract::{ApiForm, ApiQuery},
    AppState,
};

type ApiResult<T = Json<Value>> = Result<T, ApiError>;

/// Checkbox state as sent by HTML forms. Anything but "true" is unchecked.
fn is_checked(done: &str) -> bool {
    done == "true"
}

impl AppState {
    fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// The day a request is about: the `date` field if present, today otherwise.
    fn day(&self, date: Option<&str>) -> Result<NaiveDate, ApiError> {
        match date.filter(|v| !v.is_empty()) {
            Some(date) => parse_iso_date(date).ok_or_else(|| {
                ApiError::bad_request(format!("Invalid date '{date}'. Use YYYY-MM-DD"))
            }),
            None => Ok(self.today()),
        }
    }
}

fn success(extra: Value) -> Json<Value> {
    let mut body = json!({ "success": true });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    Json(body)
}

pub async fn today(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "today": date_to_record_name(state.today()) }))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    date: Option<String>,
}

/// Today's record is created on first access, other days must exist.
pub async fn day(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DayQuery>,
) -> ApiResult<Json<DayRecord>> {
    let date = state.day(query.date.as_deref())?;
    let record = if date == state.today() {
        state.tracker.load_or_init(date).await?
    } else {
        state.tracker.load(date).await?
    };
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn search_food(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult {
    let foods: Vec<_> = state
        .tracker
        .search_food(&query.q)
        .await?
        .into_iter()
        .map(|(name, info)| {
            json!({
                "name": name,
                "protein": info.protein,
                "fat": info.fat,
                "carbon": info.carbon,
            })
        })
        .collect();
    Ok(Json(json!({ "foods": foods })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskForm {
    date: Option<String>,
    part: String,
    index: usize,
    done: String,
}

pub async fn update_task(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<UpdateTaskForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let task = state
        .tracker
        .set_task(date, &form.part, form.index, is_checked(&form.done))
        .await?;
    Ok(success(json!({ "task": task.label })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalForm {
    date: Option<String>,
    section: String,
    index: usize,
    done: String,
}

pub async fn update_goal(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<UpdateGoalForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let section = normalize_section(&form.section)?;
    let goal = state
        .tracker
        .set_goal(date, section, form.index, is_checked(&form.done))
        .await?;
    Ok(success(json!({ "goal": goal.text })))
}

#[derive(Debug, Deserialize)]
pub struct CheckForm {
    date: Option<String>,
    text: String,
    done: String,
}

pub async fn check(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CheckForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let toggle = state
        .tracker
        .check_task(date, &form.text, is_checked(&form.done))
        .await?;
    let body = match toggle {
        TaskToggle::Changed { task, .. } => json!({
            "changed": true,
            "task": task.label,
            "part": task.section,
        }),
        TaskToggle::Unchanged { matches, .. } => json!({
            "changed": false,
            "matches": matches.into_iter().map(|v| v.label).collect::<Vec<_>>(),
        }),
    };
    Ok(success(body))
}

#[derive(Debug, Deserialize)]
pub struct CheckGoalForm {
    date: Option<String>,
    section: String,
    text: String,
    done: String,
}

pub async fn check_goal(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<CheckGoalForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let section = normalize_section(&form.section)?;
    let goal = state
        .tracker
        .check_goal(date, section, &form.text, is_checked(&form.done))
        .await?;
    Ok(success(json!({ "goal": goal.text, "index": goal.index })))
}

#[derive(Debug, Deserialize)]
pub struct AddGoalForm {
    date: Option<String>,
    section: String,
    text: String,
}

pub async fn add_goal(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<AddGoalForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let section = normalize_section(&form.section)?;
    state.tracker.add_goal(date, section, &form.text).await?;
    Ok(success(json!({})))
}

#[derive(Debug, Deserialize)]
pub struct AddFoodForm {
    date: Option<String>,
    meal: String,
    name: String,
    weight: f64,
}

pub async fn add_food(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<AddFoodForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let meal = normalize_meal(&form.meal)?;
    let added = state
        .tracker
        .add_food(date, meal, &form.name, form.weight)
        .await?;
    Ok(success(json!({ "entry": added.entry })))
}

#[derive(Debug, Deserialize)]
pub struct AddWaterForm {
    date: Option<String>,
    amount: i64,
}

pub async fn add_water(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<AddWaterForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let total = state.tracker.add_water(date, form.amount).await?;
    Ok(success(json!({ "total": total })))
}

#[derive(Debug, Deserialize)]
pub struct PlanForm {
    date: Option<String>,
    task: String,
    start: i64,
    end: Option<i64>,
}

pub async fn plan(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<PlanForm>,
) -> ApiResult {
    let date = state.day(form.date.as_deref())?;
    let range = state
        .tracker
        .plan(date, &form.task, form.start, form.end)
        .await?;
    Ok(success(json!({ "start": range.start, "end": range.end })))
}
