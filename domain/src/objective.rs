//! Objectives and their key results, with progress derived from check-ins.

use crate::error::Error;
use crate::{
    find_scoped, key_results, objectives, strip_immutable, string_value, team, user, uuid_value,
    Id, IntoQueryFilterMap, IntoUpdateMap, QuerySort, UpdateMap,
};
use entity_api::{key_result, mutate, objective};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel, Value};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

pub use entity_api::objective::{delete_by_id, find_by_id};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KeyResultWithProgress {
    #[serde(flatten)]
    pub key_result: key_results::Model,
    /// Percentage of the way from start to target, 0 to 100.
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ObjectiveWithKeyResults {
    #[serde(flatten)]
    pub objective: objectives::Model,
    pub key_results: Vec<KeyResultWithProgress>,
    /// Mean progress of the key results, 0 when there are none.
    pub progress: f64,
}

/// How far `current` has moved from `start` towards `target`, as a percentage
/// clamped to `[0, 100]`. Targets below the start value count downwards.
pub fn key_result_progress(start: f64, target: f64, current: f64) -> f64 {
    if target == start {
        return if current >= target { 100.0 } else { 0.0 };
    }
    ((current - start) / (target - start) * 100.0).clamp(0.0, 100.0)
}

pub fn objective_progress(key_results: &[KeyResultWithProgress]) -> f64 {
    if key_results.is_empty() {
        return 0.0;
    }
    key_results.iter().map(|kr| kr.progress).sum::<f64>() / key_results.len() as f64
}

fn with_progress(key_result: key_results::Model) -> KeyResultWithProgress {
    let progress = key_result_progress(
        key_result.start_value,
        key_result.target_value,
        key_result.current_value,
    );
    KeyResultWithProgress {
        key_result,
        progress,
    }
}

fn assemble(
    objective: objectives::Model,
    key_results: Vec<key_results::Model>,
) -> ObjectiveWithKeyResults {
    let key_results: Vec<_> = key_results.into_iter().map(with_progress).collect();
    ObjectiveWithKeyResults {
        progress: objective_progress(&key_results),
        objective,
        key_results,
    }
}

fn require_finite(field: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::validation(format!("{field} must be a finite number")))
    }
}

fn validate_key_result_values(update_map: &UpdateMap) -> Result<(), Error> {
    for column in ["start_value", "target_value", "current_value"] {
        if let Some(Value::Double(Some(value))) = update_map.get(column) {
            require_finite(column, *value)?;
        }
    }
    Ok(())
}

async fn ensure_references(
    db: &DatabaseConnection,
    organization_id: Id,
    owner_id: Option<Id>,
    team_id: Option<Id>,
) -> Result<(), Error> {
    if let Some(owner_id) = owner_id {
        user::ensure_member(db, organization_id, "owner", owner_id).await?;
    }
    if let Some(team_id) = team_id {
        team::ensure_in_organization(db, organization_id, team_id).await?;
    }
    Ok(())
}

/// Lists the organization's objectives, each with its key results and progress.
pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<ObjectiveWithKeyResults>, Error>
where
    P: IntoQueryFilterMap + QuerySort<objectives::Column>,
{
    let objectives =
        find_scoped::<objectives::Entity, objectives::Column, P>(db, organization_id, params)
            .await?;

    let ids = objectives.iter().map(|objective| objective.id).collect();
    let mut by_objective: HashMap<Id, Vec<key_results::Model>> = HashMap::new();
    for key_result in key_result::find_by_objective_ids(db, ids).await? {
        by_objective
            .entry(key_result.objective_id)
            .or_default()
            .push(key_result);
    }

    Ok(objectives
        .into_iter()
        .map(|objective| {
            let key_results = by_objective.remove(&objective.id).unwrap_or_default();
            assemble(objective, key_results)
        })
        .collect())
}

pub async fn find_with_key_results(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
) -> Result<ObjectiveWithKeyResults, Error> {
    let (objective, key_results) =
        objective::find_with_key_results(db, organization_id, id).await?;
    Ok(assemble(objective, key_results))
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    objective_model: objectives::Model,
) -> Result<objectives::Model, Error> {
    crate::require_text("title", &objective_model.title)?;
    crate::require_text("period", &objective_model.period)?;
    ensure_references(
        db,
        organization_id,
        objective_model.owner_id,
        objective_model.team_id,
    )
    .await?;

    let objective = objective::create(db, organization_id, objective_model).await?;
    info!(
        "Created objective {} for {} in organization {organization_id}",
        objective.id, objective.period
    );
    Ok(objective)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<objectives::Model, Error> {
    let update_map = strip_immutable(params.into_update_map());

    for column in ["title", "period"] {
        if let Some(value) = string_value(&update_map, column) {
            crate::require_text(column, value)?;
        }
    }
    ensure_references(
        db,
        organization_id,
        uuid_value(&update_map, "owner_id"),
        uuid_value(&update_map, "team_id"),
    )
    .await?;

    let existing = find_by_id(db, organization_id, id).await?;
    Ok(mutate::update::<objectives::ActiveModel, objectives::Column>(
        db,
        existing.into_active_model(),
        update_map,
    )
    .await?)
}

pub async fn find_key_results(
    db: &DatabaseConnection,
    organization_id: Id,
    objective_id: Id,
) -> Result<Vec<KeyResultWithProgress>, Error> {
    Ok(find_with_key_results(db, organization_id, objective_id)
        .await?
        .key_results)
}

pub async fn create_key_result(
    db: &DatabaseConnection,
    organization_id: Id,
    objective_id: Id,
    key_result_model: key_results::Model,
) -> Result<KeyResultWithProgress, Error> {
    crate::require_text("title", &key_result_model.title)?;
    require_finite("start_value", key_result_model.start_value)?;
    require_finite("target_value", key_result_model.target_value)?;
    require_finite("current_value", key_result_model.current_value)?;

    let objective = find_by_id(db, organization_id, objective_id).await?;
    let key_result = key_result::create(db, objective.id, key_result_model).await?;
    info!(
        "Added key result {} to objective {objective_id}",
        key_result.id
    );
    Ok(with_progress(key_result))
}

pub async fn update_key_result(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<KeyResultWithProgress, Error> {
    let mut update_map = strip_immutable(params.into_update_map());
    update_map.remove("objective_id");

    if let Some(title) = string_value(&update_map, "title") {
        crate::require_text("title", title)?;
    }
    validate_key_result_values(&update_map)?;

    let existing = key_result::find_by_id(db, organization_id, id).await?;
    let updated = mutate::update::<key_results::ActiveModel, key_results::Column>(
        db,
        existing.into_active_model(),
        update_map,
    )
    .await?;
    Ok(with_progress(updated))
}

/// Records progress on a key result.
pub async fn check_in(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    current_value: f64,
) -> Result<KeyResultWithProgress, Error> {
    require_finite("current_value", current_value)?;

    let existing = key_result::find_by_id(db, organization_id, id).await?;
    let updated = key_result::check_in(db, existing, current_value).await?;
    Ok(with_progress(updated))
}

pub async fn delete_key_result(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
) -> Result<(), Error> {
    key_result::delete_by_id(db, organization_id, id).await?;
    info!("Deleted key result {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;
    use chrono::Utc;

    fn key_result(start: f64, target: f64, current: f64) -> key_results::Model {
        let now = Utc::now();
        key_results::Model {
            id: Id::new_v4(),
            objective_id: Id::new_v4(),
            title: "Sign new business customers".to_string(),
            unit: None,
            start_value: start,
            target_value: target,
            current_value: current,
            status: Status::OnTrack,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn progress_is_the_share_of_the_distance_covered() {
        assert_eq!(key_result_progress(0.0, 40.0, 12.0), 30.0);
        assert_eq!(key_result_progress(0.0, 40.0, 40.0), 100.0);
    }

    #[test]
    fn progress_counts_down_towards_lower_targets() {
        assert_eq!(key_result_progress(24.0, 8.0, 14.0), 62.5);
        assert_eq!(key_result_progress(24.0, 8.0, 30.0), 0.0);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(key_result_progress(0.0, 10.0, -5.0), 0.0);
        assert_eq!(key_result_progress(0.0, 10.0, 25.0), 100.0);
    }

    #[test]
    fn equal_start_and_target_is_all_or_nothing() {
        assert_eq!(key_result_progress(5.0, 5.0, 5.0), 100.0);
        assert_eq!(key_result_progress(5.0, 5.0, 4.0), 0.0);
    }

    #[test]
    fn objective_progress_is_the_mean_of_its_key_results() {
        let key_results = vec![
            with_progress(key_result(0.0, 40.0, 12.0)),
            with_progress(key_result(24.0, 8.0, 14.0)),
        ];
        assert_eq!(objective_progress(&key_results), 46.25);
        assert_eq!(objective_progress(&[]), 0.0);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(require_finite("target_value", f64::NAN).is_err());
        assert!(require_finite("target_value", f64::INFINITY).is_err());
        assert!(require_finite("target_value", 3.5).is_ok());
    }

    #[test]
    fn progress_serializes_alongside_the_key_result() {
        let json = serde_json::to_value(with_progress(key_result(0.0, 40.0, 12.0))).unwrap();
        assert_eq!(json["progress"], 30.0);
        assert_eq!(json["target_value"], 40.0);
    }
}
