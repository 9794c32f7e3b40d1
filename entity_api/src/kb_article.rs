use super::error::Error;
use crate::mutate::{self, UpdateMap};
use chrono::Utc;
use entity::article_status::ArticleStatus;
use entity::kb_articles::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, IntoActiveModel, Value,
};
use slugify::slugify;

use log::*;

/// Normalizes a requested slug, falling back on one derived from the title.
pub fn slug_for(title: &str, requested: &str) -> String {
    let source = if requested.trim().is_empty() {
        title
    } else {
        requested
    };
    slugify!(source)
}

pub async fn create(
    db: &impl ConnectionTrait,
    organization_id: Id,
    author_id: Id,
    article_model: Model,
) -> Result<Model, Error> {
    debug!("New KB Article to be inserted: {}", article_model.title);

    let now = Utc::now();
    let published_at: Option<DateTimeWithTimeZone> =
        (article_model.status == ArticleStatus::Published).then(|| now.into());

    let active_model = ActiveModel {
        organization_id: Set(organization_id),
        author_id: Set(author_id),
        slug: Set(slug_for(&article_model.title, &article_model.slug)),
        title: Set(article_model.title),
        body: Set(article_model.body),
        category: Set(article_model.category),
        status: Set(article_model.status),
        published_at: Set(published_at),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

/// Applies a partial update. The first transition to `published` stamps
/// `published_at`; a supplied slug is normalized.
pub async fn update(
    db: &impl ConnectionTrait,
    existing: Model,
    mut update_map: UpdateMap,
) -> Result<Model, Error> {
    if let Some(Value::String(Some(slug))) = update_map.get("slug").cloned() {
        let title = match update_map.get("title") {
            Some(Value::String(Some(title))) => title.to_string(),
            _ => existing.title.clone(),
        };
        update_map.insert(
            "slug".to_string(),
            Some(Value::String(Some(Box::new(slug_for(&title, &slug))))),
        );
    }

    if let Some(Value::String(Some(status))) = update_map.get("status").cloned() {
        let new_status = ArticleStatus::try_from_value(&status.to_string())?;
        if new_status == ArticleStatus::Published && existing.published_at.is_none() {
            let now: DateTimeWithTimeZone = Utc::now().into();
            update_map.insert("published_at".to_string(), Some(now.into()));
        }
    }

    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

pub async fn find_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::OrganizationId.eq(organization_id))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn delete_by_id(
    db: &impl ConnectionTrait,
    organization_id: Id,
    id: Id,
) -> Result<(), Error> {
    let article = find_by_id(db, organization_id, id).await?;
    article.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_for_derives_from_title_when_blank() {
        assert_eq!(slug_for("Resetting a Router", ""), "resetting-a-router");
        assert_eq!(slug_for("Resetting a Router", "  "), "resetting-a-router");
        assert_eq!(slug_for("ignored", "Router Reset FAQ"), "router-reset-faq");
    }
}
