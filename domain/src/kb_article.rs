use crate::article_status::ArticleStatus;
use crate::error::Error;
use crate::{
    kb_articles, strip_immutable, string_value, Id, IntoQueryFilterMap, IntoUpdateMap, QuerySort,
};
use entity_api::{kb_article, query};
use log::*;
use sea_orm::{DatabaseConnection, Value};

pub use entity_api::kb_article::{delete_by_id, slug_for};

/// Lists the organization's articles. Readers limited to published content
/// never see drafts or archived articles, whatever they filter on.
pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    published_only: bool,
    params: P,
) -> Result<Vec<kb_articles::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<kb_articles::Column>,
{
    let sort_column = params.get_sort_column();
    let sort_order = params.get_sort_order();
    let mut query_filter_map = params.into_query_filter_map().scoped_to(organization_id);
    if published_only {
        query_filter_map.insert(
            "status".to_string(),
            Some(Value::String(Some(Box::new(
                ArticleStatus::Published.to_string(),
            )))),
        );
    }

    Ok(query::find_by_sorted::<kb_articles::Entity, kb_articles::Column>(
        db,
        query_filter_map,
        sort_column,
        sort_order,
    )
    .await?)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    organization_id: Id,
    published_only: bool,
    id: Id,
) -> Result<kb_articles::Model, Error> {
    let article = kb_article::find_by_id(db, organization_id, id).await?;
    if published_only && article.status != ArticleStatus::Published {
        debug!("Hiding unpublished article {id}");
        return Err(Error::not_found());
    }
    Ok(article)
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    author_id: Id,
    article_model: kb_articles::Model,
) -> Result<kb_articles::Model, Error> {
    crate::require_text("title", &article_model.title)?;
    crate::require_text("body", &article_model.body)?;
    if slug_for(&article_model.title, &article_model.slug).is_empty() {
        return Err(Error::validation("title must contain letters or digits"));
    }

    let article = kb_article::create(db, organization_id, author_id, article_model).await?;
    info!(
        "Created KB article {} ({}) as {}",
        article.id, article.slug, article.status
    );
    Ok(article)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<kb_articles::Model, Error> {
    let mut update_map = strip_immutable(params.into_update_map());
    update_map.remove("author_id");
    update_map.remove("published_at");

    for column in ["title", "body"] {
        if let Some(value) = string_value(&update_map, column) {
            crate::require_text(column, value)?;
        }
    }

    let existing = kb_article::find_by_id(db, organization_id, id).await?;
    Ok(kb_article::update(db, existing, update_map).await?)
}
