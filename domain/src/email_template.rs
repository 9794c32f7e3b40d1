//! Email templates are Handlebars sources stored per organization.
//!
//! HTML bodies are rendered with HTML escaping. Subjects and text bodies are
//! rendered verbatim. Rendering is strict: a variable the template uses but
//! the caller didn't supply is an error rather than an empty string.

use crate::error::Error;
use crate::{
    email_templates, find_scoped, strip_immutable, string_value, Id, IntoQueryFilterMap,
    IntoUpdateMap, QuerySort,
};
use entity_api::{email_template, mutate};
use handlebars::{no_escape, Handlebars, Template};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel};
use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub use entity_api::email_template::{delete_by_id, find_by_id};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenderedEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
}

fn html_registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry
}

fn text_registry() -> Handlebars<'static> {
    let mut registry = html_registry();
    registry.register_escape_fn(no_escape);
    registry
}

/// Parses each Handlebars source, failing on the first syntax error.
fn compile_all<'a>(sources: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<(), Error> {
    for (field, source) in sources {
        Template::compile(source).map_err(|err| {
            debug!("Template field {field} failed to compile: {err}");
            Error::from(err)
        })?;
    }
    Ok(())
}

/// Renders the template's parts with `variables`, which must be a JSON object.
pub fn render_template(
    template: &email_templates::Model,
    variables: &JsonValue,
) -> Result<RenderedEmail, Error> {
    if !variables.is_object() {
        return Err(Error::validation("variables must be a JSON object"));
    }

    let html = html_registry();
    let text = text_registry();

    Ok(RenderedEmail {
        subject: text.render_template(&template.subject, variables)?,
        html_body: html.render_template(&template.html_body, variables)?,
        text_body: template
            .text_body
            .as_deref()
            .map(|body| text.render_template(body, variables))
            .transpose()?,
    })
}

pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<email_templates::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<email_templates::Column>,
{
    find_scoped::<email_templates::Entity, email_templates::Column, P>(db, organization_id, params)
        .await
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    template_model: email_templates::Model,
) -> Result<email_templates::Model, Error> {
    crate::require_text("name", &template_model.name)?;
    crate::require_text("subject", &template_model.subject)?;
    compile_all(
        [
            ("subject", template_model.subject.as_str()),
            ("html_body", template_model.html_body.as_str()),
        ]
        .into_iter()
        .chain(
            template_model
                .text_body
                .as_deref()
                .map(|body| ("text_body", body)),
        ),
    )?;

    let template = email_template::create(db, organization_id, template_model).await?;
    info!(
        "Created email template {} ({}) in organization {organization_id}",
        template.id, template.name
    );
    Ok(template)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<email_templates::Model, Error> {
    let update_map = strip_immutable(params.into_update_map());

    for column in ["name", "subject"] {
        if let Some(value) = string_value(&update_map, column) {
            crate::require_text(column, value)?;
        }
    }
    compile_all(
        ["subject", "html_body", "text_body"]
            .into_iter()
            .filter_map(|column| string_value(&update_map, column).map(|source| (column, source))),
    )?;

    let existing = find_by_id(db, organization_id, id).await?;
    Ok(
        mutate::update::<email_templates::ActiveModel, email_templates::Column>(
            db,
            existing.into_active_model(),
            update_map,
        )
        .await?,
    )
}

pub async fn render(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    variables: &JsonValue,
) -> Result<RenderedEmail, Error> {
    let template = find_by_id(db, organization_id, id).await?;
    render_template(&template, variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use chrono::Utc;
    use serde_json::json;

    fn template(html_body: &str, text_body: Option<&str>) -> email_templates::Model {
        let now = Utc::now();
        email_templates::Model {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            name: "ticket_resolved".to_string(),
            subject: "Resolved: {{ticket.title}}".to_string(),
            html_body: html_body.to_string(),
            text_body: text_body.map(str::to_string),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn is_validation(err: &Error) -> bool {
        matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        )
    }

    #[test]
    fn renders_every_part() {
        let template = template(
            "<p>Hi {{customer.name}}</p>",
            Some("Hi {{customer.name}}"),
        );
        let rendered = render_template(
            &template,
            &json!({"customer": {"name": "Harbour Cafe"}, "ticket": {"title": "Dropouts"}}),
        )
        .unwrap();

        assert_eq!(rendered.subject, "Resolved: Dropouts");
        assert_eq!(rendered.html_body, "<p>Hi Harbour Cafe</p>");
        assert_eq!(rendered.text_body.as_deref(), Some("Hi Harbour Cafe"));
    }

    #[test]
    fn html_is_escaped_but_text_is_not() {
        let template = template("<p>{{customer.name}}</p>", Some("{{customer.name}}"));
        let rendered = render_template(
            &template,
            &json!({"customer": {"name": "Tom & <Jerry>"}, "ticket": {"title": "A & B"}}),
        )
        .unwrap();

        assert_eq!(rendered.html_body, "<p>Tom &amp; &lt;Jerry&gt;</p>");
        assert_eq!(rendered.text_body.as_deref(), Some("Tom & <Jerry>"));
        assert_eq!(rendered.subject, "Resolved: A & B");
    }

    #[test]
    fn missing_variables_fail_validation() {
        let template = template("<p>{{customer.name}}</p>", None);
        let err = render_template(&template, &json!({"ticket": {"title": "Dropouts"}}))
            .unwrap_err();
        assert!(is_validation(&err));
    }

    #[test]
    fn variables_must_be_an_object() {
        let template = template("<p>static</p>", None);
        let err = render_template(&template, &json!(["not", "an", "object"])).unwrap_err();
        assert!(is_validation(&err));
    }

    #[test]
    fn syntax_errors_are_caught_at_compile_time() {
        let err = compile_all([("html_body", "<p>{{#if customer}}</p>")]).unwrap_err();
        assert!(is_validation(&err));
        assert!(compile_all([("html_body", "<p>{{customer.name}}</p>")]).is_ok());
    }
}
