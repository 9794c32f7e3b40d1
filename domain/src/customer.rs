use crate::error::Error;
use crate::{
    customers, find_scoped, strip_immutable, string_value, user, Id, IntoQueryFilterMap,
    IntoUpdateMap, QuerySort,
};
use entity_api::{customer, mutate};
use log::*;
use sea_orm::{DatabaseConnection, IntoActiveModel};

pub use entity_api::customer::{delete_by_id, find_by_id};

pub async fn find_by<P>(
    db: &DatabaseConnection,
    organization_id: Id,
    params: P,
) -> Result<Vec<customers::Model>, Error>
where
    P: IntoQueryFilterMap + QuerySort<customers::Column>,
{
    find_scoped::<customers::Entity, customers::Column, P>(db, organization_id, params).await
}

pub(crate) async fn ensure_in_organization(
    db: &DatabaseConnection,
    organization_id: Id,
    customer_id: Id,
) -> Result<(), Error> {
    customer::find_by_id(db, organization_id, customer_id)
        .await
        .map(|_| ())
        .map_err(|err| crate::invalid_reference(err.into(), "customer", customer_id))
}

fn validate_contact(email: Option<&str>) -> Result<(), Error> {
    match email {
        Some(email) if !email.trim().is_empty() => user::validate_email(email),
        _ => Ok(()),
    }
}

pub async fn create(
    db: &DatabaseConnection,
    organization_id: Id,
    customer_model: customers::Model,
) -> Result<customers::Model, Error> {
    crate::require_text("name", &customer_model.name)?;
    validate_contact(customer_model.email.as_deref())?;

    let customer = customer::create(db, organization_id, customer_model).await?;
    info!(
        "Created customer {} in organization {organization_id}",
        customer.id
    );
    Ok(customer)
}

pub async fn update(
    db: &DatabaseConnection,
    organization_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<customers::Model, Error> {
    let update_map = strip_immutable(params.into_update_map());

    if let Some(name) = string_value(&update_map, "name") {
        crate::require_text("name", name)?;
    }
    validate_contact(string_value(&update_map, "email"))?;

    let existing = find_by_id(db, organization_id, id).await?;
    Ok(mutate::update::<customers::ActiveModel, customers::Column>(
        db,
        existing.into_active_model(),
        update_map,
    )
    .await?)
}


#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::customer_status::CustomerStatus;
    use crate::{QueryFilterMap, UpdateMap};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Order, Value};

    struct ByStatus(CustomerStatus);

    impl IntoQueryFilterMap for ByStatus {
        fn into_query_filter_map(self) -> QueryFilterMap {
            let mut query_filter_map = QueryFilterMap::new();
            query_filter_map.insert(
                "status".to_string(),
                Some(Value::String(Some(Box::new(self.0.to_string())))),
            );
            // A caller supplied tenant is always replaced by the active one.
            query_filter_map.insert(
                "organization_id".to_string(),
                Some(Value::Uuid(Some(Box::new(Id::nil())))),
            );
            query_filter_map
        }
    }

    impl QuerySort<customers::Column> for ByStatus {
        fn get_sort_column(&self) -> Option<customers::Column> {
            Some(customers::Column::Name)
        }

        fn get_sort_order(&self) -> Option<Order> {
            Some(Order::Desc)
        }
    }

    struct Rename(&'static str);

    impl IntoUpdateMap for Rename {
        fn into_update_map(self) -> UpdateMap {
            let mut update_map = UpdateMap::new();
            update_map.insert(
                "name".to_string(),
                Some(Value::String(Some(Box::new(self.0.to_string())))),
            );
            update_map
        }
    }

    fn customer(organization_id: Id) -> customers::Model {
        let now = Utc::now();
        customers::Model {
            id: Id::new_v4(),
            organization_id,
            name: "Harbour Cafe".to_string(),
            email: None,
            phone: None,
            company: None,
            external_ref: None,
            status: CustomerStatus::Active,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_scopes_to_the_active_organization() -> Result<(), Error> {
        let organization_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer(organization_id)]])
            .into_connection();

        let found = find_by(&db, organization_id, ByStatus(CustomerStatus::Active)).await?;
        assert_eq!(found.len(), 1);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&organization_id.to_string()));
        assert!(!log.contains(&Id::nil().to_string()));
        assert!(log.contains("ORDER BY"));
        Ok(())
    }

    #[tokio::test]
    async fn blank_renames_are_rejected_before_touching_the_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = update(&db, Id::new_v4(), Id::new_v4(), Rename(" "))
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            crate::error::DomainErrorKind::Internal(
                crate::error::InternalErrorKind::Validation(_)
            )
        ));
    }
}
