//! This module holds typed parameters for various endpoint inputs.
//!
//! Index parameters become equality filters (`IntoQueryFilterMap`) plus an
//! optional sort (`QuerySort`). Update parameters become partial column maps
//! (`IntoUpdateMap`) so PATCH bodies only touch the fields they name.

pub(crate) mod bookable_task_type;
pub(crate) mod customer;
pub(crate) mod email_template;
pub(crate) mod kb_article;
pub(crate) mod objective;
pub(crate) mod organization;
pub(crate) mod sort;
pub(crate) mod team;
pub(crate) mod ticket;
pub(crate) mod user;

use serde::{Deserialize, Deserializer};
use sort::SortOrder;

/// Fills in the sort field and direction an index request left out.
pub(crate) trait WithSortDefaults {
    type SortField;

    fn default_sort_order() -> SortOrder {
        SortOrder::Asc
    }

    fn apply_sort_defaults(
        sort_by: &mut Option<Self::SortField>,
        sort_order: &mut Option<SortOrder>,
        default_field: Self::SortField,
    ) {
        if sort_by.is_none() {
            *sort_by = Some(default_field);
        }
        if sort_order.is_none() {
            *sort_order = Some(Self::default_sort_order());
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in PATCH bodies. Use with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        description: Option<Option<String>>,
    }

    #[test]
    fn nullable_fields_distinguish_missing_from_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"description": "VIP"}"#).unwrap();

        assert_eq!(missing.description, None);
        assert_eq!(cleared.description, Some(None));
        assert_eq!(set.description, Some(Some("VIP".to_string())));
    }

    struct Params;

    impl WithSortDefaults for Params {
        type SortField = &'static str;
    }

    #[test]
    fn sort_defaults_only_fill_missing_values() {
        let mut sort_by = None;
        let mut sort_order = Some(SortOrder::Desc);
        Params::apply_sort_defaults(&mut sort_by, &mut sort_order, "name");

        assert_eq!(sort_by, Some("name"));
        assert!(matches!(sort_order, Some(SortOrder::Desc)));
    }
}
