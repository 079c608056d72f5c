use crate::domain::{Device, DeviceCatalog};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchField {
    ByName,
    ByType,
}

impl MatchField {
    pub fn label(self) -> &'static str {
        match self {
            Self::ByName => "name",
            Self::ByType => "type",
        }
    }

    fn value_of(self, device: &Device) -> &str {
        match self {
            Self::ByName => &device.name,
            Self::ByType => &device.device_type,
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MatchField {
    type Err = ResolveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::ByName),
            "type" => Ok(Self::ByType),
            other => Err(ResolveError::InvalidQuery(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceQuery {
    pub field: MatchField,
    pub value: String,
}

impl DeviceQuery {
    pub fn by_name(value: impl Into<String>) -> Self {
        Self {
            field: MatchField::ByName,
            value: value.into(),
        }
    }

    pub fn by_type(value: impl Into<String>) -> Self {
        Self {
            field: MatchField::ByType,
            value: value.into(),
        }
    }
}

impl fmt::Display for DeviceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedTarget {
    pub query: DeviceQuery,
    pub device_id: String,
    pub device_name: String,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ResolveError {
    #[error("no device with {field} {value:?}")]
    NotFound { field: MatchField, value: String },

    #[error("invalid match field: {0} (expected `name` or `type`)")]
    InvalidQuery(String),
}

/// First device in catalog order whose queried field equals the query value.
pub fn resolve<'a>(
    catalog: &'a DeviceCatalog,
    query: &DeviceQuery,
) -> Result<&'a Device, ResolveError> {
    catalog
        .devices
        .iter()
        .find(|device| query.field.value_of(device) == query.value)
        .ok_or_else(|| ResolveError::NotFound {
            field: query.field,
            value: query.value.clone(),
        })
}

/// Resolves every query; the first failure aborts the whole batch.
pub fn resolve_all(
    catalog: &DeviceCatalog,
    queries: &[DeviceQuery],
) -> Result<Vec<ResolvedTarget>, ResolveError> {
    queries
        .iter()
        .map(|query| {
            resolve(catalog, query).map(|device| ResolvedTarget {
                query: query.clone(),
                device_id: device.id.clone(),
                device_name: device.name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, name: &str, device_type: &str) -> Device {
        Device {
            id: id.to_string(),
            name: name.to_string(),
            device_type: device_type.to_string(),
            hub_id: "hub".to_string(),
            cloud_service_enabled: None,
            lock_device_id: None,
            keys: None,
        }
    }

    fn catalog() -> DeviceCatalog {
        DeviceCatalog {
            devices: vec![device("d1", "Bot", "Bot"), device("d2", "Lamp", "Light")],
            infrared_remotes: Vec::new(),
        }
    }

    #[test]
    fn resolves_by_type_and_name() {
        let catalog = catalog();
        let bot = resolve(&catalog, &DeviceQuery::by_type("Bot")).expect("bot");
        assert_eq!(bot.id, "d1");
        let lamp = resolve(&catalog, &DeviceQuery::by_name("Lamp")).expect("lamp");
        assert_eq!(lamp.id, "d2");
    }

    #[test]
    fn missing_device_is_not_found() {
        let error = resolve(&catalog(), &DeviceQuery::by_name("Missing")).expect_err("missing");
        assert_eq!(
            error,
            ResolveError::NotFound {
                field: MatchField::ByName,
                value: "Missing".to_string()
            }
        );
        assert!(error.to_string().contains("\"Missing\""));
    }

    #[test]
    fn first_match_wins_for_duplicates() {
        let catalog = DeviceCatalog {
            devices: vec![
                device("a", "Hall", "Color Bulb"),
                device("b", "Hall", "Color Bulb"),
            ],
            infrared_remotes: Vec::new(),
        };
        assert_eq!(
            resolve(&catalog, &DeviceQuery::by_name("Hall")).expect("hall").id,
            "a"
        );
        assert_eq!(
            resolve(&catalog, &DeviceQuery::by_type("Color Bulb"))
                .expect("bulb")
                .id,
            "a"
        );
    }

    #[test]
    fn match_is_exact_and_case_sensitive() {
        let catalog = catalog();
        assert!(resolve(&catalog, &DeviceQuery::by_name("lamp")).is_err());
        assert!(resolve(&catalog, &DeviceQuery::by_type("Bo")).is_err());
    }

    #[test]
    fn infrared_remotes_are_not_resolved() {
        let mut catalog = catalog();
        catalog.infrared_remotes.push(crate::domain::InfraredRemote {
            id: "ir".to_string(),
            name: "TV".to_string(),
            remote_type: "TV".to_string(),
            hub_id: "hub".to_string(),
        });
        assert!(resolve(&catalog, &DeviceQuery::by_name("TV")).is_err());
    }

    #[test]
    fn parses_match_field() {
        assert_eq!("name".parse::<MatchField>(), Ok(MatchField::ByName));
        assert_eq!("type".parse::<MatchField>(), Ok(MatchField::ByType));
        assert_eq!(
            "hub".parse::<MatchField>(),
            Err(ResolveError::InvalidQuery("hub".to_string()))
        );
    }

    #[test]
    fn resolve_all_keeps_order_and_fails_fast() {
        let catalog = catalog();
        let targets = resolve_all(
            &catalog,
            &[DeviceQuery::by_name("Lamp"), DeviceQuery::by_type("Bot")],
        )
        .expect("resolve");
        let ids = targets.iter().map(|t| t.device_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["d2", "d1"]);
        assert_eq!(targets[0].device_name, "Lamp");

        let error = resolve_all(
            &catalog,
            &[DeviceQuery::by_name("Lamp"), DeviceQuery::by_name("Missing")],
        )
        .expect_err("missing");
        assert!(matches!(error, ResolveError::NotFound { .. }));
    }
}
