use crate::domain::DeviceCatalog;
use serde::Serialize;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LauncherItems {
    pub items: Vec<LauncherItem>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LauncherItem {
    pub title: String,
    pub subtitle: String,
    pub arg: String,
    pub uid: String,
}

/// Devices first, then infrared remotes, both in catalog order.
pub fn launcher_items(catalog: &DeviceCatalog) -> LauncherItems {
    let devices = catalog.devices.iter().map(|device| LauncherItem {
        title: device.name.clone(),
        subtitle: device.device_type.clone(),
        arg: device.id.clone(),
        uid: device.id.clone(),
    });
    let remotes = catalog.infrared_remotes.iter().map(|remote| LauncherItem {
        title: remote.name.clone(),
        subtitle: remote.remote_type.clone(),
        arg: remote.id.clone(),
        uid: remote.id.clone(),
    });

    LauncherItems {
        items: devices.chain(remotes).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Device, InfraredRemote};

    #[test]
    fn renders_one_item_per_entry() {
        let catalog = DeviceCatalog {
            devices: vec![Device {
                id: "d1".to_string(),
                name: "Bot".to_string(),
                device_type: "Bot".to_string(),
                hub_id: "h".to_string(),
                cloud_service_enabled: Some(true),
                lock_device_id: None,
                keys: None,
            }],
            infrared_remotes: vec![InfraredRemote {
                id: "ir1".to_string(),
                name: "Living TV".to_string(),
                remote_type: "TV".to_string(),
                hub_id: "h".to_string(),
            }],
        };

        let value = serde_json::to_value(launcher_items(&catalog)).expect("encode");
        assert_eq!(
            value,
            serde_json::json!({
                "items": [
                    {"title": "Bot", "subtitle": "Bot", "arg": "d1", "uid": "d1"},
                    {"title": "Living TV", "subtitle": "TV", "arg": "ir1", "uid": "ir1"},
                ]
            })
        );
    }

    #[test]
    fn empty_catalog_renders_empty_items() {
        let items = launcher_items(&DeviceCatalog::default());
        assert_eq!(
            serde_json::to_string(&items).expect("encode"),
            r#"{"items":[]}"#
        );
    }
}
