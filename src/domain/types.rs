use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "deviceId")]
    pub id: String,
    #[serde(rename = "deviceName")]
    pub name: String,
    #[serde(rename = "deviceType")]
    pub device_type: String,
    #[serde(rename = "hubDeviceId", default)]
    pub hub_id: String,
    #[serde(
        rename = "enableCloudService",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cloud_service_enabled: Option<bool>,
    #[serde(
        rename = "lockDeviceId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lock_device_id: Option<String>,
    #[serde(rename = "keyList", default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<Key>>,
}

/// Keypad entry attached to a lock-style device.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub key_type: String,
    pub status: String,
    pub create_time: i64,
    pub password: String,
    pub iv: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct InfraredRemote {
    #[serde(rename = "deviceId")]
    pub id: String,
    #[serde(rename = "deviceName")]
    pub name: String,
    #[serde(rename = "remoteType")]
    pub remote_type: String,
    #[serde(rename = "hubDeviceId", default)]
    pub hub_id: String,
}

/// Devices and infrared remotes registered to an account, in API order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeviceCatalog {
    #[serde(rename = "deviceList", default)]
    pub devices: Vec<Device>,
    #[serde(rename = "infraredRemoteList", default)]
    pub infrared_remotes: Vec<InfraredRemote>,
}

impl DeviceCatalog {
    pub fn len(&self) -> usize {
        self.devices.len() + self.infrared_remotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.infrared_remotes.is_empty()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub command: String,
    pub parameter: String,
    pub command_type: String,
}

impl Command {
    pub fn turn_on() -> Self {
        Self {
            command: "turnOn".to_string(),
            parameter: "default".to_string(),
            command_type: "command".to_string(),
        }
    }
}
