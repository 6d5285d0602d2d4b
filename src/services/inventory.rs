use crate::domain::constants::MAGIC_DNS_SUFFIX;
use crate::domain::models::{Device, HostMap};
use tracing::{debug, warn};

/// Source of the tailnet device list.
pub trait DeviceDirectory {
    fn list_devices(&self) -> anyhow::Result<Vec<Device>>;
}

#[derive(thiserror::Error, Debug)]
pub enum InventoryError {
    #[error("failed to fetch Tailscale devices")]
    Directory(#[source] anyhow::Error),
    #[error("bad host: bad device name: {0}")]
    InvalidDeviceName(String),
    #[error("bad host: device {0} has no addresses")]
    NoAddress(String),
}

impl InventoryError {
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::Directory(_) => "DIRECTORY_ERROR",
            InventoryError::InvalidDeviceName(_) => "INVALID_DEVICE_NAME",
            InventoryError::NoAddress(_) => "DEVICE_WITHOUT_ADDRESS",
        }
    }
}

/// First label of a `<label>.<...>.ts.net` name.
pub fn short_name(name: &str) -> Result<&str, InventoryError> {
    let parts: Vec<&str> = name.split('.').collect();
    let [first, .., tld_a, tld_b] = parts.as_slice() else {
        return Err(InventoryError::InvalidDeviceName(name.to_string()));
    };
    if first.is_empty() || [*tld_a, *tld_b] != MAGIC_DNS_SUFFIX {
        return Err(InventoryError::InvalidDeviceName(name.to_string()));
    }
    Ok(*first)
}

/// Lists every device once and maps short names to first addresses. Any
/// malformed device fails the whole fetch.
pub fn fetch_hosts(directory: &dyn DeviceDirectory) -> Result<HostMap, InventoryError> {
    let devices = directory.list_devices().map_err(InventoryError::Directory)?;
    debug!(count = devices.len(), "listed devices");

    let mut hosts = HostMap::new();
    for device in devices {
        let name = short_name(&device.name)?;
        let address = device
            .addresses
            .first()
            .ok_or_else(|| InventoryError::NoAddress(device.name.clone()))?;
        if let Some(previous) = hosts.insert(name.to_string(), address.clone()) {
            warn!(
                host = name,
                replaced = %previous,
                address = %address,
                "duplicate short name, keeping the later device"
            );
        }
    }
    Ok(hosts)
}
