//! Device type catalogue: types, software versions and platforms.

use crate::client::NetEdgeClient;
use crate::device::{
    DEVICE_LICENSE_MODE_BYOL, DEVICE_LICENSE_MODE_SUBSCRIPTION, DEVICE_MANAGEMENT_TYPE_EQUINIX,
    DEVICE_MANAGEMENT_TYPE_SELF,
};
use crate::Result;
use netedge_core::pagination::{OffsetPage, PagingConfig};
use netedge_core::Error;

const DEVICE_TYPES_PATH: &str = "/ne/v1/deviceTypes";

/// Device type offered by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceType {
    /// Type code, e.g. `CSR1000V`
    pub code: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Vendor
    pub vendor: Option<String>,
    /// Category, e.g. `ROUTER`
    pub category: Option<String>,
    /// Metros the type is available in
    pub metro_codes: Option<Vec<String>>,
}

/// Software version available for a device type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSoftwareVersion {
    /// Version
    pub version: Option<String>,
    /// Image name
    pub image_name: Option<String>,
    /// Release date
    pub date: Option<String>,
    /// Version status
    pub status: Option<String>,
    /// Whether the version is marked stable
    pub is_stable: Option<bool>,
    /// Release notes URL
    pub release_notes_link: Option<String>,
    /// Software packages shipping this version
    pub package_codes: Vec<String>,
}

/// Core and memory configuration available for a device type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePlatform {
    /// Flavor, e.g. `small`
    pub flavor: Option<String>,
    /// Number of cores
    pub core_count: Option<i64>,
    /// Memory size
    pub memory: Option<i64>,
    /// Memory unit
    pub memory_unit: Option<String>,
    /// Software packages supported on the platform
    pub package_codes: Vec<String>,
    /// Management types supported on the platform
    pub management_types: Vec<String>,
    /// License options supported on the platform
    pub license_options: Vec<String>,
}

mod wire {
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct DeviceType {
        pub device_type_code: Option<String>,
        pub name: Option<String>,
        pub description: Option<String>,
        pub vendor: Option<String>,
        pub category: Option<String>,
        pub available_metros: Option<Vec<AvailableMetro>>,
        pub software_packages: Vec<SoftwarePackage>,
        pub device_management_types: ManagementTypes,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct AvailableMetro {
        pub metro_code: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct SoftwarePackage {
        pub package_code: Option<String>,
        pub version_details: Vec<VersionDetails>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct VersionDetails {
        pub version: Option<String>,
        pub image_name: Option<String>,
        pub version_date: Option<String>,
        pub status: Option<String>,
        pub stable_version: Option<bool>,
        pub release_notes_link: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct ManagementTypes {
        #[serde(rename = "EQUINIX-CONFIGURED")]
        pub equinix_configured: Option<ManagementType>,
        #[serde(rename = "SELF-CONFIGURED")]
        pub self_configured: Option<ManagementType>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct ManagementType {
        pub license_options: LicenseOptions,
        pub supported: bool,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub(super) struct LicenseOptions {
        #[serde(rename = "SUB")]
        pub sub: Option<LicenseOption>,
        #[serde(rename = "BYOL")]
        pub byol: Option<LicenseOption>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct LicenseOption {
        pub cores: Vec<Core>,
        pub supported: bool,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct Core {
        pub core: Option<i64>,
        pub memory: Option<i64>,
        pub unit: Option<String>,
        pub flavor: Option<String>,
        pub package_codes: Vec<PackageCode>,
        pub supported: bool,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct PackageCode {
        pub package_code: Option<String>,
        pub supported: bool,
    }
}

impl From<wire::DeviceType> for DeviceType {
    fn from(wire: wire::DeviceType) -> Self {
        Self {
            code: wire.device_type_code,
            name: wire.name,
            description: wire.description,
            vendor: wire.vendor,
            category: wire.category,
            metro_codes: wire
                .available_metros
                .map(|metros| metros.into_iter().filter_map(|m| m.metro_code).collect()),
        }
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

/// Merge versions across software packages, keeping first-occurrence order.
fn software_versions(device_type: &wire::DeviceType) -> Vec<DeviceSoftwareVersion> {
    let mut versions: Vec<DeviceSoftwareVersion> = Vec::new();
    for package in &device_type.software_packages {
        for details in &package.version_details {
            let index = match versions.iter().position(|v| v.version == details.version) {
                Some(index) => index,
                None => {
                    versions.push(DeviceSoftwareVersion {
                        version: details.version.clone(),
                        image_name: details.image_name.clone(),
                        date: details.version_date.clone(),
                        status: details.status.clone(),
                        is_stable: details.stable_version,
                        release_notes_link: details.release_notes_link.clone(),
                        package_codes: Vec::new(),
                    });
                    versions.len() - 1
                }
            };
            if let Some(code) = &package.package_code {
                push_unique(&mut versions[index].package_codes, code);
            }
        }
    }
    versions
}

/// Group supported core configurations across management types and license
/// options.
fn platforms(device_type: &wire::DeviceType) -> Vec<DevicePlatform> {
    let management = &device_type.device_management_types;
    let management_types = [
        (DEVICE_MANAGEMENT_TYPE_EQUINIX, management.equinix_configured.as_ref()),
        (DEVICE_MANAGEMENT_TYPE_SELF, management.self_configured.as_ref()),
    ];

    let mut platforms: Vec<DevicePlatform> = Vec::new();
    for (management_name, management_type) in management_types {
        let Some(management_type) = management_type.filter(|m| m.supported) else {
            continue;
        };
        let license_options = [
            (DEVICE_LICENSE_MODE_SUBSCRIPTION, management_type.license_options.sub.as_ref()),
            (DEVICE_LICENSE_MODE_BYOL, management_type.license_options.byol.as_ref()),
        ];
        for (license_name, license_option) in license_options {
            let Some(license_option) = license_option.filter(|l| l.supported) else {
                continue;
            };
            for core in license_option.cores.iter().filter(|c| c.supported) {
                let index = match platforms.iter().position(|p| {
                    p.flavor == core.flavor
                        && p.core_count == core.core
                        && p.memory == core.memory
                        && p.memory_unit == core.unit
                }) {
                    Some(index) => index,
                    None => {
                        platforms.push(DevicePlatform {
                            flavor: core.flavor.clone(),
                            core_count: core.core,
                            memory: core.memory,
                            memory_unit: core.unit.clone(),
                            ..Default::default()
                        });
                        platforms.len() - 1
                    }
                };
                let platform = &mut platforms[index];
                for package in core.package_codes.iter().filter(|p| p.supported) {
                    if let Some(code) = &package.package_code {
                        push_unique(&mut platform.package_codes, code);
                    }
                }
                push_unique(&mut platform.management_types, management_name);
                push_unique(&mut platform.license_options, license_name);
            }
        }
    }
    platforms
}

impl NetEdgeClient {
    /// List every device type.
    ///
    /// # Errors
    ///
    /// Returns the first failing page request.
    pub async fn list_device_types(&self) -> Result<Vec<DeviceType>> {
        let types = self
            .list_all::<OffsetPage<wire::DeviceType>>(DEVICE_TYPES_PATH, PagingConfig::offset())
            .await?;
        Ok(types.into_iter().map(DeviceType::from).collect())
    }

    async fn single_device_type(&self, type_code: &str) -> Result<wire::DeviceType> {
        let mut types = self
            .list_all::<OffsetPage<wire::DeviceType>>(
                DEVICE_TYPES_PATH,
                PagingConfig::offset().with_param("deviceTypeCode", type_code),
            )
            .await?;
        match types.len() {
            0 => Err(Error::InvalidResponse(format!(
                "device type query returned no results for type code {type_code}"
            ))),
            1 => Ok(types.remove(0)),
            n => Err(Error::InvalidResponse(format!(
                "device type query returned {n} results for type code {type_code}"
            ))),
        }
    }

    /// Software versions available for a device type.
    ///
    /// Versions shipped by several packages are merged and list every package.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] unless the
    /// type code matches exactly one device type.
    pub async fn get_device_software_versions(
        &self,
        type_code: &str,
    ) -> Result<Vec<DeviceSoftwareVersion>> {
        let device_type = self.single_device_type(type_code).await?;
        Ok(software_versions(&device_type))
    }

    /// Core and memory configurations available for a device type.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] unless the
    /// type code matches exactly one device type.
    pub async fn get_device_platforms(&self, type_code: &str) -> Result<Vec<DevicePlatform>> {
        let device_type = self.single_device_type(type_code).await?;
        Ok(platforms(&device_type))
    }
}
