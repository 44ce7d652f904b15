//! Uploaded files: cloud-init payloads and license files.

use crate::client::{path_segment, NetEdgeClient};
use crate::Result;
use netedge_core::Error;
use reqwest::multipart::{Form, Part};
use std::fmt;
use tracing::debug;

const FILES_PATH: &str = "/ne/v1/files";
const LICENSE_FILES_PATH: &str = "/ne/v1/devices/licenseFiles";

/// Purpose of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessType {
    /// Device license
    License,
    /// Cloud-init bootstrap configuration
    CloudInit,
}

impl ProcessType {
    /// Wire name of the process type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::License => "LICENSE",
            Self::CloudInit => "CLOUD_INIT",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// File identifier
    pub uuid: Option<String>,
    /// Original file name
    pub file_name: Option<String>,
    /// Metro the file was uploaded for
    pub metro_code: Option<String>,
    /// Device type the file applies to
    pub device_type_code: Option<String>,
    /// Process type, `LICENSE` or `CLOUD_INIT`
    pub process_type: Option<String>,
    /// Upload status
    pub status: Option<String>,
}

/// Content and form fields of a file upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUpload {
    /// Metro code
    pub metro_code: String,
    /// Device type code
    pub device_type_code: String,
    /// Device management type, see [`crate::device::DEVICE_MANAGEMENT_TYPE_SELF`]
    pub device_management_type: String,
    /// License mode, see [`crate::device::DEVICE_LICENSE_MODE_BYOL`]
    pub license_type: String,
    /// Name the file is uploaded under
    pub file_name: String,
    /// File content
    pub content: Vec<u8>,
}

impl FileUpload {
    fn form(&self) -> Form {
        Form::new()
            .text("metroCode", self.metro_code.clone())
            .text("deviceTypeCode", self.device_type_code.clone())
            .text("licenseType", self.license_type.clone())
            .text("deviceManagementType", self.device_management_type.clone())
            .part(
                "file",
                Part::bytes(self.content.clone()).file_name(self.file_name.clone()),
            )
    }
}

mod wire {
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct File {
        pub uuid: Option<String>,
        pub file_name: Option<String>,
        pub metro_code: Option<String>,
        pub device_type_code: Option<String>,
        pub process_type: Option<String>,
        pub status: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct FileUploadResponse {
        pub file_uuid: Option<String>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub(super) struct LicenseFileUploadResponse {
        pub file_id: Option<String>,
    }
}

impl From<wire::File> for File {
    fn from(wire: wire::File) -> Self {
        Self {
            uuid: wire.uuid,
            file_name: wire.file_name,
            metro_code: wire.metro_code,
            device_type_code: wire.device_type_code,
            process_type: wire.process_type,
            status: wire.status,
        }
    }
}

fn missing_id(path: &str, field: &str) -> Error {
    Error::InvalidResponse(format!("upload to {path} returned no {field}"))
}

impl NetEdgeClient {
    /// Upload a file and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] if the
    /// response carries no `fileUuid`.
    pub async fn upload_file(
        &self,
        upload: &FileUpload,
        process_type: ProcessType,
    ) -> Result<String> {
        debug!(
            file = %upload.file_name,
            %process_type,
            size = upload.content.len(),
            "Uploading file"
        );
        let form = upload.form().text("processType", process_type.as_str());
        let response: wire::FileUploadResponse = self.send_multipart(FILES_PATH, form).await?;
        response
            .file_uuid
            .ok_or_else(|| missing_id(FILES_PATH, "fileUuid"))
    }

    /// Fetch metadata of an uploaded file.
    ///
    /// # Errors
    ///
    /// Returns the request failure.
    pub async fn get_file(&self, uuid: &str) -> Result<File> {
        let path = format!("{FILES_PATH}/{}", path_segment(uuid)?);
        let file: wire::File = self.get_json(&path, &[]).await?;
        Ok(File::from(file))
    }

    /// Upload a device license file and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns the request failure, or [`Error::InvalidResponse`] if the
    /// response carries no `fileId`.
    pub async fn upload_license_file(&self, upload: &FileUpload) -> Result<String> {
        debug!(file = %upload.file_name, size = upload.content.len(), "Uploading license file");
        let response: wire::LicenseFileUploadResponse = self
            .send_multipart(LICENSE_FILES_PATH, upload.form())
            .await?;
        response
            .file_id
            .ok_or_else(|| missing_id(LICENSE_FILES_PATH, "fileId"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_upload(device_type: &str, file_name: &str) -> FileUpload {
        FileUpload {
            metro_code: "SV".to_string(),
            device_type_code: device_type.to_string(),
            device_management_type: "SELF-CONFIGURED".to_string(),
            license_type: "BYOL".to_string(),
            file_name: file_name.to_string(),
            content: b"#cloud-config\nhostname: edge\n".to_vec(),
        }
    }

    #[test]
    fn test_process_type_names() {
        assert_eq!(ProcessType::License.as_str(), "LICENSE");
        assert_eq!(ProcessType::CloudInit.to_string(), "CLOUD_INIT");
    }

    #[tokio::test]
    async fn test_upload_file_sends_form_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ne/v1/files"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .and(body_string_contains("name=\"metroCode\"\r\n\r\nSV"))
            .and(body_string_contains("name=\"deviceTypeCode\"\r\n\r\nAVIATRIX_EDGE"))
            .and(body_string_contains("name=\"processType\"\r\n\r\nCLOUD_INIT"))
            .and(body_string_contains("name=\"licenseType\"\r\n\r\nBYOL"))
            .and(body_string_contains("name=\"deviceManagementType\"\r\n\r\nSELF-CONFIGURED"))
            .and(body_string_contains("filename=\"AVIATRIX.txt\""))
            .and(body_string_contains("hostname: edge"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "fileUuid": "9da2b7b2-5f0b-4a8a-a8b0-e7fb5ff1f4b5"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let uuid = client
            .upload_file(&test_upload("AVIATRIX_EDGE", "AVIATRIX.txt"), ProcessType::CloudInit)
            .await
            .unwrap();
        assert_eq!(uuid, "9da2b7b2-5f0b-4a8a-a8b0-e7fb5ff1f4b5");
    }

    #[tokio::test]
    async fn test_upload_without_id_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ne/v1/files"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .upload_file(&test_upload("CSR1000V", "license.lic"), ProcessType::License)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(ref msg) if msg.contains("fileUuid")));
    }

    #[tokio::test]
    async fn test_upload_license_file_omits_process_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ne/v1/devices/licenseFiles"))
            .and(body_string_contains("name=\"deviceTypeCode\"\r\n\r\nCSRSDWAN"))
            .and(body_string_contains("filename=\"CSRSDWAN.cfg\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"fileId": "lic-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let id = client
            .upload_license_file(&test_upload("CSRSDWAN", "CSRSDWAN.cfg"))
            .await
            .unwrap();
        assert_eq!(id, "lic-1");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(!body.contains("processType"));
    }

    #[tokio::test]
    async fn test_get_file_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/files/file-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uuid": "file-1",
                "fileName": "AVIATRIX.txt",
                "metroCode": "SV",
                "deviceTypeCode": "AVIATRIX_EDGE",
                "processType": "CLOUD_INIT",
                "status": "UPLOADED"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let file = client.get_file("file-1").await.unwrap();
        assert_eq!(file.process_type.as_deref(), Some(ProcessType::CloudInit.as_str()));
        assert_eq!(file.status.as_deref(), Some("UPLOADED"));
    }

    #[tokio::test]
    async fn test_file_ids_are_path_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/files/file%231"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uuid": "file#1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let file = client.get_file("file#1").await.unwrap();
        assert_eq!(file.uuid.as_deref(), Some("file#1"));
    }
}
