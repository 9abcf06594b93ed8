use chrono::{DateTime, FixedOffset};

use crate::config::StorageConfig;
use livekit_protocol as proto;

/// Where a room recording is written and how it is linked from the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingTarget {
    pub filepath: String,
    pub public_url: String,
}

impl RecordingTarget {
    /// `{prefix}/{YYYYMMDD-hh_mm_ssAM}_{room}.mp3`, stamped in local time.
    pub fn for_room(storage: &StorageConfig, room: &str, now: DateTime<FixedOffset>) -> Self {
        let timestamp = now.format("%Y%m%d-%I_%M_%S%p");
        let safe_room = room.replace('/', "_");
        let prefix = storage.key_prefix.trim_matches('/');

        let filepath = if prefix.is_empty() {
            format!("{timestamp}_{safe_room}.mp3")
        } else {
            format!("{prefix}/{timestamp}_{safe_room}.mp3")
        };

        let base = storage
            .public_base_url
            .as_deref()
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", storage.bucket, storage.region));

        Self {
            public_url: format!("{base}/{filepath}"),
            filepath,
        }
    }

    /// MP3 file output uploaded straight to the storage bucket.
    pub fn file_output(&self, storage: &StorageConfig) -> proto::EncodedFileOutput {
        proto::EncodedFileOutput {
            file_type: proto::EncodedFileType::Mp3 as i32,
            filepath: self.filepath.clone(),
            disable_manifest: true,
            output: Some(proto::encoded_file_output::Output::S3(proto::S3Upload {
                access_key: storage.access_key.clone(),
                secret: storage.secret.clone(),
                region: storage.region.clone(),
                bucket: storage.bucket.clone(),
                ..Default::default()
            })),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn storage() -> StorageConfig {
        StorageConfig {
            bucket: "recording-bucket".to_string(),
            region: "ap-south-1".to_string(),
            access_key: "AK".to_string(),
            secret: "SK".to_string(),
            key_prefix: "recordings".to_string(),
            public_base_url: None,
        }
    }

    fn ist_afternoon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(330 * 60)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 15, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_path_and_url() {
        let target = RecordingTarget::for_room(&storage(), "call-919999999999-1234", ist_afternoon());
        assert_eq!(
            target.filepath,
            "recordings/20261018-03_04_05PM_call-919999999999-1234.mp3"
        );
        assert_eq!(
            target.public_url,
            "https://recording-bucket.s3.ap-south-1.amazonaws.com/recordings/20261018-03_04_05PM_call-919999999999-1234.mp3"
        );
    }

    #[test]
    fn test_slashes_in_room_are_replaced() {
        let target = RecordingTarget::for_room(&storage(), "clinic/call-1", ist_afternoon());
        assert!(target.filepath.ends_with("_clinic_call-1.mp3"));
    }

    #[test]
    fn test_public_base_override() {
        let mut storage = storage();
        storage.public_base_url = Some("https://cdn.example.com/".to_string());
        let target = RecordingTarget::for_room(&storage, "call-1", ist_afternoon());
        assert!(target.public_url.starts_with("https://cdn.example.com/recordings/"));
    }

    #[test]
    fn test_file_output_is_mp3_to_bucket() {
        let storage = storage();
        let target = RecordingTarget::for_room(&storage, "call-1", ist_afternoon());
        let output = target.file_output(&storage);

        assert_eq!(output.file_type, proto::EncodedFileType::Mp3 as i32);
        assert_eq!(output.filepath, target.filepath);
        assert!(output.disable_manifest);
        match output.output {
            Some(proto::encoded_file_output::Output::S3(s3)) => {
                assert_eq!(s3.bucket, "recording-bucket");
                assert_eq!(s3.region, "ap-south-1");
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
