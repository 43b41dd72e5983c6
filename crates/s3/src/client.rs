//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3h-core.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};

use s3h_core::{Config, Error, ListOptions, ListResult, ObjectInfo, ObjectStore, Result};

/// Service error codes meaning the key or bucket does not exist
const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound"];

/// Service error codes meaning the credentials were rejected
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "Forbidden",
];

/// S3 client bound to the configured bucket
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from the loaded configuration
    pub async fn new(config: &Config) -> Result<Self> {
        // Build credentials provider
        let credentials = aws_credential_types::Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None, // session token
            None, // expiry
            "s3h-static-credentials",
        );

        // Build SDK config
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style())
            .build();

        tracing::debug!(
            bucket = %config.bucket_name,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.bucket_name.clone(),
        })
    }

    /// Bucket every request is sent to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Map an SDK error onto the core error classification
fn classify<E, R>(err: SdkError<E, R>, subject: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::ServiceError(_) => match err.code() {
            Some(code) if NOT_FOUND_CODES.contains(&code) => Error::NotFound(subject.to_string()),
            Some(code) if AUTH_CODES.contains(&code) => Error::Auth(format!("{subject}: {message}")),
            _ => Error::General(format!("{subject}: {message}")),
        },
        _ => Error::Network(format!("{subject}: {message}")),
    }
}

fn to_timestamp(value: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(value.secs()).ok()
}

fn trim_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

/// `x-amz-copy-source` value: the key is percent-encoded per segment, `/` kept
fn copy_source(bucket: &str, key: &str) -> String {
    let encoded: Vec<_> = key.split('/').map(urlencoding::encode).collect();
    format!("{bucket}/{}", encoded.join("/"))
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(&self, prefix: &str, options: ListOptions) -> Result<ListResult> {
        let mut request = self.inner.list_objects_v2().bucket(&self.bucket);

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        // Set delimiter (for non-recursive listing)
        if !options.recursive {
            request = request.delimiter(options.delimiter.as_deref().unwrap_or("/"));
        }

        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }

        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify(e, &format!("{}/{prefix}", self.bucket)))?;

        let mut items = Vec::new();

        for object in response.contents() {
            let key = object.key().unwrap_or_default().to_string();
            let mut info = ObjectInfo::file(&key, object.size().unwrap_or(0));
            info.last_modified = object.last_modified().and_then(to_timestamp);
            info.etag = object.e_tag().map(trim_etag);
            items.push(info);
        }

        // Common prefixes (directories)
        for common in response.common_prefixes() {
            if let Some(p) = common.prefix() {
                items.push(ObjectInfo::dir(p));
            }
        }

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, key))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(format!("{key}: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let size = data.len() as i64;

        let response = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type.clone())
            .send()
            .await
            .map_err(|e| classify(e, key))?;

        let mut info = ObjectInfo::file(key, size);
        info.etag = response.e_tag().map(trim_etag);
        info.content_type = content_type;
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<ObjectInfo> {
        let source = copy_source(&self.bucket, src_key);

        let response = self
            .inner
            .copy_object()
            .copy_source(&source)
            .bucket(&self.bucket)
            .key(dst_key)
            .send()
            .await
            .map_err(|e| classify(e, src_key))?;

        let result = response.copy_object_result();

        // CopyObject does not report the size
        Ok(ObjectInfo {
            key: dst_key.to_string(),
            size_bytes: None,
            size_human: None,
            last_modified: result.and_then(|r| r.last_modified()).and_then(to_timestamp),
            etag: result.and_then(|r| r.e_tag()).map(trim_etag),
            content_type: None,
            is_dir: false,
        })
    }

    async fn delete_objects(&self, keys: Vec<String>) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::General(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| classify(e, &self.bucket))?;

        let deleted: Vec<String> = response
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(str::to_string))
            .collect();

        for error in response.errors() {
            tracing::warn!(
                key = error.key().unwrap_or_default(),
                code = error.code().unwrap_or_default(),
                message = error.message().unwrap_or_default(),
                "Failed to delete object"
            );
        }

        Ok(deleted)
    }
}
