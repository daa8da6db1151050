use std::collections::HashMap;
use std::env;

use crate::{BlobError, BlobResult};

/// Connection settings for an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Config {
    /// Endpoint host, with or without scheme (`minio:9000`, `https://s3.example.com`)
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,

    /// Attach the `public-read` canned ACL to uploaded objects
    pub public_read: bool,
}

impl S3Config {
    pub fn new<S: Into<String>>(endpoint: S, bucket: S, region: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            region: region.into(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            public_read: false,
        }
    }

    pub fn with_credentials<S: Into<String>>(mut self, access_key_id: S, secret_access_key: S) -> Self {
        self.access_key_id = access_key_id.into();
        self.secret_access_key = secret_access_key.into();
        self
    }

    pub fn with_public_read(mut self) -> Self {
        self.public_read = true;
        self
    }

    /// Load from `PAINT_S3_*` environment variables
    pub fn from_env() -> BlobResult<Self> {
        Self::from_vars(env::vars())
    }

    pub(crate) fn from_vars<I>(vars: I) -> BlobResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with("PAINT_S3_"))
            .collect();

        let required = |key: &str| -> BlobResult<String> {
            vars.get(key)
                .cloned()
                .ok_or_else(|| BlobError::config(format!("{} environment variable required", key)))
        };

        let public_read = match vars.get("PAINT_S3_PUBLIC_READ") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .map_err(|_| BlobError::config(format!("PAINT_S3_PUBLIC_READ must be true or false, got {:?}", raw)))?,
            None => false,
        };

        Ok(Self {
            endpoint: required("PAINT_S3_ENDPOINT")?,
            bucket: required("PAINT_S3_BUCKET")?,
            region: required("PAINT_S3_REGION")?,
            access_key_id: required("PAINT_S3_ACCESS_KEY_ID")?,
            secret_access_key: required("PAINT_S3_SECRET_ACCESS_KEY")?,
            public_read,
        })
    }

    /// Endpoint as a URL; bare hosts are addressed over plain HTTP
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Base under which stored keys are publicly retrievable: `endpoint/bucket`
    pub fn retrieval_base(&self) -> String {
        format!("{}/{}", self.endpoint_url(), self.bucket)
    }

    pub(crate) fn validate(&self) -> BlobResult<()> {
        if self.bucket.is_empty() {
            return Err(BlobError::config("bucket name must not be empty"));
        }
        if self.endpoint.is_empty() {
            return Err(BlobError::config("endpoint must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        let config = S3Config::new("minio:9000", "images", "us-east-1");
        assert_eq!(config.endpoint_url(), "http://minio:9000");
        assert_eq!(config.retrieval_base(), "http://minio:9000/images");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let config = S3Config::new("https://s3.example.com/", "images", "eu-west-1");
        assert_eq!(config.endpoint_url(), "https://s3.example.com");
    }

    #[test]
    fn empty_bucket_is_rejected() {
        let config = S3Config::new("minio:9000", "", "us-east-1");
        assert!(matches!(config.validate(), Err(BlobError::Config { .. })));
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const COMPLETE: &[(&str, &str)] = &[
        ("PAINT_S3_ENDPOINT", "minio:9000"),
        ("PAINT_S3_BUCKET", "images"),
        ("PAINT_S3_REGION", "us-east-1"),
        ("PAINT_S3_ACCESS_KEY_ID", "paint"),
        ("PAINT_S3_SECRET_ACCESS_KEY", "secret"),
    ];

    #[test]
    fn complete_environment_loads() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("PAINT_S3_PUBLIC_READ", "true"));
        pairs.push(("HOME", "/root"));

        let config = S3Config::from_vars(vars(&pairs)).unwrap();
        assert_eq!(config.endpoint, "minio:9000");
        assert_eq!(config.bucket, "images");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.access_key_id, "paint");
        assert_eq!(config.secret_access_key, "secret");
        assert!(config.public_read);
    }

    #[test]
    fn public_read_defaults_to_off() {
        let config = S3Config::from_vars(vars(COMPLETE)).unwrap();
        assert!(!config.public_read);
    }

    #[test]
    fn missing_bucket_is_a_config_error() {
        let pairs: Vec<_> = COMPLETE
            .iter()
            .copied()
            .filter(|(key, _)| *key != "PAINT_S3_BUCKET")
            .collect();

        let err = S3Config::from_vars(vars(&pairs)).unwrap_err();
        assert!(matches!(err, BlobError::Config { ref message } if message.contains("PAINT_S3_BUCKET")));
    }

    #[test]
    fn non_bool_public_read_is_a_config_error() {
        let mut pairs = COMPLETE.to_vec();
        pairs.push(("PAINT_S3_PUBLIC_READ", "sometimes"));

        let err = S3Config::from_vars(vars(&pairs)).unwrap_err();
        assert!(matches!(err, BlobError::Config { ref message } if message.contains("sometimes")));
    }
}
