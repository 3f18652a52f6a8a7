//! AWS SDK client setup.

use aws_sdk_dynamodb::Client;

pub const DEFAULT_REGION: &str = "us-east-1";

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
    /// Named profile from the shared AWS config files.
    pub profile: Option<String>,
}

impl AwsConfig {
    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match (&self.endpoint_url, &self.profile) {
            (Some(url), _) => format!("Local DynamoDB ({})", url),
            (None, Some(profile)) => format!(
                "AWS DynamoDB (region: {}, profile: {})",
                self.region, profile
            ),
            (None, None) => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Creates a DynamoDB client with the given configuration.
pub async fn create_client(config: &AwsConfig) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(profile) = &config.profile {
        sdk_config_loader = sdk_config_loader.profile_name(profile);
    }

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_display() {
        let mut config = AwsConfig {
            endpoint_url: None,
            region: "eu-west-1".to_string(),
            profile: None,
        };
        assert_eq!(config.target_display(), "AWS DynamoDB (region: eu-west-1)");

        config.profile = Some("sandbox".to_string());
        assert_eq!(
            config.target_display(),
            "AWS DynamoDB (region: eu-west-1, profile: sandbox)"
        );

        config.endpoint_url = Some("http://localhost:8000".to_string());
        assert_eq!(
            config.target_display(),
            "Local DynamoDB (http://localhost:8000)"
        );
    }
}
