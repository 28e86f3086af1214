use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Body of create and update requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CurdRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    #[schema(example = "Nguyen Van A", min_length = 1, max_length = 100)]
    pub name: String,

    #[serde(default)]
    #[schema(example = "a@example.com")]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    #[schema(example = "Ha Noi")]
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurdResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,

    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub updated_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> CurdRequest {
        CurdRequest {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(request("a").validate().is_ok());
        assert!(request(&"x".repeat(100)).validate().is_ok());

        let errs = request("").validate().unwrap_err();
        assert!(errs.field_errors().contains_key("name"));
        assert!(request(&"x".repeat(101)).validate().is_err());

        // Length counts characters, not bytes.
        assert!(request(&"ệ".repeat(100)).validate().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let req: CurdRequest = serde_json::from_str(r#"{"city": "Hue"}"#).unwrap();
        assert_eq!(req.city, "Hue");
        assert!(req.validate().is_err());
    }
}
