use serde::{Deserialize, Serialize};

/// Body of `POST /sign_up`.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /sign_in`.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /updatePassword`.
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmedPassword")]
    pub confirmed_password: String,
}

/// Payload returned by sign-up, sign-in and password change.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub name: String,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_password_uses_camel_case_confirmation() {
        let req: UpdatePasswordRequest = serde_json::from_str(
            r#"{"password":"password1","confirmedPassword":"password1"}"#,
        )
        .unwrap();
        assert_eq!(req.password, req.confirmed_password);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let req: SignUpRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn auth_data_serializes_name_and_token() {
        let data = AuthData {
            name: "alice1".into(),
            token: "t".into(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["name"], "alice1");
        assert_eq!(json["token"], "t");
    }
}
