use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    model::role::Role,
    models::Claims,
};

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

pub fn generate_token(user_id: u64, role: Role, secret: &str, ttl: usize) -> Result<String> {
    let claims = Claims {
        user_id,
        role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Store(format!("failed to sign token: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_with_the_same_secret() {
        let token = generate_token(42, Role::Admin, "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn token_signed_elsewhere_is_rejected() {
        let token = generate_token(42, Role::Employee, "s3cret", 60).unwrap();

        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: 1,
            role: Role::Employee,
            exp: now() - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();

        assert!(verify_token(&token, "s3cret").is_err());
    }
}
