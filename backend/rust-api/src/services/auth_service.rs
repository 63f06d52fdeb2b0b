use anyhow::Context;
use chrono::{Duration, Utc};
use mongodb::bson::doc;
use mongodb::Database;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middlewares::auth::{JwtClaims, JwtService};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserProfile, UserRole};

const TOKEN_TTL_HOURS: i64 = 24;

pub struct AuthService {
    mongo: Database,
    jwt: JwtService,
    staff_signup_code: Option<String>,
}

impl AuthService {
    pub fn new(mongo: Database, jwt: JwtService, staff_signup_code: Option<String>) -> Self {
        Self {
            mongo,
            jwt,
            staff_signup_code,
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ApiError> {
        let role = self.resolve_role(&req)?;

        let existing = self
            .collection()
            .find_one(doc! { "email": &req.email })
            .await
            .context("Failed to query users")?;
        if existing.is_some() {
            return Err(ApiError::Conflict(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
            .context("Failed to hash password")?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: req.email,
            password_hash,
            name: req.name,
            role,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        self.collection()
            .insert_one(&user)
            .await
            .context("Failed to insert user")?;

        tracing::info!("User registered: {} ({})", user.email, user.role.as_str());
        let access_token = self.issue_token(&user)?;
        Ok(AuthResponse {
            access_token,
            user: UserProfile::from(user),
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, ApiError> {
        let user = self
            .collection()
            .find_one(doc! { "email": &req.email })
            .await
            .context("Failed to query users")?
            .ok_or(ApiError::Unauthorized)?;

        let valid = bcrypt::verify(&req.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(ApiError::Unauthorized);
        }

        self.collection()
            .update_one(
                doc! { "_id": &user.id },
                doc! { "$set": {
                    "lastLoginAt": crate::utils::time::chrono_to_bson(Utc::now()),
                } },
            )
            .await
            .context("Failed to record login time")?;

        tracing::info!("User logged in: {}", user.email);
        let access_token = self.issue_token(&user)?;
        Ok(AuthResponse {
            access_token,
            user: UserProfile::from(user),
        })
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        let user = self
            .collection()
            .find_one(doc! { "_id": user_id })
            .await
            .context("Failed to query users")?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
        Ok(UserProfile::from(user))
    }

    /// Everyone registers as a student unless the configured staff signup
    /// code accompanies the request.
    fn resolve_role(&self, req: &RegisterRequest) -> Result<UserRole, ApiError> {
        let requested = match req.role.as_deref() {
            None | Some("student") => return Ok(UserRole::Student),
            Some(other) => UserRole::parse(other)
                .ok_or_else(|| ApiError::validation(format!("Unknown role '{other}'")))?,
        };

        match &self.staff_signup_code {
            Some(code) if req.staff_code.as_deref() == Some(code.as_str()) => Ok(requested),
            _ => Err(ApiError::Forbidden(
                "A valid staff signup code is required for this role".to_string(),
            )),
        }
    }

    fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id.clone(),
            role: user.role.as_str().to_string(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        self.jwt
            .generate_token(claims)
            .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("Failed to issue token")))
    }

    fn collection(&self) -> mongodb::Collection<User> {
        self.mongo.collection::<User>("users")
    }
}
