use serde::Deserialize;
use std::env;

use crate::utils::time::DEFAULT_TZ_OFFSET_MINUTES;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub redis_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    /// Fixed offset (whole minutes east of UTC) in which all exam timing is
    /// evaluated. One value per deployment; never the system-local zone.
    pub tz_offset_minutes: i32,
    /// Registering as lecturer/admin requires this code; unset disables
    /// staff self-signup entirely.
    pub staff_signup_code: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        let redis_uri = settings
            .get_string("redis.uri")
            .or_else(|_| env::var("REDIS_URI"))
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "examroom".to_string());

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let tz_offset_minutes = settings
            .get_int("exam.tz_offset_minutes")
            .ok()
            .map(|v| v as i32)
            .or_else(|| {
                env::var("EXAM_TZ_OFFSET_MINUTES")
                    .ok()
                    .and_then(|v| v.parse::<i32>().ok())
            })
            .unwrap_or(DEFAULT_TZ_OFFSET_MINUTES);

        let staff_signup_code = settings
            .get_string("auth.staff_signup_code")
            .ok()
            .or_else(|| env::var("STAFF_SIGNUP_CODE").ok());

        Ok(Config {
            mongo_uri,
            redis_uri,
            mongo_database,
            jwt_secret,
            tz_offset_minutes,
            staff_signup_code,
        })
    }
}
