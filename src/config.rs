use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        // DATABASE_URL wins outright; otherwise the URL is assembled from the
        // per-field variables so deployments can keep credentials separate.
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
                let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
                let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "hazardnet".to_string());
                let db_user = env::var("DB_USER").unwrap_or_else(|_| "hazardnet".to_string());
                let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "hazardnet".to_string());

                format!(
                    "postgres://{}:{}@{}:{}/{}",
                    db_user, db_pwd, db_host, db_port, db_name
                )
            }
        };

        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
        let bcrypt_cost = env::var("BCRYPT_COST")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            bcrypt_cost,
            log_level,
        })
    }
}
