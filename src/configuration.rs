use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Settings{
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JWTSettings,
    pub ai: AiSettings
}

#[derive(Deserialize, Debug)]
pub struct ApplicationSettings{
    pub host: String,
    pub port: u16
}

#[derive(Deserialize, Debug)]
pub struct DatabaseSettings{
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String
}

#[derive(Deserialize, Debug)]
pub struct JWTSettings{
    pub secret: String,
    pub expiry_hours: u64
}

#[derive(Deserialize, Debug)]
pub struct AiSettings{
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64
}

impl DatabaseSettings{
    // Connection string to the postgres server itself
    pub fn get_database_url(&self) -> String{
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }

    // Connection string to the configured database
    pub fn get_database_table_url(&self) -> String{
        format!("{}/{}", self.get_database_url(), self.name)
    }
}

impl Settings{
    pub fn get() -> Self{
        let config = Config::builder()
            .add_source(File::with_name("configuration/base.yaml"))
            .build()
            .expect("Failed to get configuration")
            .try_deserialize::<Settings>()
            .expect("Failed to deserialize to Settings struct");

        config
    }
}
