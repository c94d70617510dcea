pub mod config {
    use serde::Deserialize;

    /// Which task store backs the application.
    #[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum StorageKind {
        /// Tasks live in the relational database at `database_url`.
        #[default]
        Sqlite,
        /// Tasks live in process memory and are lost on exit.
        Memory,
    }

    #[derive(Deserialize, Debug)]
    pub struct Config {
        #[serde(default = "default_database_url")]
        pub database_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default)]
        pub storage: StorageKind,
        /// Seeds the in-memory store with demo tasks. Ignored for the database store.
        #[serde(default)]
        pub demo_tasks: bool,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_builder(
                config::Config::builder().add_source(config::Environment::default()),
            )
        }

        fn from_builder(
            builder: config::ConfigBuilder<config::builder::DefaultState>,
        ) -> anyhow::Result<Self> {
            let settings = builder.build()?;
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_database_url() -> String {
        "sqlite://kanban.db?mode=rwc".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

}
pub mod entities;
pub mod storage;
pub mod task;
pub mod web;
